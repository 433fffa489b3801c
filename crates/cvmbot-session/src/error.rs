use tokio_tungstenite::tungstenite;

/// Transport error type of the underlying WebSocket library.
pub use tokio_tungstenite::tungstenite::Error as WsError;

/// Errors that can occur while running a session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The endpoint URL could not be turned into a WebSocket request.
    #[error("invalid endpoint url '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: tungstenite::Error,
    },

    /// A configured header value is not valid HTTP.
    #[error("invalid {name} header: {source}")]
    InvalidHeader {
        name: &'static str,
        #[source]
        source: tungstenite::http::header::InvalidHeaderValue,
    },

    /// WebSocket handshake or transport failure.
    #[error("websocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),
}

pub type Result<T> = std::result::Result<T, SessionError>;
