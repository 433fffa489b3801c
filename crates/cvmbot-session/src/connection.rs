use std::fmt;
use std::sync::Arc;

use cvmbot_frame::Instruction;
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::{HeaderValue, ORIGIN, SEC_WEBSOCKET_PROTOCOL};
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;

use crate::config::{Endpoint, SessionConfig, SUBPROTOCOL};
use crate::dispatch::CommandDispatcher;
use crate::error::{Result, SessionError};
use crate::session::{Action, CloseReason, Session};

/// Client WebSocket to a CollabVM server.
pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// How a session that did not fail came to an end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    /// The server closed the socket.
    RemoteClosed,
    /// The session closed the socket after a configuration mismatch.
    Rejected(CloseReason),
    /// Shutdown was requested locally.
    Shutdown,
}

impl fmt::Display for SessionEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionEnd::RemoteClosed => write!(f, "closed by server"),
            SessionEnd::Rejected(reason) => write!(f, "closed locally: {reason}"),
            SessionEnd::Shutdown => write!(f, "shut down"),
        }
    }
}

/// Open a WebSocket to `endpoint` with the `guacamole` subprotocol.
pub async fn connect(endpoint: &Endpoint) -> Result<WsStream> {
    let mut request = endpoint
        .url
        .as_str()
        .into_client_request()
        .map_err(|source| SessionError::InvalidUrl {
            url: endpoint.url.clone(),
            source,
        })?;

    let origin =
        HeaderValue::from_str(endpoint.origin()).map_err(|source| SessionError::InvalidHeader {
            name: "Origin",
            source,
        })?;
    let headers = request.headers_mut();
    headers.insert(SEC_WEBSOCKET_PROTOCOL, HeaderValue::from_static(SUBPROTOCOL));
    headers.insert(ORIGIN, origin);

    let (stream, _response) = tokio_tungstenite::connect_async(request).await?;
    Ok(stream)
}

/// Connect to `endpoint` and drive one session until it ends.
pub async fn run_endpoint(
    endpoint: &Endpoint,
    config: Arc<SessionConfig>,
    dispatcher: &dyn CommandDispatcher,
    shutdown: &CancellationToken,
) -> Result<SessionEnd> {
    tracing::info!(url = %endpoint.url, "connecting");
    let ws = tokio::select! {
        biased;
        _ = shutdown.cancelled() => return Ok(SessionEnd::Shutdown),
        ws = connect(endpoint) => ws?,
    };

    let mut session = Session::new(config, endpoint.node_id.clone());
    drive(ws, &mut session, dispatcher, shutdown).await
}

/// Process one socket's messages strictly in order until it closes.
///
/// The only suspension point between instructions is waiting for the next
/// message; actions produced by one instruction are executed before the next
/// is read.
pub async fn drive<S>(
    mut ws: S,
    session: &mut Session,
    dispatcher: &dyn CommandDispatcher,
    shutdown: &CancellationToken,
) -> Result<SessionEnd>
where
    S: Stream<Item = std::result::Result<Message, tungstenite::Error>>
        + Sink<Message, Error = tungstenite::Error>
        + Unpin,
{
    let opened = session.on_open();
    if let Some(end) = execute(&mut ws, session, dispatcher, opened).await? {
        return Ok(end);
    }

    loop {
        let message = tokio::select! {
            biased;
            _ = shutdown.cancelled() => {
                let _ = ws.close().await;
                session.on_closed();
                return Ok(SessionEnd::Shutdown);
            }
            message = ws.next() => message,
        };

        let payload = match message {
            None => {
                tracing::info!("disconnected");
                session.on_closed();
                return Ok(SessionEnd::RemoteClosed);
            }
            Some(Err(err)) => {
                session.on_closed();
                return Err(err.into());
            }
            Some(Ok(Message::Text(text))) => text.into_bytes(),
            Some(Ok(Message::Binary(data))) => data,
            Some(Ok(Message::Close(frame))) => {
                tracing::debug!(?frame, "close frame received");
                continue;
            }
            Some(Ok(_)) => continue,
        };

        let Some(instruction) = Instruction::decode(&payload) else {
            tracing::trace!(size = payload.len(), "ignoring malformed frame");
            continue;
        };
        tracing::trace!(?instruction, "received");

        let actions = session.on_instruction(&instruction);
        if let Some(end) = execute(&mut ws, session, dispatcher, actions).await? {
            return Ok(end);
        }
    }
}

async fn execute<S>(
    ws: &mut S,
    session: &mut Session,
    dispatcher: &dyn CommandDispatcher,
    actions: Vec<Action>,
) -> Result<Option<SessionEnd>>
where
    S: Sink<Message, Error = tungstenite::Error> + Unpin,
{
    for action in actions {
        match action {
            Action::Send(instruction) => send(ws, &instruction).await?,
            Action::Dispatch(chat) => {
                for reply in dispatcher.dispatch(&chat) {
                    send(ws, &reply).await?;
                }
            }
            Action::Close(reason) => {
                let _ = ws.close().await;
                session.on_closed();
                return Ok(Some(SessionEnd::Rejected(reason)));
            }
        }
    }
    Ok(None)
}

async fn send<S>(ws: &mut S, instruction: &Instruction) -> Result<()>
where
    S: Sink<Message, Error = tungstenite::Error> + Unpin,
{
    tracing::trace!(?instruction, "sending");
    ws.send(Message::Text(instruction.encode())).await?;
    Ok(())
}
