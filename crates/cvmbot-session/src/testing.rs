//! WebSocket server helpers shared by the connection and supervisor tests.

use std::sync::Arc;

use cvmbot_frame::{encode, Instruction};
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::header::{HeaderValue, SEC_WEBSOCKET_PROTOCOL};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

use crate::config::{Credentials, SessionConfig, StaffRole, SUBPROTOCOL};

/// Accept one client and complete the handshake, insisting on the subprotocol.
pub(crate) async fn accept_guacamole(listener: &TcpListener) -> WebSocketStream<TcpStream> {
    let (stream, _) = listener.accept().await.expect("accept should succeed");
    let callback = |req: &Request, mut resp: Response| -> Result<Response, ErrorResponse> {
        let protocol = req
            .headers()
            .get(SEC_WEBSOCKET_PROTOCOL)
            .and_then(|v| v.to_str().ok());
        assert_eq!(protocol, Some(SUBPROTOCOL));
        resp.headers_mut()
            .insert(SEC_WEBSOCKET_PROTOCOL, HeaderValue::from_static(SUBPROTOCOL));
        Ok(resp)
    };
    tokio_tungstenite::accept_hdr_async(stream, callback)
        .await
        .expect("websocket handshake should succeed")
}

/// Next text frame from the client, decoded.
pub(crate) async fn recv_instruction(ws: &mut WebSocketStream<TcpStream>) -> Instruction {
    loop {
        let message = ws
            .next()
            .await
            .expect("stream should stay open")
            .expect("message should be readable");
        if let Message::Text(text) = message {
            return Instruction::decode(text).expect("client frames should decode");
        }
    }
}

pub(crate) async fn send_elements(ws: &mut WebSocketStream<TcpStream>, elements: &[&str]) {
    ws.send(Message::Text(encode(elements)))
        .await
        .expect("server send should succeed");
}

pub(crate) fn password_config() -> Arc<SessionConfig> {
    Arc::new(SessionConfig::new(
        "EmojiBot",
        Credentials::Password {
            password: "hunter2".to_string(),
            role: StaffRole::Mod,
        },
    ))
}
