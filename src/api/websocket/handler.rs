//! WebSocket feed and dashboard page handlers

use std::time::Duration;

use axum::{
    extract::{
        ws::{rejection::WebSocketUpgradeRejection, Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::{Html, IntoResponse, Response},
};
use tracing::{debug, info, warn};

use super::state::WsState;

/// Upper bound on the closing handshake with a client
const CLOSE_GRACE: Duration = Duration::from_secs(1);

/// Feed upgrade handler. Failed upgrades are logged and never registered.
pub async fn data_source_handler(
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
    State(state): State<WsState>,
) -> Response {
    let ws = match ws {
        Ok(ws) => ws,
        Err(rejection) => {
            warn!(error = %rejection, "websocket upgrade error");
            return rejection.into_response();
        }
    };

    ws.on_failed_upgrade(|e| warn!(error = %e, "websocket upgrade error"))
        .on_upgrade(move |socket| handle_socket(socket, state))
}

/// Dashboard page
pub async fn client_page(State(state): State<WsState>) -> Html<String> {
    Html(state.settings.page.clone())
}

/// Send loop for one connection.
///
/// Ends on cancellation, client close, read or write error, or removal
/// from the registry; every path deregisters and closes the socket.
async fn handle_socket(mut socket: WebSocket, state: WsState) {
    let (client_id, mut rx) = state.registry.register();
    info!(client_id = %client_id, clients = state.registry.count(), "websocket client connected");

    let reason = loop {
        tokio::select! {
            biased;
            _ = state.signal.fired() => break "shutdown",

            frame = rx.recv() => match frame {
                Some(frame) => {
                    let sent = tokio::select! {
                        biased;
                        _ = state.signal.fired() => break "shutdown",
                        sent = socket.send(Message::Text(frame)) => sent,
                    };
                    if let Err(e) = sent {
                        warn!(client_id = %client_id, error = %e, "websocket write error");
                        break "write error";
                    }
                }
                None => break "deregistered",
            },

            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Close(_))) | None => break "closed by client",
                Some(Ok(Message::Ping(data))) => {
                    let sent = tokio::select! {
                        biased;
                        _ = state.signal.fired() => break "shutdown",
                        sent = socket.send(Message::Pong(data)) => sent,
                    };
                    if sent.is_err() {
                        break "write error";
                    }
                }
                Some(Ok(_)) => {} // Feed is server to client only
                Some(Err(e)) => {
                    debug!(client_id = %client_id, error = %e, "websocket read error");
                    break "read error";
                }
            },
        }
    };

    state.registry.unregister(&client_id);
    drop(rx);
    // A peer that stopped reading may never drain the close frame
    if tokio::time::timeout(CLOSE_GRACE, socket.close()).await.is_err() {
        debug!(client_id = %client_id, "websocket close timed out");
    }
    info!(client_id = %client_id, reason, "websocket client disconnected");
}
