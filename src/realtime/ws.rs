//! WebSocket endpoint
//!
//! One socket per client. After connecting, the client sends `register`
//! with its user id to become addressable for targeted pushes, and
//! (separately) `user_online` to announce presence. Broadcast events reach
//! every open socket whether registered or not.

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::core::ServerState;
use crate::realtime::ServerEvent;

/// Frames the client may send, e.g. `{"event": "register", "userId": ...}`
#[derive(Debug, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum ClientEvent {
    /// Map this socket to a user for targeted delivery
    Register {
        #[serde(rename = "userId")]
        user_id: String,
    },
    /// Announce the user as online
    UserOnline {
        #[serde(rename = "userId")]
        user_id: String,
    },
}

/// GET /ws — upgrade to WebSocket
pub async fn handle_ws(State(state): State<ServerState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_connection(socket, state))
}

async fn handle_connection(socket: WebSocket, state: ServerState) {
    let (mut ws_sink, mut ws_stream) = socket.split();
    let mut broadcast_rx = state.hub().subscribe();

    // Filled in once the client sends `register`
    let mut registration: Option<(String, mpsc::Sender<ServerEvent>)> = None;
    let mut targeted_rx: Option<mpsc::Receiver<ServerEvent>> = None;
    // User id this socket announced presence for, if any
    let mut announced: Option<String> = None;

    tracing::debug!("WebSocket connected");

    loop {
        tokio::select! {
            // Incoming frame from the client
            msg = ws_stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        handle_client_frame(
                            &text,
                            &state,
                            &mut registration,
                            &mut targeted_rx,
                            &mut announced,
                        );
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = ws_sink.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!("WebSocket error: {e}");
                        break;
                    }
                    _ => {} // Binary, Pong — ignore
                }
            }

            // Targeted event for the registered user
            event = async {
                match targeted_rx.as_mut() {
                    Some(rx) => rx.recv().await,
                    None => std::future::pending().await,
                }
            } => {
                match event {
                    Some(event) => {
                        if send_event(&mut ws_sink, &event).await.is_err() {
                            break;
                        }
                    }
                    None => {
                        // A newer socket registered for this user
                        targeted_rx = None;
                        registration = None;
                    }
                }
            }

            // Broadcast fan-out
            event = broadcast_rx.recv() => {
                match event {
                    Ok(event) => {
                        if send_event(&mut ws_sink, &event).await.is_err() {
                            break;
                        }
                    }
                    // Slow consumer skipped some events; keep going
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    let _ = ws_sink.close().await;

    if let Some((user_id, handle)) = registration {
        state.hub().unregister(&user_id, &handle);
    }

    // Going away only announces offline if this socket announced online
    if let Some(user_id) = announced
        && state.presence().mark_offline(&user_id)
    {
        state.hub().broadcast(ServerEvent::UserOffline { user_id });
    }

    tracing::debug!("WebSocket session cleaned up");
}

fn handle_client_frame(
    text: &str,
    state: &ServerState,
    registration: &mut Option<(String, mpsc::Sender<ServerEvent>)>,
    targeted_rx: &mut Option<mpsc::Receiver<ServerEvent>>,
    announced: &mut Option<String>,
) {
    let event: ClientEvent = match serde_json::from_str(text) {
        Ok(e) => e,
        Err(e) => {
            tracing::debug!("Ignoring malformed client frame: {e}");
            return;
        }
    };

    match event {
        ClientEvent::Register { user_id } => {
            // Re-registering under a different id releases the old mapping
            if let Some((old_id, handle)) = registration.take() {
                if old_id == user_id {
                    *registration = Some((old_id, handle));
                    return;
                }
                state.hub().unregister(&old_id, &handle);
            }

            let (handle, rx) = state.hub().register(&user_id);
            tracing::debug!(user_id, "socket registered");
            *registration = Some((user_id, handle));
            *targeted_rx = Some(rx);
        }

        ClientEvent::UserOnline { user_id } => {
            *announced = Some(user_id.clone());
            // Only the first announcement per user broadcasts
            if state.presence().mark_online(&user_id) {
                state.hub().broadcast(ServerEvent::UserOnline { user_id });
            }
        }
    }
}

async fn send_event<S>(ws_sink: &mut S, event: &ServerEvent) -> Result<(), ()>
where
    S: futures::Sink<Message, Error = axum::Error> + Unpin,
{
    let json = serde_json::to_string(event).map_err(|_| ())?;
    ws_sink
        .send(Message::Text(json.into()))
        .await
        .map_err(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_frame_parses() {
        let frame = r#"{"event":"register","userId":"user:alice"}"#;
        match serde_json::from_str::<ClientEvent>(frame).unwrap() {
            ClientEvent::Register { user_id } => assert_eq!(user_id, "user:alice"),
            other => panic!("Expected Register, got {other:?}"),
        }
    }

    #[test]
    fn user_online_frame_parses() {
        let frame = r#"{"event":"user_online","userId":"user:bob"}"#;
        match serde_json::from_str::<ClientEvent>(frame).unwrap() {
            ClientEvent::UserOnline { user_id } => assert_eq!(user_id, "user:bob"),
            other => panic!("Expected UserOnline, got {other:?}"),
        }
    }

    #[test]
    fn unknown_event_rejected() {
        let frame = r#"{"event":"shutdown"}"#;
        assert!(serde_json::from_str::<ClientEvent>(frame).is_err());
    }
}
