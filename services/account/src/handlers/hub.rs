use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum_extra::extract::CookieJar;
use futures::{SinkExt, StreamExt};
use uuid::Uuid;

use clickgate_core::seal::Sealer;

use crate::domain::types::USER_ID_COOKIE;
use crate::state::AppState;

/// `GET /NotificationHubOtp` — the real-time channel. Group membership is
/// decided once, at upgrade time, from the sealed `UserId` cookie.
pub async fn notification_hub(
    State(state): State<AppState>,
    jar: CookieJar,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let user_id = group_key(&state.sealer, &jar);
    ws.on_upgrade(move |socket| handle_connection(socket, state, user_id))
}

/// Group key from the sealed `UserId` cookie. A missing cookie, an unseal
/// failure, or a malformed id yields `None`: the connection proceeds
/// ungrouped instead of being rejected — it simply never receives pushes.
fn group_key(sealer: &Sealer, jar: &CookieJar) -> Option<Uuid> {
    let sealed = jar.get(USER_ID_COOKIE)?.value().to_owned();
    let unsealed = sealer.unseal(&sealed).ok()?;
    Uuid::parse_str(&unsealed).ok()
}

async fn handle_connection(socket: WebSocket, state: AppState, user_id: Option<Uuid>) {
    let (mut sink, mut stream) = socket.split();

    let Some(user_id) = user_id else {
        // Ungrouped: keep the socket open until the client goes away.
        while let Some(Ok(msg)) = stream.next().await {
            if matches!(msg, Message::Close(_)) {
                break;
            }
        }
        return;
    };

    let (conn_id, mut events) = state.registry.join(user_id);
    tracing::debug!(%user_id, conn_id, "hub connection joined group");

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                let Ok(text) = serde_json::to_string(&event) else { continue };
                if sink.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    // Client-to-server traffic is not part of the protocol.
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    state.registry.leave(user_id, conn_id);
    tracing::debug!(%user_id, conn_id, "hub connection left group");
}
