use crate::error::AppError;
use crate::services::case::CaseService;
use crate::utils::jwt::decode_jwt;
use crate::websocket::hub::CaseStreamHub;
use axum::{
    extract::{
        ws::{Message, WebSocket},
        Path, Query, WebSocketUpgrade,
    },
    response::IntoResponse,
    Extension,
};
use futures_util::{SinkExt, StreamExt};
use sea_orm::DatabaseConnection;
use serde::Deserialize;

#[derive(Deserialize)]
pub struct WsQuery {
    /// Officer access token. Absent for reporter connections, where
    /// knowing the tracking code is the capability.
    pub token: Option<String>,
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(code): Path<String>,
    Query(query): Query<WsQuery>,
    Extension(db): Extension<DatabaseConnection>,
    Extension(hub): Extension<CaseStreamHub>,
) -> Result<impl IntoResponse, AppError> {
    // A supplied token must be a valid access token; a bad one is
    // rejected rather than silently downgraded to reporter access.
    if let Some(token) = &query.token {
        let claims = decode_jwt(token).map_err(|_| AppError::Unauthorized)?;
        if !crate::utils::jwt::is_access_token(&claims) {
            return Err(AppError::Unauthorized);
        }
    }

    let case = CaseService::new(db).find_by_public_id(&code).await?;

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, case.id, hub)))
}

async fn handle_socket(socket: WebSocket, case_id: i32, hub: CaseStreamHub) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let (conn_id, mut rx) = hub.subscribe(case_id);

    tracing::info!("Case stream connected for case {}", case_id);

    let send_task = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if ws_sender.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    });

    let recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = ws_receiver.next().await {
            if let Message::Close(_) = msg {
                break;
            }
        }
    });

    tokio::select! {
        _ = send_task => {},
        _ = recv_task => {},
    }

    hub.unsubscribe(case_id, conn_id);
    tracing::info!("Case stream disconnected for case {}", case_id);
}
