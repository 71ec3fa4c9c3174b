//! # GET /verify
//!
//! Bot情報・チャット情報とBotのメンバーステータスをBot APIから取得して返す。

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use drive_types::{ApiResponse, VerifyData, VerifyQuery};

use crate::config::GatewayState;
use crate::error::GatewayError;

pub async fn handle_verify(
    State(state): State<Arc<GatewayState>>,
    query: Result<Query<VerifyQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<VerifyData>>, GatewayError> {
    let Query(query) = query?;
    if query.bot_token.is_empty() || query.chat_id.is_empty() {
        return Err(GatewayError::BadRequest(
            "bot_token and chat_id are required".to_string(),
        ));
    }

    let status = state
        .document_store
        .check_bot_and_chat(&query.bot_token, &query.chat_id)
        .await
        .map_err(|e| {
            GatewayError::Upstream(format!("Failed to check bot and chat info: {e}"))
        })?;

    Ok(Json(ApiResponse::ok(
        "Bot and chat information retrieved successfully!",
        VerifyData {
            bot_info: status.bot_info,
            chat_info: status.chat_info,
            bot_in_chat: status.bot_in_chat,
            bot_is_admin: status.bot_is_admin,
        },
    )))
}
