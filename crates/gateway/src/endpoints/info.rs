//! # GET /info
//!
//! file_idからファイル情報を取得し、呼び出しごとに新しいハンドルを発行する。

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, Uri};
use axum::Json;
use drive_types::{ApiResponse, FileData, FileQuery};

use crate::config::GatewayState;
use crate::endpoints::secure_url;
use crate::error::GatewayError;
use crate::extension;
use crate::storage::RemoteFileInfo;

/// `bot_token` と `file_id` を検証し、file_idを解決する。`/url` と共有。
pub(crate) async fn resolve_file(
    state: &GatewayState,
    query: &FileQuery,
) -> Result<RemoteFileInfo, GatewayError> {
    if query.bot_token.is_empty() || query.file_id.is_empty() {
        return Err(GatewayError::BadRequest(
            "bot_token and file_id are required".to_string(),
        ));
    }

    state
        .document_store
        .get_file(&query.bot_token, &query.file_id)
        .await
        .map_err(|e| GatewayError::Upstream(format!("Failed to get file info: {e}")))
}

/// GET /info — ファイル情報取得 + ハンドル発行。
pub async fn handle_info(
    State(state): State<Arc<GatewayState>>,
    headers: HeaderMap,
    uri: Uri,
    query: Result<Query<FileQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<FileData>>, GatewayError> {
    let Query(query) = query?;
    let info = resolve_file(&state, &query).await?;

    let format = extension::from_url(&info.url);
    let handle = state.registry.register(info.url.clone(), format.clone());
    tracing::info!(handle = %handle, file_id = %query.file_id, "ハンドルを発行");

    Ok(Json(ApiResponse::ok(
        "Get file information successfully!",
        FileData {
            id: query.file_id,
            url: info.url,
            secure_url: secure_url(&headers, &uri, &handle),
            bytes: info.size,
            format,
        },
    )))
}
