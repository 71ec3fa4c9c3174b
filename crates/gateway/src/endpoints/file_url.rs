//! # GET /url
//!
//! file_idからダウンロードURLを取得し、ハンドルを発行する。

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, Uri};
use axum::Json;
use drive_types::{ApiResponse, FileData, FileQuery};

use crate::config::GatewayState;
use crate::endpoints::info::resolve_file;
use crate::endpoints::secure_url;
use crate::error::GatewayError;
use crate::extension;

/// GET /url — URL取得 + ハンドル発行。`url` と `secure_url` のみ返す。
pub async fn handle_file_url(
    State(state): State<Arc<GatewayState>>,
    headers: HeaderMap,
    uri: Uri,
    query: Result<Query<FileQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<FileData>>, GatewayError> {
    let Query(query) = query?;
    let info = resolve_file(&state, &query).await?;

    let handle = state
        .registry
        .register(info.url.clone(), extension::from_url(&info.url));

    Ok(Json(ApiResponse::ok(
        "File URL retrieved successfully!",
        FileData {
            url: info.url,
            secure_url: secure_url(&headers, &uri, &handle),
            ..FileData::default()
        },
    )))
}
