//! # POST /send
//!
//! ドキュメントのアップロードとハンドル発行。
//!
//! `document` にはファイル本体かURL文字列のどちらかを渡す。
//! - ファイル: Bot APIへ送信し、getFileで得たURLを登録する
//! - URL: HEADでファイルであることを確認し、そのURLを登録する

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{Multipart, State};
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::Json;
use drive_types::{ApiResponse, FileData};

use crate::config::GatewayState;
use crate::endpoints::secure_url;
use crate::error::GatewayError;
use crate::extension;
use crate::probe::probe_remote_file;

/// `document` フィールドの内容。
enum Document {
    File { file_name: String, content: Bytes },
    Url(String),
}

/// multipartの読み取りエラーを変換する。サイズ超過は413のまま返す。
fn multipart_error(e: MultipartError) -> GatewayError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        GatewayError::PayloadTooLarge(e.body_text())
    } else {
        GatewayError::BadRequest(format!("Invalid multipart body: {}", e.body_text()))
    }
}

/// POST /send — アップロード + ハンドル発行。
pub async fn handle_send(
    State(state): State<Arc<GatewayState>>,
    headers: HeaderMap,
    uri: Uri,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ApiResponse<FileData>>, GatewayError> {
    let mut multipart = multipart?;
    let mut bot_token = String::new();
    let mut chat_id = String::new();
    let mut document = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "bot_token" => bot_token = field.text().await.map_err(multipart_error)?,
            "chat_id" => chat_id = field.text().await.map_err(multipart_error)?,
            "document" => {
                let file_name = field
                    .file_name()
                    .filter(|n| !n.is_empty())
                    .map(str::to_string);
                document = Some(match file_name {
                    Some(file_name) => Document::File {
                        file_name,
                        content: field.bytes().await.map_err(multipart_error)?,
                    },
                    None => Document::Url(
                        field.text().await.map_err(multipart_error)?.trim().to_string(),
                    ),
                });
            }
            _ => {}
        }
    }

    let (file_id, origin_url, size, format) = match document {
        Some(Document::File { file_name, content }) => {
            if bot_token.is_empty() || chat_id.is_empty() {
                return Err(GatewayError::BadRequest(
                    "bot_token and chat_id are required".to_string(),
                ));
            }

            let file_id = state
                .document_store
                .send_document(&bot_token, &chat_id, &file_name, content)
                .await
                .map_err(|e| GatewayError::Upstream(format!("Failed to send document: {e}")))?;

            let info = state
                .document_store
                .get_file(&bot_token, &file_id)
                .await
                .map_err(|e| GatewayError::Upstream(format!("Failed to get file info: {e}")))?;

            let format = extension::from_file_name(&file_name).to_string();
            (file_id, info.url, info.size, format)
        }
        Some(Document::Url(url)) if !url.is_empty() => {
            let remote = probe_remote_file(&state.http_client, &url)
                .await
                .map_err(|e| GatewayError::Upstream(format!("Failed to check URL: {e}")))?;

            if !remote.is_file() {
                tracing::info!(content_type = %remote.content_type, "ファイルを指さないURLを拒否");
                return Err(GatewayError::BadRequest(
                    "URL does not point to a file".to_string(),
                ));
            }
            tracing::info!(
                content_type = %remote.content_type,
                content_length = ?remote.content_length,
                "URL指定のドキュメントを確認"
            );

            let format = extension::from_content_type(&remote.content_type)
                .unwrap_or_default()
                .to_string();
            (String::new(), url, 0, format)
        }
        _ => {
            return Err(GatewayError::BadRequest("document is required".to_string()));
        }
    };

    let handle = state.registry.register(origin_url.clone(), format.clone());
    tracing::info!(
        handle = %handle,
        file_id = %file_id,
        format = %format,
        registered = state.registry.len(),
        "ハンドルを発行"
    );

    Ok(Json(ApiResponse::ok(
        "Upload file successfully!",
        FileData {
            id: file_id,
            url: origin_url,
            secure_url: secure_url(&headers, &uri, &handle),
            bytes: size,
            format,
        },
    )))
}
