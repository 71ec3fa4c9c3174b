//! # テスト用共通ヘルパー
//!
//! モックBot API・モックオリジンと、テスト対象Gatewayの起動。

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Multipart, Query};
use axum::http::{header, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::config::{GatewayConfig, GatewayState};

/// モックBot APIが受け付けるトークン
pub const TEST_BOT_TOKEN: &str = "4242-TESTTOKEN";

/// モックのgetFileが返すファイル内容
pub const TEST_FILE_CONTENT: &[u8] = b"hello world";

/// ルーターを `127.0.0.1` のランダムポートで起動し、ポート番号を返す。
pub async fn spawn_router(app: Router) -> u16 {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    port
}

fn bot_path(method: &str) -> String {
    format!("/bot{TEST_BOT_TOKEN}/{method}")
}

fn not_ok(status: StatusCode, description: &str) -> (StatusCode, Json<Value>) {
    (
        status,
        Json(json!({
            "ok": false,
            "error_code": status.as_u16(),
            "description": description,
        })),
    )
}

/// モックBot APIを起動する。
///
/// - `sendDocument`: `FILE_PDF` を返す（アップロード名がリネームされていることを検証）
/// - `getFile`: `FILE_PDF` のみ解決できる
/// - `getChatMember`: チャット `-100` では管理者、それ以外では `left`
/// - `/file/bot{token}/documents/file_1.pdf`: `TEST_FILE_CONTENT` を返す
/// - 不明なパス（誤ったトークン含む）: 401
pub async fn start_mock_bot_api() -> u16 {
    let app = Router::new()
        .route(
            &bot_path("sendDocument"),
            post(|mut multipart: Multipart| async move {
                let mut chat_id = String::new();
                let mut upload_name = String::new();
                while let Some(field) = multipart.next_field().await.unwrap() {
                    let name = field.name().unwrap_or_default().to_string();
                    match name.as_str() {
                        "chat_id" => chat_id = field.text().await.unwrap(),
                        "document" => {
                            upload_name = field.file_name().unwrap_or_default().to_string();
                            field.bytes().await.unwrap();
                        }
                        _ => {}
                    }
                }
                assert!(!chat_id.is_empty());
                assert!(upload_name.ends_with(".pdf"));
                assert_ne!(upload_name, "report.pdf");

                (
                    StatusCode::OK,
                    Json(json!({
                        "ok": true,
                        "result": {
                            "message_id": 7,
                            "document": { "file_id": "FILE_PDF", "file_name": upload_name }
                        }
                    })),
                )
            }),
        )
        .route(
            &bot_path("getFile"),
            get(|Query(query): Query<HashMap<String, String>>| async move {
                if query.get("file_id").map(String::as_str) == Some("FILE_PDF") {
                    (
                        StatusCode::OK,
                        Json(json!({
                            "ok": true,
                            "result": {
                                "file_id": "FILE_PDF",
                                "file_size": TEST_FILE_CONTENT.len(),
                                "file_path": "documents/file_1.pdf"
                            }
                        })),
                    )
                } else {
                    not_ok(StatusCode::BAD_REQUEST, "Bad Request: invalid file_id")
                }
            }),
        )
        .route(
            &bot_path("getMe"),
            get(|| async {
                Json(json!({
                    "ok": true,
                    "result": { "id": 42, "is_bot": true, "username": "relay_bot" }
                }))
            }),
        )
        .route(
            &bot_path("getChat"),
            post(|Json(body): Json<Value>| async move {
                Json(json!({
                    "ok": true,
                    "result": { "id": body["chat_id"], "type": "supergroup", "title": "Files" }
                }))
            }),
        )
        .route(
            &bot_path("getChatMember"),
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["user_id"], 42);
                let status = if body["chat_id"] == "-100" {
                    "administrator"
                } else {
                    "left"
                };
                Json(json!({ "ok": true, "result": { "status": status } }))
            }),
        )
        .route(
            &format!("/file/bot{TEST_BOT_TOKEN}/documents/file_1.pdf"),
            get(|| async {
                (
                    [(header::CONTENT_TYPE, "application/octet-stream")],
                    TEST_FILE_CONTENT,
                )
            }),
        )
        .fallback(|| async { not_ok(StatusCode::UNAUTHORIZED, "Unauthorized") });

    spawn_router(app).await
}

/// モックBot APIを向いたGateway状態を構築する。
pub fn test_state(bot_api_port: u16) -> Arc<GatewayState> {
    test_state_with(test_config(bot_api_port))
}

/// モックBot APIを向いた設定。個別の項目はテスト側で上書きする。
pub fn test_config(bot_api_port: u16) -> GatewayConfig {
    GatewayConfig {
        telegram_api_base: format!("http://127.0.0.1:{bot_api_port}"),
        ..GatewayConfig::default()
    }
}

pub fn test_state_with(config: GatewayConfig) -> Arc<GatewayState> {
    Arc::new(GatewayState::from_config(&config).unwrap())
}

/// Gatewayを起動し、ベースURLを返す。
pub async fn start_gateway(state: Arc<GatewayState>) -> String {
    let port = spawn_router(crate::app(state)).await;
    format!("http://127.0.0.1:{port}")
}
