//! # GET / , GET /ping
//!
//! 疎通確認。

use axum::Json;
use drive_types::HelloResponse;

pub async fn handle_root() -> Json<HelloResponse> {
    Json(HelloResponse {
        message: "Hello World!".to_string(),
    })
}

pub async fn handle_ping() -> Json<HelloResponse> {
    Json(HelloResponse {
        message: "pong".to_string(),
    })
}
