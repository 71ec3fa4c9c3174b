//! # GET /drive/{id}
//!
//! ハンドル経由のダウンロード中継。

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::Response;

use crate::config::GatewayState;
use crate::error::GatewayError;

/// GET /drive/{id} — オリジンから取得したボディをそのままストリーミングする。
///
/// 未登録ハンドルは404、オリジン取得失敗は500。
pub async fn handle_drive(
    State(state): State<Arc<GatewayState>>,
    Path(handle): Path<String>,
) -> Result<Response, GatewayError> {
    let file = state.relay.open(&handle).await?;
    tracing::info!(
        handle = %handle,
        file_name = %file.file_name,
        content_type = %file.content_type,
        content_length = ?file.content_length,
        "ダウンロードを中継"
    );
    file.into_response()
}

#[cfg(test)]
mod tests {
    use crate::test_helpers::*;
    use axum::http::{header, StatusCode};
    use axum::routing::get;
    use serde_json::Value;

    #[tokio::test]
    async fn test_unknown_handle_returns_404() {
        let bot_api = start_mock_bot_api().await;
        let gateway = start_gateway(test_state(bot_api)).await;

        let response = reqwest::get(format!("{gateway}/drive/does-not-exist"))
            .await
            .unwrap();
        assert_eq!(response.status(), 404);

        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], "File not found");
    }

    /// オリジンの失敗は500になり、オリジンのボディは返らないことを確認
    #[tokio::test]
    async fn test_origin_failure_returns_500() {
        let origin = spawn_router(axum::Router::new().route(
            "/expired",
            get(|| async { (StatusCode::FORBIDDEN, "token expired: SECRET") }),
        ))
        .await;
        let bot_api = start_mock_bot_api().await;
        let state = test_state(bot_api);
        let handle = state
            .registry
            .register(format!("http://127.0.0.1:{origin}/expired"), "zip");
        let gateway = start_gateway(state).await;

        let response = reqwest::get(format!("{gateway}/drive/{handle}"))
            .await
            .unwrap();
        assert_eq!(response.status(), 500);
        assert!(response.headers().get(header::CONTENT_DISPOSITION).is_none());

        let text = response.text().await.unwrap();
        assert!(!text.contains("SECRET"));
    }

    /// ダウンロードのたびにオリジンから取り直すことを確認
    #[tokio::test]
    async fn test_every_download_refetches_origin() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let origin = spawn_router(axum::Router::new().route(
            "/archive",
            get(move || {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    (
                        [(header::CONTENT_TYPE, "application/zip")],
                        format!("version {n}"),
                    )
                }
            }),
        ))
        .await;
        let bot_api = start_mock_bot_api().await;
        let state = test_state(bot_api);
        let handle = state
            .registry
            .register(format!("http://127.0.0.1:{origin}/archive"), "");
        let gateway = start_gateway(state).await;

        for expected in ["version 1", "version 2"] {
            let response = reqwest::get(format!("{gateway}/drive/{handle}"))
                .await
                .unwrap();
            assert_eq!(response.status(), 200);
            assert_eq!(
                response.headers()[header::CONTENT_DISPOSITION],
                format!("attachment; filename=\"{handle}.zip\"").as_str()
            );
            assert_eq!(response.text().await.unwrap(), expected);
        }
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }
}
