//! # Drive Relay Gateway
//!
//! Bot APIのドキュメントストレージにファイルを預け、推測不能なハンドル経由で
//! 再ダウンロードさせる中継サーバー。オリジンURLに含まれるBotトークンを
//! クライアントに渡さずに済む。
//!
//! ## 役割
//! - アップロードの中継（Bot API `sendDocument`）
//! - file_id → オリジンURLの解決と、ハンドルの発行
//! - ハンドル経由のダウンロード中継（ストリーミング）
//! - Bot・チャット情報の中継
//!
//! ## API エンドポイント
//! - `POST /send` — アップロード + ハンドル発行
//! - `GET /url` — URL取得 + ハンドル発行
//! - `GET /info` — ファイル情報取得 + ハンドル発行
//! - `GET /drive/{id}` — ダウンロード中継
//! - `GET /verify` — Bot・チャット情報
//!
//! ハンドルはメモリ上にのみ保持し、失効しない。プロセスを再起動すると全て無効になる。

mod config;
mod endpoints;
mod error;
mod extension;
mod probe;
mod registry;
mod relay;
mod storage;
#[cfg(test)]
mod test_helpers;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::{GatewayConfig, GatewayState};

/// ルーターを構築する。
pub(crate) fn app(state: Arc<GatewayState>) -> axum::Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    axum::Router::new()
        .route("/", get(endpoints::handle_root))
        .route("/ping", get(endpoints::handle_ping))
        .route("/send", post(endpoints::handle_send))
        .route("/url", get(endpoints::handle_file_url))
        .route("/info", get(endpoints::handle_info))
        .route("/drive/{id}", get(endpoints::handle_drive))
        .route("/verify", get(endpoints::handle_verify))
        .layer(DefaultBodyLimit::max(state.max_upload_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = GatewayConfig::from_env()?;
    tracing::info!(
        telegram_api_base = %config.telegram_api_base,
        upstream_timeout_secs = config.upstream_timeout.as_secs(),
        origin_read_timeout_secs = config.origin_read_timeout.as_secs(),
        max_upload_bytes = config.max_upload_bytes,
        "設定を読み込みました"
    );

    let state = Arc::new(GatewayState::from_config(&config)?);
    let app = app(state);

    let addr = config.listen_addr();
    tracing::info!("Gatewayを {} で起動します", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
