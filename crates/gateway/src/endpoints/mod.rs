//! # Gatewayエンドポイント
//!
//! - `GET /`, `GET /ping` — 疎通確認
//! - `POST /send` — アップロード + ハンドル発行
//! - `GET /url` — file_idからURL取得 + ハンドル発行
//! - `GET /info` — file_idからファイル情報取得 + ハンドル発行
//! - `GET /drive/{id}` — ハンドル経由のダウンロード中継
//! - `GET /verify` — Bot・チャット情報の中継

pub mod drive;
pub mod file_url;
pub mod hello;
pub mod info;
pub mod send;
pub mod verify;

pub use drive::handle_drive;
pub use file_url::handle_file_url;
pub use hello::{handle_ping, handle_root};
pub use info::handle_info;
pub use send::handle_send;
pub use verify::handle_verify;

use axum::http::{header, HeaderMap, Uri};

/// `X-Forwarded-Proto` ヘッダ
const X_FORWARDED_PROTO: &str = "x-forwarded-proto";

/// ハンドルから `{scheme}://{host}/drive/{id}` を組み立てる。
///
/// schemeは `X-Forwarded-Proto`（複数あれば先頭）、無ければ `http`。
/// hostは `Host` ヘッダ、無ければURIのauthority（HTTP/2の `:authority`）。
pub(crate) fn secure_url(headers: &HeaderMap, uri: &Uri, handle: &str) -> String {
    let scheme = headers
        .get(X_FORWARDED_PROTO)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("http");
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .or_else(|| uri.authority().map(|a| a.as_str()))
        .unwrap_or("localhost");

    format!("{scheme}://{host}/drive/{handle}")
}
