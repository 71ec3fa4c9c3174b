//! # ダウンロード中継
//!
//! ハンドルをオリジンURLに解決し、オリジンから取得したボディを
//! バッファリングせずにストリームとしてクライアントへ流す。
//!
//! ## 処理の流れ
//! 1. ハンドル解決（未登録なら `NotFound`、ネットワークアクセスなし）
//! 2. オリジンへGET（キャッシュせず毎回取得する）
//! 3. 接続失敗・200以外なら `Upstream`（上流のボディは返さない）
//! 4. Content-Type とファイル名を復元してストリーミング
//!
//! リトライ・Range要求には対応しない。

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::Response;
use futures::TryStreamExt;

use crate::error::GatewayError;
use crate::extension;
use crate::registry::HandleRegistry;

/// オリジンからの取得に成功し、ストリーミング待ちのファイル。
pub struct RelayedFile {
    /// オリジンのステータス（そのまま返却する）
    pub status: StatusCode,
    /// 返却するContent-Type
    pub content_type: String,
    /// Content-Dispositionに載せるファイル名
    pub file_name: String,
    /// オリジンが宣言したContent-Length
    pub content_length: Option<u64>,
    upstream: reqwest::Response,
}

impl RelayedFile {
    /// ストリーミングレスポンスに変換する。
    pub fn into_response(self) -> Result<Response, GatewayError> {
        let mut builder = Response::builder()
            .status(self.status)
            .header(header::CONTENT_TYPE, self.content_type)
            .header(header::CONTENT_DISPOSITION, content_disposition(&self.file_name));
        if let Some(length) = self.content_length {
            builder = builder.header(header::CONTENT_LENGTH, length);
        }

        let stream = self
            .upstream
            .bytes_stream()
            .map_err(|e| std::io::Error::other(e.without_url()));

        builder
            .body(Body::from_stream(stream))
            .map_err(|e| GatewayError::Internal(format!("Failed to build response: {e}")))
    }
}

/// `attachment; filename="..."` を組み立てる。
///
/// ヘッダに載せられない文字を含む場合は拡張子を諦めてハンドルのみにする。
fn content_disposition(file_name: &str) -> HeaderValue {
    let escaped = file_name.replace('\\', "\\\\").replace('"', "\\\"");
    HeaderValue::from_str(&format!("attachment; filename=\"{escaped}\"")).unwrap_or_else(|_| {
        let handle = file_name.split('.').next().unwrap_or_default();
        HeaderValue::from_str(&format!("attachment; filename=\"{handle}\""))
            .unwrap_or_else(|_| HeaderValue::from_static("attachment"))
    })
}

/// ダウンロード中継。
pub struct DownloadRelay {
    registry: Arc<HandleRegistry>,
    /// オリジン取得用クライアント（接続・読み取りタイムアウトのみ設定）
    client: reqwest::Client,
}

impl DownloadRelay {
    pub fn new(registry: Arc<HandleRegistry>, client: reqwest::Client) -> Self {
        Self { registry, client }
    }

    /// ハンドルを解決し、オリジンへの取得を開始する。
    pub async fn open(&self, handle: &str) -> Result<RelayedFile, GatewayError> {
        let record = self.registry.resolve(handle).ok_or(GatewayError::NotFound)?;

        let upstream = self
            .client
            .get(&record.origin_url)
            .send()
            .await
            .map_err(|e| {
                let e = e.without_url();
                tracing::warn!(handle = %handle, error = %e, "オリジンへの接続に失敗");
                GatewayError::Upstream(format!("Failed to fetch file: {e}"))
            })?;

        let status = upstream.status();
        if status != StatusCode::OK {
            tracing::warn!(handle = %handle, status = %status, "オリジンが成功以外のステータスを返却");
            return Err(GatewayError::Upstream(format!(
                "Failed to fetch file: origin returned HTTP {status}"
            )));
        }

        let content_type = upstream
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .unwrap_or(extension::FALLBACK_CONTENT_TYPE)
            .to_string();

        let ext = if record.extension.is_empty() {
            extension::from_content_type(&content_type).unwrap_or_default()
        } else {
            record.extension.as_str()
        };
        let file_name = extension::file_name(handle, ext);

        Ok(RelayedFile {
            status,
            content_type,
            file_name,
            content_length: upstream.content_length(),
            upstream,
        })
    }
}
