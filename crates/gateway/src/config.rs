//! # Gateway設定・共有状態
//!
//! 環境変数からの設定読み込みとGatewayの共有状態の定義。

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::registry::HandleRegistry;
use crate::relay::DownloadRelay;
use crate::storage::{telegram, DocumentStore, TelegramDocumentStore};

/// Gateway設定。
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// リッスンアドレス（`BIND_ADDR`）
    pub bind_addr: String,
    /// リッスンポート（`PORT`）
    pub port: u16,
    /// Bot APIのベースURL（`TELEGRAM_API_BASE`）
    pub telegram_api_base: String,
    /// Bot API・HEAD確認の全体タイムアウト（`UPSTREAM_TIMEOUT_SECS`）
    pub upstream_timeout: Duration,
    /// オリジン取得の接続タイムアウト（`ORIGIN_CONNECT_TIMEOUT_SECS`）
    pub origin_connect_timeout: Duration,
    /// オリジン取得の読み取りタイムアウト（`ORIGIN_READ_TIMEOUT_SECS`）
    ///
    /// 大きなファイルのストリーミングを妨げないよう、全体タイムアウトは設けない。
    pub origin_read_timeout: Duration,
    /// multipartボディの上限（`MAX_UPLOAD_BYTES`）
    pub max_upload_bytes: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0".to_string(),
            port: 8080,
            telegram_api_base: telegram::DEFAULT_API_BASE.to_string(),
            upstream_timeout: Duration::from_secs(60),
            origin_connect_timeout: Duration::from_secs(10),
            origin_read_timeout: Duration::from_secs(60),
            // Bot APIのsendDocument上限
            max_upload_bytes: 50 * 1024 * 1024,
        }
    }
}

impl GatewayConfig {
    /// 環境変数から構築する。未設定の項目は既定値。
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();
        let secs = |key: &str, default: Duration| -> anyhow::Result<Duration> {
            parse_var(&lookup, key, default.as_secs()).map(Duration::from_secs)
        };

        Ok(Self {
            bind_addr: lookup("BIND_ADDR")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.bind_addr),
            port: parse_var(&lookup, "PORT", defaults.port)?,
            telegram_api_base: lookup("TELEGRAM_API_BASE")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.telegram_api_base),
            upstream_timeout: secs("UPSTREAM_TIMEOUT_SECS", defaults.upstream_timeout)?,
            origin_connect_timeout: secs(
                "ORIGIN_CONNECT_TIMEOUT_SECS",
                defaults.origin_connect_timeout,
            )?,
            origin_read_timeout: secs("ORIGIN_READ_TIMEOUT_SECS", defaults.origin_read_timeout)?,
            max_upload_bytes: parse_var(&lookup, "MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
        })
    }

    /// `addr:port` 形式のリッスンアドレス。
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key).filter(|v| !v.trim().is_empty()) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{key} の値が不正です ({raw}): {e}")),
        None => Ok(default),
    }
}

/// Gatewayの共有状態。
pub struct GatewayState {
    /// ハンドル → オリジンURLの対応表
    pub registry: Arc<HandleRegistry>,
    /// `/drive/{id}` のダウンロード中継
    pub relay: DownloadRelay,
    /// 外部ドキュメントストレージ（トレイトで抽象化）
    pub document_store: Box<dyn DocumentStore>,
    /// Bot API・HEAD確認用HTTPクライアント
    pub http_client: reqwest::Client,
    /// multipartボディの上限（バイト）
    pub max_upload_bytes: usize,
}

impl GatewayState {
    /// 設定からHTTPクライアントと各コンポーネントを構築する。
    pub fn from_config(config: &GatewayConfig) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.upstream_timeout)
            .build()?;
        let origin_client = reqwest::Client::builder()
            .connect_timeout(config.origin_connect_timeout)
            .read_timeout(config.origin_read_timeout)
            .build()?;

        let registry = Arc::new(HandleRegistry::new());
        let document_store =
            TelegramDocumentStore::new(http_client.clone(), &config.telegram_api_base);

        Ok(Self {
            relay: DownloadRelay::new(Arc::clone(&registry), origin_client),
            registry,
            document_store: Box::new(document_store),
            http_client,
            max_upload_bytes: config.max_upload_bytes,
        })
    }
}
