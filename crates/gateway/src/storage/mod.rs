//! # Document Storage
//!
//! 外部のドキュメントストレージ（Bot API）の抽象インターフェース。
//! Telegram Bot API実装は `telegram` サブモジュールを参照。

pub mod telegram;

pub use telegram::TelegramDocumentStore;

use axum::body::Bytes;
use axum::http::StatusCode;

/// 上流APIとの通信エラー。
///
/// いずれの表示文言にもリクエストURL（Botトークンを含む）は含まれない。
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// 接続・送信失敗
    #[error("failed to send request: {0}")]
    Transport(reqwest::Error),
    /// レスポンスのデコード失敗
    #[error("failed to decode JSON response: {0}")]
    Decode(reqwest::Error),
    /// `ok: false` の応答
    #[error("telegram API returned not ok status: {status} ({description})")]
    NotOk {
        status: StatusCode,
        description: String,
    },
    /// `ok: true` だが必要な項目が欠けている
    #[error("telegram API response is missing `{0}`")]
    MissingField(&'static str),
}

impl UpstreamError {
    pub(crate) fn transport(e: reqwest::Error) -> Self {
        UpstreamError::Transport(e.without_url())
    }

    pub(crate) fn decode(e: reqwest::Error) -> Self {
        UpstreamError::Decode(e.without_url())
    }
}

/// file_idを解決した結果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFileInfo {
    /// ダウンロードURL（Botトークンを含む）
    pub url: String,
    /// ファイルサイズ（バイト、不明なら0）
    pub size: u64,
}

/// Botとチャットの関係。
#[derive(Debug, Clone)]
pub struct BotChatStatus {
    pub bot_info: serde_json::Value,
    pub chat_info: serde_json::Value,
    /// メンバーステータスが `left` / `kicked` 以外
    pub bot_in_chat: bool,
    /// メンバーステータスが `administrator` / `creator`
    pub bot_is_admin: bool,
}

impl BotChatStatus {
    /// getChatMemberのステータス文字列から参加・管理者フラグを求める。
    pub fn member_flags(status: &str) -> (bool, bool) {
        let in_chat = status != "left" && status != "kicked";
        let is_admin = status == "administrator" || status == "creator";
        (in_chat, is_admin)
    }
}

/// ドキュメントストレージの抽象インターフェース。
///
/// Botトークン・チャットIDはリクエストごとに呼び出し側から渡される。
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// ドキュメントを保存し、上流のfile_idを返す。
    async fn send_document(
        &self,
        bot_token: &str,
        chat_id: &str,
        file_name: &str,
        content: Bytes,
    ) -> Result<String, UpstreamError>;

    /// file_idをダウンロードURLとサイズに解決する。
    async fn get_file(&self, bot_token: &str, file_id: &str)
        -> Result<RemoteFileInfo, UpstreamError>;

    /// Bot情報・チャット情報とBotのメンバーステータスを取得する。
    async fn check_bot_and_chat(
        &self,
        bot_token: &str,
        chat_id: &str,
    ) -> Result<BotChatStatus, UpstreamError>;
}
