//! # Drive Relay 共有型定義
//!
//! Gatewayが返却・受信するJSON構造をRust構造体として提供する。
//!
//! ## シリアライズ規則
//! - 成功レスポンスは `ApiResponse<T>` で包む（`success` / `message` / `data`）
//! - `FileData` の各フィールドは空文字列・0の場合JSONから省略する
//! - エラーレスポンスは `message` と `error` の両方に同じ文言を載せる

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// レスポンスエンベロープ
// ---------------------------------------------------------------------------

/// 成功時の共通レスポンス。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// 常にtrue
    pub success: bool,
    /// 人間向けメッセージ
    pub message: String,
    /// エンドポイント固有のペイロード
    pub data: T,
}

impl<T> ApiResponse<T> {
    /// 成功レスポンスを構築する。
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
        }
    }
}

/// エラー時の共通レスポンス。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// 常にfalse
    pub success: bool,
    /// エラー内容（上流のエラー文言を含む）
    pub message: String,
    /// `message` と同じ文言
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            success: false,
            error: message.clone(),
            message,
        }
    }
}

/// `GET /` と `GET /ping` のレスポンス。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloResponse {
    pub message: String,
}

// ---------------------------------------------------------------------------
// ファイル情報
// ---------------------------------------------------------------------------

/// アップロード・ファイル情報取得の結果。
///
/// `POST /send`, `GET /info`, `GET /url` で共有する。
/// `/url` は `url` と `secure_url` のみを埋める。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileData {
    /// 上流（Bot API）のfile_id。URL指定アップロードでは空。
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// オリジンURL（認証トークンを含む）
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub url: String,
    /// `/drive/{handle}` 形式の間接URL
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub secure_url: String,
    /// ファイルサイズ（バイト）
    #[serde(default, skip_serializing_if = "is_zero")]
    pub bytes: u64,
    /// 拡張子（ドットなし）
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub format: String,
}

fn is_zero(n: &u64) -> bool {
    *n == 0
}

/// `GET /verify` の結果。Bot APIのレスポンスをそのまま中継する。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyData {
    /// getMe の result
    pub bot_info: serde_json::Value,
    /// getChat の result
    pub chat_info: serde_json::Value,
    /// Botがチャットに参加しているか
    pub bot_in_chat: bool,
    /// Botがチャットの管理者か
    pub bot_is_admin: bool,
}

// ---------------------------------------------------------------------------
// クエリパラメータ
// ---------------------------------------------------------------------------

/// `GET /info`, `GET /url` のクエリ。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileQuery {
    #[serde(default)]
    pub bot_token: String,
    #[serde(default)]
    pub file_id: String,
}

/// `GET /verify` のクエリ。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerifyQuery {
    #[serde(default)]
    pub bot_token: String,
    #[serde(default)]
    pub chat_id: String,
}
