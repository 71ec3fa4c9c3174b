//! # Telegram Bot API ドキュメントストレージ
//!
//! `sendDocument` / `getFile` / `getMe` / `getChat` / `getChatMember` を呼び出す。
//! 全レスポンスは `{ ok, result, description }` 形式。

use axum::body::Bytes;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::{BotChatStatus, DocumentStore, RemoteFileInfo, UpstreamError};
use crate::extension;

/// 既定のBot APIエンドポイント
pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Bot APIの共通レスポンス。
#[derive(Debug, Deserialize)]
struct BotApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    document: Option<SentDocument>,
}

#[derive(Debug, Deserialize)]
struct SentDocument {
    file_id: String,
}

#[derive(Debug, Deserialize)]
struct File {
    file_path: Option<String>,
    file_size: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ChatMember {
    status: String,
}

/// Telegram Bot APIによるドキュメントストレージ実装。
pub struct TelegramDocumentStore {
    client: reqwest::Client,
    /// 末尾スラッシュなしのベースURL
    api_base: String,
}

impl TelegramDocumentStore {
    /// 新しいストアを作成する。
    ///
    /// `api_base` はセルフホストのBot APIサーバーやテスト用モックを指せる。
    pub fn new(client: reqwest::Client, api_base: &str) -> Self {
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    fn method_url(&self, bot_token: &str, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, bot_token, method)
    }

    /// getFileで得た `file_path` からダウンロードURLを組み立てる。
    pub fn file_url(&self, bot_token: &str, file_path: &str) -> String {
        format!("{}/file/bot{}/{}", self.api_base, bot_token, file_path)
    }

    /// レスポンスを読み取り、`ok: false` をエラーに変換する。
    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, UpstreamError> {
        let status = response.status();
        let body: BotApiResponse<T> = response.json().await.map_err(UpstreamError::decode)?;

        if !body.ok {
            return Err(UpstreamError::NotOk {
                status,
                description: body
                    .description
                    .unwrap_or_else(|| "no description".to_string()),
            });
        }

        body.result.ok_or(UpstreamError::MissingField("result"))
    }

    async fn get_me(&self, bot_token: &str) -> Result<serde_json::Value, UpstreamError> {
        let response = self
            .client
            .get(self.method_url(bot_token, "getMe"))
            .send()
            .await
            .map_err(UpstreamError::transport)?;
        Self::decode(response).await
    }

    async fn get_chat(
        &self,
        bot_token: &str,
        chat_id: &str,
    ) -> Result<serde_json::Value, UpstreamError> {
        let response = self
            .client
            .post(self.method_url(bot_token, "getChat"))
            .json(&serde_json::json!({ "chat_id": chat_id }))
            .send()
            .await
            .map_err(UpstreamError::transport)?;
        Self::decode(response).await
    }

    async fn get_chat_member(
        &self,
        bot_token: &str,
        chat_id: &str,
        user_id: i64,
    ) -> Result<ChatMember, UpstreamError> {
        let response = self
            .client
            .post(self.method_url(bot_token, "getChatMember"))
            .json(&serde_json::json!({ "chat_id": chat_id, "user_id": user_id }))
            .send()
            .await
            .map_err(UpstreamError::transport)?;
        Self::decode(response).await
    }
}

#[async_trait::async_trait]
impl DocumentStore for TelegramDocumentStore {
    async fn send_document(
        &self,
        bot_token: &str,
        chat_id: &str,
        file_name: &str,
        content: Bytes,
    ) -> Result<String, UpstreamError> {
        // 元のファイル名はチャットに残さず、拡張子だけ引き継ぐ
        let ext = extension::from_file_name(file_name);
        let upload_name = extension::file_name(&uuid::Uuid::new_v4().to_string(), ext);

        let length = content.len() as u64;
        let part = reqwest::multipart::Part::stream_with_length(content, length)
            .file_name(upload_name);
        let form = reqwest::multipart::Form::new()
            .text("chat_id", chat_id.to_string())
            .part("document", part);

        let response = self
            .client
            .post(self.method_url(bot_token, "sendDocument"))
            .multipart(form)
            .send()
            .await
            .map_err(UpstreamError::transport)?;

        let message: SentMessage = Self::decode(response).await?;
        let document = message
            .document
            .ok_or(UpstreamError::MissingField("document"))?;

        tracing::info!(file_id = %document.file_id, bytes = length, "ドキュメントを送信");
        Ok(document.file_id)
    }

    async fn get_file(
        &self,
        bot_token: &str,
        file_id: &str,
    ) -> Result<RemoteFileInfo, UpstreamError> {
        let response = self
            .client
            .get(self.method_url(bot_token, "getFile"))
            .query(&[("file_id", file_id)])
            .send()
            .await
            .map_err(UpstreamError::transport)?;

        let file: File = Self::decode(response).await?;
        // 上限サイズを超えるファイルはfile_pathが返らない
        let file_path = file
            .file_path
            .ok_or(UpstreamError::MissingField("file_path"))?;

        Ok(RemoteFileInfo {
            url: self.file_url(bot_token, &file_path),
            size: file.file_size.unwrap_or_default(),
        })
    }

    async fn check_bot_and_chat(
        &self,
        bot_token: &str,
        chat_id: &str,
    ) -> Result<BotChatStatus, UpstreamError> {
        let bot_info = self.get_me(bot_token).await?;
        let chat_info = self.get_chat(bot_token, chat_id).await?;

        let bot_id = bot_info
            .get("id")
            .and_then(serde_json::Value::as_i64)
            .ok_or(UpstreamError::MissingField("id"))?;
        let member = self.get_chat_member(bot_token, chat_id, bot_id).await?;
        let (bot_in_chat, bot_is_admin) = BotChatStatus::member_flags(&member.status);

        Ok(BotChatStatus {
            bot_info,
            chat_info,
            bot_in_chat,
            bot_is_admin,
        })
    }
}
