//! # Gateway エラー型
//!
//! 全エンドポイントで共通のエラー型。
//! レスポンスボディは `ErrorResponse`（`success` / `message` / `error`）。

use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::Json;
use drive_types::ErrorResponse;

/// Gatewayエラー型。
///
/// 表示文言はそのままクライアントに返却されるため、
/// オリジンURLやBotトークンを含めてはならない。
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// 不正なリクエスト（必須項目の欠落、ファイルを指さないURL）
    #[error("{0}")]
    BadRequest(String),
    /// 未登録のハンドル
    #[error("File not found")]
    NotFound,
    /// アップロードサイズ超過
    #[error("{0}")]
    PayloadTooLarge(String),
    /// 上流（Bot API・オリジン）との通信失敗、または非成功ステータス
    #[error("{0}")]
    Upstream(String),
    /// 内部エラー（レスポンス構築失敗等）
    #[error("{0}")]
    Internal(String),
}

impl GatewayError {
    /// 対応するHTTPステータス。
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::BadRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::NotFound => StatusCode::NOT_FOUND,
            GatewayError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            GatewayError::Upstream(_) | GatewayError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// クエリ文字列の解析失敗も共通のJSONボディで返す。
impl From<QueryRejection> for GatewayError {
    fn from(rejection: QueryRejection) -> Self {
        GatewayError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartRejection> for GatewayError {
    fn from(rejection: MultipartRejection) -> Self {
        GatewayError::BadRequest(rejection.body_text())
    }
}

impl axum::response::IntoResponse for GatewayError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(status = %status, error = %self, "リクエスト失敗");
        }
        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}
