//! # URL指定ドキュメントの確認
//!
//! `POST /send` で `document` にURLが渡された場合、HEADリクエストで
//! ファイルを指しているかを確認する。

use axum::http::header;

/// HEADで得たリモートファイルの情報。
#[derive(Debug, Clone)]
pub struct RemoteFile {
    /// 宣言されたContent-Type（無ければ空）
    pub content_type: String,
    /// 宣言されたContent-Length
    pub content_length: Option<u64>,
}

impl RemoteFile {
    pub fn is_file(&self) -> bool {
        is_file_content_type(&self.content_type)
    }
}

/// ファイルとみなすContent-Typeか。
pub fn is_file_content_type(content_type: &str) -> bool {
    ["image/", "application/", "video/", "audio/"]
        .iter()
        .any(|prefix| content_type.starts_with(prefix))
}

/// URLにHEADリクエストを送り、Content-TypeとContent-Lengthを取得する。
///
/// ステータスコードは見ない。エラー文言にURLは含めない。
pub async fn probe_remote_file(
    client: &reqwest::Client,
    url: &str,
) -> Result<RemoteFile, reqwest::Error> {
    let response = client
        .head(url)
        .send()
        .await
        .map_err(reqwest::Error::without_url)?;

    let headers = response.headers();
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let content_length = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok());

    Ok(RemoteFile {
        content_type,
        content_length,
    })
}
