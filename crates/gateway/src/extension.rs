//! # 拡張子の推定
//!
//! ダウンロード時のファイル名復元に使う拡張子を、ファイル名・URL・Content-Typeから求める。
//! いずれの関数もドットを含まない拡張子を返す。

/// Content-Typeが無い場合のフォールバック。
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Content-Typeから拡張子を引く。表に無いタイプは `None`。
///
/// `; charset=...` 等のパラメータは無視する。
pub fn from_content_type(content_type: &str) -> Option<&'static str> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match essence.as_str() {
        "application/zip" => Some("zip"),
        "application/x-7z-compressed" => Some("7z"),
        "application/pdf" => Some("pdf"),
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        _ => None,
    }
}

/// パス末尾要素の最後のドット以降を拡張子とする。
///
/// `archive.tar.gz` → `gz`、`README` → 空。
pub fn from_file_name(name: &str) -> &str {
    let base = name.rsplit('/').next().unwrap_or(name);
    match base.rfind('.') {
        Some(dot) => &base[dot + 1..],
        None => "",
    }
}

/// URLのパス部分から拡張子を求める。クエリ・フラグメントは対象外。
pub fn from_url(url: &str) -> String {
    match reqwest::Url::parse(url) {
        Ok(parsed) => from_file_name(parsed.path()).to_string(),
        Err(_) => {
            let path = url.split(['?', '#']).next().unwrap_or(url);
            from_file_name(path).to_string()
        }
    }
}

/// ハンドルと拡張子からダウンロード用ファイル名を組み立てる。
pub fn file_name(handle: &str, extension: &str) -> String {
    if extension.is_empty() {
        handle.to_string()
    } else {
        format!("{handle}.{extension}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_content_type_table() {
        assert_eq!(from_content_type("application/zip"), Some("zip"));
        assert_eq!(from_content_type("application/x-7z-compressed"), Some("7z"));
        assert_eq!(from_content_type("application/pdf"), Some("pdf"));
        assert_eq!(from_content_type("image/jpeg"), Some("jpg"));
        assert_eq!(from_content_type("image/png"), Some("png"));
        assert_eq!(from_content_type("image/PNG; charset=binary"), Some("png"));
        assert_eq!(from_content_type("text/html"), None);
        assert_eq!(from_content_type(FALLBACK_CONTENT_TYPE), None);
        assert_eq!(from_content_type(""), None);
    }

    #[test]
    fn test_from_file_name() {
        assert_eq!(from_file_name("report.pdf"), "pdf");
        assert_eq!(from_file_name("archive.tar.gz"), "gz");
        assert_eq!(from_file_name("README"), "");
        assert_eq!(from_file_name("trailing."), "");
        assert_eq!(from_file_name("dir.v2/notes"), "");
    }

    #[test]
    fn test_from_url() {
        assert_eq!(
            from_url("https://api.telegram.org/file/bot1:abc/documents/file_3.zip"),
            "zip"
        );
        assert_eq!(from_url("https://cdn.example/img.png?sig=a.b"), "png");
        assert_eq!(from_url("https://cdn.example"), "");
        assert_eq!(from_url("documents/file_0.PDF"), "PDF");
    }

    #[test]
    fn test_file_name() {
        assert_eq!(file_name("abc", "pdf"), "abc.pdf");
        assert_eq!(file_name("abc", ""), "abc");
    }
}
