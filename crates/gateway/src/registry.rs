//! # セキュアハンドルレジストリ
//!
//! 推測不能なハンドル（UUID v4）からオリジンURLへの対応表。
//!
//! ## 性質
//! - URLと拡張子は1レコードとして単一のロック下で登録・参照される
//! - レコードは削除も失効もしない（プロセス終了まで保持される）
//! - 同じオリジンURLでも登録のたびに別のハンドルが発行される

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// ハンドルに紐づくレコード。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandleRecord {
    /// 実際の取得先URL（認証トークンを含み得る）
    pub origin_url: String,
    /// 元ファイルの拡張子（ドットなし、空の場合あり）
    pub extension: String,
}

/// ハンドル → レコードの対応表。
///
/// プロセス起動時に1つ構築し、共有状態経由でハンドラに渡す。
/// ロックはマップ操作の間だけ保持し、ネットワーク処理中には保持しない。
#[derive(Debug, Default)]
pub struct HandleRegistry {
    records: RwLock<HashMap<String, HandleRecord>>,
}

impl HandleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 新しいハンドルを発行し、オリジンURLと拡張子を登録する。
    ///
    /// 入力は検証しない（空のURLも受け付け、取得時に失敗する）。
    pub fn register(&self, origin_url: impl Into<String>, extension: impl Into<String>) -> String {
        let record = HandleRecord {
            origin_url: origin_url.into(),
            extension: extension.into(),
        };

        // マップは単純な挿入のみで構成されるため、poisonされても内容は一貫している
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        loop {
            let handle = uuid::Uuid::new_v4().to_string();
            if let Entry::Vacant(slot) = records.entry(handle.clone()) {
                slot.insert(record);
                return handle;
            }
        }
    }

    /// ハンドルを解決する。未登録の場合は `None`。
    pub fn resolve(&self, handle: &str) -> Option<HandleRecord> {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(handle)
            .cloned()
    }

    /// 登録済みハンドル数。
    pub fn len(&self) -> usize {
        self.records.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
