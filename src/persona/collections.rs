//! インストール済みエキスパートコレクション
//!
//! コレクションの取得・更新（git clone/pull）は別コマンドの責務。
//! ここでは展開済みのディレクトリを読むだけ。

use std::path::{Path, PathBuf};

use super::store::PersonaSource;
use crate::error::CouncilError;

/// コレクションルート（~/.council/collections/ など）
#[derive(Debug, Clone)]
pub struct InstalledCollections {
    root: PathBuf,
}

impl InstalledCollections {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// デフォルトのコレクションルート
    pub fn default_root() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".council").join("collections"))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// コレクション名一覧（名前順）
    ///
    /// ルートが無い、または読めない場合は空（読めない場合は警告）。
    pub fn names(&self) -> Vec<String> {
        if !self.root.is_dir() {
            return Vec::new();
        }

        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) => {
                let err = CouncilError::io("failed to list", &self.root, e);
                tracing::warn!("Skipping collections: {}", err);
                return Vec::new();
            }
        };

        let mut names: Vec<String> = entries
            .flatten()
            .filter(|entry| entry.path().is_dir())
            .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
            .filter(|name| !name.starts_with('.'))
            .collect();
        names.sort();
        names
    }

    /// コレクションのディレクトリ
    pub fn path_of(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// 各コレクションをペルソナソースとして返す
    pub fn sources(&self) -> Vec<PersonaSource> {
        self.names()
            .into_iter()
            .map(|name| PersonaSource::collection(self.path_of(&name), name))
            .collect()
    }
}
