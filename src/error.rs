//! エラー型定義
//!
//! 同期処理で発生するエラーを3種類に分類する:
//! - 致命的エラー（ペルソナなし、不明なツール指定、書き込み失敗など）: 実行を中断
//! - 項目単位の回復可能エラー（不正なペルソナ文書など）: 警告として記録し続行
//! - 想定内の不在（コレクションルートなし、削除対象なし）: エラーにしない

use std::path::PathBuf;

use thiserror::Error;

/// ライブラリ全体で使うResult型
pub type Result<T> = std::result::Result<T, CouncilError>;

/// councilのエラー型
#[derive(Error, Debug)]
pub enum CouncilError {
    /// 同期対象のペルソナが1件もない
    #[error("no experts found; nothing to sync (add persona files to {hint})")]
    NoPersonas { hint: String },

    /// 設定で明示されたツールが存在しない
    #[error("unknown tool '{name}' in configuration (known: {known})")]
    UnknownTool { name: String, known: String },

    /// 明示的なターゲット一覧が全て不明だった
    #[error("none of the requested targets are known: {}", requested.join(", "))]
    NoUsableTargets { requested: Vec<String> },

    /// 自動検出で何も見つからず、フォールバック先も無い
    #[error("no tool detected and no single-document target is registered")]
    NoFallbackTarget,

    /// ペルソナ文書のパース失敗
    #[error("failed to parse persona {}: {message}", path.display())]
    PersonaParse { path: PathBuf, message: String },

    /// ファイルシステム操作の失敗
    #[error("{action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 設定ファイルの保存失敗
    #[error("failed to save configuration: {0}")]
    ConfigSave(String),

    /// ターゲット単位の同期失敗
    #[error("sync to {target} failed: {source}")]
    TargetSync {
        target: String,
        #[source]
        source: Box<CouncilError>,
    },
}

impl CouncilError {
    /// パースエラーを作成
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::PersonaParse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// IOエラーを作成
    pub fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }

    /// ターゲット名を付与してラップ
    pub fn in_target(self, target: impl Into<String>) -> Self {
        Self::TargetSync {
            target: target.into(),
            source: Box::new(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_sync_message_includes_cause() {
        let inner = CouncilError::io(
            "failed to write",
            "/tmp/x.md",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let err = inner.in_target("claude");
        let msg = err.to_string();
        assert!(msg.contains("claude"));
        assert!(msg.contains("/tmp/x.md"));
    }

    #[test]
    fn test_no_usable_targets_lists_names() {
        let err = CouncilError::NoUsableTargets {
            requested: vec!["foo".to_string(), "bar".to_string()],
        };
        assert_eq!(err.to_string(), "none of the requested targets are known: foo, bar");
    }
}
