//! 書き込み/削除プリミティブ
//!
//! 同期処理のファイル操作は全てここを通す。dry-run時は何も変更せず、
//! 行うはずだった操作を `FileAction` として返す。

use std::fmt;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::{CouncilError, Result};

/// 操作の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    CreateDir,
    Write,
    Remove,
}

/// 実行した（またはdry-runで予定した）ファイル操作
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAction {
    pub kind: ActionKind,
    pub path: PathBuf,
    pub dry_run: bool,
}

impl fmt::Display for FileAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match (self.kind, self.dry_run) {
            (ActionKind::CreateDir, false) => "created",
            (ActionKind::CreateDir, true) => "would create",
            (ActionKind::Write, false) => "wrote",
            (ActionKind::Write, true) => "would write",
            (ActionKind::Remove, false) => "removed",
            (ActionKind::Remove, true) => "would remove",
        };
        write!(f, "{} {}", verb, self.path.display())
    }
}

/// ファイル操作器
#[derive(Debug, Clone)]
pub struct FileOps {
    root: PathBuf,
    dry_run: bool,
}

impl FileOps {
    /// `root` からの相対パスで操作する
    pub fn new(root: impl Into<PathBuf>, dry_run: bool) -> Self {
        Self {
            root: root.into(),
            dry_run,
        }
    }

    /// ディレクトリを作成（dry-run時は何もしない）
    ///
    /// 既に存在する場合は `None`。
    pub async fn ensure_dir(&self, rel: &Path) -> Result<Option<FileAction>> {
        if self.dry_run {
            return Ok(None);
        }
        let path = self.root.join(rel);
        if path.is_dir() {
            return Ok(None);
        }
        fs::create_dir_all(&path)
            .await
            .map_err(|e| CouncilError::io("failed to create directory", &path, e))?;
        Ok(Some(self.action(ActionKind::CreateDir, rel)))
    }

    /// ファイルを書き込み（親ディレクトリも作成）
    pub async fn write(&self, rel: &Path, content: &str) -> Result<FileAction> {
        if self.dry_run {
            return Ok(self.action(ActionKind::Write, rel));
        }

        let path = self.root.join(rel);
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| CouncilError::io("failed to create directory", parent, e))?;
            }
        }

        fs::write(&path, content)
            .await
            .map_err(|e| CouncilError::io("failed to write", &path, e))?;
        tracing::debug!("Wrote {}", path.display());
        Ok(self.action(ActionKind::Write, rel))
    }

    /// ファイルまたはディレクトリを削除
    ///
    /// 存在しないパスは何もせず成功（`None`）。
    pub async fn remove(&self, rel: &Path) -> Result<Option<FileAction>> {
        let path = self.root.join(rel);
        let metadata = match fs::symlink_metadata(&path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CouncilError::io("failed to inspect", &path, e)),
        };

        if self.dry_run {
            return Ok(Some(self.action(ActionKind::Remove, rel)));
        }

        let result = if metadata.is_dir() {
            fs::remove_dir_all(&path).await
        } else {
            fs::remove_file(&path).await
        };
        match result {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CouncilError::io("failed to remove", &path, e)),
        }

        tracing::debug!("Removed {}", path.display());
        Ok(Some(self.action(ActionKind::Remove, rel)))
    }

    fn action(&self, kind: ActionKind, rel: &Path) -> FileAction {
        FileAction {
            kind,
            path: rel.to_path_buf(),
            dry_run: self.dry_run,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_write_creates_parents() {
        let dir = tempdir().unwrap();
        let ops = FileOps::new(dir.path(), false);

        let action = ops.write(Path::new("a/b/c.md"), "hello").await.unwrap();
        assert_eq!(action.to_string(), "wrote a/b/c.md");
        assert_eq!(std::fs::read_to_string(dir.path().join("a/b/c.md")).unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_dry_run_changes_nothing() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("keep.md"), "x").unwrap();
        let ops = FileOps::new(dir.path(), true);

        assert!(ops.ensure_dir(Path::new("new")).await.unwrap().is_none());
        let write = ops.write(Path::new("new/file.md"), "x").await.unwrap();
        assert_eq!(write.to_string(), "would write new/file.md");
        let remove = ops.remove(Path::new("keep.md")).await.unwrap().unwrap();
        assert_eq!(remove.to_string(), "would remove keep.md");

        assert!(!dir.path().join("new").exists());
        assert!(dir.path().join("keep.md").exists());
    }

    #[tokio::test]
    async fn test_remove_missing_is_noop() {
        let dir = tempdir().unwrap();
        let ops = FileOps::new(dir.path(), false);
        assert!(ops.remove(Path::new("missing.md")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_remove_directory() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("old/nested")).unwrap();
        std::fs::write(dir.path().join("old/nested/x.md"), "x").unwrap();
        let ops = FileOps::new(dir.path(), false);

        let action = ops.remove(Path::new("old")).await.unwrap().unwrap();
        assert_eq!(action.kind, ActionKind::Remove);
        assert!(!dir.path().join("old").exists());
    }

    #[tokio::test]
    async fn test_ensure_dir_existing() {
        let dir = tempdir().unwrap();
        let ops = FileOps::new(dir.path(), false);
        assert!(ops.ensure_dir(Path::new("d")).await.unwrap().is_some());
        assert!(ops.ensure_dir(Path::new("d")).await.unwrap().is_none());
    }
}
