use std::path::Path;

use super::{claude, codex, generic, opencode, TargetDescriptor};

/// ターゲットレジストリ - 登録順を保持する不変のカタログ
///
/// プロセス起動時に一度だけ作り、リゾルバと同期処理に明示的に渡す。
#[derive(Debug)]
pub struct TargetRegistry {
    targets: Vec<TargetDescriptor>,
}

impl TargetRegistry {
    /// 組み込みターゲットのレジストリ
    pub fn builtin() -> Self {
        Self::from_targets(vec![
            claude::descriptor(),
            opencode::descriptor(),
            codex::descriptor(),
            generic::descriptor(),
        ])
    }

    /// 任意のターゲットからレジストリを作成（テスト用の差し替えにも使う）
    pub fn from_targets(targets: Vec<TargetDescriptor>) -> Self {
        Self { targets }
    }

    /// 名前でターゲットを取得
    pub fn get(&self, name: &str) -> Option<&TargetDescriptor> {
        self.targets.iter().find(|t| t.name == name)
    }

    /// 全ターゲット（登録順）
    pub fn all(&self) -> &[TargetDescriptor] {
        &self.targets
    }

    /// ターゲット名一覧
    pub fn names(&self) -> Vec<&str> {
        self.targets.iter().map(|t| t.name.as_str()).collect()
    }

    /// 作業ツリーで検出されたターゲット（登録順）
    pub fn detect(&self, root: &Path) -> Vec<&TargetDescriptor> {
        self.targets.iter().filter(|t| t.detect(root)).collect()
    }

    /// 何も検出されなかったときの既定ターゲット（最初の単一文書ターゲット）
    pub fn fallback(&self) -> Option<&TargetDescriptor> {
        self.targets.iter().find(|t| t.is_single_document())
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

impl Default for TargetRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_builtin_order() {
        let registry = TargetRegistry::builtin();
        assert_eq!(registry.names(), vec!["claude", "opencode", "codex", "generic"]);
        assert!(registry.get("claude").is_some());
        assert!(registry.get("vim").is_none());
        assert_eq!(registry.fallback().map(|t| t.name.as_str()), Some("generic"));
    }

    #[test]
    fn test_detect_preserves_registry_order() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join(".codex")).unwrap();
        std::fs::create_dir(dir.path().join(".claude")).unwrap();

        let registry = TargetRegistry::builtin();
        let detected: Vec<&str> = registry.detect(dir.path()).iter().map(|t| t.name.as_str()).collect();
        assert_eq!(detected, vec!["claude", "codex"]);
    }

    #[test]
    fn test_detect_empty_tree() {
        let dir = tempdir().unwrap();
        assert!(TargetRegistry::builtin().detect(dir.path()).is_empty());
    }
}
