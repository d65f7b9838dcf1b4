use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::fs;

use super::document::Persona;
use crate::error::{CouncilError, Result};

/// ペルソナの読み込み元
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonaSource {
    /// 探索ディレクトリ
    pub dir: PathBuf,
    /// 出所タグ（プロジェクトローカルは空文字）
    pub tag: String,
}

impl PersonaSource {
    /// プロジェクトローカルのソース
    pub fn local(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            tag: String::new(),
        }
    }

    /// インストール済みコレクションのソース
    pub fn collection(dir: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            tag: name.into(),
        }
    }
}

/// ペルソナストア - 複数ソースからペルソナを読み込む
#[derive(Debug, Clone, Default)]
pub struct PersonaStore {
    sources: Vec<PersonaSource>,
}

impl PersonaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// ソースを追加
    pub fn add_source(&mut self, source: PersonaSource) {
        self.sources.push(source);
    }

    pub fn with_source(mut self, source: PersonaSource) -> Self {
        self.add_source(source);
        self
    }

    pub fn sources(&self) -> &[PersonaSource] {
        &self.sources
    }

    /// 全ソースからペルソナを読み込み
    ///
    /// ソースの順に連結する。同じIDは先に読んだものが優先。
    /// 読めないソースは警告して読み飛ばし、残りのソースは読み続ける。
    pub async fn list(&self) -> Vec<Persona> {
        let mut personas: Vec<Persona> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for source in &self.sources {
            let loaded = match load_directory(&source.dir).await {
                Ok(loaded) => loaded,
                Err(e) => {
                    tracing::warn!("Skipping source {}: {}", source.dir.display(), e);
                    continue;
                }
            };
            for mut persona in loaded {
                if !seen.insert(persona.id.clone()) {
                    tracing::warn!(
                        "Skipping duplicate expert '{}' from {}",
                        persona.id,
                        persona.path.display()
                    );
                    continue;
                }
                persona.source = source.tag.clone();
                personas.push(persona);
            }
        }

        tracing::info!("Loaded {} experts from {} sources", personas.len(), self.sources.len());
        personas
    }
}

/// ディレクトリ内のペルソナを読み込み
///
/// ディレクトリが無ければ空。個々のファイルの失敗は警告のみ。
pub async fn load_directory(dir: &Path) -> Result<Vec<Persona>> {
    if !dir.is_dir() {
        tracing::debug!("Expert directory does not exist: {}", dir.display());
        return Ok(Vec::new());
    }

    let mut entries = fs::read_dir(dir)
        .await
        .map_err(|e| CouncilError::io("failed to list", dir, e))?;

    let mut candidates = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| CouncilError::io("failed to list", dir, e))?
    {
        let path = entry.path();
        if is_persona_candidate(&path) {
            candidates.push(path);
        }
    }
    candidates.sort();

    let mut personas = Vec::with_capacity(candidates.len());
    for path in candidates {
        match Persona::load_from_file(&path).await {
            Ok(persona) => {
                tracing::debug!("Loaded expert: {} from {}", persona.id, path.display());
                personas.push(persona);
            }
            Err(e) => {
                tracing::warn!("Skipping {}: {}", path.display(), e);
            }
        }
    }

    Ok(personas)
}

fn is_persona_candidate(path: &Path) -> bool {
    if !path.is_file() {
        return false;
    }
    if path.extension().and_then(|s| s.to_str()) != Some("md") {
        return false;
    }
    path.file_name().and_then(|s| s.to_str()) != Some("README.md")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn persona_doc(id: &str, name: &str) -> String {
        format!("---\nid: {}\nname: {}\nfocus: testing\n---\nbody\n", id, name)
    }

    #[tokio::test]
    async fn test_valid_and_invalid_documents() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a.md"), persona_doc("a", "A")).unwrap();
        std::fs::write(dir.path().join("b.md"), persona_doc("b", "B")).unwrap();
        std::fs::write(dir.path().join("broken.md"), "no header here").unwrap();
        std::fs::write(dir.path().join("unterminated.md"), "---\nname: X\n").unwrap();

        let personas = load_directory(dir.path()).await.unwrap();
        assert_eq!(personas.len(), 2);
        assert_eq!(personas[0].id, "a");
        assert_eq!(personas[1].id, "b");
    }

    #[tokio::test]
    async fn test_skips_readme_subdirs_and_other_extensions() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("README.md"), persona_doc("readme", "Readme")).unwrap();
        std::fs::write(dir.path().join("notes.txt"), persona_doc("notes", "Notes")).unwrap();
        std::fs::create_dir(dir.path().join("nested.md")).unwrap();
        std::fs::write(dir.path().join("real.md"), persona_doc("real", "Real")).unwrap();

        let personas = load_directory(dir.path()).await.unwrap();
        assert_eq!(personas.len(), 1);
        assert_eq!(personas[0].id, "real");
    }

    #[tokio::test]
    async fn test_missing_directory_is_empty() {
        let dir = tempdir().unwrap();
        let personas = load_directory(&dir.path().join("missing")).await.unwrap();
        assert!(personas.is_empty());
    }

    #[tokio::test]
    async fn test_sources_are_concatenated_and_tagged() {
        let local = tempdir().unwrap();
        let installed = tempdir().unwrap();
        std::fs::write(local.path().join("kent-beck.md"), persona_doc("kent-beck", "Kent Beck")).unwrap();
        std::fs::write(installed.path().join("dhh.md"), persona_doc("dhh", "DHH")).unwrap();
        std::fs::write(installed.path().join("kent-beck.md"), persona_doc("kent-beck", "Other Kent")).unwrap();

        let store = PersonaStore::new()
            .with_source(PersonaSource::local(local.path()))
            .with_source(PersonaSource::collection(installed.path(), "classics"))
            .with_source(PersonaSource::collection(local.path().join("absent"), "absent"));

        let personas = store.list().await;
        assert_eq!(personas.len(), 2);
        assert_eq!(personas[0].id, "kent-beck");
        assert_eq!(personas[0].name, "Kent Beck");
        assert!(personas[0].is_local());
        assert_eq!(personas[1].id, "dhh");
        assert_eq!(personas[1].source, "classics");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_unreadable_source_does_not_hide_others() {
        use std::os::unix::fs::PermissionsExt;

        let local = tempdir().unwrap();
        let locked = tempdir().unwrap();
        std::fs::write(local.path().join("kent-beck.md"), persona_doc("kent-beck", "Kent Beck")).unwrap();
        std::fs::write(locked.path().join("dhh.md"), persona_doc("dhh", "DHH")).unwrap();
        std::fs::set_permissions(locked.path(), std::fs::Permissions::from_mode(0o000)).unwrap();

        let store = PersonaStore::new()
            .with_source(PersonaSource::collection(locked.path(), "locked"))
            .with_source(PersonaSource::local(local.path()));
        let personas = store.list().await;

        std::fs::set_permissions(locked.path(), std::fs::Permissions::from_mode(0o755)).unwrap();

        assert!(personas.iter().any(|p| p.id == "kent-beck" && p.is_local()));
    }
}
