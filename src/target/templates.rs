//! 埋め込みテンプレート
//!
//! ビルド時に templates/ ディレクトリをバイナリに埋め込む。
//! `<target>/commands/<name>.md` が各ターゲットの追加コマンド、
//! `council.md` が /council コマンドの骨組み。

use rust_embed::Embed;
use std::collections::BTreeMap;
use std::path::Path;

use crate::persona::document::split_header;

/// 埋め込みテンプレートアセット
#[derive(Embed)]
#[folder = "templates/"]
pub struct EmbeddedTemplates;

/// コマンドテンプレートのヘッダー
#[derive(Debug, Default, serde::Deserialize)]
struct CommandHeader {
    #[serde(default)]
    description: String,
}

impl EmbeddedTemplates {
    /// ターゲットの追加コマンド（コマンド名 -> 生テンプレート）
    pub fn commands_for(target: &str) -> BTreeMap<String, String> {
        let prefix = format!("{}/commands/", target);
        Self::iter()
            .filter(|path| path.starts_with(&prefix) && path.ends_with(".md"))
            .filter_map(|path| {
                let name = Path::new(&*path).file_stem()?.to_str()?.to_string();
                let content = Self::get_content(&path)?;
                Some((name, content))
            })
            .collect()
    }

    /// /council コマンドの骨組み
    pub fn council_skeleton() -> Option<String> {
        Self::get_content("council.md")
    }

    /// ファイル内容を取得
    pub fn get_content(path: &str) -> Option<String> {
        Self::get(path).map(|f| String::from_utf8_lossy(&f.data).to_string())
    }
}

/// 生テンプレートを (説明, 本文) に分割
///
/// ヘッダーが無いテンプレートは説明なしで全体を本文とする。
pub fn split_command_template(raw: &str) -> (String, String) {
    match split_header(raw) {
        Ok((header, body)) => {
            let header: CommandHeader = serde_yaml::from_str(header).unwrap_or_default();
            (header.description, body.to_string())
        }
        Err(_) => (String::new(), raw.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_command_templates_exist() {
        let claude = EmbeddedTemplates::commands_for("claude");
        assert!(claude.contains_key("review"));
        assert!(claude.contains_key("expert"));
        assert!(!claude.contains_key("council"));

        let codex = EmbeddedTemplates::commands_for("codex");
        assert_eq!(codex.keys().collect::<Vec<_>>(), vec!["review"]);

        assert!(EmbeddedTemplates::commands_for("generic").is_empty());
    }

    #[test]
    fn test_council_skeleton_embedded() {
        let skeleton = EmbeddedTemplates::council_skeleton().unwrap();
        assert!(skeleton.contains("{{#experts}}"));
    }

    #[test]
    fn test_split_command_template() {
        let (description, body) = split_command_template("---\ndescription: Review code\n---\nDo it: $ARGUMENTS\n");
        assert_eq!(description, "Review code");
        assert_eq!(body, "Do it: $ARGUMENTS\n");

        let (description, body) = split_command_template("plain body");
        assert!(description.is_empty());
        assert_eq!(body, "plain body");
    }
}
