//! 同期先ツール（ターゲット）の定義
//!
//! 各ターゲットは表示名、ファイル配置、検出述語、コマンドテンプレート、
//! フォーマッタを持つ不変の値。レジストリがまとめて保持する。

pub mod claude;
pub mod codex;
pub mod generic;
pub mod opencode;
pub mod registry;
pub mod render;
pub mod templates;

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use crate::persona::Persona;

pub use registry::TargetRegistry;
pub use templates::{split_command_template, EmbeddedTemplates};

/// 「ディレクトリを持たない」ことを示すパス
pub const NO_DIR: &str = ".";

/// ターゲットごとの文書フォーマッタ
pub trait Formatter: Send + Sync {
    /// 1ペルソナ分のエージェント文書
    fn format_agent(&self, persona: &Persona) -> String;

    /// コマンド文書。`None` はこのターゲットがコマンドを受け付けないことを示す
    fn format_command(&self, name: &str, description: &str, body: &str) -> Option<String>;

    /// 全ペルソナを1文書にまとめる（単一文書ターゲット用）
    fn format_document(&self, personas: &[Persona]) -> String {
        personas
            .iter()
            .map(|p| self.format_agent(p))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// ファイル配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layout {
    /// ペルソナごとに1ファイル
    PerFile {
        agents_dir: String,
        commands_dir: String,
    },
    /// 全ペルソナを1ファイルに書き出す
    SingleDocument { file: String },
}

type DetectFn = Box<dyn Fn(&Path) -> bool + Send + Sync>;

/// ターゲット記述子
pub struct TargetDescriptor {
    /// 設定やCLIで使うキー
    pub name: String,
    /// 表示名
    pub display_name: String,
    /// ファイル配置
    pub layout: Layout,
    /// 旧バージョンが使っていたパス（移行警告/削除用）
    pub deprecated_paths: Vec<String>,
    /// 追加コマンド名 -> 生テンプレート
    pub templates: BTreeMap<String, String>,
    detect: DetectFn,
    formatter: Box<dyn Formatter>,
}

impl TargetDescriptor {
    /// ペルソナごとにファイルを書くターゲットを作成
    pub fn per_file(
        name: impl Into<String>,
        display_name: impl Into<String>,
        agents_dir: impl Into<String>,
        commands_dir: impl Into<String>,
        formatter: impl Formatter + 'static,
    ) -> Self {
        Self::new(
            name,
            display_name,
            Layout::PerFile {
                agents_dir: agents_dir.into(),
                commands_dir: commands_dir.into(),
            },
            formatter,
        )
    }

    /// 単一文書ターゲットを作成
    pub fn single_document(
        name: impl Into<String>,
        display_name: impl Into<String>,
        file: impl Into<String>,
        formatter: impl Formatter + 'static,
    ) -> Self {
        Self::new(
            name,
            display_name,
            Layout::SingleDocument { file: file.into() },
            formatter,
        )
    }

    fn new(
        name: impl Into<String>,
        display_name: impl Into<String>,
        layout: Layout,
        formatter: impl Formatter + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            layout,
            deprecated_paths: Vec::new(),
            templates: BTreeMap::new(),
            detect: Box::new(|_| false),
            formatter: Box::new(formatter),
        }
    }

    /// 検出述語を設定
    pub fn with_detect(mut self, detect: impl Fn(&Path) -> bool + Send + Sync + 'static) -> Self {
        self.detect = Box::new(detect);
        self
    }

    pub fn with_deprecated<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.deprecated_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_templates(mut self, templates: BTreeMap<String, String>) -> Self {
        self.templates = templates;
        self
    }

    /// エージェントディレクトリ（単一文書ターゲットは `"."`）
    pub fn agents_dir(&self) -> &str {
        match &self.layout {
            Layout::PerFile { agents_dir, .. } => agents_dir,
            Layout::SingleDocument { .. } => NO_DIR,
        }
    }

    /// コマンドディレクトリ（単一文書ターゲットは `"."`）
    pub fn commands_dir(&self) -> &str {
        match &self.layout {
            Layout::PerFile { commands_dir, .. } => commands_dir,
            Layout::SingleDocument { .. } => NO_DIR,
        }
    }

    pub fn is_single_document(&self) -> bool {
        matches!(self.layout, Layout::SingleDocument { .. })
    }

    /// 作業ツリーにこのツールの痕跡があるか
    pub fn detect(&self, root: &Path) -> bool {
        (self.detect)(root)
    }

    pub fn formatter(&self) -> &dyn Formatter {
        self.formatter.as_ref()
    }
}

impl fmt::Debug for TargetDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetDescriptor")
            .field("name", &self.name)
            .field("display_name", &self.display_name)
            .field("layout", &self.layout)
            .field("deprecated_paths", &self.deprecated_paths)
            .field("templates", &self.templates.keys().collect::<Vec<_>>())
            .finish()
    }
}
