//! council: エキスパートペルソナ同期ツール
//!
//! Markdownで書かれたレビュアーのペルソナを読み込み、
//! Claude Code、OpenCode、Codex CLI、AGENTS.md など各AIコーディングツールの
//! 設定形式に書き出す。

pub mod cli;
pub mod config;
pub mod error;
pub mod fsops;
pub mod persona;
pub mod resolve;
pub mod sync;
pub mod target;
pub mod template;

// 主要な型の再エクスポート
pub use config::{Config, SourcesConfig, SyncOptions};
pub use error::{CouncilError, Result};
pub use fsops::{ActionKind, FileAction, FileOps};
pub use persona::{InstalledCollections, Persona, PersonaSource, PersonaStore};
pub use resolve::{Resolution, TargetResolver};
pub use sync::{SyncReport, Syncer, TargetReport};
pub use target::{Formatter, Layout, TargetDescriptor, TargetRegistry};
pub use template::{render_council, CouncilCommand};

/// バージョン情報
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
