//! 設定ファイル管理モジュール
//!
//! `.council/config.toml` から同期先ツールとペルソナの読み込み元を読み込む。
//! 自動検出で決まったツールは `save()` で書き戻す。

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::CouncilError;
use crate::persona::{InstalledCollections, PersonaSource, PersonaStore};

/// 設定ファイルパスを上書きする環境変数
pub const CONFIG_ENV: &str = "COUNCIL_CONFIG";

/// プロジェクトルートからの既定の設定ファイルパス
pub const DEFAULT_CONFIG_PATH: &str = ".council/config.toml";

/// アプリケーション全体の設定
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// 単一の同期先ツール
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
    /// 同期先ツールの明示リスト（`tool` より優先）
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub targets: Vec<String>,
    /// ペルソナの読み込み元
    #[serde(default)]
    pub sources: SourcesConfig,
    /// 読み込み元/保存先のパス
    #[serde(skip)]
    path: Option<PathBuf>,
}

/// ペルソナの読み込み元設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// プロジェクトローカルのペルソナディレクトリ（ルートからの相対パス）
    #[serde(default = "default_experts_dir")]
    pub experts_dir: String,
    /// インストール済みコレクションのルート（未指定なら ~/.council/collections）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collections_dir: Option<String>,
}

/// 同期オプション
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOptions {
    /// ファイルシステムを変更せず、予定の操作だけ報告する
    pub dry_run: bool,
    /// 古い生成ファイルと非推奨パスを削除する
    pub clean: bool,
}

fn default_experts_dir() -> String {
    ".council/experts".to_string()
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            experts_dir: default_experts_dir(),
            collections_dir: None,
        }
    }
}

impl Config {
    /// TOMLファイルから設定を読み込む
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config = Self::parse(&content)?;
        config.path = Some(path.to_path_buf());
        Ok(config)
    }

    /// TOML文字列から設定をパース
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML config")
    }

    /// 設定ファイルパスを決定
    ///
    /// 環境変数 > プロジェクトの .council/config.toml
    pub fn default_config_path(root: &Path) -> PathBuf {
        if let Ok(config_path) = std::env::var(CONFIG_ENV) {
            return PathBuf::from(config_path);
        }
        root.join(DEFAULT_CONFIG_PATH)
    }

    /// 設定を読み込む（ファイルが無ければ既定値。保存先はそのパス）
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Ok(Self::default().with_path(path))
        }
    }

    /// 保存先パスを設定
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// 設定を保存
    pub fn save(&self) -> std::result::Result<(), CouncilError> {
        let path = self
            .path
            .as_ref()
            .ok_or_else(|| CouncilError::ConfigSave("no configuration path".to_string()))?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    CouncilError::ConfigSave(format!("{}: {}", parent.display(), e))
                })?;
            }
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| CouncilError::ConfigSave(e.to_string()))?;
        std::fs::write(path, content)
            .map_err(|e| CouncilError::ConfigSave(format!("{}: {}", path.display(), e)))?;

        tracing::info!("Saved configuration to {}", path.display());
        Ok(())
    }

    /// プロジェクトローカルのペルソナディレクトリ
    pub fn experts_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.sources.experts_dir)
    }

    /// インストール済みコレクション
    pub fn collections(&self) -> Option<InstalledCollections> {
        match &self.sources.collections_dir {
            Some(dir) => Some(InstalledCollections::new(expand_home(dir))),
            None => InstalledCollections::default_root().map(InstalledCollections::new),
        }
    }

    /// 読み込み元を組み立てたペルソナストア
    ///
    /// プロジェクトローカルが先、続いてコレクションを名前順に。
    pub fn persona_store(&self, root: &Path) -> PersonaStore {
        let mut store = PersonaStore::new().with_source(PersonaSource::local(self.experts_dir(root)));
        if let Some(collections) = self.collections() {
            for source in collections.sources() {
                store.add_source(source);
            }
        }
        store
    }
}

/// 先頭の `~/` をホームディレクトリに展開
fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
