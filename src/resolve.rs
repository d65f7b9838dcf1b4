//! 同期先ターゲットの決定
//!
//! 優先順位:
//! 1. `targets`（明示リスト）: 不明な名前は警告して読み飛ばす
//! 2. `tool`（単一指定）: 不明なら致命的エラー
//! 3. 自動検出: 0件なら単一文書ターゲット、複数なら登録順の先頭。決定は設定に保存する

use std::path::PathBuf;

use crate::config::Config;
use crate::error::{CouncilError, Result};
use crate::target::{TargetDescriptor, TargetRegistry};

/// ターゲット決定の結果
#[derive(Debug)]
pub struct Resolution<'a> {
    /// 同期するターゲット（決定順）
    pub targets: Vec<&'a TargetDescriptor>,
    /// 致命的でない警告
    pub warnings: Vec<String>,
    /// 自動検出で見つかったターゲット名（自動検出しなかった場合は空）
    pub detected: Vec<String>,
    /// 自動検出で決めたか
    pub auto_detected: bool,
    /// 決定を設定ファイルに保存できたか
    pub persisted: bool,
}

impl<'a> Resolution<'a> {
    fn explicit(targets: Vec<&'a TargetDescriptor>, warnings: Vec<String>) -> Self {
        Self {
            targets,
            warnings,
            detected: Vec::new(),
            auto_detected: false,
            persisted: false,
        }
    }

    pub fn names(&self) -> Vec<&str> {
        self.targets.iter().map(|t| t.name.as_str()).collect()
    }
}

/// ターゲットリゾルバ
pub struct TargetResolver<'a> {
    registry: &'a TargetRegistry,
    root: PathBuf,
    dry_run: bool,
}

impl<'a> TargetResolver<'a> {
    pub fn new(registry: &'a TargetRegistry, root: impl Into<PathBuf>) -> Self {
        Self {
            registry,
            root: root.into(),
            dry_run: false,
        }
    }

    /// dry-run時は自動検出の結果を保存しない
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// 同期先を決定
    ///
    /// 自動検出した場合のみ `config.tool` を書き換えて保存する。
    pub fn resolve(&self, config: &mut Config) -> Result<Resolution<'a>> {
        if !config.targets.is_empty() {
            return self.resolve_list(&config.targets);
        }

        if let Some(tool) = config.tool.as_deref().filter(|t| !t.is_empty()) {
            let target = self.registry.get(tool).ok_or_else(|| CouncilError::UnknownTool {
                name: tool.to_string(),
                known: self.registry.names().join(", "),
            })?;
            return Ok(Resolution::explicit(vec![target], Vec::new()));
        }

        self.auto_detect(config)
    }

    fn resolve_list(&self, names: &[String]) -> Result<Resolution<'a>> {
        let mut targets: Vec<&'a TargetDescriptor> = Vec::new();
        let mut warnings = Vec::new();

        for name in names {
            match self.registry.get(name) {
                Some(target) => {
                    if !targets.iter().any(|t| t.name == target.name) {
                        targets.push(target);
                    }
                }
                None => {
                    let warning = format!(
                        "unknown target '{}' ignored (known: {})",
                        name,
                        self.registry.names().join(", ")
                    );
                    tracing::warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }

        if targets.is_empty() {
            return Err(CouncilError::NoUsableTargets {
                requested: names.to_vec(),
            });
        }

        Ok(Resolution::explicit(targets, warnings))
    }

    fn auto_detect(&self, config: &mut Config) -> Result<Resolution<'a>> {
        let detected = self.registry.detect(&self.root);
        let detected_names: Vec<String> = detected.iter().map(|t| t.name.clone()).collect();
        let mut warnings = Vec::new();

        let chosen = match detected.first() {
            None => {
                let fallback = self.registry.fallback().ok_or(CouncilError::NoFallbackTarget)?;
                tracing::info!("No tool detected, falling back to {}", fallback.name);
                fallback
            }
            Some(first) => {
                if detected.len() > 1 {
                    let warning = format!(
                        "multiple tools detected ({}); using {}. Set tool = \"<name>\" in the config or pass --target to choose",
                        detected_names.join(", "),
                        first.name
                    );
                    tracing::warn!("{}", warning);
                    warnings.push(warning);
                } else {
                    tracing::info!("Detected {}", first.display_name);
                }
                *first
            }
        };

        config.tool = Some(chosen.name.clone());
        let persisted = if self.dry_run {
            tracing::info!("Dry run: not saving tool = \"{}\"", chosen.name);
            false
        } else {
            self.persist(config, &mut warnings)
        };

        Ok(Resolution {
            targets: vec![chosen],
            warnings,
            detected: detected_names,
            auto_detected: true,
            persisted,
        })
    }

    fn persist(&self, config: &Config, warnings: &mut Vec<String>) -> bool {
        match config.save() {
            Ok(()) => true,
            Err(e) => {
                let warning = format!("could not remember tool choice: {}", e);
                tracing::warn!("{}", warning);
                warnings.push(warning);
                false
            }
        }
    }
}
