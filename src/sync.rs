//! 同期オーケストレータ
//!
//! ペルソナ読み込み → ターゲット決定 → ターゲットごとに
//! エージェント/コマンド書き込み → （clean時）古いファイルの削除 → 非推奨パスの確認。
//! どれか1つのターゲットが失敗したら、そのターゲット名を付けて全体を中断する。

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::config::{Config, SyncOptions};
use crate::error::{CouncilError, Result};
use crate::fsops::{FileAction, FileOps};
use crate::persona::Persona;
use crate::resolve::TargetResolver;
use crate::target::{split_command_template, Layout, TargetDescriptor, TargetRegistry};
use crate::template::{render_council, CouncilCommand, COUNCIL_COMMAND, COUNCIL_DESCRIPTION};

/// ターゲット1件分の結果
#[derive(Debug, Clone)]
pub struct TargetReport {
    pub name: String,
    pub display_name: String,
    pub actions: Vec<FileAction>,
    pub warnings: Vec<String>,
}

impl TargetReport {
    fn new(target: &TargetDescriptor) -> Self {
        Self {
            name: target.name.clone(),
            display_name: target.display_name.clone(),
            actions: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn record(&mut self, action: Option<FileAction>) {
        if let Some(action) = action {
            self.actions.push(action);
        }
    }

    fn warn(&mut self, warning: String) {
        tracing::warn!("{}", warning);
        self.warnings.push(warning);
    }
}

/// 同期全体の結果
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    /// 同期したペルソナ数
    pub personas: usize,
    /// ターゲットごとの結果（同期順）
    pub targets: Vec<TargetReport>,
    /// ターゲットに属さない警告（ターゲット決定、テンプレートなど）
    pub warnings: Vec<String>,
    pub dry_run: bool,
}

impl SyncReport {
    /// 全ターゲットの操作
    pub fn actions(&self) -> impl Iterator<Item = &FileAction> {
        self.targets.iter().flat_map(|t| t.actions.iter())
    }

    /// 全警告
    pub fn all_warnings(&self) -> impl Iterator<Item = &String> {
        self.warnings
            .iter()
            .chain(self.targets.iter().flat_map(|t| t.warnings.iter()))
    }
}

/// コマンド名からファイル名を導出
pub fn command_file_name(name: &str) -> String {
    format!("{}.md", name)
}

/// ターゲットが書くコマンドファイル名（/council と追加コマンド）
fn command_file_names(target: &TargetDescriptor) -> HashSet<String> {
    std::iter::once(COUNCIL_COMMAND)
        .chain(target.templates.keys().map(String::as_str))
        .map(command_file_name)
        .collect()
}

/// 同期オーケストレータ
pub struct Syncer<'a> {
    registry: &'a TargetRegistry,
    root: PathBuf,
    options: SyncOptions,
}

impl<'a> Syncer<'a> {
    pub fn new(registry: &'a TargetRegistry, root: impl Into<PathBuf>, options: SyncOptions) -> Self {
        Self {
            registry,
            root: root.into(),
            options,
        }
    }

    /// 設定に従って読み込みから同期までを実行
    pub async fn run(&self, config: &mut Config) -> Result<SyncReport> {
        let personas = config.persona_store(&self.root).list().await;
        if personas.is_empty() {
            return Err(CouncilError::NoPersonas {
                hint: config.sources.experts_dir.clone(),
            });
        }

        let resolution = TargetResolver::new(self.registry, &self.root)
            .with_dry_run(self.options.dry_run)
            .resolve(config)?;

        let mut report = self.sync(&personas, &resolution.targets).await?;
        report.warnings.splice(0..0, resolution.warnings);
        Ok(report)
    }

    /// 指定ターゲットへ同期
    pub async fn sync(&self, personas: &[Persona], targets: &[&TargetDescriptor]) -> Result<SyncReport> {
        if personas.is_empty() {
            return Err(CouncilError::NoPersonas {
                hint: "the experts directory".to_string(),
            });
        }

        let mut report = SyncReport {
            personas: personas.len(),
            dry_run: self.options.dry_run,
            ..SyncReport::default()
        };

        let council = render_council(personas);
        if let CouncilCommand::Fallback { reason, .. } = &council {
            report
                .warnings
                .push(format!("council template failed ({}); wrote a minimal /council", reason));
        }

        for target in targets {
            let target_report = self
                .sync_target(personas, target, &council)
                .await
                .map_err(|e| e.in_target(&target.name))?;
            tracing::info!(
                "Synced {} experts to {} ({} changes)",
                personas.len(),
                target.display_name,
                target_report.actions.len()
            );
            report.targets.push(target_report);
        }

        Ok(report)
    }

    async fn sync_target(
        &self,
        personas: &[Persona],
        target: &TargetDescriptor,
        council: &CouncilCommand,
    ) -> Result<TargetReport> {
        let ops = FileOps::new(&self.root, self.options.dry_run);
        let mut report = TargetReport::new(target);

        match &target.layout {
            Layout::SingleDocument { file } => {
                let document = target.formatter().format_document(personas);
                report.actions.push(ops.write(Path::new(file), &document).await?);
            }
            Layout::PerFile {
                agents_dir,
                commands_dir,
            } => {
                let agents_dir = Path::new(agents_dir);
                let commands_dir = Path::new(commands_dir);

                // エージェントとコマンドが同じディレクトリならコマンド名のIDは書けない
                let reserved = if commands_dir == agents_dir {
                    command_file_names(target)
                } else {
                    HashSet::new()
                };

                report.record(ops.ensure_dir(agents_dir).await?);
                for persona in personas {
                    if reserved.contains(&persona.file_name()) {
                        report.warn(format!(
                            "expert '{}' skipped for {}: {} is a command file there",
                            persona.id,
                            target.display_name,
                            persona.file_name()
                        ));
                        continue;
                    }
                    let document = target.formatter().format_agent(persona);
                    let path = agents_dir.join(persona.file_name());
                    report.actions.push(ops.write(&path, &document).await?);
                }

                if commands_dir != agents_dir {
                    report.record(ops.ensure_dir(commands_dir).await?);
                }
                self.write_commands(&ops, target, commands_dir, council, &mut report)
                    .await?;

                if self.options.clean {
                    self.remove_stale(&ops, target, agents_dir, personas, &mut report)
                        .await?;
                }
            }
        }

        self.check_deprecated(&ops, target, &mut report).await?;
        Ok(report)
    }

    /// /council と追加コマンドを書く。フォーマッタが `None` を返したコマンドは書かない
    async fn write_commands(
        &self,
        ops: &FileOps,
        target: &TargetDescriptor,
        commands_dir: &Path,
        council: &CouncilCommand,
        report: &mut TargetReport,
    ) -> Result<()> {
        let formatter = target.formatter();

        match formatter.format_command(COUNCIL_COMMAND, COUNCIL_DESCRIPTION, council.body()) {
            Some(document) => {
                let path = commands_dir.join(command_file_name(COUNCIL_COMMAND));
                report.actions.push(ops.write(&path, &document).await?);
            }
            None => tracing::debug!("{} declines /{}", target.name, COUNCIL_COMMAND),
        }

        for (name, raw) in &target.templates {
            if name == COUNCIL_COMMAND {
                continue;
            }
            let (description, body) = split_command_template(raw);
            match formatter.format_command(name, &description, &body) {
                Some(document) => {
                    let path = commands_dir.join(command_file_name(name));
                    report.actions.push(ops.write(&path, &document).await?);
                }
                None => tracing::debug!("{} declines /{}", target.name, name),
            }
        }

        Ok(())
    }

    /// エージェントディレクトリから古い生成ファイルを削除
    ///
    /// 現在のペルソナのファイルとコマンドファイルは残す。
    async fn remove_stale(
        &self,
        ops: &FileOps,
        target: &TargetDescriptor,
        agents_dir: &Path,
        personas: &[Persona],
        report: &mut TargetReport,
    ) -> Result<()> {
        let mut keep = command_file_names(target);
        keep.extend(personas.iter().map(Persona::file_name));

        for file_name in markdown_files(&self.root.join(agents_dir))? {
            if keep.contains(&file_name) {
                continue;
            }
            tracing::info!("Removing stale {} from {}", file_name, agents_dir.display());
            report.record(ops.remove(&agents_dir.join(&file_name)).await?);
        }

        Ok(())
    }

    /// 非推奨パスを警告、clean時は削除
    async fn check_deprecated(
        &self,
        ops: &FileOps,
        target: &TargetDescriptor,
        report: &mut TargetReport,
    ) -> Result<()> {
        for deprecated in &target.deprecated_paths {
            let rel = Path::new(deprecated);
            if !self.root.join(rel).exists() {
                continue;
            }
            if self.options.clean {
                report.record(ops.remove(rel).await?);
            } else {
                report.warn(format!(
                    "deprecated path {} found for {}; re-run with --clean to remove it",
                    deprecated, target.display_name
                ));
            }
        }
        Ok(())
    }
}

/// ディレクトリ直下の `*.md` ファイル名（名前順）
fn markdown_files(dir: &Path) -> Result<Vec<String>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let pattern = format!("{}/*.md", glob::Pattern::escape(&dir.to_string_lossy()));
    let paths = glob::glob(&pattern).map_err(|e| {
        CouncilError::io(
            "invalid listing pattern for",
            dir,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()),
        )
    })?;

    let mut names: Vec<String> = paths
        .flatten()
        .filter(|path| path.is_file())
        .filter_map(|path| path.file_name().and_then(|s| s.to_str()).map(str::to_string))
        .collect();
    names.sort();
    Ok(names)
}
