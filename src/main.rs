use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use council::{
    cli::{print_collections, print_error, print_personas, print_sync_report, print_targets},
    config::Config,
    SyncOptions, Syncer, TargetRegistry,
};

#[derive(Parser, Debug)]
#[command(name = "council")]
#[command(about = "エキスパートペルソナをAIコーディングツールの設定に同期")]
#[command(version)]
struct Args {
    /// 設定ファイルパス（既定: <root>/.council/config.toml、環境変数 COUNCIL_CONFIG で上書き）
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// プロジェクトルートディレクトリ
    #[arg(short, long)]
    root: Option<PathBuf>,

    /// 詳細ログを表示 (INFO level)
    #[arg(long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<CommandKind>,
}

#[derive(Subcommand, Debug)]
enum CommandKind {
    /// ペルソナを同期先ツールに書き出す（既定のサブコマンド）
    Sync {
        /// 変更せず、予定の操作だけ表示
        #[arg(long)]
        dry_run: bool,

        /// 古い生成ファイルと非推奨パスを削除
        #[arg(long)]
        clean: bool,

        /// 同期先ツール（複数指定可、設定より優先）
        #[arg(short, long = "target")]
        targets: Vec<String>,
    },
    /// 読み込まれるペルソナを一覧表示
    List {
        /// JSONで出力
        #[arg(long)]
        json: bool,
    },
    /// 対応ツールと検出状況を表示
    Targets,
    /// インストール済みコレクションを表示
    Collections,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // トレーシング初期化（デフォルトはWARN、--verboseでINFO）
    let default_level = if args.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(args).await {
        print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let root = match args.root {
        Some(root) => root,
        None => std::env::current_dir().context("Failed to determine current directory")?,
    };
    let config_path = args
        .config
        .unwrap_or_else(|| Config::default_config_path(&root));
    let mut config = Config::load_or_default(&config_path)?;

    tracing::info!("council v{} starting...", council::VERSION);
    tracing::info!("Project root: {}", root.display());

    let registry = TargetRegistry::builtin();

    match args.command.unwrap_or(CommandKind::Sync {
        dry_run: false,
        clean: false,
        targets: Vec::new(),
    }) {
        CommandKind::Sync {
            dry_run,
            clean,
            targets,
        } => {
            if !targets.is_empty() {
                config.targets = targets;
            }
            let options = SyncOptions { dry_run, clean };
            let report = Syncer::new(&registry, &root, options).run(&mut config).await?;
            print_sync_report(&report);
        }
        CommandKind::List { json } => {
            let personas = config.persona_store(&root).list().await;
            if json {
                println!("{}", serde_json::to_string_pretty(&personas)?);
            } else {
                print_personas(&personas);
            }
        }
        CommandKind::Targets => {
            let mut configured = config.targets.clone();
            configured.extend(config.tool.clone());
            print_targets(&registry, &root, &configured);
        }
        CommandKind::Collections => match config.collections() {
            Some(collections) => print_collections(collections.root(), &collections.names()),
            None => tracing::warn!("No home directory; cannot locate installed collections"),
        },
    }

    Ok(())
}
