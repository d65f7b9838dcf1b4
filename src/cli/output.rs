//! 色付き出力モジュール
//!
//! 同期結果、ペルソナ一覧、ターゲット一覧を色分けして表示する。
//! 行の組み立て（`*_line`）と出力（`print_*`）を分けてある。

use std::io::{self, Write};
use std::path::Path;

use crossterm::{
    execute,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor},
};

use crate::fsops::{ActionKind, FileAction};
use crate::persona::Persona;
use crate::sync::SyncReport;
use crate::target::TargetRegistry;

/// Unicodeアイコンとフォールバック文字
pub struct Icons;

impl Icons {
    /// エラーアイコン
    pub fn error() -> &'static str {
        if Self::supports_unicode() { "✗ " } else { "[!]" }
    }

    /// 警告アイコン
    pub fn warning() -> &'static str {
        if Self::supports_unicode() { "⚠ " } else { "[w]" }
    }

    /// 情報アイコン
    pub fn info() -> &'static str {
        if Self::supports_unicode() { "• " } else { "[i]" }
    }

    /// 成功アイコン
    pub fn success() -> &'static str {
        if Self::supports_unicode() { "✓ " } else { "[+]" }
    }

    /// Unicode対応チェック（環境変数でオーバーライド可能）
    fn supports_unicode() -> bool {
        if std::env::var("COUNCIL_NO_UNICODE").is_ok() {
            return false;
        }
        std::env::var("TERM").map_or(false, |term| {
            !term.contains("dumb") && !term.contains("linux")
        })
    }
}

fn print_colored(color: Color, bold: bool, label: &str, msg: &str) {
    let mut stdout = io::stdout();
    let weight = if bold { Attribute::Bold } else { Attribute::NormalIntensity };
    let _ = execute!(
        stdout,
        SetForegroundColor(color),
        SetAttribute(weight),
        Print(label),
        SetAttribute(Attribute::Reset),
        ResetColor,
        Print(format!("{}\n", msg))
    );
    let _ = stdout.flush();
}

/// エラーメッセージを赤色で標準エラーに出力
pub fn print_error(msg: &str) {
    let mut stderr = io::stderr();
    let _ = execute!(
        stderr,
        SetForegroundColor(Color::Red),
        SetAttribute(Attribute::Bold),
        Print(format!("{}error:", Icons::error())),
        SetAttribute(Attribute::Reset),
        ResetColor,
        Print(format!(" {}\n", msg))
    );
    let _ = stderr.flush();
}

/// 警告を黄色で出力
pub fn print_warning(msg: &str) {
    print_colored(Color::Yellow, true, &format!("{}warning: ", Icons::warning()), msg);
}

/// 成功メッセージを緑色で出力
pub fn print_success(msg: &str) {
    print_colored(Color::Green, true, Icons::success(), msg);
}

/// 情報メッセージをシアン色で出力
pub fn print_info(msg: &str) {
    print_colored(Color::Cyan, false, Icons::info(), msg);
}

/// ファイル操作を1行表示
pub fn print_action(action: &FileAction) {
    let color = match (action.kind, action.dry_run) {
        (_, true) => Color::DarkGrey,
        (ActionKind::Remove, false) => Color::Red,
        (ActionKind::CreateDir, false) => Color::Blue,
        (ActionKind::Write, false) => Color::Green,
    };
    print_colored(color, false, "  ", &action.to_string());
}

/// 同期結果の要約行
pub fn summary_line(report: &SyncReport) -> String {
    let names: Vec<&str> = report.targets.iter().map(|t| t.display_name.as_str()).collect();
    let verb = if report.dry_run { "Would sync" } else { "Synced" };
    format!(
        "{} {} expert{} to {}",
        verb,
        report.personas,
        if report.personas == 1 { "" } else { "s" },
        names.join(", ")
    )
}

/// 同期結果を表示
pub fn print_sync_report(report: &SyncReport) {
    for warning in &report.warnings {
        print_warning(warning);
    }

    for target in &report.targets {
        print_info(&format!("{} ({})", target.display_name, target.name));
        if target.actions.is_empty() {
            print_colored(Color::DarkGrey, false, "  ", "nothing to do");
        }
        for action in &target.actions {
            print_action(action);
        }
        for warning in &target.warnings {
            print_warning(warning);
        }
    }

    if report.dry_run {
        print_info("Dry run: no files were changed");
    }
    print_success(&summary_line(report));
}

/// ペルソナ一覧の1行
pub fn persona_line(persona: &Persona) -> String {
    let source = if persona.is_local() { "local" } else { persona.source.as_str() };
    if persona.focus.is_empty() {
        format!("{:<20} {} [{}]", persona.id, persona.name, source)
    } else {
        format!("{:<20} {}: {} [{}]", persona.id, persona.name, persona.focus, source)
    }
}

/// ペルソナ一覧を表示
pub fn print_personas(personas: &[Persona]) {
    if personas.is_empty() {
        print_warning("no experts found");
        return;
    }
    for persona in personas {
        println!("{}", persona_line(persona));
    }
}

/// ターゲット一覧の1行
pub fn target_line(name: &str, display_name: &str, detected: bool, configured: bool) -> String {
    let mut marks = Vec::new();
    if detected {
        marks.push("detected");
    }
    if configured {
        marks.push("configured");
    }
    if marks.is_empty() {
        format!("{:<10} {}", name, display_name)
    } else {
        format!("{:<10} {} ({})", name, display_name, marks.join(", "))
    }
}

/// ターゲット一覧と検出状況を表示
pub fn print_targets(registry: &TargetRegistry, root: &Path, configured: &[String]) {
    for target in registry.all() {
        let detected = target.detect(root);
        let is_configured = configured.iter().any(|c| c == &target.name);
        let line = target_line(&target.name, &target.display_name, detected, is_configured);
        if detected || is_configured {
            print_colored(Color::Green, false, "", &line);
        } else {
            println!("{}", line);
        }
    }
}

/// インストール済みコレクションを表示
pub fn print_collections(root: &Path, names: &[String]) {
    if names.is_empty() {
        print_info(&format!("no collections installed in {}", root.display()));
        return;
    }
    for name in names {
        println!("{}", name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::TargetReport;
    use std::path::PathBuf;

    #[test]
    fn test_print_functions_do_not_panic() {
        print_error("test error");
        print_warning("test warning");
        print_success("test success");
        print_info("test info");
        print_action(&FileAction {
            kind: ActionKind::Write,
            path: PathBuf::from("a.md"),
            dry_run: true,
        });
    }

    #[test]
    fn test_summary_line() {
        let report = SyncReport {
            personas: 1,
            targets: vec![TargetReport {
                name: "claude".to_string(),
                display_name: "Claude Code".to_string(),
                actions: Vec::new(),
                warnings: Vec::new(),
            }],
            warnings: Vec::new(),
            dry_run: true,
        };
        assert_eq!(summary_line(&report), "Would sync 1 expert to Claude Code");
    }

    #[test]
    fn test_persona_line_shows_source() {
        let local = Persona::new("dhh", "DHH", "Rails");
        assert!(persona_line(&local).ends_with("DHH: Rails [local]"));

        let mut installed = Persona::new("kent-beck", "Kent Beck", "");
        installed.source = "classics".to_string();
        assert!(persona_line(&installed).ends_with("Kent Beck [classics]"));
    }

    #[test]
    fn test_target_line_marks() {
        assert_eq!(target_line("codex", "Codex", false, false), "codex      Codex");
        assert_eq!(
            target_line("claude", "Claude Code", true, true),
            "claude     Claude Code (detected, configured)"
        );
    }
}
