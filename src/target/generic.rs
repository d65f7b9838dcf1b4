//! 汎用ターゲット（AGENTS.md）
//!
//! 全ペルソナをプロジェクトルートの1文書にまとめる。コマンドは書かない。
//! どのツールも検出されなかった場合のフォールバック先。

use std::path::Path;

use super::render::{anchor, push_items};
use super::{Formatter, TargetDescriptor};
use crate::persona::Persona;

pub const NAME: &str = "generic";

/// 出力ファイル名
pub const DOCUMENT_FILE: &str = "AGENTS.md";

const INTRO: &str = "This project reviews changes with the expert personas below. \
When asked for a council review, evaluate the change from each expert's perspective in turn, \
then summarize where they agree and disagree.";

pub struct GenericFormatter;

impl Formatter for GenericFormatter {
    fn format_agent(&self, persona: &Persona) -> String {
        let mut out = format!("## {}\n<!-- expert: {} -->\n", persona.name, persona.id);

        if !persona.focus.is_empty() {
            out.push_str(&format!("\n**Focus:** {}\n", persona.focus));
        }
        if !persona.philosophy.is_empty() {
            out.push_str(&format!("\n**Philosophy:** {}\n", persona.philosophy));
        }
        if !persona.principles.is_empty() {
            out.push_str("\n**Principles:**\n\n");
            push_items(&mut out, &persona.principles);
        }
        if !persona.red_flags.is_empty() {
            out.push_str("\n**Red Flags:**\n\n");
            push_items(&mut out, &persona.red_flags);
        }
        out
    }

    fn format_command(&self, _name: &str, _description: &str, _body: &str) -> Option<String> {
        None
    }

    fn format_document(&self, personas: &[Persona]) -> String {
        let mut out = format!("# Expert Council\n\n{}\n\n## Experts\n\n", INTRO);
        for persona in personas {
            if persona.focus.is_empty() {
                out.push_str(&format!("- [{}](#{})\n", persona.name, anchor(&persona.name)));
            } else {
                out.push_str(&format!(
                    "- [{}](#{}) — {}\n",
                    persona.name,
                    anchor(&persona.name),
                    persona.focus
                ));
            }
        }
        for persona in personas {
            out.push('\n');
            out.push_str(&self.format_agent(persona));
        }
        out
    }
}

fn detect(root: &Path) -> bool {
    root.join(DOCUMENT_FILE).is_file()
}

pub fn descriptor() -> TargetDescriptor {
    TargetDescriptor::single_document(NAME, "Generic (AGENTS.md)", DOCUMENT_FILE, GenericFormatter)
        .with_detect(detect)
        .with_deprecated(["COUNCIL.md"])
}
