//! Codex CLI
//!
//! エージェントもコマンドも `.codex/prompts/` に置くカスタムプロンプトとして書く。

use std::path::Path;

use super::render::{header, push_body, push_list, push_section};
use super::{EmbeddedTemplates, Formatter, TargetDescriptor};
use crate::persona::Persona;

pub const NAME: &str = "codex";

const PROMPTS_DIR: &str = ".codex/prompts";

pub struct CodexFormatter;

impl Formatter for CodexFormatter {
    fn format_agent(&self, persona: &Persona) -> String {
        let description = if persona.focus.is_empty() {
            persona.name.clone()
        } else {
            format!("{}: {}", persona.name, persona.focus)
        };

        let mut out = header(&[("name", &persona.id), ("description", &description)]);
        out.push_str(&format!("\n# {}\n\n", persona.name));
        if persona.focus.is_empty() {
            out.push_str(&format!(
                "Adopt the perspective of {} for the rest of this session.\n",
                persona.name
            ));
        } else {
            out.push_str(&format!(
                "Adopt the perspective of {} ({}) for the rest of this session.\n",
                persona.name, persona.focus
            ));
        }
        push_section(&mut out, "Philosophy", &persona.philosophy);
        push_list(&mut out, "Principles", &persona.principles);
        push_list(&mut out, "Red Flags", &persona.red_flags);
        push_body(&mut out, &persona.body);
        out
    }

    fn format_command(&self, _name: &str, description: &str, body: &str) -> Option<String> {
        Some(format!(
            "{}\n{}",
            header(&[("description", description), ("argument-hint", "[focus]")]),
            body
        ))
    }
}

fn detect(root: &Path) -> bool {
    root.join(".codex").is_dir()
}

pub fn descriptor() -> TargetDescriptor {
    TargetDescriptor::per_file(NAME, "Codex CLI", PROMPTS_DIR, PROMPTS_DIR, CodexFormatter)
        .with_detect(detect)
        .with_templates(EmbeddedTemplates::commands_for(NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_yaml::{Mapping, Value};

    use crate::target::render::agent_identity;
    use crate::persona::document::split_header;

    #[test]
    fn test_agent_description_combines_name_and_focus() {
        let doc = CodexFormatter.format_agent(&Persona::new("kent-beck", "Kent Beck", "TDD"));
        let (yaml, body) = split_header(&doc).unwrap();
        let mapping: Mapping = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(mapping.get("description").and_then(Value::as_str), Some("Kent Beck: TDD"));
        assert!(body.contains("Adopt the perspective of Kent Beck (TDD)"));
    }

    #[test]
    fn test_agent_round_trips_identity() {
        let persona = Persona::new("kent-beck", "Kent Beck", "TDD: red, green, refactor");
        let doc = CodexFormatter.format_agent(&persona);

        let (id, name, description) = agent_identity(&doc);
        assert_eq!(id, "kent-beck");
        assert_eq!(name, "Kent Beck");
        let focus = description.strip_prefix(&format!("{}: ", name)).unwrap();
        assert_eq!(focus, "TDD: red, green, refactor");
    }

    #[test]
    fn test_command_has_argument_hint() {
        let doc = CodexFormatter.format_command("review", "Review", "body").unwrap();
        let (yaml, body) = split_header(&doc).unwrap();
        let mapping: Mapping = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(mapping.get("argument-hint").and_then(Value::as_str), Some("[focus]"));
        assert_eq!(body, "body");
    }

    #[test]
    fn test_shares_directory_for_agents_and_commands() {
        let target = descriptor();
        assert_eq!(target.agents_dir(), target.commands_dir());
        assert!(target.deprecated_paths.is_empty());
    }
}
