//! Claude Code
//!
//! `.claude/agents/<id>.md` にサブエージェント、`.claude/commands/` にスラッシュコマンドを書く。

use std::path::Path;

use super::render::{header, push_body, push_list, push_section};
use super::{EmbeddedTemplates, Formatter, TargetDescriptor};
use crate::persona::Persona;

pub const NAME: &str = "claude";

/// Claude Code用フォーマッタ
pub struct ClaudeFormatter;

impl Formatter for ClaudeFormatter {
    fn format_agent(&self, persona: &Persona) -> String {
        let description = if persona.focus.is_empty() {
            persona.name.as_str()
        } else {
            persona.focus.as_str()
        };

        let mut out = header(&[("name", &persona.id), ("description", description)]);
        out.push_str(&format!("\n# {}\n\n", persona.name));
        if persona.focus.is_empty() {
            out.push_str(&format!("You are {}, reviewing code.\n", persona.name));
        } else {
            out.push_str(&format!(
                "You are {}, reviewing code with a focus on {}.\n",
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
        Some(format!("{}\n{}", header(&[("description", description)]), body))
    }
}

fn detect(root: &Path) -> bool {
    root.join(".claude").is_dir() || root.join("CLAUDE.md").is_file()
}

pub fn descriptor() -> TargetDescriptor {
    TargetDescriptor::per_file(NAME, "Claude Code", ".claude/agents", ".claude/commands", ClaudeFormatter)
        .with_detect(detect)
        .with_deprecated([".claude/council"])
        .with_templates(EmbeddedTemplates::commands_for(NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_yaml::{Mapping, Value};
    use tempfile::tempdir;

    use crate::target::render::agent_identity;
    use crate::persona::document::split_header;

    #[test]
    fn test_agent_header_round_trips_identity() {
        let persona = Persona::new("kent-beck", "Kent Beck", "TDD: red, green, refactor");
        let doc = ClaudeFormatter.format_agent(&persona);

        let (yaml, body) = split_header(&doc).unwrap();
        let mapping: Mapping = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(mapping.get("name").and_then(Value::as_str), Some("kent-beck"));
        assert_eq!(
            mapping.get("description").and_then(Value::as_str),
            Some("TDD: red, green, refactor")
        );
        assert!(body.contains("# Kent Beck\n"));

        let (id, name, focus) = agent_identity(&doc);
        assert_eq!(
            (id.as_str(), name.as_str(), focus.as_str()),
            ("kent-beck", "Kent Beck", "TDD: red, green, refactor")
        );
    }

    #[test]
    fn test_agent_sections_in_order() {
        let persona = Persona::new("dhh", "DHH", "Rails")
            .with_philosophy("Convention over configuration.")
            .with_principles(["Majestic monolith", "No premature abstraction"])
            .with_red_flags(["Microservices for a CRUD app"])
            .with_body("## Extra\n\nMore guidance.\n");
        let doc = ClaudeFormatter.format_agent(&persona);

        let philosophy = doc.find("## Philosophy").unwrap();
        let principles = doc.find("## Principles").unwrap();
        let red_flags = doc.find("## Red Flags").unwrap();
        let extra = doc.find("## Extra").unwrap();
        assert!(philosophy < principles && principles < red_flags && red_flags < extra);
        assert!(doc.contains("- Majestic monolith\n- No premature abstraction\n"));
    }

    #[test]
    fn test_empty_lists_have_no_headings() {
        let persona = Persona::new("min", "Minimal", "Nothing else");
        let doc = ClaudeFormatter.format_agent(&persona);
        assert!(!doc.contains("Principles"));
        assert!(!doc.contains("Red Flags"));
        assert!(!doc.contains("Philosophy"));
    }

    #[test]
    fn test_command_has_description_header() {
        let doc = ClaudeFormatter.format_command("review", "Review code", "Body $ARGUMENTS\n").unwrap();
        assert_eq!(doc, "---\ndescription: Review code\n---\n\nBody $ARGUMENTS\n");
    }

    #[test]
    fn test_detect() {
        let dir = tempdir().unwrap();
        assert!(!detect(dir.path()));
        std::fs::write(dir.path().join("CLAUDE.md"), "# notes").unwrap();
        assert!(detect(dir.path()));
    }
}
