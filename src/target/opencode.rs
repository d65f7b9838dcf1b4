//! OpenCode
//!
//! `.opencode/agent/` にサブエージェント、`.opencode/command/` にコマンドを書く。

use std::path::Path;

use super::render::{header, push_body, push_list, push_section};
use super::{EmbeddedTemplates, Formatter, TargetDescriptor};
use crate::persona::Persona;

pub const NAME: &str = "opencode";

pub struct OpenCodeFormatter;

impl Formatter for OpenCodeFormatter {
    fn format_agent(&self, persona: &Persona) -> String {
        let mut out = header(&[
            ("name", &persona.id),
            ("description", &persona.focus),
            ("mode", "subagent"),
        ]);
        out.push_str(&format!("\n# {}\n\n", persona.name));
        if persona.focus.is_empty() {
            out.push_str(&format!("Review the work the way {} would.\n", persona.name));
        } else {
            out.push_str(&format!(
                "Review the work the way {} would. Focus: {}.\n",
                persona.name, persona.focus
            ));
        }
        push_section(&mut out, "Philosophy", &persona.philosophy);
        push_list(&mut out, "Principles", &persona.principles);
        push_list(&mut out, "Red Flags to Watch For", &persona.red_flags);
        push_body(&mut out, &persona.body);
        out
    }

    fn format_command(&self, _name: &str, description: &str, body: &str) -> Option<String> {
        Some(format!("{}\n{}", header(&[("description", description)]), body))
    }
}

fn detect(root: &Path) -> bool {
    root.join(".opencode").is_dir() || root.join("opencode.json").is_file()
}

pub fn descriptor() -> TargetDescriptor {
    TargetDescriptor::per_file(NAME, "OpenCode", ".opencode/agent", ".opencode/command", OpenCodeFormatter)
        .with_detect(detect)
        .with_deprecated([".opencode/experts"])
        .with_templates(EmbeddedTemplates::commands_for(NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_yaml::{Mapping, Value};

    use crate::target::render::agent_identity;
    use crate::persona::document::split_header;

    #[test]
    fn test_agent_is_subagent() {
        let persona = Persona::new("sandi-metz", "Sandi Metz", "Object-oriented design")
            .with_red_flags(["Long methods"]);
        let doc = OpenCodeFormatter.format_agent(&persona);

        let (yaml, body) = split_header(&doc).unwrap();
        let mapping: Mapping = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(mapping.get("mode").and_then(Value::as_str), Some("subagent"));
        assert_eq!(
            mapping.get("description").and_then(Value::as_str),
            Some("Object-oriented design")
        );
        assert!(body.starts_with("# Sandi Metz\n"));
        assert!(body.contains("## Red Flags to Watch For\n\n- Long methods\n"));
    }

    #[test]
    fn test_agent_round_trips_identity() {
        let persona = Persona::new("kent-beck", "Kent Beck", "TDD: red, green, refactor");
        let doc = OpenCodeFormatter.format_agent(&persona);

        let (id, name, focus) = agent_identity(&doc);
        assert_eq!(id, "kent-beck");
        assert_eq!(name, "Kent Beck");
        assert_eq!(focus, "TDD: red, green, refactor");
    }

    #[test]
    fn test_empty_lists_have_no_headings() {
        let doc = OpenCodeFormatter.format_agent(&Persona::new("a", "A", "b"));
        assert!(!doc.contains("Principles"));
        assert!(!doc.contains("Red Flags"));
    }

    #[test]
    fn test_descriptor_layout() {
        let target = descriptor();
        assert_eq!(target.agents_dir(), ".opencode/agent");
        assert_eq!(target.commands_dir(), ".opencode/command");
        assert!(target.templates.contains_key("review"));
    }
}
