//! /council コマンドの生成
//!
//! 骨組みテンプレートに現在のペルソナ一覧を差し込む。差し込みに失敗しても
//! 同期は止めず、最小限の固定本文にフォールバックする。

use regex::Regex;
use std::collections::HashMap;
use thiserror::Error;

use crate::persona::Persona;
use crate::target::EmbeddedTemplates;

/// コマンド名
pub const COUNCIL_COMMAND: &str = "council";

/// コマンドの説明
pub const COUNCIL_DESCRIPTION: &str = "Convene the expert council to review code";

const PLACEHOLDER_PATTERN: &str = r"\{\{\s*([#/]?)\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}";

/// テンプレート展開エラー
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TemplateError {
    #[error("unknown placeholder '{0}'")]
    UnknownPlaceholder(String),
    #[error("section '{0}' is never closed")]
    UnterminatedSection(String),
    #[error("unexpected closing tag '{0}'")]
    UnexpectedClose(String),
    #[error("template missing: {0}")]
    Missing(String),
    #[error("invalid placeholder pattern: {0}")]
    Pattern(String),
}

/// /council コマンドの生成結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CouncilCommand {
    /// テンプレートから生成
    Rendered(String),
    /// フォールバック本文
    Fallback { body: String, reason: String },
}

impl CouncilCommand {
    pub fn body(&self) -> &str {
        match self {
            CouncilCommand::Rendered(body) => body,
            CouncilCommand::Fallback { body, .. } => body,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, CouncilCommand::Fallback { .. })
    }
}

/// 埋め込みの骨組みから /council コマンド本文を生成
pub fn render_council(personas: &[Persona]) -> CouncilCommand {
    match EmbeddedTemplates::council_skeleton() {
        Some(skeleton) => render_council_with(&skeleton, personas),
        None => fallback(personas, TemplateError::Missing("council.md".to_string())),
    }
}

/// 任意の骨組みから /council コマンド本文を生成
pub fn render_council_with(skeleton: &str, personas: &[Persona]) -> CouncilCommand {
    let scope = Scope::for_council(personas);
    match render(skeleton, &scope) {
        Ok(body) => CouncilCommand::Rendered(body),
        Err(e) => fallback(personas, e),
    }
}

fn fallback(personas: &[Persona], error: TemplateError) -> CouncilCommand {
    tracing::warn!("Council template failed ({}); using fallback", error);

    let mut body = String::from(
        "# Expert Council Review\n\nReview the current change from the perspective of each expert:\n\n",
    );
    for persona in personas {
        if persona.focus.is_empty() {
            body.push_str(&format!("- {}\n", persona.name));
        } else {
            body.push_str(&format!("- {}: {}\n", persona.name, persona.focus));
        }
    }

    CouncilCommand::Fallback {
        body,
        reason: error.to_string(),
    }
}

/// 差し込み値
#[derive(Debug, Default)]
struct Scope {
    values: HashMap<String, String>,
    sections: HashMap<String, Vec<HashMap<String, String>>>,
}

impl Scope {
    fn for_council(personas: &[Persona]) -> Self {
        let mut scope = Scope::default();
        scope.values.insert("count".to_string(), personas.len().to_string());

        let experts = personas
            .iter()
            .map(|p| {
                HashMap::from([
                    ("id".to_string(), p.id.clone()),
                    ("name".to_string(), p.name.clone()),
                    ("focus".to_string(), p.focus.clone()),
                ])
            })
            .collect();
        scope.sections.insert("experts".to_string(), experts);
        scope
    }

    /// セクション内の要素用スコープ（外側の値も参照できる）
    fn child(&self, item: &HashMap<String, String>) -> Self {
        let mut values = self.values.clone();
        values.extend(item.iter().map(|(k, v)| (k.clone(), v.clone())));
        Scope {
            values,
            sections: HashMap::new(),
        }
    }
}

fn render(template: &str, scope: &Scope) -> Result<String, TemplateError> {
    let re = Regex::new(PLACEHOLDER_PATTERN).map_err(|e| TemplateError::Pattern(e.to_string()))?;
    render_scope(&re, template, scope)
}

fn render_scope(re: &Regex, template: &str, scope: &Scope) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    let mut pos = 0;

    while let Some(caps) = re.captures_at(template, pos) {
        let Some(tag) = caps.get(0) else { break };
        let sigil = caps.get(1).map_or("", |m| m.as_str());
        let name = caps.get(2).map_or("", |m| m.as_str());

        out.push_str(&template[pos..tag.start()]);

        match sigil {
            "#" => {
                let (inner_end, after) = find_close(re, template, tag.end(), name)
                    .ok_or_else(|| TemplateError::UnterminatedSection(name.to_string()))?;
                let items = scope
                    .sections
                    .get(name)
                    .ok_or_else(|| TemplateError::UnknownPlaceholder(name.to_string()))?;

                let inner = &template[tag.end()..inner_end];
                let inner = inner.strip_prefix('\n').unwrap_or(inner);
                for item in items {
                    out.push_str(&render_scope(re, inner, &scope.child(item))?);
                }

                pos = if template[after..].starts_with('\n') { after + 1 } else { after };
            }
            "/" => return Err(TemplateError::UnexpectedClose(name.to_string())),
            _ => {
                let value = scope
                    .values
                    .get(name)
                    .ok_or_else(|| TemplateError::UnknownPlaceholder(name.to_string()))?;
                out.push_str(value);
                pos = tag.end();
            }
        }
    }

    out.push_str(&template[pos..]);
    Ok(out)
}

/// 閉じタグを探す。戻り値は (内側の終端, 閉じタグの直後)
fn find_close(re: &Regex, template: &str, from: usize, name: &str) -> Option<(usize, usize)> {
    re.captures_iter(&template[from..])
        .filter(|caps| caps.get(1).map_or("", |m| m.as_str()) == "/")
        .filter(|caps| caps.get(2).map_or("", |m| m.as_str()) == name)
        .find_map(|caps| caps.get(0))
        .map(|m| (from + m.start(), from + m.end()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn personas() -> Vec<Persona> {
        vec![
            Persona::new("kent-beck", "Kent Beck", "Test-driven development"),
            Persona::new("dhh", "DHH", "Rails and majestic monoliths"),
        ]
    }

    #[test]
    fn test_render_embedded_council() {
        let command = render_council(&personas());
        assert!(!command.is_fallback());
        let body = command.body();
        assert!(body.contains("council of 2 experts"));
        assert!(body.contains("### Kent Beck"));
        assert!(body.contains("- **Focus:** Rails and majestic monoliths"));
        assert!(body.contains("`dhh`"));
        assert!(!body.contains("{{"));
    }

    #[test]
    fn test_sections_repeat_in_order() {
        let command = render_council_with("{{#experts}}\n{{name}};\n{{/experts}}\nend", &personas());
        assert_eq!(command, CouncilCommand::Rendered("Kent Beck;\nDHH;\nend".to_string()));
    }

    #[test]
    fn test_outer_values_visible_in_section() {
        let command = render_council_with("{{#experts}}{{id}}/{{count}} {{/experts}}", &personas());
        assert_eq!(command.body(), "kent-beck/2 dhh/2 ");
    }

    #[test]
    fn test_unknown_placeholder_falls_back() {
        let command = render_council_with("Hello {{nope}}", &personas());
        assert!(command.is_fallback());
        assert!(command.body().contains("- Kent Beck: Test-driven development"));
        assert!(command.body().contains("- DHH: Rails and majestic monoliths"));
    }

    #[test]
    fn test_unterminated_section_falls_back() {
        let command = render_council_with("{{#experts}}{{name}}", &personas());
        match command {
            CouncilCommand::Fallback { reason, .. } => assert!(reason.contains("never closed")),
            other => panic!("expected fallback, got {:?}", other),
        }
    }

    #[test]
    fn test_stray_close_falls_back() {
        let command = render_council_with("{{/experts}}", &personas());
        assert!(command.is_fallback());
    }
}
