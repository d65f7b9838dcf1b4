//! フォーマッタ共通の文書組み立てヘルパー

use serde_yaml::{Mapping, Value};

/// YAMLヘッダー（---で囲む）を生成
///
/// キーは渡した順に出力する。値は必要に応じてクォートされる。
pub fn header(pairs: &[(&str, &str)]) -> String {
    let mut mapping = Mapping::new();
    for (key, value) in pairs {
        mapping.insert(Value::from(*key), Value::from(*value));
    }
    let yaml = serde_yaml::to_string(&mapping).unwrap_or_default();
    format!("---\n{}---\n", yaml)
}

/// 見出し付き段落。本文が空なら何も出力しない
pub fn push_section(out: &mut String, heading: &str, text: &str) {
    let text = text.trim();
    if text.is_empty() {
        return;
    }
    out.push_str(&format!("\n## {}\n\n{}\n", heading, text));
}

/// 見出し付き箇条書き。項目が無ければ何も出力しない
pub fn push_list(out: &mut String, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    out.push_str(&format!("\n## {}\n\n", heading));
    push_items(out, items);
}

/// 箇条書きの行のみ
pub fn push_items(out: &mut String, items: &[String]) {
    for item in items {
        out.push_str(&format!("- {}\n", item.trim()));
    }
}

/// ペルソナ本文をそのまま追記
pub fn push_body(out: &mut String, body: &str) {
    if body.trim().is_empty() {
        return;
    }
    out.push('\n');
    out.push_str(body.trim_end());
    out.push('\n');
}

/// 見出しのアンカー（GitHub形式）
pub fn anchor(heading: &str) -> String {
    heading
        .trim()
        .to_lowercase()
        .chars()
        .filter_map(|c| match c {
            ' ' => Some('-'),
            c if c.is_alphanumeric() || c == '-' || c == '_' => Some(c),
            _ => None,
        })
        .collect()
}

/// エージェント文書から (ヘッダーのname, 最初の `# ` 見出し, description) を読み戻す
#[cfg(test)]
pub(crate) fn agent_identity(doc: &str) -> (String, String, String) {
    let (yaml, body) = crate::persona::document::split_header(doc).unwrap();
    let mapping: Mapping = serde_yaml::from_str(yaml).unwrap();
    let field = |key: &str| {
        mapping
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    let heading = body
        .lines()
        .find_map(|line| line.strip_prefix("# "))
        .unwrap_or_default()
        .to_string();
    (field("name"), heading, field("description"))
}
