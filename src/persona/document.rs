use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::{CouncilError, Result};

/// ヘッダーの開始/終了マーカー行
const HEADER_DELIMITER: &str = "---";

/// ペルソナ文書のヘッダー（YAML）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct PersonaHeader {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    focus: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    philosophy: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    principles: Vec<String>,
    #[serde(default, alias = "redFlags", skip_serializing_if = "Vec::is_empty")]
    red_flags: Vec<String>,
}

/// エキスパートペルソナ
///
/// 読み込み後は変更しない。同期1回ごとにディスクから読み直す。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Persona {
    /// 出力ファイル名の元になる識別子
    pub id: String,
    /// 表示名
    pub name: String,
    /// 専門分野（1行）
    pub focus: String,
    /// 思想（空なら省略）
    pub philosophy: String,
    /// 原則（順序に意味がある）
    pub principles: Vec<String>,
    /// 警戒すべきパターン
    pub red_flags: Vec<String>,
    /// ヘッダー以降の本文（そのまま保持）
    pub body: String,
    /// 出所: プロジェクトローカルは空文字、それ以外はコレクション名
    pub source: String,
    /// 読み込み元のファイルパス
    pub path: PathBuf,
}

impl Persona {
    /// 最小限のフィールドでペルソナを作成
    pub fn new(id: impl Into<String>, name: impl Into<String>, focus: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            focus: focus.into(),
            philosophy: String::new(),
            principles: Vec::new(),
            red_flags: Vec::new(),
            body: String::new(),
            source: String::new(),
            path: PathBuf::new(),
        }
    }

    pub fn with_philosophy(mut self, philosophy: impl Into<String>) -> Self {
        self.philosophy = philosophy.into();
        self
    }

    pub fn with_principles<I, S>(mut self, principles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.principles = principles.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_red_flags<I, S>(mut self, red_flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.red_flags = red_flags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// ペルソナファイルを読み込み
    pub async fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| CouncilError::io("failed to read", path, e))?;
        Self::parse(&content, path)
    }

    /// 文書をパース
    ///
    /// ヘッダーが無い、または閉じられていない場合はエラー。
    /// `id` が省略されていればファイル名（拡張子なし）を使う。
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let (header, body) = split_header(content).map_err(|msg| CouncilError::parse(path, msg))?;

        let header: PersonaHeader = serde_yaml::from_str(header)
            .map_err(|e| CouncilError::parse(path, format!("invalid header: {}", e)))?;

        let id = match header.id {
            Some(id) if !id.trim().is_empty() => id.trim().to_string(),
            _ => path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default()
                .to_string(),
        };

        if id.is_empty() {
            return Err(CouncilError::parse(path, "missing id"));
        }
        if !is_safe_id(&id) {
            return Err(CouncilError::parse(path, format!("id '{}' is not a valid file name", id)));
        }
        if header.name.trim().is_empty() {
            return Err(CouncilError::parse(path, "missing name"));
        }

        Ok(Self {
            id,
            name: header.name.trim().to_string(),
            focus: header.focus.trim().to_string(),
            philosophy: header.philosophy.trim().to_string(),
            principles: header.principles,
            red_flags: header.red_flags,
            body: body.to_string(),
            source: String::new(),
            path: path.to_path_buf(),
        })
    }

    /// フィールドからペルソナ文書を再生成
    pub fn to_document(&self) -> String {
        let header = PersonaHeader {
            id: Some(self.id.clone()),
            name: self.name.clone(),
            focus: self.focus.clone(),
            philosophy: self.philosophy.clone(),
            principles: self.principles.clone(),
            red_flags: self.red_flags.clone(),
        };
        let yaml = serde_yaml::to_string(&header).unwrap_or_default();
        format!("{HEADER_DELIMITER}\n{}{HEADER_DELIMITER}\n{}", yaml, self.body)
    }

    /// エージェントファイル名
    pub fn file_name(&self) -> String {
        agent_file_name(&self.id)
    }

    /// プロジェクトローカルのペルソナか
    pub fn is_local(&self) -> bool {
        self.source.is_empty()
    }
}

/// ペルソナIDからエージェントファイル名を導出
///
/// ファイル生成とクリーンアップの両方がこの関数を使うこと。
pub fn agent_file_name(id: &str) -> String {
    format!("{}.md", id)
}

/// パス区切りを含まないか
fn is_safe_id(id: &str) -> bool {
    id != "." && id != ".." && !id.contains('/') && !id.contains('\\')
}

/// ヘッダーと本文に分割
pub(crate) fn split_header(content: &str) -> std::result::Result<(&str, &str), String> {
    let content = content.trim_start_matches(['\n', '\r']);

    let rest = content
        .strip_prefix(HEADER_DELIMITER)
        .and_then(strip_line_end)
        .ok_or_else(|| "missing header (document must start with ---)".to_string())?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end_matches(['\n', '\r']) == HEADER_DELIMITER {
            let header = &rest[..offset];
            let body = &rest[offset + line.len()..];
            let body = strip_line_end(body).unwrap_or(body);
            return Ok((header, body));
        }
        offset += line.len();
    }

    Err("unterminated header (missing closing ---)".to_string())
}

fn strip_line_end(s: &str) -> Option<&str> {
    s.strip_prefix("\r\n").or_else(|| s.strip_prefix('\n'))
}
