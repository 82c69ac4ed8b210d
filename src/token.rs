//! Markdown token tree consumed by the document builder.
//!
//! The shape mirrors what a typical Markdown lexer hands out (`type`-tagged
//! nodes carrying raw inline text), so a JSON dump from such a lexer can be
//! deserialized straight into [`Token`]. Unknown node types are kept as
//! [`Token::Other`] instead of failing.

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawToken")]
pub enum Token {
    /// Blank lines between blocks.
    Space,
    Heading {
        depth: u8,
        text: String,
    },
    Paragraph {
        text: String,
    },
    Blockquote {
        tokens: Vec<Token>,
    },
    List {
        ordered: bool,
        items: Vec<ListItem>,
    },
    /// A list item outside of a list. Only reachable from hand-built trees.
    ListItem(ListItem),
    Code {
        text: String,
    },
    Codespan {
        text: String,
    },
    Table {
        /// Cell texts, header row first.
        rows: Vec<Vec<String>>,
    },
    Rule,
    /// Raw HTML, never rendered.
    Html {
        text: String,
    },
    Text {
        text: String,
    },
    Strong {
        text: String,
    },
    Em {
        text: String,
    },
    Other {
        kind: String,
        text: Option<String>,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "RawToken")]
pub struct ListItem {
    /// Inline text of the item itself, without nested blocks.
    pub text: String,
    /// Child blocks. The first one usually repeats `text`.
    pub tokens: Vec<Token>,
    /// Declared number for ordered lists.
    pub start: Option<u32>,
}

impl ListItem {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_tokens(self, tokens: Vec<Token>) -> Self {
        Self { tokens, ..self }
    }

    pub fn with_start(self, start: u32) -> Self {
        Self {
            start: Some(start),
            ..self
        }
    }
}

impl Token {
    /// The `text` field, for kinds that carry one.
    pub fn text(&self) -> Option<&str> {
        match self {
            Token::Heading { text, .. }
            | Token::Paragraph { text }
            | Token::Code { text }
            | Token::Codespan { text }
            | Token::Html { text }
            | Token::Text { text }
            | Token::Strong { text }
            | Token::Em { text } => Some(text),
            Token::ListItem(item) => Some(&item.text),
            Token::Other { text, .. } => text.as_deref(),
            Token::Space
            | Token::Blockquote { .. }
            | Token::List { .. }
            | Token::Table { .. }
            | Token::Rule => None,
        }
    }

    pub fn kind(&self) -> &str {
        match self {
            Token::Space => "space",
            Token::Heading { .. } => "heading",
            Token::Paragraph { .. } => "paragraph",
            Token::Blockquote { .. } => "blockquote",
            Token::List { .. } => "list",
            Token::ListItem(_) => "list_item",
            Token::Code { .. } => "code",
            Token::Codespan { .. } => "codespan",
            Token::Table { .. } => "table",
            Token::Rule => "hr",
            Token::Html { .. } => "html",
            Token::Text { .. } => "text",
            Token::Strong { .. } => "strong",
            Token::Em { .. } => "em",
            Token::Other { kind, .. } => kind,
        }
    }
}

/// Parse a JSON token dump (an array of `type`-tagged nodes).
pub fn from_json(json: &str) -> crate::Result<Vec<Token>> {
    Ok(serde_json::from_str(json)?)
}

/// Loose wire shape; every kind-specific field is optional.
#[derive(Deserialize)]
struct RawToken {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
    /// Read wide so an out-of-range depth degrades instead of failing the dump.
    #[serde(default)]
    depth: Option<i64>,
    #[serde(default)]
    ordered: bool,
    /// Lexers write `""` here for unordered lists, so accept any JSON value.
    #[serde(default)]
    start: Option<serde_json::Value>,
    #[serde(default)]
    items: Vec<RawToken>,
    #[serde(default)]
    tokens: Vec<RawToken>,
    #[serde(default)]
    header: Vec<RawCell>,
    #[serde(default)]
    rows: Vec<Vec<RawCell>>,
}

#[derive(Deserialize)]
struct RawCell {
    #[serde(default)]
    text: String,
}

fn convert_all(raw: Vec<RawToken>) -> Vec<Token> {
    raw.into_iter().map(Token::from).collect()
}

impl From<RawToken> for ListItem {
    fn from(raw: RawToken) -> Self {
        let start = raw
            .start
            .as_ref()
            .and_then(serde_json::Value::as_u64)
            .and_then(|n| u32::try_from(n).ok());
        Self {
            text: raw.text.unwrap_or_default(),
            tokens: convert_all(raw.tokens),
            start,
        }
    }
}

impl From<RawToken> for Token {
    fn from(raw: RawToken) -> Self {
        let text = || raw.text.clone().unwrap_or_default();
        match raw.kind.as_str() {
            "space" => Token::Space,
            "heading" => Token::Heading {
                depth: raw.depth.and_then(|d| u8::try_from(d).ok()).unwrap_or(0),
                text: text(),
            },
            "paragraph" => Token::Paragraph { text: text() },
            "blockquote" => Token::Blockquote {
                tokens: convert_all(raw.tokens),
            },
            "list" => Token::List {
                ordered: raw.ordered,
                items: raw.items.into_iter().map(ListItem::from).collect(),
            },
            "list_item" => Token::ListItem(ListItem::from(raw)),
            "code" => Token::Code { text: text() },
            "codespan" => Token::Codespan { text: text() },
            "table" => {
                let header = (!raw.header.is_empty()).then_some(raw.header);
                let rows = header
                    .into_iter()
                    .chain(raw.rows)
                    .map(|row| row.into_iter().map(|cell| cell.text).collect())
                    .collect();
                Token::Table { rows }
            }
            "hr" => Token::Rule,
            "html" => Token::Html { text: text() },
            "text" => Token::Text { text: text() },
            "strong" => Token::Strong { text: text() },
            "em" => Token::Em { text: text() },
            _ => Token::Other {
                kind: raw.kind,
                text: raw.text,
            },
        }
    }
}
