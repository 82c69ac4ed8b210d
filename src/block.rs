use serde::Serialize;

use crate::config::StyleConfig;

/// A styled text span.
///
/// Runs are built once and never mutated; the builder methods consume `self`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Run {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub monospace: bool,
    pub underline: bool,
    /// Half-points.
    pub size: u32,
    pub font: String,
    /// Hex color without the leading `#`.
    pub color: String,
}

impl Run {
    /// A run with the base style and no emphasis.
    pub fn new(text: impl Into<String>, style: &StyleConfig) -> Self {
        Self {
            text: text.into(),
            bold: false,
            italic: false,
            monospace: false,
            underline: false,
            size: style.size,
            font: style.font.clone(),
            color: style.color.clone(),
        }
    }

    /// A monospace run in the configured fixed-width family.
    pub fn code(text: impl Into<String>, style: &StyleConfig) -> Self {
        Self {
            monospace: true,
            font: style.mono_font.clone(),
            ..Self::new(text, style)
        }
    }

    pub fn bold(self) -> Self {
        Self { bold: true, ..self }
    }

    pub fn italic(self) -> Self {
        Self { italic: true, ..self }
    }

    pub fn underline(self) -> Self {
        Self {
            underline: true,
            ..self
        }
    }

    pub fn with_size(self, size: u32) -> Self {
        Self { size, ..self }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockKind {
    /// Heading level 1-6.
    Heading(u8),
    Paragraph,
    ListItem,
    Code,
    Rule,
    TableRow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Alignment {
    #[default]
    Left,
    Center,
}

/// Space around a block, in twentieths of a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Spacing {
    pub before: u32,
    pub after: u32,
}

impl Spacing {
    pub fn after(after: u32) -> Self {
        Self { before: 0, after }
    }
}

/// One output paragraph. Blocks are emitted in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Block {
    pub kind: BlockKind,
    pub runs: Vec<Run>,
    pub indent_level: u32,
    pub alignment: Alignment,
    pub spacing: Spacing,
}

impl Block {
    pub fn new(kind: BlockKind, runs: Vec<Run>) -> Self {
        Self {
            kind,
            runs,
            indent_level: 0,
            alignment: Alignment::default(),
            spacing: Spacing::default(),
        }
    }

    pub fn indented(self, indent_level: u32) -> Self {
        Self {
            indent_level,
            ..self
        }
    }

    pub fn aligned(self, alignment: Alignment) -> Self {
        Self { alignment, ..self }
    }

    pub fn spaced(self, spacing: Spacing) -> Self {
        Self { spacing, ..self }
    }

    /// Concatenated text of all runs.
    pub fn plain_text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }
}
