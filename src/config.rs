use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::Result;

static DEFAULT_CONFIG: &str = include_str!("default_config.toml");

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub style: StyleConfig,
    pub headings: HeadingsConfig,
    pub lists: ListsConfig,
    pub rule: RuleConfig,
    pub table: TableConfig,
    pub spacing: SpacingConfig,
    pub page: PageConfig,
}

/// Base attributes every run starts from.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct StyleConfig {
    pub font: String,
    pub mono_font: String,
    /// Hex color without the leading `#`.
    pub color: String,
    /// Half-points.
    pub size: u32,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            font: "Libertinus Serif".to_string(),
            mono_font: "DejaVu Sans Mono".to_string(),
            color: "000000".to_string(),
            size: 24,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct HeadingsConfig {
    /// Run size for depths 1 through 6, in half-points.
    pub sizes: [u32; 6],
    /// Depth used for headings outside 1-6.
    pub fallback_depth: u8,
}

impl Default for HeadingsConfig {
    fn default() -> Self {
        Self {
            sizes: [36, 32, 28, 26, 24, 24],
            fallback_depth: 3,
        }
    }
}

impl HeadingsConfig {
    /// Clamp a heading depth to the declared table.
    ///
    /// Anything outside 1-6 maps to `fallback_depth` (itself clamped, so a bad
    /// config can never index out of the table).
    pub fn level_for_depth(&self, depth: u8) -> u8 {
        match depth {
            1..=6 => depth,
            _ => self.fallback_depth.clamp(1, 6),
        }
    }

    /// Get the run size for a heading depth.
    pub fn size_for_depth(&self, depth: u8) -> u32 {
        self.sizes[usize::from(self.level_for_depth(depth)) - 1]
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ListsConfig {
    pub bullet: String,
    /// Left indent per nesting level, twentieths of a point.
    pub indent_step: u32,
}

impl Default for ListsConfig {
    fn default() -> Self {
        Self {
            bullet: "• ".to_string(),
            indent_step: 720,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct RuleConfig {
    pub glyph: String,
    pub repeat: usize,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            glyph: "―".to_string(),
            repeat: 30,
        }
    }
}

impl RuleConfig {
    pub fn text(&self) -> String {
        self.glyph.repeat(self.repeat)
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct TableConfig {
    pub separator: String,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            separator: "    ".to_string(),
        }
    }
}

/// Paragraph spacing in twentieths of a point.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct SpacingConfig {
    pub heading_before: u32,
    pub heading_after: u32,
    pub paragraph_after: u32,
    pub list_item_after: u32,
    pub code_after: u32,
    pub rule_before: u32,
    pub rule_after: u32,
    pub table_row_after: u32,
}

impl Default for SpacingConfig {
    fn default() -> Self {
        Self {
            heading_before: 160,
            heading_after: 120,
            paragraph_after: 160,
            list_item_after: 40,
            code_after: 160,
            rule_before: 160,
            rule_after: 160,
            table_row_after: 40,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct PageConfig {
    pub numbers: bool,
}

impl Config {
    /// Load config from a TOML file.
    ///
    /// Unlike [`Config::compiled_default`], a missing or malformed file is an
    /// error: the caller asked for this file explicitly.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse config from TOML text. Omitted keys keep their defaults.
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// The config compiled into the binary from `default_config.toml`.
    pub fn compiled_default() -> Self {
        // build.rs has already rejected a malformed file
        Self::parse(DEFAULT_CONFIG).unwrap_or_default()
    }
}
