//! Markdown token trees to flat sequences of styled blocks.
//!
//! The core is [`build`]: it walks a [`Token`] tree and produces [`Block`]s
//! made of [`Run`]s with explicit typographic attributes. Around it sit a
//! Markdown front end ([`tokenize`]), a JSON token-dump reader
//! ([`token::from_json`]) and Typst/PDF/JSON writers.

mod block;
mod builder;
mod config;
mod error;
mod inline;
mod list;
mod parser;
pub mod token;
mod typst;

pub use block::{Alignment, Block, BlockKind, Run, Spacing};
pub use builder::{DocumentBuilder, ListContext};
pub use config::{
    Config, HeadingsConfig, ListsConfig, PageConfig, RuleConfig, SpacingConfig, StyleConfig,
    TableConfig,
};
pub use error::{Error, Result};
pub use inline::{format_inline, format_inline_with};
pub use list::{marker_text, nested_children, normalize_text};
pub use parser::tokenize;
pub use token::{ListItem, Token};

use typst_as_lib::TypstEngine;
use typst_as_lib::typst_kit_options::TypstKitFontOptions;
use typst_library::diag::Warned;
use typst_library::layout::PagedDocument;
use typst_pdf::PdfOptions;

/// Convert a token tree to blocks using default config.
pub fn build(tokens: &[Token]) -> Vec<Block> {
    build_with_config(tokens, &Config::compiled_default())
}

/// Convert a token tree to blocks with custom config.
pub fn build_with_config(tokens: &[Token], config: &Config) -> Vec<Block> {
    let mut builder = DocumentBuilder::new(config);
    builder.walk(tokens, ListContext::default());
    let blocks = builder.finish();
    log::debug!("built {} blocks from {} tokens", blocks.len(), tokens.len());
    blocks
}

/// Parse markdown text into blocks using default config.
pub fn parse(markdown: &str) -> Vec<Block> {
    build(&tokenize(markdown))
}

/// Convert markdown to Typst markup using default config.
pub fn markdown_to_typst(markdown: &str) -> String {
    let config = Config::compiled_default();
    blocks_to_typst(&build_with_config(&tokenize(markdown), &config), &config)
}

/// Convert blocks to Typst markup.
pub fn blocks_to_typst(blocks: &[Block], config: &Config) -> String {
    typst::blocks_to_typst(blocks, config)
}

/// Convert blocks to pretty-printed JSON.
pub fn blocks_to_json(blocks: &[Block]) -> Result<String> {
    Ok(serde_json::to_string_pretty(blocks)?)
}

/// Convert blocks to PDF bytes.
pub fn blocks_to_pdf(blocks: &[Block], config: &Config) -> Result<Vec<u8>> {
    let (doc, warnings) = compile_document(blocks_to_typst(blocks, config));
    for warning in &warnings {
        log::warn!("typst: {warning}");
    }
    let doc = doc?;

    typst_pdf::pdf(&doc, &PdfOptions::default()).map_err(|e| Error::Pdf(format!("{:?}", e)))
}

/// Compile Typst markup against the embedded fonts, returning the document
/// and the compiler's warning messages.
fn compile_document(typst_content: String) -> (Result<PagedDocument>, Vec<String>) {
    let font_options = TypstKitFontOptions::new()
        .include_embedded_fonts(true)
        .include_system_fonts(false);

    let engine = TypstEngine::builder()
        .main_file(typst_content)
        .search_fonts_with(font_options)
        .build();

    let Warned { output, warnings } = engine.compile();
    let warnings = warnings
        .iter()
        .map(|warning| warning.message.to_string())
        .collect();
    (output.map_err(|e| Error::Compile(format!("{:?}", e))), warnings)
}

/// Convert markdown to PDF bytes using default config.
pub fn markdown_to_pdf(markdown: &str) -> Result<Vec<u8>> {
    let config = Config::compiled_default();
    blocks_to_pdf(&build_with_config(&tokenize(markdown), &config), &config)
}
