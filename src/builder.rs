//! Token tree to flat block sequence.

use crate::block::{Alignment, Block, BlockKind, Run, Spacing};
use crate::config::Config;
use crate::inline::format_inline_with;
use crate::token::Token;

/// List nesting in effect while walking a subtree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListContext {
    pub ordered: bool,
    /// 0 at top level, 1 inside the first list level.
    pub indent: u32,
}

/// Walks tokens depth-first and accumulates blocks in emission order.
pub struct DocumentBuilder<'a> {
    config: &'a Config,
    blocks: Vec<Block>,
}

impl<'a> DocumentBuilder<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            blocks: Vec::new(),
        }
    }

    pub fn config(&self) -> &'a Config {
        self.config
    }

    pub fn finish(self) -> Vec<Block> {
        self.blocks
    }

    pub(crate) fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    pub(crate) fn format_inline(&self, text: &str) -> Vec<Run> {
        format_inline_with(text, &self.config.style)
    }

    pub fn walk<'t>(&mut self, tokens: impl IntoIterator<Item = &'t Token>, context: ListContext) {
        for token in tokens {
            self.visit(token, context);
        }
    }

    fn visit(&mut self, token: &Token, context: ListContext) {
        let config = self.config;
        let style = &config.style;
        let spacing = &config.spacing;

        match token {
            Token::Space => {}
            Token::Heading { depth, text } => {
                let level = config.headings.level_for_depth(*depth);
                if level != *depth {
                    log::warn!("heading depth {depth} out of range, rendering as level {level}");
                }
                let run = Run::new(text.as_str(), style)
                    .bold()
                    .with_size(config.headings.size_for_depth(level));
                self.push(
                    Block::new(BlockKind::Heading(level), vec![run]).spaced(Spacing {
                        before: spacing.heading_before,
                        after: spacing.heading_after,
                    }),
                );
            }
            Token::Paragraph { text } => {
                self.push_paragraph(text);
            }
            Token::Blockquote { tokens } => {
                self.walk(tokens, context);
            }
            Token::List { ordered, items } => {
                self.flatten_list(*ordered, items, context);
            }
            Token::Codespan { text } => {
                self.push(Block::new(BlockKind::Code, vec![Run::code(text.as_str(), style)]));
            }
            Token::Code { text } => {
                self.push(
                    Block::new(BlockKind::Code, vec![Run::code(text.as_str(), style)])
                        .spaced(Spacing::after(spacing.code_after)),
                );
            }
            Token::Rule => {
                let run = Run::new(config.rule.text(), style).italic();
                self.push(
                    Block::new(BlockKind::Rule, vec![run])
                        .aligned(Alignment::Center)
                        .spaced(Spacing {
                            before: spacing.rule_before,
                            after: spacing.rule_after,
                        }),
                );
            }
            Token::Strong { text } => {
                let run = Run::new(text.as_str(), style).bold();
                self.push(Block::new(BlockKind::Paragraph, vec![run]));
            }
            Token::Em { text } => {
                let run = Run::new(text.as_str(), style).italic();
                self.push(Block::new(BlockKind::Paragraph, vec![run]));
            }
            Token::Table { rows } => {
                self.push_table(rows);
            }
            Token::Html { .. } => {
                log::debug!("skipping raw markup block");
            }
            Token::Text { .. } | Token::ListItem(_) | Token::Other { .. } => match token.text() {
                Some(text) if !text.is_empty() => self.push_paragraph(text),
                _ => log::debug!("skipping {} token without text", token.kind()),
            },
        }
    }

    fn push_paragraph(&mut self, text: &str) {
        let runs = self.format_inline(text);
        self.push(
            Block::new(BlockKind::Paragraph, runs)
                .spaced(Spacing::after(self.config.spacing.paragraph_after)),
        );
    }

    fn push_table(&mut self, rows: &[Vec<String>]) {
        let config = self.config;
        for (index, row) in rows.iter().enumerate() {
            let mut runs = self.format_inline(&row.join(&config.table.separator));
            if index == 0 {
                // header row: rebuild each run bold, keeping only text/size/font/color
                runs = runs
                    .into_iter()
                    .map(|run| Run {
                        size: run.size,
                        font: run.font,
                        color: run.color,
                        ..Run::new(run.text, &config.style).bold()
                    })
                    .collect();
            }
            self.push(
                Block::new(BlockKind::TableRow, runs)
                    .spaced(Spacing::after(config.spacing.table_row_after)),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::ListItem;
    use pretty_assertions::assert_eq;

    fn build(tokens: &[Token]) -> Vec<Block> {
        let config = Config::default();
        let mut builder = DocumentBuilder::new(&config);
        builder.walk(tokens, ListContext::default());
        builder.finish()
    }

    fn s(text: &str) -> String {
        text.to_string()
    }

    #[test]
    fn empty_input_builds_nothing() {
        assert!(build(&[]).is_empty());
    }

    #[test]
    fn heading_is_single_bold_run() {
        let blocks = build(&[Token::Heading {
            depth: 1,
            text: s("Title **raw**"),
        }]);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].kind, BlockKind::Heading(1));
        assert_eq!(blocks[0].runs.len(), 1);
        let run = &blocks[0].runs[0];
        assert_eq!(run.text, "Title **raw**");
        assert!(run.bold);
        assert_eq!(run.size, 36);
        assert_eq!(blocks[0].spacing, Spacing { before: 160, after: 120 });
    }

    #[test]
    fn heading_depth_clamp() {
        let deep = build(&[Token::Heading {
            depth: 9,
            text: s("x"),
        }]);
        let third = build(&[Token::Heading {
            depth: 3,
            text: s("x"),
        }]);
        assert_eq!(deep, third);
    }

    #[test]
    fn whitespace_and_raw_markup_are_skipped() {
        let blocks = build(&[
            Token::Space,
            Token::Html {
                text: s("<div>hi</div>"),
            },
            Token::Other {
                kind: s("footnote"),
                text: None,
            },
        ]);
        assert!(blocks.is_empty());
    }

    #[test]
    fn code_is_not_interpreted() {
        let blocks = build(&[Token::Code {
            text: s("let **x** = `y`;"),
        }]);
        assert_eq!(blocks[0].kind, BlockKind::Code);
        assert_eq!(blocks[0].runs.len(), 1);
        assert_eq!(blocks[0].runs[0].text, "let **x** = `y`;");
        assert!(blocks[0].runs[0].monospace);
        assert!(!blocks[0].runs[0].bold);
    }

    #[test]
    fn codespan_has_no_spacing() {
        let blocks = build(&[Token::Codespan { text: s("x") }]);
        assert_eq!(blocks[0].spacing, Spacing::default());
    }

    #[test]
    fn rule_is_centered_italic_dashes() {
        let blocks = build(&[Token::Rule]);
        assert_eq!(blocks[0].alignment, Alignment::Center);
        assert_eq!(blocks[0].runs[0].text, "―".repeat(30));
        assert!(blocks[0].runs[0].italic);
    }

    #[test]
    fn top_level_strong_and_em() {
        let blocks = build(&[Token::Strong { text: s("s") }, Token::Em { text: s("e") }]);
        assert!(blocks[0].runs[0].bold);
        assert!(blocks[1].runs[0].italic);
    }

    #[test]
    fn blockquote_children_are_not_indented() {
        let blocks = build(&[Token::Blockquote {
            tokens: vec![
                Token::Paragraph { text: s("quoted") },
                Token::Space,
                Token::Blockquote {
                    tokens: vec![Token::Paragraph { text: s("deeper") }],
                },
            ],
        }]);
        assert_eq!(blocks.len(), 2);
        assert!(blocks.iter().all(|block| block.indent_level == 0));
        assert_eq!(blocks[1].plain_text(), "deeper");
    }

    #[test]
    fn unknown_kind_with_text_is_a_paragraph() {
        let blocks = build(&[
            Token::Other {
                kind: s("def"),
                text: Some(s("**x**")),
            },
            Token::Text { text: s("plain") },
            Token::Other {
                kind: s("def"),
                text: Some(String::new()),
            },
        ]);
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].runs[0].bold);
        assert_eq!(blocks[1].kind, BlockKind::Paragraph);
    }

    #[test]
    fn stray_list_item_is_a_paragraph() {
        let blocks = build(&[Token::ListItem(ListItem::new("loose"))]);
        assert_eq!(blocks[0].kind, BlockKind::Paragraph);
        assert_eq!(blocks[0].indent_level, 0);
    }

    #[test]
    fn table_header_row_is_bold() {
        let blocks = build(&[Token::Table {
            rows: vec![
                vec![s("Name"), s("*Role*")],
                vec![s("Ann"), s("*lead*")],
            ],
        }]);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].plain_text(), "Name    Role");
        assert!(blocks[0].runs.iter().all(|run| run.bold));
        // header rebuild drops other emphasis
        assert!(blocks[0].runs.iter().all(|run| !run.italic));

        assert!(blocks[1].runs.iter().all(|run| !run.bold));
        assert!(blocks[1].runs[1].italic);
    }

    #[test]
    fn list_with_duplicate_child() {
        let blocks = build(&[Token::List {
            ordered: false,
            items: vec![ListItem::new("Buy milk").with_tokens(vec![Token::Paragraph {
                text: s("Buy  milk\n"),
            }])],
        }]);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].plain_text(), "• Buy milk");
        assert_eq!(blocks[0].kind, BlockKind::ListItem);
        assert_eq!(blocks[0].indent_level, 1);
    }

    #[test]
    fn nested_lists_indent_per_level() {
        let inner = Token::List {
            ordered: true,
            items: vec![ListItem::new("inner")],
        };
        let blocks = build(&[Token::List {
            ordered: false,
            items: vec![
                ListItem::new("outer").with_tokens(vec![Token::Text { text: s("outer") }, inner]),
                ListItem::new("next"),
            ],
        }]);
        let summary: Vec<_> = blocks
            .iter()
            .map(|block| (block.plain_text(), block.indent_level))
            .collect();
        assert_eq!(
            summary,
            vec![
                (s("• outer"), 1),
                (s("1. inner"), 2),
                (s("• next"), 1),
            ]
        );
    }

    #[test]
    fn nested_paragraph_keeps_top_level_indent() {
        let blocks = build(&[Token::List {
            ordered: false,
            items: vec![ListItem::new("item").with_tokens(vec![
                Token::Text { text: s("item") },
                Token::Paragraph { text: s("more") },
            ])],
        }]);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1].kind, BlockKind::Paragraph);
        assert_eq!(blocks[1].indent_level, 0);
    }

    #[test]
    fn ordered_numbers_follow_declared_start() {
        let blocks = build(&[Token::List {
            ordered: true,
            items: vec![
                ListItem::new("a").with_start(3),
                ListItem::new("b").with_start(3),
                ListItem::new("c"),
            ],
        }]);
        let texts: Vec<_> = blocks.iter().map(Block::plain_text).collect();
        assert_eq!(texts, vec!["3. a", "3. b", "3. c"]);
    }

    #[test]
    fn marker_run_has_base_style() {
        let blocks = build(&[Token::List {
            ordered: false,
            items: vec![ListItem::new("**bold**")],
        }]);
        let runs = &blocks[0].runs;
        assert_eq!(runs[0], Run::new("• ", &Config::default().style));
        assert!(runs[1].bold);
    }
}
