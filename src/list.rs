//! List flattening: nested list tokens to indented marker blocks.

use crate::block::{Block, BlockKind, Run, Spacing};
use crate::builder::{DocumentBuilder, ListContext};
use crate::token::{ListItem, Token};

/// Collapse every whitespace run to one space and trim both ends.
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// The children of `item` that still need rendering.
///
/// Lexers copy an item's inline text into a nested text/paragraph child, so
/// the first child matching the item text and any matching paragraph are
/// dropped, along with all blank-line tokens.
pub fn nested_children(item: &ListItem) -> Vec<&Token> {
    let item_text = normalize_text(&item.text);
    let duplicates_item = |token: &Token| {
        token
            .text()
            .is_some_and(|text| !text.is_empty() && normalize_text(text) == item_text)
    };

    item.tokens
        .iter()
        .enumerate()
        .filter(|&(index, token)| {
            let duplicate = match token {
                Token::Space => return false,
                Token::Paragraph { .. } => duplicates_item(token),
                _ => index == 0 && duplicates_item(token),
            };
            if duplicate {
                log::debug!("dropping {} child repeating list item text", token.kind());
            }
            !duplicate
        })
        .map(|(_, token)| token)
        .collect()
}

/// Marker text for the item at `index` (0-based).
///
/// A declared `start` is used as-is, even if it disagrees with the position.
pub fn marker_text(item: &ListItem, index: usize, ordered: bool, bullet: &str) -> String {
    if ordered {
        let number = item.start.map_or(index + 1, |start| start as usize);
        format!("{number}. ")
    } else {
        bullet.to_string()
    }
}

impl DocumentBuilder<'_> {
    pub(crate) fn flatten_list(&mut self, ordered: bool, items: &[ListItem], context: ListContext) {
        let nested = ListContext {
            ordered,
            indent: context.indent + 1,
        };
        let config = self.config();

        for (index, item) in items.iter().enumerate() {
            let marker = marker_text(item, index, ordered, &config.lists.bullet);
            let mut runs = vec![Run::new(marker, &config.style)];
            runs.extend(self.format_inline(&item.text));

            self.push(
                Block::new(BlockKind::ListItem, runs)
                    .indented(nested.indent)
                    .spaced(Spacing::after(config.spacing.list_item_after)),
            );

            let children = nested_children(item);
            if !children.is_empty() {
                self.walk(children, nested);
            }
        }
    }
}
