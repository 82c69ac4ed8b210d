use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use crate::token::{ListItem, Token};

/// Strip YAML frontmatter from the beginning of markdown content.
///
/// Only a block whose lines all look like YAML counts, so a document opening
/// with a `---` thematic break is left alone.
fn strip_frontmatter(markdown: &str) -> &str {
    let Some(rest) = markdown
        .strip_prefix("---\n")
        .or_else(|| markdown.strip_prefix("---\r\n"))
    else {
        return markdown;
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        let content = line.trim_end_matches(['\n', '\r']);
        if content == "---" {
            if offset == 0 {
                return markdown;
            }
            return rest[offset + line.len()..].trim_start_matches(['\n', '\r']);
        }
        if !is_yaml_line(content) {
            return markdown;
        }
        offset += line.len();
    }
    markdown
}

fn is_yaml_line(line: &str) -> bool {
    if line.trim().is_empty() {
        return false;
    }
    line.starts_with([' ', '\t', '#']) || line.starts_with("- ") || line.contains(':')
}

/// Backslash-escape characters the inline formatter would read as markers.
fn escape_markers(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '\\' | '*' | '`' | '[' | ']') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Tokenize markdown into the lexer-shaped token tree.
///
/// Inline content is written back out as Markdown source (`**`, `*`, backticks,
/// `[label](url)`), so downstream inline formatting sees raw text. List items
/// get their inline text both as `ListItem::text` and as a leading `text` or
/// `paragraph` child, the same way common lexers emit them.
pub fn tokenize(markdown: &str) -> Vec<Token> {
    let markdown = strip_frontmatter(markdown);
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    let parser = Parser::new_ext(markdown, options);
    let mut state = TokenizeState::default();

    for event in parser {
        process_event(event, &mut state);
    }

    state.flush_loose_text();
    state.root
}

#[derive(Default)]
struct TokenizeState {
    root: Vec<Token>,
    // Open blockquotes, lists and items, innermost last
    containers: Vec<Container>,
    // Inline source being collected for the current heading/paragraph/cell
    inline: Option<InlineBuffer>,
    // Destinations of open links and images
    link_targets: Vec<String>,
    code: Option<String>,
    html: Option<String>,
    table: Option<TableBuilder>,
}

enum Container {
    Blockquote(Vec<Token>),
    List {
        ordered: bool,
        start: Option<u64>,
        items: Vec<ListItem>,
    },
    Item(ListItem),
}

struct InlineBuffer {
    owner: InlineOwner,
    text: String,
}

#[derive(Clone, Copy)]
enum InlineOwner {
    Heading(u8),
    Paragraph,
    TableCell,
    // Inline text with no enclosing paragraph, as in tight list items
    Loose,
}

#[derive(Default)]
struct TableBuilder {
    rows: Vec<Vec<String>>,
    current_row: Vec<String>,
}

impl TokenizeState {
    fn emit(&mut self, token: Token) {
        match self.containers.last_mut() {
            Some(Container::Blockquote(tokens)) => tokens.push(token),
            Some(Container::Item(item)) => {
                if item.tokens.is_empty() {
                    if let Token::Text { text } | Token::Paragraph { text } = &token {
                        item.text.clone_from(text);
                    }
                }
                item.tokens.push(token);
            }
            // Lists only ever hold items
            Some(Container::List { .. }) | None => self.root.push(token),
        }
    }

    fn begin_inline(&mut self, owner: InlineOwner) {
        self.inline = Some(InlineBuffer {
            owner,
            text: String::new(),
        });
    }

    fn take_inline(&mut self) -> String {
        self.inline.take().map(|buffer| buffer.text).unwrap_or_default()
    }

    /// Heading text is kept as-is; everything else goes through the inline
    /// formatter and needs its literal marker characters escaped.
    fn inline_is_formatted(&self) -> bool {
        !matches!(
            self.inline,
            Some(InlineBuffer {
                owner: InlineOwner::Heading(_),
                ..
            })
        )
    }

    fn push_inline(&mut self, source: &str) {
        let buffer = self.inline.get_or_insert_with(|| InlineBuffer {
            owner: InlineOwner::Loose,
            text: String::new(),
        });
        buffer.text.push_str(source);
    }

    /// Close loose inline text before a new block starts or a container ends.
    fn flush_loose_text(&mut self) {
        if let Some(InlineBuffer {
            owner: InlineOwner::Loose,
            ..
        }) = self.inline
        {
            let text = self.take_inline();
            self.emit(Token::Text { text });
        }
    }

    fn begin_block(&mut self) {
        self.flush_loose_text();
    }
}

fn process_event(event: Event, state: &mut TokenizeState) {
    match event {
        // Headings
        Event::Start(Tag::Heading { level, .. }) => {
            state.begin_block();
            state.begin_inline(InlineOwner::Heading(heading_level_to_u8(level)));
        }
        Event::End(TagEnd::Heading(_)) => {
            if let Some(InlineBuffer {
                owner: InlineOwner::Heading(depth),
                text,
            }) = state.inline.take()
            {
                state.emit(Token::Heading { depth, text });
            }
        }

        // Paragraphs
        Event::Start(Tag::Paragraph) => {
            state.begin_block();
            state.begin_inline(InlineOwner::Paragraph);
        }
        Event::End(TagEnd::Paragraph) => {
            let text = state.take_inline();
            state.emit(Token::Paragraph { text });
        }

        // Text content
        Event::Text(text) => {
            if let Some(code) = state.code.as_mut() {
                code.push_str(&text);
            } else if state.inline_is_formatted() {
                state.push_inline(&escape_markers(&text));
            } else {
                state.push_inline(&text);
            }
        }
        Event::Code(code) => {
            state.push_inline(&format!("`{code}`"));
        }
        Event::SoftBreak | Event::HardBreak => {
            state.push_inline("\n");
        }
        // Raw inline markup is not carried over
        Event::InlineHtml(_) => {}

        // Emphasis
        Event::Start(Tag::Strong) | Event::End(TagEnd::Strong) => {
            state.push_inline("**");
        }
        Event::Start(Tag::Emphasis) | Event::End(TagEnd::Emphasis) => {
            state.push_inline("*");
        }

        // Links and images
        Event::Start(Tag::Link { dest_url, .. }) => {
            state.link_targets.push(dest_url.into_string());
            state.push_inline("[");
        }
        Event::Start(Tag::Image { dest_url, .. }) => {
            state.link_targets.push(dest_url.into_string());
            state.push_inline("![");
        }
        Event::End(TagEnd::Link | TagEnd::Image) => {
            let target = state.link_targets.pop().unwrap_or_default();
            state.push_inline(&format!("]({target})"));
        }

        // Code blocks
        Event::Start(Tag::CodeBlock(_)) => {
            state.begin_block();
            state.code = Some(String::new());
        }
        Event::End(TagEnd::CodeBlock) => {
            let content = state.code.take().unwrap_or_default();
            let text = content.trim_end_matches('\n').to_string();
            state.emit(Token::Code { text });
        }

        // Raw HTML blocks
        Event::Start(Tag::HtmlBlock) => {
            state.begin_block();
            state.html = Some(String::new());
        }
        Event::Html(html) => {
            if let Some(buffer) = state.html.as_mut() {
                buffer.push_str(&html);
            }
        }
        Event::End(TagEnd::HtmlBlock) => {
            let text = state.html.take().unwrap_or_default();
            state.emit(Token::Html { text });
        }

        // Blockquotes
        Event::Start(Tag::BlockQuote(_)) => {
            state.begin_block();
            state.containers.push(Container::Blockquote(Vec::new()));
        }
        Event::End(TagEnd::BlockQuote(_)) => {
            state.flush_loose_text();
            if let Some(Container::Blockquote(tokens)) = state.containers.pop() {
                state.emit(Token::Blockquote { tokens });
            }
        }

        // Lists
        Event::Start(Tag::List(first_number)) => {
            state.begin_block();
            state.containers.push(Container::List {
                ordered: first_number.is_some(),
                start: first_number,
                items: Vec::new(),
            });
        }
        Event::End(TagEnd::List(_)) => {
            if let Some(Container::List { ordered, items, .. }) = state.containers.pop() {
                state.emit(Token::List { ordered, items });
            }
        }
        Event::Start(Tag::Item) => {
            state.begin_block();
            let mut item = ListItem::default();
            if let Some(Container::List {
                start: Some(first),
                items,
                ..
            }) = state.containers.last()
            {
                item.start = u32::try_from(*first + items.len() as u64).ok();
            }
            state.containers.push(Container::Item(item));
        }
        Event::End(TagEnd::Item) => {
            state.flush_loose_text();
            if let Some(Container::Item(item)) = state.containers.pop() {
                if let Some(Container::List { items, .. }) = state.containers.last_mut() {
                    items.push(item);
                }
            }
        }

        // Tables
        Event::Start(Tag::Table(_)) => {
            state.begin_block();
            state.table = Some(TableBuilder::default());
        }
        Event::End(TagEnd::Table) => {
            if let Some(table) = state.table.take() {
                state.emit(Token::Table { rows: table.rows });
            }
        }
        Event::Start(Tag::TableHead | Tag::TableRow) => {
            if let Some(table) = state.table.as_mut() {
                table.current_row.clear();
            }
        }
        Event::End(TagEnd::TableHead | TagEnd::TableRow) => {
            if let Some(table) = state.table.as_mut() {
                let row = std::mem::take(&mut table.current_row);
                table.rows.push(row);
            }
        }
        Event::Start(Tag::TableCell) => {
            state.begin_inline(InlineOwner::TableCell);
        }
        Event::End(TagEnd::TableCell) => {
            let cell = state.take_inline();
            if let Some(table) = state.table.as_mut() {
                table.current_row.push(cell);
            }
        }

        // Horizontal rule
        Event::Rule => {
            state.begin_block();
            state.emit(Token::Rule);
        }

        // Ignore other events
        _ => {}
    }
}

fn heading_level_to_u8(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}
