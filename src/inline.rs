//! Inline formatting: raw Markdown inline text to styled runs.
//!
//! Only four marker classes are recognized and they never nest. The scan is a
//! single left-to-right pass where the earliest match wins; at the same offset
//! bold is tried before italic, italic before code, code before links.
//! A backslash before ASCII punctuation makes that character literal, both in
//! plain text and inside bold, italic and link labels.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::block::Run;
use crate::config::StyleConfig;

static INLINE_MARKERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"\\(?P<escaped>[[:punct:]])",
        r"|\*\*(?P<bold>(?:\\[^\n]|[^*\\\n])+)\*\*",
        r"|\*(?P<italic>(?:\\[^\n]|[^*\\\n])+)\*",
        r"|`(?P<code>[^`\n]+)`",
        r"|(?P<bang>!?)\[(?P<label>(?:\\[^\n]|[^\]\\\n])+)\]\((?P<target>[^)\n]+)\)",
    ))
    .expect("inline marker pattern is valid")
});

/// Size reduction for the target run printed after a link label.
const LINK_TARGET_SHRINK: u32 = 2;

/// Format inline text with the default base style.
pub fn format_inline(text: &str) -> Vec<Run> {
    format_inline_with(text, &StyleConfig::default())
}

/// Format inline text into runs. Never returns an empty vector.
pub fn format_inline_with(text: &str, style: &StyleConfig) -> Vec<Run> {
    let mut runs = Vec::new();
    // Literal text waiting for the next styled run
    let mut plain = String::new();
    let mut last = 0;

    for caps in INLINE_MARKERS.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        plain.push_str(&text[last..whole.start()]);
        last = whole.end();

        if let Some(escaped) = caps.name("escaped") {
            plain.push_str(escaped.as_str());
            continue;
        }
        if !plain.is_empty() {
            runs.push(Run::new(std::mem::take(&mut plain), style));
        }
        push_marker(&caps, style, &mut runs);
    }

    plain.push_str(&text[last..]);
    if !plain.is_empty() || runs.is_empty() {
        runs.push(Run::new(plain, style));
    }
    runs
}

/// Drop the backslash from every `\` + punctuation pair.
fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(next) = chars.next_if(char::is_ascii_punctuation) {
                out.push(next);
                continue;
            }
        }
        out.push(ch);
    }
    out
}

fn push_marker(caps: &Captures<'_>, style: &StyleConfig, runs: &mut Vec<Run>) {
    if let Some(bold) = caps.name("bold") {
        runs.push(Run::new(unescape(bold.as_str()), style).bold());
    } else if let Some(italic) = caps.name("italic") {
        runs.push(Run::new(unescape(italic.as_str()), style).italic());
    } else if let Some(code) = caps.name("code") {
        runs.push(Run::code(code.as_str(), style));
    } else if let (Some(label), Some(target)) = (caps.name("label"), caps.name("target")) {
        let label = unescape(label.as_str());
        let is_image = caps.name("bang").is_some_and(|bang| !bang.as_str().is_empty());
        if is_image {
            runs.push(Run::new(format!("[Image: {label}]"), style).italic());
        } else {
            runs.push(Run::new(label, style).underline());
            runs.push(
                Run::new(format!(" ({})", target.as_str()), style)
                    .italic()
                    .with_size(style.size.saturating_sub(LINK_TARGET_SHRINK)),
            );
        }
    }
}
