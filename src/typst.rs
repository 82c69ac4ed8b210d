use crate::block::{Alignment, Block, BlockKind, Run};
use crate::config::Config;

/// Embedded monospace family, appended to monospace runs whose configured
/// font is something else.
const MONO_FALLBACK: &str = "DejaVu Sans Mono";

/// Convert blocks to Typst markup
pub fn blocks_to_typst(blocks: &[Block], config: &Config) -> String {
    let mut out = String::new();

    // Set up paragraph settings to prevent widows/orphans
    out.push_str("#set par(linebreaks: \"optimized\")\n");
    out.push_str(&format!(
        "#set text(font: {}, size: {}, fill: {})\n",
        string_literal(&config.style.font),
        half_points(config.style.size),
        color(&config.style.color),
    ));
    if config.page.numbers {
        out.push_str("#set page(numbering: \"1\")\n");
    }
    out.push('\n');

    let mut i = 0;
    while i < blocks.len() {
        let block = &blocks[i];

        if matches!(block.kind, BlockKind::Heading(_)) {
            // Keep heading with following content using a block that prevents breaks
            out.push_str("#block(breakable: false)[\n");
            emit_block(block, config, &mut out);

            // Include the next block if it exists (to keep heading with first content)
            if i + 1 < blocks.len() {
                i += 1;
                emit_block(&blocks[i], config, &mut out);
            }
            out.push_str("]\n\n");
        } else {
            emit_block(block, config, &mut out);
        }

        i += 1;
    }

    out
}

fn emit_block(block: &Block, config: &Config, out: &mut String) {
    out.push_str(&format!(
        "#block(above: {}, below: {}, inset: (left: {}))[",
        twips(block.spacing.before),
        twips(block.spacing.after),
        twips(block.indent_level * config.lists.indent_step),
    ));
    if block.alignment == Alignment::Center {
        out.push_str("#align(center)[");
    }
    for run in &block.runs {
        run_to_typst(run, out);
    }
    if block.alignment == Alignment::Center {
        out.push(']');
    }
    out.push_str("]\n\n");
}

fn run_to_typst(run: &Run, out: &mut String) {
    let font = if run.monospace && run.font != MONO_FALLBACK {
        format!(
            "({}, {})",
            string_literal(&run.font),
            string_literal(MONO_FALLBACK)
        )
    } else {
        string_literal(&run.font)
    };
    let mut text = format!(
        "text(font: {}, size: {}, fill: {}",
        font,
        half_points(run.size),
        color(&run.color),
    );
    if run.bold {
        text.push_str(", weight: \"bold\"");
    }
    if run.italic {
        text.push_str(", style: \"italic\"");
    }
    text.push_str(", ");
    text.push_str(&string_literal(&run.text));
    text.push(')');

    out.push('#');
    if run.underline {
        out.push_str("underline(");
        out.push_str(&text);
        out.push(')');
    } else {
        out.push_str(&text);
    }
}

/// Text goes in as a string argument, so only string escapes apply and
/// markup characters in the text stay literal.
fn string_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for ch in text.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out.push('"');
    out
}

fn half_points(size: u32) -> String {
    format!("{}pt", f64::from(size) / 2.0)
}

fn twips(value: u32) -> String {
    format!("{}pt", f64::from(value) / 20.0)
}

fn color(hex: &str) -> String {
    format!("rgb(\"#{}\")", hex.trim_start_matches('#'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::Spacing;
    use crate::config::StyleConfig;
    use crate::markdown_to_typst;

    const PREAMBLE: &str = "#set par(linebreaks: \"optimized\")\n#set text(font: \"Libertinus Serif\", size: 12pt, fill: rgb(\"#000000\"))\n\n";

    fn plain(text: &str) -> String {
        format!("#text(font: \"Libertinus Serif\", size: 12pt, fill: rgb(\"#000000\"), \"{text}\")")
    }

    #[test]
    fn paragraph() {
        assert_eq!(
            markdown_to_typst("Hello world"),
            format!(
                "{PREAMBLE}#block(above: 0pt, below: 8pt, inset: (left: 0pt))[{}]\n\n",
                plain("Hello world")
            )
        );
    }

    #[test]
    fn heading_with_following_content() {
        // Heading should be grouped with following paragraph
        let result = markdown_to_typst("# Title\n\nSome text.");
        let heading = "#block(above: 8pt, below: 6pt, inset: (left: 0pt))[#text(font: \"Libertinus Serif\", size: 18pt, fill: rgb(\"#000000\"), weight: \"bold\", \"Title\")]\n\n";
        let body = format!(
            "#block(above: 0pt, below: 8pt, inset: (left: 0pt))[{}]\n\n",
            plain("Some text.")
        );
        assert_eq!(
            result,
            format!("{PREAMBLE}#block(breakable: false)[\n{heading}{body}]\n\n")
        );
    }

    #[test]
    fn bold_and_italic() {
        let result = markdown_to_typst("**bold** *it*");
        assert!(result.contains("weight: \"bold\", \"bold\")"));
        assert!(result.contains("style: \"italic\", \"it\")"));
    }

    #[test]
    fn link_is_underlined_with_smaller_target() {
        let result = markdown_to_typst("[docs](https://x.y)");
        assert!(result.contains("#underline(text("));
        assert!(result.contains("size: 11pt, fill: rgb(\"#000000\"), style: \"italic\", \" (https://x.y)\")"));
    }

    #[test]
    fn list_items_are_inset() {
        let result = markdown_to_typst("- a\n  - b");
        assert!(result.contains("inset: (left: 36pt))[#text("));
        assert!(result.contains("inset: (left: 72pt))[#text("));
    }

    #[test]
    fn rule_is_centered() {
        let result = markdown_to_typst("---");
        assert!(result.contains("#align(center)[#text("));
    }

    #[test]
    fn escapes_string_characters() {
        let style = StyleConfig::default();
        let block = Block::new(
            BlockKind::Code,
            vec![Run::code("say \"hi\"\n\\done", &style)],
        )
        .spaced(Spacing::after(0));
        let result = blocks_to_typst(&[block], &Config::default());
        assert!(result.contains("\"say \\\"hi\\\"\\n\\\\done\")"));
        assert!(result.contains("font: \"DejaVu Sans Mono\""));
    }

    #[test]
    fn monospace_runs_fall_back_to_embedded_mono() {
        let style = StyleConfig {
            mono_font: "Courier".to_string(),
            ..StyleConfig::default()
        };
        let block = Block::new(BlockKind::Code, vec![Run::code("x", &style)]);
        let result = blocks_to_typst(&[block], &Config::default());
        assert!(result.contains("font: (\"Courier\", \"DejaVu Sans Mono\")"));
    }

    #[test]
    fn markup_characters_stay_literal() {
        let result = markdown_to_typst("a # b");
        assert!(result.contains(&plain("a # b")));
    }

    #[test]
    fn page_numbers() {
        let mut config = Config::default();
        config.page.numbers = true;
        let result = blocks_to_typst(&[], &config);
        assert!(result.contains("#set page(numbering: \"1\")\n"));
    }

    #[test]
    fn units() {
        assert_eq!(half_points(23), "11.5pt");
        assert_eq!(twips(720), "36pt");
        assert_eq!(color("#336699"), "rgb(\"#336699\")");
    }
}
