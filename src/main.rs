use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use docblocks::{Block, Config, Token};

#[derive(Parser)]
#[command(name = "docblocks")]
#[command(about = "Convert Markdown to styled document blocks")]
struct Cli {
    /// Input Markdown file (or JSON token dump with --tokens)
    input: PathBuf,

    /// Output file (defaults to input name with the format's extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Pdf)]
    format: Format,

    /// Read the input as a JSON token array instead of Markdown
    #[arg(long)]
    tokens: bool,

    /// Style config TOML file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Pdf,
    Typst,
    Json,
}

impl Format {
    fn extension(self) -> &'static str {
        match self {
            Format::Pdf => "pdf",
            Format::Typst => "typ",
            Format::Json => "json",
        }
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> docblocks::Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::compiled_default(),
    };

    let tokens = read_tokens(&cli.input, cli.tokens)?;
    let blocks = docblocks::build_with_config(&tokens, &config);
    if blocks.is_empty() {
        log::warn!("{} has no content, nothing to export", cli.input.display());
        return Ok(());
    }

    let output = output_path(&cli.input, cli.output.as_deref(), cli.format);
    fs::write(&output, render(&blocks, &config, cli.format)?)?;

    println!("Created {}", output.display());
    Ok(())
}

/// Explicit `-o` wins. Otherwise swap the input's extension for the format's,
/// falling back to `<stem>.blocks.<ext>` when that would be the input itself.
fn output_path(input: &Path, output: Option<&Path>, format: Format) -> PathBuf {
    if let Some(output) = output {
        return output.to_path_buf();
    }
    let derived = input.with_extension(format.extension());
    if derived == input {
        input.with_extension(format!("blocks.{}", format.extension()))
    } else {
        derived
    }
}

fn read_tokens(input: &Path, json: bool) -> docblocks::Result<Vec<Token>> {
    let content = fs::read_to_string(input)?;
    if json {
        docblocks::token::from_json(&content)
    } else {
        Ok(docblocks::tokenize(&content))
    }
}

fn render(blocks: &[Block], config: &Config, format: Format) -> docblocks::Result<Vec<u8>> {
    match format {
        Format::Pdf => docblocks::blocks_to_pdf(blocks, config),
        Format::Typst => Ok(docblocks::blocks_to_typst(blocks, config).into_bytes()),
        Format::Json => Ok(docblocks::blocks_to_json(blocks)?.into_bytes()),
    }
}
