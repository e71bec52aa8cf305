use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use morph::Format;
use tracing::debug;

#[derive(Debug, Parser)]
#[command(
    name = "morph",
    version,
    about = "Convert and re-format JSON, YAML, TOML, XML, TOON, MsgPack, \
             Go struct text, JSON Schema, GraphQL and Protobuf"
)]
struct Args {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Convert input from one format to another
    Convert {
        /// Input file (defaults to stdin)
        #[arg(value_name = "INPUT")]
        input: Option<PathBuf>,
        /// Input format (inferred from the file extension when omitted)
        #[arg(short, long)]
        from: Option<String>,
        /// Output format
        #[arg(short, long)]
        to: String,
        /// Output file (defaults to stdout)
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,
    },
    /// Re-format input in its own format
    Fmt {
        /// Input file (defaults to stdin)
        #[arg(value_name = "INPUT")]
        input: Option<PathBuf>,
        /// Format (inferred from the file extension when omitted)
        #[arg(short, long)]
        format: Option<String>,
        /// Emit the compact form where the format has one
        #[arg(short, long)]
        minify: bool,
        /// Output file (defaults to stdout)
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    if args.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
            )
            .with_writer(io::stderr)
            .init();
    }

    match args.command {
        Command::Convert {
            input,
            from,
            to,
            output,
        } => {
            let text = read_input(&input)?;
            let from = resolve_format(from.as_deref(), &input)?;
            let to = parse_format(&to)?;
            debug!(%from, %to, "converting");
            let result = morph::convert(from, to, &text)?;
            write_output(&output, result.as_bytes())
        }
        Command::Fmt {
            input,
            format,
            minify,
            output,
        } => {
            let text = read_input(&input)?;
            let format = resolve_format(format.as_deref(), &input)?;
            debug!(%format, minify, "formatting");
            let result = morph::format_content(format, &text, minify)?;
            write_output(&output, result.as_bytes())
        }
    }
}

fn parse_format(name: &str) -> Result<Format> {
    Format::from_str(name).with_context(|| format!("unknown format {name:?}"))
}

fn resolve_format(explicit: Option<&str>, input: &Option<PathBuf>) -> Result<Format> {
    if let Some(name) = explicit {
        return parse_format(name);
    }
    if let Some(format) = input.as_ref().and_then(|p| infer_format(p.as_path())) {
        return Ok(format);
    }
    bail!("could not infer format; pass it explicitly or provide an input file with extension")
}

fn infer_format(path: &std::path::Path) -> Option<Format> {
    let ext = path.extension().and_then(|s| s.to_str())?;
    match ext {
        "json" => Some(Format::Json),
        "go" => Some(Format::GoStruct),
        "yaml" | "yml" => Some(Format::Yaml),
        "toml" => Some(Format::Toml),
        "xml" => Some(Format::Xml),
        "graphql" | "gql" => Some(Format::Graphql),
        "proto" => Some(Format::Proto),
        "toon" => Some(Format::Toon),
        "msgpack" => Some(Format::MsgPack),
        _ => None,
    }
}

fn read_input(path: &Option<PathBuf>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read input file {}", path.display())),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read stdin")?;
            if buffer.trim().is_empty() {
                bail!("no input provided on stdin");
            }
            Ok(buffer)
        }
    }
}

fn write_output(path: &Option<PathBuf>, data: &[u8]) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, data)
            .with_context(|| format!("failed to write output file {}", path.display())),
        None => {
            let mut stdout = io::stdout();
            stdout.write_all(data).context("failed to write stdout")?;
            stdout.write_all(b"\n").context("failed to write stdout")?;
            Ok(())
        }
    }
}
