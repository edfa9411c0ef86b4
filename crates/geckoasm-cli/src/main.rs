use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::Read;
use tracing_subscriber::EnvFilter;

use geckoasm::{CodeType, Codec, CodecConfig};

#[derive(Parser, Debug)]
#[command(author, version, about = "Gecko code framing and PowerPC assembly text tools", long_about = None)]
struct Cli {
    /// JSON codec configuration (include path, default inject address, column width)
    #[arg(long, value_name = "FILE")]
    config: Option<String>,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Frame raw hex as a Gecko code
    Frame {
        /// Codetype: RAW, C0, C2D2, C4D4, 0414, 0616, F2F4
        #[arg(long, default_value = "RAW")]
        codetype: String,
        /// ba/po address (8 hex digits, 80/81/00/01 prefix)
        #[arg(long)]
        bapo: Option<String>,
        /// XOR value for F2/F4 (4 hex digits)
        #[arg(long)]
        xor: Option<String>,
        /// Checksum for F2/F4 (2 hex digits)
        #[arg(long)]
        checksum: Option<String>,
        /// Raw hex input ("-" for stdin)
        #[arg(value_name = "INPUT")]
        input: String,
        #[arg(long, value_name = "FILE")]
        out: Option<String>,
    },
    /// Strip a Gecko code's framing back to raw hex
    Unframe {
        #[arg(value_name = "INPUT")]
        input: String,
        /// Keep the blr of a C0 return footer in the payload
        #[arg(long)]
        keep_return: bool,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        #[arg(long, value_name = "FILE")]
        out: Option<String>,
    },
    /// Unframe a code and write the payload bytes for a disassembler
    Unhex {
        #[arg(value_name = "INPUT")]
        input: String,
        #[arg(value_name = "BINFILE")]
        output: String,
    },
    /// Binary file (objcopy output) to raw hex
    Rawhex {
        #[arg(value_name = "BINFILE")]
        input: String,
        #[arg(long, value_name = "FILE")]
        out: Option<String>,
    },
    /// Disassembler listing to labeled assembly
    Format {
        #[arg(value_name = "INPUT")]
        input: String,
        #[arg(long, value_name = "FILE")]
        out: Option<String>,
    },
    /// Sanitize assembly lines for the assembler
    Sanitize {
        #[arg(value_name = "INPUT")]
        input: String,
        #[arg(long, value_name = "FILE")]
        out: Option<String>,
    },
    /// Build assembler input (include + INJECTADDR header, sanitized body)
    Prepare {
        #[arg(value_name = "INPUT")]
        input: String,
        #[arg(long, value_name = "FILE")]
        out: Option<String>,
    },
    /// Point assembler/linker errors at the prepared source lines
    Annotate {
        /// Captured assembler or linker stderr
        #[arg(value_name = "STDERR")]
        stderr: String,
        /// Prepared source the errors refer to
        #[arg(value_name = "SOURCE")]
        source: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat { Text, Json }

fn read_input(path: &str) -> Result<String> {
    if path == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf).context("reading stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).with_context(|| format!("reading {path}"))
}

fn emit(text: &str, out: Option<String>) -> Result<()> {
    if let Some(path) = out {
        std::fs::write(&path, format!("{text}\n")).with_context(|| format!("writing {path}"))?;
    } else {
        println!("{text}");
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let cfg = match &cli.config {
        Some(path) => CodecConfig::from_json(&read_input(path)?).with_context(|| format!("parsing {path}"))?,
        None => CodecConfig::default(),
    };
    tracing::debug!(?cfg, "codec configuration");
    let codec = Codec::new(cfg);

    match cli.cmd {
        Command::Frame { codetype, bapo, xor, checksum, input, out } => {
            let codetype: CodeType = codetype.parse()?;
            let payload = read_input(&input)?;
            let framed = geckoasm::construct_code(
                payload.trim(),
                bapo.as_deref(),
                xor.as_deref(),
                checksum.as_deref(),
                codetype,
            )?;
            emit(&framed, out)?;
        }
        Command::Unframe { input, keep_return, format, out } => {
            let packet = codec.deconstruct(read_input(&input)?.trim(), !keep_return);
            match format {
                OutputFormat::Text => {
                    let mut text = format!("codetype: {}\n", packet.codetype);
                    if let Some(b) = packet.bapo { text.push_str(&format!("bapo:     {b}\n")); }
                    if let Some(c) = packet.checksum { text.push_str(&format!("checksum: {c:02X}\n")); }
                    if let Some(x) = packet.xor { text.push_str(&format!("xor:      {x:04X}\n")); }
                    text.push('\n');
                    text.push_str(&packet.payload);
                    emit(&text, out)?;
                }
                OutputFormat::Json => emit(&serde_json::to_string_pretty(&packet)?, out)?,
            }
        }
        Command::Unhex { input, output } => {
            let packet = codec.deconstruct(read_input(&input)?.trim(), true);
            let bytes = packet.payload_bytes().context("payload is not hex")?;
            std::fs::write(&output, bytes).with_context(|| format!("writing {output}"))?;
        }
        Command::Rawhex { input, out } => {
            let bytes = std::fs::read(&input).with_context(|| format!("reading {input}"))?;
            emit(&geckoasm::format_rawhex(&bytes), out)?;
        }
        Command::Format { input, out } => {
            emit(&codec.format_opcodes(&read_input(&input)?), out)?;
        }
        Command::Sanitize { input, out } => {
            emit(&geckoasm::sanitize::sanitize_source(&read_input(&input)?), out)?;
        }
        Command::Prepare { input, out } => {
            let prepared = codec.prepare_source(&read_input(&input)?);
            emit(prepared.text.trim_end(), out)?;
        }
        Command::Annotate { stderr, source } => {
            let report = geckoasm::report::annotate(&read_input(&stderr)?, &read_input(&source)?);
            print!("{report}");
        }
    }

    Ok(())
}
