use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDateTime};
use clap::{Parser, Subcommand};
use record_extract::validate::parse_timestamp;
use record_extract::{Extractor, ExtractorConfig, logging};
use tracing::{info, warn};

#[derive(Parser)]
#[command(
    name = "record-extract",
    about = "Turn Chinese baby-activity notes into structured records"
)]
struct Cli {
    /// Extractor config (TOML). Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Reference instant, e.g. "2024-06-10 10:00:00" (default: now)
    #[arg(long, global = true)]
    now: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract one record and print it as JSON
    Parse {
        /// Note text, e.g. "昨天下午3点半睡觉到5点"
        #[arg(required = true)]
        text: Vec<String>,
        /// Annotator reply to validate against the text
        #[arg(long)]
        annotation: Option<PathBuf>,
        /// Print the persistence row instead of the full extraction
        #[arg(long)]
        row: bool,
    },
    /// Extract one record per non-empty line of a file → JSON lines
    Batch {
        file: PathBuf,
    },
    /// Print every stage's output for a note
    Inspect {
        #[arg(required = true)]
        text: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_cli();

    let config = match &cli.config {
        Some(path) => ExtractorConfig::load(path)
            .with_context(|| format!("cannot load config {}", path.display()))?,
        None => ExtractorConfig::default(),
    };
    let reference = reference_instant(cli.now.as_deref(), &config)?;
    let extractor = Extractor::new(config).context("invalid extractor config")?;

    match cli.command {
        Command::Parse {
            text,
            annotation,
            row,
        } => run_parse(&extractor, &text.join(" "), reference, annotation.as_deref(), row),
        Command::Batch { file } => run_batch(&extractor, &file, reference),
        Command::Inspect { text } => run_inspect(&extractor, &text.join(" "), reference),
    }
}

/// `--now` if given, else the local wall clock. The only clock read.
fn reference_instant(now: Option<&str>, config: &ExtractorConfig) -> Result<NaiveDateTime> {
    match now {
        Some(s) => match parse_timestamp(s, config.offset()?) {
            Some(t) => Ok(t),
            None => bail!("cannot parse --now {s:?}, expected e.g. \"2024-06-10 10:00:00\""),
        },
        None => Ok(Local::now().naive_local()),
    }
}

fn print_json<T: serde::Serialize>(data: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(data)?);
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════
//  PARSE MODE: one note → JSON
// ═══════════════════════════════════════════════════════════════════════

fn run_parse(
    extractor: &Extractor,
    text: &str,
    reference: NaiveDateTime,
    annotation: Option<&Path>,
    row: bool,
) -> Result<()> {
    let extraction = match annotation {
        Some(path) => {
            let reply = std::fs::read_to_string(path)
                .with_context(|| format!("cannot read annotation {}", path.display()))?;
            extractor.extract_with_reply(text, reference, &reply)?
        }
        None => extractor.extract(text, reference, None)?,
    };

    if !extraction.matched {
        info!("no category keyword matched, stored as general");
    }
    if row {
        print_json(&extraction.record.to_row())
    } else {
        print_json(&extraction)
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  BATCH MODE: one note per line → JSON lines
// ═══════════════════════════════════════════════════════════════════════

fn run_batch(extractor: &Extractor, file: &Path, reference: NaiveDateTime) -> Result<()> {
    let contents = std::fs::read_to_string(file)
        .with_context(|| format!("cannot read {}", file.display()))?;

    let mut records = 0usize;
    let mut unmatched = 0usize;
    for (i, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            warn!(line = i + 1, "skipping empty line");
            continue;
        }
        let extraction = extractor.extract(line, reference, None)?;
        if !extraction.matched {
            unmatched += 1;
        }
        println!("{}", serde_json::to_string(&extraction.record)?);
        records += 1;
    }

    info!(records, unmatched, "batch done");
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════
//  INSPECT MODE: every stage, then the record
// ═══════════════════════════════════════════════════════════════════════

fn run_inspect(extractor: &Extractor, text: &str, reference: NaiveDateTime) -> Result<()> {
    let findings = extractor.inspect(text, reference)?;
    let extraction = extractor.extract(text, reference, None)?;

    eprintln!("reference: {reference}");
    eprintln!("── stages ──");
    print_json(&findings)?;
    eprintln!("── evidence ──");
    print_json(&extraction.evidence)?;
    eprintln!("── record ──");
    print_json(&extraction.record)
}
