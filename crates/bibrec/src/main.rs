//! bibrec command line tool
//!
//! Reads `.bib` files with the BibTeX-like parser and any other file with the
//! INI-style reader, in the order given, into one collection.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use bibrec::{Bib, BibParser, BibTexParser, BibWriter, Config, Entry, ParseReport};

#[derive(Parser)]
#[command(name = "bibrec", version, about = "Bibliography record handler")]
struct Cli {
    /// Print debugging output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    debug: bool,

    /// Only print warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Configuration file (defaults to <config dir>/bibrec/config.toml)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert bibliography files to INI-style output
    Convert(OutputArgs),
    /// Sort entries by publication date and write INI-style output
    Sort {
        #[command(flatten)]
        args: OutputArgs,
        /// Oldest entries first, overriding the configured direction
        #[arg(long)]
        oldest_first: bool,
    },
    /// Print entries as JSON
    Json {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Report entries without a usable date, duplicate keys, and skipped lines
    Check {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

#[derive(Args)]
struct OutputArgs {
    /// Input files: `.bib` for BibTeX-like, anything else for INI-style
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Write to FILE instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

#[derive(Serialize)]
struct JsonEntry<'a> {
    #[serde(flatten)]
    entry: &'a Entry,
    #[serde(skip_serializing_if = "Option::is_none")]
    published: Option<NaiveDate>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(cli: &Cli) {
    let level = if cli.debug {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> bibrec::Result<ExitCode> {
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Command::Convert(args) => {
            let (bib, _) = load(&args.files, &config)?;
            write_ini(&bib, args.output.as_deref())?;
        }
        Command::Sort { args, oldest_first } => {
            let (mut bib, _) = load(&args.files, &config)?;
            let newest_first = config.sort.newest_first && !oldest_first;
            bib.sort_by_date(newest_first)?;
            write_ini(&bib, args.output.as_deref())?;
        }
        Command::Json { files } => {
            let (bib, _) = load(&files, &config)?;
            let entries: Vec<_> = bib
                .iter()
                .map(|entry| JsonEntry {
                    entry,
                    published: entry.published().ok(),
                })
                .collect();
            let text = serde_json::to_string_pretty(&entries).map_err(io::Error::from)?;
            println!("{}", text);
        }
        Command::Check { files } => {
            let (bib, report) = load(&files, &config)?;
            return Ok(check(&bib, &report));
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Load all inputs in order. Consecutive INI files are read together so
/// repeated sections merge.
fn load(files: &[PathBuf], config: &Config) -> bibrec::Result<(Bib, ParseReport)> {
    let mut bib = Bib::new();
    let mut bibtex = BibTexParser::with_config(config.parse.clone());
    let ini = BibParser::new();

    // Consecutive files of one format are parsed together, so INI sections
    // merge across them and a BibTeX entry may continue into the next file
    for run in files.chunk_by(|a, b| is_bibtex(a) == is_bibtex(b)) {
        bib = if is_bibtex(&run[0]) {
            bibtex.parse_bib(run, Some(bib))?
        } else {
            ini.parse_bib(run, Some(bib))?
        };
    }

    let report = bibtex.take_report();
    if !report.unrecognized.is_empty() {
        warn!(count = report.unrecognized.len(), "Skipped unrecognized lines");
    }
    info!(entries = bib.len(), "Loaded bibliography");
    Ok((bib, report))
}

fn is_bibtex(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("bib"))
        .unwrap_or(false)
}

fn write_ini(bib: &Bib, output: Option<&Path>) -> bibrec::Result<()> {
    let writer = BibWriter::new();
    match output {
        Some(path) => {
            // Render first so a duplicate key leaves no file behind
            let text = writer.format(bib)?;
            let mut file = BufWriter::new(File::create(path)?);
            file.write_all(text.as_bytes())?;
            file.flush()?;
            info!(path = %path.display(), "Wrote INI output");
        }
        None => writer.write(bib, io::stdout().lock())?,
    }
    Ok(())
}

fn check(bib: &Bib, report: &ParseReport) -> ExitCode {
    let mut problems = 0;

    for entry in bib {
        if let Err(e) = entry.published() {
            println!("{}", e);
            problems += 1;
        }
    }
    for key in bib.duplicate_keys() {
        println!("duplicate key '{}'", key);
        problems += 1;
    }
    for skipped in report.unrecognized.iter().chain(&report.orphaned_fields) {
        println!("{}:{}: skipped '{}'", skipped.source, skipped.line, skipped.text);
        problems += 1;
    }

    if problems == 0 {
        info!(entries = bib.len(), "No problems found");
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
