use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use bibtex_import::format::assign_authors;
use bibtex_import::{ChunkScheduler, EntryDict, ParserConfig, ThreadYield};

/// Import a BibTeX file and report the entries found.
#[derive(Parser, Debug)]
#[command(name = "bibtex-import", version, about)]
struct Cli {
    /// The bibliography to import.
    file: PathBuf,

    /// A TOML file with parser options.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Maximum number of entries parsed per pass.
    #[arg(long, value_name = "N")]
    max_matches: Option<usize>,

    /// Log parse and normalize timings.
    #[arg(long)]
    debug_timing: bool,

    /// Print the imported entries as JSON.
    #[arg(long)]
    json: bool,

    /// Split the `author` field of every entry into names.
    #[arg(long)]
    authors: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut entries = import(&cli)?;
    if cli.authors {
        assign_authors(&mut entries);
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        println!("Imported {} entries", entries.len());
    }
    Ok(())
}

fn import(cli: &Cli) -> bibtex_import::Result<EntryDict> {
    let mut config = match &cli.config {
        Some(path) => ParserConfig::load(path)?,
        None => ParserConfig::default(),
    };
    if let Some(max_matches) = cli.max_matches {
        config = config.with_max_matches(max_matches);
    }
    if cli.debug_timing {
        config = config.with_debug_timing(true);
    }
    config.validate()?;

    ChunkScheduler::new(config).run_file(&cli.file, ThreadYield)
}
