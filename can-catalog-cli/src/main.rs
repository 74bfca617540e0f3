//! CAN Signal Catalog CLI Application
//!
//! Command-line front end for the can-catalog library. It loads signal
//! records from a JSON export and offers:
//! - Fuzzy and keyword signal search
//! - Exact lookups by path and by device
//! - Decoding of single frames and candump logs

use anyhow::{bail, Context, Result};
use can_catalog::{CatalogSnapshot, SearchConfig, SearchMatch};
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

mod candump;
mod config;
mod loader;
mod report;

use report::OutputFormat;

/// CAN Signal Catalog - Search signal definitions and decode frames
#[derive(Parser, Debug)]
#[command(name = "can-catalog")]
#[command(about = "Search CAN signal definitions and decode frames", long_about = None)]
#[command(version)]
struct Args {
    /// JSON file with signal records (overrides the config file)
    #[arg(short, long, value_name = "FILE", global = true)]
    records: Option<PathBuf>,

    /// Path to configuration file (config.toml)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fuzzy search over names, paths, descriptions and devices
    Search {
        /// Free-text query
        query: String,

        /// Minimum score (0-100) a match must reach
        #[arg(long)]
        min_score: Option<f64>,

        /// Maximum number of results
        #[arg(long)]
        max_results: Option<NonZeroUsize>,

        /// Match query words as substrings instead of fuzzy scoring
        #[arg(long)]
        keyword: bool,

        /// With --keyword, require every word to match
        #[arg(long, requires = "keyword")]
        strict: bool,
    },

    /// Show one signal by its exact path
    Lookup {
        path: String,
    },

    /// List the signals of a device (display name or key, e.g. "pdu")
    Device {
        name: String,
    },

    /// List all devices with signal counts
    Devices,

    /// Decode a single frame given as ID#HEX (e.g. 607#18FC1027)
    Decode {
        frame: String,
    },

    /// Decode every frame of a candump log file
    DecodeLog {
        file: PathBuf,

        /// Only decode frames with this CAN ID (hex)
        #[arg(long, value_parser = parse_hex_id)]
        id: Option<u32>,
    },
}

fn parse_hex_id(s: &str) -> std::result::Result<u32, String> {
    let digits = s.trim_start_matches("0x").trim_start_matches("0X");
    u32::from_str_radix(digits, 16).map_err(|e| format!("invalid CAN ID '{}': {}", s, e))
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::debug!("CAN Catalog CLI v{}", env!("CARGO_PKG_VERSION"));
    log::debug!("Using catalog library v{}", can_catalog::VERSION);

    let app_config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            config::load_config(path)?
        }
        None => config::AppConfig::default(),
    };

    let records = args
        .records
        .clone()
        .or_else(|| app_config.catalog.records.clone())
        .context("No signal records given: pass --records <FILE> or set [catalog] records in the config file")?;

    let store = loader::load_store(&records)?;
    let snapshot = store.snapshot()?;
    let format = OutputFormat::from_flag(args.json);

    let output = run(&args.command, &snapshot, &app_config.search, format)?;
    print!("{}", output);
    if format == OutputFormat::Json {
        println!();
    }

    Ok(())
}

fn run(
    command: &Command,
    snapshot: &CatalogSnapshot,
    search_config: &SearchConfig,
    format: OutputFormat,
) -> Result<String> {
    let catalog = snapshot.catalog();

    match command {
        Command::Search {
            query,
            min_score,
            max_results,
            keyword,
            strict,
        } => {
            let mut config = search_config.clone();
            if let Some(min_score) = min_score {
                config = config.with_min_score(*min_score);
            }
            if let Some(max_results) = max_results {
                config = config.with_max_results(*max_results);
            }

            let matches = if *keyword {
                snapshot.index().keyword_search(query, *strict, &config)
            } else {
                snapshot.search(query, &config)
            };
            let hits: Vec<_> = matches.iter().map(SearchMatch::to_hit).collect();
            report::search_hits(query, &hits, format)
        }

        Command::Lookup { path } => {
            let signal = catalog.get_by_path(path)?;
            report::signal(signal, format)
        }

        Command::Device { name } => {
            let signals = catalog.get_by_device(name);
            report::device_signals(name, &signals, format)
        }

        Command::Devices => report::devices(catalog.stats(), &catalog.device_summaries(), format),

        Command::Decode { frame } => {
            let frame = candump::parse_frame(frame)?;
            let decode = snapshot.decode(frame.can_id, &frame.data);
            if !catalog.has_frame(frame.can_id) {
                log::warn!("No signals defined for CAN ID 0x{:X}", frame.can_id);
            }
            report::frames(&[(frame, decode)], format)
        }

        Command::DecodeLog { file, id } => {
            let decoded = decode_log(snapshot, file, *id)?;
            report::frames(&decoded, format)
        }
    }
}

/// Parse and decode a candump log in parallel, keeping line order
fn decode_log(
    snapshot: &CatalogSnapshot,
    file: &Path,
    id_filter: Option<u32>,
) -> Result<Vec<(candump::CanFrame, can_catalog::FrameDecode)>> {
    let content =
        fs::read_to_string(file).with_context(|| format!("Failed to read log file: {:?}", file))?;
    let lines: Vec<&str> = content.lines().collect();

    let results: Vec<_> = lines
        .par_iter()
        .enumerate()
        .filter_map(|(line_no, line)| match candump::parse_log_line(line) {
            Ok(Some(frame)) => {
                if id_filter.is_some_and(|id| id != frame.can_id) {
                    return None;
                }
                let decode = snapshot.decode(frame.can_id, &frame.data);
                Some(Ok((frame, decode)))
            }
            Ok(None) => None,
            Err(e) => Some(Err((line_no + 1, e))),
        })
        .collect();

    let mut decoded = Vec::with_capacity(results.len());
    let mut failures = 0usize;
    for result in results {
        match result {
            Ok(frame) => decoded.push(frame),
            Err((line_no, e)) => {
                failures += 1;
                log::warn!("{:?}:{}: {}", file, line_no, e);
            }
        }
    }

    if decoded.is_empty() && failures > 0 {
        bail!("No valid frames in {:?} ({} unparseable lines)", file, failures);
    }

    log::info!(
        "Decoded {} frames from {:?} ({} lines skipped)",
        decoded.len(),
        file,
        failures
    );
    Ok(decoded)
}

/// Initialize logging based on verbosity level
///
/// Log output goes to stderr so that stdout stays clean for results.
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
