use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pinzone::batch;
use pinzone::config::Config;
use pinzone::location::LocationResolver;
use pinzone::pair::{PairProcessor, PairResult};
use pinzone::server;
use pinzone::Distance;

/// Pinzone — pincode-to-pincode routing zone and distance
///
/// Resolves both pincodes to place names, estimates the great-circle
/// distance, and classifies the pair as LOCAL, METRO, REGIONAL, SPECIAL or ROI.
///
/// Examples:
///   pinzone pair 110001 400001
///   pinzone zone 110001 110055
///   pinzone batch orders.csv --out zones.csv
///   pinzone batch --pairs "110001,400001;413001,431001" --json
///   pinzone serve --port 8080
#[derive(Parser)]
#[command(name = "pinzone", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Config file (JSON). Defaults to ~/.pinzone/config.json if present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Offline mode: skip every network lookup.
    #[arg(long, global = true)]
    offline: bool,

    /// Per-call network timeout in seconds.
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Memoize lookups by pincode for the lifetime of the process.
    #[arg(long, global = true)]
    memo: bool,

    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Zone, distance and places for one pair.
    Pair { from: String, to: String },

    /// Zone only (no geocoding).
    Zone { from: String, to: String },

    /// Process many pairs from a CSV file or inline text.
    Batch {
        /// CSV with from_pincode and to_pincode columns.
        file: Option<PathBuf>,

        /// Inline pairs: "from,to" separated by ';' or newlines.
        #[arg(long, conflicts_with = "file")]
        pairs: Option<String>,

        /// Write results here instead of stdout.
        #[arg(long, short = 'o')]
        out: Option<PathBuf>,

        /// Emit JSON instead of CSV.
        #[arg(long)]
        json: bool,
    },

    /// Run the HTTP API.
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // ── Load configuration ──────────────────────────────────────

    let mut config = Config::load(cli.config.as_deref())?;
    if cli.offline {
        config.offline = true;
    }
    if let Some(t) = cli.timeout {
        config.timeout_secs = t;
    }
    if cli.memo {
        config.memoize = true;
    }

    match cli.command {
        Command::Pair { from, to } => {
            let processor = PairProcessor::new(LocationResolver::from_config(&config));
            let result = processor.process_pair(&from, &to);
            eprintln!("  {}", summary_line(&result));
            println!("{}", serde_json::to_string_pretty(&result.record())?);
        }

        Command::Zone { from, to } => {
            let processor = PairProcessor::new(LocationResolver::from_config(&config));
            let z = processor.zone_only(&from, &to);
            eprintln!(
                "  {} ({}, {}) \u{2192} {} ({}, {})",
                z.from, z.from_place.district, z.from_place.state,
                z.to, z.to_place.district, z.to_place.state,
            );
            println!("{}", z.zone);
        }

        Command::Batch { file, pairs, out, json } => {
            // Batch mode always memoizes.
            config.memoize = true;
            let processor = PairProcessor::new(LocationResolver::from_config(&config));

            let inputs = match (file, pairs) {
                (Some(path), _) => {
                    let f = File::open(&path)
                        .with_context(|| format!("Cannot open {}", path.display()))?;
                    batch::read_pairs_csv(f)?
                }
                (None, Some(text)) => batch::parse_manual_pairs(&text.replace(';', "\n")),
                (None, None) => bail!("Provide a CSV file or --pairs"),
            };
            info!(pairs = inputs.len(), "batch input loaded");

            let results = processor.process_batch(&inputs);

            let mut writer: Box<dyn Write> = match &out {
                Some(path) => Box::new(
                    File::create(path).with_context(|| format!("Cannot create {}", path.display()))?,
                ),
                None => Box::new(io::stdout().lock()),
            };
            if json {
                writeln!(writer, "{}", batch::records_json(&results)?)?;
            } else {
                batch::write_records_csv(&mut writer, &results)?;
            }
            writer.flush()?;

            if let Some(path) = out {
                eprintln!("  Wrote {} rows to {}", results.len(), path.display());
            }
        }

        Command::Serve { host, port } => {
            config.memoize = true;
            let processor = PairProcessor::new(LocationResolver::from_config(&config));
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(server::start(&host, port, processor))?;
        }
    }

    Ok(())
}

fn summary_line(r: &PairResult) -> String {
    format!(
        "\u{1F4CD} {} {} ({}) \u{2192} {} {} ({})  \u{1F4CF} {}  \u{1F9ED} {}",
        r.from, r.from_place.name, r.from_place.state,
        r.to, r.to_place.name, r.to_place.state,
        match r.distance {
            Distance::Km(_) => format!("{} km", r.distance),
            Distance::NotComputable => r.distance.to_string(),
        },
        r.zone,
    )
}
