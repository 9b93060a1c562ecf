//! fractal CLI - inspect and exercise fractal_map from the command line
//!
//! `stats` builds a map and reports the shape of its trie; `bench` drives
//! put/get/remove workloads through a chosen view and reports throughput and
//! the slowest single operation.

use anyhow::Context;
use clap::{Parser, Subcommand};
use fractal_map::{order, FastMap, MapView, SharedOrder, TrieConfig};
use serde::Serialize;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fractal")]
#[command(about = "Inspect and benchmark fractal hashed-trie maps")]
#[command(version)]
struct Cli {
    /// Trie configuration file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the index bits consumed per trie level
    #[arg(long)]
    fanout_bits: Option<u8>,

    /// Override the bucket size that triggers a split
    #[arg(long)]
    split_threshold: Option<usize>,

    /// Output format (json or text)
    #[arg(short, long, default_value = "json")]
    format: OutputFormat,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
enum KeyOrder {
    Standard,
    Lexical,
    LexicalCaseInsensitive,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
enum ViewKind {
    Plain,
    Atomic,
    Shared,
    Linked,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a map of string keys and report its trie shape
    Stats {
        /// Number of keys to insert
        #[arg(short = 'n', long, default_value = "10000")]
        count: usize,
        /// Key order
        #[arg(short, long, default_value = "standard")]
        order: KeyOrder,
    },

    /// Run put/get/remove workloads and report throughput
    Bench {
        /// Number of keys per phase
        #[arg(short = 'n', long, default_value = "100000")]
        count: usize,
        /// View the workload runs through
        #[arg(long, default_value = "atomic")]
        view: ViewKind,
        /// Worker threads; keys are split evenly between them
        #[arg(short, long, default_value = "1")]
        threads: usize,
    },
}

/// Timing of one workload phase
#[derive(Debug, Default, Serialize)]
struct PhaseReport {
    ops: usize,
    elapsed_ms: f64,
    ops_per_sec: f64,
    worst_op_us: f64,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(&cli)?;
    debug!(?config, "resolved trie configuration");

    match cli.command {
        Commands::Stats { count, order } => {
            let map = FastMap::with_config(string_order(order), config)?;
            for i in 0..count {
                map.put(format!("key-{i}"), i)?;
            }
            let stats = map.stats();
            info!(len = stats.len, depth = stats.depth, "built map");
            output(
                cli.format,
                &serde_json::json!({
                    "config": config,
                    "order": format!("{order:?}"),
                    "stats": stats,
                }),
            )?;
        }

        Commands::Bench {
            count,
            view,
            threads,
        } => {
            anyhow::ensure!(threads > 0, "threads must be at least 1");
            let base: FastMap<u64, u64> = FastMap::with_config(order::standard(), config)?;
            let phases = match view {
                ViewKind::Plain => run_bench(&base, count, threads)?,
                ViewKind::Atomic => run_bench(&base.atomic(), count, threads)?,
                ViewKind::Shared => run_bench(&base.shared(), count, threads)?,
                ViewKind::Linked => run_bench(&base.atomic().linked(), count, threads)?,
            };
            let [put, get, remove] = phases;
            output(
                cli.format,
                &serde_json::json!({
                    "config": config,
                    "view": format!("{view:?}"),
                    "threads": threads,
                    "put": put,
                    "get": get,
                    "remove": remove,
                    "final_len": base.len(),
                }),
            )?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> anyhow::Result<TrieConfig> {
    let mut config = match &cli.config {
        Some(path) => TrieConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => TrieConfig::default(),
    };
    if let Some(bits) = cli.fanout_bits {
        config.fanout_bits = bits;
    }
    if let Some(threshold) = cli.split_threshold {
        config.split_threshold = threshold;
    }
    config.validate()?;
    Ok(config)
}

fn string_order(key_order: KeyOrder) -> SharedOrder<String> {
    match key_order {
        KeyOrder::Standard => order::standard(),
        KeyOrder::Lexical => order::lexical(),
        KeyOrder::LexicalCaseInsensitive => order::lexical_case_insensitive(),
    }
}

/// Run the put, get and remove phases in turn, each across `threads` workers
fn run_bench<M>(map: &M, count: usize, threads: usize) -> anyhow::Result<[PhaseReport; 3]>
where
    M: MapView<Key = u64, Value = u64> + Sync,
{
    let put = run_phase(count, threads, |key| map.put(key, key).map(|_| ()))?;
    info!(len = map.len(), "put phase done");
    let get = run_phase(count, threads, |key| {
        map.get(&key);
        Ok(())
    })?;
    let remove = run_phase(count, threads, |key| map.remove(&key).map(|_| ()))?;
    Ok([put, get, remove])
}

fn run_phase<F>(count: usize, threads: usize, op: F) -> anyhow::Result<PhaseReport>
where
    F: Fn(u64) -> fractal_map::Result<()> + Sync,
{
    let chunk = count.div_ceil(threads);
    let start = Instant::now();

    let worst = std::thread::scope(|scope| {
        let workers: Vec<_> = (0..threads)
            .map(|t| {
                let op = &op;
                let keys = (t * chunk).min(count)..((t + 1) * chunk).min(count);
                scope.spawn(move || -> fractal_map::Result<Duration> {
                    let mut worst = Duration::ZERO;
                    for key in keys {
                        let began = Instant::now();
                        op(key as u64)?;
                        worst = worst.max(began.elapsed());
                    }
                    Ok(worst)
                })
            })
            .collect();

        let mut worst = Duration::ZERO;
        for worker in workers {
            let result = worker
                .join()
                .map_err(|_| anyhow::anyhow!("benchmark worker panicked"))?;
            worst = worst.max(result?);
        }
        Ok::<_, anyhow::Error>(worst)
    })?;

    let elapsed = start.elapsed();
    let secs = elapsed.as_secs_f64();
    Ok(PhaseReport {
        ops: count,
        elapsed_ms: secs * 1000.0,
        ops_per_sec: if secs > 0.0 { count as f64 / secs } else { 0.0 },
        worst_op_us: worst.as_secs_f64() * 1_000_000.0,
    })
}

fn output(format: OutputFormat, value: &serde_json::Value) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string(value)?);
        }
        OutputFormat::Text => print_text(value, 0),
    }
    Ok(())
}

fn print_text(value: &serde_json::Value, indent: usize) {
    let pad = "  ".repeat(indent);
    match value {
        serde_json::Value::Object(fields) => {
            for (name, field) in fields {
                if field.is_object() {
                    println!("{pad}{name}:");
                    print_text(field, indent + 1);
                } else {
                    println!("{pad}{name}: {}", plain(field));
                }
            }
        }
        other => println!("{pad}{}", plain(other)),
    }
}

fn plain(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
