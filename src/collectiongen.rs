use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use zmage_select::io::{generate_assets, CollectionFixture};

/// Virtual collection generator
#[derive(Parser, Debug)]
#[command(name = "zmage-collectiongen")]
#[command(about = "Generates a seeded asset collection fixture for zmage-replay", long_about = None)]
struct Args {
    /// Number of assets
    #[arg(short = 'n', long, default_value = "200")]
    count: usize,

    /// Seed for reproducible output
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Output file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let fixture = CollectionFixture {
        seed: args.seed,
        assets: generate_assets(args.count, args.seed),
    };
    let json = serde_json::to_string_pretty(&fixture)?;

    match &args.out {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
            tracing::info!(count = args.count, path = %path.display(), "fixture written");
            println!("Collection written to: {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
