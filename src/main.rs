//! multilevel-cache demo.
//!
//! Builds the configured level chain, drives a short sequence of puts and
//! gets, then prints every level's contents.

use clap::Parser;
use tracing::info;

use multilevel_cache::cache::multilevel::{new_shared_cache, SharedCache};
use multilevel_cache::config::{Cli, Config};

fn main() -> anyhow::Result<()> {
    // Parse CLI arguments.
    let cli = Cli::parse();

    // Initialize tracing/logging.
    let filter = if cli.verbose {
        "multilevel_cache=debug"
    } else {
        "multilevel_cache=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with_target(true)
        .init();

    info!("multilevel-cache v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration.
    let config = Config::load(&cli.config)?;

    info!(
        levels = config.levels.len(),
        total_capacity = config.total_capacity(),
        promotion = ?config.options.promotion,
        cascade = config.options.cascade_evictions,
        "Configuration loaded"
    );

    let cache = new_shared_cache(config.build()?);

    run_demo(&cache)?;
    display(&cache);

    if cli.metrics {
        print!("{}", cache.metrics().render()?);
    }

    Ok(())
}

fn run_demo(cache: &SharedCache) -> anyhow::Result<()> {
    cache.put("A", "1")?;
    cache.put("B", "2")?;
    cache.put("C", "3")?;

    println!("{}", show(cache.get("A")?));
    cache.put("D", "4")?;

    println!("{}", show(cache.get("C")?));
    Ok(())
}

fn show(value: Option<String>) -> String {
    value.unwrap_or_else(|| "(miss)".to_string())
}

fn display(cache: &SharedCache) {
    for level in cache.snapshot() {
        println!("{level}");
    }
}
