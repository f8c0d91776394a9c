//! Cache Utility - workload driver
//!
//! Runs a multi-threaded mixed workload against a cache built from the
//! environment and prints the resulting statistics as JSON.

use std::thread;
use std::time::Duration;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cache_utility::{Cache, Config, Ttl};

const WORKERS: usize = 8;
const OPS_PER_WORKER: usize = 1000;
const KEYS_PER_WORKER: usize = 64;

/// Main entry point for the workload driver.
///
/// # Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Run the mixed Set/Get/Delete workload on worker threads
/// 4. Invalidate one worker's keys and run a cleanup pass
/// 5. Print the final statistics snapshot
fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cache_utility=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    info!(
        "Configuration loaded: max_size={}, default_ttl={}ms, max_ttl={:?}",
        config.max_size,
        config.default_ttl.as_millis(),
        config.max_ttl
    );

    let cache: Cache<String> = Cache::with_config(config).context("invalid cache configuration")?;

    thread::scope(|s| -> anyhow::Result<()> {
        let workers: Vec<_> = (0..WORKERS)
            .map(|worker| {
                let cache = cache.clone();
                s.spawn(move || run_worker(&cache, worker))
            })
            .collect();

        for handle in workers {
            handle
                .join()
                .map_err(|_| anyhow::anyhow!("worker thread panicked"))??;
        }
        Ok(())
    })?;
    info!("Workload finished with {} live entries", cache.len());

    let invalidated = cache.invalidate_pattern("worker:0:*")?;
    let expired = cache.cleanup();
    info!(
        "Post-run maintenance: invalidated={}, expired={}",
        invalidated, expired
    );

    println!("{}", serde_json::to_string_pretty(&cache.stats())?);
    Ok(())
}

/// Runs one worker's share of the mixed workload.
fn run_worker(cache: &Cache<String>, worker: usize) -> cache_utility::Result<()> {
    for op in 0..OPS_PER_WORKER {
        let key = format!("worker:{}:{}", worker, (op * 7 + worker) % KEYS_PER_WORKER);
        match op % 4 {
            0 | 1 => {
                let ttl = if op % 3 == 0 {
                    Ttl::After(Duration::from_millis(1))
                } else {
                    Ttl::Default
                };
                cache.set(key, format!("value-{}", op), ttl)?;
            }
            2 => {
                cache.get(&key)?;
            }
            _ => {
                cache.delete(&key)?;
            }
        }
    }
    Ok(())
}
