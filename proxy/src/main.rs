//! `fancy-proxy`: a caching forward HTTP proxy.
//!
//! Positional/flag CLI surface: `port` (default 8992), `cached` and
//! `verbose` (both default `"true"`, each parsed by literal match against
//! the string `"true"` rather than a conventional bool parser — any other
//! value, including `"false"`, yields `false`). This preserves the source's
//! exact parsing rule.

use anyhow::Context;
use clap::Parser;
use signal_hook::consts::SIGINT;
use tracing::info;

use fancy_proxy::config::{ProxyConfig, DEFAULT_PORT};
use fancy_proxy::{logger, ProxyEngine};

/// Caching forward HTTP proxy.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to listen on.
    #[arg(default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Whether the LRU response cache is consulted and populated. Any value
    /// other than the literal string "true" is treated as false.
    #[arg(default_value = "true")]
    cached: String,

    /// Whether debug-level log lines are emitted. Same literal-match rule
    /// as `cached`.
    #[arg(default_value = "true")]
    verbose: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let cached = args.cached == "true";
    let verbose = args.verbose == "true";

    logger::init(verbose);

    let config = ProxyConfig::new(args.port, cached, verbose);
    let engine = ProxyEngine::new(config).context("failed to construct proxy engine")?;

    // signal_hook flips the flag directly on SIGINT; the dispatcher notices
    // it after its next accept() wakes up, same as any other stop request.
    signal_hook::flag::register(SIGINT, engine.shutdown_flag())
        .context("failed to register SIGINT handler")?;

    info!("fancy-proxy starting");
    engine.run();
    info!("fancy-proxy shut down cleanly");
    Ok(())
}
