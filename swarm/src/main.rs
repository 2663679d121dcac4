//! Guardian Swarm Layer - Main entry point
//!
//! Fetches chaindata snapshots on an interval and turns each one into a
//! ranked action plan.

use std::sync::Arc;

use anyhow::Context;
use clap::{Arg, Command};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use guardian_chaindata::{FixtureProvider, Network, SnapshotProvider};
use guardian_swarm::{GuardianConfig, GuardianEngine, Result, StaticScorer, VERSION};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let matches = Command::new("guardian")
        .version(VERSION)
        .about("DeFi Guardian Swarm - multi-domain threat coordination")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path"),
        )
        .arg(
            Arg::new("network")
                .short('n')
                .long("network")
                .value_name("CLUSTER")
                .help("Solana cluster (mainnet-beta, devnet, testnet)")
                .default_value("mainnet-beta"),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .help("Evaluate and log plans, but mark every plan advisory")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("once")
                .long("once")
                .help("Run a single evaluation cycle and exit")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("generate-config")
                .long("generate-config")
                .value_name("OUTPUT")
                .help("Generate example config and exit"),
        )
        .arg(
            Arg::new("log-level")
                .short('l')
                .long("log-level")
                .value_name("LEVEL")
                .help("Log level (trace, debug, info, warn, error)")
                .default_value("info"),
        )
        .get_matches();

    // Initialize logging
    let log_level = matches.get_one::<String>("log-level").unwrap();
    init_logging(log_level)?;

    // Handle config generation
    if let Some(output_path) = matches.get_one::<String>("generate-config") {
        let config = GuardianConfig::default();
        config
            .save_to_file(output_path)
            .with_context(|| format!("failed to write example config to {}", output_path))?;
        info!("Generated example config at: {}", output_path);
        return Ok(());
    }

    info!(version = VERSION, "🛡️ Guardian Swarm Layer starting...");

    // Load configuration
    let config = if let Some(config_path) = matches.get_one::<String>("config") {
        info!("Loading config from: {}", config_path);
        GuardianConfig::from_file(config_path)
            .with_context(|| format!("failed to load config from {}", config_path))?
    } else {
        GuardianConfig::from_env_or_default()?
    };

    let dry_run = matches.get_flag("dry-run");
    if dry_run {
        warn!("🔶 Running in DRY-RUN mode - every plan will be advisory");
    }

    let network: Network = matches.get_one::<String>("network").unwrap().parse()?;

    info!(network = %network, "Using fixture snapshot provider");
    let provider = FixtureProvider::new(network);

    let engine = GuardianEngine::new(config.clone(), Arc::new(StaticScorer::new()))?;

    info!("🚀 Guardian ready!");
    info!("Cycle interval: {}s", config.cycle.interval_secs);

    if matches.get_flag("once") {
        run_cycle_once(&engine, &provider, dry_run).await?;
        return Ok(());
    }

    // Set up graceful shutdown
    let shutdown_signal = setup_shutdown_signal();

    tokio::select! {
        result = run_cycle_loop(&engine, &provider, &config, dry_run) => {
            info!("Cycle loop stopped");
            result?;
        }
        _ = shutdown_signal => {
            info!("Shutdown signal received");
        }
    }

    info!("Guardian Swarm Layer stopped");
    Ok(())
}

/// Initialize logging
fn init_logging(log_level: &str) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => {
            eprintln!("Invalid log level: {}. Using 'info'", log_level);
            tracing::Level::INFO
        }
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("guardian_swarm={}", level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    Ok(())
}

/// Fetch one bundle, run one cycle, log the plan
async fn run_cycle_once(
    engine: &GuardianEngine,
    provider: &FixtureProvider,
    dry_run: bool,
) -> Result<()> {
    let bundle = provider.fetch().await?;
    let mut plan = engine.run_cycle(&bundle).await?;
    if dry_run {
        plan.advisory = true;
    }

    if plan.is_empty() {
        info!(plan_id = %plan.plan_id, "No actions this cycle");
    } else {
        info!(
            plan_id = %plan.plan_id,
            advisory = plan.advisory,
            "💡 Plan with {} action(s)",
            plan.entries.len()
        );
        for entry in &plan.entries {
            info!(
                "  #{} {} [{}] confidence={:.2} ({} signal(s))",
                entry.priority_rank,
                entry.action.as_str(),
                entry.severity,
                entry.confidence,
                entry.justification.len()
            );
        }
    }
    if !plan.degraded_domains.is_empty() {
        warn!(
            "Degraded domains this cycle: {}",
            plan.degraded_domains
                .iter()
                .map(|d| d.name())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    Ok(())
}

/// Main evaluation loop
async fn run_cycle_loop(
    engine: &GuardianEngine,
    provider: &FixtureProvider,
    config: &GuardianConfig,
    dry_run: bool,
) -> Result<()> {
    let mut interval =
        tokio::time::interval(tokio::time::Duration::from_secs(config.cycle.interval_secs));

    loop {
        interval.tick().await;

        if let Err(e) = run_cycle_once(engine, provider, dry_run).await {
            // A bad cycle never stops the guardian
            warn!("Cycle failed: {}", e);
        }
    }
}

/// Set up graceful shutdown on Ctrl+C or SIGTERM
async fn setup_shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
