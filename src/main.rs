//! Cross-exchange spread monitor entry point.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use spread_watch::api::{create_router, AppState};
use spread_watch::arbitrage::{CooldownLedger, SpreadEvaluator};
use spread_watch::config::Config;
use spread_watch::control::{spawn_settings_task, ControlSurface, RuntimeSettings};
use spread_watch::error::BotError;
use spread_watch::exchange::{build_http_client, AdapterRegistry, VenueKind};
use spread_watch::metrics;
use spread_watch::notify::{LogSink, Notifier, TelegramSink};
use spread_watch::scanner::{ScanLoopHandle, Scanner};
use spread_watch::uptime::Pinger;
use spread_watch::utils::shutdown_signal;

/// How long shutdown waits for an in-flight cycle.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

/// Cross-exchange crypto spread monitor.
#[derive(Parser, Debug)]
#[command(name = "spread-watch")]
#[command(about = "Watches bid/ask spreads across crypto exchanges and alerts on Telegram")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the monitor and HTTP server (default).
    Run {
        /// HTTP server port, overrides PORT.
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Check configuration validity.
    CheckConfig,

    /// Run a single scan cycle and print its report.
    ScanOnce,

    /// Watch PING_URL and announce outages.
    Ping,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = if args.verbose {
        EnvFilter::new("spread_watch=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(args.json_logs.then(|| fmt::layer().json()))
        .with((!args.json_logs).then(fmt::layer))
        .init();

    match args.command {
        Some(Command::CheckConfig) => cmd_check_config().await,
        Some(Command::ScanOnce) => cmd_scan_once().await,
        Some(Command::Ping) => cmd_ping().await,
        Some(Command::Run { port }) => cmd_run(port).await,
        None => cmd_run(None).await,
    }
}

/// Load and validate configuration.
fn load_config() -> spread_watch::Result<Config> {
    let config = Config::load()?;
    config.validate().map_err(BotError::InvalidConfig)?;
    Ok(config)
}

/// Telegram when both credentials are set, otherwise log only.
fn build_notifier(config: &Config) -> spread_watch::Result<Notifier> {
    let levels = config.orderbook_levels;
    match (&config.telegram_bot_token, &config.telegram_chat_id) {
        (Some(token), Some(chat)) if config.telegram_configured() => {
            let sink = TelegramSink::new(
                token,
                chat,
                Duration::from_secs(config.notify_timeout_secs),
            )?;
            Ok(Notifier::new(Arc::new(sink), levels))
        }
        _ => {
            warn!("TELEGRAM_BOT_TOKEN or TELEGRAM_CHAT_ID missing, notifications go to the log");
            Ok(Notifier::new(Arc::new(LogSink), levels))
        }
    }
}

/// Adapters, evaluator and scanner from configuration.
fn build_scanner(
    config: &Config,
    settings: Arc<RuntimeSettings>,
    notifier: Notifier,
) -> spread_watch::Result<Scanner> {
    let http = build_http_client(config.exchange_timeout())?;
    let registry = AdapterRegistry::from_names(&config.exchanges, http, config.pair_concurrency);
    if registry.is_empty() {
        return Err(BotError::InvalidConfig(format!(
            "none of EXCHANGES is supported; choose from {}",
            VenueKind::supported().join(", ")
        )));
    }

    let pairs = config.tracked_pairs().map_err(BotError::InvalidConfig)?;
    let ledger = Arc::new(CooldownLedger::new(config.alert_cooldown()));
    let evaluator = SpreadEvaluator::new(config.evaluator_config(), ledger);

    Ok(Scanner::new(
        registry,
        pairs,
        evaluator,
        settings,
        notifier,
        config.exchange_deadline(),
    ))
}

fn runtime_settings(config: &Config) -> spread_watch::Result<Arc<RuntimeSettings>> {
    let fees = config.fee_overrides().map_err(BotError::InvalidConfig)?;
    Ok(Arc::new(RuntimeSettings::new(
        config.spread_threshold,
        config.poll_interval_secs,
        fees,
    )))
}

/// Run the monitor until a shutdown signal.
async fn cmd_run(port_override: Option<u16>) -> anyhow::Result<()> {
    info!("Loading configuration...");
    let config = load_config().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;
    let port = port_override.unwrap_or(config.port);

    let recorder = metrics::install_recorder().map_err(anyhow::Error::msg)?;

    let settings = runtime_settings(&config)?;
    let (settings_client, settings_task) = spawn_settings_task(Arc::clone(&settings));
    let notifier = build_notifier(&config)?;
    let scanner = Arc::new(build_scanner(&config, settings, notifier.clone())?);

    info!(
        exchanges = ?scanner.registry().ids(),
        pairs = scanner.pairs().len(),
        threshold = %config.spread_threshold,
        poll_interval_secs = config.poll_interval_secs,
        liquidity_check = config.liquidity_check_enabled,
        liquidity_policy = %config.liquidity_policy,
        sink = notifier.sink_name(),
        "Configuration loaded"
    );

    let handle = ScanLoopHandle::new();
    let control = ControlSurface::new(
        settings_client,
        handle.clone(),
        scanner.pairs().to_vec(),
        scanner.registry().ids(),
    );
    let app_state = AppState::new(
        Arc::clone(scanner.status()),
        control,
        notifier,
        config.relay_token.clone(),
    )
    .with_metrics(recorder);

    if app_state.relay_token.is_none() {
        info!("RELAY_TOKEN not set, /alert will refuse all requests");
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await.map_err(BotError::from)?;
    info!("HTTP server listening on {}", addr);

    let scan_task = Arc::clone(&scanner).spawn(&handle);

    axum::serve(listener, create_router(app_state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(BotError::from)?;

    info!("HTTP server stopped, waiting for the scan loop");
    drop(handle);
    match tokio::time::timeout(SHUTDOWN_GRACE, scan_task).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!(error = %e, "Scan loop task failed"),
        Err(_) => warn!("Scan loop did not stop within {:?}", SHUTDOWN_GRACE),
    }
    settings_task.abort();

    info!("spread-watch stopped");
    Ok(())
}

/// Check configuration validity.
async fn cmd_check_config() -> anyhow::Result<()> {
    println!("======================================================================");
    println!("SPREAD WATCH - CONFIGURATION CHECK");
    println!("======================================================================");

    print!("Loading configuration... ");
    let config = match Config::load() {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration load failed"));
        }
    };

    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    print!("Resolving exchanges... ");
    let (known, unknown): (Vec<&String>, Vec<&String>) = config
        .exchanges
        .iter()
        .filter(|e| !e.trim().is_empty())
        .partition(|e| e.trim().parse::<VenueKind>().is_ok());
    if known.is_empty() {
        println!("FAILED");
        println!("  Supported: {}", VenueKind::supported().join(", "));
        return Err(anyhow::anyhow!("No supported exchanges configured"));
    }
    println!("OK");
    for name in &unknown {
        println!("  WARNING: unsupported exchange `{}` will be skipped", name);
    }

    let fees = config.fee_overrides().map_err(anyhow::Error::msg)?;

    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  Exchanges: {}", known.len());
    println!("  Pairs: {}", config.tracked_pairs().map_err(anyhow::Error::msg)?.len());
    println!("  Poll Interval: {}s", config.poll_interval_secs);
    println!("  Spread Threshold: {}", config.spread_threshold);
    println!(
        "  Sanity Bound: {}",
        if config.sanity_check_enabled {
            config.max_spread.to_string()
        } else {
            "Disabled".to_string()
        }
    );
    println!(
        "  Liquidity Check: {} (min ${}, top {} levels, {})",
        if config.liquidity_check_enabled { "Enabled" } else { "Disabled" },
        config.min_liquidity_usd,
        config.orderbook_levels,
        config.liquidity_policy
    );
    println!("  Cooldown: {}s", config.alert_cooldown_secs);
    println!("  Fee Overrides: {}", fees.len());
    println!(
        "  Telegram: {}",
        if config.telegram_configured() { "Configured" } else { "Log only" }
    );
    println!(
        "  Relay Token: {}",
        if config.relay_token.is_some() { "Set" } else { "Not set" }
    );
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// One cycle with log-only delivery; prints the report as JSON.
async fn cmd_scan_once() -> anyhow::Result<()> {
    let config = load_config()?;
    let settings = runtime_settings(&config)?;
    let notifier = Notifier::new(Arc::new(LogSink), config.orderbook_levels);
    let scanner = build_scanner(&config, settings, notifier)?;

    info!(
        exchanges = scanner.registry().len(),
        pairs = scanner.pairs().len(),
        "Running a single scan cycle"
    );
    let report = scanner.run_cycle().await;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Ping PING_URL until interrupted.
async fn cmd_ping() -> anyhow::Result<()> {
    let config = load_config()?;
    let url = config
        .ping_url
        .clone()
        .ok_or_else(|| anyhow::anyhow!("PING_URL must be set for ping mode"))?;
    let notifier = build_notifier(&config)?;
    let pinger = Pinger::new(
        &url,
        Duration::from_secs(config.ping_interval_secs),
        notifier,
    )?;

    tokio::select! {
        _ = pinger.run() => {}
        _ = shutdown_signal() => {}
    }
    Ok(())
}
