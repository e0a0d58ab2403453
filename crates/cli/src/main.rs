//! # k8sdns
//!
//! Answers A, AAAA and CNAME lookups from records derived from upstream
//! service objects. Events are replayed from a JSON-lines file; queries are
//! read from stdin.

mod bootstrap;
mod di;
mod server;

use clap::Parser;
use k8sdns_domain::CliOverrides;
use k8sdns_infrastructure::dns::CacheUpdater;
use k8sdns_infrastructure::watch::FileEventSource;
use k8sdns_jobs::JobRunner;
use tokio::io::BufReader;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "k8sdns")]
#[command(version)]
#[command(about = "DNS answers for external service addresses")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short = 'c', long)]
    config: Option<String>,

    /// JSON-lines file of upstream service events
    #[arg(short = 'e', long)]
    events: Option<String>,

    /// Default record TTL in seconds
    #[arg(long)]
    ttl: Option<u32>,

    /// Zones to answer for (comma-separated)
    #[arg(short = 'z', long, value_delimiter = ',')]
    zones: Option<Vec<String>>,

    /// Prefix of the hostname/ttl/cname annotations
    #[arg(long)]
    annotation_prefix: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let overrides = CliOverrides {
        ttl: cli.ttl,
        annotation_prefix: cli.annotation_prefix,
        zones: cli.zones,
        log_level: cli.log_level,
    };
    let config = bootstrap::load_config(cli.config.as_deref(), overrides)?;
    bootstrap::init_logging(&config);

    info!("Starting k8sdns v{}", env!("CARGO_PKG_VERSION"));

    let (services, reconciler) = di::Services::new(&config);
    let shutdown = CancellationToken::new();

    let compaction = (config.reconciler.compaction_interval_secs > 0).then(|| {
        CacheUpdater::new(
            services.cache.clone(),
            config.reconciler.compaction_interval_secs,
        )
        .with_cancellation(shutdown.child_token())
        .start()
    });

    let mut runner = JobRunner::new(shutdown.clone())
        .with_event_buffer(config.reconciler.event_buffer)
        .with_reconciler(reconciler);
    match cli.events {
        Some(path) => {
            let source =
                FileEventSource::new(path).with_namespaces(config.plugin.namespaces.clone());
            runner = runner.with_event_source(Box::new(source));
        }
        None => warn!("No event file given; only pushed records will be answered"),
    }
    let jobs = runner.start();

    let console = server::QueryConsole::new(
        services.lookup.clone(),
        services.push.clone(),
        services.cache.clone(),
        services.metrics.clone(),
    );

    tokio::select! {
        result = server::run_console(
            &console,
            BufReader::new(tokio::io::stdin()),
            tokio::io::stdout(),
            shutdown.clone(),
        ) => result?,
        _ = tokio::signal::ctrl_c() => info!("Interrupt received"),
    }

    info!(state = %services.status.state(), "Shutting down");
    jobs.shutdown().await;
    if let Some(task) = compaction {
        task.await?;
    }

    let stats = services.metrics.snapshot();
    info!(
        requests = stats.requests,
        cache_hits = stats.cache_hits,
        records = stats.records,
        "k8sdns stopped"
    );
    Ok(())
}
