//! Process startup: arguments, configuration, logging, then the scheduler
//!
//! Any failure before the scheduler starts is fatal and yields exit status 1.
//! Once running, only a shutdown signal ends the process.

use super::cli::Args;
use super::config::{read_credential, ConfigError, Settings};
use crate::anchor::{AnchorStore, FileAnchorStore, MemoryAnchorStore};
use crate::core::error_handling::log_error_with_context;
use crate::core::logging::init_logging;
use crate::core::shutdown::ShutdownCoordinator;
use crate::core::version::long_version;
use crate::emitter::{FindingEmitter, GitHubEmitter, LogEmitter};
use crate::registry::SourceRegistry;
use crate::scanner::IncrementalScanner;
use crate::scheduler::{Pipeline, Scheduler, SchedulerConfig};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

/// Run the daemon and return the process exit status
pub async fn startup() -> i32 {
    let args = Args::parse();

    // Configuration is read before logging starts so its log settings apply;
    // a load failure is reported once the logger is up.
    let settings = Settings::load(args.config_file.as_deref()).await;

    let log_settings = settings.as_ref().ok().map(|s| &s.log);
    let log_level = args
        .log_level
        .clone()
        .or_else(|| log_settings.and_then(|l| l.level.clone()));
    let log_format = args
        .log_format
        .clone()
        .or_else(|| log_settings.and_then(|l| l.format.clone()));
    let log_file: Option<PathBuf> = args
        .log_file
        .clone()
        .or_else(|| log_settings.and_then(|l| l.file.clone()));
    let log_file = log_file.map(|p| p.to_string_lossy().into_owned());

    if let Err(e) = init_logging(
        log_level.as_deref(),
        log_format.as_deref(),
        log_file.as_deref(),
        args.use_color(),
    ) {
        eprintln!("osprey: failed to initialise logging: {}", e);
        return 1;
    }

    log::info!("osprey {} starting", long_version());

    let settings = match settings {
        Ok(settings) => settings,
        Err(e) => {
            log_error_with_context(&e, "Loading configuration");
            return 1;
        }
    };

    match run(&args, settings).await {
        Ok(()) => {
            log::info!("osprey stopped");
            0
        }
        Err(e) => {
            log_error_with_context(&e, "Starting osprey");
            1
        }
    }
}

async fn run(args: &Args, settings: Settings) -> Result<(), ConfigError> {
    let registry = SourceRegistry::from_settings(&settings)?;

    let (anchors, emitter): (Arc<dyn AnchorStore>, Arc<dyn FindingEmitter>) = if args.dry_run {
        log::warn!("dry run: findings are logged only and anchors are kept in memory");
        (Arc::new(MemoryAnchorStore::new()), Arc::new(LogEmitter::new()))
    } else {
        let store = FileAnchorStore::new(&settings.anchor_root);
        store.prepare().await?;
        log::debug!("anchor records under {}", store.root().display());

        let token = read_credential()?;
        let github = GitHubEmitter::new(&settings.github_api_url, &token)?;
        let login = github.authenticate().await?;
        log::info!("authenticated to {} as {}", settings.github_api_url, login);

        (Arc::new(store), Arc::new(github))
    };

    let scanner = IncrementalScanner::new(settings.error_keyword.clone());
    let pipeline = Arc::new(Pipeline::new(anchors, scanner, emitter));

    let shutdown = ShutdownCoordinator::new();
    shutdown.install_signal_handlers();

    let config = SchedulerConfig {
        interval: settings.interval,
        max_workers: settings.max_workers,
    };
    let scheduler = Scheduler::new(registry, pipeline, config, &shutdown);

    if args.once {
        scheduler.run_once().await;
    } else {
        scheduler.run(&shutdown).await;
    }

    Ok(())
}
