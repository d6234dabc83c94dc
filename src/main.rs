//! Binary entrypoint for the slideshow.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use slideshow::catalog::ImageCatalog;
use slideshow::cli::{Cli, exit_code};
use slideshow::playlist::PlaylistController;
use slideshow::tasks::{input, loader, slideshow as show, viewer};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{Level, error, info};
use tracing_subscriber::{EnvFilter, fmt};

fn init_tracing(verbosity: u8) -> Result<()> {
    // map -v to log level
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::from_default_env().add_directive(format!("slideshow={level}").parse()?);
    fmt().with_env_filter(filter).with_target(true).init();
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let (cfg, root) = cli.resolve()?;

    let catalog = Arc::new(
        ImageCatalog::build(&root, &cfg.scan_options())
            .with_context(|| format!("scanning {}", root.display()))?,
    );
    let playlist = Arc::new(match cfg.shuffle_seed {
        Some(seed) => PlaylistController::with_seed(Arc::clone(&catalog), cfg.history_size, seed)?,
        None => PlaylistController::new(Arc::clone(&catalog), cfg.history_size)?,
    });
    info!(
        root = %root.display(),
        images = catalog.len(),
        interval = %humantime::format_duration(cfg.interval),
        history = cfg.history_size,
        "starting slideshow"
    );

    let cancel = CancellationToken::new();
    let (cmd_tx, cmd_rx) = mpsc::channel(16);
    let (load_tx, load_rx) = mpsc::channel(4);
    let (invalid_tx, invalid_rx) = mpsc::channel(8);
    let (loaded_tx, loaded_rx) = mpsc::channel(2);

    let loader_task = tokio::spawn(loader::run(
        load_rx,
        invalid_tx,
        loaded_tx,
        cancel.clone(),
        cfg.loader_max_concurrent_decodes,
    ));
    let viewer_task = tokio::spawn(viewer::run(loaded_rx, cfg.viewport, cancel.clone()));
    tokio::spawn(input::run(
        tokio::io::BufReader::new(tokio::io::stdin()),
        cmd_tx,
        cancel.clone(),
        cli.exit_on_eof,
    ));
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("interrupt received");
                cancel.cancel();
            }
        }
    });

    let opts = show::SlideshowOptions {
        interval: cfg.interval,
        initial_delay: cfg.initial_delay,
    };
    let result = show::run(playlist, cmd_rx, invalid_rx, load_tx, opts, cancel.clone()).await;
    cancel.cancel();
    let _ = loader_task.await;
    let _ = viewer_task.await;
    result
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(err) = init_tracing(cli.verbose) {
        eprintln!("failed to initialise logging: {err:#}");
        return ExitCode::FAILURE;
    }

    let rt = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(err) => {
            error!(error = %err, "failed to start async runtime");
            return ExitCode::FAILURE;
        }
    };
    let result = rt.block_on(run(cli));
    // stdin reads block a worker thread; don't wait for them
    rt.shutdown_timeout(Duration::from_millis(200));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("slideshow: {err:#}");
            ExitCode::from(exit_code(&err))
        }
    }
}
