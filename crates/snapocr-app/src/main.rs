use std::path::PathBuf;

use clap::Parser;
use snapocr_types::{ActivationSource, AppEvent, Rectangle};
use tokio::signal;
use tracing_subscriber::EnvFilter;

mod command;
mod controller;
mod events;
mod io;
mod presenter;
mod profile;

use self::controller::AppController;

/// Select a screen region and turn it into text with a local vision model
#[derive(Parser, Debug)]
#[command(name = "snapocr", version)]
struct Args {
    /// JSON profile (defaults to ./snapocr.json when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Select this region automatically when the overlay opens: L,T,R,B
    #[arg(long, value_parser = command::parse_region)]
    region: Option<Rectangle>,

    /// Capture right away and exit once that session ends
    #[arg(long)]
    once: bool,

    /// Do not register the global hotkey
    #[arg(long)]
    no_hotkey: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // stdout carries the recognized text
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.with_ansi(atty::is(atty::Stream::Stderr)).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv = dotenvy::dotenv();
    let args = Args::parse();
    init_logging(args.log_json);

    if let Ok(path) = dotenv {
        tracing::debug!("Loaded environment from {}", path.display());
    }
    tracing::info!("snapocr v{} starting", env!("CARGO_PKG_VERSION"));

    let config = profile::load_config(args.config.as_deref())?;
    let controller = AppController::new(config);
    let coordinator = controller.build_coordinator(args.region)?;
    let mut watchers = controller.spawn_watchers(!args.no_hotkey && !args.once);

    // Shutdown on Ctrl+C
    let cancel = controller.cancel_token();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown requested");
            cancel.cancel();
        }
    });

    if args.once {
        controller
            .event_sender()
            .send(AppEvent::Activate(ActivationSource::Command))
            .await?;
    }

    let status = controller.run(coordinator, args.once).await?;
    controller.shutdown();

    while let Some(result) = watchers.join_next().await {
        match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!("watcher exited with error: {:#}", e),
            Err(e) => tracing::error!("watcher task panicked: {}", e),
        }
    }

    tracing::info!(
        "Exiting after {} sessions ({} recognized, {} failed, {} cancelled)",
        status.sessions_started,
        status.recognitions_completed,
        status.recognition_failures,
        status.sessions_cancelled
    );
    Ok(())
}
