use std::{path::PathBuf, time::Duration};

use clap::{Parser, Subcommand};
use crowd_app::ContextProvider;
use dashboard::{
    BackendClient, Config, LiveMonitor, SelectedFile, UploadPreview, backend,
    page::{Location, MediaElement, TextDisplay},
    upload_preview::SimulatedCount,
};

#[derive(Debug, Parser)]
#[command(name = "dashboard", about = "Crowd monitor dashboard")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Follow the live people count until interrupted
    Monitor {
        /// Stop after this many completed poll cycles
        #[arg(long)]
        cycles: Option<u64>,
    },
    /// Preview a local video and report its (simulated) people count
    Preview {
        file: PathBuf,
        /// Open the heatmap page once the count is in
        #[arg(long)]
        heatmap: bool,
    },
    /// Start detection on the backend
    StartStream,
    /// Stop detection on the backend
    StopStream,
    /// Check that the backend is up
    Health,
}

#[derive(Debug, Clone)]
struct AppContext {
    config: Config,
}

impl ContextProvider<Config> for AppContext {
    async fn new(config: Config) -> Self {
        Self { config }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let context =
        crowd_app::create_app_context::<AppContext, Config>().await?;
    context.config.validate()?;

    let http = backend::http_client(context.config.request_timeout())?;
    let backend = BackendClient::new(http, &context.config.backend_url)?;

    match cli.command {
        Command::Monitor { cycles } => monitor(&context, backend, cycles).await,
        Command::Preview { file, heatmap } => {
            preview(&context, file, heatmap).await?;
        }
        Command::StartStream => {
            let response = backend.start_stream().await?;
            println!("{}", serde_json::to_string(&response)?);
        }
        Command::StopStream => {
            let response = backend.stop_stream().await?;
            println!("{}", serde_json::to_string(&response)?);
        }
        Command::Health => {
            let response = backend.health().await?;
            println!("{}", serde_json::to_string(&response)?);
            if !response.is_ok() {
                return Err(format!("backend reports {}", response.status).into());
            }
        }
    }

    Ok(())
}

async fn monitor(context: &AppContext, backend: BackendClient, cycles: Option<u64>) {
    let feed = MediaElement::new("videoFeed");
    let count = TextDisplay::new("peopleCount");
    let settings = context.config.monitor_settings(&backend);

    let mut monitor = LiveMonitor::new(backend, feed, count.clone(), settings);
    monitor.start();

    tokio::select! {
        () = shutdown_signal() => {},
        () = async {
            let Some(cycles) = cycles else {
                return std::future::pending().await;
            };
            while monitor.stats().completed() < cycles {
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
        } => {},
    }

    monitor.stop();

    let stats = monitor.stats();
    tracing::info!(
        succeeded = stats.succeeded,
        failed = stats.failed,
        skipped = stats.skipped,
        "monitor finished"
    );
    println!("{}", count.text());
}

async fn preview(
    context: &AppContext,
    file: PathBuf,
    heatmap: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    // a file input only ever hands over files that exist
    tokio::fs::metadata(&file).await?;

    let player = MediaElement::new("videoPlayer");
    let status = TextDisplay::new("people-count");
    let location = Location::new();

    let mut preview = UploadPreview::new(
        SimulatedCount::new(),
        player,
        status.clone(),
        location.clone(),
        context.config.preview_settings(),
    );

    preview.on_file_selected(Some(SelectedFile::new(file)));
    println!("{}", status.text());

    preview.settle().await;
    println!("{}", status.text());

    if heatmap {
        preview.on_generate_heatmap();
        if let Some(href) = location.href() {
            println!("{href}");
        }
    }

    preview.dispose();

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(
            tokio::signal::unix::SignalKind::terminate(),
        ) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::warn!("signal received, stopping");
}
