use std::path::PathBuf;

use anyhow::{Context, Result};
use biosignal_daemon::{load_config, Capture, DeviceHub, ReplaySummary};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Replay a recorded notification capture through the decoder.
#[derive(Parser, Debug)]
#[command(name = "notify_replay", version)]
struct Args {
    /// JSON capture to replay
    capture: PathBuf,

    /// Hub configuration file
    #[arg(long, default_value = "hub.json")]
    config: PathBuf,

    /// Print every delivery event as a JSON line instead of a summary
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "notify_replay=info,biosignal_daemon=info,biosignal_decoder=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let config = load_config(&args.config)?;
    let capture = Capture::from_file(&args.capture)?;
    tracing::info!(
        device = %capture.device,
        packets = capture.packets.len(),
        "Replaying capture"
    );

    let (hub, events) = DeviceHub::new(config);
    let json = args.json;
    let collector = tokio::spawn(async move {
        let mut summary = ReplaySummary::default();
        while let Ok(event) = events.recv_async().await {
            if json {
                println!("{}", serde_json::to_string(&event)?);
            } else {
                summary.record(&event);
            }
        }
        Ok::<_, serde_json::Error>(summary)
    });

    capture.replay(&hub).await?;
    hub.shutdown().await;

    let summary = collector
        .await
        .context("Event collector task failed")?
        .context("Failed to serialize delivery event")?;
    if !json {
        print!("{}", summary);
    }
    Ok(())
}
