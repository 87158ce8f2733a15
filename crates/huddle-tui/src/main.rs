//! Huddle TUI entry point.
//!
//! # Usage
//!
//! ```bash
//! # Join the in-process demo room
//! huddle-tui
//!
//! # Join using a credential endpoint
//! huddle-tui --endpoint https://example.com/api/connection-details
//! ```

use std::{fs::File, path::PathBuf, sync::Mutex};

use clap::Parser;
use huddle_app::{AppConfig, DEFAULT_SERVER_URL, HttpDetailsSource, Runtime, StaticDetailsSource};
use huddle_tui::{TerminalDriver, demo};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

/// Huddle terminal room client
#[derive(Parser, Debug)]
#[command(name = "huddle-tui")]
#[command(about = "Terminal client for joining a media room")]
#[command(version)]
struct Args {
    /// Credential endpoint returning connection details
    ///
    /// If not provided, joins the in-process demo room.
    #[arg(short, long, env = "HUDDLE_ENDPOINT")]
    endpoint: Option<Url>,

    /// Media server used by the manual-join form
    #[arg(long, env = "HUDDLE_SERVER_URL", default_value = DEFAULT_SERVER_URL)]
    server_url: String,

    /// Stay on the form instead of joining on startup
    #[arg(long)]
    no_auto_connect: bool,

    /// Display name used in the demo room
    #[arg(long, default_value = "Guest")]
    name: String,

    /// File to write logs to (the terminal is in raw mode)
    #[arg(long, default_value = "huddle-tui.log")]
    log_file: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    let log_file = File::create(&args.log_file)?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(log_file)))
        .with(filter)
        .init();

    tracing::info!("Huddle TUI starting");

    let config = AppConfig::default()
        .with_server_url(args.server_url)
        .with_auto_connect(!args.no_auto_connect);
    let http = args.endpoint.map(HttpDetailsSource::new).transpose()?;
    let server = demo::demo_server();
    let activity = demo::spawn_activity(server.clone());
    let driver = TerminalDriver::new()?;

    let result = match http {
        Some(details) => {
            tracing::info!(endpoint = %details.endpoint(), "using credential endpoint");
            Runtime::new(driver, config, server, details).run().await
        },
        None => {
            tracing::info!("no credential endpoint, joining demo room");
            let details = StaticDetailsSource::new(demo::demo_details(&args.name));
            Runtime::new(driver, config, server, details).run().await
        },
    };

    activity.abort();
    tracing::info!("Huddle TUI stopped");
    Ok(result?)
}
