//! Lightpack CLI - Command-line interface for Lightpack / Prismatik controllers
//!
//! Query and change the state of an ambient-lighting controller over its
//! text control protocol.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lightpack_client::{Mode, Session, SessionConfig};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;

/// Lightpack - control an ambient-lighting controller
#[derive(Parser)]
#[command(name = "lightpack")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Controller host
    #[arg(short = 'H', long, global = true, env = "LIGHTPACK_HOST")]
    host: Option<String>,

    /// Controller port
    #[arg(short = 'P', long, global = true, env = "LIGHTPACK_PORT")]
    port: Option<u16>,

    /// API key
    #[arg(short = 'k', long, global = true, env = "LIGHTPACK_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true, default_value = "warn")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show power state, lock state, mode and profile
    Status,

    /// Turn the backlight on
    On,

    /// Turn the backlight off
    Off,

    /// List profiles
    Profiles,

    /// Show the current profile, or switch to NAME
    Profile { name: Option<String> },

    /// Create a profile and switch to it
    NewProfile { name: String },

    /// Delete a profile
    DeleteProfile { name: String },

    /// Show the capture area of every LED
    Leds {
        #[arg(long)]
        json: bool,
    },

    /// Show the colour of every LED
    Colors {
        #[arg(long)]
        json: bool,
    },

    /// Show capture frames per second
    Fps,

    /// Show the captured screen geometry
    Screen,

    /// Show the capture mode, or switch to MODE (ambilight, moodlamp)
    Mode { mode: Option<Mode> },

    /// Set gamma correction
    Gamma { value: f64 },

    /// Set brightness (0-100)
    Brightness { value: u8 },

    /// Set smoothing (0-255)
    Smooth { value: u8 },

    /// Set the colour of one LED (zero-based index)
    Color { index: usize, r: u8, g: u8, b: u8 },

    /// Set every LED to one colour
    All { r: u8, g: u8, b: u8 },

    /// Set the capture area of one LED (zero-based index)
    Area {
        index: usize,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    },

    /// Send a raw command line and print the classified response
    Raw {
        /// Command line, e.g. `getstatus` or `setstatus:on`
        command: String,

        /// Hold the lock while sending
        #[arg(long)]
        lock: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    setup_logging(&cli.log_level, cli.json_logs)?;

    let mut config = config::load(cli.config.as_deref())?;
    apply_overrides(&mut config, cli.host, cli.port, cli.api_key);

    let target = format!("{}:{}", config.host, config.port);
    let command = cli.command;

    let output = Session::open(config, move |session| {
        Box::pin(commands::run(session, command))
    })
    .await
    .with_context(|| format!("Command against {} failed", target))?;

    output.print()
}

fn apply_overrides(
    config: &mut SessionConfig,
    host: Option<String>,
    port: Option<u16>,
    api_key: Option<String>,
) {
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }
    if api_key.is_some() {
        config.api_key = api_key;
    }
}

fn setup_logging(level: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .context("Failed to parse log level")?;

    // Logs go to stderr so command output stays pipeable
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .compact()
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    Ok(())
}
