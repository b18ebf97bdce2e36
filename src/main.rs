use anyhow::{Context, Result};
use thousands::Separable;
use tracing::info;
use tracing_error::ErrorLayer;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter};

use pacman_core::app::App;
use pacman_core::config::load_config;
use pacman_core::formatter::CustomFormatter;

fn init_tracing() -> Result<()> {
    let subscriber = tracing_subscriber::registry()
        .with(fmt::layer().event_format(CustomFormatter))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(ErrorLayer::default());

    tracing::subscriber::set_global_default(subscriber).context("Failed to set tracing subscriber")
}

/// Runs one headless session until it ends or the configured runtime elapses.
pub fn main() -> Result<()> {
    init_tracing()?;

    let config = load_config()?;
    let mut app = App::new(&config).context("Could not create app")?;

    info!(frame_time = ?config.frame_time(), logic_time = ?config.logic_timestep(), "Starting game loop");
    while app.run() {}

    let score = app.finish()?;
    info!(score = %score.separate_with_commas(), "Final score");
    Ok(())
}
