//! NitroShare
//!
//! This is the main entry point for the NitroShare application.
//! It sets up logging, initializes GTK/Libadwaita and starts the main loop.

use {
    anyhow::Result,
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use nitroshare::{NitroShareApplication, error::ResultExt};

/// Main entry point for the NitroShare application.
///
/// The Tokio runtime hosts the update checker's timer; GTK runs its main
/// loop on this thread.
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("nitroshare=debug,info")),
        )
        .with(fmt::layer())
        .init();

    info!("NitroShare {} starting", env!("CARGO_PKG_VERSION"));

    libadwaita::gtk::init().add_context("Failed to initialize GTK")?;
    libadwaita::init().add_context("Failed to initialize Libadwaita")?;

    let app = NitroShareApplication::new()?;
    app.run();

    Ok(())
}
