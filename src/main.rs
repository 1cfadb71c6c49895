// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Prints the current charge and drive state of the configured vehicle.

use anyhow::Context;
use tesla_session::{config::Config, services::ChargeController};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(config_file = %config.config_file.display(), "Starting Tesla session");

    let mut session = match tesla_session::connect(&config).await {
        Ok(session) => session,
        Err(e) => {
            tracing::error!(error = %e, "Unable to start session, exiting");
            std::process::exit(1);
        }
    };

    let charge_state = ChargeController::new(&mut session).charge_state().await?;
    println!(
        "Charging State:\n{}",
        serde_json::to_string_pretty(&charge_state)?
    );

    let drive_state = session.get_drive_state().await?;
    println!(
        "Drive State:\n{}",
        serde_json::to_string_pretty(&drive_state)?
    );

    if let Some(location) = session.update_location().await? {
        println!("Location:\n{}", location);
    }
    Ok(())
}

/// Initialize structured JSON logging on stderr.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("tesla_session=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
