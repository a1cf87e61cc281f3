//! # Game Social
//!
//! Entry point: configuration, logging, database, HTTP server.

use anyhow::Result;
use tracing::info;

use game_social::config::Settings;
use game_social::startup::Application;

#[tokio::main]
async fn main() -> Result<()> {
    // Settings decide the log format, so they load before tracing exists
    let settings = Settings::load()?;
    game_social::telemetry::init_tracing(settings.logging.format.eq_ignore_ascii_case("json"));

    info!(
        host = %settings.server.host,
        port = %settings.server.port,
        environment = %settings.environment,
        "Configuration loaded"
    );

    let application = Application::build(settings).await?;

    info!("Server ready to accept connections");
    application.run_until_stopped().await?;

    Ok(())
}
