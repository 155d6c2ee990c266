use birthday_reminder::startup;
use tracing::info;

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    info!("Starting birthday reminder");

    // Load configuration
    let config = startup::load_config()?;

    // Run until a termination signal arrives
    startup::start_reminder(config).await
}
