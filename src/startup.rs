use crate::components::birthday_reminder::{BirthdayReminder, ReminderServices};
use crate::components::google_calendar::{GoogleAuth, GoogleCalendarClient};
use crate::components::{ComponentManager, TelegramHandle};
use crate::config::Config;
use crate::error::other_error;
use crate::shutdown;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Filter used when RUST_LOG is not set
pub const DEFAULT_LOG_FILTER: &str = "info,reqwest=warn,hyper=warn";

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| other_error(&format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load the application config
pub fn load_config() -> miette::Result<Arc<Config>> {
    match Config::load() {
        Ok(config) => Ok(Arc::new(config)),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Wire up the services, start the scheduler and wait for a shutdown signal
pub async fn start_reminder(config: Arc<Config>) -> miette::Result<()> {
    // Telegram settings are required, fail before anything is scheduled
    let telegram = TelegramHandle::new(&config)?;

    let services = ReminderServices {
        auth: Arc::new(GoogleAuth::new(&config)),
        calendar: Arc::new(GoogleCalendarClient::new(&config)),
        notifier: Arc::new(telegram.clone()),
    };

    // Initialize component manager
    let mut component_manager = ComponentManager::new(Arc::clone(&config));
    component_manager.register(BirthdayReminder::new(services));
    let component_manager = Arc::new(component_manager);

    component_manager.init_all().await?;
    info!(
        "Birthday reminder running, daily check at {}",
        config.reminder_time
    );

    // Create shutdown channel
    let (shutdown_send, shutdown_recv) = oneshot::channel();

    // Spawn signal handler task
    let shutdown_components = Arc::clone(&component_manager);
    tokio::spawn(async move {
        shutdown::handle_signals(shutdown_send, shutdown_components, telegram).await;
    });

    if shutdown_recv.await.is_err() {
        error!("Signal handler stopped before shutdown completed");
    }
    info!("Birthday reminder stopped");
    Ok(())
}
