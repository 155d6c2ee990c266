use super::run::{run_birthday_check, ReminderServices};
use crate::config::Config;
use crate::utils::time::{calculate_wait_duration, next_run_after};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{sleep, Duration as TokioDuration};
use tracing::{error, info};

/// Birthday checks that have been started and not yet reaped
pub type RunSet = Arc<Mutex<JoinSet<()>>>;

/// Start one birthday check in the background.
///
/// Runs are not serialized: a slow run may still be in flight when the next one starts.
pub async fn spawn_run(runs: &RunSet, services: ReminderServices, calendar_id: String) {
    let mut runs = runs.lock().await;
    while runs.try_join_next().is_some() {}

    runs.spawn(async move {
        let outcome = run_birthday_check(&services, &calendar_id, Utc::now()).await;
        info!("Birthday check finished: {:?}", outcome);
    });
}

/// Start the daily scheduler loop
pub fn start_scheduler(config: Arc<Config>, services: ReminderServices, runs: RunSet) -> JoinHandle<()> {
    tokio::spawn(async move {
        let reminder_time = config.reminder_time.clone();
        let calendar_id = config.google_calendar_id.clone();

        if config.run_on_startup {
            info!("Running birthday check on startup");
            spawn_run(&runs, services.clone(), calendar_id.clone()).await;
        }

        loop {
            let now = Utc::now();
            let next = match next_run_after(now, config.timezone, &reminder_time) {
                Some(time) => time,
                None => {
                    error!("Failed to calculate next run time for {}", reminder_time);
                    sleep(TokioDuration::from_secs(3600)).await; // Retry in an hour
                    continue;
                }
            };

            info!("Next birthday check scheduled for {}", next);
            sleep(calculate_wait_duration(&now, &next)).await;

            spawn_run(&runs, services.clone(), calendar_id.clone()).await;
        }
    })
}
