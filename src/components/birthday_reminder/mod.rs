//! Daily birthday reminder: schedules a check and reports the results through a notifier

mod run;
mod scheduler;

pub use run::{run_birthday_check, ReminderServices, RunOutcome, AUTH_ERROR_PREFIX, FETCH_ERROR_PREFIX};
pub use scheduler::{spawn_run, start_scheduler, RunSet};

use super::Component;
use crate::config::Config;
use crate::error::{component_error, BotResult};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{info, warn};

/// How long shutdown waits for in-flight checks before aborting them
pub const RUN_GRACE_PERIOD: Duration = Duration::from_secs(10);

/// Component that owns the daily scheduler task and the checks it starts.
///
/// Shutdown stops the scheduler, then gives running checks `grace_period` to
/// finish so their notices reach the notifier. Checks still running after that,
/// typically ones waiting on the authorization redirect, are aborted.
pub struct BirthdayReminder {
    services: ReminderServices,
    task: RwLock<Option<JoinHandle<()>>>,
    runs: RunSet,
    grace_period: Duration,
}

impl BirthdayReminder {
    pub fn new(services: ReminderServices) -> Self {
        Self {
            services,
            task: RwLock::new(None),
            runs: Arc::new(Mutex::new(JoinSet::new())),
            grace_period: RUN_GRACE_PERIOD,
        }
    }

    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }

    /// Whether the scheduler task is currently running
    pub async fn is_running(&self) -> bool {
        self.task
            .read()
            .await
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    async fn drain_runs(&self) {
        let mut runs = self.runs.lock().await;
        if runs.is_empty() {
            return;
        }

        info!("Waiting for {} birthday checks to finish", runs.len());
        let finished = tokio::time::timeout(self.grace_period, async {
            while runs.join_next().await.is_some() {}
        })
        .await;

        if finished.is_err() {
            warn!("Aborting {} birthday checks still running", runs.len());
            runs.shutdown().await;
        }
    }
}

#[async_trait]
impl Component for BirthdayReminder {
    fn name(&self) -> &'static str {
        "birthday_reminder"
    }

    async fn init(&self, config: Arc<Config>) -> BotResult<()> {
        let mut task = self.task.write().await;
        if task.is_some() {
            return Err(component_error("Birthday reminder already started"));
        }

        info!(
            "Starting birthday reminder at {} ({})",
            config.reminder_time,
            config
                .timezone
                .map(|tz| tz.name().to_string())
                .unwrap_or_else(|| "local time".to_string())
        );
        *task = Some(start_scheduler(
            config,
            self.services.clone(),
            Arc::clone(&self.runs),
        ));
        Ok(())
    }

    async fn shutdown(&self) -> BotResult<()> {
        if let Some(task) = self.task.write().await.take() {
            task.abort();
            // Let the scheduler release the run set before draining it
            let _ = task.await;
            info!("Birthday reminder stopped");
        }
        self.drain_runs().await;
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
