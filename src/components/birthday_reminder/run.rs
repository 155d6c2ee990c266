use crate::components::google_calendar::{fetch_todays_birthdays, AuthProvider, CalendarClient};
use crate::components::telegram::Notifier;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{error, info};

pub const AUTH_ERROR_PREFIX: &str = "Error during authentication:";
pub const FETCH_ERROR_PREFIX: &str = "Error fetching from primary calendar:";

/// Collaborators of a daily run
#[derive(Clone)]
pub struct ReminderServices {
    pub auth: Arc<dyn AuthProvider>,
    pub calendar: Arc<dyn CalendarClient>,
    pub notifier: Arc<dyn Notifier>,
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Number of birthday notices sent
    Notified(usize),
    AuthFailed,
    FetchFailed,
}

/// Authorize, fetch the next 24 hours of birthdays and send one message per match.
///
/// Errors never escape: they are reported through the notifier instead.
pub async fn run_birthday_check(
    services: &ReminderServices,
    calendar_id: &str,
    now: DateTime<Utc>,
) -> RunOutcome {
    let credential = match services.auth.acquire_credential().await {
        Ok(credential) => credential,
        Err(e) => {
            error!("Authorization failed: {}", e);
            services
                .notifier
                .send(format!("{} {}", AUTH_ERROR_PREFIX, e))
                .await;
            return RunOutcome::AuthFailed;
        }
    };

    let notices =
        match fetch_todays_birthdays(services.calendar.as_ref(), &credential, calendar_id, now).await {
            Ok(notices) => notices,
            Err(e) => {
                error!("Calendar query failed: {}", e);
                services
                    .notifier
                    .send(format!("{} {}", FETCH_ERROR_PREFIX, e))
                    .await;
                return RunOutcome::FetchFailed;
            }
        };

    if notices.is_empty() {
        info!("No birthday events found in primary calendar.");
        return RunOutcome::Notified(0);
    }

    info!("Found {} birthday events in primary calendar", notices.len());
    for notice in &notices {
        services.notifier.send(notice.to_string()).await;
    }

    RunOutcome::Notified(notices.len())
}
