//! Google side of the reminder: OAuth credentials and the calendar query.

pub mod auth;
pub mod birthdays;
pub mod client;
pub mod models;
pub mod time;
pub mod token;

pub use auth::{AuthOutcome, AuthProvider, GoogleAuth};
pub use birthdays::fetch_todays_birthdays;
pub use client::{CalendarClient, GoogleCalendarClient, TimeWindow};
pub use models::{BirthdayNotice, CalendarEvent};
pub use token::{Credential, CredentialStore};
