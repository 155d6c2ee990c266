use miette::{Diagnostic, Result};
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Environment error: {0}")]
    #[diagnostic(
        code(birthday_reminder::environment),
        help("Set the variable in the environment or in a .env file")
    )]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(birthday_reminder::config))]
    Config(String),

    #[error("Authorization error: {0}")]
    #[diagnostic(code(birthday_reminder::auth))]
    Auth(String),

    #[error("Google Calendar API error: {0}")]
    #[diagnostic(code(birthday_reminder::google_calendar))]
    GoogleCalendar(String),

    #[error("Telegram API error: {0}")]
    #[diagnostic(code(birthday_reminder::telegram))]
    Telegram(String),

    #[error("Component error: {0}")]
    #[diagnostic(code(birthday_reminder::component))]
    Component(String),

    #[error(transparent)]
    #[diagnostic(code(birthday_reminder::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(birthday_reminder::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(birthday_reminder::other))]
    Other(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type BotResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Missing environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create authorization errors
pub fn auth_error(message: &str) -> Error {
    Error::Auth(message.to_string())
}

/// Helper to create component errors
pub fn component_error(message: &str) -> Error {
    Error::Component(message.to_string())
}

/// Helper to create Google Calendar errors
pub fn google_calendar_error(message: &str) -> Error {
    Error::GoogleCalendar(message.to_string())
}

/// Helper to create Telegram errors
pub fn telegram_error(message: &str) -> Error {
    Error::Telegram(message.to_string())
}

/// Helper to create other errors
pub fn other_error(message: &str) -> Error {
    Error::Other(message.to_string())
}
