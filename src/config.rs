use crate::error::{config_error, env_error, BotResult};
use crate::utils::time::parse_time;
use chrono_tz::Tz;
use dotenvy::dotenv;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Default location of the persisted Google token
pub const DEFAULT_TOKEN_PATH: &str = "./token.json";
/// Default port of the local OAuth callback listener
pub const DEFAULT_OAUTH_PORT: u16 = 3000;
/// Default time the daily check fires at
pub const DEFAULT_REMINDER_TIME: &str = "07:00";
/// Default calendar to scan
pub const DEFAULT_CALENDAR_ID: &str = "primary";
/// Default time to wait for the browser redirect
pub const DEFAULT_CALLBACK_TIMEOUT_SECS: u64 = 300;

/// Base URLs of the third-party services
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpoints {
    pub google_auth_url: String,
    pub google_token_url: String,
    pub google_calendar_base: String,
    pub telegram_base: String,
}

impl Default for ApiEndpoints {
    fn default() -> Self {
        Self {
            google_auth_url: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            google_token_url: "https://oauth2.googleapis.com/token".to_string(),
            google_calendar_base: "https://www.googleapis.com/calendar/v3".to_string(),
            telegram_base: "https://api.telegram.org".to_string(),
        }
    }
}

/// Main configuration structure, built once at startup
#[derive(Clone)]
pub struct Config {
    /// Google OAuth client ID
    pub google_client_id: String,
    /// Google OAuth client secret
    pub google_client_secret: String,
    /// Raw token JSON supplied through the environment
    pub google_token: Option<String>,
    /// File the token is persisted to
    pub token_path: PathBuf,
    /// Port of the local OAuth callback listener
    pub oauth_port: u16,
    /// How long the callback listener waits for the redirect
    pub oauth_callback_timeout: Duration,
    /// Google Calendar ID to scan
    pub google_calendar_id: String,
    /// Telegram bot token
    pub telegram_bot_token: Option<String>,
    /// Telegram chat that receives the reminders
    pub telegram_admin_id: Option<String>,
    /// Daily trigger time in HH:MM format
    pub reminder_time: String,
    /// Timezone for scheduling, process local time when unset
    pub timezone: Option<Tz>,
    /// Fire one run right after startup
    pub run_on_startup: bool,
    pub endpoints: ApiEndpoints,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("google_client_id", &self.google_client_id)
            .field("google_client_secret", &"<redacted>")
            .field("google_token", &self.google_token.as_ref().map(|_| "<redacted>"))
            .field("token_path", &self.token_path)
            .field("oauth_port", &self.oauth_port)
            .field("oauth_callback_timeout", &self.oauth_callback_timeout)
            .field("google_calendar_id", &self.google_calendar_id)
            .field(
                "telegram_bot_token",
                &self.telegram_bot_token.as_ref().map(|_| "<redacted>"),
            )
            .field("telegram_admin_id", &self.telegram_admin_id)
            .field("reminder_time", &self.reminder_time)
            .field("timezone", &self.timezone)
            .field("run_on_startup", &self.run_on_startup)
            .field("endpoints", &self.endpoints)
            .finish()
    }
}

impl Config {
    /// Load configuration from the environment
    pub fn load() -> BotResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> BotResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Blank values count as unset
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let google_client_id = get("CLIENT_ID")
            .or_else(|| get("GOOGLE_CLIENT_ID"))
            .ok_or_else(|| env_error("CLIENT_ID"))?;
        let google_client_secret = get("CLIENT_SECRET")
            .or_else(|| get("GOOGLE_CLIENT_SECRET"))
            .ok_or_else(|| env_error("CLIENT_SECRET"))?;

        let oauth_port = match get("OAUTH_PORT") {
            Some(port) => port
                .trim()
                .parse::<u16>()
                .map_err(|_| config_error("Invalid OAUTH_PORT format"))?,
            None => DEFAULT_OAUTH_PORT,
        };

        let callback_secs = match get("OAUTH_CALLBACK_TIMEOUT_SECS") {
            Some(secs) => secs
                .trim()
                .parse::<u64>()
                .map_err(|_| config_error("Invalid OAUTH_CALLBACK_TIMEOUT_SECS format"))?,
            None => DEFAULT_CALLBACK_TIMEOUT_SECS,
        };

        let reminder_time =
            get("REMINDER_TIME").unwrap_or_else(|| String::from(DEFAULT_REMINDER_TIME));
        if parse_time(&reminder_time).is_none() {
            return Err(config_error(&format!(
                "Invalid REMINDER_TIME '{}', expected HH:MM",
                reminder_time
            )));
        }

        let timezone = match get("TIMEZONE") {
            Some(name) => Some(
                name.trim()
                    .parse::<Tz>()
                    .map_err(|_| config_error(&format!("Unknown TIMEZONE '{}'", name)))?,
            ),
            None => None,
        };

        let run_on_startup = get("RUN_ON_STARTUP")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Config {
            google_client_id,
            google_client_secret,
            google_token: get("GOOGLE_TOKEN"),
            token_path: get("TOKEN_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_TOKEN_PATH)),
            oauth_port,
            oauth_callback_timeout: Duration::from_secs(callback_secs),
            google_calendar_id: get("GOOGLE_CALENDAR_ID")
                .unwrap_or_else(|| String::from(DEFAULT_CALENDAR_ID)),
            telegram_bot_token: get("TELEGRAM_BOT_TOKEN"),
            telegram_admin_id: get("TELEGRAM_ADMIN_ID"),
            reminder_time,
            timezone,
            run_on_startup,
            endpoints: ApiEndpoints::default(),
        })
    }

    /// Redirect URI registered with the identity provider
    pub fn redirect_uri(&self) -> String {
        format!("http://localhost:{}", self.oauth_port)
    }
}
