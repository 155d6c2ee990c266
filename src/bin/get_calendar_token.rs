use birthday_reminder::components::google_calendar::GoogleAuth;
use birthday_reminder::config::Config;
use birthday_reminder::error::BotResult;
use birthday_reminder::startup::init_logging;
use tracing::error;

/// Run the authorization flow once and persist the resulting token
#[tokio::main]
async fn main() -> BotResult<()> {
    if let Err(e) = init_logging() {
        eprintln!("{:?}", e);
    }

    // Load configuration
    let config = Config::load()?;

    println!("Opening browser for Google Calendar authorization...");
    println!(
        "If nothing opens, the authorization URL is printed in the log above. Waiting on {}",
        config.redirect_uri()
    );

    let auth = GoogleAuth::new(&config).with_browser(true);
    match auth.authorize_interactively().await.into_result() {
        Ok(_) => {
            println!("Token successfully saved to {}", config.token_path.display());
            Ok(())
        }
        Err(e) => {
            error!("Authorization failed: {}", e);
            Err(e)
        }
    }
}
