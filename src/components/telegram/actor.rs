use crate::config::Config;
use crate::error::{env_error, telegram_error, BotResult};
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info};

/// Per-request timeout for the Bot API
pub const SEND_TIMEOUT: Duration = Duration::from_secs(1);

/// The Telegram actor that delivers queued messages in order
pub struct TelegramActor {
    client: Client,
    send_url: String,
    chat_id: String,
    command_rx: mpsc::Receiver<TelegramCommand>,
}

/// Commands that can be sent to the Telegram actor
pub enum TelegramCommand {
    SendMessage(String),
    Shutdown(mpsc::Sender<()>),
}

/// Handle for communicating with the Telegram actor
#[derive(Clone)]
pub struct TelegramActorHandle {
    command_tx: mpsc::Sender<TelegramCommand>,
}

impl TelegramActorHandle {
    /// Queue a message for delivery
    pub async fn send_message(&self, text: String) {
        if self
            .command_tx
            .send(TelegramCommand::SendMessage(text))
            .await
            .is_err()
        {
            error!("Error sending message: Telegram actor is not running");
        }
    }

    /// Stop the actor after all previously queued messages have been attempted
    pub async fn shutdown(&self) -> BotResult<()> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        if self
            .command_tx
            .send(TelegramCommand::Shutdown(response_tx))
            .await
            .is_err()
        {
            // Already stopped
            return Ok(());
        }

        response_rx.recv().await;
        Ok(())
    }
}

impl TelegramActor {
    /// Create a new actor and return its handle.
    ///
    /// Fails before any network activity if the bot token or recipient is missing.
    pub fn new(config: &Config) -> BotResult<(Self, TelegramActorHandle)> {
        let bot_token = config
            .telegram_bot_token
            .clone()
            .ok_or_else(|| env_error("TELEGRAM_BOT_TOKEN"))?;
        let chat_id = config
            .telegram_admin_id
            .clone()
            .ok_or_else(|| env_error("TELEGRAM_ADMIN_ID"))?;

        let client = Client::builder()
            .timeout(SEND_TIMEOUT)
            .build()
            .map_err(|e| telegram_error(&format!("Failed to build HTTP client: {}", e)))?;

        let send_url = format!(
            "{}/bot{}/sendMessage",
            config.endpoints.telegram_base.trim_end_matches('/'),
            bot_token
        );

        let (command_tx, command_rx) = mpsc::channel(32);

        let actor = Self {
            client,
            send_url,
            chat_id,
            command_rx,
        };

        Ok((actor, TelegramActorHandle { command_tx }))
    }

    /// Start the actor's processing loop
    pub async fn run(&mut self) {
        info!("Telegram actor started");

        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                TelegramCommand::SendMessage(text) => match self.deliver(&text).await {
                    Ok(()) => info!("Message sent: {}", text),
                    Err(e) => error!("Error sending message: {}", e),
                },
                TelegramCommand::Shutdown(response_tx) => {
                    info!("Telegram actor shutting down");
                    let _ = response_tx.send(()).await;
                    break;
                }
            }
        }

        info!("Telegram actor shut down");
    }

    async fn deliver(&self, text: &str) -> BotResult<()> {
        let response = self
            .client
            .post(&self.send_url)
            .json(&json!({
                "chat_id": self.chat_id,
                "text": text,
            }))
            .send()
            .await
            // The URL carries the bot token
            .map_err(|e| telegram_error(&e.without_url().to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(telegram_error(&format!("HTTP {} - {}", status, error_body)));
        }

        Ok(())
    }
}
