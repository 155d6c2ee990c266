use super::actor::{TelegramActor, TelegramActorHandle};
use super::Notifier;
use crate::config::Config;
use crate::error::BotResult;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Handle for interacting with the Telegram actor
#[derive(Clone)]
pub struct TelegramHandle {
    actor_handle: TelegramActorHandle,
    _actor_task: Arc<JoinHandle<()>>,
}

impl TelegramHandle {
    /// Validate the Telegram settings and spawn the actor
    pub fn new(config: &Config) -> BotResult<Self> {
        let (mut actor, handle) = TelegramActor::new(config)?;

        let actor_task = tokio::spawn(async move {
            actor.run().await;
        });

        Ok(Self {
            actor_handle: handle,
            _actor_task: Arc::new(actor_task),
        })
    }

    /// Shutdown the actor, draining queued messages first
    pub async fn shutdown(&self) -> BotResult<()> {
        self.actor_handle.shutdown().await
    }
}

#[async_trait]
impl Notifier for TelegramHandle {
    async fn send(&self, text: String) {
        self.actor_handle.send_message(text).await;
    }
}
