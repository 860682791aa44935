//! Echo bot used by `tgpoll run`.

use async_trait::async_trait;
use tgpoll_client::BotApi;
use tgpoll_core::{error::TgPollError, traits::UpdateHandler, update::Update};
use tracing::{debug, info};

/// Replies to every private text message with the same text.
pub struct EchoHandler {
    api: BotApi,
}

impl EchoHandler {
    pub fn new(api: BotApi) -> Self {
        Self { api }
    }
}

#[async_trait]
impl UpdateHandler for EchoHandler {
    async fn handle(&self, update: Update) -> Result<(), TgPollError> {
        let Some(msg) = update.message() else {
            debug!(
                "skipping update {} ({})",
                update.update_id,
                update.kind().unwrap_or("empty")
            );
            return Ok(());
        };

        if msg.chat.is_group() {
            debug!("ignoring group message from chat {}", msg.chat.id);
            return Ok(());
        }

        let Some(text) = msg.text.as_deref() else {
            return Ok(());
        };

        let sender = msg
            .from
            .as_ref()
            .map(|u| u.display_name())
            .unwrap_or_else(|| "unknown".to_string());
        info!("echo to {sender} in chat {}", msg.chat.id);

        self.api.send_message(msg.chat.id, text).await?;
        Ok(())
    }
}
