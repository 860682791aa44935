//! Telegram Bot API client.
//!
//! Receives updates by long polling `getUpdates` and sends commands as
//! multipart form posts.
//! Docs: <https://core.telegram.org/bots/api>

mod endpoint;
pub mod envelope;
mod params;
mod polling;
mod send;

pub use endpoint::Endpoint;
pub use params::{CommandParam, InputFile};
pub use send::BotApi;

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tgpoll_core::{
    config::{PollSettings, TelegramConfig},
    error::TgPollError,
    traits::UpdateHandler,
};
use tokio_util::sync::CancellationToken;

/// Telegram client with a long-polling update loop.
///
/// At most one polling session runs per client. The session slot holds the
/// cancellation token of the running loop; `None` means idle.
pub struct PollingClient {
    api: BotApi,
    handler: Arc<dyn UpdateHandler>,
    settings: PollSettings,
    session: Mutex<Option<CancellationToken>>,
}

impl PollingClient {
    /// Create a client for `token` with the default endpoint and timings.
    pub fn new(token: impl Into<String>, handler: impl UpdateHandler + 'static) -> Self {
        Self::with_api(BotApi::new(token), handler)
    }

    /// Create a client around an existing sender, e.g. one the handler also holds.
    pub fn with_api(api: BotApi, handler: impl UpdateHandler + 'static) -> Self {
        Self {
            api,
            handler: Arc::new(handler),
            settings: PollSettings::default(),
            session: Mutex::new(None),
        }
    }

    /// Create a client from config.
    pub fn from_config(config: &TelegramConfig, handler: impl UpdateHandler + 'static) -> Self {
        Self::with_api(BotApi::from_config(config), handler).with_settings(config.poll_settings())
    }

    pub fn with_endpoint(mut self, endpoint: Endpoint) -> Self {
        self.api = self.api.with_endpoint(endpoint);
        self
    }

    pub fn with_settings(mut self, settings: PollSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Command sender sharing this client's token, endpoint and connection pool.
    pub fn api(&self) -> BotApi {
        self.api.clone()
    }

    pub fn settings(&self) -> PollSettings {
        self.settings
    }

    /// See [`BotApi::send_command`].
    pub async fn send_command<I, K, V>(&self, command: &str, params: I) -> Result<Value, TgPollError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<CommandParam>,
    {
        self.api.send_command(command, params).await
    }

    /// See [`BotApi::send_command_as`].
    pub async fn send_command_as<T, I, K, V>(
        &self,
        command: &str,
        params: I,
    ) -> Result<T, TgPollError>
    where
        T: DeserializeOwned,
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<CommandParam>,
    {
        self.api.send_command_as(command, params).await
    }
}
