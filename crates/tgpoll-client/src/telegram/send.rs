//! Outbound Bot API commands.

use super::endpoint::Endpoint;
use super::envelope;
use super::params::{build_form, CommandParam};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tgpoll_core::{
    config::TelegramConfig,
    error::TgPollError,
    update::{Message, User},
};
use tracing::{debug, warn};

/// Command sender for one bot. Cheap to clone.
#[derive(Clone)]
pub struct BotApi {
    pub(crate) client: reqwest::Client,
    token: Arc<str>,
    endpoint: Endpoint,
}

impl fmt::Debug for BotApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotApi")
            .field("token", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl BotApi {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            token: token.into().into(),
            endpoint: Endpoint::default(),
        }
    }

    /// Sender for the configured token and API host.
    pub fn from_config(config: &TelegramConfig) -> Self {
        Self::new(config.bot_token.clone())
            .with_endpoint(Endpoint::with_base(config.api_base.clone()))
    }

    pub fn with_endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// URL for a command of this bot.
    pub fn url(&self, command: &str) -> String {
        self.endpoint.url(&self.token, command)
    }

    /// Post `params` as multipart form data to `command`. Without params the
    /// POST carries no body.
    ///
    /// Returns the envelope's `result`, or the whole body when there is none.
    /// A response without `ok: true` yields [`TgPollError::Api`].
    pub async fn send_command<I, K, V>(&self, command: &str, params: I) -> Result<Value, TgPollError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<CommandParam>,
    {
        let mut request = self.client.post(self.url(command));
        if let Some(form) = build_form(params)? {
            request = request.multipart(form);
        }

        let resp = request
            .send()
            .await
            .map_err(|e| TgPollError::Http(format!("telegram {command} failed: {e}")))?;

        let json: Value = resp
            .json()
            .await
            .map_err(|e| TgPollError::Decode(format!("telegram {command} parse failed: {e}")))?;

        match envelope::into_result(json) {
            Ok(result) => {
                debug!("telegram {command} ok");
                Ok(result)
            }
            Err(e) => {
                warn!("telegram {command} rejected: {e}");
                Err(e)
            }
        }
    }

    /// [`send_command`](Self::send_command), decoding the result into `T`.
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
        let result = self.send_command(command, params).await?;
        serde_json::from_value(result)
            .map_err(|e| TgPollError::Decode(format!("telegram {command} result: {e}")))
    }

    /// Identity of the bot behind the token.
    pub async fn get_me(&self) -> Result<User, TgPollError> {
        self.send_command_as("getMe", std::iter::empty::<(&str, CommandParam)>())
            .await
    }

    /// Send a plain text message.
    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<Message, TgPollError> {
        let params: [(&str, CommandParam); 2] = [("chat_id", chat_id.into()), ("text", text.into())];
        self.send_command_as("sendMessage", params).await
    }
}
