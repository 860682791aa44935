//! # tgpoll-client
//!
//! Telegram Bot API client: a cancellable `getUpdates` long-polling loop
//! and a generic multipart command sender.

pub mod telegram;

pub use telegram::{BotApi, CommandParam, Endpoint, InputFile, PollingClient};
