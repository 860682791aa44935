//! # tgpoll-core
//!
//! Core types, traits, configuration, and error handling for tgpoll.

pub mod config;
pub mod error;
pub mod traits;
pub mod update;
