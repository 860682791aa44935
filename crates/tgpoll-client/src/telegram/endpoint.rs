//! Bot API URL construction.

use std::fmt;
use std::sync::Arc;

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Maps `(token, command)` to the URL a request is posted to.
#[derive(Clone)]
pub struct Endpoint(Arc<dyn Fn(&str, &str) -> String + Send + Sync>);

impl Endpoint {
    /// `https://api.telegram.org/bot<token>/<command>`.
    pub fn telegram() -> Self {
        Self::with_base(TELEGRAM_API_BASE)
    }

    /// `<base>/bot<token>/<command>`, e.g. for a self-hosted Bot API server.
    pub fn with_base(base: impl Into<String>) -> Self {
        let base = base.into().trim_end_matches('/').to_string();
        Self::custom(move |token, command| format!("{base}/bot{token}/{command}"))
    }

    /// Arbitrary URL scheme.
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&str, &str) -> String + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn url(&self, token: &str, command: &str) -> String {
        (self.0)(token, command)
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self::telegram()
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Endpoint")
            .field(&self.url("<token>", "<command>"))
            .finish()
    }
}
