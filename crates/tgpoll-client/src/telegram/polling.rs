//! Long-polling update loop.

use super::envelope;
use super::PollingClient;
use serde_json::{json, Value};
use std::sync::{Mutex, PoisonError};
use tgpoll_core::error::TgPollError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Loop state, owned by the running `start()` call.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PollState {
    /// Next update id to request.
    pub offset: i64,
    /// Failed iterations since the last successful fetch.
    pub consecutive_failures: u32,
}

impl PollState {
    /// Acknowledge a handled update. Never moves the offset backwards.
    pub fn advance(&mut self, update_id: i64) {
        let next = update_id.saturating_add(1);
        if next < self.offset {
            warn!(
                "telegram: update {update_id} is behind offset {}, keeping offset",
                self.offset
            );
            return;
        }
        self.offset = next;
    }
}

/// Why a poll iteration did not complete.
#[derive(Debug)]
pub(crate) enum IterationError {
    /// The session token fired. Ends the loop.
    Cancelled,
    /// The API answered without `ok: true`.
    InvalidEnvelope(TgPollError),
    /// Network, decode or handler failure.
    Transient(TgPollError),
}

impl From<TgPollError> for IterationError {
    fn from(e: TgPollError) -> Self {
        match e {
            TgPollError::InvalidEnvelope { .. } => Self::InvalidEnvelope(e),
            other => Self::Transient(other),
        }
    }
}

/// Clears the session slot when the loop exits, however it exits.
struct SessionGuard<'a> {
    slot: &'a Mutex<Option<CancellationToken>>,
}

impl Drop for SessionGuard<'_> {
    fn drop(&mut self) {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }
}

impl PollingClient {
    /// Run the polling loop until [`stop`](Self::stop) is called.
    ///
    /// Each update is passed to the handler in the order the server returned
    /// it; the offset moves past an update only after its handler finished.
    /// Failed iterations are logged and retried after the configured delay,
    /// forever. Returns `Ok(())` once the session is cancelled.
    pub async fn start(&self) -> Result<(), TgPollError> {
        let cancel = self.begin_session()?;
        let _guard = SessionGuard {
            slot: &self.session,
        };

        info!("Telegram client starting long polling...");

        let mut state = PollState::default();
        loop {
            let err = match self.poll_once(&cancel, &mut state).await {
                Ok(()) => continue,
                Err(IterationError::Cancelled) => break,
                Err(IterationError::InvalidEnvelope(e)) | Err(IterationError::Transient(e)) => e,
            };

            state.consecutive_failures += 1;
            error!(
                "telegram poll error (attempt {}, retry in {:?}): {err}",
                state.consecutive_failures, self.settings.retry_delay
            );

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.settings.retry_delay) => {}
            }
        }

        info!("Telegram client stopped (offset {})", state.offset);
        Ok(())
    }

    /// Cancel the running session.
    ///
    /// The in-flight `getUpdates` request is aborted; a handler that is
    /// already running finishes first. The session is released by the loop
    /// itself, so [`is_started`](Self::is_started) may still report `true`
    /// for a moment after this returns.
    pub fn stop(&self) -> Result<(), TgPollError> {
        let session = self
            .session
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        match session.as_ref() {
            Some(token) => {
                debug!("telegram: stop requested");
                token.cancel();
                Ok(())
            }
            None => Err(TgPollError::NotStarted),
        }
    }

    /// Whether a polling session is active.
    pub fn is_started(&self) -> bool {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn begin_session(&self) -> Result<CancellationToken, TgPollError> {
        let mut session = self
            .session
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if session.is_some() {
            return Err(TgPollError::AlreadyStarted);
        }
        let token = CancellationToken::new();
        *session = Some(token.clone());
        Ok(token)
    }

    /// One fetch-and-dispatch round.
    async fn poll_once(
        &self,
        cancel: &CancellationToken,
        state: &mut PollState,
    ) -> Result<(), IterationError> {
        let json = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(IterationError::Cancelled),
            res = self.fetch_updates(state.offset) => res?,
        };

        let updates = envelope::into_updates(json)?;
        state.consecutive_failures = 0;

        if !updates.is_empty() {
            debug!(
                "telegram: received {} updates at offset {}",
                updates.len(),
                state.offset
            );
        }

        for update in updates {
            let update_id = update.update_id;
            self.handler
                .handle(update)
                .await
                .map_err(|e| IterationError::Transient(TgPollError::Handler(format!(
                    "update {update_id}: {e}"
                ))))?;
            state.advance(update_id);
        }

        Ok(())
    }

    async fn fetch_updates(&self, offset: i64) -> Result<Value, TgPollError> {
        let body = json!({
            "offset": offset,
            "timeout": self.settings.poll_timeout.as_secs(),
        });

        let resp = self
            .api
            .client
            .post(self.api.url("getUpdates"))
            .json(&body)
            .timeout(self.settings.request_timeout)
            .send()
            .await
            .map_err(|e| TgPollError::Http(format!("telegram getUpdates failed: {e}")))?;

        resp.json()
            .await
            .map_err(|e| TgPollError::Decode(format!("telegram getUpdates parse failed: {e}")))
    }
}
