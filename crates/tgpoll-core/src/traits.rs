use crate::{error::TgPollError, update::Update};
use async_trait::async_trait;
use std::future::Future;

/// Receives every update the polling loop fetches.
///
/// The loop awaits each call before acknowledging the update, so a slow
/// handler slows down polling. Returning an error makes the loop back off
/// and fetch the same update again.
#[async_trait]
pub trait UpdateHandler: Send + Sync {
    async fn handle(&self, update: Update) -> Result<(), TgPollError>;
}

#[async_trait]
impl<F, Fut> UpdateHandler for F
where
    F: Fn(Update) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), TgPollError>> + Send + 'static,
{
    async fn handle(&self, update: Update) -> Result<(), TgPollError> {
        (self)(update).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_closure_handler() {
        let seen = Arc::new(AtomicI64::new(0));
        let sink = seen.clone();
        let handler = move |update: Update| {
            let sink = sink.clone();
            async move {
                sink.store(update.update_id, Ordering::SeqCst);
                Ok(())
            }
        };

        let update: Update = serde_json::from_str(r#"{"update_id": 9}"#).unwrap();
        handler.handle(update).await.unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 9);
    }

    struct Failing;

    #[async_trait]
    impl UpdateHandler for Failing {
        async fn handle(&self, update: Update) -> Result<(), TgPollError> {
            Err(TgPollError::Handler(format!("rejected {}", update.update_id)))
        }
    }

    #[tokio::test]
    async fn test_trait_object_handler() {
        let handler: Box<dyn UpdateHandler> = Box::new(Failing);
        let update: Update = serde_json::from_str(r#"{"update_id": 3}"#).unwrap();
        let err = handler.handle(update).await.unwrap_err();
        assert_eq!(err.to_string(), "handler error: rejected 3");
    }
}
