use async_trait::async_trait;
use common::error::DeliveryError;
use common::traits::AlertSink;
use tracing::info;

/// Fallback sink used when no Telegram chat is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleService;

#[async_trait]
impl AlertSink for ConsoleService {
    async fn deliver(&self, message: &str) -> Result<(), DeliveryError> {
        info!(target: "alerts", "\n{}", message);
        Ok(())
    }
}
