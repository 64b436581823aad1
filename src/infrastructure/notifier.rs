use crate::domain::account::AccountRecord;
use crate::domain::ports::Notifier;
use crate::error::Result;
use async_trait::async_trait;
use tracing::info;

/// Notifier that writes every notice to the log.
#[derive(Debug, Default, Clone)]
pub struct LoggingNotifier;

impl LoggingNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for LoggingNotifier {
    async fn notify(&self, account: &AccountRecord, message: &str) -> Result<()> {
        info!(account = %account.account, "Sending notification: {}", message);
        Ok(())
    }
}
