//! Generation notifiers.

use async_trait::async_trait;
use folkreel_core::GenerationEvent;
use folkreel_error::{FolkreelResult, HttpError};
use folkreel_interface::GenerationNotifier;
use tokio::sync::mpsc;

/// Logs each generation event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

#[async_trait]
impl GenerationNotifier for TracingNotifier {
    async fn notify(&self, event: &GenerationEvent) -> FolkreelResult<()> {
        tracing::info!(
            account = %event.account,
            country = %event.country,
            generation_id = %event.generation_id,
            "Generation ready"
        );
        Ok(())
    }
}

/// Forwards each generation event to a channel, e.g. a mail worker.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    sender: mpsc::Sender<GenerationEvent>,
}

impl ChannelNotifier {
    /// Notifier and the receiving end of its channel.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<GenerationEvent>) {
        let (sender, receiver) = mpsc::channel(capacity);
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl GenerationNotifier for ChannelNotifier {
    async fn notify(&self, event: &GenerationEvent) -> FolkreelResult<()> {
        self.sender
            .send(event.clone())
            .await
            .map_err(|e| HttpError::new(format!("Notification channel closed: {}", e)))?;
        Ok(())
    }
}
