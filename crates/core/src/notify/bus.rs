use std::sync::Arc;

use tokio::sync::broadcast;

use super::types::{Level, Notifier, Toast};

/// Toast channel backed by `tokio::broadcast`. Handlers create one per
/// request, subscribe, and drain it into the response.
#[derive(Debug, Clone)]
pub struct ToastBus {
    sender: Arc<broadcast::Sender<Toast>>,
}

impl ToastBus {
    /// Create a new bus with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Publish a toast to all current subscribers.
    pub fn publish(&self, toast: Toast) -> Result<usize, broadcast::error::SendError<Toast>> {
        self.sender.send(toast)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Toast> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ToastBus {
    fn default() -> Self {
        Self::new(64)
    }
}

impl Notifier for ToastBus {
    fn notify(&self, level: Level, message: String) {
        match level {
            Level::Error => tracing::warn!(%message, "error toast"),
            _ => tracing::debug!(?level, %message, "toast"),
        }
        if self.publish(Toast::new(level, message)).is_err() {
            tracing::debug!("toast dropped: no subscribers");
        }
    }
}

/// Everything currently buffered in `rx`. Lagged messages are skipped.
pub fn drain(rx: &mut broadcast::Receiver<Toast>) -> Vec<Toast> {
    let mut toasts = Vec::new();
    loop {
        match rx.try_recv() {
            Ok(toast) => toasts.push(toast),
            Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "toast receiver lagged");
            }
            Err(_) => break,
        }
    }
    toasts
}
