//! Transient feedback messages that clear themselves.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Holds at most one message; each message clears after `ttl` unless a newer
/// one replaced it first.
#[derive(Clone)]
pub struct FeedbackSlot {
    current: Arc<watch::Sender<Option<String>>>,
    generation: Arc<AtomicU64>,
    ttl: Duration,
}

impl FeedbackSlot {
    pub fn new(ttl: Duration) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            current: Arc::new(current),
            generation: Arc::new(AtomicU64::new(0)),
            ttl,
        }
    }

    /// Show `message` and schedule its removal. Needs a tokio runtime.
    pub fn show(&self, message: impl Into<String>) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.current.send_replace(Some(message.into()));

        let current = Arc::clone(&self.current);
        let latest = Arc::clone(&self.generation);
        let ttl = self.ttl;
        tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            if latest.load(Ordering::SeqCst) == generation {
                current.send_replace(None);
            }
        });
    }

    pub fn current(&self) -> Option<String> {
        self.current.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.current.subscribe()
    }
}
