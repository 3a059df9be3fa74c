//! Graceful shutdown for the gateway listener.
//!
//! A [`Shutdown`] hands out [`ShutdownSignal`]s; the HTTP server awaits one
//! and stops accepting connections once it resolves. In-flight invocations
//! finish before `serve` returns.

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use super::signals::wait_for_signal;

#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// A future-like handle that resolves on [`Shutdown::trigger`].
    pub fn listen(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.tx.subscribe(),
        }
    }

    /// Release every listener. Returns how many were waiting.
    pub fn trigger(&self) -> usize {
        self.tx.send(()).unwrap_or(0)
    }

    /// Trigger once SIGINT or SIGTERM arrives.
    pub fn trigger_on_os_signal(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            wait_for_signal().await;
            let listeners = self.trigger();
            tracing::info!(listeners, "Shutdown triggered");
        })
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// One listener's view of the shutdown channel.
#[derive(Debug)]
pub struct ShutdownSignal {
    rx: broadcast::Receiver<()>,
}

impl ShutdownSignal {
    /// Wait for the trigger. Dropping every [`Shutdown`] handle also
    /// resolves the wait.
    pub async fn wait(mut self) {
        let _ = self.rx.recv().await;
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_trigger_releases_listeners() {
        let shutdown = Shutdown::new();
        let a = shutdown.listen();
        let b = shutdown.listen();

        assert_eq!(shutdown.trigger(), 2);
        tokio::time::timeout(Duration::from_secs(1), async {
            a.wait().await;
            b.wait().await;
        })
        .await
        .unwrap();
    }

    #[test]
    fn test_trigger_without_listeners() {
        assert_eq!(Shutdown::default().trigger(), 0);
    }

    #[tokio::test]
    async fn test_dropped_coordinator_releases_listener() {
        let shutdown = Shutdown::new();
        let signal = shutdown.listen();
        drop(shutdown);

        tokio::time::timeout(Duration::from_secs(1), signal.wait())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_pending_until_triggered() {
        let shutdown = Shutdown::new();
        let signal = shutdown.listen();

        let waited = tokio::time::timeout(Duration::from_millis(20), signal.wait()).await;
        assert!(waited.is_err());
    }
}
