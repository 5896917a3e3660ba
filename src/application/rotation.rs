//! Rollover-driven token publishing.
//!
//! A QR renderer has to show the new token as soon as the window rolls over.
//! Rather than polling, the ticker sleeps until the next boundary (plus a
//! small slack so the clock is safely past it) and publishes the fresh token.

use crate::application::codec::TokenCodec;
use crate::domain::token::Token;
use crate::domain::window::Window;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::debug;

/// Default delay added after each boundary before re-issuing.
pub const DEFAULT_SLACK: Duration = Duration::from_millis(50);

/// Error returned when the ticker task fails to shut down cleanly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShutdownError {
    /// The publish callback panicked
    TaskPanicked,
    /// The task was cancelled before it could stop on its own
    TaskCancelled,
}

impl std::fmt::Display for ShutdownError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShutdownError::TaskPanicked => write!(f, "rotation task panicked"),
            ShutdownError::TaskCancelled => write!(f, "rotation task was cancelled"),
        }
    }
}

impl std::error::Error for ShutdownError {}

/// Configuration for the rotation ticker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationConfig {
    /// Extra wait after the computed boundary
    pub slack: Duration,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            slack: DEFAULT_SLACK,
        }
    }
}

impl RotationConfig {
    /// Set the slack added after each boundary.
    pub fn with_slack(mut self, slack: Duration) -> Self {
        self.slack = slack;
        self
    }
}

/// Publishes the current token at start and after every rollover.
#[derive(Debug, Clone)]
pub struct RotationTicker {
    codec: TokenCodec,
    config: RotationConfig,
}

impl RotationTicker {
    /// Create a ticker issuing from `codec`.
    pub fn new(codec: TokenCodec, config: RotationConfig) -> Self {
        Self { codec, config }
    }

    /// Spawn the ticker on the current tokio runtime.
    ///
    /// `publish` receives the window and its token once immediately, then
    /// once per window. The task runs until [`RotationHandle::shutdown`] is
    /// called; dropping the handle detaches it.
    pub fn start<F>(self, mut publish: F) -> RotationHandle
    where
        F: FnMut(Window, Token) + Send + 'static,
    {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
        let slack = self.config.slack;
        let codec = self.codec;

        let task = tokio::spawn(async move {
            debug!(
                slack_ms = slack.as_millis() as u64,
                window_seconds = codec.window_size().as_secs(),
                "rotation ticker started"
            );

            // Set once the handle is dropped without a shutdown signal
            let mut detached = false;

            loop {
                let issued = codec.issue();
                let wait = Duration::from_millis(issued.millis_until_next) + slack;
                publish(issued.window, issued.token);

                let sleep = tokio::time::sleep(wait);
                tokio::pin!(sleep);

                if !detached {
                    tokio::select! {
                        signal = &mut shutdown_rx => match signal {
                            Ok(()) => break,
                            Err(_) => detached = true,
                        },
                        _ = &mut sleep => continue,
                    }
                }
                sleep.await;
            }

            debug!("rotation ticker stopped");
        });

        RotationHandle {
            shutdown_tx: Some(shutdown_tx),
            task,
        }
    }

    /// Get the ticker configuration.
    pub fn config(&self) -> &RotationConfig {
        &self.config
    }

    /// Get a reference to the codec.
    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }
}

/// Handle to a running ticker.
#[derive(Debug)]
pub struct RotationHandle {
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl RotationHandle {
    /// Stop the ticker and wait for the task to finish.
    ///
    /// # Errors
    /// Returns `ShutdownError::TaskPanicked` if the publish callback panicked.
    pub async fn shutdown(mut self) -> Result<(), ShutdownError> {
        if let Some(tx) = self.shutdown_tx.take() {
            // The task may already be gone; the join below reports why.
            let _ = tx.send(());
        }

        match self.task.await {
            Ok(()) => Ok(()),
            Err(e) if e.is_panic() => Err(ShutdownError::TaskPanicked),
            Err(_) => Err(ShutdownError::TaskCancelled),
        }
    }

    /// Whether the task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
