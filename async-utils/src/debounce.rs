//! Trailing-edge debouncing for UI callbacks.
//!
//! [`Debouncer`] is the handle side of an actor/handle pair: every
//! [`Debouncer::call`] replaces the pending value and restarts the quiet
//! period, and the scheduler task invokes the callback once the caller has
//! been quiet for the configured delay. Only the most recent value is ever
//! delivered; superseded values are dropped.
//!
//! The scheduler lives exactly as long as the handle. Dropping the handle
//! cancels the task, so a pending value can never fire after its owner is
//! gone.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

enum Request<T> {
    Call(T),
    Cancel,
}

/// Handle to a debounce scheduler task.
#[derive(Debug)]
pub struct Debouncer<T> {
    request_tx: mpsc::UnboundedSender<Request<T>>,
    shutdown: CancellationToken,
}

impl<T> Debouncer<T>
where
    T: Send + 'static,
{
    /// Spawn a scheduler that calls `on_fire` `delay` after the last call.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new<F>(delay: Duration, on_fire: F) -> Self
    where
        F: FnMut(T) + Send + 'static,
    {
        let (request_tx, request_rx) = mpsc::unbounded_channel();
        let shutdown = CancellationToken::new();
        let scheduler = DebounceScheduler {
            delay,
            receiver: request_rx,
            on_fire,
            shutdown: shutdown.clone(),
        };
        tokio::spawn(scheduler.run());
        Self {
            request_tx,
            shutdown,
        }
    }

    /// Replace the pending value and restart the quiet period.
    pub fn call(&self, value: T) {
        let _ = self.request_tx.send(Request::Call(value));
    }

    /// Drop the pending value, if any, without firing it.
    pub fn cancel(&self) {
        let _ = self.request_tx.send(Request::Cancel);
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

struct DebounceScheduler<T, F> {
    delay: Duration,
    receiver: mpsc::UnboundedReceiver<Request<T>>,
    on_fire: F,
    shutdown: CancellationToken,
}

impl<T, F> DebounceScheduler<T, F>
where
    F: FnMut(T),
{
    async fn run(mut self) {
        let mut pending: Option<(T, Instant)> = None;
        loop {
            let deadline = pending.as_ref().map(|(_, at)| *at);
            let quiet_period_elapsed = async move {
                match deadline {
                    Some(at) => tokio::time::sleep_until(at).await,
                    None => std::future::pending::<()>().await,
                }
            };

            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => {
                    if pending.is_some() {
                        tracing::trace!("debouncer dropped with a pending call");
                    }
                    break;
                }
                request = self.receiver.recv() => {
                    match request {
                        Some(Request::Call(value)) => {
                            pending = Some((value, Instant::now() + self.delay));
                        }
                        Some(Request::Cancel) => pending = None,
                        // All handles dropped.
                        None => break,
                    }
                }
                _ = quiet_period_elapsed => {
                    if let Some((value, _)) = pending.take() {
                        (self.on_fire)(value);
                    }
                }
            }
        }
    }
}
