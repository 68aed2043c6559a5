//! Redraw requests for the app loop.
//!
//! Anything that changes what is on screen holds a cloned [`FrameRequester`].
//! Requests share one single-slot broadcast channel, so any burst of them
//! turns into one [`super::TuiEvent::Draw`].

use std::time::Duration;

use tokio::sync::broadcast;

#[derive(Clone, Debug)]
pub struct FrameRequester {
    redraw_tx: broadcast::Sender<()>,
}

impl FrameRequester {
    pub(super) fn new(redraw_tx: broadcast::Sender<()>) -> Self {
        Self { redraw_tx }
    }

    /// Ask for a redraw on the next loop iteration.
    pub fn redraw(&self) {
        // Without a subscriber the event stream is gone and nothing draws.
        let _ = self.redraw_tx.send(());
    }

    /// Ask for a redraw once `delay` has passed. Used to tick the
    /// recording timer.
    pub fn redraw_after(&self, delay: Duration) {
        let requester = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            requester.redraw();
        });
    }
}
