use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::navigation::{Destination, Navigator};

/// A navigation scheduled to fire after a delay.
///
/// The redirect is tied to the lifetime of this handle: dropping it or calling
/// [`ScheduledRedirect::cancel`] aborts the pending task, so the navigation never
/// fires for a page that is no longer mounted. Must be created inside a tokio runtime.
#[derive(Debug)]
pub struct ScheduledRedirect {
    destination: Destination,
    handle: Option<JoinHandle<()>>,
}

impl ScheduledRedirect {
    pub fn schedule(
        navigator: Arc<dyn Navigator>,
        destination: Destination,
        delay: Duration,
    ) -> Self {
        debug!(?destination, delay_ms = delay.as_millis() as u64, "Redirect scheduled");
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            info!(?destination, "Redirecting");
            navigator.navigate(destination);
        });
        Self {
            destination,
            handle: Some(handle),
        }
    }

    pub fn destination(&self) -> Destination {
        self.destination
    }

    /// True once the navigation has fired or the redirect was cancelled.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(|handle| handle.is_finished())
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            if !handle.is_finished() {
                debug!(destination = ?self.destination, "Redirect cancelled");
            }
            handle.abort();
        }
    }

    /// Wait for the redirect to fire. Returns immediately if it was cancelled.
    pub async fn wait(mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for ScheduledRedirect {
    fn drop(&mut self) {
        self.cancel();
    }
}
