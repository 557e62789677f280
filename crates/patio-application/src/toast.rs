//! Transient confirmation notice.
//!
//! Purely cosmetic: simulates the "confirmation email sent" notice after a
//! reservation is confirmed. The flag appears after a short delay and
//! auto-dismisses; observers watch it through a channel.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

const DEFAULT_APPEAR_DELAY: Duration = Duration::from_secs(1);
const DEFAULT_DISPLAY_FOR: Duration = Duration::from_secs(5);

/// Visibility flag for the confirmation notice.
#[derive(Clone)]
pub struct ConfirmationToast {
    visible: Arc<watch::Sender<bool>>,
    appear_delay: Duration,
    display_for: Duration,
}

impl Default for ConfirmationToast {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfirmationToast {
    /// Creates a toast with the standard timing (visible after 1 s,
    /// dismissed 5 s later).
    pub fn new() -> Self {
        Self::with_timing(DEFAULT_APPEAR_DELAY, DEFAULT_DISPLAY_FOR)
    }

    pub fn with_timing(appear_delay: Duration, display_for: Duration) -> Self {
        let (visible, _) = watch::channel(false);
        Self {
            visible: Arc::new(visible),
            appear_delay,
            display_for,
        }
    }

    /// Subscribes to visibility changes.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.visible.subscribe()
    }

    /// Current visibility.
    pub fn is_visible(&self) -> bool {
        *self.visible.borrow()
    }

    /// Schedules one appear/dismiss cycle on the runtime.
    pub fn schedule(&self) {
        let visible = self.visible.clone();
        let appear_delay = self.appear_delay;
        let display_for = self.display_for;
        tokio::spawn(async move {
            tokio::time::sleep(appear_delay).await;
            visible.send_replace(true);
            tokio::time::sleep(display_for).await;
            visible.send_replace(false);
        });
    }
}
