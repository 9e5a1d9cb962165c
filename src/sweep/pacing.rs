//! Request pacing against the shared RPC endpoint.
//!
//! Each account owns its nonce sequence, so pacing has nothing to do with
//! nonce safety. It only throttles how fast accounts hit the node.
//! The pacer is shared by every in-flight account, keeping the limit global
//! when accounts run concurrently.
//!
//! Sequential runs call `finished` after each account, so the interval is
//! measured from the end of one account to the start of the next. Concurrent
//! runs only space account starts.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};

/// Enforces a minimum interval between successive accounts.
#[derive(Debug)]
pub struct Pacer {
    interval: Duration,
    last_mark: Mutex<Option<Instant>>,
}

impl Pacer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_mark: Mutex::new(None),
        }
    }

    /// Wait until this caller may start. The first caller never waits.
    pub async fn wait_turn(&self) {
        let mut last_mark = self.last_mark.lock().await;

        if let Some(previous) = *last_mark {
            let ready_at = previous + self.interval;
            if ready_at > Instant::now() {
                tracing::trace!(wait_ms = (ready_at - Instant::now()).as_millis() as u64, "Pacing");
                sleep_until(ready_at).await;
            }
        }

        *last_mark = Some(Instant::now());
    }

    /// Restart the interval from now, once an account's work is done.
    pub async fn finished(&self) {
        *self.last_mark.lock().await = Some(Instant::now());
    }
}
