//! Background access-token expiry polling.

use std::time::Duration;

use jiff::Timestamp;
use tokio::{
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};

use crate::session::SessionHandle;

/// Polls the current access token's expiry claim on a fixed interval and
/// flags the session once it has passed.
///
/// Purely reactive: no network traffic and no proactive refresh before
/// expiry. Owned by the session lifecycle — spawned on session
/// acquisition, cancelled by [`SessionTracker::stop`] or by dropping the
/// tracker on teardown or logout.
#[derive(Debug)]
pub struct SessionTracker {
    task: JoinHandle<()>,
}

impl SessionTracker {
    /// Spawn the polling task.
    #[must_use]
    pub fn spawn(session: SessionHandle, every: Duration) -> Self {
        let task = tokio::spawn(async move {
            let mut ticker = time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                session.check_expiry(Timestamp::now());
            }
        });

        Self { task }
    }

    /// Cancel the polling task.
    pub fn stop(&self) {
        self.task.abort();
    }
}

impl Drop for SessionTracker {
    fn drop(&mut self) {
        self.task.abort();
    }
}
