//! Periodic purge of expired sessions.
//!
//! Stale rows are already ignored by every lookup, so a failed sweep is
//! logged and left for the next tick.

use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::session::store::SessionStore;

/// Interval between sweeps.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Run one sweep. Returns the number of removed rows, or `None` on failure.
pub async fn sweep_expired_sessions(store: &SessionStore) -> Option<u64> {
    match store.delete_expired(Utc::now()).await {
        Ok(count) => {
            if count > 0 {
                tracing::info!(count, "Swept expired sessions");
            }
            Some(count)
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to sweep expired sessions");
            None
        }
    }
}

/// Spawn a background task sweeping every `period` until aborted.
pub fn spawn_session_sweeper(store: SessionStore, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            sweep_expired_sessions(&store).await;
        }
    })
}
