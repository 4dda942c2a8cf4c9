use std::{sync::Arc, time::Duration};

use tokio::{
    sync::{broadcast, watch},
    time::{MissedTickBehavior, interval},
};
use tracing::{debug, warn};

use crate::{scores::ScoreStore, sync::SyncEvent};

/// Forward bus events into a consumer's score store until shutdown.
///
/// Lagging behind the broadcast channel is not fatal: skipped events are
/// recovered by the polling path, so the loop just keeps reading.
pub async fn run_subscriber(
    mut receiver: broadcast::Receiver<SyncEvent>,
    scores: Arc<ScoreStore>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            received = receiver.recv() => match received {
                Ok(event) => {
                    scores.apply_event(event);
                }
                Err(broadcast::error::RecvError::Closed) => break,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped, "sync subscriber lagged; poll will reconcile");
                    continue;
                }
            },
        }
    }
    debug!(scope = %scores.scope(), "sync subscriber stopped");
}

/// Periodically re-read the shared score table and merge it, until shutdown.
///
/// Runs on a fixed interval regardless of bus traffic; this is what catches
/// up consumers that were closed or disconnected when a broadcast fired.
pub async fn run_poller(
    scores: Arc<ScoreStore>,
    poll_interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick fires immediately; skip it so a fresh consumer polls
    // after one full interval like every later cycle.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            _ = ticker.tick() => {
                match scores.poll_shared() {
                    Ok(applied) if applied > 0 => {
                        debug!(scope = %scores.scope(), applied, "reconciliation poll applied records");
                    }
                    Ok(_) => {}
                    Err(err) => {
                        warn!(scope = %scores.scope(), error = %err, "reconciliation poll failed");
                    }
                }
            }
        }
    }
    debug!(scope = %scores.scope(), "reconciliation poller stopped");
}
