//! Demo binary wiring several simulated consumers against one shared store.

use std::{sync::Arc, time::Duration};

use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rallypoint::{
    CoreConfig, CoverageSession,
    claims::LeaseStatus,
    dao::tables::MemoryStore,
    model::{CourtMatch, MatchStatus, SET_OPEN, SetScore},
    scores::{ScoreUpdate, summarize},
    sync::SyncHub,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = CoreConfig::load();
    let store = MemoryStore::shared();
    let hub = SyncHub::new(config.hub_capacity);
    let scope = "beach-open-2026";

    // Two independent consumers, as two tabs would be.
    let alice = CoverageSession::spawn_as(
        store.clone(),
        hub.clone(),
        scope,
        "alice",
        &config,
        Arc::new(rallypoint::claims::SystemClock),
    );
    let bob = CoverageSession::spawn(store, hub, scope, &config);

    let schedule = demo_schedule();
    alice.refresh_schedule(schedule.clone());
    bob.refresh_schedule(schedule.clone());

    for court_match in &schedule {
        let conflicts = alice.conflicts_for(court_match.match_id);
        info!(
            match_id = court_match.match_id,
            court = court_match.court_id,
            starts = %format_epoch_ms(court_match.scheduled_start),
            ?conflicts,
            "scheduled match"
        );
    }

    // Alice claims match 101; bob's competing claim is rejected.
    let lease = alice.claim(101)?;
    info!(match_id = 101, expires = %format_epoch_ms(lease.expires_at), "alice claimed match");
    if let Err(err) = bob.claim(101) {
        info!(match_id = 101, %err, "bob's claim was rejected");
    }
    info!(status = ?bob.claim_status(101)?, "match 101 as bob sees it");

    // Alice live-scores the first set; bob picks it up off the bus.
    let outcome = alice.record_score(
        101,
        ScoreUpdate {
            sets: vec![SetScore {
                set_number: 1,
                team1_points: 25,
                team2_points: 23,
                completed_at: lease.acquired_at,
            }, SetScore {
                set_number: 2,
                team1_points: 3,
                team2_points: 1,
                completed_at: SET_OPEN,
            }],
            status: MatchStatus::InProgress,
        },
    )?;
    for warning in &outcome.warnings {
        warn!(match_id = 101, %warning, "unusual score accepted");
    }

    tokio::time::sleep(Duration::from_millis(50)).await;
    match bob.score(101) {
        Some(record) => {
            let summary = summarize(&record);
            info!(
                writer = %record.last_updated_by,
                sets = %format!("{}-{}", summary.team1_sets, summary.team2_sets),
                current_set = ?summary.current_set,
                "bob's reconciled view of match 101"
            );
        }
        None => warn!("bob has not reconciled match 101 yet"),
    }

    // Alice hands the match over and walks away.
    alice.transfer(101, bob.consumer_id())?;
    info!(status = ?bob.claim_status(101)?, "match 101 after handover");
    if matches!(bob.claim_status(101)?, LeaseStatus::ClaimedBySelf) {
        bob.release(101)?;
    }

    alice.close().await;
    bob.close().await;
    Ok(())
}

/// A small Saturday-morning schedule: 101 and 102 overlap on different
/// courts, 103 shares a court with 101, 104 is alone in the afternoon.
fn demo_schedule() -> Vec<CourtMatch> {
    let base = OffsetDateTime::now_utc().unix_timestamp() * 1_000;
    let hour = 3_600_000;
    let half = hour / 2;
    vec![
        CourtMatch {
            match_id: 101,
            court_id: 1,
            scheduled_start: base,
            scheduled_end: base + hour,
            team1: "Sandstorm".into(),
            team2: "Netrunners".into(),
        },
        CourtMatch {
            match_id: 102,
            court_id: 2,
            scheduled_start: base + half,
            scheduled_end: base + half + hour,
            team1: "Block Party".into(),
            team2: "Dig This".into(),
        },
        CourtMatch {
            match_id: 103,
            court_id: 1,
            scheduled_start: base + half,
            scheduled_end: base + half + hour,
            team1: "Side Out".into(),
            team2: "Ace Holes".into(),
        },
        CourtMatch {
            match_id: 104,
            court_id: 3,
            scheduled_start: base + 4 * hour,
            scheduled_end: base + 5 * hour,
            team1: "Spiked Punch".into(),
            team2: "Set To Kill".into(),
        },
    ]
}

/// Render an epoch-millisecond timestamp for log output.
fn format_epoch_ms(epoch_ms: i64) -> String {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(epoch_ms) * 1_000_000)
        .ok()
        .and_then(|timestamp| timestamp.format(&Rfc3339).ok())
        .unwrap_or_else(|| "invalid-timestamp".into())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,rallypoint=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
