//! Runtime configuration for the coordination core.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the core looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/rallypoint.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "RALLYPOINT_CONFIG_PATH";

/// Grace period appended to a match's scheduled end when computing lease
/// expiry, in minutes.
const DEFAULT_LEASE_BUFFER_MINUTES: u64 = 30;
/// Interval between score reconciliation polls, in seconds.
const DEFAULT_POLL_INTERVAL_SECONDS: u64 = 3;
/// Capacity of the sync bus broadcast channel.
const DEFAULT_HUB_CAPACITY: usize = 16;

/// Immutable runtime configuration shared by every consumer session.
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Grace period appended to a match's scheduled end before its lease lapses.
    pub lease_buffer: Duration,
    /// Interval between reconciliation polls of the shared score table.
    pub poll_interval: Duration,
    /// Capacity of the sync bus broadcast channel.
    pub hub_capacity: usize,
    /// Advisory volleyball scoring rules used for score warnings.
    pub scoring: ScoringRules,
}

/// Advisory rules describing a normal volleyball set.
#[derive(Debug, Clone, Copy)]
pub struct ScoringRules {
    /// Points a side needs to win a regular set.
    pub target_points: u16,
    /// Upper bound above which a recorded score is considered abnormal.
    pub point_cap: u16,
    /// Minimum winning margin once either side reaches the target.
    pub min_margin: u16,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            target_points: 25,
            point_cap: 50,
            min_margin: 2,
        }
    }
}

impl CoreConfig {
    /// Load the configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let config: Self = raw.into();
                    info!(path = %path.display(), "loaded coordination config");
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Lease buffer as epoch milliseconds, the unit lease arithmetic uses.
    pub fn lease_buffer_ms(&self) -> i64 {
        self.lease_buffer.as_millis() as i64
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            lease_buffer: Duration::from_secs(DEFAULT_LEASE_BUFFER_MINUTES * 60),
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECONDS),
            hub_capacity: DEFAULT_HUB_CAPACITY,
            scoring: ScoringRules::default(),
        }
    }
}

/// JSON representation of the configuration file.
#[derive(Debug, Deserialize)]
struct RawConfig {
    lease_buffer_minutes: Option<u64>,
    poll_interval_seconds: Option<u64>,
    hub_capacity: Option<usize>,
    scoring: Option<RawScoring>,
}

/// JSON representation of the scoring rules block.
#[derive(Debug, Deserialize)]
struct RawScoring {
    target_points: Option<u16>,
    point_cap: Option<u16>,
    min_margin: Option<u16>,
}

impl From<RawConfig> for CoreConfig {
    fn from(raw: RawConfig) -> Self {
        let defaults = CoreConfig::default();
        let scoring = raw.scoring.map(Into::into).unwrap_or(defaults.scoring);
        Self {
            lease_buffer: raw
                .lease_buffer_minutes
                .map(|minutes| Duration::from_secs(minutes * 60))
                .unwrap_or(defaults.lease_buffer),
            poll_interval: raw
                .poll_interval_seconds
                .map(Duration::from_secs)
                .unwrap_or(defaults.poll_interval),
            hub_capacity: raw.hub_capacity.unwrap_or(defaults.hub_capacity),
            scoring,
        }
    }
}

impl From<RawScoring> for ScoringRules {
    fn from(raw: RawScoring) -> Self {
        let defaults = ScoringRules::default();
        Self {
            target_points: raw.target_points.unwrap_or(defaults.target_points),
            point_cap: raw.point_cap.unwrap_or(defaults.point_cap),
            min_margin: raw.min_margin.unwrap_or(defaults.min_margin),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_tournament_conventions() {
        let config = CoreConfig::default();
        assert_eq!(config.lease_buffer_ms(), 30 * 60 * 1_000);
        assert_eq!(config.poll_interval, Duration::from_secs(3));
        assert_eq!(config.scoring.target_points, 25);
        assert_eq!(config.scoring.point_cap, 50);
        assert_eq!(config.scoring.min_margin, 2);
    }

    #[test]
    fn partial_raw_config_keeps_defaults_for_missing_fields() {
        let raw: RawConfig =
            serde_json::from_str(r#"{ "poll_interval_seconds": 10 }"#).unwrap();
        let config: CoreConfig = raw.into();
        assert_eq!(config.poll_interval, Duration::from_secs(10));
        assert_eq!(config.lease_buffer, Duration::from_secs(30 * 60));
        assert_eq!(config.hub_capacity, DEFAULT_HUB_CAPACITY);
    }
}
