//! Syntactic checks and advisory warnings for score submissions.

use thiserror::Error;
use validator::ValidationError;

use crate::{config::ScoringRules, model::SetScore};

/// Non-fatal annotation attached to an accepted score edit.
///
/// The store never rejects an unusual-but-well-formed score; it records the
/// edit and hands these back so the UI can flag the entry to the writer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoreWarning {
    /// A side's score is above the configured cap.
    #[error("set {set_number}: {points} points is above the cap")]
    ScoreAboveCap {
        /// Set the warning refers to.
        set_number: u8,
        /// The offending score.
        points: u16,
    },
    /// A completed set reached the target but was won by less than the
    /// required margin.
    #[error("set {set_number}: completed {team1_points}-{team2_points} with a winning margin below the minimum")]
    NarrowMargin {
        /// Set the warning refers to.
        set_number: u8,
        /// First team's points.
        team1_points: u16,
        /// Second team's points.
        team2_points: u16,
    },
}

/// Validate the structural shape of a set sequence.
///
/// At most one set may be open (`completed_at == 0`) and it must be the last
/// element; set numbers must be strictly increasing.
pub fn validate_set_sequence(sets: &[SetScore]) -> Result<(), ValidationError> {
    let open_count = sets.iter().filter(|set| set.is_open()).count();
    if open_count > 1 {
        let mut err = ValidationError::new("multiple_open_sets");
        err.message = Some(format!("{open_count} sets are open; at most one may be").into());
        return Err(err);
    }

    if let Some(open_position) = sets.iter().position(SetScore::is_open) {
        if open_position != sets.len() - 1 {
            let mut err = ValidationError::new("open_set_not_last");
            err.message = Some("the open set must be the last element".into());
            return Err(err);
        }
    }

    for window in sets.windows(2) {
        if window[1].set_number <= window[0].set_number {
            let mut err = ValidationError::new("set_numbers_not_increasing");
            err.message = Some(
                format!(
                    "set {} follows set {}",
                    window[1].set_number, window[0].set_number
                )
                .into(),
            );
            return Err(err);
        }
    }

    Ok(())
}

/// Scan a set sequence for unusual scores under the given rules.
pub fn advisory_warnings(sets: &[SetScore], rules: &ScoringRules) -> Vec<ScoreWarning> {
    let mut warnings = Vec::new();

    for set in sets {
        for points in [set.team1_points, set.team2_points] {
            if points > rules.point_cap {
                warnings.push(ScoreWarning::ScoreAboveCap {
                    set_number: set.set_number,
                    points,
                });
            }
        }

        if !set.is_open() {
            let leader = set.team1_points.max(set.team2_points);
            let margin = set.team1_points.abs_diff(set.team2_points);
            if leader >= rules.target_points && margin < rules.min_margin {
                warnings.push(ScoreWarning::NarrowMargin {
                    set_number: set.set_number,
                    team1_points: set.team1_points,
                    team2_points: set.team2_points,
                });
            }
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SET_OPEN;

    fn set(set_number: u8, team1: u16, team2: u16, completed_at: i64) -> SetScore {
        SetScore {
            set_number,
            team1_points: team1,
            team2_points: team2,
            completed_at,
        }
    }

    #[test]
    fn well_formed_sequence_passes() {
        let sets = vec![
            set(1, 25, 20, 1_000),
            set(2, 23, 25, 2_000),
            set(3, 4, 2, SET_OPEN),
        ];
        assert!(validate_set_sequence(&sets).is_ok());
    }

    #[test]
    fn open_set_must_be_last() {
        let sets = vec![set(1, 10, 8, SET_OPEN), set(2, 25, 20, 2_000)];
        let err = validate_set_sequence(&sets).unwrap_err();
        assert_eq!(err.code, "open_set_not_last");
    }

    #[test]
    fn at_most_one_open_set() {
        let sets = vec![set(1, 10, 8, SET_OPEN), set(2, 1, 0, SET_OPEN)];
        let err = validate_set_sequence(&sets).unwrap_err();
        assert_eq!(err.code, "multiple_open_sets");
    }

    #[test]
    fn set_numbers_must_increase() {
        let sets = vec![set(2, 25, 20, 1_000), set(2, 25, 21, 2_000)];
        let err = validate_set_sequence(&sets).unwrap_err();
        assert_eq!(err.code, "set_numbers_not_increasing");
    }

    #[test]
    fn normal_set_yields_no_warnings() {
        let rules = ScoringRules::default();
        assert!(advisory_warnings(&[set(1, 25, 23, 1_000)], &rules).is_empty());
        // Extended set won by two.
        assert!(advisory_warnings(&[set(1, 32, 30, 1_000)], &rules).is_empty());
        // Open set at the target with a one-point lead is fine while running.
        assert!(advisory_warnings(&[set(1, 25, 24, SET_OPEN)], &rules).is_empty());
    }

    #[test]
    fn score_above_cap_is_flagged() {
        let rules = ScoringRules::default();
        let warnings = advisory_warnings(&[set(1, 51, 10, 1_000)], &rules);
        assert_eq!(
            warnings,
            vec![ScoreWarning::ScoreAboveCap {
                set_number: 1,
                points: 51
            }]
        );
    }

    #[test]
    fn narrow_margin_on_completed_set_is_flagged() {
        let rules = ScoringRules::default();
        let warnings = advisory_warnings(&[set(3, 25, 24, 3_000)], &rules);
        assert_eq!(
            warnings,
            vec![ScoreWarning::NarrowMargin {
                set_number: 3,
                team1_points: 25,
                team2_points: 24
            }]
        );
    }
}
