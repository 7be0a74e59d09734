//! Physical assessment scoring.
//!
//! Converts the four raw field-test measurements into normalized 0-100
//! sub-scores and a weighted overall score. The formulas are carried over
//! unchanged from the club's historical scoring sheet so that new scores
//! stay comparable with persisted ones.

use serde::{Deserialize, Serialize};

/// Raw field-test measurements. Any measurement may be absent; absent or
/// non-positive values score 0 for that metric.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RawMeasurements {
    /// 30m sprint time in seconds (lower is better).
    pub sprint_seconds: Option<f64>,
    /// Standing vertical jump in inches (higher is better).
    pub vertical_jump_inches: Option<f64>,
    /// Yo-Yo Intermittent Recovery Test level (higher is better).
    pub yirt_level: Option<f64>,
    /// 5-10-5 shuttle time in seconds (lower is better).
    pub shuttle_seconds: Option<f64>,
}

/// Normalized scores, each rounded and clamped to 0-100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentScores {
    pub speed: i16,
    pub power: i16,
    pub endurance: i16,
    pub agility: i16,
    pub overall: i16,
}

const OVERALL_SPEED_WEIGHT: f64 = 6.0;
const OVERALL_POWER_WEIGHT: f64 = 3.0;
const OVERALL_ENDURANCE_WEIGHT: f64 = 6.0;

/// Score a set of raw measurements.
///
/// Pure and infallible: bad inputs degrade to zero sub-scores, they never
/// fail the computation. Agility is scored for display but carries no
/// weight in the overall.
pub fn score_assessment(raw: &RawMeasurements) -> AssessmentScores {
    let speed = raw_speed(raw.sprint_seconds.unwrap_or(0.0));
    let power = raw_power(raw.vertical_jump_inches.unwrap_or(0.0));
    let endurance = raw_endurance(raw.yirt_level.unwrap_or(0.0));
    let agility = raw_agility(raw.shuttle_seconds.unwrap_or(0.0));

    // The overall is weighted over the unrounded sub-scores, then
    // normalized like each sub-score.
    let overall = (OVERALL_SPEED_WEIGHT * speed
        + OVERALL_POWER_WEIGHT * power
        + OVERALL_ENDURANCE_WEIGHT * endurance)
        / (OVERALL_SPEED_WEIGHT + OVERALL_POWER_WEIGHT + OVERALL_ENDURANCE_WEIGHT);

    AssessmentScores {
        speed: round_clamp(speed),
        power: round_clamp(power),
        endurance: round_clamp(endurance),
        agility: round_clamp(agility),
        overall: round_clamp(overall),
    }
}

fn raw_speed(sprint: f64) -> f64 {
    if sprint > 0.0 {
        5.0 * (20.0 - 10.0 * (3.5 * (sprint - 2.8) / sprint))
    } else {
        0.0
    }
}

// Jump heights above 13 inches use the curve; 10 through 13 inches use the
// scoring sheet's fixed table. Non-integer heights strictly between the
// table steps match no branch and score 0. That gap is kept on purpose:
// interpolating here would shift historical scores (see DESIGN.md).
#[allow(clippy::float_cmp)]
fn raw_power(vertical: f64) -> f64 {
    if vertical > 13.0 {
        5.0 * (20.0 - 20.0 * (26.0 - vertical) / vertical)
    } else if vertical == 13.0 {
        10.0
    } else if vertical == 12.0 {
        9.0
    } else if vertical == 11.0 {
        8.0
    } else if vertical == 10.0 {
        7.0
    } else if vertical > 0.0 && vertical < 10.0 {
        5.0
    } else {
        0.0
    }
}

fn raw_endurance(yirt: f64) -> f64 {
    if yirt > 0.0 {
        5.0 * (20.0 - 10.0 * (55.0 - yirt) / 32.0)
    } else {
        0.0
    }
}

fn raw_agility(shuttle: f64) -> f64 {
    if shuttle > 0.0 {
        5.0 * (20.0 - 10.0 * (5.2 * (shuttle - 4.6) / shuttle))
    } else {
        0.0
    }
}

fn round_clamp(value: f64) -> i16 {
    value.round().clamp(0.0, 100.0) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    fn measurements(
        sprint: Option<f64>,
        vertical: Option<f64>,
        yirt: Option<f64>,
        shuttle: Option<f64>,
    ) -> RawMeasurements {
        RawMeasurements {
            sprint_seconds: sprint,
            vertical_jump_inches: vertical,
            yirt_level: yirt,
            shuttle_seconds: shuttle,
        }
    }

    #[test]
    fn sprint_worked_example() {
        // 5 * (20 - 10 * (3.5 * 0.7 / 3.5)) = 5 * 13 = 65
        let scores = score_assessment(&measurements(Some(3.5), None, None, None));
        assert_eq!(scores.speed, 65);
    }

    #[test]
    fn benchmark_sprint_scores_full_marks() {
        // The curve peaks at the 2.8s benchmark.
        let scores = score_assessment(&measurements(Some(2.8), None, None, None));
        assert_eq!(scores.speed, 100);
    }

    #[test]
    fn absent_measurements_score_zero() {
        let scores = score_assessment(&RawMeasurements::default());
        assert_eq!(
            scores,
            AssessmentScores {
                speed: 0,
                power: 0,
                endurance: 0,
                agility: 0,
                overall: 0
            }
        );
    }

    #[test]
    fn non_positive_measurements_score_zero() {
        let scores = score_assessment(&measurements(Some(0.0), Some(-3.0), Some(0.0), Some(-1.0)));
        assert_eq!(scores.speed, 0);
        assert_eq!(scores.power, 0);
        assert_eq!(scores.endurance, 0);
        assert_eq!(scores.agility, 0);
    }

    #[test]
    fn power_table_steps() {
        assert_eq!(raw_power(10.0), 7.0);
        assert_eq!(raw_power(11.0), 8.0);
        assert_eq!(raw_power(12.0), 9.0);
        assert_eq!(raw_power(13.0), 10.0);
        assert_eq!(raw_power(9.5), 5.0);
    }

    #[test]
    fn power_gap_between_table_steps() {
        // Heights strictly between the table steps fall through to 0.
        assert_eq!(raw_power(10.5), 0.0);
        assert_eq!(raw_power(12.9), 0.0);
    }

    #[test]
    fn power_curve_above_table() {
        let at_14 = raw_power(14.0);
        let at_20 = raw_power(20.0);
        assert!(at_14 > 10.0);
        assert!(at_20 > at_14);
    }

    #[test]
    fn agility_does_not_move_overall() {
        let fast_shuttle = score_assessment(&measurements(Some(3.5), Some(15.0), Some(45.0), Some(4.2)));
        let slow_shuttle = score_assessment(&measurements(Some(3.5), Some(15.0), Some(45.0), Some(6.5)));
        assert_ne!(fast_shuttle.agility, slow_shuttle.agility);
        assert_eq!(fast_shuttle.overall, slow_shuttle.overall);
    }

    #[test]
    fn deterministic_for_fixed_inputs() {
        let raw = measurements(Some(3.5), Some(15.0), Some(45.0), Some(4.8));
        assert_eq!(score_assessment(&raw), score_assessment(&raw));
    }
}
