use proptest::prelude::*;

use pitchside::scoring::score_assessment;

mod common;
use common::measurements;

#[test]
fn worked_example_full_tuple() {
    // sprint=3.5 -> speed 5*(20-10*0.7) = 65
    // vertical=15 -> power 5*(20-20*11/15) = 26.67 -> 27
    // yirt=45 -> endurance 5*(20-10*10/32) = 84.375 -> 84
    let scores = score_assessment(&measurements(Some(3.5), Some(15.0), Some(45.0), Some(4.8)));
    assert_eq!(scores.speed, 65);
    assert_eq!(scores.power, 27);
    assert_eq!(scores.endurance, 84);
    // overall from raw values: (6*65 + 3*26.667 + 6*84.375) / 15 = 65.08 -> 65
    assert_eq!(scores.overall, 65);
}

#[test]
fn power_table_before_clamping() {
    for (vertical, expected) in [(10.0, 7), (11.0, 8), (12.0, 9), (13.0, 10)] {
        let scores = score_assessment(&measurements(None, Some(vertical), None, None));
        assert_eq!(scores.power, expected, "vertical jump {vertical}");
    }
}

proptest! {
    #[test]
    fn non_positive_sprint_always_scores_zero(
        sprint in -20.0f64..=0.0,
        vertical in 0.0f64..40.0,
        yirt in 0.0f64..60.0,
        shuttle in 0.0f64..12.0,
    ) {
        let scores = score_assessment(&measurements(Some(sprint), Some(vertical), Some(yirt), Some(shuttle)));
        prop_assert_eq!(scores.speed, 0);
    }

    #[test]
    fn every_score_stays_in_range(
        sprint in -5.0f64..30.0,
        vertical in -5.0f64..60.0,
        yirt in -5.0f64..90.0,
        shuttle in -5.0f64..30.0,
    ) {
        let scores = score_assessment(&measurements(Some(sprint), Some(vertical), Some(yirt), Some(shuttle)));
        for score in [scores.speed, scores.power, scores.endurance, scores.agility, scores.overall] {
            prop_assert!((0..=100).contains(&score));
        }
    }

    #[test]
    fn power_is_monotone_above_the_table(
        vertical in 13.01f64..40.0,
        delta in 0.01f64..10.0,
    ) {
        let lower = score_assessment(&measurements(None, Some(vertical), None, None));
        let higher = score_assessment(&measurements(None, Some(vertical + delta), None, None));
        prop_assert!(higher.power >= lower.power);
    }

    #[test]
    fn overall_never_depends_on_shuttle(
        sprint in 0.5f64..20.0,
        vertical in 0.0f64..40.0,
        yirt in 0.5f64..60.0,
        shuttle_a in 0.5f64..12.0,
        shuttle_b in 0.5f64..12.0,
    ) {
        let a = score_assessment(&measurements(Some(sprint), Some(vertical), Some(yirt), Some(shuttle_a)));
        let b = score_assessment(&measurements(Some(sprint), Some(vertical), Some(yirt), Some(shuttle_b)));
        prop_assert_eq!(a.overall, b.overall);
        prop_assert_eq!(a.speed, b.speed);
        prop_assert_eq!(a.power, b.power);
        prop_assert_eq!(a.endurance, b.endurance);
    }

    #[test]
    fn scoring_is_deterministic(
        sprint in 0.5f64..20.0,
        vertical in 0.0f64..40.0,
        yirt in 0.5f64..60.0,
        shuttle in 0.5f64..12.0,
    ) {
        let raw = measurements(Some(sprint), Some(vertical), Some(yirt), Some(shuttle));
        prop_assert_eq!(score_assessment(&raw), score_assessment(&raw));
    }
}
