use pitchside::scoring::RawMeasurements;
use pitchside::services::PlayerPromptContext;

pub fn measurements(
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

pub fn prompt_context() -> PlayerPromptContext {
    PlayerPromptContext {
        player_name: "Alex Doe".to_string(),
        age_years: 12,
        position: "midfielder".to_string(),
        latest_ratings: Some([6, 7, 5, 8]),
        open_goals: vec!["Improve weak foot".to_string()],
        focus: None,
    }
}
