use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::env;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible chat completions API. Unset
    /// means suggestions are disabled.
    pub endpoint: Option<String>,
    pub api_key: String,
    pub model: String,
}

impl LlmConfig {
    pub fn from_env() -> Self {
        LlmConfig {
            endpoint: env::var("LLM_ENDPOINT").ok(),
            api_key: env::var("LLM_API_KEY").unwrap_or_default(),
            model: env::var("LLM_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
        }
    }
}

#[derive(Error, Debug)]
pub enum SuggestionError {
    #[error("Suggestion endpoint not configured")]
    NotConfigured,
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Suggestion API returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("Suggestion API returned no usable text")]
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionKind {
    Goals,
    TrainingModules,
}

/// What the prompt gets to know about the player. Assembled by the API
/// layer from the player record, the latest evaluation and open goals.
#[derive(Debug, Clone, Default)]
pub struct PlayerPromptContext {
    pub player_name: String,
    pub age_years: i32,
    pub position: String,
    /// mental, technical, defending, attacking, when an evaluation exists
    pub latest_ratings: Option<[i16; 4]>,
    pub open_goals: Vec<String>,
    pub focus: Option<String>,
}

pub struct SuggestionService {
    client: Client,
    config: LlmConfig,
}

impl SuggestionService {
    pub fn new(config: LlmConfig) -> Result<Self, SuggestionError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self { client, config })
    }

    pub fn is_enabled(&self) -> bool {
        self.config.endpoint.is_some()
    }

    /// Ask the configured model for coaching suggestions. The reply is
    /// free text; it gets split into lines and returned as-is, with no
    /// validation beyond dropping empty lines.
    pub async fn suggest(
        &self,
        kind: SuggestionKind,
        context: &PlayerPromptContext,
    ) -> Result<Vec<String>, SuggestionError> {
        let endpoint = self
            .config
            .endpoint
            .as_deref()
            .ok_or(SuggestionError::NotConfigured)?;

        let body = json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": system_prompt(kind) },
                { "role": "user", "content": build_prompt(kind, context) },
            ],
            "temperature": 0.7,
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", endpoint.trim_end_matches('/')))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(SuggestionError::Api { status, body });
        }

        let completion: ChatCompletionResponse = response.json().await?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(SuggestionError::Empty)?;

        let suggestions = parse_suggestion_lines(&content);
        if suggestions.is_empty() {
            return Err(SuggestionError::Empty);
        }

        info!("generated {} {:?} suggestions", suggestions.len(), kind);
        Ok(suggestions)
    }
}

fn system_prompt(kind: SuggestionKind) -> &'static str {
    match kind {
        SuggestionKind::Goals => {
            "You are a youth soccer coach. Propose short, concrete development \
             goals for the player described. One goal per line, no numbering."
        }
        SuggestionKind::TrainingModules => {
            "You are a youth soccer coach. Propose short titles for training \
             modules suited to the player described. One title per line, no numbering."
        }
    }
}

/// Build the user prompt from the player context.
pub fn build_prompt(kind: SuggestionKind, context: &PlayerPromptContext) -> String {
    let mut prompt = format!(
        "Player: {}, age {}, position {}.",
        context.player_name, context.age_years, context.position
    );

    if let Some([mental, technical, defending, attacking]) = context.latest_ratings {
        prompt.push_str(&format!(
            " Latest coach ratings out of 10: mental {mental}, technical {technical}, \
             defending {defending}, attacking {attacking}."
        ));
    }
    if !context.open_goals.is_empty() {
        prompt.push_str(&format!(
            " Current open goals: {}.",
            context.open_goals.join("; ")
        ));
    }
    if let Some(focus) = &context.focus {
        prompt.push_str(&format!(" Focus area requested by the coach: {focus}."));
    }

    match kind {
        SuggestionKind::Goals => prompt.push_str(" Suggest 3 to 5 new development goals."),
        SuggestionKind::TrainingModules => {
            prompt.push_str(" Suggest 3 to 5 training modules.")
        }
    }
    prompt
}

/// Split model output into suggestion lines, stripping common bullet
/// and numbering prefixes.
pub fn parse_suggestion_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(|line| {
            line.trim()
                .trim_start_matches(['-', '*', '•'])
                .trim_start_matches(|c: char| c.is_ascii_digit())
                .trim_start_matches(['.', ')'])
                .trim()
                .to_string()
        })
        .filter(|line| !line.is_empty())
        .collect()
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_mentions_ratings_and_goals() {
        let context = PlayerPromptContext {
            player_name: "Alex Doe".to_string(),
            age_years: 12,
            position: "midfielder".to_string(),
            latest_ratings: Some([6, 7, 5, 8]),
            open_goals: vec!["Improve weak foot".to_string()],
            focus: Some("passing under pressure".to_string()),
        };
        let prompt = build_prompt(SuggestionKind::Goals, &context);
        assert!(prompt.contains("Alex Doe"));
        assert!(prompt.contains("technical 7"));
        assert!(prompt.contains("Improve weak foot"));
        assert!(prompt.contains("passing under pressure"));
    }

    #[test]
    fn parses_bulleted_and_numbered_lines() {
        let content = "- Work on first touch\n2. Shoot with both feet\n\n* Track back after losing the ball\n";
        assert_eq!(
            parse_suggestion_lines(content),
            vec![
                "Work on first touch".to_string(),
                "Shoot with both feet".to_string(),
                "Track back after losing the ball".to_string(),
            ]
        );
    }
}
