//! Recommendation letters, drafted by a text-generation service when one is
//! configured and filled from a fixed template otherwise.

use crate::Skill;
use anyhow::Result;
use itertools::Itertools;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Connection details for the text-generation service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LetterConfig {
    /// Base URL of an OpenAI-compatible API
    pub api_base: String,
    /// Bearer token; letters always use the template when this is unset
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for LetterConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            timeout_secs: 30,
        }
    }
}

/// What the letter should say about the student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LetterRequest {
    pub student_name: String,
    pub school_name: String,
    pub author_name: String,
    pub karma: i64,
    pub top_qualities: Vec<Skill>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LetterSource {
    Generated,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Letter {
    pub body: String,
    pub source: LetterSource,
}

/// Produce a letter. This makes at most one blocking request and never fails:
/// any problem with the service falls back to the template.
#[must_use]
pub fn generate(config: &LetterConfig, request: &LetterRequest) -> Letter {
    match request_completion(config, &build_prompt(request)) {
        Ok(body) => {
            debug!("Generated letter for {}", request.student_name);
            Letter {
                body,
                source: LetterSource::Generated,
            }
        }
        Err(e) => {
            warn!(
                "Letter generation failed for {}, using template: {e:#}",
                request.student_name
            );
            Letter {
                body: fallback_letter(request),
                source: LetterSource::Fallback,
            }
        }
    }
}

fn describe_qualities(qualities: &[Skill]) -> String {
    match qualities {
        [] => "their steady conduct".to_string(),
        [only] => only.to_string(),
        [init @ .., last] => format!("{} and {last}", init.iter().join(", ")),
    }
}

/// The instruction sent to the text-generation service.
#[must_use]
pub fn build_prompt(request: &LetterRequest) -> String {
    format!(
        "Write a formal recommendation letter for {student}, a student at {school}, \
        signed by {author}. Their teachers have highlighted {qualities}. \
        Their reputation score among staff is {karma}. Keep it under 300 words.",
        student = request.student_name,
        school = request.school_name,
        author = request.author_name,
        qualities = describe_qualities(&request.top_qualities),
        karma = request.karma,
    )
}

/// The canned letter used whenever the service is unavailable.
#[must_use]
pub fn fallback_letter(request: &LetterRequest) -> String {
    format!(
        "To whom it may concern,\n\n\
        I am pleased to recommend {student}, a student at {school}. \
        Staff at the school have consistently recognised {student} for {qualities}, \
        and {student} holds a reputation score of {karma} among their teachers.\n\n\
        I am confident {student} will bring the same qualities to any future endeavour.\n\n\
        Sincerely,\n{author}\n{school}\n",
        student = request.student_name,
        school = request.school_name,
        author = request.author_name,
        qualities = describe_qualities(&request.top_qualities),
        karma = request.karma,
    )
}

#[cfg(feature = "network")]
#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[cfg(feature = "network")]
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
}

#[cfg(feature = "network")]
#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[cfg(feature = "network")]
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[cfg(feature = "network")]
fn request_completion(config: &LetterConfig, prompt: &str) -> Result<String> {
    use anyhow::{Context, anyhow};
    use std::time::Duration;

    let api_key = config
        .api_key
        .as_deref()
        .filter(|key| !key.is_empty())
        .ok_or_else(|| anyhow!("No API key configured"))?;

    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .context("Failed to build HTTP client")?;

    let url = format!("{}/chat/completions", config.api_base.trim_end_matches('/'));
    let payload = ChatRequest {
        model: &config.model,
        messages: vec![ChatMessage {
            role: "user".to_string(),
            content: prompt.to_string(),
        }],
    };

    let response: ChatResponse = client
        .post(url)
        .bearer_auth(api_key)
        .json(&payload)
        .send()?
        .error_for_status()?
        .json()?;

    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content.trim().to_string())
        .filter(|text| !text.is_empty())
        .ok_or_else(|| anyhow!("Completion contained no text"))
}

#[cfg(not(feature = "network"))]
fn request_completion(_config: &LetterConfig, _prompt: &str) -> Result<String> {
    Err(anyhow::anyhow!("Built without network support"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(top_qualities: Vec<Skill>) -> LetterRequest {
        LetterRequest {
            student_name: "Ada Obi".to_string(),
            school_name: "ASJA Boys".to_string(),
            author_name: "Test User".to_string(),
            karma: 230,
            top_qualities,
        }
    }

    #[test_log::test]
    fn test_missing_key_falls_back() {
        let letter = generate(&LetterConfig::default(), &request(vec![Skill::Respect]));
        assert_eq!(letter.source, LetterSource::Fallback);
        assert!(letter.body.contains("Ada Obi"));
        assert!(letter.body.contains("respect"));
        assert!(letter.body.contains("230"));
    }

    #[test_log::test]
    fn test_unreachable_service_falls_back() {
        let config = LetterConfig {
            api_base: "http://127.0.0.1:1".to_string(),
            api_key: Some("test-key".to_string()),
            timeout_secs: 2,
            ..LetterConfig::default()
        };
        let letter = generate(&config, &request(Vec::new()));
        assert_eq!(letter.source, LetterSource::Fallback);
        assert!(letter.body.contains("their steady conduct"));
    }

    #[test_log::test]
    fn test_describe_qualities() {
        assert_eq!(describe_qualities(&[Skill::Teamwork]), "teamwork");
        assert_eq!(
            describe_qualities(&[Skill::Leadership, Skill::Respect, Skill::Teamwork]),
            "leadership, respect and teamwork"
        );
    }

    #[test_log::test]
    fn test_prompt_mentions_student_and_qualities() {
        let prompt = build_prompt(&request(vec![Skill::Leadership, Skill::Punctuality]));
        assert!(prompt.contains("Ada Obi"));
        assert!(prompt.contains("leadership and punctuality"));
    }
}
