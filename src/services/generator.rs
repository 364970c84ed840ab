//! AI test-case generation service.
//!
//! Assembles a category-specific prompt, calls an OpenAI-compatible
//! chat-completions endpoint, and parses the reply into structured test
//! cases. Prompt assembly and reply parsing are pure functions so the
//! provider call is the only untestable seam.

use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

use crate::config::AiConfig;
use crate::error::{AppError, AppResult};
use crate::models::{GeneratedBatch, GeneratedTestCase};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Chat-completions request body (OpenAI-compatible).
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

/// Chat-completions response body (the parts we read).
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ChatReplyMessage {
    content: String,
}

/// AI test-case generator bound to one provider configuration.
#[derive(Clone)]
pub struct Generator {
    http_client: reqwest::Client,
    config: AiConfig,
}

impl Generator {
    /// Create a generator from provider settings.
    pub fn new(config: AiConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client for AI provider");

        if config.api_key.is_none() {
            warn!("AI_API_KEY is not set; test-case generation requests will fail");
        }

        Generator {
            http_client,
            config,
        }
    }

    /// Generate test cases for a feature description.
    pub async fn generate(
        &self,
        title: &str,
        description: &str,
        category: &str,
    ) -> AppResult<Vec<GeneratedTestCase>> {
        let api_key = self.config.api_key.as_ref().ok_or_else(|| {
            AppError::AiProvider("AI provider is not configured (set AI_API_KEY)".to_string())
        })?;

        let prompt = build_prompt(title, description, category);

        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let response = self
            .http_client
            .post(&self.config.api_url)
            .bearer_auth(api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::AiProvider(format!("Provider request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("AI provider returned {}: {}", status, body);
            return Err(AppError::AiProvider(format!(
                "Provider returned status {}",
                status
            )));
        }

        let reply: ChatResponse = response
            .json()
            .await
            .map_err(|e| AppError::AiProvider(format!("Unreadable provider reply: {}", e)))?;

        let content = reply
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| AppError::AiProvider("Provider reply had no choices".to_string()))?;

        let testcases = parse_generated(&content)?;
        info!(
            "Generated {} test cases for '{}' ({})",
            testcases.len(),
            title,
            category
        );

        Ok(testcases)
    }
}

fn category_guide(category: &str) -> &'static str {
    match category {
        "Functional" => {
            "normal operation, error handling, input validation, and business rules"
        }
        "Integration" => "interaction between modules, data flow, and API integration",
        "UI" => "element rendering, layout, user interaction, and responsive design",
        "API" => "REST endpoints, request/response shapes, status codes, and error handling",
        "Performance" => "response time, throughput, load handling, and memory usage",
        "Security" => "authentication, authorization, data protection, and injection defenses",
        _ => "functional behavior",
    }
}

fn category_scenarios(category: &str) -> &'static str {
    match category {
        "Functional" => {
            "- Happy-path cases\n- Error cases\n- Boundary tests\n- Negative cases\n- Business rule checks"
        }
        "Integration" => {
            "- Data hand-off between modules\n- API integration tests\n- External system integration\n- Error propagation tests"
        }
        "UI" => {
            "- Element rendering tests\n- User interaction tests\n- Responsive layout tests\n- Accessibility tests"
        }
        "API" => {
            "- Endpoint happy-path calls\n- Request/response shape checks\n- HTTP status code checks\n- Error response tests"
        }
        "Performance" => {
            "- Response time measurements\n- Large data set handling\n- Concurrent load tests\n- Memory usage tests"
        }
        "Security" => {
            "- Authentication tests\n- Authorization checks\n- Data encryption tests\n- Vulnerability probes"
        }
        _ => "- Happy-path cases\n- Error cases",
    }
}

/// Assemble the generation prompt for one feature and category.
fn build_prompt(title: &str, description: &str, category: &str) -> String {
    format!(
        r#"You are an expert test-case author. Generate "{category}" test cases for the feature below and reply with JSON only.

Feature title: {title}
Test category: {category}
Category focus: {guide}

Feature description/specification:
{description}

The description may be free-form or a structured template. Analyze it either way and derive test scenarios.

Reply in exactly this JSON shape:
{{
  "testcases": [
    {{
      "title": "Test case title",
      "description": "What the test verifies",
      "priority": "High|Medium|Low",
      "category": "{category}",
      "preconditions": "Preconditions",
      "steps": [
        {{
          "step_number": 1,
          "action": "Action to perform",
          "expected_result": "Expected outcome"
        }}
      ],
      "postconditions": "Postconditions",
      "tags": ["tag1", "tag2"]
    }}
  ]
}}

Every test case's category must be "{category}". Cover scenarios such as:
{scenarios}

Generate 5-7 "{category}" test cases. Keep each one concise so the reply is not truncated.
Important:
- Return only JSON, no other commentary
- The reply must be complete, valid JSON"#,
        category = category,
        title = title,
        guide = category_guide(category),
        scenarios = category_scenarios(category),
    )
}

/// Strip a surrounding markdown code fence from a provider reply.
fn strip_code_fences(reply: &str) -> &str {
    let trimmed = reply.trim();
    let without_open = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    without_open
        .trim_start_matches('\n')
        .trim_end()
        .strip_suffix("```")
        .map(str::trim_end)
        .unwrap_or_else(|| without_open.trim())
}

/// Parse the provider reply into generated test cases.
///
/// A reply that does not end in `}` after fence stripping was truncated by
/// the token limit and is rejected rather than half-parsed.
fn parse_generated(reply: &str) -> AppResult<Vec<GeneratedTestCase>> {
    let json = strip_code_fences(reply);

    if !json.ends_with('}') {
        return Err(AppError::AiProvider(
            "Provider reply was truncated; retry with a shorter description".to_string(),
        ));
    }

    let batch: GeneratedBatch = serde_json::from_str(json)
        .map_err(|e| AppError::AiProvider(format!("Provider reply was not valid JSON: {}", e)))?;

    Ok(batch.testcases)
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPLY: &str = r#"{"testcases": [{"title": "Valid login", "steps": [{"step_number": 1, "action": "Submit form", "expected_result": "Redirect to home"}]}]}"#;

    #[test]
    fn test_parse_plain_json() {
        let cases = parse_generated(REPLY).unwrap();
        assert_eq!(cases.len(), 1);
        assert_eq!(cases[0].title, "Valid login");
    }

    #[test]
    fn test_parse_strips_json_fence() {
        let fenced = format!("```json\n{}\n```", REPLY);
        let cases = parse_generated(&fenced).unwrap();
        assert_eq!(cases.len(), 1);
    }

    #[test]
    fn test_parse_strips_bare_fence() {
        let fenced = format!("```\n{}\n```", REPLY);
        let cases = parse_generated(&fenced).unwrap();
        assert_eq!(cases.len(), 1);
    }

    #[test]
    fn test_parse_rejects_truncated_reply() {
        let truncated = &REPLY[..REPLY.len() - 20];
        let err = parse_generated(truncated).unwrap_err();
        assert!(matches!(err, AppError::AiProvider(_)));
    }

    #[test]
    fn test_parse_rejects_non_json() {
        let err = parse_generated("Here are your test cases: {}").unwrap_err();
        assert!(matches!(err, AppError::AiProvider(_)));
    }

    #[test]
    fn test_prompt_mentions_category_and_feature() {
        let prompt = build_prompt("Login", "Users sign in with email", "Security");
        assert!(prompt.contains("Login"));
        assert!(prompt.contains("Users sign in with email"));
        assert!(prompt.contains("\"Security\""));
        assert!(prompt.contains("Authorization checks"));
    }
}
