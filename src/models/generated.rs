//! Structured output of the AI test-case generation service.
//!
//! The provider is asked for snake_case keys, but camelCase aliases are
//! accepted since models do not always follow the letter of the prompt.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One generated test step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GeneratedStep {
    #[serde(alias = "stepNumber")]
    pub step_number: i32,
    pub action: String,
    #[serde(alias = "expectedResult")]
    pub expected_result: String,
}

/// One generated test case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GeneratedTestCase {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub preconditions: Option<String>,
    #[serde(default)]
    pub steps: Vec<GeneratedStep>,
    #[serde(default)]
    pub postconditions: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// The batch shape the provider is asked to return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GeneratedBatch {
    pub testcases: Vec<GeneratedTestCase>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_camel_case_aliases() {
        let json = r#"{
            "testcases": [{
                "title": "Login with valid credentials",
                "steps": [
                    {"stepNumber": 1, "action": "Open login page", "expectedResult": "Form shown"}
                ]
            }]
        }"#;

        let batch: GeneratedBatch = serde_json::from_str(json).unwrap();
        assert_eq!(batch.testcases.len(), 1);
        assert_eq!(batch.testcases[0].steps[0].step_number, 1);
        assert_eq!(batch.testcases[0].steps[0].expected_result, "Form shown");
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let json = r#"{"testcases": [{"title": "Minimal"}]}"#;

        let batch: GeneratedBatch = serde_json::from_str(json).unwrap();
        let case = &batch.testcases[0];
        assert!(case.steps.is_empty());
        assert!(case.tags.is_empty());
        assert!(case.priority.is_none());
    }
}
