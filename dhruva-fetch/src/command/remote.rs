//! Planning-service backend over HTTP.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use super::reply::plan_from_reply;
use super::{CommandParser, ParseError, ParserConfig, TaskPlan};
use crate::error::{FetchError, Result};

/// Instructions prepended to every operator command
const PROMPT: &str = r#"You are the task planner of a mobile fetch robot.
Convert the operator command into a JSON plan with exactly these keys:
"action" ("fetch" to bring the object back, "find" to only locate it),
"object_description" (short description, e.g. "red box"),
"object_color" (one lowercase word, or "unknown"),
"object_type" (category, e.g. "phone", "book", "cup", "ball", "box").
Return only the JSON.
Command: "#;

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Blocking client for a `/api/generate` text-generation endpoint.
pub struct HttpPlanner {
    client: Client,
    url: String,
    model: String,
}

impl HttpPlanner {
    pub fn new(config: &ParserConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| FetchError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            url: format!("{}/api/generate", config.endpoint.trim_end_matches('/')),
            model: config.model.clone(),
        })
    }
}

impl CommandParser for HttpPlanner {
    fn parse(&mut self, raw: &str) -> std::result::Result<TaskPlan, ParseError> {
        if raw.trim().is_empty() {
            return Err(ParseError::Empty);
        }
        let request = GenerateRequest {
            model: &self.model,
            prompt: format!("{PROMPT}{:?}", raw.trim()),
            stream: false,
        };
        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .map_err(|e| ParseError::Backend(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ParseError::Backend(format!("{}: {}", status, body)));
        }

        let reply: GenerateResponse = response
            .json()
            .map_err(|e| ParseError::MalformedReply(format!("Failed to decode response: {}", e)))?;
        tracing::debug!("Planner reply: {}", reply.response);
        plan_from_reply(&reply.response)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

impl std::fmt::Debug for HttpPlanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpPlanner")
            .field("url", &self.url)
            .field("model", &self.model)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreachable_service_is_backend_error() {
        let config = ParserConfig {
            // Port 9 (discard) on localhost is not an HTTP server
            endpoint: "http://127.0.0.1:9/".to_string(),
            timeout_ms: 500,
            ..ParserConfig::default()
        };
        let mut planner = HttpPlanner::new(&config).unwrap();
        assert_eq!(planner.url, "http://127.0.0.1:9/api/generate");
        assert!(matches!(
            planner.parse("bring me the ball"),
            Err(ParseError::Backend(_))
        ));
    }
}
