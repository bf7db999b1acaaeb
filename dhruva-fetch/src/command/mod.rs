//! Natural-language command parsing.
//!
//! A raw operator sentence becomes a [`TaskPlan`] through a [`CommandParser`]:
//! - [`RuleBasedParser`]: keyword extraction, no network
//! - [`HttpPlanner`]: asks a text-generation service for a JSON plan
//!   (feature `remote`)
//! - [`FallbackParser`]: tries one parser, falls back to another

mod fallback;
#[cfg(feature = "remote")]
mod remote;
mod reply;
mod rules;

use std::fmt;

use serde::Deserialize;
use thiserror::Error;

pub use fallback::FallbackParser;
#[cfg(feature = "remote")]
pub use remote::HttpPlanner;
pub use reply::plan_from_reply;
pub use rules::RuleBasedParser;

/// What the robot should do with the object
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskAction {
    /// Pick the object up and bring it back
    Fetch,
    /// Locate the object and report where it is
    Find,
}

impl fmt::Display for TaskAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskAction::Fetch => write!(f, "fetch"),
            TaskAction::Find => write!(f, "find"),
        }
    }
}

/// Parsed mission request
#[derive(Clone, Debug, PartialEq)]
pub struct TaskPlan {
    pub action: TaskAction,
    /// Short description handed to the detector, e.g. "red ball"
    pub object_description: String,
    pub object_color: Option<String>,
    /// Object category, e.g. "ball"
    pub object_type: String,
}

impl TaskPlan {
    pub fn new(
        action: TaskAction,
        object_type: impl Into<String>,
        object_color: Option<String>,
    ) -> Self {
        let object_type = object_type.into();
        let object_description = match &object_color {
            Some(color) => format!("{color} {object_type}"),
            None => object_type.clone(),
        };
        Self {
            action,
            object_description,
            object_color,
            object_type,
        }
    }
}

impl fmt::Display for TaskPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} the {}", self.action, self.object_description)
    }
}

/// Why a command could not be turned into a plan
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("empty command")]
    Empty,

    #[error("no known object in \"{0}\"")]
    UnrecognisedObject(String),

    #[error("unsupported action \"{0}\"")]
    UnsupportedAction(String),

    #[error("malformed planner reply: {0}")]
    MalformedReply(String),

    #[error("planner backend failed: {0}")]
    Backend(String),
}

/// Turns operator text into a plan
pub trait CommandParser: Send {
    fn parse(&mut self, raw: &str) -> Result<TaskPlan, ParseError>;

    /// Short name for logs
    fn name(&self) -> &'static str;
}

/// Which parser the controller uses
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ParserBackend {
    /// Keyword extraction only
    #[default]
    Rules,
    /// Planning service first, keyword extraction when it fails
    Remote,
}

/// Command parser settings
#[derive(Clone, Debug, Deserialize)]
pub struct ParserConfig {
    #[serde(default)]
    pub backend: ParserBackend,

    /// Planning service base URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model name sent with each request
    #[serde(default = "default_model")]
    pub model: String,

    /// Request timeout in milliseconds
    #[serde(default = "default_parser_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            backend: ParserBackend::default(),
            endpoint: default_endpoint(),
            model: default_model(),
            timeout_ms: default_parser_timeout_ms(),
        }
    }
}

fn default_endpoint() -> String {
    "http://127.0.0.1:11434".to_string()
}
fn default_model() -> String {
    "llama3".to_string()
}
fn default_parser_timeout_ms() -> u64 {
    10_000
}

/// Build the configured parser
pub fn create_parser(config: &ParserConfig) -> crate::error::Result<Box<dyn CommandParser>> {
    match config.backend {
        ParserBackend::Rules => Ok(Box::new(RuleBasedParser::new())),
        #[cfg(feature = "remote")]
        ParserBackend::Remote => Ok(Box::new(FallbackParser::new(
            HttpPlanner::new(config)?,
            RuleBasedParser::new(),
        ))),
        #[cfg(not(feature = "remote"))]
        ParserBackend::Remote => Err(crate::error::FetchError::InvalidConfiguration(
            "parser.backend = \"remote\" needs the `remote` feature".to_string(),
        )),
    }
}
