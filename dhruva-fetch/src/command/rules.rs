//! Keyword-based command parsing.

use super::{CommandParser, ParseError, TaskAction, TaskPlan};

const COLORS: &[&str] = &[
    "red", "blue", "green", "yellow", "orange", "purple", "black", "white", "brown", "pink",
];

const OBJECTS: &[&str] = &[
    "phone",
    "book",
    "pen",
    "pencil",
    "cup",
    "bottle",
    "box",
    "ball",
    "tool",
    "hammer",
    "screwdriver",
    "wrench",
    "notebook",
    "marker",
    "eraser",
];

/// Words that name a known object under another name
const SYNONYMS: &[(&str, &str)] = &[
    ("cellphone", "phone"),
    ("mobile", "phone"),
    ("mug", "cup"),
    ("toolbox", "box"),
    ("carton", "box"),
];

/// Words that turn a request into a search-only task
const FIND_WORDS: &[&str] = &["find", "locate", "where"];

/// Words that always mean the object must come back
const FETCH_WORDS: &[&str] = &["bring", "fetch", "get", "grab", "retrieve"];

/// Extracts color, object and action from keywords.
///
/// Matching is per word (case-insensitive, trailing plural `s` ignored), so
/// "open" never matches "pen". The first known color and object win.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedParser;

impl RuleBasedParser {
    pub fn new() -> Self {
        Self
    }

    fn words(raw: &str) -> Vec<String> {
        raw.split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(str::to_lowercase)
            .collect()
    }

    fn object_of(word: &str) -> Option<&'static str> {
        let singular = word.strip_suffix('s').unwrap_or(word);
        for candidate in [word, singular] {
            if let Some(object) = OBJECTS.iter().copied().find(|o| *o == candidate) {
                return Some(object);
            }
            if let Some((_, object)) = SYNONYMS
                .iter()
                .copied()
                .find(|(alias, _)| *alias == candidate)
            {
                return Some(object);
            }
        }
        None
    }
}

impl CommandParser for RuleBasedParser {
    fn parse(&mut self, raw: &str) -> Result<TaskPlan, ParseError> {
        let words = Self::words(raw);
        if words.is_empty() {
            return Err(ParseError::Empty);
        }

        let color = words
            .iter()
            .find(|w| COLORS.contains(&w.as_str()))
            .cloned();
        let object = words
            .iter()
            .find_map(|w| Self::object_of(w))
            .ok_or_else(|| ParseError::UnrecognisedObject(raw.trim().to_string()))?;

        let has = |set: &[&str]| words.iter().any(|w| set.contains(&w.as_str()));
        let action = if has(FIND_WORDS) && !has(FETCH_WORDS) {
            TaskAction::Find
        } else {
            TaskAction::Fetch
        };

        let plan = TaskPlan::new(action, object, color);
        tracing::debug!("Rule parser: {:?} -> {}", raw, plan);
        Ok(plan)
    }

    fn name(&self) -> &'static str {
        "rules"
    }
}
