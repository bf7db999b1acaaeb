//! Plan extraction from a planning-service reply.

use serde::Deserialize;

use super::{ParseError, TaskAction, TaskPlan};

/// Placeholder the service uses for fields it could not fill
const UNKNOWN: &str = "unknown";

#[derive(Debug, Deserialize)]
struct RawPlan {
    action: Option<String>,
    object_description: Option<String>,
    object_color: Option<String>,
    object_type: Option<String>,
}

/// Extract a plan from free-form service text.
///
/// Tolerates markdown code fences and prose around the JSON object: the text
/// between the first `{` and the last `}` is decoded. Missing fields count as
/// `"unknown"`; an unknown color becomes `None`, and an unknown type is taken
/// from the last word of the description.
pub fn plan_from_reply(reply: &str) -> Result<TaskPlan, ParseError> {
    let cleaned = reply.replace("```json", "").replace("```", "");
    let body = match (cleaned.find('{'), cleaned.rfind('}')) {
        (Some(start), Some(end)) if end > start => &cleaned[start..=end],
        _ => {
            return Err(ParseError::MalformedReply(format!(
                "no JSON object in {:?}",
                reply.trim()
            )));
        }
    };
    let raw: RawPlan =
        serde_json::from_str(body).map_err(|e| ParseError::MalformedReply(e.to_string()))?;

    let action = known(raw.action).unwrap_or_else(|| UNKNOWN.to_string());
    let action = match action.to_lowercase().as_str() {
        "fetch" => TaskAction::Fetch,
        "find" => TaskAction::Find,
        _ => return Err(ParseError::UnsupportedAction(action)),
    };

    let color = known(raw.object_color).map(|c| c.to_lowercase());
    let description = known(raw.object_description);
    let object_type = known(raw.object_type)
        .or_else(|| {
            description
                .as_deref()
                .and_then(|d| d.split_whitespace().last())
                .map(str::to_string)
        })
        .ok_or_else(|| ParseError::UnrecognisedObject(body.to_string()))?
        .to_lowercase();

    let mut plan = TaskPlan::new(action, object_type, color);
    if let Some(description) = description {
        plan.object_description = description;
    }
    Ok(plan)
}

/// Trimmed value, or `None` when empty or "unknown"
fn known(field: Option<String>) -> Option<String> {
    field
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case(UNKNOWN))
}
