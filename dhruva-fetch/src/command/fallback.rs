//! Parser composition.

use super::{CommandParser, ParseError, TaskPlan};

/// Tries `primary`, then `fallback` when the primary fails.
///
/// An empty command is reported straight away. When both fail, the
/// fallback's error is returned since it describes the command itself.
pub struct FallbackParser<P, F> {
    primary: P,
    fallback: F,
}

impl<P: CommandParser, F: CommandParser> FallbackParser<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }
}

impl<P: CommandParser, F: CommandParser> CommandParser for FallbackParser<P, F> {
    fn parse(&mut self, raw: &str) -> Result<TaskPlan, ParseError> {
        if raw.trim().is_empty() {
            return Err(ParseError::Empty);
        }
        match self.primary.parse(raw) {
            Ok(plan) => Ok(plan),
            Err(e) => {
                tracing::warn!(
                    "{} parser failed ({}), falling back to {}",
                    self.primary.name(),
                    e,
                    self.fallback.name()
                );
                self.fallback.parse(raw)
            }
        }
    }

    fn name(&self) -> &'static str {
        "fallback"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{RuleBasedParser, TaskAction};

    /// Parser that always fails like an unreachable service
    struct Offline {
        calls: usize,
    }

    impl CommandParser for Offline {
        fn parse(&mut self, _raw: &str) -> Result<TaskPlan, ParseError> {
            self.calls += 1;
            Err(ParseError::Backend("connection refused".to_string()))
        }

        fn name(&self) -> &'static str {
            "offline"
        }
    }

    #[test]
    fn test_falls_back() {
        let mut parser = FallbackParser::new(Offline { calls: 0 }, RuleBasedParser::new());
        let plan = parser.parse("bring me the yellow cup").unwrap();
        assert_eq!(plan.action, TaskAction::Fetch);
        assert_eq!(plan.object_description, "yellow cup");
        assert_eq!(parser.primary.calls, 1);
    }

    #[test]
    fn test_both_fail_reports_fallback_error() {
        let mut parser = FallbackParser::new(Offline { calls: 0 }, RuleBasedParser::new());
        assert!(matches!(
            parser.parse("dance for me"),
            Err(ParseError::UnrecognisedObject(_))
        ));
        assert_eq!(parser.parse(""), Err(ParseError::Empty));
        assert_eq!(parser.primary.calls, 1);
    }
}
