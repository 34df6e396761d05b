//! Message filtering for known-noise audit entries.

use std::collections::HashMap;

use regex::Regex;

use super::severity::Severity;

/// Pattern table that drops known-noise messages before they are formatted
/// or forwarded.
///
/// A filtered message is suppressed in full: no local log line, no remote
/// push. The table is owned by each adapter instance rather than shared
/// through a global.
pub struct MessageFilter {
    rules: HashMap<Severity, Vec<Regex>>,
}

impl MessageFilter {
    /// A filter that suppresses nothing.
    pub fn empty() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    /// The baseline rule set.
    ///
    /// The recipe engine reports every failed script itself before the
    /// caller gets a chance to handle the failure, so its redundant error
    /// line is dropped from audits.
    pub fn baseline() -> Self {
        let recipe_noise = Regex::new(
            r" \(.+ line \d+\) had an error:\nUnexpected exit code from action\.",
        )
        .expect("baseline filter pattern is valid");
        Self::empty().with_rule(Severity::Error, recipe_noise)
    }

    /// Register an additional pattern for `severity`.
    pub fn with_rule(mut self, severity: Severity, pattern: Regex) -> Self {
        self.rules.entry(severity).or_default().push(pattern);
        self
    }

    /// Whether `message` at `severity` should be suppressed.
    pub fn is_filtered(&self, severity: Severity, message: &str) -> bool {
        match self.rules.get(&severity) {
            Some(patterns) => patterns.iter().any(|p| p.is_match(message)),
            None => false,
        }
    }
}

impl Default for MessageFilter {
    fn default() -> Self {
        Self::baseline()
    }
}
