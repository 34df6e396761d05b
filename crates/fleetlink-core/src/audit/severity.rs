//! Severity model for audited log calls.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Severity of an audited message.
///
/// The declaration order gives the numeric ordering used for minimum-level
/// comparison: `Debug < Info < Warn < Error < Fatal < Unknown`. `Unknown`
/// deliberately sorts above everything so unclassified messages survive any
/// configured minimum short of `Unknown` itself. Routing never relies on
/// this ordering: the adapter dispatches each severity by explicit match,
/// and `Unknown` travels with `Info`/`Warn` on the output stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
    Unknown,
}

impl Severity {
    /// Symbolic tag, the only representation exposed outside this crate.
    pub fn tag(&self) -> &'static str {
        match self {
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warn => "warn",
            Severity::Error => "error",
            Severity::Fatal => "fatal",
            Severity::Unknown => "unknown",
        }
    }

    /// Single leading character used by the audit line formatter.
    pub fn initial(&self) -> char {
        match self {
            Severity::Debug => 'D',
            Severity::Info => 'I',
            Severity::Warn => 'W',
            Severity::Error => 'E',
            Severity::Fatal => 'F',
            Severity::Unknown => 'U',
        }
    }

    /// Parse a symbolic tag back into a severity.
    pub fn from_tag(tag: &str) -> Option<Severity> {
        match tag {
            "debug" => Some(Severity::Debug),
            "info" => Some(Severity::Info),
            "warn" => Some(Severity::Warn),
            "error" => Some(Severity::Error),
            "fatal" => Some(Severity::Fatal),
            "unknown" => Some(Severity::Unknown),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_matches_declaration() {
        assert!(Severity::Debug < Severity::Info);
        assert!(Severity::Info < Severity::Warn);
        assert!(Severity::Warn < Severity::Error);
        assert!(Severity::Error < Severity::Fatal);
        assert!(Severity::Fatal < Severity::Unknown);
    }

    #[test]
    fn unknown_passes_any_minimum_below_itself() {
        for min in [Severity::Debug, Severity::Info, Severity::Warn, Severity::Error] {
            assert!(Severity::Unknown >= min);
        }
    }

    #[test]
    fn tags_round_trip() {
        for severity in [
            Severity::Debug,
            Severity::Info,
            Severity::Warn,
            Severity::Error,
            Severity::Fatal,
            Severity::Unknown,
        ] {
            assert_eq!(Severity::from_tag(severity.tag()), Some(severity));
        }
        assert_eq!(Severity::from_tag("verbose"), None);
    }

    #[test]
    fn initials() {
        assert_eq!(Severity::Error.initial(), 'E');
        assert_eq!(Severity::Warn.initial(), 'W');
        assert_eq!(Severity::Unknown.initial(), 'U');
    }
}
