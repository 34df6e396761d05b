//! Leveled-log adapter over the audit pipeline.
//!
//! Provisioning code logs through [`AuditLogger`] exactly as it would
//! through any leveled logger; the adapter reclassifies each call into
//! audit traffic. It is a standalone type composing the message filter,
//! line formatter and forwarder; nothing is reached through a global. The
//! forwarder handle is injected at construction and fixes the audit stream
//! for the adapter's lifetime.

use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use super::filter::MessageFilter;
use super::format::format_line;
use super::forwarder::AuditForwarder;
use super::severity::Severity;
use crate::coordinator::{AuditId, EventCategory};

/// Logger facade bound to one audit stream.
///
/// Routing by severity:
/// - `Debug` stays in the local operational log and is never forwarded.
/// - `Info`, `Warn`, `Unknown` are forwarded as batchable output.
/// - `Error` is forwarded as error content, never batched.
/// - `Fatal` is forwarded as error content tagged with the error category.
pub struct AuditLogger {
    forwarder: Arc<AuditForwarder>,
    filter: MessageFilter,
    level: Severity,
    default_tag: Option<String>,
}

impl AuditLogger {
    /// Create an adapter over `forwarder` with the baseline message filter
    /// and a minimum level of `Info`.
    pub fn new(forwarder: Arc<AuditForwarder>) -> Self {
        Self {
            forwarder,
            filter: MessageFilter::baseline(),
            level: Severity::Info,
            default_tag: None,
        }
    }

    /// Replace the message filter.
    pub fn with_filter(mut self, filter: MessageFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Set the tag used when a call supplies neither message nor tag.
    pub fn with_default_tag(mut self, tag: impl Into<String>) -> Self {
        self.default_tag = Some(tag.into());
        self
    }

    /// Minimum severity that will be processed, as its symbolic tag.
    pub fn level(&self) -> Severity {
        self.level
    }

    /// Change the minimum severity.
    pub fn set_level(&mut self, level: Severity) {
        self.level = level;
    }

    /// The audit stream this adapter feeds.
    pub fn audit_id(&self) -> &AuditId {
        self.forwarder.audit_id()
    }

    /// The underlying forwarder, for callers that need direct audit access
    /// (sections, raw appends, guarded-operation error routing).
    pub fn forwarder(&self) -> &Arc<AuditForwarder> {
        &self.forwarder
    }

    /// Log one message.
    ///
    /// The message text is the explicit `message` if given, else `tag`
    /// (with the adapter's default tag standing in as the emitted tag),
    /// else the default tag itself. Always returns `true`: a log call never
    /// fails its caller.
    pub fn add(&self, severity: Severity, message: Option<&str>, tag: Option<&str>) -> bool {
        if severity < self.level {
            return true;
        }
        let message = message
            .or(tag)
            .or(self.default_tag.as_deref())
            .unwrap_or_default();
        self.dispatch(severity, message)
    }

    /// Like [`AuditLogger::add`], building the message lazily. The closure
    /// is not invoked when `severity` is below the minimum level.
    pub fn add_with<F>(&self, severity: Severity, _tag: Option<&str>, message: F) -> bool
    where
        F: FnOnce() -> String,
    {
        if severity < self.level {
            return true;
        }
        self.dispatch(severity, &message())
    }

    /// Forward `text` verbatim as output content: no level check, no
    /// filtering, no formatting. Subject to the normal batching policy.
    pub fn append_raw(&self, text: &str) {
        self.forwarder.append_output(text);
    }

    /// Open a new audit section before running a script.
    pub fn open_section(&self, title: &str, category: Option<EventCategory>) {
        self.forwarder.append_section(title, category);
    }

    /// Log at `Debug`.
    pub fn debug(&self, message: &str) -> bool {
        self.add(Severity::Debug, Some(message), None)
    }

    /// Log at `Info`.
    pub fn info(&self, message: &str) -> bool {
        self.add(Severity::Info, Some(message), None)
    }

    /// Log at `Warn`.
    pub fn warn(&self, message: &str) -> bool {
        self.add(Severity::Warn, Some(message), None)
    }

    /// Log at `Error`.
    pub fn error(&self, message: &str) -> bool {
        self.add(Severity::Error, Some(message), None)
    }

    /// Log at `Fatal`.
    pub fn fatal(&self, message: &str) -> bool {
        self.add(Severity::Fatal, Some(message), None)
    }

    fn dispatch(&self, severity: Severity, message: &str) -> bool {
        if self.filter.is_filtered(severity, message) {
            return true;
        }
        let line = format_line(severity, Utc::now(), message);
        match severity {
            Severity::Debug => debug!("{message}"),
            Severity::Info | Severity::Warn | Severity::Unknown => {
                self.forwarder.append_output(&line);
            }
            Severity::Error => self.forwarder.append_error(&line, None),
            Severity::Fatal => self
                .forwarder
                .append_error(&line, Some(EventCategory::Error)),
        }
        true
    }
}
