//! Failure containment for agent operations.
//!
//! A guarded operation runs a caller-supplied unit of work and never lets
//! its failure escape: the error is recorded in the runner's last-error
//! slot, logged locally, and optionally routed into the audit stream or an
//! out-of-band alert channel. The calling process keeps running no matter
//! what the work does.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, warn};

use crate::audit::forwarder::AuditForwarder;

/// Out-of-band channel for escalating operation failures (paging, mail).
#[async_trait]
pub trait AlertSink: Send + Sync {
    /// Deliver a failure notification. Best-effort; there is no return
    /// channel to the guarded operation.
    async fn notify(&self, description: &str, detail: &str);
}

/// Options for [`Guarded::query`].
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryOptions {
    /// Record the full error cause chain in the last-error slot instead of
    /// just the top-level message.
    pub include_chain_in_last_error: bool,
    /// Escalate the failure through the configured [`AlertSink`].
    pub alert_on_failure: bool,
}

/// Runner holding the last-error slot.
///
/// The slot is overwritten on every failure and untouched by success, so it
/// always reads as the most recent diagnostic.
#[derive(Default)]
pub struct Guarded {
    last_error: Option<String>,
    alerts: Option<Arc<dyn AlertSink>>,
}

impl Guarded {
    pub fn new() -> Self {
        Self::default()
    }

    /// A runner that escalates `query` failures through `alerts`.
    pub fn with_alerts(alerts: Arc<dyn AlertSink>) -> Self {
        Self {
            last_error: None,
            alerts: Some(alerts),
        }
    }

    /// The most recent failure diagnostic, if any operation has failed.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Run work that looks an object up.
    ///
    /// `Ok(None)` records `"Could not find <description>"` (warn-logged when
    /// `log_missing`); an error records
    /// `"Failed to retrieve <description>: <cause>"` and is always
    /// error-logged with its cause chain. Whenever the result is absent and
    /// a forwarder was supplied, the last error is appended to the audit as
    /// an error.
    pub async fn retrieve<T, F, Fut>(
        &mut self,
        description: &str,
        forwarder: Option<&AuditForwarder>,
        log_missing: bool,
        work: F,
    ) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<Option<T>>>,
    {
        let item = match work().await {
            Ok(Some(item)) => Some(item),
            Ok(None) => {
                let message = format!("Could not find {description}");
                if log_missing {
                    warn!("{message}");
                }
                self.last_error = Some(message);
                None
            }
            Err(e) => {
                let what = format!("Failed to retrieve {description}");
                error!(cause = ?e, "{what}");
                self.last_error = Some(format!("{what}: {e}"));
                None
            }
        };
        if item.is_none() {
            self.forward_last_error(forwarder);
        }
        item
    }

    /// Run work that creates an object, returning its result on success.
    pub async fn create<T, F, Fut>(
        &mut self,
        description: &str,
        forwarder: Option<&AuditForwarder>,
        work: F,
    ) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        match work().await {
            Ok(item) => Some(item),
            Err(e) => {
                let what = format!("Failed to create {description}");
                error!(cause = ?e, "{what}");
                self.last_error = Some(format!("{what}: {e}"));
                self.forward_last_error(forwarder);
                None
            }
        }
    }

    /// Run a resource query.
    ///
    /// The work is invoked exactly once; reconnect/retry policy belongs to
    /// the work itself. `description` is an action phrase ("query deployed
    /// packages"); failures record `"Failed to <description>: <cause>"`.
    pub async fn query<T, F, Fut>(
        &mut self,
        description: &str,
        forwarder: Option<&AuditForwarder>,
        options: QueryOptions,
        work: F,
    ) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        match work().await {
            Ok(item) => Some(item),
            Err(e) => {
                let what = format!("Failed to {description}");
                error!(cause = ?e, "{what}");
                self.last_error = Some(if options.include_chain_in_last_error {
                    format!("{what}: {e:#}")
                } else {
                    format!("{what}: {e}")
                });
                self.forward_last_error(forwarder);
                if options.alert_on_failure {
                    if let Some(alerts) = &self.alerts {
                        alerts.notify(&what, &format!("{e:#}")).await;
                    }
                }
                None
            }
        }
    }

    fn forward_last_error(&self, forwarder: Option<&AuditForwarder>) {
        if let (Some(forwarder), Some(message)) = (forwarder, self.last_error.as_ref()) {
            forwarder.append_error(message, None);
        }
    }
}
