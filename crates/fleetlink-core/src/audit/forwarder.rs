//! Batching audit forwarder.
//!
//! The forwarder owns one audit stream: it coalesces bursts of output into
//! fewer coordinator pushes, delivers errors/status/sections immediately,
//! and mirrors every push to the local operational log so operators see
//! audit activity even when the coordinator is slow or unreachable.
//!
//! Delivery runs on a single dispatcher task draining an in-order queue, so
//! everything enqueued for one audit stream reaches the coordinator in
//! enqueue order. There is no retry: a failed push is logged at warn and
//! dropped.
//!
//! A batch scheduled for flushing fires once its delay elapses even if the
//! forwarder has been dropped by then; output still buffered at process
//! termination is lost unless [`AuditForwarder::flush`] was called first.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::coordinator::{AuditId, AuditPush, ContentKind, Coordinator, EventCategory};

/// Maximum time appended output may sit in the pending batch before it is
/// flushed to the coordinator. Output appended faster than this is merged
/// into a single push.
pub const MAX_AUDIT_DELAY: Duration = Duration::from_secs(2);

/// Width of the frame around a section banner in the operational log.
const BANNER_WIDTH: usize = 80;

/// Marker prefixing agent-originated status lines in the operational log.
const STATUS_MARKER: &str = "*>";

/// Output accumulated since the last flush. At most one exists per
/// forwarder; `epoch` ties the scheduled timer flush to this batch so a
/// batch that was force-flushed early is not flushed twice.
struct PendingBatch {
    text: String,
    epoch: u64,
}

struct BatchSlot {
    pending: Option<PendingBatch>,
    next_epoch: u64,
}

/// Forwards audit content for one audit stream to the coordinator.
///
/// All public methods are synchronous enqueue operations; callers treat
/// them like log calls. Must be constructed inside a tokio runtime (the
/// dispatcher and batch timers are spawned tasks).
pub struct AuditForwarder {
    audit_id: AuditId,
    max_delay: Duration,
    slot: Arc<Mutex<BatchSlot>>,
    tx: mpsc::UnboundedSender<AuditPush>,
}

impl AuditForwarder {
    /// Create a forwarder delivering to `coordinator` with the default
    /// coalescing window.
    pub fn new(audit_id: AuditId, coordinator: Arc<dyn Coordinator>) -> Self {
        Self::with_max_delay(audit_id, coordinator, MAX_AUDIT_DELAY)
    }

    /// Like [`AuditForwarder::new`] with an explicit coalescing window.
    pub fn with_max_delay(
        audit_id: AuditId,
        coordinator: Arc<dyn Coordinator>,
        max_delay: Duration,
    ) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<AuditPush>();
        {
            let audit_id = audit_id.clone();
            tokio::spawn(async move {
                while let Some(push) = rx.recv().await {
                    if let Err(e) = coordinator.push_audit(push).await {
                        warn!(error = %e, audit_id = %audit_id, "audit push failed");
                    }
                }
            });
        }
        Self {
            audit_id,
            max_delay,
            slot: Arc::new(Mutex::new(BatchSlot {
                pending: None,
                next_epoch: 0,
            })),
            tx,
        }
    }

    /// The audit stream this forwarder delivers to.
    pub fn audit_id(&self) -> &AuditId {
        &self.audit_id
    }

    /// Append output content.
    ///
    /// Opens the pending batch if none is open and schedules its flush for
    /// `max_delay` after this first buffering; otherwise extends the open
    /// batch. Bursts of output spaced closer than the window become one
    /// coordinator push.
    pub fn append_output(&self, text: &str) {
        let opened_epoch = {
            let mut slot = self.slot.lock().unwrap();
            match slot.pending.as_mut() {
                Some(batch) => {
                    batch.text.push_str(text);
                    None
                }
                None => {
                    let epoch = slot.next_epoch;
                    slot.next_epoch += 1;
                    slot.pending = Some(PendingBatch {
                        text: text.to_string(),
                        epoch,
                    });
                    Some(epoch)
                }
            }
        };

        if let Some(epoch) = opened_epoch {
            let slot = Arc::clone(&self.slot);
            let tx = self.tx.clone();
            let audit_id = self.audit_id.clone();
            let delay = self.max_delay;
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                // Take and enqueue under the lock so a concurrent immediate
                // push cannot slip in between.
                let mut slot = slot.lock().unwrap();
                if slot.pending.as_ref().map(|b| b.epoch) == Some(epoch) {
                    let batch = slot.pending.take().unwrap();
                    enqueue(&tx, &audit_id, ContentKind::Output, batch.text, None);
                }
            });
        }
    }

    /// Append an error line; any pending output is flushed first, the error
    /// itself is never delayed.
    pub fn append_error(&self, text: &str, category: Option<EventCategory>) {
        self.flush();
        enqueue(
            &self.tx,
            &self.audit_id,
            ContentKind::Error,
            text.to_string(),
            category,
        );
    }

    /// Replace the audit's current status; flushes pending output first.
    pub fn update_status(&self, text: &str) {
        self.flush();
        enqueue(
            &self.tx,
            &self.audit_id,
            ContentKind::Status,
            text.to_string(),
            None,
        );
    }

    /// Append an informational note; flushes pending output first.
    pub fn append_info(&self, text: &str) {
        self.flush();
        enqueue(
            &self.tx,
            &self.audit_id,
            ContentKind::Info,
            text.to_string(),
            None,
        );
    }

    /// Open a new audit section; flushes pending output first so the
    /// boundary lands after everything appended before it.
    pub fn append_section(&self, title: &str, category: Option<EventCategory>) {
        self.flush();
        enqueue(
            &self.tx,
            &self.audit_id,
            ContentKind::Section,
            title.to_string(),
            category,
        );
    }

    /// Force the pending output batch (if any) out as one push.
    ///
    /// Call this before a graceful shutdown; output still buffered when the
    /// process is killed is lost.
    pub fn flush(&self) {
        let mut slot = self.slot.lock().unwrap();
        if let Some(batch) = slot.pending.take() {
            enqueue(&self.tx, &self.audit_id, ContentKind::Output, batch.text, None);
        }
    }
}

/// Mirror the push to the operational log, then queue it for delivery.
///
/// The mirror write is best-effort by construction (tracing never fails the
/// caller); a closed queue means the process is tearing down, in which case
/// the push is dropped with a warning.
fn enqueue(
    tx: &mpsc::UnboundedSender<AuditPush>,
    audit_id: &AuditId,
    kind: ContentKind,
    text: String,
    category: Option<EventCategory>,
) {
    match kind {
        ContentKind::Error => error!("{}", mirror_line(kind, &text)),
        _ => info!("{}", mirror_line(kind, &text)),
    }
    let push = AuditPush {
        audit_id: audit_id.clone(),
        kind,
        text,
        category,
    };
    if tx.send(push).is_err() {
        warn!(audit_id = %audit_id, "audit dispatcher gone; push dropped");
    }
}

/// The operational-log rendering of one push.
fn mirror_line(kind: ContentKind, text: &str) -> String {
    match kind {
        ContentKind::Output => format!("AUDIT {text}"),
        ContentKind::Error => format!("AUDIT *ERROR> {text}"),
        ContentKind::Status | ContentKind::Info => format!("AUDIT {STATUS_MARKER} {text}"),
        ContentKind::Section => {
            let frame = "*".repeat(BANNER_WIDTH);
            let width = BANNER_WIDTH - STATUS_MARKER.len() - 4;
            format!("AUDIT {frame}\n{STATUS_MARKER}{text:^width$}****")
        }
    }
}
