//! Single-writer recorder task
//!
//! ```text
//! observer ─┐
//! observer ─┼─▶ UnboundedChannel ─▶ recorder task (owns Coverage)
//! observer ─┘
//! ```
//!
//! Observers hold cheap [`ObservationSender`] clones. The task applies calls
//! in arrival order and hands the model back from [`HitRecorder::finish`]
//! once every sender is gone.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::RecordOutcome;
use crate::coverage::Coverage;
use crate::errors::{Error, Result};
use crate::observations::ObservedCall;

/// What the recorder task hands back when it stops.
#[derive(Debug, Clone)]
pub struct RecordingSummary {
    pub coverage: Coverage,
    pub matched: u64,
    pub unmatched: u64,
}

impl RecordingSummary {
    pub fn new(coverage: Coverage) -> Self {
        Self { coverage, matched: 0, unmatched: 0 }
    }

    /// Apply one call and update the match counters.
    pub fn apply(&mut self, call: &ObservedCall) -> RecordOutcome {
        let outcome = self.coverage.record_call(call);
        if outcome.is_matched() {
            self.matched += 1;
        } else {
            self.unmatched += 1;
        }
        outcome
    }

    /// Apply a batch of calls in order.
    pub fn apply_all<'a, I>(&mut self, calls: I)
    where
        I: IntoIterator<Item = &'a ObservedCall>,
    {
        for call in calls {
            self.apply(call);
        }
    }
}

/// Handle for pushing observed calls into a running recorder.
#[derive(Debug, Clone)]
pub struct ObservationSender {
    tx: mpsc::UnboundedSender<ObservedCall>,
}

impl ObservationSender {
    pub fn send(&self, call: ObservedCall) -> Result<()> {
        self.tx.send(call).map_err(|_| Error::recorder("Recorder task is no longer running"))
    }
}

/// Owner of the recorder task.
pub struct HitRecorder {
    sender: ObservationSender,
    task: JoinHandle<RecordingSummary>,
}

impl HitRecorder {
    /// Move `coverage` into a new recorder task. Must be called from within a
    /// tokio runtime.
    pub fn spawn(coverage: Coverage) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<ObservedCall>();

        let task = tokio::spawn(async move {
            let mut summary = RecordingSummary::new(coverage);
            while let Some(call) = rx.recv().await {
                if let RecordOutcome::Matched { undeclared_query, .. } = summary.apply(&call) {
                    if undeclared_query > 0 {
                        debug!(
                            method = %call.method,
                            path = %call.path,
                            undeclared = undeclared_query,
                            "Observed query parameters missing from the contract"
                        );
                    }
                }
            }
            info!(matched = summary.matched, unmatched = summary.unmatched, "Recorder drained");
            summary
        });

        Self { sender: ObservationSender { tx }, task }
    }

    /// A new sender for an observer.
    pub fn sender(&self) -> ObservationSender {
        self.sender.clone()
    }

    pub fn record(&self, call: ObservedCall) -> Result<()> {
        self.sender.send(call)
    }

    /// Close this handle's sender and wait for the task to drain. Resolves
    /// once every other [`ObservationSender`] has been dropped too.
    pub async fn finish(self) -> Result<RecordingSummary> {
        let HitRecorder { sender, task } = self;
        drop(sender);
        task.await.map_err(|err| Error::recorder(format!("Recorder task failed: {}", err)))
    }
}
