//! Events published while a run progresses.

use tokio::sync::{broadcast, watch};

use super::state::Stage;
use crate::error::InstallFailure;
use crate::voice_db::VoiceRecord;

/// Buffered events per run; slow subscribers lag and skip ahead.
pub(crate) const EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq)]
pub enum InstallEvent {
    Stage(Stage),
    Progress {
        bytes_written: u64,
        total_bytes: Option<u64>,
    },
    Succeeded(VoiceRecord),
    Failed(InstallFailure),
}

pub(crate) type Outcome = Result<VoiceRecord, InstallFailure>;

/// Write side of a run: stage, events and the final outcome.
pub(crate) struct Reporter {
    stage: watch::Sender<Stage>,
    events: broadcast::Sender<InstallEvent>,
    outcome: watch::Sender<Option<Outcome>>,
}

/// Read side, cloned into every handle attached to the run.
#[derive(Clone)]
pub(crate) struct Subscription {
    pub(crate) stage: watch::Receiver<Stage>,
    pub(crate) events: broadcast::Sender<InstallEvent>,
    pub(crate) outcome: watch::Receiver<Option<Outcome>>,
}

impl Reporter {
    pub(crate) fn new() -> (Self, Subscription) {
        let (stage_tx, stage_rx) = watch::channel(Stage::Idle);
        let (events_tx, _) = broadcast::channel(EVENT_CAPACITY);
        let (outcome_tx, outcome_rx) = watch::channel(None);
        let sub = Subscription {
            stage: stage_rx,
            events: events_tx.clone(),
            outcome: outcome_rx,
        };
        let reporter = Self {
            stage: stage_tx,
            events: events_tx,
            outcome: outcome_tx,
        };
        (reporter, sub)
    }

    pub(crate) fn stage(&self) -> Stage {
        *self.stage.borrow()
    }

    /// Advance the run stage and publish it. Invalid transitions are logged and ignored.
    pub(crate) fn advance(&self, next: Stage) {
        let mut cur = self.stage();
        if let Err(e) = cur.advance(next) {
            tracing::error!("{}", e);
            return;
        }
        self.stage.send_replace(cur);
        self.emit(InstallEvent::Stage(cur));
    }

    pub(crate) fn progress(&self, bytes_written: u64, total_bytes: Option<u64>) {
        self.emit(InstallEvent::Progress {
            bytes_written,
            total_bytes,
        });
    }

    fn emit(&self, ev: InstallEvent) {
        // No subscribers is fine.
        let _ = self.events.send(ev);
    }

    /// Publish the terminal stage, the matching event and the outcome.
    pub(crate) fn finish(&self, outcome: Outcome) {
        match &outcome {
            Ok(record) => {
                self.advance(Stage::Done);
                self.emit(InstallEvent::Succeeded(record.clone()));
            }
            Err(failure) => {
                self.advance(Stage::Failed(failure.kind));
                self.emit(InstallEvent::Failed(failure.clone()));
            }
        }
        self.outcome.send_replace(Some(outcome));
    }
}
