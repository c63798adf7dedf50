//! Caller-side view of an install run.

use tokio::sync::{broadcast, watch};

use super::events::{InstallEvent, Outcome, Subscription};
use super::state::Stage;
use crate::control::CancelToken;
use crate::error::{ErrorKind, InstallFailure};
use crate::request::InstallKey;

/// Awaitable handle to one install run. Every handle for the same key
/// observes the same run, stages and outcome.
pub struct InstallHandle {
    key: InstallKey,
    attached: bool,
    cancel: CancelToken,
    stage: watch::Receiver<Stage>,
    outcome: watch::Receiver<Option<Outcome>>,
    /// Subscribed when the handle was created, so the first `events()` call
    /// sees every event published since then.
    first_events: Option<broadcast::Receiver<InstallEvent>>,
    spare_events: broadcast::Receiver<InstallEvent>,
}

impl InstallHandle {
    pub(crate) fn new(key: InstallKey, attached: bool, cancel: CancelToken, sub: &Subscription) -> Self {
        Self {
            key,
            attached,
            cancel,
            stage: sub.stage.clone(),
            outcome: sub.outcome.clone(),
            first_events: Some(sub.events.subscribe()),
            spare_events: sub.events.subscribe(),
        }
    }

    pub fn key(&self) -> &InstallKey {
        &self.key
    }

    /// True if this call joined a run that was already in flight.
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Request cancellation. Affects every handle attached to the run and has
    /// no effect once Registering has begun.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Token shared with the run, for cancelling from another task.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn stage(&self) -> Stage {
        *self.stage.borrow()
    }

    /// Event stream of the run. The first call replays from handle creation;
    /// later calls start from the current position. The stream closes after
    /// the terminal event.
    pub fn events(&mut self) -> broadcast::Receiver<InstallEvent> {
        match self.first_events.take() {
            Some(rx) => rx,
            None => self.spare_events.resubscribe(),
        }
    }

    /// Outcome of the run, once it reaches a terminal stage.
    pub async fn wait(mut self) -> Result<crate::voice_db::VoiceRecord, InstallFailure> {
        let res = self
            .outcome
            .wait_for(Option::is_some)
            .await
            .map(|v| v.clone());
        match res {
            Ok(Some(outcome)) => outcome,
            _ => Err(InstallFailure::new(
                ErrorKind::Io,
                format!("install of {} ended without an outcome", self.key),
            )),
        }
    }
}
