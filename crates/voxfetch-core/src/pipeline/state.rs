//! Install run state machine.

use std::fmt;

use crate::error::ErrorKind;

/// Stage of one install run. Stages only move forward one step at a time;
/// `Failed` is reachable from any non-terminal stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Resolving,
    Fetching,
    Verifying,
    Installing,
    Registering,
    Done,
    Failed(ErrorKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid stage transition {from} -> {to}")]
pub struct InvalidTransition {
    pub from: Stage,
    pub to: Stage,
}

impl Stage {
    fn ordinal(&self) -> Option<u8> {
        match self {
            Stage::Idle => Some(0),
            Stage::Resolving => Some(1),
            Stage::Fetching => Some(2),
            Stage::Verifying => Some(3),
            Stage::Installing => Some(4),
            Stage::Registering => Some(5),
            Stage::Done => Some(6),
            Stage::Failed(_) => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Done | Stage::Failed(_))
    }

    pub fn can_advance_to(&self, next: Stage) -> bool {
        if self.is_terminal() {
            return false;
        }
        match (self.ordinal(), next.ordinal()) {
            (_, None) => true,
            (Some(cur), Some(n)) => n == cur + 1,
            (None, _) => false,
        }
    }

    /// Move to `next`, rejecting skipped or reordered stages.
    pub fn advance(&mut self, next: Stage) -> Result<(), InvalidTransition> {
        if !self.can_advance_to(next) {
            return Err(InvalidTransition {
                from: *self,
                to: next,
            });
        }
        *self = next;
        Ok(())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Idle => "idle",
            Stage::Resolving => "resolving",
            Stage::Fetching => "fetching",
            Stage::Verifying => "verifying",
            Stage::Installing => "installing",
            Stage::Registering => "registering",
            Stage::Done => "done",
            Stage::Failed(_) => "failed",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Failed(kind) => write!(f, "failed({})", kind),
            other => f.write_str(other.as_str()),
        }
    }
}
