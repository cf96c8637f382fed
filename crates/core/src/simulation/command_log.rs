//! Rod command history for deterministic replay.
//!
//! The physics step is deterministic for a given seed, so a run is fully
//! described by its configuration plus the rod commands issued between
//! ticks. Every accepted command is stamped with the tick it preceded and
//! kept in a bounded history; replaying the list against a fresh simulation
//! built from the same configuration reproduces the run.

use crate::core_types::{RodAction, RodClass, RodTarget};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// A rod command as it was accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RodCommand {
    /// Ticks completed when the command was issued
    pub tick: u64,
    pub class: RodClass,
    pub target: RodTarget,
    pub action: RodAction,
}

impl RodCommand {
    pub fn new(tick: u64, class: RodClass, target: RodTarget, action: RodAction) -> Self {
        Self {
            tick,
            class,
            target,
            action,
        }
    }
}

/// Bounded command history. Oldest entries are dropped first.
#[derive(Debug, Clone)]
pub(crate) struct CommandLog {
    history: VecDeque<RodCommand>,
    max_history: usize,
    dropped: usize,
}

impl CommandLog {
    pub(crate) fn new(max_history: usize) -> Self {
        Self {
            history: VecDeque::with_capacity(max_history.min(1024)),
            max_history,
            dropped: 0,
        }
    }

    pub(crate) fn record(&mut self, command: RodCommand) {
        if self.max_history == 0 {
            self.dropped += 1;
            return;
        }
        if self.history.len() == self.max_history {
            self.history.pop_front();
            self.dropped += 1;
        }
        self.history.push_back(command);
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &RodCommand> + '_ {
        self.history.iter()
    }

    pub(crate) fn len(&self) -> usize {
        self.history.len()
    }

    /// Commands lost to the history bound. A history with drops no longer
    /// replays the run from the start.
    pub(crate) fn dropped(&self) -> usize {
        self.dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(tick: u64) -> RodCommand {
        RodCommand::new(tick, RodClass::Control, RodTarget::All, RodAction::Retract)
    }

    #[test]
    fn test_history_trimming() {
        let mut log = CommandLog::new(5);

        // Add 7 commands to test history trimming
        for tick in 0..7 {
            log.record(command(tick));
        }

        assert_eq!(log.len(), 5);
        assert_eq!(log.dropped(), 2);
        // Oldest commands should be removed
        assert_eq!(log.iter().next().map(|c| c.tick), Some(2));
    }

    #[test]
    fn test_zero_limit_keeps_nothing() {
        let mut log = CommandLog::new(0);
        log.record(command(1));
        assert_eq!(log.len(), 0);
        assert_eq!(log.dropped(), 1);
    }
}
