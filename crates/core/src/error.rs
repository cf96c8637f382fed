//! Error type for the reactor core.

use crate::core_types::{ChamberId, RodClass};
use thiserror::Error;

/// Errors surfaced by the simulation API.
///
/// `InvalidReference` and `InvalidConfig` leave the simulation untouched.
/// `InvariantViolation` is fatal: the tick that produced it has been
/// applied and the state can no longer be trusted, so drivers should stop.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReactorError {
    /// A rod index outside the rod class.
    #[error("{class} rod {index} does not exist ({count} rods in class)")]
    UnknownRod {
        class: RodClass,
        index: usize,
        count: usize,
    },

    /// A chamber id outside the grid.
    #[error("chamber {id} does not exist ({count} chambers)")]
    UnknownChamber { id: ChamberId, count: usize },

    /// A layout or run parameter that cannot produce a valid reactor.
    #[error("invalid config: {field}: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    /// A non-finite value was found after a tick.
    #[error("invariant violated at tick {tick}: {what}")]
    InvariantViolation { tick: u64, what: String },
}

impl ReactorError {
    /// True for the errors that refer to a rod or chamber that does not exist.
    pub fn is_invalid_reference(&self) -> bool {
        matches!(self, Self::UnknownRod { .. } | Self::UnknownChamber { .. })
    }

    pub(crate) fn invalid_config(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = ReactorError> = std::result::Result<T, E>;
