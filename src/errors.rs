//! Fatal invariant-violation errors (§7 "Invariant violations... These
//! raise distinct error kinds and are never caught inside the engine").

use crate::ids::{PlayerId, TransactionId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    NegativeResource { player: PlayerId, resource: &'static str },
    CommodityOverCeiling { player: PlayerId, value: u32, ceiling: u32 },
    DuplicateTransactionId { id: TransactionId },
    OrphanedUnitReference,
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvariantViolation::NegativeResource { player, resource } => {
                write!(f, "player {:?} has negative {}", player, resource)
            }
            InvariantViolation::CommodityOverCeiling { player, value, ceiling } => {
                write!(f, "player {:?} has {} commodities, ceiling is {}", player, value, ceiling)
            }
            InvariantViolation::DuplicateTransactionId { id } => {
                write!(f, "duplicate transaction id {:?}", id)
            }
            InvariantViolation::OrphanedUnitReference => {
                write!(f, "a unit reference points to a unit that no longer exists")
            }
        }
    }
}

impl std::error::Error for InvariantViolation {}

/// Engine-level errors not tied to a specific subsystem (§5 re-entrancy
/// guard).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    Reentrant,
    Invariant(InvariantViolation),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::Reentrant => write!(f, "observer attempted to re-enter the engine during notification"),
            EngineError::Invariant(v) => write!(f, "{}", v),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<InvariantViolation> for EngineError {
    fn from(v: InvariantViolation) -> Self {
        EngineError::Invariant(v)
    }
}
