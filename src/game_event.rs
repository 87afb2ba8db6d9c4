//! The append-only event log (§6 "Event log").

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

use crate::ids::{PlayerId, Sequence, SystemId, TransactionId};
use crate::types::{Phase, StrategyCard};

/// A logical timestamp: round + phase + turn number within the phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct LogicalClock {
    pub round: u32,
    pub phase: Phase,
    pub turn: u32,
}

/// A structured event payload (§6: "Each entry carries... a structured
/// payload").
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum LogPayload {
    TransactionCompleted { id: TransactionId, from: PlayerId, to: PlayerId },
    CombatResolved { system: SystemId, winner: Option<PlayerId> },
    PhaseAdvanced { from: Phase, to: Phase },
    LawEnacted { agenda_name: String, round: u32 },
    PlayerEliminated { player: PlayerId },
    StrategyCardSelected { player: PlayerId, card: StrategyCard },
    StrategyCardExhausted { player: PlayerId, card: StrategyCard },
    StrategyCardReadied { player: PlayerId, card: StrategyCard },
}

/// A single append-only log entry.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct LogEntry {
    pub sequence: Sequence,
    pub clock: LogicalClock,
    pub payload: LogPayload,
}

/// The append-only event log. New entries are always pushed to the back;
/// nothing is ever removed or reordered.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct EventLog {
    entries: Vec<LogEntry>,
}

impl EventLog {
    pub fn push(&mut self, clock: LogicalClock, payload: LogPayload) {
        self.entries.push(LogEntry {
            sequence: Sequence::next(),
            clock,
            payload,
        });
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }
}
