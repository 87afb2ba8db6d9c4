//! Newtype identifiers used throughout the engine.
//!
//! Ids are small `Copy` integers rather than UUIDs: the engine is
//! single-process and single-game, so monotonic counters are sufficient and
//! keep `GameState` cheap to clone.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

static UNIT_ID_COUNTER: AtomicU64 = AtomicU64::new(1);
static TRANSACTION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);
static SEQUENCE_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Player identifier, index-based since player count never exceeds 8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct PlayerId(pub u8);

impl PlayerId {
    pub fn new(index: u8) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// System identifier. Systems are placed on the hex grid once at setup and
/// never removed, so a dense index is stable for the life of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct SystemId(pub u32);

/// Planet identifier, stable for the life of the game (planets are never
/// created or destroyed, only controlled/exhausted/attached-to).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct PlanetId(pub u32);

/// Unique unit instance identifier, monotonically increasing and never
/// reused. A unit that changes owner (capture) or is replaced keeps its
/// identity; only destruction and production retire/mint ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct UnitId(pub u64);

impl UnitId {
    pub fn new() -> Self {
        Self(UNIT_ID_COUNTER.fetch_add(1, Ordering::SeqCst))
    }
}

impl Default for UnitId {
    fn default() -> Self {
        Self::new()
    }
}

/// Component transaction identifier, unique across pending ∪ history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct TransactionId(pub u64);

impl TransactionId {
    pub fn new() -> Self {
        Self(TRANSACTION_ID_COUNTER.fetch_add(1, Ordering::SeqCst))
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self::new()
    }
}

/// Monotonically increasing sequence number for the event log (§6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Sequence(pub u64);

impl Sequence {
    pub fn next() -> Self {
        Self(SEQUENCE_COUNTER.fetch_add(1, Ordering::SeqCst))
    }
}

/// Identifies a single ability registration (source + name + binding),
/// used to detect duplicate `register` calls per §4.1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct AbilityId(pub u64);

static ABILITY_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

impl AbilityId {
    pub fn new() -> Self {
        Self(ABILITY_ID_COUNTER.fetch_add(1, Ordering::SeqCst))
    }
}

impl Default for AbilityId {
    fn default() -> Self {
        Self::new()
    }
}

/// Technology card identifier, referencing an entry in an external
/// `CardRegistry` (§6 "card data format").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct TechId(pub u32);

/// Promissory note identifier, referencing an entry in an external registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct NoteId(pub u32);

static NOTE_COUNTER: AtomicU32 = AtomicU32::new(1);

impl NoteId {
    pub fn new() -> Self {
        Self(NOTE_COUNTER.fetch_add(1, Ordering::SeqCst))
    }
}

impl Default for NoteId {
    fn default() -> Self {
        Self::new()
    }
}

/// Agenda card identifier, referencing an entry in an external registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct AgendaId(pub u32);
