//! Core rules engine for a Twilight Imperium 4th Edition-style 4X board
//! game simulator.
//!
//! The engine is a pure state machine: a `GameState` value, a `Command`
//! enum describing every externally visible mutation, and a `dispatch`
//! function that turns one into the other. Card content (technologies,
//! agendas, promissory notes) is supplied by the host through the
//! `CardRegistry` protocol rather than hardcoded, and randomness is injected
//! through the `Rng` trait so resolution is deterministic under test.

pub mod ability;
pub mod agenda;
pub mod capture;
pub mod card_registry;
pub mod combat;
pub mod command;
pub mod effect;
pub mod elimination;
pub mod errors;
pub mod galaxy;
pub mod game_event;
pub mod game_state;
pub mod hex;
pub mod ids;
pub mod observer;
pub mod phase;
pub mod planet;
pub mod player;
pub mod promissory;
pub mod rng;
pub mod strategy_card;
pub mod tactical_action;
pub mod transaction;
pub mod types;
pub mod unit;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use ability::{Ability, AbilityEngine, AbilityExecutionError, AbilityResolution};
pub use card_registry::{CardRegistry, InMemoryCardRegistry};
pub use command::{dispatch, enumerate_legal_moves, Command, CommandError, CommandResult};
pub use errors::{EngineError, InvariantViolation};
pub use game_state::GameState;
pub use ids::{AbilityId, AgendaId, NoteId, PlanetId, PlayerId, SystemId, TechId, TransactionId, UnitId};
pub use phase::TurnState;
pub use rng::{Rng, ScriptedRng, StdRng};
pub use types::{Phase, StrategyCard, UnitType};
