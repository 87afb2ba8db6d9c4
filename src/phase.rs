//! Phase controller (§4 intro, L7 in the layering table): the eight-phase
//! round loop, turn order, pass/elimination handling.

use std::collections::HashSet;

use crate::ids::{PlayerId, SystemId};
use crate::types::Phase;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseError {
    WrongPhase { expected: Phase, actual: Phase },
    PlayerAlreadyPassed { player: PlayerId },
    NotPlayersTurn { player: PlayerId, active: PlayerId },
}

impl std::fmt::Display for PhaseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PhaseError::WrongPhase { expected, actual } => write!(f, "expected phase {:?}, got {:?}", expected, actual),
            PhaseError::PlayerAlreadyPassed { player } => write!(f, "player {:?} has already passed this action phase", player),
            PhaseError::NotPlayersTurn { player, active } => write!(f, "it is not {:?}'s turn (active: {:?})", player, active),
        }
    }
}

impl std::error::Error for PhaseError {}

/// Per-round turn bookkeeping: which systems have been activated, which
/// players have passed, and whose turn it currently is.
#[derive(Debug, Clone, Default)]
pub struct TurnState {
    activated_systems: HashSet<SystemId>,
    passed_players: HashSet<PlayerId>,
    pub active_player: Option<PlayerId>,
}

impl TurnState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_activated(&self, system: SystemId) -> bool {
        self.activated_systems.contains(&system)
    }

    pub fn mark_activated(&mut self, system: SystemId) {
        self.activated_systems.insert(system);
    }

    pub fn has_passed(&self, player: PlayerId) -> bool {
        self.passed_players.contains(&player)
    }

    /// Pass is permanent for the rest of the action phase, per rule: once
    /// all a player's strategy cards are exhausted they must pass and may
    /// take no further actions this round (§4.5 "Turn continuation").
    pub fn pass(&mut self, player: PlayerId) -> Result<(), PhaseError> {
        if self.passed_players.contains(&player) {
            return Err(PhaseError::PlayerAlreadyPassed { player });
        }
        self.passed_players.insert(player);
        Ok(())
    }

    pub fn all_passed(&self, players: &[PlayerId]) -> bool {
        players.iter().all(|p| self.passed_players.contains(p))
    }

    /// Resets all per-round bookkeeping (activation tokens and passes are
    /// both round-scoped).
    pub fn reset_for_new_round(&mut self) {
        self.activated_systems.clear();
        self.passed_players.clear();
        self.active_player = None;
    }
}

/// Advances to the next phase in sequence (§2 "Strategy, Action, Status,
/// Agenda"). The agenda sub-phases are only entered when the custodians
/// token has been removed; otherwise `StatusEffects` advances straight to
/// a new round's `Strategy` phase.
pub fn next_phase(current: Phase, custodians_token_present: bool) -> Phase {
    match current {
        Phase::Strategy => Phase::Action,
        Phase::Action => Phase::StatusReady,
        Phase::StatusReady => Phase::StatusEffects,
        Phase::StatusEffects => {
            if custodians_token_present {
                Phase::Strategy
            } else {
                Phase::AgendaFirst
            }
        }
        Phase::AgendaFirst => Phase::AgendaSecond,
        Phase::AgendaSecond => Phase::AgendaReady,
        Phase::AgendaReady => Phase::Strategy,
        Phase::Completed => Phase::Completed,
    }
}

/// Whether advancing out of `phase` starts a new round (the Strategy phase
/// of the next round).
pub fn is_round_boundary(next: Phase) -> bool {
    next == Phase::Strategy
}

/// Derives action-phase turn order from initiative numbers (§4.5 "compute
/// initiative-order analyses"), lowest initiative (most readied card) acts
/// first among players who still hold at least one unexhausted card.
pub fn turn_order_by_initiative(initiative_order: &[(PlayerId, crate::types::StrategyCard)]) -> Vec<PlayerId> {
    let mut order = initiative_order.to_vec();
    order.sort_by_key(|(_, card)| card.initiative());
    order.into_iter().map(|(p, _)| p).collect()
}
