//! Public command surface (§9 design note: every externally visible
//! mutation is expressed as a `Command`, producing a `CommandResult` rather
//! than mutating in place). This is the boundary a host (CLI, AI, UI) talks
//! to; everything below is reachable through this enum.

use crate::ability::{AbilityExecutionError, ConditionContext};
use crate::agenda::{self, ActiveLaw, AgendaError, VoteTally};
use crate::card_registry::{AgendaKind, CardRegistry};
use crate::combat::CombatWinner;
use crate::errors::EngineError;
use crate::game_event::LogPayload;
use crate::game_state::GameState;
use crate::ids::{AgendaId, NoteId, PlanetId, PlayerId, SystemId, TechId, TransactionId};
use crate::phase::{self, TurnState};
use crate::player::LeaderState;
use crate::rng::StdRng;
use crate::strategy_card::{CardState, StrategyCardError};
use crate::tactical_action::{self, InvasionOrders, MovementPlan, TacticalActionError, TacticalActionResult, TimingWindowEvent};
use crate::transaction::{self, TransactionError, TransactionOffer, TransactionStatus};
use crate::types::StrategyCard;

/// Every player-initiated action the engine accepts (§9).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    ProposeTransaction { proposer: PlayerId, target: PlayerId, offer: TransactionOffer, request: TransactionOffer },
    AcceptTransaction { id: TransactionId },
    RejectTransaction { id: TransactionId },
    CancelTransaction { id: TransactionId, by: PlayerId },
    SelectStrategyCard { player: PlayerId, card: StrategyCard },
    TakeStrategicAction { player: PlayerId, card: StrategyCard },
    TakeTacticalAction { player: PlayerId, system: SystemId, plan: MovementPlan, invasions: Vec<InvasionOrders> },
    TakeComponentAction { player: PlayerId, note: NoteId },
    ResearchTechnology { player: PlayerId, tech: TechId },
    PassTurn { player: PlayerId },
    VoteOnAgenda { player: PlayerId, agenda: AgendaId, planet_ids: Vec<PlanetId>, outcome: String },
    SetSpeaker { player: PlayerId },
    AdvancePhase,
}

/// The outcome of dispatching a `Command` (SPEC_FULL.md §B "CommandResult
/// split"). Some commands complete outright; others (e.g. a transaction
/// proposal awaiting the target's response) merely change pending state and
/// ask the host to collect a further decision before anything commits. A
/// tactical action reports back a `TacticalActionResult` alongside the new
/// state so the host can decide which optional follow-ups (production,
/// bombardment) still apply.
#[derive(Clone)]
pub enum CommandResult {
    Completed { state: GameState },
    RequiresConfirmation { state: GameState, awaiting: PlayerId },
    TacticalActionCompleted { state: GameState, result: TacticalActionResult },
}

impl CommandResult {
    pub fn state(&self) -> &GameState {
        match self {
            CommandResult::Completed { state } => state,
            CommandResult::RequiresConfirmation { state, .. } => state,
            CommandResult::TacticalActionCompleted { state, .. } => state,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    Transaction(TransactionError),
    StrategyCard(StrategyCardError),
    Tactical(TacticalActionError),
    Agenda(AgendaError),
    Engine(EngineError),
    Ability(AbilityExecutionError),
    UnknownTransaction { id: TransactionId },
    UnknownPlayer { player: PlayerId },
    NoteNotHeld { player: PlayerId, note: NoteId },
    UnknownNote { note: NoteId },
    AllianceCommanderLocked { issuer: PlayerId },
    UnknownTechnology { tech: TechId },
    NoActiveAgenda,
    UnknownAgenda { agenda: AgendaId },
    TooManyAgendasThisRound,
    AgendaVotingPlanetUnavailable { planet: PlanetId },
    UnknownPlanet { planet: PlanetId },
    AlreadyPassed { player: PlayerId },
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandError::Transaction(e) => write!(f, "{e}"),
            CommandError::StrategyCard(e) => write!(f, "{e}"),
            CommandError::Tactical(e) => write!(f, "{e}"),
            CommandError::Agenda(e) => write!(f, "{e}"),
            CommandError::Engine(e) => write!(f, "{e}"),
            CommandError::Ability(e) => write!(f, "{e}"),
            CommandError::UnknownTransaction { id } => write!(f, "no such transaction {:?}", id),
            CommandError::UnknownPlayer { player } => write!(f, "no such player {:?}", player),
            CommandError::NoteNotHeld { player, note } => write!(f, "player {:?} does not hold note {:?}", player, note),
            CommandError::UnknownNote { note } => write!(f, "no such promissory note {:?}", note),
            CommandError::AllianceCommanderLocked { issuer } => write!(f, "{:?}'s commander is locked, Alliance cannot be activated", issuer),
            CommandError::UnknownTechnology { tech } => write!(f, "no such technology {:?}", tech),
            CommandError::NoActiveAgenda => write!(f, "no agenda is currently up for vote"),
            CommandError::UnknownAgenda { agenda } => write!(f, "{:?} is not the agenda currently up for vote", agenda),
            CommandError::TooManyAgendasThisRound => write!(f, "both agendas for this round have already been resolved"),
            CommandError::AgendaVotingPlanetUnavailable { planet } => write!(f, "planet {:?} is exhausted and cannot cast a vote", planet),
            CommandError::UnknownPlanet { planet } => write!(f, "no such planet {:?}", planet),
            CommandError::AlreadyPassed { player } => write!(f, "player {:?} has already passed this round", player),
        }
    }
}

impl std::error::Error for CommandError {}

impl From<TransactionError> for CommandError {
    fn from(e: TransactionError) -> Self {
        CommandError::Transaction(e)
    }
}

impl From<StrategyCardError> for CommandError {
    fn from(e: StrategyCardError) -> Self {
        CommandError::StrategyCard(e)
    }
}

impl From<TacticalActionError> for CommandError {
    fn from(e: TacticalActionError) -> Self {
        CommandError::Tactical(e)
    }
}

impl From<AgendaError> for CommandError {
    fn from(e: AgendaError) -> Self {
        CommandError::Agenda(e)
    }
}

impl From<EngineError> for CommandError {
    fn from(e: EngineError) -> Self {
        CommandError::Engine(e)
    }
}

impl From<AbilityExecutionError> for CommandError {
    fn from(e: AbilityExecutionError) -> Self {
        CommandError::Ability(e)
    }
}

/// Drains `state`'s ability engine, fires `window`, and writes the engine
/// back. The engine is only ever absent for the duration of this call (§4.1
/// `trigger` takes `GameState` by value); `mem::take` avoids cloning the
/// whole registered-ability table on every timing window.
fn fire_timing_window(
    mut state: GameState,
    window: TimingWindowEvent,
    active: PlayerId,
    ctx: &ConditionContext,
    trigger_identity: &str,
) -> Result<GameState, CommandError> {
    let mut engine = std::mem::take(&mut state.ability_engine);
    let (mut new_state, _resolution) = engine.trigger(window.into(), state, active, ctx, trigger_identity)?;
    new_state.ability_engine = engine;
    Ok(new_state)
}

/// Dispatches a single command against `state`, returning the resulting
/// state wrapped in a `CommandResult`. Every branch validates, applies, then
/// calls `GameState::validate` before returning, matching §7's "no partial
/// commit on error" — on any failure the original `state` is untouched
/// because each branch only ever mutates a local clone. `registry` supplies
/// the card content needed to resolve agenda, technology and promissory-note
/// identities.
pub fn dispatch(state: &GameState, turn: &mut TurnState, command: Command, registry: &dyn CardRegistry) -> Result<CommandResult, CommandError> {
    match command {
        Command::ProposeTransaction { proposer, target, offer, request } => {
            let mut new_state = state.clone();
            let id = transaction::propose(&mut new_state, proposer, target, offer, request)?;
            new_state.validate().map_err(EngineError::from)?;
            Ok(CommandResult::RequiresConfirmation { state: new_state, awaiting: target })
        }
        Command::AcceptTransaction { id } => {
            let new_state = transaction::accept(state, id)?;
            new_state.validate().map_err(EngineError::from)?;
            Ok(CommandResult::Completed { state: new_state })
        }
        Command::RejectTransaction { id } => {
            let mut new_state = state.clone();
            transaction::reject(&mut new_state, id);
            Ok(CommandResult::Completed { state: new_state })
        }
        Command::CancelTransaction { id, by } => {
            let mut new_state = state.clone();
            transaction::cancel(&mut new_state, id, by);
            Ok(CommandResult::Completed { state: new_state })
        }
        Command::SelectStrategyCard { player, card } => {
            let mut new_state = state.clone();
            new_state.strategy_cards.select(player, card)?;
            new_state.log(LogPayload::StrategyCardSelected { player, card });
            new_state.validate().map_err(EngineError::from)?;
            Ok(CommandResult::Completed { state: new_state })
        }
        Command::TakeStrategicAction { player, card } => {
            let mut new_state = state.clone();
            new_state.strategy_cards.exhaust(player, card)?;
            new_state.log(LogPayload::StrategyCardExhausted { player, card });
            Ok(CommandResult::Completed { state: new_state })
        }
        Command::TakeTacticalAction { player, system, plan, invasions } => {
            let already_activated = turn.is_activated(system);
            let mut new_state = tactical_action::activate(state, player, system, already_activated)?;
            turn.mark_activated(system);

            let ctx = ConditionContext { system: Some(system), planet: None, during_combat: false, during_tactical_action: true };

            new_state = fire_timing_window(new_state, TimingWindowEvent::AfterActivation, player, &ctx, &format!("{:?}/{:?}/activation", player, system))?;

            new_state = tactical_action::execute_movement(&new_state, player, &plan, |_| 2, |_| 0)?;
            new_state = fire_timing_window(new_state, TimingWindowEvent::AfterMovement, player, &ctx, &format!("{:?}/{:?}/movement", player, system))?;

            let mut result = TacticalActionResult {
                movement_executed: !plan.moves.is_empty(),
                space_cannon_offense_possible: tactical_action::space_cannon_offense_possible(&new_state, system, player),
                ..Default::default()
            };

            new_state = fire_timing_window(new_state, TimingWindowEvent::StartOfSpaceCombat, player, &ctx, &format!("{:?}/{:?}/combat", player, system))?;
            if let Some((after_combat, outcome)) = tactical_action::resolve_space_combat_in_system(&new_state, system, player, &mut StdRng) {
                let winner = match outcome.winner {
                    CombatWinner::Player(p) => Some(p),
                    CombatWinner::Draw => None,
                };
                new_state = after_combat;
                new_state.log(LogPayload::CombatResolved { system, winner });
                result.space_combat = Some((system, outcome.winner.into()));
            }

            new_state = fire_timing_window(new_state, TimingWindowEvent::BeforeInvasion, player, &ctx, &format!("{:?}/{:?}/invasion", player, system))?;
            for order in &invasions {
                if let Some((after_invasion, outcome)) = tactical_action::resolve_invasion(&new_state, order.planet, player, order, &mut StdRng) {
                    new_state = after_invasion;
                    result.invasions.push((order.planet, outcome.winner.into()));
                }
            }

            new_state = fire_timing_window(new_state, TimingWindowEvent::BeforeProduction, player, &ctx, &format!("{:?}/{:?}/production", player, system))?;
            result.production_possible = new_state.galaxy.system(system).map(|s| !s.planets.is_empty()).unwrap_or(false);
            result.timing_windows = vec![
                TimingWindowEvent::AfterActivation,
                TimingWindowEvent::AfterMovement,
                TimingWindowEvent::StartOfSpaceCombat,
                TimingWindowEvent::BeforeInvasion,
                TimingWindowEvent::BeforeProduction,
            ];

            new_state.validate().map_err(EngineError::from)?;
            Ok(CommandResult::TacticalActionCompleted { state: new_state, result })
        }
        Command::TakeComponentAction { player, note } => {
            if !state.promissory.owns(player, note) {
                return Err(CommandError::NoteNotHeld { player, note });
            }
            let record = registry.promissory_note(note).ok_or(CommandError::UnknownNote { note })?;
            let mut new_state = state.clone();
            if record.is_alliance {
                let issuer = new_state.promissory.issuer_of(note).ok_or(CommandError::UnknownNote { note })?;
                let commander_unlocked = new_state
                    .player(issuer)
                    .map(|p| p.leader_sheet.commander == LeaderState::Unlocked)
                    .unwrap_or(false);
                new_state
                    .promissory
                    .activate_alliance(issuer, player, commander_unlocked)
                    .ok_or(CommandError::AllianceCommanderLocked { issuer })?;
            }
            Ok(CommandResult::Completed { state: new_state })
        }
        Command::ResearchTechnology { player, tech } => {
            let record = registry.technology(tech).ok_or(CommandError::UnknownTechnology { tech })?;
            let mut new_state = state.clone();
            let Some(p) = new_state.player_mut(player) else {
                return Err(CommandError::UnknownPlayer { player });
            };
            p.technologies.insert(tech);
            if let Some(color) = record.color {
                new_state.set_tech_color(tech, color);
            }
            new_state.validate().map_err(EngineError::from)?;
            Ok(CommandResult::Completed { state: new_state })
        }
        Command::PassTurn { player } => {
            turn.pass(player).map_err(|_| CommandError::AlreadyPassed { player })?;
            Ok(CommandResult::Completed { state: state.clone() })
        }
        Command::VoteOnAgenda { player, agenda: agenda_id, planet_ids, outcome } => {
            let mut new_state = state.clone();
            agenda::require_custodians_removed(new_state.custodians_token_present)?;
            let record = registry.agenda(agenda_id).ok_or(CommandError::UnknownAgenda { agenda: agenda_id })?;

            match new_state.current_agenda {
                Some(current) if current != agenda_id => return Err(CommandError::UnknownAgenda { agenda: agenda_id }),
                None if new_state.agendas_resolved_this_round >= 2 => return Err(CommandError::TooManyAgendasThisRound),
                None => new_state.current_agenda = Some(agenda_id),
                Some(_) => {}
            }

            let mut planet_influences = Vec::with_capacity(planet_ids.len());
            for &pid in &planet_ids {
                let planet = new_state.galaxy.planet(pid).ok_or(CommandError::UnknownPlanet { planet: pid })?;
                if planet.controlled_by() != Some(player) {
                    return Err(CommandError::Agenda(AgendaError::PlanetNotControlledByVoter { planet: pid, voter: player }));
                }
                if planet.is_exhausted() {
                    return Err(CommandError::AgendaVotingPlanetUnavailable { planet: pid });
                }
                planet_influences.push((pid, planet.influence()));
            }

            new_state.agenda_vote_tally.cast(record, player, &planet_influences, &outcome)?;
            for &pid in &planet_ids {
                if let Some(p) = new_state.galaxy.planet_mut(pid) {
                    p.exhaust();
                }
            }

            let all_players: Vec<PlayerId> = new_state.players.iter().map(|p| p.id).collect();
            if all_players.iter().all(|&p| new_state.agenda_vote_tally.has_voted(p)) {
                let winning_outcome = agenda::break_tie(&new_state.agenda_vote_tally, &outcome);
                if record.kind == AgendaKind::Law {
                    new_state.active_laws.push(ActiveLaw {
                        agenda: agenda_id,
                        name: record.name.clone(),
                        enacted_round: new_state.round,
                        outcome: winning_outcome,
                    });
                    new_state.log(LogPayload::LawEnacted { agenda_name: record.name.clone(), round: new_state.round });
                }
                new_state.current_agenda = None;
                new_state.agenda_vote_tally = VoteTally::new();
                new_state.agendas_resolved_this_round += 1;
                if new_state.agendas_resolved_this_round >= 2 {
                    new_state.galaxy.ready_all_planets();
                    new_state.agendas_resolved_this_round = 0;
                }
            }

            new_state.validate().map_err(EngineError::from)?;
            Ok(CommandResult::Completed { state: new_state })
        }
        Command::SetSpeaker { player } => {
            let mut new_state = state.clone();
            if new_state.player(player).is_none() {
                return Err(CommandError::UnknownPlayer { player });
            }
            new_state.speaker = player;
            Ok(CommandResult::Completed { state: new_state })
        }
        Command::AdvancePhase => {
            let mut new_state = state.clone();
            let from = new_state.phase;
            let to = phase::next_phase(from, new_state.custodians_token_present);

            for card in StrategyCard::ALL {
                if let (Some(owner), Some(CardState::Exhausted)) = (new_state.strategy_cards.owner(card), new_state.strategy_cards.state(card)) {
                    new_state.log(LogPayload::StrategyCardReadied { player: owner, card });
                }
            }
            new_state.strategy_cards.ready_all();

            new_state.phase = to;
            if phase::is_round_boundary(to) {
                new_state.round += 1;
                turn.reset_for_new_round();
            }
            new_state.log(LogPayload::PhaseAdvanced { from, to });
            Ok(CommandResult::Completed { state: new_state })
        }
    }
}

/// Enumerates the commands currently legal for `player` (§9 "AI information
/// surface" analogue to `strategy_card::evaluations`). This is advisory:
/// the authoritative check is always `dispatch` itself.
pub fn enumerate_legal_moves(state: &GameState, turn: &TurnState, player: PlayerId, registry: &dyn CardRegistry) -> Vec<Command> {
    let mut moves = Vec::new();

    if !turn.has_passed(player) {
        moves.push(Command::PassTurn { player });

        for card in state.strategy_cards.cards_owned_by(player) {
            if state.strategy_cards.state(card) == Some(CardState::Readied) {
                moves.push(Command::TakeStrategicAction { player, card });
            }
        }

        for system in state.galaxy.systems_iter() {
            if system.ships.iter().filter_map(|u| state.unit(*u)).any(|u| u.owner == player) {
                moves.push(Command::TakeTacticalAction { player, system: system.id, plan: MovementPlan::default(), invasions: Vec::new() });
            }
        }

        for &note in state.promissory.hand(player) {
            if registry.promissory_note(note).is_some() {
                moves.push(Command::TakeComponentAction { player, note });
            }
        }

        moves.push(Command::SetSpeaker { player });

        if let Some(agenda_id) = state.current_agenda {
            if !state.agenda_vote_tally.has_voted(player) {
                moves.push(Command::VoteOnAgenda { player, agenda: agenda_id, planet_ids: Vec::new(), outcome: String::new() });
            }
        }
    }

    let all_players: Vec<PlayerId> = state.players.iter().map(|p| p.id).collect();
    if turn.all_passed(&all_players) {
        moves.push(Command::AdvancePhase);
    }

    for (&id, tx) in &state.pending_transactions {
        if tx.target == player && tx.status == TransactionStatus::Pending {
            moves.push(Command::AcceptTransaction { id });
            moves.push(Command::RejectTransaction { id });
        }
    }

    moves
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card_registry::InMemoryCardRegistry;
    use crate::galaxy::Galaxy;
    use crate::player::Player;

    fn basic_state() -> GameState {
        let players = vec![Player::new(PlayerId(0), "p1", 3), Player::new(PlayerId(1), "p2", 3)];
        let galaxy = Galaxy::new();
        GameState::new(players, galaxy, 2)
    }

    #[test]
    fn select_strategy_card_completes_immediately() {
        let state = basic_state();
        let mut turn = TurnState::new();
        let registry = InMemoryCardRegistry::default();
        let result = dispatch(&state, &mut turn, Command::SelectStrategyCard { player: PlayerId(0), card: StrategyCard::Trade }, &registry).unwrap();
        assert_eq!(result.state().strategy_cards.owner(StrategyCard::Trade), Some(PlayerId(0)));
    }

    #[test]
    fn propose_transaction_requires_confirmation() {
        let state = basic_state();
        let mut turn = TurnState::new();
        let registry = InMemoryCardRegistry::default();
        let result = dispatch(
            &state,
            &mut turn,
            Command::ProposeTransaction {
                proposer: PlayerId(0),
                target: PlayerId(1),
                offer: TransactionOffer::default(),
                request: TransactionOffer::default(),
            },
            &registry,
        );
        // Not neighbors (no ships placed) -> rejected before confirmation.
        assert!(result.is_err());
    }

    #[test]
    fn pass_turn_then_enumerate_excludes_further_actions() {
        let state = basic_state();
        let mut turn = TurnState::new();
        let registry = InMemoryCardRegistry::default();
        dispatch(&state, &mut turn, Command::PassTurn { player: PlayerId(0) }, &registry).unwrap();
        assert!(turn.has_passed(PlayerId(0)));
    }

    #[test]
    fn advance_phase_readies_exhausted_strategy_cards_and_logs_both_events() {
        let mut state = basic_state();
        state.strategy_cards.select(PlayerId(0), StrategyCard::Trade).unwrap();
        state.strategy_cards.exhaust(PlayerId(0), StrategyCard::Trade).unwrap();
        let mut turn = TurnState::new();
        let registry = InMemoryCardRegistry::default();
        let result = dispatch(&state, &mut turn, Command::AdvancePhase, &registry).unwrap();
        assert_eq!(result.state().strategy_cards.state(StrategyCard::Trade), Some(CardState::Readied));
        let payloads: Vec<_> = result.state().event_log.entries().iter().map(|e| &e.payload).collect();
        assert!(payloads.iter().any(|p| matches!(p, LogPayload::StrategyCardReadied { .. })));
        assert!(payloads.iter().any(|p| matches!(p, LogPayload::PhaseAdvanced { .. })));
    }

    #[test]
    fn vote_on_agenda_rejects_planet_not_controlled_by_voter() {
        use crate::card_registry::{AgendaRecord, OutcomeSpace};
        use crate::ids::AgendaId;
        use crate::planet::Planet;

        let mut state = basic_state();
        state.custodians_token_present = false;
        let mut galaxy = Galaxy::new();
        galaxy.place_system(crate::ids::SystemId(1), crate::hex::HexCoord::new(0, 0));
        galaxy.add_planet(crate::ids::SystemId(1), Planet::new(PlanetId(1), "A", 2, 3));
        state.galaxy = galaxy;

        let mut registry = InMemoryCardRegistry::default();
        registry.agendas.push(AgendaRecord { id: AgendaId(1), name: "Test".into(), kind: AgendaKind::Directive, outcomes: OutcomeSpace::ForAgainst });

        let mut turn = TurnState::new();
        let err = dispatch(
            &state,
            &mut turn,
            Command::VoteOnAgenda { player: PlayerId(0), agenda: AgendaId(1), planet_ids: vec![PlanetId(1)], outcome: "For".into() },
            &registry,
        )
        .unwrap_err();
        assert_eq!(err, CommandError::Agenda(AgendaError::PlanetNotControlledByVoter { planet: PlanetId(1), voter: PlayerId(0) }));
    }
}
