//! The immutable game-state root (§3 GameState, L4 in the layering table).
//!
//! Every mutation yields a fresh `GameState`. Internally this is plain
//! clone-then-mutate rather than a persistent data structure: the teacher
//! leaves representation free as long as the public contract is value
//! semantics (§9 "Immutable state with structural sharing").

use std::collections::HashMap;
use std::rc::Rc;

use crate::ability::AbilityEngine;
use crate::agenda::{ActiveLaw, VoteTally};
use crate::card_registry::{CardRegistry, ExplorationCard, ExplorationDeck, VecExplorationDeck};
use crate::errors::{EngineError, InvariantViolation};
use crate::galaxy::Galaxy;
use crate::game_event::{EventLog, LogPayload, LogicalClock};
use crate::ids::{AgendaId, PlanetId, PlayerId, TechId, TransactionId, UnitId};
use crate::observer::TransactionObserver;
use crate::player::Player;
use crate::promissory::PromissoryNoteManager;
use crate::rng::Rng;
use crate::strategy_card::StrategyCardCoordinator;
use crate::transaction::ComponentTransaction;
use crate::types::{Phase, PlanetTrait, TechColor};
use crate::unit::Unit;

/// The immutable root of all game state.
#[derive(Clone)]
pub struct GameState {
    pub players: Vec<Player>,
    pub galaxy: Galaxy,
    pub units: HashMap<UnitId, Unit>,
    pub phase: Phase,
    pub round: u32,
    pub turn: u32,
    pub speaker: PlayerId,
    pub pending_transactions: HashMap<TransactionId, ComponentTransaction>,
    pub transaction_history: Vec<ComponentTransaction>,
    pub active_laws: Vec<ActiveLaw>,
    pub promissory: PromissoryNoteManager,
    pub strategy_cards: StrategyCardCoordinator,
    pub custodians_token_present: bool,
    pub event_log: EventLog,
    pub ability_engine: AbilityEngine,
    pub current_agenda: Option<AgendaId>,
    pub agenda_vote_tally: VoteTally,
    pub agendas_resolved_this_round: u8,
    pub exploration_decks: HashMap<PlanetTrait, VecExplorationDeck>,
    tech_colors: HashMap<TechId, TechColor>,
    observers: Vec<Rc<dyn TransactionObserver>>,
    in_notification: bool,
}

impl GameState {
    pub fn new(players: Vec<Player>, galaxy: Galaxy, starting_player_count: u8) -> Self {
        let speaker = players.first().map(|p| p.id).unwrap_or(PlayerId(0));
        Self {
            players,
            galaxy,
            units: HashMap::new(),
            phase: Phase::Strategy,
            round: 1,
            turn: 0,
            speaker,
            pending_transactions: HashMap::new(),
            transaction_history: Vec::new(),
            active_laws: Vec::new(),
            promissory: PromissoryNoteManager::new(),
            strategy_cards: StrategyCardCoordinator::new(starting_player_count),
            custodians_token_present: true,
            event_log: EventLog::default(),
            ability_engine: AbilityEngine::new(),
            current_agenda: None,
            agenda_vote_tally: VoteTally::new(),
            agendas_resolved_this_round: 0,
            exploration_decks: HashMap::new(),
            tech_colors: HashMap::new(),
            observers: Vec::new(),
            in_notification: false,
        }
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.get_mut(&id)
    }

    pub fn insert_unit(&mut self, unit: Unit) {
        self.units.insert(unit.id, unit);
    }

    pub fn remove_unit(&mut self, id: UnitId) -> Option<Unit> {
        self.units.remove(&id)
    }

    pub fn set_tech_color(&mut self, id: TechId, color: TechColor) {
        self.tech_colors.insert(id, color);
    }

    pub fn tech_color(&self, id: TechId) -> Option<TechColor> {
        self.tech_colors.get(&id).copied()
    }

    pub fn clock(&self) -> LogicalClock {
        LogicalClock { round: self.round, phase: self.phase, turn: self.turn }
    }

    pub fn log(&mut self, payload: LogPayload) {
        let clock = self.clock();
        self.event_log.push(clock, payload);
    }

    pub fn register_observer(&mut self, observer: Rc<dyn TransactionObserver>) {
        self.observers.push(observer);
    }

    /// Notifies every observer with per-observer error isolation; an
    /// observer without the required capability (represented here simply as
    /// "always callable" trait objects) is treated uniformly. Re-entrant
    /// calls into notification itself are rejected (§5) — an observer that
    /// recursively calls back into a held `GameState` clone's
    /// `notify_observers` hits the guard instead of looping.
    pub(crate) fn notify_observers(&mut self, tx: &ComponentTransaction) -> Result<(), EngineError> {
        if self.in_notification {
            return Err(EngineError::Reentrant);
        }
        self.in_notification = true;
        for observer in &self.observers {
            if let Err(msg) = observer.on_transaction_completed(tx) {
                log::warn!("transaction observer failed: {msg}");
            }
        }
        self.in_notification = false;
        Ok(())
    }

    pub fn is_notifying(&self) -> bool {
        self.in_notification
    }

    /// Draws from (and lazily seeds) the exploration deck for `trait_kind`,
    /// applying relic-fragment/attachment side effects (§4.2). Exploring a
    /// traitless planet does nothing and returns `None` (§8 boundary
    /// behavior) — it never advances any deck.
    pub fn explore(
        &mut self,
        planet: PlanetId,
        trait_kind: Option<PlanetTrait>,
        registry: &dyn CardRegistry,
        rng: &mut dyn Rng,
    ) -> Option<ExplorationCard> {
        let trait_kind = trait_kind?;
        let deck = self.exploration_decks.entry(trait_kind).or_default();
        if deck.draw_pile.is_empty() && deck.discard_pile.is_empty() {
            deck.draw_pile = registry.exploration_cards(trait_kind);
        }
        let card = deck.draw(rng)?;
        if card.attaches {
            if let Some(p) = self.galaxy.planet_mut(planet) {
                p.attach(crate::planet::Attachment { name: card.name.clone(), resource_modifier: 0, influence_modifier: 0 });
            }
        }
        if !card.relic_fragment && !card.attaches {
            let discardable = card.clone();
            self.exploration_decks.get_mut(&trait_kind).unwrap().discard(discardable);
        }
        Some(card)
    }

    /// Checks the cross-cutting invariants from §3/§8 that must hold after
    /// every command. Invariant violations are fatal (§7) and are never
    /// caught inside the engine.
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        for player in &self.players {
            if !player.is_valid() {
                return Err(InvariantViolation::CommodityOverCeiling {
                    player: player.id,
                    value: player.commodities(),
                    ceiling: player.commodity_value,
                });
            }
        }

        let mut seen = std::collections::HashSet::new();
        for id in self.pending_transactions.keys() {
            if !seen.insert(*id) {
                return Err(InvariantViolation::DuplicateTransactionId { id: *id });
            }
        }
        for tx in &self.transaction_history {
            if !seen.insert(tx.id) {
                return Err(InvariantViolation::DuplicateTransactionId { id: tx.id });
            }
        }

        Ok(())
    }

    /// Whether `player` has zero ground forces, zero production units, and
    /// controls zero planets — the elimination condition (§4.8).
    pub fn meets_elimination_condition(&self, player: PlayerId) -> bool {
        let has_ground_forces = self
            .units
            .values()
            .any(|u| u.owner == player && u.unit_type.is_ground_force());
        let has_production = self
            .units
            .values()
            .any(|u| u.owner == player && u.unit_type.is_structure());
        let controls_planet = self
            .galaxy
            .planets_iter()
            .any(|p| p.controlled_by() == Some(player));
        !has_ground_forces && !has_production && !controls_planet
    }

    /// A production structure is blockaded iff its system contains enemy
    /// ships and no friendly ships (§3 Blockade invariant). Recomputed on
    /// demand, never stored.
    pub fn is_blockaded(&self, structure: UnitId) -> bool {
        let Some(unit) = self.unit(structure) else { return false };
        let Some(system) = self
            .galaxy
            .systems_iter()
            .find(|s| s.ships.contains(&structure) || s.planets.iter().any(|&p| {
                self.galaxy.planet(p).map(|pl| pl.ground_forces().contains(&structure)).unwrap_or(false)
            }))
        else {
            return false;
        };
        let owner = unit.owner;
        let has_friendly = system.ships.iter().filter_map(|u| self.unit(*u)).any(|u| u.owner == owner);
        let has_enemy = system.ships.iter().filter_map(|u| self.unit(*u)).any(|u| u.owner != owner);
        has_enemy && !has_friendly
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex::HexCoord;
    use crate::ids::SystemId;
    use crate::planet::Planet;
    use crate::types::UnitType;

    fn basic_state() -> GameState {
        let players = vec![Player::new(PlayerId(0), "arborec", 3), Player::new(PlayerId(1), "jolnar", 4)];
        let mut galaxy = Galaxy::new();
        galaxy.place_system(SystemId(1), HexCoord::new(0, 0));
        GameState::new(players, galaxy, 2)
    }

    #[test]
    fn blockade_scenario_c() {
        // §8 scenario (c): P1 space dock on planet A, P2 destroyer in
        // space, no P1 ships -> blockaded; infantry can still be built
        // (checked in tactical_action tests), ships cannot.
        let mut state = basic_state();
        let dock = Unit::new(UnitType::SpaceDock, PlayerId(0));
        let dock_id = dock.id;
        state.insert_unit(dock);
        let mut planet = Planet::new(crate::ids::PlanetId(1), "A", 2, 1);
        planet.add_ground_force(dock_id, PlayerId(0));
        state.galaxy.add_planet(SystemId(1), planet);

        let destroyer = Unit::new(UnitType::Destroyer, PlayerId(1));
        let destroyer_id = destroyer.id;
        state.insert_unit(destroyer);
        state.galaxy.system_mut(SystemId(1)).unwrap().ships.push(destroyer_id);

        assert!(state.is_blockaded(dock_id));
    }

    #[test]
    fn elimination_condition_requires_all_three() {
        let state = basic_state();
        assert!(state.meets_elimination_condition(PlayerId(0)));
    }

    #[test]
    fn notify_observers_rejects_reentrant_calls() {
        use crate::ids::{PlayerId as Pid, TransactionId};
        use crate::transaction::{ComponentTransaction, TransactionOffer, TransactionStatus};

        let mut state = basic_state();
        let tx = ComponentTransaction {
            id: TransactionId::new(),
            proposer: Pid(0),
            target: Pid(1),
            offer: TransactionOffer::default(),
            request: TransactionOffer::default(),
            status: TransactionStatus::Accepted,
            proposed_at_round: 1,
            completed_at_round: Some(1),
        };

        assert!(state.notify_observers(&tx).is_ok());
        state.in_notification = true;
        assert_eq!(state.notify_observers(&tx), Err(EngineError::Reentrant));
    }

    #[test]
    fn explore_on_a_traitless_planet_advances_no_deck() {
        let mut state = basic_state();
        let registry = crate::card_registry::InMemoryCardRegistry::default();
        let mut rng = crate::rng::ScriptedRng::new([1]);
        let result = state.explore(crate::ids::PlanetId(1), None, &registry, &mut rng);
        assert!(result.is_none());
        assert!(state.exploration_decks.is_empty());
    }
}
