//! End-to-end scenario tests wiring multiple subsystems together through
//! the public `command::dispatch` surface, rather than calling module
//! internals directly.

use ti4_engine::card_registry::InMemoryCardRegistry;
use ti4_engine::command::{dispatch, Command, CommandResult};
use ti4_engine::galaxy::Galaxy;
use ti4_engine::game_state::GameState;
use ti4_engine::hex::HexCoord;
use ti4_engine::ids::{PlayerId, SystemId};
use ti4_engine::phase::TurnState;
use ti4_engine::player::Player;
use ti4_engine::transaction::{ResourceBundle, TransactionOffer};
use ti4_engine::types::{StrategyCard, UnitType};
use ti4_engine::unit::Unit;

fn two_neighbor_player_state() -> GameState {
    let mut p1 = Player::new(PlayerId(0), "p1", 3);
    p1.add_trade_goods(5);
    let mut p2 = Player::new(PlayerId(1), "p2", 3);
    p2.add_commodities(2);
    p2.command_pools.tactic = 1;

    let mut galaxy = Galaxy::new();
    galaxy.place_system(SystemId(1), HexCoord::new(0, 0));
    galaxy.place_system(SystemId(2), HexCoord::new(1, 0));

    let mut state = GameState::new(vec![p1, p2], galaxy, 2);

    let ship1 = Unit::new(UnitType::Cruiser, PlayerId(0));
    state.galaxy.system_mut(SystemId(1)).unwrap().ships.push(ship1.id);
    state.insert_unit(ship1);

    let ship2 = Unit::new(UnitType::Cruiser, PlayerId(1));
    let ship2_id = ship2.id;
    state.galaxy.system_mut(SystemId(1)).unwrap().ships.push(ship2_id);
    state.insert_unit(ship2);

    state
}

#[test]
fn end_to_end_transaction_round_trip() {
    let state = two_neighbor_player_state();
    let mut turn = TurnState::new();
    let registry = InMemoryCardRegistry::default();

    let result = dispatch(
        &state,
        &mut turn,
        Command::ProposeTransaction {
            proposer: PlayerId(0),
            target: PlayerId(1),
            offer: TransactionOffer { resources: ResourceBundle { trade_goods: 3, commodities: 0 }, ..Default::default() },
            request: TransactionOffer { resources: ResourceBundle { trade_goods: 0, commodities: 2 }, ..Default::default() },
        },
        &registry,
    )
    .unwrap();

    let CommandResult::RequiresConfirmation { state: proposed, .. } = result else {
        panic!("expected a pending confirmation");
    };

    let id = *proposed.pending_transactions.keys().next().unwrap();
    let completed = dispatch(&proposed, &mut turn, Command::AcceptTransaction { id }, &registry).unwrap();

    let final_state = completed.state();
    assert_eq!(final_state.player(PlayerId(0)).unwrap().trade_goods(), 4);
    assert_eq!(final_state.player(PlayerId(1)).unwrap().trade_goods(), 3);
}

#[test]
fn strategy_card_selection_then_strategic_action() {
    let state = two_neighbor_player_state();
    let mut turn = TurnState::new();
    let registry = InMemoryCardRegistry::default();

    let selected = dispatch(&state, &mut turn, Command::SelectStrategyCard { player: PlayerId(0), card: StrategyCard::Warfare }, &registry).unwrap();
    let exhausted = dispatch(selected.state(), &mut turn, Command::TakeStrategicAction { player: PlayerId(0), card: StrategyCard::Warfare }, &registry).unwrap();

    assert_eq!(exhausted.state().strategy_cards.state(StrategyCard::Warfare), Some(ti4_engine::strategy_card::CardState::Exhausted));
}

#[test]
fn tactical_action_activates_and_moves_between_systems() {
    let mut state = two_neighbor_player_state();
    let scout = Unit::new(UnitType::Cruiser, PlayerId(0));
    let scout_id = scout.id;
    state.galaxy.system_mut(SystemId(2)).unwrap().ships.push(scout_id);
    state.insert_unit(scout);

    let mut turn = TurnState::new();
    let registry = InMemoryCardRegistry::default();
    let plan = ti4_engine::tactical_action::MovementPlan {
        moves: vec![ti4_engine::tactical_action::UnitMove { unit: scout_id, from: SystemId(2), to: SystemId(1) }],
    };

    let result = dispatch(
        &state,
        &mut turn,
        Command::TakeTacticalAction { player: PlayerId(0), system: SystemId(2), plan, invasions: Vec::new() },
        &registry,
    )
    .unwrap();
    assert!(turn.is_activated(SystemId(2)));
    assert!(result.state().galaxy.system(SystemId(1)).unwrap().ships.contains(&scout_id));
}

#[test]
fn passing_twice_is_rejected() {
    let state = two_neighbor_player_state();
    let mut turn = TurnState::new();
    let registry = InMemoryCardRegistry::default();
    dispatch(&state, &mut turn, Command::PassTurn { player: PlayerId(0) }, &registry).unwrap();
    let err = dispatch(&state, &mut turn, Command::PassTurn { player: PlayerId(0) }, &registry);
    assert!(err.is_err());
}

#[test]
fn enumerate_legal_moves_excludes_passed_players_actions() {
    let state = two_neighbor_player_state();
    let mut turn = TurnState::new();
    let registry = InMemoryCardRegistry::default();

    let before = ti4_engine::command::enumerate_legal_moves(&state, &turn, PlayerId(0), &registry);
    assert!(before.contains(&Command::PassTurn { player: PlayerId(0) }));

    turn.pass(PlayerId(0)).unwrap();
    let after = ti4_engine::command::enumerate_legal_moves(&state, &turn, PlayerId(0), &registry);
    assert!(!after.iter().any(|c| matches!(c, Command::PassTurn { .. })));
}

#[test]
fn agenda_vote_enacts_a_law_once_every_player_has_voted() {
    use ti4_engine::card_registry::{AgendaKind, AgendaRecord, OutcomeSpace};
    use ti4_engine::game_event::LogPayload;
    use ti4_engine::ids::{AgendaId, PlanetId};
    use ti4_engine::planet::Planet;

    let mut state = two_neighbor_player_state();
    state.custodians_token_present = false;
    let mut planet = Planet::new(PlanetId(1), "A", 2, 3);
    planet.set_control(Some(PlayerId(0)));
    state.galaxy.add_planet(SystemId(1), planet);

    let mut registry = InMemoryCardRegistry::default();
    registry.agendas.push(AgendaRecord { id: AgendaId(1), name: "Fleet Regulations".into(), kind: AgendaKind::Law, outcomes: OutcomeSpace::ForAgainst });

    let mut turn = TurnState::new();
    let result = dispatch(
        &state,
        &mut turn,
        Command::VoteOnAgenda { player: PlayerId(0), agenda: AgendaId(1), planet_ids: vec![PlanetId(1)], outcome: "For".into() },
        &registry,
    )
    .unwrap();
    let CommandResult::Completed { state: after_first_vote } = result else {
        panic!("vote completes immediately");
    };
    assert!(after_first_vote.agenda_vote_tally.has_voted(PlayerId(0)));
    assert!(after_first_vote.galaxy.planet(PlanetId(1)).unwrap().is_exhausted());
    // P1 still owes a vote; the agenda is not yet resolved.
    assert!(after_first_vote.active_laws.is_empty());

    let result = dispatch(
        &after_first_vote,
        &mut turn,
        Command::VoteOnAgenda { player: PlayerId(1), agenda: AgendaId(1), planet_ids: vec![], outcome: "For".into() },
        &registry,
    )
    .unwrap();
    let final_state = result.state();
    assert_eq!(final_state.active_laws.len(), 1);
    assert!(final_state.current_agenda.is_none());
    assert!(final_state.event_log.entries().iter().any(|e| matches!(e.payload, LogPayload::LawEnacted { .. })));
}
