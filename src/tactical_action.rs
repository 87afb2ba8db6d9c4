//! Tactical action pipeline (§4.3, L6 in the layering table): activation,
//! movement, space cannon offense, space combat, invasion, production.

use std::collections::HashSet;

use crate::capture::capture_unit;
use crate::card_registry::TriggerName;
use crate::combat::{resolve_ground_combat, resolve_space_combat, CombatOutcome, CombatWinner};
use crate::game_state::GameState;
use crate::ids::{PlanetId, PlayerId, SystemId, UnitId};
use crate::rng::Rng;
use crate::types::UnitType;
use crate::unit::{compute_stats, Unit, UnitStats};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitMove {
    pub unit: UnitId,
    pub from: SystemId,
    pub to: SystemId,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovementPlan {
    pub moves: Vec<UnitMove>,
}

/// Ground forces committed to invade a single planet (§4.3 step 5).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvasionOrders {
    pub planet: PlanetId,
    pub committed: Vec<UnitId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TacticalActionError {
    NoTacticTokensAvailable { player: PlayerId },
    UnitNotOwned { unit: UnitId, player: PlayerId },
    SourceDoesNotContainUnit { unit: UnitId, system: SystemId },
    NotAdjacent { from: SystemId, to: SystemId },
    MoveExceedsRange { unit: UnitId },
}

impl std::fmt::Display for TacticalActionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TacticalActionError::NoTacticTokensAvailable { player } => write!(f, "player {:?} has no tactic command tokens available", player),
            TacticalActionError::UnitNotOwned { unit, player } => write!(f, "unit {:?} is not owned by {:?}", unit, player),
            TacticalActionError::SourceDoesNotContainUnit { unit, system } => {
                write!(f, "unit {:?} is not present in system {:?}", unit, system)
            }
            TacticalActionError::NotAdjacent { from, to } => write!(f, "{:?} is not adjacent to {:?}", from, to),
            TacticalActionError::MoveExceedsRange { unit } => write!(f, "unit {:?} does not have enough movement", unit),
        }
    }
}

impl std::error::Error for TacticalActionError {}

/// Timing windows emitted between tactical-action steps (§4.3). Each is a
/// trigger name consumed by the ability engine; no step advances until the
/// engine drains its queue (see `ability::AbilityEngine::trigger`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimingWindowEvent {
    AfterActivation,
    AfterMovement,
    StartOfSpaceCombat,
    BeforeInvasion,
    BeforeProduction,
}

impl From<TimingWindowEvent> for TriggerName {
    fn from(value: TimingWindowEvent) -> Self {
        match value {
            TimingWindowEvent::AfterActivation => TriggerName::AfterActivation,
            TimingWindowEvent::AfterMovement => TriggerName::AfterMovement,
            TimingWindowEvent::StartOfSpaceCombat => TriggerName::StartOfSpaceCombat,
            TimingWindowEvent::BeforeInvasion => TriggerName::BeforeInvasion,
            TimingWindowEvent::BeforeProduction => TriggerName::BeforeProduction,
        }
    }
}

/// Outcome of a completed (or partially completed) tactical action (§4.3
/// "Result object").
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TacticalActionResult {
    pub movement_executed: bool,
    pub space_cannon_offense_possible: bool,
    pub bombardment_possible: bool,
    pub production_possible: bool,
    pub space_combat: Option<(SystemId, CombatWinnerRecord)>,
    pub invasions: Vec<(PlanetId, CombatWinnerRecord)>,
    pub timing_windows: Vec<TimingWindowEvent>,
}

/// `CombatWinner` minus its `rng`-dependent history, kept on the result so
/// callers don't need `combat::CombatOutcome` (which carries no `Eq`) in
/// their own `PartialEq` derives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombatWinnerRecord {
    Player(PlayerId),
    Draw,
}

impl From<CombatWinner> for CombatWinnerRecord {
    fn from(value: CombatWinner) -> Self {
        match value {
            CombatWinner::Player(p) => CombatWinnerRecord::Player(p),
            CombatWinner::Draw => CombatWinnerRecord::Draw,
        }
    }
}

/// Step 1: activation. Spends one tactic command token to activate
/// `system` (§4.3 step 1). Whether the system *already* carries a tactic
/// token this round (in which case no token is spent) is tracked by the
/// phase controller's per-round activation set, not here; callers should
/// consult `phase::TurnState::is_activated` before calling this.
pub fn activate(state: &GameState, player: PlayerId, system: SystemId, already_has_token: bool) -> Result<GameState, TacticalActionError> {
    let mut new_state = state.clone();
    let _ = system;
    if already_has_token {
        return Ok(new_state);
    }
    match new_state.player_mut(player) {
        Some(p) if p.command_pools.tactic > 0 => {
            p.command_pools.tactic -= 1;
            Ok(new_state)
        }
        Some(_) | None => Err(TacticalActionError::NoTacticTokensAvailable { player }),
    }
}

/// Step 2: movement. Validates each move for ownership, source presence,
/// and adjacency (physical or matching-wormhole); technology-granted range
/// increases are supplied by the caller via `extra_range` per unit (§4.3
/// step 2 — e.g. a blue-prereq Gravity Drive-style ability).
pub fn execute_movement(
    state: &GameState,
    player: PlayerId,
    plan: &MovementPlan,
    move_value_of: impl Fn(UnitId) -> u8,
    extra_range: impl Fn(UnitId) -> u8,
) -> Result<GameState, TacticalActionError> {
    let mut new_state = state.clone();

    for mv in &plan.moves {
        let unit = new_state.unit(mv.unit).ok_or(TacticalActionError::SourceDoesNotContainUnit { unit: mv.unit, system: mv.from })?;
        if unit.owner != player {
            return Err(TacticalActionError::UnitNotOwned { unit: mv.unit, player });
        }
        let source = new_state.galaxy.system(mv.from).ok_or(TacticalActionError::SourceDoesNotContainUnit { unit: mv.unit, system: mv.from })?;
        if !source.ships.contains(&mv.unit) {
            return Err(TacticalActionError::SourceDoesNotContainUnit { unit: mv.unit, system: mv.from });
        }
        let from_coord = new_state.galaxy.system(mv.from).unwrap().coord;
        let to_coord = new_state.galaxy.system(mv.to).unwrap().coord;
        let physically_adjacent = from_coord.is_neighbor_of(to_coord);
        let wormhole_adjacent = new_state.galaxy.are_adjacent(mv.from, mv.to) && !physically_adjacent;

        // A wormhole hop counts as a single step of movement regardless of
        // hex distance; otherwise the move must fit within remaining range
        // (§4.3 step 2: "path honors unit base movement... wormhole
        // adjacency honored").
        let range = move_value_of(mv.unit) + extra_range(mv.unit);
        if wormhole_adjacent {
            if range == 0 {
                return Err(TacticalActionError::MoveExceedsRange { unit: mv.unit });
            }
        } else if physically_adjacent {
            if range == 0 {
                return Err(TacticalActionError::MoveExceedsRange { unit: mv.unit });
            }
        } else {
            let hops = from_coord.distance(to_coord);
            if hops > range as u32 {
                return Err(TacticalActionError::NotAdjacent { from: mv.from, to: mv.to });
            }
        }

        new_state.galaxy.system_mut(mv.from).unwrap().ships.retain(|&u| u != mv.unit);
        new_state.galaxy.system_mut(mv.to).unwrap().ships.push(mv.unit);
    }

    Ok(new_state)
}

/// Step 3: space cannon offense possibility. Any opponent PDS-equivalent
/// in the active system, or a system adjacent to it (physical or matching
/// wormhole), may fire at ships that just moved (§4.3 step 3).
pub fn space_cannon_offense_possible(state: &GameState, active_system: SystemId, active_player: PlayerId) -> bool {
    let mut candidate_systems = vec![active_system];
    candidate_systems.extend(state.galaxy.adjacent_systems(active_system));

    candidate_systems.iter().any(|&sys_id| {
        state
            .galaxy
            .system(sys_id)
            .map(|sys| {
                sys.planets.iter().any(|&pid| {
                    state
                        .galaxy
                        .planet(pid)
                        .map(|p| {
                            p.ground_forces().iter().filter_map(|u| state.unit(*u)).any(|u| {
                                u.unit_type == UnitType::Pds && u.owner != active_player
                            })
                        })
                        .unwrap_or(false)
                })
            })
            .unwrap_or(false)
    })
}

/// Step 5a: bombardment possibility requires at least one planet in the
/// system AND at least one friendly unit with the bombardment ability
/// (§4.3 step 5).
pub fn bombardment_possible(state: &GameState, system: SystemId, player: PlayerId, has_bombardment: impl Fn(UnitId) -> bool) -> bool {
    let Some(sys) = state.galaxy.system(system) else { return false };
    if sys.planets.is_empty() {
        return false;
    }
    sys.ships
        .iter()
        .filter_map(|u| state.unit(*u))
        .filter(|u| u.owner == player)
        .any(|u| has_bombardment(u.id))
}

/// Step 6: production. Any friendly production-capable unit in the
/// system produces up to its limit; a blockaded unit cannot build ships
/// but may still build ground forces (§4.3 step 6, §3 Blockade invariant).
pub fn can_produce_ships(state: &GameState, structure: UnitId) -> bool {
    !state.is_blockaded(structure)
}

pub fn can_produce_ground_forces(_state: &GameState, _structure: UnitId) -> bool {
    true
}

/// Step 4: space combat. Resolves only if the active system holds ships
/// from more than one player; the active player is always the attacker, the
/// first other owner present is the defender (§4.4 Defender identification
/// — multi-defender space combats are out of scope, see
/// `combat::single_defender`). No persistent stat ledger exists yet, so
/// combat stats are computed with no modifiers (§9 Open Question).
pub fn resolve_space_combat_in_system(
    state: &GameState,
    system: SystemId,
    active_player: PlayerId,
    rng: &mut dyn Rng,
) -> Option<(GameState, CombatOutcome)> {
    let sys = state.galaxy.system(system)?;
    let owners: HashSet<PlayerId> = sys.ships.iter().filter_map(|u| state.unit(*u)).map(|u| u.owner).collect();
    if owners.len() < 2 {
        return None;
    }
    let defender = *owners.iter().find(|&&p| p != active_player)?;

    let mut attacker_units: Vec<(Unit, UnitStats)> = sys
        .ships
        .iter()
        .filter_map(|u| state.unit(*u))
        .filter(|u| u.owner == active_player)
        .map(|u| (*u, compute_stats(u.unit_type, &[])))
        .collect();
    let mut defender_units: Vec<(Unit, UnitStats)> = sys
        .ships
        .iter()
        .filter_map(|u| state.unit(*u))
        .filter(|u| u.owner == defender)
        .map(|u| (*u, compute_stats(u.unit_type, &[])))
        .collect();

    let outcome = resolve_space_combat(active_player, &mut attacker_units, defender, &mut defender_units, rng);

    let mut new_state = state.clone();
    for id in &outcome.destroyed {
        if let Some(s) = new_state.galaxy.system_mut(system) {
            s.ships.retain(|u| u != id);
        }
        new_state.remove_unit(*id);
    }
    for id in &outcome.damaged {
        if let Some(u) = new_state.unit_mut(*id) {
            u.sustained_damage = true;
        }
    }
    Some((new_state, outcome))
}

/// Step 5: invasion of a single planet. Committed units land first, then
/// ground combat resolves if the planet carries an enemy garrison;
/// destroyed attacker units are returned to supply, destroyed defender
/// units are captured by the attacker rather than destroyed outright (§4.4
/// capture). An uncontested landing (no defending garrison) transfers
/// control with no combat.
pub fn resolve_invasion(
    state: &GameState,
    planet: PlanetId,
    attacker: PlayerId,
    orders: &InvasionOrders,
    rng: &mut dyn Rng,
) -> Option<(GameState, CombatOutcome)> {
    let mut new_state = state.clone();
    let garrison: Vec<UnitId> = new_state.galaxy.planet(planet)?.ground_forces().to_vec();
    let defender = garrison.iter().filter_map(|u| new_state.unit(*u)).map(|u| u.owner).find(|&o| o != attacker);

    for &unit in &orders.committed {
        if let Some(pl) = new_state.galaxy.planet_mut(planet) {
            pl.add_ground_force(unit, attacker);
        }
    }

    let Some(defender) = defender else {
        new_state.galaxy.planet_mut(planet).unwrap().set_control(Some(attacker));
        return Some((
            new_state,
            CombatOutcome { rounds: 0, winner: CombatWinner::Player(attacker), destroyed: Vec::new(), damaged: Vec::new() },
        ));
    };

    let mut attacker_units: Vec<(Unit, UnitStats)> = orders
        .committed
        .iter()
        .filter_map(|u| new_state.unit(*u))
        .map(|u| (*u, compute_stats(u.unit_type, &[])))
        .collect();
    let mut defender_units: Vec<(Unit, UnitStats)> = garrison
        .iter()
        .filter_map(|u| new_state.unit(*u))
        .filter(|u| u.owner == defender)
        .map(|u| (*u, compute_stats(u.unit_type, &[])))
        .collect();

    let outcome = resolve_ground_combat(attacker, &mut attacker_units, defender, &mut defender_units, rng);

    for id in &outcome.destroyed {
        let owner = new_state.unit(*id).map(|u| u.owner);
        if let Some(pl) = new_state.galaxy.planet_mut(planet) {
            pl.remove_ground_force(*id);
        }
        if owner == Some(defender) {
            capture_unit(&mut new_state, attacker, *id);
        } else {
            new_state.remove_unit(*id);
        }
    }
    for id in &outcome.damaged {
        if let Some(u) = new_state.unit_mut(*id) {
            u.sustained_damage = true;
        }
    }

    if outcome.winner == CombatWinner::Player(attacker) {
        new_state.galaxy.planet_mut(planet).unwrap().set_control(Some(attacker));
    }

    Some((new_state, outcome))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::galaxy::Galaxy;
    use crate::hex::HexCoord;
    use crate::planet::Planet;
    use crate::player::Player;
    use crate::rng::ScriptedRng;

    fn two_system_state() -> (GameState, SystemId, SystemId) {
        let players = vec![Player::new(PlayerId(0), "p1", 3), Player::new(PlayerId(1), "p2", 3)];
        let mut galaxy = Galaxy::new();
        galaxy.place_system(SystemId(1), HexCoord::new(0, 0));
        galaxy.place_system(SystemId(2), HexCoord::new(1, 0));
        (GameState::new(players, galaxy, 2), SystemId(1), SystemId(2))
    }

    #[test]
    fn blockaded_dock_cannot_produce_ships_but_can_produce_ground_forces_scenario_c() {
        let (mut state, sys, _) = two_system_state();
        let dock = Unit::new(UnitType::SpaceDock, PlayerId(0));
        let dock_id = dock.id;
        state.insert_unit(dock);
        let mut planet = Planet::new(crate::ids::PlanetId(1), "A", 2, 1);
        planet.add_ground_force(dock_id, PlayerId(0));
        state.galaxy.add_planet(sys, planet);

        let enemy = Unit::new(UnitType::Destroyer, PlayerId(1));
        state.galaxy.system_mut(sys).unwrap().ships.push(enemy.id);
        state.insert_unit(enemy);

        assert!(!can_produce_ships(&state, dock_id));
        assert!(can_produce_ground_forces(&state, dock_id));
    }

    #[test]
    fn movement_rejects_unowned_unit() {
        let (state, sys, to) = two_system_state();
        let mut state = state;
        let unit = Unit::new(UnitType::Cruiser, PlayerId(1));
        state.galaxy.system_mut(sys).unwrap().ships.push(unit.id);
        let unit_id = unit.id;
        state.insert_unit(unit);

        let plan = MovementPlan { moves: vec![UnitMove { unit: unit_id, from: sys, to }] };
        let err = execute_movement(&state, PlayerId(0), &plan, |_| 2, |_| 0).unwrap_err();
        assert_eq!(err, TacticalActionError::UnitNotOwned { unit: unit_id, player: PlayerId(0) });
    }

    #[test]
    fn movement_moves_unit_between_adjacent_systems() {
        let (state, sys, to) = two_system_state();
        let mut state = state;
        let unit = Unit::new(UnitType::Cruiser, PlayerId(0));
        state.galaxy.system_mut(sys).unwrap().ships.push(unit.id);
        let unit_id = unit.id;
        state.insert_unit(unit);

        let plan = MovementPlan { moves: vec![UnitMove { unit: unit_id, from: sys, to }] };
        let new_state = execute_movement(&state, PlayerId(0), &plan, |_| 2, |_| 0).unwrap();
        assert!(new_state.galaxy.system(to).unwrap().ships.contains(&unit_id));
        assert!(!new_state.galaxy.system(sys).unwrap().ships.contains(&unit_id));
    }

    #[test]
    fn space_combat_resolves_only_with_two_owners_present() {
        let (mut state, sys, _) = two_system_state();
        let mine = Unit::new(UnitType::Cruiser, PlayerId(0));
        state.galaxy.system_mut(sys).unwrap().ships.push(mine.id);
        state.insert_unit(mine);

        let mut rng = ScriptedRng::new([1, 1]);
        assert!(resolve_space_combat_in_system(&state, sys, PlayerId(0), &mut rng).is_none());

        let theirs = Unit::new(UnitType::Destroyer, PlayerId(1));
        state.galaxy.system_mut(sys).unwrap().ships.push(theirs.id);
        state.insert_unit(theirs);

        // First two rolls are the defending destroyer's anti-fighter
        // barrage (no fighters present, so they land no hits regardless);
        // the third is the attacking cruiser's combat roll (hits at >=7),
        // the fourth is the destroyer's (misses at <9).
        let mut rng = ScriptedRng::new([9, 9, 9, 1]);
        let (new_state, outcome) = resolve_space_combat_in_system(&state, sys, PlayerId(0), &mut rng).unwrap();
        assert_eq!(outcome.winner, CombatWinner::Player(PlayerId(0)));
        assert!(new_state.unit(theirs.id).is_none());
    }

    #[test]
    fn uncontested_invasion_transfers_control_with_no_combat() {
        let (mut state, sys, _) = two_system_state();
        let planet = crate::ids::PlanetId(1);
        state.galaxy.add_planet(sys, Planet::new(planet, "A", 2, 1));

        let infantry = Unit::new(UnitType::Infantry, PlayerId(0));
        let infantry_id = infantry.id;
        state.insert_unit(infantry);

        let orders = InvasionOrders { planet, committed: vec![infantry_id] };
        let mut rng = ScriptedRng::new([]);
        let (new_state, outcome) = resolve_invasion(&state, planet, PlayerId(0), &orders, &mut rng).unwrap();
        assert_eq!(outcome.winner, CombatWinner::Player(PlayerId(0)));
        assert_eq!(new_state.galaxy.planet(planet).unwrap().controlled_by(), Some(PlayerId(0)));
    }

    #[test]
    fn invasion_defeat_captures_the_defending_garrison() {
        let (mut state, sys, _) = two_system_state();
        let planet = crate::ids::PlanetId(1);
        let mut p = Planet::new(planet, "A", 2, 1);
        let defender = Unit::new(UnitType::Infantry, PlayerId(1));
        let defender_id = defender.id;
        p.add_ground_force(defender_id, PlayerId(1));
        state.galaxy.add_planet(sys, p);
        state.insert_unit(defender);

        let attacker_mech = Unit::new(UnitType::Mech, PlayerId(0));
        let attacker_id = attacker_mech.id;
        state.insert_unit(attacker_mech);

        let orders = InvasionOrders { planet, committed: vec![attacker_id] };
        // Attacker rolls a hit first, defender (infantry, a token) misses.
        let mut rng = ScriptedRng::new([9, 1]);
        let (new_state, outcome) = resolve_invasion(&state, planet, PlayerId(0), &orders, &mut rng).unwrap();
        assert_eq!(outcome.winner, CombatWinner::Player(PlayerId(0)));
        // Infantry is a token: capture returns it to the shared supply.
        assert!(new_state.unit(defender_id).is_none());
        assert_eq!(new_state.galaxy.planet(planet).unwrap().controlled_by(), Some(PlayerId(0)));
    }
}
