//! Unit capture (§4.4 ground combat consequence): a non-token unit
//! destroyed while on the losing side of ground combat becomes the
//! winner's, tracked against its original owner so it can be returned if
//! the capturing player is later eliminated (§5 elimination cleanup).
//!
//! Capture is wired from ground combat only — space combat losses are
//! destroyed outright (§9 Open Question: no card or ability in this
//! engine currently grants space-combat capture, so generalizing the rule
//! to every ground-combat loss rather than gating it per-ability is the
//! simplest faithful reading of the mechanic).

use crate::game_state::GameState;
use crate::ids::{PlayerId, UnitId};

/// Transfers `unit_id` to `capturer`, recording it against the unit's
/// original owner. Token units (fighters, infantry) have no capture rule
/// and are simply returned to supply (§4.4).
pub fn capture_unit(state: &mut GameState, capturer: PlayerId, unit_id: UnitId) {
    let Some(unit) = state.unit(unit_id).copied() else {
        return;
    };
    if unit.unit_type.is_token() {
        state.remove_unit(unit_id);
        return;
    }

    let original_owner = unit.owner;
    if let Some(u) = state.unit_mut(unit_id) {
        u.captured = true;
        u.owner = capturer;
    }
    if let Some(p) = state.player_mut(capturer) {
        p.units_captured_by.entry(original_owner).or_default().push(unit_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::galaxy::Galaxy;
    use crate::player::Player;
    use crate::types::UnitType;
    use crate::unit::Unit;

    fn two_player_state() -> GameState {
        let p1 = Player::new(PlayerId(0), "p1", 3);
        let p2 = Player::new(PlayerId(1), "p2", 3);
        GameState::new(vec![p1, p2], Galaxy::new(), 2)
    }

    #[test]
    fn capturing_a_ground_force_transfers_ownership_and_records_original_owner() {
        let mut state = two_player_state();
        let unit = Unit::new(UnitType::Mech, PlayerId(1));
        let unit_id = unit.id;
        state.insert_unit(unit);

        capture_unit(&mut state, PlayerId(0), unit_id);

        let captured = state.unit(unit_id).unwrap();
        assert_eq!(captured.owner, PlayerId(0));
        assert!(captured.captured);
        assert_eq!(state.player(PlayerId(0)).unwrap().units_captured_by.get(&PlayerId(1)), Some(&vec![unit_id]));
    }

    #[test]
    fn capturing_a_token_unit_returns_it_to_supply_instead() {
        let mut state = two_player_state();
        let unit = Unit::new(UnitType::Infantry, PlayerId(1));
        let unit_id = unit.id;
        state.insert_unit(unit);

        capture_unit(&mut state, PlayerId(0), unit_id);

        assert!(state.unit(unit_id).is_none());
        assert!(state.player(PlayerId(0)).unwrap().units_captured_by.is_empty());
    }
}
