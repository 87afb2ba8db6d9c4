//! Player elimination (§4.8).

use crate::game_state::GameState;
use crate::ids::PlayerId;

/// Eliminates `player`: removes their units, discards their agenda-facing
/// state, returns held strategy cards to the pool, passes the speaker
/// token if held, revokes Alliance grants they issued, and returns
/// captured units to original owners (§4.8).
///
/// Returns the new state, or `None` if `player` does not meet the
/// elimination condition (§4.8: zero ground forces, zero production
/// units, and zero controlled planets).
pub fn eliminate(state: &GameState, player: PlayerId) -> Option<GameState> {
    if !state.meets_elimination_condition(player) {
        return None;
    }

    let mut new_state = state.clone();

    // Captured-unit relationships: `units_captured_by` lives on the
    // capturing player, so if `player` is the capturer, every unit it holds
    // this way returns to its original owner *before* the owned-units purge
    // below, or it would be destroyed as if it were still `player`'s own
    // (§4.4/§4.8).
    let captured = new_state.player_mut(player).map(|p| std::mem::take(&mut p.units_captured_by)).unwrap_or_default();
    for (original_owner, unit_ids) in captured {
        for uid in unit_ids {
            if let Some(u) = new_state.unit_mut(uid) {
                u.owner = original_owner;
                u.captured = false;
            }
        }
    }

    let owned_units: Vec<_> = new_state
        .units
        .values()
        .filter(|u| u.owner == player)
        .map(|u| u.id)
        .collect();
    for id in owned_units {
        new_state.remove_unit(id);
    }

    new_state.strategy_cards.release_all(player);

    if new_state.speaker == player {
        if let Some(next) = new_state.players.iter().find(|p| p.id != player && !p.eliminated) {
            new_state.speaker = next.id;
        }
    }

    new_state.promissory.revoke_all_grants_from(player);

    if let Some(p) = new_state.player_mut(player) {
        p.eliminated = true;
    }

    new_state.players.retain(|p| p.id != player);

    new_state.log(crate::game_event::LogPayload::PlayerEliminated { player });

    Some(new_state)
}
