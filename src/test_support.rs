//! Test-only scaffolding for assembling ad hoc game states (SPEC_FULL.md
//! §A "Testing"). Not part of the public API surface a host program should
//! depend on; gated behind `cfg(test)` / the `test-support` feature so
//! other crates in a workspace can reuse it for their own integration
//! tests.

use crate::galaxy::Galaxy;
use crate::game_state::GameState;
use crate::hex::HexCoord;
use crate::ids::{PlanetId, PlayerId, SystemId};
use crate::planet::Planet;
use crate::player::Player;
use crate::unit::Unit;

/// Builds a `GameState` incrementally for tests, mirroring the teacher's
/// builder-style test fixtures rather than hand-assembling every field.
#[derive(Default)]
pub struct GameStateBuilder {
    players: Vec<Player>,
    galaxy: Galaxy,
    pending_units: Vec<(SystemId, Unit)>,
    starting_player_count: u8,
}

impl GameStateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_player(mut self, id: PlayerId, faction: &str, commodity_value: u32) -> Self {
        self.players.push(Player::new(id, faction, commodity_value));
        self.starting_player_count = self.players.len() as u8;
        self
    }

    pub fn with_system(mut self, id: SystemId, coord: HexCoord) -> Self {
        self.galaxy.place_system(id, coord);
        self
    }

    pub fn with_planet(mut self, system: SystemId, id: PlanetId, name: &str, resources: u32, influence: u32) -> Self {
        self.galaxy.add_planet(system, Planet::new(id, name, resources, influence));
        self
    }

    /// Places a ship unit for `owner` in `system`; the unit is inserted into
    /// the final state's unit table and pushed onto the system's ship list.
    pub fn with_ship(mut self, system: SystemId, owner: PlayerId, unit_type: crate::types::UnitType) -> Self {
        self.pending_units.push((system, Unit::new(unit_type, owner)));
        self
    }

    pub fn build(self) -> GameState {
        let mut state = GameState::new(self.players, self.galaxy, self.starting_player_count.max(1));
        for (system, unit) in self.pending_units {
            let id = unit.id;
            state.insert_unit(unit);
            if let Some(sys) = state.galaxy.system_mut(system) {
                sys.ships.push(id);
            }
        }
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_assembles_a_minimal_two_player_state() {
        let state = GameStateBuilder::new()
            .with_player(PlayerId(0), "arborec", 3)
            .with_player(PlayerId(1), "jolnar", 4)
            .with_system(SystemId(1), HexCoord::new(0, 0))
            .with_ship(SystemId(1), PlayerId(0), crate::types::UnitType::Cruiser)
            .build();

        assert_eq!(state.players.len(), 2);
        assert_eq!(state.galaxy.system(SystemId(1)).unwrap().ships.len(), 1);
    }
}
