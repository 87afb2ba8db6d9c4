//! Galaxy topology: systems placed on the hex grid, physical and wormhole
//! adjacency, and topological queries (L1 in the layering table).
//!
//! Modeled as an arena keyed by `SystemId` with coordinate-based adjacency
//! rather than owning pointers between systems, since physical and wormhole
//! adjacency can form cycles (§9 "Graph cycles in Galaxy adjacency").

use std::collections::HashMap;

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

use crate::hex::HexCoord;
use crate::ids::{PlanetId, SystemId, UnitId};
use crate::planet::Planet;
use crate::types::WormholeType;

/// A system on the galaxy grid.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct System {
    pub id: SystemId,
    pub coord: HexCoord,
    pub planets: Vec<PlanetId>,
    pub ships: Vec<UnitId>,
    pub wormholes: Vec<WormholeType>,
    pub frontier_token: bool,
}

impl System {
    pub fn new(id: SystemId, coord: HexCoord) -> Self {
        Self {
            id,
            coord,
            planets: Vec::new(),
            ships: Vec::new(),
            wormholes: Vec::new(),
            frontier_token: false,
        }
    }
}

/// The galaxy: a coordinate-indexed arena of systems plus the planet arena.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Galaxy {
    systems: HashMap<SystemId, System>,
    coord_index: HashMap<HexCoord, SystemId>,
    planets: HashMap<PlanetId, Planet>,
}

impl Galaxy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn place_system(&mut self, id: SystemId, coord: HexCoord) {
        self.coord_index.insert(coord, id);
        self.systems.insert(id, System::new(id, coord));
    }

    pub fn add_planet(&mut self, system: SystemId, planet: Planet) {
        let pid = planet.id;
        self.planets.insert(pid, planet);
        if let Some(sys) = self.systems.get_mut(&system) {
            sys.planets.push(pid);
        }
    }

    pub fn system(&self, id: SystemId) -> Option<&System> {
        self.systems.get(&id)
    }

    pub fn system_mut(&mut self, id: SystemId) -> Option<&mut System> {
        self.systems.get_mut(&id)
    }

    pub fn system_at(&self, coord: HexCoord) -> Option<SystemId> {
        self.coord_index.get(&coord).copied()
    }

    pub fn planet(&self, id: PlanetId) -> Option<&Planet> {
        self.planets.get(&id)
    }

    pub fn planet_mut(&mut self, id: PlanetId) -> Option<&mut Planet> {
        self.planets.get_mut(&id)
    }

    pub fn planets_iter(&self) -> impl Iterator<Item = &Planet> {
        self.planets.values()
    }

    pub fn planets_iter_mut(&mut self) -> impl Iterator<Item = &mut Planet> {
        self.planets.values_mut()
    }

    /// Readies every exhausted planet (§4.7: agenda phase cleanup readies
    /// all planets once the round's agendas are resolved).
    pub fn ready_all_planets(&mut self) {
        for planet in self.planets.values_mut() {
            planet.ready();
        }
    }

    pub fn system_containing_planet(&self, planet: PlanetId) -> Option<SystemId> {
        self.systems
            .values()
            .find(|s| s.planets.contains(&planet))
            .map(|s| s.id)
    }

    /// Two systems are adjacent iff their coordinates are hex-neighbors, or
    /// both carry a matching wormhole type (§3 Galaxy).
    pub fn are_adjacent(&self, a: SystemId, b: SystemId) -> bool {
        if a == b {
            return false;
        }
        let (Some(sa), Some(sb)) = (self.systems.get(&a), self.systems.get(&b)) else {
            return false;
        };
        if sa.coord.is_neighbor_of(sb.coord) {
            return true;
        }
        sa.wormholes.iter().any(|w| sb.wormholes.contains(w))
    }

    pub fn adjacent_systems(&self, of: SystemId) -> Vec<SystemId> {
        self.systems
            .keys()
            .copied()
            .filter(|&other| self.are_adjacent(of, other))
            .collect()
    }

    pub fn systems_iter(&self) -> impl Iterator<Item = &System> {
        self.systems.values()
    }
}
