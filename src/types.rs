//! Primitive enums shared across the engine (L0 in the layering table).

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

/// The eight strategy card identities; the discriminant doubles as the
/// card's initiative number (§4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum StrategyCard {
    Leadership = 1,
    Diplomacy = 2,
    Politics = 3,
    Construction = 4,
    Trade = 5,
    Warfare = 6,
    Technology = 7,
    Imperial = 8,
}

impl StrategyCard {
    pub const ALL: [StrategyCard; 8] = [
        StrategyCard::Leadership,
        StrategyCard::Diplomacy,
        StrategyCard::Politics,
        StrategyCard::Construction,
        StrategyCard::Trade,
        StrategyCard::Warfare,
        StrategyCard::Technology,
        StrategyCard::Imperial,
    ];

    pub fn initiative(self) -> u8 {
        self as u8
    }
}

/// Wormhole token types. Only like matches adjacency (alpha↔alpha, etc).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum WormholeType {
    Alpha,
    Beta,
    Gamma,
    Delta,
}

/// The four exploration card traits (§4.2 "exploration decks (four traits)").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum PlanetTrait {
    Cultural,
    Industrial,
    Hazardous,
    Frontier,
}

/// Technology color/prerequisite category, used by `has_technology_of_color`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum TechColor {
    Biotic,
    Propulsion,
    Cybernetic,
    Warfare,
    Unit,
}

/// Unit types. Fighters and infantry are "tokens" drawn from a shared
/// supply rather than faction-specific models (§3 capture integrity).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum UnitType {
    Fighter,
    Infantry,
    Cruiser,
    Destroyer,
    Carrier,
    Dreadnought,
    Warsun,
    Flagship,
    Pds,
    SpaceDock,
    Mech,
}

impl UnitType {
    /// Ground forces occupy planets, not the space area.
    pub fn is_ground_force(self) -> bool {
        matches!(self, UnitType::Infantry | UnitType::Mech)
    }

    pub fn is_ship(self) -> bool {
        !self.is_ground_force() && !matches!(self, UnitType::Pds | UnitType::SpaceDock)
    }

    pub fn is_structure(self) -> bool {
        matches!(self, UnitType::Pds | UnitType::SpaceDock)
    }

    /// Fighters and infantry are fungible tokens drawn from the shared
    /// supply rather than faction-unique models; capture of these returns
    /// to the supply instead of the capturing player's sheet (§3).
    pub fn is_token(self) -> bool {
        matches!(self, UnitType::Fighter | UnitType::Infantry)
    }

    pub fn base_production_capacity(self) -> Option<u32> {
        match self {
            UnitType::SpaceDock => Some(u32::MAX),
            UnitType::Carrier | UnitType::Cruiser => None,
            _ => None,
        }
    }
}

/// The eight phases of a round (§2, L7 Phase controller).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum Phase {
    Strategy,
    Action,
    StatusReady,
    StatusEffects,
    AgendaFirst,
    AgendaSecond,
    AgendaReady,
    Completed,
}

/// A single ability timing window (§3 Ability).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum TimingWindow {
    Cannot,
    When,
    Before,
    Action,
    After,
    StartOfTurn,
    EndOfTurn,
    StartOfPhase,
    EndOfPhase,
}

/// How often an ability may fire for a given triggering identity (§4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum Frequency {
    OncePerTrigger,
    Unlimited,
}
