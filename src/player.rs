//! Player state: resources, command-token pools, technology, promissory
//! notes and leader sheet (L2 in the layering table).

use std::collections::{HashMap, HashSet};

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

use crate::ids::{NoteId, PlayerId, TechId, UnitId};
use crate::types::StrategyCard;

/// The three command-token pools (§3 Player).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct CommandPools {
    pub tactic: u32,
    pub fleet: u32,
    pub strategy: u32,
}

impl CommandPools {
    pub fn total(&self) -> u32 {
        self.tactic + self.fleet + self.strategy
    }
}

/// Lock state for a single leader slot (agent/commander/hero).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum LeaderState {
    Locked,
    Unlocked,
    /// Heroes are purged after their one-shot ability resolves.
    Purged,
}

/// A player's leader sheet: one agent, one commander, one hero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct LeaderSheet {
    pub agent: LeaderState,
    pub commander: LeaderState,
    pub hero: LeaderState,
}

impl Default for LeaderSheet {
    fn default() -> Self {
        Self {
            agent: LeaderState::Unlocked,
            commander: LeaderState::Locked,
            hero: LeaderState::Locked,
        }
    }
}

/// A player's resource and faction state.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Player {
    pub id: PlayerId,
    pub faction: String,
    trade_goods: u32,
    commodities: u32,
    pub commodity_value: u32,
    pub command_pools: CommandPools,
    pub technologies: HashSet<TechId>,
    pub promissory_hand: Vec<NoteId>,
    pub strategy_cards: HashSet<StrategyCard>,
    pub leader_sheet: LeaderSheet,
    pub relic_fragments: u32,
    /// Units captured from this player by other players, indexed by the
    /// capturing player (§3 capture integrity).
    pub units_captured_by: HashMap<PlayerId, Vec<UnitId>>,
    pub eliminated: bool,
}

impl Player {
    pub fn new(id: PlayerId, faction: impl Into<String>, commodity_value: u32) -> Self {
        Self {
            id,
            faction: faction.into(),
            trade_goods: 0,
            commodities: 0,
            commodity_value,
            command_pools: CommandPools::default(),
            technologies: HashSet::new(),
            promissory_hand: Vec::new(),
            strategy_cards: HashSet::new(),
            leader_sheet: LeaderSheet::default(),
            relic_fragments: 0,
            units_captured_by: HashMap::new(),
            eliminated: false,
        }
    }

    pub fn trade_goods(&self) -> u32 {
        self.trade_goods
    }

    pub fn commodities(&self) -> u32 {
        self.commodities
    }

    pub fn add_trade_goods(&mut self, amount: u32) {
        self.trade_goods += amount;
    }

    /// Removes `amount` trade goods. Returns `false` (no mutation) if the
    /// player does not hold enough (§3 resource nonnegativity).
    pub fn remove_trade_goods(&mut self, amount: u32) -> bool {
        if self.trade_goods < amount {
            return false;
        }
        self.trade_goods -= amount;
        true
    }

    /// Adds commodities, converting any overflow above the faction ceiling
    /// directly into trade goods (§3 commodity ceiling).
    pub fn add_commodities(&mut self, amount: u32) {
        let room = self.commodity_value.saturating_sub(self.commodities);
        let accepted = amount.min(room);
        self.commodities += accepted;
        self.trade_goods += amount - accepted;
    }

    pub fn remove_commodities(&mut self, amount: u32) -> bool {
        if self.commodities < amount {
            return false;
        }
        self.commodities -= amount;
        true
    }

    pub fn has_technology_of_color(&self, registry_colors: &HashMap<TechId, crate::types::TechColor>, color: crate::types::TechColor) -> bool {
        self.technologies
            .iter()
            .any(|t| registry_colors.get(t) == Some(&color))
    }

    pub fn is_valid(&self) -> bool {
        self.commodities <= self.commodity_value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commodities_overflow_into_trade_goods() {
        let mut p = Player::new(PlayerId(0), "arborec", 3);
        p.add_commodities(5);
        assert_eq!(p.commodities(), 3);
        assert_eq!(p.trade_goods(), 2);
    }

    #[test]
    fn cannot_remove_more_trade_goods_than_held() {
        let mut p = Player::new(PlayerId(0), "arborec", 3);
        p.add_trade_goods(2);
        assert!(!p.remove_trade_goods(3));
        assert_eq!(p.trade_goods(), 2);
    }
}
