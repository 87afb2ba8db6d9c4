//! Strategy card coordinator (§4.5, L5 in the layering table).

use std::collections::HashMap;

use crate::ids::PlayerId;
use crate::types::StrategyCard;

/// Whether a card is currently usable for a strategic action (§3 Strategy
/// card assignment invariant 4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardState {
    Readied,
    Exhausted,
}

/// Per-card evaluation data exposed to AI/UI callers (§4.5 "AI information
/// surface"). The engine never chooses; it only reports.
#[derive(Debug, Clone, Copy)]
pub struct CardEvaluation {
    pub card: StrategyCard,
    pub owner: Option<PlayerId>,
    pub state: Option<CardState>,
    pub available: bool,
    pub initiative: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrategyCardError {
    AlreadyOwned { card: StrategyCard, by: PlayerId },
    NotOwned { card: StrategyCard, player: PlayerId },
    AlreadyExhausted { card: StrategyCard },
    PerPlayerLimitExceeded { player: PlayerId, limit: u8 },
}

impl std::fmt::Display for StrategyCardError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StrategyCardError::AlreadyOwned { card, by } => {
                write!(f, "{:?} is already owned by {:?}", card, by)
            }
            StrategyCardError::NotOwned { card, player } => {
                write!(f, "{:?} is not owned by {:?}", card, player)
            }
            StrategyCardError::AlreadyExhausted { card } => write!(f, "{:?} is already exhausted", card),
            StrategyCardError::PerPlayerLimitExceeded { player, limit } => {
                write!(f, "{:?} may not hold more than {} strategy cards", player, limit)
            }
        }
    }
}

impl std::error::Error for StrategyCardError {}

/// Owns the lifecycle of the eight strategy cards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyCardCoordinator {
    owners: HashMap<StrategyCard, PlayerId>,
    states: HashMap<StrategyCard, CardState>,
    /// Per-player card limit: 2 if the game started with ≤4 players, 1 if
    /// it started with ≥5 (rule 33.9 freezes this at setup, independent of
    /// later eliminations).
    per_player_limit: u8,
}

impl StrategyCardCoordinator {
    pub fn new(starting_player_count: u8) -> Self {
        Self {
            owners: HashMap::new(),
            states: HashMap::new(),
            per_player_limit: if starting_player_count >= 5 { 1 } else { 2 },
        }
    }

    pub fn owner(&self, card: StrategyCard) -> Option<PlayerId> {
        self.owners.get(&card).copied()
    }

    pub fn state(&self, card: StrategyCard) -> Option<CardState> {
        self.states.get(&card).copied()
    }

    pub fn cards_owned_by(&self, player: PlayerId) -> Vec<StrategyCard> {
        self.owners
            .iter()
            .filter(|(_, &owner)| owner == player)
            .map(|(&c, _)| c)
            .collect()
    }

    /// Selection: assigns a readied card to a player. Enforces the
    /// exclusivity invariant (§3) and the per-player limit (§4.5, §8
    /// scenario f / rule 33.9).
    pub fn select(&mut self, player: PlayerId, card: StrategyCard) -> Result<(), StrategyCardError> {
        if let Some(owner) = self.owners.get(&card) {
            return Err(StrategyCardError::AlreadyOwned { card, by: *owner });
        }
        let currently_held = self.cards_owned_by(player).len() as u8;
        if currently_held >= self.per_player_limit {
            return Err(StrategyCardError::PerPlayerLimitExceeded { player, limit: self.per_player_limit });
        }
        self.owners.insert(card, player);
        self.states.insert(card, CardState::Readied);
        Ok(())
    }

    pub fn exhaust(&mut self, player: PlayerId, card: StrategyCard) -> Result<(), StrategyCardError> {
        match self.owners.get(&card) {
            Some(&owner) if owner == player => {}
            Some(&owner) => return Err(StrategyCardError::NotOwned { card, player: owner }),
            None => return Err(StrategyCardError::NotOwned { card, player }),
        }
        if self.states.get(&card) == Some(&CardState::Exhausted) {
            return Err(StrategyCardError::AlreadyExhausted { card });
        }
        self.states.insert(card, CardState::Exhausted);
        Ok(())
    }

    /// Readies every card, called at the start of each round (§4.5
    /// Lifecycle). Idempotent: calling twice with no intervening exhausts
    /// is a no-op the second time (§8 round-trip property).
    pub fn ready_all(&mut self) {
        for state in self.states.values_mut() {
            *state = CardState::Readied;
        }
    }

    pub fn player_has_readied_card(&self, player: PlayerId) -> bool {
        self.owners
            .iter()
            .any(|(card, &owner)| owner == player && self.states.get(card) == Some(&CardState::Readied))
    }

    /// Returns every card a player holds to the common pool (§4.5
    /// Elimination reassignment).
    pub fn release_all(&mut self, player: PlayerId) {
        let held: Vec<StrategyCard> = self.cards_owned_by(player);
        for card in held {
            self.owners.remove(&card);
            self.states.remove(&card);
        }
    }

    /// All cards with current owner/state/initiative, for AI/UI callers.
    pub fn evaluations(&self) -> Vec<CardEvaluation> {
        StrategyCard::ALL
            .iter()
            .map(|&card| CardEvaluation {
                card,
                owner: self.owner(card),
                state: self.state(card),
                available: self.owner(card).is_none(),
                initiative: card.initiative(),
            })
            .collect()
    }

    /// Players in initiative order among those who own a readied card.
    pub fn initiative_order(&self) -> Vec<(PlayerId, StrategyCard)> {
        let mut owned: Vec<(StrategyCard, PlayerId)> =
            self.owners.iter().map(|(&c, &p)| (c, p)).collect();
        owned.sort_by_key(|(c, _)| c.initiative());
        owned.into_iter().map(|(c, p)| (p, c)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_33_9_limit_persists_after_elimination() {
        // §8 scenario (f): game starts with 5 players, limit stays 1 even
        // after a player is eliminated and the live count drops to 4.
        let mut coord = StrategyCardCoordinator::new(5);
        let p1 = PlayerId(0);
        coord.select(p1, StrategyCard::Leadership).unwrap();
        let err = coord.select(p1, StrategyCard::Diplomacy).unwrap_err();
        assert_eq!(err, StrategyCardError::PerPlayerLimitExceeded { player: p1, limit: 1 });
    }

    #[test]
    fn card_exclusivity() {
        let mut coord = StrategyCardCoordinator::new(4);
        coord.select(PlayerId(0), StrategyCard::Trade).unwrap();
        let err = coord.select(PlayerId(1), StrategyCard::Trade).unwrap_err();
        assert_eq!(err, StrategyCardError::AlreadyOwned { card: StrategyCard::Trade, by: PlayerId(0) });
    }

    #[test]
    fn ready_all_is_idempotent() {
        let mut coord = StrategyCardCoordinator::new(4);
        coord.select(PlayerId(0), StrategyCard::Trade).unwrap();
        coord.exhaust(PlayerId(0), StrategyCard::Trade).unwrap();
        coord.ready_all();
        assert_eq!(coord.state(StrategyCard::Trade), Some(CardState::Readied));
        coord.ready_all();
        assert_eq!(coord.state(StrategyCard::Trade), Some(CardState::Readied));
    }
}
