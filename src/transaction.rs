//! Transaction manager (§4.2, L5 in the layering table): mediates
//! player-to-player component exchanges with strict atomicity.

use crate::game_state::GameState;
use crate::ids::{NoteId, PlayerId, TransactionId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResourceBundle {
    pub trade_goods: u32,
    pub commodities: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TransactionOffer {
    pub resources: ResourceBundle,
    pub promissory_notes: Vec<NoteId>,
    pub relic_fragments: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStatus {
    Pending,
    Accepted,
    Rejected,
    Cancelled,
}

/// A bilateral exchange of trade goods, commodities, and/or promissory
/// notes between neighbor players (§3 ComponentTransaction).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentTransaction {
    pub id: TransactionId,
    pub proposer: PlayerId,
    pub target: PlayerId,
    pub offer: TransactionOffer,
    pub request: TransactionOffer,
    pub status: TransactionStatus,
    pub proposed_at_round: u32,
    pub completed_at_round: Option<u32>,
}

impl ComponentTransaction {
    /// The inverse bundle (offer and request swapped), used by the
    /// rollback round-trip property in §8.
    pub fn inverted(&self) -> TransactionOffer {
        self.request.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionError {
    InsufficientTradeGoods { player: PlayerId, requested: u32 },
    InsufficientCommodities { player: PlayerId, requested: u32 },
    PromissoryNoteNotOwned { player: PlayerId, note: NoteId },
    NotNeighbors { p1: PlayerId, p2: PlayerId },
    DuplicateTransactionId { id: TransactionId },
    UnknownTransaction { id: TransactionId },
    NotPending { id: TransactionId },
    InvalidGameState(String),
}

impl std::fmt::Display for TransactionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionError::InsufficientTradeGoods { player, requested } => {
                write!(f, "player {:?} does not have {} trade goods", player, requested)
            }
            TransactionError::InsufficientCommodities { player, requested } => {
                write!(f, "player {:?} does not have {} commodities", player, requested)
            }
            TransactionError::PromissoryNoteNotOwned { player, note } => {
                write!(f, "player {:?} does not own promissory note {:?}", player, note)
            }
            TransactionError::NotNeighbors { p1, p2 } => write!(f, "{:?} and {:?} are not neighbors", p1, p2),
            TransactionError::DuplicateTransactionId { id } => write!(f, "transaction id {:?} already exists", id),
            TransactionError::UnknownTransaction { id } => write!(f, "no pending transaction {:?}", id),
            TransactionError::NotPending { id } => write!(f, "transaction {:?} is not pending", id),
            TransactionError::InvalidGameState(msg) => write!(f, "invalid resulting game state: {msg}"),
        }
    }
}

impl std::error::Error for TransactionError {}

/// Determines whether two players may currently propose a transaction:
/// same system or adjacent (physical or matching-wormhole), computed
/// dynamically from galaxy/unit placement (§4.2 `can_propose`).
pub fn can_propose(state: &GameState, p1: PlayerId, p2: PlayerId) -> bool {
    if p1 == p2 {
        return false;
    }
    let systems_of = |player: PlayerId| -> Vec<crate::ids::SystemId> {
        state
            .galaxy
            .systems_iter()
            .filter(|s| s.ships.iter().filter_map(|u| state.unit(*u)).any(|u| u.owner == player))
            .map(|s| s.id)
            .collect()
    };
    let s1 = systems_of(p1);
    let s2 = systems_of(p2);
    for &a in &s1 {
        for &b in &s2 {
            if a == b || state.galaxy.are_adjacent(a, b) {
                return true;
            }
        }
    }
    false
}

fn validate_offer(state: &GameState, player: PlayerId, offer: &TransactionOffer) -> Result<(), TransactionError> {
    let p = state.player(player).ok_or(TransactionError::InvalidGameState("unknown player".into()))?;
    if p.trade_goods() < offer.resources.trade_goods {
        return Err(TransactionError::InsufficientTradeGoods { player, requested: offer.resources.trade_goods });
    }
    if p.commodities() < offer.resources.commodities {
        return Err(TransactionError::InsufficientCommodities { player, requested: offer.resources.commodities });
    }
    for &note in &offer.promissory_notes {
        if !state.promissory.owns(player, note) {
            return Err(TransactionError::PromissoryNoteNotOwned { player, note });
        }
    }
    Ok(())
}

/// Proposes a new pending transaction (§4.2 `propose`). Validates
/// nonnegativity (via the type system: `ResourceBundle` fields are `u32`),
/// the neighbor requirement, promissory-note ownership and resource
/// sufficiency, and duplicate ids (§4.2 "Duplicate-id rejection").
pub fn propose(
    state: &mut GameState,
    proposer: PlayerId,
    target: PlayerId,
    offer: TransactionOffer,
    request: TransactionOffer,
) -> Result<TransactionId, TransactionError> {
    if !can_propose(state, proposer, target) {
        return Err(TransactionError::NotNeighbors { p1: proposer, p2: target });
    }
    validate_offer(state, proposer, &offer)?;
    validate_offer(state, target, &request)?;

    let id = TransactionId::new();
    if state.pending_transactions.contains_key(&id)
        || state.transaction_history.iter().any(|t| t.id == id)
    {
        return Err(TransactionError::DuplicateTransactionId { id });
    }

    let tx = ComponentTransaction {
        id,
        proposer,
        target,
        offer,
        request,
        status: TransactionStatus::Pending,
        proposed_at_round: state.round,
        completed_at_round: None,
    };
    state.pending_transactions.insert(id, tx);
    Ok(id)
}

/// Rejects a pending transaction: safe removal, idempotent on repeat calls
/// (§8 round-trip property).
pub fn reject(state: &mut GameState, id: TransactionId) {
    state.pending_transactions.remove(&id);
}

/// Cancels a pending transaction by the proposer or target; idempotent.
pub fn cancel(state: &mut GameState, id: TransactionId, _by_player: PlayerId) {
    state.pending_transactions.remove(&id);
}

/// Accepts a pending transaction, delegating to
/// `GameState::apply_transaction_effects` (§4.2 `accept`).
pub fn accept(state: &GameState, id: TransactionId) -> Result<GameState, TransactionError> {
    state.apply_transaction_effects(id)
}

impl GameState {
    /// Atomic effect application (§4.2): deep-copy involved players and the
    /// promissory-note manager, apply resource effects (commodities convert
    /// to trade goods on crossing the ownership boundary), apply note
    /// effects, validate, then commit (remove from pending, append to
    /// history with a completion timestamp, notify observers).
    ///
    /// On any validation failure the entire draft is discarded and the
    /// original state is returned unchanged, matching §7's "no command
    /// partially commits on error."
    pub fn apply_transaction_effects(&self, id: TransactionId) -> Result<GameState, TransactionError> {
        let tx = self
            .pending_transactions
            .get(&id)
            .cloned()
            .ok_or(TransactionError::UnknownTransaction { id })?;
        if tx.status != TransactionStatus::Pending {
            return Err(TransactionError::NotPending { id });
        }

        // Step 1: deep-copy (the whole state clone already deep-copies
        // players and the promissory manager; nothing here is shared).
        let mut draft = self.clone();

        // Step 2: resource effects. Commodities received convert to trade
        // goods immediately if they would exceed the ceiling.
        {
            let proposer = draft.player_mut(tx.proposer).ok_or(TransactionError::InvalidGameState("proposer missing".into()))?;
            if !proposer.remove_trade_goods(tx.offer.resources.trade_goods) {
                return Err(TransactionError::InsufficientTradeGoods { player: tx.proposer, requested: tx.offer.resources.trade_goods });
            }
            if !proposer.remove_commodities(tx.offer.resources.commodities) {
                return Err(TransactionError::InsufficientCommodities { player: tx.proposer, requested: tx.offer.resources.commodities });
            }
        }
        {
            let target = draft.player_mut(tx.target).ok_or(TransactionError::InvalidGameState("target missing".into()))?;
            if !target.remove_trade_goods(tx.request.resources.trade_goods) {
                return Err(TransactionError::InsufficientTradeGoods { player: tx.target, requested: tx.request.resources.trade_goods });
            }
            if !target.remove_commodities(tx.request.resources.commodities) {
                return Err(TransactionError::InsufficientCommodities { player: tx.target, requested: tx.request.resources.commodities });
            }
        }
        draft.player_mut(tx.target).unwrap().add_trade_goods(tx.offer.resources.trade_goods);
        draft.player_mut(tx.target).unwrap().add_commodities(tx.offer.resources.commodities);
        draft.player_mut(tx.proposer).unwrap().add_trade_goods(tx.request.resources.trade_goods);
        draft.player_mut(tx.proposer).unwrap().add_commodities(tx.request.resources.commodities);

        // Step 3: promissory-note effects.
        for &note in &tx.offer.promissory_notes {
            draft.promissory.transfer(note, tx.proposer, tx.target);
        }
        for &note in &tx.request.promissory_notes {
            draft.promissory.transfer(note, tx.target, tx.proposer);
        }

        // Step 4: validate resulting state.
        draft.validate().map_err(|e| TransactionError::InvalidGameState(e.to_string()))?;

        // Step 5: commit.
        let mut committed = draft.pending_transactions.remove(&id).unwrap();
        committed.status = TransactionStatus::Accepted;
        committed.completed_at_round = Some(draft.round);
        draft.transaction_history.push(committed.clone());
        draft.log(crate::game_event::LogPayload::TransactionCompleted {
            id,
            from: tx.proposer,
            to: tx.target,
        });
        draft.notify_observers(&committed).map_err(|e| TransactionError::InvalidGameState(e.to_string()))?;

        Ok(draft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::galaxy::Galaxy;
    use crate::hex::HexCoord;
    use crate::ids::SystemId;
    use crate::player::Player;
    use crate::unit::Unit;
    use crate::types::UnitType;

    fn neighbor_state() -> GameState {
        let mut p1 = Player::new(PlayerId(0), "p1", 3);
        p1.add_trade_goods(5);
        let mut p2 = Player::new(PlayerId(1), "p2", 3);
        p2.add_commodities(3);

        let mut galaxy = Galaxy::new();
        galaxy.place_system(SystemId(1), HexCoord::new(0, 0));
        let mut state = GameState::new(vec![p1, p2], galaxy, 2);

        let ship1 = Unit::new(UnitType::Cruiser, PlayerId(0));
        let ship1_id = ship1.id;
        state.insert_unit(ship1);
        let ship2 = Unit::new(UnitType::Cruiser, PlayerId(1));
        let ship2_id = ship2.id;
        state.insert_unit(ship2);
        state.galaxy.system_mut(SystemId(1)).unwrap().ships.push(ship1_id);
        state.galaxy.system_mut(SystemId(1)).unwrap().ships.push(ship2_id);
        state
    }

    #[test]
    fn atomic_transaction_scenario_a() {
        let mut state = neighbor_state();
        let id = propose(
            &mut state,
            PlayerId(0),
            PlayerId(1),
            TransactionOffer { resources: ResourceBundle { trade_goods: 3, commodities: 0 }, ..Default::default() },
            TransactionOffer { resources: ResourceBundle { trade_goods: 0, commodities: 2 }, ..Default::default() },
        )
        .unwrap();

        let new_state = accept(&state, id).unwrap();
        let p1 = new_state.player(PlayerId(0)).unwrap();
        let p2 = new_state.player(PlayerId(1)).unwrap();
        assert_eq!(p1.trade_goods(), 4);
        assert_eq!(p1.commodities(), 0);
        assert_eq!(p2.trade_goods(), 3);
        assert_eq!(p2.commodities(), 1);
        assert_eq!(new_state.transaction_history.len(), 1);
        assert_eq!(new_state.pending_transactions.len(), 0);
    }

    #[test]
    fn rollback_on_invalid_scenario_b() {
        let mut state = neighbor_state();
        let id = propose(
            &mut state,
            PlayerId(0),
            PlayerId(1),
            TransactionOffer { resources: ResourceBundle { trade_goods: 10, commodities: 0 }, ..Default::default() },
            TransactionOffer::default(),
        );
        assert!(id.is_err());
        assert_eq!(state.pending_transactions.len(), 0);
    }

    #[test]
    fn boundary_zero_offer_still_deep_copies_involved_players() {
        let mut state = neighbor_state();
        let id = propose(&mut state, PlayerId(0), PlayerId(1), TransactionOffer::default(), TransactionOffer::default()).unwrap();
        let new_state = accept(&state, id).unwrap();
        assert_eq!(new_state.player(PlayerId(0)), state.player(PlayerId(0)));
    }

    #[test]
    fn non_neighbors_cannot_propose() {
        let mut p1 = Player::new(PlayerId(0), "p1", 3);
        p1.add_trade_goods(5);
        let p2 = Player::new(PlayerId(1), "p2", 3);
        let mut galaxy = Galaxy::new();
        galaxy.place_system(SystemId(1), HexCoord::new(0, 0));
        galaxy.place_system(SystemId(2), HexCoord::new(10, 10));
        let mut state = GameState::new(vec![p1, p2], galaxy, 2);
        let ship1 = Unit::new(UnitType::Cruiser, PlayerId(0));
        state.galaxy.system_mut(SystemId(1)).unwrap().ships.push(ship1.id);
        state.insert_unit(ship1);
        let ship2 = Unit::new(UnitType::Cruiser, PlayerId(1));
        state.galaxy.system_mut(SystemId(2)).unwrap().ships.push(ship2.id);
        state.insert_unit(ship2);

        let err = propose(&mut state, PlayerId(0), PlayerId(1), TransactionOffer::default(), TransactionOffer::default()).unwrap_err();
        assert_eq!(err, TransactionError::NotNeighbors { p1: PlayerId(0), p2: PlayerId(1) });
    }
}
