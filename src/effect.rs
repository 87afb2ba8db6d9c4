//! Effect handler table: each `EffectKind` variant maps to a pure function
//! `(state, context) -> result` (§9 design note: dynamic dispatch by enum +
//! table). Adding a new effect family means adding an `EffectKind` variant
//! and a handler arm here, never embedding behavior in card data.

use crate::card_registry::EffectKind;
use crate::game_state::GameState;
use crate::ids::{PlanetId, PlayerId, SystemId, UnitId};

/// Context an effect handler needs beyond the game state itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct EffectContext {
    pub owner: PlayerId,
    pub system: Option<SystemId>,
    pub planet: Option<PlanetId>,
    pub unit: Option<UnitId>,
}

impl EffectContext {
    pub fn new(owner: PlayerId) -> Self {
        Self { owner, system: None, planet: None, unit: None }
    }
}

/// What an applied effect changed, for observability/testing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EffectOutcome {
    TradeGoodsGained(u32),
    CommoditiesGained(u32),
    CommandTokenGained,
    PlanetExhausted(PlanetId),
    PlanetReadied(PlanetId),
    UnitDestroyed(UnitId),
    NoOp,
}

/// Raised when an effect cannot be applied in the given context (e.g. no
/// planet supplied for a planet-targeted effect). Mandatory abilities
/// surface this as `AbilityExecutionError::NoValidTarget`; optional
/// abilities swallow it silently (§4.1 Failure mode).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectError;

pub fn apply_effect(
    effect: EffectKind,
    mut state: GameState,
    ctx: &EffectContext,
) -> Result<(GameState, EffectOutcome), EffectError> {
    match effect {
        EffectKind::GainTradeGoods => {
            let player = state.player_mut(ctx.owner).ok_or(EffectError)?;
            player.add_trade_goods(1);
            Ok((state, EffectOutcome::TradeGoodsGained(1)))
        }
        EffectKind::GainCommodities => {
            let player = state.player_mut(ctx.owner).ok_or(EffectError)?;
            player.add_commodities(1);
            Ok((state, EffectOutcome::CommoditiesGained(1)))
        }
        EffectKind::GainCommandToken => {
            let player = state.player_mut(ctx.owner).ok_or(EffectError)?;
            player.command_pools.tactic += 1;
            Ok((state, EffectOutcome::CommandTokenGained))
        }
        EffectKind::ExhaustPlanet => {
            let planet_id = ctx.planet.ok_or(EffectError)?;
            let planet = state.galaxy.planet_mut(planet_id).ok_or(EffectError)?;
            planet.exhaust();
            Ok((state, EffectOutcome::PlanetExhausted(planet_id)))
        }
        EffectKind::ReadyPlanet => {
            let planet_id = ctx.planet.ok_or(EffectError)?;
            let planet = state.galaxy.planet_mut(planet_id).ok_or(EffectError)?;
            planet.ready();
            Ok((state, EffectOutcome::PlanetReadied(planet_id)))
        }
        EffectKind::DestroyUnit | EffectKind::ReturnToSupply => {
            let unit_id = ctx.unit.ok_or(EffectError)?;
            if state.unit(unit_id).is_none() {
                return Err(EffectError);
            }
            for id in state.galaxy.systems_iter().map(|s| s.id).collect::<Vec<_>>() {
                if let Some(sys) = state.galaxy.system_mut(id) {
                    sys.ships.retain(|&u| u != unit_id);
                }
            }
            for id in state.galaxy.planets_iter().map(|p| p.id).collect::<Vec<_>>() {
                if let Some(p) = state.galaxy.planet_mut(id) {
                    p.remove_ground_force(unit_id);
                }
            }
            state.remove_unit(unit_id);
            Ok((state, EffectOutcome::UnitDestroyed(unit_id)))
        }
        EffectKind::ModifyCombatValue
        | EffectKind::ModifyMoveValue
        | EffectKind::GrantSustainDamage
        | EffectKind::PreventCombatRound
        | EffectKind::DrawActionCard => {
            // No per-unit/per-player modifier ledger or action-card hand
            // exists yet (`Unit` intentionally carries no stats of its own,
            // see unit::compute_stats); these families cannot be applied
            // for real until one is added. Mandatory abilities surface this
            // as a failed target; optional ones no-op via
            // `AbilityEngine::trigger`'s non-mandatory branch.
            Err(EffectError)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::galaxy::Galaxy;
    use crate::hex::HexCoord;
    use crate::ids::SystemId;
    use crate::player::Player;
    use crate::types::UnitType;
    use crate::unit::Unit;

    fn state_with_ship() -> (GameState, UnitId) {
        let players = vec![Player::new(PlayerId(0), "p1", 3)];
        let mut galaxy = Galaxy::new();
        galaxy.place_system(SystemId(1), HexCoord::new(0, 0));
        let mut state = GameState::new(players, galaxy, 1);
        let unit = Unit::new(UnitType::Cruiser, PlayerId(0));
        let id = unit.id;
        state.galaxy.system_mut(SystemId(1)).unwrap().ships.push(id);
        state.insert_unit(unit);
        (state, id)
    }

    #[test]
    fn destroy_unit_removes_it_from_its_system_and_the_unit_table() {
        let (state, unit_id) = state_with_ship();
        let ctx = EffectContext { owner: PlayerId(0), system: None, planet: None, unit: Some(unit_id) };
        let (new_state, outcome) = apply_effect(EffectKind::DestroyUnit, state, &ctx).unwrap();
        assert_eq!(outcome, EffectOutcome::UnitDestroyed(unit_id));
        assert!(new_state.unit(unit_id).is_none());
        assert!(!new_state.galaxy.system(SystemId(1)).unwrap().ships.contains(&unit_id));
    }

    #[test]
    fn destroy_unit_without_a_target_fails() {
        let (state, _) = state_with_ship();
        let ctx = EffectContext::new(PlayerId(0));
        assert!(apply_effect(EffectKind::DestroyUnit, state, &ctx).is_err());
    }

    #[test]
    fn unmodeled_modifier_effects_fail_honestly_instead_of_faking_success() {
        let (state, unit_id) = state_with_ship();
        let ctx = EffectContext { owner: PlayerId(0), system: None, planet: None, unit: Some(unit_id) };
        let err = apply_effect(EffectKind::ModifyCombatValue, state, &ctx);
        assert!(err.is_err());
    }
}
