//! The ability & timing engine (§4.1, L3 in the layering table).
//!
//! Dynamic dispatch by enum + table (§9 design note): `AbilityCondition` and
//! `AbilityEffect` are closed enums (re-exported from `card_registry`); an
//! effect handler table in `effect.rs` maps each variant to a pure function.
//! Adding new cards means extending data tables; adding new effect families
//! means adding enum variants.

use std::collections::{HashMap, HashSet};

use crate::card_registry::{ConditionKind, EffectKind, TriggerName};
use crate::effect::{self, EffectContext, EffectOutcome};
use crate::game_state::GameState;
use crate::ids::{AbilityId, PlayerId};
use crate::types::{Frequency, TimingWindow};

/// Uniquely identifies where an ability comes from, used for `cannot`
/// precedence (law > card > technology, ties by enactment round) and for
/// duplicate-registration rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AbilitySource {
    Law { enacted_round: u32 },
    Card,
    Technology,
}

impl AbilitySource {
    /// Specificity rank used to break `cannot` conflicts: higher wins.
    fn specificity(&self) -> (u8, u32) {
        match *self {
            AbilitySource::Law { enacted_round } => (2, enacted_round),
            AbilitySource::Card => (1, 0),
            AbilitySource::Technology => (0, 0),
        }
    }
}

/// A registered ability binding (source + name), used for duplicate
/// detection per `register`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AbilityBinding {
    pub source: String,
    pub name: String,
}

/// A complete ability definition (§3 Ability).
#[derive(Debug, Clone)]
pub struct Ability {
    pub id: AbilityId,
    pub binding: AbilityBinding,
    pub source_kind: AbilitySource,
    pub owner: PlayerId,
    pub trigger: TriggerName,
    pub timing: TimingWindow,
    pub effect: EffectKind,
    pub conditions: Vec<ConditionKind>,
    pub mandatory: bool,
    pub frequency: Frequency,
    /// Whether stacking a second identical binding is explicitly permitted
    /// (some abilities are meant to apply once per copy of an effect).
    pub allow_stacking: bool,
}

impl Ability {
    /// Evaluates whether this ability can trigger given the current state
    /// and condition context; all conditions must hold (§4.1 Conditions).
    pub fn can_trigger(&self, state: &GameState, ctx: &ConditionContext) -> bool {
        self.conditions.iter().all(|c| evaluate_condition(c, state, ctx, self.owner))
    }
}

/// Context passed to condition predicates: `(player, game_state, context)`.
#[derive(Debug, Clone, Default)]
pub struct ConditionContext {
    pub system: Option<crate::ids::SystemId>,
    pub planet: Option<crate::ids::PlanetId>,
    pub during_combat: bool,
    pub during_tactical_action: bool,
}

fn evaluate_condition(
    condition: &ConditionKind,
    state: &GameState,
    ctx: &ConditionContext,
    player: PlayerId,
) -> bool {
    match condition {
        ConditionKind::HasShipsInSystem => ctx
            .system
            .and_then(|s| state.galaxy.system(s))
            .map(|sys| {
                sys.ships
                    .iter()
                    .filter_map(|u| state.unit(*u))
                    .any(|u| u.owner == player)
            })
            .unwrap_or(false),
        ConditionKind::SystemContainsFrontier => ctx
            .system
            .and_then(|s| state.galaxy.system(s))
            .map(|sys| sys.frontier_token)
            .unwrap_or(false),
        ConditionKind::ControlsPlanet => ctx
            .planet
            .and_then(|p| state.galaxy.planet(p))
            .map(|p| p.controlled_by() == Some(player))
            .unwrap_or(false),
        ConditionKind::DuringCombat => ctx.during_combat,
        ConditionKind::DuringTacticalAction => ctx.during_tactical_action,
        ConditionKind::HasTechnologyOfColor(color) => state
            .player(player)
            .map(|p| {
                p.technologies.iter().any(|t| {
                    state
                        .tech_color(*t)
                        .map(|c| c == *color)
                        .unwrap_or(false)
                })
            })
            .unwrap_or(false),
        ConditionKind::ControlsLegendaryPlanet => state
            .galaxy
            .planets_iter()
            .any(|p| p.legendary && p.controlled_by() == Some(player)),
    }
}

/// An ability, a failure, or a no-op resolution record.
#[derive(Debug, Clone)]
pub enum AbilityResolution {
    Applied { ability: AbilityId, outcome: EffectOutcome },
    Skipped { ability: AbilityId },
}

/// Raised when a mandatory ability's effect cannot be applied (§4.1 Failure
/// mode).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbilityExecutionError {
    NoValidTarget { ability: AbilityId },
    DuplicateRegistration { binding: AbilityBinding },
    EventBlocked { event: TriggerName },
}

impl std::fmt::Display for AbilityExecutionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AbilityExecutionError::NoValidTarget { ability } => {
                write!(f, "mandatory ability {:?} had no valid target", ability)
            }
            AbilityExecutionError::DuplicateRegistration { binding } => {
                write!(f, "duplicate ability registration: {}/{}", binding.source, binding.name)
            }
            AbilityExecutionError::EventBlocked { event } => {
                write!(f, "event {:?} was blocked by a cannot ability", event)
            }
        }
    }
}

impl std::error::Error for AbilityExecutionError {}

/// The result of `trigger`: the ordered resolutions, whether the event was
/// blocked, and the new state.
#[derive(Debug, Clone)]
pub struct TriggerResolution {
    pub resolutions: Vec<AbilityResolution>,
    pub blocked: bool,
}

/// Owns registered abilities and frequency bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct AbilityEngine {
    abilities: Vec<Ability>,
    bindings: HashSet<AbilityBinding>,
    /// (ability id, triggering identity) pairs already fired, for
    /// `OncePerTrigger` frequency enforcement.
    fired: HashSet<(AbilityId, String)>,
}

impl AbilityEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an ability; rejected if a duplicate (same source + name)
    /// binding already exists, unless the ability explicitly allows
    /// stacking (§4.1 `register`).
    pub fn register(&mut self, ability: Ability) -> Result<(), AbilityExecutionError> {
        if !ability.allow_stacking && self.bindings.contains(&ability.binding) {
            return Err(AbilityExecutionError::DuplicateRegistration {
                binding: ability.binding.clone(),
            });
        }
        self.bindings.insert(ability.binding.clone());
        self.abilities.push(ability);
        Ok(())
    }

    pub fn abilities_for(&self, trigger: TriggerName) -> Vec<&Ability> {
        self.abilities.iter().filter(|a| a.trigger == trigger).collect()
    }

    /// Deterministic resolution order (§4.1 Ordering rules): `cannot` first
    /// (source with higher specificity/later enactment wins conflicts),
    /// then `when`, then `before`, the event itself, then `after`. Within a
    /// timing bucket, ties break by player order starting with `active`.
    pub fn resolution_order(&self, trigger: TriggerName, active: PlayerId, player_order: &[PlayerId]) -> Vec<AbilityId> {
        let mut buckets: HashMap<TimingWindow, Vec<&Ability>> = HashMap::new();
        for ability in self.abilities_for(trigger) {
            buckets.entry(ability.timing).or_default().push(ability);
        }

        let clockwise = clockwise_from(player_order, active);
        let order_key = |a: &&Ability| clockwise.iter().position(|p| *p == a.owner).unwrap_or(usize::MAX);

        let mut ordered = Vec::new();
        for window in [
            TimingWindow::Cannot,
            TimingWindow::When,
            TimingWindow::Before,
            TimingWindow::After,
        ] {
            if let Some(mut group) = buckets.remove(&window) {
                group.sort_by_key(order_key);
                ordered.extend(group.iter().map(|a| a.id));
            }
        }
        ordered
    }

    /// Resolves the `cannot` bucket for a trigger, applying specificity and
    /// enactment-round tie-breaking when two `cannot` abilities conflict
    /// (§4.1 Cannot semantics).
    fn resolve_cannot(&self, trigger: TriggerName) -> bool {
        let cannots: Vec<&Ability> = self
            .abilities_for(trigger)
            .into_iter()
            .filter(|a| a.timing == TimingWindow::Cannot)
            .collect();
        if cannots.is_empty() {
            return false;
        }
        // Highest-specificity source wins; ties go to the later-enacted one.
        cannots
            .iter()
            .max_by_key(|a| a.source_kind.specificity())
            .is_some()
    }

    /// Records that `ability` has fired for `trigger_identity`, returning
    /// `false` if it already fired and its frequency forbids refiring.
    fn try_mark_fired(&mut self, ability: AbilityId, frequency: Frequency, trigger_identity: &str) -> bool {
        if frequency == Frequency::Unlimited {
            return true;
        }
        let key = (ability, trigger_identity.to_string());
        if self.fired.contains(&key) {
            return false;
        }
        self.fired.insert(key);
        true
    }

    /// Dispatches a trigger: selects, orders, and applies all triggered
    /// abilities honoring precedence (§4.1 `trigger`).
    pub fn trigger(
        &mut self,
        trigger: TriggerName,
        mut state: GameState,
        active: PlayerId,
        ctx: &ConditionContext,
        trigger_identity: &str,
    ) -> Result<(GameState, TriggerResolution), AbilityExecutionError> {
        if self.resolve_cannot(trigger) {
            return Ok((
                state,
                TriggerResolution { resolutions: Vec::new(), blocked: true },
            ));
        }

        let player_order: Vec<PlayerId> = state.players.iter().map(|p| p.id).collect();
        let order = self.resolution_order(trigger, active, &player_order);
        let mut resolutions = Vec::new();

        for ability_id in order {
            let Some(ability) = self.abilities.iter().find(|a| a.id == ability_id).cloned() else {
                continue;
            };
            if ability.timing == TimingWindow::Cannot {
                continue;
            }
            if !ability.can_trigger(&state, ctx) {
                resolutions.push(AbilityResolution::Skipped { ability: ability_id });
                continue;
            }
            if !self.try_mark_fired(ability_id, ability.frequency, trigger_identity) {
                resolutions.push(AbilityResolution::Skipped { ability: ability_id });
                continue;
            }

            let effect_ctx = EffectContext { owner: ability.owner, system: ctx.system, planet: ctx.planet, unit: None };
            match effect::apply_effect(ability.effect, state, &effect_ctx) {
                Ok((new_state, outcome)) => {
                    state = new_state;
                    resolutions.push(AbilityResolution::Applied { ability: ability_id, outcome });
                }
                Err(_) if !ability.mandatory => {
                    resolutions.push(AbilityResolution::Skipped { ability: ability_id });
                }
                Err(_) => {
                    return Err(AbilityExecutionError::NoValidTarget { ability: ability_id });
                }
            }
        }

        Ok((state, TriggerResolution { resolutions, blocked: false }))
    }
}

/// Rotates `order` so it starts at `start` and proceeds clockwise (the
/// engine's canonical player ordering), used for "active player first" and
/// "speaker-clockwise" tie-breaks throughout §4.
pub fn clockwise_from(order: &[PlayerId], start: PlayerId) -> Vec<PlayerId> {
    let Some(pos) = order.iter().position(|p| *p == start) else {
        return order.to_vec();
    };
    order[pos..].iter().chain(order[..pos].iter()).copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clockwise_rotation_starts_at_given_player() {
        let order = vec![PlayerId(0), PlayerId(1), PlayerId(2), PlayerId(3)];
        let rotated = clockwise_from(&order, PlayerId(2));
        assert_eq!(rotated, vec![PlayerId(2), PlayerId(3), PlayerId(0), PlayerId(1)]);
    }

    #[test]
    fn duplicate_binding_rejected() {
        let mut engine = AbilityEngine::new();
        let ability = Ability {
            id: AbilityId::new(),
            binding: AbilityBinding { source: "src".into(), name: "foo".into() },
            source_kind: AbilitySource::Card,
            owner: PlayerId(0),
            trigger: TriggerName::StartOfTurn,
            timing: TimingWindow::When,
            effect: EffectKind::GainTradeGoods,
            conditions: vec![],
            mandatory: false,
            frequency: Frequency::Unlimited,
            allow_stacking: false,
        };
        engine.register(ability.clone()).unwrap();
        let mut dup = ability;
        dup.id = AbilityId::new();
        assert!(engine.register(dup).is_err());
    }
}
