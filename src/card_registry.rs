//! Pluggable card-content protocols (§1: "Card content catalogs... The
//! engine consumes a `CardRegistry` protocol; card bodies are data").
//!
//! No free-form scripting: every card behavior is selected from an
//! enumerated effect/condition/trigger catalog (§6 "Card data format").
//! New card text requires adding new enum variants and handler entries, not
//! embedding code in data.

use std::collections::HashMap;

use crate::ids::{AgendaId, NoteId, TechId};
use crate::types::{PlanetTrait, TechColor};

/// Enumerated trigger names abilities subscribe to (§3 Ability, §GLOSSARY
/// "Trigger").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerName {
    AfterActivation,
    AfterMovement,
    StartOfSpaceCombat,
    BeforeInvasion,
    BeforeProduction,
    StartOfTurn,
    EndOfTurn,
    StartOfPhase,
    EndOfPhase,
    TransactionCompleted,
    CombatRoundStart,
    UnitDestroyed,
    PlanetCaptured,
    PlayerEliminated,
    AgendaRevealed,
}

/// Enumerated condition predicates (§4.1: "Conditions are enumerated").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionKind {
    HasShipsInSystem,
    SystemContainsFrontier,
    ControlsPlanet,
    DuringCombat,
    DuringTacticalAction,
    HasTechnologyOfColor(TechColor),
    ControlsLegendaryPlanet,
}

/// Enumerated effect kinds selectable from card data (§6 "effect kind
/// (enumerated)").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectKind {
    GainTradeGoods,
    GainCommodities,
    DrawActionCard,
    GainCommandToken,
    ModifyCombatValue,
    ModifyMoveValue,
    GrantSustainDamage,
    ExhaustPlanet,
    ReadyPlanet,
    DestroyUnit,
    ReturnToSupply,
    PreventCombatRound,
}

/// A structured card record loaded from an external source (§6 "Each
/// record specifies: id, name, expansion, type, trigger, effect kind,
/// conditions, mandatory flag, optional cost").
#[derive(Debug, Clone)]
pub struct CardRecord {
    pub id: u32,
    pub name: String,
    pub expansion: String,
    pub trigger: TriggerName,
    pub effect: EffectKind,
    pub conditions: Vec<ConditionKind>,
    pub mandatory: bool,
    pub cost: Option<u32>,
}

/// Technology metadata needed by the core engine (stat modifiers are
/// resolved separately by `unit::compute_stats`; the registry only needs to
/// answer "what color is this tech" for condition evaluation).
#[derive(Debug, Clone)]
pub struct TechnologyRecord {
    pub id: TechId,
    pub name: String,
    pub color: Option<TechColor>,
    pub prerequisites: Vec<TechColor>,
}

/// Agenda kind: a law persists, a directive is one-time (§3 AgendaCard).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgendaKind {
    Law,
    Directive,
}

/// The outcome space an agenda's votes are tallied against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeSpace {
    ForAgainst,
    ElectPlayer,
    ElectCulturalPlanet,
    ElectHazardousPlanet,
    ElectIndustrialPlanet,
    ElectStrategyCard,
}

#[derive(Debug, Clone)]
pub struct AgendaRecord {
    pub id: AgendaId,
    pub name: String,
    pub kind: AgendaKind,
    pub outcomes: OutcomeSpace,
}

/// A promissory note's static metadata. The Alliance note is recognized by
/// name for the commander-sharing mechanic (§4.6); all others are opaque
/// data to the core engine.
#[derive(Debug, Clone)]
pub struct PromissoryNoteRecord {
    pub id: NoteId,
    pub name: String,
    pub is_alliance: bool,
}

/// A single exploration card (§4.2 "exploration decks (four traits)").
/// `attaches`/`relic_fragment` select the side effect `GameState::explore`
/// applies once drawn; everything else is opaque to the core engine.
#[derive(Debug, Clone)]
pub struct ExplorationCard {
    pub name: String,
    pub trait_kind: PlanetTrait,
    pub effect: Option<EffectKind>,
    pub attaches: bool,
    pub relic_fragment: bool,
}

/// A draw/discard pile for one planet trait's exploration deck. The host
/// supplies the catalog via `CardRegistry::exploration_cards`; `GameState`
/// owns the mutable pile state, mirroring how `promissory` separates static
/// note metadata from the mutable hand/pool state.
pub trait ExplorationDeck {
    fn draw(&mut self, rng: &mut dyn crate::rng::Rng) -> Option<ExplorationCard>;
    fn discard(&mut self, card: ExplorationCard);
}

/// A `Vec`-backed exploration deck: reshuffles the discard pile back into
/// the draw pile once it empties (§4.2).
#[derive(Debug, Clone, Default)]
pub struct VecExplorationDeck {
    pub draw_pile: Vec<ExplorationCard>,
    pub discard_pile: Vec<ExplorationCard>,
}

impl ExplorationDeck for VecExplorationDeck {
    fn draw(&mut self, rng: &mut dyn crate::rng::Rng) -> Option<ExplorationCard> {
        if self.draw_pile.is_empty() {
            if self.discard_pile.is_empty() {
                return None;
            }
            self.draw_pile.append(&mut self.discard_pile);
            let len = self.draw_pile.len();
            for i in (1..len).rev() {
                let j = (rng.roll_die(((i + 1) as u8).max(1)) as usize - 1).min(i);
                self.draw_pile.swap(i, j);
            }
        }
        self.draw_pile.pop()
    }

    fn discard(&mut self, card: ExplorationCard) {
        self.discard_pile.push(card);
    }
}

/// External protocol the engine consumes for card content. Card bodies are
/// data owned by the host; the engine never interprets free-form text.
pub trait CardRegistry {
    fn technology(&self, id: TechId) -> Option<&TechnologyRecord>;
    fn agenda(&self, id: AgendaId) -> Option<&AgendaRecord>;
    fn promissory_note(&self, id: NoteId) -> Option<&PromissoryNoteRecord>;

    /// The exploration card catalog for one planet trait. Hosts that don't
    /// supply exploration content can rely on the empty default.
    fn exploration_cards(&self, trait_kind: PlanetTrait) -> Vec<ExplorationCard> {
        let _ = trait_kind;
        Vec::new()
    }
}

/// A minimal in-memory registry, useful for tests and as a reference
/// implementation of the `CardRegistry` protocol.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCardRegistry {
    pub technologies: Vec<TechnologyRecord>,
    pub agendas: Vec<AgendaRecord>,
    pub notes: Vec<PromissoryNoteRecord>,
    pub exploration_cards: HashMap<PlanetTrait, Vec<ExplorationCard>>,
}

impl CardRegistry for InMemoryCardRegistry {
    fn technology(&self, id: TechId) -> Option<&TechnologyRecord> {
        self.technologies.iter().find(|t| t.id == id)
    }

    fn agenda(&self, id: AgendaId) -> Option<&AgendaRecord> {
        self.agendas.iter().find(|a| a.id == id)
    }

    fn promissory_note(&self, id: NoteId) -> Option<&PromissoryNoteRecord> {
        self.notes.iter().find(|n| n.id == id)
    }

    fn exploration_cards(&self, trait_kind: PlanetTrait) -> Vec<ExplorationCard> {
        self.exploration_cards.get(&trait_kind).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedRng;

    fn card(name: &str) -> ExplorationCard {
        ExplorationCard { name: name.into(), trait_kind: PlanetTrait::Cultural, effect: None, attaches: false, relic_fragment: false }
    }

    #[test]
    fn draw_reshuffles_discard_pile_once_draw_pile_empties() {
        let mut deck = VecExplorationDeck { draw_pile: vec![card("a")], discard_pile: vec![card("b"), card("c")] };
        let mut rng = ScriptedRng::new([1, 1]);

        assert_eq!(deck.draw(&mut rng).unwrap().name, "a");
        assert!(deck.draw_pile.is_empty());
        let second = deck.draw(&mut rng).unwrap();
        assert!(["b", "c"].contains(&second.name.as_str()));
        assert!(deck.discard_pile.is_empty());
    }

    #[test]
    fn draw_returns_none_once_both_piles_are_empty() {
        let mut deck = VecExplorationDeck::default();
        let mut rng = ScriptedRng::new([]);
        assert!(deck.draw(&mut rng).is_none());
    }
}
