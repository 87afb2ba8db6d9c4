//! Unit instances and the stat-provider that composes base stats with
//! technology/law modifiers (L1 in the layering table).
//!
//! Unit instances deliberately carry no stats of their own: `UnitStats` are
//! always computed on demand from `(unit_type, owner, game_state)`, matching
//! §3's "Unit stats are computed on demand" requirement.

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

use crate::ids::{PlayerId, UnitId};
use crate::types::UnitType;

/// A unit instance: identity, type and owner only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Unit {
    pub id: UnitId,
    pub unit_type: UnitType,
    pub owner: PlayerId,
    pub sustained_damage: bool,
    /// True while this unit is on a capturing player's faction sheet
    /// instead of with its original owner (§3 capture integrity).
    pub captured: bool,
}

impl Unit {
    pub fn new(unit_type: UnitType, owner: PlayerId) -> Self {
        Self {
            id: UnitId::new(),
            unit_type,
            owner,
            sustained_damage: false,
            captured: false,
        }
    }
}

/// Computed combat/production stats for a unit, composed from base values
/// plus technology and law modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitStats {
    pub cost: u32,
    pub combat_value: u8,
    pub combat_dice: u8,
    pub move_value: u8,
    pub capacity: u8,
    pub sustain_damage: bool,
    pub bombardment: Option<(u8, u8)>,
    pub space_cannon: Option<(u8, u8)>,
    pub anti_fighter_barrage: Option<(u8, u8)>,
    pub production: Option<u32>,
}

fn base_stats(unit_type: UnitType) -> UnitStats {
    use UnitType::*;
    match unit_type {
        Fighter => UnitStats { cost: 1, combat_value: 9, combat_dice: 1, move_value: 0, capacity: 0, sustain_damage: false, bombardment: None, space_cannon: None, anti_fighter_barrage: None, production: None },
        Infantry => UnitStats { cost: 1, combat_value: 8, combat_dice: 1, move_value: 0, capacity: 0, sustain_damage: false, bombardment: None, space_cannon: None, anti_fighter_barrage: None, production: None },
        Cruiser => UnitStats { cost: 2, combat_value: 7, combat_dice: 1, move_value: 2, capacity: 0, sustain_damage: false, bombardment: None, space_cannon: None, anti_fighter_barrage: None, production: None },
        Destroyer => UnitStats { cost: 1, combat_value: 9, combat_dice: 1, move_value: 2, capacity: 0, sustain_damage: false, bombardment: None, space_cannon: None, anti_fighter_barrage: Some((9, 2)), production: None },
        Carrier => UnitStats { cost: 3, combat_value: 9, combat_dice: 1, move_value: 1, capacity: 4, sustain_damage: false, bombardment: None, space_cannon: None, anti_fighter_barrage: None, production: None },
        Dreadnought => UnitStats { cost: 4, combat_value: 5, combat_dice: 1, move_value: 1, capacity: 1, sustain_damage: true, bombardment: Some((5, 1)), space_cannon: None, anti_fighter_barrage: None, production: None },
        Warsun => UnitStats { cost: 12, combat_value: 3, combat_dice: 3, move_value: 2, capacity: 6, sustain_damage: true, bombardment: Some((3, 3)), space_cannon: None, anti_fighter_barrage: None, production: None },
        Flagship => UnitStats { cost: 8, combat_value: 5, combat_dice: 1, move_value: 1, capacity: 3, sustain_damage: true, bombardment: None, space_cannon: None, anti_fighter_barrage: None, production: None },
        Pds => UnitStats { cost: 2, combat_value: 6, combat_dice: 1, move_value: 0, capacity: 0, sustain_damage: false, bombardment: None, space_cannon: Some((6, 1)), anti_fighter_barrage: None, production: None },
        SpaceDock => UnitStats { cost: 3, combat_value: 0, combat_dice: 0, move_value: 0, capacity: 0, sustain_damage: false, bombardment: None, space_cannon: None, anti_fighter_barrage: None, production: Some(u32::MAX) },
        Mech => UnitStats { cost: 2, combat_value: 6, combat_dice: 1, move_value: 0, capacity: 0, sustain_damage: true, bombardment: None, space_cannon: None, anti_fighter_barrage: None, production: None },
    }
}

/// A single additive modifier contributed by a technology or law.
#[derive(Debug, Clone, Copy)]
pub struct StatModifier {
    pub combat_value_delta: i8,
    pub combat_dice_delta: i8,
    pub move_value_delta: i8,
    pub capacity_delta: i8,
    pub grants_sustain_damage: bool,
}

impl Default for StatModifier {
    fn default() -> Self {
        Self {
            combat_value_delta: 0,
            combat_dice_delta: 0,
            move_value_delta: 0,
            capacity_delta: 0,
            grants_sustain_damage: false,
        }
    }
}

/// Composes base stats with an ordered list of modifiers (tech, laws).
/// Order does not matter here since all modifiers are additive, but callers
/// should supply tech modifiers before law modifiers for audit-log clarity.
pub fn compute_stats(unit_type: UnitType, modifiers: &[StatModifier]) -> UnitStats {
    let mut stats = base_stats(unit_type);
    for m in modifiers {
        stats.combat_value = (stats.combat_value as i16 - m.combat_value_delta as i16).clamp(1, 10) as u8;
        stats.combat_dice = (stats.combat_dice as i16 + m.combat_dice_delta as i16).clamp(0, 10) as u8;
        stats.move_value = (stats.move_value as i16 + m.move_value_delta as i16).clamp(0, 10) as u8;
        stats.capacity = (stats.capacity as i16 + m.capacity_delta as i16).clamp(0, 20) as u8;
        stats.sustain_damage |= m.grants_sustain_damage;
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gravity_drive_style_modifier_increases_move() {
        let stats = compute_stats(UnitType::Cruiser, &[]);
        assert_eq!(stats.move_value, 2);
        let boosted = compute_stats(
            UnitType::Cruiser,
            &[StatModifier { move_value_delta: 1, ..Default::default() }],
        );
        assert_eq!(boosted.move_value, 3);
    }

    #[test]
    fn combat_value_cannot_go_below_one() {
        let stats = compute_stats(
            UnitType::Dreadnought,
            &[StatModifier { combat_value_delta: 20, ..Default::default() }],
        );
        assert_eq!(stats.combat_value, 1);
    }
}
