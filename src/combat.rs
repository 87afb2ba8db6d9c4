//! Combat resolver (§4.4, L5 in the layering table): anti-fighter barrage,
//! space combat rounds, ground combat, hit assignment.

use std::collections::HashSet;

use crate::ids::{PlayerId, UnitId};
use crate::rng::Rng;
use crate::types::UnitType;
use crate::unit::{Unit, UnitStats};

/// A participant's units and computed stats for the duration of one combat.
#[derive(Debug, Clone)]
pub struct Combatant {
    pub player: PlayerId,
    pub units: Vec<(Unit, UnitStats)>,
}

impl Combatant {
    pub fn ship_count(&self) -> usize {
        self.units.iter().filter(|(u, _)| u.unit_type.is_ship()).count()
    }

    pub fn fighters(&self) -> Vec<UnitId> {
        self.units
            .iter()
            .filter(|(u, _)| u.unit_type == UnitType::Fighter)
            .map(|(u, _)| u.id)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombatKind {
    Space,
    Ground,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CombatError {
    NotRoundOne,
    NotSpaceCombat,
    DuplicateAssignment { unit: UnitId },
    NonFighterTarget { unit: UnitId },
    TargetingOwnFighter { unit: UnitId },
    HitCountMismatch { assigned: u32, produced: u32 },
    MultipleDefenders,
    AlreadySustained { unit: UnitId },
    CannotSustain { unit: UnitId },
}

impl std::fmt::Display for CombatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CombatError::NotRoundOne => write!(f, "anti-fighter barrage may only fire in round 1"),
            CombatError::NotSpaceCombat => write!(f, "anti-fighter barrage only applies in space combat"),
            CombatError::DuplicateAssignment { unit } => write!(f, "unit {:?} assigned a hit twice", unit),
            CombatError::NonFighterTarget { unit } => write!(f, "unit {:?} is not a fighter", unit),
            CombatError::TargetingOwnFighter { unit } => write!(f, "cannot assign an AFB hit to your own fighter {:?}", unit),
            CombatError::HitCountMismatch { assigned, produced } => {
                write!(f, "{} hits assigned but {} were produced", assigned, produced)
            }
            CombatError::MultipleDefenders => write!(f, "multiple defenders present; request a specific defender id"),
            CombatError::AlreadySustained { unit } => write!(f, "unit {:?} has already sustained damage", unit),
            CombatError::CannotSustain { unit } => write!(f, "unit {:?} cannot sustain damage", unit),
        }
    }
}

impl std::error::Error for CombatError {}

/// Rolls dice for one combatant, returning the number of hits produced.
/// Each die that meets or exceeds the unit's combat value is a hit.
pub fn roll_hits(units: &[(Unit, UnitStats)], rng: &mut dyn Rng) -> u32 {
    let mut hits = 0;
    for (_, stats) in units {
        for _ in 0..stats.combat_dice {
            if rng.roll_die(10) >= stats.combat_value {
                hits += 1;
            }
        }
    }
    hits
}

/// Anti-fighter barrage: round-1-only, space-combat-only, hits may only be
/// assigned to enemy fighters (§4.4). `afb_units` are the units with AFB;
/// `fighters` are the legal targets (the *opponent's* fighters).
pub fn anti_fighter_barrage(
    round: u32,
    kind: CombatKind,
    afb_units: &[(Unit, UnitStats)],
    fighters: &[UnitId],
    rng: &mut dyn Rng,
) -> Result<Vec<UnitId>, CombatError> {
    if round != 1 {
        return Err(CombatError::NotRoundOne);
    }
    if kind != CombatKind::Space {
        return Err(CombatError::NotSpaceCombat);
    }

    let dice_units: Vec<(Unit, UnitStats)> = afb_units
        .iter()
        .filter(|(_, s)| s.anti_fighter_barrage.is_some())
        .cloned()
        .collect();

    let mut hits = 0;
    for (_, stats) in &dice_units {
        let (value, dice) = stats.anti_fighter_barrage.unwrap();
        for _ in 0..dice {
            if rng.roll_die(10) >= value {
                hits += 1;
            }
        }
    }

    // Excess hits beyond available fighters vanish (§4.4).
    let assign_count = (hits as usize).min(fighters.len());
    Ok(fighters[..assign_count].to_vec())
}

/// Validates a caller-chosen AFB hit assignment against the legal-target
/// rules (§4.4: no duplicate ids, no non-fighter targets, no targeting
/// one's own fighters).
pub fn validate_afb_assignment(
    assignment: &[UnitId],
    enemy_fighters: &HashSet<UnitId>,
    own_fighters: &HashSet<UnitId>,
) -> Result<(), CombatError> {
    let mut seen = HashSet::new();
    for &unit in assignment {
        if !seen.insert(unit) {
            return Err(CombatError::DuplicateAssignment { unit });
        }
        if own_fighters.contains(&unit) {
            return Err(CombatError::TargetingOwnFighter { unit });
        }
        if !enemy_fighters.contains(&unit) {
            return Err(CombatError::NonFighterTarget { unit });
        }
    }
    Ok(())
}

/// Hit assignment: validates that the total assigned equals the total
/// produced, applying sustain-damage absorption before destruction (§4.4
/// Hit assignment invariants). Returns (destroyed, newly_damaged).
pub fn assign_hits(
    hits_produced: u32,
    assignment: &[(UnitId, UnitStats, bool)],
) -> Result<(Vec<UnitId>, Vec<UnitId>), CombatError> {
    if assignment.len() as u32 != hits_produced {
        return Err(CombatError::HitCountMismatch { assigned: assignment.len() as u32, produced: hits_produced });
    }
    let mut destroyed = Vec::new();
    let mut damaged = Vec::new();
    for (unit, stats, already_sustained) in assignment {
        if stats.sustain_damage && !already_sustained {
            damaged.push(*unit);
        } else {
            if stats.sustain_damage && *already_sustained {
                return Err(CombatError::AlreadySustained { unit: *unit });
            }
            destroyed.push(*unit);
        }
    }
    Ok((destroyed, damaged))
}

/// Round-by-round space combat outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CombatWinner {
    Player(PlayerId),
    Draw,
}

/// Determines the winner once a side has zero ships (§4.4: "ends with
/// winner (other has zero) or draw (both zero)").
pub fn determine_winner(attacker: PlayerId, attacker_ships: usize, defender: PlayerId, defender_ships: usize) -> Option<CombatWinner> {
    match (attacker_ships, defender_ships) {
        (0, 0) => Some(CombatWinner::Draw),
        (0, _) => Some(CombatWinner::Player(defender)),
        (_, 0) => Some(CombatWinner::Player(attacker)),
        _ => None,
    }
}

/// A fully resolved combat: every round's hits applied, ending when one
/// side (or both) has no units left.
#[derive(Debug, Clone)]
pub struct CombatOutcome {
    pub rounds: u32,
    pub winner: CombatWinner,
    pub destroyed: Vec<UnitId>,
    pub damaged: Vec<UnitId>,
}

/// Assigns `hits` across `units` using a fixed priority, since the public
/// command surface has no mid-combat decision point for a synchronously
/// resolved action (§9 Open Question): sustain-capable undamaged units
/// soak a hit first, then the cheapest remaining units are destroyed.
/// Units already carrying sustained damage are eligible for destruction,
/// not a second soak (§4.4 hit assignment invariants). Mutates `units` in
/// place, removing anything destroyed.
fn apply_auto_hits(units: &mut Vec<(Unit, UnitStats)>, hits: u32, destroyed: &mut Vec<UnitId>, damaged: &mut Vec<UnitId>) {
    let mut remaining = hits;
    let mut newly_damaged = HashSet::new();

    for (unit, stats) in units.iter_mut() {
        if remaining == 0 {
            break;
        }
        if stats.sustain_damage && !unit.sustained_damage {
            unit.sustained_damage = true;
            newly_damaged.insert(unit.id);
            damaged.push(unit.id);
            remaining -= 1;
        }
    }

    if remaining > 0 {
        let mut candidates: Vec<usize> = (0..units.len()).filter(|&i| !newly_damaged.contains(&units[i].0.id)).collect();
        candidates.sort_by_key(|&i| units[i].1.cost);
        let to_remove: HashSet<UnitId> = candidates.into_iter().take(remaining as usize).map(|i| units[i].0.id).collect();
        destroyed.extend(to_remove.iter().copied());
        units.retain(|(u, _)| !to_remove.contains(&u.id));
    }
}

/// Resolves a full space combat (§4.4): anti-fighter barrage fires in round
/// one only, then rounds of simultaneous dice rolls and hit assignment
/// continue until one side (or both) is wiped out. Retreat is not modeled
/// here — a synchronous single-command engine has no mid-combat decision
/// point for the defender to declare one (§9 Open Question); callers that
/// need retreat must check for it before invoking this function.
pub fn resolve_space_combat(
    attacker: PlayerId,
    attacker_units: &mut Vec<(Unit, UnitStats)>,
    defender: PlayerId,
    defender_units: &mut Vec<(Unit, UnitStats)>,
    rng: &mut dyn Rng,
) -> CombatOutcome {
    let mut round = 1;
    let mut destroyed = Vec::new();
    let mut damaged = Vec::new();

    loop {
        if round == 1 {
            let attacker_afb = attacker_units.clone();
            let defender_fighters: Vec<UnitId> = defender_units.iter().filter(|(u, _)| u.unit_type == UnitType::Fighter).map(|(u, _)| u.id).collect();
            if let Ok(hit) = anti_fighter_barrage(round, CombatKind::Space, &attacker_afb, &defender_fighters, rng) {
                for id in hit {
                    defender_units.retain(|(u, _)| u.id != id);
                    destroyed.push(id);
                }
            }
            let defender_afb = defender_units.clone();
            let attacker_fighters: Vec<UnitId> = attacker_units.iter().filter(|(u, _)| u.unit_type == UnitType::Fighter).map(|(u, _)| u.id).collect();
            if let Ok(hit) = anti_fighter_barrage(round, CombatKind::Space, &defender_afb, &attacker_fighters, rng) {
                for id in hit {
                    attacker_units.retain(|(u, _)| u.id != id);
                    destroyed.push(id);
                }
            }
        }

        if let Some(winner) = determine_winner(attacker, attacker_units.len(), defender, defender_units.len()) {
            return CombatOutcome { rounds: round, winner, destroyed, damaged };
        }

        let attacker_hits = roll_hits(attacker_units, rng);
        let defender_hits = roll_hits(defender_units, rng);
        apply_auto_hits(defender_units, attacker_hits, &mut destroyed, &mut damaged);
        apply_auto_hits(attacker_units, defender_hits, &mut destroyed, &mut damaged);

        if let Some(winner) = determine_winner(attacker, attacker_units.len(), defender, defender_units.len()) {
            return CombatOutcome { rounds: round, winner, destroyed, damaged };
        }
        round += 1;
    }
}

/// Resolves ground combat (§4.4 ground combat restrictions): no
/// anti-fighter barrage, no retreat — once committed, ground forces fight
/// until one side is wiped out.
pub fn resolve_ground_combat(
    attacker: PlayerId,
    attacker_units: &mut Vec<(Unit, UnitStats)>,
    defender: PlayerId,
    defender_units: &mut Vec<(Unit, UnitStats)>,
    rng: &mut dyn Rng,
) -> CombatOutcome {
    let mut round = 1;
    let mut destroyed = Vec::new();
    let mut damaged = Vec::new();

    loop {
        if let Some(winner) = determine_winner(attacker, attacker_units.len(), defender, defender_units.len()) {
            return CombatOutcome { rounds: round, winner, destroyed, damaged };
        }
        let attacker_hits = roll_hits(attacker_units, rng);
        let defender_hits = roll_hits(defender_units, rng);
        apply_auto_hits(defender_units, attacker_hits, &mut destroyed, &mut damaged);
        apply_auto_hits(attacker_units, defender_hits, &mut destroyed, &mut damaged);
        if let Some(winner) = determine_winner(attacker, attacker_units.len(), defender, defender_units.len()) {
            return CombatOutcome { rounds: round, winner, destroyed, damaged };
        }
        round += 1;
    }
}

/// The non-active player(s) in a combat are always the defenders; the
/// active player is always the attacker (§4.4 Defender identification).
pub fn defenders(active: PlayerId, participants: &[PlayerId]) -> Vec<PlayerId> {
    participants.iter().copied().filter(|&p| p != active).collect()
}

/// Returns the single defender id, or an error if more than one
/// non-active participant is present (§4.4: multi-defender combats must be
/// queried as a set, not a singular id).
pub fn single_defender(active: PlayerId, participants: &[PlayerId]) -> Result<PlayerId, CombatError> {
    let defs = defenders(active, participants);
    match defs.as_slice() {
        [only] => Ok(*only),
        _ => Err(CombatError::MultipleDefenders),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedRng;
    use crate::unit::compute_stats;

    #[test]
    fn afb_zero_fighters_yields_zero_hits() {
        let mut rng = ScriptedRng::new([9, 9]);
        let destroyer = Unit::new(UnitType::Destroyer, PlayerId(0));
        let stats = compute_stats(UnitType::Destroyer, &[]);
        let result = anti_fighter_barrage(1, CombatKind::Space, &[(destroyer, stats)], &[], &mut rng).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn afb_outside_round_one_errors() {
        let mut rng = ScriptedRng::new([9, 9]);
        let destroyer = Unit::new(UnitType::Destroyer, PlayerId(0));
        let stats = compute_stats(UnitType::Destroyer, &[]);
        let err = anti_fighter_barrage(2, CombatKind::Space, &[(destroyer, stats)], &[], &mut rng).unwrap_err();
        assert_eq!(err, CombatError::NotRoundOne);
    }

    #[test]
    fn afb_scenario_d_one_hit_from_two_dice() {
        // §8 scenario (d): destroyer AFB (value 9, 2 dice) vs two fighters,
        // rolls [9, 5] -> exactly one hit.
        let mut rng = ScriptedRng::new([9, 5]);
        let destroyer = Unit::new(UnitType::Destroyer, PlayerId(0));
        let stats = compute_stats(UnitType::Destroyer, &[]);
        let f1 = UnitId::new();
        let f2 = UnitId::new();
        let result = anti_fighter_barrage(1, CombatKind::Space, &[(destroyer, stats)], &[f1, f2], &mut rng).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0], f1);
    }

    #[test]
    fn sustain_damage_absorbs_before_destruction() {
        let dread = UnitId::new();
        let stats = compute_stats(UnitType::Dreadnought, &[]);
        let (destroyed, damaged) = assign_hits(1, &[(dread, stats, false)]).unwrap();
        assert!(destroyed.is_empty());
        assert_eq!(damaged, vec![dread]);

        let err = assign_hits(1, &[(dread, stats, true)]).unwrap_err();
        assert_eq!(err, CombatError::AlreadySustained { unit: dread });
    }

    #[test]
    fn winner_determined_when_one_side_empty() {
        assert_eq!(determine_winner(PlayerId(0), 2, PlayerId(1), 0), Some(CombatWinner::Player(PlayerId(0))));
        assert_eq!(determine_winner(PlayerId(0), 0, PlayerId(1), 0), Some(CombatWinner::Draw));
        assert_eq!(determine_winner(PlayerId(0), 1, PlayerId(1), 1), None);
    }

    #[test]
    fn multiple_defenders_require_explicit_set_query() {
        let participants = vec![PlayerId(0), PlayerId(1), PlayerId(2)];
        assert_eq!(defenders(PlayerId(0), &participants), vec![PlayerId(1), PlayerId(2)]);
        assert_eq!(single_defender(PlayerId(0), &participants), Err(CombatError::MultipleDefenders));
    }
}
