//! Agenda phase runner (§4.7, L6 in the layering table).

use std::collections::HashMap;

use crate::ability::clockwise_from;
use crate::card_registry::{AgendaKind, AgendaRecord, OutcomeSpace};
use crate::ids::{AgendaId, PlanetId, PlayerId};

/// A persistent law, installed when an agenda of kind `Law` is enacted
/// (§3 Law durability: persists until an explicit discard effect removes
/// it).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveLaw {
    pub agenda: AgendaId,
    pub name: String,
    pub enacted_round: u32,
    pub outcome: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgendaError {
    CustodiansTokenStillPresent,
    UnknownOutcome { outcome: String },
    PlanetNotControlledByVoter { planet: PlanetId, voter: PlayerId },
    PlanetAlreadyVoted { planet: PlanetId },
    SplitVoteNotAllowed { player: PlayerId },
}

impl std::fmt::Display for AgendaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgendaError::CustodiansTokenStillPresent => write!(f, "the agenda phase is gated by the custodians token"),
            AgendaError::UnknownOutcome { outcome } => write!(f, "'{outcome}' is not a valid outcome for this agenda"),
            AgendaError::PlanetNotControlledByVoter { planet, voter } => {
                write!(f, "planet {:?} is not controlled by voter {:?}", planet, voter)
            }
            AgendaError::PlanetAlreadyVoted { planet } => write!(f, "planet {:?} already cast its vote this agenda", planet),
            AgendaError::SplitVoteNotAllowed { player } => write!(f, "player {:?} attempted to split votes across outcomes", player),
        }
    }
}

impl std::error::Error for AgendaError {}

/// Tracks per-planet votes and the running influence tally per outcome for
/// a single agenda (§4.7 voting).
#[derive(Debug, Clone, Default)]
pub struct VoteTally {
    pub by_outcome: HashMap<String, u32>,
    voted_planets: Vec<PlanetId>,
    player_outcome: HashMap<PlayerId, String>,
}

impl VoteTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Casts votes for a set of planets all belonging to one outcome. A
    /// player's votes are entirely for one outcome; no splits (§4.7).
    pub fn cast(
        &mut self,
        agenda: &AgendaRecord,
        voter: PlayerId,
        planet_influences: &[(PlanetId, u32)],
        outcome: &str,
    ) -> Result<(), AgendaError> {
        if !outcome_is_valid(agenda, outcome) {
            return Err(AgendaError::UnknownOutcome { outcome: outcome.to_string() });
        }
        if let Some(prior) = self.player_outcome.get(&voter) {
            if prior != outcome {
                return Err(AgendaError::SplitVoteNotAllowed { player: voter });
            }
        }
        for &(planet, _) in planet_influences {
            if self.voted_planets.contains(&planet) {
                return Err(AgendaError::PlanetAlreadyVoted { planet });
            }
        }
        for &(planet, influence) in planet_influences {
            self.voted_planets.push(planet);
            *self.by_outcome.entry(outcome.to_string()).or_insert(0) += influence;
        }
        self.player_outcome.insert(voter, outcome.to_string());
        Ok(())
    }

    pub fn winner(&self) -> Option<String> {
        self.by_outcome
            .iter()
            .max_by_key(|(_, &v)| v)
            .map(|(k, _)| k.clone())
    }

    pub fn has_voted(&self, player: PlayerId) -> bool {
        self.player_outcome.contains_key(&player)
    }

    pub fn outcome_for(&self, player: PlayerId) -> Option<String> {
        self.player_outcome.get(&player).cloned()
    }
}

fn outcome_is_valid(agenda: &AgendaRecord, outcome: &str) -> bool {
    match agenda.outcomes {
        OutcomeSpace::ForAgainst => outcome == "For" || outcome == "Against",
        _ => true, // election outcomes are validated against live candidates by the host
    }
}

/// Resolves a tied vote: the speaker votes last and breaks ties (§4.7).
pub fn break_tie(tally: &VoteTally, speaker_choice: &str) -> String {
    let max = tally.by_outcome.values().copied().max().unwrap_or(0);
    let tied: Vec<&String> = tally
        .by_outcome
        .iter()
        .filter(|(_, &v)| v == max)
        .map(|(k, _)| k)
        .collect();
    if tied.len() > 1 {
        speaker_choice.to_string()
    } else {
        tally.winner().unwrap_or_default()
    }
}

/// Voting order: speaker-left clockwise, speaker votes last (§4.7).
pub fn voting_order(player_order: &[PlayerId], speaker: PlayerId) -> Vec<PlayerId> {
    let mut order = clockwise_from(player_order, speaker);
    if !order.is_empty() {
        order.remove(0);
        order.push(speaker);
    }
    order
}

/// Checks that the agenda phase is unlocked (§4.7 "Gated by the
/// custodians-token-removed flag").
pub fn require_custodians_removed(custodians_token_present: bool) -> Result<(), AgendaError> {
    if custodians_token_present {
        return Err(AgendaError::CustodiansTokenStillPresent);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::AgendaId;

    fn agenda() -> AgendaRecord {
        AgendaRecord { id: AgendaId(1), name: "Test".into(), kind: AgendaKind::Law, outcomes: OutcomeSpace::ForAgainst }
    }

    #[test]
    fn rejects_vote_for_nonexistent_outcome() {
        let mut tally = VoteTally::new();
        let err = tally.cast(&agenda(), PlayerId(0), &[(PlanetId(1), 2)], "Maybe").unwrap_err();
        assert_eq!(err, AgendaError::UnknownOutcome { outcome: "Maybe".into() });
    }

    #[test]
    fn no_split_votes() {
        let mut tally = VoteTally::new();
        tally.cast(&agenda(), PlayerId(0), &[(PlanetId(1), 2)], "For").unwrap();
        let err = tally.cast(&agenda(), PlayerId(0), &[(PlanetId(2), 1)], "Against").unwrap_err();
        assert_eq!(err, AgendaError::SplitVoteNotAllowed { player: PlayerId(0) });
    }

    #[test]
    fn voting_order_puts_speaker_last() {
        let order = vec![PlayerId(0), PlayerId(1), PlayerId(2), PlayerId(3)];
        let voting = voting_order(&order, PlayerId(1));
        assert_eq!(voting, vec![PlayerId(2), PlayerId(3), PlayerId(0), PlayerId(1)]);
    }

    #[test]
    fn custodians_gate_blocks_phase() {
        assert!(require_custodians_removed(true).is_err());
        assert!(require_custodians_removed(false).is_ok());
    }

    #[test]
    fn tracks_has_voted_and_outcome_for_per_player() {
        let mut tally = VoteTally::new();
        assert!(!tally.has_voted(PlayerId(0)));
        tally.cast(&agenda(), PlayerId(0), &[(PlanetId(1), 2)], "For").unwrap();
        assert!(tally.has_voted(PlayerId(0)));
        assert_eq!(tally.outcome_for(PlayerId(0)), Some("For".to_string()));
        assert_eq!(tally.outcome_for(PlayerId(1)), None);
    }
}
