//! Promissory notes and the Alliance commander-sharing mechanic (§4.6).

use std::collections::{HashMap, HashSet};

use crate::ids::{NoteId, PlayerId};

/// Grants the recipient the right to invoke the issuer's commander ability,
/// created when an Alliance note is activated (§4.6). Multiple grants
/// (from multiple Alliance notes) are independent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AllianceGrant {
    pub issuer: PlayerId,
    pub recipient: PlayerId,
}

/// Owns note hands and the available-notes pool. Every apply produces a
/// freshly cloned manager (§9: "a shallow clone of hands only was a latent
/// bug" — `Clone` here always deep-copies both hands and the pool since
/// neither field holds interior-mutable/shared state).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromissoryNoteManager {
    hands: HashMap<PlayerId, Vec<NoteId>>,
    /// Notes not currently held by anyone (returned or never issued).
    available: HashSet<NoteId>,
    alliance_grants: HashSet<AllianceGrant>,
    /// The faction a note was originally printed for, independent of who
    /// currently holds it — Alliance activation shares *this* player's
    /// commander, not the current holder's (§4.6).
    issuers: HashMap<NoteId, PlayerId>,
}

impl PromissoryNoteManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hand(&self, player: PlayerId) -> &[NoteId] {
        self.hands.get(&player).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn issue_to_available_pool(&mut self, note: NoteId, issuer: PlayerId) {
        self.available.insert(note);
        self.issuers.insert(note, issuer);
    }

    /// The player this note was originally printed for (§4.6), independent
    /// of who currently holds it.
    pub fn issuer_of(&self, note: NoteId) -> Option<PlayerId> {
        self.issuers.get(&note).copied()
    }

    pub fn give(&mut self, note: NoteId, to: PlayerId) {
        self.available.remove(&note);
        self.hands.entry(to).or_default().push(note);
    }

    /// Moves a note from one player's hand to another's, used by the
    /// transaction manager's promissory-note effect step (§4.2).
    pub fn transfer(&mut self, note: NoteId, from: PlayerId, to: PlayerId) -> bool {
        let Some(hand) = self.hands.get_mut(&from) else {
            return false;
        };
        let Some(pos) = hand.iter().position(|&n| n == note) else {
            return false;
        };
        hand.remove(pos);
        self.hands.entry(to).or_default().push(note);
        true
    }

    pub fn owns(&self, player: PlayerId, note: NoteId) -> bool {
        self.hand(player).contains(&note)
    }

    /// Activates an Alliance note: `issuer`'s commander must be unlocked.
    /// Returns the new grant, or `None` if the precondition fails.
    pub fn activate_alliance(&mut self, issuer: PlayerId, recipient: PlayerId, commander_unlocked: bool) -> Option<AllianceGrant> {
        if !commander_unlocked {
            return None;
        }
        let grant = AllianceGrant { issuer, recipient };
        self.alliance_grants.insert(grant);
        Some(grant)
    }

    /// Returning the note revokes the grant atomically (§4.6).
    pub fn revoke_alliance(&mut self, issuer: PlayerId, recipient: PlayerId) {
        self.alliance_grants.remove(&AllianceGrant { issuer, recipient });
    }

    /// Eliminating `issuer` revokes all outstanding grants of their
    /// commander, regardless of who currently holds the note (§4.6, §4.8).
    pub fn revoke_all_grants_from(&mut self, issuer: PlayerId) {
        self.alliance_grants.retain(|g| g.issuer != issuer);
    }

    pub fn can_invoke_commander(&self, recipient: PlayerId, issuer: PlayerId) -> bool {
        self.alliance_grants.contains(&AllianceGrant { issuer, recipient })
    }

    pub fn active_grants(&self) -> impl Iterator<Item = &AllianceGrant> {
        self.alliance_grants.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alliance_revocation_scenario() {
        // §8 scenario (e)
        let p1 = PlayerId(0);
        let p2 = PlayerId(1);
        let note = NoteId::new();
        let mut mgr = PromissoryNoteManager::new();
        mgr.give(note, p1);
        assert!(mgr.transfer(note, p1, p2));
        assert!(mgr.activate_alliance(p1, p2, true).is_some());
        assert!(mgr.can_invoke_commander(p2, p1));

        mgr.revoke_alliance(p1, p2);
        assert!(!mgr.can_invoke_commander(p2, p1));

        // P2 re-acquires the note but P1 is now eliminated.
        assert!(mgr.activate_alliance(p1, p2, true).is_some());
        mgr.revoke_all_grants_from(p1);
        assert!(!mgr.can_invoke_commander(p2, p1));
    }

    #[test]
    fn issuer_is_tracked_independent_of_current_holder() {
        let issuer = PlayerId(0);
        let holder = PlayerId(1);
        let note = NoteId::new();
        let mut mgr = PromissoryNoteManager::new();
        mgr.issue_to_available_pool(note, issuer);
        mgr.give(note, holder);
        assert_eq!(mgr.issuer_of(note), Some(issuer));
        assert!(mgr.owns(holder, note));
    }

    #[test]
    fn multiple_alliance_notes_are_independent() {
        let issuer = PlayerId(0);
        let r1 = PlayerId(1);
        let r2 = PlayerId(2);
        let mut mgr = PromissoryNoteManager::new();
        mgr.activate_alliance(issuer, r1, true);
        mgr.activate_alliance(issuer, r2, true);
        mgr.revoke_alliance(issuer, r1);
        assert!(!mgr.can_invoke_commander(r1, issuer));
        assert!(mgr.can_invoke_commander(r2, issuer));
    }
}
