//! Planet and planet-attachment state (L2 in the layering table).

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

use crate::ids::{PlanetId, PlayerId, UnitId};

/// An exploration or agenda card attached to a planet, modifying its
/// effective resources/influence until purged (§3 invariant 5).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Attachment {
    pub name: String,
    pub resource_modifier: i32,
    pub influence_modifier: i32,
}

/// A planet. Resources/influence are computed on demand from the base
/// values plus attachments; the raw fields are never read directly by
/// callers outside this module.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Planet {
    pub id: PlanetId,
    pub name: String,
    base_resources: u32,
    base_influence: u32,
    attachments: Vec<Attachment>,
    ground_forces: Vec<UnitId>,
    controlled_by: Option<PlayerId>,
    exhausted: bool,
    pub legendary: bool,
}

impl Planet {
    pub fn new(id: PlanetId, name: impl Into<String>, base_resources: u32, base_influence: u32) -> Self {
        Self {
            id,
            name: name.into(),
            base_resources,
            base_influence,
            attachments: Vec::new(),
            ground_forces: Vec::new(),
            controlled_by: None,
            exhausted: false,
            legendary: false,
        }
    }

    /// Effective resources: base plus the sum of attachment modifiers,
    /// floored at zero (§3 invariant 5).
    pub fn resources(&self) -> u32 {
        let total = self.base_resources as i32
            + self.attachments.iter().map(|a| a.resource_modifier).sum::<i32>();
        total.max(0) as u32
    }

    /// Effective influence: base plus the sum of attachment modifiers,
    /// floored at zero (§3 invariant 5, §8 invariant 5).
    pub fn influence(&self) -> u32 {
        let total = self.base_influence as i32
            + self.attachments.iter().map(|a| a.influence_modifier).sum::<i32>();
        total.max(0) as u32
    }

    pub fn attach(&mut self, attachment: Attachment) {
        self.attachments.push(attachment);
    }

    pub fn purge_attachment(&mut self, name: &str) {
        self.attachments.retain(|a| a.name != name);
    }

    pub fn ground_forces(&self) -> &[UnitId] {
        &self.ground_forces
    }

    pub fn controlled_by(&self) -> Option<PlayerId> {
        self.controlled_by
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn exhaust(&mut self) {
        self.exhausted = true;
    }

    pub fn ready(&mut self) {
        self.exhausted = false;
    }

    /// Recomputes `controlled_by` from the current ground-force garrison.
    /// A planet with no ground forces retains its last controller unless
    /// explicitly captured/uninhabited (§3 control consistency).
    pub fn recompute_control(&mut self, owner_of: impl Fn(UnitId) -> Option<PlayerId>) {
        if let Some(&first) = self.ground_forces.first() {
            self.controlled_by = owner_of(first);
        }
    }

    pub fn add_ground_force(&mut self, unit: UnitId, owner: PlayerId) {
        self.ground_forces.push(unit);
        self.controlled_by = Some(owner);
    }

    pub fn remove_ground_force(&mut self, unit: UnitId) {
        self.ground_forces.retain(|&u| u != unit);
    }

    pub fn set_control(&mut self, owner: Option<PlayerId>) {
        self.controlled_by = owner;
    }
}
