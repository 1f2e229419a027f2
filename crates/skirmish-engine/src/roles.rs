//! Reference role registry.

use std::collections::BTreeMap;

use skirmish_core::enums::UnitRole;
use skirmish_core::types::UnitTag;

use crate::collaborators::RoleRegistry;

/// Role bookkeeping with one level of undo: `release` restores the role
/// a unit held before its most recent reassignment.
#[derive(Debug, Clone, Default)]
pub struct RoleBook {
    roles: BTreeMap<UnitTag, UnitRole>,
    previous: BTreeMap<UnitTag, UnitRole>,
}

impl RoleBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn role_of(&self, tag: UnitTag) -> Option<UnitRole> {
        self.roles.get(&tag).copied()
    }

    /// Drop a unit that no longer exists.
    pub fn forget(&mut self, tag: UnitTag) {
        self.roles.remove(&tag);
        self.previous.remove(&tag);
    }
}

impl RoleRegistry for RoleBook {
    fn members(&self, role: UnitRole) -> Vec<UnitTag> {
        self.roles
            .iter()
            .filter(|(_, r)| **r == role)
            .map(|(tag, _)| *tag)
            .collect()
    }

    fn assign(&mut self, tag: UnitTag, role: UnitRole) {
        if let Some(old) = self.roles.insert(tag, role) {
            if old != role {
                self.previous.insert(tag, old);
            }
        }
    }

    fn release(&mut self, tag: UnitTag) {
        if let Some(prev) = self.previous.remove(&tag) {
            self.roles.insert(tag, prev);
        }
    }
}
