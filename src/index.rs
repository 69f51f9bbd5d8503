//! Enumeration index — global and per-owner position lists
//!
//! Each list is a dense vector of ids plus a reverse lookup (id -> slot), so
//! removal is O(1): the last id is moved into the vacated slot and the vector
//! shrinks. Surviving ids before the removed slot keep their positions; the
//! previously-last id does not.

use crate::address::Address;
use crate::error::RegistryError;
use crate::robot::RobotId;
use log::debug;
use std::collections::HashMap;

/// Dense ordered id list with swap-and-pop removal
#[derive(Debug, Default, Clone)]
pub struct DenseList {
    ids: Vec<RobotId>,
    slots: HashMap<RobotId, usize>,
}

impl DenseList {
    pub fn push(&mut self, id: RobotId) -> Result<(), RegistryError> {
        if self.slots.contains_key(&id) {
            return Err(RegistryError::InvariantViolation(format!(
                "robot {} already enumerated",
                id
            )));
        }
        self.slots.insert(id, self.ids.len());
        self.ids.push(id);
        Ok(())
    }

    pub fn swap_remove(&mut self, id: RobotId) -> Result<(), RegistryError> {
        let slot = self.slots.remove(&id).ok_or_else(|| {
            RegistryError::InvariantViolation(format!("robot {} missing from index", id))
        })?;
        self.ids.swap_remove(slot);
        if let Some(&moved) = self.ids.get(slot) {
            self.slots.insert(moved, slot);
        }
        Ok(())
    }

    pub fn get(&self, position: usize) -> Result<RobotId, RegistryError> {
        self.ids
            .get(position)
            .copied()
            .ok_or(RegistryError::IndexOutOfRange {
                index: position,
                len: self.ids.len(),
            })
    }

    pub fn contains(&self, id: RobotId) -> bool {
        self.slots.contains_key(&id)
    }

    pub fn position_of(&self, id: RobotId) -> Option<usize> {
        self.slots.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn as_slice(&self) -> &[RobotId] {
        &self.ids
    }
}

/// Global list of active ids plus one list per owner
#[derive(Debug, Default, Clone)]
pub struct EnumerationIndex {
    global: DenseList,
    owners: HashMap<Address, DenseList>,
}

impl EnumerationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append to the global list and the owner's list
    pub fn insert(&mut self, id: RobotId, owner: &Address) -> Result<(), RegistryError> {
        if self.global.contains(id) {
            return Err(RegistryError::InvariantViolation(format!(
                "robot {} already enumerated",
                id
            )));
        }
        self.owners.entry(owner.clone()).or_default().push(id)?;
        self.global.push(id)?;
        debug!("indexed robot {} for {}", id, owner);
        Ok(())
    }

    /// Remove from the owner's list and the global list
    pub fn remove(&mut self, id: RobotId, owner: &Address) -> Result<(), RegistryError> {
        if !self.global.contains(id) {
            return Err(RegistryError::InvariantViolation(format!(
                "robot {} missing from global index",
                id
            )));
        }
        self.remove_from_owner(id, owner)?;
        self.global.swap_remove(id)?;
        debug!("unindexed robot {} from {}", id, owner);
        Ok(())
    }

    /// Move between owner lists; global membership is unchanged
    pub fn move_owner(
        &mut self,
        id: RobotId,
        from: &Address,
        to: &Address,
    ) -> Result<(), RegistryError> {
        if from == to {
            return if self.owner_list_contains(from, id) {
                Ok(())
            } else {
                Err(RegistryError::InvariantViolation(format!(
                    "robot {} missing from index of {}",
                    id, from
                )))
            };
        }
        self.remove_from_owner(id, from)?;
        self.owners.entry(to.clone()).or_default().push(id)?;
        debug!("moved robot {} from {} to {}", id, from, to);
        Ok(())
    }

    pub fn by_global_position(&self, position: usize) -> Result<RobotId, RegistryError> {
        self.global.get(position)
    }

    pub fn by_owner_position(&self, owner: &Address, position: usize) -> Result<RobotId, RegistryError> {
        match self.owners.get(owner) {
            Some(list) => list.get(position),
            None => Err(RegistryError::IndexOutOfRange { index: position, len: 0 }),
        }
    }

    pub fn total(&self) -> usize {
        self.global.len()
    }

    pub fn owner_total(&self, owner: &Address) -> usize {
        self.owners.get(owner).map_or(0, DenseList::len)
    }

    pub fn global_ids(&self) -> &[RobotId] {
        self.global.as_slice()
    }

    pub fn owner_ids(&self, owner: &Address) -> &[RobotId] {
        self.owners.get(owner).map(DenseList::as_slice).unwrap_or(&[])
    }

    /// Owners with at least one robot, in no particular order
    pub fn owners(&self) -> impl Iterator<Item = (&Address, &[RobotId])> {
        self.owners.iter().map(|(owner, list)| (owner, list.as_slice()))
    }

    fn owner_list_contains(&self, owner: &Address, id: RobotId) -> bool {
        self.owners.get(owner).is_some_and(|list| list.contains(id))
    }

    fn remove_from_owner(&mut self, id: RobotId, owner: &Address) -> Result<(), RegistryError> {
        let list = self.owners.get_mut(owner).ok_or_else(|| {
            RegistryError::InvariantViolation(format!("{} has no enumerated robots", owner))
        })?;
        list.swap_remove(id)?;
        if list.is_empty() {
            self.owners.remove(owner);
        }
        Ok(())
    }
}
