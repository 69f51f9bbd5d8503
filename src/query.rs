//! Query service — read-only projections over the registry
//!
//! A `Query` borrows the registry immutably, so holders can never mutate.

use crate::address::Address;
use crate::clock::Clock;
use crate::error::RegistryError;
use crate::index::EnumerationIndex;
use crate::lifecycle::Registry;
use crate::robot::{Robot, RobotId, RobotStore};
use serde::{Deserialize, Serialize};

/// Read-only view of a registry
#[derive(Debug, Clone, Copy)]
pub struct Query<'r> {
    name: &'r str,
    symbol: &'r str,
    store: &'r RobotStore,
    index: &'r EnumerationIndex,
}

/// Supply snapshot for reporting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplyStats {
    pub total_supply: usize,
    pub ever_minted: usize,
    pub burned: usize,
    pub holders: usize,
    pub max_generation: u64,
}

impl<C: Clock> Registry<C> {
    pub fn query(&self) -> Query<'_> {
        Query {
            name: &self.config.name,
            symbol: &self.config.symbol,
            store: &self.store,
            index: &self.index,
        }
    }
}

impl<'r> Query<'r> {
    pub fn name(&self) -> &'r str {
        self.name
    }

    pub fn symbol(&self) -> &'r str {
        self.symbol
    }

    /// Number of active robots
    pub fn total_supply(&self) -> usize {
        self.index.total()
    }

    pub fn token_by_global_index(&self, position: usize) -> Result<RobotId, RegistryError> {
        self.index.by_global_position(position)
    }

    pub fn token_of_owner_by_index(
        &self,
        owner: &Address,
        position: usize,
    ) -> Result<RobotId, RegistryError> {
        self.index.by_owner_position(owner, position)
    }

    /// Number of active robots held by `owner`
    pub fn balance_of(&self, owner: &Address) -> usize {
        self.index.owner_total(owner)
    }

    /// Current owner of an active robot
    pub fn owner_of(&self, id: RobotId) -> Result<&'r Address, RegistryError> {
        Ok(&self.store.get_active(id)?.owner)
    }

    /// Record for any allocated id, burned ones included
    pub fn robot(&self, id: RobotId) -> Result<&'r Robot, RegistryError> {
        self.store.get(id)
    }

    /// Active robots in global enumeration order
    pub fn all_active(&self) -> Result<Vec<&'r Robot>, RegistryError> {
        self.resolve(self.index.global_ids())
    }

    /// Active robots of `owner` in owner enumeration order
    pub fn all_active_of(&self, owner: &Address) -> Result<Vec<&'r Robot>, RegistryError> {
        self.resolve(self.index.owner_ids(owner))
    }

    /// Every record ever minted, in id order
    pub fn all_records(&self) -> Vec<&'r Robot> {
        self.store.iter().collect()
    }

    pub fn stats(&self) -> SupplyStats {
        SupplyStats {
            total_supply: self.index.total(),
            ever_minted: self.store.len(),
            burned: self.store.len() - self.index.total(),
            holders: self.index.owners().count(),
            max_generation: self.store.iter().map(|r| r.generation).max().unwrap_or(0),
        }
    }

    fn resolve(&self, ids: &[RobotId]) -> Result<Vec<&'r Robot>, RegistryError> {
        ids.iter().map(|&id| self.store.get_active(id)).collect()
    }
}
