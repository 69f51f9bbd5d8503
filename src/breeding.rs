//! Breeding engine — combine two active, mature robots into a new one
//!
//! Parents are never consumed or modified. The offspring goes to the caller
//! and records both parent ids as its lineage.

use crate::address::Address;
use crate::clock::Clock;
use crate::config::BreedingPolicy;
use crate::error::{BreedRefusal, RegistryError};
use crate::events::RegistryEvent;
use crate::lifecycle::Registry;
use crate::robot::{Parentage, Robot, RobotId};
use log::info;

impl<C: Clock> Registry<C> {
    /// Check whether `caller` may breed `parent_a` with `parent_b` right now
    pub fn can_breed(
        &self,
        caller: &Address,
        parent_a: RobotId,
        parent_b: RobotId,
    ) -> Result<(), RegistryError> {
        let a = self
            .store
            .get_active(parent_a)
            .map_err(|_| RegistryError::ParentNotFound(parent_a))?;
        let b = self
            .store
            .get_active(parent_b)
            .map_err(|_| RegistryError::ParentNotFound(parent_b))?;

        if parent_a == parent_b {
            return Err(RegistryError::BreedingNotAllowed(BreedRefusal::SameParent));
        }
        for parent in [a, b] {
            if !self.is_mature(parent) {
                return Err(RegistryError::BreedingNotAllowed(BreedRefusal::Immature {
                    id: parent.id,
                }));
            }
        }

        let owns_a = a.owner == *caller;
        let owns_b = b.owner == *caller;
        let allowed = match self.config.breeding_policy {
            BreedingPolicy::OwnerOfBoth => owns_a && owns_b,
            BreedingPolicy::OwnerOfEither => owns_a || owns_b,
            BreedingPolicy::Permissionless => true,
        };
        if !allowed {
            return Err(RegistryError::BreedingNotAllowed(BreedRefusal::NotOwner));
        }
        Ok(())
    }

    /// Breed two parents; the offspring is owned by `caller`
    pub fn breed(
        &mut self,
        caller: &Address,
        parent_a: RobotId,
        parent_b: RobotId,
    ) -> Result<RobotId, RegistryError> {
        self.can_breed(caller, parent_a, parent_b)?;
        let id = self.mint_unchecked(caller, Parentage::Bred { parent_a, parent_b })?;
        self.journal.record(
            self.clock.now(),
            RegistryEvent::Bred {
                id,
                parent_a,
                parent_b,
                owner: caller.clone(),
            },
        );
        info!(
            "Bred robot {} from {} x {} for {} (supply {})",
            id,
            parent_a,
            parent_b,
            caller,
            self.index.total()
        );
        Ok(id)
    }

    /// Whether a robot has been around long enough to become a parent
    pub fn is_mature(&self, robot: &Robot) -> bool {
        let age = self.clock.now() - robot.created_at;
        age >= self.config.maturity.threshold(robot.parentage.is_genesis())
    }
}
