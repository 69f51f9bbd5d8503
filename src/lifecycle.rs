//! Registry and lifecycle engine — mint, transfer, burn
//!
//! Every mutating operation validates first and mutates after, so a failed
//! call leaves the store, the index and the approvals exactly as they were.
//! The only fallible mutation step is the index update, and it always runs
//! before the identity store is touched.

use crate::access::AccessControl;
use crate::address::Address;
use crate::clock::{Clock, SystemClock};
use crate::config::RegistryConfig;
use crate::error::{ConfigError, RegistryError, Role};
use crate::events::{EventJournal, EventRecord, RegistryEvent};
use crate::index::EnumerationIndex;
use crate::robot::{Parentage, RobotId, RobotStore};
use log::{info, warn};
use std::collections::HashSet;

/// The robot registry: sole owner of all registry state
#[derive(Debug)]
pub struct Registry<C: Clock = SystemClock> {
    pub(crate) config: RegistryConfig,
    pub(crate) store: RobotStore,
    pub(crate) index: EnumerationIndex,
    pub(crate) access: AccessControl,
    pub(crate) journal: EventJournal,
    pub(crate) clock: C,
}

impl Registry<SystemClock> {
    /// Create an empty registry on the wall clock
    pub fn new(config: RegistryConfig) -> Result<Self, ConfigError> {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> Registry<C> {
    /// Create an empty registry with an explicit time source
    pub fn with_clock(config: RegistryConfig, clock: C) -> Result<Self, ConfigError> {
        config.validate()?;
        info!(
            "Registry '{}' ({}) initialized, admin={}",
            config.name, config.symbol, config.admin
        );
        Ok(Self {
            access: AccessControl::new(config.admin.clone()),
            config,
            store: RobotStore::new(),
            index: EnumerationIndex::new(),
            journal: EventJournal::default(),
            clock,
        })
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Mint a genesis robot to `to`; admin only
    pub fn mint(&mut self, caller: &Address, to: &Address) -> Result<RobotId, RegistryError> {
        if let Err(e) = self.access.authorize(caller, Role::Admin, None) {
            warn!("Rejected mint by {}: not the registry admin", caller);
            return Err(e);
        }
        let id = self.mint_unchecked(to, Parentage::Genesis)?;
        self.journal.record(
            self.clock.now(),
            RegistryEvent::Minted { id, to: to.clone() },
        );
        info!("Minted robot {} to {} (supply {})", id, to, self.index.total());
        Ok(id)
    }

    /// Allocate, index and store a new robot. Shared by mint and breed;
    /// callers have already checked permissions.
    pub(crate) fn mint_unchecked(
        &mut self,
        to: &Address,
        parentage: Parentage,
    ) -> Result<RobotId, RegistryError> {
        if to.is_null() {
            return Err(RegistryError::InvalidRecipient);
        }
        let id = self.store.next_id();
        self.index.insert(id, to)?;
        let created = self.store.create(to.clone(), self.clock.now(), parentage);
        debug_assert_eq!(created, id);
        Ok(id)
    }

    /// Move `id` from `from` to `to`. Authorization of the caller belongs to
    /// the transfer protocol; see `transfer_from` for the checked form.
    pub fn transfer(&mut self, from: &Address, to: &Address, id: RobotId) -> Result<(), RegistryError> {
        let owned = self
            .store
            .get_active(id)
            .is_ok_and(|robot| robot.owner == *from);
        if !owned {
            return Err(RegistryError::NotOwner {
                id,
                claimed: from.clone(),
            });
        }
        if to.is_null() {
            return Err(RegistryError::InvalidRecipient);
        }
        self.index.move_owner(id, from, to)?;
        self.store.set_owner(id, to.clone())?;
        self.access.clear_approved(id);
        self.journal.record(
            self.clock.now(),
            RegistryEvent::Transferred {
                id,
                from: from.clone(),
                to: to.clone(),
            },
        );
        info!("Transferred robot {} from {} to {}", id, from, to);
        Ok(())
    }

    /// Transfer on behalf of `caller`, who must be the owner, the approved
    /// spender, or an operator of the owner
    pub fn transfer_from(
        &mut self,
        caller: &Address,
        from: &Address,
        to: &Address,
        id: RobotId,
    ) -> Result<(), RegistryError> {
        let robot = self.store.get_active(id)?;
        self.access.authorize(caller, Role::OwnerOrApproved, Some(robot))?;
        self.transfer(from, to, id)
    }

    /// Burn an active robot on behalf of its owner, an approved spender, an
    /// operator or the admin. The record stays queryable as burned.
    pub fn burn(&mut self, caller: &Address, id: RobotId) -> Result<(), RegistryError> {
        let robot = self.store.get_active(id)?;
        self.access.authorize(caller, Role::OwnerApprovedOrAdmin, Some(robot))?;
        let owner = robot.owner.clone();

        self.index.remove(id, &owner)?;
        let now = self.clock.now();
        self.store.deactivate(id, now)?;
        self.access.clear_approved(id);
        self.journal.record(now, RegistryEvent::Burned { id, owner: owner.clone() });
        info!("Burned robot {} of {} (supply {})", id, owner, self.index.total());
        Ok(())
    }

    /// Approve `spender` for a single robot; the null address clears it
    pub fn approve(&mut self, caller: &Address, spender: &Address, id: RobotId) -> Result<(), RegistryError> {
        let robot = self.store.get_active(id)?;
        self.access.authorize(caller, Role::OwnerOrOperator, Some(robot))?;
        let owner = robot.owner.clone();
        self.access.set_approved(id, spender.clone());
        self.journal.record(
            self.clock.now(),
            RegistryEvent::Approval {
                id,
                owner,
                spender: spender.clone(),
            },
        );
        info!("Robot {} approved for {}", id, spender);
        Ok(())
    }

    /// Let `operator` act on every robot `caller` holds, now and later
    pub fn set_approval_for_all(
        &mut self,
        caller: &Address,
        operator: &Address,
        approved: bool,
    ) -> Result<(), RegistryError> {
        if operator.is_null() {
            return Err(RegistryError::InvalidRecipient);
        }
        self.access.set_operator(caller, operator.clone(), approved);
        self.journal.record(
            self.clock.now(),
            RegistryEvent::ApprovalForAll {
                owner: caller.clone(),
                operator: operator.clone(),
                approved,
            },
        );
        info!("Operator {} for {}: {}", operator, caller, approved);
        Ok(())
    }

    pub fn get_approved(&self, id: RobotId) -> Result<Option<&Address>, RegistryError> {
        self.store.get_active(id)?;
        Ok(self.access.approved(id))
    }

    pub fn is_approved_for_all(&self, owner: &Address, operator: &Address) -> bool {
        self.access.is_operator(owner, operator)
    }

    /// Journal of successful mutations, oldest first
    pub fn events(&self) -> &[EventRecord] {
        self.journal.records()
    }

    /// Check the cross-structure invariants between the identity store and
    /// both enumeration indices
    pub fn verify_integrity(&self) -> Result<(), RegistryError> {
        let fail = |msg: String| Err(RegistryError::InvariantViolation(msg));

        for (position, robot) in self.store.iter().enumerate() {
            if robot.id != position as RobotId {
                return fail(format!("record at {} carries id {}", position, robot.id));
            }
        }

        let global = self.index.global_ids();
        let mut seen = HashSet::with_capacity(global.len());
        for &id in global {
            if !seen.insert(id) {
                return fail(format!("robot {} enumerated twice", id));
            }
            if self.store.get_active(id).is_err() {
                return fail(format!("robot {} enumerated but not active", id));
            }
        }

        let active = self.store.iter().filter(|r| r.is_active()).count();
        if active != global.len() {
            return fail(format!("{} active robots but supply {}", active, global.len()));
        }

        let mut owned = 0;
        for (owner, ids) in self.index.owners() {
            for &id in ids {
                if !seen.contains(&id) {
                    return fail(format!("robot {} owned by {} but not global", id, owner));
                }
                let robot = self.store.get(id)?;
                if robot.owner != *owner {
                    return fail(format!("robot {} indexed under {} but owned by {}", id, owner, robot.owner));
                }
            }
            owned += ids.len();
        }
        if owned != global.len() {
            return fail(format!("owner lists hold {} ids, global {}", owned, global.len()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn addr(s: &str) -> Address {
        Address::new(s)
    }

    fn registry() -> Registry<ManualClock> {
        Registry::with_clock(RegistryConfig::with_admin("admin"), ManualClock::default()).unwrap()
    }

    fn mint_n(reg: &mut Registry<ManualClock>, n: usize) {
        for _ in 0..n {
            reg.mint(&addr("admin"), &addr("admin")).unwrap();
        }
    }

    #[test]
    fn test_mint_sequential() {
        let mut reg = registry();
        mint_n(&mut reg, 5);
        let q = reg.query();
        assert_eq!(q.total_supply(), 5);
        for k in 0..5 {
            assert_eq!(q.token_by_global_index(k).unwrap(), k as RobotId);
        }
        assert_eq!(q.token_of_owner_by_index(&addr("admin"), 3).unwrap(), 3);
        reg.verify_integrity().unwrap();
    }

    #[test]
    fn test_mint_not_admin() {
        let mut reg = registry();
        let err = reg.mint(&addr("player1"), &addr("player1")).unwrap_err();
        assert_eq!(err.code(), "018001");
        assert_eq!(reg.query().total_supply(), 0);
        assert!(reg.events().is_empty());
    }

    #[test]
    fn test_mint_to_null() {
        let mut reg = registry();
        let err = reg.mint(&addr("admin"), &Address::null()).unwrap_err();
        assert_eq!(err, RegistryError::InvalidRecipient);
        assert_eq!(reg.store.len(), 0);
        reg.verify_integrity().unwrap();
    }

    #[test]
    fn test_transfer_moves_owner_index() {
        let mut reg = registry();
        mint_n(&mut reg, 5);
        reg.transfer(&addr("admin"), &addr("player1"), 2).unwrap();

        let q = reg.query();
        assert_eq!(q.balance_of(&addr("admin")), 4);
        assert_eq!(q.balance_of(&addr("player1")), 1);
        assert_eq!(q.total_supply(), 5);
        assert_eq!(q.owner_of(2).unwrap(), &addr("player1"));
        assert_eq!(q.token_of_owner_by_index(&addr("player1"), 0).unwrap(), 2);
        reg.verify_integrity().unwrap();
    }

    #[test]
    fn test_transfer_failures_change_nothing() {
        let mut reg = registry();
        mint_n(&mut reg, 3);
        let before = reg.index.owner_ids(&addr("admin")).to_vec();

        let err = reg.transfer(&addr("player1"), &addr("player2"), 1).unwrap_err();
        assert_eq!(err.code(), "003007");
        let err = reg.transfer(&addr("admin"), &Address::null(), 1).unwrap_err();
        assert_eq!(err, RegistryError::InvalidRecipient);
        assert!(reg.transfer(&addr("admin"), &addr("player2"), 42).is_err());

        assert_eq!(reg.index.owner_ids(&addr("admin")), before.as_slice());
        assert_eq!(reg.events().len(), 3);
        reg.verify_integrity().unwrap();
    }

    #[test]
    fn test_transfer_from_approvals() {
        let mut reg = registry();
        mint_n(&mut reg, 5);
        let (admin, p1, p2, p3, p4) = (addr("admin"), addr("player1"), addr("player2"), addr("player3"), addr("player4"));

        reg.transfer_from(&admin, &admin, &p1, 2).unwrap();
        reg.approve(&admin, &p2, 3).unwrap();
        reg.set_approval_for_all(&admin, &p3, true).unwrap();
        reg.transfer_from(&p2, &admin, &p4, 3).unwrap();
        reg.transfer_from(&p3, &admin, &p4, 1).unwrap();

        let q = reg.query();
        assert_eq!(q.balance_of(&p1), 1);
        assert_eq!(q.balance_of(&p4), 2);
        assert_eq!(q.owner_of(1).unwrap(), &p4);
        // approval does not survive the transfer
        assert_eq!(reg.get_approved(3).unwrap(), None);

        let err = reg.transfer_from(&p2, &p4, &p2, 3).unwrap_err();
        assert_eq!(err.code(), "003004");
        reg.verify_integrity().unwrap();
    }

    #[test]
    fn test_burn_swap_and_pop() {
        let mut reg = registry();
        mint_n(&mut reg, 5);
        assert_eq!(reg.query().token_by_global_index(2).unwrap(), 2);

        reg.burn(&addr("admin"), 1).unwrap();
        let q = reg.query();
        assert_eq!(q.total_supply(), 4);
        assert_eq!(q.token_by_global_index(1).unwrap(), 4);
        let burned = q.robot(1).unwrap();
        assert!(!burned.is_active());
        assert_eq!(burned.owner, addr("admin"));
        assert!(q.owner_of(1).is_err());
        reg.verify_integrity().unwrap();
    }

    #[test]
    fn test_burn_rules() {
        let mut reg = registry();
        mint_n(&mut reg, 3);
        reg.transfer(&addr("admin"), &addr("player1"), 2).unwrap();

        let err = reg.burn(&addr("player2"), 2).unwrap_err();
        assert!(matches!(err, RegistryError::AccessDenied { role: Role::OwnerApprovedOrAdmin, .. }));
        let err = reg.burn(&addr("player1"), 0).unwrap_err();
        assert_eq!(err.code(), "003004");

        // the admin may burn robots held by other players
        reg.burn(&addr("admin"), 2).unwrap();
        assert_eq!(reg.burn(&addr("player1"), 2).unwrap_err(), RegistryError::NotFound(2));
        assert_eq!(reg.burn(&addr("admin"), 99).unwrap_err(), RegistryError::NotFound(99));
        // burned robots cannot be transferred
        assert!(reg.transfer(&addr("player1"), &addr("admin"), 2).is_err());
        reg.verify_integrity().unwrap();
    }

    #[test]
    fn test_admin_burns_across_holders() {
        let mut reg = registry();
        mint_n(&mut reg, 10);
        for id in 2..=4 {
            reg.transfer(&addr("admin"), &addr("player1"), id).unwrap();
        }

        reg.burn(&addr("admin"), 1).unwrap();
        reg.verify_integrity().unwrap();
        reg.burn(&addr("admin"), 2).unwrap();
        reg.verify_integrity().unwrap();
        assert_eq!(reg.query().total_supply(), 8);
        assert_eq!(reg.query().token_by_global_index(1).unwrap(), 9);
        assert_eq!(reg.query().token_of_owner_by_index(&addr("player1"), 0).unwrap(), 4);

        reg.burn(&addr("admin"), 4).unwrap();
        reg.verify_integrity().unwrap();
        let q = reg.query();
        assert_eq!(q.total_supply(), 7);
        assert_eq!(q.balance_of(&addr("player1")), 1);
        assert_eq!(q.token_of_owner_by_index(&addr("player1"), 0).unwrap(), 3);
        assert!(!q.robot(4).unwrap().is_active());
        assert_eq!(q.robot(4).unwrap().owner, addr("player1"));
    }

    #[test]
    fn test_approved_spender_may_burn() {
        let mut reg = registry();
        mint_n(&mut reg, 2);
        reg.approve(&addr("admin"), &addr("player2"), 0).unwrap();
        reg.burn(&addr("player2"), 0).unwrap();
        assert_eq!(reg.query().total_supply(), 1);
    }

    #[test]
    fn test_ids_never_reused() {
        let mut reg = registry();
        mint_n(&mut reg, 3);
        reg.burn(&addr("admin"), 2).unwrap();
        let id = reg.mint(&addr("admin"), &addr("admin")).unwrap();
        assert_eq!(id, 3);
        assert_eq!(reg.query().all_records().len(), 4);
        reg.verify_integrity().unwrap();
    }

    #[test]
    fn test_events_recorded() {
        let mut reg = registry();
        mint_n(&mut reg, 2);
        reg.transfer(&addr("admin"), &addr("bob"), 0).unwrap();
        reg.burn(&addr("bob"), 0).unwrap();
        let kinds: Vec<_> = reg.events().iter().map(|r| r.event.clone()).collect();
        assert_eq!(
            kinds[2],
            RegistryEvent::Transferred { id: 0, from: addr("admin"), to: addr("bob") }
        );
        assert_eq!(kinds[3], RegistryEvent::Burned { id: 0, owner: addr("bob") });
    }
}
