//! Access control — admin identity, per-robot approvals and operators
//!
//! All permission decisions go through `AccessControl::permits`; mutating
//! operations call `authorize` once, before touching any state.

use crate::address::Address;
use crate::error::{RegistryError, Role};
use crate::robot::{Robot, RobotId};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone)]
pub struct AccessControl {
    admin: Address,
    /// One approved spender per robot
    approved: HashMap<RobotId, Address>,
    /// owner -> operators acting on all of the owner's robots
    operators: HashMap<Address, HashSet<Address>>,
}

impl AccessControl {
    pub fn new(admin: Address) -> Self {
        Self {
            admin,
            approved: HashMap::new(),
            operators: HashMap::new(),
        }
    }

    pub fn admin(&self) -> &Address {
        &self.admin
    }

    /// Whether `caller` holds `role`, for `robot` when the role is per-robot
    pub fn permits(&self, caller: &Address, role: Role, robot: Option<&Robot>) -> bool {
        if caller.is_null() {
            return false;
        }
        match (role, robot) {
            (Role::Admin, _) => *caller == self.admin,
            (Role::OwnerOrOperator, Some(robot)) => {
                robot.owner == *caller || self.is_operator(&robot.owner, caller)
            }
            (Role::OwnerOrApproved, Some(robot)) => {
                robot.owner == *caller
                    || self.approved.get(&robot.id) == Some(caller)
                    || self.is_operator(&robot.owner, caller)
            }
            (Role::OwnerApprovedOrAdmin, Some(_)) => {
                *caller == self.admin || self.permits(caller, Role::OwnerOrApproved, robot)
            }
            (_, None) => false,
        }
    }

    pub fn authorize(
        &self,
        caller: &Address,
        role: Role,
        robot: Option<&Robot>,
    ) -> Result<(), RegistryError> {
        if self.permits(caller, role, robot) {
            Ok(())
        } else {
            Err(RegistryError::AccessDenied {
                caller: caller.clone(),
                role,
            })
        }
    }

    /// Set or, with the null address, clear the approved spender of a robot
    pub fn set_approved(&mut self, id: RobotId, spender: Address) {
        if spender.is_null() {
            self.approved.remove(&id);
        } else {
            self.approved.insert(id, spender);
        }
    }

    pub fn approved(&self, id: RobotId) -> Option<&Address> {
        self.approved.get(&id)
    }

    pub fn clear_approved(&mut self, id: RobotId) {
        self.approved.remove(&id);
    }

    pub fn set_operator(&mut self, owner: &Address, operator: Address, enabled: bool) {
        if enabled {
            self.operators.entry(owner.clone()).or_default().insert(operator);
        } else if let Some(set) = self.operators.get_mut(owner) {
            set.remove(&operator);
            if set.is_empty() {
                self.operators.remove(owner);
            }
        }
    }

    pub fn is_operator(&self, owner: &Address, operator: &Address) -> bool {
        self.operators
            .get(owner)
            .is_some_and(|set| set.contains(operator))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::robot::{Parentage, Status};
    use chrono::Utc;

    fn robot(id: RobotId, owner: &str) -> Robot {
        Robot {
            id,
            owner: Address::new(owner),
            created_at: Utc::now(),
            parentage: Parentage::Genesis,
            generation: 0,
            dna: String::new(),
            status: Status::Active,
        }
    }

    #[test]
    fn test_admin_only() {
        let access = AccessControl::new(Address::new("admin"));
        assert!(access.permits(&Address::new("admin"), Role::Admin, None));
        let err = access
            .authorize(&Address::new("player1"), Role::Admin, None)
            .unwrap_err();
        assert_eq!(err.code(), "018001");
    }

    #[test]
    fn test_owner_approved_operator() {
        let mut access = AccessControl::new(Address::new("admin"));
        let bot = robot(3, "admin");
        let player2 = Address::new("player2");
        let player3 = Address::new("player3");

        assert!(!access.permits(&player2, Role::OwnerOrApproved, Some(&bot)));
        access.set_approved(3, player2.clone());
        assert!(access.permits(&player2, Role::OwnerOrApproved, Some(&bot)));
        // an approved spender cannot re-approve
        assert!(!access.permits(&player2, Role::OwnerOrOperator, Some(&bot)));

        access.set_operator(&Address::new("admin"), player3.clone(), true);
        assert!(access.permits(&player3, Role::OwnerOrOperator, Some(&bot)));
        access.set_operator(&Address::new("admin"), player3.clone(), false);
        assert!(!access.permits(&player3, Role::OwnerOrApproved, Some(&bot)));

        access.clear_approved(3);
        assert!(access.approved(3).is_none());
    }

    #[test]
    fn test_admin_may_act_on_any_robot() {
        let access = AccessControl::new(Address::new("admin"));
        let bot = robot(2, "player1");
        assert!(access.permits(&Address::new("admin"), Role::OwnerApprovedOrAdmin, Some(&bot)));
        assert!(access.permits(&Address::new("player1"), Role::OwnerApprovedOrAdmin, Some(&bot)));
        assert!(!access.permits(&Address::new("admin"), Role::OwnerOrApproved, Some(&bot)));
        let err = access
            .authorize(&Address::new("player2"), Role::OwnerApprovedOrAdmin, Some(&bot))
            .unwrap_err();
        assert_eq!(err.code(), "003004");
    }

    #[test]
    fn test_null_caller_never_permitted() {
        let access = AccessControl::new(Address::new("admin"));
        let bot = robot(0, "");
        assert!(!access.permits(&Address::null(), Role::OwnerOrApproved, Some(&bot)));
    }
}
