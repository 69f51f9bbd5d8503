//! Robot records and the identity store
//!
//! Every id ever minted keeps its record forever. Burning flips the record to
//! inactive; nothing is physically removed, so burned robots stay queryable.

use crate::address::Address;
use crate::error::RegistryError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub type RobotId = u64;

/// Where a robot came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Parentage {
    /// Minted directly, no parents
    Genesis,
    /// Bred from two parents
    Bred { parent_a: RobotId, parent_b: RobotId },
}

impl Parentage {
    pub fn parents(&self) -> Option<(RobotId, RobotId)> {
        match self {
            Parentage::Genesis => None,
            Parentage::Bred { parent_a, parent_b } => Some((*parent_a, *parent_b)),
        }
    }

    pub fn is_genesis(&self) -> bool {
        matches!(self, Parentage::Genesis)
    }
}

/// Robot status; the only transition is Active -> Burned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Active,
    Burned { at: DateTime<Utc> },
}

/// Attribute record of a single robot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Robot {
    pub id: RobotId,
    /// Current holder; for burned robots, the last holder
    pub owner: Address,
    pub created_at: DateTime<Utc>,
    pub parentage: Parentage,
    /// 0 for genesis, one past the older parent line for offspring
    pub generation: u64,
    /// SHA-256 fingerprint chained from the parents' fingerprints
    pub dna: String,
    pub status: Status,
}

impl Robot {
    pub fn is_active(&self) -> bool {
        matches!(self.status, Status::Active)
    }

    pub fn summary(&self) -> String {
        let lineage = match self.parentage {
            Parentage::Genesis => "genesis".to_string(),
            Parentage::Bred { parent_a, parent_b } => format!("{}x{}", parent_a, parent_b),
        };
        format!(
            "Robot #{} | owner={} | gen={} | lineage={} | dna={} | {}",
            self.id,
            self.owner,
            self.generation,
            lineage,
            self.dna.chars().take(12).collect::<String>(),
            if self.is_active() { "active" } else { "burned" }
        )
    }
}

/// Authoritative id -> record map. Ids are dense, so the store is a vector
/// indexed by id.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct RobotStore {
    robots: Vec<Robot>,
}

impl RobotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id the next `create` will hand out
    pub fn next_id(&self) -> RobotId {
        self.robots.len() as RobotId
    }

    /// Allocate the next id and store a new active record. Bred parents must
    /// already be allocated; the breeding engine checks this first.
    pub(crate) fn create(&mut self, owner: Address, at: DateTime<Utc>, parentage: Parentage) -> RobotId {
        let id = self.next_id();
        let parents = parentage
            .parents()
            .and_then(|(a, b)| Some((self.get(a).ok()?, self.get(b).ok()?)));
        debug_assert!(
            parentage.is_genesis() || parents.is_some(),
            "offspring {} created from unallocated parents {:?}",
            id,
            parentage
        );
        let (generation, dna) = match parents {
            Some((pa, pb)) => (
                pa.generation.max(pb.generation) + 1,
                offspring_dna(id, &pa.dna, &pb.dna),
            ),
            None => (0, genesis_dna(id, at)),
        };
        self.robots.push(Robot {
            id,
            owner,
            created_at: at,
            parentage,
            generation,
            dna,
            status: Status::Active,
        });
        id
    }

    /// Any allocated record, active or burned
    pub fn get(&self, id: RobotId) -> Result<&Robot, RegistryError> {
        usize::try_from(id)
            .ok()
            .and_then(|i| self.robots.get(i))
            .ok_or(RegistryError::NotFound(id))
    }

    /// An allocated record that has not been burned
    pub fn get_active(&self, id: RobotId) -> Result<&Robot, RegistryError> {
        self.get(id)
            .ok()
            .filter(|r| r.is_active())
            .ok_or(RegistryError::NotFound(id))
    }

    fn get_active_mut(&mut self, id: RobotId) -> Result<&mut Robot, RegistryError> {
        usize::try_from(id)
            .ok()
            .and_then(|i| self.robots.get_mut(i))
            .filter(|r| r.is_active())
            .ok_or(RegistryError::NotFound(id))
    }

    /// Update the owner field only; index upkeep belongs to the caller
    pub fn set_owner(&mut self, id: RobotId, new_owner: Address) -> Result<(), RegistryError> {
        self.get_active_mut(id)?.owner = new_owner;
        Ok(())
    }

    /// Mark a record burned, keeping the last owner for inspection
    pub fn deactivate(&mut self, id: RobotId, at: DateTime<Utc>) -> Result<(), RegistryError> {
        self.get_active_mut(id)?.status = Status::Burned { at };
        Ok(())
    }

    /// Every record ever created, in id order
    pub fn iter(&self) -> impl Iterator<Item = &Robot> {
        self.robots.iter()
    }

    /// Number of ids ever allocated
    pub fn len(&self) -> usize {
        self.robots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.robots.is_empty()
    }
}

fn genesis_dna(id: RobotId, at: DateTime<Utc>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"genesis");
    hasher.update(id.to_le_bytes());
    hasher.update(at.timestamp_millis().to_le_bytes());
    hex::encode(hasher.finalize())
}

fn offspring_dna(id: RobotId, dna_a: &str, dna_b: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(dna_a.as_bytes());
    hasher.update(dna_b.as_bytes());
    hasher.update(id.to_le_bytes());
    hasher.update(b"breed");
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    #[test]
    fn test_sequential_ids() {
        let mut store = RobotStore::new();
        for expected in 0..5 {
            let id = store.create(Address::new("admin"), t(0), Parentage::Genesis);
            assert_eq!(id, expected);
        }
        assert_eq!(store.len(), 5);
        assert_eq!(store.next_id(), 5);
    }

    #[test]
    fn test_summary_truncates_by_char() {
        let mut store = RobotStore::new();
        let id = store.create(Address::new("alice"), t(0), Parentage::Genesis);
        let mut robot = store.get(id).unwrap().clone();
        assert!(robot.summary().contains(&format!("dna={} ", &robot.dna[..12])));

        robot.dna = "ééééééééééééééé".to_string();
        assert!(robot.summary().contains("dna=éééééééééééé |"));
        robot.dna = "ab".to_string();
        assert!(robot.summary().contains("dna=ab |"));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "unallocated parents")]
    fn test_create_rejects_unallocated_parents() {
        let mut store = RobotStore::new();
        store.create(
            Address::new("alice"),
            t(0),
            Parentage::Bred { parent_a: 7, parent_b: 8 },
        );
    }

    #[test]
    fn test_get_unknown() {
        let store = RobotStore::new();
        assert_eq!(store.get(0), Err(RegistryError::NotFound(0)));
    }

    #[test]
    fn test_deactivate_keeps_record() {
        let mut store = RobotStore::new();
        let id = store.create(Address::new("alice"), t(10), Parentage::Genesis);
        store.deactivate(id, t(20)).unwrap();

        let robot = store.get(id).unwrap();
        assert!(!robot.is_active());
        assert_eq!(robot.owner, Address::new("alice"));
        assert!(store.get_active(id).is_err());
        // terminal: no second burn, no owner change
        assert!(store.deactivate(id, t(30)).is_err());
        assert!(store.set_owner(id, Address::new("bob")).is_err());
    }

    #[test]
    fn test_offspring_generation_and_dna() {
        let mut store = RobotStore::new();
        let a = store.create(Address::new("alice"), t(0), Parentage::Genesis);
        let b = store.create(Address::new("alice"), t(1), Parentage::Genesis);
        let c = store.create(
            Address::new("alice"),
            t(2),
            Parentage::Bred { parent_a: a, parent_b: b },
        );
        let d = store.create(
            Address::new("alice"),
            t(3),
            Parentage::Bred { parent_a: c, parent_b: a },
        );

        assert_eq!(store.get(c).unwrap().generation, 1);
        assert_eq!(store.get(d).unwrap().generation, 2);
        assert_eq!(store.get(c).unwrap().parentage.parents(), Some((a, b)));
        assert_ne!(store.get(c).unwrap().dna, store.get(a).unwrap().dna);
        assert_eq!(store.get(c).unwrap().dna.len(), 64);
    }
}
