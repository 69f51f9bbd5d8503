//! Event journal — append-only record of successful mutations

use crate::address::Address;
use crate::robot::RobotId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Something that changed registry state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RegistryEvent {
    Minted { id: RobotId, to: Address },
    Transferred { id: RobotId, from: Address, to: Address },
    Burned { id: RobotId, owner: Address },
    Bred { id: RobotId, parent_a: RobotId, parent_b: RobotId, owner: Address },
    Approval { id: RobotId, owner: Address, spender: Address },
    ApprovalForAll { owner: Address, operator: Address, approved: bool },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    /// Position in the journal, starting at 0
    pub seq: u64,
    pub at: DateTime<Utc>,
    pub event: RegistryEvent,
}

#[derive(Debug, Default, Clone)]
pub struct EventJournal {
    records: Vec<EventRecord>,
}

impl EventJournal {
    pub fn record(&mut self, at: DateTime<Utc>, event: RegistryEvent) {
        let seq = self.records.len() as u64;
        self.records.push(EventRecord { seq, at, event });
    }

    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
