//! Registry errors with stable machine-readable codes
//!
//! Codes are part of the external contract; callers match on `code()`,
//! never on the display text.

use crate::address::Address;
use crate::robot::RobotId;
use serde::{Deserialize, Serialize};

/// Capability a caller needs for an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// The single privileged registry identity
    Admin,
    /// Owner of the robot, its approved spender, or an operator of the owner
    OwnerOrApproved,
    /// Owner of the robot, or an operator of the owner
    OwnerOrOperator,
    /// Anyone holding `OwnerOrApproved`, or the registry admin
    OwnerApprovedOrAdmin,
}

/// Why a breeding attempt was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BreedRefusal {
    /// Both parent ids are the same robot
    SameParent,
    /// A parent has not reached maturity yet
    Immature { id: RobotId },
    /// Caller does not hold the parents the breeding policy requires
    NotOwner,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("caller {caller} lacks the {role:?} capability")]
    AccessDenied { caller: Address, role: Role },

    #[error("robot {0} does not exist or has been burned")]
    NotFound(RobotId),

    #[error("parent robot {0} does not exist or has been burned")]
    ParentNotFound(RobotId),

    #[error("recipient is the null address")]
    InvalidRecipient,

    #[error("{claimed} does not own robot {id}")]
    NotOwner { id: RobotId, claimed: Address },

    #[error("breeding not allowed: {0:?}")]
    BreedingNotAllowed(BreedRefusal),

    #[error("index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("registry invariant violated: {0}")]
    InvariantViolation(String),
}

impl RegistryError {
    /// Stable code surfaced to callers
    pub fn code(&self) -> &'static str {
        match self {
            RegistryError::AccessDenied { role: Role::Admin, .. } => "018001",
            RegistryError::AccessDenied {
                role: Role::OwnerOrApproved | Role::OwnerApprovedOrAdmin,
                ..
            } => "003004",
            RegistryError::AccessDenied { role: Role::OwnerOrOperator, .. } => "003003",
            RegistryError::NotFound(_) | RegistryError::ParentNotFound(_) => "003002",
            RegistryError::InvalidRecipient => "003001",
            RegistryError::NotOwner { .. } | RegistryError::BreedingNotAllowed(_) => "003007",
            RegistryError::IndexOutOfRange { .. } => "005007",
            RegistryError::InvariantViolation(_) => "000000",
        }
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
