//! Crypto Robots — deterministic registry of owned, breedable robots
//!
//! Robots are minted by a single admin, transferred between owners, bred
//! from two mature parents and burned. The registry keeps a global and a
//! per-owner enumeration consistent with the identity store after every
//! operation, and every failed operation leaves state untouched.

pub mod access;
pub mod address;
pub mod breeding;
pub mod clock;
pub mod config;
pub mod error;
pub mod events;
pub mod index;
pub mod lifecycle;
pub mod query;
pub mod robot;
pub mod shared;

pub use address::Address;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{BreedingPolicy, MaturityConfig, RegistryConfig};
pub use error::{BreedRefusal, ConfigError, RegistryError, Role};
pub use events::{EventRecord, RegistryEvent};
pub use lifecycle::Registry;
pub use query::{Query, SupplyStats};
pub use robot::{Parentage, Robot, RobotId, Status};
pub use shared::SharedRegistry;
