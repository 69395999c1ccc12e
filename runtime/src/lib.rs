//! Vote Ledger Runtime
//!
//! In-memory host for the ledger and the governance engine: owns the clock,
//! native value, the reference tokens, and runs every entry point as an
//! all-or-nothing transaction.

pub mod config;
pub mod error;
pub mod host;
pub mod native;
pub mod report;
pub mod token;
pub mod world;

pub use config::{Addresses, Allocation, ConfigError, PoolConfig, RuntimeConfig};
pub use error::{RuntimeError, Result};
pub use host::Host;
pub use native::NativeBank;
pub use report::{AccountReport, ProposalReport, WorldReport};
pub use token::TokenCall;
pub use world::World;
