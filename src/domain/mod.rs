//! Domain layer for the progression engine
//!
//! This module contains the core rules (ledger uniqueness, XP aggregation,
//! threshold crossing) and the ports the infrastructure must implement.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult};
