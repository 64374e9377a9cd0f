//! Adapters implementing the domain ports.

pub mod catalog;
pub mod notifiers;
pub mod sqlite;
