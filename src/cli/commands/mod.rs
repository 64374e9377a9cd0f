//! CLI command implementations.

pub mod init;
pub mod member;
pub mod reconcile;
pub mod task;
pub mod tier;
