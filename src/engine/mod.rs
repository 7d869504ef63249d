//! Execution engine for synq-monitors
//!
//! The engine handles one namespace at a time:
//! 1. Displaying - Boxed overview of the reconciled change sets
//! 2. Gating - Breaking changes, dry run and confirmation
//! 3. Executing - Batched writes through the backend

pub mod differ;
pub mod executor;

pub use executor::{ExecuteOptions, Outcome, execute};
