//! Repository implementations for database operations.

pub mod property;

pub use property::{ChangeSet, PropertyRepository, StagedChange};
