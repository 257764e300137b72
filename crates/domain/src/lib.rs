//! Domain layer for the Property Owner backend.
//!
//! This crate contains:
//! - Domain models (Property, Tenant) and their transfer records
//! - The patch-document engine used for partial updates
//! - The transfer mapper between entities and transfer records

pub mod mapping;
pub mod models;

pub use mapping::TransferMapper;
