//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod property;
pub mod tenant;

pub use property::PropertyEntity;
pub use tenant::TenantEntity;
