//! Domain models for Property Owner.

pub mod patch;
pub mod property;
pub mod tenant;

pub use patch::{PatchDocument, PatchError, PatchOp, PatchOperation, Patchable};
pub use property::Property;
pub use tenant::Tenant;
