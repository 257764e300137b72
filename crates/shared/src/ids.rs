//! Server-assigned identifiers.
//!
//! Every entity id is a random UUID v4. The nil UUID marks an entity that has
//! not been assigned an id yet.

use uuid::Uuid;

/// Generates a fresh, random identifier.
pub fn new_id() -> Uuid {
    Uuid::new_v4()
}

/// Returns true if the id has not been assigned yet.
pub fn is_unassigned(id: &Uuid) -> bool {
    id.is_nil()
}

/// Assigns a fresh id only when the current one is unassigned.
///
/// Returns the id now held by `slot`.
pub fn assign_if_missing(slot: &mut Uuid) -> Uuid {
    if is_unassigned(slot) {
        *slot = new_id();
    }
    *slot
}
