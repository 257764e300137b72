//! HTTP route handlers.

pub mod frontend;
pub mod health;
pub mod properties;
pub mod tenants;
