//! Shared utilities and common types for the Property Owner backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Identifier generation for server-assigned ids
//! - Common validation logic

pub mod ids;
pub mod validation;
