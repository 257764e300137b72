//! Persistence layer for the Property Owner backend.
//!
//! This crate contains:
//! - Database connection management and migrations
//! - Entity definitions (database row mappings)
//! - The property repository with staged, transactional saves
//! - Development seed data

pub mod db;
pub mod entities;
pub mod metrics;
pub mod repositories;
pub mod seed;
