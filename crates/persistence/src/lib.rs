//! Persistence layer for the advisory site backend.
//!
//! This crate contains:
//! - Database connection management and SQL migrations
//! - Entity definitions (database row mappings)
//! - Repository implementations
//! - The file-backed blog post store

pub mod blog_store;
pub mod db;
pub mod entities;
pub mod metrics;
pub mod repositories;
