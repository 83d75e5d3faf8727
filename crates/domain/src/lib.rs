//! Domain layer for the advisory site backend.
//!
//! This crate contains:
//! - Financial calculators behind the public tools
//! - Domain models and request/response payloads (leads, events, newsletter, blog)
//! - Business rules that do not touch I/O (lead merging, drip sequence, prompt building)

pub mod calculators;
pub mod models;
pub mod services;
