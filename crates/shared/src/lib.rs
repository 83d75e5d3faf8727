//! Shared utilities for the advisory site backend.
//!
//! This crate provides helpers used across the other crates:
//! - Hashing and HMAC-signed tokens (newsletter unsubscribe links, secret comparison)
//! - Admin password verification with Argon2id
//! - Admin session tokens (HS256 JWT)
//! - HTML escaping for email templates
//! - Common validation logic

pub mod crypto;
pub mod html;
pub mod jwt;
pub mod password;
pub mod validation;
