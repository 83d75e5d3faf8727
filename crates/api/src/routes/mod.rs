//! HTTP route handlers.

pub mod admin;
pub mod admin_blog;
pub mod admin_newsletter;
pub mod ai;
pub mod blog;
pub mod health;
pub mod leads;
pub mod newsletter;
pub mod tools;
