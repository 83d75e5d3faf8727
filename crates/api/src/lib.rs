//! HTTP API for the advisory site: calculators, lead capture, newsletter,
//! blog and the admin back office.

pub mod app;
pub mod config;
pub mod error;
pub mod extractors;
pub mod jobs;
pub mod middleware;
pub mod routes;
pub mod services;
