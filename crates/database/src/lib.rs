//! Openshelf Database Layer
//!
//! This crate provides database operations for the Openshelf book catalog.
//! It uses SQLite with sqlx for type-safe database queries.

pub mod catalog;
pub mod connection;
pub mod migrations;
pub mod queries;
pub mod seed;

pub use connection::DbPool;
pub use migrations::{current_version, optimize, run_migrations, verify_integrity};
