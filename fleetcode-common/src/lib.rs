//! # Fleetcode Common Library
//!
//! Shared code for the fleetcode workspace including:
//! - Error types
//! - Configuration loading (TOML, environment, root folder resolution)
//! - Database initialization and settings access

pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
