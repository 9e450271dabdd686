//! Motion Profile Orchestrator Common Library
//!
//! This crate provides shared constants and configuration loading utilities
//! for all workspace crates.
//!
//! # Module Structure
//!
//! - [`consts`] - Default constraints, view and export constants
//! - [`config`] - Configuration loading traits and types
//! - [`editor`] - Editor configuration sections (`mpo.toml`)
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use mpo_common::consts::*;
//! use mpo_common::config::{ConfigLoader, SharedConfig};
//! ```

pub mod config;
pub mod consts;
pub mod editor;
pub mod prelude;
