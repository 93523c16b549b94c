//! CATS Common Library
//!
//! This crate provides the types shared by the sample changer client and
//! its tools: controller generations, typed status snapshots, the error
//! taxonomy and configuration loading.
//!
//! # Module Structure
//!
//! - [`robot`] - Controller models, status values, errors and robot configuration
//! - [`config`] - Configuration loading traits and types
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```toml
//! [dependencies]
//! cats_common = { path = "../cats_common" }
//! ```
//!
//! Then import:
//! ```rust
//! use cats_common::config::{ConfigLoader, SharedConfig};
//! use cats_common::robot::model::Model;
//! ```

pub mod config;
pub mod prelude;
pub mod robot;
