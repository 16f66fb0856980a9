//! # Player Runtime Module
//!
//! Foundational runtime infrastructure for the player core:
//! - Logging and tracing setup
//! - Configuration management
//!
//! ## Overview
//!
//! This crate contains the runtime utilities the store and metadata crates
//! depend on. It establishes the logging conventions and the explicit,
//! builder-validated configuration that is constructed once at startup and
//! passed to every consumer.

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
