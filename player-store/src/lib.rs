//! # Player Store Module
//!
//! SQLite-backed persistence for the player core.
//!
//! ## Overview
//!
//! This crate owns the connection pool, the embedded migrations, and the
//! repository for style-label records. The pool is created explicitly at
//! startup via [`db::create_pool`] and handed to repositories by the caller;
//! there is no lazily-initialized global handle.

pub mod db;
pub mod error;
pub mod models;
pub mod repositories;

pub use error::{Result, StoreError};
