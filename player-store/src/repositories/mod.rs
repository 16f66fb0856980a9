//! Repository traits and SQLite implementations

pub mod labels;

pub use labels::{LabelRepository, SqliteLabelRepository};
