//! Shared command line configuration for relational LP tools.

pub mod config;

pub use config::{Config, GrounderKind};
