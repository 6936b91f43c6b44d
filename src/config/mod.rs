//! Configuration module for Gurume
//!
//! Configuration is an explicit value built in `main` and handed to the
//! fetcher, store, and coordinator by parameter. A TOML file can override
//! the defaults; there is no process-wide config state.
//!
//! # Example
//!
//! ```no_run
//! use gurume::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("gurume.toml")).unwrap();
//! println!("Concurrent requests: {}", config.fetch.concurrent_requests);
//! ```

pub mod catalog;
mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{CatalogConfig, Config, FetchConfig, StorageConfig};

// Re-export parser functions
pub use parser::load_config;
