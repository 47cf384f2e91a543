//! Shared types, error model, and configuration for slrkit.
//!
//! This crate is the foundation depended on by all other slrkit crates.
//! It provides:
//! - [`SlrError`] — the unified error type
//! - Taxonomy types ([`CategoryList`], [`FaultInjection`], [`FaultId`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CONFIG_FILE_NAME, FormConfig, InputConfig, PathsConfig, config_file_path,
    init_config, load_config, load_config_from,
};
pub use error::{Result, SlrError};
pub use types::{CategoryEntry, CategoryList, FaultId, FaultInjection};
