//! Shared records, error model, and configuration for the help-book extractor.
//!
//! This crate is the foundation depended on by all other workspace crates.
//! It provides:
//! - [`HelpBookError`], the unified error type
//! - Domain records ([`MethodInfo`], [`PropertyInfo`], [`ObjectInfo`], [`EnumInfo`], ...)
//! - Configuration ([`AppConfig`], [`ExtractOptions`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DEFAULT_CONTAINER_NAME, ExtractOptions, ExtractionConfig, SourceConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from,
};
pub use error::{HelpBookError, Result};
pub use types::{
    ConstructorInfo, DEFAULT_SIGNATURE_NAME, EnumInfo, EnumValueInfo, MethodInfo,
    MethodParameterInfo, MethodSignatureInfo, NamePair, ObjectInfo, PropertyInfo, RelatedObject,
    ValueInfo,
};
