//! # ddlgen Core
//!
//! Core types, traits, and error handling for ddlgen.
//!
//! This crate provides the foundational building blocks used throughout
//! the workspace, including:
//!
//! - **Types**: the closed set of column types and the supported SQL dialects
//! - **Traits**: `Validatable` for self-checking models
//! - **Errors**: unified error handling with `EngineError` and `EngineResult`
//!

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use error::{EngineError, EngineResult, ResultExt};
pub use traits::Validatable;
pub use types::{ColumnType, Dialect};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
