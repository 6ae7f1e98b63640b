//! Core traits for ddlgen
//!
//! This module defines the traits that models throughout the workspace
//! implement to provide consistent self-checking behavior.

use crate::error::EngineResult;

// ============================================================================
// Validatable Trait
// ============================================================================

/// Trait for types that can be validated
///
/// Types implementing this trait can check their internal consistency
/// and return an error if the state is invalid.
///
/// # Example
///
/// ```rust,ignore
/// use ddlgen_core::{Validatable, EngineResult, EngineError};
///
/// struct Index {
///     table: String,
///     columns: Vec<String>,
/// }
///
/// impl Validatable for Index {
///     fn validate(&self) -> EngineResult<()> {
///         if self.columns.is_empty() {
///             return Err(EngineError::schema_reference(&self.table, "index without columns"));
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Validatable {
    /// Validate the current state of the object
    ///
    /// Returns `Ok(())` if valid, or an `EngineError` describing the problem.
    fn validate(&self) -> EngineResult<()>;

    /// Check if the object is valid without returning error details
    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Get all validation errors (for types that can have multiple errors)
    fn validation_errors(&self) -> Vec<String> {
        match self.validate() {
            Ok(()) => vec![],
            Err(e) => vec![e.to_string()],
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
