//! Error Types
//!
//! This module defines the error types used throughout the crate.
//!
//! # Overview
//!
//! The main error type [`ForwardError`] covers the failure modes that are
//! surfaced to callers:
//! - Template syntax errors (raised at parse time)
//! - Lookups of templates that were never defined
//! - Device compile/link failures
//!
//! Missing uniform values, oversized uniform arrays and similar per-draw
//! problems are *not* errors: they are logged and the offending parameter is
//! skipped so the frame can complete.
//!
//! # Usage
//!
//! All fallible public APIs return [`Result<T>`] which is an alias for
//! `std::result::Result<T, ForwardError>`.
//!
//! ```rust,ignore
//! use myth_forward::errors::Result;
//!
//! fn build() -> Result<()> {
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Syntax errors produced by the template compiler.
///
/// Positions are byte offsets into the template source.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// An opening delimiter was found without a matching closing delimiter.
    #[error("Unclosed tag at {pos}")]
    UnclosedTag { pos: usize },

    /// A section close tag was found with no section open.
    #[error("Unopened section \"{name}\" at {pos}")]
    UnopenedSection { name: String, pos: usize },

    /// A section close tag does not match the innermost open section.
    #[error("Unclosed section \"{expected}\" at {pos} (found close tag \"{found}\")")]
    MismatchedSection {
        expected: String,
        found: String,
        pos: usize,
    },

    /// A section was still open when the end of input was reached.
    #[error("Unclosed section \"{name}\" at {pos}")]
    UnclosedSection { name: String, pos: usize },

    /// A delimiter change tag did not contain exactly two delimiters.
    #[error("Invalid tags: {0}")]
    InvalidTags(String),
}

/// Errors reported by a [`GraphicsDevice`](crate::renderer::device::GraphicsDevice).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// Shader stage failed to compile.
    #[error("Shader compile failed: {0}")]
    CompileFailed(String),

    /// Program failed to link.
    #[error("Program link failed: {0}")]
    LinkFailed(String),
}

/// The main error type for the crate.
#[derive(Error, Debug)]
pub enum ForwardError {
    // ========================================================================
    // Definition Errors
    // ========================================================================
    /// Template source could not be parsed.
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    /// The requested program template was never defined.
    #[error("Unknown program template: {0}")]
    UnknownTemplate(String),

    /// Built-in template declaration could not be read.
    #[error("Invalid template declaration: {0}")]
    Declaration(String),

    // ========================================================================
    // Device Errors
    // ========================================================================
    /// The device failed to compile or link a variant.
    #[error("Device error: {0}")]
    Device(#[from] DeviceError),
}

impl From<serde_json::Error> for ForwardError {
    fn from(err: serde_json::Error) -> Self {
        ForwardError::Declaration(err.to_string())
    }
}

/// Alias for `Result<T, ForwardError>`.
pub type Result<T> = std::result::Result<T, ForwardError>;
