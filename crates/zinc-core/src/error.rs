//! Error types for zinc-rs.

use thiserror::Error;

/// The main error type for zinc-rs operations.
#[derive(Error, Debug)]
pub enum ZincError {
    /// A name was empty or otherwise unusable as an identifier.
    #[error("invalid name '{0}'")]
    InvalidName(String),

    /// Another object in the same manager already uses this name.
    #[error("name '{0}' is already in use")]
    NameInUse(String),

    /// The object is not registered with the manager it was used with.
    #[error("object '{0}' is not in this manager")]
    NotInManager(String),

    /// The object is referenced elsewhere and cannot be removed.
    #[error("object '{0}' is in use")]
    ObjectInUse(String),

    /// The filter is not an operand of the operator filter.
    #[error("filter '{operand}' is not an operand of '{operator}'")]
    OperandNotFound { operator: String, operand: String },

    /// Adding the operand would make the filter graph cyclic.
    #[error("adding '{operand}' to '{operator}' would create a circular dependency")]
    CircularDependency { operator: String, operand: String },

    /// The operation is only valid for another kind of filter.
    #[error("filter '{name}' is not a {expected} filter")]
    WrongFilterType { name: String, expected: &'static str },

    /// A string did not name a known enumerator.
    #[error("unknown {kind} '{value}'")]
    UnknownEnumValue { kind: &'static str, value: String },

    /// `end_change` was called without a matching `begin_change`.
    #[error("change caching is not enabled")]
    CacheNotEnabled,

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// A specialized Result type for zinc-rs operations.
pub type Result<T> = std::result::Result<T, ZincError>;

/// Checks that `name` can be used as an object identifier.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(ZincError::InvalidName(name.to_string()));
    }
    Ok(())
}
