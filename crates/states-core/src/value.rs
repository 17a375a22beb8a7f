//! # Dynamic Values
//!
//! Proxy attributes, call arguments and return values are plain
//! `serde_json::Value`s. The helpers below read positional arguments with
//! typed errors so state method bodies stay short.

use crate::error::StatesError;

pub use serde_json::Value;

/// Positional arguments of a dispatched call.
pub type Arguments = [Value];

/// Fetch the argument at `index`.
///
/// # Errors
///
/// Returns [`StatesError::InvalidArgument`] if fewer arguments were passed.
pub fn argument(args: &Arguments, index: usize) -> Result<&Value, StatesError> {
    args.get(index).ok_or_else(|| {
        StatesError::invalid_argument(format!(
            "expected an argument at position {index}, got {} argument(s)",
            args.len()
        ))
    })
}

/// Fetch the argument at `index` as a string slice.
///
/// # Errors
///
/// Returns [`StatesError::InvalidArgument`] if the argument is missing or
/// is not a JSON string.
pub fn string_argument(args: &Arguments, index: usize) -> Result<&str, StatesError> {
    argument(args, index)?.as_str().ok_or_else(|| {
        StatesError::invalid_argument(format!("argument {index} must be a string"))
    })
}

/// Fetch the argument at `index` as a boolean.
///
/// # Errors
///
/// Returns [`StatesError::InvalidArgument`] if the argument is missing or
/// is not a JSON boolean.
pub fn bool_argument(args: &Arguments, index: usize) -> Result<bool, StatesError> {
    argument(args, index)?.as_bool().ok_or_else(|| {
        StatesError::invalid_argument(format!("argument {index} must be a boolean"))
    })
}
