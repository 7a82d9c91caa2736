//! Catalogue error types

use thiserror::Error;

/// A token that names none of the values of a named enum
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown {kind}: \"{name}\"")]
pub struct ParseNameError {
    /// Enum the token was parsed as, e.g. `StickMode`
    pub kind: &'static str,
    pub name: String,
}
