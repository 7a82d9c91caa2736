//! Engine error types

use thiserror::Error;

/// Errors from resolving a button token
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseButtonError {
    /// Token is not the name of any button
    #[error("unknown button: \"{0}\"")]
    UnknownButton(String),
}

/// Errors from parsing an [`EventMapping`](crate::EventMapping)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseMappingError {
    /// Key name not found in the key table
    #[error("unknown key: \"{0}\"")]
    UnknownKey(String),

    /// A `+` combination with an empty member, e.g. `A+` or `+B`
    #[error("empty key combination in \"{0}\"")]
    EmptyCombo(String),

    /// More actions than a button can carry (tap and hold)
    #[error("too many actions: {0} (a binding takes a tap action and a hold action)")]
    TooManyActions(usize),

    /// `NONE` mixed with other actions
    #[error("NONE cannot be combined with other actions")]
    NoneWithActions,
}
