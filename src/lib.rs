//! shockmap - controller remapper console
//!
//! Settings and button bindings reconfigured live through assignment
//! commands, typed interactively or loaded from scripts.

pub mod config;
pub mod error;
pub mod session;
pub mod settings;

pub use config::AppConfig;
pub use error::ParseNameError;
pub use session::{Flow, Session};
pub use settings::{RingMode, Settings, StickMode};
