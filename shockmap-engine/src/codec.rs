//! Value codec contract
//!
//! A type can be bound by an assignment command when it can be rendered
//! as text ([`Display`]), parsed from text ([`FromStr`], where `Err` is the
//! failed-parse outcome) and compared ([`PartialEq`]). [`ConfigValue`]
//! bundles those bounds and adds the per-type hooks the engine needs.

use std::fmt::Display;
use std::str::FromStr;

/// A value type usable with [`AssignmentCommand`](crate::AssignmentCommand)
pub trait ConfigValue: Clone + PartialEq + Display + FromStr + Send + Sync + 'static {
    /// Line announcing that a variable was set to `self`.
    ///
    /// `name` is the command name and `display_name` the name shown to the
    /// user; the generic form only uses the latter.
    fn change_message(&self, name: &str, display_name: &str) -> String {
        let _ = name;
        format!("{display_name} has been set to {self}")
    }

    /// True when a scoped binding holding this value does nothing and its
    /// child entry can be dropped.
    fn is_cleared(&self) -> bool {
        false
    }
}

/// Decode a token with the type's text codec
pub fn decode<T: ConfigValue>(token: &str) -> Option<T> {
    token.parse().ok()
}

macro_rules! plain_config_value {
    ($($t:ty),* $(,)?) => {
        $(impl ConfigValue for $t {})*
    };
}

plain_config_value!(f32, f64, i32, i64, u8, u16, u32, u64, usize, bool, String);
