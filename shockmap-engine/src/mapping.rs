//! Button binding values
//!
//! An [`EventMapping`] is what a button produces when pressed.
//!
//! # Syntax
//!
//! ```text
//! A                → A on press
//! ^GYRO_OFF        → toggle GYRO_OFF on press
//! LCONTROL+C       → LCONTROL+C on press (keys pressed together)
//! R E              → R on tap, E on hold
//! NONE             → no input
//! ```

use crate::codec::ConfigValue;
use crate::error::ParseMappingError;
use crate::keys::{key_code_from_name, KeyCode};
use std::fmt;
use std::str::FromStr;

/// Keys pressed together by one action, optionally as a toggle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub keys: Vec<KeyCode>,
    /// `^` prefix: first press holds the keys down, second press releases
    pub toggle: bool,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.toggle {
            write!(f, "^")?;
        }
        for (i, key) in self.keys.iter().enumerate() {
            if i > 0 {
                write!(f, "+")?;
            }
            write!(f, "{key}")?;
        }
        Ok(())
    }
}

impl FromStr for Action {
    type Err = ParseMappingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (toggle, body) = match s.strip_prefix('^') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let keys = body
            .split('+')
            .map(|part| {
                if part.is_empty() {
                    return Err(ParseMappingError::EmptyCombo(s.to_string()));
                }
                key_code_from_name(part).ok_or_else(|| ParseMappingError::UnknownKey(part.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Action { keys, toggle })
    }
}

/// What a button does: nothing, one press action, or a tap and a hold action
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EventMapping {
    actions: Vec<Action>,
}

impl EventMapping {
    /// Maximum number of actions (tap, hold)
    pub const MAX_ACTIONS: usize = 2;

    /// The unbound mapping
    pub fn none() -> Self {
        Self::default()
    }

    /// Mapping that presses `action`
    pub fn press(action: Action) -> Self {
        Self {
            actions: vec![action],
        }
    }

    /// True when the button produces no input
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Action fired on tap (or on press when there is no hold action)
    pub fn tap(&self) -> Option<&Action> {
        self.actions.first()
    }

    /// Action fired when the button is held
    pub fn hold(&self) -> Option<&Action> {
        self.actions.get(1)
    }

    /// Human-readable description, e.g. `"R on tap, E on hold"`
    pub fn representation(&self) -> String {
        fn describe(action: &Action) -> String {
            let keys = Action {
                keys: action.keys.clone(),
                toggle: false,
            };
            if action.toggle {
                format!("toggle {keys}")
            } else {
                keys.to_string()
            }
        }

        match self.actions.as_slice() {
            [] => "no input".to_string(),
            [press] => format!("{} on press", describe(press)),
            [tap, hold, ..] => format!("{} on tap, {} on hold", describe(tap), describe(hold)),
        }
    }
}

impl fmt::Display for EventMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.actions.is_empty() {
            return write!(f, "NONE");
        }
        for (i, action) in self.actions.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{action}")?;
        }
        Ok(())
    }
}

impl FromStr for EventMapping {
    type Err = ParseMappingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<&str> = s.split_whitespace().collect();
        if tokens.iter().any(|t| t.eq_ignore_ascii_case("NONE")) {
            return if tokens.len() == 1 {
                Ok(Self::none())
            } else {
                Err(ParseMappingError::NoneWithActions)
            };
        }
        if tokens.len() > Self::MAX_ACTIONS {
            return Err(ParseMappingError::TooManyActions(tokens.len()));
        }
        let actions = tokens
            .into_iter()
            .map(str::parse)
            .collect::<Result<Vec<Action>, _>>()?;
        Ok(Self { actions })
    }
}

impl ConfigValue for EventMapping {
    fn change_message(&self, name: &str, _display_name: &str) -> String {
        if self.is_empty() {
            format!("{name} mapped to no input")
        } else {
            format!("{name} mapped to {}", self.representation())
        }
    }

    fn is_cleared(&self) -> bool {
        self.is_empty()
    }
}
