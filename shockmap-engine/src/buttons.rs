//! Controller button identifiers
//!
//! Button tokens in commands (`ZL,MIN_GYRO_SENS = 2`, `N+E = SPACE`) are the
//! upper-case names below. `NONE` is a sentinel that never denotes a
//! physical button.

use crate::error::ParseButtonError;
use std::fmt;
use std::str::FromStr;

macro_rules! button_ids {
    ($($(#[$doc:meta])* $variant:ident => $name:literal,)*) => {
        /// Controller button identifier
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum ButtonId {
            $($(#[$doc])* $variant,)*
        }

        impl ButtonId {
            /// Every identifier, sentinel included
            pub const ALL: &'static [ButtonId] = &[$(ButtonId::$variant,)*];

            /// Token used in commands
            pub fn name(self) -> &'static str {
                match self {
                    $(ButtonId::$variant => $name,)*
                }
            }
        }
    };
}

button_ids! {
    /// No button
    None => "NONE",
    Up => "UP",
    Down => "DOWN",
    Left => "LEFT",
    Right => "RIGHT",
    /// Left bumper
    L => "L",
    /// Left trigger
    Zl => "ZL",
    Minus => "MINUS",
    Capture => "CAPTURE",
    /// East face button
    E => "E",
    /// South face button
    S => "S",
    /// North face button
    N => "N",
    /// West face button
    W => "W",
    /// Right bumper
    R => "R",
    /// Right trigger
    Zr => "ZR",
    Plus => "PLUS",
    Home => "HOME",
    Sl => "SL",
    Sr => "SR",
    /// Left stick click
    L3 => "L3",
    /// Right stick click
    R3 => "R3",
    LUp => "LUP",
    LDown => "LDOWN",
    LLeft => "LLEFT",
    LRight => "LRIGHT",
    /// Left stick ring
    LRing => "LRING",
    RUp => "RUP",
    RDown => "RDOWN",
    RLeft => "RLEFT",
    RRight => "RRIGHT",
    /// Right stick ring
    RRing => "RRING",
    /// Motion stick up
    MUp => "MUP",
    MDown => "MDOWN",
    MLeft => "MLEFT",
    MRight => "MRIGHT",
    MRing => "MRING",
    LeanLeft => "LEAN_LEFT",
    LeanRight => "LEAN_RIGHT",
    /// Touchpad click
    Touch => "TOUCH",
    /// Left trigger full pull
    Zlf => "ZLF",
    /// Right trigger full pull
    Zrf => "ZRF",
}

impl ButtonId {
    /// True for every identifier except the `NONE` sentinel
    pub fn is_physical(self) -> bool {
        self != ButtonId::None
    }

    /// Every physical button
    pub fn physical() -> impl Iterator<Item = ButtonId> {
        Self::ALL.iter().copied().filter(|b| b.is_physical())
    }
}

impl fmt::Display for ButtonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ButtonId {
    type Err = ParseButtonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|b| b.name() == s)
            .ok_or_else(|| ParseButtonError::UnknownButton(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_tokens() {
        assert_eq!("ZL".parse::<ButtonId>().unwrap(), ButtonId::Zl);
        assert_eq!("LEAN_LEFT".parse::<ButtonId>().unwrap(), ButtonId::LeanLeft);
        assert_eq!("NONE".parse::<ButtonId>().unwrap(), ButtonId::None);
    }

    #[test]
    fn tokens_are_case_sensitive() {
        assert!("zl".parse::<ButtonId>().is_err());
    }

    #[test]
    fn unknown_token_is_error() {
        assert_eq!(
            "FOO".parse::<ButtonId>(),
            Err(ParseButtonError::UnknownButton("FOO".into()))
        );
    }

    #[test]
    fn none_is_not_physical() {
        assert!(!ButtonId::None.is_physical());
        assert!(ButtonId::S.is_physical());
        assert_eq!(ButtonId::physical().count(), ButtonId::ALL.len() - 1);
    }

    #[test]
    fn names_roundtrip() {
        for &b in ButtonId::ALL {
            assert_eq!(b.name().parse::<ButtonId>().unwrap(), b);
            assert_eq!(b.to_string(), b.name());
        }
    }
}
