//! Output key names
//!
//! Keyboard keys use their USB HID usage code (Keyboard/Keypad page).
//! Mouse buttons, wheel steps and tool actions live above `0xFF` so they
//! never collide with a HID usage.

use std::fmt;

/// An output action a binding can press
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeyCode(pub u16);

/// Non-keyboard codes
pub mod special {
    pub const LMOUSE: u16 = 0x101;
    pub const RMOUSE: u16 = 0x102;
    pub const MMOUSE: u16 = 0x103;
    pub const BMOUSE: u16 = 0x104;
    pub const FMOUSE: u16 = 0x105;
    pub const SCROLLUP: u16 = 0x110;
    pub const SCROLLDOWN: u16 = 0x111;
    pub const SCROLLLEFT: u16 = 0x112;
    pub const SCROLLRIGHT: u16 = 0x113;
    pub const GYRO_ON: u16 = 0x120;
    pub const GYRO_OFF: u16 = 0x121;
    pub const GYRO_INVERT: u16 = 0x122;
    pub const CALIBRATE: u16 = 0x123;
}

/// Canonical name → code. The first entry for a code is its display name.
#[rustfmt::skip]
const KEY_TABLE: &[(&str, u16)] = &[
    ("A", 0x04), ("B", 0x05), ("C", 0x06), ("D", 0x07),
    ("E", 0x08), ("F", 0x09), ("G", 0x0A), ("H", 0x0B),
    ("I", 0x0C), ("J", 0x0D), ("K", 0x0E), ("L", 0x0F),
    ("M", 0x10), ("N", 0x11), ("O", 0x12), ("P", 0x13),
    ("Q", 0x14), ("R", 0x15), ("S", 0x16), ("T", 0x17),
    ("U", 0x18), ("V", 0x19), ("W", 0x1A), ("X", 0x1B),
    ("Y", 0x1C), ("Z", 0x1D),
    ("1", 0x1E), ("2", 0x1F), ("3", 0x20), ("4", 0x21),
    ("5", 0x22), ("6", 0x23), ("7", 0x24), ("8", 0x25),
    ("9", 0x26), ("0", 0x27),
    ("ENTER", 0x28), ("ESC", 0x29), ("BACKSPACE", 0x2A),
    ("TAB", 0x2B), ("SPACE", 0x2C), ("MINUS", 0x2D), ("EQUALS", 0x2E),
    ("LEFT_BRACKET", 0x2F), ("RIGHT_BRACKET", 0x30), ("BACKSLASH", 0x31),
    ("SEMICOLON", 0x33), ("QUOTE", 0x34), ("TILDE", 0x35), ("COMMA", 0x36),
    ("PERIOD", 0x37), ("SLASH", 0x38), ("CAPS_LOCK", 0x39),
    ("F1", 0x3A), ("F2", 0x3B), ("F3", 0x3C), ("F4", 0x3D),
    ("F5", 0x3E), ("F6", 0x3F), ("F7", 0x40), ("F8", 0x41),
    ("F9", 0x42), ("F10", 0x43), ("F11", 0x44), ("F12", 0x45),
    ("PRINT_SCREEN", 0x46), ("SCROLL_LOCK", 0x47), ("PAUSE", 0x48),
    ("INSERT", 0x49), ("HOME", 0x4A), ("PAGEUP", 0x4B),
    ("DELETE", 0x4C), ("END", 0x4D), ("PAGEDOWN", 0x4E),
    ("RIGHT", 0x4F), ("LEFT", 0x50), ("DOWN", 0x51), ("UP", 0x52),
    ("NUM_LOCK", 0x53), ("DIVIDE", 0x54), ("MULTIPLY", 0x55), ("SUBTRACT", 0x56),
    ("ADD", 0x57),
    ("N1", 0x59), ("N2", 0x5A), ("N3", 0x5B), ("N4", 0x5C),
    ("N5", 0x5D), ("N6", 0x5E), ("N7", 0x5F), ("N8", 0x60),
    ("N9", 0x61), ("N0", 0x62), ("DECIMAL", 0x63),
    ("CONTEXT", 0x65),
    ("F13", 0x68), ("F14", 0x69), ("F15", 0x6A), ("F16", 0x6B),
    ("F17", 0x6C), ("F18", 0x6D), ("F19", 0x6E), ("F20", 0x6F),
    ("F21", 0x70), ("F22", 0x71), ("F23", 0x72), ("F24", 0x73),
    ("LCONTROL", 0xE0), ("LSHIFT", 0xE1), ("LALT", 0xE2), ("LWINDOWS", 0xE3),
    ("RCONTROL", 0xE4), ("RSHIFT", 0xE5), ("RALT", 0xE6), ("RWINDOWS", 0xE7),
    ("LMOUSE", special::LMOUSE), ("RMOUSE", special::RMOUSE),
    ("MMOUSE", special::MMOUSE), ("BMOUSE", special::BMOUSE),
    ("FMOUSE", special::FMOUSE),
    ("SCROLLUP", special::SCROLLUP), ("SCROLLDOWN", special::SCROLLDOWN),
    ("SCROLLLEFT", special::SCROLLLEFT), ("SCROLLRIGHT", special::SCROLLRIGHT),
    ("GYRO_ON", special::GYRO_ON), ("GYRO_OFF", special::GYRO_OFF),
    ("GYRO_INVERT", special::GYRO_INVERT), ("CALIBRATE", special::CALIBRATE),
];

/// Aliases accepted on input but never displayed
const KEY_ALIASES: &[(&str, u16)] = &[
    ("ESCAPE", 0x29),
    ("RETURN", 0x28),
    ("CONTROL", 0xE0),
    ("SHIFT", 0xE1),
    ("ALT", 0xE2),
    ("WINDOWS", 0xE3),
    ("PAGE_UP", 0x4B),
    ("PAGE_DOWN", 0x4E),
];

/// Look up a key by name (case-insensitive)
pub fn key_code_from_name(name: &str) -> Option<KeyCode> {
    let upper = name.to_ascii_uppercase();
    KEY_TABLE
        .iter()
        .chain(KEY_ALIASES)
        .find(|(n, _)| *n == upper)
        .map(|&(_, code)| KeyCode(code))
}

/// Display name of a key code
pub fn key_name(code: KeyCode) -> &'static str {
    KEY_TABLE
        .iter()
        .find(|&&(_, c)| c == code.0)
        .map(|&(n, _)| n)
        .unwrap_or("?")
}

impl KeyCode {
    /// True for codes from the HID keyboard page
    pub fn is_keyboard(self) -> bool {
        self.0 <= 0xFF
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(key_name(*self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_standard_keys() {
        assert_eq!(key_code_from_name("A"), Some(KeyCode(0x04)));
        assert_eq!(key_code_from_name("space"), Some(KeyCode(0x2C)));
        assert_eq!(key_code_from_name("F12"), Some(KeyCode(0x45)));
        assert_eq!(key_code_from_name("N0"), Some(KeyCode(0x62)));
    }

    #[test]
    fn lookup_aliases() {
        assert_eq!(key_code_from_name("ESCAPE"), key_code_from_name("ESC"));
        assert_eq!(key_code_from_name("CONTROL"), key_code_from_name("LCONTROL"));
    }

    #[test]
    fn aliases_display_canonical_name() {
        let code = key_code_from_name("Escape").unwrap();
        assert_eq!(code.to_string(), "ESC");
    }

    #[test]
    fn special_codes_are_not_keyboard() {
        let mouse = key_code_from_name("LMOUSE").unwrap();
        assert!(!mouse.is_keyboard());
        assert!(key_code_from_name("Q").unwrap().is_keyboard());
    }

    #[test]
    fn unknown_name() {
        assert_eq!(key_code_from_name("FOOBAR"), None);
        assert_eq!(key_name(KeyCode(0x3FF)), "?");
    }

    #[test]
    fn every_table_name_roundtrips() {
        for &(name, code) in KEY_TABLE {
            assert_eq!(key_code_from_name(name), Some(KeyCode(code)), "{name}");
        }
    }
}
