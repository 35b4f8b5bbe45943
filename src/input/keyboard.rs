//! Keyboard codes and text translation
//!
//! Keys are identified by their set 1 scan code, the form keyboard drivers
//! deliver. Extended keys (arrows, navigation block, Windows key) carry the
//! `0xE0` prefix in the high byte.
//!
//! Text is translated character by character through a [`KeyTranslator`];
//! [`UsLayout`] covers printable ASCII on a US keyboard.

use super::InputError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A set 1 scan code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScanCode(pub u16);

impl ScanCode {
    pub const LEFT_SHIFT: ScanCode = ScanCode(0x2A);

    /// Whether the code is sent with the `0xE0` prefix
    pub fn is_extended(&self) -> bool {
        self.0 & 0xFF00 == 0xE000
    }

    /// The make code without the extended prefix
    pub fn make_code(&self) -> u8 {
        (self.0 & 0x00FF) as u8
    }
}

impl std::fmt::Display for ScanCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#06x}", self.0)
    }
}

/// Keys that have a name rather than a character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedKey {
    Enter,
    Tab,
    Backspace,
    Delete,
    Escape,
    Space,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Home,
    End,
    PageUp,
    PageDown,
    Insert,
    CapsLock,
    NumLock,
    ScrollLock,
    Shift,
    RightShift,
    Ctrl,
    Alt,
    Meta,
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
}

impl NamedKey {
    /// Returns the scan code for this key
    pub fn scan_code(&self) -> ScanCode {
        let code = match self {
            NamedKey::Escape => 0x01,
            NamedKey::Backspace => 0x0E,
            NamedKey::Tab => 0x0F,
            NamedKey::Enter => 0x1C,
            NamedKey::Ctrl => 0x1D,
            NamedKey::Shift => 0x2A,
            NamedKey::RightShift => 0x36,
            NamedKey::Alt => 0x38,
            NamedKey::Space => 0x39,
            NamedKey::CapsLock => 0x3A,
            NamedKey::F1 => 0x3B,
            NamedKey::F2 => 0x3C,
            NamedKey::F3 => 0x3D,
            NamedKey::F4 => 0x3E,
            NamedKey::F5 => 0x3F,
            NamedKey::F6 => 0x40,
            NamedKey::F7 => 0x41,
            NamedKey::F8 => 0x42,
            NamedKey::F9 => 0x43,
            NamedKey::F10 => 0x44,
            NamedKey::NumLock => 0x45,
            NamedKey::ScrollLock => 0x46,
            NamedKey::F11 => 0x57,
            NamedKey::F12 => 0x58,
            NamedKey::Home => 0xE047,
            NamedKey::ArrowUp => 0xE048,
            NamedKey::PageUp => 0xE049,
            NamedKey::ArrowLeft => 0xE04B,
            NamedKey::ArrowRight => 0xE04D,
            NamedKey::End => 0xE04F,
            NamedKey::ArrowDown => 0xE050,
            NamedKey::PageDown => 0xE051,
            NamedKey::Insert => 0xE052,
            NamedKey::Delete => 0xE053,
            NamedKey::Meta => 0xE05B,
        };
        ScanCode(code)
    }

    /// Parses a key name, case-insensitively
    pub fn from_name(s: &str) -> Option<NamedKey> {
        match s.to_lowercase().as_str() {
            "enter" | "return" => Some(NamedKey::Enter),
            "tab" => Some(NamedKey::Tab),
            "backspace" => Some(NamedKey::Backspace),
            "delete" | "del" => Some(NamedKey::Delete),
            "escape" | "esc" => Some(NamedKey::Escape),
            "space" => Some(NamedKey::Space),
            "arrowup" | "up" => Some(NamedKey::ArrowUp),
            "arrowdown" | "down" => Some(NamedKey::ArrowDown),
            "arrowleft" | "left" => Some(NamedKey::ArrowLeft),
            "arrowright" | "right" => Some(NamedKey::ArrowRight),
            "home" => Some(NamedKey::Home),
            "end" => Some(NamedKey::End),
            "pageup" => Some(NamedKey::PageUp),
            "pagedown" => Some(NamedKey::PageDown),
            "insert" | "ins" => Some(NamedKey::Insert),
            "capslock" => Some(NamedKey::CapsLock),
            "numlock" => Some(NamedKey::NumLock),
            "scrolllock" => Some(NamedKey::ScrollLock),
            "shift" => Some(NamedKey::Shift),
            "rshift" => Some(NamedKey::RightShift),
            "control" | "ctrl" => Some(NamedKey::Ctrl),
            "alt" => Some(NamedKey::Alt),
            "meta" | "win" | "windows" | "cmd" => Some(NamedKey::Meta),
            "f1" => Some(NamedKey::F1),
            "f2" => Some(NamedKey::F2),
            "f3" => Some(NamedKey::F3),
            "f4" => Some(NamedKey::F4),
            "f5" => Some(NamedKey::F5),
            "f6" => Some(NamedKey::F6),
            "f7" => Some(NamedKey::F7),
            "f8" => Some(NamedKey::F8),
            "f9" => Some(NamedKey::F9),
            "f10" => Some(NamedKey::F10),
            "f11" => Some(NamedKey::F11),
            "f12" => Some(NamedKey::F12),
            _ => None,
        }
    }
}

impl FromStr for NamedKey {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NamedKey::from_name(s).ok_or_else(|| InputError::InvalidKey { key: s.to_string() })
    }
}

/// The key to press for one character and whether shift must be held
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyStroke {
    pub code: ScanCode,
    pub shift: bool,
}

impl KeyStroke {
    pub fn plain(code: u16) -> Self {
        Self {
            code: ScanCode(code),
            shift: false,
        }
    }

    pub fn shifted(code: u16) -> Self {
        Self {
            code: ScanCode(code),
            shift: true,
        }
    }
}

/// Resolves characters to key strokes
pub trait KeyTranslator: Send + Sync {
    /// `None` when the character cannot be typed on this layout
    fn translate(&self, c: char) -> Option<KeyStroke>;
}

/// US QWERTY layout for printable ASCII, newline and tab
#[derive(Debug, Default, Clone, Copy)]
pub struct UsLayout;

impl UsLayout {
    fn letter_code(lower: char) -> Option<u16> {
        let code = match lower {
            'q' => 0x10,
            'w' => 0x11,
            'e' => 0x12,
            'r' => 0x13,
            't' => 0x14,
            'y' => 0x15,
            'u' => 0x16,
            'i' => 0x17,
            'o' => 0x18,
            'p' => 0x19,
            'a' => 0x1E,
            's' => 0x1F,
            'd' => 0x20,
            'f' => 0x21,
            'g' => 0x22,
            'h' => 0x23,
            'j' => 0x24,
            'k' => 0x25,
            'l' => 0x26,
            'z' => 0x2C,
            'x' => 0x2D,
            'c' => 0x2E,
            'v' => 0x2F,
            'b' => 0x30,
            'n' => 0x31,
            'm' => 0x32,
            _ => return None,
        };
        Some(code)
    }
}

impl KeyTranslator for UsLayout {
    fn translate(&self, c: char) -> Option<KeyStroke> {
        if c.is_ascii_alphabetic() {
            let code = Self::letter_code(c.to_ascii_lowercase())?;
            return Some(KeyStroke {
                code: ScanCode(code),
                shift: c.is_ascii_uppercase(),
            });
        }

        let stroke = match c {
            '1'..='9' => KeyStroke::plain(0x02 + (c as u16 - '1' as u16)),
            '0' => KeyStroke::plain(0x0B),
            '-' => KeyStroke::plain(0x0C),
            '=' => KeyStroke::plain(0x0D),
            '[' => KeyStroke::plain(0x1A),
            ']' => KeyStroke::plain(0x1B),
            ';' => KeyStroke::plain(0x27),
            '\'' => KeyStroke::plain(0x28),
            '`' => KeyStroke::plain(0x29),
            '\\' => KeyStroke::plain(0x2B),
            ',' => KeyStroke::plain(0x33),
            '.' => KeyStroke::plain(0x34),
            '/' => KeyStroke::plain(0x35),
            ' ' => KeyStroke::plain(0x39),
            '\n' => KeyStroke::plain(0x1C),
            '\t' => KeyStroke::plain(0x0F),
            '!' => KeyStroke::shifted(0x02),
            '@' => KeyStroke::shifted(0x03),
            '#' => KeyStroke::shifted(0x04),
            '$' => KeyStroke::shifted(0x05),
            '%' => KeyStroke::shifted(0x06),
            '^' => KeyStroke::shifted(0x07),
            '&' => KeyStroke::shifted(0x08),
            '*' => KeyStroke::shifted(0x09),
            '(' => KeyStroke::shifted(0x0A),
            ')' => KeyStroke::shifted(0x0B),
            '_' => KeyStroke::shifted(0x0C),
            '+' => KeyStroke::shifted(0x0D),
            '{' => KeyStroke::shifted(0x1A),
            '}' => KeyStroke::shifted(0x1B),
            ':' => KeyStroke::shifted(0x27),
            '"' => KeyStroke::shifted(0x28),
            '~' => KeyStroke::shifted(0x29),
            '|' => KeyStroke::shifted(0x2B),
            '<' => KeyStroke::shifted(0x33),
            '>' => KeyStroke::shifted(0x34),
            '?' => KeyStroke::shifted(0x35),
            _ => return None,
        };
        Some(stroke)
    }
}
