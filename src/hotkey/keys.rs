//! Symbolic key names and their Windows virtual-key codes.

use std::fmt;

/// Modifier keys that may prefix a hotkey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    Ctrl,
    Shift,
    Alt,
    /// The Windows logo key.
    Win,
}

impl Modifier {
    pub fn parse(token: &str) -> Option<Self> {
        match token.to_lowercase().as_str() {
            "ctrl" | "control" => Some(Self::Ctrl),
            "shift" => Some(Self::Shift),
            "alt" => Some(Self::Alt),
            "win" | "super" | "meta" | "cmd" => Some(Self::Win),
            _ => None,
        }
    }

    pub fn virtual_key(self) -> u16 {
        match self {
            Self::Ctrl => 0x11,
            Self::Shift => 0x10,
            Self::Alt => 0x12,
            Self::Win => 0x5B,
        }
    }
}

/// Named non-character keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedKey {
    Space,
    Enter,
    Tab,
    Escape,
    Backspace,
    Delete,
    Insert,
    Home,
    End,
    PageUp,
    PageDown,
    Up,
    Down,
    Left,
    Right,
    PrintScreen,
}

impl NamedKey {
    fn parse(token: &str) -> Option<Self> {
        let key = match token.to_lowercase().as_str() {
            "space" => Self::Space,
            "enter" | "return" => Self::Enter,
            "tab" => Self::Tab,
            "escape" | "esc" => Self::Escape,
            "backspace" => Self::Backspace,
            "delete" | "del" => Self::Delete,
            "insert" | "ins" => Self::Insert,
            "home" => Self::Home,
            "end" => Self::End,
            "pageup" | "pgup" => Self::PageUp,
            "pagedown" | "pgdn" => Self::PageDown,
            "up" => Self::Up,
            "down" => Self::Down,
            "left" => Self::Left,
            "right" => Self::Right,
            "printscreen" | "prtsc" | "print" => Self::PrintScreen,
            _ => return None,
        };
        Some(key)
    }

    fn virtual_key(self) -> u16 {
        match self {
            Self::Space => 0x20,
            Self::Enter => 0x0D,
            Self::Tab => 0x09,
            Self::Escape => 0x1B,
            Self::Backspace => 0x08,
            Self::Delete => 0x2E,
            Self::Insert => 0x2D,
            Self::Home => 0x24,
            Self::End => 0x23,
            Self::PageUp => 0x21,
            Self::PageDown => 0x22,
            Self::Left => 0x25,
            Self::Up => 0x26,
            Self::Right => 0x27,
            Self::Down => 0x28,
            Self::PrintScreen => 0x2C,
        }
    }
}

/// The single non-modifier key of a hotkey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// `A`-`Z` or `0`-`9`, stored upper-cased.
    Char(char),
    /// `F1`-`F24`.
    Function(u8),
    Named(NamedKey),
    /// A raw virtual-key code written as `0x2C`.
    Raw(u8),
}

impl Key {
    pub fn parse(token: &str) -> Result<Self, String> {
        let token = token.trim();
        let mut chars = token.chars();
        if let (Some(ch), None) = (chars.next(), chars.next()) {
            if ch.is_ascii_alphanumeric() {
                return Ok(Self::Char(ch.to_ascii_uppercase()));
            }
            return Err(format!("Unsupported key character: {:?}", token));
        }

        if let Some(hex) = token
            .strip_prefix("0x")
            .or_else(|| token.strip_prefix("0X"))
        {
            return match u8::from_str_radix(hex, 16) {
                Ok(code) if code != 0 => Ok(Self::Raw(code)),
                _ => Err(format!("Invalid virtual-key code: {}", token)),
            };
        }

        if let Some(ordinal) = token
            .strip_prefix('F')
            .or_else(|| token.strip_prefix('f'))
            .and_then(|n| n.parse::<u8>().ok())
        {
            if (1..=24).contains(&ordinal) {
                return Ok(Self::Function(ordinal));
            }
            return Err(format!("Function key out of range: {}", token));
        }

        NamedKey::parse(token)
            .map(Self::Named)
            .ok_or_else(|| format!("Unknown key: {:?}", token))
    }

    pub fn virtual_key(self) -> u16 {
        match self {
            // Letters and digits share their ASCII upper-case codes.
            Self::Char(ch) => ch as u16,
            Self::Function(n) => 0x70 + u16::from(n - 1),
            Self::Named(named) => named.virtual_key(),
            Self::Raw(code) => u16::from(code),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Char(ch) => write!(f, "{ch}"),
            Self::Function(n) => write!(f, "F{n}"),
            Self::Named(named) => write!(f, "{named:?}"),
            Self::Raw(code) => write!(f, "0x{code:02X}"),
        }
    }
}

/// Shortcuts owned by the Windows shell that synthetic key events cannot
/// reliably trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemShortcut {
    /// The Snipping Tool region capture (`Win+Shift+S`).
    ScreenClip,
}

impl SystemShortcut {
    pub fn parse(token: &str) -> Option<Self> {
        match token.to_lowercase().as_str() {
            "screenclip" => Some(Self::ScreenClip),
            _ => None,
        }
    }

    /// Protocol URI that opens the shortcut's native handler.
    pub fn uri(self) -> &'static str {
        match self {
            Self::ScreenClip => "ms-screenclip:",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_characters_case_insensitively() {
        assert_eq!(Key::parse("s").unwrap(), Key::Char('S'));
        assert_eq!(Key::parse("S").unwrap().virtual_key(), 0x53);
        assert_eq!(Key::parse("7").unwrap().virtual_key(), 0x37);
    }

    #[test]
    fn parses_function_keys() {
        assert_eq!(Key::parse("F1").unwrap().virtual_key(), 0x70);
        assert_eq!(Key::parse("f12").unwrap().virtual_key(), 0x7B);
        assert_eq!(Key::parse("F24").unwrap().virtual_key(), 0x87);
        assert!(Key::parse("F25").is_err());
        assert!(Key::parse("F0").is_err());
    }

    #[test]
    fn parses_named_and_raw_keys() {
        assert_eq!(Key::parse("Escape").unwrap().virtual_key(), 0x1B);
        assert_eq!(Key::parse("esc").unwrap(), Key::Named(NamedKey::Escape));
        assert_eq!(Key::parse("PrintScreen").unwrap().virtual_key(), 0x2C);
        assert_eq!(Key::parse("0x2c").unwrap(), Key::Raw(0x2C));
        assert!(Key::parse("0xZZ").is_err());
        assert!(Key::parse("0x00").is_err());
    }

    #[test]
    fn rejects_unknown_tokens() {
        assert!(Key::parse("Hyper").is_err());
        assert!(Key::parse("+").is_err());
        assert!(Key::parse("").is_err());
    }

    #[test]
    fn modifier_codes() {
        assert_eq!(Modifier::parse("Control"), Some(Modifier::Ctrl));
        assert_eq!(Modifier::parse("super"), Some(Modifier::Win));
        assert_eq!(Modifier::Win.virtual_key(), 0x5B);
        assert_eq!(Modifier::parse("S"), None);
    }
}
