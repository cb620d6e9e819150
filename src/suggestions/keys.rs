//! Toolkit-neutral key events and configurable chords
//!
//! Hosts translate their native keyboard events into [`KeyEvent`]s. Chords
//! are written as `+`-separated strings such as `"ctrl+space"` or
//! `"alt+escape"`, which makes the activation gesture configurable.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::KeyParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Printable character; the space bar is `Char(' ')`.
    Char(char),
    Escape,
    Enter,
    Up,
    Down,
    Left,
    Right,
    Backspace,
    Tab,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        alt: false,
        shift: false,
        meta: false,
    };

    /// True when every modifier held in `required` is also held here.
    pub fn contains(&self, required: Modifiers) -> bool {
        (!required.ctrl || self.ctrl)
            && (!required.alt || self.alt)
            && (!required.shift || self.shift)
            && (!required.meta || self.meta)
    }

    /// Ctrl, Alt or Meta held; Shift alone still types characters.
    pub fn is_command(&self) -> bool {
        self.ctrl || self.alt || self.meta
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    pub fn plain(key: Key) -> Self {
        Self::new(key, Modifiers::NONE)
    }
}

/// A key plus the modifiers that must be held for it to match.
///
/// Matching tolerates extra modifiers, so `ctrl+space` also fires for
/// Ctrl+Shift+Space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyChord {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyChord {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    pub fn matches(&self, event: &KeyEvent) -> bool {
        self.key == event.key && event.modifiers.contains(self.modifiers)
    }

    pub fn ctrl_space() -> Self {
        Self::new(Key::Char(' '), Modifiers { ctrl: true, ..Modifiers::NONE })
    }

    pub fn alt_escape() -> Self {
        Self::new(Key::Escape, Modifiers { alt: true, ..Modifiers::NONE })
    }
}

impl From<KeyChord> for KeyEvent {
    fn from(chord: KeyChord) -> Self {
        KeyEvent::new(chord.key, chord.modifiers)
    }
}

fn parse_key(name: &str) -> Result<Key, KeyParseError> {
    let lower = name.to_ascii_lowercase();
    let key = match lower.as_str() {
        "space" => Key::Char(' '),
        "esc" | "escape" => Key::Escape,
        "enter" | "return" => Key::Enter,
        "up" | "arrowup" => Key::Up,
        "down" | "arrowdown" => Key::Down,
        "left" | "arrowleft" => Key::Left,
        "right" | "arrowright" => Key::Right,
        "backspace" => Key::Backspace,
        "tab" => Key::Tab,
        _ => {
            let mut chars = name.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Key::Char(c),
                _ => return Err(KeyParseError::UnknownKey(name.to_string())),
            }
        }
    };
    Ok(key)
}

impl FromStr for KeyChord {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(KeyParseError::Empty);
        }

        // A literal "+" key is written as the last segment, e.g. "ctrl++".
        let (mods, key) = match s.strip_suffix("++") {
            Some(rest) => (rest, "+"),
            None => match s.rsplit_once('+') {
                Some((mods, key)) => (mods, key),
                None => ("", s),
            },
        };

        let mut modifiers = Modifiers::NONE;
        for part in mods.split('+').map(str::trim).filter(|p| !p.is_empty()) {
            match part.to_ascii_lowercase().as_str() {
                "ctrl" | "control" => modifiers.ctrl = true,
                "alt" | "option" => modifiers.alt = true,
                "shift" => modifiers.shift = true,
                "meta" | "cmd" | "super" => modifiers.meta = true,
                _ => return Err(KeyParseError::UnknownModifier(part.to_string())),
            }
        }

        let key = key.trim();
        if key.is_empty() {
            return Err(KeyParseError::Empty);
        }

        Ok(KeyChord::new(parse_key(key)?, modifiers))
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.ctrl {
            f.write_str("ctrl+")?;
        }
        if self.modifiers.alt {
            f.write_str("alt+")?;
        }
        if self.modifiers.shift {
            f.write_str("shift+")?;
        }
        if self.modifiers.meta {
            f.write_str("meta+")?;
        }
        match self.key {
            Key::Char(' ') => f.write_str("space"),
            Key::Char(c) => write!(f, "{}", c),
            Key::Escape => f.write_str("escape"),
            Key::Enter => f.write_str("enter"),
            Key::Up => f.write_str("up"),
            Key::Down => f.write_str("down"),
            Key::Left => f.write_str("left"),
            Key::Right => f.write_str("right"),
            Key::Backspace => f.write_str("backspace"),
            Key::Tab => f.write_str("tab"),
        }
    }
}

impl Serialize for KeyChord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for KeyChord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Parses a comma-separated chord list such as `"ctrl+space, alt+escape"`.
pub fn parse_chord_list(list: &str) -> Result<Vec<KeyChord>, KeyParseError> {
    list.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::parse::<KeyChord>)
        .collect()
}
