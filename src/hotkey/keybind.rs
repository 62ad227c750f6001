//! 快捷键组合解析
//!
//! 格式：`modifier(+modifier)*+key`，大小写不敏感。
//! 修饰键：ctrl/control、option/alt、cmd/command、shift；
//! 按键：数字 0-9、字母 a-z、F1-F12。

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeybindError {
    #[error("Invalid keybind format: \"{0}\". Expected format: modifier+key")]
    Format(String),

    #[error("Unknown modifier \"{0}\"")]
    UnknownModifier(String),

    #[error("Unknown key \"{0}\"")]
    UnknownKey(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Modifier {
    Control,
    Option,
    Command,
    Shift,
}

impl Modifier {
    fn parse(token: &str) -> Option<Self> {
        match token {
            "ctrl" | "control" => Some(Self::Control),
            "option" | "alt" => Some(Self::Option),
            "cmd" | "command" => Some(Self::Command),
            "shift" => Some(Self::Shift),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Control => "ctrl",
            Self::Option => "option",
            Self::Command => "cmd",
            Self::Shift => "shift",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// 数字键 0-9
    Digit(u8),
    /// 字母键，存储为小写
    Letter(char),
    /// 功能键 F1-F12
    Function(u8),
}

impl Key {
    fn parse(token: &str) -> Option<Self> {
        let mut chars = token.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_digit() => Some(Self::Digit(c as u8 - b'0')),
            (Some(c), None) if c.is_ascii_lowercase() => Some(Self::Letter(c)),
            _ => {
                let number: u8 = token.strip_prefix('f')?.parse().ok()?;
                (1..=12).contains(&number).then_some(Self::Function(number))
            }
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Digit(d) => write!(f, "{}", d),
            Self::Letter(c) => write!(f, "{}", c),
            Self::Function(n) => write!(f, "f{}", n),
        }
    }
}

/// 解析后的快捷键：修饰键集合 + 一个按键
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyCombo {
    modifiers: BTreeSet<Modifier>,
    key: Key,
}

impl KeyCombo {
    pub fn new(modifiers: impl IntoIterator<Item = Modifier>, key: Key) -> Self {
        Self {
            modifiers: modifiers.into_iter().collect(),
            key,
        }
    }

    pub fn parse(input: &str) -> Result<Self, KeybindError> {
        let lowered = input.trim().to_lowercase();
        let tokens: Vec<&str> = lowered.split('+').map(str::trim).collect();

        let Some((key_token, modifier_tokens)) = tokens.split_last() else {
            return Err(KeybindError::Format(input.to_string()));
        };
        if modifier_tokens.is_empty() || tokens.iter().any(|token| token.is_empty()) {
            return Err(KeybindError::Format(input.to_string()));
        }

        let modifiers = modifier_tokens
            .iter()
            .map(|token| {
                Modifier::parse(token).ok_or_else(|| KeybindError::UnknownModifier(token.to_string()))
            })
            .collect::<Result<BTreeSet<_>, _>>()?;

        let key = Key::parse(key_token).ok_or_else(|| KeybindError::UnknownKey(key_token.to_string()))?;

        Ok(Self { modifiers, key })
    }

    pub fn modifiers(&self) -> impl Iterator<Item = Modifier> + '_ {
        self.modifiers.iter().copied()
    }

    pub fn key(&self) -> Key {
        self.key
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for modifier in &self.modifiers {
            write!(f, "{}+", modifier.as_str())?;
        }
        write!(f, "{}", self.key)
    }
}

impl FromStr for KeyCombo {
    type Err = KeybindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
