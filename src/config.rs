//! 配置文件加载与校验
//!
//! # 设计思路
//!
//! 配置是只读输入：槽位数量、是否输出日志、保存/粘贴两组快捷键模板。
//! 任何解析或校验错误都可恢复：启动时回退默认值，热重载时保留旧绑定。
//!
//! # 实现思路
//!
//! - `toml` + `serde(default)` 反序列化，缺失字段使用默认值。
//! - 文件不存在时写入带注释的默认配置。
//! - 快捷键模板的校验复用 [`crate::hotkey::KeyCombo::parse`]，以槽位 1 展开后解析。

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::hotkey::{KeyCombo, KeybindError};

pub const MIN_SLOTS: u8 = 1;
pub const MAX_SLOTS: u8 = 10;
pub const SLOT_PLACEHOLDER: &str = "{n}";

const DEFAULT_CONFIG_CONTENT: &str = r#"# ClipSlots Configuration

# Number of slots (1-10)
slots = 5

# Show daemon logs in terminal (true/false)
verbose = true

# Keybind configuration
# Modifiers: ctrl, option, cmd, shift
# Keys: 1-9, 0, a-z, f1-f12
# Use {n} as placeholder for slot number (slot 10 uses key 0)
[keybinds]
save = "ctrl+option+{n}"
paste = "ctrl+{n}"
"#;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config error in {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Invalid slot count: {0}. Must be between 1 and 10.")]
    InvalidSlotCount(u8),

    #[error("Invalid keybind for {kind}: \"{pattern}\" missing {{n}} placeholder.")]
    MissingPlaceholder { kind: String, pattern: String },

    #[error("Invalid keybind format for {kind}: \"{pattern}\". Expected format: modifier+modifier+{{n}}")]
    InvalidKeybindFormat { kind: String, pattern: String },

    #[error("Invalid modifier \"{modifier}\" in {kind} keybind. Valid modifiers: ctrl, option, cmd, shift")]
    InvalidModifier { modifier: String, kind: String },

    #[error("Unknown key \"{key}\" in {kind} keybind. Valid keys: 0-9, a-z, f1-f12")]
    UnknownKey { key: String, kind: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Keybinds {
    pub save: String,
    pub paste: String,
}

impl Default for Keybinds {
    fn default() -> Self {
        Self {
            save: "ctrl+option+{n}".to_string(),
            paste: "ctrl+{n}".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub slots: u8,
    pub verbose: bool,
    pub keybinds: Keybinds,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            slots: 5,
            verbose: true,
            keybinds: Keybinds::default(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_SLOTS..=MAX_SLOTS).contains(&self.slots) {
            return Err(ConfigError::InvalidSlotCount(self.slots));
        }
        validate_keybind_pattern(&self.keybinds.save, "save")?;
        validate_keybind_pattern(&self.keybinds.paste, "paste")?;
        Ok(())
    }

    /// 从文件读取并校验，错误原样返回（热重载使用）
    pub fn try_load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.message().to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// 读取配置；文件缺失时写入默认配置，任何错误都回退默认值
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            if let Err(err) = write_default_file(path) {
                log::warn!("写入默认配置失败 {}: {}", path.display(), err);
            } else {
                log::info!("已创建默认配置: {}", path.display());
            }
            return Self::default();
        }

        match Self::try_load(path) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("⚠️ {} 使用默认配置", err);
                Self::default()
            }
        }
    }

    pub fn slot_range(&self) -> std::ops::RangeInclusive<u8> {
        MIN_SLOTS..=self.slots
    }
}

/// 将模板中的 `{n}` 展开为槽位对应的按键（槽位 10 使用数字键 0）
pub fn expand_keybind(pattern: &str, slot: u8) -> String {
    let key = if slot == 10 {
        "0".to_string()
    } else {
        slot.to_string()
    };
    pattern.replace(SLOT_PLACEHOLDER, &key)
}

fn validate_keybind_pattern(pattern: &str, kind: &str) -> Result<(), ConfigError> {
    if !pattern.contains(SLOT_PLACEHOLDER) {
        return Err(ConfigError::MissingPlaceholder {
            kind: kind.to_string(),
            pattern: pattern.to_string(),
        });
    }

    match KeyCombo::parse(&expand_keybind(pattern, 1)) {
        Ok(_) => Ok(()),
        Err(KeybindError::Format(_)) => Err(ConfigError::InvalidKeybindFormat {
            kind: kind.to_string(),
            pattern: pattern.to_string(),
        }),
        Err(KeybindError::UnknownModifier(modifier)) => Err(ConfigError::InvalidModifier {
            modifier,
            kind: kind.to_string(),
        }),
        Err(KeybindError::UnknownKey(key)) => Err(ConfigError::UnknownKey {
            key,
            kind: kind.to_string(),
        }),
    }
}

fn write_default_file(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, DEFAULT_CONFIG_CONTENT)
}
