//! 配置与数据目录解析
//!
//! 所有路径都由 home 目录推导：
//!
//! ```text
//! ~/.config/clipslots/config.toml
//! ~/.local/share/clipslots/
//!   ├─ slots/slot_<n>/...      槽位数据
//!   ├─ manifest.json           派生清单
//!   └─ slots.json(.bak)        旧版单文件存储
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = "clipslots";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    pub config_dir: PathBuf,
    pub data_dir: PathBuf,
}

impl AppPaths {
    /// 以指定目录作为 home 构造路径布局（测试中指向临时目录）
    pub fn from_home(home: &Path) -> Self {
        Self {
            config_dir: home.join(".config").join(APP_DIR_NAME),
            data_dir: home.join(".local").join("share").join(APP_DIR_NAME),
        }
    }

    /// 基于当前用户 home 目录解析
    pub fn resolve() -> io::Result<Self> {
        let home = dirs::home_dir().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "cannot determine home directory")
        })?;
        Ok(Self::from_home(&home))
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    pub fn slots_dir(&self) -> PathBuf {
        self.data_dir.join("slots")
    }

    pub fn slot_dir(&self, slot: u8) -> PathBuf {
        self.slots_dir().join(format!("slot_{}", slot))
    }

    pub fn manifest_file(&self) -> PathBuf {
        self.data_dir.join("manifest.json")
    }

    pub fn legacy_store(&self) -> PathBuf {
        self.data_dir.join("slots.json")
    }

    pub fn legacy_backup(&self) -> PathBuf {
        self.data_dir.join("slots.json.bak")
    }

    /// 创建数据目录与槽位目录
    pub fn ensure_data_dirs(&self) -> io::Result<()> {
        fs::create_dir_all(self.slots_dir())
    }
}
