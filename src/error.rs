//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 各子系统定义自己的错误枚举（`ConfigError`、`ClipboardError`、`StorageError`、
//! `MigrationError`、`HotkeyError`），命令层统一返回 `Result<T, AppError>`，
//! `main` 只负责把它打印成一行 `Error: ...` 并以非零状态退出。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 子系统错误通过 `#[from]` 自动转换，消息原样透传。

use crate::clipboard::ClipboardError;
use crate::config::ConfigError;
use crate::hotkey::HotkeyError;
use crate::slots::{MigrationError, StorageError};

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Clipboard(#[from] ClipboardError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Migration(#[from] MigrationError),

    #[error(transparent)]
    Hotkey(#[from] HotkeyError),

    /// 命令参数校验失败
    #[error("{0}")]
    Validation(String),

    /// 文件系统 I/O 错误
    #[error("{0}")]
    Io(#[from] std::io::Error),
}
