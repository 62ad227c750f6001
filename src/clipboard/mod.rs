//! 剪贴板能力抽象
//!
//! # 设计思路
//!
//! 核心逻辑只依赖两个 trait：
//! - [`ClipboardBackend`]：采集 / 写回完整快照、读写纯文本、变化计数、权限状态
//! - [`KeystrokeSynth`]：向前台应用发送“复制”“粘贴”按键
//!
//! 具体实现（`arboard`、`enigo`、各平台变化计数）都在子模块中，
//! 测试使用内存中的假实现替换它们。
//!
//! # 实现思路
//!
//! - `pasteboard`：macOS 上直接读写 `NSPasteboard` 的 `PasteboardClipboard`，
//!   保留全部条目与类型。
//! - `system`：基于 `arboard` 的 [`SystemClipboard`]，每次调用新建句柄；其他平台使用。
//! - [`NativeClipboard`] 指向当前平台应使用的实现。
//! - `change_counter`：macOS 读 `NSPasteboard.changeCount`，Windows 读
//!   `GetClipboardSequenceNumber`，其他平台由 `listener` 后台线程计数。
//! - `keystroke`：基于 `enigo` 的 [`EnigoKeys`]。

mod change_counter;
mod keystroke;
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
mod listener;
#[cfg(target_os = "macos")]
mod pasteboard;
mod system;

use std::fmt;

pub use keystroke::EnigoKeys;
#[cfg(target_os = "macos")]
pub use pasteboard::PasteboardClipboard;
pub use system::SystemClipboard;

#[cfg(target_os = "macos")]
pub type NativeClipboard = PasteboardClipboard;
#[cfg(not(target_os = "macos"))]
pub type NativeClipboard = SystemClipboard;

use crate::snapshot::Snapshot;

/// 剪贴板访问权限
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Allowed,
    PromptEachTime,
    Denied,
    Unknown,
}

impl PermissionStatus {
    pub fn is_usable(self) -> bool {
        matches!(self, Self::Allowed | Self::PromptEachTime)
    }
}

impl fmt::Display for PermissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Allowed => "Allowed",
            Self::PromptEachTime => "Prompt Each Time",
            Self::Denied => "Denied",
            Self::Unknown => "Unknown",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClipboardError {
    #[error("Pasteboard permission required. Grant clipboard access and try again.")]
    PermissionDenied,

    #[error("Clipboard is empty. Copy something first.")]
    EmptyClipboard,

    #[error("Failed to set clipboard content: {0}")]
    FailedToSet(String),

    #[error("Clipboard unavailable: {0}")]
    Unavailable(String),
}

/// 系统剪贴板能力
pub trait ClipboardBackend: Send + Sync {
    fn permission_status(&self) -> PermissionStatus;

    /// 单调递增的变化计数，任何进程修改剪贴板都会使其增加
    fn change_count(&self) -> u64;

    /// 采集当前剪贴板的全部条目与表示；无内容时返回 `None`
    fn capture_all(&self) -> Option<Snapshot>;

    /// 清空剪贴板并写入快照
    fn restore_all(&self, snapshot: &Snapshot) -> Result<(), ClipboardError>;

    fn current_text(&self) -> Option<String>;

    fn set_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// 按键模拟能力
pub trait KeystrokeSynth: Send + Sync {
    fn copy(&self) -> Result<(), ClipboardError>;

    fn paste(&self) -> Result<(), ClipboardError>;

    /// 是否已获得模拟按键所需的辅助功能授权
    fn is_trusted(&self) -> bool;
}
