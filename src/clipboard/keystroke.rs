use enigo::{
    Direction::{Click, Press, Release},
    Enigo, Key, Keyboard, Settings,
};

use super::{ClipboardError, KeystrokeSynth};

/// 基于 `enigo` 的按键模拟：macOS 使用 Cmd，其他平台使用 Ctrl
#[derive(Debug, Default)]
pub struct EnigoKeys;

impl EnigoKeys {
    pub fn new() -> Self {
        Self
    }

    fn shortcut(&self, letter: char) -> Result<(), ClipboardError> {
        let mut enigo = Enigo::new(&Settings::default())
            .map_err(|e| ClipboardError::Unavailable(format!("初始化输入模拟失败: {}", e)))?;

        #[cfg(target_os = "macos")]
        let modifier = Key::Meta;
        #[cfg(not(target_os = "macos"))]
        let modifier = Key::Control;

        enigo
            .key(modifier, Press)
            .and_then(|_| enigo.key(Key::Unicode(letter), Click))
            .and_then(|_| enigo.key(modifier, Release))
            .map_err(|e| ClipboardError::Unavailable(format!("模拟按键失败: {}", e)))
    }
}

impl KeystrokeSynth for EnigoKeys {
    fn copy(&self) -> Result<(), ClipboardError> {
        self.shortcut('c')
    }

    fn paste(&self) -> Result<(), ClipboardError> {
        self.shortcut('v')
    }

    fn is_trusted(&self) -> bool {
        accessibility_trusted()
    }
}

#[cfg(target_os = "macos")]
fn accessibility_trusted() -> bool {
    #[link(name = "ApplicationServices", kind = "framework")]
    unsafe extern "C" {
        fn AXIsProcessTrusted() -> bool;
    }

    unsafe { AXIsProcessTrusted() }
}

/// 其他平台没有单独的辅助功能授权
#[cfg(not(target_os = "macos"))]
fn accessibility_trusted() -> bool {
    true
}
