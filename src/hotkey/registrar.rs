//! 全局快捷键注册
//!
//! [`HotkeyRegistrar`] 把解析好的 [`KeyCombo`] 注册到系统，并返回事件里携带的 id。
//! [`GlobalHotkeyRegistrar`] 基于 `global-hotkey`；它必须在创建它的线程上使用，
//! macOS / Windows 还要求该线程持续处理原生消息（见 [`pump_native_events`]）。

use global_hotkey::hotkey::{Code, HotKey, Modifiers};
use global_hotkey::GlobalHotKeyManager;

use super::{Key, KeyCombo, Modifier};

#[derive(Debug, thiserror::Error)]
pub enum HotkeyError {
    #[error("Global hotkeys unavailable: {0}")]
    Unavailable(String),

    #[error("Could not register hotkey {combo}: {message}")]
    Register { combo: String, message: String },
}

pub trait HotkeyRegistrar {
    fn register(&mut self, combo: &KeyCombo) -> Result<u32, HotkeyError>;

    fn unregister_all(&mut self);
}

pub struct GlobalHotkeyRegistrar {
    manager: GlobalHotKeyManager,
    registered: Vec<HotKey>,
}

impl GlobalHotkeyRegistrar {
    pub fn new() -> Result<Self, HotkeyError> {
        let manager =
            GlobalHotKeyManager::new().map_err(|e| HotkeyError::Unavailable(e.to_string()))?;
        Ok(Self {
            manager,
            registered: Vec::new(),
        })
    }
}

impl HotkeyRegistrar for GlobalHotkeyRegistrar {
    fn register(&mut self, combo: &KeyCombo) -> Result<u32, HotkeyError> {
        let hotkey = to_hotkey(combo);
        self.manager
            .register(hotkey)
            .map_err(|e| HotkeyError::Register {
                combo: combo.to_string(),
                message: e.to_string(),
            })?;
        self.registered.push(hotkey);
        Ok(hotkey.id())
    }

    fn unregister_all(&mut self) {
        for hotkey in self.registered.drain(..) {
            if let Err(err) = self.manager.unregister(hotkey) {
                log::warn!("注销快捷键失败: {}", err);
            }
        }
    }
}

impl Drop for GlobalHotkeyRegistrar {
    fn drop(&mut self) {
        self.unregister_all();
    }
}

fn to_hotkey(combo: &KeyCombo) -> HotKey {
    let modifiers = combo
        .modifiers()
        .fold(Modifiers::empty(), |acc, modifier| {
            acc | match modifier {
                Modifier::Control => Modifiers::CONTROL,
                Modifier::Option => Modifiers::ALT,
                Modifier::Command => Modifiers::META,
                Modifier::Shift => Modifiers::SHIFT,
            }
        });
    HotKey::new(Some(modifiers), key_code(combo.key()))
}

fn key_code(key: Key) -> Code {
    match key {
        Key::Digit(d) => match d {
            0 => Code::Digit0,
            1 => Code::Digit1,
            2 => Code::Digit2,
            3 => Code::Digit3,
            4 => Code::Digit4,
            5 => Code::Digit5,
            6 => Code::Digit6,
            7 => Code::Digit7,
            8 => Code::Digit8,
            _ => Code::Digit9,
        },
        Key::Letter(c) => match c {
            'a' => Code::KeyA,
            'b' => Code::KeyB,
            'c' => Code::KeyC,
            'd' => Code::KeyD,
            'e' => Code::KeyE,
            'f' => Code::KeyF,
            'g' => Code::KeyG,
            'h' => Code::KeyH,
            'i' => Code::KeyI,
            'j' => Code::KeyJ,
            'k' => Code::KeyK,
            'l' => Code::KeyL,
            'm' => Code::KeyM,
            'n' => Code::KeyN,
            'o' => Code::KeyO,
            'p' => Code::KeyP,
            'q' => Code::KeyQ,
            'r' => Code::KeyR,
            's' => Code::KeyS,
            't' => Code::KeyT,
            'u' => Code::KeyU,
            'v' => Code::KeyV,
            'w' => Code::KeyW,
            'x' => Code::KeyX,
            'y' => Code::KeyY,
            _ => Code::KeyZ,
        },
        Key::Function(n) => match n {
            1 => Code::F1,
            2 => Code::F2,
            3 => Code::F3,
            4 => Code::F4,
            5 => Code::F5,
            6 => Code::F6,
            7 => Code::F7,
            8 => Code::F8,
            9 => Code::F9,
            10 => Code::F10,
            11 => Code::F11,
            _ => Code::F12,
        },
    }
}

/// 处理当前线程上积压的原生事件，使快捷键回调得以触发
#[cfg(target_os = "windows")]
pub fn pump_native_events() {
    use windows::Win32::UI::WindowsAndMessaging::{
        DispatchMessageW, PeekMessageW, TranslateMessage, MSG, PM_REMOVE,
    };

    unsafe {
        let mut msg = MSG::default();
        while PeekMessageW(&mut msg, None, 0, 0, PM_REMOVE).as_bool() {
            let _ = TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }
    }
}

#[cfg(target_os = "macos")]
pub fn pump_native_events() {
    use cocoa::appkit::{NSApp, NSApplication, NSEventMask};
    use cocoa::base::{nil, YES};
    use cocoa::foundation::{NSDate, NSDefaultRunLoopMode};

    unsafe {
        let app = NSApp();
        loop {
            let event = app.nextEventMatchingMask_untilDate_inMode_dequeue_(
                NSEventMask::NSAnyEventMask.bits(),
                NSDate::distantPast(nil),
                NSDefaultRunLoopMode,
                YES,
            );
            if event == nil {
                break;
            }
            app.sendEvent_(event);
        }
    }
}

/// X11 后端自带事件线程
#[cfg(not(any(target_os = "windows", target_os = "macos")))]
pub fn pump_native_events() {}

/// 初始化事件线程所需的原生应用对象（仅 macOS 需要）
#[cfg(target_os = "macos")]
pub fn prepare_native_app() {
    use cocoa::appkit::{NSApplication, NSApplicationActivationPolicy};
    use cocoa::base::nil;

    unsafe {
        let app = NSApplication::sharedApplication(nil);
        app.setActivationPolicy_(NSApplicationActivationPolicy::NSApplicationActivationPolicyAccessory);
    }
}

#[cfg(not(target_os = "macos"))]
pub fn prepare_native_app() {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combo_maps_to_matching_hotkey() {
        let combo = KeyCombo::parse("ctrl+option+3").expect("valid combo");
        let expected = HotKey::new(Some(Modifiers::CONTROL | Modifiers::ALT), Code::Digit3);
        assert_eq!(to_hotkey(&combo), expected);
        assert_eq!(to_hotkey(&combo).id(), expected.id());
    }

    #[test]
    fn letters_and_function_keys_map() {
        assert_eq!(key_code(Key::Letter('k')), Code::KeyK);
        assert_eq!(key_code(Key::Function(11)), Code::F11);
        assert_eq!(key_code(Key::Digit(0)), Code::Digit0);
    }
}
