// In-memory clipboard, keystroke and hotkey fakes shared by the integration tests
#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use clipslots::clipboard::{ClipboardBackend, ClipboardError, KeystrokeSynth, PermissionStatus};
use clipslots::hotkey::{HotkeyError, HotkeyRegistrar, KeyCombo};
use clipslots::paths::AppPaths;
use clipslots::snapshot::Snapshot;
use tempfile::TempDir;

#[derive(Debug)]
struct ClipboardState {
    content: Option<Snapshot>,
    change_count: u64,
    mutations: usize,
    permission: PermissionStatus,
    selection: Option<Snapshot>,
}

/// 内存剪贴板：记录内容、变化计数与写入次数
#[derive(Debug)]
pub struct FakeClipboard {
    state: Mutex<ClipboardState>,
}

impl FakeClipboard {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(ClipboardState {
                content: None,
                change_count: 0,
                mutations: 0,
                permission: PermissionStatus::Allowed,
                selection: None,
            }),
        })
    }

    pub fn with_content(snapshot: Snapshot) -> Arc<Self> {
        let clipboard = Self::new();
        clipboard.state.lock().unwrap().content = Some(snapshot);
        clipboard
    }

    pub fn content(&self) -> Option<Snapshot> {
        self.state.lock().unwrap().content.clone()
    }

    pub fn mutations(&self) -> usize {
        self.state.lock().unwrap().mutations
    }

    pub fn set_permission(&self, permission: PermissionStatus) {
        self.state.lock().unwrap().permission = permission;
    }

    /// 前台应用中被选中的内容；模拟复制时写入剪贴板
    pub fn select(&self, snapshot: Option<Snapshot>) {
        self.state.lock().unwrap().selection = snapshot;
    }

    fn simulate_copy(&self) {
        let mut state = self.state.lock().unwrap();
        if let Some(selection) = state.selection.clone() {
            state.content = Some(selection);
            state.change_count += 1;
        }
    }
}

impl ClipboardBackend for FakeClipboard {
    fn permission_status(&self) -> PermissionStatus {
        self.state.lock().unwrap().permission
    }

    fn change_count(&self) -> u64 {
        self.state.lock().unwrap().change_count
    }

    fn capture_all(&self) -> Option<Snapshot> {
        self.state.lock().unwrap().content.clone()
    }

    fn restore_all(&self, snapshot: &Snapshot) -> Result<(), ClipboardError> {
        let mut state = self.state.lock().unwrap();
        state.content = Some(snapshot.clone());
        state.change_count += 1;
        state.mutations += 1;
        Ok(())
    }

    fn current_text(&self) -> Option<String> {
        self.content()
            .and_then(|snapshot| snapshot.text_preview().map(str::to_string))
    }

    fn set_text(&self, text: &str) -> Result<(), ClipboardError> {
        self.restore_all(&Snapshot::from_text(text))
    }
}

/// 模拟按键：复制时把选中内容放进 [`FakeClipboard`]，粘贴只计数
pub struct FakeKeys {
    clipboard: Arc<FakeClipboard>,
    trusted: bool,
    pastes: Mutex<usize>,
}

impl FakeKeys {
    pub fn new(clipboard: Arc<FakeClipboard>, trusted: bool) -> Arc<Self> {
        Arc::new(Self {
            clipboard,
            trusted,
            pastes: Mutex::new(0),
        })
    }

    pub fn pastes(&self) -> usize {
        *self.pastes.lock().unwrap()
    }
}

impl KeystrokeSynth for FakeKeys {
    fn copy(&self) -> Result<(), ClipboardError> {
        // 未授权时按键被系统丢弃
        if self.trusted {
            self.clipboard.simulate_copy();
        }
        Ok(())
    }

    fn paste(&self) -> Result<(), ClipboardError> {
        *self.pastes.lock().unwrap() += 1;
        Ok(())
    }

    fn is_trusted(&self) -> bool {
        self.trusted
    }
}

/// 顺序分配 id 的注册表，可指定注册失败的组合键
#[derive(Debug, Default)]
pub struct FakeRegistrar {
    next_id: u32,
    pub registered: Vec<(u32, String)>,
    pub rejected: HashSet<String>,
    pub unregister_calls: usize,
}

impl FakeRegistrar {
    pub fn rejecting(combos: &[&str]) -> Self {
        Self {
            rejected: combos.iter().map(|c| c.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn id_of(&self, combo: &str) -> Option<u32> {
        self.registered
            .iter()
            .find(|(_, registered)| registered == combo)
            .map(|(id, _)| *id)
    }
}

impl HotkeyRegistrar for FakeRegistrar {
    fn register(&mut self, combo: &KeyCombo) -> Result<u32, HotkeyError> {
        let text = combo.to_string();
        if self.rejected.contains(&text) {
            return Err(HotkeyError::Register {
                combo: text,
                message: "already taken".to_string(),
            });
        }
        self.next_id += 1;
        self.registered.push((self.next_id, text));
        Ok(self.next_id)
    }

    fn unregister_all(&mut self) {
        self.unregister_calls += 1;
        self.registered.clear();
    }
}

/// 临时 home 目录及其下的路径布局
pub fn temp_paths() -> (TempDir, AppPaths) {
    let dir = tempfile::tempdir().expect("create temp dir failed");
    let paths = AppPaths::from_home(dir.path());
    (dir, paths)
}
