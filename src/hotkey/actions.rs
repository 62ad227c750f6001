//! 快捷键触发的保存 / 粘贴流程
//!
//! # 设计思路
//!
//! 两个动作都遵循“边缘保存、结束恢复”：触发前记录用户剪贴板，
//! 动作结束后写回，用户剪贴板的最终状态与触发前一致，
//! 只有交给前台应用的那一刻内容不同。
//!
//! # 实现思路
//!
//! - 保存：记录原内容与变化计数 → 模拟复制 → 等待稳定 → 计数未变则视为未选中 →
//!   采集并写入槽位 → 写回原内容。
//! - 粘贴：读槽位（为空则不做任何剪贴板修改）→ 记录原内容 → 写入槽位快照 →
//!   模拟粘贴 → 延迟后在后台任务中写回原内容，不阻塞事件循环。
//! - 延迟恢复任务登记在 [`SlotActions`] 中。下一个动作开始前若它尚未执行，
//!   就取消任务并立即写回它持有的原内容，避免把槽位内容误当成用户剪贴板。
//! - 所有错误都在这里吞掉并记录，返回 [`HotkeyOutcome`] 供调用方和测试观察。

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::clipboard::{ClipboardBackend, KeystrokeSynth};
use crate::slots::SlotStore;
use crate::snapshot::Snapshot;

const PREVIEW_LEN: usize = 40;

/// 动作中的固定等待时间
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionTiming {
    /// 模拟复制后等待前台应用写入剪贴板的时间
    pub copy_settle: Duration,
    /// 模拟粘贴后到恢复原剪贴板之间的延迟
    pub paste_restore_delay: Duration,
}

impl Default for ActionTiming {
    fn default() -> Self {
        Self {
            copy_settle: Duration::from_millis(100),
            paste_restore_delay: Duration::from_millis(150),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HotkeyOutcome {
    Saved { slot: u8, description: String },
    Pasted { slot: u8, preview: String },
    NothingSelected { slot: u8 },
    AccessibilityMissing { slot: u8 },
    SlotEmpty { slot: u8 },
    PermissionDenied { slot: u8 },
    Failed { slot: u8, reason: String },
}

pub struct SlotActions {
    store: SlotStore,
    clipboard: Arc<dyn ClipboardBackend>,
    keys: Arc<dyn KeystrokeSynth>,
    timing: ActionTiming,
    pending_restore: Mutex<Option<PendingRestore>>,
}

/// 粘贴后尚未执行的恢复
struct PendingRestore {
    original: Snapshot,
    task: JoinHandle<()>,
}

fn timestamp() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

impl SlotActions {
    pub fn new(
        store: SlotStore,
        clipboard: Arc<dyn ClipboardBackend>,
        keys: Arc<dyn KeystrokeSynth>,
        timing: ActionTiming,
    ) -> Self {
        Self {
            store,
            clipboard,
            keys,
            timing,
            pending_restore: Mutex::new(None),
        }
    }

    pub fn store(&self) -> &SlotStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut SlotStore {
        &mut self.store
    }

    pub async fn save(&self, slot: u8) -> HotkeyOutcome {
        self.finish_pending_restore();

        if !self.clipboard.permission_status().is_usable() {
            log::warn!("[{}] Save slot {}: no pasteboard permission", timestamp(), slot);
            return HotkeyOutcome::PermissionDenied { slot };
        }

        let original = self.clipboard.capture_all();
        let original_count = self.clipboard.change_count();

        if let Err(err) = self.keys.copy() {
            log::warn!("[{}] Error saving to slot {}: {}", timestamp(), slot, err);
            return HotkeyOutcome::Failed {
                slot,
                reason: err.to_string(),
            };
        }
        tokio::time::sleep(self.timing.copy_settle).await;

        let captured = if self.clipboard.change_count() == original_count {
            None
        } else {
            self.clipboard.capture_all()
        };

        let Some(captured) = captured else {
            let outcome = if self.keys.is_trusted() {
                log::info!("[{}] Save slot {}: nothing selected", timestamp(), slot);
                HotkeyOutcome::NothingSelected { slot }
            } else {
                log::warn!("[{}] Save slot {}: no Accessibility permission", timestamp(), slot);
                HotkeyOutcome::AccessibilityMissing { slot }
            };
            self.restore_original(original.as_ref());
            return outcome;
        };

        if let Err(err) = self.store.write(slot, &captured) {
            log::error!("[{}] Error saving to slot {}: {}", timestamp(), slot, err);
            self.restore_original(original.as_ref());
            return HotkeyOutcome::Failed {
                slot,
                reason: err.to_string(),
            };
        }

        log::info!(
            "[{}] Saved to slot {}: \"{}\"",
            timestamp(),
            slot,
            captured.short_preview(PREVIEW_LEN)
        );
        self.restore_original(original.as_ref());

        HotkeyOutcome::Saved {
            slot,
            description: captured.describe(),
        }
    }

    pub async fn paste(&self, slot: u8) -> HotkeyOutcome {
        let snapshot = match self.store.read(slot) {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => {
                log::info!("[{}] Paste slot {}: empty", timestamp(), slot);
                return HotkeyOutcome::SlotEmpty { slot };
            }
            Err(err) => {
                log::error!("[{}] Error pasting slot {}: {}", timestamp(), slot, err);
                return HotkeyOutcome::Failed {
                    slot,
                    reason: err.to_string(),
                };
            }
        };

        self.finish_pending_restore();

        if !self.clipboard.permission_status().is_usable() {
            log::warn!("[{}] Paste slot {}: no pasteboard permission", timestamp(), slot);
            return HotkeyOutcome::PermissionDenied { slot };
        }

        let original = self.clipboard.capture_all();

        if let Err(err) = self.clipboard.restore_all(&snapshot) {
            log::error!(
                "[{}] Error pasting slot {}: failed to set clipboard ({})",
                timestamp(),
                slot,
                err
            );
            return HotkeyOutcome::Failed {
                slot,
                reason: err.to_string(),
            };
        }

        if let Err(err) = self.keys.paste() {
            log::warn!("[{}] Paste slot {}: {}", timestamp(), slot, err);
        }

        self.schedule_restore(original);

        let preview = snapshot.short_preview(PREVIEW_LEN);
        log::info!("[{}] Pasted slot {}: \"{}\"", timestamp(), slot, preview);
        HotkeyOutcome::Pasted { slot, preview }
    }

    fn restore_original(&self, original: Option<&Snapshot>) {
        let Some(original) = original else {
            return;
        };
        if let Err(err) = self.clipboard.restore_all(original) {
            log::warn!("恢复原剪贴板内容失败: {}", err);
        }
    }

    /// 让上一次粘贴的延迟恢复立即生效
    ///
    /// 任务已经执行过则什么都不做；否则取消任务并同步写回原内容。
    /// 守护进程退出前也会调用，保证用户剪贴板不停留在槽位内容上。
    pub fn finish_pending_restore(&self) {
        let pending = match self.pending_restore.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        let Some(PendingRestore { original, task }) = pending else {
            return;
        };
        if task.is_finished() {
            return;
        }
        task.abort();
        log::debug!("提前执行上一次粘贴的剪贴板恢复");
        self.restore_original(Some(&original));
    }

    fn schedule_restore(&self, original: Option<Snapshot>) {
        let Some(original) = original else {
            return;
        };
        let clipboard = Arc::clone(&self.clipboard);
        let delay = self.timing.paste_restore_delay;
        let restored = original.clone();

        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(err) = clipboard.restore_all(&restored) {
                log::warn!("粘贴后恢复原剪贴板内容失败: {}", err);
            }
        });

        let pending = PendingRestore { original, task };
        match self.pending_restore.lock() {
            Ok(mut guard) => *guard = Some(pending),
            Err(poisoned) => *poisoned.into_inner() = Some(pending),
        }
    }
}
