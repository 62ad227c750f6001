//! 命令行子命令的实现
//!
//! 每个命令都独立加载配置、打开存储，返回要打印的文本；
//! 打印、交互确认与退出码由 `main` 负责，便于在测试中直接调用。
//! 槽位范围在打开存储之前校验，越界的请求不会触碰磁盘。

use crate::clipboard::{ClipboardBackend, ClipboardError, KeystrokeSynth};
use crate::config::Config;
use crate::error::AppError;
use crate::paths::AppPaths;
use crate::slots::{check_slot_range, SlotStore};

/// 把当前剪贴板保存到槽位
pub fn save(
    paths: &AppPaths,
    clipboard: &dyn ClipboardBackend,
    slot: u32,
) -> Result<String, AppError> {
    let config = Config::load_or_default(&paths.config_file());
    let slot = check_slot_range(slot, config.slots)?;

    let store = SlotStore::open(paths, config.slots)?;

    if !clipboard.permission_status().is_usable() {
        return Err(ClipboardError::PermissionDenied.into());
    }
    let snapshot = clipboard
        .capture_all()
        .ok_or(ClipboardError::EmptyClipboard)?;

    store.write(slot, &snapshot)?;
    Ok(format!("Saved to slot {}: {}", slot, snapshot.describe()))
}

/// 把槽位内容写回剪贴板（不模拟粘贴按键）
pub fn paste(
    paths: &AppPaths,
    clipboard: &dyn ClipboardBackend,
    slot: u32,
) -> Result<String, AppError> {
    let config = Config::load_or_default(&paths.config_file());
    let slot = check_slot_range(slot, config.slots)?;

    let store = SlotStore::open(paths, config.slots)?;

    if !clipboard.permission_status().is_usable() {
        return Err(ClipboardError::PermissionDenied.into());
    }
    let snapshot = store.read(slot)?.ok_or_else(|| {
        AppError::Validation(format!(
            "Slot {} is empty. Save something first with 'clipslots save {}'.",
            slot, slot
        ))
    })?;

    clipboard.restore_all(&snapshot)?;
    Ok(format!(
        "Slot {} copied to clipboard: {}",
        slot,
        snapshot.describe()
    ))
}

/// 列出所有槽位
pub fn list(paths: &AppPaths) -> Result<String, AppError> {
    let config = Config::load_or_default(&paths.config_file());
    let store = SlotStore::open(paths, config.slots)?;

    let lines: Vec<String> = store
        .list()?
        .into_iter()
        .map(|summary| match summary.entry {
            Some(entry) => format!("Slot {}: {}", summary.slot, entry.description),
            None => format!("Slot {}: (empty)", summary.slot),
        })
        .collect();
    Ok(lines.join("\n"))
}

/// 清空一个槽位；未指定槽位时在 `confirm` 返回 true 后清空全部
pub fn clear(
    paths: &AppPaths,
    slot: Option<u32>,
    confirm: impl FnOnce() -> bool,
) -> Result<String, AppError> {
    let config = Config::load_or_default(&paths.config_file());

    match slot {
        Some(slot) => {
            let slot = check_slot_range(slot, config.slots)?;
            SlotStore::open(paths, config.slots)?.clear(slot)?;
            Ok(format!("Cleared slot {}", slot))
        }
        None => {
            if !confirm() {
                return Ok("Cancelled".to_string());
            }
            SlotStore::open(paths, config.slots)?.clear_all()?;
            Ok("Cleared all slots".to_string())
        }
    }
}

/// 配置、快捷键与权限状态
pub fn status(
    paths: &AppPaths,
    clipboard: &dyn ClipboardBackend,
    keys: &dyn KeystrokeSynth,
) -> Result<String, AppError> {
    let config_path = paths.config_file();
    let config = Config::load_or_default(&config_path);
    let validity = match Config::try_load(&config_path) {
        Ok(_) => "valid".to_string(),
        Err(err) => format!("invalid, using defaults ({})", err),
    };

    let accessible = if keys.is_trusted() {
        "Yes"
    } else {
        "No (hotkeys won't work)"
    };

    let lines = [
        "ClipSlots Status".to_string(),
        "────────────────".to_string(),
        format!("Accessible:  {}", accessible),
        format!("Pasteboard:  {}", clipboard.permission_status()),
        format!("Slots:       {}", config.slots),
        format!("Logging:     {}", if config.verbose { "on" } else { "off" }),
        format!("Config:      {} ({})", config_path.display(), validity),
        String::new(),
        "Keybinds:".to_string(),
        format!("  Save:      {}", config.keybinds.save),
        format!("  Paste:     {}", config.keybinds.paste),
    ];
    Ok(lines.join("\n"))
}

/// 守护进程的日志级别：`verbose = true` 时输出 info
pub fn daemon_log_filter(paths: &AppPaths) -> &'static str {
    let config = Config::load_or_default(&paths.config_file());
    if config.verbose { "info" } else { "warn" }
}
