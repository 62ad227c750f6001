//! 旧版单文件存储迁移
//!
//! 旧版只保存纯文本：`slots.json` 是槽位号到文本的映射，
//! 可能是扁平形式 `{"1": "hello"}`，也可能包在 `{"slots": {...}, "updated_at": ...}` 中。
//! 迁移是一次性的：成功后重命名为 `slots.json.bak`，失败则不留下任何部分迁移的槽位。

use std::collections::BTreeMap;
use std::fs;
use std::io;

use serde::Deserialize;

use super::{MigrationError, SlotStore};
use crate::config::{MAX_SLOTS, MIN_SLOTS};
use crate::snapshot::Snapshot;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LegacyStore {
    Wrapped {
        slots: BTreeMap<String, serde_json::Value>,
    },
    Flat(BTreeMap<String, serde_json::Value>),
}

impl LegacyStore {
    /// 取出可迁移的 `(槽位, 文本)`，按槽位排序
    fn into_entries(self) -> Vec<(u8, String)> {
        let (Self::Wrapped { slots } | Self::Flat(slots)) = self;

        let mut entries: Vec<(u8, String)> = slots
            .into_iter()
            .filter_map(|(key, value)| {
                let slot = key
                    .trim()
                    .parse::<u8>()
                    .ok()
                    .filter(|slot| (MIN_SLOTS..=MAX_SLOTS).contains(slot));
                let text = match value {
                    serde_json::Value::String(text) if !text.is_empty() => Some(text),
                    _ => None,
                };
                match (slot, text) {
                    (Some(slot), Some(text)) => Some((slot, text)),
                    _ => {
                        log::debug!("跳过旧版存储中的条目 {:?}", key);
                        None
                    }
                }
            })
            .collect();
        entries.sort_by_key(|(slot, _)| *slot);
        entries
    }
}

/// 存在旧版文件时执行迁移，返回本次写入的槽位；没有旧版文件时返回 `Ok(None)`
pub(super) fn migrate_legacy_store(store: &SlotStore) -> Result<Option<Vec<u8>>, MigrationError> {
    let legacy_path = store.paths.legacy_store();
    let content = match fs::read_to_string(&legacy_path) {
        Ok(content) => content,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(MigrationError::Read {
                path: legacy_path,
                source,
            });
        }
    };

    let legacy: LegacyStore =
        serde_json::from_str(&content).map_err(|source| MigrationError::Parse {
            path: legacy_path.clone(),
            source,
        })?;

    let mut migrated = Vec::new();
    for (slot, text) in legacy.into_entries() {
        if store.has_content(slot) {
            log::info!("槽位 {} 已有内容，跳过旧版数据", slot);
            continue;
        }
        if let Err(source) = store.commit(slot, &Snapshot::from_text(&text)) {
            roll_back(store, &migrated);
            return Err(MigrationError::Write { slot, source });
        }
        migrated.push(slot);
    }

    let backup_path = store.paths.legacy_backup();
    let backup = match fs::remove_file(&backup_path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err),
    }
    .and_then(|()| fs::rename(&legacy_path, &backup_path));

    if let Err(source) = backup {
        roll_back(store, &migrated);
        return Err(MigrationError::Backup {
            path: backup_path,
            source,
        });
    }

    Ok(Some(migrated))
}

fn roll_back(store: &SlotStore, migrated: &[u8]) {
    for &slot in migrated {
        if let Err(err) = store.discard(slot) {
            log::warn!("回滚迁移的槽位 {} 失败: {}", slot, err);
        }
    }
}
