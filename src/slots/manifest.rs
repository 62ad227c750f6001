//! 槽位清单（manifest.json）
//!
//! 清单只是列表加速用的派生数据：每次变更后由槽位目录重新生成，
//! 读取失败时调用方回退到逐个读取槽位。

use std::fs;
use std::path::Path;
use std::time::SystemTime;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use super::StorageError;
use crate::snapshot::Snapshot;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    pub slot: u8,
    pub description: String,
    pub types: Vec<String>,
    pub total_bytes: u64,
    pub item_count: usize,
    pub updated_at: String,
}

impl ManifestEntry {
    pub fn from_snapshot(slot: u8, snapshot: &Snapshot, updated_at: SystemTime) -> Self {
        Self {
            slot,
            description: snapshot.describe(),
            types: snapshot.type_ids(),
            total_bytes: snapshot.total_bytes(),
            item_count: snapshot.item_count(),
            updated_at: DateTime::<Local>::from(updated_at).to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub entries: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn entry(&self, slot: u8) -> Option<&ManifestEntry> {
        self.entries.iter().find(|entry| entry.slot == slot)
    }

    /// 读取清单；不存在或无法解析时返回 `None`
    pub fn load(path: &Path) -> Option<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                if err.kind() != std::io::ErrorKind::NotFound {
                    log::warn!("读取清单失败 {}: {}", path.display(), err);
                }
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(manifest) => Some(manifest),
            Err(err) => {
                log::warn!("清单格式无效，改为逐个读取槽位: {}", err);
                None
            }
        }
    }

    /// 先写临时文件再重命名，读者不会看到半个清单
    pub fn write_atomic(&self, path: &Path) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(self)?;
        let tmp_path = path.with_extension(format!("json.tmp_{}", std::process::id()));

        fs::write(&tmp_path, json).map_err(|e| StorageError::io(&tmp_path, e))?;
        if let Err(err) = fs::rename(&tmp_path, path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(StorageError::io(path, err));
        }
        Ok(())
    }
}
