//! 槽位存储
//!
//! # 设计思路
//!
//! 以目录树作为数据库：每个槽位一个目录，每个条目一个子目录，每种表示一个文件。
//! 写入走“暂存目录 + 重命名替换”，任何读者都不会看到写了一半的槽位；
//! 不引入锁文件，跨进程的并发写入以最后一次重命名为准。
//!
//! # 实现思路
//!
//! ```text
//! slots/
//!   ├─ slot_3/
//!   │   ├─ item_0000/
//!   │   │   ├─ 00_public.utf8-plain-text.bin
//!   │   │   └─ 01_public.html.bin
//!   │   └─ item_0001/...
//!   ├─ .tmp_3_<pid>/     写入中的暂存目录
//!   └─ .old_3_<pid>/     替换过程中被换下的旧目录
//! ```
//!
//! - 条目与表示都带零填充序号，读取时按数值排序，保证顺序在往返后不变。
//! - 替换分两步重命名：旧目录 -> `.old_`，暂存 -> 正式；第二步失败则把旧目录换回。
//! - 启动时清理 `.tmp_`，并根据正式目录是否存在决定恢复或删除 `.old_`。
//! - 每次变更后同步重建清单；清单写入失败只记录警告，不回滚已提交的变更。

mod encoding;
mod error;
mod manifest;
mod migration;
mod process;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub use encoding::{decode_type_name, encode_type_name, DecodeError};
pub use error::{MigrationError, StorageError};
pub use manifest::{Manifest, ManifestEntry};

use crate::config::{MAX_SLOTS, MIN_SLOTS};
use crate::paths::AppPaths;
use crate::snapshot::{ClipboardItem, Representation, Snapshot};

const STAGING_PREFIX: &str = ".tmp_";
const RETIRED_PREFIX: &str = ".old_";
const ITEM_PREFIX: &str = "item_";
const REPRESENTATION_SUFFIX: &str = ".bin";

/// `list()` 的单行结果；`entry` 为 `None` 表示槽位为空
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotSummary {
    pub slot: u8,
    pub entry: Option<ManifestEntry>,
}

#[derive(Debug, Clone)]
pub struct SlotStore {
    paths: AppPaths,
    slot_count: u8,
}

impl SlotStore {
    /// 打开存储：创建目录、清理上次崩溃遗留的暂存目录、迁移旧版单文件存储
    pub fn open(paths: &AppPaths, slot_count: u8) -> Result<Self, StorageError> {
        paths
            .ensure_data_dirs()
            .map_err(|e| StorageError::io(paths.slots_dir(), e))?;

        let store = Self {
            paths: paths.clone(),
            slot_count,
        };
        store.recover_interrupted_writes();

        match migration::migrate_legacy_store(&store) {
            Ok(Some(migrated)) => {
                log::info!(
                    "📦 已从旧版存储迁移 {} 个槽位，备份位于 {}",
                    migrated.len(),
                    paths.legacy_backup().display()
                );
                store.refresh_manifest_logged();
            }
            Ok(None) => {}
            Err(err) => log::warn!("⚠️ 旧版存储迁移失败，保留原文件: {}", err),
        }

        Ok(store)
    }

    pub fn slot_count(&self) -> u8 {
        self.slot_count
    }

    /// 调整可访问的槽位数量；超出范围的槽位数据保留在磁盘上
    pub fn set_slot_count(&mut self, slot_count: u8) {
        if slot_count < self.slot_count {
            log::info!(
                "槽位数量 {} -> {}，超出范围的槽位数据保留在磁盘上",
                self.slot_count,
                slot_count
            );
        }
        self.slot_count = slot_count;
    }

    /// 校验槽位编号是否在 `1..=slot_count` 内
    pub fn check_slot(&self, slot: u32) -> Result<u8, StorageError> {
        check_slot_range(slot, self.slot_count)
    }

    /// 读取槽位；槽位不存在时返回 `Ok(None)`，其他 I/O 错误原样返回
    pub fn read(&self, slot: u8) -> Result<Option<Snapshot>, StorageError> {
        self.check_slot(slot.into())?;
        self.load(slot)
    }

    pub fn write(&self, slot: u8, snapshot: &Snapshot) -> Result<(), StorageError> {
        self.check_slot(slot.into())?;
        self.commit(slot, snapshot)?;
        self.refresh_manifest_logged();
        Ok(())
    }

    pub fn clear(&self, slot: u8) -> Result<(), StorageError> {
        self.check_slot(slot.into())?;
        self.discard(slot)?;
        self.refresh_manifest_logged();
        Ok(())
    }

    pub fn clear_all(&self) -> Result<(), StorageError> {
        for slot in MIN_SLOTS..=self.slot_count {
            self.discard(slot)?;
        }
        self.refresh_manifest_logged();
        Ok(())
    }

    pub fn is_empty(&self, slot: u8) -> Result<bool, StorageError> {
        self.check_slot(slot.into())?;
        Ok(!self.has_content(slot))
    }

    /// 列出 `1..=slot_count` 的摘要：优先读清单，清单不可用时逐个读取槽位
    pub fn list(&self) -> Result<Vec<SlotSummary>, StorageError> {
        if let Some(manifest) = Manifest::load(&self.paths.manifest_file()) {
            return Ok((MIN_SLOTS..=self.slot_count)
                .map(|slot| SlotSummary {
                    slot,
                    entry: manifest.entry(slot).cloned(),
                })
                .collect());
        }

        (MIN_SLOTS..=self.slot_count)
            .map(|slot| {
                let entry = self.summarize(slot)?;
                Ok(SlotSummary { slot, entry })
            })
            .collect()
    }

    /// 根据磁盘上的槽位目录重建清单（覆盖 1..=10，不受当前槽位数量限制）
    pub fn refresh_manifest(&self) -> Result<(), StorageError> {
        let mut entries = Vec::new();
        for slot in MIN_SLOTS..=MAX_SLOTS {
            match self.summarize(slot) {
                Ok(Some(entry)) => entries.push(entry),
                Ok(None) => {}
                Err(err) => log::warn!("生成清单时跳过槽位 {}: {}", slot, err),
            }
        }
        Manifest { entries }.write_atomic(&self.paths.manifest_file())
    }

    // ============================================================================
    // 内部实现
    // ============================================================================

    fn refresh_manifest_logged(&self) {
        if let Err(err) = self.refresh_manifest() {
            log::warn!("⚠️ 更新清单失败（槽位数据已提交）: {}", err);
        }
    }

    pub(crate) fn has_content(&self, slot: u8) -> bool {
        self.paths.slot_dir(slot).is_dir()
    }

    fn summarize(&self, slot: u8) -> Result<Option<ManifestEntry>, StorageError> {
        let Some(snapshot) = self.load(slot)? else {
            return Ok(None);
        };
        let slot_dir = self.paths.slot_dir(slot);
        let modified = fs::metadata(&slot_dir)
            .and_then(|meta| meta.modified())
            .map_err(|e| StorageError::io(&slot_dir, e))?;
        Ok(Some(ManifestEntry::from_snapshot(slot, &snapshot, modified)))
    }

    fn load(&self, slot: u8) -> Result<Option<Snapshot>, StorageError> {
        let slot_dir = self.paths.slot_dir(slot);
        let item_dirs = match numbered_entries(&slot_dir, parse_item_name) {
            Ok(dirs) => dirs,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(StorageError::io(&slot_dir, err)),
        };

        let mut items = Vec::with_capacity(item_dirs.len());
        for (item_dir, ()) in item_dirs {
            let files = numbered_entries(&item_dir, parse_representation_name)
                .map_err(|e| StorageError::io(&item_dir, e))?;

            let mut representations = Vec::with_capacity(files.len());
            for (file, encoded) in files {
                let type_id = match decode_type_name(&encoded) {
                    Ok(type_id) => type_id,
                    Err(err) => {
                        log::warn!("跳过无法解码的表示文件 {}: {}", file.display(), err);
                        continue;
                    }
                };
                let bytes = fs::read(&file).map_err(|e| StorageError::io(&file, e))?;
                representations.push(Representation::new(type_id, bytes));
            }
            items.push(ClipboardItem::new(representations));
        }

        let snapshot = Snapshot::new(items);
        Ok((!snapshot.is_empty()).then_some(snapshot))
    }

    /// 写入并替换槽位目录，不校验槽位范围也不更新清单
    pub(crate) fn commit(&self, slot: u8, snapshot: &Snapshot) -> Result<(), StorageError> {
        if snapshot.is_empty() {
            return Err(StorageError::EmptySnapshot);
        }

        let staging = self.scratch_dir(STAGING_PREFIX, slot);
        if let Err(err) = write_snapshot_tree(&staging, snapshot) {
            remove_path_logged(&staging);
            return Err(err);
        }

        self.swap_into_place(slot, &staging)
    }

    fn swap_into_place(&self, slot: u8, staging: &Path) -> Result<(), StorageError> {
        let committed = self.paths.slot_dir(slot);
        let retired = self.scratch_dir(RETIRED_PREFIX, slot);
        remove_path_logged(&retired);

        let had_previous = match fs::rename(&committed, &retired) {
            Ok(()) => true,
            Err(err) if err.kind() == io::ErrorKind::NotFound => false,
            Err(err) => {
                remove_path_logged(staging);
                return Err(StorageError::io(&committed, err));
            }
        };

        if let Err(err) = fs::rename(staging, &committed) {
            if had_previous {
                if let Err(restore_err) = fs::rename(&retired, &committed) {
                    log::error!(
                        "❌ 槽位 {} 旧数据换回失败，保留在 {}: {}",
                        slot,
                        retired.display(),
                        restore_err
                    );
                }
            }
            remove_path_logged(staging);
            return Err(StorageError::io(&committed, err));
        }

        if had_previous {
            remove_path_logged(&retired);
        }
        Ok(())
    }

    pub(crate) fn discard(&self, slot: u8) -> Result<(), StorageError> {
        let slot_dir = self.paths.slot_dir(slot);
        match fs::remove_dir_all(&slot_dir) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StorageError::io(&slot_dir, err)),
        }
    }

    fn scratch_dir(&self, prefix: &str, slot: u8) -> PathBuf {
        self.paths
            .slots_dir()
            .join(format!("{}{}_{}", prefix, slot, std::process::id()))
    }

    /// 清理上次运行中断留下的暂存目录，并恢复替换到一半的槽位
    ///
    /// 目录名里带有写入进程的 pid；该进程仍在运行时目录属于进行中的写入，保持不动。
    fn recover_interrupted_writes(&self) {
        let slots_dir = self.paths.slots_dir();
        let entries = match fs::read_dir(&slots_dir) {
            Ok(entries) => entries,
            Err(err) => {
                log::warn!("无法扫描槽位目录 {}: {}", slots_dir.display(), err);
                return;
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();

            if name.starts_with(STAGING_PREFIX) {
                if parse_scratch_name(&name, STAGING_PREFIX)
                    .is_some_and(|(_, pid)| owner_is_running(pid))
                {
                    log::debug!("暂存目录 {} 属于运行中的写入，跳过", name);
                    continue;
                }
                log::info!("🧹 清理遗留暂存目录: {}", name);
                remove_path_logged(&path);
            } else if let Some((slot, pid)) = parse_scratch_name(&name, RETIRED_PREFIX) {
                if owner_is_running(pid) {
                    log::debug!("旧目录 {} 属于运行中的进程 {}，跳过", name, pid);
                    continue;
                }
                let committed = self.paths.slot_dir(slot);
                if committed.exists() {
                    remove_path_logged(&path);
                } else if let Err(err) = fs::rename(&path, &committed) {
                    log::warn!("恢复槽位 {} 失败: {}", slot, err);
                } else {
                    log::info!("♻️ 已恢复替换中断的槽位 {}", slot);
                }
            }
        }
    }
}

fn owner_is_running(pid: u32) -> bool {
    pid == std::process::id() || process::is_running(pid)
}

/// 校验槽位编号是否在 `1..=max` 内，不访问磁盘
pub fn check_slot_range(slot: u32, max: u8) -> Result<u8, StorageError> {
    u8::try_from(slot)
        .ok()
        .filter(|slot| (MIN_SLOTS..=max).contains(slot))
        .ok_or(StorageError::InvalidSlot { slot, max })
}

fn write_snapshot_tree(root: &Path, snapshot: &Snapshot) -> Result<(), StorageError> {
    remove_path_logged(root);
    fs::create_dir_all(root).map_err(|e| StorageError::io(root, e))?;

    for (item_index, item) in snapshot.items().iter().enumerate() {
        let item_dir = root.join(format!("{}{:04}", ITEM_PREFIX, item_index));
        fs::create_dir(&item_dir).map_err(|e| StorageError::io(&item_dir, e))?;

        for (rep_index, rep) in item.representations().iter().enumerate() {
            let file = item_dir.join(format!(
                "{:02}_{}{}",
                rep_index,
                encode_type_name(&rep.type_id),
                REPRESENTATION_SUFFIX
            ));
            fs::write(&file, &rep.bytes).map_err(|e| StorageError::io(&file, e))?;
        }
    }
    Ok(())
}

/// 列出目录下能被 `parse` 识别的条目，按序号排序
fn numbered_entries<T>(
    dir: &Path,
    parse: impl Fn(&str) -> Option<(usize, T)>,
) -> io::Result<Vec<(PathBuf, T)>> {
    let mut found = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if let Some((index, value)) = parse(name) {
            found.push((index, entry.path(), value));
        }
    }
    found.sort_by_key(|(index, _, _)| *index);
    Ok(found.into_iter().map(|(_, path, value)| (path, value)).collect())
}

fn parse_item_name(name: &str) -> Option<(usize, ())> {
    let index = name.strip_prefix(ITEM_PREFIX)?.parse().ok()?;
    Some((index, ()))
}

fn parse_representation_name(name: &str) -> Option<(usize, String)> {
    let (index, encoded) = name.strip_suffix(REPRESENTATION_SUFFIX)?.split_once('_')?;
    Some((index.parse().ok()?, encoded.to_string()))
}

/// 解析 `<prefix><slot>_<pid>` 形式的暂存 / 旧目录名
fn parse_scratch_name(name: &str, prefix: &str) -> Option<(u8, u32)> {
    let (slot, pid) = name.strip_prefix(prefix)?.split_once('_')?;
    let slot = slot.parse().ok().filter(|slot| (MIN_SLOTS..=MAX_SLOTS).contains(slot))?;
    Some((slot, pid.parse().ok()?))
}

fn remove_path_logged(path: &Path) {
    let result = if path.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    match result {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => log::warn!("删除 {} 失败: {}", path.display(), err),
    }
}
