//! macOS 原生剪贴板实现
//!
//! # 实现思路
//!
//! 直接操作 `NSPasteboard.generalPasteboard`：
//! - 采集：遍历 `pasteboardItems`，对每个条目的全部 `types` 调用 `dataForType`，
//!   私有类型与多条目都原样保留。
//! - 写回：`clearContents` 后为快照中的每个条目新建 `NSPasteboardItem`，
//!   逐个 `setData:forType:`，最后一次性 `writeObjects`。
//!
//! 所有 AppKit 调用都包在自动释放池里，守护进程长时间运行也不会堆积对象。

use std::ffi::{c_void, CStr};

use cocoa::appkit::{NSPasteboard, NSPasteboardItem};
use cocoa::base::{id, nil, NO};
use cocoa::foundation::{NSArray, NSAutoreleasePool, NSData, NSString, NSUInteger};
use objc::{class, msg_send, sel, sel_impl};

use super::{change_counter, ClipboardBackend, ClipboardError, PermissionStatus};
use crate::snapshot::{types, ClipboardItem, Representation, Snapshot};

#[derive(Debug, Default)]
pub struct PasteboardClipboard;

impl PasteboardClipboard {
    pub fn new() -> Self {
        Self
    }
}

impl ClipboardBackend for PasteboardClipboard {
    fn permission_status(&self) -> PermissionStatus {
        // 系统尚未提供查询接口，按已授权处理
        PermissionStatus::Allowed
    }

    fn change_count(&self) -> u64 {
        change_counter::current()
    }

    fn capture_all(&self) -> Option<Snapshot> {
        let items = with_pool(|| unsafe { read_items() });
        let snapshot = Snapshot::new(items);
        (!snapshot.is_empty()).then_some(snapshot)
    }

    fn restore_all(&self, snapshot: &Snapshot) -> Result<(), ClipboardError> {
        if snapshot.is_empty() {
            return Err(ClipboardError::EmptyClipboard);
        }
        if with_pool(|| unsafe { write_items(snapshot) }) {
            Ok(())
        } else {
            Err(ClipboardError::FailedToSet(
                "NSPasteboard rejected the items".to_string(),
            ))
        }
    }

    fn current_text(&self) -> Option<String> {
        with_pool(|| unsafe {
            let pasteboard = NSPasteboard::generalPasteboard(nil);
            let type_id = NSString::alloc(nil).init_str(types::PLAIN_TEXT).autorelease();
            string_from_ns(NSPasteboard::stringForType(pasteboard, type_id))
        })
    }

    fn set_text(&self, text: &str) -> Result<(), ClipboardError> {
        self.restore_all(&Snapshot::from_text(text))
    }
}

fn with_pool<T>(f: impl FnOnce() -> T) -> T {
    unsafe {
        let pool = NSAutoreleasePool::new(nil);
        let result = f();
        pool.drain();
        result
    }
}

unsafe fn read_items() -> Vec<ClipboardItem> {
    let pasteboard = unsafe { NSPasteboard::generalPasteboard(nil) };
    let items = unsafe { pasteboard.pasteboardItems() };
    if items == nil {
        return Vec::new();
    }

    let mut captured = Vec::new();
    for index in 0..unsafe { items.count() } {
        let item = unsafe { items.objectAtIndex(index) };
        let item_types = unsafe { NSPasteboardItem::types(item) };
        if item_types == nil {
            continue;
        }

        let mut snapshot_item = ClipboardItem::default();
        for type_index in 0..unsafe { item_types.count() } {
            let type_id = unsafe { item_types.objectAtIndex(type_index) };
            let Some(type_name) = (unsafe { string_from_ns(type_id) }) else {
                continue;
            };
            let data = unsafe { NSPasteboardItem::dataForType(item, type_id) };
            if data == nil {
                log::debug!("类型 {} 没有可读取的数据", type_name);
                continue;
            }
            snapshot_item.push(Representation::new(type_name, unsafe { bytes_from_ns(data) }));
        }

        if !snapshot_item.is_empty() {
            captured.push(snapshot_item);
        }
    }
    captured
}

unsafe fn write_items(snapshot: &Snapshot) -> bool {
    let objects: Vec<id> = snapshot
        .items()
        .iter()
        .map(|item| unsafe { new_pasteboard_item(item) })
        .collect();

    unsafe {
        let pasteboard = NSPasteboard::generalPasteboard(nil);
        pasteboard.clearContents();
        let array = NSArray::arrayWithObjects(nil, &objects);
        pasteboard.writeObjects(array) != NO
    }
}

unsafe fn new_pasteboard_item(item: &ClipboardItem) -> id {
    unsafe {
        let pasteboard_item: id = msg_send![class!(NSPasteboardItem), new];
        let pasteboard_item = pasteboard_item.autorelease();
        for rep in item.representations() {
            let data = NSData::dataWithBytes_length_(
                nil,
                rep.bytes.as_ptr() as *const c_void,
                rep.bytes.len() as NSUInteger,
            );
            let type_id = NSString::alloc(nil).init_str(&rep.type_id).autorelease();
            if NSPasteboardItem::setData_forType(pasteboard_item, data, type_id) == NO {
                log::warn!("写回类型 {} 失败", rep.type_id);
            }
        }
        pasteboard_item
    }
}

unsafe fn string_from_ns(string: id) -> Option<String> {
    if string == nil {
        return None;
    }
    let ptr = unsafe { string.UTF8String() };
    if ptr.is_null() {
        return None;
    }
    Some(unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned())
}

unsafe fn bytes_from_ns(data: id) -> Vec<u8> {
    let len = unsafe { data.length() } as usize;
    let ptr = unsafe { data.bytes() } as *const u8;
    if len == 0 || ptr.is_null() {
        return Vec::new();
    }
    unsafe { std::slice::from_raw_parts(ptr, len) }.to_vec()
}
