//! 基于 `arboard` 的系统剪贴板实现
//!
//! `arboard` 只暴露文本、HTML 与位图，因此采集到的快照是单条目的：
//! 纯文本 + PNG 位图（Windows 上另外读取 CF_HDROP 文件列表）。
//! 写回时按 HTML > 图片 > 文本 > 文件路径文本 的顺序选择第一个条目里可写的表示。

use std::borrow::Cow;
use std::io::Cursor;

use image::ImageFormat;

use super::{change_counter, ClipboardBackend, ClipboardError, PermissionStatus};
use crate::snapshot::{types, ClipboardItem, Representation, Snapshot, TypeKind};

#[derive(Debug, Default)]
pub struct SystemClipboard;

impl SystemClipboard {
    pub fn new() -> Self {
        // 没有系统计数的平台需要尽早启动监听线程
        let _ = change_counter::current();
        Self
    }

    fn open() -> Result<arboard::Clipboard, ClipboardError> {
        arboard::Clipboard::new().map_err(|e| ClipboardError::Unavailable(e.to_string()))
    }
}

impl ClipboardBackend for SystemClipboard {
    fn permission_status(&self) -> PermissionStatus {
        match Self::open() {
            Ok(_) => PermissionStatus::Allowed,
            Err(err) => {
                log::debug!("无法打开剪贴板: {}", err);
                PermissionStatus::Unknown
            }
        }
    }

    fn change_count(&self) -> u64 {
        change_counter::current()
    }

    fn capture_all(&self) -> Option<Snapshot> {
        let mut clipboard = match Self::open() {
            Ok(clipboard) => clipboard,
            Err(err) => {
                log::warn!("采集剪贴板失败: {}", err);
                return None;
            }
        };

        let mut items = file_items();

        let mut item = ClipboardItem::default();
        if let Ok(text) = clipboard.get_text() {
            item.push(Representation::new(types::PLAIN_TEXT, text));
        }
        if let Ok(image_data) = clipboard.get_image() {
            match encode_png(image_data) {
                Ok(png) => {
                    item.push(Representation::new(types::PNG, png));
                }
                Err(err) => log::warn!("剪贴板图片编码失败: {}", err),
            }
        }
        items.push(item);

        let snapshot = Snapshot::new(items);
        (!snapshot.is_empty()).then_some(snapshot)
    }

    fn restore_all(&self, snapshot: &Snapshot) -> Result<(), ClipboardError> {
        let Some(first) = snapshot.items().first() else {
            return Err(ClipboardError::EmptyClipboard);
        };
        if snapshot.item_count() > 1 {
            log::debug!("系统剪贴板仅写回首个条目（共 {} 个）", snapshot.item_count());
        }

        let mut clipboard = Self::open()?;
        let text = first.representations().iter().find_map(Representation::as_text);

        let html = first
            .representations()
            .iter()
            .find(|rep| rep.kind() == TypeKind::RichText && rep.type_id.to_ascii_lowercase().contains("html"))
            .and_then(|rep| std::str::from_utf8(&rep.bytes).ok());
        if let Some(html) = html {
            return clipboard
                .set_html(html.to_string(), text.map(str::to_string))
                .map_err(|e| ClipboardError::FailedToSet(e.to_string()));
        }

        let image = first
            .representations()
            .iter()
            .filter(|rep| rep.kind() == TypeKind::Image)
            .find_map(|rep| image::load_from_memory(&rep.bytes).ok());
        if let Some(image) = image {
            let rgba = image.to_rgba8();
            let (width, height) = rgba.dimensions();
            let image_data = arboard::ImageData {
                width: width as usize,
                height: height as usize,
                bytes: Cow::Owned(rgba.into_raw()),
            };
            return clipboard
                .set_image(image_data)
                .map_err(|e| ClipboardError::FailedToSet(e.to_string()));
        }

        let fallback_text = text.map(str::to_string).or_else(|| file_reference_text(snapshot));
        match fallback_text {
            Some(text) => clipboard
                .set_text(text)
                .map_err(|e| ClipboardError::FailedToSet(e.to_string())),
            None => Err(ClipboardError::FailedToSet(
                "no representation this clipboard can hold".to_string(),
            )),
        }
    }

    fn current_text(&self) -> Option<String> {
        Self::open().ok()?.get_text().ok().filter(|text| !text.is_empty())
    }

    fn set_text(&self, text: &str) -> Result<(), ClipboardError> {
        Self::open()?
            .set_text(text.to_string())
            .map_err(|e| ClipboardError::FailedToSet(e.to_string()))
    }
}

fn encode_png(image_data: arboard::ImageData<'_>) -> Result<Vec<u8>, String> {
    let width = image_data.width as u32;
    let height = image_data.height as u32;
    let image = image::RgbaImage::from_raw(width, height, image_data.bytes.into_owned())
        .ok_or_else(|| "创建图像缓冲区失败".to_string())?;

    let mut cursor = Cursor::new(Vec::new());
    image
        .write_to(&mut cursor, ImageFormat::Png)
        .map_err(|e| e.to_string())?;
    Ok(cursor.into_inner())
}

/// 所有文件引用表示拼成的多行文本
fn file_reference_text(snapshot: &Snapshot) -> Option<String> {
    let lines: Vec<&str> = snapshot
        .representations()
        .filter(|rep| rep.kind() == TypeKind::FileReference)
        .filter_map(|rep| std::str::from_utf8(&rep.bytes).ok())
        .collect();
    (!lines.is_empty()).then(|| lines.join("\n"))
}

#[cfg(target_os = "windows")]
fn file_items() -> Vec<ClipboardItem> {
    read_clipboard_files()
        .into_iter()
        .map(|path| {
            let url = format!("file:///{}", path.replace('\\', "/"));
            ClipboardItem::new(vec![Representation::new(types::FILE_URL, url)])
        })
        .collect()
}

#[cfg(not(target_os = "windows"))]
fn file_items() -> Vec<ClipboardItem> {
    Vec::new()
}

/// 读取 CF_HDROP 文件列表
#[cfg(target_os = "windows")]
fn read_clipboard_files() -> Vec<String> {
    use std::ffi::OsString;
    use std::os::windows::ffi::OsStringExt;
    use windows::Win32::System::DataExchange::{CloseClipboard, GetClipboardData, OpenClipboard};
    use windows::Win32::System::Ole::CF_HDROP;
    use windows::Win32::UI::Shell::{DragQueryFileW, HDROP};

    unsafe {
        if OpenClipboard(None).is_err() {
            return Vec::new();
        }

        let mut files = Vec::new();
        if let Ok(handle) = GetClipboardData(CF_HDROP.0 as u32) {
            let hdrop = HDROP(handle.0);
            let count = DragQueryFileW(hdrop, 0xFFFFFFFF, None);
            for i in 0..count {
                let len = DragQueryFileW(hdrop, i, None);
                if len == 0 {
                    continue;
                }

                let mut buf = vec![0u16; (len + 1) as usize];
                DragQueryFileW(hdrop, i, Some(&mut buf));
                if let Some(pos) = buf.iter().position(|&c| c == 0) {
                    buf.truncate(pos);
                }
                files.push(OsString::from_wide(&buf).to_string_lossy().to_string());
            }
        }

        let _ = CloseClipboard();
        if !files.is_empty() {
            log::debug!("📁 从剪贴板读取到 {} 个文件", files.len());
        }
        files
    }
}
