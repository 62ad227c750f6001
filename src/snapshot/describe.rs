//! 快照描述生成
//!
//! 列表、清单与保存确认里看到的文字都来自这里，按固定优先级匹配：
//! 文件引用 > 图片 > 富文本 > 纯文本 > 二进制。

use std::io::Cursor;

use percent_encoding::percent_decode_str;
use url::Url;

use super::{Representation, Snapshot, TypeKind};

const TEXT_PREVIEW_LEN: usize = 50;
const RICH_TEXT_PREVIEW_LEN: usize = 40;

impl Snapshot {
    /// 生成简短的人类可读描述
    pub fn describe(&self) -> String {
        if let Some(description) = self.describe_files() {
            return description;
        }

        if self.representations().any(|rep| rep.kind() == TypeKind::Image) {
            return match self.image_dimensions() {
                Some((width, height)) => format!("Image {}x{}", width, height),
                None => "Image".to_string(),
            };
        }

        if self.representations().any(|rep| rep.kind() == TypeKind::RichText) {
            return match self.text_preview() {
                Some(text) => format!(
                    "Rich Text {} chars: {}",
                    text.chars().count(),
                    preview_string(text, RICH_TEXT_PREVIEW_LEN)
                ),
                None => "Rich Text".to_string(),
            };
        }

        if let Some(text) = self.text_preview() {
            return preview_string(text, TEXT_PREVIEW_LEN);
        }

        format!(
            "Binary: {} types, {}",
            self.type_ids().len(),
            format_bytes(self.total_bytes())
        )
    }

    /// 确认日志用的短预览：优先文本，其次退回描述
    pub fn short_preview(&self, max_len: usize) -> String {
        match self.text_preview() {
            Some(text) => preview_string(text, max_len),
            None => self.describe(),
        }
    }

    fn describe_files(&self) -> Option<String> {
        let file_items: Vec<_> = self
            .items()
            .iter()
            .filter(|item| item.has_kind(TypeKind::FileReference))
            .collect();

        match file_items.as_slice() {
            [] => None,
            [item] => {
                let name = item
                    .representations()
                    .iter()
                    .filter(|rep| rep.kind() == TypeKind::FileReference)
                    .find_map(file_name_from_reference);
                Some(match name {
                    Some(name) => format!("File: {}", name),
                    None => "File".to_string(),
                })
            }
            many => Some(format!("Files: {} items", many.len())),
        }
    }

    fn image_dimensions(&self) -> Option<(u32, u32)> {
        self.representations()
            .filter(|rep| rep.kind() == TypeKind::Image)
            .find_map(|rep| {
                image::ImageReader::new(Cursor::new(rep.bytes.as_slice()))
                    .with_guessed_format()
                    .ok()?
                    .into_dimensions()
                    .ok()
            })
    }
}

/// 换行压平为空格，超长时截断并以 `...` 结尾（总长不超过 `max_len` 个字符）
pub(crate) fn preview_string(text: &str, max_len: usize) -> String {
    let cleaned = text
        .replace("\r\n", " ")
        .replace(['\n', '\r'], " ");
    if cleaned.chars().count() > max_len {
        let kept: String = cleaned.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        cleaned
    }
}

/// 字节数格式化：1024 进制，MB 以上保留一位小数
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * 1024;

    if bytes < KB {
        format!("{} B", bytes)
    } else if bytes < MB {
        format!("{} KB", bytes / KB)
    } else {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    }
}

/// 从文件引用表示中取出文件名（支持 file URL、uri-list 与裸路径）
fn file_name_from_reference(rep: &Representation) -> Option<String> {
    let text = std::str::from_utf8(&rep.bytes).ok()?;
    let line = text
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('#'))?;

    // 单字母方案是 Windows 盘符（C:\...），按裸路径处理
    match Url::parse(line) {
        Ok(url) if url.scheme().len() > 1 => {
            let segment = url.path_segments()?.rev().find(|segment| !segment.is_empty())?;
            let name = percent_decode_str(segment).decode_utf8_lossy().into_owned();
            (!name.is_empty()).then_some(name)
        }
        _ => line
            .trim_end_matches(['/', '\\', '\0'])
            .rsplit(['/', '\\'])
            .next()
            .filter(|segment| !segment.is_empty())
            .map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{types, ClipboardItem, Representation, Snapshot};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = image::RgbaImage::new(width, height);
        let mut cursor = Cursor::new(Vec::new());
        image
            .write_to(&mut cursor, image::ImageFormat::Png)
            .expect("encode png");
        cursor.into_inner()
    }

    fn single(reps: Vec<Representation>) -> Snapshot {
        Snapshot::new(vec![ClipboardItem::new(reps)])
    }

    #[test]
    fn file_reference_wins_over_text() {
        let snapshot = single(vec![
            Representation::new(types::PLAIN_TEXT, "report.pdf"),
            Representation::new(types::FILE_URL, "file:///Users/me/Documents/My%20Report.pdf"),
        ]);
        assert_eq!(snapshot.describe(), "File: My Report.pdf");
    }

    #[test]
    fn two_file_items_describe_as_count() {
        let snapshot = Snapshot::new(vec![
            ClipboardItem::new(vec![Representation::new(types::FILE_URL, "file:///tmp/a.txt")]),
            ClipboardItem::new(vec![Representation::new(types::FILE_URL, "file:///tmp/b.txt")]),
        ]);
        assert_eq!(snapshot.describe(), "Files: 2 items");
    }

    #[test]
    fn uri_list_skips_comments() {
        let snapshot = single(vec![Representation::new(
            "text/uri-list",
            "# copied\r\nfile://localhost/home/me/notes.md\r\n",
        )]);
        assert_eq!(snapshot.describe(), "File: notes.md");
    }

    #[test]
    fn file_url_query_and_fragment_are_not_part_of_the_name() {
        let snapshot = single(vec![Representation::new(
            types::FILE_URL,
            "file:///tmp/a%2Fb.txt?x=1#frag",
        )]);
        assert_eq!(snapshot.describe(), "File: a/b.txt");
    }

    #[test]
    fn bare_paths_use_last_component() {
        let unix = single(vec![Representation::new(types::FILE_URL, "/home/me/todo.txt")]);
        assert_eq!(unix.describe(), "File: todo.txt");

        let windows = single(vec![Representation::new(types::FILE_URL, "C:\\Users\\me\\plan.docx")]);
        assert_eq!(windows.describe(), "File: plan.docx");
    }

    #[test]
    fn unreadable_file_reference_falls_back_to_plain_label() {
        let snapshot = single(vec![Representation::new(types::FILE_URL, vec![0xff, 0x00])]);
        assert_eq!(snapshot.describe(), "File");
    }

    #[test]
    fn image_uses_first_decodable_representation() {
        let snapshot = Snapshot::new(vec![
            ClipboardItem::new(vec![Representation::new(types::TIFF, vec![1, 2, 3])]),
            ClipboardItem::new(vec![Representation::new(types::PNG, png_bytes(16, 9))]),
        ]);
        assert_eq!(snapshot.describe(), "Image 16x9");
    }

    #[test]
    fn image_without_decodable_bytes_has_no_dimensions() {
        let snapshot = single(vec![
            Representation::new(types::PNG, vec![0, 1, 2, 3]),
            Representation::new(types::PLAIN_TEXT, "caption"),
        ]);
        assert_eq!(snapshot.describe(), "Image");
    }

    #[test]
    fn rich_text_reports_char_count_and_preview() {
        let text = "Grüße aus der Zwischenablage, mit genug Text für eine Kürzung";
        let snapshot = single(vec![
            Representation::new(types::RTF, "{\\rtf1 ...}"),
            Representation::new(types::PLAIN_TEXT, text),
        ]);
        let expected = format!(
            "Rich Text {} chars: {}",
            text.chars().count(),
            preview_string(text, 40)
        );
        assert_eq!(snapshot.describe(), expected);
        assert!(expected.ends_with("..."));
    }

    #[test]
    fn rich_text_without_plain_text() {
        let snapshot = single(vec![Representation::new(types::HTML, "<b>hi</b>")]);
        assert_eq!(snapshot.describe(), "Rich Text");
    }

    #[test]
    fn long_text_is_flattened_and_truncated_to_fifty_chars() {
        let text = format!("{}\n{}", "a".repeat(30), "b".repeat(29));
        assert_eq!(text.chars().count(), 60);

        let description = Snapshot::from_text(&text).describe();
        assert_eq!(description.chars().count(), 50);
        assert!(description.ends_with("..."));
        assert!(!description.contains('\n'));
        assert_eq!(&description[..32], &format!("{} b", "a".repeat(30))[..]);
    }

    #[test]
    fn short_text_is_kept_verbatim() {
        assert_eq!(Snapshot::from_text("hello").describe(), "hello");
    }

    #[test]
    fn binary_reports_distinct_types_and_size() {
        let snapshot = Snapshot::new(vec![
            ClipboardItem::new(vec![
                Representation::new("com.example.a", vec![0; 1024]),
                Representation::new("com.example.b", vec![0; 1024]),
            ]),
            ClipboardItem::new(vec![Representation::new("com.example.a", vec![0; 512])]),
        ]);
        assert_eq!(snapshot.describe(), "Binary: 2 types, 2 KB");
    }

    #[test]
    fn format_bytes_switches_units() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1023), "1023 B");
        assert_eq!(format_bytes(1536), "1 KB");
        assert_eq!(format_bytes(1024 * 1024), "1.0 MB");
        assert_eq!(format_bytes(5 * 1024 * 1024 + 512 * 1024), "5.5 MB");
    }

    #[test]
    fn short_preview_prefers_text() {
        let snapshot = Snapshot::from_text("line one\nline two");
        assert_eq!(snapshot.short_preview(40), "line one line two");

        let binary = single(vec![Representation::new("com.example.a", vec![1, 2])]);
        assert_eq!(binary.short_preview(40), "Binary: 1 types, 2 B");
    }
}
