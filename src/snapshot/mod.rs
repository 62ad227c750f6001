//! 剪贴板快照模型
//!
//! # 设计思路
//!
//! 一次剪贴板状态 = 有序的条目（item）序列，每个条目持有若干 `(类型, 字节)` 表示。
//! 快照是纯值：采集完成后与系统剪贴板、与任何槽位都不再关联。
//!
//! # 实现思路
//!
//! - 类型标识是后端定义的不透明字符串，本模块只在 `classify` 中做粗分类，
//!   供 `describe` 生成列表里看到的人类可读描述。
//! - 构造函数负责维护不变量：同一条目内类型唯一、空条目直接丢弃。
//! - 无 I/O，全部逻辑可直接单元测试。

mod describe;

pub use describe::format_bytes;

/// 常用类型标识（与 macOS UTI 命名保持一致，迁移与系统后端都使用这些值）
pub mod types {
    pub const PLAIN_TEXT: &str = "public.utf8-plain-text";
    pub const HTML: &str = "public.html";
    pub const RTF: &str = "public.rtf";
    pub const PNG: &str = "public.png";
    pub const TIFF: &str = "public.tiff";
    pub const FILE_URL: &str = "public.file-url";
}

/// 类型标识的粗分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    FileReference,
    Image,
    RichText,
    PlainText,
    Other,
}

/// 按类型标识判断表示的语义类别
///
/// 同时识别 UTI、MIME 以及 X11 / Windows 常见格式名，MIME 参数（`;charset=...`）会被忽略。
pub fn classify(type_id: &str) -> TypeKind {
    let lowered = type_id.trim().to_ascii_lowercase();
    let base = lowered.split(';').next().unwrap_or_default().trim();

    match base {
        "public.file-url"
        | "nsfilenamespboardtype"
        | "text/uri-list"
        | "x-special/gnome-copied-files"
        | "cf_hdrop" => TypeKind::FileReference,
        "public.png" | "public.tiff" | "public.jpeg" | "public.heic" | "com.compuserve.gif"
        | "com.microsoft.bmp" | "nstiffpboardtype" | "cf_dib" | "cf_bitmap" => TypeKind::Image,
        "public.rtf" | "public.rtfd" | "com.apple.flat-rtfd" | "public.html" | "nsrtfpboardtype"
        | "text/html" | "text/rtf" | "application/rtf" | "html format" | "rich text format" => {
            TypeKind::RichText
        }
        "public.utf8-plain-text" | "public.plain-text" | "nsstringpboardtype" | "text/plain"
        | "utf8_string" | "string" => TypeKind::PlainText,
        other if other.starts_with("image/") => TypeKind::Image,
        _ => TypeKind::Other,
    }
}

/// 一个条目的一种表示：类型标识 + 原样字节
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Representation {
    pub type_id: String,
    pub bytes: Vec<u8>,
}

impl Representation {
    pub fn new(type_id: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            type_id: type_id.into(),
            bytes: bytes.into(),
        }
    }

    pub fn kind(&self) -> TypeKind {
        classify(&self.type_id)
    }

    /// 按 UTF-8 解码为非空文本；仅对纯文本类型生效
    pub fn as_text(&self) -> Option<&str> {
        if self.kind() != TypeKind::PlainText {
            return None;
        }
        std::str::from_utf8(&self.bytes)
            .ok()
            .filter(|text| !text.is_empty())
    }
}

/// 剪贴板中的一个条目
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClipboardItem {
    representations: Vec<Representation>,
}

impl ClipboardItem {
    /// 创建条目；重复的类型标识只保留第一次出现的表示
    pub fn new(representations: Vec<Representation>) -> Self {
        let mut item = Self::default();
        for rep in representations {
            item.push(rep);
        }
        item
    }

    /// 追加表示，类型已存在时忽略
    pub fn push(&mut self, rep: Representation) -> bool {
        if self.get(&rep.type_id).is_some() {
            log::debug!("条目内已存在类型 {}，忽略重复表示", rep.type_id);
            return false;
        }
        self.representations.push(rep);
        true
    }

    pub fn get(&self, type_id: &str) -> Option<&Representation> {
        self.representations.iter().find(|rep| rep.type_id == type_id)
    }

    pub fn representations(&self) -> &[Representation] {
        &self.representations
    }

    pub fn is_empty(&self) -> bool {
        self.representations.is_empty()
    }

    pub fn has_kind(&self, kind: TypeKind) -> bool {
        self.representations.iter().any(|rep| rep.kind() == kind)
    }

    pub fn total_bytes(&self) -> u64 {
        self.representations
            .iter()
            .map(|rep| rep.bytes.len() as u64)
            .sum()
    }
}

/// 一次完整的剪贴板快照
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Snapshot {
    items: Vec<ClipboardItem>,
}

impl Snapshot {
    /// 创建快照，没有任何表示的条目会被丢弃
    pub fn new(items: Vec<ClipboardItem>) -> Self {
        Self {
            items: items.into_iter().filter(|item| !item.is_empty()).collect(),
        }
    }

    /// 单条目、单纯文本表示的快照
    pub fn from_text(text: &str) -> Self {
        Self::new(vec![ClipboardItem::new(vec![Representation::new(
            types::PLAIN_TEXT,
            text.as_bytes(),
        )])])
    }

    pub fn items(&self) -> &[ClipboardItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<ClipboardItem> {
        self.items
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// 没有任何条目持有表示时视为“无内容”
    pub fn is_empty(&self) -> bool {
        self.items.iter().all(ClipboardItem::is_empty)
    }

    pub fn representations(&self) -> impl Iterator<Item = &Representation> {
        self.items.iter().flat_map(|item| item.representations.iter())
    }

    pub fn total_bytes(&self) -> u64 {
        self.items.iter().map(ClipboardItem::total_bytes).sum()
    }

    /// 去重并排序后的类型标识列表
    pub fn type_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .representations()
            .map(|rep| rep.type_id.clone())
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }

    /// 第一个可解码的纯文本表示（按条目顺序、条目内表示顺序）
    pub fn text_preview(&self) -> Option<&str> {
        self.representations().find_map(Representation::as_text)
    }
}
