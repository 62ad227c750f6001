//! 全局快捷键
//!
//! # 设计思路
//!
//! 配置中的两条模板（保存 / 粘贴）按槽位展开成一张绑定表：
//! `组合键 -> (槽位, 动作)`。系统回调只携带一个 id，分发器查表后
//! 在单一处理函数里按动作类型执行，不为每个绑定创建闭包。
//!
//! # 实现思路
//!
//! | 子模块 | 职责 |
//! |------|------|
//! | `keybind` | `modifier+key` 文本解析为 [`KeyCombo`] |
//! | `bindings` | 由配置生成 [`BindingTable`] |
//! | `registrar` | [`HotkeyRegistrar`] trait 与 `global-hotkey` 实现 |
//! | `actions` | 保存 / 粘贴流程 [`SlotActions`] |
//! | `dispatcher` | [`HotkeyDispatcher`]：注册、重载、分发 |

mod actions;
mod bindings;
mod dispatcher;
mod keybind;
mod registrar;

pub use actions::{ActionTiming, HotkeyOutcome, SlotActions};
pub use bindings::{Binding, BindingTable, HotkeyAction};
pub use dispatcher::HotkeyDispatcher;
pub use keybind::{Key, KeyCombo, KeybindError, Modifier};
pub use registrar::{
    pump_native_events, prepare_native_app, GlobalHotkeyRegistrar, HotkeyError, HotkeyRegistrar,
};
