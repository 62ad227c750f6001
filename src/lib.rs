//! # ClipSlots — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │   main (clap)                  daemon (tokio 事件循环)     │
//! │   save / paste / list /        global-hotkey 回调          │
//! │   clear / status               notify 配置热重载           │
//! └───────┬──────────────────────────────┬───────────────────┘
//!         ↓                              ↓
//! ┌───────┴──────────┐         ┌─────────┴─────────────────┐
//! │  commands        │         │  hotkey                   │
//! │  一次性命令       │         │  绑定表 + 保存/粘贴协议     │
//! └───────┬──────────┘         └─────────┬─────────────────┘
//!         ↓                              ↓
//! ┌───────┴──────────────────────────────┴───────────────────┐
//! │  slots ── 目录树存储（原子替换 · 清单 · 旧版迁移）          │
//! │  clipboard ── ClipboardBackend / KeystrokeSynth           │
//! │  snapshot ── 条目与表示的纯值模型 + 人类可读描述             │
//! │  config / paths / error                                   │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `AppError`，所有命令的返回类型 |
//! | [`paths`] | 配置与数据目录布局 |
//! | [`config`] | TOML 配置加载、默认值与校验 |
//! | [`snapshot`] | 剪贴板快照模型与描述生成 |
//! | [`slots`] | 槽位存储、清单与旧版单文件迁移 |
//! | [`clipboard`] | 系统剪贴板与按键模拟的抽象及实现 |
//! | [`hotkey`] | 快捷键解析、注册、分发与保存/粘贴流程 |
//! | [`daemon`] | 常驻进程：快捷键、配置热重载、信号处理 |
//! | [`commands`] | 命令行子命令 |

pub mod error;
pub mod paths;
pub mod config;
pub mod snapshot;
pub mod slots;
pub mod clipboard;
pub mod hotkey;
pub mod daemon;
pub mod commands;
