//! 后台守护进程
//!
//! # 设计思路
//!
//! 分发器只存在于事件循环所在的任务中，从不跨线程共享。
//! 其他线程（快捷键接收、配置文件监听、信号）都只向同一个通道发送消息，
//! 因此快捷键动作按到达顺序逐个执行，绑定表也只有一个写者。
//!
//! # 实现思路
//!
//! ```text
//! global-hotkey 接收线程 ──┐
//! notify 配置监听 ─────────┼──> mpsc ──> 事件循环（block_on，主线程）
//! Ctrl-C / SIGTERM ────────┘              ├─ Hotkey(id)   -> dispatcher.dispatch
//!                                          ├─ ConfigChanged -> 去抖后 reload
//!                                          └─ Shutdown     -> 注销快捷键、停止监听
//! ```
//!
//! 事件循环同时定时处理原生消息，macOS / Windows 的快捷键回调依赖它触发。

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use global_hotkey::{GlobalHotKeyEvent, HotKeyState};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio::time::Instant;

use crate::clipboard::{EnigoKeys, KeystrokeSynth, NativeClipboard};
use crate::config::Config;
use crate::error::AppError;
use crate::hotkey::{
    pump_native_events, prepare_native_app, ActionTiming, GlobalHotkeyRegistrar,
    HotkeyDispatcher, HotkeyRegistrar, SlotActions,
};
use crate::paths::AppPaths;
use crate::slots::SlotStore;

const NATIVE_PUMP_INTERVAL: Duration = Duration::from_millis(20);
const CONFIG_RELOAD_DEBOUNCE: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DaemonEvent {
    Hotkey(u32),
    ConfigChanged,
    Shutdown(&'static str),
}

/// 启动守护进程并阻塞直到收到退出信号
pub fn run(paths: AppPaths) -> Result<(), AppError> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run_event_loop(paths))
}

async fn run_event_loop(paths: AppPaths) -> Result<(), AppError> {
    let config_path = paths.config_file();
    let config = Config::load_or_default(&config_path);

    log::info!(
        "ClipSlots daemon starting at {}",
        chrono::Local::now().to_rfc3339()
    );
    log::info!("Config loaded: {} slots", config.slots);
    log::info!("Save keybind: {}", config.keybinds.save);
    log::info!("Paste keybind: {}", config.keybinds.paste);

    // 数据目录无法创建是唯一致命的启动错误
    paths.ensure_data_dirs()?;
    let store = SlotStore::open(&paths, config.slots)?;

    let keys = Arc::new(EnigoKeys::new());
    if !keys.is_trusted() {
        log::warn!("Accessibility permission not granted. Hotkey save/paste will not work without it.");
        log::warn!("Grant access in System Settings > Privacy & Security > Accessibility");
    }
    let clipboard = Arc::new(NativeClipboard::new());

    prepare_native_app();
    let registrar = GlobalHotkeyRegistrar::new()?;
    let actions = SlotActions::new(store, clipboard, keys, ActionTiming::default());
    let mut dispatcher = HotkeyDispatcher::new(registrar, actions, config);
    dispatcher.register_hotkeys();

    let (tx, mut rx) = mpsc::unbounded_channel();
    spawn_hotkey_forwarder(tx.clone());
    spawn_signal_listener(tx.clone());
    let watcher = match watch_config(&paths, tx) {
        Ok(watcher) => Some(watcher),
        Err(err) => {
            log::warn!("⚠️ 无法监听配置文件，修改后需重启守护进程: {}", err);
            None
        }
    };

    log::info!("Daemon ready. Listening for hotkeys...");

    let mut native_pump = tokio::time::interval(NATIVE_PUMP_INTERVAL);
    let reload_timer = tokio::time::sleep(Duration::ZERO);
    tokio::pin!(reload_timer);
    let mut reload_pending = false;

    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Some(DaemonEvent::Hotkey(id)) => {
                    if dispatcher.dispatch(id).await.is_none() {
                        log::debug!("忽略未绑定的快捷键 id={}", id);
                    }
                }
                Some(DaemonEvent::ConfigChanged) => {
                    reload_pending = true;
                    reload_timer.as_mut().reset(Instant::now() + CONFIG_RELOAD_DEBOUNCE);
                }
                Some(DaemonEvent::Shutdown(reason)) => {
                    log::info!("Received {}, shutting down...", reason);
                    break;
                }
                None => break,
            },
            _ = &mut reload_timer, if reload_pending => {
                reload_pending = false;
                reload_config(&mut dispatcher, &config_path);
            }
            _ = native_pump.tick() => pump_native_events(),
        }
    }

    dispatcher.unregister_all();
    dispatcher.actions().finish_pending_restore();
    drop(watcher);
    log::info!("Daemon stopped");
    Ok(())
}

/// 重新读取配置；读取或校验失败时保留当前绑定
pub fn reload_config<R: HotkeyRegistrar>(dispatcher: &mut HotkeyDispatcher<R>, path: &Path) {
    let config = match Config::try_load(path) {
        Ok(config) => config,
        Err(err) => {
            log::warn!("⚠️ 配置无效，保留当前快捷键: {}", err);
            return;
        }
    };

    if &config == dispatcher.config() {
        log::debug!("配置内容未变化，跳过重载");
        return;
    }

    match dispatcher.reload(config) {
        Ok(count) => log::info!("🔄 配置已重载，{} 个快捷键生效", count),
        Err(err) => log::warn!("⚠️ 配置无效，保留当前快捷键: {}", err),
    }
}

fn spawn_hotkey_forwarder(tx: UnboundedSender<DaemonEvent>) {
    let spawned = thread::Builder::new()
        .name("hotkey-forwarder".to_string())
        .spawn(move || {
            let receiver = GlobalHotKeyEvent::receiver();
            while let Ok(event) = receiver.recv() {
                if event.state != HotKeyState::Pressed {
                    continue;
                }
                if tx.send(DaemonEvent::Hotkey(event.id)).is_err() {
                    break;
                }
            }
        });

    if let Err(err) = spawned {
        log::error!("无法创建快捷键转发线程: {}", err);
    }
}

fn spawn_signal_listener(tx: UnboundedSender<DaemonEvent>) {
    tokio::spawn(async move {
        let reason = wait_for_shutdown_signal().await;
        let _ = tx.send(DaemonEvent::Shutdown(reason));
    });
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() -> &'static str {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(sigterm) => sigterm,
        Err(err) => {
            log::warn!("无法监听 SIGTERM: {}", err);
            let _ = tokio::signal::ctrl_c().await;
            return "SIGINT";
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => "SIGINT",
        _ = sigterm.recv() => "SIGTERM",
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() -> &'static str {
    let _ = tokio::signal::ctrl_c().await;
    "Ctrl-C"
}

/// 监听配置目录（编辑器常以“写临时文件再重命名”的方式保存）
fn watch_config(
    paths: &AppPaths,
    tx: UnboundedSender<DaemonEvent>,
) -> notify::Result<RecommendedWatcher> {
    std::fs::create_dir_all(&paths.config_dir)?;
    let config_file = paths.config_file();

    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        match res {
            Ok(event) if is_config_change(&event, &config_file) => {
                let _ = tx.send(DaemonEvent::ConfigChanged);
            }
            Ok(_) => {}
            Err(err) => log::warn!("配置监听错误: {}", err),
        }
    })?;

    watcher.watch(&paths.config_dir, RecursiveMode::NonRecursive)?;
    log::debug!("正在监听配置目录: {}", paths.config_dir.display());
    Ok(watcher)
}

fn is_config_change(event: &notify::Event, config_file: &Path) -> bool {
    let file_name = config_file.file_name();
    matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_))
        && event
            .paths
            .iter()
            .any(|path: &PathBuf| path.file_name() == file_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, ModifyKind, RemoveKind};

    fn event(kind: EventKind, path: &str) -> notify::Event {
        notify::Event::new(kind).add_path(PathBuf::from(path))
    }

    #[test]
    fn only_config_file_writes_trigger_reload() {
        let config = Path::new("/home/me/.config/clipslots/config.toml");

        assert!(is_config_change(
            &event(EventKind::Modify(ModifyKind::Any), "/home/me/.config/clipslots/config.toml"),
            config
        ));
        assert!(is_config_change(
            &event(EventKind::Create(CreateKind::File), "/home/me/.config/clipslots/config.toml"),
            config
        ));
        assert!(!is_config_change(
            &event(EventKind::Modify(ModifyKind::Any), "/home/me/.config/clipslots/config.toml.swp"),
            config
        ));
        assert!(!is_config_change(
            &event(EventKind::Remove(RemoveKind::File), "/home/me/.config/clipslots/config.toml"),
            config
        ));
    }
}
