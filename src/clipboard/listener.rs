//! 剪贴板变化监听（无系统变化计数的平台）
//!
//! `clipboard-master` 在后台线程中回调每一次剪贴板变化，这里只负责累加计数。
//! 监听器意外退出或创建失败时按指数退避重启，避免计数永久停滞。

use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::Duration;

use clipboard_master::{CallbackResult, ClipboardHandler, Master};
use once_cell::sync::Lazy;

const MONITOR_RESTART_BASE_DELAY_MS: u64 = 100;
const MONITOR_RESTART_MAX_DELAY_MS: u64 = 5_000;

static CHANGE_COUNT: AtomicU64 = AtomicU64::new(0);

static MONITOR: Lazy<()> = Lazy::new(start_monitoring);

pub(crate) fn ensure_started() {
    Lazy::force(&MONITOR);
}

pub(crate) fn change_count() -> u64 {
    CHANGE_COUNT.load(Ordering::SeqCst)
}

fn compute_restart_backoff_ms(restart_attempt: u32) -> u64 {
    let exp = 1_u64 << restart_attempt.saturating_sub(1).min(6);
    MONITOR_RESTART_BASE_DELAY_MS
        .saturating_mul(exp)
        .min(MONITOR_RESTART_MAX_DELAY_MS)
}

struct Handler;

impl ClipboardHandler for Handler {
    fn on_clipboard_change(&mut self) -> CallbackResult {
        let count = CHANGE_COUNT.fetch_add(1, Ordering::SeqCst) + 1;
        log::trace!("📋 剪贴板变化 #{}", count);
        CallbackResult::Next
    }

    fn on_clipboard_error(&mut self, error: std::io::Error) -> CallbackResult {
        log::error!("剪贴板错误：{}", error);
        CallbackResult::Next
    }
}

fn start_monitoring() {
    let spawned = thread::Builder::new()
        .name("clipboard-listener".to_string())
        .spawn(|| {
            let mut restart_attempt: u32 = 0;
            loop {
                match Master::new(Handler) {
                    Ok(mut master) => {
                        restart_attempt = 0;
                        log::debug!("📋 剪贴板监听已启动");
                        let _ = master.run();
                        log::warn!("📋 剪贴板监听已退出，将尝试重启");
                    }
                    Err(err) => {
                        log::error!("📋 创建剪贴板监听失败: {}", err);
                    }
                }

                restart_attempt = restart_attempt.saturating_add(1);
                let backoff_ms = compute_restart_backoff_ms(restart_attempt);
                log::warn!("📋 剪贴板监听 {}ms 后重试（attempt={}）", backoff_ms, restart_attempt);
                thread::sleep(Duration::from_millis(backoff_ms));
            }
        });

    if let Err(err) = spawned {
        log::error!("📋 无法创建剪贴板监听线程: {}", err);
    }
}

#[cfg(test)]
mod tests {
    use super::compute_restart_backoff_ms;

    #[test]
    fn restart_backoff_grows_then_caps() {
        assert_eq!(compute_restart_backoff_ms(1), 100);
        assert_eq!(compute_restart_backoff_ms(2), 200);
        assert_eq!(compute_restart_backoff_ms(3), 400);
        assert_eq!(compute_restart_backoff_ms(7), 5_000);
        assert_eq!(compute_restart_backoff_ms(20), 5_000);
    }
}
