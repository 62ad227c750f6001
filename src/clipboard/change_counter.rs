//! 各平台的剪贴板变化计数

#[cfg(target_os = "macos")]
pub(crate) fn current() -> u64 {
    use cocoa::appkit::NSPasteboard;
    use cocoa::base::nil;

    unsafe {
        let pasteboard = NSPasteboard::generalPasteboard(nil);
        pasteboard.changeCount() as u64
    }
}

#[cfg(target_os = "windows")]
pub(crate) fn current() -> u64 {
    use windows::Win32::System::DataExchange::GetClipboardSequenceNumber;

    unsafe { GetClipboardSequenceNumber() as u64 }
}

/// 没有系统级计数的平台：由后台监听线程累加
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
pub(crate) fn current() -> u64 {
    super::listener::ensure_started();
    super::listener::change_count()
}
