// Tests for the one-shot CLI commands against a temporary home directory
mod common;

use std::fs;

use clipslots::clipboard::{ClipboardBackend, PermissionStatus};
use clipslots::commands;
use clipslots::snapshot::Snapshot;

use common::{temp_paths, FakeClipboard, FakeKeys};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_then_paste_round_trips_through_clipboard() {
        let (_home, paths) = temp_paths();
        let clipboard = FakeClipboard::with_content(Snapshot::from_text("hello"));

        let saved = commands::save(&paths, clipboard.as_ref(), 1).expect("save failed");
        assert_eq!(saved, "Saved to slot 1: hello");

        clipboard.set_text("something else").expect("set text failed");
        let pasted = commands::paste(&paths, clipboard.as_ref(), 1).expect("paste failed");
        assert_eq!(pasted, "Slot 1 copied to clipboard: hello");
        assert_eq!(clipboard.content(), Some(Snapshot::from_text("hello")));
    }

    #[test]
    fn test_first_run_writes_default_config() {
        let (_home, paths) = temp_paths();
        let clipboard = FakeClipboard::with_content(Snapshot::from_text("x"));

        commands::save(&paths, clipboard.as_ref(), 2).expect("save failed");

        let content = fs::read_to_string(paths.config_file()).expect("default config should exist");
        assert!(content.contains("slots = 5"));
        assert!(content.contains("ctrl+option+{n}"));
    }

    #[test]
    fn test_out_of_range_slot_is_rejected_before_touching_storage() {
        let (_home, paths) = temp_paths();
        let clipboard = FakeClipboard::with_content(Snapshot::from_text("x"));

        let err = commands::save(&paths, clipboard.as_ref(), 6).expect_err("slot 6 is out of range");
        assert_eq!(err.to_string(), "Invalid slot number 6. Use 1-5.");
        let err = commands::paste(&paths, clipboard.as_ref(), 0).expect_err("slot 0 is out of range");
        assert_eq!(err.to_string(), "Invalid slot number 0. Use 1-5.");

        assert!(!paths.data_dir.exists());
    }

    #[test]
    fn test_slot_count_comes_from_config() {
        let (_home, paths) = temp_paths();
        fs::create_dir_all(&paths.config_dir).expect("create config dir failed");
        fs::write(paths.config_file(), "slots = 3\n").expect("write config failed");
        let clipboard = FakeClipboard::with_content(Snapshot::from_text("x"));

        let err = commands::save(&paths, clipboard.as_ref(), 4).expect_err("slot 4 is out of range");
        assert_eq!(err.to_string(), "Invalid slot number 4. Use 1-3.");

        let listed = commands::list(&paths).expect("list failed");
        assert_eq!(listed.lines().count(), 3);
    }

    #[test]
    fn test_save_reports_empty_clipboard_and_denied_permission() {
        let (_home, paths) = temp_paths();
        let clipboard = FakeClipboard::new();

        let err = commands::save(&paths, clipboard.as_ref(), 1).expect_err("clipboard is empty");
        assert_eq!(err.to_string(), "Clipboard is empty. Copy something first.");

        clipboard.set_permission(PermissionStatus::Denied);
        let err = commands::save(&paths, clipboard.as_ref(), 1).expect_err("permission denied");
        assert!(err.to_string().contains("permission"));
    }

    #[test]
    fn test_paste_of_empty_slot_explains_how_to_fill_it() {
        let (_home, paths) = temp_paths();
        let clipboard = FakeClipboard::with_content(Snapshot::from_text("untouched"));

        let err = commands::paste(&paths, clipboard.as_ref(), 2).expect_err("slot 2 is empty");
        assert_eq!(
            err.to_string(),
            "Slot 2 is empty. Save something first with 'clipslots save 2'."
        );
        assert_eq!(clipboard.mutations(), 0);
    }

    #[test]
    fn test_list_shows_previews_and_empty_slots() {
        let (_home, paths) = temp_paths();
        let long_text = "a".repeat(30) + &"b".repeat(30);
        let clipboard = FakeClipboard::with_content(Snapshot::from_text(&long_text));
        commands::save(&paths, clipboard.as_ref(), 2).expect("save failed");

        let listed = commands::list(&paths).expect("list failed");
        let lines: Vec<&str> = listed.lines().collect();

        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "Slot 1: (empty)");
        assert_eq!(
            lines[1],
            format!("Slot 2: {}{}...", "a".repeat(30), "b".repeat(17))
        );
        assert_eq!(lines[4], "Slot 5: (empty)");
    }

    #[test]
    fn test_clear_single_and_all_with_confirmation() {
        let (_home, paths) = temp_paths();
        let clipboard = FakeClipboard::with_content(Snapshot::from_text("data"));
        commands::save(&paths, clipboard.as_ref(), 1).expect("save failed");
        commands::save(&paths, clipboard.as_ref(), 2).expect("save failed");

        assert_eq!(
            commands::clear(&paths, Some(1), || false).expect("clear failed"),
            "Cleared slot 1"
        );
        assert_eq!(
            commands::clear(&paths, None, || false).expect("clear failed"),
            "Cancelled"
        );
        assert!(commands::list(&paths).expect("list failed").contains("Slot 2: data"));

        assert_eq!(
            commands::clear(&paths, None, || true).expect("clear failed"),
            "Cleared all slots"
        );
        assert!(!commands::list(&paths).expect("list failed").contains("data"));
    }

    #[test]
    fn test_status_reports_permissions_and_config_validity() {
        let (_home, paths) = temp_paths();
        let clipboard = FakeClipboard::new();
        let keys = FakeKeys::new(clipboard.clone(), false);
        fs::create_dir_all(&paths.config_dir).expect("create config dir failed");
        fs::write(paths.config_file(), "slots = 42\n").expect("write config failed");

        let status = commands::status(&paths, clipboard.as_ref(), keys.as_ref()).expect("status failed");

        assert!(status.starts_with("ClipSlots Status"));
        assert!(status.contains("Accessible:  No (hotkeys won't work)"));
        assert!(status.contains("Pasteboard:  Allowed"));
        assert!(status.contains("Slots:       5"));
        assert!(status.contains("invalid, using defaults"));
        assert!(status.contains("  Paste:     ctrl+{n}"));
    }
}
