use crate::config::{expand_keybind, Config};

use super::KeyCombo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HotkeyAction {
    Save,
    Paste,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub slot: u8,
    pub action: HotkeyAction,
    pub combo: KeyCombo,
}

/// 由配置展开的完整绑定表
///
/// 每次配置变化都整体重建；无法解析的绑定只产生警告，不影响其他绑定。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindingTable {
    pub bindings: Vec<Binding>,
    pub warnings: Vec<String>,
}

impl BindingTable {
    pub fn from_config(config: &Config) -> Self {
        let mut table = Self::default();

        for slot in config.slot_range() {
            let patterns = [
                (HotkeyAction::Save, &config.keybinds.save),
                (HotkeyAction::Paste, &config.keybinds.paste),
            ];

            for (action, pattern) in patterns {
                let expanded = expand_keybind(pattern, slot);
                let combo = match KeyCombo::parse(&expanded) {
                    Ok(combo) => combo,
                    Err(err) => {
                        table
                            .warnings
                            .push(format!("Could not parse keybind \"{}\": {}", expanded, err));
                        continue;
                    }
                };

                if let Some(existing) = table.bindings.iter().find(|b| b.combo == combo) {
                    table.warnings.push(format!(
                        "Keybind \"{}\" for slot {} {:?} is already bound to slot {} {:?}",
                        combo, slot, action, existing.slot, existing.action
                    ));
                    continue;
                }

                table.bindings.push(Binding { slot, action, combo });
            }
        }

        table
    }
}
