use std::collections::HashMap;

use crate::config::{Config, ConfigError};

use super::{Binding, BindingTable, HotkeyAction, HotkeyOutcome, HotkeyRegistrar, SlotActions};

/// 快捷键分发器
///
/// 持有注册表与当前绑定，只在事件循环所在的任务里使用。
/// 绑定表在注册 / 重载时整体重建，从不增量修改。
pub struct HotkeyDispatcher<R> {
    registrar: R,
    actions: SlotActions,
    config: Config,
    active: HashMap<u32, Binding>,
}

impl<R: HotkeyRegistrar> HotkeyDispatcher<R> {
    pub fn new(registrar: R, actions: SlotActions, config: Config) -> Self {
        Self {
            registrar,
            actions,
            config,
            active: HashMap::new(),
        }
    }

    /// 注销全部旧绑定后按当前配置重新注册，返回成功注册的数量
    pub fn register_hotkeys(&mut self) -> usize {
        self.unregister_all();

        let table = BindingTable::from_config(&self.config);
        for warning in &table.warnings {
            log::warn!("⚠️ {}", warning);
        }

        for binding in table.bindings {
            match self.registrar.register(&binding.combo) {
                Ok(id) => {
                    log::debug!("⌨️ {} -> 槽位 {} {:?}", binding.combo, binding.slot, binding.action);
                    self.active.insert(id, binding);
                }
                Err(err) => log::warn!("⚠️ {}", err),
            }
        }

        log::info!(
            "⌨️ 已注册 {} 个快捷键（{} 个槽位）",
            self.active.len(),
            self.config.slots
        );
        self.active.len()
    }

    /// 应用新配置；校验失败时保留当前绑定并返回错误
    pub fn reload(&mut self, config: Config) -> Result<usize, ConfigError> {
        config.validate()?;

        self.actions.store_mut().set_slot_count(config.slots);
        self.config = config;
        Ok(self.register_hotkeys())
    }

    /// 执行 id 对应的动作；未知 id 返回 `None`
    pub async fn dispatch(&self, id: u32) -> Option<HotkeyOutcome> {
        let binding = self.active.get(&id)?;
        let outcome = match binding.action {
            HotkeyAction::Save => self.actions.save(binding.slot).await,
            HotkeyAction::Paste => self.actions.paste(binding.slot).await,
        };
        Some(outcome)
    }

    pub fn unregister_all(&mut self) {
        self.registrar.unregister_all();
        self.active.clear();
    }

    /// 当前生效的绑定，按槽位与动作排序
    pub fn bindings(&self) -> Vec<&Binding> {
        let mut bindings: Vec<&Binding> = self.active.values().collect();
        bindings.sort_by_key(|b| (b.slot, b.action == HotkeyAction::Paste));
        bindings
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn actions(&self) -> &SlotActions {
        &self.actions
    }

    pub fn registrar(&self) -> &R {
        &self.registrar
    }
}
