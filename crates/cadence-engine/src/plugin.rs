//! Plugin registry.
//!
//! Owned by one runtime instance; there is no process-wide registration.

use std::collections::HashMap;

use anyhow::Result;

use crate::core::RuntimeServices;
use crate::error::RuntimeError;

/// Extension loaded by the runtime around the application's lifetime.
pub trait Plugin: Send {
    /// Unique name; registration under an existing name is ignored.
    fn name(&self) -> &str;

    /// Called once, before the loops start (or immediately when registered from
    /// `App::on_start`). An error aborts the run.
    fn init(&mut self, services: &RuntimeServices) -> Result<()>;

    /// Called once when the runtime is disposed.
    fn dispose(&mut self);
}

struct Entry {
    plugin: Box<dyn Plugin>,
    initialized: bool,
}

#[derive(Default)]
pub struct PluginRegistry {
    entries: HashMap<String, Entry>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `plugin` under its name. Returns `false` for a duplicate name.
    pub fn register(&mut self, plugin: Box<dyn Plugin>) -> bool {
        let name = plugin.name().to_string();
        if self.entries.contains_key(&name) {
            log::debug!("plugin {name} already registered; ignoring duplicate");
            return false;
        }

        log::info!("plugin {name} registered");
        self.entries.insert(
            name,
            Entry {
                plugin,
                initialized: false,
            },
        );
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Initializes every plugin not initialized yet.
    ///
    /// A plugin whose `init` fails is dropped from the registry, so it is
    /// never initialized again and never disposed.
    pub fn init_pending(&mut self, services: &RuntimeServices) -> Result<(), RuntimeError> {
        let pending: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| !entry.initialized)
            .map(|(name, _)| name.clone())
            .collect();

        for name in pending {
            let Some(entry) = self.entries.get_mut(&name) else {
                continue;
            };
            match entry.plugin.init(services) {
                Ok(()) => {
                    entry.initialized = true;
                    log::info!("plugin {name} loaded");
                }
                Err(source) => {
                    self.entries.remove(&name);
                    log::error!("failed to initialize plugin {name}: {source:#}");
                    return Err(RuntimeError::Plugin { name, source });
                }
            }
        }
        Ok(())
    }

    /// Disposes and forgets every plugin, in no particular order.
    pub fn dispose_all(&mut self) {
        for (name, mut entry) in self.entries.drain() {
            entry.plugin.dispose();
            log::info!("plugin {name} released");
        }
    }
}
