use std::any::Any;
use std::fmt;
use std::sync::Arc;

use anyhow::Result;

use crate::events::{Event, EventBus, ListenerId};
use crate::plugin::{Plugin, PluginRegistry};
use crate::runtime::RuntimeHandle;
use crate::settings::Settings;

/// Type-erased platform object.
pub type NativeHandle = Arc<dyn Any + Send + Sync>;

/// Platform-native objects exposed to applications and plugins.
///
/// Not portable: what `host` and `renderer` contain depends on the host that
/// started the runtime (the desktop host stores an `Arc<winit::window::Window>`
/// and an `Arc<Mutex<Gpu>>`; the headless host stores nothing). Use only in
/// host-specific code paths.
#[derive(Clone, Default)]
pub struct NativeHandles {
    host: Option<NativeHandle>,
    renderer: Option<NativeHandle>,
}

impl NativeHandles {
    pub fn new(host: Option<NativeHandle>, renderer: Option<NativeHandle>) -> Self {
        Self { host, renderer }
    }

    pub fn host(&self) -> Option<&NativeHandle> {
        self.host.as_ref()
    }

    pub fn renderer(&self) -> Option<&NativeHandle> {
        self.renderer.as_ref()
    }

    pub fn host_as<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.host.clone()?.downcast::<T>().ok()
    }

    pub fn renderer_as<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.renderer.clone()?.downcast::<T>().ok()
    }
}

impl fmt::Debug for NativeHandles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeHandles")
            .field("host", &self.host.is_some())
            .field("renderer", &self.renderer.is_some())
            .finish()
    }
}

/// Runtime services shared with applications and plugins.
#[derive(Clone)]
pub struct RuntimeServices {
    pub(crate) handle: RuntimeHandle,
    pub(crate) settings: Arc<Settings>,
    pub(crate) native: NativeHandles,
    pub(crate) bus: Arc<EventBus>,
}

impl RuntimeServices {
    /// Cloneable, thread-safe handle; keep it to call `stop()` later.
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn native(&self) -> &NativeHandles {
        &self.native
    }

    pub fn bus(&self) -> Arc<EventBus> {
        Arc::clone(&self.bus)
    }

    pub fn subscribe<F>(&self, channel: impl Into<String>, listener: F) -> ListenerId
    where
        F: Fn(&Event) -> bool + Send + Sync + 'static,
    {
        self.bus.subscribe(channel, listener)
    }

    pub fn unsubscribe(&self, channel: &str, id: ListenerId) -> bool {
        self.bus.unsubscribe(channel, id)
    }

    pub fn publish(&self, event: &Event) -> bool {
        self.bus.publish(event)
    }
}

/// Context handed to `App::on_start`.
///
/// Dereferences to [`RuntimeServices`] and additionally allows plugin
/// registration, which initializes the plugin immediately.
pub struct RuntimeContext<'a> {
    services: &'a RuntimeServices,
    plugins: &'a mut PluginRegistry,
}

impl<'a> RuntimeContext<'a> {
    pub(crate) fn new(services: &'a RuntimeServices, plugins: &'a mut PluginRegistry) -> Self {
        Self { services, plugins }
    }

    /// Registers and initializes `plugin`. A name already registered is a no-op.
    pub fn use_plugin(&mut self, plugin: impl Plugin + 'static) -> Result<()> {
        self.plugins.register(Box::new(plugin));
        self.plugins.init_pending(self.services).map_err(anyhow::Error::from)
    }

    pub fn has_plugin(&self, name: &str) -> bool {
        self.plugins.contains(name)
    }
}

impl std::ops::Deref for RuntimeContext<'_> {
    type Target = RuntimeServices;

    fn deref(&self) -> &RuntimeServices {
        self.services
    }
}
