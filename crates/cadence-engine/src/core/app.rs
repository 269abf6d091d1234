use std::time::Duration;

use anyhow::Result;

use crate::settings::Settings;
use crate::sync::SyncHandle;

use super::ctx::RuntimeContext;

/// Application contract implemented by higher layers.
///
/// `on_tick` and `on_render` run concurrently on different threads, which is
/// why every callback after `on_create` takes `&self`. State shared by the two
/// loops belongs in `Shared` and is reached through the [`SyncHandle`] passed
/// to both; anything else needs its own interior mutability.
///
/// Callback order for one run:
/// `on_create` -> `on_start` -> `on_resume` -> (`on_tick`/`on_render`/`on_resize`
/// ... `on_pause` -> `on_resume` ...)* -> `on_pause` -> `on_stop` -> `on_dispose`.
pub trait App: Send + Sync + 'static {
    /// State guarded by the sync handle. Created with `Default` when the loops
    /// first start.
    type Shared: Default + Send + 'static;

    /// Called before any platform resource exists. Last chance to change settings.
    fn on_create(&mut self, settings: &mut Settings) -> Result<()> {
        let _ = settings;
        Ok(())
    }

    /// Called once platform resources (window, GPU context) are available and
    /// plugins are initialized, before any loop runs.
    fn on_start(&self, ctx: &mut RuntimeContext<'_>) -> Result<()> {
        let _ = ctx;
        Ok(())
    }

    /// Drawable area changed size, in physical pixels.
    fn on_resize(&self, width: u32, height: u32) {
        let _ = (width, height);
    }

    /// Called after `on_start` and whenever the runtime regains focus.
    fn on_resume(&self) {}

    /// Presentation callback, at the configured frame rate.
    fn on_render(&self, elapsed: Duration, sync: &SyncHandle<Self::Shared>);

    /// Logic callback, at the configured tick rate.
    fn on_tick(&self, elapsed: Duration, sync: &SyncHandle<Self::Shared>);

    /// Focus lost or shutting down. No tick/render runs until the next `on_resume`.
    fn on_pause(&self) {}

    /// Runtime is ending; both loops have already exited.
    fn on_stop(&self) {}

    /// Final cleanup.
    fn on_dispose(&self) -> Result<()> {
        Ok(())
    }
}
