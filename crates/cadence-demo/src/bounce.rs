use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use anyhow::Result;
use cadence_engine::device::{FrameOutcome, Gpu};
use cadence_engine::events::{self, Event};
use cadence_engine::input::{Action, Key};
use cadence_engine::{
    App, Plugin, RuntimeContext, RuntimeHandle, RuntimeServices, Settings, SyncHandle,
};

/// State shared by the tick and render loops.
#[derive(Debug)]
pub struct Bounce {
    pub value: f32,
    velocity: f32,
}

impl Default for Bounce {
    fn default() -> Self {
        Self {
            value: 0.0,
            velocity: 0.5,
        }
    }
}

impl Bounce {
    fn advance(&mut self, dt: f32) {
        self.value += self.velocity * dt;
        if self.value >= 1.0 {
            self.value = 2.0 - self.value;
            self.velocity = -self.velocity;
        } else if self.value <= 0.0 {
            self.value = -self.value;
            self.velocity = -self.velocity;
        }
    }
}

#[derive(Default)]
pub struct BounceApp {
    tick_dt: f32,
    log_every: u64,
    handle: OnceLock<RuntimeHandle>,
    gpu: OnceLock<Arc<Mutex<Gpu>>>,
    frames: AtomicU64,
}

impl App for BounceApp {
    type Shared = Bounce;

    fn on_create(&mut self, settings: &mut Settings) -> Result<()> {
        settings.name = format!("{} (bounce)", settings.name);
        self.tick_dt = 1.0 / settings.tick_rate.max(1) as f32;
        self.log_every = u64::from(settings.frame_rate.max(1));
        Ok(())
    }

    fn on_start(&self, ctx: &mut RuntimeContext<'_>) -> Result<()> {
        let handle = ctx.handle();
        let _ = self.handle.set(handle.clone());

        if let Some(gpu) = ctx.native().renderer_as::<Mutex<Gpu>>() {
            let _ = self.gpu.set(gpu);
        }

        ctx.subscribe(events::KEY, move |event| match event {
            Event::Key(key) if key.key == Key::Escape && key.action == Action::Down => {
                handle.stop();
                true
            }
            _ => false,
        });

        ctx.use_plugin(ResizeLog::default())
    }

    fn on_resize(&self, width: u32, height: u32) {
        log::debug!("surface is now {width}x{height}");
    }

    fn on_render(&self, _elapsed: Duration, sync: &SyncHandle<Bounce>) {
        let value = sync.lock().value;
        let frame = self.frames.fetch_add(1, Ordering::Relaxed);

        let Some(gpu) = self.gpu.get() else {
            if frame % self.log_every.max(1) == 0 {
                log::info!("frame {frame}: value {value:.3}");
            }
            return;
        };

        let color = wgpu::Color {
            r: f64::from(value),
            g: 0.2,
            b: f64::from(1.0 - value),
            a: 1.0,
        };
        let outcome = gpu.lock().unwrap_or_else(|p| p.into_inner()).clear(color);
        if outcome == FrameOutcome::Fatal {
            if let Some(handle) = self.handle.get() {
                handle.stop();
            }
        }
    }

    fn on_tick(&self, _elapsed: Duration, sync: &SyncHandle<Bounce>) {
        sync.lock().advance(self.tick_dt);
    }

    fn on_pause(&self) {
        log::info!("paused");
    }

    fn on_resume(&self) {
        log::info!("resumed");
    }

    fn on_stop(&self) {
        log::info!("rendered {} frames", self.frames.load(Ordering::Relaxed));
    }
}

/// Logs every resize seen on the bus.
#[derive(Default)]
struct ResizeLog {
    seen: Arc<AtomicU64>,
}

impl Plugin for ResizeLog {
    fn name(&self) -> &str {
        "resize-log"
    }

    fn init(&mut self, services: &RuntimeServices) -> Result<()> {
        let seen = Arc::clone(&self.seen);
        services.subscribe(events::RESIZE, move |event| {
            if let Event::Resize(size) = event {
                seen.fetch_add(1, Ordering::Relaxed);
                log::info!("resize to {}x{}", size.width, size.height);
            }
            false
        });
        Ok(())
    }

    fn dispose(&mut self) {
        log::debug!("resize-log saw {} resizes", self.seen.load(Ordering::Relaxed));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounce_reflects_at_edges() {
        let mut b = Bounce::default();
        b.advance(2.5);
        assert!((b.value - 0.75).abs() < 1e-6);
        assert!(b.velocity < 0.0);

        b.advance(2.0);
        assert!((b.value - 0.25).abs() < 1e-6);
        assert!(b.velocity > 0.0);
    }
}
