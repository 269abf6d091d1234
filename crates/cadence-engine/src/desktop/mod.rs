//! Windowed host built on `winit` and `wgpu`.
//!
//! The tick loop runs on its own thread; rendering runs on the event-loop
//! thread, inside `RedrawRequested`, paced with `ControlFlow::WaitUntil`.
//! Window and GPU context are exposed as native handles:
//! `runtime.host_as::<winit::window::Window>()` and
//! `runtime.renderer_as::<Mutex<Gpu>>()`.

mod host;
mod pacing;

use std::sync::Mutex;

use anyhow::Context;
use winit::event_loop::EventLoop;

use crate::core::App;
use crate::device::GpuInit;
use crate::error::{Result, RuntimeError};
use crate::runtime::Runtime;
use crate::settings::Settings;

use host::{DesktopHost, Wake};

pub use pacing::FrameDeadline;

/// Runs `app` in a window with default settings until it stops.
pub fn run<A: App>(app: A) -> Result<()> {
    run_with(app, Settings::default(), GpuInit::default())
}

/// Runs `app` in a window; returns after the runtime has been disposed.
pub fn run_with<A: App>(app: A, settings: Settings, gpu_init: GpuInit) -> Result<()> {
    let event_loop = EventLoop::<Wake>::with_user_event()
        .build()
        .context("failed to create winit EventLoop")
        .map_err(RuntimeError::Host)?;

    let runtime = Runtime::with_settings(app, settings)?;
    let proxy = Mutex::new(event_loop.create_proxy());
    runtime.set_waker(move || {
        if let Ok(proxy) = proxy.lock() {
            // a closed loop has nothing left to wake
            let _ = proxy.send_event(Wake);
        }
    });

    let mut host = DesktopHost::new(runtime, gpu_init);
    event_loop
        .run_app(&mut host)
        .context("winit event loop terminated with error")
        .map_err(RuntimeError::Host)?;

    host.finish()
}
