use std::sync::{Arc, Mutex};
use std::time::Instant;

use anyhow::{Context, Result};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow};
use winit::window::{Fullscreen, Window, WindowId};

use crate::core::{App, NativeHandle, NativeHandles};
use crate::device::{Gpu, GpuInit};
use crate::error::RuntimeError;
use crate::input::platform::WinitTranslator;
use crate::runtime::{HostSetup, InitialResize, Runtime, RuntimeHandle};
use crate::schedule::NativeFramePacing;
use crate::settings::Settings;

use super::pacing::FrameDeadline;

/// User event posted by [`RuntimeHandle`] sends so the loop wakes up.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Wake;

/// Some window managers report a stale size until the window is focused once.
const STARTUP_RESIZE: InitialResize = if cfg!(target_os = "windows") {
    InitialResize::Immediate
} else {
    InitialResize::FirstFocus
};

struct Surface {
    window: Arc<Window>,
    gpu: Arc<Mutex<Gpu>>,
}

/// winit application handler driving one runtime and its window.
pub(crate) struct DesktopHost<A: App> {
    runtime: Option<Runtime<A>>,
    handle: RuntimeHandle,
    gpu_init: GpuInit,
    surface: Option<Surface>,
    deadline: Arc<FrameDeadline>,
    translator: WinitTranslator,
    error: Option<RuntimeError>,
}

impl<A: App> DesktopHost<A> {
    pub(crate) fn new(runtime: Runtime<A>, gpu_init: GpuInit) -> Self {
        Self {
            handle: runtime.handle(),
            runtime: Some(runtime),
            gpu_init,
            surface: None,
            deadline: Arc::new(FrameDeadline::default()),
            translator: WinitTranslator::default(),
            error: None,
        }
    }

    /// Error that ended the run, if any.
    pub(crate) fn finish(self) -> Result<(), RuntimeError> {
        self.error.map_or(Ok(()), Err)
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: RuntimeError) {
        log::error!("desktop host failed: {err}");
        self.error.get_or_insert(err);
        event_loop.exit();
    }

    fn open_surface(
        event_loop: &ActiveEventLoop,
        settings: &Settings,
        gpu_init: &GpuInit,
    ) -> Result<Surface> {
        let mut attrs = Window::default_attributes()
            .with_title(settings.name.clone())
            .with_inner_size(PhysicalSize::new(settings.width, settings.height));
        if settings.fullscreen {
            attrs = attrs.with_fullscreen(Some(Fullscreen::Borderless(None)));
        }

        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );
        let gpu = pollster::block_on(Gpu::new(Arc::clone(&window), gpu_init))
            .context("GPU initialization failed for window")?;

        Ok(Surface {
            window,
            gpu: Arc::new(Mutex::new(gpu)),
        })
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<(), RuntimeError> {
        let Some(runtime) = self.runtime.as_mut() else {
            return Ok(());
        };

        let surface = Self::open_surface(event_loop, runtime.settings(), &self.gpu_init)
            .map_err(RuntimeError::Host)?;
        let size = surface.window.inner_size();

        let host: NativeHandle = surface.window.clone();
        let renderer: NativeHandle = surface.gpu.clone();
        let setup = HostSetup {
            native: NativeHandles::new(Some(host), Some(renderer)),
            pacing: Arc::new(NativeFramePacing::new(self.deadline.clone())),
            surface: (size.width, size.height),
            initial_resize: STARTUP_RESIZE,
        };

        self.surface = Some(surface);
        runtime.start(setup)
    }

    fn resize_surface(&self, size: PhysicalSize<u32>) {
        if let Some(surface) = &self.surface {
            surface
                .gpu
                .lock()
                .unwrap_or_else(|p| p.into_inner())
                .resize(size.width, size.height);
        }
        self.handle.resize(size.width, size.height);
    }
}

impl<A: App> ApplicationHandler<Wake> for DesktopHost<A> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.surface.is_some() {
            return;
        }

        if let Err(err) = self.start(event_loop) {
            self.fail(event_loop, err);
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, _event: Wake) {
        // signals are drained in about_to_wait
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match &event {
            WindowEvent::CloseRequested => self.handle.close(),
            WindowEvent::Focused(true) => self.handle.focus_gained(),
            WindowEvent::Focused(false) => self.handle.focus_lost(),
            WindowEvent::Resized(size) => self.resize_surface(*size),
            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(size) = self.surface.as_ref().map(|s| s.window.inner_size()) {
                    self.resize_surface(size);
                }
            }
            WindowEvent::RedrawRequested => {
                if let Some(runtime) = &self.runtime {
                    runtime.render_frame();
                }
            }
            _ => {
                if let Some(input) = self.translator.translate(&event) {
                    self.handle.input(input);
                }
            }
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(runtime) = self.runtime.as_mut() else {
            event_loop.exit();
            return;
        };

        if !runtime.pump().is_live() {
            event_loop.exit();
            return;
        }

        if self.deadline.take_due(Instant::now()) {
            if let Some(surface) = &self.surface {
                surface.window.request_redraw();
            }
        }

        event_loop.set_control_flow(match self.deadline.next() {
            Some(at) => ControlFlow::WaitUntil(at),
            None => ControlFlow::Wait,
        });
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(runtime) = self.runtime.take() {
            if let Err(err) = runtime.dispose() {
                self.error.get_or_insert(err);
            }
        }

        // window and GPU go only after on_stop/on_dispose have run
        self.surface = None;
    }
}
