use std::any::Any;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::core::{App, NativeHandle, NativeHandles, RuntimeContext, RuntimeServices};
use crate::error::{Result, RuntimeError};
use crate::events::{Event, EventBus, ListenerId};
use crate::input::{InputEvent, InputFilter, ResizeEvent};
use crate::lifecycle::{Lifecycle, LifecycleState, Transition};
use crate::plugin::{Plugin, PluginRegistry};
use crate::schedule::{Gate, Pacing, RenderLoop, ThreadPacing, TickLoop};
use crate::settings::Settings;
use crate::sync::SyncHandle;

use super::handle::{RuntimeHandle, Signal};

/// When the host's initial surface size reaches `App::on_resize`.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum InitialResize {
    /// Right after the first `on_resume`.
    #[default]
    Immediate,
    /// Once, on the first focus gain or the first resume after a pause,
    /// whichever comes first. For window systems that report a stale size
    /// until the window has been focused.
    FirstFocus,
    /// The host sends its own resize signals.
    Never,
}

/// What a host provides when it starts a runtime.
pub struct HostSetup {
    pub native: NativeHandles,
    pub pacing: Arc<dyn Pacing>,
    /// Current drawable size in physical pixels.
    pub surface: (u32, u32),
    pub initial_resize: InitialResize,
}

impl HostSetup {
    /// Timer pacing, no native handles, surface sized from `settings`.
    pub fn headless(settings: &Settings) -> Self {
        Self {
            native: NativeHandles::default(),
            pacing: Arc::new(ThreadPacing),
            surface: (settings.width, settings.height),
            initial_resize: InitialResize::Immediate,
        }
    }
}

struct Loops<S> {
    sync: SyncHandle<S>,
    tick: Option<TickLoop>,
    render: Option<RenderLoop>,
}

/// One application run.
///
/// The owning thread drives the lifecycle (`start`, `pump`/`wait`, `stop`,
/// `dispose`); every other thread talks to it through a [`RuntimeHandle`].
pub struct Runtime<A: App> {
    app: Arc<A>,
    lifecycle: Lifecycle,
    services: RuntimeServices,
    plugins: PluginRegistry,
    signals: Receiver<Signal>,
    gate: Arc<Gate>,
    loops: Option<Loops<A::Shared>>,
    input: InputFilter,
    surface: (u32, u32),
    deferred_resize: bool,
}

impl<A: App> Runtime<A> {
    /// Creates a runtime with default settings.
    pub fn create(app: A) -> Result<Self> {
        Self::with_settings(app, Settings::default())
    }

    /// Runs `App::on_create` (which may still edit `settings`) and validates
    /// the result.
    pub fn with_settings(mut app: A, mut settings: Settings) -> Result<Self> {
        app.on_create(&mut settings).map_err(RuntimeError::Create)?;
        settings.validate().map_err(RuntimeError::InvalidSettings)?;

        log::info!(
            "creating runtime for {:?} (tick {} Hz, frame {} Hz)",
            settings.name,
            settings.tick_rate,
            settings.frame_rate
        );

        let (tx, signals) = mpsc::channel();
        let input = InputFilter::from_settings(&settings);
        let surface = (settings.width, settings.height);

        Ok(Self {
            app: Arc::new(app),
            lifecycle: Lifecycle::new(),
            services: RuntimeServices {
                handle: RuntimeHandle::new(tx),
                settings: Arc::new(settings),
                native: NativeHandles::default(),
                bus: Arc::new(EventBus::new()),
            },
            plugins: PluginRegistry::new(),
            signals,
            gate: Arc::new(Gate::new()),
            loops: None,
            input,
            surface,
            deferred_resize: false,
        })
    }

    pub fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    pub fn settings(&self) -> &Settings {
        self.services.settings()
    }

    pub fn handle(&self) -> RuntimeHandle {
        self.services.handle()
    }

    pub fn services(&self) -> &RuntimeServices {
        &self.services
    }

    pub fn app(&self) -> &A {
        &self.app
    }

    /// Installs the callback run after every [`RuntimeHandle::send`], so a
    /// host blocked in its own event loop notices new signals.
    pub fn set_waker<F>(&self, waker: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.services.handle.set_waker(Some(Arc::new(waker)));
    }

    /// Host-native object (e.g. the window). Not portable.
    pub fn host(&self) -> Option<&NativeHandle> {
        self.services.native.host()
    }

    /// Renderer-native object (e.g. the GPU context). Not portable.
    pub fn renderer(&self) -> Option<&NativeHandle> {
        self.services.native.renderer()
    }

    pub fn host_as<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.services.native.host_as()
    }

    pub fn renderer_as<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.services.native.renderer_as()
    }

    pub fn subscribe<F>(&self, channel: impl Into<String>, listener: F) -> ListenerId
    where
        F: Fn(&Event) -> bool + Send + Sync + 'static,
    {
        self.services.subscribe(channel, listener)
    }

    pub fn unsubscribe(&self, channel: &str, id: ListenerId) -> bool {
        self.services.unsubscribe(channel, id)
    }

    pub fn publish(&self, event: &Event) -> bool {
        self.services.publish(event)
    }

    /// Registers `plugin`. Before start it is initialized during start; while
    /// live it is initialized now, and a failed `init` stops the runtime.
    /// Returns `Ok(false)` for a duplicate name or a runtime that already
    /// stopped.
    pub fn register_plugin(&mut self, plugin: impl Plugin + 'static) -> Result<bool> {
        let state = self.state();
        if state.is_terminal() {
            log::warn!("plugin {} registered after the runtime {state}; ignoring", plugin.name());
            return Ok(false);
        }

        if !self.plugins.register(Box::new(plugin)) {
            return Ok(false);
        }
        if state == LifecycleState::Created {
            return Ok(true);
        }
        if let Err(err) = self.plugins.init_pending(&self.services) {
            if self.state().is_live() {
                log::error!("stopping runtime after plugin failure");
                self.stop();
            }
            return Err(err);
        }
        Ok(true)
    }

    pub fn has_plugin(&self, name: &str) -> bool {
        self.plugins.contains(name)
    }

    /// `Created -> Started -> Running`.
    ///
    /// Initializes pending plugins, runs `on_start`, spawns both loops and
    /// resumes. Any error leaves the runtime short of `Running` with no loop
    /// admitted to run.
    pub fn start(&mut self, setup: HostSetup) -> Result<()> {
        if !self.lifecycle.can(Transition::Start) {
            log::warn!("start ignored: runtime is {}", self.state());
            return Ok(());
        }

        self.services.native = setup.native;
        if setup.surface.0 > 0 && setup.surface.1 > 0 {
            self.surface = setup.surface;
        }
        self.transition(Transition::Start);

        self.plugins.init_pending(&self.services)?;
        {
            let mut ctx = RuntimeContext::new(&self.services, &mut self.plugins);
            self.app.on_start(&mut ctx).map_err(|e| {
                log::error!("application start failed: {e:#}");
                match e.downcast::<RuntimeError>() {
                    Ok(err @ RuntimeError::Plugin { .. }) => err,
                    Ok(other) => RuntimeError::Start(other.into()),
                    Err(e) => RuntimeError::Start(e),
                }
            })?;
        }

        self.spawn_loops(setup.pacing)?;

        self.transition(Transition::Resume);
        self.app.on_resume();
        match setup.initial_resize {
            InitialResize::Immediate => {
                let (w, h) = self.surface;
                self.resize(w, h);
            }
            InitialResize::FirstFocus => self.deferred_resize = true,
            InitialResize::Never => {}
        }
        self.open_gate();

        log::info!("runtime running");
        Ok(())
    }

    fn spawn_loops(&mut self, pacing: Arc<dyn Pacing>) -> Result<()> {
        let settings = Arc::clone(&self.services.settings);
        let sync = SyncHandle::<A::Shared>::default();
        let loops = self.loops.insert(Loops {
            sync: sync.clone(),
            tick: None,
            render: None,
        });

        let app = Arc::clone(&self.app);
        let tick_sync = sync.clone();
        let tick = TickLoop::spawn(
            settings.tick_rate,
            Arc::clone(&self.gate),
            Arc::clone(&pacing),
            move |elapsed| app.on_tick(elapsed, &tick_sync),
        )
        .map_err(|source| RuntimeError::Spawn { name: "tick", source })?;
        loops.tick = Some(tick);

        let app = Arc::clone(&self.app);
        let render = RenderLoop::spawn(
            settings.frame_rate,
            Arc::clone(&self.gate),
            pacing,
            move |elapsed| app.on_render(elapsed, &sync),
        )
        .map_err(|source| RuntimeError::Spawn { name: "render", source })?;
        log::debug!(
            "render loop in {} mode",
            if render.is_native() { "native" } else { "timer" }
        );
        loops.render = Some(render);

        Ok(())
    }

    fn open_gate(&self) {
        self.gate.open();
        if let Some(render) = self.loops.as_ref().and_then(|l| l.render.as_ref()) {
            render.kick();
        }
    }

    fn transition(&mut self, transition: Transition) -> bool {
        match self.lifecycle.apply(transition) {
            Ok(_) => true,
            Err(e) => {
                log::debug!("{e}; ignoring");
                false
            }
        }
    }

    /// Shared state of the current run, once the loops exist.
    pub fn sync(&self) -> Option<&SyncHandle<A::Shared>> {
        self.loops.as_ref().map(|l| &l.sync)
    }

    /// Host frame callback body for native render mode. Returns `true` when a
    /// frame was rendered.
    pub fn render_frame(&self) -> bool {
        self.loops
            .as_ref()
            .and_then(|l| l.render.as_ref())
            .is_some_and(RenderLoop::render_frame)
    }

    /// `Running -> Paused`. Returns once no tick/render callback is running.
    pub fn pause(&mut self) {
        if !self.lifecycle.can(Transition::Pause) {
            log::debug!("pause ignored: runtime is {}", self.state());
            return;
        }

        self.gate.suspend();
        self.transition(Transition::Pause);
        self.app.on_pause();
        log::info!("runtime paused");
    }

    /// `Paused -> Running`.
    pub fn resume(&mut self) {
        if self.state() != LifecycleState::Paused {
            log::debug!("resume ignored: runtime is {}", self.state());
            return;
        }

        self.transition(Transition::Resume);
        self.app.on_resume();
        self.deliver_deferred_resize();
        self.open_gate();
        log::info!(
            "runtime resumed ({} resumes so far)",
            self.lifecycle.resumes_from_pause()
        );
    }

    /// Focus returned: resumes a paused runtime, or delivers the pending
    /// startup resize to one that is already running.
    fn focus_gained(&mut self) {
        if self.state() == LifecycleState::Running {
            self.deliver_deferred_resize();
        } else {
            self.resume();
        }
    }

    fn deliver_deferred_resize(&mut self) {
        if std::mem::take(&mut self.deferred_resize) {
            let (w, h) = self.surface;
            log::debug!("delivering deferred startup resize {w}x{h}");
            self.resize(w, h);
        }
    }

    /// Records the new surface size and, while live, delivers it to the app
    /// and the `resize` channel. Zero sizes are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            log::debug!("ignoring zero-sized resize {width}x{height}");
            return;
        }

        self.surface = (width, height);
        if !self.state().is_live() {
            return;
        }

        self.app.on_resize(width, height);
        self.services
            .publish(&Event::Resize(ResizeEvent { width, height }));
    }

    /// Filters `input` and publishes it on the bus while live.
    pub fn input(&mut self, input: InputEvent) -> bool {
        if !self.state().is_live() {
            return false;
        }
        match self.input.admit(input) {
            Some(event) => self.services.publish(&event),
            None => false,
        }
    }

    /// `Running|Paused -> Stopped`. Idempotent; a no-op before start.
    ///
    /// Both loops have exited when `on_stop` runs.
    pub fn stop(&mut self) {
        let state = self.state();
        if !self.lifecycle.can(Transition::Stop) {
            log::debug!("stop ignored: runtime is {state}");
            return;
        }

        if state == LifecycleState::Running {
            self.gate.suspend();
            self.app.on_pause();
        }

        let (ticks, frames) = self.join_loops();
        self.transition(Transition::Stop);
        self.app.on_stop();
        log::info!("runtime stopped after {ticks} ticks and {frames} frames");
    }

    fn join_loops(&mut self) -> (u64, u64) {
        self.gate.shut();
        let Some(loops) = self.loops.as_mut() else {
            return (0, 0);
        };

        let ticks = loops.tick.take().map_or(0, TickLoop::join);
        let frames = loops.render.take().map_or(0, RenderLoop::join);
        (ticks, frames)
    }

    /// `Stopped -> Disposed`, stopping first if needed.
    ///
    /// Plugins are disposed even when `on_dispose` fails; its error is
    /// returned afterwards.
    pub fn dispose(mut self) -> Result<()> {
        self.stop();
        if !self.lifecycle.can(Transition::Dispose) {
            log::debug!("dispose without a completed run: runtime is {}", self.state());
            self.join_loops();
            self.plugins.dispose_all();
            return Ok(());
        }

        self.transition(Transition::Dispose);
        let result = self.app.on_dispose();
        self.plugins.dispose_all();
        self.services.handle.set_waker(None);
        log::info!("runtime disposed");

        result.map_err(|e| {
            log::error!("application dispose failed: {e:#}");
            RuntimeError::Dispose(e)
        })
    }

    /// Acts on one host signal.
    pub fn handle_signal(&mut self, signal: Signal) {
        log::trace!("signal {signal:?}");
        match signal {
            Signal::FocusGained => self.focus_gained(),
            Signal::FocusLost => self.pause(),
            Signal::Resize { width, height } => self.resize(width, height),
            Signal::Close | Signal::Stop => self.stop(),
            Signal::Input(input) => {
                self.input(input);
            }
        }
    }

    /// Handles every queued signal without blocking and returns the state.
    pub fn pump(&mut self) -> LifecycleState {
        while let Ok(signal) = self.signals.try_recv() {
            self.handle_signal(signal);
        }
        self.state()
    }

    /// Blocks on the signal queue until the runtime is no longer live.
    pub fn wait(&mut self) -> LifecycleState {
        while self.state().is_live() {
            match self.signals.recv() {
                Ok(signal) => self.handle_signal(signal),
                Err(_) => break,
            }
        }
        self.state()
    }

    /// Like [`Runtime::wait`] but gives up after `timeout`.
    pub fn wait_for(&mut self, timeout: Duration) -> LifecycleState {
        let deadline = Instant::now() + timeout;
        while self.state().is_live() {
            let left = deadline.saturating_duration_since(Instant::now());
            match self.signals.recv_timeout(left) {
                Ok(signal) => self.handle_signal(signal),
                Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => break,
            }
        }
        self.state()
    }
}

impl<A: App> Drop for Runtime<A> {
    fn drop(&mut self) {
        if self.state().is_live() {
            log::warn!("runtime dropped while {}; shutting loops down", self.state());
        }
        self.join_loops();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{Action, Button, MouseEvent};
    use crate::runtime::RuntimeHandle;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<String>>,
    }

    impl Recorder {
        fn push(&self, s: impl Into<String>) {
            self.calls.lock().unwrap().push(s.into());
        }

        fn take(&self) -> Vec<String> {
            std::mem::take(&mut *self.calls.lock().unwrap())
        }
    }

    #[derive(Default)]
    struct Quiet {
        log: Arc<Recorder>,
    }

    impl App for Quiet {
        type Shared = ();

        fn on_start(&self, _ctx: &mut RuntimeContext<'_>) -> anyhow::Result<()> {
            self.log.push("start");
            Ok(())
        }

        fn on_resize(&self, width: u32, height: u32) {
            self.log.push(format!("resize {width}x{height}"));
        }

        fn on_resume(&self) {
            self.log.push("resume");
        }

        fn on_render(&self, _elapsed: Duration, _sync: &SyncHandle<()>) {}

        fn on_tick(&self, _elapsed: Duration, _sync: &SyncHandle<()>) {}

        fn on_pause(&self) {
            self.log.push("pause");
        }

        fn on_stop(&self) {
            self.log.push("stop");
        }

        fn on_dispose(&self) -> anyhow::Result<()> {
            self.log.push("dispose");
            Ok(())
        }
    }

    fn runtime() -> (Runtime<Quiet>, Arc<Recorder>) {
        let log = Arc::new(Recorder::default());
        let rt = Runtime::create(Quiet { log: Arc::clone(&log) }).unwrap();
        (rt, log)
    }

    #[test]
    fn stop_before_start_changes_nothing() {
        let (mut rt, log) = runtime();
        rt.stop();
        rt.handle().stop();
        rt.pump();
        assert_eq!(rt.state(), LifecycleState::Created);
        assert!(log.take().is_empty());
    }

    #[test]
    fn start_delivers_immediate_resize_after_resume() {
        let (mut rt, log) = runtime();
        rt.start(HostSetup::headless(&Settings::default())).unwrap();
        assert_eq!(rt.state(), LifecycleState::Running);
        assert_eq!(log.take(), vec!["start", "resume", "resize 640x480"]);
        rt.stop();
    }

    fn first_focus_setup() -> HostSetup {
        let mut setup = HostSetup::headless(&Settings::default());
        setup.surface = (800, 600);
        setup.initial_resize = InitialResize::FirstFocus;
        setup
    }

    #[test]
    fn deferred_resize_is_delivered_once() {
        let (mut rt, log) = runtime();
        rt.start(first_focus_setup()).unwrap();

        rt.pause();
        rt.resume();
        rt.pause();
        rt.resume();
        rt.stop();

        assert_eq!(
            log.take(),
            vec![
                "start",
                "resume",
                "pause",
                "resume",
                "resize 800x600",
                "pause",
                "resume",
                "pause",
                "stop",
            ]
        );
    }

    #[test]
    fn first_focus_while_running_delivers_deferred_resize() {
        let (mut rt, log) = runtime();
        rt.start(first_focus_setup()).unwrap();
        assert_eq!(log.take(), vec!["start", "resume"]);

        rt.handle_signal(Signal::FocusGained);
        assert_eq!(rt.state(), LifecycleState::Running);
        assert_eq!(log.take(), vec!["resize 800x600"]);

        rt.handle_signal(Signal::FocusGained);
        rt.handle_signal(Signal::FocusLost);
        rt.handle_signal(Signal::FocusGained);
        rt.stop();
        assert_eq!(log.take(), vec!["pause", "resume", "stop"]);
    }

    #[test]
    fn zero_resize_is_ignored() {
        let (mut rt, log) = runtime();
        let mut setup = HostSetup::headless(&Settings::default());
        setup.initial_resize = InitialResize::Never;
        rt.start(setup).unwrap();
        log.take();

        rt.handle_signal(Signal::Resize { width: 0, height: 200 });
        rt.handle_signal(Signal::Resize { width: 30, height: 20 });
        assert_eq!(log.take(), vec!["resize 30x20"]);
        rt.stop();
    }

    #[test]
    fn resize_reaches_bus_listeners() {
        let (mut rt, _log) = runtime();
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        rt.subscribe(crate::events::RESIZE, move |e| {
            if let Event::Resize(r) = e {
                *sink.lock().unwrap() = Some((r.width, r.height));
            }
            true
        });

        rt.start(HostSetup::headless(&Settings::default())).unwrap();
        assert_eq!(*seen.lock().unwrap(), Some((640, 480)));
        rt.stop();
    }

    #[test]
    fn stop_twice_pauses_and_stops_once() {
        let (mut rt, log) = runtime();
        rt.start(HostSetup::headless(&Settings::default())).unwrap();
        log.take();

        let handle: RuntimeHandle = rt.handle();
        handle.stop();
        handle.stop();
        assert_eq!(rt.pump(), LifecycleState::Stopped);
        rt.stop();

        assert_eq!(log.take(), vec!["pause", "stop"]);
    }

    #[test]
    fn stop_while_paused_skips_second_pause() {
        let (mut rt, log) = runtime();
        rt.start(HostSetup::headless(&Settings::default())).unwrap();
        rt.handle_signal(Signal::FocusLost);
        rt.handle_signal(Signal::Close);
        let calls = log.take();
        assert_eq!(calls.iter().filter(|c| *c == "pause").count(), 1);
        assert_eq!(calls.last().map(String::as_str), Some("stop"));
    }

    #[test]
    fn dispose_runs_after_stop() {
        let (mut rt, log) = runtime();
        rt.start(HostSetup::headless(&Settings::default())).unwrap();
        log.take();
        rt.dispose().unwrap();
        assert_eq!(log.take(), vec!["pause", "stop", "dispose"]);
    }

    #[test]
    fn input_is_filtered_before_publishing() {
        let mut settings = Settings::default();
        settings.event_mask = crate::settings::EventMask::KEY;
        let mut rt = Runtime::with_settings(Quiet::default(), settings).unwrap();
        rt.subscribe(crate::events::MOUSE, |_| true);

        let press = InputEvent::Mouse(MouseEvent {
            x: 1,
            y: 1,
            button: Button::Left,
            action: Action::Down,
        });
        assert!(!rt.input(press.clone()), "not live yet");

        rt.start(HostSetup::headless(rt.settings())).unwrap();
        assert!(!rt.input(press), "mouse class masked out");
        rt.stop();
    }

    #[test]
    fn invalid_settings_fail_creation() {
        let mut settings = Settings::default();
        settings.tick_rate = 0;
        assert!(matches!(
            Runtime::with_settings(Quiet::default(), settings),
            Err(RuntimeError::InvalidSettings(_))
        ));
    }
}
