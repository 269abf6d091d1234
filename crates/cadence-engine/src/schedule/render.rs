use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::time::Pacer;

use super::gate::Gate;
use super::pacing::{FrameRequester, Pacing};
use super::worker::{self, LoopThread};

type FrameBody = Box<dyn FnMut(Duration) + Send>;

/// Fixed-rate presentation loop.
///
/// The mode follows the host's pacing strategy: with a native frame callback
/// the host drives frames through [`RenderLoop::render_frame`]; otherwise the
/// loop runs on its own timer-paced thread exactly like the tick loop.
pub enum RenderLoop {
    Timed(LoopThread),
    Native(NativeRender),
}

impl RenderLoop {
    pub fn spawn<F>(
        rate: u32,
        gate: Arc<Gate>,
        pacing: Arc<dyn Pacing>,
        body: F,
    ) -> io::Result<Self>
    where
        F: FnMut(Duration) + Send + 'static,
    {
        match pacing.frame_requester() {
            Some(requester) => {
                log::debug!("render loop bound to the host frame callback");
                Ok(Self::Native(NativeRender::new(rate, gate, requester, Box::new(body))))
            }
            None => LoopThread::spawn("render", rate, gate, pacing, body).map(Self::Timed),
        }
    }

    pub fn is_native(&self) -> bool {
        matches!(self, Self::Native(_))
    }

    /// Host frame callback body. Returns `true` when a frame was rendered.
    ///
    /// Always `false` for a timer-driven loop.
    pub fn render_frame(&self) -> bool {
        match self {
            Self::Native(native) => native.frame(),
            Self::Timed(_) => false,
        }
    }

    /// Re-arms the native frame callback after a suspension.
    pub fn kick(&self) {
        if let Self::Native(native) = self {
            native.requester.request_frame(Duration::ZERO);
        }
    }

    /// Waits for the loop to acknowledge termination. Shut the gate first.
    pub fn join(self) -> u64 {
        match self {
            Self::Timed(thread) => thread.join(),
            Self::Native(native) => native.iterations(),
        }
    }
}

struct NativeState {
    pacer: Pacer,
    seen: u64,
    body: FrameBody,
}

/// Render loop body driven by a host frame callback.
///
/// Each invocation runs at most one gated iteration and then asks the host for
/// the next frame after the residual. A suspended or shut gate does not
/// re-request, which leaves the callback unarmed until [`RenderLoop::kick`].
pub struct NativeRender {
    gate: Arc<Gate>,
    requester: Arc<dyn FrameRequester>,
    state: Mutex<NativeState>,
}

impl NativeRender {
    fn new(
        rate: u32,
        gate: Arc<Gate>,
        requester: Arc<dyn FrameRequester>,
        body: FrameBody,
    ) -> Self {
        Self {
            gate,
            requester,
            state: Mutex::new(NativeState {
                pacer: Pacer::from_rate(rate),
                seen: 0,
                body,
            }),
        }
    }

    fn frame(&self) -> bool {
        let Ok(pass) = self.gate.try_enter() else {
            return false;
        };

        let mut state = self.state.lock().unwrap_or_else(|p| p.into_inner());
        let NativeState { pacer, seen, body } = &mut *state;
        worker::rebase_after_pause(pacer, seen, &pass);

        let started = pacer.begin();
        body(pacer.elapsed());
        drop(pass);

        let residual = pacer.finish(started);
        self.requester.request_frame(residual);
        true
    }

    fn iterations(&self) -> u64 {
        self.state
            .lock()
            .map(|s| s.pacer.iterations())
            .unwrap_or_else(|p| p.into_inner().pacer.iterations())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{NativeFramePacing, ThreadPacing};
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Default)]
    struct CountingRequester {
        requests: Mutex<Vec<Duration>>,
    }

    impl FrameRequester for CountingRequester {
        fn request_frame(&self, after: Duration) {
            self.requests.lock().unwrap().push(after);
        }
    }

    fn native_loop(gate: &Arc<Gate>) -> (RenderLoop, Arc<CountingRequester>, Arc<AtomicU32>) {
        let requester = Arc::new(CountingRequester::default());
        let frames = Arc::new(AtomicU32::new(0));
        let pacing = Arc::new(NativeFramePacing::new(requester.clone()));

        let counter = Arc::clone(&frames);
        let render = RenderLoop::spawn(60, Arc::clone(gate), pacing, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

        (render, requester, frames)
    }

    #[test]
    fn native_frame_reschedules_itself() {
        let gate = Arc::new(Gate::new());
        let (render, requester, frames) = native_loop(&gate);
        assert!(render.is_native());

        gate.open();
        assert!(render.render_frame());
        assert!(render.render_frame());

        assert_eq!(frames.load(Ordering::SeqCst), 2);
        let requests = requester.requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert!(requests.iter().all(|d| *d <= Duration::from_nanos(16_666_666)));
    }

    #[test]
    fn suspended_native_frame_does_not_rearm() {
        let gate = Arc::new(Gate::new());
        let (render, requester, frames) = native_loop(&gate);

        assert!(!render.render_frame());
        assert_eq!(frames.load(Ordering::SeqCst), 0);
        assert!(requester.requests.lock().unwrap().is_empty());

        gate.open();
        render.kick();
        assert_eq!(*requester.requests.lock().unwrap(), vec![Duration::ZERO]);
    }

    #[test]
    fn native_frame_after_pause_sees_zero_elapsed() {
        let gate = Arc::new(Gate::new());
        let requester = Arc::new(CountingRequester::default());
        let pacing = Arc::new(NativeFramePacing::new(requester));
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen);
        let render = RenderLoop::spawn(10, Arc::clone(&gate), pacing, move |elapsed| {
            sink.lock().unwrap().push(elapsed);
        })
        .unwrap();

        gate.open();
        render.render_frame();
        render.render_frame();
        gate.suspend();
        gate.open();
        render.render_frame();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0], Duration::ZERO);
        assert!(seen[1] > Duration::ZERO);
        assert_eq!(seen[2], Duration::ZERO);
    }

    #[test]
    fn shut_native_loop_reports_iterations() {
        let gate = Arc::new(Gate::new());
        let (render, _requester, _frames) = native_loop(&gate);

        gate.open();
        render.render_frame();
        gate.shut();
        assert!(!render.render_frame());
        assert_eq!(render.join(), 1);
    }

    #[test]
    fn timed_loop_ignores_host_frames() {
        let gate = Arc::new(Gate::new());
        let render =
            RenderLoop::spawn(120, Arc::clone(&gate), Arc::new(ThreadPacing), |_| {}).unwrap();
        assert!(!render.is_native());
        assert!(!render.render_frame());

        gate.shut();
        assert_eq!(render.join(), 0);
    }
}
