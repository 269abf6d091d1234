use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Host-provided hook that schedules the next native frame callback.
///
/// Implementations typically wrap a vsync-aligned primitive (a window redraw
/// request, `requestAnimationFrame`, a paint event). `after` is the residual of
/// the frame that just ran; hosts may honour it or round it to the next vsync.
pub trait FrameRequester: Send + Sync {
    fn request_frame(&self, after: Duration);
}

/// Platform pacing strategy.
///
/// This is the only place where hosts diverge in how the loops are driven:
/// either they expose a native frame callback (render runs inside it), or the
/// loops sleep on their own threads.
pub trait Pacing: Send + Sync {
    /// Native frame callback, if the host has one.
    fn frame_requester(&self) -> Option<Arc<dyn FrameRequester>> {
        None
    }

    /// Suspends the calling loop for `duration`.
    fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            thread::sleep(duration);
        }
    }
}

/// Plain thread sleeping, no native frame callback.
#[derive(Debug, Default, Copy, Clone)]
pub struct ThreadPacing;

impl Pacing for ThreadPacing {}

/// Thread sleeping for the tick loop plus a host frame callback for rendering.
pub struct NativeFramePacing {
    requester: Arc<dyn FrameRequester>,
}

impl NativeFramePacing {
    pub fn new(requester: Arc<dyn FrameRequester>) -> Self {
        Self { requester }
    }
}

impl Pacing for NativeFramePacing {
    fn frame_requester(&self) -> Option<Arc<dyn FrameRequester>> {
        Some(Arc::clone(&self.requester))
    }
}
