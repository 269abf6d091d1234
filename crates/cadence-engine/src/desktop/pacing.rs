use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::schedule::FrameRequester;

/// Next redraw deadline for the winit event loop.
///
/// The render loop arms it through [`FrameRequester::request_frame`]; the host
/// turns it into `ControlFlow::WaitUntil` and requests a redraw once it is due.
#[derive(Debug, Default)]
pub struct FrameDeadline {
    next: Mutex<Option<Instant>>,
}

impl FrameDeadline {
    /// Earliest armed deadline, if any.
    pub fn next(&self) -> Option<Instant> {
        *self.next.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Disarms and returns `true` when the deadline has passed at `now`.
    pub fn take_due(&self, now: Instant) -> bool {
        let mut next = self.next.lock().unwrap_or_else(|p| p.into_inner());
        match *next {
            Some(at) if at <= now => {
                *next = None;
                true
            }
            _ => false,
        }
    }

    fn arm(&self, at: Instant) {
        let mut next = self.next.lock().unwrap_or_else(|p| p.into_inner());
        *next = Some(next.map_or(at, |current| current.min(at)));
    }
}

impl FrameRequester for FrameDeadline {
    fn request_frame(&self, after: Duration) {
        self.arm(Instant::now() + after);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unarmed_deadline_is_never_due() {
        let d = FrameDeadline::default();
        assert!(d.next().is_none());
        assert!(!d.take_due(Instant::now()));
    }

    #[test]
    fn due_deadline_fires_once() {
        let d = FrameDeadline::default();
        d.request_frame(Duration::ZERO);
        let now = Instant::now();
        assert!(d.take_due(now));
        assert!(!d.take_due(now));
    }

    #[test]
    fn earlier_request_wins() {
        let d = FrameDeadline::default();
        d.request_frame(Duration::from_secs(5));
        d.request_frame(Duration::from_millis(1));
        let next = d.next().unwrap();
        assert!(next < Instant::now() + Duration::from_secs(1));
        assert!(!d.take_due(next - Duration::from_millis(1)));
        assert!(d.take_due(next));
    }
}
