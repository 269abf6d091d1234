use std::fmt;
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};

use crate::input::InputEvent;

/// Message from a host (or the application) to the runtime.
///
/// Hosts never call application callbacks from their event dispatch context;
/// they enqueue one of these and the runtime acts on it on its own turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    FocusGained,
    FocusLost,
    Resize { width: u32, height: u32 },
    /// Window close / page unload.
    Close,
    /// Explicit stop request.
    Stop,
    Input(InputEvent),
}

type Waker = Arc<dyn Fn() + Send + Sync>;

/// Cloneable, thread-safe entry point into a runtime.
///
/// Every method only enqueues a [`Signal`], so it is safe from any thread,
/// including from inside tick/render callbacks and platform event handlers.
#[derive(Clone)]
pub struct RuntimeHandle {
    tx: Sender<Signal>,
    waker: Arc<Mutex<Option<Waker>>>,
}

impl RuntimeHandle {
    pub(crate) fn new(tx: Sender<Signal>) -> Self {
        Self {
            tx,
            waker: Arc::new(Mutex::new(None)),
        }
    }

    /// Installs the callback that wakes the host's event loop after a send.
    pub(crate) fn set_waker(&self, waker: Option<Waker>) {
        *self.waker.lock().unwrap_or_else(|p| p.into_inner()) = waker;
    }

    /// Enqueues `signal`. Returns `false` if the runtime is gone.
    pub fn send(&self, signal: Signal) -> bool {
        if self.tx.send(signal).is_err() {
            return false;
        }

        let waker = self.waker.lock().unwrap_or_else(|p| p.into_inner()).clone();
        if let Some(wake) = waker {
            wake();
        }
        true
    }

    /// Requests the runtime to stop. Idempotent.
    pub fn stop(&self) {
        self.send(Signal::Stop);
    }

    pub fn focus_gained(&self) {
        self.send(Signal::FocusGained);
    }

    pub fn focus_lost(&self) {
        self.send(Signal::FocusLost);
    }

    pub fn resize(&self, width: u32, height: u32) {
        self.send(Signal::Resize { width, height });
    }

    pub fn close(&self) {
        self.send(Signal::Close);
    }

    pub fn input(&self, event: InputEvent) {
        self.send(Signal::Input(event));
    }
}

impl fmt::Debug for RuntimeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuntimeHandle").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::mpsc;

    #[test]
    fn signals_arrive_in_order() {
        let (tx, rx) = mpsc::channel();
        let handle = RuntimeHandle::new(tx);
        handle.focus_lost();
        handle.resize(3, 4);
        handle.stop();

        let got: Vec<_> = rx.try_iter().collect();
        assert_eq!(
            got,
            vec![Signal::FocusLost, Signal::Resize { width: 3, height: 4 }, Signal::Stop]
        );
    }

    #[test]
    fn waker_runs_after_each_send() {
        let (tx, _rx) = mpsc::channel();
        let handle = RuntimeHandle::new(tx);
        let wakes = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&wakes);
        handle.set_waker(Some(Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })));

        handle.clone().stop();
        handle.close();
        assert_eq!(wakes.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn send_fails_once_runtime_is_gone() {
        let (tx, rx) = mpsc::channel();
        let handle = RuntimeHandle::new(tx);
        drop(rx);
        assert!(!handle.send(Signal::Stop));
    }
}
