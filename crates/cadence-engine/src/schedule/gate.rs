use std::sync::{Condvar, Mutex, MutexGuard};

/// Phase the loops observe through the gate.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Phase {
    /// Loops block before their next callback.
    Suspended,
    /// Loops run callbacks.
    Open,
    /// Loops exit at their next check.
    Shut,
}

#[derive(Debug)]
struct GateState {
    phase: Phase,
    in_flight: usize,
    suspensions: u64,
}

/// Admission control between the lifecycle and the loops.
///
/// A loop must hold a [`Pass`] while it runs an application callback. Closing
/// or shutting the gate waits until every outstanding pass is dropped, so the
/// caller knows no callback is running once those methods return.
#[derive(Debug)]
pub struct Gate {
    state: Mutex<GateState>,
    changed: Condvar,
}

/// Proof that the gate was open when the current iteration began.
#[must_use = "the callback is only admitted while the pass is held"]
pub struct Pass<'a> {
    gate: &'a Gate,
    suspensions: u64,
}

impl Default for Gate {
    fn default() -> Self {
        Self::new()
    }
}

impl Gate {
    /// Creates a gate in the suspended phase.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(GateState {
                phase: Phase::Suspended,
                in_flight: 0,
                suspensions: 0,
            }),
            changed: Condvar::new(),
        }
    }

    fn guard(&self) -> MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    pub fn phase(&self) -> Phase {
        self.guard().phase
    }

    /// Blocks while suspended. Returns `None` once the gate is shut.
    pub fn enter(&self) -> Option<Pass<'_>> {
        let mut state = self.guard();
        loop {
            match state.phase {
                Phase::Open => return Some(self.admit(&mut state)),
                Phase::Shut => return None,
                Phase::Suspended => {
                    state = self.changed.wait(state).unwrap_or_else(|p| p.into_inner());
                }
            }
        }
    }

    /// Non-blocking variant of [`Gate::enter`] for callers that must not park,
    /// such as a host's native frame callback.
    pub fn try_enter(&self) -> Result<Pass<'_>, Phase> {
        let mut state = self.guard();
        match state.phase {
            Phase::Open => Ok(self.admit(&mut state)),
            other => Err(other),
        }
    }

    fn admit(&self, state: &mut GateState) -> Pass<'_> {
        state.in_flight += 1;
        Pass {
            gate: self,
            suspensions: state.suspensions,
        }
    }

    /// Lets loops run callbacks.
    pub fn open(&self) {
        let mut state = self.guard();
        if state.phase == Phase::Shut {
            return;
        }
        state.phase = Phase::Open;
        self.changed.notify_all();
    }

    /// Suspends loops and waits for in-flight callbacks to drain.
    pub fn suspend(&self) {
        let mut state = self.guard();
        match state.phase {
            Phase::Shut => return,
            Phase::Open => state.suspensions += 1,
            Phase::Suspended => {}
        }
        state.phase = Phase::Suspended;
        self.drain(state);
    }

    /// Terminates loops and waits for in-flight callbacks to drain.
    pub fn shut(&self) {
        let mut state = self.guard();
        state.phase = Phase::Shut;
        self.changed.notify_all();
        self.drain(state);
    }

    fn drain(&self, mut state: MutexGuard<'_, GateState>) {
        while state.in_flight > 0 {
            state = self.changed.wait(state).unwrap_or_else(|p| p.into_inner());
        }
    }
}

impl Pass<'_> {
    /// Times the gate had been suspended after opening when this pass was
    /// issued. A change between two passes means the loop sat out a pause.
    pub fn suspensions(&self) -> u64 {
        self.suspensions
    }
}

impl Drop for Pass<'_> {
    fn drop(&mut self) {
        let mut state = self.gate.guard();
        state.in_flight -= 1;
        if state.in_flight == 0 {
            self.gate.changed.notify_all();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn new_gate_is_suspended() {
        let gate = Gate::new();
        assert_eq!(gate.phase(), Phase::Suspended);
        assert_eq!(gate.try_enter().err(), Some(Phase::Suspended));
    }

    #[test]
    fn open_admits_and_shut_rejects() {
        let gate = Gate::new();
        gate.open();
        assert!(gate.enter().is_some());
        gate.shut();
        assert!(gate.enter().is_none());
        assert_eq!(gate.try_enter().err(), Some(Phase::Shut));
    }

    #[test]
    fn shut_is_final() {
        let gate = Gate::new();
        gate.shut();
        gate.open();
        gate.suspend();
        assert_eq!(gate.phase(), Phase::Shut);
    }

    #[test]
    fn enter_blocks_until_opened() {
        let gate = Arc::new(Gate::new());
        let admitted = Arc::new(AtomicBool::new(false));

        let worker = {
            let gate = Arc::clone(&gate);
            let admitted = Arc::clone(&admitted);
            thread::spawn(move || {
                let pass = gate.enter();
                admitted.store(pass.is_some(), Ordering::SeqCst);
            })
        };

        thread::sleep(Duration::from_millis(30));
        assert!(!admitted.load(Ordering::SeqCst));

        gate.open();
        worker.join().unwrap();
        assert!(admitted.load(Ordering::SeqCst));
    }

    #[test]
    fn shut_wakes_suspended_waiters() {
        let gate = Arc::new(Gate::new());
        let worker = {
            let gate = Arc::clone(&gate);
            thread::spawn(move || gate.enter().is_none())
        };

        thread::sleep(Duration::from_millis(20));
        gate.shut();
        assert!(worker.join().unwrap());
    }

    #[test]
    fn passes_count_suspensions_after_open() {
        let gate = Gate::new();
        gate.suspend();
        gate.open();
        assert_eq!(gate.try_enter().map(|p| p.suspensions()).ok(), Some(0));

        gate.suspend();
        gate.suspend();
        gate.open();
        assert_eq!(gate.enter().map(|p| p.suspensions()), Some(1));
    }

    #[test]
    fn suspend_waits_for_in_flight_pass() {
        let gate = Arc::new(Gate::new());
        gate.open();

        let released = Arc::new(AtomicBool::new(false));
        let (entered_tx, entered_rx) = std::sync::mpsc::channel();
        let worker = {
            let gate = Arc::clone(&gate);
            let released = Arc::clone(&released);
            thread::spawn(move || {
                let _pass = gate.enter().unwrap();
                entered_tx.send(()).unwrap();
                thread::sleep(Duration::from_millis(50));
                released.store(true, Ordering::SeqCst);
            })
        };

        entered_rx.recv().unwrap();
        gate.suspend();
        assert!(released.load(Ordering::SeqCst));
        worker.join().unwrap();
    }
}
