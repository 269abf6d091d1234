use std::io;
use std::sync::Arc;
use std::time::Duration;

use super::gate::Gate;
use super::pacing::Pacing;
use super::worker::LoopThread;

/// Fixed-rate logic loop.
///
/// Always runs on its own thread, whatever the host: only rendering may be
/// bound to a platform thread.
pub struct TickLoop {
    thread: LoopThread,
}

impl TickLoop {
    pub fn spawn<F>(
        rate: u32,
        gate: Arc<Gate>,
        pacing: Arc<dyn Pacing>,
        body: F,
    ) -> io::Result<Self>
    where
        F: FnMut(Duration) + Send + 'static,
    {
        let thread = LoopThread::spawn("tick", rate, gate, pacing, body)?;
        Ok(Self { thread })
    }

    /// Waits for the loop to acknowledge termination. Shut the gate first.
    pub fn join(self) -> u64 {
        self.thread.join()
    }
}
