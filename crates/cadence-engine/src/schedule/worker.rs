use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::time::Pacer;

use super::gate::{Gate, Pass};
use super::pacing::Pacing;

/// Runs `body` once per period until the gate shuts.
///
/// The pass is dropped before the residual sleep, so a suspend or shut only
/// ever waits for the callback itself, never for the sleep.
pub(crate) fn drive(
    gate: &Gate,
    pacer: &mut Pacer,
    pacing: &dyn Pacing,
    mut body: impl FnMut(Duration),
) {
    let mut seen = 0;
    while let Some(pass) = gate.enter() {
        rebase_after_pause(pacer, &mut seen, &pass);
        let started = pacer.begin();
        body(pacer.elapsed());
        drop(pass);

        let residual = pacer.finish(started);
        pacing.sleep(residual);
    }
}

/// Drops the residual carried across a pause, so the first callback after
/// resuming sees zero elapsed.
pub(crate) fn rebase_after_pause(pacer: &mut Pacer, seen: &mut u64, pass: &Pass<'_>) {
    if pass.suspensions() != *seen {
        *seen = pass.suspensions();
        pacer.reset();
    }
}

/// A paced loop running on its own OS thread.
pub struct LoopThread {
    name: &'static str,
    handle: JoinHandle<u64>,
}

impl LoopThread {
    pub(crate) fn spawn<F>(
        name: &'static str,
        rate: u32,
        gate: Arc<Gate>,
        pacing: Arc<dyn Pacing>,
        body: F,
    ) -> io::Result<Self>
    where
        F: FnMut(Duration) + Send + 'static,
    {
        let handle = thread::Builder::new()
            .name(format!("cadence-{name}"))
            .spawn(move || {
                let mut pacer = Pacer::from_rate(rate);
                log::debug!("{name} loop started, period {:?}", pacer.period());

                drive(&gate, &mut pacer, pacing.as_ref(), body);

                log::debug!("{name} loop exited after {} iterations", pacer.iterations());
                pacer.iterations()
            })?;

        Ok(Self { name, handle })
    }

    /// Waits for the thread to exit and returns its iteration count.
    ///
    /// The gate must be shut first or this blocks forever.
    pub(crate) fn join(self) -> u64 {
        match self.handle.join() {
            Ok(iterations) => iterations,
            Err(_) => {
                log::error!("{} loop thread panicked", self.name);
                0
            }
        }
    }
}
