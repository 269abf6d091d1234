//! Window-less host: timer-paced loops on their own threads.
//!
//! Useful for servers, tools and tests. The calling thread blocks on the
//! signal queue until the application (or another thread holding a
//! [`RuntimeHandle`](super::RuntimeHandle)) requests a stop.

use crate::core::App;
use crate::error::Result;
use crate::settings::Settings;

use super::{HostSetup, Runtime};

/// Runs `app` with default settings until it stops.
pub fn run<A: App>(app: A) -> Result<()> {
    run_with_settings(app, Settings::default())
}

/// Create, start, wait for stop, dispose.
pub fn run_with_settings<A: App>(app: A, settings: Settings) -> Result<()> {
    let mut runtime = Runtime::with_settings(app, settings)?;
    let setup = HostSetup::headless(runtime.settings());
    if let Err(err) = runtime.start(setup) {
        // releases plugins that initialized before the failure
        runtime.dispose()?;
        return Err(err);
    }

    runtime.wait();
    runtime.dispose()
}
