//! Runtime facade and host-facing plumbing.
//!
//! A [`Runtime`] owns one application run: lifecycle, loops, plugins and the
//! signal queue hosts feed through a [`RuntimeHandle`].

mod facade;
mod handle;
pub mod headless;

pub use facade::{HostSetup, InitialResize, Runtime};
pub use handle::{RuntimeHandle, Signal};

#[cfg(test)]
pub(crate) fn test_services() -> crate::core::RuntimeServices {
    use std::sync::Arc;

    let (tx, _rx) = std::sync::mpsc::channel();
    crate::core::RuntimeServices {
        handle: RuntimeHandle::new(tx),
        settings: Arc::new(crate::settings::Settings::default()),
        native: Default::default(),
        bus: Arc::new(crate::events::EventBus::new()),
    }
}
