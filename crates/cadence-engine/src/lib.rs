//! Cadence engine crate.
//!
//! Application lifecycle shell: a fixed-rate tick loop and a fixed-rate render
//! loop around an [`App`], a lifecycle state machine driven by host signals,
//! a plugin registry and an event bus. Hosts live in [`runtime::headless`]
//! and [`desktop`].

pub mod core;
pub mod desktop;
pub mod device;
pub mod error;
pub mod events;
pub mod input;
pub mod lifecycle;
pub mod logging;
pub mod plugin;
pub mod runtime;
pub mod schedule;
pub mod settings;
pub mod sync;
pub mod time;

pub use crate::core::{App, RuntimeContext, RuntimeServices};
pub use crate::error::{Result, RuntimeError};
pub use crate::lifecycle::LifecycleState;
pub use crate::plugin::Plugin;
pub use crate::runtime::{headless, Runtime, RuntimeHandle, Signal};
pub use crate::settings::{EventMask, Settings};
pub use crate::sync::SyncHandle;
