//! Application-facing contracts.
//!
//! [`App`] is what applications implement; [`RuntimeContext`] and
//! [`RuntimeServices`] are what the runtime hands back to them and to plugins.

mod app;
mod ctx;

pub use app::App;
pub use ctx::{NativeHandle, NativeHandles, RuntimeContext, RuntimeServices};
