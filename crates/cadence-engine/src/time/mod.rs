//! Time subsystem.
//!
//! Fixed-rate pacing for the tick and render loops, decoupled from any runtime:
//! - one `Pacer` per loop
//! - `begin()` before the callback, `finish()` after it, sleep the returned residual

mod pacer;

pub use pacer::{residual, Pacer};
