//! GPU context for hosts that own a window.
//!
//! The desktop host creates one [`Gpu`] per window and exposes it to the
//! application as the renderer native handle (`Arc<Mutex<Gpu>>`).

mod gpu;
mod surface;

pub use gpu::{FrameOutcome, Gpu, GpuInit};
pub use surface::SurfaceErrorAction;
