//! Dual-loop scheduler.
//!
//! A tick loop and a render loop, each paced to its own rate, admitted through a
//! shared [`Gate`] that the lifecycle opens, suspends and shuts. Platform
//! differences live behind [`Pacing`].

mod gate;
mod pacing;
mod render;
mod tick;
mod worker;

pub use gate::{Gate, Pass, Phase};
pub use pacing::{FrameRequester, NativeFramePacing, Pacing, ThreadPacing};
pub use render::{NativeRender, RenderLoop};
pub use tick::TickLoop;
