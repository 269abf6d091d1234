//! Input subsystem.
//!
//! Public types are host-agnostic and do not expose winit. Hosts translate
//! their native events into `InputEvent`s; the runtime filters them with the
//! settings' mask and motion threshold and publishes the survivors on the bus.

mod filter;
pub mod platform;
mod types;

pub use filter::InputFilter;
pub use types::{
    Action,
    Button,
    InputEvent,
    Key,
    KeyCategory,
    KeyEvent,
    MouseEvent,
    ResizeEvent,
    ScrollEvent,
};
