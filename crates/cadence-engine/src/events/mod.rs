//! Publish/subscribe event delivery.
//!
//! Events are routed by channel name. Input and resize events use the built-in
//! channels below; applications may publish their own events on any channel.

mod bus;

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::input::{KeyEvent, MouseEvent, ResizeEvent, ScrollEvent};

pub use bus::{EventBus, ListenerId};

pub const RESIZE: &str = "resize";
pub const MOUSE: &str = "mouse";
pub const SCROLL: &str = "scroll";
pub const KEY: &str = "key";

/// An event routed on the bus.
#[derive(Clone)]
pub enum Event {
    Resize(ResizeEvent),
    Mouse(MouseEvent),
    Scroll(ScrollEvent),
    Key(KeyEvent),
    /// Application-defined event on an arbitrary channel.
    Custom {
        channel: String,
        payload: Arc<dyn Any + Send + Sync>,
    },
}

impl Event {
    pub fn custom<T: Any + Send + Sync>(channel: impl Into<String>, payload: T) -> Self {
        Event::Custom {
            channel: channel.into(),
            payload: Arc::new(payload),
        }
    }

    pub fn channel(&self) -> &str {
        match self {
            Event::Resize(_) => RESIZE,
            Event::Mouse(_) => MOUSE,
            Event::Scroll(_) => SCROLL,
            Event::Key(_) => KEY,
            Event::Custom { channel, .. } => channel,
        }
    }

    /// Payload of a custom event, if it has type `T`.
    pub fn payload<T: Any>(&self) -> Option<&T> {
        match self {
            Event::Custom { payload, .. } => payload.downcast_ref::<T>(),
            _ => None,
        }
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Resize(e) => f.debug_tuple("Resize").field(e).finish(),
            Event::Mouse(e) => f.debug_tuple("Mouse").field(e).finish(),
            Event::Scroll(e) => f.debug_tuple("Scroll").field(e).finish(),
            Event::Key(e) => f.debug_tuple("Key").field(e).finish(),
            Event::Custom { channel, .. } => f
                .debug_struct("Custom")
                .field("channel", channel)
                .finish_non_exhaustive(),
        }
    }
}
