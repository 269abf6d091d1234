use crate::events::Event;
use crate::settings::{EventMask, Settings};

use super::types::{Action, InputEvent, MouseEvent};

/// Applies the settings' event mask and motion threshold to raw host input.
#[derive(Debug, Clone)]
pub struct InputFilter {
    mask: EventMask,
    threshold: u32,
    last_pointer: Option<(i32, i32)>,
}

impl InputFilter {
    pub fn new(mask: EventMask, threshold: u32) -> Self {
        Self {
            mask,
            threshold,
            last_pointer: None,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.event_mask, settings.motion_threshold)
    }

    /// Returns the bus event for `input`, or `None` when it is filtered out.
    pub fn admit(&mut self, input: InputEvent) -> Option<Event> {
        match input {
            InputEvent::Mouse(mouse) if mouse.action == Action::Move => {
                if !self.mask.contains(EventMask::MOUSE_MOTION) || self.below_threshold(&mouse) {
                    return None;
                }
                self.last_pointer = Some((mouse.x, mouse.y));
                Some(Event::Mouse(mouse))
            }
            InputEvent::Mouse(mouse) => {
                if !self.mask.contains(EventMask::MOUSE_BUTTON) {
                    return None;
                }
                self.last_pointer = Some((mouse.x, mouse.y));
                Some(Event::Mouse(mouse))
            }
            InputEvent::Scroll(scroll) => {
                self.mask.contains(EventMask::SCROLL).then_some(Event::Scroll(scroll))
            }
            InputEvent::Key(key) => self.mask.contains(EventMask::KEY).then_some(Event::Key(key)),
        }
    }

    fn below_threshold(&self, mouse: &MouseEvent) -> bool {
        let Some((lx, ly)) = self.last_pointer else {
            return false;
        };
        let t = i64::from(self.threshold);
        let dx = (i64::from(mouse.x) - i64::from(lx)).abs();
        let dy = (i64::from(mouse.y) - i64::from(ly)).abs();
        dx < t && dy < t
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{Button, Key, KeyEvent, ScrollEvent};

    fn motion(x: i32, y: i32) -> InputEvent {
        InputEvent::Mouse(MouseEvent { x, y, button: Button::None, action: Action::Move })
    }

    fn press(x: i32, y: i32) -> InputEvent {
        InputEvent::Mouse(MouseEvent { x, y, button: Button::Left, action: Action::Down })
    }

    #[test]
    fn disabled_classes_are_dropped() {
        let mut f = InputFilter::new(EventMask::KEY, 0);
        assert!(f.admit(press(1, 1)).is_none());
        assert!(f.admit(motion(5, 5)).is_none());
        assert!(f.admit(InputEvent::Scroll(ScrollEvent { x: 0, y: 1 })).is_none());

        let key = InputEvent::Key(KeyEvent {
            key: Key::A,
            text: Some("a".into()),
            action: Action::Down,
        });
        assert!(matches!(f.admit(key), Some(Event::Key(_))));
    }

    #[test]
    fn sub_threshold_motion_is_suppressed() {
        let mut f = InputFilter::new(EventMask::ALL, 4);
        assert!(f.admit(motion(10, 10)).is_some(), "first motion always passes");
        assert!(f.admit(motion(12, 13)).is_none());
        assert!(f.admit(motion(14, 10)).is_some());
        // baseline moved to (14, 10)
        assert!(f.admit(motion(16, 12)).is_none());
    }

    #[test]
    fn zero_threshold_delivers_every_motion() {
        let mut f = InputFilter::new(EventMask::ALL, 0);
        assert!(f.admit(motion(0, 0)).is_some());
        assert!(f.admit(motion(0, 0)).is_some());
    }

    #[test]
    fn button_events_reset_motion_baseline() {
        let mut f = InputFilter::new(EventMask::ALL, 10);
        assert!(f.admit(motion(0, 0)).is_some());
        assert!(f.admit(press(50, 50)).is_some());
        assert!(f.admit(motion(55, 55)).is_none());
    }

    #[test]
    fn motion_mask_is_independent_of_button_mask() {
        let mut f = InputFilter::new(EventMask::MOUSE_BUTTON, 0);
        assert!(f.admit(motion(1, 1)).is_none());
        assert!(f.admit(press(1, 1)).is_some());
    }
}
