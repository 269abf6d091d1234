use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use super::Event;

/// Identifies a subscription for [`EventBus::unsubscribe`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ListenerId(u64);

type Listener = Arc<dyn Fn(&Event) -> bool + Send + Sync>;

/// Channel-based publish/subscribe.
///
/// Listeners of a channel run in subscription order. A listener returning
/// `true` consumes the event and later listeners are skipped. The bus never
/// holds its lock while a listener runs, so listeners may subscribe,
/// unsubscribe or publish themselves.
#[derive(Default)]
pub struct EventBus {
    channels: Mutex<HashMap<String, Vec<(ListenerId, Listener)>>>,
    next_id: AtomicU64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn channels(&self) -> MutexGuard<'_, HashMap<String, Vec<(ListenerId, Listener)>>> {
        self.channels.lock().unwrap_or_else(|p| p.into_inner())
    }

    pub fn subscribe<F>(&self, channel: impl Into<String>, listener: F) -> ListenerId
    where
        F: Fn(&Event) -> bool + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.channels()
            .entry(channel.into())
            .or_default()
            .push((id, Arc::new(listener)));
        id
    }

    /// Removes one listener. Returns `false` if it was not subscribed to `channel`.
    pub fn unsubscribe(&self, channel: &str, id: ListenerId) -> bool {
        let mut channels = self.channels();
        let Some(list) = channels.get_mut(channel) else {
            return false;
        };

        let before = list.len();
        list.retain(|(lid, _)| *lid != id);
        let removed = list.len() != before;

        if list.is_empty() {
            channels.remove(channel);
        }
        removed
    }

    /// Delivers `event` on its channel. Returns `true` if a listener consumed it.
    pub fn publish(&self, event: &Event) -> bool {
        let listeners: Vec<Listener> = match self.channels().get(event.channel()) {
            Some(list) => list.iter().map(|(_, l)| Arc::clone(l)).collect(),
            None => return false,
        };

        listeners.iter().any(|listener| listener(event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{KEY, RESIZE};
    use crate::input::{Action, Key, KeyEvent, ResizeEvent};

    fn key_event() -> Event {
        Event::Key(KeyEvent {
            key: Key::Space,
            text: Some(" ".into()),
            action: Action::Down,
        })
    }

    type Log = Arc<Mutex<Vec<&'static str>>>;

    fn recorder(
        log: &Log,
        name: &'static str,
        consume: bool,
    ) -> impl Fn(&Event) -> bool + Send + Sync + 'static {
        let log = Arc::clone(log);
        move |_| {
            log.lock().unwrap().push(name);
            consume
        }
    }

    #[test]
    fn listeners_run_in_subscription_order() {
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        bus.subscribe(KEY, recorder(&log, "first", false));
        bus.subscribe(KEY, recorder(&log, "second", false));

        assert!(!bus.publish(&key_event()));
        assert_eq!(*log.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn first_consumer_stops_propagation() {
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        bus.subscribe(KEY, recorder(&log, "a", false));
        bus.subscribe(KEY, recorder(&log, "b", true));
        bus.subscribe(KEY, recorder(&log, "c", false));

        assert!(bus.publish(&key_event()));
        assert_eq!(*log.lock().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn channels_are_isolated() {
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        bus.subscribe(RESIZE, recorder(&log, "resize", true));

        assert!(!bus.publish(&key_event()));
        assert!(bus.publish(&Event::Resize(ResizeEvent { width: 1, height: 1 })));
        assert_eq!(*log.lock().unwrap(), vec!["resize"]);
    }

    #[test]
    fn unsubscribe_removes_exactly_one_listener() {
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let a = bus.subscribe(KEY, recorder(&log, "a", false));
        bus.subscribe(KEY, recorder(&log, "b", false));

        assert!(bus.unsubscribe(KEY, a));
        assert!(!bus.unsubscribe(KEY, a));
        assert!(!bus.unsubscribe("missing", a));

        bus.publish(&key_event());
        assert_eq!(*log.lock().unwrap(), vec!["b"]);
    }

    #[test]
    fn listeners_may_reenter_the_bus() {
        let bus = Arc::new(EventBus::new());
        let inner = Arc::clone(&bus);
        bus.subscribe("ping", move |_| {
            inner.subscribe("pong", |_| true);
            inner.publish(&Event::custom("pong", ()))
        });

        assert!(bus.publish(&Event::custom("ping", 7u32)));
        assert!(bus.publish(&Event::custom("pong", ())));
    }

    #[test]
    fn custom_payload_downcasts() {
        let event = Event::custom("score", 42u32);
        assert_eq!(event.channel(), "score");
        assert_eq!(event.payload::<u32>(), Some(&42));
        assert_eq!(event.payload::<i64>(), None);
    }
}
