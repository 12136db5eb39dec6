//! In-process event bus — topic-keyed publish/subscribe.
//!
//! Dispatch is synchronous on the publishing task. Each handler invocation
//! is isolated: a panicking handler is caught and logged, and the remaining
//! handlers still run. Handlers that need async work spawn their own tasks
//! and own their error boundary; the bus never awaits anything.

use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use shutterhub_domain::command::Topic;
use shutterhub_domain::event::CommandEvent;

type Handler = dyn Fn(Topic, &CommandEvent) + Send + Sync;

struct HandlerEntry {
    id: u64,
    handler: Arc<Handler>,
}

#[derive(Default)]
struct Registry {
    next_id: AtomicU64,
    handlers: Mutex<HashMap<Topic, Vec<HandlerEntry>>>,
}

impl Registry {
    fn allocate_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    fn insert(&self, topic: Topic, id: u64, handler: Arc<Handler>) {
        let mut handlers = self.handlers.lock().expect("bus registry poisoned");
        // Newest subscribers are delivered to first.
        handlers
            .entry(topic)
            .or_default()
            .insert(0, HandlerEntry { id, handler });
    }

    fn remove(&self, topic: Topic, id: u64) {
        let mut handlers = self.handlers.lock().expect("bus registry poisoned");
        if let Some(entries) = handlers.get_mut(&topic) {
            entries.retain(|entry| entry.id != id);
        }
    }

    /// Snapshot the handler list so handlers may subscribe or dispose
    /// during a publish without deadlocking.
    fn snapshot(&self, topic: Topic) -> Vec<Arc<Handler>> {
        let handlers = self.handlers.lock().expect("bus registry poisoned");
        handlers
            .get(&topic)
            .map(|entries| entries.iter().map(|e| Arc::clone(&e.handler)).collect())
            .unwrap_or_default()
    }
}

/// Topic-keyed in-process publish/subscribe bus.
///
/// Cheap to clone; clones share the same handler registry.
#[derive(Clone, Default)]
pub struct EventBus {
    registry: Arc<Registry>,
}

impl EventBus {
    /// Create a new bus with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `topic`.
    ///
    /// Multiple handlers per topic are allowed; within a single publish,
    /// delivery order is newest-first. The returned [`Subscription`] removes
    /// exactly this handler when disposed.
    pub fn subscribe(
        &self,
        topic: Topic,
        handler: impl Fn(Topic, &CommandEvent) + Send + Sync + 'static,
    ) -> Subscription {
        let id = self.registry.allocate_id();
        self.registry.insert(topic, id, Arc::new(handler));
        Subscription {
            registry: Arc::clone(&self.registry),
            topic,
            id,
        }
    }

    /// Register `handler` for `topic`, delivered at most once.
    ///
    /// The handler disposes itself on its first invocation, so it sees
    /// exactly one event regardless of publish volume. Disposing the
    /// returned subscription before that cancels the delivery.
    pub fn subscribe_once(
        &self,
        topic: Topic,
        handler: impl Fn(Topic, &CommandEvent) + Send + Sync + 'static,
    ) -> Subscription {
        let id = self.registry.allocate_id();
        let registry = Arc::clone(&self.registry);
        let fired = AtomicBool::new(false);
        self.registry.insert(
            topic,
            id,
            Arc::new(move |event_topic: Topic, event: &CommandEvent| {
                // The snapshot taken by `publish` can still hold this
                // handler after disposal, so guard against re-entry.
                if fired.swap(true, Ordering::SeqCst) {
                    return;
                }
                registry.remove(event_topic, id);
                handler(event_topic, event);
            }),
        );
        Subscription {
            registry: Arc::clone(&self.registry),
            topic,
            id,
        }
    }

    /// Invoke every currently-registered handler for `topic` with `event`.
    ///
    /// No handlers registered is a no-op, not an error. A panicking handler
    /// is caught and logged; remaining handlers still run and the publisher
    /// never observes the failure.
    pub fn publish(&self, topic: Topic, event: &CommandEvent) {
        for handler in self.registry.snapshot(topic) {
            if let Err(panic) = catch_unwind(AssertUnwindSafe(|| handler(topic, event))) {
                tracing::error!(%topic, panic = panic_message(&panic), "event handler panicked");
            }
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}

/// Handle to a registered handler.
///
/// Disposal is idempotent and removes exactly the handler this subscription
/// was created for. Dropping the subscription does **not** unsubscribe.
pub struct Subscription {
    registry: Arc<Registry>,
    topic: Topic,
    id: u64,
}

impl Subscription {
    /// Remove the handler from the bus. Safe to call more than once.
    pub fn dispose(&self) {
        self.registry.remove(self.topic, self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shutterhub_domain::id::DeviceUrl;
    use std::sync::Mutex;

    type Recorded = Arc<Mutex<Vec<(Topic, CommandEvent)>>>;

    fn devices_event() -> CommandEvent {
        CommandEvent::Devices(vec![DeviceUrl::from("io://1234/AAA")])
    }

    fn recorder() -> (Recorded, EventBus) {
        (Arc::new(Mutex::new(Vec::new())), EventBus::new())
    }

    #[test]
    fn should_deliver_event_to_every_subscribed_handler() {
        let (seen, bus) = recorder();
        for _ in 0..3 {
            let seen = Arc::clone(&seen);
            bus.subscribe(Topic::Up, move |topic, event| {
                seen.lock().unwrap().push((topic, event.clone()));
            });
        }

        bus.publish(Topic::Up, &devices_event());

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert!(seen.iter().all(|(t, e)| *t == Topic::Up && *e == devices_event()));
    }

    #[test]
    fn should_not_deliver_events_published_on_other_topics() {
        let (seen, bus) = recorder();
        let seen_handler = Arc::clone(&seen);
        bus.subscribe(Topic::Up, move |topic, event| {
            seen_handler.lock().unwrap().push((topic, event.clone()));
        });

        bus.publish(Topic::Down, &devices_event());

        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn should_be_a_no_op_when_no_handlers_are_registered() {
        let bus = EventBus::new();
        bus.publish(Topic::Stop, &devices_event());
    }

    #[test]
    fn should_keep_running_remaining_handlers_when_one_panics() {
        let (seen, bus) = recorder();

        let seen_first = Arc::clone(&seen);
        bus.subscribe(Topic::Up, move |topic, event| {
            seen_first.lock().unwrap().push((topic, event.clone()));
        });
        bus.subscribe(Topic::Up, |_, _| panic!("handler exploded"));
        let seen_last = Arc::clone(&seen);
        bus.subscribe(Topic::Up, move |topic, event| {
            seen_last.lock().unwrap().push((topic, event.clone()));
        });

        bus.publish(Topic::Up, &devices_event());

        // The panicking handler sits between the two recorders; both run.
        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[test]
    fn should_deliver_newest_first_within_a_single_publish() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let bus = EventBus::new();
        for label in ["first", "second", "third"] {
            let order = Arc::clone(&order);
            bus.subscribe(Topic::Up, move |_, _| {
                order.lock().unwrap().push(label);
            });
        }

        bus.publish(Topic::Up, &devices_event());

        assert_eq!(*order.lock().unwrap(), vec!["third", "second", "first"]);
    }

    #[test]
    fn should_deliver_exactly_once_through_subscribe_once() {
        let (seen, bus) = recorder();
        let seen_handler = Arc::clone(&seen);
        bus.subscribe_once(Topic::My, move |topic, event| {
            seen_handler.lock().unwrap().push((topic, event.clone()));
        });

        for _ in 0..5 {
            bus.publish(Topic::My, &devices_event());
        }

        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn should_remove_exactly_the_disposed_handler() {
        let (seen, bus) = recorder();

        let seen_kept = Arc::clone(&seen);
        let _kept = bus.subscribe(Topic::Up, move |topic, event| {
            seen_kept.lock().unwrap().push((topic, event.clone()));
        });
        let disposed = bus.subscribe(Topic::Up, |_, _| panic!("should never run"));
        disposed.dispose();

        bus.publish(Topic::Up, &devices_event());

        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn should_tolerate_disposing_twice() {
        let bus = EventBus::new();
        let subscription = bus.subscribe(Topic::Up, |_, _| {});
        subscription.dispose();
        subscription.dispose();
        bus.publish(Topic::Up, &devices_event());
    }

    #[test]
    fn should_allow_subscribing_from_inside_a_handler() {
        let (seen, bus) = recorder();
        let bus_inner = bus.clone();
        let seen_inner = Arc::clone(&seen);
        bus.subscribe(Topic::Up, move |_, _| {
            let seen = Arc::clone(&seen_inner);
            bus_inner.subscribe(Topic::Down, move |topic, event| {
                seen.lock().unwrap().push((topic, event.clone()));
            });
        });

        bus.publish(Topic::Up, &devices_event());
        bus.publish(Topic::Down, &devices_event());

        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn should_share_handlers_between_clones() {
        let (seen, bus) = recorder();
        let seen_handler = Arc::clone(&seen);
        bus.subscribe(Topic::Up, move |topic, event| {
            seen_handler.lock().unwrap().push((topic, event.clone()));
        });

        bus.clone().publish(Topic::Up, &devices_event());

        assert_eq!(seen.lock().unwrap().len(), 1);
    }
}
