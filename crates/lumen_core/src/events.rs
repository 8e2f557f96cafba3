//! Typed publish/subscribe channel.
//!
//! Subscribing returns a [`Subscription`] guard; dropping the guard
//! unsubscribes. Once a guard is gone its callback is never invoked again,
//! including from an `emit` already in progress.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;

/// Identifies one subscriber on a bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback<E> = Arc<dyn Fn(&E) + Send + Sync>;

struct Subscribers<E> {
    next_id: u64,
    callbacks: Vec<(SubscriptionId, Callback<E>)>,
}

impl<E> Subscribers<E> {
    fn contains(&self, id: SubscriptionId) -> bool {
        self.callbacks.iter().any(|(sub, _)| *sub == id)
    }
}

/// A broadcast channel for events of type `E`.
pub struct EventBus<E> {
    subscribers: Arc<Mutex<Subscribers<E>>>,
}

impl<E: 'static> EventBus<E> {
    /// Creates a bus with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            subscribers: Arc::new(Mutex::new(Subscribers {
                next_id: 1,
                callbacks: Vec::new(),
            })),
        }
    }

    /// Registers `f` for every future event.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe(&self, f: impl Fn(&E) + Send + Sync + 'static) -> Subscription
    where
        E: Send,
    {
        let id = {
            let mut subscribers = self.subscribers.lock();
            let id = SubscriptionId(subscribers.next_id);
            subscribers.next_id += 1;
            subscribers.callbacks.push((id, Arc::new(f)));
            id
        };

        let bus: Weak<Mutex<Subscribers<E>>> = Arc::downgrade(&self.subscribers);
        Subscription {
            id,
            release: Some(Box::new(move || {
                if let Some(subscribers) = bus.upgrade() {
                    subscribers.lock().callbacks.retain(|(sub, _)| *sub != id);
                }
            })),
        }
    }

    /// Delivers `event` to every current subscriber, in subscription order.
    pub fn emit(&self, event: &E) {
        let snapshot: Vec<(SubscriptionId, Callback<E>)> =
            self.subscribers.lock().callbacks.clone();

        for (id, callback) in snapshot {
            // An earlier callback may have released this one.
            if self.subscribers.lock().contains(id) {
                callback(event);
            }
        }
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().callbacks.len()
    }
}

impl<E: 'static> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for EventBus<E> {
    fn clone(&self) -> Self {
        Self {
            subscribers: Arc::clone(&self.subscribers),
        }
    }
}

impl<E> std::fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.lock().callbacks.len())
            .finish()
    }
}

/// Live registration on an [`EventBus`]. Unsubscribes on drop.
pub struct Subscription {
    id: SubscriptionId,
    release: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    /// Returns the subscription id.
    #[must_use]
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Unsubscribes now.
    pub fn unsubscribe(mut self) {
        self.release_now();
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release_now();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_emit_reaches_subscribers() {
        let bus = EventBus::<u32>::new();
        let sum = Arc::new(AtomicUsize::new(0));

        let total = Arc::clone(&sum);
        let _a = bus.subscribe(move |v| {
            total.fetch_add(*v as usize, Ordering::SeqCst);
        });
        let total = Arc::clone(&sum);
        let _b = bus.subscribe(move |v| {
            total.fetch_add(*v as usize, Ordering::SeqCst);
        });

        bus.emit(&5);
        assert_eq!(sum.load(Ordering::SeqCst), 10);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let bus = EventBus::<()>::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&calls);
        let sub = bus.subscribe(move |()| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        bus.emit(&());
        drop(sub);
        bus.emit(&());

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_release_during_emit_is_honored() {
        let bus = EventBus::<()>::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let victim: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));

        let slot = Arc::clone(&victim);
        let _killer = bus.subscribe(move |()| {
            slot.lock().take();
        });
        let counter = Arc::clone(&calls);
        *victim.lock() = Some(bus.subscribe(move |()| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        bus.emit(&());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_subscription_outlives_bus() {
        let bus = EventBus::<()>::new();
        let sub = bus.subscribe(|()| {});
        drop(bus);
        sub.unsubscribe();
    }
}
