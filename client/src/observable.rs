//! Observable properties for binding a front end to the view model.
//!
//! # Design
//! An explicit publish/subscribe contract: every property owns an `Event`
//! and emits it on each write that changes its value. Handlers run after the
//! value lock is released, so a handler may read (or write) the same
//! property. `Subscription` unregisters its handler when dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

type Handler<A> = Arc<dyn Fn(&A) + Send + Sync>;

struct EventInner<A> {
    next_id: AtomicU64,
    handlers: Mutex<Vec<(u64, Handler<A>)>>,
}

/// A multicast notification carrying `&A` to every registered handler.
pub struct Event<A> {
    inner: Arc<EventInner<A>>,
}

impl<A> Clone for Event<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A: 'static> Default for Event<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: 'static> Event<A> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(EventInner {
                next_id: AtomicU64::new(0),
                handlers: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn subscribe(&self, handler: impl Fn(&A) + Send + Sync + 'static) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.handlers.lock().push((id, Arc::new(handler)));

        let weak: Weak<EventInner<A>> = Arc::downgrade(&self.inner);
        Subscription {
            unsubscribe: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.handlers.lock().retain(|(handler_id, _)| *handler_id != id);
                }
            })),
        }
    }

    pub fn emit(&self, args: &A) {
        let handlers: Vec<Handler<A>> = self
            .inner
            .handlers
            .lock()
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect();
        for handler in handlers {
            handler(args);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.handlers.lock().len()
    }
}

/// Keeps a handler registered until dropped.
#[must_use = "dropping a Subscription unregisters its handler"]
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    /// Leave the handler registered for the lifetime of the event.
    pub fn detach(mut self) {
        self.unsubscribe = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.unsubscribe.is_some())
            .finish()
    }
}

/// A single value that notifies subscribers when it changes.
pub struct Observable<T> {
    value: Mutex<T>,
    changed: Event<T>,
}

impl<T: Clone + PartialEq + Send + 'static> Observable<T> {
    pub fn new(value: T) -> Self {
        Self {
            value: Mutex::new(value),
            changed: Event::new(),
        }
    }

    pub fn get(&self) -> T {
        self.value.lock().clone()
    }

    /// Read the value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&*self.value.lock())
    }

    /// Store `value`. Returns `true` and notifies subscribers only when it
    /// differs from the current value.
    pub fn set(&self, value: T) -> bool {
        {
            let mut current = self.value.lock();
            if *current == value {
                return false;
            }
            *current = value.clone();
        }
        self.changed.emit(&value);
        true
    }

    pub fn subscribe(&self, handler: impl Fn(&T) + Send + Sync + 'static) -> Subscription {
        self.changed.subscribe(handler)
    }
}

impl<T: Default + Clone + PartialEq + Send + 'static> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Observable").field(&*self.value.lock()).finish()
    }
}

/// An ordered collection whose subscribers receive the full new contents
/// whenever it is replaced.
pub struct ObservableList<T> {
    items: Mutex<Vec<T>>,
    changed: Event<Vec<T>>,
}

impl<T: Clone + Send + 'static> ObservableList<T> {
    pub fn new() -> Self {
        Self {
            items: Mutex::new(Vec::new()),
            changed: Event::new(),
        }
    }

    pub fn snapshot(&self) -> Vec<T> {
        self.items.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<T> {
        self.items.lock().get(index).cloned()
    }

    pub fn find(&self, predicate: impl Fn(&T) -> bool) -> Option<T> {
        self.items.lock().iter().find(|item| predicate(item)).cloned()
    }

    /// Replace the contents wholesale, preserving the given order.
    pub fn replace_all(&self, items: impl IntoIterator<Item = T>) {
        let items: Vec<T> = items.into_iter().collect();
        *self.items.lock() = items.clone();
        self.changed.emit(&items);
    }

    pub fn subscribe(&self, handler: impl Fn(&Vec<T>) + Send + Sync + 'static) -> Subscription {
        self.changed.subscribe(handler)
    }
}

impl<T: Clone + Send + 'static> Default for ObservableList<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;

    fn counter() -> (Arc<AtomicUsize>, impl Fn() -> usize) {
        let hits = Arc::new(AtomicUsize::new(0));
        let read = {
            let hits = Arc::clone(&hits);
            move || hits.load(Ordering::SeqCst)
        };
        (hits, read)
    }

    #[test]
    fn set_notifies_only_on_change() {
        let prop = Observable::new(1);
        let (hits, read) = counter();
        let _sub = prop.subscribe(move |_| {
            hits.fetch_add(1, Ordering::SeqCst);
        });

        assert!(prop.set(2));
        assert!(!prop.set(2));
        assert!(prop.set(3));
        assert_eq!(read(), 2);
        assert_eq!(prop.get(), 3);
    }

    #[test]
    fn handler_receives_the_new_value() {
        let prop = Observable::new(String::new());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let _sub = {
            let seen = Arc::clone(&seen);
            prop.subscribe(move |v: &String| seen.lock().push(v.clone()))
        };

        prop.set("a".to_string());
        prop.set("b".to_string());
        assert_eq!(*seen.lock(), vec!["a", "b"]);
    }

    #[test]
    fn dropping_subscription_unregisters() {
        let prop = Observable::new(false);
        let (hits, read) = counter();
        let sub = prop.subscribe(move |_| {
            hits.fetch_add(1, Ordering::SeqCst);
        });
        prop.set(true);
        drop(sub);
        prop.set(false);
        assert_eq!(read(), 1);
        assert_eq!(prop.changed.subscriber_count(), 0);
    }

    #[test]
    fn detached_subscription_stays_registered() {
        let event = Event::<()>::new();
        let (hits, read) = counter();
        event
            .subscribe(move |_| {
                hits.fetch_add(1, Ordering::SeqCst);
            })
            .detach();
        event.emit(&());
        event.emit(&());
        assert_eq!(read(), 2);
    }

    #[test]
    fn handler_may_read_the_property_it_observes() {
        let prop = Arc::new(Observable::new(0));
        let observed = Arc::new(AtomicUsize::new(0));
        let _sub = {
            let reader = Arc::clone(&prop);
            let observed = Arc::clone(&observed);
            prop.subscribe(move |_| {
                observed.store(reader.get(), Ordering::SeqCst);
            })
        };
        prop.set(5);
        assert_eq!(observed.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn replace_all_emits_new_contents() {
        let list = ObservableList::new();
        let last = Arc::new(Mutex::new(Vec::new()));
        let _sub = {
            let last = Arc::clone(&last);
            list.subscribe(move |items: &Vec<i32>| *last.lock() = items.clone())
        };

        list.replace_all(vec![3, 1, 2]);
        assert_eq!(*last.lock(), vec![3, 1, 2]);
        assert_eq!(list.len(), 3);
        assert_eq!(list.get(1), Some(1));
        assert_eq!(list.find(|v| *v > 2), Some(3));

        list.replace_all(Vec::new());
        assert!(list.is_empty());
        assert!(last.lock().is_empty());
    }
}
