//! Publish/subscribe registries.
//!
//! `publish` snapshots the listener list and releases the lock before calling
//! anyone, so a listener may subscribe or unsubscribe (itself or others)
//! while being notified. Such changes take effect from the next `publish`.

use std::sync::{Arc, Mutex, Weak};

use nj_core::Article;

pub type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Inner<T> {
    next_id: u64,
    listeners: Vec<(u64, Listener<T>)>,
}

pub struct Registry<T> {
    inner: Arc<Mutex<Inner<T>>>,
}

impl<T> Clone for Registry<T> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

impl<T: 'static> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> Registry<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                next_id: 0,
                listeners: Vec::new(),
            })),
        }
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let id = inner.next_id;
        inner.next_id += 1;
        inner.listeners.push((id, Arc::new(listener)));

        let weak: Weak<Mutex<Inner<T>>> = Arc::downgrade(&self.inner);
        Subscription {
            remove: Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    let mut inner = inner.lock().unwrap_or_else(|e| e.into_inner());
                    inner.listeners.retain(|(listener_id, _)| *listener_id != id);
                }
            }),
        }
    }

    pub fn publish(&self, event: &T) {
        let snapshot: Vec<Listener<T>> = {
            let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            inner.listeners.iter().map(|(_, l)| l.clone()).collect()
        };
        for listener in snapshot {
            listener(event);
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Handle returned by [`Registry::subscribe`]. Dropping it keeps the listener
/// registered; call [`Subscription::unsubscribe`] to remove it.
pub struct Subscription {
    remove: Box<dyn Fn() + Send + Sync>,
}

impl Subscription {
    /// Remove exactly this listener. Calling it again is a no-op.
    pub fn unsubscribe(&self) {
        (self.remove)()
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

/// The two channels the journal layer talks on: fresh entries and busy/idle.
#[derive(Clone, Default)]
pub struct UpdateNotifier {
    articles: Registry<Vec<Article>>,
    checking: Registry<bool>,
}

impl UpdateNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe_articles<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Vec<Article>) + Send + Sync + 'static,
    {
        self.articles.subscribe(listener)
    }

    pub fn subscribe_checking<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&bool) + Send + Sync + 'static,
    {
        self.checking.subscribe(listener)
    }

    pub fn publish_articles(&self, articles: &Vec<Article>) {
        self.articles.publish(articles)
    }

    pub fn publish_checking(&self, checking: bool) {
        self.checking.publish(&checking)
    }

    pub fn article_listeners(&self) -> usize {
        self.articles.len()
    }

    pub fn checking_listeners(&self) -> usize {
        self.checking.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_publish_in_subscription_order() {
        let registry: Registry<u32> = Registry::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for name in ["first", "second", "third"] {
            let seen = seen.clone();
            registry.subscribe(move |value: &u32| seen.lock().unwrap().push((name, *value)));
        }
        registry.publish(&7);

        assert_eq!(*seen.lock().unwrap(), vec![("first", 7), ("second", 7), ("third", 7)]);
    }

    #[test]
    fn test_unsubscribe_is_idempotent_and_exact() {
        let registry: Registry<()> = Registry::new();
        let a = Arc::new(AtomicUsize::new(0));
        let b = Arc::new(AtomicUsize::new(0));

        let sub_a = {
            let a = a.clone();
            registry.subscribe(move |_| {
                a.fetch_add(1, Ordering::SeqCst);
            })
        };
        let _sub_b = {
            let b = b.clone();
            registry.subscribe(move |_| {
                b.fetch_add(1, Ordering::SeqCst);
            })
        };

        sub_a.unsubscribe();
        sub_a.unsubscribe();
        registry.publish(&());

        assert_eq!(a.load(Ordering::SeqCst), 0);
        assert_eq!(b.load(Ordering::SeqCst), 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unsubscribe_during_publish() {
        let registry: Registry<u32> = Registry::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let handle: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));

        let sub = {
            let calls = calls.clone();
            let handle = handle.clone();
            registry.subscribe(move |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                if let Some(sub) = handle.lock().unwrap().as_ref() {
                    sub.unsubscribe();
                }
            })
        };
        *handle.lock().unwrap() = Some(sub);

        let later = Arc::new(AtomicUsize::new(0));
        {
            let later = later.clone();
            registry.subscribe(move |_| {
                later.fetch_add(1, Ordering::SeqCst);
            });
        }

        registry.publish(&1);
        registry.publish(&2);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(later.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_subscribe_during_publish_waits_for_next_round() {
        let registry: Registry<u32> = Registry::new();
        let added = Arc::new(AtomicUsize::new(0));
        {
            let inner_registry = registry.clone();
            let added = added.clone();
            registry.subscribe(move |_| {
                let added = added.clone();
                inner_registry.subscribe(move |_| {
                    added.fetch_add(1, Ordering::SeqCst);
                });
            });
        }

        registry.publish(&1);
        assert_eq!(added.load(Ordering::SeqCst), 0);
        registry.publish(&2);
        assert_eq!(added.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_notifier_channels_are_independent() {
        let notifier = UpdateNotifier::new();
        let states = Arc::new(Mutex::new(Vec::new()));
        {
            let states = states.clone();
            notifier.subscribe_checking(move |checking| states.lock().unwrap().push(*checking));
        }
        notifier.publish_articles(&vec![]);
        notifier.publish_checking(true);
        notifier.publish_checking(false);

        assert_eq!(*states.lock().unwrap(), vec![true, false]);
        assert_eq!(notifier.article_listeners(), 0);
        assert_eq!(notifier.checking_listeners(), 1);
    }
}
