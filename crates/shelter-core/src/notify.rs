//! Change notifications
//!
//! After a successful write the provider broadcasts a [`Change`] naming the
//! resource that was written. Observers hold a [`Receiver`] and refresh their
//! views when a change overlaps what they display. Delivery is
//! fire-and-forget: observers that went away are pruned on the next send.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Mutex;

use tracing::debug;

use crate::resource::Resource;

/// Data reachable through `uri` may have changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub uri: String,
    pub resource: Resource,
}

impl Change {
    /// Whether observers of `resource` should refresh
    pub fn affects(&self, resource: Resource) -> bool {
        self.resource.overlaps(resource)
    }
}

/// Broadcasts changes to every registered observer
#[derive(Debug, Default)]
pub struct ChangeNotifier {
    observers: Mutex<Vec<Sender<Change>>>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new observer
    pub fn subscribe(&self) -> Receiver<Change> {
        let (tx, rx) = mpsc::channel();
        self.lock().push(tx);
        rx
    }

    /// Send a change to all live observers
    pub fn notify(&self, change: Change) {
        let mut observers = self.lock();
        observers.retain(|tx| tx.send(change.clone()).is_ok());
        debug!(
            "Notified {} observer(s) of change to {}",
            observers.len(),
            change.uri
        );
    }

    pub fn observer_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Sender<Change>>> {
        // a poisoned list of senders is still a valid list
        self.observers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(resource: Resource) -> Change {
        Change {
            uri: format!("content://test/{}", resource),
            resource,
        }
    }

    #[test]
    fn test_broadcast_to_all_observers() {
        let notifier = ChangeNotifier::new();
        let a = notifier.subscribe();
        let b = notifier.subscribe();

        notifier.notify(change(Resource::Collection));

        assert_eq!(a.try_recv().unwrap().resource, Resource::Collection);
        assert_eq!(b.try_recv().unwrap().resource, Resource::Collection);
        assert!(a.try_recv().is_err());
    }

    #[test]
    fn test_dropped_observers_are_pruned() {
        let notifier = ChangeNotifier::new();
        let kept = notifier.subscribe();
        drop(notifier.subscribe());
        assert_eq!(notifier.observer_count(), 2);

        notifier.notify(change(Resource::Item(1)));

        assert_eq!(notifier.observer_count(), 1);
        assert_eq!(kept.try_recv().unwrap().resource, Resource::Item(1));
    }

    #[test]
    fn test_notify_without_observers() {
        let notifier = ChangeNotifier::new();
        notifier.notify(change(Resource::Collection));
        assert_eq!(notifier.observer_count(), 0);
    }

    #[test]
    fn test_affects() {
        let item = change(Resource::Item(3));
        assert!(item.affects(Resource::Collection));
        assert!(item.affects(Resource::Item(3)));
        assert!(!item.affects(Resource::Item(4)));
        assert!(change(Resource::Collection).affects(Resource::Item(4)));
    }
}
