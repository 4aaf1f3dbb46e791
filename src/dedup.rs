//! Time-bounded duplicate rejection.
//!
//! A [`DuplicateTracker`] is a thread-safe set of opaque keys whose
//! entries remove themselves after a configured delay. The gateway keys
//! it by `(peer address, message id)` so that CoAP retransmissions inside
//! an exchange lifetime are observable as `add == false` and can be
//! dropped before they reach the broker.

use std::collections::HashSet;
use std::hash::Hash;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// The CoAP EXCHANGE_LIFETIME window within which a retransmission of the
/// same message id may still arrive.
pub const EXCHANGE_LIFETIME: Duration = Duration::from_secs(145);

#[derive(Debug)]
pub struct DuplicateTracker<K> {
    keys: Arc<Mutex<HashSet<K>>>,
}

// derive(Clone) would demand K: Clone on the struct; the handle itself
// only clones the Arc
impl<K> Clone for DuplicateTracker<K> {
    fn clone(&self) -> Self {
        Self {
            keys: Arc::clone(&self.keys),
        }
    }
}

impl<K> Default for DuplicateTracker<K>
where
    K: Eq + Hash + Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> DuplicateTracker<K>
where
    K: Eq + Hash + Clone + Send + 'static,
{
    pub fn new() -> Self {
        Self {
            keys: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Inserts `key` if absent. Returns `true` iff it was newly added.
    pub fn add(&self, key: K) -> bool {
        self.keys.lock().unwrap().insert(key)
    }

    /// Removes `key` if present. Returns `true` iff it was present.
    pub fn remove(&self, key: &K) -> bool {
        self.keys.lock().unwrap().remove(key)
    }

    /// [`add`](Self::add), and when the key is newly added, schedule its
    /// removal after `delay`. The scheduled removal runs on its own task
    /// and tolerates the key having been removed in the meantime.
    ///
    /// Must be called from within a tokio runtime.
    pub fn add_and_delete_after(&self, key: K, delay: Duration) -> bool {
        if !self.add(key.clone()) {
            return false;
        }
        let tracker = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tracker.remove(&key);
        });
        true
    }

    pub fn len(&self) -> usize {
        self.keys.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_is_true_only_once() {
        let tracker = DuplicateTracker::new();
        assert!(tracker.add(1u16));
        assert!(!tracker.add(1u16));
        assert!(tracker.add(2u16));
        assert_eq!(tracker.len(), 2);
    }

    #[test]
    fn test_remove_reports_presence() {
        let tracker = DuplicateTracker::new();
        tracker.add("key");
        assert!(tracker.remove(&"key"));
        assert!(!tracker.remove(&"key"));
        assert!(tracker.is_empty());
    }

    #[tokio::test]
    async fn test_scheduled_removal_reopens_the_key() {
        let tracker = DuplicateTracker::new();
        let window = Duration::from_millis(50);

        assert!(tracker.add_and_delete_after(0x1234u16, window));
        // retransmission inside the window
        assert!(!tracker.add_and_delete_after(0x1234u16, window));

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(tracker.add_and_delete_after(0x1234u16, window));
    }

    #[tokio::test]
    async fn test_scheduled_removal_tolerates_manual_removal() {
        let tracker = DuplicateTracker::new();
        let window = Duration::from_millis(50);

        assert!(tracker.add_and_delete_after(7u16, window));
        assert!(tracker.remove(&7u16));

        // the timer fires against an already-removed key without effect
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(tracker.add(7u16));
    }
}
