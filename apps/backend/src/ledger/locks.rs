//! Per-key exclusive locks for ledger mutations.
//!
//! Entries live only while some caller holds or waits on them, so keys
//! taken from user input do not accumulate.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::lock_api::ArcMutexGuard;
use parking_lot::{Mutex, RawMutex};

use crate::domain::{AccountId, CheckCode};

/// Lockable key. Ordering puts every account before every check, which
/// fixes the acquisition order for multi-key operations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LockKey {
    Account(AccountId),
    Check(CheckCode),
}

#[derive(Debug, Default)]
pub struct KeyLocks {
    locks: DashMap<LockKey, Arc<Mutex<()>>>,
}

/// Held locks; released together on drop.
pub struct KeyGuard<'a> {
    locks: &'a DashMap<LockKey, Arc<Mutex<()>>>,
    held: Vec<(LockKey, ArcMutexGuard<RawMutex, ()>)>,
}

impl Drop for KeyGuard<'_> {
    fn drop(&mut self) {
        while let Some((key, guard)) = self.held.pop() {
            drop(guard);
            // Clones are only made under the shard lock, so a count of one
            // here means nobody else holds or waits on this key.
            self.locks.remove_if(&key, |_, mutex| Arc::strong_count(mutex) == 1);
        }
    }
}

impl KeyLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock every key in `keys`, sorted and deduplicated so concurrent
    /// callers always acquire in the same order.
    pub fn acquire(&self, keys: impl IntoIterator<Item = LockKey>) -> KeyGuard<'_> {
        let mut keys: Vec<LockKey> = keys.into_iter().collect();
        keys.sort();
        keys.dedup();

        let held = keys
            .into_iter()
            .map(|key| {
                // Clone the Arc out so no map shard stays borrowed while blocking.
                let mutex = self.locks.entry(key.clone()).or_default().clone();
                (key, mutex.lock_arc())
            })
            .collect();
        KeyGuard {
            locks: &self.locks,
            held,
        }
    }

    /// Keys currently held or awaited.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    use super::*;

    #[test]
    fn accounts_sort_before_checks() {
        let account = LockKey::Account(AccountId::from("zzz"));
        let check = LockKey::Check(CheckCode::normalise("AAAAAAAA"));
        assert!(account < check);
    }

    #[test]
    fn duplicate_keys_do_not_self_deadlock() {
        let locks = KeyLocks::new();
        let a = LockKey::Account(AccountId::from("a"));
        let _guard = locks.acquire([a.clone(), a]);
    }

    #[test]
    fn overlapping_acquisitions_are_exclusive() {
        let locks = Arc::new(KeyLocks::new());
        let inside = Arc::new(AtomicUsize::new(0));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let locks = Arc::clone(&locks);
                let inside = Arc::clone(&inside);
                thread::spawn(move || {
                    for _ in 0..50 {
                        let (x, y) = if i % 2 == 0 { ("a", "b") } else { ("b", "a") };
                        let _g = locks.acquire([
                            LockKey::Account(AccountId::from(x)),
                            LockKey::Account(AccountId::from(y)),
                        ]);
                        assert_eq!(inside.fetch_add(1, Ordering::SeqCst), 0);
                        inside.fetch_sub(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert!(locks.is_empty());
    }

    #[test]
    fn released_keys_are_dropped_from_the_map() {
        let locks = KeyLocks::new();
        {
            let _guard = locks.acquire((0..100).map(|i| LockKey::Account(AccountId::from(i as i64))));
            assert_eq!(locks.len(), 100);
        }
        assert!(locks.is_empty());
    }

    #[test]
    fn a_waiting_caller_keeps_the_entry_alive() {
        let locks = Arc::new(KeyLocks::new());
        let key = LockKey::Account(AccountId::from("shared"));
        let first = locks.acquire([key.clone()]);

        let waiter = {
            let locks = Arc::clone(&locks);
            let key = key.clone();
            thread::spawn(move || {
                let _second = locks.acquire([key]);
            })
        };
        // Give the waiter time to clone the entry and block on it.
        thread::sleep(std::time::Duration::from_millis(50));
        drop(first);
        waiter.join().unwrap();
        assert!(locks.is_empty());
    }
}
