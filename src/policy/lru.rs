//! # Least Recently Used (LRU) Cache Core
//!
//! Exact LRU map with constant-time promotion, used on its own or as the main
//! region behind the TinyLFU admission filter
//! ([`TinyLfuCache`](crate::policy::tiny_lfu::TinyLfuCache)).
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────┐
//!   │                         LruCore<K, V>                            │
//!   │                                                                  │
//!   │   ┌────────────────────────────────────────────────────────────┐ │
//!   │   │  FxHashMap<K, NonNull<Node>>  (index)                      │ │
//!   │   └────────────────────────┬───────────────────────────────────┘ │
//!   │                            │                                     │
//!   │   ┌────────────────────────▼───────────────────────────────────┐ │
//!   │   │  Doubly linked node list (recency order)                   │ │
//!   │   │                                                            │ │
//!   │   │  head ──► ┌──────┐ ◄──► ┌──────┐ ◄──► ┌──────┐ ◄── tail    │ │
//!   │   │    (MRU)  │ k, v │      │ k, v │      │ k, v │   (LRU)     │ │
//!   │   │           └──────┘      └──────┘      └──────┘             │ │
//!   │   └────────────────────────────────────────────────────────────┘ │
//!   └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Operations
//!
//! | Method           | Complexity | Description                             |
//! |------------------|------------|-----------------------------------------|
//! | `try_new(cap)`   | O(1)       | Create; capacity 0 is a `ConfigError`   |
//! | `insert(k, v)`   | O(1)       | Insert or update, may evict the tail    |
//! | `get(&k)`        | O(1)       | Get value, moves entry to MRU position  |
//! | `peek(&k)`       | O(1)       | Get value without touching the order    |
//! | `contains(&k)`   | O(1)       | Check existence, order untouched        |
//! | `remove(&k)`     | O(1)       | Remove entry by key                     |
//! | `pop_lru()`      | O(1)       | Remove and return the LRU entry         |
//! | `peek_lru()`     | O(1)       | Observe the eviction victim             |
//! | `touch(&k)`      | O(1)       | Move to MRU without returning the value |
//!
//! ## Invariants
//!
//! - `len() <= capacity()` at every observable point.
//! - Index and list are bijective: every indexed key has exactly one node and
//!   every node's key is indexed.
//! - The head is the most recently touched key; the tail is the eviction
//!   victim.
//!
//! ## Thread Safety
//!
//! `LruCore` is **not** thread-safe. [`ShardedCache`](crate::sharded::ShardedCache)
//! wraps one core per shard behind a `parking_lot::Mutex`.

use std::fmt;
use std::hash::Hash;
use std::ptr::NonNull;

use rustc_hash::FxHashMap;

use crate::error::ConfigError;
use crate::traits::{CoreCache, LruCacheTrait, MutableCache};

/// Node in the recency list.
///
/// Linked list pointers first for traversal locality; the key is needed for
/// index removal during eviction.
#[repr(C)]
struct Node<K, V> {
    prev: Option<NonNull<Node<K, V>>>,
    next: Option<NonNull<Node<K, V>>>,
    key: K,
    value: V,
}

/// Exact LRU cache core: `FxHashMap` index plus a raw-pointer recency list.
///
/// Keys are `Copy` (cheap to duplicate into the node) and values are owned by
/// the nodes. All mutating operations are O(1).
///
/// # Example
///
/// ```
/// use admitkit::policy::lru::LruCore;
/// use admitkit::traits::CoreCache;
///
/// let mut cache: LruCore<u32, String> = LruCore::new(2);
/// cache.insert(1, "a".to_string());
/// cache.insert(2, "b".to_string());
///
/// // get promotes key 1, so key 2 becomes the victim
/// cache.get(&1);
/// cache.insert(3, "c".to_string());
///
/// assert!(cache.contains(&1));
/// assert!(!cache.contains(&2));
/// ```
pub struct LruCore<K, V>
where
    K: Copy + Eq + Hash,
{
    map: FxHashMap<K, NonNull<Node<K, V>>>,
    head: Option<NonNull<Node<K, V>>>,
    tail: Option<NonNull<Node<K, V>>>,
    capacity: usize,
}

// SAFETY: LruCore can be sent between threads if K and V are Send. The raw
// pointers only reference heap memory owned by the struct.
unsafe impl<K, V> Send for LruCore<K, V>
where
    K: Copy + Eq + Hash + Send,
    V: Send,
{
}

// SAFETY: shared references to LruCore only permit &self methods, which never
// mutate through the node pointers. Mutation requires &mut self.
unsafe impl<K, V> Sync for LruCore<K, V>
where
    K: Copy + Eq + Hash + Sync,
    V: Sync,
{
}

impl<K, V> LruCore<K, V>
where
    K: Copy + Eq + Hash,
{
    /// Creates an LRU core with the given capacity.
    ///
    /// Capacity 0 is rejected: an LRU that can hold nothing has no victim to
    /// report and no entry to promote.
    pub fn try_new(capacity: usize) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::new("capacity must be > 0"));
        }
        Ok(LruCore {
            map: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            head: None,
            tail: None,
            capacity,
        })
    }

    /// Creates an LRU core, panicking on an invalid capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0. Use [`try_new`](Self::try_new) to handle
    /// the error instead.
    pub fn new(capacity: usize) -> Self {
        match Self::try_new(capacity) {
            Ok(core) => core,
            Err(err) => panic!("{err}"),
        }
    }

    /// Read-only lookup that does not promote the entry.
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.map
            .get(key)
            .map(|node_ptr| unsafe { &(*node_ptr.as_ptr()).value })
    }

    /// Detach a node from the linked list without removing it from the map.
    #[inline(always)]
    fn detach(&mut self, node_ptr: NonNull<Node<K, V>>) {
        unsafe {
            let node = node_ptr.as_ref();
            let prev = node.prev;
            let next = node.next;

            match prev {
                Some(mut p) => p.as_mut().next = next,
                None => self.head = next,
            }

            match next {
                Some(mut n) => n.as_mut().prev = prev,
                None => self.tail = prev,
            }
        }
    }

    /// Attach a node at the front (MRU position).
    #[inline(always)]
    fn attach_front(&mut self, mut node_ptr: NonNull<Node<K, V>>) {
        unsafe {
            let node = node_ptr.as_mut();
            node.prev = None;
            node.next = self.head;

            match self.head {
                Some(mut h) => h.as_mut().prev = Some(node_ptr),
                None => self.tail = Some(node_ptr),
            }

            self.head = Some(node_ptr);
        }
    }

    /// Pop the tail node (LRU) and return it.
    #[inline(always)]
    fn pop_tail(&mut self) -> Option<Box<Node<K, V>>> {
        self.tail.map(|tail_ptr| unsafe {
            let node = Box::from_raw(tail_ptr.as_ptr());

            self.tail = node.prev;
            match self.tail {
                Some(mut t) => t.as_mut().next = None,
                None => self.head = None,
            }

            node
        })
    }

    /// Validate internal invariants (debug builds only).
    fn validate_invariants(&self) {
        #[cfg(debug_assertions)]
        {
            if self.map.is_empty() {
                debug_assert!(self.head.is_none());
                debug_assert!(self.tail.is_none());
                return;
            }

            let mut count = 0usize;
            let mut current = self.head;
            while let Some(ptr) = current {
                count += 1;
                unsafe {
                    let node = ptr.as_ref();
                    debug_assert!(self.map.contains_key(&node.key));
                    current = node.next;
                }
                if count > self.map.len() {
                    panic!("cycle detected in recency list");
                }
            }

            debug_assert_eq!(count, self.map.len());
            debug_assert!(self.map.len() <= self.capacity);
        }
    }
}

impl<K, V> CoreCache<K, V> for LruCore<K, V>
where
    K: Copy + Eq + Hash,
{
    /// Insert or update; a new key at capacity evicts the tail first.
    #[inline]
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        if let Some(&node_ptr) = self.map.get(&key) {
            let previous = unsafe {
                let node = &mut *node_ptr.as_ptr();
                std::mem::replace(&mut node.value, value)
            };

            self.detach(node_ptr);
            self.attach_front(node_ptr);

            self.validate_invariants();
            return Some(previous);
        }

        if self.map.len() >= self.capacity {
            if let Some(evicted) = self.pop_tail() {
                self.map.remove(&evicted.key);
            }
        }

        let node = Box::new(Node {
            prev: None,
            next: None,
            key,
            value,
        });
        let node_ptr = NonNull::from(Box::leak(node));

        self.map.insert(key, node_ptr);
        self.attach_front(node_ptr);

        self.validate_invariants();
        None
    }

    /// Lookup that promotes the entry to the MRU position.
    #[inline]
    fn get(&mut self, key: &K) -> Option<&V> {
        let node_ptr = *self.map.get(key)?;

        self.detach(node_ptr);
        self.attach_front(node_ptr);

        self.validate_invariants();

        unsafe { Some(&(*node_ptr.as_ptr()).value) }
    }

    #[inline]
    fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    #[inline]
    fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.capacity
    }

    fn clear(&mut self) {
        while self.pop_tail().is_some() {}
        self.map.clear();

        self.validate_invariants();
    }
}

impl<K, V> MutableCache<K, V> for LruCore<K, V>
where
    K: Copy + Eq + Hash,
{
    #[inline]
    fn remove(&mut self, key: &K) -> Option<V> {
        let node_ptr = self.map.remove(key)?;

        self.detach(node_ptr);
        let node = unsafe { Box::from_raw(node_ptr.as_ptr()) };

        self.validate_invariants();

        Some(node.value)
    }
}

impl<K, V> LruCacheTrait<K, V> for LruCore<K, V>
where
    K: Copy + Eq + Hash,
{
    #[inline]
    fn pop_lru(&mut self) -> Option<(K, V)> {
        let node = self.pop_tail()?;
        self.map.remove(&node.key);

        self.validate_invariants();

        Some((node.key, node.value))
    }

    /// Observe the current eviction victim without touching the order.
    #[inline]
    fn peek_lru(&self) -> Option<(&K, &V)> {
        self.tail.map(|tail_ptr| unsafe {
            let node = tail_ptr.as_ref();
            (&node.key, &node.value)
        })
    }

    #[inline]
    fn touch(&mut self, key: &K) -> bool {
        if let Some(&node_ptr) = self.map.get(key) {
            self.detach(node_ptr);
            self.attach_front(node_ptr);

            self.validate_invariants();
            true
        } else {
            false
        }
    }
}

// Free all heap-allocated nodes when the core is dropped.
impl<K, V> Drop for LruCore<K, V>
where
    K: Copy + Eq + Hash,
{
    fn drop(&mut self) {
        while self.pop_tail().is_some() {}
    }
}

impl<K, V> fmt::Debug for LruCore<K, V>
where
    K: Copy + Eq + Hash + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCore")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .finish_non_exhaustive()
    }
}

impl<K, V> Extend<(K, V)> for LruCore<K, V>
where
    K: Copy + Eq + Hash,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}
