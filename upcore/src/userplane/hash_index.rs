//! Concurrent hash table shared by the per-device rule indices.
//!
//! Readers walk bucket chains without taking any lock and may run
//! concurrently with a writer.  Writers are serialized by the owning
//! context.  An unlinked node goes to the epoch collector and is freed only
//! after every traversal that could still see it has ended.

use ahash::RandomState;
use crossbeam_epoch::{Atomic, Guard, Owned, Shared};
use std::hash::BuildHasher;
use std::sync::atomic::Ordering::{Acquire, Relaxed, Release};

pub struct HashIndex<T> {
    buckets: Box<[Atomic<Node<T>>]>,
    hasher: RandomState,
}

struct Node<T> {
    value: T,
    next: Atomic<Node<T>>,
}

impl<T: Send + Sync> HashIndex<T> {
    pub fn new(hash_size: usize) -> Self {
        Self {
            buckets: (0..hash_size).map(|_| Atomic::null()).collect(),
            // Fixed seed: bucket placement must be the same for every caller
            // over the table's lifetime.
            hasher: RandomState::with_seed(0),
        }
    }

    pub fn bucket_of(&self, key: &[u8]) -> usize {
        self.hasher.hash_one(key) as usize % self.buckets.len()
    }

    /// Link `value` at the head of `bucket`.  The node's own link is
    /// published before the head pointer, so a concurrent traversal sees
    /// either the old chain or the complete new one, never a torn link.
    pub fn insert(&self, bucket: usize, value: T, guard: &Guard) {
        let mut node = Owned::new(Node {
            value,
            next: Atomic::null(),
        });
        loop {
            let head = self.buckets[bucket].load(Acquire, guard);
            node.next.store(head, Relaxed);
            match self.buckets[bucket].compare_exchange(head, node, Release, Relaxed, guard) {
                Ok(_) => return,
                Err(e) => node = e.new,
            }
        }
    }

    /// Unlink the first entry matching `pred` and schedule it for deferred
    /// destruction.  Only the node's own linkage is removed; a reader
    /// already past it still follows a valid chain.  Returns false if
    /// nothing matched.
    pub fn remove_if(
        &self,
        bucket: usize,
        mut pred: impl FnMut(&T) -> bool,
        guard: &Guard,
    ) -> bool {
        'restart: loop {
            let mut prev = &self.buckets[bucket];
            let mut curr = prev.load(Acquire, guard);
            while let Some(node) = unsafe { curr.as_ref() } {
                let next = node.next.load(Acquire, guard);
                if pred(&node.value) {
                    if prev
                        .compare_exchange(curr, next, Release, Relaxed, guard)
                        .is_err()
                    {
                        continue 'restart;
                    }
                    // The node is no longer reachable from the bucket; the
                    // collector frees it after the current grace period.
                    unsafe { guard.defer_destroy(curr) };
                    return true;
                }
                prev = &node.next;
                curr = next;
            }
            return false;
        }
    }

    /// Lock-free walk of one bucket chain.  Yielded references stay valid
    /// for the guard's lifetime, including across a concurrent unlink.
    pub fn iter<'g>(&'g self, bucket: usize, guard: &'g Guard) -> BucketIter<'g, T> {
        BucketIter {
            curr: self.buckets[bucket].load(Acquire, guard),
            guard,
        }
    }
}

impl<T> Drop for HashIndex<T> {
    fn drop(&mut self) {
        // Exclusive access: no reader can still hold a guard into this table.
        let guard = unsafe { crossbeam_epoch::unprotected() };
        for bucket in self.buckets.iter() {
            let mut curr = bucket.load(Relaxed, guard);
            while !curr.is_null() {
                let node = unsafe { curr.into_owned() };
                curr = node.next.load(Relaxed, guard);
            }
        }
    }
}

pub struct BucketIter<'g, T> {
    curr: Shared<'g, Node<T>>,
    guard: &'g Guard,
}

impl<'g, T> Iterator for BucketIter<'g, T> {
    type Item = &'g T;

    fn next(&mut self) -> Option<&'g T> {
        let node = unsafe { self.curr.as_ref() }?;
        self.curr = node.next.load(Acquire, self.guard);
        Some(&node.value)
    }
}

#[test]
fn insert_scan_remove() {
    let index: HashIndex<u64> = HashIndex::new(8);
    let guard = crossbeam_epoch::pin();
    let bucket = index.bucket_of(b"0000000000001234000000ab");
    index.insert(bucket, 42, &guard);
    index.insert(bucket, 43, &guard);
    assert!(index.iter(bucket, &guard).any(|v| *v == 42));
    assert!(index.iter(bucket, &guard).any(|v| *v == 43));
    assert!(index.remove_if(bucket, |v| *v == 42, &guard));
    assert!(!index.remove_if(bucket, |v| *v == 42, &guard));
    assert!(index.iter(bucket, &guard).all(|v| *v != 42));
    assert!(index.iter(bucket, &guard).any(|v| *v == 43));
}

#[test]
fn bucket_selection_is_deterministic() {
    let a: HashIndex<u8> = HashIndex::new(16);
    let b: HashIndex<u8> = HashIndex::new(16);
    for key in [&b"00ff"[..], &b"1234"[..], &b"cafe"[..]] {
        assert_eq!(a.bucket_of(key), b.bucket_of(key));
        assert!(a.bucket_of(key) < 16);
    }
}
