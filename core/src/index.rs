use std::{borrow::Borrow, iter::Flatten, slice};

use crate::{
    error::{CnpError, CnpResult},
    hash::HashFunction,
};

/// The entries sharing a slot, in insertion order.
type Bucket<K, V> = Vec<(K, V)>;

/// The outcome of a search in the index.
#[derive(Debug, PartialEq, Eq)]
pub struct Probe<'a, V> {
    /// The value of the first entry matching the key, if any.
    pub value: Option<&'a V>,
    /// The number of entries examined.
    /// On a miss, this is the length of the whole bucket.
    pub probes: usize,
}

impl<V> Probe<'_, V> {
    pub fn is_found(&self) -> bool {
        self.value.is_some()
    }
}

/// How the entries are spread over the buckets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BucketDistribution {
    pub capacity: usize,
    pub entries: usize,
    pub occupied: usize,
    pub longest: usize,
}

impl BucketDistribution {
    pub fn empty(&self) -> usize {
        self.capacity - self.occupied
    }

    pub fn load_factor(&self) -> f64 {
        self.entries as f64 / self.capacity as f64
    }

    /// The average length of the non-empty buckets.
    pub fn average_chain(&self) -> f64 {
        if self.occupied == 0 {
            0.
        } else {
            self.entries as f64 / self.occupied as f64
        }
    }
}

/// A fixed-capacity hash index using separate chaining.
///
/// Keys are hashed with a [`HashFunction`] over their bytes. Entries are appended to their bucket:
/// there is no uniqueness check, so inserting a key twice stores two entries and searches return the
/// first one. The index never resizes.
pub struct ChainedIndex<K, V> {
    buckets: Vec<Bucket<K, V>>,
    len: usize,
    hash_function: HashFunction,
}

impl<K: AsRef<[u8]>, V> ChainedIndex<K, V> {
    /// Creates an index with `capacity` empty buckets.
    pub fn new(capacity: usize, hash_function: HashFunction) -> CnpResult<Self> {
        if capacity == 0 {
            return Err(CnpError::Capacity);
        }

        let mut buckets = Vec::new();
        buckets.resize_with(capacity, Vec::new);

        Ok(Self {
            buckets,
            len: 0,
            hash_function,
        })
    }

    /// Returns the slot a key is stored in.
    #[inline]
    pub fn slot<Q: AsRef<[u8]> + ?Sized>(&self, key: &Q) -> usize {
        self.hash_function.hash(key.as_ref(), self.buckets.len())
    }

    /// Appends an entry to the bucket of its key.
    pub fn insert(&mut self, key: K, value: V) {
        let slot = self.slot(&key);
        self.buckets[slot].push((key, value));
        self.len += 1;
    }

    /// Scans the bucket of a key from the front, counting every entry examined.
    pub fn search<Q>(&self, key: &Q) -> Probe<'_, V>
    where
        K: Borrow<Q>,
        Q: AsRef<[u8]> + PartialEq + ?Sized,
    {
        let bucket = &self.buckets[self.slot(key)];

        match bucket
            .iter()
            .position(|(k, _)| <K as Borrow<Q>>::borrow(k) == key)
        {
            Some(position) => Probe {
                value: Some(&bucket[position].1),
                probes: position + 1,
            },
            None => Probe {
                value: None,
                probes: bucket.len(),
            },
        }
    }
}

impl<K, V> ChainedIndex<K, V> {
    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of buckets.
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    pub fn hash_function(&self) -> HashFunction {
        self.hash_function
    }

    pub fn load_factor(&self) -> f64 {
        self.len as f64 / self.capacity() as f64
    }

    /// Returns the number of entries in the given slot.
    pub fn bucket_len(&self, slot: usize) -> usize {
        self.buckets.get(slot).map_or(0, Vec::len)
    }

    pub fn max_bucket_len(&self) -> usize {
        self.buckets.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn occupied_buckets(&self) -> usize {
        self.buckets.iter().filter(|bucket| !bucket.is_empty()).count()
    }

    pub fn distribution(&self) -> BucketDistribution {
        BucketDistribution {
            capacity: self.capacity(),
            entries: self.len,
            occupied: self.occupied_buckets(),
            longest: self.max_bucket_len(),
        }
    }

    /// Returns an iterator over the entries, bucket by bucket.
    pub fn iter(&self) -> Entries<'_, K, V> {
        self.into_iter()
    }
}

impl<K: AsRef<[u8]>, V> Extend<(K, V)> for ChainedIndex<K, V> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<'a, K, V> IntoIterator for &'a ChainedIndex<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Entries<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        Entries {
            inner: self.buckets.iter().flatten(),
        }
    }
}

pub struct Entries<'a, K, V> {
    inner: Flatten<slice::Iter<'a, Bucket<K, V>>>,
}

impl<'a, K, V> Iterator for Entries<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, value)| (key, value))
    }
}
