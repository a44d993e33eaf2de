//! Thread-safe wrapper for sharing a quad tree between threads.
//!
//! `SyncQuadTree` wraps a [`QuadTree`] in `Arc<RwLock<_>>`. Queries take
//! the read lock and return owned clones of the matched objects, so no
//! borrow outlives the lock.
//!
//! # Features
//!
//! Enable the `sync` feature to use this module:
//!
//! ```toml
//! [dependencies]
//! geoindex = { version = "0.1", features = ["sync"] }
//! ```
//!
//! # Examples
//!
//! ```rust
//! use geoindex::{BoundingBox, Limit, SyncQuadTree, lat_lon};
//! use std::thread;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let tree = SyncQuadTree::new(12);
//!
//! let writer = tree.clone();
//! let handle = thread::spawn(move || {
//!     writer.put(lat_lon(45.07, 7.68), "001", "turin").unwrap();
//! });
//!
//! tree.put(lat_lon(45.46, 9.19), "002", "milan")?;
//! handle.join().unwrap();
//!
//! let area = BoundingBox::new(lat_lon(44.0, 6.0), lat_lon(46.0, 10.0));
//! assert_eq!(tree.get_in_area(&Limit(10), Some(&area)).items.len(), 2);
//! # Ok(())
//! # }
//! ```

use crate::config::IndexConfig;
use crate::error::Result;
use crate::quadtree::{QuadTree, QuadTreeStats};
use crate::search::{OwnedSearchResult, SearchFilter};
use geoindex_types::{BoundingShape, Located};
use parking_lot::RwLock;
use std::sync::Arc;

/// Thread-safe handle to a shared [`QuadTree`].
///
/// Cloning the handle shares the tree. Any number of threads may query at
/// once; `put` waits for exclusive access.
pub struct SyncQuadTree<T> {
    inner: Arc<RwLock<QuadTree<T>>>,
}

impl<T> Clone for SyncQuadTree<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Located> SyncQuadTree<T> {
    pub fn new(max_level: u32) -> Self {
        Self::from_tree(QuadTree::new(max_level))
    }

    pub fn with_config(config: &IndexConfig) -> Result<Self> {
        Ok(Self::from_tree(QuadTree::with_config(config)?))
    }

    /// Share an existing tree.
    pub fn from_tree(tree: QuadTree<T>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(tree)),
        }
    }

    /// Store `object` under `(rank, uid)`. See [`QuadTree::put`].
    pub fn put(&self, object: T, rank: impl Into<String>, uid: impl Into<String>) -> Result<()> {
        self.inner.write().put(object, rank, uid)
    }

    /// See [`QuadTree::get_in_area`].
    pub fn get_in_area<F, S>(&self, filter: &F, shape: Option<&S>) -> OwnedSearchResult<T>
    where
        T: Clone,
        F: SearchFilter<T> + ?Sized,
        S: BoundingShape + ?Sized,
    {
        self.inner.read().get_in_area(filter, shape).cloned()
    }

    /// See [`QuadTree::linear_search`].
    pub fn linear_search<F, S>(&self, filter: &F, shape: Option<&S>) -> OwnedSearchResult<T>
    where
        T: Clone,
        F: SearchFilter<T> + ?Sized,
        S: BoundingShape + ?Sized,
    {
        self.inner.read().linear_search(filter, shape).cloned()
    }

    /// Run `f` against the tree under the read lock.
    pub fn read<R>(&self, f: impl FnOnce(&QuadTree<T>) -> R) -> R {
        f(&self.inner.read())
    }
}

impl<T> SyncQuadTree<T> {
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn stats(&self) -> QuadTreeStats {
        self.inner.read().stats()
    }

    /// Take the tree back if this is the last handle.
    pub fn into_inner(self) -> Option<QuadTree<T>> {
        Arc::into_inner(self.inner).map(|lock| lock.into_inner())
    }
}
