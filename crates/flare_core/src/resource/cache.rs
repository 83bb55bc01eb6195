//! # Resource Cache
//!
//! Path-keyed lookup of loaded resources. The cache holds ids only, so it
//! never keeps a resource alive; an entry whose resource was torn down is
//! stale and counts as a miss.

use std::collections::HashMap;

use super::asset::{Asset, Resource};
use crate::error::CoreResult;
use crate::object::{ObjectArena, ObjectId};

/// Weak path → resource table.
///
/// # Example
///
/// ```rust
/// use std::error::Error;
/// use flare_core::object::ObjectArena;
/// use flare_core::resource::{Asset, ResourceCache};
///
/// #[derive(Default)]
/// struct Mesh;
///
/// impl Asset for Mesh {
///     const CLASS_NAME: &'static str = "Mesh";
///     fn load(&mut self, _path: &str) -> Result<usize, Box<dyn Error>> {
///         Ok(0)
///     }
/// }
///
/// let mut objects = ObjectArena::new();
/// let mut cache = ResourceCache::new();
///
/// let a = cache.load::<Mesh>(&mut objects, "crate.obj").unwrap();
/// let b = cache.load::<Mesh>(&mut objects, "crate.obj").unwrap();
/// assert_eq!(a, b);
/// assert_eq!(objects.ref_count(a), Some(2));
/// ```
#[derive(Debug, Default)]
pub struct ResourceCache {
    entries: HashMap<String, ObjectId>,
    hits: u64,
    misses: u64,
}

impl ResourceCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the resource for `path`, loading it if needed.
    ///
    /// A live cached `Resource<A>` is shared: its refcount is bumped and
    /// its id returned. Otherwise a new resource is loaded, cached under
    /// `path` (replacing any stale or differently typed entry) and
    /// returned with a refcount of 1.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ResourceLoad`](crate::CoreError::ResourceLoad)
    /// if a new resource fails to load. Nothing is created or cached then.
    pub fn load<A: Asset>(&mut self, objects: &mut ObjectArena, path: &str) -> CoreResult<ObjectId> {
        if let Some(id) = self.lookup::<A>(objects, path) {
            let count = objects.reference(id)?;
            self.hits += 1;
            tracing::trace!(path, object = %id, refs = count, "resource cache hit");
            return Ok(id);
        }

        self.misses += 1;
        let mut resource = Resource::<A>::new();
        resource.load(path)?;

        let id = objects.create(resource);
        self.entries.insert(path.to_owned(), id);
        tracing::debug!(path, object = %id, class = A::CLASS_NAME, "resource cached");
        Ok(id)
    }

    /// Returns the live cached `Resource<A>` for `path` without taking a
    /// reference.
    #[must_use]
    pub fn lookup<A: Asset>(&self, objects: &ObjectArena, path: &str) -> Option<ObjectId> {
        let id = *self.entries.get(path)?;
        objects.is::<Resource<A>>(id).then_some(id)
    }

    /// Forgets every entry. Cached resources stay alive as long as someone
    /// holds them; they just cannot be found through the cache anymore.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Drops entries whose resource was torn down. Returns how many.
    pub fn prune(&mut self, objects: &ObjectArena) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, id| objects.is_alive(*id));
        before - self.entries.len()
    }

    /// Number of entries, stale ones included.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the cache has no entries.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Loads served from the cache.
    #[inline]
    #[must_use]
    pub const fn hits(&self) -> u64 {
        self.hits
    }

    /// Loads that created a new resource.
    #[inline]
    #[must_use]
    pub const fn misses(&self) -> u64 {
        self.misses
    }
}
