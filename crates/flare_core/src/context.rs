//! # Engine Context
//!
//! The one place the core's state lives. Built once at startup, passed by
//! reference to every subsystem, and consumed at shutdown.

use crate::config::CoreConfig;
use crate::error::CoreResult;
use crate::memory::{MemoryReport, SizeClassAllocator};
use crate::object::{ClassRegistry, ObjectArena, ObjectId};
use crate::resource::{Asset, ResourceCache};

/// Allocator, object arena, class registry and resource cache.
///
/// Fields are public so subsystems can borrow the parts they need
/// independently.
///
/// # Example
///
/// ```rust
/// use flare_core::{Context, CoreConfig};
///
/// let mut ctx = Context::new(&CoreConfig::default()).unwrap();
/// let block = ctx.allocator.allocate(100);
/// ctx.allocator.free(block, 256);
/// let report = ctx.shutdown();
/// assert_eq!(report.total_allocations, 1);
/// ```
#[derive(Debug)]
pub struct Context {
    /// Pooled block allocator.
    pub allocator: SizeClassAllocator,
    /// Every live object.
    pub objects: ObjectArena,
    /// Name-based constructors for external layers.
    pub classes: ClassRegistry,
    /// Path-keyed resource lookup.
    pub resources: ResourceCache,
}

impl Context {
    /// Builds the core from its configuration.
    ///
    /// # Errors
    ///
    /// Fails if the memory configuration is invalid.
    pub fn new(config: &CoreConfig) -> CoreResult<Self> {
        let allocator = SizeClassAllocator::new(&config.memory)?;

        tracing::info!(
            size_classes = ?config.memory.size_classes,
            initial_blocks = config.memory.initial_blocks,
            "core context initialized"
        );

        Ok(Self {
            allocator,
            objects: ObjectArena::with_capacity(config.objects.initial_capacity),
            classes: ClassRegistry::new(),
            resources: ResourceCache::new(),
        })
    }

    /// Shorthand for [`ResourceCache::load`] against this context's arena.
    ///
    /// # Errors
    ///
    /// Fails if a new resource cannot be loaded.
    pub fn load_resource<A: Asset>(&mut self, path: &str) -> CoreResult<ObjectId> {
        self.resources.load::<A>(&mut self.objects, path)
    }

    /// Shorthand for [`ClassRegistry::instantiate`] against this context's
    /// arena.
    ///
    /// # Errors
    ///
    /// Fails if `name` is not registered.
    pub fn instantiate(&mut self, name: &str) -> CoreResult<ObjectId> {
        self.classes.instantiate(name, &mut self.objects)
    }

    /// Tears the context down and returns the final memory report.
    ///
    /// Objects still alive at this point were never released by their
    /// holders; they are reported, not destroyed.
    #[must_use]
    pub fn shutdown(self) -> MemoryReport {
        let leaked = self.objects.live_count();
        if leaked > 0 {
            tracing::warn!(leaked, "objects still referenced at shutdown");
        }

        let report = self.allocator.report();
        tracing::info!(
            total_allocations = report.total_allocations,
            current_bytes = report.current_bytes,
            peak_bytes = report.peak_bytes,
            "core context shut down"
        );
        report
    }
}
