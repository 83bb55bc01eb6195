//! # Size-Class Allocator
//!
//! Routes byte requests to the smallest pool that fits them. Requests above
//! the largest class bypass pooling entirely.

use super::block::Block;
use super::pool::Pool;
use super::report::{ClassReport, MemoryReport};
use crate::config::MemoryConfig;
use crate::error::CoreResult;

/// One pool per size class, plus aggregate accounting.
///
/// # Thread Safety
///
/// NOT thread-safe. Lives inside the engine [`Context`](crate::Context).
///
/// # Example
///
/// ```rust
/// use flare_core::config::MemoryConfig;
/// use flare_core::memory::SizeClassAllocator;
///
/// let mut allocator = SizeClassAllocator::new(&MemoryConfig::default()).unwrap();
/// let block = allocator.allocate(100);
/// assert_eq!(block.len(), 256);
/// allocator.free(block, 256);
/// ```
#[derive(Debug)]
pub struct SizeClassAllocator {
    /// Pools sorted by ascending block size.
    pools: Vec<Pool>,
    /// Requests served, pooled or not.
    total_allocations: u64,
    /// High-water mark of pooled bytes issued.
    peak_bytes: usize,
    /// Requests that bypassed pooling.
    bypass_allocations: u64,
    /// Bytes handed out by bypass requests.
    bypass_bytes: u64,
}

impl SizeClassAllocator {
    /// Builds one pool per configured size class.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidSizeClasses`](crate::CoreError::InvalidSizeClasses)
    /// if the classes are empty, contain zero, or are not strictly ascending.
    pub fn new(config: &MemoryConfig) -> CoreResult<Self> {
        config.validate()?;

        let pools = config
            .size_classes
            .iter()
            .map(|&size| Pool::with_blocks(size, config.initial_blocks))
            .collect();

        Ok(Self {
            pools,
            total_allocations: 0,
            peak_bytes: 0,
            bypass_allocations: 0,
            bypass_bytes: 0,
        })
    }

    /// Returns the configured size classes, ascending.
    pub fn size_classes(&self) -> impl Iterator<Item = usize> + '_ {
        self.pools.iter().map(Pool::block_size)
    }

    /// Returns the largest size class.
    #[must_use]
    pub fn max_class(&self) -> usize {
        self.pools.last().map_or(0, Pool::block_size)
    }

    /// Returns the size class that would serve a request of `size` bytes,
    /// or `None` if the request would bypass pooling.
    #[must_use]
    pub fn class_for(&self, size: usize) -> Option<usize> {
        self.pools
            .iter()
            .map(Pool::block_size)
            .find(|&class| class >= size)
    }

    /// Returns the pool for an exact size class.
    #[must_use]
    pub fn pool(&self, class: usize) -> Option<&Pool> {
        self.pools.iter().find(|p| p.block_size() == class)
    }

    /// Allocates a block of at least `size` bytes.
    ///
    /// The block comes from the smallest class that fits. Above the largest
    /// class a block of exactly `size` bytes is created outside every pool
    /// and a warning is logged; such a block is released by dropping it.
    pub fn allocate(&mut self, size: usize) -> Block {
        self.total_allocations += 1;

        let index = self.pools.iter().position(|p| p.block_size() >= size);
        let Some(index) = index else {
            self.bypass_allocations += 1;
            self.bypass_bytes += size as u64;
            tracing::warn!(
                size,
                max_class = self.max_class(),
                "allocation exceeds largest size class, bypassing pools"
            );
            return Block::zeroed(size);
        };

        let block = self.pools[index].allocate();
        self.peak_bytes = self.peak_bytes.max(self.total_memory_used());
        block
    }

    /// Returns a block to the pool of class `pool_size`.
    ///
    /// The caller must pass the class the block was allocated under; the
    /// claim is not cross-checked against the other pools. An unknown class
    /// is ignored and logged, as is a block the addressed pool did not
    /// issue. Either way the block is dropped.
    pub fn free(&mut self, block: Block, pool_size: usize) {
        match self.pools.iter_mut().find(|p| p.block_size() == pool_size) {
            Some(pool) => {
                pool.free(block);
            }
            None => {
                tracing::warn!(
                    block = %block.addr(),
                    pool_size,
                    "ignoring free to an unknown size class"
                );
            }
        }
    }

    /// Sum of bytes issued across all pools. Bypass blocks are excluded.
    #[must_use]
    pub fn total_memory_used(&self) -> usize {
        self.pools.iter().map(Pool::allocated_bytes).sum()
    }

    /// Returns the number of allocation requests served.
    #[inline]
    #[must_use]
    pub const fn total_allocations(&self) -> u64 {
        self.total_allocations
    }

    /// Returns the high-water mark of pooled bytes issued.
    #[inline]
    #[must_use]
    pub const fn peak_bytes(&self) -> usize {
        self.peak_bytes
    }

    /// Snapshots the allocator state.
    #[must_use]
    pub fn report(&self) -> MemoryReport {
        MemoryReport {
            total_allocations: self.total_allocations,
            current_bytes: self.total_memory_used(),
            peak_bytes: self.peak_bytes,
            bypass_allocations: self.bypass_allocations,
            bypass_bytes: self.bypass_bytes,
            classes: self
                .pools
                .iter()
                .map(|pool| ClassReport {
                    block_size: pool.block_size(),
                    allocated_blocks: pool.allocated_count(),
                    free_blocks: pool.free_count(),
                    efficiency: pool.efficiency(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MIN_GROWTH;

    fn allocator() -> SizeClassAllocator {
        SizeClassAllocator::new(&MemoryConfig::default()).unwrap()
    }

    #[test]
    fn test_routes_to_smallest_fitting_class() {
        let mut allocator = allocator();

        for (size, class) in [(1, 64), (64, 64), (65, 256), (100, 256), (1024, 1024), (16384, 16384)] {
            let block = allocator.allocate(size);
            assert_eq!(block.len(), class, "size {size}");
            allocator.free(block, class);
        }
    }

    #[test]
    fn test_zero_size_uses_smallest_class() {
        let mut allocator = allocator();
        assert_eq!(allocator.allocate(0).len(), 64);
    }

    #[test]
    fn test_oversized_bypasses_pools() {
        let mut allocator = allocator();
        let block = allocator.allocate(20_000);

        assert_eq!(block.len(), 20_000);
        assert_eq!(allocator.total_memory_used(), 0);
        assert_eq!(allocator.peak_bytes(), 0);
        assert!(allocator.report().classes.iter().all(|c| c.allocated_blocks == 0 && c.free_blocks == 0));
        assert_eq!(allocator.report().bypass_allocations, 1);
        assert_eq!(allocator.total_allocations(), 1);
    }

    #[test]
    fn test_peak_tracks_high_water_mark() {
        let mut allocator = allocator();
        let a = allocator.allocate(1000);
        let b = allocator.allocate(1000);
        assert_eq!(allocator.peak_bytes(), 2048);

        allocator.free(a, 1024);
        allocator.free(b, 1024);
        assert_eq!(allocator.total_memory_used(), 0);
        assert_eq!(allocator.peak_bytes(), 2048);
    }

    #[test]
    fn test_free_with_unknown_class_is_ignored() {
        let mut allocator = allocator();
        let block = allocator.allocate(10);
        allocator.free(block, 100);

        // The 64-byte pool still counts the block as issued.
        assert_eq!(allocator.pool(64).unwrap().allocated_count(), 1);
    }

    #[test]
    fn test_free_with_wrong_class_leaves_pools_untouched() {
        let mut allocator = allocator();
        let _warm = allocator.allocate(200);
        let block = allocator.allocate(10);
        allocator.free(block, 256);

        assert_eq!(allocator.pool(64).unwrap().allocated_count(), 1);
        assert_eq!(allocator.pool(256).unwrap().allocated_count(), 1);
    }

    #[test]
    fn test_report_scenario() {
        let mut allocator = allocator();
        let small = allocator.allocate(100);
        let big = allocator.allocate(20_000);
        assert_eq!(small.len(), 256);
        assert_eq!(big.len(), 20_000);

        let report = allocator.report();
        let class = report.class(256).unwrap();
        assert_eq!(class.allocated_blocks, 1);
        assert_eq!(class.free_blocks, MIN_GROWTH - 1);
        assert!((class.efficiency - 100.0 / MIN_GROWTH as f64).abs() < 1e-9);
        assert_eq!(report.class(64).unwrap().efficiency, 0.0);
        assert_eq!(report.total_allocations, 2);
        assert_eq!(report.current_bytes, 256);
    }

    #[test]
    fn test_initial_blocks() {
        let config = MemoryConfig {
            size_classes: vec![64],
            initial_blocks: 1,
        };
        let mut allocator = SizeClassAllocator::new(&config).unwrap();
        let _block = allocator.allocate(64);

        let class = allocator.report().classes[0].clone();
        assert_eq!(class.allocated_blocks, 1);
        assert_eq!(class.free_blocks, 0);
        assert_eq!(class.efficiency, 100.0);
    }

    #[test]
    fn test_class_for() {
        let allocator = allocator();
        assert_eq!(allocator.class_for(300), Some(1024));
        assert_eq!(allocator.class_for(16385), None);
        assert_eq!(allocator.max_class(), 16384);
        assert_eq!(allocator.size_classes().count(), 5);
    }
}
