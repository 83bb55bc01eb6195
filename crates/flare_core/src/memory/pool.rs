//! # Pool
//!
//! Fixed-size block pool. Every block a pool has ever created is either on
//! its free list or recorded in its allocated set, never both.

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};

use super::block::{Block, BlockAddr};

/// Minimum number of blocks added by a single growth step.
pub const MIN_GROWTH: usize = 8;

/// Source of pool tags. 0 is reserved for unpooled blocks.
static NEXT_POOL_TAG: AtomicU64 = AtomicU64::new(1);

/// A pool of equally sized blocks.
///
/// Blocks are created on demand and recycled forever after: a freed block
/// is zeroed and queued for reuse, oldest first. Growth only appends new
/// blocks, so a block's address never changes while it is issued.
///
/// # Thread Safety
///
/// This pool is NOT thread-safe. It belongs to the frame's owner thread.
///
/// # Example
///
/// ```rust
/// use flare_core::memory::Pool;
///
/// let mut pool = Pool::new(64);
/// let block = pool.allocate();
/// assert_eq!(block.len(), 64);
/// assert!(pool.free(block));
/// ```
#[derive(Debug)]
pub struct Pool {
    /// Length of every block in this pool.
    block_size: usize,
    /// Process-unique tag stamped on every block this pool creates.
    tag: u64,
    /// Blocks ready for reuse, oldest first.
    free_list: VecDeque<Block>,
    /// Addresses of blocks currently issued.
    allocated: HashSet<BlockAddr>,
    /// Total bytes ever served.
    cumulative_bytes: u64,
    /// Number of times the pool had to create blocks.
    growth_events: u32,
}

impl Pool {
    /// Creates an empty pool. Blocks are created on first allocation.
    ///
    /// # Panics
    ///
    /// Panics if `block_size` is zero.
    #[must_use]
    pub fn new(block_size: usize) -> Self {
        assert!(block_size > 0, "Block size must be greater than zero");

        Self {
            block_size,
            tag: NEXT_POOL_TAG.fetch_add(1, Ordering::Relaxed),
            free_list: VecDeque::new(),
            allocated: HashSet::new(),
            cumulative_bytes: 0,
            growth_events: 0,
        }
    }

    /// Creates a pool with `count` blocks already on the free list.
    ///
    /// Pre-growing does not count as a growth event.
    ///
    /// # Panics
    ///
    /// Panics if `block_size` is zero.
    #[must_use]
    pub fn with_blocks(block_size: usize, count: usize) -> Self {
        let mut pool = Self::new(block_size);
        pool.push_new_blocks(count);
        pool
    }

    /// Returns the length of every block in this pool.
    #[inline]
    #[must_use]
    pub const fn block_size(&self) -> usize {
        self.block_size
    }

    /// Returns the number of issued blocks.
    #[inline]
    #[must_use]
    pub fn allocated_count(&self) -> usize {
        self.allocated.len()
    }

    /// Returns the number of blocks waiting on the free list.
    #[inline]
    #[must_use]
    pub fn free_count(&self) -> usize {
        self.free_list.len()
    }

    /// Returns the number of blocks this pool has ever created.
    #[inline]
    #[must_use]
    pub fn total_blocks(&self) -> usize {
        self.allocated.len() + self.free_list.len()
    }

    /// Returns the bytes currently issued.
    #[inline]
    #[must_use]
    pub fn allocated_bytes(&self) -> usize {
        self.allocated.len() * self.block_size
    }

    /// Returns the bytes ever served by this pool.
    #[inline]
    #[must_use]
    pub const fn cumulative_bytes(&self) -> u64 {
        self.cumulative_bytes
    }

    /// Returns how many times the pool grew on demand.
    #[inline]
    #[must_use]
    pub const fn growth_events(&self) -> u32 {
        self.growth_events
    }

    /// Returns true if `block` was created by this pool and is currently
    /// issued.
    #[inline]
    #[must_use]
    pub fn owns(&self, block: &Block) -> bool {
        block.origin() == self.tag
            && block.len() == self.block_size
            && self.allocated.contains(&block.addr())
    }

    /// Issues a zeroed block, growing the pool first if no block is free.
    ///
    /// Growth adds `max(8, allocated / 2)` blocks.
    pub fn allocate(&mut self) -> Block {
        if self.free_list.is_empty() {
            self.grow();
        }

        let block = match self.free_list.pop_front() {
            Some(block) => block,
            // grow() always pushes at least MIN_GROWTH blocks
            None => Block::with_origin(self.block_size, self.tag),
        };

        if !self.allocated.insert(block.addr()) {
            // The previous holder of this address was dropped, not freed.
            tracing::warn!(
                block = %block.addr(),
                pool = self.block_size,
                "reissuing the address of a block that was dropped without free"
            );
        }
        self.cumulative_bytes += self.block_size as u64;

        block
    }

    /// Takes a block back.
    ///
    /// A block issued by this pool is zeroed and queued for reuse. Any other
    /// block is not recognized: it is dropped, logged, and the pool is left
    /// untouched. Recognition needs the pool's tag and the pool's block
    /// length, not just a known address.
    ///
    /// # Returns
    ///
    /// `true` if the block was recycled.
    pub fn free(&mut self, mut block: Block) -> bool {
        let addr = block.addr();
        if !self.owns(&block) || !self.allocated.remove(&addr) {
            tracing::warn!(
                block = %addr,
                len = block.len(),
                pool = self.block_size,
                "ignoring free of a block this pool did not issue"
            );
            return false;
        }

        block.zero();
        self.free_list.push_back(block);
        true
    }

    /// Fraction of created blocks currently issued, in percent.
    ///
    /// Returns `0.0` for a pool that has no blocks at all.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn efficiency(&self) -> f64 {
        let total = self.total_blocks();
        if total == 0 {
            return 0.0;
        }
        self.allocated.len() as f64 / total as f64 * 100.0
    }

    fn grow(&mut self) {
        let count = (self.allocated.len() / 2).max(MIN_GROWTH);
        self.push_new_blocks(count);
        self.growth_events += 1;

        tracing::debug!(
            pool = self.block_size,
            added = count,
            total = self.total_blocks(),
            "pool grew"
        );
    }

    fn push_new_blocks(&mut self, count: usize) {
        self.free_list.reserve(count);
        for _ in 0..count {
            self.free_list.push_back(Block::with_origin(self.block_size, self.tag));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_allocate_free() {
        let mut pool = Pool::new(64);

        let block = pool.allocate();
        assert_eq!(block.len(), 64);
        assert_eq!(pool.allocated_count(), 1);
        assert_eq!(pool.allocated_bytes(), 64);

        assert!(pool.free(block));
        assert_eq!(pool.allocated_count(), 0);
        assert_eq!(pool.allocated_bytes(), 0);
    }

    #[test]
    fn test_pool_first_growth_is_minimum() {
        let mut pool = Pool::new(32);
        let _block = pool.allocate();

        assert_eq!(pool.growth_events(), 1);
        assert_eq!(pool.total_blocks(), MIN_GROWTH);
        assert_eq!(pool.free_count(), MIN_GROWTH - 1);
    }

    #[test]
    fn test_pool_growth_is_half_of_allocated() {
        let mut pool = Pool::with_blocks(16, 32);
        let held: Vec<Block> = (0..32).map(|_| pool.allocate()).collect();
        assert_eq!(pool.growth_events(), 0);
        assert_eq!(pool.free_count(), 0);

        let _next = pool.allocate();
        assert_eq!(pool.growth_events(), 1);
        assert_eq!(pool.total_blocks(), 32 + 16);
        assert_eq!(held.len(), 32);
    }

    #[test]
    fn test_pool_reuse_is_fifo_and_zeroed() {
        let mut pool = Pool::with_blocks(8, 2);

        let mut first = pool.allocate();
        let first_addr = first.addr();
        first.as_bytes_mut().fill(0xFF);
        assert!(pool.free(first));

        // The untouched pre-grown block is older than the freed one.
        let second = pool.allocate();
        assert_ne!(second.addr(), first_addr);

        let third = pool.allocate();
        assert_eq!(third.addr(), first_addr);
        assert!(third.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_pool_ignores_foreign_block() {
        let mut pool = Pool::new(64);
        let _held = pool.allocate();
        let foreign = Block::zeroed(64);

        assert!(!pool.free(foreign));
        assert_eq!(pool.allocated_count(), 1);
        assert_eq!(pool.free_count(), MIN_GROWTH - 1);
    }

    #[test]
    fn test_pool_rejects_wrong_length_block() {
        let mut pool = Pool::new(128);
        let _held = pool.allocate();
        let oversized = Block::with_origin(129, pool.tag);

        assert!(!pool.free(oversized));
        assert_eq!(pool.allocated_count(), 1);
        assert_eq!(pool.free_count(), MIN_GROWTH - 1);
    }

    #[test]
    fn test_pool_rejects_same_size_block_of_another_pool() {
        let mut ours = Pool::new(64);
        let mut theirs = Pool::new(64);
        let _held = ours.allocate();
        let stranger = theirs.allocate();

        assert!(!ours.owns(&stranger));
        assert!(!ours.free(stranger));
        assert_eq!(ours.allocated_count(), 1);
        assert_eq!(theirs.allocated_count(), 1);
    }

    #[test]
    fn test_pool_efficiency() {
        let mut pool = Pool::new(64);
        assert_eq!(pool.efficiency(), 0.0);

        let _held = pool.allocate();
        let expected = 100.0 / MIN_GROWTH as f64;
        assert!((pool.efficiency() - expected).abs() < 1e-9);
    }
}
