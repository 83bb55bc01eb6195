//! # Memory Report
//!
//! Point-in-time snapshot of allocator state, printable as the
//! human-readable report emitted on demand and at shutdown.

use std::fmt;

/// Occupancy of one size class.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassReport {
    /// Block size of the class in bytes.
    pub block_size: usize,
    /// Blocks currently issued.
    pub allocated_blocks: usize,
    /// Blocks waiting for reuse.
    pub free_blocks: usize,
    /// `allocated / (allocated + free) * 100`, or 0 for an untouched class.
    pub efficiency: f64,
}

/// Snapshot of the whole allocator.
#[derive(Clone, Debug, PartialEq)]
pub struct MemoryReport {
    /// Number of allocation requests served, pooled or not.
    pub total_allocations: u64,
    /// Pooled bytes currently issued.
    pub current_bytes: usize,
    /// Highest value `current_bytes` has reached.
    pub peak_bytes: usize,
    /// Requests that bypassed pooling.
    pub bypass_allocations: u64,
    /// Bytes handed out by bypass requests.
    pub bypass_bytes: u64,
    /// Per-class occupancy, ascending by block size.
    pub classes: Vec<ClassReport>,
}

impl MemoryReport {
    /// Looks up the report for one size class.
    #[must_use]
    pub fn class(&self, block_size: usize) -> Option<&ClassReport> {
        self.classes.iter().find(|c| c.block_size == block_size)
    }
}

#[allow(clippy::cast_precision_loss)]
fn kib(bytes: usize) -> f64 {
    bytes as f64 / 1024.0
}

impl fmt::Display for MemoryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Memory Report ===")?;
        writeln!(f, "Total allocations: {}", self.total_allocations)?;
        writeln!(f, "Current memory:    {:.2} KiB", kib(self.current_bytes))?;
        writeln!(f, "Peak memory:       {:.2} KiB", kib(self.peak_bytes))?;
        writeln!(
            f,
            "Unpooled:          {} allocations, {} bytes",
            self.bypass_allocations, self.bypass_bytes
        )?;
        for class in &self.classes {
            writeln!(
                f,
                "  {:>6}B: {} used, {} free ({:.1}% efficiency)",
                class.block_size, class.allocated_blocks, class.free_blocks, class.efficiency
            )?;
        }
        Ok(())
    }
}
