//! # Memory Management
//!
//! Size-classed block pools for fragmentation-free allocation.
//!
//! ## Design Philosophy
//!
//! Every request is rounded up to one of a handful of fixed block sizes:
//! - Blocks are recycled, never returned to the system
//! - Freed blocks are zeroed before reuse
//! - Oversized requests bypass pooling and are reported, not refused

mod allocator;
mod block;
mod pool;
mod report;

pub use allocator::SizeClassAllocator;
pub use block::{Block, BlockAddr};
pub use pool::{Pool, MIN_GROWTH};
pub use report::{ClassReport, MemoryReport};
