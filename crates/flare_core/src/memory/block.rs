//! # Blocks
//!
//! A block is a fixed-length byte buffer handed out by a pool. Its identity
//! is the address of its heap storage, which never moves for as long as the
//! block exists.

use std::fmt;

use bytemuck::{Pod, PodCastError};

/// Address of a block's storage. Used as the block's identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockAddr(usize);

impl BlockAddr {
    /// Returns the raw address value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> usize {
        self.0
    }
}

impl fmt::Display for BlockAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// An owned, fixed-length byte buffer.
///
/// Pooled blocks must be handed back with
/// [`SizeClassAllocator::free`](super::SizeClassAllocator::free) to be
/// recycled. Dropping a block instead releases its memory to the system and
/// leaves the issuing pool counting it as allocated.
///
/// Every block carries the tag of the pool that created it, so a pool
/// recognizes its own blocks even when the system allocator reuses the
/// address of a dropped one.
pub struct Block {
    data: Box<[u8]>,
    /// Tag of the issuing pool; [`Block::UNPOOLED`] for bypass blocks.
    origin: u64,
}

impl Block {
    /// Origin tag of blocks no pool created.
    pub(crate) const UNPOOLED: u64 = 0;

    /// Creates a zero-filled unpooled block of exactly `len` bytes.
    #[must_use]
    pub(crate) fn zeroed(len: usize) -> Self {
        Self::with_origin(len, Self::UNPOOLED)
    }

    /// Creates a zero-filled block owned by the pool tagged `origin`.
    #[must_use]
    pub(crate) fn with_origin(len: usize, origin: u64) -> Self {
        Self {
            data: vec![0u8; len].into_boxed_slice(),
            origin,
        }
    }

    /// Tag of the pool that created this block.
    #[inline]
    #[must_use]
    pub(crate) const fn origin(&self) -> u64 {
        self.origin
    }

    /// Returns true if a pool created this block.
    #[inline]
    #[must_use]
    pub const fn is_pooled(&self) -> bool {
        self.origin != Self::UNPOOLED
    }

    /// Returns the block length in bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true for a zero-length block.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the block's identity.
    #[inline]
    #[must_use]
    pub fn addr(&self) -> BlockAddr {
        BlockAddr(self.data.as_ptr() as usize)
    }

    /// Returns the block contents.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Returns the block contents mutably.
    #[inline]
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Views the block as a slice of plain-old-data values.
    ///
    /// # Errors
    ///
    /// Fails when the block length is not a multiple of `size_of::<T>()` or
    /// the storage is not aligned for `T`.
    pub fn view<T: Pod>(&self) -> Result<&[T], PodCastError> {
        bytemuck::try_cast_slice(&self.data)
    }

    /// Mutable counterpart of [`Block::view`].
    ///
    /// # Errors
    ///
    /// Same conditions as [`Block::view`].
    pub fn view_mut<T: Pod>(&mut self) -> Result<&mut [T], PodCastError> {
        bytemuck::try_cast_slice_mut(&mut self.data)
    }

    /// Fills the block with zeroes.
    #[inline]
    pub(crate) fn zero(&mut self) {
        self.data.fill(0);
    }
}

impl fmt::Debug for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Block")
            .field("addr", &self.addr())
            .field("len", &self.len())
            .field("pooled", &self.is_pooled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_zeroed() {
        let block = Block::zeroed(64);
        assert_eq!(block.len(), 64);
        assert!(block.as_bytes().iter().all(|&b| b == 0));
        assert!(!block.is_pooled());
    }

    #[test]
    fn test_block_origin() {
        let block = Block::with_origin(32, 7);
        assert_eq!(block.origin(), 7);
        assert!(block.is_pooled());
    }

    #[test]
    fn test_block_zero_after_write() {
        let mut block = Block::zeroed(16);
        block.as_bytes_mut()[3] = 0xAB;
        block.zero();
        assert!(block.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_block_view_rejects_ragged_length() {
        let block = Block::zeroed(7);
        assert!(block.view::<u32>().is_err());
        assert_eq!(block.view::<u8>().unwrap().len(), 7);
    }
}
