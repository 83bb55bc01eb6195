//! # Resources
//!
//! Loadable assets as objects, shared through a path-keyed cache.
//!
//! ```text
//! cache.load::<Texture>("wall.png")
//!        │
//!        ├─ live Resource<Texture> cached? ── yes ──> reference(), same id
//!        │
//!        └─ no ──> Resource::load() ──> arena.create() ──> cache id, refcount 1
//! ```

mod asset;
mod cache;

pub use asset::{Asset, FileAsset, Resource};
pub use cache::ResourceCache;
