//! # FLARE Core Engine
//!
//! Memory and object lifecycle layer for engines running in 256–512MB:
//! - Size-classed block pools with no fragmentation and zeroed reuse
//! - Reference-counted objects with typed signals and metadata
//! - Loadable resources shared through a path-keyed cache
//!
//! ## Architecture Rules
//!
//! 1. **One owner thread** - Nothing here locks; nothing here is `Sync`
//! 2. **Explicit context** - No globals; [`Context`] is built once and passed down
//! 3. **Die exactly once** - Only an object's own refcount can destroy it
//!
//! ## Example
//!
//! ```rust
//! use flare_core::{Context, CoreConfig};
//! use flare_core::object::BaseObject;
//!
//! let mut ctx = Context::new(&CoreConfig::default()).unwrap();
//! let block = ctx.allocator.allocate(100);
//! assert_eq!(block.len(), 256);
//!
//! let id = ctx.objects.create(BaseObject);
//! ctx.objects.unreference(id).unwrap();
//! assert!(!ctx.objects.is_alive(id));
//! # ctx.allocator.free(block, 256);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
mod context;
mod error;
pub mod memory;
pub mod object;
pub mod resource;

pub use config::{CoreConfig, MemoryConfig, ObjectConfig};
pub use context::Context;
pub use error::{CoreError, CoreResult};
pub use memory::{Block, MemoryReport, SizeClassAllocator};
pub use object::{Emission, Handler, HandlerResult, ObjectArena, ObjectClass, ObjectId, Signal};
pub use resource::{Asset, Resource, ResourceCache};
