//! # Object Model
//!
//! Reference-counted objects with identity, typed signals and metadata.
//!
//! ## Design Philosophy
//!
//! - Objects live in one arena and are addressed by [`ObjectId`]
//! - Ids are never reused; a destroyed object leaves a tombstone
//! - Lifetime is driven only by the object's own refcount
//! - Handlers are isolated: one failing handler never silences the rest

mod arena;
mod class;
mod factory;
mod id;
mod signal;

pub use arena::ObjectArena;
pub use class::{AsAny, BaseObject, ObjectClass};
pub use factory::{ClassRegistry, Constructor};
pub use id::ObjectId;
pub use signal::{Emission, Handler, HandlerResult, Signal};
