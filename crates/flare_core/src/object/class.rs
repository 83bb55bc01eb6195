//! # Object Classes
//!
//! Every object in the arena carries a payload implementing [`ObjectClass`].
//! The payload is the "subclass" part of the object; identity, refcount,
//! signals and metadata are kept by the arena around it.

use std::any::Any;

/// Upcast helper so payloads can be downcast to their concrete type.
///
/// Implemented for every `'static` type; never implement it by hand.
pub trait AsAny: Any {
    /// Returns `self` as `&dyn Any`.
    fn as_any(&self) -> &dyn Any;
    /// Returns `self` as `&mut dyn Any`.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// The type-specific part of an object.
///
/// # Example
///
/// ```rust
/// use flare_core::object::ObjectClass;
///
/// #[derive(Default)]
/// struct Sprite {
///     frame: u32,
/// }
///
/// impl ObjectClass for Sprite {
///     fn class_name(&self) -> &'static str {
///         "Sprite"
///     }
/// }
/// ```
pub trait ObjectClass: AsAny {
    /// Name of the class, used in logs and introspection.
    fn class_name(&self) -> &'static str;

    /// Called exactly once, when the object's refcount reaches zero and
    /// before its signals and metadata are dropped.
    fn on_teardown(&mut self) {}
}

/// Plain object with no payload of its own.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BaseObject;

impl ObjectClass for BaseObject {
    fn class_name(&self) -> &'static str {
        "Object"
    }
}
