//! # Class Registry
//!
//! Name-based instantiation for layers that only know a class by its tag
//! (scene files, scripts). The core itself never instantiates through it.

use std::collections::HashMap;

use super::arena::ObjectArena;
use super::class::ObjectClass;
use super::id::ObjectId;
use crate::error::{CoreError, CoreResult};

/// Builds a fresh payload for a registered class.
pub type Constructor = fn() -> Box<dyn ObjectClass>;

fn construct_default<T: ObjectClass + Default>() -> Box<dyn ObjectClass> {
    Box::new(T::default())
}

/// Tag → constructor table.
///
/// # Example
///
/// ```rust
/// use flare_core::object::{BaseObject, ClassRegistry, ObjectArena};
///
/// let mut classes = ClassRegistry::new();
/// classes.register_default::<BaseObject>("Object");
///
/// let mut objects = ObjectArena::new();
/// let id = classes.instantiate("Object", &mut objects).unwrap();
/// assert_eq!(objects.class_name(id), Some("Object"));
/// ```
#[derive(Debug, Default)]
pub struct ClassRegistry {
    constructors: HashMap<String, Constructor>,
}

impl ClassRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a constructor under `name`.
    ///
    /// Returns the constructor previously registered under that name.
    pub fn register(&mut self, name: impl Into<String>, constructor: Constructor) -> Option<Constructor> {
        let name = name.into();
        let previous = self.constructors.insert(name.clone(), constructor);
        if previous.is_some() {
            tracing::warn!(class = %name, "class re-registered, previous constructor replaced");
        }
        previous
    }

    /// Registers `T::default` under `name`.
    pub fn register_default<T: ObjectClass + Default>(&mut self, name: impl Into<String>) -> Option<Constructor> {
        self.register(name, construct_default::<T>)
    }

    /// Returns true if `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered classes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }

    /// Builds a payload without registering it anywhere.
    #[must_use]
    pub fn construct(&self, name: &str) -> Option<Box<dyn ObjectClass>> {
        self.constructors.get(name).map(|constructor| constructor())
    }

    /// Builds an object of class `name` in `objects`, refcount 1.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownClass`] if `name` is not registered.
    pub fn instantiate(&self, name: &str, objects: &mut ObjectArena) -> CoreResult<ObjectId> {
        let payload = self
            .construct(name)
            .ok_or_else(|| CoreError::UnknownClass(name.to_owned()))?;
        Ok(objects.create_boxed(payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::BaseObject;

    #[derive(Default)]
    struct Light {
        intensity: f32,
    }

    impl ObjectClass for Light {
        fn class_name(&self) -> &'static str {
            "Light"
        }
    }

    fn bright_light() -> Box<dyn ObjectClass> {
        Box::new(Light { intensity: 10.0 })
    }

    #[test]
    fn test_instantiate_by_name() {
        let mut classes = ClassRegistry::new();
        classes.register_default::<Light>("Light");

        let mut objects = ObjectArena::new();
        let id = classes.instantiate("Light", &mut objects).unwrap();

        assert!(objects.is::<Light>(id));
        assert_eq!(objects.ref_count(id), Some(1));
    }

    #[test]
    fn test_custom_constructor() {
        let mut classes = ClassRegistry::new();
        classes.register("BrightLight", bright_light);

        let mut objects = ObjectArena::new();
        let id = classes.instantiate("BrightLight", &mut objects).unwrap();
        assert_eq!(objects.get::<Light>(id).unwrap().intensity, 10.0);
    }

    #[test]
    fn test_unknown_class() {
        let classes = ClassRegistry::new();
        let mut objects = ObjectArena::new();

        let err = classes.instantiate("Ghost", &mut objects).unwrap_err();
        assert_eq!(err, CoreError::UnknownClass("Ghost".into()));
        assert_eq!(objects.live_count(), 0);
    }

    #[test]
    fn test_reregister_replaces() {
        let mut classes = ClassRegistry::new();
        assert!(classes.register_default::<BaseObject>("Thing").is_none());
        assert!(classes.register_default::<Light>("Thing").is_some());

        assert_eq!(classes.len(), 1);
        assert_eq!(classes.construct("Thing").unwrap().class_name(), "Light");
        assert_eq!(classes.names(), vec!["Thing"]);
    }
}
