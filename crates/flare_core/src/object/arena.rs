//! # Object Arena
//!
//! The registry of every object in the process. Slots are indexed by id;
//! an object's slot holds its state while it is alive and a tombstone after
//! it is torn down. Liveness is a slot lookup, and because ids are never
//! reused a tombstone can never be mistaken for a newer object.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

use super::class::ObjectClass;
use super::id::ObjectId;
use super::signal::{dispatch, Emission, Handler, Signal, SignalTable};
use crate::error::{CoreError, CoreResult};

/// Everything the arena keeps for a live object.
struct ObjectEntry {
    ref_count: u32,
    type_id: TypeId,
    payload: Box<dyn ObjectClass>,
    signals: SignalTable,
    meta: HashMap<String, Box<dyn Any>>,
    script: Option<Box<dyn Any>>,
}

enum Slot {
    Live(Box<ObjectEntry>),
    Tombstone,
}

/// Reference-counted object registry.
///
/// Objects start with a refcount of 1. When [`ObjectArena::unreference`]
/// brings it to zero the object is torn down on the spot: its class hook
/// runs, its signals, metadata and script are dropped, and its slot becomes
/// a tombstone. Every later operation on the id fails with
/// [`CoreError::DeadObject`].
///
/// # Thread Safety
///
/// NOT thread-safe, and not `Send`: handlers are `Rc`-based. One owner
/// thread drives every object.
///
/// # Re-entrancy
///
/// Handlers only see their payload. A handler that reaches the arena by
/// other means (e.g. a captured `RefCell`) must not mutate the object that
/// is emitting.
///
/// # Example
///
/// ```rust
/// use flare_core::object::{BaseObject, ObjectArena};
///
/// let mut objects = ObjectArena::new();
/// let id = objects.create(BaseObject);
/// objects.reference(id).unwrap();
/// assert_eq!(objects.unreference(id).unwrap(), 1);
/// assert_eq!(objects.unreference(id).unwrap(), 0);
/// assert!(!objects.is_alive(id));
/// ```
pub struct ObjectArena {
    /// Slot `n` holds object id `n + 1`.
    slots: Vec<Slot>,
    /// Number of live slots.
    live: usize,
}

impl ObjectArena {
    /// Creates an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty arena with room for `capacity` objects.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            live: 0,
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Registers a new object with a refcount of 1.
    pub fn create<T: ObjectClass>(&mut self, payload: T) -> ObjectId {
        self.create_boxed(Box::new(payload))
    }

    /// Registers an already boxed payload with a refcount of 1.
    pub fn create_boxed(&mut self, payload: Box<dyn ObjectClass>) -> ObjectId {
        let type_id = payload.as_ref().as_any().type_id();
        let id = ObjectId::from_slot(self.slots.len());

        tracing::trace!(object = %id, class = payload.class_name(), "object created");

        self.slots.push(Slot::Live(Box::new(ObjectEntry {
            ref_count: 1,
            type_id,
            payload,
            signals: SignalTable::default(),
            meta: HashMap::new(),
            script: None,
        })));
        self.live += 1;
        id
    }

    /// Adds a strong reference. Returns the new refcount.
    ///
    /// # Errors
    ///
    /// Fails if the object is dead or unknown.
    pub fn reference(&mut self, id: ObjectId) -> CoreResult<u32> {
        let entry = self.entry_mut(id)?;
        entry.ref_count += 1;
        Ok(entry.ref_count)
    }

    /// Drops a strong reference. Returns the remaining refcount.
    ///
    /// When the count reaches zero the object is torn down before this
    /// returns, and `0` is returned.
    ///
    /// # Errors
    ///
    /// Fails if the object is dead or unknown; a second teardown is never
    /// attempted.
    pub fn unreference(&mut self, id: ObjectId) -> CoreResult<u32> {
        let entry = self.entry_mut(id)?;
        entry.ref_count = entry.ref_count.saturating_sub(1);
        if entry.ref_count > 0 {
            return Ok(entry.ref_count);
        }

        self.teardown(id);
        Ok(0)
    }

    fn teardown(&mut self, id: ObjectId) {
        let Some(index) = id.slot() else {
            return;
        };
        let Slot::Live(mut entry) = std::mem::replace(&mut self.slots[index], Slot::Tombstone) else {
            return;
        };

        entry.payload.on_teardown();
        entry.signals.clear();
        entry.meta.clear();
        entry.script = None;
        self.live -= 1;

        tracing::debug!(object = %id, class = entry.payload.class_name(), "object torn down");
    }

    /// Returns the refcount of a live object.
    #[must_use]
    pub fn ref_count(&self, id: ObjectId) -> Option<u32> {
        self.entry(id).ok().map(|e| e.ref_count)
    }

    // =========================================================================
    // Introspection
    // =========================================================================

    /// Returns true if `id` names a live object.
    #[must_use]
    pub fn is_alive(&self, id: ObjectId) -> bool {
        self.entry(id).is_ok()
    }

    /// Number of live objects.
    #[inline]
    #[must_use]
    pub const fn live_count(&self) -> usize {
        self.live
    }

    /// Number of ids ever issued, dead or alive.
    #[inline]
    #[must_use]
    pub fn issued_count(&self) -> usize {
        self.slots.len()
    }

    /// Iterates over the ids of live objects, oldest first.
    pub fn live_objects(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| matches!(slot, Slot::Live(_)))
            .map(|(index, _)| ObjectId::from_slot(index))
    }

    /// Class name of a live object.
    #[must_use]
    pub fn class_name(&self, id: ObjectId) -> Option<&'static str> {
        self.entry(id).ok().map(|e| e.payload.class_name())
    }

    /// Returns true if `id` is alive and its payload is exactly `T`.
    #[must_use]
    pub fn is<T: ObjectClass>(&self, id: ObjectId) -> bool {
        self.entry(id).is_ok_and(|e| e.type_id == TypeId::of::<T>())
    }

    /// Borrows the payload of a live object as `T`.
    #[must_use]
    pub fn get<T: ObjectClass>(&self, id: ObjectId) -> Option<&T> {
        let entry = self.entry(id).ok()?;
        entry.payload.as_ref().as_any().downcast_ref::<T>()
    }

    /// Mutably borrows the payload of a live object as `T`.
    pub fn get_mut<T: ObjectClass>(&mut self, id: ObjectId) -> Option<&mut T> {
        let entry = self.entry_mut(id).ok()?;
        entry.payload.as_mut().as_any_mut().downcast_mut::<T>()
    }

    // =========================================================================
    // Signals
    // =========================================================================

    /// Creates an empty channel if the object has none by that name.
    ///
    /// # Errors
    ///
    /// Fails if the object is dead or unknown.
    pub fn add_signal(&mut self, id: ObjectId, name: &str) -> CoreResult<()> {
        self.entry_mut(id)?.signals.add(name);
        Ok(())
    }

    /// Returns true if the object has a channel named `name`.
    #[must_use]
    pub fn has_signal(&self, id: ObjectId, name: &str) -> bool {
        self.entry(id).is_ok_and(|e| e.signals.has(name))
    }

    /// Number of handlers connected to a channel.
    #[must_use]
    pub fn handler_count(&self, id: ObjectId, name: &str) -> usize {
        self.entry(id).map_or(0, |e| e.signals.handler_count(name))
    }

    /// Connects a handler, creating the channel if needed.
    ///
    /// Returns `false` if this exact handler was already connected, or the
    /// channel carries a different payload type.
    ///
    /// # Errors
    ///
    /// Fails if the object is dead or unknown.
    pub fn connect<E: 'static>(
        &mut self,
        id: ObjectId,
        signal: Signal<E>,
        handler: &Handler<E>,
    ) -> CoreResult<bool> {
        Ok(self.entry_mut(id)?.signals.connect(signal, handler))
    }

    /// Disconnects a handler. Returns `false` if it was not connected.
    ///
    /// # Errors
    ///
    /// Fails if the object is dead or unknown.
    pub fn disconnect<E: 'static>(
        &mut self,
        id: ObjectId,
        signal: Signal<E>,
        handler: &Handler<E>,
    ) -> CoreResult<bool> {
        Ok(self.entry_mut(id)?.signals.disconnect(signal, handler))
    }

    /// Delivers `payload` to every handler of the channel, in connection
    /// order.
    ///
    /// Handler errors are logged with the channel name and counted in the
    /// returned [`Emission`]; they never stop delivery. Emitting on a dead
    /// object or a missing channel delivers nothing.
    pub fn emit<E: 'static>(&self, id: ObjectId, signal: Signal<E>, payload: &E) -> Emission {
        let Ok(entry) = self.entry(id) else {
            tracing::debug!(object = %id, signal = signal.name(), "emit on a dead object ignored");
            return Emission::default();
        };

        match entry.signals.handlers(signal) {
            Some(handlers) => dispatch(signal, &handlers, payload),
            None => Emission::default(),
        }
    }

    // =========================================================================
    // Metadata
    // =========================================================================

    /// Stores a metadata value, replacing any previous value for `key`.
    ///
    /// # Errors
    ///
    /// Fails if the object is dead or unknown.
    pub fn set_meta<V: Any>(&mut self, id: ObjectId, key: &str, value: V) -> CoreResult<()> {
        self.entry_mut(id)?.meta.insert(key.to_owned(), Box::new(value));
        Ok(())
    }

    /// Reads a metadata value.
    ///
    /// Returns `default` when the object is dead, the key is absent, or the
    /// stored value is not a `V`.
    #[must_use]
    pub fn get_meta<V: Any + Clone>(&self, id: ObjectId, key: &str, default: V) -> V {
        self.entry(id)
            .ok()
            .and_then(|e| e.meta.get(key))
            .and_then(|v| v.downcast_ref::<V>())
            .cloned()
            .unwrap_or(default)
    }

    /// Returns true if the object has a metadata value for `key`.
    #[must_use]
    pub fn has_meta(&self, id: ObjectId, key: &str) -> bool {
        self.entry(id).is_ok_and(|e| e.meta.contains_key(key))
    }

    /// Removes a metadata value. Returns `true` if one was present.
    pub fn remove_meta(&mut self, id: ObjectId, key: &str) -> bool {
        self.entry_mut(id).is_ok_and(|e| e.meta.remove(key).is_some())
    }

    // =========================================================================
    // Script association
    // =========================================================================

    /// Attaches an opaque script value, replacing any previous one.
    ///
    /// The core never looks inside it; it is dropped at teardown.
    ///
    /// # Errors
    ///
    /// Fails if the object is dead or unknown.
    pub fn attach_script<S: Any>(&mut self, id: ObjectId, script: S) -> CoreResult<()> {
        self.entry_mut(id)?.script = Some(Box::new(script));
        Ok(())
    }

    /// Borrows the attached script as `S`.
    #[must_use]
    pub fn script<S: Any>(&self, id: ObjectId) -> Option<&S> {
        self.entry(id).ok()?.script.as_ref()?.downcast_ref::<S>()
    }

    /// Detaches and returns the attached script.
    pub fn detach_script(&mut self, id: ObjectId) -> Option<Box<dyn Any>> {
        self.entry_mut(id).ok()?.script.take()
    }

    // =========================================================================
    // Slot access
    // =========================================================================

    fn entry(&self, id: ObjectId) -> CoreResult<&ObjectEntry> {
        match id.slot().and_then(|index| self.slots.get(index)) {
            Some(Slot::Live(entry)) => Ok(&**entry),
            Some(Slot::Tombstone) => Err(CoreError::DeadObject(id)),
            None => Err(CoreError::UnknownObject(id)),
        }
    }

    fn entry_mut(&mut self, id: ObjectId) -> CoreResult<&mut ObjectEntry> {
        match id.slot().and_then(|index| self.slots.get_mut(index)) {
            Some(Slot::Live(entry)) => Ok(&mut **entry),
            Some(Slot::Tombstone) => Err(CoreError::DeadObject(id)),
            None => Err(CoreError::UnknownObject(id)),
        }
    }
}

impl Default for ObjectArena {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ObjectArena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectArena")
            .field("live", &self.live)
            .field("issued", &self.slots.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use super::*;
    use crate::object::BaseObject;

    const HIT: Signal<u32> = Signal::new("hit");

    #[derive(Default)]
    struct Counter {
        value: u32,
        torn_down: Option<Rc<Cell<bool>>>,
    }

    impl ObjectClass for Counter {
        fn class_name(&self) -> &'static str {
            "Counter"
        }

        fn on_teardown(&mut self) {
            if let Some(flag) = &self.torn_down {
                flag.set(true);
            }
        }
    }

    #[test]
    fn test_fresh_object() {
        let mut objects = ObjectArena::new();
        let id = objects.create(BaseObject);

        assert_eq!(objects.ref_count(id), Some(1));
        assert_eq!(objects.live_count(), 1);
        assert_eq!(objects.class_name(id), Some("Object"));
        assert!(objects.live_objects().any(|live| live == id));
    }

    #[test]
    fn test_ids_are_monotonic_and_never_reused() {
        let mut objects = ObjectArena::new();
        let a = objects.create(BaseObject);
        objects.unreference(a).unwrap();
        let b = objects.create(BaseObject);

        assert!(b > a);
        assert!(!objects.is_alive(a));
        assert!(objects.is_alive(b));
        assert_eq!(objects.issued_count(), 2);
    }

    #[test]
    fn test_refcount_arithmetic() {
        let mut objects = ObjectArena::new();
        let id = objects.create(BaseObject);

        for _ in 0..3 {
            objects.reference(id).unwrap();
        }
        objects.unreference(id).unwrap();
        assert_eq!(objects.ref_count(id), Some(1 + 3 - 1));

        for _ in 0..3 {
            objects.unreference(id).unwrap();
        }
        assert_eq!(objects.ref_count(id), None);
        assert!(objects.live_objects().all(|live| live != id));
        assert_eq!(objects.live_count(), 0);
    }

    #[test]
    fn test_teardown_runs_once_and_tombstones() {
        let flag = Rc::new(Cell::new(false));
        let mut objects = ObjectArena::new();
        let id = objects.create(Counter {
            value: 0,
            torn_down: Some(Rc::clone(&flag)),
        });

        assert_eq!(objects.unreference(id).unwrap(), 0);
        assert!(flag.get());
        assert_eq!(objects.unreference(id), Err(CoreError::DeadObject(id)));
        assert_eq!(objects.reference(id), Err(CoreError::DeadObject(id)));
    }

    #[test]
    fn test_unknown_id() {
        let mut objects = ObjectArena::new();
        assert_eq!(
            objects.reference(ObjectId::new(9)),
            Err(CoreError::UnknownObject(ObjectId::new(9)))
        );
        assert!(!objects.is_alive(ObjectId::NULL));
    }

    #[test]
    fn test_typed_access() {
        let mut objects = ObjectArena::new();
        let id = objects.create(Counter::default());

        objects.get_mut::<Counter>(id).unwrap().value = 5;
        assert_eq!(objects.get::<Counter>(id).unwrap().value, 5);
        assert!(objects.get::<BaseObject>(id).is_none());
        assert!(objects.is::<Counter>(id));
        assert!(!objects.is::<BaseObject>(id));
    }

    #[test]
    fn test_emit_isolates_failures() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut objects = ObjectArena::new();
        let id = objects.create(BaseObject);

        let first = {
            let log = Rc::clone(&log);
            Handler::new(move |v: &u32| {
                log.borrow_mut().push(("first", *v));
                Ok(())
            })
        };
        let failing = Handler::new(|_: &u32| Err("boom".into()));
        let last = {
            let log = Rc::clone(&log);
            Handler::new(move |v: &u32| {
                log.borrow_mut().push(("last", *v));
                Ok(())
            })
        };

        objects.connect(id, HIT, &first).unwrap();
        objects.connect(id, HIT, &failing).unwrap();
        objects.connect(id, HIT, &last).unwrap();

        let emission = objects.emit(id, HIT, &3);
        assert_eq!(emission, Emission { delivered: 2, failed: 1 });
        assert_eq!(*log.borrow(), vec![("first", 3), ("last", 3)]);
    }

    #[test]
    fn test_emit_without_channel_or_on_dead_object() {
        let mut objects = ObjectArena::new();
        let id = objects.create(BaseObject);
        assert_eq!(objects.emit(id, HIT, &1), Emission::default());

        objects.add_signal(id, "hit").unwrap();
        objects.add_signal(id, "hit").unwrap();
        assert!(objects.has_signal(id, "hit"));
        assert_eq!(objects.emit(id, HIT, &1), Emission::default());

        objects.unreference(id).unwrap();
        assert_eq!(objects.emit(id, HIT, &1), Emission::default());
        assert!(!objects.has_signal(id, "hit"));
    }

    #[test]
    fn test_teardown_drops_handlers() {
        let mut objects = ObjectArena::new();
        let id = objects.create(BaseObject);
        let handler = Handler::new(|_: &u32| Ok(()));
        objects.connect(id, HIT, &handler).unwrap();

        objects.unreference(id).unwrap();
        assert_eq!(objects.handler_count(id, "hit"), 0);
        assert!(objects.connect(id, HIT, &handler).is_err());
    }

    #[test]
    fn test_metadata() {
        let mut objects = ObjectArena::new();
        let id = objects.create(BaseObject);

        assert!(!objects.has_meta(id, "speed"));
        assert_eq!(objects.get_meta(id, "speed", 1.5_f32), 1.5);

        objects.set_meta(id, "speed", 3.0_f32).unwrap();
        objects.set_meta(id, "speed", 4.0_f32).unwrap();
        assert!(objects.has_meta(id, "speed"));
        assert_eq!(objects.get_meta(id, "speed", 0.0_f32), 4.0);

        // Wrong type reads as absent.
        assert_eq!(objects.get_meta(id, "speed", 7_u32), 7);

        assert!(objects.remove_meta(id, "speed"));
        assert!(!objects.remove_meta(id, "speed"));
    }

    #[test]
    fn test_metadata_gone_after_teardown() {
        let mut objects = ObjectArena::new();
        let id = objects.create(BaseObject);
        objects.set_meta(id, "name", String::from("crate")).unwrap();
        objects.unreference(id).unwrap();

        assert!(!objects.has_meta(id, "name"));
        assert_eq!(objects.get_meta(id, "name", String::new()), "");
    }

    #[test]
    fn test_script_association() {
        let mut objects = ObjectArena::new();
        let id = objects.create(BaseObject);

        objects.attach_script(id, String::from("player.lua")).unwrap();
        assert_eq!(objects.script::<String>(id).map(String::as_str), Some("player.lua"));
        assert!(objects.script::<u32>(id).is_none());

        let detached = objects.detach_script(id).unwrap();
        assert!(detached.downcast_ref::<String>().is_some());
        assert!(objects.script::<String>(id).is_none());
    }
}
