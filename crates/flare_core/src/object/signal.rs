//! # Signals
//!
//! Named, per-object event channels with typed payloads.
//!
//! ```text
//! Signal<Damage>("damaged")
//!        │
//!        ▼
//! ┌─────────────┐   emit(&Damage)   ┌───────────┐ ┌───────────┐
//! │  Object #7  │ ────────────────> │ handler 1 │→│ handler 2 │→ ...
//! └─────────────┘                   └───────────┘ └───────────┘
//! ```
//!
//! Handlers run in the order they were connected. A handler that returns an
//! error is logged and skipped over; the rest still run and the emitter
//! never sees the error.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

/// What a signal handler returns. Errors are logged, never propagated.
pub type HandlerResult = Result<(), Box<dyn Error>>;

/// A typed channel name.
///
/// Declare signals as constants so every connect and emit agrees on both
/// the name and the payload type:
///
/// ```rust
/// use flare_core::object::Signal;
///
/// pub struct Damage {
///     pub amount: u32,
/// }
///
/// pub const DAMAGED: Signal<Damage> = Signal::new("damaged");
/// ```
pub struct Signal<E> {
    name: &'static str,
    _payload: PhantomData<fn(&E)>,
}

impl<E> Signal<E> {
    /// Creates a signal key.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _payload: PhantomData,
        }
    }

    /// Returns the channel name.
    #[inline]
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<E> Clone for Signal<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for Signal<E> {}

impl<E> fmt::Debug for Signal<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Signal").field(&self.name).finish()
    }
}

/// A signal handler.
///
/// Handlers are compared by identity: clones of one `Handler` are the same
/// handler, two handlers built from identical closures are not. Keep a
/// clone around to disconnect later.
pub struct Handler<E> {
    callback: Rc<dyn Fn(&E) -> HandlerResult>,
}

impl<E> Handler<E> {
    /// Wraps a callback.
    pub fn new(callback: impl Fn(&E) -> HandlerResult + 'static) -> Self {
        Self {
            callback: Rc::new(callback),
        }
    }

    /// Identity of the handler.
    fn key(&self) -> usize {
        Rc::as_ptr(&self.callback).cast::<()>() as usize
    }

    fn call(&self, payload: &E) -> HandlerResult {
        (self.callback)(payload)
    }
}

impl<E> Clone for Handler<E> {
    fn clone(&self) -> Self {
        Self {
            callback: Rc::clone(&self.callback),
        }
    }
}

impl<E> fmt::Debug for Handler<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handler({:#x})", self.key())
    }
}

/// Outcome of one emission.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Emission {
    /// Handlers that returned `Ok`.
    pub delivered: usize,
    /// Handlers that returned an error.
    pub failed: usize,
}

/// Connected handler with its payload type erased.
struct Subscriber {
    key: usize,
    handler: Box<dyn Any>,
}

/// One named channel.
#[derive(Default)]
struct Channel {
    /// Payload type, fixed by the first handler connected and released
    /// when the last one disconnects.
    payload: Option<TypeId>,
    subscribers: Vec<Subscriber>,
}

impl Channel {
    fn accepts<E: 'static>(&self) -> bool {
        self.payload.is_none() || self.payload == Some(TypeId::of::<E>())
    }
}

/// All channels of one object.
#[derive(Default)]
pub(crate) struct SignalTable {
    channels: HashMap<String, Channel>,
}

impl SignalTable {
    /// Creates the channel if it does not exist.
    pub(crate) fn add(&mut self, name: &str) {
        if !self.channels.contains_key(name) {
            self.channels.insert(name.to_owned(), Channel::default());
        }
    }

    pub(crate) fn has(&self, name: &str) -> bool {
        self.channels.contains_key(name)
    }

    pub(crate) fn handler_count(&self, name: &str) -> usize {
        self.channels.get(name).map_or(0, |c| c.subscribers.len())
    }

    /// Appends a handler unless it is already connected.
    ///
    /// Returns `true` if the handler was added.
    pub(crate) fn connect<E: 'static>(&mut self, signal: Signal<E>, handler: &Handler<E>) -> bool {
        let channel = self.channels.entry(signal.name().to_owned()).or_default();

        if !channel.accepts::<E>() {
            tracing::error!(
                signal = signal.name(),
                "handler payload type does not match the channel, not connected"
            );
            return false;
        }

        let key = handler.key();
        if channel.subscribers.iter().any(|s| s.key == key) {
            return false;
        }

        channel.payload = Some(TypeId::of::<E>());
        channel.subscribers.push(Subscriber {
            key,
            handler: Box::new(handler.clone()),
        });
        true
    }

    /// Removes a handler. Returns `true` if it was connected.
    pub(crate) fn disconnect<E: 'static>(&mut self, signal: Signal<E>, handler: &Handler<E>) -> bool {
        let Some(channel) = self.channels.get_mut(signal.name()) else {
            return false;
        };

        let key = handler.key();
        let before = channel.subscribers.len();
        channel.subscribers.retain(|s| s.key != key);
        if channel.subscribers.is_empty() {
            // An empty channel takes whatever type connects next.
            channel.payload = None;
        }
        channel.subscribers.len() != before
    }

    /// Clones the handlers of a channel, in connection order.
    ///
    /// Returns `None` if the channel does not exist or carries a different
    /// payload type.
    pub(crate) fn handlers<E: 'static>(&self, signal: Signal<E>) -> Option<Vec<Handler<E>>> {
        let channel = self.channels.get(signal.name())?;

        if !channel.accepts::<E>() {
            tracing::error!(
                signal = signal.name(),
                "emitted payload type does not match the channel, nothing delivered"
            );
            return None;
        }

        Some(
            channel
                .subscribers
                .iter()
                .filter_map(|s| s.handler.downcast_ref::<Handler<E>>().cloned())
                .collect(),
        )
    }

    pub(crate) fn clear(&mut self) {
        self.channels.clear();
    }
}

/// Runs `handlers` in order, isolating failures.
pub(crate) fn dispatch<E>(signal: Signal<E>, handlers: &[Handler<E>], payload: &E) -> Emission {
    let mut emission = Emission::default();

    for handler in handlers {
        match handler.call(payload) {
            Ok(()) => emission.delivered += 1,
            Err(err) => {
                emission.failed += 1;
                tracing::error!(signal = signal.name(), error = %err, "signal handler failed");
            }
        }
    }

    emission
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    const PING: Signal<u32> = Signal::new("ping");
    const NAMED_PING_TEXT: Signal<String> = Signal::new("ping");

    fn recorder(log: &Rc<RefCell<Vec<u32>>>, tag: u32) -> Handler<u32> {
        let log = Rc::clone(log);
        Handler::new(move |value: &u32| {
            log.borrow_mut().push(tag * 100 + value);
            Ok(())
        })
    }

    #[test]
    fn test_dispatch_in_connection_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut table = SignalTable::default();
        table.connect(PING, &recorder(&log, 1));
        table.connect(PING, &recorder(&log, 2));
        table.connect(PING, &recorder(&log, 3));

        let handlers = table.handlers(PING).unwrap();
        let emission = dispatch(PING, &handlers, &7);

        assert_eq!(emission, Emission { delivered: 3, failed: 0 });
        assert_eq!(*log.borrow(), vec![107, 207, 307]);
    }

    #[test]
    fn test_same_handler_connects_once() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let handler = recorder(&log, 1);
        let mut table = SignalTable::default();

        assert!(table.connect(PING, &handler));
        assert!(!table.connect(PING, &handler.clone()));
        assert_eq!(table.handler_count("ping"), 1);
    }

    #[test]
    fn test_disconnect() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let handler = recorder(&log, 1);
        let mut table = SignalTable::default();

        assert!(!table.disconnect(PING, &handler));
        table.connect(PING, &handler);
        assert!(table.disconnect(PING, &handler));
        assert!(!table.disconnect(PING, &handler));
        assert!(table.has("ping"));
        assert_eq!(table.handler_count("ping"), 0);
    }

    #[test]
    fn test_payload_type_is_fixed_by_first_handler() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut table = SignalTable::default();
        table.connect(PING, &recorder(&log, 1));

        let text_handler = Handler::new(|_: &String| Ok(()));
        assert!(!table.connect(NAMED_PING_TEXT, &text_handler));
        assert!(table.handlers(NAMED_PING_TEXT).is_none());
    }

    #[test]
    fn test_emptied_channel_accepts_a_new_payload_type() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let numeric = recorder(&log, 1);
        let mut table = SignalTable::default();
        table.connect(PING, &numeric);
        assert!(table.disconnect(PING, &numeric));

        let text = Rc::new(RefCell::new(String::new()));
        let text_handler = {
            let text = Rc::clone(&text);
            Handler::new(move |value: &String| {
                text.borrow_mut().push_str(value);
                Ok(())
            })
        };
        assert!(table.connect(NAMED_PING_TEXT, &text_handler));
        assert!(table.handlers(PING).is_none());

        let handlers = table.handlers(NAMED_PING_TEXT).unwrap();
        dispatch(NAMED_PING_TEXT, &handlers, &String::from("pong"));
        assert_eq!(*text.borrow(), "pong");
    }

    #[test]
    fn test_add_is_idempotent() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut table = SignalTable::default();
        table.add("ping");
        table.connect(PING, &recorder(&log, 1));
        table.add("ping");

        assert_eq!(table.handler_count("ping"), 1);
        assert!(table.handlers(PING).is_some());
    }
}
