#![forbid(unsafe_code)]

//! Resolver gateway: the single entry point to the translation engine.
//!
//! Every lookup goes through [`ResolverGateway::resolve`]. The first lookup
//! also wires the refresh hook to the engine's change events; later lookups
//! only resolve. Deferring the wiring means placeholders can be created and
//! evaluated before the host has finished configuring its engine.
//!
//! # Invariants
//!
//! 1. The hook is subscribed at most once per initialization, no matter how
//!    many lookups happen or whether a lookup re-enters the gateway.
//! 2. [`ResolverGateway::reset`] drops every subscription and clears the
//!    flag; the next lookup wires again, exactly once.
//! 3. The engine's result is returned verbatim.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::engine::{EngineEvent, Subscription, TranslationEngine};
use crate::keys::{Keys, Options};

type RefreshHook = Rc<dyn Fn(EngineEvent)>;

pub struct ResolverGateway {
    engine: Rc<dyn TranslationEngine>,
    watched: Vec<EngineEvent>,
    on_change: RefreshHook,
    initialized: Cell<bool>,
    subscriptions: RefCell<Vec<Subscription>>,
}

impl ResolverGateway {
    /// Create a gateway that will route `watched` events to `on_change`
    /// once the first lookup happens.
    pub fn new(
        engine: Rc<dyn TranslationEngine>,
        watched: Vec<EngineEvent>,
        on_change: impl Fn(EngineEvent) + 'static,
    ) -> Self {
        Self {
            engine,
            watched,
            on_change: Rc::new(on_change),
            initialized: Cell::new(false),
            subscriptions: RefCell::new(Vec::new()),
        }
    }

    /// Resolve through the engine, wiring the refresh hook on first use.
    pub fn resolve(&self, keys: &Keys, options: &Options) -> Option<String> {
        self.ensure_wired();
        let resolved = self.engine.resolve(keys, options);
        trace!(keys = %keys, resolved = resolved.is_some(), "translation resolved");
        resolved
    }

    /// Perform the one-time wiring now. Returns `false` if already wired.
    pub fn ensure_wired(&self) -> bool {
        if self.initialized.replace(true) {
            return false;
        }
        let subscriptions: Vec<Subscription> = self
            .watched
            .iter()
            .map(|&event| {
                let hook = Rc::clone(&self.on_change);
                self.engine.subscribe(event, Box::new(move |fired| hook(fired)))
            })
            .collect();
        debug!(
            events = ?self.watched,
            "refresh sweep wired to translation engine"
        );
        self.subscriptions.borrow_mut().extend(subscriptions);
        true
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized.get()
    }

    /// Number of live engine subscriptions held by the gateway.
    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.borrow().len()
    }

    /// Unwire from the engine and clear the initialization flag.
    pub fn reset(&self) {
        let dropped = std::mem::take(&mut *self.subscriptions.borrow_mut());
        let count = dropped.len();
        drop(dropped);
        self.initialized.set(false);
        debug!(subscriptions = count, "resolver gateway reset");
    }
}

impl fmt::Debug for ResolverGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverGateway")
            .field("watched", &self.watched)
            .field("initialized", &self.initialized.get())
            .field("subscriptions", &self.subscription_count())
            .finish_non_exhaustive()
    }
}
