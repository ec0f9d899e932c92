#![forbid(unsafe_code)]

//! Placeholder lifecycle shared by both binding variants.
//!
//! # Lifecycle
//!
//! ```text
//! mount ──► connected ──evaluate──► registered(connected)
//!                                        │ on_disconnect / drop
//!                                        ▼
//!                                   unregistered (terminal)
//! ```
//!
//! A placeholder is connected from mount until [`Binding::on_disconnect`].
//! It never reconnects; a fresh mount creates a fresh instance.
//!
//! # Invariants
//!
//! 1. While connected, the registry entry holds the arguments of the most
//!    recent `evaluate`.
//! 2. A disconnected placeholder has no registry entry, and evaluating it
//!    does not register it again.
//! 3. A value is committed only when it is defined and differs from the
//!    held value; everything else is [`Rendered::NoChange`].

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::debug;

use crate::gateway::ResolverGateway;
use crate::keys::{Keys, OptionsSource};
use crate::registry::{PlaceholderId, RegistryEntry};
use crate::service::BindingsInner;
use crate::site::{BindingSite, Rendered};

/// Capability shared by the immediate and deferred placeholders.
pub trait Binding {
    fn id(&self) -> PlaceholderId;

    fn is_connected(&self) -> bool;

    /// Last text committed through this placeholder (empty before the first).
    fn value(&self) -> String;

    /// Normalize options, record the registry entry, resolve, and decide
    /// whether the result is a change.
    fn evaluate(&self, keys: &Keys, options: &OptionsSource) -> Rendered;

    /// Remove the registry entry and mark the placeholder disconnected.
    /// Idempotent.
    fn on_disconnect(&self);
}

pub(crate) struct PlaceholderCore {
    id: PlaceholderId,
    value: RefCell<String>,
    connected: Cell<bool>,
    site: Rc<dyn BindingSite>,
    service: Weak<BindingsInner>,
}

impl PlaceholderCore {
    pub(crate) fn mount(service: Weak<BindingsInner>, site: Rc<dyn BindingSite>) -> Rc<Self> {
        let core = Rc::new(Self {
            id: PlaceholderId::next(),
            value: RefCell::new(String::new()),
            connected: Cell::new(true),
            site,
            service,
        });
        debug!(placeholder = %core.id, "placeholder mounted");
        core
    }

    pub(crate) fn id(&self) -> PlaceholderId {
        self.id
    }

    pub(crate) fn is_connected(&self) -> bool {
        self.connected.get()
    }

    pub(crate) fn value(&self) -> String {
        self.value.borrow().clone()
    }

    pub(crate) fn evaluate(self: &Rc<Self>, keys: &Keys, options: &OptionsSource) -> Rendered {
        let options = options.normalize();
        let Some(service) = self.service.upgrade() else {
            return Rendered::NoChange;
        };
        if self.is_connected() {
            service.register(self.id, keys.clone(), options.clone(), Rc::downgrade(self));
        }
        let resolved = service.gateway().resolve(keys, &options);
        self.settle(resolved)
    }

    /// Re-resolve a stored entry and push any change to the site.
    pub(crate) fn refresh(&self, gateway: &ResolverGateway, entry: &RegistryEntry) -> Rendered {
        let resolved = gateway.resolve(&entry.keys, &entry.options);
        let rendered = self.settle(resolved);
        self.push(&rendered);
        rendered
    }

    /// Commit `rendered` out of band. `NoChange` commits nothing.
    pub(crate) fn push(&self, rendered: &Rendered) {
        if let Rendered::Value(value) = rendered {
            self.site.commit(value);
        }
    }

    pub(crate) fn disconnect(&self) {
        let was_connected = self.connected.replace(false);
        if let Some(service) = self.service.upgrade() {
            service.unregister(self.id);
        }
        if was_connected {
            debug!(placeholder = %self.id, "placeholder disconnected");
        }
    }

    fn settle(&self, resolved: Option<String>) -> Rendered {
        if !self.is_connected() {
            return Rendered::NoChange;
        }
        let Some(resolved) = resolved else {
            return Rendered::NoChange;
        };
        let mut held = self.value.borrow_mut();
        if *held == resolved {
            return Rendered::NoChange;
        }
        held.clone_from(&resolved);
        Rendered::Value(resolved)
    }
}

impl Drop for PlaceholderCore {
    fn drop(&mut self) {
        if let Some(service) = self.service.upgrade() {
            service.unregister(self.id);
        }
    }
}

impl fmt::Debug for PlaceholderCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaceholderCore")
            .field("id", &self.id)
            .field("value", &*self.value.borrow())
            .field("connected", &self.connected.get())
            .finish_non_exhaustive()
    }
}
