#![forbid(unsafe_code)]

//! The translation engine seam.
//!
//! The binding core consumes exactly three things from a translation engine:
//! an opaque lookup ([`TranslationEngine::resolve`]) and the two change
//! events in [`EngineEvent`]. Everything else (catalogs, plural rules,
//! resource loading) stays on the engine side.
//!
//! # Listener storage
//!
//! [`ListenerSet`] is the storage engines are expected to use for their
//! event hooks. Listeners are held as `Weak` references and handed back as a
//! [`Subscription`] guard, so the subscriber decides how long the wiring
//! lives. Dead entries are pruned lazily on the next [`ListenerSet::emit`].

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::keys::{Keys, Options};

/// Change notifications the binding core reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineEvent {
    /// The active locale changed.
    LanguageChanged,
    /// A resource bundle was added to the engine's store.
    ResourceAdded,
}

impl EngineEvent {
    pub const ALL: [EngineEvent; 2] = [EngineEvent::LanguageChanged, EngineEvent::ResourceAdded];

    /// Stable name used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LanguageChanged => "language_changed",
            Self::ResourceAdded => "resource_added",
        }
    }
}

impl fmt::Display for EngineEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Boxed event listener handed to [`TranslationEngine::subscribe`].
pub type Listener = Box<dyn Fn(EngineEvent)>;

/// A translation engine as seen by the binding core.
pub trait TranslationEngine {
    /// Resolve `keys` (first resolvable wins) with `options`.
    ///
    /// `None` means untranslatable. The result is passed through verbatim.
    fn resolve(&self, keys: &Keys, options: &Options) -> Option<String>;

    /// Register `listener` for `event`. The listener stays wired for as long
    /// as the returned guard is alive.
    fn subscribe(&self, event: EngineEvent, listener: Listener) -> Subscription;
}

type ListenerRc = Rc<dyn Fn(EngineEvent)>;
type ListenerWeak = Weak<dyn Fn(EngineEvent)>;

/// Weakly-held listeners for one engine event.
#[derive(Default)]
pub struct ListenerSet {
    listeners: RefCell<Vec<ListenerWeak>>,
}

impl ListenerSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a listener. Dropping the returned guard unwires it.
    pub fn subscribe(&self, listener: impl Fn(EngineEvent) + 'static) -> Subscription {
        let strong: ListenerRc = Rc::new(listener);
        self.listeners.borrow_mut().push(Rc::downgrade(&strong));
        Subscription {
            _guard: Box::new(strong),
        }
    }

    /// Call every live listener in registration order and prune dead ones.
    ///
    /// No borrow is held while listeners run, so a listener may subscribe
    /// or emit again. Returns the number of listeners invoked.
    pub fn emit(&self, event: EngineEvent) -> usize {
        let live: Vec<ListenerRc> = {
            let mut listeners = self.listeners.borrow_mut();
            listeners.retain(|weak| weak.strong_count() > 0);
            listeners.iter().filter_map(Weak::upgrade).collect()
        };
        for listener in &live {
            listener(event);
        }
        live.len()
    }

    /// Registered listeners, including dead ones not yet pruned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Listeners whose guard is still alive.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.listeners
            .borrow()
            .iter()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }
}

impl fmt::Debug for ListenerSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerSet")
            .field("listeners", &self.len())
            .field("live", &self.live_count())
            .finish()
    }
}

/// RAII guard for an engine listener.
///
/// Dropping it makes the listener unreachable: the engine's `Weak` fails to
/// upgrade on the next emit.
pub struct Subscription {
    _guard: Box<dyn std::any::Any>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}
