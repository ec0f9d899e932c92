#![forbid(unsafe_code)]

//! The bindings service: registry, gateway, and refresh sweep in one place.
//!
//! # Design
//!
//! A [`Bindings`] value is the single service object a host creates next to
//! its translation engine and hands to whatever owns the renderer root.
//! Clones share the same state. Placeholders mounted through it register in
//! its registry; engine events wired by its gateway trigger its sweep.
//!
//! # Refresh sweep
//!
//! A sweep snapshots the registry, then for each snapshotted id that is
//! still registered, still alive, and still connected, re-resolves the
//! stored keys/options and pushes any change through the placeholder's
//! site. Each sweep is reported in a `lingobind.sweep` span and kept as the
//! service's [`SweepReport`].
//!
//! # Reentrancy
//!
//! An engine event fired while a sweep runs (for example from a site
//! callback) is handled according to [`SweepReentry`]: coalesced into one
//! follow-up sweep (default), run nested, or dropped with a diagnostic.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{debug, info, info_span, warn};
use web_time::Instant;

use crate::config::{BindingsConfig, SweepReentry};
use crate::deferred::TranslateWhen;
use crate::directive::{Directive, Placeholder};
use crate::engine::{EngineEvent, TranslationEngine};
use crate::gateway::ResolverGateway;
use crate::immediate::Translate;
use crate::keys::{Keys, Options};
use crate::placeholder::PlaceholderCore;
use crate::registry::{PlaceholderId, PlaceholderRegistry, RegistryEntry};
use crate::site::{BindingSite, Rendered};

/// Counters for one refresh sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    /// Event that triggered the sweep.
    pub event: EngineEvent,
    /// Connected entries that were re-resolved.
    pub visited: usize,
    /// Visited entries whose site received a new value.
    pub updated: usize,
    /// Visited entries that produced no change.
    pub unchanged: usize,
    /// Snapshotted entries that were removed, dropped, or disconnected.
    pub skipped: usize,
}

impl SweepReport {
    fn new(event: EngineEvent) -> Self {
        Self {
            event,
            visited: 0,
            updated: 0,
            unchanged: 0,
            skipped: 0,
        }
    }
}

#[derive(Default)]
struct SweepState {
    running: Cell<bool>,
    pending: Cell<Option<EngineEvent>>,
    completed: Cell<u64>,
    last: Cell<Option<SweepReport>>,
}

/// Clears the running flag even if a site callback panics mid-sweep.
struct RunningGuard<'a>(&'a Cell<bool>);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

pub(crate) struct BindingsInner {
    config: BindingsConfig,
    gateway: ResolverGateway,
    registry: RefCell<PlaceholderRegistry<Weak<PlaceholderCore>>>,
    sweep: SweepState,
}

impl BindingsInner {
    pub(crate) fn gateway(&self) -> &ResolverGateway {
        &self.gateway
    }

    pub(crate) fn register(
        &self,
        id: PlaceholderId,
        keys: Keys,
        options: Options,
        handle: Weak<PlaceholderCore>,
    ) {
        let inserted = self
            .registry
            .borrow_mut()
            .register(id, keys, options, handle);
        if inserted {
            debug!(placeholder = %id, "placeholder registered");
        }
    }

    pub(crate) fn unregister(&self, id: PlaceholderId) -> bool {
        let removed = self.registry.borrow_mut().unregister(id).is_some();
        if removed {
            debug!(placeholder = %id, "placeholder unregistered");
        }
        removed
    }

    fn request_sweep(&self, event: EngineEvent) {
        if !self.sweep.running.get() {
            self.run_sweeps(event);
            return;
        }
        match self.config.reentry {
            SweepReentry::Coalesce => {
                debug!(event = %event, "sweep requested while running; coalescing");
                self.sweep.pending.set(Some(event));
            }
            SweepReentry::Allow => {
                self.sweep_once(event);
            }
            SweepReentry::Forbid => {
                warn!(
                    target: "lingobind::diagnostics",
                    event = %event,
                    "refresh sweep re-entered; nested request dropped"
                );
            }
        }
    }

    fn run_sweeps(&self, event: EngineEvent) {
        self.sweep.running.set(true);
        let _guard = RunningGuard(&self.sweep.running);
        let mut event = event;
        loop {
            self.sweep_once(event);
            match self.sweep.pending.take() {
                Some(next) => event = next,
                None => break,
            }
        }
    }

    fn sweep_once(&self, event: EngineEvent) -> SweepReport {
        let snapshot = self.registry.borrow().snapshot();
        let start = Instant::now();
        let _span = info_span!(
            "lingobind.sweep",
            event = event.as_str(),
            entries = snapshot.len() as u64,
            visited = tracing::field::Empty,
            updated = tracing::field::Empty,
            duration_us = tracing::field::Empty
        )
        .entered();

        let mut report = SweepReport::new(event);
        for (id, handle) in snapshot {
            let entry = self.registry.borrow().entry(id).cloned();
            let Some(entry) = entry else {
                report.skipped += 1;
                continue;
            };
            let Some(core) = handle.upgrade() else {
                report.skipped += 1;
                continue;
            };
            if !core.is_connected() {
                report.skipped += 1;
                continue;
            }
            report.visited += 1;
            match core.refresh(&self.gateway, &entry) {
                Rendered::Value(_) => report.updated += 1,
                Rendered::NoChange => report.unchanged += 1,
            }
        }

        let duration_us = start.elapsed().as_micros() as u64;
        let span = tracing::Span::current();
        span.record("visited", report.visited as u64);
        span.record("updated", report.updated as u64);
        span.record("duration_us", duration_us);
        info!(
            event = event.as_str(),
            visited = report.visited,
            updated = report.updated,
            unchanged = report.unchanged,
            skipped = report.skipped,
            duration_us,
            "refresh sweep complete"
        );

        self.sweep.last.set(Some(report));
        self.sweep.completed.set(self.sweep.completed.get() + 1);
        report
    }
}

/// Shared handle to the bindings service.
#[derive(Clone)]
pub struct Bindings {
    inner: Rc<BindingsInner>,
}

impl Bindings {
    /// Service with the default configuration.
    pub fn new(engine: Rc<dyn TranslationEngine>) -> Self {
        Self::with_config(engine, BindingsConfig::default())
    }

    pub fn with_config(engine: Rc<dyn TranslationEngine>, config: BindingsConfig) -> Self {
        let inner = Rc::new_cyclic(|weak: &Weak<BindingsInner>| {
            let service = weak.clone();
            let gateway = ResolverGateway::new(engine, config.watched_events(), move |event| {
                if let Some(inner) = service.upgrade() {
                    inner.request_sweep(event);
                }
            });
            BindingsInner {
                config,
                gateway,
                registry: RefCell::new(PlaceholderRegistry::new()),
                sweep: SweepState::default(),
            }
        });
        Self { inner }
    }

    #[must_use]
    pub fn config(&self) -> &BindingsConfig {
        &self.inner.config
    }

    /// Wire the refresh sweep now instead of on the first lookup.
    ///
    /// Returns `false` if it was already wired.
    pub fn init(&self) -> bool {
        self.inner.gateway.ensure_wired()
    }

    /// Forget every registry entry and unwire from the engine.
    ///
    /// Placeholders that stay mounted re-register on their next evaluation.
    pub fn reset(&self) {
        let cleared = {
            let mut registry = self.inner.registry.borrow_mut();
            let count = registry.len();
            registry.clear();
            count
        };
        self.inner.gateway.reset();
        self.inner.sweep.pending.set(None);
        self.inner.sweep.last.set(None);
        debug!(entries = cleared, "bindings reset");
    }

    /// Whether the gateway has wired the refresh sweep.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.inner.gateway.is_initialized()
    }

    /// Number of registry entries.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.inner.registry.borrow().len()
    }

    #[must_use]
    pub fn is_registered(&self, id: PlaceholderId) -> bool {
        self.inner.registry.borrow().contains(id)
    }

    /// The registry entry for `id`, if registered.
    #[must_use]
    pub fn entry(&self, id: PlaceholderId) -> Option<RegistryEntry> {
        self.inner.registry.borrow().entry(id).cloned()
    }

    /// Report of the most recent sweep.
    #[must_use]
    pub fn last_sweep(&self) -> Option<SweepReport> {
        self.inner.sweep.last.get()
    }

    /// Number of sweeps completed since creation.
    #[must_use]
    pub fn sweep_count(&self) -> u64 {
        self.inner.sweep.completed.get()
    }

    /// Mount an immediate placeholder at `site`.
    pub fn translate(&self, site: Rc<dyn BindingSite>) -> Translate {
        Translate::new(PlaceholderCore::mount(Rc::downgrade(&self.inner), site))
    }

    /// Mount a deferred placeholder at `site`.
    pub fn translate_when(&self, site: Rc<dyn BindingSite>) -> TranslateWhen {
        TranslateWhen::new(PlaceholderCore::mount(Rc::downgrade(&self.inner), site))
    }

    /// Mount `directive` at `site` and render it for the first time.
    pub fn mount(
        &self,
        directive: Directive,
        site: Rc<dyn BindingSite>,
    ) -> (Placeholder, Rendered) {
        match directive {
            Directive::Translate { keys, options } => {
                let placeholder = self.translate(site);
                let rendered = placeholder.render(keys, options);
                (Placeholder::Immediate(placeholder), rendered)
            }
            Directive::TranslateWhen {
                readiness,
                keys,
                options,
            } => {
                let placeholder = self.translate_when(site);
                let rendered = placeholder.render(&readiness, keys, options);
                (Placeholder::Deferred(placeholder), rendered)
            }
        }
    }
}

impl fmt::Debug for Bindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bindings")
            .field("config", &self.inner.config)
            .field("gateway", &self.inner.gateway)
            .field("registry", &*self.inner.registry.borrow())
            .field("sweeps", &self.inner.sweep.completed.get())
            .finish()
    }
}
