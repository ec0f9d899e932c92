//! Scripted translation engine.

use std::cell::{Cell, RefCell};
use std::fmt;

use ahash::AHashMap;
use lingobind::{EngineEvent, Keys, Listener, ListenerSet, Options, Subscription, TranslationEngine};
use serde_json::Value;

type Table = AHashMap<String, String>;

/// An in-memory engine driven explicitly by the test.
///
/// Resolution looks up each key in order in the active locale's table and
/// substitutes `{{name}}` tokens from the options. Unknown tokens are left
/// intact. Nothing falls back across locales.
pub struct ScriptedEngine {
    language: RefCell<String>,
    tables: RefCell<AHashMap<String, Table>>,
    resolutions: Cell<u64>,
    language_changed: ListenerSet,
    resource_added: ListenerSet,
}

impl ScriptedEngine {
    #[must_use]
    pub fn new(language: &str) -> Self {
        Self {
            language: RefCell::new(language.to_string()),
            tables: RefCell::new(AHashMap::new()),
            resolutions: Cell::new(0),
            language_changed: ListenerSet::new(),
            resource_added: ListenerSet::new(),
        }
    }

    /// Seed a resource without firing an event.
    #[must_use]
    pub fn with_resource(self, locale: &str, key: &str, template: &str) -> Self {
        self.insert(locale, key, template);
        self
    }

    #[must_use]
    pub fn language(&self) -> String {
        self.language.borrow().clone()
    }

    /// Switch locale and fire [`EngineEvent::LanguageChanged`].
    ///
    /// The event fires even when the locale is unchanged. Returns the number
    /// of listeners reached.
    pub fn change_language(&self, locale: &str) -> usize {
        *self.language.borrow_mut() = locale.to_string();
        self.language_changed.emit(EngineEvent::LanguageChanged)
    }

    /// Add one resource and fire [`EngineEvent::ResourceAdded`].
    pub fn add_resource(&self, locale: &str, key: &str, template: &str) -> usize {
        self.insert(locale, key, template);
        self.resource_added.emit(EngineEvent::ResourceAdded)
    }

    /// Add a bundle of resources and fire one [`EngineEvent::ResourceAdded`].
    pub fn add_bundle<'a>(
        &self,
        locale: &str,
        entries: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> usize {
        for (key, template) in entries {
            self.insert(locale, key, template);
        }
        self.resource_added.emit(EngineEvent::ResourceAdded)
    }

    /// Live listeners for `event`.
    #[must_use]
    pub fn listener_count(&self, event: EngineEvent) -> usize {
        self.listeners(event).live_count()
    }

    /// Number of `resolve` calls so far.
    #[must_use]
    pub fn resolution_count(&self) -> u64 {
        self.resolutions.get()
    }

    fn insert(&self, locale: &str, key: &str, template: &str) {
        self.tables
            .borrow_mut()
            .entry(locale.to_string())
            .or_default()
            .insert(key.to_string(), template.to_string());
    }

    fn listeners(&self, event: EngineEvent) -> &ListenerSet {
        match event {
            EngineEvent::LanguageChanged => &self.language_changed,
            EngineEvent::ResourceAdded => &self.resource_added,
        }
    }
}

impl TranslationEngine for ScriptedEngine {
    fn resolve(&self, keys: &Keys, options: &Options) -> Option<String> {
        self.resolutions.set(self.resolutions.get() + 1);
        let language = self.language.borrow();
        let tables = self.tables.borrow();
        let table = tables.get(language.as_str())?;
        let template = keys.iter().find_map(|key| table.get(key))?;
        Some(interpolate(template, options))
    }

    fn subscribe(&self, event: EngineEvent, listener: Listener) -> Subscription {
        self.listeners(event).subscribe(listener)
    }
}

impl fmt::Debug for ScriptedEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptedEngine")
            .field("language", &*self.language.borrow())
            .field("locales", &self.tables.borrow().len())
            .field("language_changed", &self.language_changed)
            .field("resource_added", &self.resource_added)
            .finish()
    }
}

/// Replace `{{name}}` tokens (whitespace inside the braces is ignored).
fn interpolate(template: &str, options: &Options) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after_open = &rest[open + 2..];
        let Some(close) = after_open.find("}}") else {
            out.push_str(&rest[open..]);
            return out;
        };
        let name = after_open[..close].trim();
        match options.get(name) {
            Some(Value::String(text)) => out.push_str(text),
            Some(other) => out.push_str(&other.to_string()),
            None => out.push_str(&rest[open..open + 2 + close + 2]),
        }
        rest = &after_open[close + 2..];
    }
    out.push_str(rest);
    out
}
