//! In-crate fakes for unit tests.

use std::cell::RefCell;
use std::rc::Rc;

use ahash::AHashMap;
use serde_json::Value;

use crate::engine::{EngineEvent, Listener, ListenerSet, Subscription, TranslationEngine};
use crate::keys::{Keys, Options};
use crate::site::BindingSite;

/// Single-locale engine with `{{name}}` substitution.
#[derive(Default)]
pub(crate) struct FakeEngine {
    entries: RefCell<AHashMap<String, String>>,
    language_changed: ListenerSet,
    resource_added: ListenerSet,
}

impl FakeEngine {
    pub(crate) fn with_entry(key: &str, text: &str) -> Self {
        let engine = Self::default();
        engine.set(key, text);
        engine
    }

    pub(crate) fn set(&self, key: &str, text: &str) {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), text.to_string());
    }

    pub(crate) fn remove(&self, key: &str) {
        self.entries.borrow_mut().remove(key);
    }

    pub(crate) fn fire(&self, event: EngineEvent) -> usize {
        match event {
            EngineEvent::LanguageChanged => self.language_changed.emit(event),
            EngineEvent::ResourceAdded => self.resource_added.emit(event),
        }
    }

    pub(crate) fn listener_count(&self) -> usize {
        self.language_changed.live_count() + self.resource_added.live_count()
    }
}

impl TranslationEngine for FakeEngine {
    fn resolve(&self, keys: &Keys, options: &Options) -> Option<String> {
        let entries = self.entries.borrow();
        let template = keys.iter().find_map(|key| entries.get(key))?;
        let mut text = template.clone();
        for (name, value) in options {
            let replacement = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            text = text.replace(&format!("{{{{{name}}}}}"), &replacement);
        }
        Some(text)
    }

    fn subscribe(&self, event: EngineEvent, listener: Listener) -> Subscription {
        match event {
            EngineEvent::LanguageChanged => self.language_changed.subscribe(listener),
            EngineEvent::ResourceAdded => self.resource_added.subscribe(listener),
        }
    }
}

/// Site that records every out-of-band commit.
#[derive(Default)]
pub(crate) struct SinkSite {
    commits: RefCell<Vec<String>>,
}

impl SinkSite {
    pub(crate) fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub(crate) fn commits(&self) -> Vec<String> {
        self.commits.borrow().clone()
    }
}

impl BindingSite for SinkSite {
    fn commit(&self, value: &str) {
        self.commits.borrow_mut().push(value.to_string());
    }
}
