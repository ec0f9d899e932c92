#![forbid(unsafe_code)]

//! Immediate placeholder: resolves synchronously on every render.

use std::fmt;
use std::rc::Rc;

use crate::keys::{Keys, OptionsSource};
use crate::placeholder::{Binding, PlaceholderCore};
use crate::registry::PlaceholderId;
use crate::site::Rendered;

/// Placeholder that resolves against whatever resources are loaded now.
///
/// If resources load or the locale changes later, the refresh sweep
/// corrects the committed text through the site.
pub struct Translate {
    core: Rc<PlaceholderCore>,
}

impl Translate {
    pub(crate) fn new(core: Rc<PlaceholderCore>) -> Self {
        Self { core }
    }

    /// Render (or re-render) the binding expression.
    pub fn render(&self, keys: impl Into<Keys>, options: impl Into<OptionsSource>) -> Rendered {
        self.core.evaluate(&keys.into(), &options.into())
    }
}

impl Binding for Translate {
    fn id(&self) -> PlaceholderId {
        self.core.id()
    }

    fn is_connected(&self) -> bool {
        self.core.is_connected()
    }

    fn value(&self) -> String {
        self.core.value()
    }

    fn evaluate(&self, keys: &Keys, options: &OptionsSource) -> Rendered {
        self.core.evaluate(keys, options)
    }

    fn on_disconnect(&self) {
        self.core.disconnect();
    }
}

impl fmt::Debug for Translate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Translate").field(&self.core).finish()
    }
}
