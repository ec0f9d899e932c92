#![forbid(unsafe_code)]

//! Deferred placeholder: waits for a readiness signal before resolving.
//!
//! `render` never blocks the render pass. It returns
//! [`Rendered::NoChange`] and attaches a continuation to the signal. When
//! the signal becomes ready the placeholder evaluates and pushes any change
//! through its site; when it fails the failure goes to the
//! `lingobind::diagnostics` target and nothing is pushed.
//!
//! The continuation only holds a weak handle. If the placeholder is gone by
//! the time the signal settles, the continuation does nothing; if it is
//! merely disconnected, evaluation yields `NoChange` and nothing is pushed.

use std::fmt;
use std::rc::Rc;

use tracing::error;

use crate::keys::{Keys, OptionsSource};
use crate::placeholder::{Binding, PlaceholderCore};
use crate::readiness::Readiness;
use crate::registry::PlaceholderId;
use crate::site::Rendered;

/// Placeholder gated on an external readiness signal.
pub struct TranslateWhen {
    core: Rc<PlaceholderCore>,
}

impl TranslateWhen {
    pub(crate) fn new(core: Rc<PlaceholderCore>) -> Self {
        Self { core }
    }

    /// Render the binding expression. Always returns `NoChange`; the value
    /// arrives later through the site.
    pub fn render(
        &self,
        readiness: &Readiness,
        keys: impl Into<Keys>,
        options: impl Into<OptionsSource>,
    ) -> Rendered {
        let keys = keys.into();
        let options = options.into();
        let id = self.core.id();
        let core = Rc::downgrade(&self.core);

        readiness.on_settled(move |outcome| match outcome {
            Ok(()) => {
                if let Some(core) = core.upgrade() {
                    let rendered = core.evaluate(&keys, &options);
                    core.push(&rendered);
                }
            }
            Err(err) => {
                error!(
                    target: "lingobind::diagnostics",
                    placeholder = %id,
                    keys = %keys,
                    error = %err,
                    "readiness signal failed; keeping committed output"
                );
            }
        });
        Rendered::NoChange
    }
}

impl Binding for TranslateWhen {
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

impl fmt::Debug for TranslateWhen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TranslateWhen").field(&self.core).finish()
    }
}
