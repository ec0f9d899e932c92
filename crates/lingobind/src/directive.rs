#![forbid(unsafe_code)]

//! Template-facing binding constructors.
//!
//! [`translate`] and [`translate_when`] build a [`Directive`]: a plain
//! description of a binding expression with no side effects. The renderer
//! mounts it once with [`Bindings::mount`](crate::Bindings::mount) and feeds
//! later re-renders of the same expression to [`Placeholder::update`].
//!
//! ```
//! use std::rc::Rc;
//! use lingobind::{translate, Bindings, Rendered, site_fn};
//! # use lingobind::{EngineEvent, Keys, Listener, ListenerSet, Options, Subscription, TranslationEngine};
//! # struct Echo(ListenerSet);
//! # impl TranslationEngine for Echo {
//! #     fn resolve(&self, keys: &Keys, _: &Options) -> Option<String> {
//! #         keys.primary().map(str::to_uppercase)
//! #     }
//! #     fn subscribe(&self, _: EngineEvent, l: Listener) -> Subscription { self.0.subscribe(l) }
//! # }
//! let bindings = Bindings::new(Rc::new(Echo(ListenerSet::new())));
//! let (_placeholder, first) = bindings.mount(translate("title"), site_fn(|_| {}));
//! assert_eq!(first, Rendered::Value("TITLE".into()));
//! ```

use std::fmt;

use crate::deferred::TranslateWhen;
use crate::error::{BindError, Result};
use crate::immediate::Translate;
use crate::keys::{Keys, OptionsSource};
use crate::placeholder::Binding;
use crate::readiness::Readiness;
use crate::registry::PlaceholderId;
use crate::site::Rendered;

/// Which placeholder variant a directive builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind {
    Translate,
    TranslateWhen,
}

impl DirectiveKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Translate => "translate",
            Self::TranslateWhen => "translate_when",
        }
    }
}

impl fmt::Display for DirectiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A binding expression as written in a template.
#[derive(Debug, Clone)]
pub enum Directive {
    Translate {
        keys: Keys,
        options: OptionsSource,
    },
    TranslateWhen {
        readiness: Readiness,
        keys: Keys,
        options: OptionsSource,
    },
}

impl Directive {
    #[must_use]
    pub fn kind(&self) -> DirectiveKind {
        match self {
            Self::Translate { .. } => DirectiveKind::Translate,
            Self::TranslateWhen { .. } => DirectiveKind::TranslateWhen,
        }
    }

    #[must_use]
    pub fn keys(&self) -> &Keys {
        match self {
            Self::Translate { keys, .. } | Self::TranslateWhen { keys, .. } => keys,
        }
    }

    /// Attach options: a mapping, a JSON object, or a supplier.
    #[must_use]
    pub fn with_options(mut self, source: impl Into<OptionsSource>) -> Self {
        match &mut self {
            Self::Translate { options, .. } | Self::TranslateWhen { options, .. } => {
                *options = source.into();
            }
        }
        self
    }
}

/// Immediate translation binding.
#[must_use]
pub fn translate(keys: impl Into<Keys>) -> Directive {
    Directive::Translate {
        keys: keys.into(),
        options: OptionsSource::None,
    }
}

/// Translation binding gated on `readiness`.
#[must_use]
pub fn translate_when(readiness: &Readiness, keys: impl Into<Keys>) -> Directive {
    Directive::TranslateWhen {
        readiness: readiness.clone(),
        keys: keys.into(),
        options: OptionsSource::None,
    }
}

/// A mounted placeholder of either variant.
#[derive(Debug)]
pub enum Placeholder {
    Immediate(Translate),
    Deferred(TranslateWhen),
}

impl Placeholder {
    #[must_use]
    pub fn kind(&self) -> DirectiveKind {
        match self {
            Self::Immediate(_) => DirectiveKind::Translate,
            Self::Deferred(_) => DirectiveKind::TranslateWhen,
        }
    }

    /// Re-render with the expression's current directive.
    ///
    /// A directive of the other variant is refused: the renderer has to
    /// disconnect this placeholder and mount a new one.
    pub fn update(&self, directive: Directive) -> Result<Rendered> {
        match (self, directive) {
            (Self::Immediate(placeholder), Directive::Translate { keys, options }) => {
                Ok(placeholder.render(keys, options))
            }
            (
                Self::Deferred(placeholder),
                Directive::TranslateWhen {
                    readiness,
                    keys,
                    options,
                },
            ) => Ok(placeholder.render(&readiness, keys, options)),
            (this, directive) => Err(BindError::DirectiveMismatch {
                expected: this.kind(),
                found: directive.kind(),
            }),
        }
    }

    fn binding(&self) -> &dyn Binding {
        match self {
            Self::Immediate(placeholder) => placeholder,
            Self::Deferred(placeholder) => placeholder,
        }
    }
}

impl Binding for Placeholder {
    fn id(&self) -> PlaceholderId {
        self.binding().id()
    }

    fn is_connected(&self) -> bool {
        self.binding().is_connected()
    }

    fn value(&self) -> String {
        self.binding().value()
    }

    fn evaluate(&self, keys: &Keys, options: &OptionsSource) -> Rendered {
        self.binding().evaluate(keys, options)
    }

    fn on_disconnect(&self) {
        self.binding().on_disconnect();
    }
}

impl From<Translate> for Placeholder {
    fn from(placeholder: Translate) -> Self {
        Self::Immediate(placeholder)
    }
}

impl From<TranslateWhen> for Placeholder {
    fn from(placeholder: TranslateWhen) -> Self {
        Self::Deferred(placeholder)
    }
}
