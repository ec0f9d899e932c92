#![forbid(unsafe_code)]

//! Reactive translation placeholders for declarative templates.
//!
//! A template embeds a placeholder that resolves translation keys plus
//! interpolation options to localized text. Whenever the translation engine
//! reports a locale change or a newly added resource bundle, every mounted
//! placeholder is re-resolved and changed text is pushed into the rendered
//! output, without the template rendering again.
//!
//! # Key Components
//!
//! - [`Bindings`] - the service: registry, resolver gateway, refresh sweep
//! - [`translate`] / [`translate_when`] - template-facing constructors
//! - [`Translate`] / [`TranslateWhen`] - immediate and deferred placeholders
//! - [`TranslationEngine`] - the seam to the host's translation engine
//! - [`BindingSite`] - the seam to the host's renderer
//! - [`Readiness`] - promise-like signal gating deferred placeholders
//!
//! # How it fits in the system
//! This crate does no translation lookup and no template diffing. The host
//! supplies both: an engine implementing [`TranslationEngine`], and a
//! renderer that mounts directives at [`BindingSite`]s, commits the first
//! [`Rendered`] value, and calls [`Binding::on_disconnect`] when a site
//! leaves the document.
//!
//! Everything is single-threaded. Logging goes through `tracing`; failures
//! that leave output untouched are reported on the `lingobind::diagnostics`
//! target.

pub mod config;
pub mod deferred;
pub mod directive;
pub mod engine;
pub mod error;
pub mod gateway;
pub mod immediate;
pub mod keys;
pub mod placeholder;
pub mod readiness;
pub mod registry;
pub mod service;
pub mod site;

#[cfg(test)]
mod testing;

pub use config::{BindingsConfig, SweepReentry};
pub use deferred::TranslateWhen;
pub use directive::{Directive, DirectiveKind, Placeholder, translate, translate_when};
pub use engine::{EngineEvent, Listener, ListenerSet, Subscription, TranslationEngine};
pub use error::{BindError, Result};
pub use gateway::ResolverGateway;
pub use immediate::Translate;
pub use keys::{Keys, Options, OptionsSource};
pub use placeholder::Binding;
pub use readiness::{Readiness, ReadinessError, Settler};
pub use registry::{PlaceholderId, PlaceholderRegistry, RegistryEntry};
pub use service::{Bindings, SweepReport};
pub use site::{BindingSite, FnSite, Rendered, site_fn};
