#![forbid(unsafe_code)]

//! Service configuration.

use std::fmt;
use std::str::FromStr;

use tracing::warn;

use crate::engine::EngineEvent;
use crate::error::BindError;

/// Env var selecting the [`SweepReentry`] policy.
pub const ENV_SWEEP_REENTRY: &str = "LINGOBIND_SWEEP_REENTRY";
/// Env var listing the events that trigger a sweep (`language,resource`).
pub const ENV_REFRESH_ON: &str = "LINGOBIND_REFRESH_ON";

/// What happens when an engine event arrives while a sweep is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SweepReentry {
    /// Remember the request and run one more sweep when the current one
    /// returns. Any number of nested requests collapse into that one sweep.
    #[default]
    Coalesce,
    /// Run the nested sweep immediately, inside the running one.
    Allow,
    /// Drop the nested request and log a diagnostic.
    Forbid,
}

impl SweepReentry {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Coalesce => "coalesce",
            Self::Allow => "allow",
            Self::Forbid => "forbid",
        }
    }
}

impl fmt::Display for SweepReentry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SweepReentry {
    type Err = BindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "coalesce" | "queue" => Ok(Self::Coalesce),
            "allow" => Ok(Self::Allow),
            "forbid" => Ok(Self::Forbid),
            _ => Err(BindError::InvalidConfig {
                key: ENV_SWEEP_REENTRY,
                value: s.to_string(),
            }),
        }
    }
}

/// Configuration for a [`Bindings`](crate::Bindings) service.
#[derive(Debug, Clone)]
pub struct BindingsConfig {
    /// Reentrant sweep policy.
    /// Env: `LINGOBIND_SWEEP_REENTRY=coalesce|allow|forbid`
    pub reentry: SweepReentry,
    /// Sweep when the engine reports a locale change.
    pub refresh_on_language_changed: bool,
    /// Sweep when the engine reports an added resource bundle.
    pub refresh_on_resource_added: bool,
}

impl Default for BindingsConfig {
    fn default() -> Self {
        Self {
            reentry: SweepReentry::Coalesce,
            refresh_on_language_changed: true,
            refresh_on_resource_added: true,
        }
    }
}

impl BindingsConfig {
    /// Create from environment variables, falling back to defaults for
    /// unset or unparsable values.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) with a custom variable source.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_SWEEP_REENTRY) {
            match raw.parse::<SweepReentry>() {
                Ok(reentry) => config.reentry = reentry,
                Err(err) => warn!(error = %err, "ignoring sweep reentry setting"),
            }
        }

        if let Some(raw) = lookup(ENV_REFRESH_ON) {
            config.refresh_on_language_changed = false;
            config.refresh_on_resource_added = false;
            for token in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
                match token.to_ascii_lowercase().as_str() {
                    "language" | "language_changed" => config.refresh_on_language_changed = true,
                    "resource" | "resource_added" => config.refresh_on_resource_added = true,
                    "none" => {}
                    other => warn!(key = ENV_REFRESH_ON, token = other, "unknown refresh event"),
                }
            }
        }

        config
    }

    #[must_use]
    pub fn with_reentry(mut self, reentry: SweepReentry) -> Self {
        self.reentry = reentry;
        self
    }

    #[must_use]
    pub fn with_refresh_on_language_changed(mut self, enabled: bool) -> Self {
        self.refresh_on_language_changed = enabled;
        self
    }

    #[must_use]
    pub fn with_refresh_on_resource_added(mut self, enabled: bool) -> Self {
        self.refresh_on_resource_added = enabled;
        self
    }

    /// Engine events the gateway subscribes to.
    #[must_use]
    pub fn watched_events(&self) -> Vec<EngineEvent> {
        EngineEvent::ALL
            .into_iter()
            .filter(|event| match event {
                EngineEvent::LanguageChanged => self.refresh_on_language_changed,
                EngineEvent::ResourceAdded => self.refresh_on_resource_added,
            })
            .collect()
    }
}
