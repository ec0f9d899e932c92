#![forbid(unsafe_code)]

//! Translation keys and interpolation options at the binding boundary.
//!
//! Templates hand keys over either as a single key or as an ordered list of
//! fallback keys, and options either as a mapping or as a supplier closure
//! that produces one per render pass. Both shapes are normalized here before
//! anything reaches the registry or the engine:
//!
//! - [`Keys`] always holds an ordered, non-nested sequence of key strings.
//! - [`OptionsSource::normalize`] always yields a plain [`Options`] mapping.

use std::fmt;
use std::rc::Rc;

use serde_json::{Map, Value};

/// Named interpolation and configuration parameters passed to the engine.
///
/// The mapping is open: interpolation values, a pluralization `count`,
/// a `context`, or anything else the engine understands.
pub type Options = Map<String, Value>;

/// One key or an ordered list of fallback keys.
///
/// The first resolvable key wins; which key is "resolvable" is decided by
/// the translation engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Keys(Vec<String>);

impl Keys {
    /// A single key.
    #[must_use]
    pub fn one(key: impl Into<String>) -> Self {
        Self(vec![key.into()])
    }

    /// An ordered fallback list.
    #[must_use]
    pub fn many<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(keys.into_iter().map(Into::into).collect())
    }

    /// The first key in fallback order.
    #[must_use]
    pub fn primary(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Keys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_slice() {
            [single] => f.write_str(single),
            many => write!(f, "[{}]", many.join(", ")),
        }
    }
}

impl From<&str> for Keys {
    fn from(key: &str) -> Self {
        Self::one(key)
    }
}

impl From<String> for Keys {
    fn from(key: String) -> Self {
        Self::one(key)
    }
}

impl From<&String> for Keys {
    fn from(key: &String) -> Self {
        Self::one(key.as_str())
    }
}

impl From<Vec<String>> for Keys {
    fn from(keys: Vec<String>) -> Self {
        Self(keys)
    }
}

impl From<Vec<&str>> for Keys {
    fn from(keys: Vec<&str>) -> Self {
        Self::many(keys)
    }
}

impl From<&[&str]> for Keys {
    fn from(keys: &[&str]) -> Self {
        Self::many(keys.iter().copied())
    }
}

impl<const N: usize> From<[&str; N]> for Keys {
    fn from(keys: [&str; N]) -> Self {
        Self::many(keys)
    }
}

impl From<&Keys> for Keys {
    fn from(keys: &Keys) -> Self {
        keys.clone()
    }
}

type Supplier = Rc<dyn Fn() -> Options>;

/// Options as supplied by a template: absent, a mapping, or a supplier.
///
/// A supplier is evaluated eagerly each time the placeholder evaluates, so
/// callers can compute option values lazily per render pass.
#[derive(Clone, Default)]
pub enum OptionsSource {
    /// No options; normalizes to an empty mapping.
    #[default]
    None,
    Map(Options),
    Supplier(Supplier),
}

impl OptionsSource {
    /// Wrap a zero-argument closure producing the options.
    pub fn supplier(f: impl Fn() -> Options + 'static) -> Self {
        Self::Supplier(Rc::new(f))
    }

    /// Produce the plain mapping handed to the registry and the engine.
    #[must_use]
    pub fn normalize(&self) -> Options {
        match self {
            Self::None => Options::new(),
            Self::Map(options) => options.clone(),
            Self::Supplier(supplier) => supplier(),
        }
    }
}

impl fmt::Debug for OptionsSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Map(options) => f.debug_tuple("Map").field(options).finish(),
            Self::Supplier(_) => f.write_str("Supplier(..)"),
        }
    }
}

impl From<Options> for OptionsSource {
    fn from(options: Options) -> Self {
        Self::Map(options)
    }
}

impl From<Option<Options>> for OptionsSource {
    fn from(options: Option<Options>) -> Self {
        options.map_or(Self::None, Self::Map)
    }
}

/// Objects become a mapping. Any other JSON value carries no named
/// parameters and normalizes to an empty mapping.
impl From<Value> for OptionsSource {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(options) => Self::Map(options),
            _ => Self::None,
        }
    }
}
