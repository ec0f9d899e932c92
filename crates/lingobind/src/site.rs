#![forbid(unsafe_code)]

//! The renderer seam: render outcomes and out-of-band commits.

use std::fmt;
use std::rc::Rc;

/// Outcome of evaluating a placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Rendered {
    /// Leave the previously committed output untouched.
    NoChange,
    /// Commit this text.
    Value(String),
}

impl Rendered {
    #[must_use]
    pub fn is_no_change(&self) -> bool {
        matches!(self, Self::NoChange)
    }

    #[must_use]
    pub fn as_value(&self) -> Option<&str> {
        match self {
            Self::Value(value) => Some(value),
            Self::NoChange => None,
        }
    }

    #[must_use]
    pub fn into_value(self) -> Option<String> {
        match self {
            Self::Value(value) => Some(value),
            Self::NoChange => None,
        }
    }
}

/// A mounted binding site as exposed by the renderer.
///
/// The renderer hands one to every placeholder at mount time.
/// [`BindingSite::commit`] pushes text outside the normal render return
/// path; placeholders call it from refresh sweeps and once a readiness
/// signal settles.
pub trait BindingSite {
    fn commit(&self, value: &str);
}

/// [`BindingSite`] backed by a closure.
pub struct FnSite<F>(F);

impl<F: Fn(&str)> BindingSite for FnSite<F> {
    fn commit(&self, value: &str) {
        (self.0)(value);
    }
}

impl<F> fmt::Debug for FnSite<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnSite").finish_non_exhaustive()
    }
}

/// Build a shared site from a commit closure.
pub fn site_fn(commit: impl Fn(&str) + 'static) -> Rc<dyn BindingSite> {
    Rc::new(FnSite(commit))
}
