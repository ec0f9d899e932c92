#![forbid(unsafe_code)]

//! Promise-like readiness signals for deferred placeholders.
//!
//! A [`Readiness`] is the observing half and a [`Settler`] the control half,
//! in the same split as a cancellation source and its token. The signal
//! settles at most once, either ready or failed. Continuations attached
//! while pending run in attachment order when it settles; continuations
//! attached afterwards run immediately.
//!
//! Everything is single-threaded (`Rc<RefCell<..>>`): the host's event loop
//! settles the signal, and continuations run on that same thread.
//!
//! # Example
//!
//! ```
//! use lingobind::readiness::Readiness;
//!
//! let (readiness, settler) = Readiness::pending();
//! assert!(!readiness.is_settled());
//! settler.resolve().unwrap();
//! assert_eq!(readiness.outcome(), Some(Ok(())));
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use thiserror::Error;

use crate::error::{BindError, Result};

/// Failure reported by a readiness signal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("readiness signal failed: {message}")]
pub struct ReadinessError {
    message: String,
}

impl ReadinessError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Final state of a settled signal.
pub type Outcome = std::result::Result<(), ReadinessError>;

type Continuation = Box<dyn FnOnce(&Outcome)>;

enum State {
    Pending(Vec<Continuation>),
    Settled(Outcome),
}

/// Observing half of a readiness signal. Clones share the same signal.
#[derive(Clone)]
pub struct Readiness {
    inner: Rc<RefCell<State>>,
}

/// Control half: settles the signal exactly once.
pub struct Settler {
    inner: Rc<RefCell<State>>,
}

impl Readiness {
    /// A pending signal and the handle that settles it.
    #[must_use]
    pub fn pending() -> (Self, Settler) {
        let inner = Rc::new(RefCell::new(State::Pending(Vec::new())));
        let settler = Settler {
            inner: Rc::clone(&inner),
        };
        (Self { inner }, settler)
    }

    /// An already-ready signal.
    #[must_use]
    pub fn ready() -> Self {
        Self::settled(Ok(()))
    }

    /// An already-failed signal.
    #[must_use]
    pub fn failed(error: ReadinessError) -> Self {
        Self::settled(Err(error))
    }

    fn settled(outcome: Outcome) -> Self {
        Self {
            inner: Rc::new(RefCell::new(State::Settled(outcome))),
        }
    }

    #[must_use]
    pub fn is_settled(&self) -> bool {
        matches!(*self.inner.borrow(), State::Settled(_))
    }

    /// The outcome, if settled.
    #[must_use]
    pub fn outcome(&self) -> Option<Outcome> {
        match &*self.inner.borrow() {
            State::Settled(outcome) => Some(outcome.clone()),
            State::Pending(_) => None,
        }
    }

    /// Attach a continuation that receives the outcome.
    pub fn on_settled(&self, continuation: impl FnOnce(&Outcome) + 'static) {
        let outcome = {
            let mut state = self.inner.borrow_mut();
            match &mut *state {
                State::Pending(waiting) => {
                    waiting.push(Box::new(continuation));
                    return;
                }
                State::Settled(outcome) => outcome.clone(),
            }
        };
        continuation(&outcome);
    }

    /// Continuations waiting on a pending signal.
    #[must_use]
    pub fn waiting_count(&self) -> usize {
        match &*self.inner.borrow() {
            State::Pending(waiting) => waiting.len(),
            State::Settled(_) => 0,
        }
    }
}

impl Settler {
    /// Settle as ready.
    pub fn resolve(&self) -> Result<()> {
        self.settle(Ok(()))
    }

    /// Settle as failed.
    pub fn reject(&self, error: ReadinessError) -> Result<()> {
        self.settle(Err(error))
    }

    /// Settle with `outcome`. A second settle fails with
    /// [`BindError::AlreadySettled`] and leaves the first outcome in place.
    pub fn settle(&self, outcome: Outcome) -> Result<()> {
        let waiting = {
            let mut state = self.inner.borrow_mut();
            let previous = std::mem::replace(&mut *state, State::Settled(outcome.clone()));
            match previous {
                State::Pending(waiting) => waiting,
                State::Settled(prior) => {
                    *state = State::Settled(prior);
                    return Err(BindError::AlreadySettled);
                }
            }
        };
        for continuation in waiting {
            continuation(&outcome);
        }
        Ok(())
    }
}

impl fmt::Debug for Readiness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Readiness")
            .field("outcome", &self.outcome())
            .field("waiting", &self.waiting_count())
            .finish()
    }
}

impl fmt::Debug for Settler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settler").finish_non_exhaustive()
    }
}
