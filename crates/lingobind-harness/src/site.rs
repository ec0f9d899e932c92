//! Recording binding site.

use std::cell::RefCell;
use std::rc::Rc;

use lingobind::{BindingSite, Rendered};

/// A binding site that mimics a renderer's view of one mounted position.
///
/// `displayed` is what the document currently shows: it changes when the
/// renderer applies a returned [`Rendered::Value`] or when a placeholder
/// commits out of band. `commits` records only the out-of-band pushes, so
/// tests can assert that the update hook was (or was not) invoked.
#[derive(Debug, Default)]
pub struct RecordingSite {
    displayed: RefCell<Option<String>>,
    commits: RefCell<Vec<String>>,
}

impl RecordingSite {
    #[must_use]
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Apply the return value of a render pass, as a renderer would.
    pub fn apply(&self, rendered: &Rendered) {
        if let Rendered::Value(value) = rendered {
            *self.displayed.borrow_mut() = Some(value.clone());
        }
    }

    /// Current text, or `None` if nothing has been committed yet.
    #[must_use]
    pub fn displayed(&self) -> Option<String> {
        self.displayed.borrow().clone()
    }

    /// Out-of-band pushes in arrival order.
    #[must_use]
    pub fn commits(&self) -> Vec<String> {
        self.commits.borrow().clone()
    }

    #[must_use]
    pub fn commit_count(&self) -> usize {
        self.commits.borrow().len()
    }
}

impl BindingSite for RecordingSite {
    fn commit(&self, value: &str) {
        self.commits.borrow_mut().push(value.to_string());
        *self.displayed.borrow_mut() = Some(value.to_string());
    }
}
