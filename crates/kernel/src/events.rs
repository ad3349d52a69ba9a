//! Adapt-form extension point.
//!
//! When the admin edit form for a page is assembled, every registered
//! [`AdaptFormListener`] gets a chance to add tabs or fields. Listeners see the
//! page, node, translation, and version being edited but cannot replace them;
//! the tab pane is the only thing they can change.
//!
//! The request and tab pane types belong to whatever form layer hosts the
//! editor, so both are generic here.

use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, error};

use crate::models::{Node, NodeTranslation, NodeVersion, PageRef};

/// Everything a listener may look at while adapting an edit form.
pub struct AdaptFormEvent<'a, R, T> {
    request: &'a R,
    tab_pane: &'a mut T,
    page: &'a PageRef,
    node: &'a Node,
    translation: &'a NodeTranslation,
    version: &'a NodeVersion,
}

impl<'a, R, T> AdaptFormEvent<'a, R, T> {
    pub fn new(
        request: &'a R,
        tab_pane: &'a mut T,
        page: &'a PageRef,
        node: &'a Node,
        translation: &'a NodeTranslation,
        version: &'a NodeVersion,
    ) -> Self {
        Self {
            request,
            tab_pane,
            page,
            node,
            translation,
            version,
        }
    }

    pub fn request(&self) -> &R {
        self.request
    }

    pub fn tab_pane(&self) -> &T {
        self.tab_pane
    }

    /// The tab pane, for adding tabs or fields.
    pub fn tab_pane_mut(&mut self) -> &mut T {
        self.tab_pane
    }

    pub fn page(&self) -> &PageRef {
        self.page
    }

    pub fn node(&self) -> &Node {
        self.node
    }

    pub fn translation(&self) -> &NodeTranslation {
        self.translation
    }

    pub fn version(&self) -> &NodeVersion {
        self.version
    }
}

/// Hook invoked while an edit form is being built.
pub trait AdaptFormListener<R, T>: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Adapt the form. An error is logged and the remaining listeners still run.
    fn adapt_form(&self, event: &mut AdaptFormEvent<'_, R, T>) -> Result<()>;
}

/// Calls adapt-form listeners in registration order.
pub struct AdaptFormDispatcher<R, T> {
    listeners: Vec<Arc<dyn AdaptFormListener<R, T>>>,
}

impl<R, T> Default for AdaptFormDispatcher<R, T> {
    fn default() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }
}

impl<R, T> AdaptFormDispatcher<R, T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a listener after all previously registered ones.
    pub fn register(&mut self, listener: Arc<dyn AdaptFormListener<R, T>>) {
        debug!(listener = listener.name(), "registered adapt-form listener");
        self.listeners.push(listener);
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Run every listener against the event.
    ///
    /// Returns the number of listeners that succeeded.
    pub fn dispatch(&self, event: &mut AdaptFormEvent<'_, R, T>) -> usize {
        let mut succeeded = 0;
        for listener in &self.listeners {
            match listener.adapt_form(event) {
                Ok(()) => succeeded += 1,
                Err(e) => {
                    error!(
                        listener = listener.name(),
                        node = %event.node().id,
                        error = %e,
                        "adapt-form listener failed"
                    );
                }
            }
        }

        debug!(
            listeners = self.listeners.len(),
            succeeded,
            node = %event.node().id,
            "adapt-form dispatch complete"
        );
        succeeded
    }
}
