//! Scroll reveal scheduling.
//!
//! Every element carrying the reveal class goes `Pending -> Revealed` exactly
//! once. The preferred trigger is an intersection observer; the initial
//! viewport pass and the timed sweeps guarantee that every element ends up
//! revealed even when the observer is missing, fails, or never fires.
//!
//! ```text
//! init ──┬─ none found ── +100ms ── ensure_all_revealed
//!        └─ found ──┬─ viewport pass
//!                   ├─ observer (or ensure_all_revealed if unavailable)
//!                   └─ +500ms, +1500ms ── ensure_all_revealed
//! load ── +100ms ── ensure_all_revealed
//! ```

use std::rc::Rc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::RevealConfig;
use crate::document::Document;
use crate::error::ObserverError;
use crate::platform::Timers;

/// Intersection observer options.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObserverOptions {
    /// Fraction of the target that must be visible
    pub threshold: f64,
    /// Margin added around the viewport, in pixels
    pub root_margin_px: f64,
}

impl ObserverOptions {
    pub fn from_config(config: &RevealConfig) -> Self {
        Self {
            threshold: config.observer_threshold,
            root_margin_px: config.observer_root_margin_px,
        }
    }

    /// CSS margin string, e.g. `100px`.
    pub fn root_margin(&self) -> String {
        format!("{}px", self.root_margin_px)
    }
}

/// Watches targets and reports those entering the (margin-extended) viewport.
pub trait VisibilityObserver<N> {
    /// Start observing `targets` for the rest of the page's life.
    fn observe(
        &self,
        targets: &[N],
        options: &ObserverOptions,
        on_intersect: Rc<dyn Fn(&N)>,
    ) -> Result<(), ObserverError>;
}

/// Per-element reveal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealState {
    Pending,
    Revealed,
}

/// Drives the reveal state machine for one document.
pub struct RevealScheduler<D: Document> {
    doc: Rc<D>,
    timers: Rc<dyn Timers>,
    observer: Option<Rc<dyn VisibilityObserver<D::Node>>>,
    config: Rc<RevealConfig>,
}

impl<D: Document> Clone for RevealScheduler<D> {
    fn clone(&self) -> Self {
        Self {
            doc: Rc::clone(&self.doc),
            timers: Rc::clone(&self.timers),
            observer: self.observer.clone(),
            config: Rc::clone(&self.config),
        }
    }
}

impl<D: Document> RevealScheduler<D> {
    pub fn new(
        doc: Rc<D>,
        timers: Rc<dyn Timers>,
        observer: Option<Rc<dyn VisibilityObserver<D::Node>>>,
        config: RevealConfig,
    ) -> Self {
        Self {
            doc,
            timers,
            observer,
            config: Rc::new(config),
        }
    }

    pub fn state(&self, node: &D::Node) -> RevealState {
        if self.doc.has_class(node, &self.config.revealed_class) {
            RevealState::Revealed
        } else {
            RevealState::Pending
        }
    }

    /// Mark `node` revealed. Returns false if it already was.
    pub fn reveal(&self, node: &D::Node) -> bool {
        if self.state(node) == RevealState::Revealed {
            return false;
        }
        self.doc.add_class(node, &self.config.revealed_class);
        true
    }

    /// Reveal every element still pending. Returns how many changed.
    pub fn ensure_all_revealed(&self) -> usize {
        let revealed = self
            .doc
            .elements_by_class(&self.config.selector_class)
            .iter()
            .filter(|node| self.reveal(node))
            .count();
        if revealed > 0 {
            debug!(revealed, "reveal sweep");
        }
        revealed
    }

    /// Collect elements and start all reveal triggers.
    pub fn init(&self) {
        let nodes = self.doc.elements_by_class(&self.config.selector_class);

        if nodes.is_empty() {
            debug!("no reveal elements yet, retrying");
            self.schedule_sweep(Duration::from_millis(self.config.empty_retry_ms));
            return;
        }
        debug!(count = nodes.len(), "reveal elements collected");

        self.reveal_in_viewport(&nodes);

        if let Err(err) = self.attach_observer(&nodes) {
            warn!("{}, revealing all", err);
            self.ensure_all_revealed();
        }

        for &ms in &self.config.sweep_after_ms {
            self.schedule_sweep(Duration::from_millis(ms));
        }
    }

    /// Reveal nodes whose top edge is within the lookahead of the viewport.
    pub fn reveal_in_viewport(&self, nodes: &[D::Node]) -> usize {
        let limit = self.doc.viewport_height() + self.config.lookahead_px;
        nodes
            .iter()
            .filter(|node| self.doc.top_offset(node) < limit)
            .filter(|node| self.reveal(node))
            .count()
    }

    fn attach_observer(&self, nodes: &[D::Node]) -> Result<(), ObserverError> {
        let observer = self.observer.as_ref().ok_or(ObserverError::Unavailable)?;
        let scheduler = self.clone();
        observer.observe(
            nodes,
            &ObserverOptions::from_config(&self.config),
            Rc::new(move |node| {
                scheduler.reveal(node);
            }),
        )
    }

    /// Run `ensure_all_revealed` after `delay`.
    pub fn schedule_sweep(&self, delay: Duration) {
        let scheduler = self.clone();
        self.timers.set_timeout(
            delay,
            Box::new(move || {
                scheduler.ensure_all_revealed();
            }),
        );
    }

    /// Sweep once the full-load event has fired.
    pub fn schedule_post_load_sweep(&self) {
        self.schedule_sweep(Duration::from_millis(self.config.post_load_sweep_ms));
    }
}
