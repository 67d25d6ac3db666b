//! Platform capabilities, probed once at install.

use std::rc::Rc;
use std::time::Duration;

use crate::clipboard::AsyncClipboard;
use crate::reveal::VisibilityObserver;

/// Fire-and-forget timer scheduling. There is no cancellation.
pub trait Timers {
    fn set_timeout(&self, delay: Duration, task: Box<dyn FnOnce()>);
}

/// What the host platform offers.
///
/// Optional capabilities are `None` when the platform lacks them; the
/// features pick their fallback from this once, at install.
pub struct Platform<N> {
    pub timers: Rc<dyn Timers>,
    /// Whether the page runs in a secure context (required for the async clipboard)
    pub secure_context: bool,
    pub clipboard: Option<Rc<dyn AsyncClipboard>>,
    pub observer: Option<Rc<dyn VisibilityObserver<N>>>,
}

impl<N> Platform<N> {
    /// A platform with timers only: legacy copy and forced reveal.
    pub fn minimal(timers: Rc<dyn Timers>) -> Self {
        Self {
            timers,
            secure_context: false,
            clipboard: None,
            observer: None,
        }
    }

    pub fn with_clipboard(
        mut self,
        clipboard: Rc<dyn AsyncClipboard>,
        secure_context: bool,
    ) -> Self {
        self.clipboard = Some(clipboard);
        self.secure_context = secure_context;
        self
    }

    pub fn with_observer(mut self, observer: Rc<dyn VisibilityObserver<N>>) -> Self {
        self.observer = Some(observer);
        self
    }
}
