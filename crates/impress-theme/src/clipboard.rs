//! Citation copy with async clipboard and legacy fallback.
//!
//! The strategy is chosen once from the probed platform:
//!
//! - `AsyncWithFallback`: secure context with an async clipboard. A rejected
//!   write falls through to the legacy path.
//! - `Legacy`: off-screen text area, select, copy command.
//!
//! Failures never escape. The user sees "Copied!" or "Failed to copy".

use std::rc::Rc;

use tracing::{debug, warn};

use crate::config::ClipboardConfig;
use crate::document::Document;
use crate::error::ClipboardError;
use crate::feedback::show_copy_feedback;
use crate::platform::Timers;

/// Asynchronous clipboard write. `done` is called later, exactly once.
pub trait AsyncClipboard {
    fn write_text(&self, text: &str, done: Box<dyn FnOnce(Result<(), ClipboardError>)>);
}

/// How citation text reaches the clipboard.
#[derive(Clone)]
pub enum CopyStrategy {
    AsyncWithFallback(Rc<dyn AsyncClipboard>),
    Legacy,
}

impl CopyStrategy {
    /// Pick the strategy from the platform's capabilities.
    pub fn probe(clipboard: Option<Rc<dyn AsyncClipboard>>, secure_context: bool) -> Self {
        match clipboard {
            Some(clipboard) if secure_context => Self::AsyncWithFallback(clipboard),
            _ => Self::Legacy,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::AsyncWithFallback(_) => "async",
            Self::Legacy => "legacy",
        }
    }
}

impl std::fmt::Debug for CopyStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of a copy attempt, as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    Copied,
    Failed,
}

impl CopyOutcome {
    pub fn message<'a>(&self, config: &'a ClipboardConfig) -> &'a str {
        match self {
            Self::Copied => &config.success_message,
            Self::Failed => &config.failure_message,
        }
    }
}

/// Copies the citation attached to a trigger control.
pub struct CitationCopier<D: Document> {
    doc: Rc<D>,
    timers: Rc<dyn Timers>,
    config: Rc<ClipboardConfig>,
    strategy: CopyStrategy,
}

impl<D: Document> Clone for CitationCopier<D> {
    fn clone(&self) -> Self {
        Self {
            doc: Rc::clone(&self.doc),
            timers: Rc::clone(&self.timers),
            config: Rc::clone(&self.config),
            strategy: self.strategy.clone(),
        }
    }
}

impl<D: Document> CitationCopier<D> {
    pub fn new(
        doc: Rc<D>,
        timers: Rc<dyn Timers>,
        config: ClipboardConfig,
        strategy: CopyStrategy,
    ) -> Self {
        debug!(strategy = strategy.name(), "citation copy strategy selected");
        Self {
            doc,
            timers,
            config: Rc::new(config),
            strategy,
        }
    }

    pub fn strategy(&self) -> &CopyStrategy {
        &self.strategy
    }

    /// Copy the trigger's citation and show feedback on the trigger.
    ///
    /// With the async strategy the outcome arrives later; feedback is shown
    /// from the completion callback.
    pub fn copy(&self, trigger: &D::Node) {
        let Some(text) = self.doc.attribute(trigger, &self.config.citation_attribute) else {
            let err = ClipboardError::MissingCitation {
                attribute: self.config.citation_attribute.clone(),
            };
            warn!("{}", err);
            self.finish(trigger, CopyOutcome::Failed);
            return;
        };

        match &self.strategy {
            CopyStrategy::AsyncWithFallback(clipboard) => {
                let copier = self.clone();
                let trigger = trigger.clone();
                let fallback_text = text.clone();
                clipboard.write_text(
                    &text,
                    Box::new(move |result| match result {
                        Ok(()) => copier.finish(&trigger, CopyOutcome::Copied),
                        Err(err) => {
                            warn!("{}, using legacy copy", err);
                            copier.copy_legacy(&fallback_text, &trigger);
                        }
                    }),
                );
            }
            CopyStrategy::Legacy => self.copy_legacy(&text, trigger),
        }
    }

    fn copy_legacy(&self, text: &str, trigger: &D::Node) {
        let outcome = match legacy_copy(self.doc.as_ref(), text) {
            Ok(()) => CopyOutcome::Copied,
            Err(err) => {
                warn!("{}", err);
                CopyOutcome::Failed
            }
        };
        self.finish(trigger, outcome);
    }

    fn finish(&self, trigger: &D::Node, outcome: CopyOutcome) {
        debug!(?outcome, "citation copy finished");
        show_copy_feedback(
            &self.doc,
            self.timers.as_ref(),
            &self.config,
            trigger,
            outcome.message(&self.config),
        );
    }
}

/// Copy through a temporary off-screen text area.
///
/// The text area is removed on every path before returning.
pub fn legacy_copy<D: Document + ?Sized>(doc: &D, text: &str) -> Result<(), ClipboardError> {
    let area = doc
        .append_offscreen_text_area(text)
        .map_err(ClipboardError::CommandFailed)?;
    doc.focus_and_select(&area);
    let result = doc.exec_copy();
    doc.remove_node(&area);

    match result {
        Ok(true) => Ok(()),
        Ok(false) => Err(ClipboardError::CommandFailed(
            "copy command not supported".to_string(),
        )),
        Err(message) => Err(ClipboardError::CommandFailed(message)),
    }
}
