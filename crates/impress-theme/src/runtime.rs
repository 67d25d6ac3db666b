//! One-time installation of the page features on a document.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, warn};

use crate::clipboard::{CitationCopier, CopyStrategy};
use crate::config::ThemeConfig;
use crate::document::{Document, ReadyState};
use crate::error::Result;
use crate::filter::PublicationFilter;
use crate::platform::Platform;
use crate::reveal::RevealScheduler;

/// The installed features of one page.
pub struct ThemeRuntime<D: Document> {
    doc: Rc<D>,
    copier: CitationCopier<D>,
    reveal: RevealScheduler<D>,
    filter: Rc<RefCell<Option<Rc<PublicationFilter<D>>>>>,
}

/// Validate `config` and wire all features onto `doc`.
///
/// Call once per page. Reveal and search initialize now if the markup is
/// already parsed, otherwise on the content-loaded event.
pub fn install<D: Document>(
    doc: Rc<D>,
    platform: Platform<D::Node>,
    config: ThemeConfig,
) -> Result<ThemeRuntime<D>> {
    config.validate()?;
    let ThemeConfig {
        clipboard,
        reveal,
        filter,
    } = config;

    let copier = CitationCopier::new(
        Rc::clone(&doc),
        Rc::clone(&platform.timers),
        clipboard,
        CopyStrategy::probe(platform.clipboard, platform.secure_context),
    );
    let scheduler = RevealScheduler::new(
        Rc::clone(&doc),
        Rc::clone(&platform.timers),
        platform.observer,
        reveal,
    );

    let init = scheduler.clone();
    when_parsed(doc.as_ref(), move || init.init());

    if doc.ready_state() == ReadyState::Complete {
        scheduler.schedule_post_load_sweep();
    } else {
        let after_load = scheduler.clone();
        doc.on_load(Box::new(move || after_load.schedule_post_load_sweep()));
    }

    let slot = Rc::new(RefCell::new(None));
    if doc.title().contains(&filter.title_marker) {
        let filter_doc = Rc::clone(&doc);
        let filter_slot = Rc::clone(&slot);
        when_parsed(doc.as_ref(), move || {
            if let Some(filter) = PublicationFilter::capture(filter_doc, filter) {
                let filter = Rc::new(filter);
                Rc::clone(&filter).attach();
                *filter_slot.borrow_mut() = Some(filter);
            } else {
                debug!("no search field, publication filter disabled");
            }
        });
    }

    Ok(ThemeRuntime {
        doc,
        copier,
        reveal: scheduler,
        filter: slot,
    })
}

/// Install into `slot` unless a runtime is already there.
///
/// Returns `Ok(false)` without touching the page when `slot` is occupied, so
/// a repeated start cannot register a second set of handlers.
pub fn install_once<D: Document>(
    slot: &RefCell<Option<ThemeRuntime<D>>>,
    doc: Rc<D>,
    platform: Platform<D::Node>,
    config: ThemeConfig,
) -> Result<bool> {
    if slot.borrow().is_some() {
        warn!("theme already installed, ignoring repeated start");
        return Ok(false);
    }
    let runtime = install(doc, platform, config)?;
    *slot.borrow_mut() = Some(runtime);
    Ok(true)
}

/// Run `f` now if the markup is parsed, else on content-loaded.
fn when_parsed<D: Document>(doc: &D, f: impl FnOnce() + 'static) {
    if doc.ready_state().is_parsed() {
        f();
    } else {
        doc.on_content_loaded(Box::new(f));
    }
}

impl<D: Document> ThemeRuntime<D> {
    pub fn document(&self) -> &Rc<D> {
        &self.doc
    }

    /// Copy the citation attached to `trigger`.
    pub fn copy_citation(&self, trigger: &D::Node) {
        self.copier.copy(trigger);
    }

    pub fn copier(&self) -> &CitationCopier<D> {
        &self.copier
    }

    pub fn reveal(&self) -> &RevealScheduler<D> {
        &self.reveal
    }

    /// The publication filter, once initialized on a Publications page.
    pub fn filter(&self) -> Option<Rc<PublicationFilter<D>>> {
        self.filter.borrow().clone()
    }
}
