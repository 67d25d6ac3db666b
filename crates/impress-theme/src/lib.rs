//! impress-theme: Page behavior for impress static publication sites
//!
//! Three independent features, installed together on one document:
//!
//! - **Citation copy**: copy a trigger's BibTeX to the clipboard, async
//!   clipboard first, legacy copy command as fallback, with transient feedback
//! - **Scroll reveal**: mark `reveal-on-scroll` elements revealed as they near
//!   the viewport, with timed sweeps that guarantee every element is revealed
//! - **Publication search**: filter `publication-card` entries by substring and
//!   hide empty `group-section` containers
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                       impress-theme                        │
//! ├────────────────────────────────────────────────────────────┤
//! │  runtime    │ install(): one-time wiring onto a document   │
//! │  clipboard  │ CopyStrategy probe, CitationCopier           │
//! │  feedback   │ transient "Copied!" label on the trigger     │
//! │  reveal     │ RevealScheduler, VisibilityObserver          │
//! │  filter     │ PublicationFilter, normalize/matches         │
//! │  document   │ Document trait (rendering surface handle)    │
//! │  platform   │ Timers, optional capabilities                │
//! │  headless   │ in-memory document, virtual clock            │
//! │  web        │ web-sys binding (feature `wasm`)             │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Features
//!
//! - `wasm`: browser binding with `start()` and `copyBibtex()` exports (default off)
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use impress_theme::headless::{ManualTimers, MemoryDocument};
//! use impress_theme::{install, Document, Platform, ThemeConfig};
//!
//! let doc = Rc::new(MemoryDocument::new("Home"));
//! let section = doc.create("section", None);
//! doc.add_class(&section, "reveal-on-scroll");
//!
//! let platform = Platform::minimal(Rc::new(ManualTimers::new()));
//! let runtime = install(doc.clone(), platform, ThemeConfig::default()).unwrap();
//! assert!(doc.has_class(&section, "revealed"));
//! # drop(runtime);
//! ```

pub mod clipboard;
pub mod config;
pub mod document;
pub mod error;
pub mod feedback;
pub mod filter;
pub mod headless;
pub mod platform;
pub mod reveal;
pub mod runtime;

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
pub mod web;

pub use clipboard::{AsyncClipboard, CitationCopier, CopyOutcome, CopyStrategy};
pub use config::{ClipboardConfig, FilterConfig, RevealConfig, ThemeConfig};
pub use document::{Document, ReadyState};
pub use error::{ClipboardError, ConfigError, ObserverError, Result, ThemeError};
pub use filter::{normalize, visible_subset, PublicationFilter};
pub use platform::{Platform, Timers};
pub use reveal::{ObserverOptions, RevealScheduler, RevealState, VisibilityObserver};
pub use runtime::{install, install_once, ThemeRuntime};
