//! Configuration for impress-theme
//!
//! Class names, element ids, messages and timings used by the three page
//! features. Defaults match the markup produced by the impress site templates.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Theme-wide configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    /// Citation copy settings
    pub clipboard: ClipboardConfig,
    /// Scroll reveal settings
    pub reveal: RevealConfig,
    /// Publication search settings
    pub filter: FilterConfig,
}

/// Citation copy configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipboardConfig {
    /// Attribute on the trigger holding the citation text
    pub citation_attribute: String,
    pub success_message: String,
    pub failure_message: String,
    /// Markup placed before the feedback message
    pub feedback_icon: String,
    /// Class added to the trigger while feedback is shown
    pub copied_class: String,
    /// How long the feedback stays before the trigger is restored
    pub feedback_ms: u64,
}

impl Default for ClipboardConfig {
    fn default() -> Self {
        Self {
            citation_attribute: "data-bibtex".to_string(),
            success_message: "Copied!".to_string(),
            failure_message: "Failed to copy".to_string(),
            feedback_icon: "<i class=\"fas fa-check\"></i>".to_string(),
            copied_class: "copied".to_string(),
            feedback_ms: 2000,
        }
    }
}

impl ClipboardConfig {
    pub fn feedback_delay(&self) -> Duration {
        Duration::from_millis(self.feedback_ms)
    }
}

/// Scroll reveal configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    /// Class marking elements that start hidden
    pub selector_class: String,
    /// Class added once an element is revealed
    pub revealed_class: String,
    /// Elements whose top edge is above `viewport_height + lookahead_px` reveal at init
    pub lookahead_px: f64,
    /// Retry delay when no elements exist at init
    pub empty_retry_ms: u64,
    /// Unconditional sweeps, measured from init
    pub sweep_after_ms: Vec<u64>,
    /// Sweep delay after the full-load event
    pub post_load_sweep_ms: u64,
    /// Fraction of the element that must be visible
    pub observer_threshold: f64,
    /// Margin around the viewport that pre-triggers the observer
    pub observer_root_margin_px: f64,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            selector_class: "reveal-on-scroll".to_string(),
            revealed_class: "revealed".to_string(),
            lookahead_px: 200.0,
            empty_retry_ms: 100,
            sweep_after_ms: vec![500, 1500],
            post_load_sweep_ms: 100,
            observer_threshold: 0.05,
            observer_root_margin_px: 100.0,
        }
    }
}

/// Publication search configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// The filter is only wired when the document title contains this
    pub title_marker: String,
    pub search_input_id: String,
    pub entry_class: String,
    pub group_class: String,
    /// Key that clears the search field
    pub clear_key: String,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            title_marker: "Publications".to_string(),
            search_input_id: "search-input".to_string(),
            entry_class: "publication-card".to_string(),
            group_class: "group-section".to_string(),
            clear_key: "Escape".to_string(),
        }
    }
}

impl ThemeConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a JSON string
    pub fn from_json(json_str: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json_str)?)
    }

    /// Load configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize configuration to JSON
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let names = [
            ("clipboard.citation_attribute", &self.clipboard.citation_attribute),
            ("clipboard.copied_class", &self.clipboard.copied_class),
            ("reveal.selector_class", &self.reveal.selector_class),
            ("reveal.revealed_class", &self.reveal.revealed_class),
            ("filter.title_marker", &self.filter.title_marker),
            ("filter.search_input_id", &self.filter.search_input_id),
            ("filter.entry_class", &self.filter.entry_class),
            ("filter.group_class", &self.filter.group_class),
            ("filter.clear_key", &self.filter.clear_key),
        ];
        for (field, value) in names {
            if value.trim().is_empty() {
                return Err(ConfigError::EmptyName(field));
            }
        }

        if self.clipboard.feedback_ms == 0 {
            return Err(ConfigError::OutOfRange(
                "clipboard.feedback_ms must be positive".to_string(),
            ));
        }

        let floats = [
            ("reveal.lookahead_px", self.reveal.lookahead_px),
            ("reveal.observer_threshold", self.reveal.observer_threshold),
            ("reveal.observer_root_margin_px", self.reveal.observer_root_margin_px),
        ];
        for (field, value) in floats {
            if !value.is_finite() {
                return Err(ConfigError::OutOfRange(format!(
                    "{} must be finite, got {}",
                    field, value
                )));
            }
        }

        let threshold = self.reveal.observer_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ConfigError::OutOfRange(format!(
                "reveal.observer_threshold must be between 0.0 and 1.0, got {}",
                threshold
            )));
        }

        if self.reveal.lookahead_px < 0.0 || self.reveal.observer_root_margin_px < 0.0 {
            return Err(ConfigError::OutOfRange(
                "reveal margins must not be negative".to_string(),
            ));
        }

        Ok(())
    }
}
