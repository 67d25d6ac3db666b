//! Publication list search.
//!
//! A linear substring scan over the entries captured at init. Every input
//! change re-evaluates every entry and every group; nothing is indexed.

use std::rc::Rc;

use tracing::debug;

use crate::config::FilterConfig;
use crate::document::Document;

/// Trim and lowercase, for both queries and entry text.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Whether an entry's text matches an already-normalized query.
pub fn matches(normalized_query: &str, entry_text: &str) -> bool {
    normalized_query.is_empty() || normalize(entry_text).contains(normalized_query)
}

/// Indices of the entries visible for `query`.
pub fn visible_subset<S: AsRef<str>>(query: &str, entries: &[S]) -> Vec<usize> {
    let query = normalize(query);
    entries
        .iter()
        .enumerate()
        .filter(|(_, text)| matches(&query, text.as_ref()))
        .map(|(i, _)| i)
        .collect()
}

struct Entry<N> {
    node: N,
    group: Option<N>,
}

/// Search over the publication entries of one page.
pub struct PublicationFilter<D: Document> {
    doc: Rc<D>,
    config: FilterConfig,
    input: D::Node,
    entries: Vec<Entry<D::Node>>,
}

impl<D: Document> PublicationFilter<D> {
    /// Capture the search field and the current entries.
    ///
    /// Returns `None` when the page has no search field. Entries added later
    /// are not tracked.
    pub fn capture(doc: Rc<D>, config: FilterConfig) -> Option<Self> {
        let input = doc.element_by_id(&config.search_input_id)?;
        let entries = doc
            .elements_by_class(&config.entry_class)
            .into_iter()
            .map(|node| {
                let group = doc.closest_with_class(&node, &config.group_class);
                Entry { node, group }
            })
            .collect::<Vec<_>>();
        debug!(entries = entries.len(), "publication filter captured");
        Some(Self {
            doc,
            config,
            input,
            entries,
        })
    }

    pub fn input(&self) -> &D::Node {
        &self.input
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Show matching captured entries, hide the rest, then show only groups
    /// holding at least one displayed entry.
    /// Returns the number of visible entries.
    pub fn apply(&self, query: &str) -> usize {
        let query = normalize(query);
        let mut visible = 0;

        for entry in &self.entries {
            if matches(&query, &self.doc.text_content(&entry.node)) {
                self.doc.set_displayed(&entry.node, true);
                if let Some(group) = &entry.group {
                    self.doc.set_displayed(group, true);
                }
                visible += 1;
            } else {
                self.doc.set_displayed(&entry.node, false);
            }
        }

        // Groups follow the live page, including nested and late-rendered entries.
        for group in self.doc.elements_by_class(&self.config.group_class) {
            let has_visible = self
                .doc
                .descendants_by_class(&group, &self.config.entry_class)
                .iter()
                .any(|entry| self.doc.is_displayed(entry));
            self.doc.set_displayed(&group, has_visible);
        }

        debug!(query = %query, visible, "publications filtered");
        visible
    }

    /// Handle a key press in the search field. The clear key empties the
    /// field, shows everything and drops focus. Returns whether it was handled.
    pub fn handle_key(&self, key: &str) -> bool {
        if key != self.config.clear_key {
            return false;
        }
        self.doc.set_value(&self.input, "");
        self.apply("");
        self.doc.blur(&self.input);
        true
    }

    /// Wire input and key events on the search field.
    pub fn attach(self: Rc<Self>) {
        let on_input = Rc::clone(&self);
        self.doc.on_input(
            &self.input,
            Box::new(move |value| {
                on_input.apply(&value);
            }),
        );

        let on_key = Rc::clone(&self);
        self.doc.on_key_down(
            &self.input,
            Box::new(move |key| {
                on_key.handle_key(key);
            }),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", true)]
    #[case("   ", true)]
    #[case("graph", true)]
    #[case("GRAPH", true)]
    #[case("  Neural  ", true)]
    #[case("2021", false)]
    fn test_matches(#[case] query: &str, #[case] expected: bool) {
        let text = "\n  Neural Graph Networks (2023)\n";
        assert_eq!(matches(&normalize(query), text), expected);
    }

    #[test]
    fn test_visible_subset() {
        let entries = ["Entry A (2023)", "Entry B (2022)", "Survey 2023"];
        assert_eq!(visible_subset("2023", &entries), vec![0, 2]);
        assert_eq!(visible_subset("", &entries), vec![0, 1, 2]);
        assert!(visible_subset("missing", &entries).is_empty());
    }

    #[test]
    fn test_normalize_unicode() {
        assert_eq!(normalize("  ÉCOLE Normale "), "école normale");
    }
}
