//! Headless page fixtures

use std::rc::Rc;

use impress_theme::headless::{ManualTimers, MemoryDocument, NodeId};
use impress_theme::Document;

/// A publications page: a search field and year groups of entries.
pub struct PublicationsPage {
    pub doc: Rc<MemoryDocument>,
    pub input: NodeId,
    pub groups: Vec<NodeId>,
    pub entries: Vec<NodeId>,
}

/// Build a publications page from `(group label, entry texts)` pairs.
pub fn publications_page(groups: &[(&str, &[&str])]) -> PublicationsPage {
    let doc = Rc::new(MemoryDocument::new("Publications | Jane Doe"));
    let input = doc.create("input", None);
    doc.set_id(&input, "search-input");

    let mut group_nodes = Vec::new();
    let mut entries = Vec::new();
    for (label, texts) in groups {
        let group = doc.create("section", None);
        doc.add_class(&group, "group-section");
        let heading = doc.create("h2", Some(group));
        doc.set_text(&heading, label);
        for text in texts.iter() {
            entries.push(add_entry(&doc, Some(group), text));
        }
        group_nodes.push(group);
    }

    PublicationsPage {
        doc,
        input,
        groups: group_nodes,
        entries,
    }
}

/// Add a publication card with a title child, like the site templates.
pub fn add_entry(doc: &MemoryDocument, group: Option<NodeId>, text: &str) -> NodeId {
    let card = doc.create("article", group);
    doc.add_class(&card, "publication-card");
    let title = doc.create("h3", Some(card));
    doc.set_text(&title, text);
    card
}

/// Add reveal sections at the given viewport offsets.
#[allow(dead_code)]
pub fn add_reveal_sections(doc: &MemoryDocument, tops: &[f64]) -> Vec<NodeId> {
    tops.iter()
        .map(|&top| {
            let node = doc.create("section", None);
            doc.add_class(&node, "reveal-on-scroll");
            doc.set_top(&node, top);
            node
        })
        .collect()
}

/// Add a citation button carrying `bibtex`.
#[allow(dead_code)]
pub fn add_citation_button(doc: &MemoryDocument, bibtex: &str) -> NodeId {
    let button = doc.create("button", None);
    doc.set_attribute(&button, "data-bibtex", bibtex);
    doc.set_inner_html(&button, "<i class=\"fas fa-copy\"></i> BibTeX");
    button
}

#[allow(dead_code)]
pub fn timers() -> Rc<ManualTimers> {
    Rc::new(ManualTimers::new())
}

/// Entries currently displayed.
#[allow(dead_code)]
pub fn displayed(doc: &MemoryDocument, nodes: &[NodeId]) -> Vec<bool> {
    nodes.iter().map(|node| doc.is_displayed(node)).collect()
}
