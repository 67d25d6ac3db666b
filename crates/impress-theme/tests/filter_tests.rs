//! Publication search integration tests

mod common;

use std::rc::Rc;

use common::{add_entry, displayed, publications_page, timers};
use impress_theme::headless::MemoryDocument;
use impress_theme::{install, visible_subset, Document, Platform, ReadyState, ThemeConfig};
use proptest::prelude::*;

// === Scenarios ===

#[test]
fn test_year_query_hides_other_group() {
    let page = publications_page(&[("2023", &["Entry A (2023)"]), ("2022", &["Entry B (2022)"])]);
    let runtime = install(
        page.doc.clone(),
        Platform::minimal(timers()),
        ThemeConfig::default(),
    )
    .unwrap();
    assert!(runtime.filter().is_some());

    page.doc.type_text(&page.input, "2023");

    assert_eq!(displayed(&page.doc, &page.entries), vec![true, false]);
    assert_eq!(displayed(&page.doc, &page.groups), vec![true, false]);
}

#[test]
fn test_escape_clears_and_blurs() {
    let page = publications_page(&[
        ("2023", &["Graph Neural Networks", "Protein Folding"]),
        ("2021", &["Dark Matter Halos"]),
    ]);
    let _runtime = install(
        page.doc.clone(),
        Platform::minimal(timers()),
        ThemeConfig::default(),
    )
    .unwrap();

    page.doc.focus(&page.input);
    page.doc.type_text(&page.input, "graph");
    assert_eq!(displayed(&page.doc, &page.entries), vec![true, false, false]);
    assert_eq!(displayed(&page.doc, &page.groups), vec![true, false]);

    page.doc.press_key(&page.input, "Escape");

    assert_eq!(page.doc.value(&page.input), "");
    assert_eq!(displayed(&page.doc, &page.entries), vec![true, true, true]);
    assert_eq!(displayed(&page.doc, &page.groups), vec![true, true]);
    assert_eq!(page.doc.focused(), None);
}

#[test]
fn test_other_keys_ignored() {
    let page = publications_page(&[("2023", &["Graph Neural Networks", "Protein Folding"])]);
    let _runtime = install(
        page.doc.clone(),
        Platform::minimal(timers()),
        ThemeConfig::default(),
    )
    .unwrap();

    page.doc.focus(&page.input);
    page.doc.type_text(&page.input, "protein");
    page.doc.press_key(&page.input, "Enter");

    assert_eq!(page.doc.value(&page.input), "protein");
    assert_eq!(displayed(&page.doc, &page.entries), vec![false, true]);
    assert_eq!(page.doc.focused(), Some(page.input));
}

#[test]
fn test_case_and_whitespace_insensitive() {
    let page = publications_page(&[("2020", &["Spectral Methods for PDEs"])]);
    let _runtime = install(
        page.doc.clone(),
        Platform::minimal(timers()),
        ThemeConfig::default(),
    )
    .unwrap();

    page.doc.type_text(&page.input, "   SPECTRAL methods  ");
    assert_eq!(displayed(&page.doc, &page.entries), vec![true]);

    page.doc.type_text(&page.input, "   ");
    assert_eq!(displayed(&page.doc, &page.entries), vec![true]);
}

#[test]
fn test_entry_without_group() {
    let page = publications_page(&[("2023", &["Grouped Paper"])]);
    let loose = add_entry(&page.doc, None, "Loose Paper");
    let _runtime = install(
        page.doc.clone(),
        Platform::minimal(timers()),
        ThemeConfig::default(),
    )
    .unwrap();

    page.doc.type_text(&page.input, "loose");
    assert!(page.doc.is_displayed(&loose));
    assert_eq!(displayed(&page.doc, &page.entries), vec![false]);
    assert_eq!(displayed(&page.doc, &page.groups), vec![false]);
}

#[test]
fn test_nested_groups_follow_inner_entries() {
    let page = publications_page(&[]);
    let outer = page.doc.create("section", None);
    page.doc.add_class(&outer, "group-section");
    let inner = page.doc.create("div", Some(outer));
    page.doc.add_class(&inner, "group-section");
    let card = add_entry(&page.doc, Some(inner), "Graph Paper");
    let _runtime = install(
        page.doc.clone(),
        Platform::minimal(timers()),
        ThemeConfig::default(),
    )
    .unwrap();

    page.doc.type_text(&page.input, "zzz");
    assert_eq!(displayed(&page.doc, &[card, inner, outer]), vec![false, false, false]);

    page.doc.type_text(&page.input, "graph");
    assert_eq!(displayed(&page.doc, &[card, inner, outer]), vec![true, true, true]);
}

#[test]
fn test_groups_see_late_rendered_entries() {
    let page = publications_page(&[("2023", &["Entry A"])]);
    let _runtime = install(
        page.doc.clone(),
        Platform::minimal(timers()),
        ThemeConfig::default(),
    )
    .unwrap();

    page.doc.type_text(&page.input, "x");
    assert_eq!(displayed(&page.doc, &page.groups), vec![false]);

    // Rendered after capture: the card is untracked but still counts for its group.
    let late_group = page.doc.create("section", None);
    page.doc.add_class(&late_group, "group-section");
    let late_card = add_entry(&page.doc, Some(late_group), "Late Entry");
    let late_in_old_group = add_entry(&page.doc, Some(page.groups[0]), "Also Late");

    page.doc.type_text(&page.input, "xy");
    assert_eq!(displayed(&page.doc, &page.entries), vec![false]);
    assert!(page.doc.is_displayed(&late_in_old_group));
    assert_eq!(displayed(&page.doc, &page.groups), vec![true]);
    assert!(page.doc.is_displayed(&late_group));

    page.doc.press_key(&page.input, "Escape");
    assert_eq!(displayed(&page.doc, &[late_card, late_group]), vec![true, true]);
    assert_eq!(displayed(&page.doc, &page.groups), vec![true]);
}

#[test]
fn test_group_without_visible_entries_hidden() {
    let page = publications_page(&[("2023", &["Entry A"])]);
    let empty = page.doc.create("section", None);
    page.doc.add_class(&empty, "group-section");
    let _runtime = install(
        page.doc.clone(),
        Platform::minimal(timers()),
        ThemeConfig::default(),
    )
    .unwrap();

    page.doc.type_text(&page.input, "");
    assert!(!page.doc.is_displayed(&empty));
    assert_eq!(displayed(&page.doc, &page.groups), vec![true]);
}

// === Gating ===

#[test]
fn test_not_wired_outside_publications_page() {
    let doc = Rc::new(MemoryDocument::new("About"));
    let input = doc.create("input", None);
    doc.set_id(&input, "search-input");
    let entry = add_entry(&doc, None, "Paper");

    let runtime = install(
        doc.clone(),
        Platform::minimal(timers()),
        ThemeConfig::default(),
    )
    .unwrap();
    assert!(runtime.filter().is_none());

    doc.type_text(&input, "nothing matches");
    assert!(doc.is_displayed(&entry));
}

#[test]
fn test_missing_search_field() {
    let doc = Rc::new(MemoryDocument::new("Publications"));
    add_entry(&doc, None, "Paper");

    let runtime = install(doc, Platform::minimal(timers()), ThemeConfig::default()).unwrap();
    assert!(runtime.filter().is_none());
}

#[test]
fn test_waits_for_content_loaded() {
    let page = publications_page(&[("2023", &["Entry A"])]);
    page.doc.set_ready_state(ReadyState::Loading);
    let runtime = install(
        page.doc.clone(),
        Platform::minimal(timers()),
        ThemeConfig::default(),
    )
    .unwrap();
    assert!(runtime.filter().is_none());

    // Entry parsed after install but before content-loaded is captured.
    let late = add_entry(&page.doc, Some(page.groups[0]), "Entry Z");
    page.doc.fire_content_loaded();

    let filter = runtime.filter().unwrap();
    assert_eq!(filter.entry_count(), 2);
    page.doc.type_text(&page.input, "entry z");
    assert!(page.doc.is_displayed(&late));
    assert_eq!(displayed(&page.doc, &page.entries), vec![false]);
}

#[test]
fn test_entries_added_after_capture_not_tracked() {
    let page = publications_page(&[("2023", &["Entry A"])]);
    let runtime = install(
        page.doc.clone(),
        Platform::minimal(timers()),
        ThemeConfig::default(),
    )
    .unwrap();

    let late = add_entry(&page.doc, Some(page.groups[0]), "Entry B");
    page.doc.type_text(&page.input, "entry a");

    assert_eq!(runtime.filter().unwrap().entry_count(), 1);
    assert!(page.doc.is_displayed(&late));
}

#[test]
fn test_custom_title_marker() {
    let doc = Rc::new(MemoryDocument::new("Papers"));
    let input = doc.create("input", None);
    doc.set_id(&input, "search-input");
    let entry = add_entry(&doc, None, "Paper");

    let config = ThemeConfig::from_toml("[filter]\ntitle_marker = \"Papers\"").unwrap();
    let _runtime = install(doc.clone(), Platform::minimal(timers()), config).unwrap();

    doc.type_text(&input, "zzz");
    assert!(!doc.is_displayed(&entry));
}

// === Properties ===

proptest! {
    #[test]
    fn test_visible_entries_match_substring_rule(
        texts in prop::collection::vec("[a-zA-Z0-9 ()]{0,24}", 1..8),
        query in "[a-zA-Z0-9 ]{0,4}",
    ) {
        let groups: Vec<(&str, Vec<&str>)> = texts
            .chunks(3)
            .map(|chunk| ("group", chunk.iter().map(String::as_str).collect()))
            .collect();
        let groups: Vec<(&str, &[&str])> = groups
            .iter()
            .map(|(label, entries)| (*label, entries.as_slice()))
            .collect();
        let page = publications_page(&groups);
        let _runtime = install(
            page.doc.clone(),
            Platform::minimal(timers()),
            ThemeConfig::default(),
        )
        .unwrap();

        page.doc.type_text(&page.input, &query);

        let q = query.trim().to_lowercase();
        let expected: Vec<bool> = texts
            .iter()
            .map(|t| q.is_empty() || t.trim().to_lowercase().contains(&q))
            .collect();
        prop_assert_eq!(displayed(&page.doc, &page.entries), expected.clone());

        let visible = visible_subset(&query, &texts);
        let from_subset: Vec<bool> = (0..texts.len()).map(|i| visible.contains(&i)).collect();
        prop_assert_eq!(from_subset, expected.clone());

        for (g, group) in page.groups.iter().enumerate() {
            let start = g * 3;
            let end = (start + 3).min(texts.len());
            let any_visible = expected[start..end].iter().any(|&v| v);
            prop_assert_eq!(page.doc.is_displayed(group), any_visible);
        }
    }
}
