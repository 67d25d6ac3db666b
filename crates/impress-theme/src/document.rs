//! Handle to the rendering surface.
//!
//! Everything the page features touch goes through [`Document`]: element
//! queries, class and attribute access, visibility, geometry, and event
//! registration. The browser binding lives in `web`; `headless` provides an
//! in-memory page for tests and non-browser hosts.
//!
//! All methods take `&self`. A document is shared between event callbacks
//! through `Rc`, and implementations use interior mutability the same way a
//! DOM does.

/// Document loading phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadyState {
    /// Markup is still being parsed
    Loading,
    /// Markup parsed, subresources may still be loading
    Interactive,
    /// Full-load event has fired
    Complete,
}

impl ReadyState {
    /// Parse the browser's `document.readyState` string.
    pub fn from_str_lossy(s: &str) -> Self {
        match s {
            "loading" => Self::Loading,
            "complete" => Self::Complete,
            _ => Self::Interactive,
        }
    }

    /// Whether content queries will see the parsed markup.
    pub fn is_parsed(&self) -> bool {
        !matches!(self, Self::Loading)
    }
}

/// The host document.
pub trait Document: 'static {
    /// Element handle. Cheap to clone; equality is node identity.
    type Node: Clone + PartialEq + std::fmt::Debug + 'static;

    fn title(&self) -> String;
    fn ready_state(&self) -> ReadyState;

    /// All elements carrying `class`, in document order.
    fn elements_by_class(&self, class: &str) -> Vec<Self::Node>;
    fn element_by_id(&self, id: &str) -> Option<Self::Node>;
    /// Descendants of `node` (excluding itself) carrying `class`, in document order.
    fn descendants_by_class(&self, node: &Self::Node, class: &str) -> Vec<Self::Node>;
    /// Nearest ancestor (or the node itself) carrying `class`.
    fn closest_with_class(&self, node: &Self::Node, class: &str) -> Option<Self::Node>;

    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;
    fn has_class(&self, node: &Self::Node, class: &str) -> bool;
    fn add_class(&self, node: &Self::Node, class: &str);
    fn remove_class(&self, node: &Self::Node, class: &str);

    fn inner_html(&self, node: &Self::Node) -> String;
    fn set_inner_html(&self, node: &Self::Node, html: &str);
    /// Concatenated text of the node and its descendants.
    fn text_content(&self, node: &Self::Node) -> String;

    /// False only when the node's own display is set to `none`.
    fn is_displayed(&self, node: &Self::Node) -> bool;
    fn set_displayed(&self, node: &Self::Node, shown: bool);

    /// Top edge relative to the viewport, in CSS pixels.
    fn top_offset(&self, node: &Self::Node) -> f64;
    fn viewport_height(&self) -> f64;

    /// Current value of a text field.
    fn value(&self, node: &Self::Node) -> String;
    fn set_value(&self, node: &Self::Node, value: &str);
    fn blur(&self, node: &Self::Node);

    /// Append an off-screen, read-only text area holding `text` to the body.
    fn append_offscreen_text_area(&self, text: &str) -> Result<Self::Node, String>;
    fn focus_and_select(&self, node: &Self::Node);
    /// Run the legacy synchronous copy command on the current selection.
    fn exec_copy(&self) -> Result<bool, String>;
    fn remove_node(&self, node: &Self::Node);

    /// Run once when the markup has been parsed.
    fn on_content_loaded(&self, handler: Box<dyn FnOnce()>);
    /// Run once when the full-load event fires.
    fn on_load(&self, handler: Box<dyn FnOnce()>);
    /// Run on every edit of a text field, with the new value.
    fn on_input(&self, node: &Self::Node, handler: Box<dyn Fn(String)>);
    /// Run on every key press inside `node`, with the key name.
    fn on_key_down(&self, node: &Self::Node, handler: Box<dyn Fn(&str)>);
}
