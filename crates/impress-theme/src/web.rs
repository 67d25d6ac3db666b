//! Browser binding via `web-sys`.
//!
//! Exposes `start()` to install the theme on the current page and
//! `copyBibtex(button)` for citation buttons.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use js_sys::{Array, Function, Promise, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    Element, HtmlDocument, HtmlElement, HtmlInputElement, HtmlTextAreaElement,
    IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit, KeyboardEvent,
    NodeList, Window,
};

use crate::clipboard::AsyncClipboard;
use crate::config::ThemeConfig;
use crate::document::{Document, ReadyState};
use crate::error::{ClipboardError, ObserverError};
use crate::platform::{Platform, Timers};
use crate::reveal::{ObserverOptions, VisibilityObserver};
use crate::runtime::{install_once, ThemeRuntime};

fn describe(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| value.dyn_ref::<js_sys::Error>().map(|e| String::from(e.message())))
        .unwrap_or_else(|| format!("{:?}", value))
}

/// The page's `document`.
pub struct WebDocument {
    window: Window,
    document: web_sys::Document,
}

impl WebDocument {
    pub fn current() -> Option<Self> {
        let window = web_sys::window()?;
        let document = window.document()?;
        Some(Self { window, document })
    }

    fn html_element(node: &Element) -> Option<&HtmlElement> {
        node.dyn_ref::<HtmlElement>()
    }
}

impl Document for WebDocument {
    type Node = Element;

    fn title(&self) -> String {
        self.document.title()
    }

    fn ready_state(&self) -> ReadyState {
        ReadyState::from_str_lossy(&self.document.ready_state())
    }

    fn elements_by_class(&self, class: &str) -> Vec<Element> {
        elements(self.document.query_selector_all(&format!(".{}", class)))
    }

    fn descendants_by_class(&self, node: &Element, class: &str) -> Vec<Element> {
        elements(node.query_selector_all(&format!(".{}", class)))
    }

    fn element_by_id(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn closest_with_class(&self, node: &Element, class: &str) -> Option<Element> {
        node.closest(&format!(".{}", class)).ok().flatten()
    }

    fn attribute(&self, node: &Element, name: &str) -> Option<String> {
        node.get_attribute(name)
    }

    fn has_class(&self, node: &Element, class: &str) -> bool {
        node.class_list().contains(class)
    }

    fn add_class(&self, node: &Element, class: &str) {
        let _ = node.class_list().add_1(class);
    }

    fn remove_class(&self, node: &Element, class: &str) {
        let _ = node.class_list().remove_1(class);
    }

    fn inner_html(&self, node: &Element) -> String {
        node.inner_html()
    }

    fn set_inner_html(&self, node: &Element, html: &str) {
        node.set_inner_html(html);
    }

    fn text_content(&self, node: &Element) -> String {
        node.text_content().unwrap_or_default()
    }

    fn is_displayed(&self, node: &Element) -> bool {
        Self::html_element(node)
            .map(|el| el.style().get_property_value("display").unwrap_or_default() != "none")
            .unwrap_or(true)
    }

    fn set_displayed(&self, node: &Element, shown: bool) {
        if let Some(el) = Self::html_element(node) {
            let _ = el
                .style()
                .set_property("display", if shown { "" } else { "none" });
        }
    }

    fn top_offset(&self, node: &Element) -> f64 {
        node.get_bounding_client_rect().top()
    }

    fn viewport_height(&self) -> f64 {
        self.window
            .inner_height()
            .ok()
            .and_then(|h| h.as_f64())
            .unwrap_or(0.0)
    }

    fn value(&self, node: &Element) -> String {
        node.dyn_ref::<HtmlInputElement>()
            .map(|input| input.value())
            .unwrap_or_default()
    }

    fn set_value(&self, node: &Element, value: &str) {
        if let Some(input) = node.dyn_ref::<HtmlInputElement>() {
            input.set_value(value);
        }
    }

    fn blur(&self, node: &Element) {
        if let Some(el) = Self::html_element(node) {
            let _ = el.blur();
        }
    }

    fn append_offscreen_text_area(&self, text: &str) -> Result<Element, String> {
        let body = self.document.body().ok_or("document has no body")?;
        let area = self
            .document
            .create_element("textarea")
            .map_err(|e| describe(&e))?
            .dyn_into::<HtmlTextAreaElement>()
            .map_err(|_| "created element is not a textarea".to_string())?;
        area.set_value(text);
        area.set_read_only(true);
        let style = area.style();
        for (property, value) in [
            ("position", "fixed"),
            ("left", "-999999px"),
            ("top", "-999999px"),
        ] {
            style.set_property(property, value).map_err(|e| describe(&e))?;
        }
        body.append_child(&area).map_err(|e| describe(&e))?;
        Ok(area.into())
    }

    fn focus_and_select(&self, node: &Element) {
        if let Some(area) = node.dyn_ref::<HtmlTextAreaElement>() {
            let _ = area.focus();
            area.select();
        }
    }

    fn exec_copy(&self) -> Result<bool, String> {
        self.document
            .dyn_ref::<HtmlDocument>()
            .ok_or_else(|| "not an HTML document".to_string())?
            .exec_command("copy")
            .map_err(|e| describe(&e))
    }

    fn remove_node(&self, node: &Element) {
        node.remove();
    }

    fn on_content_loaded(&self, handler: Box<dyn FnOnce()>) {
        let callback = Closure::once_into_js(move || handler());
        let _ = self
            .document
            .add_event_listener_with_callback("DOMContentLoaded", callback.unchecked_ref());
    }

    fn on_load(&self, handler: Box<dyn FnOnce()>) {
        let callback = Closure::once_into_js(move || handler());
        let _ = self
            .window
            .add_event_listener_with_callback("load", callback.unchecked_ref());
    }

    fn on_input(&self, node: &Element, handler: Box<dyn Fn(String)>) {
        let callback = Closure::<dyn FnMut(web_sys::Event)>::new(move |event: web_sys::Event| {
            let value = event
                .target()
                .and_then(|target| target.dyn_into::<HtmlInputElement>().ok())
                .map(|input| input.value())
                .unwrap_or_default();
            handler(value);
        });
        let _ = node.add_event_listener_with_callback("input", callback.as_ref().unchecked_ref());
        callback.forget();
    }

    fn on_key_down(&self, node: &Element, handler: Box<dyn Fn(&str)>) {
        let callback = Closure::<dyn FnMut(KeyboardEvent)>::new(move |event: KeyboardEvent| {
            handler(&event.key());
        });
        let _ =
            node.add_event_listener_with_callback("keydown", callback.as_ref().unchecked_ref());
        callback.forget();
    }
}

/// `window.setTimeout`.
pub struct WebTimers {
    window: Window,
}

impl Timers for WebTimers {
    fn set_timeout(&self, delay: Duration, task: Box<dyn FnOnce()>) {
        let callback = Closure::once_into_js(move || task());
        let ms = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
        if let Err(e) = self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), ms)
        {
            tracing::warn!("setTimeout failed: {}", describe(&e));
        }
    }
}

/// `navigator.clipboard.writeText`.
pub struct WebClipboard {
    clipboard: JsValue,
    write_text: Function,
}

impl WebClipboard {
    /// Probe `navigator.clipboard`; `None` when the API is missing.
    pub fn probe(window: &Window) -> Option<Self> {
        let clipboard = Reflect::get(&window.navigator(), &JsValue::from_str("clipboard")).ok()?;
        if clipboard.is_undefined() || clipboard.is_null() {
            return None;
        }
        let write_text = Reflect::get(&clipboard, &JsValue::from_str("writeText"))
            .ok()?
            .dyn_into::<Function>()
            .ok()?;
        Some(Self {
            clipboard,
            write_text,
        })
    }
}

impl AsyncClipboard for WebClipboard {
    fn write_text(&self, text: &str, done: Box<dyn FnOnce(Result<(), ClipboardError>)>) {
        let promise = match self
            .write_text
            .call1(&self.clipboard, &JsValue::from_str(text))
            .map(|value| value.dyn_into::<Promise>())
        {
            Ok(Ok(promise)) => promise,
            Ok(Err(_)) => {
                done(Err(ClipboardError::Rejected("writeText returned no promise".to_string())));
                return;
            }
            Err(e) => {
                done(Err(ClipboardError::Rejected(describe(&e))));
                return;
            }
        };
        wasm_bindgen_futures::spawn_local(async move {
            let result = JsFuture::from(promise)
                .await
                .map(|_| ())
                .map_err(|e| ClipboardError::Rejected(describe(&e)));
            done(result);
        });
    }
}

/// `IntersectionObserver`.
pub struct WebObserver;

impl WebObserver {
    /// `None` when the constructor is missing from `window`.
    pub fn probe(window: &Window) -> Option<Self> {
        Reflect::has(window, &JsValue::from_str("IntersectionObserver"))
            .unwrap_or(false)
            .then_some(Self)
    }
}

impl VisibilityObserver<Element> for WebObserver {
    fn observe(
        &self,
        targets: &[Element],
        options: &ObserverOptions,
        on_intersect: Rc<dyn Fn(&Element)>,
    ) -> Result<(), ObserverError> {
        let callback = Closure::<dyn FnMut(Array, IntersectionObserver)>::new(
            move |entries: Array, _observer: IntersectionObserver| {
                for entry in entries.iter() {
                    let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                        continue;
                    };
                    if entry.is_intersecting() {
                        on_intersect(&entry.target());
                    }
                }
            },
        );

        let init = IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(options.threshold));
        init.set_root_margin(&options.root_margin());

        let observer =
            IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)
                .map_err(|e| ObserverError::Setup(describe(&e)))?;
        callback.forget();

        for target in targets {
            observer.observe(target);
        }
        Ok(())
    }
}

fn elements(list: Result<NodeList, JsValue>) -> Vec<Element> {
    let Ok(list) = list else {
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|i| list.get(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

thread_local! {
    static RUNTIME: RefCell<Option<ThemeRuntime<WebDocument>>> = const { RefCell::new(None) };
}

fn start_with(config: ThemeConfig) -> Result<(), JsValue> {
    let doc = WebDocument::current().ok_or_else(|| JsValue::from_str("no document"))?;
    let window = doc.window.clone();

    let mut platform: Platform<Element> = Platform::minimal(Rc::new(WebTimers {
        window: window.clone(),
    }));
    if let Some(clipboard) = WebClipboard::probe(&window) {
        platform = platform.with_clipboard(Rc::new(clipboard), window.is_secure_context());
    }
    if let Some(observer) = WebObserver::probe(&window) {
        platform = platform.with_observer(Rc::new(observer));
    }

    RUNTIME
        .with(|slot| install_once(slot, Rc::new(doc), platform, config))
        .map(|_| ())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Install the theme with default settings.
#[wasm_bindgen]
pub fn start() -> Result<(), JsValue> {
    start_with(ThemeConfig::default())
}

/// Install the theme with a JSON configuration.
#[wasm_bindgen(js_name = startWithConfig)]
pub fn start_with_config(json: &str) -> Result<(), JsValue> {
    let config = ThemeConfig::from_json(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
    start_with(config)
}

/// Copy the citation on `button` to the clipboard.
#[wasm_bindgen(js_name = copyBibtex)]
pub fn copy_bibtex(button: Element) {
    RUNTIME.with(|slot| match slot.borrow().as_ref() {
        Some(runtime) => runtime.copy_citation(&button),
        None => tracing::warn!("copyBibtex called before start()"),
    });
}
