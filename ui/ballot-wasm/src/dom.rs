//! DOM element bindings.
//!
//! All page regions are resolved once at startup. To add new UI elements,
//! add a field here and bind it in `Elements::bind()`.

use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlInputElement, HtmlOptionElement, HtmlSelectElement};

// ── Helpers ──

fn doc() -> Document {
    web_sys::window().unwrap().document().unwrap()
}

pub fn by_id(id: &str) -> Option<Element> {
    doc().get_element_by_id(id)
}

pub fn by_id_typed<T: JsCast>(id: &str) -> Option<T> {
    by_id(id).and_then(|e| e.dyn_into::<T>().ok())
}

pub fn query_all(selector: &str) -> Vec<Element> {
    let nl = doc().query_selector_all(selector).unwrap();
    let mut v = Vec::new();
    for i in 0..nl.length() {
        if let Some(e) = nl.item(i) {
            if let Ok(el) = e.dyn_into::<Element>() {
                v.push(el);
            }
        }
    }
    v
}

pub fn set_text(el: &Element, text: &str) {
    el.set_text_content(Some(text));
}

pub fn set_inner_html(el: &Element, html: &str) {
    el.set_inner_html(html);
}

pub fn get_input_value(el: &HtmlInputElement) -> String {
    el.value()
}

pub fn get_select_value(el: &HtmlSelectElement) -> String {
    el.value()
}

pub fn show(el: &Element) {
    let _ = el
        .unchecked_ref::<web_sys::HtmlElement>()
        .style()
        .set_property("display", "block");
}

pub fn hide(el: &Element) {
    let _ = el
        .unchecked_ref::<web_sys::HtmlElement>()
        .style()
        .set_property("display", "none");
}

pub fn create_element(tag: &str) -> Element {
    doc().create_element(tag).unwrap()
}

pub fn create_option(value: &str, text: &str) -> HtmlOptionElement {
    let opt: HtmlOptionElement = create_element("option").dyn_into().unwrap();
    opt.set_value(value);
    opt.set_text_content(Some(text));
    opt
}

pub fn window() -> web_sys::Window {
    web_sys::window().unwrap()
}

// ── Elements struct ──

/// All DOM element references the ballot page touches.
/// Clone-friendly (all inner types are reference-counted via JS GC).
#[derive(Clone)]
pub struct Elements {
    // Frame
    pub loader: Element,
    pub content: Element,
    pub account_address: Element,

    // Ballot
    pub topic_tag: Element,
    pub candidates_results: Element,
    pub candidates_select: HtmlSelectElement,
    pub vote_status: Element,

    // Forms
    pub vote_form: Element,
    pub add_candidate_form: Element,
    pub vote_topic_form: Element,
    pub new_candidate_name: HtmlInputElement,
    pub vote_topic_input: HtmlInputElement,
}

macro_rules! get_el {
    ($id:expr) => {
        by_id($id).ok_or_else(|| JsValue::from_str(&format!("missing element #{}", $id)))?
    };
}

macro_rules! get_input {
    ($id:expr) => {
        by_id_typed::<HtmlInputElement>($id)
            .ok_or_else(|| JsValue::from_str(&format!("missing input #{}", $id)))?
    };
}

macro_rules! get_select {
    ($id:expr) => {
        by_id_typed::<HtmlSelectElement>($id)
            .ok_or_else(|| JsValue::from_str(&format!("missing select #{}", $id)))?
    };
}

impl Elements {
    /// Resolve all DOM references. Call once after DOMContentLoaded.
    pub fn bind() -> Result<Elements, JsValue> {
        Ok(Elements {
            loader: get_el!("loader"),
            content: get_el!("content"),
            account_address: get_el!("accountAddress"),

            topic_tag: get_el!("tag"),
            candidates_results: get_el!("candidatesResults"),
            candidates_select: get_select!("candidatesSelect"),
            vote_status: get_el!("voteStatus"),

            vote_form: get_el!("voteForm"),
            add_candidate_form: get_el!("addCandidateForm"),
            vote_topic_form: get_el!("voteTopicForm"),
            new_candidate_name: get_input!("newCandidateName"),
            vote_topic_input: get_input!("voteTopic"),
        })
    }
}
