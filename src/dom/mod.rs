//! In-memory model of the page a content context runs in.
//!
//! Every page feature mutates the document through this type: root and body
//! class lists, root style properties, injected nodes looked up by id, event
//! listener registrations, scroll position and the notices shown to the user.

mod element;
mod selector;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub use element::{Element, NodePath};
pub use selector::Selector;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ListenerId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    PointerMove,
    Click,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// Something the user is told: an alert, a progress toast or a modal body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub shown_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modal {
    pub title: String,
    pub body: String,
    pub visible: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    body: Element,
    #[serde(default)]
    root_classes: BTreeSet<String>,
    #[serde(default)]
    root_style: BTreeMap<String, String>,
    #[serde(skip)]
    listeners: BTreeMap<ListenerId, EventKind>,
    #[serde(skip)]
    next_listener: u64,
    #[serde(default)]
    scroll_y: f64,
    #[serde(default = "default_viewport_height")]
    viewport_height: f64,
    #[serde(default)]
    scroll_height: f64,
    #[serde(default)]
    notices: Vec<Notice>,
    #[serde(default)]
    modal: Option<Modal>,
    #[serde(default)]
    focused: Option<String>,
}

fn default_viewport_height() -> f64 {
    800.0
}

impl Default for Document {
    fn default() -> Self {
        Self::new(Element::new("body"))
    }
}

impl Document {
    pub fn new(body: Element) -> Self {
        Self {
            body,
            root_classes: BTreeSet::new(),
            root_style: BTreeMap::new(),
            listeners: BTreeMap::new(),
            next_listener: 0,
            scroll_y: 0.0,
            viewport_height: default_viewport_height(),
            scroll_height: 0.0,
            notices: Vec::new(),
            modal: None,
            focused: None,
        }
    }

    pub fn with_viewport(mut self, viewport_height: f64, scroll_height: f64) -> Self {
        self.viewport_height = viewport_height;
        self.scroll_height = scroll_height;
        self
    }

    pub fn body(&self) -> &Element {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut Element {
        &mut self.body
    }

    pub fn root_has_class(&self, class: &str) -> bool {
        self.root_classes.contains(class)
    }

    pub fn toggle_root_class(&mut self, class: &str, enabled: bool) -> bool {
        if enabled {
            self.root_classes.insert(class.to_string())
        } else {
            self.root_classes.remove(class)
        }
    }

    pub fn body_has_class(&self, class: &str) -> bool {
        self.body.has_class(class)
    }

    pub fn toggle_body_class(&mut self, class: &str, enabled: bool) -> bool {
        self.body.toggle_class(class, enabled)
    }

    pub fn set_root_style(&mut self, property: &str, value: impl Into<String>) {
        self.root_style.insert(property.to_string(), value.into());
    }

    pub fn root_style(&self, property: &str) -> Option<&str> {
        self.root_style.get(property).map(String::as_str)
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<&Element> {
        self.body.find_by_id(id)
    }

    pub fn get_element_by_id_mut(&mut self, id: &str) -> Option<&mut Element> {
        self.body.find_by_id_mut(id)
    }

    /// Number of nodes carrying `id`; injected overlays must never exceed one.
    pub fn count_by_id(&self, id: &str) -> usize {
        self.body
            .descendants()
            .into_iter()
            .filter(|el| el.id.as_deref() == Some(id))
            .count()
    }

    pub fn append_to_body(&mut self, element: Element) {
        self.body.children.push(element);
    }

    pub fn prepend_to_body(&mut self, element: Element) {
        self.body.children.insert(0, element);
    }

    pub fn remove_element(&mut self, id: &str) -> Option<Element> {
        self.body.remove_by_id(id)
    }

    pub fn add_listener(&mut self, kind: EventKind) -> ListenerId {
        self.next_listener += 1;
        let id = ListenerId(self.next_listener);
        self.listeners.insert(id, kind);
        id
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(&id).is_some()
    }

    pub fn has_listener(&self, id: ListenerId) -> bool {
        self.listeners.contains_key(&id)
    }

    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners.values().filter(|k| **k == kind).count()
    }

    pub fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    pub fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    pub fn scroll_height(&self) -> f64 {
        self.scroll_height
    }

    pub fn scroll_by(&mut self, delta: f64) {
        self.scroll_to(self.scroll_y + delta);
    }

    pub fn scroll_to(&mut self, y: f64) {
        let max = (self.scroll_height - self.viewport_height).max(0.0);
        self.scroll_y = y.clamp(0.0, max);
    }

    pub fn focus(&mut self, id: &str) {
        self.focused = Some(id.to_string());
    }

    pub fn focused(&self) -> Option<&str> {
        self.focused.as_deref()
    }

    pub fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.notices.push(Notice {
            level,
            message: message.into(),
            shown_at: Utc::now(),
        });
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn last_notice(&self) -> Option<&Notice> {
        self.notices.last()
    }

    /// The page has a single modal that is reused for every AI result.
    pub fn show_modal(&mut self, title: impl Into<String>, body: impl Into<String>) {
        self.modal = Some(Modal {
            title: title.into(),
            body: body.into(),
            visible: true,
        });
    }

    pub fn hide_modal(&mut self) {
        if let Some(modal) = self.modal.as_mut() {
            modal.visible = false;
        }
    }

    pub fn modal(&self) -> Option<&Modal> {
        self.modal.as_ref()
    }
}
