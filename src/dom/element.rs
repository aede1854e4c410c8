use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::Selector;

/// A node in the page model. `text` is the element's own text run, rendered
/// before its children.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub style: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Element>,
}

/// Index path from an ancestor down to a descendant.
pub type NodePath = Vec<usize>;

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.toggle_class(class, true);
        self
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Adds or removes `class`; returns whether the list changed.
    pub fn toggle_class(&mut self, class: &str, enabled: bool) -> bool {
        let present = self.has_class(class);
        match (enabled, present) {
            (true, false) => {
                self.classes.push(class.to_string());
                true
            }
            (false, true) => {
                self.classes.retain(|c| c != class);
                true
            }
            _ => false,
        }
    }

    /// Rendered text of the subtree, runs separated by single spaces.
    pub fn text_content(&self) -> String {
        let mut parts = Vec::new();
        self.collect_text(&mut parts);
        parts.join(" ")
    }

    fn collect_text<'a>(&'a self, parts: &mut Vec<&'a str>) {
        let own = self.text.trim();
        if !own.is_empty() {
            parts.push(own);
        }
        for child in &self.children {
            child.collect_text(parts);
        }
    }

    /// Identifier plus class list, lowercased. Used to spot page chrome.
    pub fn label(&self) -> String {
        let mut label = self.id.clone().unwrap_or_default();
        label.push_str(&self.classes.join(" "));
        label.to_ascii_lowercase()
    }

    /// First descendant, in document order, matching any selector of the group.
    pub fn query(&self, group: &[Selector]) -> Option<&Element> {
        self.descendants()
            .into_iter()
            .find(|el| group.iter().any(|sel| sel.matches(el)))
    }

    pub fn query_path(&self, group: &[Selector]) -> Option<NodePath> {
        let mut found = None;
        self.walk_paths(&mut Vec::new(), &mut |el: &Element, path: &[usize]| {
            if found.is_none() && group.iter().any(|sel| sel.matches(el)) {
                found = Some(path.to_vec());
            }
        });
        found
    }

    /// All descendants in document order (the receiver excluded).
    pub fn descendants(&self) -> Vec<&Element> {
        let mut out = Vec::new();
        for child in &self.children {
            out.push(child);
            out.extend(child.descendants());
        }
        out
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Element> {
        self.descendants()
            .into_iter()
            .find(|el| el.id.as_deref() == Some(id))
    }

    pub fn find_by_id_mut(&mut self, id: &str) -> Option<&mut Element> {
        for child in &mut self.children {
            if child.id.as_deref() == Some(id) {
                return Some(child);
            }
            if let Some(found) = child.find_by_id_mut(id) {
                return Some(found);
            }
        }
        None
    }

    /// Detaches the first descendant with `id`.
    pub fn remove_by_id(&mut self, id: &str) -> Option<Element> {
        if let Some(index) = self
            .children
            .iter()
            .position(|child| child.id.as_deref() == Some(id))
        {
            return Some(self.children.remove(index));
        }
        self.children
            .iter_mut()
            .find_map(|child| child.remove_by_id(id))
    }

    /// Drops every descendant subtree matching the group.
    pub fn remove_matching(&mut self, group: &[Selector]) {
        self.children
            .retain(|child| !group.iter().any(|sel| sel.matches(child)));
        for child in &mut self.children {
            child.remove_matching(group);
        }
    }

    pub fn at_path(&self, path: &[usize]) -> Option<&Element> {
        path.iter()
            .try_fold(self, |node, &index| node.children.get(index))
    }

    pub fn at_path_mut(&mut self, path: &[usize]) -> Option<&mut Element> {
        path.iter()
            .try_fold(self, |node, &index| node.children.get_mut(index))
    }

    /// Visits every descendant together with its path from `self`.
    pub fn walk_paths<F>(&self, prefix: &mut NodePath, visit: &mut F)
    where
        F: FnMut(&Element, &[usize]),
    {
        for (index, child) in self.children.iter().enumerate() {
            prefix.push(index);
            visit(child, prefix);
            child.walk_paths(prefix, visit);
            prefix.pop();
        }
    }
}
