use crate::dom::{Document, Element, EventKind, ListenerId};

pub const GUIDE_ID: &str = "lumen-reading-guide-overlay";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadingState {
    Inactive,
    Active,
}

/// Horizontal band that follows the pointer down the page.
#[derive(Debug, Default)]
pub struct ReadingGuide {
    listener: Option<ListenerId>,
}

impl ReadingGuide {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, doc: &Document) -> ReadingState {
        if doc.get_element_by_id(GUIDE_ID).is_some() {
            ReadingState::Active
        } else {
            ReadingState::Inactive
        }
    }

    pub fn set_enabled(&mut self, doc: &mut Document, enabled: bool) {
        let active = self.state(doc) == ReadingState::Active;
        match (enabled, active) {
            (true, false) => {
                // A listener without its node means the node was removed behind
                // our back; drop the stale registration before re-attaching.
                if let Some(stale) = self.listener.take() {
                    doc.remove_listener(stale);
                }
                doc.append_to_body(Element::new("div").with_id(GUIDE_ID));
                self.listener = Some(doc.add_listener(EventKind::PointerMove));
            }
            (false, _) => {
                if let Some(listener) = self.listener.take() {
                    doc.remove_listener(listener);
                }
                if active {
                    doc.remove_element(GUIDE_ID);
                }
            }
            (true, true) => {}
        }
    }

    pub fn on_pointer_move(&self, doc: &mut Document, client_y: f64) {
        let Some(listener) = self.listener else {
            return;
        };
        if !doc.has_listener(listener) {
            return;
        }
        if let Some(guide) = doc.get_element_by_id_mut(GUIDE_ID) {
            guide.style.insert("top".to_string(), format!("{client_y}px"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activation_is_guarded_by_the_overlay() {
        let mut doc = Document::default();
        let mut guide = ReadingGuide::new();

        guide.set_enabled(&mut doc, true);
        guide.set_enabled(&mut doc, true);

        assert_eq!(doc.count_by_id(GUIDE_ID), 1);
        assert_eq!(doc.listener_count(EventKind::PointerMove), 1);
        assert_eq!(guide.state(&doc), ReadingState::Active);
    }

    #[test]
    fn tracks_pointer_while_active() {
        let mut doc = Document::default();
        let mut guide = ReadingGuide::new();
        guide.set_enabled(&mut doc, true);

        guide.on_pointer_move(&mut doc, 212.0);

        let top = doc
            .get_element_by_id(GUIDE_ID)
            .and_then(|el| el.style.get("top"))
            .cloned();
        assert_eq!(top.as_deref(), Some("212px"));
    }

    #[test]
    fn deactivation_detaches_everything() {
        let mut doc = Document::default();
        let mut guide = ReadingGuide::new();

        for _ in 0..5 {
            guide.set_enabled(&mut doc, true);
            guide.set_enabled(&mut doc, false);
        }

        assert_eq!(doc.count_by_id(GUIDE_ID), 0);
        assert_eq!(doc.listener_count(EventKind::PointerMove), 0);
        guide.on_pointer_move(&mut doc, 10.0);
        assert_eq!(guide.state(&doc), ReadingState::Inactive);
    }

    #[test]
    fn recovers_when_node_was_removed_externally() {
        let mut doc = Document::default();
        let mut guide = ReadingGuide::new();
        guide.set_enabled(&mut doc, true);
        doc.remove_element(GUIDE_ID);

        guide.set_enabled(&mut doc, true);

        assert_eq!(doc.listener_count(EventKind::PointerMove), 1);
        assert_eq!(doc.count_by_id(GUIDE_ID), 1);
    }
}
