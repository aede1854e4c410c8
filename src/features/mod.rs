//! Toggle key taxonomy and the class-based half of the toggle engine.
//!
//! Stateful toggles (reading guide, focus mode, voice control) are routed by
//! [`crate::page::PageContext::apply_toggle`]; everything that is only a class
//! on the root or body element is applied here.

mod keys;

pub use keys::{ToggleKey, ToggleTarget, KEY_PREFIX};

use crate::dom::Document;

/// Applies a class-only toggle. Returns `false` when the key is stateful and
/// must be handled by its subsystem instead.
pub fn apply_class_toggle(doc: &mut Document, key: &ToggleKey, enabled: bool) -> bool {
    let class = key.storage_key();
    match key.target() {
        ToggleTarget::RootClass => {
            doc.toggle_root_class(&class, enabled);
            true
        }
        ToggleTarget::BodyClass => {
            doc.toggle_body_class(&class, enabled);
            true
        }
        ToggleTarget::ReadingGuide | ToggleTarget::FocusMode | ToggleTarget::VoiceControl => false,
    }
}

/// Members of `key`'s exclusive group that must be switched off before `key`
/// is switched on.
pub fn exclusive_peers(key: &ToggleKey) -> Vec<ToggleKey> {
    if !key.is_color_filter() {
        return Vec::new();
    }
    ToggleKey::COLOR_FILTERS
        .iter()
        .filter(|peer| *peer != key)
        .cloned()
        .collect()
}
