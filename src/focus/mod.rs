pub mod content;
pub mod controller;

pub use content::{extract_page_content, locate_main_content};
pub use controller::{FocusMode, FocusSession, FocusState, OVERLAY_ID};
