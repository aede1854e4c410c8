//! Heuristics for finding the readable part of a page.

use crate::dom::{Element, Selector};

/// Tried in order by focus mode before falling back to scoring.
pub const FOCUS_SELECTORS: [&str; 7] = [
    "article",
    "main",
    ".post-content",
    ".entry-content",
    "#main-content",
    "#content",
    ".main",
];

/// A fallback container needs strictly more rendered text than this.
pub const MIN_CANDIDATE_CHARS: usize = 1000;

const CHROME_MARKERS: [&str; 4] = ["nav", "footer", "header", "sidebar"];

const PAGE_SELECTORS: [&str; 9] = [
    "main",
    "article",
    ".content",
    "#content",
    ".post-content",
    ".entry-content",
    ".story-content",
    ".article-content",
    ".page-content",
];

const UNWANTED_SELECTORS: [&str; 17] = [
    "nav",
    "header",
    "footer",
    "aside",
    ".navigation",
    ".menu",
    ".sidebar",
    ".ad",
    ".advertisement",
    "script",
    "style",
    ".social",
    ".comments",
    ".related",
    ".share",
    ".newsletter",
    ".popup",
];

/// Content focus mode should show, or `None` when the page has nothing that
/// looks like an article.
pub fn locate_main_content(body: &Element) -> Option<&Element> {
    for raw in FOCUS_SELECTORS {
        if let Some(found) = body.query(&[Selector::parse(raw)]) {
            return Some(found);
        }
    }

    let mut best: Option<(&Element, usize)> = None;
    for candidate in body.descendants() {
        if candidate.tag != "div" && candidate.tag != "section" {
            continue;
        }
        let label = candidate.label();
        if CHROME_MARKERS.iter().any(|marker| label.contains(marker)) {
            continue;
        }
        let score = candidate.text_content().chars().count();
        let beats_best = best.map_or(true, |(_, top)| score > top);
        if score > MIN_CANDIDATE_CHARS && beats_best {
            best = Some((candidate, score));
        }
    }
    best.map(|(element, _)| element)
}

/// Flattened text of the page's main area with navigation, ads and similar
/// chrome stripped and whitespace collapsed.
pub fn extract_page_content(body: &Element) -> String {
    let main = PAGE_SELECTORS
        .iter()
        .find_map(|raw| body.query(&[Selector::parse(raw)]))
        .unwrap_or(body);

    let mut copy = main.clone();
    let unwanted: Vec<Selector> = UNWANTED_SELECTORS.iter().map(|s| Selector::parse(s)).collect();
    copy.remove_matching(&unwanted);
    collapse_whitespace(&copy.text_content())
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filler(chars: usize) -> String {
        "word ".repeat(chars / 5 + 1)
    }

    #[test]
    fn semantic_selectors_win_in_order() {
        let body = Element::new("body")
            .with_child(Element::new("main").with_text("main text"))
            .with_child(Element::new("article").with_text("article text"));

        let found = locate_main_content(&body).unwrap();
        assert_eq!(found.tag, "article");
    }

    #[test]
    fn falls_back_to_longest_text_block() {
        let body = Element::new("body")
            .with_child(Element::new("div").with_id("short").with_text(filler(1100)))
            .with_child(Element::new("section").with_id("long").with_text(filler(3000)));

        let found = locate_main_content(&body).unwrap();
        assert_eq!(found.id.as_deref(), Some("long"));
    }

    #[test]
    fn skips_page_chrome_and_short_blocks() {
        let body = Element::new("body")
            .with_child(
                Element::new("div")
                    .with_class("site-footer")
                    .with_text(filler(5000)),
            )
            .with_child(Element::new("div").with_id("sidebar-left").with_text(filler(5000)))
            .with_child(Element::new("div").with_text(filler(500)));

        assert!(locate_main_content(&body).is_none());
    }

    #[test]
    fn extraction_strips_chrome_and_collapses_whitespace() {
        let body = Element::new("body").with_child(
            Element::new("article")
                .with_child(Element::new("nav").with_text("Home | About"))
                .with_child(Element::new("p").with_text("First\n\n   paragraph."))
                .with_child(Element::new("div").with_class("ad").with_text("Buy now"))
                .with_child(Element::new("p").with_text("Second.")),
        );

        assert_eq!(extract_page_content(&body), "First paragraph. Second.");
    }

    #[test]
    fn extraction_uses_body_without_main_area() {
        let body = Element::new("body")
            .with_child(Element::new("header").with_text("Logo"))
            .with_child(Element::new("p").with_text("Only text"));

        assert_eq!(extract_page_content(&body), "Only text");
    }
}
