//! Batched page translation: picking text runs, framing them as numbered
//! blocks and reading the numbered blocks back out of the model's reply.

use std::collections::BTreeMap;
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::dom::{Element, NodePath};

pub const TRANSLATE_BATCH_SIZE: usize = 20;
pub const BATCH_DELAY: Duration = Duration::from_millis(500);

/// Text runs no longer than this are left untranslated.
const MIN_TEXT_CHARS: usize = 5;
const SKIPPED_TAGS: [&str; 4] = ["script", "style", "noscript", "textarea"];

static BLOCK_START: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\[(\d+)\]:: ?(.*)$").unwrap());

/// Paths (from `body`) of every element whose own text should be translated,
/// in document order.
pub fn collect_translatable(body: &Element) -> Vec<NodePath> {
    let mut paths = Vec::new();
    if is_translatable(body) {
        paths.push(Vec::new());
    }
    body.walk_paths(&mut Vec::new(), &mut |element: &Element, path: &[usize]| {
        if is_translatable(element) {
            paths.push(path.to_vec());
        }
    });
    paths
}

fn is_translatable(element: &Element) -> bool {
    element.text.trim().chars().count() > MIN_TEXT_CHARS
        && !SKIPPED_TAGS.contains(&element.tag.as_str())
}

pub fn build_batch_prompt(language: &str, texts: &[String]) -> String {
    let blocks = texts
        .iter()
        .enumerate()
        .map(|(index, text)| format!("[{index}]:: {text}"))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "You are a professional translator. Translate the following text blocks into {language}. \
         Maintain the exact block structure (e.g., \"[0]:: ...\", \"[1]:: ...\") in your response. \
         Only return the translated text for each block. If a block is just a number or symbol, \
         return it unchanged.\n\n{blocks}"
    )
}

/// Reads `[i]:: text` blocks out of a reply. Lines that do not open a block
/// continue the previous one. Blocks left empty are dropped.
pub fn parse_batch_response(response: &str) -> BTreeMap<usize, String> {
    let mut blocks = BTreeMap::new();
    let mut current: Option<(usize, String)> = None;

    for line in response.lines() {
        if let Some(caps) = BLOCK_START.captures(line) {
            if let Some((index, text)) = current.take() {
                blocks.insert(index, text);
            }
            if let Ok(index) = caps[1].parse::<usize>() {
                current = Some((index, caps[2].to_string()));
            }
        } else if let Some((_, text)) = current.as_mut() {
            text.push('\n');
            text.push_str(line);
        }
    }
    if let Some((index, text)) = current {
        blocks.insert(index, text);
    }

    blocks.retain(|_, text| {
        let trimmed_len = text.trim_end().len();
        text.truncate(trimmed_len);
        !text.is_empty()
    });
    blocks
}
