//! Main-content detection.
//!
//! Scores containers by the readable text of the paragraphs they hold,
//! in the spirit of Readability: each paragraph credits its parent fully
//! and its grandparent by half, containers with boilerplate class or id
//! hints are penalized, and link-heavy containers are scaled down.

use std::collections::HashMap;

use ego_tree::{NodeId, NodeRef, iter::Edge};
use scraper::{ElementRef, Html, Node};

/// Paragraphs shorter than this (in characters) carry no score.
const MIN_PARAGRAPH_CHARS: usize = 25;

const PARAGRAPH_TAGS: &[&str] = &["p", "pre", "blockquote", "dd"];

const CANDIDATE_TAGS: &[&str] =
    &["div", "article", "main", "section", "td", "body"];

const NEGATIVE_HINTS: &[&str] = &[
    "banner", "comment", "footer", "header", "masthead", "menu", "nav",
    "related", "share", "sidebar",
];

const POSITIVE_HINTS: &[&str] =
    &["article", "body", "content", "entry", "main", "post", "text"];

const HINT_WEIGHT: f64 = 25.0;

/// The densest content block of a page.
#[derive(Debug, Clone, PartialEq)]
pub struct SimplifiedDocument {
    /// Outer HTML of the chosen element.
    pub html: String,
    /// Visible text length of the chosen element, in characters.
    pub text_len: usize,
}

/// Pick the main content block of `html`, or `None` when no container
/// holds a paragraph long enough to score.
pub fn main_content(html: &str) -> Option<SimplifiedDocument> {
    let doc = Html::parse_document(html);
    let mut scores: HashMap<NodeId, f64> = HashMap::new();

    for node in doc.tree.nodes() {
        let Some(paragraph) = ElementRef::wrap(node) else {
            continue;
        };
        if !PARAGRAPH_TAGS.contains(&paragraph.value().name()) {
            continue;
        }
        let len = visible_text_len(*paragraph);
        if len < MIN_PARAGRAPH_CHARS {
            continue;
        }
        let commas: usize =
            paragraph.text().map(|t| t.matches(',').count()).sum();
        let score = 1.0 + commas as f64 + (len as f64 / 100.0).min(3.0);

        let parent = node.parent().and_then(ElementRef::wrap);
        if let Some(parent) = parent {
            *scores.entry(parent.id()).or_default() += score;
            if let Some(grandparent) =
                parent.parent().and_then(ElementRef::wrap)
            {
                *scores.entry(grandparent.id()).or_default() += score / 2.0;
            }
        }
    }

    // Ties go to the earliest candidate in document order.
    let mut best: Option<(ElementRef<'_>, f64)> = None;
    for node in doc.tree.nodes() {
        let Some(&raw) = scores.get(&node.id()) else {
            continue;
        };
        let Some(element) = ElementRef::wrap(node) else {
            continue;
        };
        if !CANDIDATE_TAGS.contains(&element.value().name()) {
            continue;
        }
        let score =
            (raw + hint_weight(element)) * (1.0 - link_density(element));
        if best.is_none_or(|(_, top)| score > top) {
            best = Some((element, score));
        }
    }

    let (element, score) = best?;
    tracing::debug!(
        tag = element.value().name(),
        score,
        "main content candidate"
    );
    Some(SimplifiedDocument {
        html: element.html(),
        text_len: visible_text_len(*element),
    })
}

fn hint_weight(element: ElementRef<'_>) -> f64 {
    let value = element.value();
    let hints = format!(
        "{} {}",
        value.attr("class").unwrap_or_default(),
        value.attr("id").unwrap_or_default()
    )
    .to_lowercase();

    let mut weight = 0.0;
    if NEGATIVE_HINTS.iter().any(|h| hints.contains(h)) {
        weight -= HINT_WEIGHT;
    }
    if POSITIVE_HINTS.iter().any(|h| hints.contains(h)) {
        weight += HINT_WEIGHT;
    }
    weight
}

/// Share of the element's visible text that sits inside links.
fn link_density(element: ElementRef<'_>) -> f64 {
    let total = visible_text_len(*element);
    if total == 0 {
        return 0.0;
    }
    let linked: usize = element
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|e| e.value().name() == "a")
        .map(|e| visible_text_len(*e))
        .sum();
    (linked as f64 / total as f64).min(1.0)
}

/// Characters of whitespace-collapsed text, ignoring scripts and styles.
pub(crate) fn visible_text_len(node: NodeRef<'_, Node>) -> usize {
    let mut len = 0;
    // Depth inside a script or style subtree.
    let mut hidden = 0usize;
    for edge in node.traverse() {
        match edge {
            Edge::Open(n) => match n.value() {
                Node::Element(el)
                    if hidden > 0 || matches!(el.name(), "script" | "style") =>
                {
                    hidden += 1;
                }
                Node::Text(text) if hidden == 0 => {
                    len += text
                        .split_whitespace()
                        .map(|word| word.chars().count() + 1)
                        .sum::<usize>()
                        .saturating_sub(1);
                }
                _ => {}
            },
            Edge::Close(n) => {
                if hidden > 0 && n.value().is_element() {
                    hidden -= 1;
                }
            }
        }
    }
    len
}
