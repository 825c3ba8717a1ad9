//! Removal of non-content page chrome (navigation blocks, print artifacts).

use ego_tree::NodeId;
use scraper::{Html, node::Element};

/// How a chrome rule matches an element's `class` attribute.
#[derive(Debug, Clone, Copy)]
enum ClassRule {
    /// The raw attribute value contains the substring.
    Contains(&'static str),
    /// The raw attribute value is exactly this string.
    Exact(&'static str),
}

const CHROME_RULES: &[ClassRule] =
    &[ClassRule::Contains("nav"), ClassRule::Exact("noprint")];

pub fn is_chrome(element: &Element) -> bool {
    let Some(class) = element.attr("class") else {
        return false;
    };
    CHROME_RULES.iter().any(|rule| match rule {
        ClassRule::Contains(needle) => class.contains(needle),
        ClassRule::Exact(value) => class == *value,
    })
}

/// Detach every chrome element, with its descendants, from `doc`.
///
/// Returns the number of matching elements, nested matches included.
pub fn strip_chrome(doc: &mut Html) -> usize {
    let matches: Vec<NodeId> = doc
        .tree
        .nodes()
        .filter(|node| node.value().as_element().is_some_and(is_chrome))
        .map(|node| node.id())
        .collect();

    for id in &matches {
        if let Some(mut node) = doc.tree.get_mut(*id) {
            node.detach();
        }
    }
    matches.len()
}
