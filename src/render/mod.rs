//! Turning documentation pages into readable terminal text.
//!
//! The pipeline has three independent stages over the same raw markup:
//!
//! 1. [`simplify::main_content`] parses the full original page and picks
//!    the densest content block. It must see the untouched document.
//! 2. [`chrome::strip_chrome`] parses the markup again and detaches
//!    navigation and print-only elements.
//! 3. [`markdown::to_markdown`] converts the stripped tree to text.
//!
//! With [`RenderMode::FullDocument`] the stage 1 result is computed and
//! logged but the whole chrome-stripped page is converted, which keeps
//! sidebars and footers that do not match a chrome rule. With
//! [`RenderMode::MainContent`] stage 2 runs on the stage 1 block instead.

use std::path::Path;

use scraper::Html;

use crate::error::{Error, Result};

pub mod chrome;
pub mod markdown;
pub mod simplify;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RenderMode {
    /// Convert the whole page after chrome stripping.
    #[default]
    FullDocument,
    /// Convert only the detected main content block, falling back to the
    /// whole page when none is found.
    MainContent,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    pub mode: RenderMode,
}

impl RenderOptions {
    pub fn main_content(enabled: bool) -> Self {
        Self {
            mode: if enabled {
                RenderMode::MainContent
            } else {
                RenderMode::FullDocument
            },
        }
    }
}

/// Read the page at `path` and render it.
pub fn render_file(path: &Path, options: &RenderOptions) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let html = String::from_utf8_lossy(&bytes);
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "loaded page");
    Ok(render_html(&html, options))
}

/// Render raw markup. Never fails: malformed markup renders best-effort.
pub fn render_html(html: &str, options: &RenderOptions) -> String {
    let simplified = simplify::main_content(html);
    match &simplified {
        Some(doc) => {
            tracing::debug!(text_len = doc.text_len, "main content found");
        }
        None => tracing::debug!("no main content block"),
    }

    let source = match (options.mode, &simplified) {
        (RenderMode::MainContent, Some(doc)) => doc.html.as_str(),
        _ => html,
    };

    let mut tree = Html::parse_document(source);
    let removed = chrome::strip_chrome(&mut tree);
    tracing::debug!(removed, "stripped chrome elements");

    markdown::to_markdown(&tree)
}
