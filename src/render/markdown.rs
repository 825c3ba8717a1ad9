//! Conversion of a parsed HTML tree into Markdown-flavored plain text.
//!
//! The tree is walked iteratively over open/close edges with an explicit
//! frame stack, so nesting depth of the page never grows the call stack.

use ego_tree::{NodeId, NodeRef, iter::Edge};
use scraper::{Html, Node, node::Element};

/// Elements whose content is never rendered.
const SKIPPED_TAGS: &[&str] = &[
    "head", "script", "style", "noscript", "template", "svg", "iframe",
    "button", "img",
];

/// Convert `doc` to readable text.
pub fn to_markdown(doc: &Html) -> String {
    let mut writer = Writer::default();
    for edge in doc.tree.root().traverse() {
        match edge {
            Edge::Open(node) => writer.open(node),
            Edge::Close(node) => writer.close(node),
        }
    }
    normalize(&writer.out)
}

#[derive(Debug, Clone, Copy)]
enum ListKind {
    Unordered,
    Ordered(usize),
}

/// What to do with text captured into a side buffer.
#[derive(Debug)]
enum Capture {
    Heading(usize),
    Blockquote,
    Inline(&'static str, &'static str),
    Link(Option<String>),
    Cell,
}

/// Work left for the close edge of an open node.
#[derive(Debug)]
enum Frame {
    Inline,
    Block,
    Line,
    List,
    ListItem,
    Table {
        rows: usize,
    },
    TableSection,
    Row {
        cells: Vec<String>,
        header: bool,
    },
    Capture {
        kind: Capture,
        outer: String,
        outer_space: bool,
    },
}

#[derive(Debug, Default)]
struct Writer {
    out: String,
    lists: Vec<ListKind>,
    frames: Vec<Frame>,
    pending_space: bool,
    /// Subtree being skipped, until its close edge.
    skip: Option<NodeId>,
}

impl Writer {
    fn open(&mut self, node: NodeRef<'_, Node>) {
        if self.skip.is_some() {
            return;
        }
        let frame = match node.value() {
            Node::Text(text) => {
                if !self.in_table_layout() {
                    self.text(text);
                }
                Frame::Inline
            }
            Node::Element(el) => match self.open_element(node, el) {
                Some(frame) => frame,
                None => {
                    self.skip = Some(node.id());
                    return;
                }
            },
            _ => Frame::Inline,
        };
        self.frames.push(frame);
    }

    fn close(&mut self, node: NodeRef<'_, Node>) {
        if let Some(skipped) = self.skip {
            if skipped == node.id() {
                self.skip = None;
            }
            return;
        }
        match self.frames.pop() {
            Some(Frame::Block | Frame::Table { .. }) => self.block(),
            Some(Frame::Line | Frame::ListItem) => self.line(),
            Some(Frame::List) => {
                self.lists.pop();
                self.list_boundary();
            }
            Some(Frame::Row { cells, header }) => {
                self.finish_row(cells, header);
            }
            Some(Frame::Capture {
                kind,
                outer,
                outer_space,
            }) => {
                let inner = std::mem::replace(&mut self.out, outer);
                self.pending_space = outer_space;
                self.finish_capture(kind, &inner);
            }
            Some(Frame::Inline | Frame::TableSection) | None => {}
        }
    }

    /// Start rendering an element. `None` skips its whole subtree.
    fn open_element(
        &mut self,
        node: NodeRef<'_, Node>,
        el: &Element,
    ) -> Option<Frame> {
        let name = el.name();
        if is_hidden(el) || SKIPPED_TAGS.contains(&name) {
            return None;
        }

        // Only rows and cells count inside table layout; nested tables
        // are reached through cell content.
        match self.frames.last_mut() {
            Some(Frame::Table { .. }) => {
                return match name {
                    "tr" => Some(Frame::Row {
                        cells: Vec::new(),
                        header: true,
                    }),
                    "thead" | "tbody" | "tfoot" => Some(Frame::TableSection),
                    _ => None,
                };
            }
            Some(Frame::TableSection) => {
                return (name == "tr").then(|| Frame::Row {
                    cells: Vec::new(),
                    header: true,
                });
            }
            Some(Frame::Row { header, .. }) => {
                match name {
                    "th" => {}
                    "td" => *header = false,
                    _ => return None,
                }
                return Some(self.begin_capture(Capture::Cell));
            }
            _ => {}
        }

        let frame = match name {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = usize::from(name.as_bytes()[1] - b'0');
                self.begin_capture(Capture::Heading(level))
            }
            "p" | "div" | "section" | "article" | "main" | "header"
            | "footer" | "aside" | "figure" | "figcaption" | "center"
            | "address" | "dl" => {
                self.block();
                Frame::Block
            }
            "dt" => {
                self.line();
                Frame::Line
            }
            "dd" => {
                self.line();
                self.out.push_str(": ");
                Frame::Line
            }
            "br" => {
                self.out.push('\n');
                self.pending_space = false;
                Frame::Inline
            }
            "hr" => {
                self.block();
                self.out.push_str("---");
                self.block();
                Frame::Inline
            }
            "pre" => {
                self.code_block(node);
                return None;
            }
            "ul" | "ol" => {
                self.list_boundary();
                self.lists.push(if name == "ol" {
                    ListKind::Ordered(0)
                } else {
                    ListKind::Unordered
                });
                Frame::List
            }
            "li" => {
                self.list_item();
                Frame::ListItem
            }
            "table" => {
                self.block();
                Frame::Table { rows: 0 }
            }
            "blockquote" => self.begin_capture(Capture::Blockquote),
            "code" | "kbd" | "samp" | "tt" => {
                self.begin_capture(Capture::Inline("`", "`"))
            }
            "strong" | "b" => self.begin_capture(Capture::Inline("**", "**")),
            "em" | "i" => self.begin_capture(Capture::Inline("*", "*")),
            "a" => {
                let href = el
                    .attr("href")
                    .map(str::trim)
                    .filter(|h| {
                        !h.is_empty() && !h.starts_with("javascript:")
                    })
                    .map(str::to_string);
                self.begin_capture(Capture::Link(href))
            }
            _ => Frame::Inline,
        };
        Some(frame)
    }

    fn in_table_layout(&self) -> bool {
        matches!(
            self.frames.last(),
            Some(Frame::Table { .. } | Frame::TableSection | Frame::Row { .. })
        )
    }

    fn text(&mut self, text: &str) {
        for (i, word) in text.split_whitespace().enumerate() {
            if i > 0 || text.starts_with(char::is_whitespace) {
                self.pending_space = true;
            }
            self.emit(word);
        }
        if text.ends_with(char::is_whitespace) {
            self.pending_space = true;
        }
    }

    /// Push inline content, inserting a pending separator space first.
    fn emit(&mut self, s: &str) {
        if self.pending_space
            && !self.out.is_empty()
            && !self.out.ends_with([' ', '\n'])
        {
            self.out.push(' ');
        }
        self.pending_space = false;
        self.out.push_str(s);
    }

    /// Redirect output into a fresh buffer until the frame closes.
    fn begin_capture(&mut self, kind: Capture) -> Frame {
        Frame::Capture {
            kind,
            outer: std::mem::take(&mut self.out),
            outer_space: std::mem::replace(&mut self.pending_space, false),
        }
    }

    fn finish_capture(&mut self, kind: Capture, inner: &str) {
        match kind {
            Capture::Heading(level) => {
                let title = collapse(inner);
                if !title.is_empty() {
                    self.block();
                    self.out.push_str(&"#".repeat(level));
                    self.out.push(' ');
                    self.out.push_str(&title);
                    self.block();
                }
            }
            Capture::Blockquote => {
                let inner = normalize(inner);
                if inner.trim().is_empty() {
                    return;
                }
                self.block();
                for line in inner.trim_end().lines() {
                    self.out.push('>');
                    if !line.is_empty() {
                        self.out.push(' ');
                        self.out.push_str(line);
                    }
                    self.out.push('\n');
                }
                self.block();
            }
            Capture::Inline(open, close) => {
                let text = collapse(inner);
                if text.is_empty() {
                    return;
                }
                self.emit(&format!("{open}{text}{close}"));
                if inner.ends_with(char::is_whitespace) {
                    self.pending_space = true;
                }
            }
            Capture::Link(href) => {
                let text = collapse(inner);
                if text.is_empty() {
                    return;
                }
                match href {
                    Some(href) => self.emit(&format!("[{text}]({href})")),
                    None => self.emit(&text),
                }
            }
            Capture::Cell => {
                if let Some(Frame::Row { cells, .. }) = self.frames.last_mut() {
                    cells.push(collapse(inner).replace('|', "\\|"));
                }
            }
        }
    }

    fn finish_row(&mut self, cells: Vec<String>, header: bool) {
        let index = self.frames.iter_mut().rev().find_map(|frame| match frame {
            Frame::Table { rows } => {
                *rows += 1;
                Some(*rows - 1)
            }
            _ => None,
        });
        if cells.iter().all(String::is_empty) {
            return;
        }
        self.out.push_str("| ");
        self.out.push_str(&cells.join(" | "));
        self.out.push_str(" |\n");
        if index == Some(0) && header {
            self.out.push('|');
            self.out.push_str(&" --- |".repeat(cells.len()));
            self.out.push('\n');
        }
    }

    fn code_block(&mut self, node: NodeRef<'_, Node>) {
        let code = raw_text(node);
        let code = code.trim_matches('\n');
        if code.trim().is_empty() {
            return;
        }
        self.line();
        if self.lists.is_empty() {
            self.block();
        }
        self.out.push_str("```\n");
        self.out.push_str(code.trim_end());
        self.out.push_str("\n```");
        self.block();
    }

    /// Lists are blocks at top level and lines when nested.
    fn list_boundary(&mut self) {
        if self.lists.is_empty() {
            self.block();
        } else {
            self.line();
        }
    }

    fn list_item(&mut self) {
        self.line();
        let depth = self.lists.len().saturating_sub(1);
        let marker = match self.lists.last_mut() {
            Some(ListKind::Ordered(n)) => {
                *n += 1;
                format!("{n}. ")
            }
            _ => "- ".to_string(),
        };
        self.out.push_str(&"  ".repeat(depth));
        self.out.push_str(&marker);
    }

    /// End the current line, if any. A bare list marker stays open so
    /// block content lands on the marker's line.
    fn line(&mut self) {
        if !self.out.is_empty()
            && !self.out.ends_with('\n')
            && !self.at_item_marker()
        {
            self.out.push('\n');
        }
        self.pending_space = false;
    }

    fn at_item_marker(&self) -> bool {
        let last = self
            .out
            .rsplit_once('\n')
            .map_or(self.out.as_str(), |(_, line)| line)
            .trim();
        last == "-"
            || last.strip_suffix('.').is_some_and(|n| {
                !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit())
            })
    }

    /// Separate blocks by one blank line (one line break inside lists).
    fn block(&mut self) {
        self.line();
        if self.lists.is_empty()
            && !self.out.is_empty()
            && !self.out.ends_with("\n\n")
        {
            self.out.push('\n');
        }
    }
}

fn is_hidden(el: &Element) -> bool {
    if el.attr("hidden").is_some() {
        return true;
    }
    el.attr("style").is_some_and(|style| {
        let style: String = style
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        style.contains("display:none")
    })
}

/// Text of a subtree exactly as written, with `<br>` as line breaks.
fn raw_text(node: NodeRef<'_, Node>) -> String {
    let mut out = String::new();
    for descendant in node.descendants() {
        match descendant.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) if el.name() == "br" => out.push('\n'),
            _ => {}
        }
    }
    out
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Trim trailing spaces and squeeze blank-line runs outside code fences.
fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_fence = false;
    let mut blank_run = 0;

    for line in text.lines() {
        if line.trim_start().starts_with("```") {
            in_fence = !in_fence;
        }
        let line = if in_fence { line } else { line.trim_end() };
        if line.trim().is_empty() && !in_fence {
            blank_run += 1;
            if blank_run > 1 || out.is_empty() {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push_str(line);
        out.push('\n');
    }

    let trimmed = out.trim_end();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{trimmed}\n")
    }
}
