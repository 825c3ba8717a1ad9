//! Front-end independent viewer state.
//!
//! A front end turns user input into [`Event`]s, feeds them to
//! [`Viewer::handle`] and performs the returned [`Effect`]s. Each event
//! kind maps to exactly one handler through [`Viewer::handler`].

use crate::{
    docset::Docset,
    render::{self, RenderOptions},
    search::SearchResult,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The search text changed.
    QueryChanged(String),
    /// Highlight the result at this index (0-based).
    Highlight(usize),
    CursorUp,
    CursorDown,
    /// Open the highlighted result's source URL.
    Open,
    Quit,
}

impl Event {
    /// Parse one line of line-mode input.
    ///
    /// Lines starting with `:` are commands (`:q`, `:up`, `:down`,
    /// `:open`, `:<n>` for 1-based result numbers); anything else is a
    /// new query. Returns `None` for an unknown command.
    pub fn from_input(line: &str) -> Option<Self> {
        let Some(command) = line.strip_prefix(':') else {
            return Some(Self::QueryChanged(line.to_string()));
        };
        match command.trim() {
            "q" | "quit" => Some(Self::Quit),
            "k" | "up" => Some(Self::CursorUp),
            "j" | "down" => Some(Self::CursorDown),
            "o" | "open" => Some(Self::Open),
            n => n
                .parse::<usize>()
                .ok()
                .filter(|&n| n > 0)
                .map(|n| Self::Highlight(n - 1)),
        }
    }
}

/// Something the front end must do in response to an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Replace the result list; `highlighted` indexes into `names`.
    Results {
        names: Vec<String>,
        highlighted: Option<usize>,
    },
    /// Show rendered page text.
    Render(String),
    /// Show an error notice; the rest of the state is unchanged.
    Error(String),
    /// Hand this URL to the platform's default handler.
    OpenUrl(String),
    Quit,
}

type Handler<'a> = fn(&mut Viewer<'a>, Event) -> Vec<Effect>;

pub struct Viewer<'a> {
    docset: &'a Docset,
    render_options: RenderOptions,
    results: Vec<SearchResult>,
    highlighted: Option<usize>,
}

impl<'a> Viewer<'a> {
    pub fn new(docset: &'a Docset, render_options: RenderOptions) -> Self {
        Self {
            docset,
            render_options,
            results: Vec::new(),
            highlighted: None,
        }
    }

    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    pub fn highlighted(&self) -> Option<&SearchResult> {
        self.highlighted.and_then(|i| self.results.get(i))
    }

    pub fn handle(&mut self, event: Event) -> Vec<Effect> {
        let handler = Self::handler(&event);
        handler(self, event)
    }

    fn handler(event: &Event) -> Handler<'a> {
        match event {
            Event::QueryChanged(_) => Self::on_query_changed,
            Event::Highlight(_) => Self::on_highlight,
            Event::CursorUp => Self::on_cursor_up,
            Event::CursorDown => Self::on_cursor_down,
            Event::Open => Self::on_open,
            Event::Quit => Self::on_quit,
        }
    }

    fn on_query_changed(&mut self, event: Event) -> Vec<Effect> {
        let Event::QueryChanged(query) = event else {
            return vec![];
        };

        let mut effects = Vec::new();
        self.results = match self.docset.index().search(&query) {
            Ok(results) => results,
            Err(e) => {
                tracing::warn!(%query, error = %e, "search failed");
                effects.push(Effect::Error(format!("search failed: {e}")));
                Vec::new()
            }
        };
        self.highlighted = (!self.results.is_empty()).then_some(0);

        effects.push(Effect::Results {
            names: self.results.iter().map(|r| r.name.clone()).collect(),
            highlighted: self.highlighted,
        });
        effects.extend(self.render_highlighted());
        effects
    }

    fn on_highlight(&mut self, event: Event) -> Vec<Effect> {
        let Event::Highlight(index) = event else {
            return vec![];
        };
        let last = self.results.len().checked_sub(1);
        self.move_to(last.map(|last| index.min(last)))
    }

    fn on_cursor_up(&mut self, _: Event) -> Vec<Effect> {
        self.move_to(self.highlighted.map(|i| i.saturating_sub(1)))
    }

    fn on_cursor_down(&mut self, _: Event) -> Vec<Effect> {
        let last = self.results.len().checked_sub(1);
        let target = self.highlighted.zip(last).map(|(i, last)| (i + 1).min(last));
        self.move_to(target)
    }

    fn on_open(&mut self, _: Event) -> Vec<Effect> {
        self.highlighted()
            .map(|r| Effect::OpenUrl(r.url.clone()))
            .into_iter()
            .collect()
    }

    fn on_quit(&mut self, _: Event) -> Vec<Effect> {
        vec![Effect::Quit]
    }

    /// Highlight `target` and render it, unless it is already highlighted.
    fn move_to(&mut self, target: Option<usize>) -> Vec<Effect> {
        if target.is_none() || target == self.highlighted {
            return vec![];
        }
        self.highlighted = target;
        self.render_highlighted().into_iter().collect()
    }

    fn render_highlighted(&self) -> Option<Effect> {
        let result = self.highlighted()?;
        Some(
            match render::render_file(&result.file_path, &self.render_options)
            {
                Ok(text) => Effect::Render(text),
                Err(e) => {
                    tracing::warn!(error = %e, "render failed");
                    Effect::Error(format!("render failed: {e}"))
                }
            },
        )
    }
}

impl std::fmt::Debug for Viewer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Viewer")
            .field("docset", &self.docset.name())
            .field("results", &self.results.len())
            .field("highlighted", &self.highlighted)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        data_dir::INDEX_FILE,
        testing::{FixtureSymbol, write_index},
    };

    fn fixture() -> (tempfile::TempDir, Docset) {
        let tmp = tempfile::tempdir().unwrap();
        write_index(
            &tmp.path().join(INDEX_FILE),
            &[
                FixtureSymbol::new("abs", "Function", "c>x.org%2Fabs.html"),
                FixtureSymbol::new("labs", "Function", "c>x.org%2Flabs.html"),
                FixtureSymbol::new("llabs", "Function", "c>x.org%2Fmissing.html"),
            ],
        );
        let docs = tmp.path().join("Documents/x.org");
        std::fs::create_dir_all(&docs).unwrap();
        std::fs::write(docs.join("abs.html"), "<h1>abs</h1><p>absolute value</p>")
            .unwrap();
        std::fs::write(docs.join("labs.html"), "<h1>labs</h1><p>long absolute</p>")
            .unwrap();

        let docset = Docset::open("C", tmp.path()).unwrap();
        (tmp, docset)
    }

    #[test]
    fn parse_line_input() {
        assert_eq!(
            Event::from_input("vector"),
            Some(Event::QueryChanged("vector".into()))
        );
        assert_eq!(Event::from_input(""), Some(Event::QueryChanged(String::new())));
        assert_eq!(Event::from_input(":q"), Some(Event::Quit));
        assert_eq!(Event::from_input(":down"), Some(Event::CursorDown));
        assert_eq!(Event::from_input(":k"), Some(Event::CursorUp));
        assert_eq!(Event::from_input(":open"), Some(Event::Open));
        assert_eq!(Event::from_input(":3"), Some(Event::Highlight(2)));
        assert_eq!(Event::from_input(":0"), None);
        assert_eq!(Event::from_input(":bogus"), None);
    }

    #[test]
    fn query_lists_results_and_renders_best_match() {
        let (_tmp, docset) = fixture();
        let mut viewer = Viewer::new(&docset, RenderOptions::default());

        let effects = viewer.handle(Event::QueryChanged("abs".into()));
        assert_eq!(
            effects,
            vec![
                Effect::Results {
                    names: vec!["abs".into(), "labs".into(), "llabs".into()],
                    highlighted: Some(0),
                },
                Effect::Render("# abs\n\nabsolute value\n".into()),
            ]
        );
    }

    #[test]
    fn cursor_moves_and_clamps() {
        let (_tmp, docset) = fixture();
        let mut viewer = Viewer::new(&docset, RenderOptions::default());
        viewer.handle(Event::QueryChanged("abs".into()));

        assert!(viewer.handle(Event::CursorUp).is_empty());

        let effects = viewer.handle(Event::CursorDown);
        assert_eq!(
            effects,
            vec![Effect::Render("# labs\n\nlong absolute\n".into())]
        );
        assert_eq!(viewer.highlighted().unwrap().name, "labs");

        viewer.handle(Event::Highlight(99));
        assert_eq!(viewer.highlighted().unwrap().name, "llabs");
        assert!(viewer.handle(Event::CursorDown).is_empty());
    }

    #[test]
    fn render_failure_keeps_state() {
        let (_tmp, docset) = fixture();
        let mut viewer = Viewer::new(&docset, RenderOptions::default());
        viewer.handle(Event::QueryChanged("abs".into()));

        let effects = viewer.handle(Event::Highlight(2));
        assert!(matches!(effects.as_slice(), [Effect::Error(msg)] if msg.contains("render failed")));
        assert_eq!(viewer.results().len(), 3);
        assert_eq!(viewer.highlighted().unwrap().name, "llabs");
    }

    #[test]
    fn open_yields_source_url() {
        let (_tmp, docset) = fixture();
        let mut viewer = Viewer::new(&docset, RenderOptions::default());

        assert!(viewer.handle(Event::Open).is_empty());

        viewer.handle(Event::QueryChanged("labs".into()));
        assert_eq!(
            viewer.handle(Event::Open),
            vec![Effect::OpenUrl("https://x.org/labs.html".into())]
        );
    }

    #[test]
    fn no_matches_clears_highlight() {
        let (_tmp, docset) = fixture();
        let mut viewer = Viewer::new(&docset, RenderOptions::default());
        viewer.handle(Event::QueryChanged("abs".into()));

        let effects = viewer.handle(Event::QueryChanged("zzz".into()));
        assert_eq!(
            effects,
            vec![Effect::Results {
                names: vec![],
                highlighted: None
            }]
        );
        assert!(viewer.highlighted().is_none());
        assert!(viewer.handle(Event::CursorDown).is_empty());
    }

    #[test]
    fn quit_is_forwarded() {
        let (_tmp, docset) = fixture();
        let mut viewer = Viewer::new(&docset, RenderOptions::default());
        assert_eq!(viewer.handle(Event::Quit), vec![Effect::Quit]);
    }
}
