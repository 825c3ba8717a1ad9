use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

#[derive(Debug, Parser)]
#[command(
    name = "docs-viewer",
    about = "Search and read offline Dash docsets from the terminal"
)]
pub struct Cli {
    /// Override the XDG data directory
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Override the config file location
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List docsets installed in the data directory
    List,
    /// Prepare a docset's search view
    Index(DocsetArgs),
    /// Search symbol names in a docset
    Search(SearchArgs),
    /// Render the page of the best match for a query
    Show(ShowArgs),
    /// Render a local HTML file as text
    Render(RenderArgs),
    /// Print raw symbol rows (debugging)
    Tokens(TokensArgs),
    /// Print every page path stored in a docset (debugging)
    Paths(DocsetArgs),
    /// Show docset location and statistics
    Status(StatusArgs),
    /// Interactive line-mode browser reading commands from stdin
    Browse(BrowseArgs),
    /// Generate shell completions
    #[command(hide = true)]
    Completions(CompletionsArgs),
}

#[derive(Debug, Parser)]
pub struct DocsetArgs {
    /// Docset name (defaults to the configured default)
    pub docset: Option<String>,
}

// -- Search --

#[derive(Debug, Parser)]
pub struct SearchArgs {
    /// Case-sensitive substring of the symbol name
    pub query: String,

    /// Docset to search (defaults to the configured default)
    #[arg(short = 'd', long)]
    pub docset: Option<String>,

    /// Number of results to return
    #[arg(short = 'n', long, default_value = "20")]
    pub count: usize,

    /// Return every match
    #[arg(long)]
    pub all: bool,

    /// Only return symbols of this type (e.g. Function, Class)
    #[arg(short = 't', long = "type")]
    pub symbol_type: Option<String>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,

    /// Output only source URLs (one per line)
    #[arg(long)]
    pub urls: bool,
}

// -- Show / Render --

#[derive(Debug, Parser)]
pub struct ShowArgs {
    /// Case-sensitive substring of the symbol name
    pub query: String,

    /// Docset to search (defaults to the configured default)
    #[arg(short = 'd', long)]
    pub docset: Option<String>,

    /// Render only the detected main content block
    #[arg(long)]
    pub main_content: bool,

    /// Open the source URL in the default browser instead of rendering
    #[arg(long)]
    pub open: bool,
}

#[derive(Debug, Parser)]
pub struct RenderArgs {
    /// Path to an HTML file
    pub file: PathBuf,

    /// Render only the detected main content block
    #[arg(long)]
    pub main_content: bool,
}

// -- Debug listings --

#[derive(Debug, Parser)]
pub struct TokensArgs {
    /// Docset name (defaults to the configured default)
    pub docset: Option<String>,

    /// Maximum number of rows
    #[arg(short = 'n', long, default_value = "20")]
    pub limit: usize,
}

#[derive(Debug, Parser)]
pub struct StatusArgs {
    /// Docset name (defaults to the configured default)
    pub docset: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// -- Browse --

#[derive(Debug, Parser)]
pub struct BrowseArgs {
    /// Docset name (defaults to the configured default)
    pub docset: Option<String>,

    /// Render only the detected main content block
    #[arg(long)]
    pub main_content: bool,

    /// Maximum number of result names printed per query
    #[arg(short = 'n', long, default_value = "20")]
    pub count: usize,
}

// -- Completions --

#[derive(Debug, Parser)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

impl CompletionsArgs {
    /// Generate shell completions and print to stdout.
    pub fn generate(&self) {
        let mut cmd = Cli::command();
        clap_complete::generate(
            self.shell,
            &mut cmd,
            "docs-viewer",
            &mut std::io::stdout(),
        );
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn parse_search_defaults() {
        let cli = Cli::parse_from(["docs-viewer", "search", "vector"]);
        match cli.command {
            Command::Search(args) => {
                assert_eq!(args.query, "vector");
                assert_eq!(args.docset, None);
                assert_eq!(args.count, 20);
                assert!(!args.all);
                assert!(!args.json);
                assert!(!args.urls);
                assert_eq!(args.symbol_type, None);
            }
            _ => panic!("expected search command"),
        }
    }

    #[test]
    fn parse_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "docs-viewer",
            "search",
            "-d",
            "C++",
            "--type",
            "Class",
            "vector",
            "-vv",
            "--data-dir",
            "/tmp/data",
        ]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/data")));
        match cli.command {
            Command::Search(args) => {
                assert_eq!(args.docset.as_deref(), Some("C++"));
                assert_eq!(args.symbol_type.as_deref(), Some("Class"));
            }
            _ => panic!("expected search command"),
        }
    }

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }
}
