use std::io::{BufRead, Write};

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::{Cli, Command};
use docs_viewer::{
    Config,
    DataDir,
    Docset,
    SearchOptions,
    error::{self, Error},
    render::{self, RenderOptions},
    search,
    viewer::{Effect, Event, Viewer},
};

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if let Ok(env) = std::env::var("DOCS_VIEWER_LOG") {
        EnvFilter::new(env)
    } else if quiet {
        EnvFilter::new("warn")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn main() -> error::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    if let Command::Completions(args) = &cli.command {
        args.generate();
        return Ok(());
    }
    if let Command::Render(args) = &cli.command {
        let options = RenderOptions::main_content(args.main_content);
        print!("{}", render::render_file(&args.file, &options)?);
        return Ok(());
    }

    let data_dir = DataDir::resolve(cli.data_dir.as_deref())?;
    let config = Config::load(&Config::locate(cli.config.as_deref())?)?;

    match cli.command {
        Command::List => cmd_list(&data_dir, &config)?,
        Command::Index(args) => {
            let docset = open_docset(&data_dir, &config, args.docset)?;
            println!(
                "Search view ready for '{}' ({} symbols)",
                docset.name(),
                docset.store().symbol_count()?
            );
        }
        Command::Search(args) => {
            let docset = open_docset(&data_dir, &config, args.docset)?;
            let options = SearchOptions {
                query: args.query.clone(),
                symbol_type: args.symbol_type,
                limit: (!args.all).then_some(args.count),
            };
            let results = docset.index().search_with(&options)?;

            if args.json {
                search::format_json(&results, &args.query)?;
            } else if args.urls {
                search::format_urls(&results);
            } else {
                search::format_human(&results);
            }
        }
        Command::Show(args) => {
            let docset = open_docset(&data_dir, &config, args.docset)?;
            let mut options = SearchOptions::new(&args.query);
            options.limit = Some(1);
            let top = docset
                .index()
                .search_with(&options)?
                .into_iter()
                .next()
                .ok_or_else(|| Error::NotFound {
                    kind: "symbol",
                    name: args.query.clone(),
                })?;

            if args.open {
                open_url(&top.url)?;
            } else {
                let options = RenderOptions::main_content(args.main_content);
                print!("{}", render::render_file(&top.file_path, &options)?);
            }
        }
        Command::Tokens(args) => {
            let docset = open_docset(&data_dir, &config, args.docset)?;
            for row in docset.store().list_tokens(args.limit)? {
                let meta = row
                    .meta_info
                    .map_or_else(|| "-".to_string(), |m| m.to_string());
                println!("{}\t{}\t{}", row.id, meta, row.name);
            }
        }
        Command::Paths(args) => {
            let docset = open_docset(&data_dir, &config, args.docset)?;
            for row in docset.store().list_paths()? {
                println!("{}\t{}", row.id, row.path);
            }
        }
        Command::Status(args) => {
            let docset = open_docset(&data_dir, &config, args.docset)?;
            cmd_status(&docset, args.json)?;
        }
        Command::Browse(args) => {
            let docset = open_docset(&data_dir, &config, args.docset)?;
            let options = RenderOptions::main_content(args.main_content);
            cmd_browse(&docset, options, args.count)?;
        }
        Command::Completions(_) | Command::Render(_) => {}
    }

    Ok(())
}

fn open_docset(
    data_dir: &DataDir,
    config: &Config,
    explicit: Option<String>,
) -> error::Result<Docset> {
    let name = config.pick_docset(explicit.as_deref())?;
    let root = data_dir.docset_resources(&name);
    if !root.is_dir() {
        return Err(Error::NotFound {
            kind: "docset",
            name,
        });
    }
    Docset::open(&name, &root)
}

fn cmd_list(data_dir: &DataDir, config: &Config) -> error::Result<()> {
    let installed = data_dir.installed_docsets()?;

    if installed.is_empty() {
        println!(
            "No docsets installed in {}",
            data_dir.docsets_dir().display()
        );
    }
    for name in &installed {
        let marker = if config.docsets.contains(name) { "*" } else { " " };
        println!("{marker} {name}");
    }
    for name in config.docsets.iter().filter(|n| !installed.contains(n)) {
        println!("! {name} (configured, not installed)");
    }
    Ok(())
}

fn cmd_status(docset: &Docset, json: bool) -> error::Result<()> {
    let symbols = docset.store().symbol_count()?;
    let pages = docset.store().list_paths()?.len();
    let types = docset.store().symbol_types()?;

    if json {
        let status = serde_json::json!({
            "docset": docset.name(),
            "root": docset.root(),
            "symbols": symbols,
            "pages": pages,
            "types": types,
        });
        println!("{}", serde_json::to_string(&status)?);
    } else {
        println!("Docset: {}", docset.name());
        println!("Root: {}", docset.root().display());
        println!("Symbols: {symbols}");
        println!("Pages: {pages}");
        println!("Types: {}", types.join(", "));
    }
    Ok(())
}

fn cmd_browse(
    docset: &Docset,
    options: RenderOptions,
    count: usize,
) -> error::Result<()> {
    let mut viewer = Viewer::new(docset, options);
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();

    eprintln!(
        "Browsing '{}'. Type a query, or :up :down :<n> :open :q",
        docset.name()
    );
    for line in stdin.lock().lines() {
        let line = line?;
        let Some(event) = Event::from_input(&line) else {
            eprintln!("Unknown command: {line}");
            continue;
        };

        for effect in viewer.handle(event) {
            match effect {
                Effect::Results { names, highlighted } => {
                    for (i, name) in names.iter().enumerate().take(count) {
                        let mark = if Some(i) == highlighted { '>' } else { ' ' };
                        writeln!(stdout, "{mark}{:>4}. {name}", i + 1)?;
                    }
                    if names.len() > count {
                        writeln!(stdout, "  ... {} more", names.len() - count)?;
                    }
                }
                Effect::Render(text) => {
                    writeln!(stdout, "{}", "-".repeat(60))?;
                    write!(stdout, "{text}")?;
                }
                Effect::Error(message) => eprintln!("{message}"),
                Effect::OpenUrl(url) => {
                    if let Err(e) = open_url(&url) {
                        eprintln!("cannot open {url}: {e}");
                    }
                }
                Effect::Quit => return Ok(()),
            }
        }
        stdout.flush()?;
    }
    Ok(())
}

/// Hand `url` to the platform's default handler.
fn open_url(url: &str) -> error::Result<()> {
    let opener = if cfg!(target_os = "macos") {
        "open"
    } else {
        "xdg-open"
    };
    tracing::debug!(opener, url, "opening url");
    let status = std::process::Command::new(opener).arg(url).status()?;
    if !status.success() {
        tracing::warn!(opener, %status, "opener exited with failure");
    }
    Ok(())
}
