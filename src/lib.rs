//! docs-viewer - search and read offline Dash docsets from the terminal.
//!
//! A docset is an extracted bundle holding a SQLite symbol index
//! (`docSet.dsidx`) and a `Documents/` tree of HTML pages. This crate
//! answers substring queries over the symbol names and renders the
//! matching pages as readable text.
//!
//! # Quick start
//!
//! ```no_run
//! use docs_viewer::{DataDir, Docset};
//! use docs_viewer::render::{self, RenderOptions};
//!
//! let data_dir = DataDir::resolve(None).unwrap();
//! let docset =
//!     Docset::open("C++", &data_dir.docset_resources("C++")).unwrap();
//!
//! let results = docset.index().search("push_back").unwrap();
//! if let Some(top) = results.first() {
//!     println!("{} -> {}", top.name, top.url);
//!     let text =
//!         render::render_file(&top.file_path, &RenderOptions::default())
//!             .unwrap();
//!     println!("{text}");
//! }
//! ```

pub mod config;
pub mod data_dir;
pub mod docset;
pub mod error;
pub mod path_resolver;
pub mod render;
pub mod search;
pub mod symbol_store;
pub mod viewer;

#[cfg(test)]
pub(crate) mod testing;

pub use config::Config;
pub use data_dir::DataDir;
pub use docset::Docset;
pub use error::{Error, Result};
pub use path_resolver::{PathResolver, ResolvedPath};
pub use search::{SearchIndex, SearchOptions, SearchResult};
pub use symbol_store::SymbolStore;
