use std::path::{Path, PathBuf};

use crate::{
    data_dir::{DOCUMENTS_DIR, INDEX_FILE},
    error::Result,
    path_resolver::PathResolver,
    search::SearchIndex,
    symbol_store::SymbolStore,
};

/// An extracted documentation bundle, opened for searching.
///
/// Owns the symbol index connection for as long as the value lives.
#[derive(Debug)]
pub struct Docset {
    name: String,
    root: PathBuf,
    store: SymbolStore,
    resolver: PathResolver,
}

impl Docset {
    /// Open the docset whose `Contents/Resources` directory is `root`,
    /// making sure its search view exists.
    pub fn open(name: &str, root: &Path) -> Result<Self> {
        let store = SymbolStore::open(&root.join(INDEX_FILE))?;
        store.ensure_search_view()?;
        tracing::debug!(docset = name, root = %root.display(), "docset ready");

        Ok(Self {
            name: name.to_string(),
            root: root.to_path_buf(),
            store,
            resolver: PathResolver::new(root.join(DOCUMENTS_DIR)),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn store(&self) -> &SymbolStore {
        &self.store
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    pub fn index(&self) -> SearchIndex<'_> {
        SearchIndex::new(&self.store, &self.resolver)
    }
}
