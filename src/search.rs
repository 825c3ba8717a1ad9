use std::path::PathBuf;

use serde::Serialize;

use crate::{
    error::{Error, Result},
    path_resolver::PathResolver,
    symbol_store::{SymbolRow, SymbolStore},
};

/// A symbol matched by a query, with its page already resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    pub name: String,
    pub symbol_type: String,
    pub anchor: Option<String>,
    pub file_path: PathBuf,
    pub url: String,
}

/// Parameters for [`SearchIndex::search_with`].
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Case-sensitive substring; empty matches every symbol.
    pub query: String,
    /// Only return symbols with this type label (e.g. "Function").
    pub symbol_type: Option<String>,
    /// Maximum number of results, `None` for all.
    pub limit: Option<usize>,
}

impl SearchOptions {
    pub fn new(query: &str) -> Self {
        Self {
            query: query.to_string(),
            ..Default::default()
        }
    }
}

/// Name lookup over a docset's search view.
///
/// Holds nothing but borrows, so every call sees the same data and leaves
/// no state behind. Results rank shorter names first; equal lengths keep
/// the view's storage order.
#[derive(Debug, Clone, Copy)]
pub struct SearchIndex<'a> {
    store: &'a SymbolStore,
    resolver: &'a PathResolver,
}

impl<'a> SearchIndex<'a> {
    pub fn new(store: &'a SymbolStore, resolver: &'a PathResolver) -> Self {
        Self { store, resolver }
    }

    pub fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        self.search_with(&SearchOptions::new(query))
    }

    pub fn search_with(
        &self,
        options: &SearchOptions,
    ) -> Result<Vec<SearchResult>> {
        let mut rows = self
            .store
            .find_symbols(&options.query, options.symbol_type.as_deref())?;

        // Stable, so ties keep storage order.
        rows.sort_by_key(|row| row.name.chars().count());

        let limit = options.limit.unwrap_or(usize::MAX);
        let mut results = Vec::with_capacity(rows.len().min(limit));
        for row in rows {
            if results.len() >= limit {
                break;
            }
            match self.to_result(row) {
                Ok(result) => results.push(result),
                Err(Error::Decode { path, reason }) => {
                    tracing::warn!(%path, %reason, "skipping unresolvable path");
                }
                Err(e) => return Err(e),
            }
        }

        tracing::debug!(
            query = %options.query,
            results = results.len(),
            "search complete"
        );
        Ok(results)
    }

    fn to_result(&self, row: SymbolRow) -> Result<SearchResult> {
        let resolved = self.resolver.resolve(&row.path)?;
        Ok(SearchResult {
            name: row.name,
            symbol_type: row.symbol_type,
            anchor: row.anchor,
            file_path: resolved.file_path,
            url: resolved.url,
        })
    }
}

/// Format results for human-readable terminal output.
pub fn format_human(results: &[SearchResult]) {
    if results.is_empty() {
        println!("No results found.");
        return;
    }

    for (i, r) in results.iter().enumerate() {
        println!("{:>3}. {} [{}]", i + 1, r.name, r.symbol_type);
        println!("     {}", r.file_path.display());
    }
    println!("\n{} result(s)", results.len());
}

/// Format results as plain source URLs (one per line).
pub fn format_urls(results: &[SearchResult]) {
    for r in results {
        println!("{}", r.url);
    }
}

/// Build the JSON document printed by `search --json`.
pub fn to_json(results: &[SearchResult], query: &str) -> serde_json::Value {
    serde_json::json!({
        "query": query,
        "result_count": results.len(),
        "results": results,
    })
}

/// Format results as JSON output.
pub fn format_json(results: &[SearchResult], query: &str) -> Result<()> {
    println!("{}", serde_json::to_string(&to_json(results, query))?);
    Ok(())
}
