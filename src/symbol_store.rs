//! Read access to a docset's `docSet.dsidx` symbol index.
//!
//! The index is a Core Data SQLite file with four relations: `ztoken`
//! (symbol names), `ztokenmetainformation` (file + anchor per symbol),
//! `zfilepath` (page paths) and `ztokentype` (category labels). Lookups go
//! through `search_index_view`, a denormalized join created once per file.

use std::{
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard, PoisonError},
};

use rusqlite::{Connection, ErrorCode, OpenFlags, params};

use crate::error::{Error, Result};

/// Name of the denormalized search view.
pub const SEARCH_VIEW: &str = "search_index_view";

const REQUIRED_TABLES: &[&str] =
    &["ztoken", "ztokenmetainformation", "zfilepath", "ztokentype"];

const SEARCH_VIEW_SELECT: &str = "
    SELECT
        ztoken.ztokenname AS name,
        ztokentype.ztypename AS type,
        zfilepath.zpath AS path,
        ztokenmetainformation.zanchor AS anchor
    FROM ztoken
    INNER JOIN ztokenmetainformation
        ON ztoken.zmetainformation = ztokenmetainformation.z_pk
    INNER JOIN zfilepath
        ON ztokenmetainformation.zfile = zfilepath.z_pk
    INNER JOIN ztokentype
        ON ztoken.ztokentype = ztokentype.z_pk
    ORDER BY -length(name)
";

/// A raw row of the `ztoken` relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRow {
    pub id: i64,
    pub meta_info: Option<i64>,
    pub name: String,
}

/// A row of the `zfilepath` relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathRow {
    pub id: i64,
    pub path: String,
}

/// One row of the search view, with the stored (still encoded) path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolRow {
    pub name: String,
    pub symbol_type: String,
    pub path: String,
    pub anchor: Option<String>,
}

/// Owned handle on a docset's symbol index.
///
/// The connection is opened once and every read serializes on it, so the
/// store can be shared between threads without corrupting results.
pub struct SymbolStore {
    path: PathBuf,
    conn: Mutex<Connection>,
}

impl SymbolStore {
    /// Open an existing index file. Never creates one.
    ///
    /// Write-protected files open read-only; [`Self::ensure_search_view`]
    /// then falls back to a per-connection view.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
    }

    fn open_with_flags(path: &Path, flags: OpenFlags) -> Result<Self> {
        let unavailable = |reason: String| Error::StoreUnavailable {
            path: path.to_path_buf(),
            reason,
        };

        if !path.is_file() {
            return Err(unavailable("index file does not exist".into()));
        }

        let conn = Connection::open_with_flags(path, flags)
            .map_err(|e| unavailable(e.to_string()))?;

        for table in REQUIRED_TABLES {
            let present: bool = conn
                .query_row(
                    "SELECT EXISTS(SELECT 1 FROM sqlite_master \
                     WHERE type = 'table' AND lower(name) = ?1)",
                    params![table],
                    |row| row.get(0),
                )
                .map_err(|e| unavailable(e.to_string()))?;
            if !present {
                return Err(unavailable(format!("missing table '{table}'")));
            }
        }

        tracing::debug!(path = %path.display(), "opened symbol index");

        Ok(Self {
            path: path.to_path_buf(),
            conn: Mutex::new(conn),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        // Reads leave no partial state behind, so a poisoned lock is
        // still safe to reuse.
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create the search view if it does not exist yet.
    ///
    /// The view is stored in the index file. A read-only file gets a
    /// temporary view instead, which lives as long as this store.
    pub fn ensure_search_view(&self) -> Result<()> {
        let conn = self.conn();
        let created = match conn.execute_batch(&create_view_sql(false)) {
            Err(e) if e.sqlite_error_code() == Some(ErrorCode::ReadOnly) => {
                tracing::debug!(
                    path = %self.path.display(),
                    "index is read-only, using a temporary search view"
                );
                conn.execute_batch(&create_view_sql(true))
            }
            other => other,
        };
        created.map_err(|e| Error::StoreUnavailable {
            path: self.path.clone(),
            reason: format!("cannot create {SEARCH_VIEW}: {e}"),
        })
    }

    /// Up to `limit` raw token rows, for debugging.
    pub fn list_tokens(&self, limit: usize) -> Result<Vec<TokenRow>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT z_pk, zmetainformation, ztokenname FROM ztoken LIMIT ?1",
        )?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = stmt
            .query_map(params![limit], |row| {
                Ok(TokenRow {
                    id: row.get(0)?,
                    meta_info: row.get(1)?,
                    name: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Every page path the docset documents.
    pub fn list_paths(&self) -> Result<Vec<PathRow>> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT z_pk, zpath FROM zfilepath")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(PathRow {
                    id: row.get(0)?,
                    path: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Symbols whose name contains `needle` (case-sensitive), optionally
    /// restricted to one type label. Rows come back in view order.
    pub fn find_symbols(
        &self,
        needle: &str,
        symbol_type: Option<&str>,
    ) -> Result<Vec<SymbolRow>> {
        let conn = self.conn();
        let mut stmt = conn.prepare_cached(
            "SELECT name, type, path, anchor FROM search_index_view
             WHERE (?1 = '' OR instr(name, ?1) > 0)
               AND (?2 IS NULL OR type = ?2)",
        )?;
        let rows = stmt
            .query_map(params![needle, symbol_type], |row| {
                Ok(SymbolRow {
                    name: row.get::<_, Option<String>>(0)?.unwrap_or_default(),
                    symbol_type: row
                        .get::<_, Option<String>>(1)?
                        .unwrap_or_default(),
                    path: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                    anchor: row.get(3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    pub fn symbol_count(&self) -> Result<u64> {
        let count: i64 = self.conn().query_row(
            "SELECT count(*) FROM ztoken",
            [],
            |row| row.get(0),
        )?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    /// Distinct symbol type labels, sorted.
    pub fn symbol_types(&self) -> Result<Vec<String>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT DISTINCT ztypename FROM ztokentype
             WHERE ztypename IS NOT NULL ORDER BY ztypename",
        )?;
        let types = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(types)
    }
}

fn create_view_sql(temporary: bool) -> String {
    let temp = if temporary { "TEMP " } else { "" };
    format!(
        "CREATE {temp}VIEW IF NOT EXISTS {SEARCH_VIEW} AS {SEARCH_VIEW_SELECT}"
    )
}

impl std::fmt::Debug for SymbolStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymbolStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}
