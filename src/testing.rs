//! Fixtures shared by the unit and integration tests: a Dash-shaped
//! symbol index.

use std::path::Path;

use rusqlite::{Connection, params};

#[derive(Debug, Clone)]
pub(crate) struct FixtureSymbol {
    pub name: String,
    pub symbol_type: String,
    pub path: String,
    pub anchor: Option<String>,
}

impl FixtureSymbol {
    pub fn new(name: &str, symbol_type: &str, path: &str) -> Self {
        Self {
            name: name.to_string(),
            symbol_type: symbol_type.to_string(),
            path: path.to_string(),
            anchor: None,
        }
    }

    pub fn anchor(mut self, anchor: &str) -> Self {
        self.anchor = Some(anchor.to_string());
        self
    }
}

/// Write a `docSet.dsidx` holding `symbols`, inserted in the given order.
pub(crate) fn write_index(path: &Path, symbols: &[FixtureSymbol]) {
    let mut conn = Connection::open(path).unwrap();
    conn.execute_batch(
        "CREATE TABLE ztokentype (z_pk INTEGER PRIMARY KEY, ztypename TEXT);
         CREATE TABLE zfilepath (z_pk INTEGER PRIMARY KEY, zpath TEXT);
         CREATE TABLE ztokenmetainformation (
             z_pk INTEGER PRIMARY KEY, zfile INTEGER, zanchor TEXT);
         CREATE TABLE ztoken (
             z_pk INTEGER PRIMARY KEY, ztokenname TEXT,
             ztokentype INTEGER, zmetainformation INTEGER);",
    )
    .unwrap();

    let tx = conn.transaction().unwrap();
    for symbol in symbols {
        tx.execute(
            "INSERT INTO ztokentype (ztypename)
             SELECT ?1 WHERE NOT EXISTS
                 (SELECT 1 FROM ztokentype WHERE ztypename = ?1)",
            params![symbol.symbol_type],
        )
        .unwrap();
        tx.execute(
            "INSERT INTO zfilepath (zpath)
             SELECT ?1 WHERE NOT EXISTS
                 (SELECT 1 FROM zfilepath WHERE zpath = ?1)",
            params![symbol.path],
        )
        .unwrap();
        tx.execute(
            "INSERT INTO ztokenmetainformation (zfile, zanchor)
             SELECT z_pk, ?2 FROM zfilepath WHERE zpath = ?1",
            params![symbol.path, symbol.anchor],
        )
        .unwrap();
        let meta = tx.last_insert_rowid();
        tx.execute(
            "INSERT INTO ztoken (ztokenname, ztokentype, zmetainformation)
             SELECT ?1, z_pk, ?3 FROM ztokentype WHERE ztypename = ?2",
            params![symbol.name, symbol.symbol_type, meta],
        )
        .unwrap();
    }
    tx.commit().unwrap();
}
