// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Metadata types for database schema information
//!
//! Tables, views and columns as reported by the schema query. Table, column
//! and type names are uppercased on construction so lookups from buffer text
//! in any casing match.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Table type classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableKind {
    #[default]
    Table,
    View,
}

impl TableKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TableKind::Table => "table",
            TableKind::View => "view",
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TableKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "table" | "user_table" => Ok(TableKind::Table),
            "view" => Ok(TableKind::View),
            other => Err(format!("unknown object type '{}'", other)),
        }
    }
}

/// Metadata for a database column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnEntry {
    /// Column name (uppercase)
    pub name: String,
    /// Column type name (uppercase), absent for queries that do not select it
    pub data_type: Option<String>,
    /// Whether the column accepts NULL
    pub nullable: bool,
    /// Declared length, only reported for variable-length character types
    pub length: Option<u32>,
}

impl ColumnEntry {
    /// Create a new column entry with builder pattern
    pub fn new(name: impl AsRef<str>) -> Self {
        Self {
            name: name.as_ref().to_uppercase(),
            data_type: None,
            nullable: false,
            length: None,
        }
    }

    /// Builder method: set data type
    pub fn with_type(mut self, data_type: impl AsRef<str>) -> Self {
        self.data_type = Some(data_type.as_ref().to_uppercase());
        self
    }

    /// Builder method: set nullable
    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Builder method: set length
    pub fn with_length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    /// Render the type annotation shown next to a column candidate.
    ///
    /// `VARCHAR(50) NULL`, `INT NOT NULL`. `None` when the type is unknown.
    pub fn type_annotation(&self) -> Option<String> {
        let data_type = self.data_type.as_deref()?;
        let null = if self.nullable { "NULL" } else { "NOT NULL" };
        Some(match self.length {
            Some(length) => format!("{}({}) {}", data_type, length, null),
            None => format!("{} {}", data_type, null),
        })
    }
}

/// One parsed row of schema query output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaRow {
    /// Owning table or view (uppercase)
    pub table: String,
    /// Object kind
    pub kind: TableKind,
    /// Column described by this row
    pub column: ColumnEntry,
}

impl SchemaRow {
    pub fn new(table: impl AsRef<str>, kind: TableKind, column: ColumnEntry) -> Self {
        Self {
            table: table.as_ref().to_uppercase(),
            kind,
            column,
        }
    }
}

/// Metadata for a table or view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableEntry {
    /// Table name (uppercase)
    pub name: String,
    /// Table or view
    pub kind: TableKind,
    /// Columns in database result order
    pub columns: Vec<ColumnEntry>,
    /// Aliases bound to this table in the current buffer (uppercase)
    pub aliases: Vec<String>,
}

impl TableEntry {
    /// Create new table entry with builder pattern
    pub fn new(name: impl AsRef<str>, kind: TableKind) -> Self {
        Self {
            name: name.as_ref().to_uppercase(),
            kind,
            columns: Vec::new(),
            aliases: Vec::new(),
        }
    }

    /// Builder method: add columns
    pub fn with_columns(mut self, columns: Vec<ColumnEntry>) -> Self {
        for column in columns {
            self.push_column(column);
        }
        self
    }

    /// Append a column unless one with the same name exists.
    ///
    /// Returns `true` when the column was added.
    pub fn push_column(&mut self, column: ColumnEntry) -> bool {
        if self.get_column(&column.name).is_some() {
            return false;
        }
        self.columns.push(column);
        true
    }

    /// Get column by name (case-insensitive)
    pub fn get_column(&self, name: &str) -> Option<&ColumnEntry> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Add an alias unless already present
    pub fn add_alias(&mut self, alias: impl AsRef<str>) -> bool {
        let alias = alias.as_ref().to_uppercase();
        if self.aliases.contains(&alias) {
            return false;
        }
        self.aliases.push(alias);
        true
    }

    pub fn has_alias(&self, alias: &str) -> bool {
        self.aliases.iter().any(|a| a.eq_ignore_ascii_case(alias))
    }
}

/// In-memory snapshot of tables, views and columns
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaSnapshot {
    tables: Vec<TableEntry>,
    index: HashMap<String, usize>,
}

impl SchemaSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a snapshot from parsed rows.
    ///
    /// Rows are grouped by table; the first row of a table decides its kind.
    pub fn from_rows(rows: impl IntoIterator<Item = SchemaRow>) -> Self {
        let mut snapshot = Self::new();
        for row in rows {
            let table = snapshot.entry(&row.table, row.kind);
            table.push_column(row.column);
        }
        snapshot
    }

    fn entry(&mut self, name: &str, kind: TableKind) -> &mut TableEntry {
        let key = name.to_uppercase();
        let idx = match self.index.get(&key) {
            Some(&idx) => idx,
            None => {
                self.index.insert(key.clone(), self.tables.len());
                self.tables.push(TableEntry::new(&key, kind));
                self.tables.len() - 1
            }
        };
        &mut self.tables[idx]
    }

    /// Tables in insertion order
    pub fn tables(&self) -> &[TableEntry] {
        &self.tables
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Look up a table by name (case-insensitive)
    pub fn table(&self, name: &str) -> Option<&TableEntry> {
        self.index
            .get(&name.to_uppercase())
            .map(|&idx| &self.tables[idx])
    }

    /// Every table whose name or alias set matches the qualifier.
    ///
    /// More than one table can match when the same alias is bound to
    /// different tables in the buffer.
    pub fn tables_for_qualifier(&self, qualifier: &str) -> Vec<&TableEntry> {
        let qualifier = qualifier.to_uppercase();
        self.tables
            .iter()
            .filter(|t| t.name == qualifier || t.has_alias(&qualifier))
            .collect()
    }

    /// Replace every alias set with the given `(table, alias)` bindings.
    ///
    /// Bindings naming tables absent from the snapshot are dropped. Returns
    /// the number of bindings applied.
    pub fn apply_aliases<'a, I>(&mut self, bindings: I) -> usize
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        for table in &mut self.tables {
            table.aliases.clear();
        }

        let mut applied = 0;
        for (table, alias) in bindings {
            let Some(&idx) = self.index.get(&table.to_uppercase()) else {
                continue;
            };
            if self.tables[idx].add_alias(alias) {
                applied += 1;
            }
        }
        applied
    }
}
