// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Candidate rendering
//!
//! Converts schema entries, aliases and variables into [`Candidate`]s, the
//! `{word, menu, kind}` records the host displays.

use serde::{Deserialize, Serialize};

use mssql_complete_catalog::{ColumnEntry, SchemaSnapshot, TableEntry};
use mssql_complete_context::VariableDecl;

/// Kind annotation for alias candidates
pub const ALIAS_KIND: &str = "alias";

/// Kind annotation for variable candidates
pub const VARIABLE_KIND: &str = "variable";

/// One proposed completion word plus display annotations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub word: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub menu: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl Candidate {
    pub fn new(word: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            menu: None,
            kind: None,
        }
    }

    pub fn with_menu(mut self, menu: impl Into<String>) -> Self {
        self.menu = Some(menu.into());
        self
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    fn with_word(&self, word: String) -> Self {
        Self {
            word,
            menu: self.menu.clone(),
            kind: self.kind.clone(),
        }
    }
}

/// Candidate renderer
pub struct CandidateRenderer;

impl CandidateRenderer {
    /// `foo  [INT]  variable`
    pub fn variable(decl: &VariableDecl) -> Candidate {
        Candidate::new(&decl.name)
            .with_menu(format!("[{}]", decl.data_type))
            .with_kind(VARIABLE_KIND)
    }

    /// `NAME  [NVARCHAR(100) NULL]  CUSTOMERS`
    pub fn column(column: &ColumnEntry, table: &TableEntry) -> Candidate {
        let candidate = Candidate::new(&column.name).with_kind(&table.name);
        match column.type_annotation() {
            Some(annotation) => candidate.with_menu(format!("[{}]", annotation)),
            None => candidate,
        }
    }

    /// `CUSTOMERS  [table]`
    pub fn table(table: &TableEntry) -> Candidate {
        Candidate::new(&table.name).with_kind(format!("[{}]", table.kind))
    }

    pub fn alias(alias: &str) -> Candidate {
        Candidate::new(alias).with_kind(ALIAS_KIND)
    }

    /// One candidate per declared variable
    pub fn render_variables(variables: &[VariableDecl]) -> Vec<Candidate> {
        variables.iter().map(Self::variable).collect()
    }

    /// Every column of every given table, in table order
    pub fn render_columns(tables: &[&TableEntry]) -> Vec<Candidate> {
        tables
            .iter()
            .flat_map(|table| table.columns.iter().map(move |c| Self::column(c, table)))
            .collect()
    }

    /// Tables and views followed by their aliases; with `seed_columns` also
    /// every column
    pub fn render_tables(snapshot: &SchemaSnapshot, seed_columns: bool) -> Vec<Candidate> {
        let mut candidates = Vec::new();
        for table in snapshot.tables() {
            candidates.push(Self::table(table));
            candidates.extend(table.aliases.iter().map(|a| Self::alias(a)));
            if seed_columns {
                candidates.extend(table.columns.iter().map(|c| Self::column(c, table)));
            }
        }
        candidates
    }

    /// Replace each candidate with an uppercase and a lowercase copy.
    ///
    /// A word whose two spellings coincide is emitted once.
    pub fn with_case_variants(candidates: Vec<Candidate>) -> Vec<Candidate> {
        let mut out = Vec::with_capacity(candidates.len() * 2);
        for candidate in candidates {
            let upper = candidate.word.to_uppercase();
            let lower = candidate.word.to_lowercase();
            if upper == lower {
                out.push(candidate.with_word(upper));
            } else {
                out.push(candidate.with_word(upper));
                out.push(candidate.with_word(lower));
            }
        }
        out
    }

    /// Stable sort by word
    pub fn sort(candidates: &mut [Candidate]) {
        candidates.sort_by(|a, b| a.word.cmp(&b.word));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mssql_complete_catalog::{SchemaRow, TableKind};

    fn customers() -> TableEntry {
        TableEntry::new("customers", TableKind::Table).with_columns(vec![
            ColumnEntry::new("id").with_type("int"),
            ColumnEntry::new("name")
                .with_type("nvarchar")
                .with_nullable(true)
                .with_length(100),
            ColumnEntry::new("legacy"),
        ])
    }

    #[test]
    fn test_column_candidates() {
        let table = customers();
        let items = CandidateRenderer::render_columns(&[&table]);
        assert_eq!(
            items,
            vec![
                Candidate::new("ID")
                    .with_menu("[INT NOT NULL]")
                    .with_kind("CUSTOMERS"),
                Candidate::new("NAME")
                    .with_menu("[NVARCHAR(100) NULL]")
                    .with_kind("CUSTOMERS"),
                Candidate::new("LEGACY").with_kind("CUSTOMERS"),
            ]
        );
    }

    #[test]
    fn test_table_and_alias_candidates() {
        let rows = customers()
            .columns
            .into_iter()
            .map(|c| SchemaRow::new("customers", TableKind::Table, c))
            .chain([SchemaRow::new("recent", TableKind::View, ColumnEntry::new("id"))]);
        let mut snapshot = SchemaSnapshot::from_rows(rows);
        snapshot.apply_aliases(vec![("customers", "c")]);

        let items = CandidateRenderer::render_tables(&snapshot, false);
        assert_eq!(
            items,
            vec![
                Candidate::new("CUSTOMERS").with_kind("[table]"),
                Candidate::new("C").with_kind("alias"),
                Candidate::new("RECENT").with_kind("[view]"),
            ]
        );

        let seeded = CandidateRenderer::render_tables(&snapshot, true);
        assert_eq!(seeded.len(), 7);
    }

    #[test]
    fn test_variable_candidate() {
        let decl = VariableDecl {
            name: "foo".to_string(),
            data_type: "INT".to_string(),
        };
        assert_eq!(
            CandidateRenderer::variable(&decl),
            Candidate::new("foo").with_menu("[INT]").with_kind("variable")
        );
    }

    #[test]
    fn test_case_variants() {
        let items = CandidateRenderer::with_case_variants(vec![
            Candidate::new("Orders").with_kind("[table]"),
            Candidate::new("_1"),
        ]);
        let words: Vec<&str> = items.iter().map(|c| c.word.as_str()).collect();
        assert_eq!(words, vec!["ORDERS", "orders", "_1"]);
        assert_eq!(items[1].kind.as_deref(), Some("[table]"));
    }

    #[test]
    fn test_sort_is_stable() {
        let mut items = vec![
            Candidate::new("ID").with_kind("ORDERS"),
            Candidate::new("CUSTOMER_ID"),
            Candidate::new("ID").with_kind("CUSTOMERS"),
        ];
        CandidateRenderer::sort(&mut items);
        assert_eq!(items[0].word, "CUSTOMER_ID");
        assert_eq!(items[1].kind.as_deref(), Some("ORDERS"));
        assert_eq!(items[2].kind.as_deref(), Some("CUSTOMERS"));
    }

    #[test]
    fn test_serialization_skips_empty_fields() {
        let json = serde_json::to_string(&Candidate::new("C").with_kind("alias")).unwrap();
        assert_eq!(json, r#"{"word":"C","kind":"alias"}"#);
    }
}
