// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Buffer scanner
//!
//! Finds local variable declarations and table aliases in the buffer text.
//!
//! - Variables: `@name TYPE` or `@name AS TYPE`. The first declaration of a
//!   name wins; the type is uppercased.
//! - Aliases: `FROM table alias` / `JOIN table alias`, optionally with `AS`
//!   and a schema or bracket qualified table (`dbo.[Orders] o`). Table and
//!   alias are uppercased. At most one qualifier is recognised:
//!   `shop.dbo.Orders o` binds nothing.
//!
//! Nothing here knows which tables exist; bindings to unknown tables are
//! dropped later when applied to the schema snapshot.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::trace;

static VARIABLE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^@\w])@(\w+)\s+(?:(?i:AS)\s+)?(\w+)").unwrap()
});

static ALIAS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:FROM|JOIN)\s+(?:\[?\w+\]?\.)?\[?(\w+)\]?\s+(?:AS\s+)?(\w+)").unwrap()
});

/// Words that may follow a table name but never name an alias
const CLAUSE_KEYWORDS: &[&str] = &[
    "AND", "AS", "CROSS", "ELSE", "END", "EXCEPT", "FOR", "FROM", "FULL", "GO", "GROUP",
    "HAVING", "INNER", "INTERSECT", "JOIN", "LEFT", "ON", "OPTION", "OR", "ORDER", "OUTER",
    "PIVOT", "RIGHT", "SELECT", "SET", "THEN", "UNION", "UNPIVOT", "WHEN", "WHERE", "WITH",
];

/// A declared variable (name without the `@` sigil)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableDecl {
    pub name: String,
    pub data_type: String,
}

/// A table alias binding, both sides uppercased
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AliasBinding {
    pub table: String,
    pub alias: String,
}

/// Which part of the buffer is searched for variable declarations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableScope {
    /// Only the first buffer line
    FirstLine,
    /// The whole buffer
    #[default]
    Buffer,
}

/// Variable declarations in order of first appearance
pub fn scan_variables(text: &str) -> Vec<VariableDecl> {
    let mut variables: Vec<VariableDecl> = Vec::new();
    for caps in VARIABLE_PATTERN.captures_iter(text) {
        let name = &caps[1];
        if variables.iter().any(|v| v.name == name) {
            continue;
        }
        variables.push(VariableDecl {
            name: name.to_string(),
            data_type: caps[2].to_uppercase(),
        });
    }
    variables
}

/// Alias bindings in order of first appearance, duplicates collapsed
pub fn scan_aliases(text: &str) -> Vec<AliasBinding> {
    let mut bindings: Vec<AliasBinding> = Vec::new();
    let mut pos = 0;

    while let Some(caps) = ALIAS_PATTERN.captures_at(text, pos) {
        let (Some(table), Some(alias)) = (caps.get(1), caps.get(2)) else {
            break;
        };
        // Resume at the table name so a keyword captured as table or alias is rescanned
        pos = table.start();

        let table = table.as_str().to_uppercase();
        let alias = alias.as_str().to_uppercase();
        if CLAUSE_KEYWORDS.contains(&table.as_str()) || CLAUSE_KEYWORDS.contains(&alias.as_str()) {
            trace!(%table, %alias, "Skipping keyword in table position");
            continue;
        }

        let binding = AliasBinding { table, alias };
        if !bindings.contains(&binding) {
            bindings.push(binding);
        }
    }
    bindings
}

/// Result of scanning one buffer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BufferScan {
    pub variables: Vec<VariableDecl>,
    pub aliases: Vec<AliasBinding>,
}

impl BufferScan {
    /// Scan buffer lines for variables and aliases
    pub fn scan<S: AsRef<str>>(lines: &[S], scope: VariableScope) -> Self {
        let text = lines
            .iter()
            .map(|l| l.as_ref())
            .collect::<Vec<_>>()
            .join("\n");

        let variables = match scope {
            VariableScope::FirstLine => scan_variables(text.lines().next().unwrap_or_default()),
            VariableScope::Buffer => scan_variables(&text),
        };
        let aliases = scan_aliases(&text);

        trace!(
            variables = variables.len(),
            aliases = aliases.len(),
            "Scanned buffer"
        );
        Self { variables, aliases }
    }

    /// `(table, alias)` pairs for applying to a schema snapshot
    pub fn alias_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.aliases
            .iter()
            .map(|b| (b.table.as_str(), b.alias.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binding(table: &str, alias: &str) -> AliasBinding {
        AliasBinding {
            table: table.to_string(),
            alias: alias.to_string(),
        }
    }

    #[test]
    fn test_alias_any_casing() {
        for sql in ["SELECT * FROM Foo f", "select * from foo F", "SeLeCt * FrOm FOO f"] {
            assert_eq!(scan_aliases(sql), vec![binding("FOO", "F")], "{}", sql);
        }
    }

    #[test]
    fn test_join_aliases() {
        let sql = "SELECT * FROM customers c\nINNER JOIN orders AS o ON o.customer_id = c.id\nLEFT JOIN dbo.[Notes] n ON n.id = o.id";
        assert_eq!(
            scan_aliases(sql),
            vec![
                binding("CUSTOMERS", "C"),
                binding("ORDERS", "O"),
                binding("NOTES", "N"),
            ]
        );
    }

    #[test]
    fn test_keyword_is_not_alias() {
        let sql = "SELECT * FROM customers WHERE id = 1";
        assert!(scan_aliases(sql).is_empty());

        let sql = "SELECT * FROM a JOIN b x ON x.id = a.id";
        assert_eq!(scan_aliases(sql), vec![binding("B", "X")]);

        let sql = "SELECT * FROM \nJOIN orders o ON 1 = 1";
        assert_eq!(scan_aliases(sql), vec![binding("ORDERS", "O")]);
    }

    #[test]
    fn test_single_qualifier_only() {
        assert_eq!(
            scan_aliases("SELECT * FROM dbo.[Orders] o"),
            vec![binding("ORDERS", "O")]
        );
        assert!(scan_aliases("SELECT * FROM shop.dbo.Orders o").is_empty());
    }

    #[test]
    fn test_duplicate_aliases_collapse() {
        let sql = "SELECT 1 FROM t a; SELECT 2 FROM T A; SELECT 3 FROM t b";
        assert_eq!(scan_aliases(sql), vec![binding("T", "A"), binding("T", "B")]);
    }

    #[test]
    fn test_variables_first_declaration_wins() {
        let sql = "DECLARE @foo INT\nDECLARE @bar AS nvarchar(20)\nDECLARE @foo varchar(10)";
        let vars = scan_variables(sql);
        assert_eq!(
            vars,
            vec![
                VariableDecl {
                    name: "foo".to_string(),
                    data_type: "INT".to_string()
                },
                VariableDecl {
                    name: "bar".to_string(),
                    data_type: "NVARCHAR".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_system_functions_and_emails_ignored() {
        assert!(scan_variables("SELECT @@ROWCOUNT rows").is_empty());
        assert!(scan_variables("-- mail admin@example com").is_empty());
    }

    #[test]
    fn test_variable_scope() {
        let lines = vec!["DECLARE @a INT", "DECLARE @b BIT"];
        let first = BufferScan::scan(&lines, VariableScope::FirstLine);
        assert_eq!(first.variables.len(), 1);
        assert_eq!(first.variables[0].data_type, "INT");

        let all = BufferScan::scan(&lines, VariableScope::Buffer);
        assert_eq!(all.variables.len(), 2);
        assert_eq!(all.variables[1].name, "b");
        assert_eq!(all.variables[1].data_type, "BIT");
    }

    #[test]
    fn test_alias_pairs() {
        let lines = ["SELECT * FROM customers c"];
        let scan = BufferScan::scan(&lines, VariableScope::Buffer);
        let pairs: Vec<(&str, &str)> = scan.alias_pairs().collect();
        assert_eq!(pairs, vec![("CUSTOMERS", "C")]);
    }
}
