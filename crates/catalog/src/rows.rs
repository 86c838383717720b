// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Schema output parser
//!
//! Turns the comma-delimited, header-free output of the schema query into
//! [`SchemaRow`]s. Lines without a comma are not data (blank lines, client
//! banners) and are skipped. The first malformed data line aborts the parse.

use tracing::debug;

use crate::error::{CatalogError, CatalogResult};
use crate::metadata::{ColumnEntry, SchemaRow, TableKind};
use crate::query::QueryVersion;

/// Parse client output produced by the given query version
pub fn parse_output(output: &str, version: QueryVersion) -> CatalogResult<Vec<SchemaRow>> {
    let mut rows = Vec::new();
    let mut skipped = 0usize;

    for (idx, line) in output.lines().enumerate() {
        if !line.contains(',') {
            skipped += 1;
            continue;
        }
        rows.push(parse_row(line.trim(), idx + 1, version)?);
    }

    debug!(rows = rows.len(), skipped, %version, "Parsed schema output");
    Ok(rows)
}

/// Parse a single data line
pub fn parse_row(line: &str, line_no: usize, version: QueryVersion) -> CatalogResult<SchemaRow> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() != version.field_count() {
        return Err(CatalogError::MalformedRow {
            line: line_no,
            expected: version.field_count(),
            found: fields.len(),
        });
    }

    let mut fields = fields.into_iter();
    let mut next = || fields.next().unwrap_or_default();

    let table = next();
    let kind = if version.has_object_type() {
        next()
            .parse::<TableKind>()
            .map_err(|reason| CatalogError::InvalidField {
                line: line_no,
                reason,
            })?
    } else {
        TableKind::Table
    };

    let mut column = ColumnEntry::new(next());
    if version.has_column_type() {
        column = column.with_type(next());
    }
    if version.has_nullable() {
        column = column.with_nullable(next() == "1");
    }
    if version.has_length() {
        if let Some(length) = parse_length(next(), line_no)? {
            column = column.with_length(length);
        }
    }

    Ok(SchemaRow::new(table, kind, column))
}

fn parse_length(field: &str, line_no: usize) -> CatalogResult<Option<u32>> {
    if field.is_empty() || field.eq_ignore_ascii_case("NULL") {
        return Ok(None);
    }
    field
        .parse::<u32>()
        .map(Some)
        .map_err(|_| CatalogError::InvalidField {
            line: line_no,
            reason: format!("length '{}' is not a number", field),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_null_without_length() {
        let row = parse_row("Orders,table,Id,INT,0,NULL", 1, QueryVersion::V5).unwrap();
        assert_eq!(row.table, "ORDERS");
        assert_eq!(row.kind, TableKind::Table);
        assert_eq!(row.column.name, "ID");
        assert!(!row.column.nullable);
        assert_eq!(row.column.length, None);
        assert_eq!(row.column.type_annotation().as_deref(), Some("INT NOT NULL"));
    }

    #[test]
    fn test_nullable_with_length() {
        let row = parse_row("CUSTOMERS,view,NAME,NVARCHAR,1,100", 1, QueryVersion::V5).unwrap();
        assert_eq!(row.kind, TableKind::View);
        assert!(row.column.nullable);
        assert_eq!(row.column.length, Some(100));
        assert_eq!(
            row.column.type_annotation().as_deref(),
            Some("NVARCHAR(100) NULL")
        );
    }

    #[test]
    fn test_short_layouts() {
        let row = parse_row("orders,id", 1, QueryVersion::V1).unwrap();
        assert_eq!(row.kind, TableKind::Table);
        assert_eq!(row.column.data_type, None);

        let row = parse_row("orders,view,id", 1, QueryVersion::V2).unwrap();
        assert_eq!(row.kind, TableKind::View);

        let row = parse_row("orders,table,id,bigint", 1, QueryVersion::V3).unwrap();
        assert_eq!(row.column.data_type.as_deref(), Some("BIGINT"));
        assert!(!row.column.nullable);

        let row = parse_row("orders,table,note,text,1", 1, QueryVersion::V4).unwrap();
        assert!(row.column.nullable);
        assert_eq!(row.column.length, None);
    }

    #[test]
    fn test_skips_lines_without_delimiter() {
        let output = "\nChanged database context to 'shop'.\nORDERS,table,ID,INT,0,NULL\n\nORDERS,table,NOTE,VARCHAR,1,200\n";
        let rows = parse_output(output, QueryVersion::V5).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].column.length, Some(200));
    }

    #[test]
    fn test_first_malformed_row_aborts() {
        let output = "ORDERS,table,ID,INT,0,NULL\nORDERS,table,ID\nORDERS,table,NOTE,VARCHAR,1,200";
        let err = parse_output(output, QueryVersion::V5).unwrap_err();
        assert_eq!(
            err,
            CatalogError::MalformedRow {
                line: 2,
                expected: 6,
                found: 3
            }
        );
    }

    #[test]
    fn test_invalid_fields() {
        let err = parse_row("ORDERS,proc,ID,INT,0,NULL", 4, QueryVersion::V5).unwrap_err();
        assert_eq!(
            err,
            CatalogError::InvalidField {
                line: 4,
                reason: "unknown object type 'proc'".to_string()
            }
        );

        let err = parse_row("ORDERS,table,ID,INT,0,abc", 5, QueryVersion::V5).unwrap_err();
        assert_eq!(
            err,
            CatalogError::InvalidField {
                line: 5,
                reason: "length 'abc' is not a number".to_string()
            }
        );
    }

    #[test]
    fn test_invalid_field_aborts_parse() {
        let output = "ORDERS,table,ID,INT,0,NULL
ORDERS,table,NOTE,VARCHAR,1,big";
        let err = parse_output(output, QueryVersion::V5).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidField { line: 2, .. }));
    }
}
