// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Test fixtures: sample schema output and buffers

use mssql_complete_catalog::{QueryVersion, SchemaRow, rows::parse_output};

/// Sample schema query output
pub struct SchemaFixtures;

impl SchemaFixtures {
    /// Standard shop schema in the six-field layout
    pub const fn standard_output() -> &'static str {
        "CUSTOMERS,table,ID,INT,0,NULL
CUSTOMERS,table,NAME,NVARCHAR,1,100
ORDERS,table,ID,INT,0,NULL
ORDERS,table,CUSTOMER_ID,INT,0,NULL
ORDERS,table,NOTE,VARCHAR,1,200
ACTIVE_CUSTOMERS,view,ID,INT,0,NULL
ACTIVE_CUSTOMERS,view,NAME,NVARCHAR,1,100
"
    }

    /// Standard shop schema as rows
    pub fn standard_rows() -> Vec<SchemaRow> {
        parse_output(Self::standard_output(), QueryVersion::V5).unwrap_or_default()
    }

    /// The same schema in the two-field layout
    pub const fn minimal_output() -> &'static str {
        "CUSTOMERS,ID
CUSTOMERS,NAME
ORDERS,ID
"
    }

    /// Output where the third data row is truncated
    pub const fn truncated_output() -> &'static str {
        "CUSTOMERS,table,ID,INT,0,NULL
CUSTOMERS,table,NAME,NVARCHAR,1,100
ORDERS,table
ORDERS,table,NOTE,VARCHAR,1,200
"
    }
}

/// Sample editor buffers
pub struct BufferFixtures;

impl BufferFixtures {
    /// A T-SQL batch with variables and aliased joins
    pub fn aliased_query() -> Vec<String> {
        [
            "DECLARE @customer_id INT",
            "DECLARE @note varchar(200)",
            "SELECT c.NAME, o.NOTE",
            "FROM Customers c",
            "INNER JOIN orders o ON o.CUSTOMER_ID = c.ID",
            "WHERE c.ID = @customer_id",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }
}
