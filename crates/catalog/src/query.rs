// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Schema query variants
//!
//! Each version selects more column metadata than the previous one. The row
//! layout of the query output is fixed per version:
//!
//! | version | layout |
//! |---------|--------|
//! | V1 | `table,column` |
//! | V2 | `table,type,column` |
//! | V3 | `table,type,column,column_type` |
//! | V4 | `table,type,column,column_type,nullable` |
//! | V5 | `table,type,column,column_type,nullable,length` |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const TABLES_AND_VIEWS: &str = "set nocount on;
with tables_and_views as (
    select
        name as [object_name]
        ,'table' as [type]
    from sys.tables
    where type_desc = 'user_table'
    union all
    select
        name as [object_name]
        ,'view' as [type]
    from sys.views
)";

const FROM_CLAUSE: &str = "
from syscolumns c
inner join sysobjects o
    on c.id=o.id
inner join systypes t
    on c.xtype = t.xtype
    and t.name <> 'sysname'
inner join tables_and_views tav
    on o.name = tav.[object_name]";

/// Schema query revision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum QueryVersion {
    /// `table,column`
    V1,
    /// `table,type,column`
    V2,
    /// `table,type,column,column_type`
    V3,
    /// `table,type,column,column_type,nullable`
    V4,
    /// `table,type,column,column_type,nullable,length`
    #[default]
    V5,
}

impl QueryVersion {
    pub fn all() -> &'static [QueryVersion] {
        use QueryVersion::*;
        &[V1, V2, V3, V4, V5]
    }

    /// Number of comma-separated fields in every data row
    pub fn field_count(&self) -> usize {
        match self {
            QueryVersion::V1 => 2,
            QueryVersion::V2 => 3,
            QueryVersion::V3 => 4,
            QueryVersion::V4 => 5,
            QueryVersion::V5 => 6,
        }
    }

    pub fn has_object_type(&self) -> bool {
        *self != QueryVersion::V1
    }

    pub fn has_column_type(&self) -> bool {
        self.field_count() >= 4
    }

    pub fn has_nullable(&self) -> bool {
        self.field_count() >= 5
    }

    pub fn has_length(&self) -> bool {
        self.field_count() >= 6
    }

    /// The select list for this version
    fn select_list(&self) -> &'static str {
        match self {
            QueryVersion::V1 => {
                "
select
    upper(tav.object_name) as [table_name]
    ,upper(c.name) as [column_name]"
            }
            QueryVersion::V2 => {
                "
select
    upper(tav.object_name) as [table_name]
    ,tav.type as [type]
    ,upper(c.name) as [column_name]"
            }
            QueryVersion::V3 => {
                "
select
    upper(tav.object_name) as [table_name]
    ,tav.type as [type]
    ,upper(c.name) as [column_name]
    ,upper(t.name) as [column_type]"
            }
            QueryVersion::V4 => {
                "
select
    upper(tav.object_name) as [table_name]
    ,tav.type as [type]
    ,upper(c.name) as [column_name]
    ,upper(t.name) as [column_type]
    ,c.isnullable as [column_nullable]"
            }
            QueryVersion::V5 => {
                "
select
    upper(tav.object_name) as [table_name]
    ,tav.type as [type]
    ,upper(c.name) as [column_name]
    ,upper(t.name) as [column_type]
    ,c.isnullable as [column_nullable]
    ,case
        when t.name in ('varchar','char','nvarchar','nchar') then c.length
        else null
    end as [column_length]"
            }
        }
    }

    /// Full SQL batch passed to the client with `-Q`
    pub fn sql(&self) -> String {
        format!("{}{}{}", TABLES_AND_VIEWS, self.select_list(), FROM_CLAUSE)
    }
}

impl fmt::Display for QueryVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = match self {
            QueryVersion::V1 => 1,
            QueryVersion::V2 => 2,
            QueryVersion::V3 => 3,
            QueryVersion::V4 => 4,
            QueryVersion::V5 => 5,
        };
        write!(f, "v{}", n)
    }
}

impl FromStr for QueryVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix('v')
            .or_else(|| trimmed.strip_prefix('V'))
            .unwrap_or(trimmed);
        match digits {
            "1" => Ok(QueryVersion::V1),
            "2" => Ok(QueryVersion::V2),
            "3" => Ok(QueryVersion::V3),
            "4" => Ok(QueryVersion::V4),
            "5" => Ok(QueryVersion::V5),
            _ => Err(format!("unknown query version '{}'", s)),
        }
    }
}
