// Copyright (C) 2025 Kevin Exton
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.
use super::errors::SchemaError;
use super::types::{composite, marshal, CqlType};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    PartitionKey,
    Clustering,
    Regular,
    Static,
}

impl FromStr for ColumnKind {
    type Err = SchemaError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text.to_ascii_lowercase().as_str() {
            "partition_key" => Ok(ColumnKind::PartitionKey),
            "clustering" => Ok(ColumnKind::Clustering),
            "regular" => Ok(ColumnKind::Regular),
            "static" => Ok(ColumnKind::Static),
            _ => Err(SchemaError::UnknownColumnKind(text.to_string())),
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ColumnKind::PartitionKey => "partition_key",
            ColumnKind::Clustering => "clustering",
            ColumnKind::Regular => "regular",
            ColumnKind::Static => "static",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusteringOrder {
    Asc,
    Desc,
    None,
}

impl FromStr for ClusteringOrder {
    type Err = SchemaError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text.to_ascii_lowercase().as_str() {
            "asc" => Ok(ClusteringOrder::Asc),
            "desc" => Ok(ClusteringOrder::Desc),
            "none" | "" => Ok(ClusteringOrder::None),
            _ => Err(SchemaError::UnknownClusteringOrder(text.to_string())),
        }
    }
}

impl fmt::Display for ClusteringOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ClusteringOrder::Asc => "asc",
            ClusteringOrder::Desc => "desc",
            ClusteringOrder::None => "none",
        })
    }
}

/// Sort direction of a column; only clustering columns can be `Desc`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ColumnOrder {
    #[serde(rename = "ASC")]
    Asc,
    #[serde(rename = "DESC")]
    Desc,
}

impl From<ClusteringOrder> for ColumnOrder {
    fn from(order: ClusteringOrder) -> Self {
        match order {
            ClusteringOrder::Desc => ColumnOrder::Desc,
            ClusteringOrder::Asc | ClusteringOrder::None => ColumnOrder::Asc,
        }
    }
}

impl fmt::Display for ColumnOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ColumnOrder::Asc => "ASC",
            ColumnOrder::Desc => "DESC",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct IndexDescriptor {
    pub name: String,
    pub kind: String,
    pub options: BTreeMap<String, String>,
}

impl fmt::Display for IndexDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.kind)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ColumnDescriptor {
    pub keyspace: String,
    pub table: String,
    pub name: String,
    pub component_index: i32,
    pub kind: ColumnKind,
    pub validator: String,
    #[serde(rename = "type")]
    pub cql_type: CqlType,
    pub clustering_order: ClusteringOrder,
    pub order: ColumnOrder,
    pub index: Option<IndexDescriptor>,
}

impl ColumnDescriptor {
    /// Builds a column from its raw `system_schema.columns` attributes.
    /// Descending clustering columns get a `ReversedType` validator.
    pub fn new(
        keyspace: &str,
        table: &str,
        name: &str,
        position: i32,
        kind: &str,
        type_text: &str,
        clustering_order: &str,
    ) -> Result<Self, SchemaError> {
        let kind: ColumnKind = kind.parse()?;
        let cql_type: CqlType = type_text.parse()?;
        let clustering_order: ClusteringOrder = clustering_order.parse()?;
        let validator = match clustering_order {
            ClusteringOrder::Desc => format!("{}({})", marshal("ReversedType"), cql_type.validator()),
            _ => cql_type.validator(),
        };
        Ok(ColumnDescriptor {
            keyspace: keyspace.to_string(),
            table: table.to_string(),
            name: name.to_string(),
            component_index: position,
            kind,
            validator,
            cql_type,
            clustering_order,
            order: clustering_order.into(),
            index: None,
        })
    }

    /// Index label for text output; `-` when the column is not indexed.
    pub fn index_label(&self) -> String {
        self.index
            .as_ref()
            .map_or_else(|| "-".to_string(), IndexDescriptor::to_string)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TableDescriptor {
    pub keyspace: String,
    pub name: String,
    pub key_validator: String,
    pub comparator: String,
    pub default_validator: String,
    pub key_aliases: Vec<String>,
    pub column_aliases: Vec<String>,
    pub value_alias: String,
    pub partition_key: Vec<ColumnDescriptor>,
    pub clustering_columns: Vec<ColumnDescriptor>,
    pub columns: HashMap<String, ColumnDescriptor>,
    pub ordered_columns: Vec<String>,
}

impl TableDescriptor {
    /// Derives the key layout and the legacy validator attributes from the
    /// table's columns.
    pub fn from_columns(
        keyspace: &str,
        name: &str,
        columns: Vec<ColumnDescriptor>,
    ) -> Result<Self, SchemaError> {
        let partition_key = ordered_by_position(name, &columns, ColumnKind::PartitionKey)?;
        let clustering_columns = ordered_by_position(name, &columns, ColumnKind::Clustering)?;

        let key_validator = match partition_key.as_slice() {
            [] => String::new(),
            [single] => single.validator.clone(),
            many => composite(many.iter().map(|c| c.validator.as_str())),
        };
        let comparator = if clustering_columns.is_empty() {
            marshal("UTF8Type")
        } else {
            let utf8 = marshal("UTF8Type");
            composite(
                clustering_columns
                    .iter()
                    .map(|c| c.validator.as_str())
                    .chain(std::iter::once(utf8.as_str())),
            )
        };

        let key_aliases: Vec<String> = partition_key.iter().map(|c| c.name.clone()).collect();
        let column_aliases: Vec<String> = clustering_columns.iter().map(|c| c.name.clone()).collect();

        let mut rest: Vec<String> = columns
            .iter()
            .filter(|c| matches!(c.kind, ColumnKind::Regular | ColumnKind::Static))
            .map(|c| c.name.clone())
            .collect();
        rest.sort();
        let ordered_columns = key_aliases
            .iter()
            .chain(column_aliases.iter())
            .cloned()
            .chain(rest)
            .collect();

        Ok(TableDescriptor {
            keyspace: keyspace.to_string(),
            name: name.to_string(),
            key_validator,
            comparator,
            default_validator: marshal("BytesType"),
            key_aliases,
            column_aliases,
            value_alias: String::new(),
            partition_key,
            clustering_columns,
            columns: columns.into_iter().map(|c| (c.name.clone(), c)).collect(),
            ordered_columns,
        })
    }
}

fn ordered_by_position(
    table: &str,
    columns: &[ColumnDescriptor],
    kind: ColumnKind,
) -> Result<Vec<ColumnDescriptor>, SchemaError> {
    let mut selected: Vec<ColumnDescriptor> =
        columns.iter().filter(|c| c.kind == kind).cloned().collect();
    selected.sort_by_key(|c| c.component_index);

    let mut seen = HashSet::new();
    for column in &selected {
        if !seen.insert(column.component_index) {
            return Err(SchemaError::DuplicatePosition {
                table: table.to_string(),
                kind: kind.to_string(),
                position: column.component_index,
            });
        }
    }
    Ok(selected)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct KeyspaceDescriptor {
    pub name: String,
    pub durable_writes: bool,
    pub strategy_class: String,
    pub strategy_options: BTreeMap<String, String>,
    pub tables: HashMap<String, TableDescriptor>,
}
