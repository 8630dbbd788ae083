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
use super::models::{ColumnDescriptor, IndexDescriptor, KeyspaceDescriptor, TableDescriptor};
use anyhow::{Context, Result};
use futures_util::TryStreamExt;
use scylla::client::session::Session;
use scylla::DeserializeRow;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, warn};

#[derive(Clone, Debug, DeserializeRow, PartialEq)]
pub struct KeyspaceRow {
    pub keyspace_name: String,
    pub durable_writes: bool,
    pub replication: HashMap<String, String>,
}

#[derive(Clone, Debug, DeserializeRow, PartialEq)]
pub struct ColumnRow {
    pub keyspace_name: String,
    pub table_name: String,
    pub column_name: String,
    pub clustering_order: String,
    pub kind: String,
    pub position: i32,
    #[scylla(rename = "type")]
    pub cql_type: String,
}

#[derive(Clone, Debug, DeserializeRow, PartialEq)]
pub struct IndexRow {
    pub keyspace_name: String,
    pub table_name: String,
    pub index_name: String,
    pub kind: String,
    pub options: HashMap<String, String>,
}

/// Reads the schema of one keyspace from `system_schema`.
pub async fn fetch_keyspace(session: &Session, keyspace: &str) -> Result<KeyspaceDescriptor> {
    let keyspace_row = session
        .query_unpaged(
            "SELECT keyspace_name, durable_writes, replication FROM system_schema.keyspaces WHERE keyspace_name = ?",
            (keyspace,),
        )
        .await
        .context(format!("Failed to query keyspace metadata for {}", keyspace))?
        .into_rows_result()?
        .maybe_first_row::<KeyspaceRow>()?
        .ok_or_else(|| SchemaError::KeyspaceNotFound(keyspace.to_string()))?;

    let tables: Vec<String> = session
        .query_iter(
            "SELECT table_name FROM system_schema.tables WHERE keyspace_name = ?",
            (keyspace,),
        )
        .await
        .context(format!("Failed to query tables of {}", keyspace))?
        .rows_stream::<(String,)>()?
        .map_ok(|(name,)| name)
        .try_collect()
        .await?;

    // Materialized views, including the ones ScyllaDB creates behind secondary
    // indexes, keep their columns in system_schema.columns too.
    let views: Vec<String> = session
        .query_iter(
            "SELECT view_name FROM system_schema.views WHERE keyspace_name = ?",
            (keyspace,),
        )
        .await
        .context(format!("Failed to query views of {}", keyspace))?
        .rows_stream::<(String,)>()?
        .map_ok(|(name,)| name)
        .try_collect()
        .await?;

    let columns: Vec<ColumnRow> = session
        .query_iter(
            "SELECT keyspace_name, table_name, column_name, clustering_order, kind, position, type FROM system_schema.columns WHERE keyspace_name = ?",
            (keyspace,),
        )
        .await
        .context(format!("Failed to query columns of {}", keyspace))?
        .rows_stream::<ColumnRow>()?
        .try_collect()
        .await?;

    let indexes: Vec<IndexRow> = session
        .query_iter(
            "SELECT keyspace_name, table_name, index_name, kind, options FROM system_schema.indexes WHERE keyspace_name = ?",
            (keyspace,),
        )
        .await
        .context(format!("Failed to query indexes of {}", keyspace))?
        .rows_stream::<IndexRow>()?
        .try_collect()
        .await?;

    debug!(
        %keyspace,
        tables = tables.len(),
        views = views.len(),
        columns = columns.len(),
        indexes = indexes.len(),
        "fetched schema rows"
    );
    Ok(compile_keyspace(keyspace_row, tables, views, columns, indexes)?)
}

/// Assembles the descriptors for one keyspace out of its raw schema rows.
/// Columns of views are skipped; a column of any other unlisted table is an
/// error.
pub fn compile_keyspace(
    keyspace: KeyspaceRow,
    tables: Vec<String>,
    views: Vec<String>,
    columns: Vec<ColumnRow>,
    indexes: Vec<IndexRow>,
) -> Result<KeyspaceDescriptor, SchemaError> {
    let mut replication: BTreeMap<String, String> = keyspace.replication.into_iter().collect();
    let strategy_class = replication.remove("class").unwrap_or_default();

    let mut columns_by_table: HashMap<String, Vec<ColumnDescriptor>> =
        tables.into_iter().map(|name| (name, Vec::new())).collect();

    let views: HashSet<String> = views.into_iter().collect();

    for row in columns {
        let Some(table_columns) = columns_by_table.get_mut(&row.table_name) else {
            if views.contains(&row.table_name) {
                continue;
            }
            return Err(SchemaError::UnknownTable {
                keyspace: row.keyspace_name,
                table: row.table_name,
            });
        };
        table_columns.push(ColumnDescriptor::new(
            &row.keyspace_name,
            &row.table_name,
            &row.column_name,
            row.position,
            &row.kind,
            &row.cql_type,
            &row.clustering_order,
        )?);
    }

    for row in indexes {
        let target = row.options.get("target").map(|t| index_target(t).to_string());
        let mut column = None;
        if let (Some(target), Some(table_columns)) =
            (target.as_ref(), columns_by_table.get_mut(&row.table_name))
        {
            column = table_columns.iter_mut().find(|c| &c.name == target);
        }
        match column {
            Some(column) => {
                column.index = Some(IndexDescriptor {
                    name: row.index_name,
                    kind: row.kind,
                    options: row.options.into_iter().collect(),
                })
            }
            None => warn!(
                index = %row.index_name,
                table = %row.table_name,
                ?target,
                "index target does not name a column, skipping"
            ),
        }
    }

    let tables = columns_by_table
        .into_iter()
        .map(|(name, columns)| {
            TableDescriptor::from_columns(&keyspace.keyspace_name, &name, columns)
                .map(|table| (name, table))
        })
        .collect::<Result<HashMap<_, _>, _>>()?;

    Ok(KeyspaceDescriptor {
        name: keyspace.keyspace_name,
        durable_writes: keyspace.durable_writes,
        strategy_class,
        strategy_options: replication,
        tables,
    })
}

/// Column named by an index `target` option. Collection indexes wrap the
/// column as `keys(x)`, `values(x)`, `entries(x)` or `full(x)`; quoted
/// names lose their quotes.
fn index_target(target: &str) -> &str {
    let target = target.trim();
    let inner = ["keys(", "values(", "entries(", "full("]
        .iter()
        .find_map(|prefix| target.strip_prefix(prefix)?.strip_suffix(')'))
        .unwrap_or(target);
    inner
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(inner)
}
