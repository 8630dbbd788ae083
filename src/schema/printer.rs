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

//! Text rendering of keyspace metadata: keyspace, then its tables, then
//! their columns. The walkers only read the descriptors.

use super::models::{ColumnDescriptor, KeyspaceDescriptor, TableDescriptor};
use std::collections::HashMap;
use std::io::{self, Write};

pub const DIVIDER: &str =
    "------------------------------------------------------------------------";
pub const COLUMN_MAP_HEADER: &str = "DumpColumnMapMetadata";

/// Pretty JSON document of the whole keyspace.
pub fn render_json(keyspace: &KeyspaceDescriptor) -> serde_json::Result<String> {
    serde_json::to_string_pretty(keyspace)
}

/// Prints the keyspace header line, then every table it owns.
pub fn print_keyspace<W: Write>(out: &mut W, keyspace: &KeyspaceDescriptor) -> io::Result<()> {
    writeln!(
        out,
        "{} {} {}",
        keyspace.name, keyspace.durable_writes, keyspace.strategy_class
    )?;
    for (name, table) in &keyspace.tables {
        writeln!(out, "Table {}", name)?;
        print_table(out, table)?;
    }
    Ok(())
}

pub fn print_table<W: Write>(out: &mut W, table: &TableDescriptor) -> io::Result<()> {
    writeln!(
        out,
        "{} {} {} {}",
        table.keyspace, table.name, table.key_validator, table.default_validator
    )?;
    print_string_list(out, "KeyAliases", &table.key_aliases)?;
    print_string_list(out, "ColumnAliases", &table.column_aliases)?;
    writeln!(out, "ValueAlias {}", table.value_alias)?;
    print_column_list(out, "PartitionKey", &table.partition_key)?;
    print_column_list(out, "ClusteringColumns", &table.clustering_columns)?;
    print_column_map(out, &table.columns)
}

fn print_string_list<W: Write>(out: &mut W, label: &str, items: &[String]) -> io::Result<()> {
    writeln!(out, "{}", label)?;
    writeln!(out, "{}", items.join(" "))
}

/// Prints an ordered column list. Writes nothing at all for an empty list.
///
/// The summary line concatenates `keyspace table name` triples, with a `|`
/// in front of every triple from the third one on.
pub fn print_column_list<W: Write>(
    out: &mut W,
    label: &str,
    columns: &[ColumnDescriptor],
) -> io::Result<()> {
    if columns.is_empty() {
        return Ok(());
    }
    writeln!(out, "{}", DIVIDER)?;
    let mut line = format!("{} ", label);
    for (i, column) in columns.iter().enumerate() {
        if i > 1 {
            line.push('|');
        }
        line.push_str(&format!("{} {} {}", column.keyspace, column.table, column.name));
    }
    writeln!(out, "{}", line)?;
    for column in columns {
        writeln!(
            out,
            "{} {} {} {} {} {} {} {} {} {}",
            column.keyspace,
            column.table,
            column.name,
            column.component_index,
            column.kind,
            column.validator,
            column.cql_type,
            column.clustering_order,
            column.order,
            column.index_label(),
        )?;
    }
    writeln!(out, "{}", DIVIDER)
}

/// Prints every column of a table, one fixed-width row each. Order follows
/// the map and is not stable between runs.
pub fn print_column_map<W: Write>(
    out: &mut W,
    columns: &HashMap<String, ColumnDescriptor>,
) -> io::Result<()> {
    if columns.is_empty() {
        return Ok(());
    }
    writeln!(out, "{}", DIVIDER)?;
    writeln!(out, "{}", COLUMN_MAP_HEADER)?;
    writeln!(out, "{}", DIVIDER)?;
    for column in columns.values() {
        let qualified = format!("{}.{}.{}", column.keyspace, column.table, column.name);
        writeln!(
            out,
            "{:<20}  {:>3} {} {} {} {} {} {}",
            qualified,
            column.component_index,
            column.kind,
            column.validator,
            column.cql_type,
            column.clustering_order,
            column.order,
            column.index_label(),
        )?;
    }
    writeln!(out, "{}", DIVIDER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::models::IndexDescriptor;
    use std::collections::BTreeMap;

    fn column(table: &str, name: &str, position: i32, kind: &str, ty: &str) -> ColumnDescriptor {
        ColumnDescriptor::new("demo", table, name, position, kind, ty, "none").unwrap()
    }

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> io::Result<()>,
    {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn users_table() -> TableDescriptor {
        TableDescriptor::from_columns(
            "demo",
            "users",
            vec![
                column("users", "lastname", 0, "partition_key", "text"),
                column("users", "age", -1, "regular", "int"),
                column("users", "city", -1, "regular", "text"),
            ],
        )
        .unwrap()
    }

    fn demo_keyspace(tables: Vec<TableDescriptor>) -> KeyspaceDescriptor {
        KeyspaceDescriptor {
            name: "demo".to_string(),
            durable_writes: true,
            strategy_class: "org.apache.cassandra.locator.SimpleStrategy".to_string(),
            strategy_options: BTreeMap::from([("replication_factor".to_string(), "1".to_string())]),
            tables: tables.into_iter().map(|t| (t.name.clone(), t)).collect(),
        }
    }

    #[test]
    fn test_keyspace_without_tables_prints_only_header() {
        let text = render(|out| print_keyspace(out, &demo_keyspace(Vec::new())));
        assert_eq!(text, "demo true org.apache.cassandra.locator.SimpleStrategy\n");
    }

    #[test]
    fn test_keyspace_prints_each_table() {
        let text = render(|out| print_keyspace(out, &demo_keyspace(vec![users_table()])));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "demo true org.apache.cassandra.locator.SimpleStrategy");
        assert_eq!(lines[1], "Table users");
        assert!(lines[2].starts_with("demo users org.apache.cassandra.db.marshal.UTF8Type"));
        assert!(lines[2].ends_with("org.apache.cassandra.db.marshal.BytesType"));
    }

    #[test]
    fn test_table_sections_in_order() {
        let text = render(|out| print_table(out, &users_table()));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[1], "KeyAliases");
        assert_eq!(lines[2], "lastname");
        assert_eq!(lines[3], "ColumnAliases");
        assert_eq!(lines[4], "");
        assert_eq!(lines[5], "ValueAlias ");
        // partition key section: divider, summary, one detail, divider
        assert_eq!(lines[6], DIVIDER);
        assert_eq!(lines[7], "PartitionKey demo users lastname");
        assert!(lines[8].starts_with("demo users lastname 0 partition_key "));
        assert_eq!(lines[9], DIVIDER);
        // no clustering columns, so the column map follows directly
        assert_eq!(lines[10], DIVIDER);
        assert_eq!(lines[11], "DumpColumnMapMetadata");
        assert_eq!(lines[12], DIVIDER);
        assert_eq!(lines.len(), 13 + 3 + 1);
        assert_eq!(lines[16], DIVIDER);
    }

    #[test]
    fn test_empty_column_list_prints_nothing() {
        let text = render(|out| print_column_list(out, "PartitionKey", &[]));
        assert!(text.is_empty());
        let text = render(|out| print_column_map(out, &HashMap::new()));
        assert!(text.is_empty());
    }

    #[test]
    fn test_table_with_empty_partition_key_skips_section() {
        let table = TableDescriptor::from_columns(
            "demo",
            "odd",
            vec![column("odd", "value", -1, "regular", "blob")],
        )
        .unwrap();
        let text = render(|out| print_table(out, &table));
        assert!(!text.contains("PartitionKey"));
        assert!(!text.contains("ClusteringColumns"));
        assert!(text.contains(COLUMN_MAP_HEADER));
    }

    #[test]
    fn test_column_list_detail_lines_match_column_count() {
        let columns = vec![
            column("events", "source", 0, "partition_key", "text"),
            column("events", "day", 1, "partition_key", "date"),
            column("events", "shard", 2, "partition_key", "int"),
            column("events", "region", 3, "partition_key", "ascii"),
        ];
        let text = render(|out| print_column_list(out, "PartitionKey", &columns));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), columns.len() + 3);
        assert_eq!(lines.first(), Some(&DIVIDER));
        assert_eq!(lines.last(), Some(&DIVIDER));
        assert_eq!(
            lines[1],
            "PartitionKey demo events sourcedemo events day|demo events shard|demo events region"
        );
        // detail lines keep list order
        for (line, column) in lines[2..lines.len() - 1].iter().zip(&columns) {
            assert!(line.starts_with(&format!("demo events {} ", column.name)));
        }
    }

    #[test]
    fn test_column_detail_attributes() {
        let mut city = column("users", "city", -1, "regular", "text");
        city.index = Some(IndexDescriptor {
            name: "users_city_idx".to_string(),
            kind: "COMPOSITES".to_string(),
            options: BTreeMap::new(),
        });
        let text = render(|out| print_column_list(out, "Indexed", std::slice::from_ref(&city)));
        let detail = text.lines().nth(2).unwrap();
        assert_eq!(
            detail,
            "demo users city -1 regular org.apache.cassandra.db.marshal.UTF8Type text none ASC users_city_idx(COMPOSITES)"
        );
    }

    #[test]
    fn test_column_map_row_layout() {
        let columns: HashMap<String, ColumnDescriptor> =
            HashMap::from([("age".to_string(), column("users", "age", -1, "regular", "int"))]);
        let text = render(|out| print_column_map(out, &columns));
        let row = text.lines().nth(3).unwrap();
        assert_eq!(
            row,
            "demo.users.age         -1 regular org.apache.cassandra.db.marshal.Int32Type int none ASC -"
        );
        // 20-wide name field, then two spaces, then a 3-wide ordinal
        assert_eq!(&row[20..22], "  ");
        assert_eq!(&row[22..25], " -1");
    }

    #[test]
    fn test_json_dump_names_fields() {
        let json = render_json(&demo_keyspace(vec![users_table()])).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["name"], "demo");
        assert_eq!(value["durable_writes"], true);
        assert_eq!(value["strategy_options"]["replication_factor"], "1");
        let lastname = &value["tables"]["users"]["columns"]["lastname"];
        assert_eq!(lastname["kind"], "partition_key");
        assert_eq!(lastname["type"], "text");
        assert_eq!(lastname["order"], "ASC");
        assert!(lastname["index"].is_null());
    }
}
