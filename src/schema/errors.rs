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

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Keyspace '{0}' not found")]
    KeyspaceNotFound(String),
    #[error("Unknown column kind '{0}'")]
    UnknownColumnKind(String),
    #[error("Unknown clustering order '{0}'")]
    UnknownClusteringOrder(String),
    #[error("Invalid CQL type '{0}'")]
    InvalidType(String),
    #[error("Column row references unknown table {keyspace}.{table}")]
    UnknownTable { keyspace: String, table: String },
    #[error("Table {table} has two {kind} columns at position {position}")]
    DuplicatePosition {
        table: String,
        kind: String,
        position: i32,
    },
}
