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
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

pub const MARSHAL_PREFIX: &str = "org.apache.cassandra.db.marshal.";

/// Fully qualified marshal class name for a short class name.
pub fn marshal(class: &str) -> String {
    format!("{}{}", MARSHAL_PREFIX, class)
}

/// `CompositeType(..)` over already qualified validators.
pub fn composite<I, S>(validators: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let parts: Vec<String> = validators.into_iter().map(|v| v.as_ref().to_string()).collect();
    format!("{}({})", marshal("CompositeType"), parts.join(","))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NativeType {
    Ascii,
    Bigint,
    Blob,
    Boolean,
    Counter,
    Date,
    Decimal,
    Double,
    Duration,
    Float,
    Inet,
    Int,
    Smallint,
    Text,
    Time,
    Timestamp,
    Timeuuid,
    Tinyint,
    Uuid,
    Varint,
}

impl NativeType {
    fn from_name(name: &str) -> Option<Self> {
        let native = match name {
            "ascii" => NativeType::Ascii,
            "bigint" => NativeType::Bigint,
            "blob" => NativeType::Blob,
            "boolean" => NativeType::Boolean,
            "counter" => NativeType::Counter,
            "date" => NativeType::Date,
            "decimal" => NativeType::Decimal,
            "double" => NativeType::Double,
            "duration" => NativeType::Duration,
            "float" => NativeType::Float,
            "inet" => NativeType::Inet,
            "int" => NativeType::Int,
            "smallint" => NativeType::Smallint,
            "text" | "varchar" => NativeType::Text,
            "time" => NativeType::Time,
            "timestamp" => NativeType::Timestamp,
            "timeuuid" => NativeType::Timeuuid,
            "tinyint" => NativeType::Tinyint,
            "uuid" => NativeType::Uuid,
            "varint" => NativeType::Varint,
            _ => return None,
        };
        Some(native)
    }

    pub fn name(self) -> &'static str {
        match self {
            NativeType::Ascii => "ascii",
            NativeType::Bigint => "bigint",
            NativeType::Blob => "blob",
            NativeType::Boolean => "boolean",
            NativeType::Counter => "counter",
            NativeType::Date => "date",
            NativeType::Decimal => "decimal",
            NativeType::Double => "double",
            NativeType::Duration => "duration",
            NativeType::Float => "float",
            NativeType::Inet => "inet",
            NativeType::Int => "int",
            NativeType::Smallint => "smallint",
            NativeType::Text => "text",
            NativeType::Time => "time",
            NativeType::Timestamp => "timestamp",
            NativeType::Timeuuid => "timeuuid",
            NativeType::Tinyint => "tinyint",
            NativeType::Uuid => "uuid",
            NativeType::Varint => "varint",
        }
    }

    fn marshal_class(self) -> &'static str {
        match self {
            NativeType::Ascii => "AsciiType",
            NativeType::Bigint => "LongType",
            NativeType::Blob => "BytesType",
            NativeType::Boolean => "BooleanType",
            NativeType::Counter => "CounterColumnType",
            NativeType::Date => "SimpleDateType",
            NativeType::Decimal => "DecimalType",
            NativeType::Double => "DoubleType",
            NativeType::Duration => "DurationType",
            NativeType::Float => "FloatType",
            NativeType::Inet => "InetAddressType",
            NativeType::Int => "Int32Type",
            NativeType::Smallint => "ShortType",
            NativeType::Text => "UTF8Type",
            NativeType::Time => "TimeType",
            NativeType::Timestamp => "TimestampType",
            NativeType::Timeuuid => "TimeUUIDType",
            NativeType::Tinyint => "ByteType",
            NativeType::Uuid => "UUIDType",
            NativeType::Varint => "IntegerType",
        }
    }
}

/// Declared type of a column, as written in `system_schema.columns.type`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CqlType {
    Native(NativeType),
    List(Box<CqlType>),
    Set(Box<CqlType>),
    Map(Box<CqlType>, Box<CqlType>),
    Tuple(Vec<CqlType>),
    Frozen(Box<CqlType>),
    Vector(Box<CqlType>, u32),
    UserDefined(String),
    /// Quoted custom class, e.g. `'org.apache.cassandra.db.marshal.DynamicCompositeType'`.
    Custom(String),
}

impl CqlType {
    /// Marshal class that validates values of this type.
    pub fn validator(&self) -> String {
        match self {
            CqlType::Native(native) => marshal(native.marshal_class()),
            CqlType::List(elem) => format!("{}({})", marshal("ListType"), elem.validator()),
            CqlType::Set(elem) => format!("{}({})", marshal("SetType"), elem.validator()),
            CqlType::Map(key, value) => format!(
                "{}({},{})",
                marshal("MapType"),
                key.validator(),
                value.validator()
            ),
            CqlType::Tuple(elems) => format!(
                "{}({})",
                marshal("TupleType"),
                elems.iter().map(CqlType::validator).collect::<Vec<_>>().join(",")
            ),
            CqlType::Frozen(inner) => format!("{}({})", marshal("FrozenType"), inner.validator()),
            CqlType::Vector(elem, dims) => {
                format!("{}({},{})", marshal("VectorType"), elem.validator(), dims)
            }
            CqlType::UserDefined(name) => format!("{}({})", marshal("UserType"), name),
            CqlType::Custom(class) => class.clone(),
        }
    }
}

impl fmt::Display for CqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CqlType::Native(native) => f.write_str(native.name()),
            CqlType::List(elem) => write!(f, "list<{}>", elem),
            CqlType::Set(elem) => write!(f, "set<{}>", elem),
            CqlType::Map(key, value) => write!(f, "map<{}, {}>", key, value),
            CqlType::Tuple(elems) => {
                f.write_str("tuple<")?;
                for (i, elem) in elems.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", elem)?;
                }
                f.write_str(">")
            }
            CqlType::Frozen(inner) => write!(f, "frozen<{}>", inner),
            CqlType::Vector(elem, dims) => write!(f, "vector<{}, {}>", elem, dims),
            CqlType::UserDefined(name) => f.write_str(name),
            CqlType::Custom(class) => write!(f, "'{}'", class),
        }
    }
}

impl Serialize for CqlType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl FromStr for CqlType {
    type Err = SchemaError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let invalid = || SchemaError::InvalidType(text.to_string());
        let text = text.trim();

        if text.len() >= 2 && text.starts_with('\'') && text.ends_with('\'') {
            return Ok(CqlType::Custom(text[1..text.len() - 1].to_string()));
        }

        let Some(open) = text.find('<') else {
            if let Some(native) = NativeType::from_name(&text.to_ascii_lowercase()) {
                return Ok(CqlType::Native(native));
            }
            if is_identifier(text) {
                return Ok(CqlType::UserDefined(text.to_string()));
            }
            return Err(invalid());
        };

        if !text.ends_with('>') {
            return Err(invalid());
        }
        let name = text[..open].trim().to_ascii_lowercase();
        let args = split_top_level(&text[open + 1..text.len() - 1]).ok_or_else(invalid)?;

        let parsed = match (name.as_str(), args.as_slice()) {
            ("list", [elem]) => CqlType::List(Box::new(elem.parse()?)),
            ("set", [elem]) => CqlType::Set(Box::new(elem.parse()?)),
            ("map", [key, value]) => CqlType::Map(Box::new(key.parse()?), Box::new(value.parse()?)),
            ("frozen", [inner]) => CqlType::Frozen(Box::new(inner.parse()?)),
            ("tuple", elems) if !elems.is_empty() => CqlType::Tuple(
                elems
                    .iter()
                    .map(|elem| elem.parse())
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            ("vector", [elem, dims]) => CqlType::Vector(
                Box::new(elem.parse()?),
                dims.parse().map_err(|_| invalid())?,
            ),
            _ => return Err(invalid()),
        };
        Ok(parsed)
    }
}

// UDT names may be double-quoted when they are case sensitive.
fn is_identifier(text: &str) -> bool {
    if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
        return true;
    }
    !text.is_empty() && text.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Splits type arguments on commas that are not nested inside `<..>`.
/// Returns `None` on unbalanced brackets or an empty argument.
fn split_top_level(args: &str) -> Option<Vec<&str>> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in args.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.checked_sub(1)?,
            ',' if depth == 0 => {
                parts.push(args[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return None;
    }
    parts.push(args[start..].trim());
    if parts.iter().any(|part| part.is_empty()) {
        return None;
    }
    Some(parts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> CqlType {
        text.parse().expect("type should parse")
    }

    #[test]
    fn test_native_types_and_aliases() {
        assert_eq!(parse("int"), CqlType::Native(NativeType::Int));
        assert_eq!(parse("varchar"), CqlType::Native(NativeType::Text));
        assert_eq!(parse("varchar").to_string(), "text");
        assert_eq!(parse("text").validator(), "org.apache.cassandra.db.marshal.UTF8Type");
        assert_eq!(parse("bigint").validator(), marshal("LongType"));
    }

    #[test]
    fn test_nested_collections() {
        let ty = parse("map<text, frozen<list<int>>>");
        assert_eq!(
            ty,
            CqlType::Map(
                Box::new(CqlType::Native(NativeType::Text)),
                Box::new(CqlType::Frozen(Box::new(CqlType::List(Box::new(
                    CqlType::Native(NativeType::Int)
                ))))),
            )
        );
        assert_eq!(ty.to_string(), "map<text, frozen<list<int>>>");
        assert_eq!(
            ty.validator(),
            format!(
                "{}({},{}({}({})))",
                marshal("MapType"),
                marshal("UTF8Type"),
                marshal("FrozenType"),
                marshal("ListType"),
                marshal("Int32Type")
            )
        );
    }

    #[test]
    fn test_tuple_vector_udt_and_custom() {
        assert_eq!(parse("tuple<int, text, uuid>").to_string(), "tuple<int, text, uuid>");
        assert_eq!(
            parse("vector<float, 3>"),
            CqlType::Vector(Box::new(CqlType::Native(NativeType::Float)), 3)
        );
        assert_eq!(parse("frozen<address>").to_string(), "frozen<address>");
        assert_eq!(parse("address").validator(), format!("{}(address)", marshal("UserType")));
        let custom = parse("'org.example.MyType'");
        assert_eq!(custom, CqlType::Custom("org.example.MyType".to_string()));
        assert_eq!(custom.validator(), "org.example.MyType");
    }

    #[test]
    fn test_malformed_types_are_rejected() {
        for text in ["", "list<>", "map<text>", "list<int", "set<int, int>", "vector<float, x>", "list<int>>", "a b"] {
            assert_eq!(
                text.parse::<CqlType>(),
                Err(SchemaError::InvalidType(text.to_string())),
                "{text:?} should not parse"
            );
        }
    }

    #[test]
    fn test_composite_validator() {
        assert_eq!(
            composite([marshal("UTF8Type"), marshal("Int32Type")]),
            format!("{}({},{})", marshal("CompositeType"), marshal("UTF8Type"), marshal("Int32Type"))
        );
    }
}
