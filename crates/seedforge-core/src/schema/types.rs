use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, SeedForgeError};

/// Top-level representation of a relational schema.
///
/// Constructed from the JSON wire shape (an array of tables) via
/// [`Schema::from_json`]; table iteration order is declaration order.
#[derive(Debug, Clone)]
pub struct Schema {
    pub tables: IndexMap<String, Table>,
}

impl Serialize for Schema {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let tables: Vec<&Table> = self.tables.values().collect();
        let mut state = serializer.serialize_struct("Schema", 1)?;
        state.serialize_field("tables", &tables)?;
        state.end()
    }
}

/// JSON wire shape: `{ "tables": [ ... ] }`.
#[derive(Debug, Deserialize)]
struct SchemaDoc {
    tables: Vec<Table>,
}

impl Schema {
    pub fn from_tables(tables: Vec<Table>) -> Result<Self> {
        let mut map = IndexMap::with_capacity(tables.len());
        for table in tables {
            let name = table.name.clone();
            if map.insert(name.clone(), table).is_some() {
                return Err(SeedForgeError::SchemaInvalid {
                    message: format!("duplicate table name '{}'", name),
                });
            }
        }
        Ok(Self { tables: map })
    }

    /// Parse a schema from its JSON serialization.
    pub fn from_json(input: &str) -> Result<Self> {
        let doc: SchemaDoc =
            serde_json::from_str(input).map_err(|e| SeedForgeError::SchemaInvalid {
                message: format!("schema JSON parse error: {}", e),
            })?;
        Self::from_tables(doc.tables)
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    pub fn column_count(&self) -> usize {
        self.tables.values().map(|t| t.columns.len()).sum()
    }

    pub fn foreign_key_count(&self) -> usize {
        self.tables.values().map(|t| t.foreign_keys().count()).sum()
    }

    /// Check the structural invariants that must hold before generation:
    /// every constraint references existing columns, every FK resolves to an
    /// existing table whose referenced columns form its PK or a unique key,
    /// and FK column arities match.
    pub fn validate(&self) -> Result<()> {
        for table in self.tables.values() {
            let mut pk_seen = false;
            for constraint in &table.constraints {
                match constraint {
                    Constraint::PrimaryKey { columns } => {
                        if pk_seen {
                            return Err(SeedForgeError::SchemaInvalid {
                                message: format!(
                                    "table '{}' declares more than one primary key",
                                    table.name
                                ),
                            });
                        }
                        pk_seen = true;
                        self.require_columns(table, columns, "PRIMARY KEY")?;
                    }
                    Constraint::Unique { columns } => {
                        self.require_columns(table, columns, "UNIQUE")?;
                    }
                    Constraint::Check { columns, .. } => {
                        self.require_columns(table, columns, "CHECK")?;
                    }
                    Constraint::ForeignKey {
                        columns,
                        referenced_table,
                        referenced_columns,
                        ..
                    } => {
                        self.require_columns(table, columns, "FOREIGN KEY")?;
                        if columns.len() != referenced_columns.len() {
                            return Err(SeedForgeError::SchemaInvalid {
                                message: format!(
                                    "foreign key on '{}' has {} source columns but {} referenced columns",
                                    table.name,
                                    columns.len(),
                                    referenced_columns.len()
                                ),
                            });
                        }
                        let target = self.tables.get(referenced_table).ok_or_else(|| {
                            SeedForgeError::SchemaInvalid {
                                message: format!(
                                    "foreign key on '{}' references unknown table '{}'",
                                    table.name, referenced_table
                                ),
                            }
                        })?;
                        self.require_columns(target, referenced_columns, "FOREIGN KEY target")?;
                        if !target.is_identity_key(referenced_columns) {
                            return Err(SeedForgeError::SchemaInvalid {
                                message: format!(
                                    "foreign key {}.({}) references {}.({}) which is neither a primary key nor a unique key",
                                    table.name,
                                    columns.join(", "),
                                    referenced_table,
                                    referenced_columns.join(", ")
                                ),
                            });
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn require_columns(&self, table: &Table, columns: &[String], kind: &str) -> Result<()> {
        for col in columns {
            if table.column(col).is_none() {
                return Err(SeedForgeError::SchemaInvalid {
                    message: format!(
                        "{} constraint on '{}' references missing column '{}'",
                        kind, table.name, col
                    ),
                });
            }
        }
        Ok(())
    }
}

/// A table: name, ordered columns, constraints, optional comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    #[serde(default)]
    pub constraints: Vec<Constraint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Borrowed view of a foreign key constraint.
#[derive(Debug, Clone, Copy)]
pub struct ForeignKeySpec<'a> {
    pub columns: &'a [String],
    pub referenced_table: &'a str,
    pub referenced_columns: &'a [String],
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            constraints: Vec::new(),
            comment: None,
        }
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Columns of the primary key, if one is declared.
    pub fn primary_key(&self) -> Option<&[String]> {
        self.constraints.iter().find_map(|c| match c {
            Constraint::PrimaryKey { columns } => Some(columns.as_slice()),
            _ => None,
        })
    }

    pub fn foreign_keys(&self) -> impl Iterator<Item = ForeignKeySpec<'_>> {
        self.constraints.iter().filter_map(|c| match c {
            Constraint::ForeignKey {
                columns,
                referenced_table,
                referenced_columns,
                ..
            } => Some(ForeignKeySpec {
                columns,
                referenced_table,
                referenced_columns,
            }),
            _ => None,
        })
    }

    pub fn unique_constraints(&self) -> impl Iterator<Item = &[String]> {
        self.constraints.iter().filter_map(|c| match c {
            Constraint::Unique { columns } => Some(columns.as_slice()),
            _ => None,
        })
    }

    /// `(expression, columns_mentioned)` pairs for every CHECK constraint.
    pub fn check_constraints(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.constraints.iter().filter_map(|c| match c {
            Constraint::Check {
                expression,
                columns,
            } => Some((expression.as_str(), columns.as_slice())),
            _ => None,
        })
    }

    pub fn is_pk_column(&self, name: &str) -> bool {
        self.primary_key()
            .is_some_and(|cols| cols.iter().any(|c| c == name))
    }

    /// The single-column foreign key covering `name`, if any.
    pub fn fk_for_column(&self, name: &str) -> Option<ForeignKeySpec<'_>> {
        self.foreign_keys()
            .find(|fk| fk.columns.len() == 1 && fk.columns[0] == name)
    }

    pub fn is_fk_column(&self, name: &str) -> bool {
        self.foreign_keys()
            .any(|fk| fk.columns.iter().any(|c| c == name))
    }

    /// True if this table has a foreign key pointing back at itself.
    pub fn self_referencing(&self) -> bool {
        self.foreign_keys()
            .any(|fk| fk.referenced_table == self.name)
    }

    /// True if `columns` is this table's primary key or one of its unique keys.
    pub fn is_identity_key(&self, columns: &[String]) -> bool {
        if self.primary_key() == Some(columns) {
            return true;
        }
        self.unique_constraints().any(|uc| uc == columns)
    }
}

/// A column: name, logical type, size modifiers, nullability, default,
/// auto-increment flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub logical_type: LogicalType,
    #[serde(default = "default_nullable")]
    pub nullable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<serde_json::Value>,
    #[serde(default)]
    pub auto_increment: bool,
}

fn default_nullable() -> bool {
    true
}

impl Column {
    pub fn new(name: impl Into<String>, logical_type: LogicalType) -> Self {
        Self {
            name: name.into(),
            logical_type,
            nullable: true,
            length: None,
            precision: None,
            scale: None,
            default_value: None,
            auto_increment: false,
        }
    }
}

/// The closed logical type set. Physical type names (`mediumint`,
/// `character varying`, `jsonb`, ...) are normalized at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalType {
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Float,
    Double,
    Decimal,
    Char,
    VarChar,
    Text,
    Boolean,
    Date,
    Time,
    DateTime,
    Timestamp,
    Uuid,
    Json,
    Binary,
}

impl LogicalType {
    /// Normalize a raw type name into a logical type.
    pub fn from_name(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_lowercase();
        let ty = match normalized.as_str() {
            "tinyint" => LogicalType::TinyInt,
            "smallint" | "int2" => LogicalType::SmallInt,
            "int" | "integer" | "int4" | "mediumint" => LogicalType::Integer,
            "bigint" | "int8" => LogicalType::BigInt,
            "float" | "real" | "float4" => LogicalType::Float,
            "double" | "double precision" | "float8" => LogicalType::Double,
            s if s.starts_with("decimal") || s.starts_with("numeric") => LogicalType::Decimal,
            s if s.starts_with("varchar") || s.starts_with("character varying") => {
                LogicalType::VarChar
            }
            "string" => LogicalType::VarChar,
            s if s.starts_with("char") || s.starts_with("character") => LogicalType::Char,
            "text" | "tinytext" | "mediumtext" | "longtext" | "clob" => LogicalType::Text,
            "boolean" | "bool" => LogicalType::Boolean,
            "date" => LogicalType::Date,
            "time" | "time without time zone" => LogicalType::Time,
            "datetime" => LogicalType::DateTime,
            "timestamp" | "timestamptz" | "timestamp without time zone"
            | "timestamp with time zone" => LogicalType::Timestamp,
            "uuid" => LogicalType::Uuid,
            "json" | "jsonb" => LogicalType::Json,
            "blob" | "binary" | "varbinary" | "bytea" => LogicalType::Binary,
            _ => return None,
        };
        Some(ty)
    }

    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            LogicalType::TinyInt | LogicalType::SmallInt | LogicalType::Integer | LogicalType::BigInt
        )
    }

    pub fn is_numeric(&self) -> bool {
        self.is_integer()
            || matches!(
                self,
                LogicalType::Float | LogicalType::Double | LogicalType::Decimal
            )
    }

    pub fn is_string(&self) -> bool {
        matches!(
            self,
            LogicalType::Char | LogicalType::VarChar | LogicalType::Text
        )
    }

    pub fn is_temporal(&self) -> bool {
        matches!(
            self,
            LogicalType::Date | LogicalType::Time | LogicalType::DateTime | LogicalType::Timestamp
        )
    }
}

impl fmt::Display for LogicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogicalType::TinyInt => "TINYINT",
            LogicalType::SmallInt => "SMALLINT",
            LogicalType::Integer => "INTEGER",
            LogicalType::BigInt => "BIGINT",
            LogicalType::Float => "FLOAT",
            LogicalType::Double => "DOUBLE",
            LogicalType::Decimal => "DECIMAL",
            LogicalType::Char => "CHAR",
            LogicalType::VarChar => "VARCHAR",
            LogicalType::Text => "TEXT",
            LogicalType::Boolean => "BOOLEAN",
            LogicalType::Date => "DATE",
            LogicalType::Time => "TIME",
            LogicalType::DateTime => "DATETIME",
            LogicalType::Timestamp => "TIMESTAMP",
            LogicalType::Uuid => "UUID",
            LogicalType::Json => "JSON",
            LogicalType::Binary => "BINARY",
        };
        write!(f, "{}", name)
    }
}

impl Serialize for LogicalType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for LogicalType {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        LogicalType::from_name(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown column type '{}'", raw)))
    }
}

/// A table constraint. The serde tag values match the JSON wire shape
/// exchanged with parser and introspection collaborators.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Constraint {
    #[serde(rename = "PRIMARY_KEY")]
    PrimaryKey { columns: Vec<String> },
    #[serde(rename = "FOREIGN_KEY")]
    ForeignKey {
        columns: Vec<String>,
        referenced_table: String,
        referenced_columns: Vec<String>,
        #[serde(default)]
        on_delete: ForeignKeyAction,
        #[serde(default)]
        on_update: ForeignKeyAction,
    },
    #[serde(rename = "UNIQUE")]
    Unique { columns: Vec<String> },
    #[serde(rename = "CHECK")]
    Check {
        expression: String,
        #[serde(default)]
        columns: Vec<String>,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ForeignKeyAction {
    #[default]
    #[serde(rename = "NO ACTION", alias = "NO_ACTION", alias = "no action")]
    NoAction,
    #[serde(rename = "RESTRICT", alias = "restrict")]
    Restrict,
    #[serde(rename = "CASCADE", alias = "cascade")]
    Cascade,
    #[serde(rename = "SET NULL", alias = "SET_NULL", alias = "set null")]
    SetNull,
    #[serde(rename = "SET DEFAULT", alias = "SET_DEFAULT", alias = "set default")]
    SetDefault,
}

impl fmt::Display for ForeignKeyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForeignKeyAction::NoAction => write!(f, "NO ACTION"),
            ForeignKeyAction::Restrict => write!(f, "RESTRICT"),
            ForeignKeyAction::Cascade => write!(f, "CASCADE"),
            ForeignKeyAction::SetNull => write!(f, "SET NULL"),
            ForeignKeyAction::SetDefault => write!(f, "SET DEFAULT"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pk(columns: &[&str]) -> Constraint {
        Constraint::PrimaryKey {
            columns: columns.iter().map(|c| c.to_string()).collect(),
        }
    }

    fn fk(columns: &[&str], table: &str, referenced: &[&str]) -> Constraint {
        Constraint::ForeignKey {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            referenced_table: table.to_string(),
            referenced_columns: referenced.iter().map(|c| c.to_string()).collect(),
            on_delete: ForeignKeyAction::NoAction,
            on_update: ForeignKeyAction::NoAction,
        }
    }

    #[test]
    fn test_parse_wire_shape() {
        let json = r#"{
            "tables": [
                {
                    "name": "users",
                    "columns": [
                        { "name": "id", "type": "INT", "nullable": false },
                        { "name": "email", "type": "VARCHAR", "nullable": false, "length": 255 }
                    ],
                    "constraints": [
                        { "type": "PRIMARY_KEY", "columns": ["id"] },
                        { "type": "UNIQUE", "columns": ["email"] }
                    ]
                },
                {
                    "name": "orders",
                    "columns": [
                        { "name": "id", "type": "BIGINT", "nullable": false },
                        { "name": "user_id", "type": "INT", "nullable": false }
                    ],
                    "constraints": [
                        { "type": "PRIMARY_KEY", "columns": ["id"] },
                        { "type": "FOREIGN_KEY", "columns": ["user_id"],
                          "referenced_table": "users", "referenced_columns": ["id"],
                          "on_delete": "CASCADE", "on_update": "NO ACTION" }
                    ]
                }
            ]
        }"#;

        let schema = Schema::from_json(json).unwrap();
        assert_eq!(schema.table_count(), 2);
        assert_eq!(schema.foreign_key_count(), 1);
        schema.validate().unwrap();

        let users = schema.table("users").unwrap();
        assert_eq!(users.primary_key(), Some(&["id".to_string()][..]));
        assert_eq!(users.column("email").unwrap().length, Some(255));

        let orders = schema.table("orders").unwrap();
        let fk = orders.fk_for_column("user_id").unwrap();
        assert_eq!(fk.referenced_table, "users");
    }

    #[test]
    fn test_physical_type_normalization() {
        assert_eq!(
            LogicalType::from_name("mediumint"),
            Some(LogicalType::Integer)
        );
        assert_eq!(
            LogicalType::from_name("character varying"),
            Some(LogicalType::VarChar)
        );
        assert_eq!(LogicalType::from_name("JSONB"), Some(LogicalType::Json));
        assert_eq!(LogicalType::from_name("bytea"), Some(LogicalType::Binary));
        assert_eq!(LogicalType::from_name("whatever"), None);
    }

    #[test]
    fn test_validate_missing_constraint_column() {
        let mut users = Table::new("users");
        users.columns.push(Column::new("id", LogicalType::Integer));
        users.constraints.push(pk(&["id", "ghost"]));

        let schema = Schema::from_tables(vec![users]).unwrap();
        let err = schema.validate().unwrap_err();
        assert!(err.to_string().contains("ghost"), "got: {}", err);
    }

    #[test]
    fn test_validate_unknown_referenced_table() {
        let mut orders = Table::new("orders");
        orders
            .columns
            .push(Column::new("user_id", LogicalType::Integer));
        orders.constraints.push(fk(&["user_id"], "users", &["id"]));

        let schema = Schema::from_tables(vec![orders]).unwrap();
        let err = schema.validate().unwrap_err();
        assert!(err.to_string().contains("users"), "got: {}", err);
    }

    #[test]
    fn test_validate_fk_arity_mismatch() {
        let mut users = Table::new("users");
        users.columns.push(Column::new("id", LogicalType::Integer));
        users.constraints.push(pk(&["id"]));

        let mut orders = Table::new("orders");
        orders
            .columns
            .push(Column::new("user_id", LogicalType::Integer));
        orders
            .columns
            .push(Column::new("tenant_id", LogicalType::Integer));
        orders
            .constraints
            .push(fk(&["user_id", "tenant_id"], "users", &["id"]));

        let schema = Schema::from_tables(vec![users, orders]).unwrap();
        let err = schema.validate().unwrap_err();
        assert!(err.to_string().contains("2 source columns"), "got: {}", err);
    }

    #[test]
    fn test_validate_fk_must_target_identity_key() {
        let mut users = Table::new("users");
        users.columns.push(Column::new("id", LogicalType::Integer));
        users
            .columns
            .push(Column::new("nickname", LogicalType::VarChar));
        users.constraints.push(pk(&["id"]));

        let mut orders = Table::new("orders");
        orders
            .columns
            .push(Column::new("user_nick", LogicalType::VarChar));
        orders
            .constraints
            .push(fk(&["user_nick"], "users", &["nickname"]));

        let schema = Schema::from_tables(vec![users, orders]).unwrap();
        assert!(schema.validate().is_err());
    }

    #[test]
    fn test_duplicate_table_name_rejected() {
        let a = Table::new("users");
        let b = Table::new("users");
        assert!(Schema::from_tables(vec![a, b]).is_err());
    }

    #[test]
    fn test_self_reference_detection() {
        let mut employees = Table::new("employees");
        employees
            .columns
            .push(Column::new("id", LogicalType::Integer));
        employees
            .columns
            .push(Column::new("manager_id", LogicalType::Integer));
        employees.constraints.push(pk(&["id"]));
        employees
            .constraints
            .push(fk(&["manager_id"], "employees", &["id"]));

        assert!(employees.self_referencing());
    }
}
