use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Canonical, dialect-agnostic representation of a database schema.
///
/// Every entity kind lives in its own ordered sequence; insertion order
/// mirrors declaration (adapter) or catalog (introspector) order. Duplicate
/// identities are representable by construction — collision detection is the
/// job of [`crate::validation::validate_interim`], not of the producers.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct InterimSchema {
    pub schemas: Vec<SchemaEntity>,
    pub tables: Vec<Table>,
    pub columns: Vec<Column>,
    pub indexes: Vec<Index>,
    pub primary_keys: Vec<PrimaryKey>,
    pub foreign_keys: Vec<ForeignKey>,
    pub unique_constraints: Vec<UniqueConstraint>,
    pub check_constraints: Vec<CheckConstraint>,
    pub sequences: Vec<Sequence>,
    pub roles: Vec<Role>,
    pub privileges: Vec<Privilege>,
    pub policies: Vec<Policy>,
    pub views: Vec<View>,
    pub view_columns: Vec<ViewColumn>,
    pub enums: Vec<EnumType>,
}

impl InterimSchema {
    /// An interim schema with every entity sequence empty.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// A named namespace. The default schema (`public`) is implicit and never
/// appears in this sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SchemaEntity {
    pub name: String,
}

/// A managed table. Identity = (schema, name).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Table {
    pub schema: String,
    pub name: String,
    /// True when RLS is enabled directly or any policy is attached.
    pub is_rls_enabled: bool,
}

/// Tag for a column default literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DefaultKind {
    String,
    Number,
    /// Integer outside the 64-bit float safe range; carried as text.
    BigInt,
    Boolean,
    Null,
    Json,
    /// An SQL expression (function call) rendered to text.
    FuncCall,
    Unknown,
}

/// A column default as a tagged literal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ColumnDefault {
    pub kind: DefaultKind,
    pub value: String,
}

impl ColumnDefault {
    pub fn new(kind: DefaultKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

/// Persistence mode of a generated column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum GeneratedPersistence {
    Stored,
}

/// Generated-column expression metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Generated {
    pub expression: String,
    pub persistence: GeneratedPersistence,
}

/// Identity generation strategy (`GENERATED ... AS IDENTITY`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum IdentityKind {
    Always,
    ByDefault,
}

/// Identity column sequence parameters. Numeric fields are decimal strings so
/// 64-bit bounds survive serialization untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Identity {
    pub kind: IdentityKind,
    pub sequence_name: Option<String>,
    pub increment: String,
    pub start_with: String,
    pub min_value: String,
    pub max_value: String,
    pub cache_size: String,
    pub cycles: bool,
}

/// Column metadata. Identity = (schema, table, name).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Column {
    pub schema: String,
    pub table: String,
    pub name: String,
    /// Base type without array brackets (e.g. `timestamp with time zone`).
    pub sql_type: String,
    /// Namespace of the type; set only for user-defined/enum types.
    pub type_schema: Option<String>,
    /// 0 = scalar.
    pub dimensions: u32,
    pub is_primary_key: bool,
    pub pk_constraint_name: Option<String>,
    pub not_null: bool,
    pub default: Option<ColumnDefault>,
    pub generated: Option<Generated>,
    pub is_unique: bool,
    pub unique_constraint_name: Option<String>,
    pub unique_nulls_distinct: bool,
    pub identity: Option<Identity>,
}

/// Primary key constraint. `columns` is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PrimaryKey {
    pub schema: String,
    pub table: String,
    pub name: String,
    pub columns: Vec<String>,
    pub name_explicit: bool,
}

/// Unique constraint definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct UniqueConstraint {
    pub schema: String,
    pub table: String,
    pub name: String,
    pub columns: Vec<String>,
    pub name_explicit: bool,
    pub nulls_distinct: bool,
}

/// Referential action semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FkAction {
    NoAction,
    Cascade,
    Restrict,
    SetDefault,
    SetNull,
}

impl FkAction {
    pub fn as_sql(&self) -> &'static str {
        match self {
            FkAction::NoAction => "NO ACTION",
            FkAction::Cascade => "CASCADE",
            FkAction::Restrict => "RESTRICT",
            FkAction::SetDefault => "SET DEFAULT",
            FkAction::SetNull => "SET NULL",
        }
    }
}

/// Foreign key constraint. `columns.len() == target_columns.len()` always.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ForeignKey {
    pub schema: String,
    pub table: String,
    pub name: String,
    pub name_explicit: bool,
    pub columns: Vec<String>,
    pub target_schema: String,
    pub target_table: String,
    pub target_columns: Vec<String>,
    pub on_delete: FkAction,
    pub on_update: FkAction,
}

/// One indexed column or expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct IndexColumn {
    pub value: String,
    pub is_expression: bool,
    pub ascending: bool,
    pub nulls_first: bool,
    pub op_class: Option<String>,
}

/// Index definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Index {
    pub schema: String,
    pub table: String,
    pub name: String,
    pub name_explicit: bool,
    pub columns: Vec<IndexColumn>,
    pub is_unique: bool,
    pub where_clause: Option<String>,
    pub concurrently: bool,
    pub method: String,
    pub with: Option<String>,
    /// Backs the table's primary key; skip when emitting plain indexes.
    pub for_primary_key: bool,
    /// Backs a unique constraint; skip when emitting plain indexes.
    pub for_unique_constraint: bool,
}

/// Check constraint with its raw SQL expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CheckConstraint {
    pub schema: String,
    pub table: String,
    pub name: String,
    pub expression: String,
}

/// Standalone sequence. Numeric fields are decimal strings (64-bit bounds).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Sequence {
    pub schema: String,
    pub name: String,
    pub increment_by: String,
    pub start_with: String,
    pub min_value: String,
    pub max_value: String,
    pub cache_size: String,
    pub cycles: bool,
}

/// Database role with optional capability flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Role {
    pub name: String,
    pub superuser: bool,
    pub create_db: bool,
    pub create_role: bool,
    pub can_login: bool,
    pub replication: bool,
    pub bypass_rls: bool,
    pub connection_limit: Option<String>,
    pub password: Option<String>,
    pub valid_until: Option<String>,
}

/// Table-level grant projected from declared schema objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Privilege {
    pub schema: String,
    pub table: String,
    pub role: String,
    pub kinds: Vec<String>,
    pub with_grant_option: bool,
}

/// Row-security policy permissiveness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Permissiveness {
    Permissive,
    Restrictive,
}

/// Statement kinds a policy applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PolicyCommand {
    All,
    Select,
    Insert,
    Update,
    Delete,
}

/// Row-security policy. `roles` is sorted and defaults to `["public"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Policy {
    pub schema: String,
    pub table: String,
    pub name: String,
    pub permissiveness: Permissiveness,
    pub applies_to: PolicyCommand,
    pub roles: Vec<String>,
    pub using_expression: Option<String>,
    pub with_check_expression: Option<String>,
}

/// View or materialized view. `definition` is `None` for unmanaged views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct View {
    pub schema: String,
    pub name: String,
    pub definition: Option<String>,
    /// Storage parameters; only keys with a concrete value. `None` when no
    /// option was specified (distinct from "all options at their defaults").
    pub with_options: Option<BTreeMap<String, String>>,
    pub with_no_data: bool,
    pub is_materialized: bool,
    pub tablespace: Option<String>,
    pub using_method: Option<String>,
}

/// Column of a view, tracked separately from table columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ViewColumn {
    pub schema: String,
    pub view: String,
    pub name: String,
    pub sql_type: String,
    pub not_null: bool,
}

/// Enum type; label order is semantically significant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct EnumType {
    pub schema: String,
    pub name: String,
    pub values: Vec<String>,
}
