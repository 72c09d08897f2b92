//! In-code declared-schema object model.
//!
//! These are the objects a host ORM's table/view/schema definitions decompose
//! into. The adapter consumes them exclusively through accessor methods; the
//! field layout is an implementation detail of this crate.

use schemadrift_core::schema::{FkAction, IdentityKind, Permissiveness, PolicyCommand};

pub const DEFAULT_SCHEMA: &str = "public";

/// The full declared object graph handed to a dialect adapter.
#[derive(Debug, Clone, Default)]
pub struct DeclaredSchema {
    pub schemas: Vec<SchemaDecl>,
    pub tables: Vec<TableDecl>,
    pub views: Vec<ViewDecl>,
    pub sequences: Vec<SequenceDecl>,
    pub enums: Vec<EnumDecl>,
    pub roles: Vec<RoleDecl>,
    /// Policies declared independently of a table, linked by back-reference.
    pub policies: Vec<PolicyDecl>,
    pub grants: Vec<GrantDecl>,
}

/// A declared namespace. `existing` marks externally managed schemas that are
/// referenced but never created or dropped.
#[derive(Debug, Clone)]
pub struct SchemaDecl {
    name: String,
    existing: bool,
}

impl SchemaDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            existing: false,
        }
    }

    pub fn existing(mut self) -> Self {
        self.existing = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_existing(&self) -> bool {
        self.existing
    }
}

/// A declared table with all attached objects.
#[derive(Debug, Clone)]
pub struct TableDecl {
    schema: Option<String>,
    name: String,
    pub columns: Vec<ColumnDecl>,
    pub indexes: Vec<IndexDecl>,
    pub foreign_keys: Vec<ForeignKeyDecl>,
    pub primary_keys: Vec<PrimaryKeyDecl>,
    pub uniques: Vec<UniqueDecl>,
    pub checks: Vec<CheckDecl>,
    pub policies: Vec<PolicyDecl>,
    rls_enabled: bool,
}

impl TableDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            schema: None,
            name: name.into(),
            columns: Vec::new(),
            indexes: Vec::new(),
            foreign_keys: Vec::new(),
            primary_keys: Vec::new(),
            uniques: Vec::new(),
            checks: Vec::new(),
            policies: Vec::new(),
            rls_enabled: false,
        }
    }

    pub fn in_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn with_rls(mut self) -> Self {
        self.rls_enabled = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &str {
        self.schema.as_deref().unwrap_or(DEFAULT_SCHEMA)
    }

    pub fn rls_enabled(&self) -> bool {
        self.rls_enabled
    }
}

/// An SQL expression used in default-value position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlExpr {
    pub sql: String,
    /// True when the expression carries runtime-bound parameters; such
    /// expressions cannot be rendered to a static default.
    pub has_params: bool,
}

impl SqlExpr {
    pub fn raw(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            has_params: false,
        }
    }
}

/// Declared column default: a literal value or an SQL expression.
#[derive(Debug, Clone)]
pub enum DeclaredDefault {
    Literal(serde_json::Value),
    Sql(SqlExpr),
}

/// Inline unique marker on a column.
#[derive(Debug, Clone, Default)]
pub struct UniqueOnColumn {
    pub name: Option<String>,
    pub nulls_not_distinct: bool,
}

/// Identity options as declared; unset fields get dialect defaults.
#[derive(Debug, Clone)]
pub struct IdentityDecl {
    pub kind: IdentityKind,
    pub sequence_name: Option<String>,
    pub increment: Option<String>,
    pub start_with: Option<String>,
    pub min_value: Option<String>,
    pub max_value: Option<String>,
    pub cache_size: Option<String>,
    pub cycles: bool,
}

impl IdentityDecl {
    pub fn new(kind: IdentityKind) -> Self {
        Self {
            kind,
            sequence_name: None,
            increment: None,
            start_with: None,
            min_value: None,
            max_value: None,
            cache_size: None,
            cycles: false,
        }
    }

    pub fn increment(mut self, value: impl Into<String>) -> Self {
        self.increment = Some(value.into());
        self
    }
}

/// A declared column. `key` is the code-level identifier; `name` is the
/// explicit physical name, if one was given.
#[derive(Debug, Clone)]
pub struct ColumnDecl {
    key: String,
    name: Option<String>,
    sql_type: String,
    pub type_schema: Option<String>,
    pub is_enum: bool,
    pub dimensions: u32,
    pub not_null: bool,
    pub primary_key: bool,
    pub unique: Option<UniqueOnColumn>,
    pub default: Option<DeclaredDefault>,
    pub generated_as: Option<String>,
    pub identity: Option<IdentityDecl>,
}

impl ColumnDecl {
    pub fn new(key: impl Into<String>, sql_type: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: None,
            sql_type: sql_type.into(),
            type_schema: None,
            is_enum: false,
            dimensions: 0,
            not_null: false,
            primary_key: false,
            unique: None,
            default: None,
            generated_as: None,
            identity: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn array(mut self, dimensions: u32) -> Self {
        self.dimensions = dimensions;
        self
    }

    pub fn default_literal(mut self, value: serde_json::Value) -> Self {
        self.default = Some(DeclaredDefault::Literal(value));
        self
    }

    pub fn default_sql(mut self, sql: impl Into<String>) -> Self {
        self.default = Some(DeclaredDefault::Sql(SqlExpr::raw(sql)));
        self
    }

    pub fn with_identity(mut self, identity: IdentityDecl) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn explicit_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn sql_type(&self) -> &str {
        &self.sql_type
    }
}

/// One indexed column or raw SQL expression.
#[derive(Debug, Clone)]
pub enum IndexExpr {
    /// Reference to a column by its code-level key.
    Column(String),
    /// A raw SQL expression.
    Sql(String),
}

/// One part of a declared index.
#[derive(Debug, Clone)]
pub struct IndexPart {
    pub expr: IndexExpr,
    pub ascending: Option<bool>,
    pub nulls_first: Option<bool>,
    pub op_class: Option<String>,
}

impl IndexPart {
    pub fn column(key: impl Into<String>) -> Self {
        Self {
            expr: IndexExpr::Column(key.into()),
            ascending: None,
            nulls_first: None,
            op_class: None,
        }
    }

    pub fn expression(sql: impl Into<String>) -> Self {
        Self {
            expr: IndexExpr::Sql(sql.into()),
            ascending: None,
            nulls_first: None,
            op_class: None,
        }
    }

    pub fn desc(mut self) -> Self {
        self.ascending = Some(false);
        self
    }

    pub fn op_class(mut self, op_class: impl Into<String>) -> Self {
        self.op_class = Some(op_class.into());
        self
    }
}

/// A declared index.
#[derive(Debug, Clone)]
pub struct IndexDecl {
    pub name: Option<String>,
    pub parts: Vec<IndexPart>,
    pub unique: bool,
    pub where_clause: Option<String>,
    pub concurrently: bool,
    pub method: Option<String>,
    pub with: Option<String>,
}

impl IndexDecl {
    pub fn on(parts: Vec<IndexPart>) -> Self {
        Self {
            name: None,
            parts,
            unique: false,
            where_clause: None,
            concurrently: false,
            method: None,
            with: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// A declared foreign key; columns are code-level keys.
#[derive(Debug, Clone)]
pub struct ForeignKeyDecl {
    pub name: Option<String>,
    pub columns: Vec<String>,
    pub target_schema: Option<String>,
    pub target_table: String,
    pub target_columns: Vec<String>,
    pub on_delete: Option<FkAction>,
    pub on_update: Option<FkAction>,
}

/// A declared composite primary key; columns are code-level keys.
#[derive(Debug, Clone)]
pub struct PrimaryKeyDecl {
    pub name: Option<String>,
    pub columns: Vec<String>,
}

/// A declared table-level unique constraint.
#[derive(Debug, Clone)]
pub struct UniqueDecl {
    pub name: Option<String>,
    pub columns: Vec<String>,
    pub nulls_not_distinct: bool,
}

/// A declared check constraint. The name is mandatory; there is nothing to
/// derive one from.
#[derive(Debug, Clone)]
pub struct CheckDecl {
    pub name: String,
    pub expression: String,
}

/// Role target of a policy: a bare name or a reference to a declared role.
#[derive(Debug, Clone)]
pub enum RoleTarget {
    Name(String),
    Role(RoleDecl),
}

impl RoleTarget {
    pub fn role_name(&self) -> &str {
        match self {
            RoleTarget::Name(name) => name,
            RoleTarget::Role(decl) => decl.name(),
        }
    }
}

/// A declared row-security policy. `table` is only set on standalone
/// policies, which get linked to their table by the adapter.
#[derive(Debug, Clone)]
pub struct PolicyDecl {
    pub name: String,
    pub table: Option<(Option<String>, String)>,
    pub permissiveness: Option<Permissiveness>,
    pub applies_to: Option<PolicyCommand>,
    pub to_roles: Vec<RoleTarget>,
    pub using_expression: Option<String>,
    pub with_check_expression: Option<String>,
}

impl PolicyDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: None,
            permissiveness: None,
            applies_to: None,
            to_roles: Vec::new(),
            using_expression: None,
            with_check_expression: None,
        }
    }

    pub fn linked_to(mut self, schema: Option<String>, table: impl Into<String>) -> Self {
        self.table = Some((schema, table.into()));
        self
    }
}

/// A declared view or materialized view.
#[derive(Debug, Clone)]
pub struct ViewDecl {
    schema: Option<String>,
    name: String,
    pub definition: Option<String>,
    pub existing: bool,
    pub materialized: bool,
    /// Storage parameters; `None` values mean "not specified".
    pub with: Vec<(String, Option<String>)>,
    pub with_no_data: bool,
    pub tablespace: Option<String>,
    pub using_method: Option<String>,
}

impl ViewDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            schema: None,
            name: name.into(),
            definition: None,
            existing: false,
            materialized: false,
            with: Vec::new(),
            with_no_data: false,
            tablespace: None,
            using_method: None,
        }
    }

    pub fn in_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn defined_as(mut self, definition: impl Into<String>) -> Self {
        self.definition = Some(definition.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &str {
        self.schema.as_deref().unwrap_or(DEFAULT_SCHEMA)
    }
}

/// A declared sequence; unset fields get dialect defaults.
#[derive(Debug, Clone)]
pub struct SequenceDecl {
    schema: Option<String>,
    name: String,
    pub increment_by: Option<String>,
    pub start_with: Option<String>,
    pub min_value: Option<String>,
    pub max_value: Option<String>,
    pub cache_size: Option<String>,
    pub cycles: bool,
}

impl SequenceDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            schema: None,
            name: name.into(),
            increment_by: None,
            start_with: None,
            min_value: None,
            max_value: None,
            cache_size: None,
            cycles: false,
        }
    }

    pub fn in_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &str {
        self.schema.as_deref().unwrap_or(DEFAULT_SCHEMA)
    }
}

/// A declared enum type; value order is preserved.
#[derive(Debug, Clone)]
pub struct EnumDecl {
    schema: Option<String>,
    name: String,
    pub values: Vec<String>,
}

impl EnumDecl {
    pub fn new(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            schema: None,
            name: name.into(),
            values,
        }
    }

    pub fn in_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &str {
        self.schema.as_deref().unwrap_or(DEFAULT_SCHEMA)
    }
}

/// A declared role.
#[derive(Debug, Clone)]
pub struct RoleDecl {
    name: String,
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

impl RoleDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            superuser: false,
            create_db: false,
            create_role: false,
            can_login: false,
            replication: false,
            bypass_rls: false,
            connection_limit: None,
            password: None,
            valid_until: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A declared table-level grant.
#[derive(Debug, Clone)]
pub struct GrantDecl {
    pub schema: Option<String>,
    pub table: String,
    pub role: String,
    pub privileges: Vec<String>,
    pub with_grant_option: bool,
}
