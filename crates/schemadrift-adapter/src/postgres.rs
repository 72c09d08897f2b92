//! Postgres-family dialect adapter.

use std::collections::BTreeMap;

use schemadrift_core::grammar::{
    default_name_for_fk, default_name_for_pk, default_name_for_unique, index_name,
    normalize_type_options, split_sql_type,
};
use schemadrift_core::schema::{
    CheckConstraint, Column, ColumnDefault, DefaultKind, EnumType, FkAction, ForeignKey, Generated,
    GeneratedPersistence, Identity, Index, IndexColumn, InterimSchema, Permissiveness, Policy,
    PolicyCommand, PrimaryKey, Privilege, Role, SchemaEntity, Sequence, Table, UniqueConstraint,
    View,
};
use schemadrift_core::{AdapterIssue, Casing, EntityFilter, Error, FilterTarget, Result};
use serde_json::Value;

use crate::declared::{
    ColumnDecl, DeclaredDefault, DeclaredSchema, IdentityDecl, IndexExpr, PolicyDecl,
    SequenceDecl, TableDecl, DEFAULT_SCHEMA,
};
use crate::render::{SqlRenderer, StaticRenderer};
use crate::{AdapterRun, DialectAdapter};

/// Integer magnitude beyond which a literal is carried as a big integer.
const MAX_SAFE_INTEGER: i128 = 9_007_199_254_740_991;

/// Adapter projecting declared Postgres schema objects.
pub struct PostgresAdapter {
    renderer: Box<dyn SqlRenderer>,
}

impl PostgresAdapter {
    pub fn new() -> Self {
        Self {
            renderer: Box::new(StaticRenderer),
        }
    }

    pub fn with_renderer(renderer: Box<dyn SqlRenderer>) -> Self {
        Self { renderer }
    }
}

impl Default for PostgresAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl DialectAdapter for PostgresAdapter {
    fn engine(&self) -> &'static str {
        "postgres"
    }

    fn from_declared(
        &self,
        declared: &DeclaredSchema,
        casing: Casing,
        filter: &EntityFilter,
    ) -> Result<AdapterRun> {
        Projector {
            casing,
            filter,
            renderer: self.renderer.as_ref(),
            out: InterimSchema::empty(),
            errors: Vec::new(),
            warnings: Vec::new(),
        }
        .project(declared)
    }
}

struct Projector<'a> {
    casing: Casing,
    filter: &'a EntityFilter,
    renderer: &'a dyn SqlRenderer,
    out: InterimSchema,
    errors: Vec<AdapterIssue>,
    warnings: Vec<AdapterIssue>,
}

/// A column with its physical name resolved through the casing policy.
struct ResolvedColumn<'a> {
    decl: &'a ColumnDecl,
    physical: String,
}

impl<'a> Projector<'a> {
    fn project(mut self, declared: &DeclaredSchema) -> Result<AdapterRun> {
        self.collect_schemas(declared);

        for table in &declared.tables {
            if !self.filter.allows(FilterTarget::Table {
                schema: table.schema(),
                name: table.name(),
            }) {
                continue;
            }
            self.project_table(declared, table)?;
        }

        self.project_standalone_policies(declared);
        self.collect_views(declared);
        self.collect_sequences(declared);
        self.collect_enums(declared);
        self.collect_roles(declared);
        self.collect_grants(declared);

        Ok(AdapterRun {
            schema: self.out,
            errors: self.errors,
            warnings: self.warnings,
        })
    }

    fn collect_schemas(&mut self, declared: &DeclaredSchema) {
        for schema in &declared.schemas {
            if schema.name() == DEFAULT_SCHEMA || schema.is_existing() {
                continue;
            }
            if !self.filter.allows(FilterTarget::Schema {
                name: schema.name(),
            }) {
                continue;
            }
            self.out.schemas.push(SchemaEntity {
                name: schema.name().to_string(),
            });
        }
    }

    fn project_table(&mut self, declared: &DeclaredSchema, table: &TableDecl) -> Result<()> {
        let schema = table.schema().to_string();
        let name = table.name().to_string();

        let linked_policies: Vec<&PolicyDecl> = declared
            .policies
            .iter()
            .filter(|policy| {
                policy.table.as_ref().is_some_and(|(link_schema, link_table)| {
                    link_schema.as_deref().unwrap_or(DEFAULT_SCHEMA) == schema
                        && *link_table == name
                })
            })
            .collect();

        self.out.tables.push(Table {
            schema: schema.clone(),
            name: name.clone(),
            is_rls_enabled: table.rls_enabled()
                || !table.policies.is_empty()
                || !linked_policies.is_empty(),
        });

        let resolved = self.resolve_columns(table);

        // Composite primary keys first: member columns carry the constraint
        // name. A one-column declaration only flags its column, same as an
        // inline primary key, so introspected state reads back identically.
        let mut pk_entities = Vec::new();
        for pk in &table.primary_keys {
            let columns = self.resolve_member_columns(&resolved, &pk.columns);
            let pk_name = pk
                .name
                .clone()
                .unwrap_or_else(|| default_name_for_pk(&name, &columns));
            pk_entities.push(PrimaryKey {
                schema: schema.clone(),
                table: name.clone(),
                name: pk_name,
                columns,
                name_explicit: pk.name.is_some(),
            });
        }

        for column in &resolved {
            let entity = self.project_column(&schema, &name, column, &pk_entities)?;
            self.out.columns.push(entity);
        }
        self.out
            .primary_keys
            .extend(pk_entities.into_iter().filter(|pk| pk.columns.len() > 1));

        for unique in &table.uniques {
            let columns = self.resolve_member_columns(&resolved, &unique.columns);
            let unique_name = unique
                .name
                .clone()
                .unwrap_or_else(|| default_name_for_unique(&name, &columns));
            self.out.unique_constraints.push(UniqueConstraint {
                schema: schema.clone(),
                table: name.clone(),
                name: unique_name,
                columns,
                name_explicit: unique.name.is_some(),
                nulls_distinct: !unique.nulls_not_distinct,
            });
        }

        for fk in &table.foreign_keys {
            let columns = self.resolve_member_columns(&resolved, &fk.columns);
            let target_schema = fk
                .target_schema
                .clone()
                .unwrap_or_else(|| DEFAULT_SCHEMA.to_string());
            let target_columns =
                self.resolve_target_columns(declared, &target_schema, &fk.target_table, &fk.target_columns);
            let derived =
                default_name_for_fk(&name, &columns, &fk.target_table, &target_columns);
            let (fk_name, name_explicit) = match &fk.name {
                // An explicit name built from uncased keys is rewritten so
                // generated names stay consistent with the casing policy.
                Some(explicit)
                    if *explicit
                        == default_name_for_fk(
                            &name,
                            &fk.columns,
                            &fk.target_table,
                            &fk.target_columns,
                        ) =>
                {
                    (derived.clone(), true)
                }
                Some(explicit) => (explicit.clone(), true),
                None => (derived.clone(), false),
            };
            self.out.foreign_keys.push(ForeignKey {
                schema: schema.clone(),
                table: name.clone(),
                name: fk_name,
                name_explicit,
                columns,
                target_schema,
                target_table: fk.target_table.clone(),
                target_columns,
                on_delete: fk.on_delete.unwrap_or(FkAction::NoAction),
                on_update: fk.on_update.unwrap_or(FkAction::NoAction),
            });
        }

        for check in &table.checks {
            self.out.check_constraints.push(CheckConstraint {
                schema: schema.clone(),
                table: name.clone(),
                name: check.name.clone(),
                expression: check.expression.clone(),
            });
        }

        for index in &table.indexes {
            self.project_index(&schema, &name, &resolved, index);
        }

        for policy in &table.policies {
            let entity = project_policy(policy, &schema, &name);
            self.out.policies.push(entity);
        }

        Ok(())
    }

    fn resolve_columns<'t>(&self, table: &'t TableDecl) -> Vec<ResolvedColumn<'t>> {
        table
            .columns
            .iter()
            .map(|decl| ResolvedColumn {
                physical: decl
                    .explicit_name()
                    .map(str::to_string)
                    .unwrap_or_else(|| self.casing.apply(decl.key())),
                decl,
            })
            .collect()
    }

    /// Map member references (code keys or physical names) to physical names.
    fn resolve_member_columns(
        &self,
        resolved: &[ResolvedColumn<'_>],
        members: &[String],
    ) -> Vec<String> {
        members
            .iter()
            .map(|member| {
                resolved
                    .iter()
                    .find(|col| col.decl.key() == member || col.physical == *member)
                    .map(|col| col.physical.clone())
                    .unwrap_or_else(|| self.casing.apply(member))
            })
            .collect()
    }

    fn resolve_target_columns(
        &self,
        declared: &DeclaredSchema,
        target_schema: &str,
        target_table: &str,
        members: &[String],
    ) -> Vec<String> {
        let target = declared
            .tables
            .iter()
            .find(|table| table.schema() == target_schema && table.name() == target_table);
        match target {
            Some(table) => {
                let resolved = self.resolve_columns(table);
                self.resolve_member_columns(&resolved, members)
            }
            None => members.iter().map(|m| self.casing.apply(m)).collect(),
        }
    }

    fn project_column(
        &mut self,
        schema: &str,
        table: &str,
        column: &ResolvedColumn<'_>,
        pk_entities: &[PrimaryKey],
    ) -> Result<Column> {
        let decl = column.decl;
        let normalized = normalize_type_options(decl.sql_type());
        let (base_type, options) = split_sql_type(&normalized);
        let sql_type = match options {
            Some(options) => {
                // Re-attach canonicalized options to the head of the base
                // name (modifiers like `with time zone` stay trailing).
                match base_type.split_once(' ') {
                    Some((head, rest)) => format!("{head}({options}) {rest}"),
                    None => format!("{base_type}({options})"),
                }
            }
            None => base_type.clone(),
        };

        let type_schema = decl.type_schema.clone().or_else(|| {
            decl.is_enum.then(|| DEFAULT_SCHEMA.to_string())
        });

        let containing_pk = pk_entities.iter().find(|pk| {
            pk.columns.iter().any(|member| member == &column.physical)
        });
        let composite_pk = containing_pk.filter(|pk| pk.columns.len() > 1);

        let (is_unique, unique_constraint_name, unique_nulls_distinct) = match &decl.unique {
            Some(unique) => (
                true,
                Some(unique.name.clone().unwrap_or_else(|| {
                    default_name_for_unique(table, &[column.physical.clone()])
                })),
                !unique.nulls_not_distinct,
            ),
            None => (false, None, true),
        };

        let default = match &decl.default {
            Some(DeclaredDefault::Sql(expr)) => {
                let rendered = self.renderer.render_default_expr(expr)?;
                let trimmed =
                    schemadrift_core::grammar::trim_default_value_suffix(&rendered).to_string();
                Some(ColumnDefault::new(DefaultKind::FuncCall, trimmed))
            }
            Some(DeclaredDefault::Literal(value)) => {
                Some(literal_default(value, &base_type, decl.dimensions)?)
            }
            None => None,
        };

        Ok(Column {
            schema: schema.to_string(),
            table: table.to_string(),
            name: column.physical.clone(),
            sql_type,
            type_schema,
            dimensions: decl.dimensions,
            is_primary_key: decl.primary_key || containing_pk.is_some(),
            pk_constraint_name: composite_pk.map(|pk| pk.name.clone()),
            not_null: decl.not_null || decl.primary_key || containing_pk.is_some(),
            default,
            generated: decl.generated_as.as_ref().map(|expression| Generated {
                expression: expression.clone(),
                persistence: GeneratedPersistence::Stored,
            }),
            is_unique,
            unique_constraint_name,
            unique_nulls_distinct,
            identity: decl
                .identity
                .as_ref()
                .map(|identity| resolve_identity(identity, &base_type)),
        })
    }

    fn project_index(
        &mut self,
        schema: &str,
        table: &str,
        resolved: &[ResolvedColumn<'_>],
        index: &crate::declared::IndexDecl,
    ) {
        let mut columns = Vec::with_capacity(index.parts.len());
        for part in &index.parts {
            let (value, is_expression) = match &part.expr {
                IndexExpr::Column(key) => {
                    let column = resolved
                        .iter()
                        .find(|col| col.decl.key() == key || col.physical == *key);
                    if let Some(column) = column {
                        let (base, _) = split_sql_type(column.decl.sql_type());
                        if part.op_class.is_none() && is_vector_type(&base) {
                            self.warnings.push(AdapterIssue::PgvectorIndexNoop {
                                schema: schema.to_string(),
                                table: table.to_string(),
                                column: column.physical.clone(),
                            });
                        }
                        (column.physical.clone(), false)
                    } else {
                        (self.casing.apply(key), false)
                    }
                }
                IndexExpr::Sql(sql) => (sql.clone(), true),
            };

            let ascending = part.ascending.unwrap_or(true);
            columns.push(IndexColumn {
                value,
                is_expression,
                ascending,
                // Native default: ascending puts nulls last, descending puts
                // nulls first. The asymmetry is deliberate.
                nulls_first: part.nulls_first.unwrap_or(!ascending),
                op_class: part.op_class.clone(),
            });
        }

        let (name, name_explicit) = match &index.name {
            Some(name) => (name.clone(), true),
            None => {
                if let Some(expression) = columns
                    .iter()
                    .find(|column| column.is_expression)
                    .map(|column| column.value.clone())
                {
                    self.errors.push(AdapterIssue::IndexNoName {
                        schema: schema.to_string(),
                        table: table.to_string(),
                        expression,
                    });
                    return;
                }
                let names: Vec<String> =
                    columns.iter().map(|column| column.value.clone()).collect();
                (index_name(table, &names), false)
            }
        };

        self.out.indexes.push(Index {
            schema: schema.to_string(),
            table: table.to_string(),
            name,
            name_explicit,
            columns,
            is_unique: index.unique,
            where_clause: index.where_clause.clone(),
            concurrently: index.concurrently,
            method: index.method.clone().unwrap_or_else(|| "btree".to_string()),
            with: index.with.clone(),
            for_primary_key: false,
            for_unique_constraint: false,
        });
    }

    fn project_standalone_policies(&mut self, declared: &DeclaredSchema) {
        for policy in &declared.policies {
            let Some((link_schema, link_table)) = policy.table.as_ref() else {
                self.warnings.push(AdapterIssue::PolicyNotLinked {
                    policy: policy.name.clone(),
                });
                continue;
            };
            let schema = link_schema.as_deref().unwrap_or(DEFAULT_SCHEMA);

            let linked = declared
                .tables
                .iter()
                .any(|table| table.schema() == schema && table.name() == *link_table);
            if !linked {
                self.warnings.push(AdapterIssue::PolicyNotLinked {
                    policy: policy.name.clone(),
                });
                continue;
            }
            if !self.filter.allows(FilterTarget::Table {
                schema,
                name: link_table,
            }) {
                continue;
            }
            let entity = project_policy(policy, schema, link_table);
            self.out.policies.push(entity);
        }
    }

    fn collect_views(&mut self, declared: &DeclaredSchema) {
        for view in &declared.views {
            if view.existing {
                continue;
            }
            if !self.filter.allows(FilterTarget::Table {
                schema: view.schema(),
                name: view.name(),
            }) {
                continue;
            }

            let mut with_options = BTreeMap::new();
            for (key, value) in &view.with {
                if let Some(value) = value {
                    with_options.insert(key.clone(), value.clone());
                }
            }

            self.out.views.push(View {
                schema: view.schema().to_string(),
                name: view.name().to_string(),
                definition: view.definition.clone(),
                with_options: (!with_options.is_empty()).then_some(with_options),
                with_no_data: view.with_no_data,
                is_materialized: view.materialized,
                tablespace: view.tablespace.clone(),
                using_method: view.using_method.clone(),
            });
        }
    }

    fn collect_sequences(&mut self, declared: &DeclaredSchema) {
        for sequence in &declared.sequences {
            if !self.filter.allows(FilterTarget::Schema {
                name: sequence.schema(),
            }) {
                continue;
            }
            self.out.sequences.push(resolve_sequence(sequence));
        }
    }

    fn collect_enums(&mut self, declared: &DeclaredSchema) {
        for decl in &declared.enums {
            if !self.filter.allows(FilterTarget::Schema {
                name: decl.schema(),
            }) {
                continue;
            }
            self.out.enums.push(EnumType {
                schema: decl.schema().to_string(),
                name: decl.name().to_string(),
                values: decl.values.clone(),
            });
        }
    }

    fn collect_roles(&mut self, declared: &DeclaredSchema) {
        for role in &declared.roles {
            if !self.filter.allows(FilterTarget::Role { name: role.name() }) {
                continue;
            }
            self.out.roles.push(Role {
                name: role.name().to_string(),
                superuser: role.superuser,
                create_db: role.create_db,
                create_role: role.create_role,
                can_login: role.can_login,
                replication: role.replication,
                bypass_rls: role.bypass_rls,
                connection_limit: role.connection_limit.clone(),
                password: role.password.clone(),
                valid_until: role.valid_until.clone(),
            });
        }
    }

    fn collect_grants(&mut self, declared: &DeclaredSchema) {
        for grant in &declared.grants {
            let schema = grant.schema.as_deref().unwrap_or(DEFAULT_SCHEMA);
            if !self.filter.allows(FilterTarget::Table {
                schema,
                name: &grant.table,
            }) {
                continue;
            }
            self.out.privileges.push(Privilege {
                schema: schema.to_string(),
                table: grant.table.clone(),
                role: grant.role.clone(),
                kinds: grant.privileges.clone(),
                with_grant_option: grant.with_grant_option,
            });
        }
    }
}

fn project_policy(policy: &PolicyDecl, schema: &str, table: &str) -> Policy {
    let mut roles: Vec<String> = policy
        .to_roles
        .iter()
        .map(|target| target.role_name().to_string())
        .collect();
    if roles.is_empty() {
        roles.push("public".to_string());
    }
    roles.sort();
    roles.dedup();

    Policy {
        schema: schema.to_string(),
        table: table.to_string(),
        name: policy.name.clone(),
        permissiveness: policy.permissiveness.unwrap_or(Permissiveness::Permissive),
        applies_to: policy.applies_to.unwrap_or(PolicyCommand::All),
        roles,
        using_expression: policy.using_expression.clone(),
        with_check_expression: policy.with_check_expression.clone(),
    }
}

/// Natural bounds for the integer family backing identities and sequences.
fn integer_bounds(sql_type: &str) -> (&'static str, &'static str) {
    match sql_type {
        "smallint" | "int2" | "smallserial" => ("-32768", "32767"),
        "integer" | "int" | "int4" | "serial" => ("-2147483648", "2147483647"),
        _ => ("-9223372036854775808", "9223372036854775807"),
    }
}

/// Fill unset identity parameters with the dialect defaults.
///
/// The sign of the increment decides which bound seeds the start value:
/// ascending sequences start at the minimum, descending at the maximum.
fn resolve_identity(decl: &IdentityDecl, sql_type: &str) -> Identity {
    let (type_min, type_max) = integer_bounds(sql_type);
    let increment = decl.increment.clone().unwrap_or_else(|| "1".to_string());
    let descending = increment.starts_with('-');

    let (min_value, max_value) = if descending {
        (
            decl.min_value.clone().unwrap_or_else(|| type_min.to_string()),
            decl.max_value.clone().unwrap_or_else(|| "-1".to_string()),
        )
    } else {
        (
            decl.min_value.clone().unwrap_or_else(|| "1".to_string()),
            decl.max_value.clone().unwrap_or_else(|| type_max.to_string()),
        )
    };
    let start_with = decl.start_with.clone().unwrap_or_else(|| {
        if descending {
            max_value.clone()
        } else {
            min_value.clone()
        }
    });

    Identity {
        kind: decl.kind,
        sequence_name: decl.sequence_name.clone(),
        increment,
        start_with,
        min_value,
        max_value,
        cache_size: decl.cache_size.clone().unwrap_or_else(|| "1".to_string()),
        cycles: decl.cycles,
    }
}

/// Same bound-defaulting rule as identities, with bigint bounds.
fn resolve_sequence(decl: &SequenceDecl) -> Sequence {
    let shadow = IdentityDecl {
        kind: schemadrift_core::schema::IdentityKind::ByDefault,
        sequence_name: None,
        increment: decl.increment_by.clone(),
        start_with: decl.start_with.clone(),
        min_value: decl.min_value.clone(),
        max_value: decl.max_value.clone(),
        cache_size: decl.cache_size.clone(),
        cycles: decl.cycles,
    };
    let resolved = resolve_identity(&shadow, "bigint");
    Sequence {
        schema: decl.schema().to_string(),
        name: decl.name().to_string(),
        increment_by: resolved.increment,
        start_with: resolved.start_with,
        min_value: resolved.min_value,
        max_value: resolved.max_value,
        cache_size: resolved.cache_size,
        cycles: resolved.cycles,
    }
}

fn is_vector_type(base_type: &str) -> bool {
    matches!(base_type, "vector" | "halfvec" | "sparsevec")
}

fn is_numeric_family(base_type: &str) -> bool {
    matches!(
        base_type,
        "smallint"
            | "int2"
            | "integer"
            | "int"
            | "int4"
            | "bigint"
            | "int8"
            | "numeric"
            | "decimal"
            | "real"
            | "float4"
            | "double precision"
            | "float8"
            | "smallserial"
            | "serial"
            | "bigserial"
    )
}

/// Project a declared literal default into a tagged default.
fn literal_default(value: &Value, base_type: &str, dimensions: u32) -> Result<ColumnDefault> {
    if dimensions > 0 {
        let body = serialize_array_default(value, base_type, dimensions)?;
        return Ok(ColumnDefault::new(DefaultKind::String, body));
    }
    scalar_default(value, base_type)
}

fn scalar_default(value: &Value, base_type: &str) -> Result<ColumnDefault> {
    if base_type == "json" || base_type == "jsonb" {
        let canonical = serde_json::to_string(value)
            .map_err(|err| Error::UnrenderableDefault(err.to_string()))?;
        return Ok(ColumnDefault::new(DefaultKind::Json, canonical));
    }

    match value {
        Value::Null => Ok(ColumnDefault::new(DefaultKind::Null, "null")),
        Value::Bool(flag) => Ok(ColumnDefault::new(DefaultKind::Boolean, flag.to_string())),
        Value::Number(number) => {
            let kind = number
                .as_i64()
                .map(|n| {
                    if (n as i128).abs() > MAX_SAFE_INTEGER {
                        DefaultKind::BigInt
                    } else {
                        DefaultKind::Number
                    }
                })
                .unwrap_or(DefaultKind::Number);
            Ok(ColumnDefault::new(kind, number.to_string()))
        }
        Value::String(text) if is_numeric_family(base_type) => {
            let kind = match text.parse::<i128>() {
                Ok(n) if n.abs() > MAX_SAFE_INTEGER => DefaultKind::BigInt,
                _ => DefaultKind::Number,
            };
            Ok(ColumnDefault::new(kind, text.clone()))
        }
        Value::String(text) => Ok(ColumnDefault::new(DefaultKind::String, text.clone())),
        // Geometric shapes arrive as coordinate arrays.
        Value::Array(_) => Ok(ColumnDefault::new(
            DefaultKind::String,
            scalar_text(value, base_type, false)?,
        )),
        Value::Object(_) => Err(Error::UnrenderableDefault(format!(
            "object literal is not a valid default for type {base_type}"
        ))),
    }
}

/// Serialize a (possibly nested) literal array default to array-literal text.
///
/// The all-empty-nested case collapses to the bare empty-array marker.
fn serialize_array_default(value: &Value, base_type: &str, dimensions: u32) -> Result<String> {
    if is_empty_nested(value) {
        return Ok("{}".to_string());
    }
    render_array_level(value, base_type, dimensions)
}

fn is_empty_nested(value: &Value) -> bool {
    match value {
        Value::Array(items) => items.iter().all(is_empty_nested),
        _ => false,
    }
}

fn render_array_level(value: &Value, base_type: &str, depth: u32) -> Result<String> {
    if depth == 0 {
        return scalar_text(value, base_type, true);
    }
    let Value::Array(items) = value else {
        return Err(Error::UnrenderableDefault(format!(
            "expected a {depth}-dimensional array literal, got {value}"
        )));
    };
    let rendered: Vec<String> = items
        .iter()
        .map(|item| render_array_level(item, base_type, depth - 1))
        .collect::<Result<_>>()?;
    Ok(format!("{{{}}}", rendered.join(",")))
}

/// Per-base-type element serializer. `quoted` selects array-element position
/// (where composite values need double quotes) over scalar position.
fn scalar_text(value: &Value, base_type: &str, quoted: bool) -> Result<String> {
    let plain = |text: String| -> String { text };
    let quote = |text: String| -> String {
        format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
    };

    match base_type {
        "point" => {
            let coords = coordinate_list(value, 2, base_type)?;
            let body = format!("({},{})", coords[0], coords[1]);
            Ok(if quoted { quote(body) } else { plain(body) })
        }
        "line" => {
            let coords = coordinate_list(value, 3, base_type)?;
            let body = format!("{{{},{},{}}}", coords[0], coords[1], coords[2]);
            Ok(if quoted { quote(body) } else { plain(body) })
        }
        "json" | "jsonb" => {
            let canonical = serde_json::to_string(value)
                .map_err(|err| Error::UnrenderableDefault(err.to_string()))?;
            Ok(if quoted { quote(canonical) } else { plain(canonical) })
        }
        _ if is_numeric_family(base_type) => match value {
            Value::Number(number) => Ok(number.to_string()),
            Value::String(text) => Ok(text.clone()),
            other => Err(Error::UnrenderableDefault(format!(
                "{other} is not a valid {base_type} element"
            ))),
        },
        "boolean" | "bool" => match value {
            Value::Bool(flag) => Ok(flag.to_string()),
            other => Err(Error::UnrenderableDefault(format!(
                "{other} is not a valid boolean element"
            ))),
        },
        _ => match value {
            Value::Null => Ok("NULL".to_string()),
            Value::String(text) => Ok(if quoted {
                quote(text.clone())
            } else {
                plain(text.clone())
            }),
            Value::Number(number) => Ok(number.to_string()),
            Value::Bool(flag) => Ok(flag.to_string()),
            other => Err(Error::UnrenderableDefault(format!(
                "{other} is not a valid {base_type} element"
            ))),
        },
    }
}

fn coordinate_list(value: &Value, arity: usize, base_type: &str) -> Result<Vec<String>> {
    let Value::Array(items) = value else {
        return Err(Error::UnrenderableDefault(format!(
            "{value} is not a valid {base_type} literal"
        )));
    };
    if items.len() != arity {
        return Err(Error::UnrenderableDefault(format!(
            "{base_type} literal needs {arity} coordinates, got {}",
            items.len()
        )));
    }
    items
        .iter()
        .map(|item| match item {
            Value::Number(number) => Ok(number.to_string()),
            other => Err(Error::UnrenderableDefault(format!(
                "{other} is not a valid {base_type} coordinate"
            ))),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn identity_bounds_follow_increment_sign() {
        let ascending = resolve_identity(
            &IdentityDecl::new(schemadrift_core::schema::IdentityKind::Always),
            "integer",
        );
        assert_eq!(ascending.min_value, "1");
        assert_eq!(ascending.max_value, "2147483647");
        assert_eq!(ascending.start_with, "1");

        let descending = resolve_identity(
            &IdentityDecl::new(schemadrift_core::schema::IdentityKind::Always).increment("-1"),
            "integer",
        );
        assert_eq!(descending.min_value, "-2147483648");
        assert_eq!(descending.max_value, "-1");
        assert_eq!(descending.start_with, "-1");
    }

    #[test]
    fn array_defaults_serialize_per_base_type() {
        assert_eq!(
            serialize_array_default(&json!([1, 2, 3]), "integer", 1).unwrap(),
            "{1,2,3}"
        );
        assert_eq!(
            serialize_array_default(&json!([[1, 2], [3, 4]]), "integer", 2).unwrap(),
            "{{1,2},{3,4}}"
        );
        assert_eq!(
            serialize_array_default(&json!([[1, 2], [3, 4]]), "point", 1).unwrap(),
            "{\"(1,2)\",\"(3,4)\"}"
        );
        assert_eq!(
            serialize_array_default(&json!(["a", "b\"c"]), "text", 1).unwrap(),
            "{\"a\",\"b\\\"c\"}"
        );
    }

    #[test]
    fn empty_nested_array_collapses() {
        assert_eq!(
            serialize_array_default(&json!([[]]), "integer", 2).unwrap(),
            "{}"
        );
        assert_eq!(
            serialize_array_default(&json!([]), "integer", 1).unwrap(),
            "{}"
        );
    }

    #[test]
    fn scalar_defaults_are_tagged() {
        assert_eq!(
            scalar_default(&json!(true), "boolean").unwrap().kind,
            DefaultKind::Boolean
        );
        assert_eq!(
            scalar_default(&json!(12), "integer").unwrap().kind,
            DefaultKind::Number
        );
        assert_eq!(
            scalar_default(&json!(9007199254740993i64), "bigint")
                .unwrap()
                .kind,
            DefaultKind::BigInt
        );
        assert_eq!(
            scalar_default(&json!("9223372036854775807"), "bigint")
                .unwrap()
                .kind,
            DefaultKind::BigInt
        );
        let json_default = scalar_default(&json!({"a": 1}), "jsonb").unwrap();
        assert_eq!(json_default.kind, DefaultKind::Json);
        assert_eq!(json_default.value, "{\"a\":1}");
        let point = scalar_default(&json!([1, 2]), "point").unwrap();
        assert_eq!(point.value, "(1,2)");
    }
}
