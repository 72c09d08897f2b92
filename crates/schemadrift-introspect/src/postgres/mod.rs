//! Multi-pass Postgres catalog introspection.

use std::collections::{HashMap, HashSet};

use sqlx::PgPool;

use schemadrift_core::schema::{
    CheckConstraint, EnumType, ForeignKey, Index, InterimSchema, PrimaryKey, SchemaEntity, Table,
    UniqueConstraint, View,
};
use schemadrift_core::{EntityFilter, Error, FilterTarget, Result};

use crate::hooks::{IntrospectHooks, ProgressPhase, ProgressStep};
use crate::introspector::Introspector;
use crate::redaction::redact_connection_string;

mod mapper;
mod queries;

/// Catalog introspector for PostgreSQL databases.
#[derive(Debug, Clone)]
pub struct PostgresIntrospector {
    pool: PgPool,
}

impl PostgresIntrospector {
    /// Create an introspector over a pre-configured pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to `url` and wrap the resulting pool.
    pub async fn connect(url: &str) -> Result<Self> {
        tracing::debug!(url = %redact_connection_string(url), "connecting");
        let pool = PgPool::connect(url)
            .await
            .map_err(|err| Error::Db(err.to_string()))?;
        Ok(Self { pool })
    }
}

#[async_trait::async_trait]
impl Introspector for PostgresIntrospector {
    fn engine(&self) -> &'static str {
        "postgres"
    }

    async fn introspect(
        &self,
        database: &str,
        filter: &EntityFilter,
        hooks: &IntrospectHooks<'_>,
    ) -> Result<InterimSchema> {
        introspect_postgres(&self.pool, database, filter, hooks).await
    }
}

/// Read the live catalog into an interim schema.
///
/// Any single catalog query failure aborts the whole run; no partial schema
/// is ever returned.
pub async fn introspect_postgres(
    pool: &PgPool,
    database: &str,
    filter: &EntityFilter,
    hooks: &IntrospectHooks<'_>,
) -> Result<InterimSchema> {
    tracing::debug!(database, "starting catalog introspection");

    let namespaces = queries::list_namespaces(pool)
        .await
        .map_err(|err| hooks.query_failed("namespaces", err))?;
    let retained = mapper::retained_namespaces(namespaces, filter);
    if retained.is_empty() {
        tracing::debug!(database, "no namespaces retained, skipping catalog scan");
        return Ok(InterimSchema::empty());
    }
    let namespace_oids: Vec<i64> = retained.iter().map(|ns| ns.oid).collect();

    let mut out = InterimSchema::empty();
    for namespace in &retained {
        if namespace.name != "public" {
            out.schemas.push(SchemaEntity {
                name: namespace.name.clone(),
            });
        }
    }

    let relations = queries::list_relations(pool, &namespace_oids)
        .await
        .map_err(|err| hooks.query_failed("relations", err))?;

    // Partition by relkind. The table filter applies to tables right away;
    // views are filtered after column correlation so their column types go
    // through the same resolution batch.
    let mut tables = Vec::new();
    let mut views = Vec::new();
    for relation in relations {
        if relation.is_table() {
            if filter.allows(FilterTarget::Table {
                schema: &relation.schema,
                name: &relation.name,
            }) {
                tables.push(relation);
            }
        } else {
            views.push(relation);
        }
    }
    for table in &tables {
        out.tables.push(Table {
            schema: table.schema.clone(),
            name: table.name.clone(),
            is_rls_enabled: table.rls_enabled,
        });
    }
    hooks.checkpoint(ProgressStep::Tables, ProgressPhase::Done);

    let table_oids: Vec<i64> = tables.iter().map(|rel| rel.oid).collect();
    let mut relation_oids = table_oids.clone();
    relation_oids.extend(views.iter().map(|rel| rel.oid));

    let table_names: HashMap<i64, (String, String)> = tables
        .iter()
        .map(|rel| (rel.oid, (rel.schema.clone(), rel.name.clone())))
        .collect();
    let view_names: HashMap<i64, (String, String)> = views
        .iter()
        .map(|rel| (rel.oid, (rel.schema.clone(), rel.name.clone())))
        .collect();

    // Constraints and columns have no data dependency; fetch concurrently.
    hooks.checkpoint(ProgressStep::Columns, ProgressPhase::Fetching);
    hooks.checkpoint(ProgressStep::Checks, ProgressPhase::Fetching);
    let (raw_constraints, raw_columns) = tokio::try_join!(
        async {
            queries::list_constraints(pool, &table_oids)
                .await
                .map_err(|err| hooks.query_failed("constraints", err))
        },
        async {
            queries::list_columns(pool, &relation_oids)
                .await
                .map_err(|err| hooks.query_failed("columns", err))
        },
    )?;

    let mut columns_by_table: HashMap<i64, Vec<String>> = HashMap::new();
    for raw in &raw_columns {
        if let Some((schema, table)) = table_names.get(&raw.table_oid) {
            out.columns.push(mapper::map_column(raw, schema, table));
            columns_by_table
                .entry(raw.table_oid)
                .or_default()
                .push(raw.name.clone());
        } else if let Some((schema, view)) = view_names.get(&raw.table_oid) {
            out.view_columns.push(mapper::map_view_column(raw, schema, view));
        }
    }
    hooks.checkpoint(ProgressStep::Columns, ProgressPhase::Done);

    let mut pk_marks: Vec<(String, String, Vec<String>, Option<String>)> = Vec::new();
    for constraint in &raw_constraints {
        let Some((schema, table)) = table_names.get(&constraint.table_oid) else {
            continue;
        };
        match constraint.kind.as_str() {
            "p" => {
                let constraint_name = (constraint.columns.len() > 1)
                    .then(|| constraint.name.clone());
                if constraint.columns.len() > 1 {
                    out.primary_keys.push(PrimaryKey {
                        schema: schema.clone(),
                        table: table.clone(),
                        name: constraint.name.clone(),
                        columns: constraint.columns.clone(),
                        name_explicit: true,
                    });
                }
                pk_marks.push((
                    schema.clone(),
                    table.clone(),
                    constraint.columns.clone(),
                    constraint_name,
                ));
            }
            "u" => out.unique_constraints.push(UniqueConstraint {
                schema: schema.clone(),
                table: table.clone(),
                name: constraint.name.clone(),
                columns: constraint.columns.clone(),
                name_explicit: true,
                nulls_distinct: constraint.nulls_distinct,
            }),
            "c" => out.check_constraints.push(CheckConstraint {
                schema: schema.clone(),
                table: table.clone(),
                name: constraint.name.clone(),
                expression: mapper::check_expression(&constraint.definition),
            }),
            "f" => {
                // Target resolution goes through the already-fetched table
                // list first; the row's own names cover targets outside the
                // retained namespaces.
                let (target_schema, target_table) = constraint
                    .target_oid
                    .and_then(|oid| table_names.get(&oid).cloned())
                    .or_else(|| {
                        constraint
                            .target_schema
                            .clone()
                            .zip(constraint.target_table.clone())
                    })
                    .unwrap_or_default();
                out.foreign_keys.push(ForeignKey {
                    schema: schema.clone(),
                    table: table.clone(),
                    name: constraint.name.clone(),
                    name_explicit: true,
                    columns: constraint.columns.clone(),
                    target_schema,
                    target_table,
                    target_columns: constraint.target_columns.clone(),
                    on_delete: mapper::fk_action(&constraint.on_delete),
                    on_update: mapper::fk_action(&constraint.on_update),
                });
            }
            _ => {}
        }
    }
    for (schema, table, members, constraint_name) in &pk_marks {
        for column in &mut out.columns {
            if column.schema == *schema
                && column.table == *table
                && members.contains(&column.name)
            {
                column.is_primary_key = true;
                column.not_null = true;
                column.pk_constraint_name = constraint_name.clone();
            }
        }
    }
    hooks.checkpoint(ProgressStep::Checks, ProgressPhase::Done);

    hooks.checkpoint(ProgressStep::Indexes, ProgressPhase::Fetching);
    let raw_indexes = queries::list_indexes(pool, &table_oids)
        .await
        .map_err(|err| hooks.query_failed("indexes", err))?;
    let no_columns = Vec::new();
    for raw in raw_indexes {
        let Some((schema, table)) = table_names.get(&raw.table_oid) else {
            continue;
        };
        let known = columns_by_table.get(&raw.table_oid).unwrap_or(&no_columns);
        let columns = mapper::parse_index_parts(&raw.definition, known);
        if columns.is_empty() {
            continue;
        }
        out.indexes.push(Index {
            schema: schema.clone(),
            table: table.clone(),
            name: raw.name,
            name_explicit: true,
            columns,
            is_unique: raw.is_unique,
            where_clause: raw.where_clause,
            concurrently: false,
            method: raw.method,
            with: raw.with_options,
            for_primary_key: raw.is_primary,
            for_unique_constraint: raw.backs_unique,
        });
    }
    hooks.checkpoint(ProgressStep::Indexes, ProgressPhase::Done);

    let mut allowed_views: HashSet<(String, String)> = HashSet::new();
    for view in &views {
        if !filter.allows(FilterTarget::Table {
            schema: &view.schema,
            name: &view.name,
        }) {
            continue;
        }
        allowed_views.insert((view.schema.clone(), view.name.clone()));
        out.views.push(View {
            schema: view.schema.clone(),
            name: view.name.clone(),
            definition: view.view_definition.clone(),
            with_options: mapper::parse_storage_options(view.reloptions.as_deref()),
            with_no_data: false,
            is_materialized: view.is_materialized_view(),
            tablespace: view.tablespace.clone(),
            using_method: view.using_method.clone(),
        });
    }
    out.view_columns
        .retain(|vc| allowed_views.contains(&(vc.schema.clone(), vc.view.clone())));
    hooks.checkpoint(ProgressStep::Views, ProgressPhase::Done);

    hooks.checkpoint(ProgressStep::Enums, ProgressPhase::Fetching);
    let raw_enums = queries::list_enums(pool, &namespace_oids)
        .await
        .map_err(|err| hooks.query_failed("enums", err))?;
    for raw in raw_enums {
        out.enums.push(EnumType {
            schema: raw.schema,
            name: raw.name,
            values: raw.labels,
        });
    }
    hooks.checkpoint(ProgressStep::Enums, ProgressPhase::Done);

    tracing::debug!(
        database,
        tables = out.tables.len(),
        columns = out.columns.len(),
        views = out.views.len(),
        enums = out.enums.len(),
        "catalog introspection complete"
    );
    Ok(out)
}
