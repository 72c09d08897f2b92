//! Raw catalog queries.
//!
//! Relation scoping inlines oid lists as comma-joined literals instead of
//! bound parameters; the lists come from `pg_class`/`pg_namespace`, never
//! from user input.

use sqlx::{PgPool, Row};

use schemadrift_core::{Error, Result};

fn db_err(err: sqlx::Error) -> Error {
    Error::Db(err.to_string())
}

fn oid_list(oids: &[i64]) -> String {
    let rendered: Vec<String> = oids.iter().map(i64::to_string).collect();
    rendered.join(",")
}

pub struct RawNamespace {
    pub oid: i64,
    pub name: String,
}

pub async fn list_namespaces(pool: &PgPool) -> Result<Vec<RawNamespace>> {
    let rows = sqlx::query(
        r#"
        select n.oid::int8 as oid, n.nspname::text as name
        from pg_namespace n
        order by n.nspname
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(db_err)?;

    rows.iter()
        .map(|row| {
            Ok(RawNamespace {
                oid: row.try_get("oid").map_err(db_err)?,
                name: row.try_get("name").map_err(db_err)?,
            })
        })
        .collect()
}

pub struct RawRelation {
    pub oid: i64,
    pub schema: String,
    pub name: String,
    pub relkind: String,
    pub rls_enabled: bool,
    pub view_definition: Option<String>,
    pub reloptions: Option<String>,
    pub tablespace: Option<String>,
    pub using_method: Option<String>,
}

impl RawRelation {
    pub fn is_table(&self) -> bool {
        matches!(self.relkind.as_str(), "r" | "p")
    }

    pub fn is_materialized_view(&self) -> bool {
        self.relkind == "m"
    }
}

/// Tables and views of the retained namespaces in one combined query.
pub async fn list_relations(pool: &PgPool, namespace_oids: &[i64]) -> Result<Vec<RawRelation>> {
    if namespace_oids.is_empty() {
        return Ok(Vec::new());
    }
    let sql = format!(
        r#"
        select
          c.oid::int8 as oid,
          n.nspname::text as schema,
          c.relname::text as name,
          c.relkind::text as relkind,
          c.relrowsecurity as rls_enabled,
          case when c.relkind in ('v','m') then pg_get_viewdef(c.oid, true) end as view_definition,
          array_to_string(c.reloptions, ',') as reloptions,
          ts.spcname::text as tablespace,
          case when c.relkind = 'm' then am.amname::text end as using_method
        from pg_class c
        join pg_namespace n on n.oid = c.relnamespace
        left join pg_tablespace ts on ts.oid = c.reltablespace
        left join pg_am am on am.oid = c.relam
        where c.relnamespace in ({ids})
          and c.relkind in ('r','p','v','m')
        order by n.nspname, c.relname
        "#,
        ids = oid_list(namespace_oids)
    );
    let rows = sqlx::query(&sql).fetch_all(pool).await.map_err(db_err)?;

    rows.iter()
        .map(|row| {
            Ok(RawRelation {
                oid: row.try_get("oid").map_err(db_err)?,
                schema: row.try_get("schema").map_err(db_err)?,
                name: row.try_get("name").map_err(db_err)?,
                relkind: row.try_get("relkind").map_err(db_err)?,
                rls_enabled: row.try_get("rls_enabled").map_err(db_err)?,
                view_definition: row.try_get("view_definition").map_err(db_err)?,
                reloptions: row.try_get("reloptions").map_err(db_err)?,
                tablespace: row.try_get("tablespace").map_err(db_err)?,
                using_method: row.try_get("using_method").map_err(db_err)?,
            })
        })
        .collect()
}

pub struct RawColumn {
    pub table_oid: i64,
    pub name: String,
    pub data_type: String,
    pub declared_dimensions: i32,
    pub not_null: bool,
    pub default_expression: Option<String>,
    /// `a` (always), `d` (by default) or empty.
    pub identity_kind: String,
    pub is_generated: bool,
    pub is_enum: bool,
    pub type_schema: String,
    pub type_name: String,
    pub identity_start: Option<String>,
    pub identity_increment: Option<String>,
    pub identity_minimum: Option<String>,
    pub identity_maximum: Option<String>,
    pub identity_cycles: Option<bool>,
}

pub async fn list_columns(pool: &PgPool, relation_oids: &[i64]) -> Result<Vec<RawColumn>> {
    if relation_oids.is_empty() {
        return Ok(Vec::new());
    }
    let sql = format!(
        r#"
        select
          a.attrelid::int8 as table_oid,
          a.attname::text as name,
          pg_catalog.format_type(a.atttypid, a.atttypmod) as data_type,
          a.attndims::int4 as declared_dimensions,
          a.attnotnull as not_null,
          pg_get_expr(ad.adbin, ad.adrelid) as default_expression,
          a.attidentity::text as identity_kind,
          (a.attgenerated <> '') as is_generated,
          (t.typtype = 'e') as is_enum,
          tn.nspname::text as type_schema,
          t.typname::text as type_name,
          ic.identity_start::text as identity_start,
          ic.identity_increment::text as identity_increment,
          ic.identity_minimum::text as identity_minimum,
          ic.identity_maximum::text as identity_maximum,
          (ic.identity_cycle = 'YES') as identity_cycles
        from pg_attribute a
        join pg_class c on c.oid = a.attrelid
        join pg_namespace n on n.oid = c.relnamespace
        join pg_type t on t.oid = a.atttypid
        join pg_namespace tn on tn.oid = t.typnamespace
        left join pg_attrdef ad on ad.adrelid = a.attrelid and ad.adnum = a.attnum
        left join information_schema.columns ic
          on ic.table_schema = n.nspname
         and ic.table_name = c.relname
         and ic.column_name = a.attname
        where a.attrelid in ({ids})
          and a.attnum > 0
          and not a.attisdropped
        order by a.attrelid, a.attnum
        "#,
        ids = oid_list(relation_oids)
    );
    let rows = sqlx::query(&sql).fetch_all(pool).await.map_err(db_err)?;

    rows.iter()
        .map(|row| {
            Ok(RawColumn {
                table_oid: row.try_get("table_oid").map_err(db_err)?,
                name: row.try_get("name").map_err(db_err)?,
                data_type: row.try_get("data_type").map_err(db_err)?,
                declared_dimensions: row.try_get("declared_dimensions").map_err(db_err)?,
                not_null: row.try_get("not_null").map_err(db_err)?,
                default_expression: row.try_get("default_expression").map_err(db_err)?,
                identity_kind: row.try_get("identity_kind").map_err(db_err)?,
                is_generated: row.try_get("is_generated").map_err(db_err)?,
                is_enum: row.try_get("is_enum").map_err(db_err)?,
                type_schema: row.try_get("type_schema").map_err(db_err)?,
                type_name: row.try_get("type_name").map_err(db_err)?,
                identity_start: row.try_get("identity_start").map_err(db_err)?,
                identity_increment: row.try_get("identity_increment").map_err(db_err)?,
                identity_minimum: row.try_get("identity_minimum").map_err(db_err)?,
                identity_maximum: row.try_get("identity_maximum").map_err(db_err)?,
                identity_cycles: row.try_get("identity_cycles").map_err(db_err)?,
            })
        })
        .collect()
}

pub struct RawConstraint {
    pub table_oid: i64,
    pub name: String,
    /// `p`, `u`, `c` or `f`.
    pub kind: String,
    pub columns: Vec<String>,
    pub target_oid: Option<i64>,
    pub target_schema: Option<String>,
    pub target_table: Option<String>,
    pub target_columns: Vec<String>,
    pub on_update: String,
    pub on_delete: String,
    pub definition: String,
    pub nulls_distinct: bool,
}

pub async fn list_constraints(pool: &PgPool, table_oids: &[i64]) -> Result<Vec<RawConstraint>> {
    if table_oids.is_empty() {
        return Ok(Vec::new());
    }
    let sql = format!(
        r#"
        select
          con.conrelid::int8 as table_oid,
          con.conname::text as name,
          con.contype::text as kind,
          cols.names as columns,
          nullif(con.confrelid, 0)::int8 as target_oid,
          ref_n.nspname::text as target_schema,
          ref_c.relname::text as target_table,
          refs.names as target_columns,
          con.confupdtype::text as on_update,
          con.confdeltype::text as on_delete,
          pg_get_constraintdef(con.oid, true) as definition,
          -- indnullsnotdistinct only exists on server 15+; the jsonb read
          -- yields null on older servers and coalesces to the default.
          coalesce(
            (select not (to_jsonb(i) ->> 'indnullsnotdistinct')::boolean
             from pg_index i where i.indexrelid = con.conindid),
            true
          ) as nulls_distinct
        from pg_constraint con
        left join pg_class ref_c on ref_c.oid = con.confrelid
        left join pg_namespace ref_n on ref_n.oid = ref_c.relnamespace
        left join lateral (
          select array_agg(att.attname::text order by ord.ordinality) as names
          from unnest(con.conkey) with ordinality as ord(attnum, ordinality)
          join pg_attribute att on att.attrelid = con.conrelid and att.attnum = ord.attnum
        ) cols on true
        left join lateral (
          select array_agg(att.attname::text order by ord.ordinality) as names
          from unnest(con.confkey) with ordinality as ord(attnum, ordinality)
          join pg_attribute att on att.attrelid = con.confrelid and att.attnum = ord.attnum
        ) refs on true
        where con.conrelid in ({ids})
          and con.contype in ('p','u','c','f')
        order by con.conrelid, con.conname
        "#,
        ids = oid_list(table_oids)
    );
    let rows = sqlx::query(&sql).fetch_all(pool).await.map_err(db_err)?;

    rows.iter()
        .map(|row| {
            let columns: Option<Vec<String>> = row.try_get("columns").map_err(db_err)?;
            let target_columns: Option<Vec<String>> =
                row.try_get("target_columns").map_err(db_err)?;
            Ok(RawConstraint {
                table_oid: row.try_get("table_oid").map_err(db_err)?,
                name: row.try_get("name").map_err(db_err)?,
                kind: row.try_get("kind").map_err(db_err)?,
                columns: columns.unwrap_or_default(),
                target_oid: row.try_get("target_oid").map_err(db_err)?,
                target_schema: row.try_get("target_schema").map_err(db_err)?,
                target_table: row.try_get("target_table").map_err(db_err)?,
                target_columns: target_columns.unwrap_or_default(),
                on_update: row.try_get("on_update").map_err(db_err)?,
                on_delete: row.try_get("on_delete").map_err(db_err)?,
                definition: row.try_get("definition").map_err(db_err)?,
                nulls_distinct: row.try_get("nulls_distinct").map_err(db_err)?,
            })
        })
        .collect()
}

pub struct RawIndex {
    pub table_oid: i64,
    pub name: String,
    pub is_unique: bool,
    pub is_primary: bool,
    pub method: String,
    pub where_clause: Option<String>,
    pub with_options: Option<String>,
    pub definition: String,
    pub backs_unique: bool,
}

pub async fn list_indexes(pool: &PgPool, table_oids: &[i64]) -> Result<Vec<RawIndex>> {
    if table_oids.is_empty() {
        return Ok(Vec::new());
    }
    let sql = format!(
        r#"
        select
          i.indrelid::int8 as table_oid,
          c_idx.relname::text as name,
          i.indisunique as is_unique,
          i.indisprimary as is_primary,
          am.amname::text as method,
          pg_get_expr(i.indpred, i.indrelid, true) as where_clause,
          array_to_string(c_idx.reloptions, ',') as with_options,
          pg_get_indexdef(i.indexrelid) as definition,
          exists (
            select 1 from pg_constraint uc
            where uc.conindid = i.indexrelid and uc.contype = 'u'
          ) as backs_unique
        from pg_index i
        join pg_class c_idx on c_idx.oid = i.indexrelid
        join pg_am am on am.oid = c_idx.relam
        where i.indrelid in ({ids})
          and i.indisvalid
        order by i.indrelid, c_idx.relname
        "#,
        ids = oid_list(table_oids)
    );
    let rows = sqlx::query(&sql).fetch_all(pool).await.map_err(db_err)?;

    rows.iter()
        .map(|row| {
            Ok(RawIndex {
                table_oid: row.try_get("table_oid").map_err(db_err)?,
                name: row.try_get("name").map_err(db_err)?,
                is_unique: row.try_get("is_unique").map_err(db_err)?,
                is_primary: row.try_get("is_primary").map_err(db_err)?,
                method: row.try_get("method").map_err(db_err)?,
                where_clause: row.try_get("where_clause").map_err(db_err)?,
                with_options: row.try_get("with_options").map_err(db_err)?,
                definition: row.try_get("definition").map_err(db_err)?,
                backs_unique: row.try_get("backs_unique").map_err(db_err)?,
            })
        })
        .collect()
}

pub struct RawEnum {
    pub schema: String,
    pub name: String,
    pub labels: Vec<String>,
}

pub async fn list_enums(pool: &PgPool, namespace_oids: &[i64]) -> Result<Vec<RawEnum>> {
    if namespace_oids.is_empty() {
        return Ok(Vec::new());
    }
    let sql = format!(
        r#"
        select
          n.nspname::text as schema,
          t.typname::text as name,
          array_agg(e.enumlabel::text order by e.enumsortorder) as labels
        from pg_type t
        join pg_namespace n on n.oid = t.typnamespace
        join pg_enum e on e.enumtypid = t.oid
        where t.typnamespace in ({ids})
        group by n.nspname, t.typname
        order by n.nspname, t.typname
        "#,
        ids = oid_list(namespace_oids)
    );
    let rows = sqlx::query(&sql).fetch_all(pool).await.map_err(db_err)?;

    rows.iter()
        .map(|row| {
            Ok(RawEnum {
                schema: row.try_get("schema").map_err(db_err)?,
                name: row.try_get("name").map_err(db_err)?,
                labels: row.try_get("labels").map_err(db_err)?,
            })
        })
        .collect()
}
