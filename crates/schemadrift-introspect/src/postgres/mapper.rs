//! Pure mapping from raw catalog rows to interim-schema entities.

use std::collections::BTreeMap;

use schemadrift_core::grammar::{
    canonical_type_name, default_for_column, split_expressions, split_sql_type,
};
use schemadrift_core::schema::{
    Column, FkAction, Generated, GeneratedPersistence, Identity, IdentityKind, IndexColumn,
    ViewColumn,
};
use schemadrift_core::{EntityFilter, FilterTarget};

use super::queries::{RawColumn, RawNamespace};

/// Namespaces owned by the server rather than the application.
pub fn is_system_namespace(name: &str) -> bool {
    matches!(name, "pg_catalog" | "information_schema" | "pg_toast")
        || name.starts_with("pg_temp_")
        || name.starts_with("pg_toast_temp_")
}

/// Keep user namespaces the filter admits, in catalog order.
pub fn retained_namespaces(
    raw: Vec<RawNamespace>,
    filter: &EntityFilter,
) -> Vec<RawNamespace> {
    raw.into_iter()
        .filter(|ns| {
            !is_system_namespace(&ns.name) && filter.allows(FilterTarget::Schema { name: &ns.name })
        })
        .collect()
}

/// Split array suffixes off a formatted type and canonicalize the base.
pub fn decompose_type(data_type: &str, declared_dimensions: i32) -> (String, u32) {
    let mut base = data_type.trim();
    let mut dims: u32 = 0;
    while let Some(stripped) = base.strip_suffix("[]") {
        base = stripped;
        dims += 1;
    }
    // attndims is authoritative when format_type under-reports nesting.
    let dims = dims.max(declared_dimensions.max(0) as u32);

    // Split and rejoin so the option list gets the same canonical form the
    // declared side stores, including the numeric zero-scale strip.
    let (base_type, options) = split_sql_type(&canonical_type_name(base));
    let rebuilt = match options {
        Some(options) => match base_type.split_once(' ') {
            Some((head, rest)) => format!("{head}({options}) {rest}"),
            None => format!("{base_type}({options})"),
        },
        None => base_type,
    };
    (rebuilt, dims)
}

/// Reclassify an integer column as its serial pseudo-type when the default is
/// a `nextval` on an implicitly named sequence.
///
/// Matched by prefix and suffix, never by exact equality: the table or column
/// may have been renamed while the sequence kept its original name.
pub fn serial_reclassify(sql_type: &str, default: Option<&str>) -> Option<&'static str> {
    let default = default?;
    if !default.starts_with("nextval('") || !default.ends_with("_seq'::regclass)") {
        return None;
    }
    match sql_type {
        "smallint" | "int2" => Some("smallserial"),
        "integer" | "int4" => Some("serial"),
        "bigint" | "int8" => Some("bigserial"),
        _ => None,
    }
}

fn integer_bounds(sql_type: &str) -> (&'static str, &'static str) {
    match sql_type {
        "smallint" => ("-32768", "32767"),
        "integer" => ("-2147483648", "2147483647"),
        _ => ("-9223372036854775808", "9223372036854775807"),
    }
}

fn map_identity(raw: &RawColumn, sql_type: &str) -> Option<Identity> {
    let kind = match raw.identity_kind.as_str() {
        "a" => IdentityKind::Always,
        "d" => IdentityKind::ByDefault,
        _ => return None,
    };
    let (type_min, type_max) = integer_bounds(sql_type);
    let increment = raw
        .identity_increment
        .clone()
        .unwrap_or_else(|| "1".to_string());
    let descending = increment.starts_with('-');
    let min_value = raw.identity_minimum.clone().unwrap_or_else(|| {
        if descending { type_min } else { "1" }.to_string()
    });
    let max_value = raw.identity_maximum.clone().unwrap_or_else(|| {
        if descending { "-1" } else { type_max }.to_string()
    });
    let start_with = raw.identity_start.clone().unwrap_or_else(|| {
        if descending {
            max_value.clone()
        } else {
            min_value.clone()
        }
    });

    Some(Identity {
        kind,
        sequence_name: None,
        increment,
        start_with,
        min_value,
        max_value,
        cache_size: "1".to_string(),
        cycles: raw.identity_cycles.unwrap_or(false),
    })
}

pub fn map_column(raw: &RawColumn, schema: &str, table: &str) -> Column {
    let (mut sql_type, dimensions) = if raw.is_enum {
        (
            raw.type_name.clone(),
            raw.declared_dimensions.max(0) as u32,
        )
    } else {
        decompose_type(&raw.data_type, raw.declared_dimensions)
    };
    let type_schema = (raw.type_schema != "pg_catalog").then(|| raw.type_schema.clone());

    let identity = map_identity(raw, &sql_type);
    let generated = (raw.is_generated)
        .then(|| raw.default_expression.clone())
        .flatten()
        .map(|expression| Generated {
            expression,
            persistence: GeneratedPersistence::Stored,
        });

    let default = if identity.is_some() || generated.is_some() {
        None
    } else if let Some(serial) =
        serial_reclassify(&sql_type, raw.default_expression.as_deref())
    {
        sql_type = serial.to_string();
        None
    } else {
        raw.default_expression
            .as_deref()
            .and_then(|expr| default_for_column(&sql_type, expr, dimensions))
    };

    Column {
        schema: schema.to_string(),
        table: table.to_string(),
        name: raw.name.clone(),
        sql_type,
        type_schema,
        dimensions,
        is_primary_key: false,
        pk_constraint_name: None,
        not_null: raw.not_null,
        default,
        generated,
        is_unique: false,
        unique_constraint_name: None,
        unique_nulls_distinct: true,
        identity,
    }
}

pub fn map_view_column(raw: &RawColumn, schema: &str, view: &str) -> ViewColumn {
    let (sql_type, _) = decompose_type(&raw.data_type, raw.declared_dimensions);
    ViewColumn {
        schema: schema.to_string(),
        view: view.to_string(),
        name: raw.name.clone(),
        sql_type,
        not_null: raw.not_null,
    }
}

/// Parse `reloptions` text (`k=v,k=v`) into the storage-parameter bag.
pub fn parse_storage_options(raw: Option<&str>) -> Option<BTreeMap<String, String>> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    let mut options = BTreeMap::new();
    for pair in raw.split(',') {
        if let Some((key, value)) = pair.split_once('=') {
            options.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
    (!options.is_empty()).then_some(options)
}

/// Extract the key-column list of a `pg_get_indexdef` rendering and parse
/// each part into an index column.
pub fn parse_index_parts(definition: &str, columns: &[String]) -> Vec<IndexColumn> {
    let Some(inner) = index_expression_list(definition) else {
        return Vec::new();
    };
    split_expressions(inner)
        .iter()
        .map(|part| parse_index_part(part, columns))
        .collect()
}

fn index_expression_list(definition: &str) -> Option<&str> {
    let using = definition.find(" USING ")?;
    let tail = &definition[using..];
    let open = tail.find('(')?;
    let mut depth = 0usize;
    for (offset, ch) in tail[open..].char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&tail[open + 1..open + offset]);
                }
            }
            _ => {}
        }
    }
    None
}

fn parse_index_part(part: &str, columns: &[String]) -> IndexColumn {
    let mut text = part.trim();
    let mut nulls_explicit: Option<bool> = None;
    if let Some(stripped) = text.strip_suffix(" NULLS FIRST") {
        text = stripped.trim_end();
        nulls_explicit = Some(true);
    } else if let Some(stripped) = text.strip_suffix(" NULLS LAST") {
        text = stripped.trim_end();
        nulls_explicit = Some(false);
    }
    let mut ascending = true;
    if let Some(stripped) = text.strip_suffix(" DESC") {
        text = stripped.trim_end();
        ascending = false;
    } else if let Some(stripped) = text.strip_suffix(" ASC") {
        text = stripped.trim_end();
    }

    let (value, is_expression, op_class) = classify_index_target(text, columns);

    IndexColumn {
        value,
        is_expression,
        ascending,
        nulls_first: nulls_explicit.unwrap_or(!ascending),
        op_class,
    }
}

fn classify_index_target(
    text: &str,
    columns: &[String],
) -> (String, bool, Option<String>) {
    let unquoted = unquote_identifier(text);
    if columns.iter().any(|column| *column == unquoted) {
        return (unquoted, false, None);
    }
    // `column opclass` form: the trailing token is a bare identifier.
    if let Some((head, tail)) = text.rsplit_once(' ') {
        let head_name = unquote_identifier(head.trim_end());
        if is_bare_identifier(tail) && columns.iter().any(|column| *column == head_name) {
            return (head_name, false, Some(tail.to_string()));
        }
    }
    (text.to_string(), true, None)
}

fn unquote_identifier(raw: &str) -> String {
    let raw = raw.trim();
    match raw.strip_prefix('"').and_then(|rest| rest.strip_suffix('"')) {
        Some(inner) => inner.replace("\"\"", "\""),
        None => raw.to_string(),
    }
}

fn is_bare_identifier(token: &str) -> bool {
    !token.is_empty()
        && token
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}

/// Strip the `CHECK (...)` shell of a constraint definition down to the
/// parenthesized expression.
pub fn check_expression(definition: &str) -> String {
    let body = definition
        .strip_prefix("CHECK ")
        .unwrap_or(definition)
        .trim();
    match body.strip_prefix('(').and_then(|rest| rest.strip_suffix(')')) {
        Some(inner) => inner.to_string(),
        None => body.to_string(),
    }
}

pub fn fk_action(code: &str) -> FkAction {
    match code {
        "c" => FkAction::Cascade,
        "r" => FkAction::Restrict,
        "n" => FkAction::SetNull,
        "d" => FkAction::SetDefault,
        _ => FkAction::NoAction,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemadrift_core::{EntityFilter, ExistingEntities, FilterConfig};

    fn namespaces(names: &[&str]) -> Vec<RawNamespace> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| RawNamespace {
                oid: i as i64 + 1,
                name: name.to_string(),
            })
            .collect()
    }

    #[test]
    fn system_namespaces_are_classified() {
        assert!(is_system_namespace("pg_catalog"));
        assert!(is_system_namespace("information_schema"));
        assert!(is_system_namespace("pg_toast"));
        assert!(is_system_namespace("pg_temp_3"));
        assert!(is_system_namespace("pg_toast_temp_1"));
        assert!(!is_system_namespace("public"));
        assert!(!is_system_namespace("pgx_data"));
    }

    #[test]
    fn retention_drops_system_and_filtered_namespaces() {
        let raw = namespaces(&["pg_catalog", "public", "internal", "pg_toast"]);
        let config = FilterConfig {
            schemas: vec!["!internal".to_string()],
            ..FilterConfig::default()
        };
        let filter = EntityFilter::prepare(&config, ExistingEntities::default()).unwrap();
        let kept = retained_namespaces(raw, &filter);
        let names: Vec<&str> = kept.iter().map(|ns| ns.name.as_str()).collect();
        assert_eq!(names, vec!["public"]);
    }

    #[test]
    fn retention_can_empty_out_entirely() {
        let raw = namespaces(&["pg_catalog", "pg_toast", "information_schema"]);
        let kept = retained_namespaces(raw, &EntityFilter::allow_all());
        assert!(kept.is_empty());
    }

    #[test]
    fn serial_heuristic_survives_renames() {
        assert_eq!(
            serial_reclassify("integer", Some("nextval('users_id_seq'::regclass)")),
            Some("serial")
        );
        // Renamed table: the sequence keeps its original name.
        assert_eq!(
            serial_reclassify("bigint", Some("nextval('old_name_id_seq'::regclass)")),
            Some("bigserial")
        );
        assert_eq!(
            serial_reclassify("smallint", Some("nextval('t_n_seq'::regclass)")),
            Some("smallserial")
        );
        assert_eq!(serial_reclassify("integer", Some("nextval('gen'::regclass)")), None);
        assert_eq!(serial_reclassify("text", Some("nextval('t_c_seq'::regclass)")), None);
        assert_eq!(serial_reclassify("integer", None), None);
    }

    #[test]
    fn type_decomposition_canonicalizes() {
        assert_eq!(
            decompose_type("character varying(100)", 0),
            ("varchar(100)".to_string(), 0)
        );
        assert_eq!(
            decompose_type("timestamp without time zone", 0),
            ("timestamp".to_string(), 0)
        );
        assert_eq!(decompose_type("integer[]", 1), ("integer".to_string(), 1));
        // attndims wins when format_type under-reports.
        assert_eq!(decompose_type("text[]", 2), ("text".to_string(), 2));
        assert_eq!(
            decompose_type("numeric(10, 2)", 0),
            ("numeric(10,2)".to_string(), 0)
        );
        // Zero scale reads back in the same form the declared side stores.
        assert_eq!(
            decompose_type("numeric(6,0)", 0),
            ("numeric(6)".to_string(), 0)
        );
        assert_eq!(
            decompose_type("timestamp(6) with time zone", 0),
            ("timestamp(6) with time zone".to_string(), 0)
        );
    }

    #[test]
    fn index_definition_parses_columns_and_expressions() {
        let columns = vec!["email".to_string(), "created_at".to_string()];
        let parts = parse_index_parts(
            "CREATE INDEX users_idx ON public.users USING btree (email, created_at DESC, lower((email)::text))",
            &columns,
        );
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].value, "email");
        assert!(!parts[0].is_expression);
        assert!(parts[0].ascending);
        assert!(!parts[0].nulls_first);

        assert_eq!(parts[1].value, "created_at");
        assert!(!parts[1].ascending);
        assert!(parts[1].nulls_first);

        assert_eq!(parts[2].value, "lower((email)::text)");
        assert!(parts[2].is_expression);
    }

    #[test]
    fn index_definition_parses_op_class_and_nulls() {
        let columns = vec!["embedding".to_string(), "name".to_string()];
        let parts = parse_index_parts(
            "CREATE INDEX e_idx ON public.e USING hnsw (embedding vector_cosine_ops, name NULLS FIRST)",
            &columns,
        );
        assert_eq!(parts[0].value, "embedding");
        assert_eq!(parts[0].op_class.as_deref(), Some("vector_cosine_ops"));
        assert!(!parts[0].is_expression);
        assert!(parts[1].ascending);
        assert!(parts[1].nulls_first);
    }

    #[test]
    fn quoted_identifiers_are_unquoted() {
        let columns = vec!["createdAt".to_string()];
        let parts = parse_index_parts(
            "CREATE INDEX t_idx ON public.t USING btree (\"createdAt\")",
            &columns,
        );
        assert_eq!(parts[0].value, "createdAt");
        assert!(!parts[0].is_expression);
    }

    #[test]
    fn storage_options_parse_to_bag() {
        let options = parse_storage_options(Some("fillfactor=70,autovacuum_enabled=false"));
        let options = options.unwrap();
        assert_eq!(options.get("fillfactor").map(String::as_str), Some("70"));
        assert_eq!(
            options.get("autovacuum_enabled").map(String::as_str),
            Some("false")
        );
        assert!(parse_storage_options(None).is_none());
        assert!(parse_storage_options(Some("")).is_none());
    }

    #[test]
    fn check_definitions_lose_their_shell() {
        assert_eq!(check_expression("CHECK ((price > 0))"), "(price > 0)");
        assert_eq!(check_expression("CHECK (a = b)"), "a = b");
    }
}
