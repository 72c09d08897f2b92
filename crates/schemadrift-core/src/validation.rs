use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Error, Result};
use crate::schema::InterimSchema;

/// Validate internal consistency of an interim schema.
///
/// Adapters and the introspector never prevent duplicates structurally;
/// this pass is where naming collisions and dangling references surface:
/// - duplicate schemas/tables/columns
/// - primary-key and foreign-key columns that do not exist
/// - foreign-key targets that do not exist
pub fn validate_interim(schema: &InterimSchema) -> Result<()> {
    let mut schema_names = BTreeSet::new();
    for entity in &schema.schemas {
        if !schema_names.insert(entity.name.as_str()) {
            return Err(Error::InvalidSchema(format!(
                "duplicate schema name: {}",
                entity.name
            )));
        }
    }

    let mut catalog: BTreeMap<(&str, &str), BTreeSet<&str>> = BTreeMap::new();
    for table in &schema.tables {
        let key = (table.schema.as_str(), table.name.as_str());
        if catalog.contains_key(&key) {
            return Err(Error::InvalidSchema(format!(
                "duplicate table name: {}.{}",
                table.schema, table.name
            )));
        }
        catalog.insert(key, BTreeSet::new());
    }

    for column in &schema.columns {
        let key = (column.schema.as_str(), column.table.as_str());
        let columns = catalog.get_mut(&key).ok_or_else(|| {
            Error::InvalidSchema(format!(
                "column {}.{}.{} belongs to an unknown table",
                column.schema, column.table, column.name
            ))
        })?;
        if !columns.insert(column.name.as_str()) {
            return Err(Error::InvalidSchema(format!(
                "duplicate column name: {}.{}.{}",
                column.schema, column.table, column.name
            )));
        }
    }

    for pk in &schema.primary_keys {
        let columns = catalog
            .get(&(pk.schema.as_str(), pk.table.as_str()))
            .ok_or_else(|| {
                Error::InvalidSchema(format!(
                    "primary key {} names an unknown table {}.{}",
                    pk.name, pk.schema, pk.table
                ))
            })?;
        if pk.columns.is_empty() {
            return Err(Error::InvalidSchema(format!(
                "primary key {} has no columns",
                pk.name
            )));
        }
        for column in &pk.columns {
            if !columns.contains(column.as_str()) {
                return Err(Error::InvalidSchema(format!(
                    "primary key column not found: {}.{}.{}",
                    pk.schema, pk.table, column
                )));
            }
        }
    }

    for fk in &schema.foreign_keys {
        if fk.columns.len() != fk.target_columns.len() {
            return Err(Error::InvalidSchema(format!(
                "foreign key {} has mismatched column counts",
                fk.name
            )));
        }

        let columns = catalog
            .get(&(fk.schema.as_str(), fk.table.as_str()))
            .ok_or_else(|| {
                Error::InvalidSchema(format!(
                    "foreign key {} names an unknown table {}.{}",
                    fk.name, fk.schema, fk.table
                ))
            })?;
        for column in &fk.columns {
            if !columns.contains(column.as_str()) {
                return Err(Error::InvalidSchema(format!(
                    "foreign key column not found: {}.{}.{}",
                    fk.schema, fk.table, column
                )));
            }
        }

        let target_columns = catalog
            .get(&(fk.target_schema.as_str(), fk.target_table.as_str()))
            .ok_or_else(|| {
                Error::InvalidSchema(format!(
                    "referenced table not found: {}.{}",
                    fk.target_schema, fk.target_table
                ))
            })?;
        for column in &fk.target_columns {
            if !target_columns.contains(column.as_str()) {
                return Err(Error::InvalidSchema(format!(
                    "referenced column not found: {}.{}.{}",
                    fk.target_schema, fk.target_table, column
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Column, ForeignKey, FkAction, PrimaryKey, Table};

    fn table(schema: &str, name: &str) -> Table {
        Table {
            schema: schema.to_string(),
            name: name.to_string(),
            is_rls_enabled: false,
        }
    }

    fn column(schema: &str, table: &str, name: &str) -> Column {
        Column {
            schema: schema.to_string(),
            table: table.to_string(),
            name: name.to_string(),
            sql_type: "text".to_string(),
            type_schema: None,
            dimensions: 0,
            is_primary_key: false,
            pk_constraint_name: None,
            not_null: false,
            default: None,
            generated: None,
            is_unique: false,
            unique_constraint_name: None,
            unique_nulls_distinct: true,
            identity: None,
        }
    }

    #[test]
    fn accepts_consistent_schema() {
        let mut schema = InterimSchema::empty();
        schema.tables.push(table("public", "users"));
        schema.columns.push(column("public", "users", "id"));
        schema.primary_keys.push(PrimaryKey {
            schema: "public".into(),
            table: "users".into(),
            name: "users_id_pk".into(),
            columns: vec!["id".into()],
            name_explicit: false,
        });
        assert!(validate_interim(&schema).is_ok());
    }

    #[test]
    fn rejects_duplicate_tables() {
        let mut schema = InterimSchema::empty();
        schema.tables.push(table("public", "users"));
        schema.tables.push(table("public", "users"));
        assert!(validate_interim(&schema).is_err());
    }

    #[test]
    fn rejects_dangling_fk_target() {
        let mut schema = InterimSchema::empty();
        schema.tables.push(table("public", "posts"));
        schema.columns.push(column("public", "posts", "author_id"));
        schema.foreign_keys.push(ForeignKey {
            schema: "public".into(),
            table: "posts".into(),
            name: "posts_author_id_users_id_fk".into(),
            name_explicit: false,
            columns: vec!["author_id".into()],
            target_schema: "public".into(),
            target_table: "users".into(),
            target_columns: vec!["id".into()],
            on_delete: FkAction::NoAction,
            on_update: FkAction::NoAction,
        });
        assert!(validate_interim(&schema).is_err());
    }
}
