use sha2::{Digest, Sha256};

/// Postgres identifier length ceiling in bytes.
pub const MAX_IDENTIFIER_BYTES: usize = 63;

/// Default primary-key constraint name: `{table}_{columns}_pk`.
pub fn default_name_for_pk(table: &str, columns: &[String]) -> String {
    format!("{}_{}_pk", table, columns.join("_"))
}

/// Default unique-constraint name: `{table}_{columns}_unique`.
pub fn default_name_for_unique(table: &str, columns: &[String]) -> String {
    format!("{}_{}_unique", table, columns.join("_"))
}

/// Default index name: `{table}_{columns}_index`.
pub fn index_name(table: &str, columns: &[String]) -> String {
    format!("{}_{}_index", table, columns.join("_"))
}

/// Default foreign-key name:
/// `{table}_{columns}_{target_table}_{target_columns}_fk`, shortened to the
/// 63-byte ceiling when necessary.
pub fn default_name_for_fk(
    table: &str,
    columns: &[String],
    target_table: &str,
    target_columns: &[String],
) -> String {
    let name = format!(
        "{}_{}_{}_{}_fk",
        table,
        columns.join("_"),
        target_table,
        target_columns.join("_")
    );
    shrink_identifier(&name, table, "fk")
}

/// Deterministically shorten `name` to [`MAX_IDENTIFIER_BYTES`].
///
/// When the table prefix leaves room, the column/target portion is replaced
/// with a content hash of the full name; when the table name alone eats the
/// budget, the whole name collapses to `{suffix}_{hash}`. Repeated calls on
/// the same input reproduce the same output, which the diff engine relies on.
pub fn shrink_identifier(name: &str, table: &str, suffix: &str) -> String {
    if name.len() <= MAX_IDENTIFIER_BYTES {
        return name.to_string();
    }

    let digest = hex_digest(name);
    let with_prefix = format!("{}_{}_{}", table, &digest[..8], suffix);
    if with_prefix.len() <= MAX_IDENTIFIER_BYTES {
        with_prefix
    } else {
        format!("{}_{}", suffix, &digest[..12])
    }
}

fn hex_digest(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    digest.iter().map(|byte| format!("{byte:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn conventional_names() {
        assert_eq!(
            default_name_for_pk("users", &cols(&["org_id", "id"])),
            "users_org_id_id_pk"
        );
        assert_eq!(
            default_name_for_unique("users", &cols(&["email"])),
            "users_email_unique"
        );
        assert_eq!(
            index_name("users", &cols(&["email", "org_id"])),
            "users_email_org_id_index"
        );
        assert_eq!(
            default_name_for_fk("posts", &cols(&["author_id"]), "users", &cols(&["id"])),
            "posts_author_id_users_id_fk"
        );
    }

    #[test]
    fn long_fk_names_are_hash_shortened() {
        let columns = cols(&["really_long_column_name_one", "really_long_column_name_two"]);
        let name = default_name_for_fk(
            "a_table_with_a_fairly_long_name",
            &columns,
            "another_table_with_a_long_name",
            &cols(&["the_referenced_column_name"]),
        );
        assert!(name.len() <= MAX_IDENTIFIER_BYTES);
        assert!(name.starts_with("a_table_with_a_fairly_long_name_"));
        assert!(name.ends_with("_fk"));
    }

    #[test]
    fn shortening_is_deterministic() {
        let columns = cols(&["col_one_long_enough", "col_two_long_enough"]);
        let first = default_name_for_fk(
            "table_name_padding_padding_padding",
            &columns,
            "target_table_padding_padding",
            &cols(&["id"]),
        );
        let second = default_name_for_fk(
            "table_name_padding_padding_padding",
            &columns,
            "target_table_padding_padding",
            &cols(&["id"]),
        );
        assert_eq!(first, second);
        assert!(first.len() <= MAX_IDENTIFIER_BYTES);
    }

    #[test]
    fn oversized_table_name_collapses_whole_identifier() {
        let table = "t".repeat(70);
        let name = default_name_for_fk(&table, &cols(&["a"]), "users", &cols(&["id"]));
        assert!(name.len() <= MAX_IDENTIFIER_BYTES);
        assert!(name.starts_with("fk_"));
    }

    #[test]
    fn distinct_inputs_get_distinct_shortened_names() {
        let table = "a_table_with_a_fairly_long_name_used_for_testing";
        let first = default_name_for_fk(
            table,
            &cols(&["column_one_has_a_long_name"]),
            "target_one_table_name",
            &cols(&["id"]),
        );
        let second = default_name_for_fk(
            table,
            &cols(&["column_two_has_a_long_name"]),
            "target_two_table_name",
            &cols(&["id"]),
        );
        assert_ne!(first, second);
    }
}
