//! Grammar and type utilities: SQL type decomposition, default-value
//! parsing/round-tripping, name derivation, and small hand-rolled scanners.

pub mod array_literal;
pub mod defaults;
pub mod expressions;
pub mod names;
pub mod sql_types;

pub use array_literal::{parse_array_literal, ArrayItem};
pub use defaults::{default_for_column, default_to_sql, trim_default_value_suffix};
pub use expressions::split_expressions;
pub use names::{
    default_name_for_fk, default_name_for_pk, default_name_for_unique, index_name,
    MAX_IDENTIFIER_BYTES,
};
pub use sql_types::{canonical_type_name, normalize_type_options, split_sql_type};
