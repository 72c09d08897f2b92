use std::fmt;

use serde::{Deserialize, Serialize};

/// Severity of a collected adapter issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

/// Entity-level problems an adapter collects instead of throwing.
///
/// The offending entity is omitted (or left partially specified) and the walk
/// continues; the caller decides whether a collected error aborts the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum AdapterIssue {
    /// An index over a raw SQL expression was declared without a name; there
    /// is no way to derive one from an expression.
    IndexNoName {
        schema: String,
        table: String,
        expression: String,
    },
    /// A vector-typed column is indexed without an operator class; the
    /// database default silently builds a non-functional index.
    PgvectorIndexNoop {
        schema: String,
        table: String,
        column: String,
    },
    /// A standalone policy never got linked to a table and was dropped.
    PolicyNotLinked { policy: String },
}

impl AdapterIssue {
    pub fn severity(&self) -> Severity {
        match self {
            AdapterIssue::IndexNoName { .. } => Severity::Error,
            AdapterIssue::PgvectorIndexNoop { .. } => Severity::Warning,
            AdapterIssue::PolicyNotLinked { .. } => Severity::Warning,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AdapterIssue::IndexNoName { .. } => "index_no_name",
            AdapterIssue::PgvectorIndexNoop { .. } => "pgvector_index_noop",
            AdapterIssue::PolicyNotLinked { .. } => "policy_not_linked",
        }
    }
}

impl fmt::Display for AdapterIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdapterIssue::IndexNoName {
                schema,
                table,
                expression,
            } => write!(
                f,
                "index on {schema}.{table} uses expression `{expression}` and must be named explicitly"
            ),
            AdapterIssue::PgvectorIndexNoop {
                schema,
                table,
                column,
            } => write!(
                f,
                "index on vector column {schema}.{table}.{column} has no operator class and will not be used by queries"
            ),
            AdapterIssue::PolicyNotLinked { policy } => {
                write!(f, "policy `{policy}` is not linked to any table and was skipped")
            }
        }
    }
}
