//! Dialect adapters: declared in-code schema objects projected into the
//! canonical interim schema.

pub mod declared;
pub mod postgres;
pub mod render;

use schemadrift_core::{AdapterIssue, Casing, EntityFilter, InterimSchema, Result};

use crate::declared::DeclaredSchema;

pub use postgres::PostgresAdapter;
pub use render::{SqlRenderer, StaticRenderer};

/// Result of one adapter invocation: the projected schema plus the collected
/// entity-level diagnostics. Collected errors never abort the walk; the
/// caller decides policy.
#[derive(Debug)]
pub struct AdapterRun {
    pub schema: InterimSchema,
    pub errors: Vec<AdapterIssue>,
    pub warnings: Vec<AdapterIssue>,
}

/// Trait implemented by dialect adapters that project declared schemas.
pub trait DialectAdapter {
    /// Returns the engine identifier (e.g. `postgres`).
    fn engine(&self) -> &'static str;

    /// Project the declared object graph into an interim schema.
    fn from_declared(
        &self,
        declared: &DeclaredSchema,
        casing: Casing,
        filter: &EntityFilter,
    ) -> Result<AdapterRun>;
}
