use async_trait::async_trait;

use schemadrift_core::{EntityFilter, InterimSchema, Result};

use crate::hooks::IntrospectHooks;

/// Trait implemented by database engines that can be introspected into the
/// interim schema.
#[async_trait]
pub trait Introspector {
    /// Returns the engine identifier (e.g. `postgres`).
    fn engine(&self) -> &'static str;

    /// Read the live catalog and return an interim schema snapshot.
    async fn introspect(
        &self,
        database: &str,
        filter: &EntityFilter,
        hooks: &IntrospectHooks<'_>,
    ) -> Result<InterimSchema>;
}
