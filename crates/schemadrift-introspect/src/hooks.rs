//! Observer hooks for long-running introspection.
//!
//! Both hooks are side channels. Their absence changes observability only,
//! never the introspection result.

use schemadrift_core::Error;

/// Catalog area a progress checkpoint refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressStep {
    Tables,
    Columns,
    Checks,
    Indexes,
    Views,
    Enums,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressPhase {
    Fetching,
    Done,
}

/// Optional callbacks threaded through an introspection run.
#[derive(Default)]
pub struct IntrospectHooks<'a> {
    pub progress: Option<&'a (dyn Fn(ProgressStep, ProgressPhase) + Send + Sync)>,
    /// Called with the logical query id before a failed query's error is
    /// re-thrown.
    pub on_query_error: Option<&'a (dyn Fn(&str, &Error) + Send + Sync)>,
}

impl<'a> IntrospectHooks<'a> {
    pub fn checkpoint(&self, step: ProgressStep, phase: ProgressPhase) {
        if let Some(progress) = self.progress {
            progress(step, phase);
        }
    }

    /// Annotate a query failure and hand the error back for propagation.
    pub fn query_failed(&self, query_id: &str, error: Error) -> Error {
        tracing::warn!(query = query_id, %error, "catalog query failed");
        if let Some(observer) = self.on_query_error {
            observer(query_id, &error);
        }
        error
    }
}
