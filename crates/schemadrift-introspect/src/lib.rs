//! Live-database catalog introspection.

pub mod hooks;
pub mod introspector;
pub mod postgres;
pub mod redaction;

pub use hooks::{IntrospectHooks, ProgressPhase, ProgressStep};
pub use introspector::Introspector;
pub use postgres::{introspect_postgres, PostgresIntrospector};
pub use redaction::redact_connection_string;

pub use schemadrift_core::InterimSchema;
