//! Core contracts and helpers for schemadrift.
//!
//! This crate defines the canonical interim schema, the entity filter engine,
//! the grammar/type utilities, and validation helpers shared by the dialect
//! adapters and the database introspector.

pub mod casing;
pub mod diagnostics;
pub mod error;
pub mod filter;
pub mod grammar;
pub mod schema;
pub mod validation;

pub use casing::Casing;
pub use diagnostics::{AdapterIssue, Severity};
pub use error::{Error, Result};
pub use filter::{EntityFilter, ExistingEntities, Extension, FilterConfig, FilterTarget, Provider, RolesConfig};
pub use schema::{
    CheckConstraint, Column, ColumnDefault, DefaultKind, EnumType, FkAction, ForeignKey, Generated,
    GeneratedPersistence, Identity, IdentityKind, Index, IndexColumn, InterimSchema, Permissiveness,
    Policy, PolicyCommand, PrimaryKey, Privilege, Role, SchemaEntity, Sequence, Table,
    UniqueConstraint, View, ViewColumn,
};
pub use validation::validate_interim;

/// Current contract version for persisted interim-schema snapshots.
pub const SCHEMA_VERSION: &str = "0.1";
