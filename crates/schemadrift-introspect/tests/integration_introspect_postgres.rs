//! DB-gated integration tests. They connect to the database named by
//! `TEST_DATABASE_URL` (or `DATABASE_URL`) and skip silently when neither is
//! set.

use std::sync::Mutex;

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;

use schemadrift_core::{validate_interim, EntityFilter, ExistingEntities, FilterConfig};
use schemadrift_introspect::{
    introspect_postgres, IntrospectHooks, InterimSchema, ProgressPhase, ProgressStep,
};

fn database_url() -> Option<String> {
    std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .ok()
}

#[tokio::test]
async fn introspects_and_round_trips_snapshot() -> Result<()> {
    let Some(url) = database_url() else {
        eprintln!("skipping: TEST_DATABASE_URL/DATABASE_URL not set");
        return Ok(());
    };
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await?;

    let seen = Mutex::new(Vec::new());
    let progress = |step: ProgressStep, phase: ProgressPhase| {
        seen.lock().unwrap().push((step, phase));
    };
    let hooks = IntrospectHooks {
        progress: Some(&progress),
        on_query_error: None,
    };

    let schema =
        introspect_postgres(&pool, "integration", &EntityFilter::allow_all(), &hooks).await?;
    validate_interim(&schema)?;

    let checkpoints = seen.lock().unwrap().clone();
    let fetching = checkpoints
        .iter()
        .position(|cp| *cp == (ProgressStep::Columns, ProgressPhase::Fetching));
    let done = checkpoints
        .iter()
        .position(|cp| *cp == (ProgressStep::Columns, ProgressPhase::Done));
    assert!(fetching.unwrap() < done.unwrap());

    let json = serde_json::to_string(&schema)?;
    let round_tripped: InterimSchema = serde_json::from_str(&json)?;
    assert_eq!(serde_json::to_string(&round_tripped)?, json);
    Ok(())
}

#[tokio::test]
async fn excluding_every_schema_short_circuits() -> Result<()> {
    let Some(url) = database_url() else {
        eprintln!("skipping: TEST_DATABASE_URL/DATABASE_URL not set");
        return Ok(());
    };
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await?;

    let config = FilterConfig {
        schemas: vec!["!*".to_string()],
        ..FilterConfig::default()
    };
    let filter = EntityFilter::prepare(&config, ExistingEntities::default())?;

    let seen = Mutex::new(Vec::new());
    let progress = |step: ProgressStep, phase: ProgressPhase| {
        seen.lock().unwrap().push((step, phase));
    };
    let hooks = IntrospectHooks {
        progress: Some(&progress),
        on_query_error: None,
    };

    let schema = introspect_postgres(&pool, "integration", &filter, &hooks).await?;
    assert!(schema.tables.is_empty());
    assert!(schema.columns.is_empty());
    assert!(schema.views.is_empty());
    assert!(schema.enums.is_empty());
    // Nothing retained means no further catalog queries and no checkpoints.
    assert!(seen.lock().unwrap().is_empty());
    Ok(())
}
