use schemadrift_core::{Error, Result};

use crate::declared::SqlExpr;

/// Renders declared SQL expressions to text for default-value position.
///
/// Default values must be statically renderable; an expression with
/// runtime-bound parameters cannot appear in a column default and renderers
/// fail loudly on one.
pub trait SqlRenderer {
    fn render_default_expr(&self, expr: &SqlExpr) -> Result<String>;
}

/// Renderer for expressions that are already plain SQL text.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticRenderer;

impl SqlRenderer for StaticRenderer {
    fn render_default_expr(&self, expr: &SqlExpr) -> Result<String> {
        if expr.has_params {
            return Err(Error::UnrenderableDefault(format!(
                "expression `{}` is parameterized and cannot be used as a column default",
                expr.sql
            )));
        }
        Ok(expr.sql.clone())
    }
}
