use crate::grammar::array_literal::{parse_array_literal, ArrayItem};
use crate::schema::{ColumnDefault, DefaultKind};

/// Largest integer magnitude a 64-bit float carries exactly. Catalog values
/// beyond it are tagged [`DefaultKind::BigInt`] and kept as text.
const MAX_SAFE_INTEGER: i128 = 9_007_199_254_740_991;

/// Strip a trailing `::type` (or `::type[]...`) cast suffix from a
/// catalog-supplied default expression.
pub fn trim_default_value_suffix(raw: &str) -> &str {
    let mut in_quote = false;
    let mut cast_at: Option<usize> = None;
    let bytes = raw.as_bytes();

    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\'' => in_quote = !in_quote,
            b':' if !in_quote && i + 1 < bytes.len() && bytes[i + 1] == b':' => {
                cast_at = Some(i);
                i += 1;
            }
            _ => {}
        }
        i += 1;
    }

    match cast_at {
        Some(at) if is_type_suffix(&raw[at + 2..]) => &raw[..at],
        _ => raw,
    }
}

/// A plausible type reference: identifier characters plus balanced option
/// parens. Commas are only legal inside the parens, so a mid-expression cast
/// like `substr(name::text, 1, 2)` is never mistaken for a trailing one.
fn is_type_suffix(suffix: &str) -> bool {
    if suffix.is_empty() {
        return false;
    }
    let mut depth: u32 = 0;
    for ch in suffix.chars() {
        match ch {
            '(' => depth += 1,
            ')' if depth == 0 => return false,
            ')' => depth -= 1,
            ',' if depth == 0 => return false,
            ch if ch.is_ascii_alphanumeric() => {}
            '_' | ' ' | '"' | '[' | ']' | ',' | '.' => {}
            _ => return false,
        }
    }
    depth == 0
}

/// Classify a raw catalog default literal into a tagged default.
///
/// Classification is sequential: boolean, null, numeric (incl. scientific
/// notation), quoted string, then the unknown fallback. JSON-typed columns
/// get whitespace-canonicalized through a JSON round-trip. Returns `None`
/// for an empty literal.
pub fn default_for_column(sql_type: &str, raw: &str, dimensions: u32) -> Option<ColumnDefault> {
    let trimmed = trim_default_value_suffix(raw.trim()).trim();
    if trimmed.is_empty() {
        return None;
    }

    if sql_type == "json" || sql_type == "jsonb" {
        return Some(json_default(trimmed, dimensions));
    }

    if trimmed == "true" || trimmed == "false" {
        return Some(ColumnDefault::new(DefaultKind::Boolean, trimmed));
    }
    if trimmed.eq_ignore_ascii_case("null") {
        return Some(ColumnDefault::new(DefaultKind::Null, "null"));
    }
    if is_numeric_literal(trimmed) {
        let kind = match trimmed.parse::<i128>() {
            Ok(value) if value.abs() > MAX_SAFE_INTEGER => DefaultKind::BigInt,
            _ => DefaultKind::Number,
        };
        return Some(ColumnDefault::new(kind, trimmed));
    }
    if let Some(inner) = unquote_sql_string(trimmed) {
        return Some(ColumnDefault::new(DefaultKind::String, inner));
    }

    Some(ColumnDefault::new(DefaultKind::Unknown, raw.trim()))
}

fn json_default(trimmed: &str, dimensions: u32) -> ColumnDefault {
    let Some(inner) = unquote_sql_string(trimmed) else {
        return ColumnDefault::new(DefaultKind::Unknown, trimmed);
    };

    if dimensions > 0 {
        // Array of json documents: canonicalize each element and re-escape
        // it as quoted array-literal text.
        let Ok(items) = parse_array_literal(&inner) else {
            return ColumnDefault::new(DefaultKind::Unknown, trimmed);
        };
        return ColumnDefault::new(DefaultKind::Json, render_json_array(&items));
    }

    match serde_json::from_str::<serde_json::Value>(&inner) {
        Ok(value) => ColumnDefault::new(
            DefaultKind::Json,
            serde_json::to_string(&value).unwrap_or(inner),
        ),
        Err(_) => ColumnDefault::new(DefaultKind::Unknown, trimmed),
    }
}

fn render_json_array(items: &[ArrayItem]) -> String {
    let rendered: Vec<String> = items
        .iter()
        .map(|item| match item {
            ArrayItem::Null => "NULL".to_string(),
            ArrayItem::Array(nested) => render_json_array(nested),
            ArrayItem::Value(text) => {
                let canonical = serde_json::from_str::<serde_json::Value>(text)
                    .map(|value| serde_json::to_string(&value).unwrap_or_else(|_| text.clone()))
                    .unwrap_or_else(|_| text.clone());
                format!("\"{}\"", canonical.replace('\\', "\\\\").replace('"', "\\\""))
            }
        })
        .collect();
    format!("{{{}}}", rendered.join(","))
}

fn is_numeric_literal(text: &str) -> bool {
    let body = text.strip_prefix(['-', '+']).unwrap_or(text);
    if body.is_empty() {
        return false;
    }
    let mut seen_digit = false;
    let mut seen_dot = false;
    let mut seen_exp = false;
    let mut chars = body.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot && !seen_exp => seen_dot = true,
            'e' | 'E' if seen_digit && !seen_exp => {
                seen_exp = true;
                if matches!(chars.peek(), Some('-') | Some('+')) {
                    chars.next();
                }
                if chars.peek().is_none() {
                    return false;
                }
            }
            _ => return false,
        }
    }
    seen_digit
}

fn unquote_sql_string(text: &str) -> Option<String> {
    let inner = text.strip_prefix('\'')?.strip_suffix('\'')?;
    Some(inner.replace("''", "'"))
}

/// Render a tagged default back to literal-plus-cast SQL text.
pub fn default_to_sql(
    default: &ColumnDefault,
    sql_type: &str,
    type_schema: Option<&str>,
    dimensions: u32,
) -> String {
    let cast = type_reference(sql_type, type_schema, dimensions);
    match default.kind {
        DefaultKind::Boolean | DefaultKind::Number | DefaultKind::BigInt => default.value.clone(),
        DefaultKind::Null => "NULL".to_string(),
        DefaultKind::FuncCall | DefaultKind::Unknown => default.value.clone(),
        DefaultKind::String | DefaultKind::Json => {
            format!("'{}'::{cast}", default.value.replace('\'', "''"))
        }
    }
}

fn type_reference(sql_type: &str, type_schema: Option<&str>, dimensions: u32) -> String {
    let base = match type_schema {
        Some(schema) => format!("\"{schema}\".\"{sql_type}\""),
        None => sql_type.to_string(),
    };
    format!("{}{}", base, "[]".repeat(dimensions as usize))
}
