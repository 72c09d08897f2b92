/// Split an SQL type into its base name and option list.
///
/// `timestamp(6) with time zone` becomes `("timestamp with time zone",
/// Some("6"))`. Spaces inside the option list are dropped. A trailing `,0`
/// scale on `numeric` is stripped to match the canonical zero-scale form.
pub fn split_sql_type(raw: &str) -> (String, Option<String>) {
    let Some(open) = raw.find('(') else {
        return (raw.trim().to_string(), None);
    };
    let Some(close) = raw.rfind(')') else {
        return (raw.trim().to_string(), None);
    };
    if close < open {
        return (raw.trim().to_string(), None);
    }

    let head = raw[..open].trim_end();
    let tail = raw[close + 1..].trim_start();
    let base = if tail.is_empty() {
        head.to_string()
    } else {
        format!("{head} {tail}")
    };

    let mut options: String = raw[open + 1..close].chars().filter(|c| *c != ' ').collect();
    if base == "numeric" || base == "decimal" {
        if let Some(stripped) = options.strip_suffix(",0") {
            options = stripped.to_string();
        }
    }
    if options.is_empty() {
        (base, None)
    } else {
        (base, Some(options))
    }
}

/// Canonicalize spacing inside a type's option list.
///
/// `numeric(6, 2)` becomes `numeric(6,2)`; the legacy `timestamp (3)` form
/// collapses to `timestamp(3)`.
pub fn normalize_type_options(raw: &str) -> String {
    let Some(open) = raw.find('(') else {
        return raw.to_string();
    };
    let Some(close) = raw.rfind(')') else {
        return raw.to_string();
    };
    if close < open {
        return raw.to_string();
    }

    let head = raw[..open].trim_end();
    let inner: String = raw[open + 1..close].chars().filter(|c| *c != ' ').collect();
    format!("{head}({inner}){}", &raw[close + 1..])
}

/// Normalize a catalog-reported type string to the canonical spelling used by
/// declared schemas: `character varying` → `varchar`, `without time zone`
/// dropped, option spacing canonicalized.
pub fn canonical_type_name(raw: &str) -> String {
    let mut out = raw.replace("character varying", "varchar");
    if let Some(stripped) = out.strip_suffix(" without time zone") {
        out = stripped.to_string();
    }
    out = out.replace('"', "");
    normalize_type_options(&out)
}
