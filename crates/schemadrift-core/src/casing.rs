use serde::{Deserialize, Serialize};

/// Transform applied to a column's declared key to derive its physical name.
///
/// Only columns without an explicit name go through the policy; an explicit
/// name always wins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Casing {
    #[default]
    Preserve,
    CamelCase,
    SnakeCase,
}

impl Casing {
    pub fn apply(&self, key: &str) -> String {
        match self {
            Casing::Preserve => key.to_string(),
            Casing::CamelCase => to_camel_case(key),
            Casing::SnakeCase => to_snake_case(key),
        }
    }
}

fn to_camel_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper_next = false;
    for ch in key.chars() {
        if ch == '_' || ch == '-' {
            upper_next = !out.is_empty();
        } else if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

fn to_snake_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    let mut prev_lower = false;
    for ch in key.chars() {
        if ch == '-' {
            out.push('_');
            prev_lower = false;
        } else if ch.is_uppercase() {
            if prev_lower {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
            prev_lower = false;
        } else {
            prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserve_is_identity() {
        assert_eq!(Casing::Preserve.apply("createdAt"), "createdAt");
        assert_eq!(Casing::Preserve.apply("created_at"), "created_at");
    }

    #[test]
    fn camel_case_joins_separators() {
        assert_eq!(Casing::CamelCase.apply("created_at"), "createdAt");
        assert_eq!(Casing::CamelCase.apply("created_at_utc"), "createdAtUtc");
        assert_eq!(Casing::CamelCase.apply("createdAt"), "createdAt");
        assert_eq!(Casing::CamelCase.apply("_leading"), "leading");
    }

    #[test]
    fn snake_case_splits_humps() {
        assert_eq!(Casing::SnakeCase.apply("createdAt"), "created_at");
        assert_eq!(Casing::SnakeCase.apply("createdAtUTC"), "created_at_utc");
        assert_eq!(Casing::SnakeCase.apply("already_snake"), "already_snake");
        assert_eq!(Casing::SnakeCase.apply("v2Count"), "v2_count");
    }
}
