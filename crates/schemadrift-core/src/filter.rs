use std::collections::BTreeSet;

use glob::Pattern;

use crate::error::{Error, Result};

/// Candidate entity presented to the filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterTarget<'a> {
    Schema { name: &'a str },
    Table { schema: &'a str, name: &'a str },
    Role { name: &'a str },
}

/// Recognized extensions that inject implicit table exclusions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extension {
    Postgis,
}

impl Extension {
    fn implicit_table_globs(&self) -> &'static [&'static str] {
        match self {
            Extension::Postgis => &[
                "!geography_columns",
                "!geometry_columns",
                "!spatial_ref_sys",
            ],
        }
    }
}

/// Managed-role providers with fixed deny-lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Supabase,
    Neon,
}

impl Provider {
    fn denied_roles(&self) -> &'static [&'static str] {
        match self {
            Provider::Supabase => &[
                "anon",
                "authenticator",
                "authenticated",
                "service_role",
                "supabase_auth_admin",
                "supabase_storage_admin",
                "dashboard_user",
                "supabase_admin",
            ],
            Provider::Neon => &["authenticated", "anonymous"],
        }
    }
}

/// Role filtering configuration.
#[derive(Debug, Clone, Default)]
pub enum RolesConfig {
    /// Role management is off; every role is excluded.
    #[default]
    Disabled,
    /// Every role participates.
    All,
    /// Explicit include/exclude lists, optionally on top of a provider
    /// deny-list.
    Select {
        include: Vec<String>,
        exclude: Vec<String>,
        provider: Option<Provider>,
    },
}

/// User-supplied filter configuration.
#[derive(Debug, Clone, Default)]
pub struct FilterConfig {
    /// Glob patterns over schema names; `!` prefix negates.
    pub schemas: Vec<String>,
    /// Glob patterns over bare table names; `!` prefix negates.
    pub tables: Vec<String>,
    pub roles: RolesConfig,
    pub extensions: Vec<Extension>,
}

/// Entities previously declared as externally managed. They are referenced
/// but never created or dropped, so the filter drops them outright.
#[derive(Debug, Clone, Default)]
pub struct ExistingEntities {
    pub schemas: BTreeSet<String>,
    /// (schema, table) pairs.
    pub tables: BTreeSet<(String, String)>,
}

#[derive(Debug)]
struct GlobRule {
    pattern: Pattern,
    negated: bool,
}

impl GlobRule {
    fn compile(raw: &str) -> Result<Self> {
        let (negated, body) = match raw.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };
        let pattern = Pattern::new(body)
            .map_err(|err| Error::Config(format!("invalid glob pattern `{raw}`: {err}")))?;
        Ok(Self { pattern, negated })
    }

    /// A positive rule votes `true` on a match and abstains otherwise. A
    /// negated rule always votes: `false` when its body matches (the excluded
    /// name), `true` when it does not, so unrelated names still fall through
    /// to inclusion.
    fn vote(&self, name: &str) -> Option<bool> {
        let matched = self.pattern.matches(name);
        if self.negated {
            Some(!matched)
        } else if matched {
            Some(true)
        } else {
            None
        }
    }
}

fn evaluate(rules: &[GlobRule], name: &str) -> bool {
    if rules.is_empty() {
        return true;
    }
    let votes: Vec<bool> = rules.iter().filter_map(|rule| rule.vote(name)).collect();
    if votes.is_empty() {
        return false;
    }
    votes.into_iter().all(|vote| vote)
}

/// Predicate over schemas, tables, and roles, built once per run.
#[derive(Debug)]
pub struct EntityFilter {
    schema_rules: Vec<GlobRule>,
    table_rules: Vec<GlobRule>,
    roles: RolesConfig,
    existing: ExistingEntities,
}

impl EntityFilter {
    pub fn prepare(config: &FilterConfig, existing: ExistingEntities) -> Result<Self> {
        let schema_rules = config
            .schemas
            .iter()
            .map(|raw| GlobRule::compile(raw))
            .collect::<Result<Vec<_>>>()?;

        let mut table_patterns: Vec<&str> = config.tables.iter().map(String::as_str).collect();
        for extension in &config.extensions {
            table_patterns.extend(extension.implicit_table_globs());
        }
        let table_rules = table_patterns
            .into_iter()
            .map(GlobRule::compile)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            schema_rules,
            table_rules,
            roles: config.roles.clone(),
            existing,
        })
    }

    /// A filter that admits everything except roles.
    pub fn allow_all() -> Self {
        Self {
            schema_rules: Vec::new(),
            table_rules: Vec::new(),
            roles: RolesConfig::All,
            existing: ExistingEntities::default(),
        }
    }

    pub fn allows(&self, target: FilterTarget<'_>) -> bool {
        match target {
            FilterTarget::Schema { name } => self.allows_schema(name),
            FilterTarget::Table { schema, name } => {
                // Schema exclusion short-circuits the table verdict.
                self.allows_schema(schema) && self.allows_table(schema, name)
            }
            FilterTarget::Role { name } => self.allows_role(name),
        }
    }

    fn allows_schema(&self, name: &str) -> bool {
        if self.existing.schemas.contains(name) {
            return false;
        }
        evaluate(&self.schema_rules, name)
    }

    fn allows_table(&self, schema: &str, name: &str) -> bool {
        if self
            .existing
            .tables
            .contains(&(schema.to_string(), name.to_string()))
        {
            return false;
        }
        evaluate(&self.table_rules, name)
    }

    fn allows_role(&self, name: &str) -> bool {
        match &self.roles {
            RolesConfig::Disabled => false,
            RolesConfig::All => true,
            RolesConfig::Select {
                include,
                exclude,
                provider,
            } => {
                let denied_by_provider = provider
                    .map(|p| p.denied_roles().contains(&name))
                    .unwrap_or(false);
                if denied_by_provider || exclude.iter().any(|ex| ex == name) {
                    return false;
                }
                include.is_empty() || include.iter().any(|inc| inc == name)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(config: FilterConfig) -> EntityFilter {
        EntityFilter::prepare(&config, ExistingEntities::default()).unwrap()
    }

    #[test]
    fn empty_patterns_include_everything() {
        let f = filter(FilterConfig::default());
        assert!(f.allows(FilterTarget::Schema { name: "app" }));
        assert!(f.allows(FilterTarget::Table {
            schema: "app",
            name: "users"
        }));
    }

    #[test]
    fn positive_patterns_are_an_allowlist() {
        let f = filter(FilterConfig {
            schemas: vec!["app".into(), "audit_*".into()],
            ..Default::default()
        });
        assert!(f.allows(FilterTarget::Schema { name: "app" }));
        assert!(f.allows(FilterTarget::Schema { name: "audit_2024" }));
        assert!(!f.allows(FilterTarget::Schema { name: "internal" }));
    }

    #[test]
    fn negated_pattern_excludes_only_its_matches() {
        let f = filter(FilterConfig {
            tables: vec!["!_hidden_*".into()],
            ..Default::default()
        });
        assert!(f.allows(FilterTarget::Table {
            schema: "public",
            name: "users"
        }));
        assert!(!f.allows(FilterTarget::Table {
            schema: "public",
            name: "_hidden_cache"
        }));
    }

    #[test]
    fn mixed_patterns_require_all_votes() {
        let f = filter(FilterConfig {
            tables: vec!["users*".into(), "!users_archive".into()],
            ..Default::default()
        });
        assert!(f.allows(FilterTarget::Table {
            schema: "public",
            name: "users"
        }));
        assert!(!f.allows(FilterTarget::Table {
            schema: "public",
            name: "users_archive"
        }));
        // No positive vote, but the negated rule still votes true.
        assert!(f.allows(FilterTarget::Table {
            schema: "public",
            name: "orders"
        }));
    }

    #[test]
    fn schema_exclusion_short_circuits_tables() {
        let f = filter(FilterConfig {
            schemas: vec!["app".into()],
            tables: vec!["users".into()],
            ..Default::default()
        });
        assert!(!f.allows(FilterTarget::Table {
            schema: "internal",
            name: "users"
        }));
    }

    #[test]
    fn existing_entities_are_dropped() {
        let mut existing = ExistingEntities::default();
        existing.schemas.insert("legacy".into());
        existing
            .tables
            .insert(("public".into(), "ext_managed".into()));
        let f = EntityFilter::prepare(&FilterConfig::default(), existing).unwrap();
        assert!(!f.allows(FilterTarget::Schema { name: "legacy" }));
        assert!(!f.allows(FilterTarget::Table {
            schema: "public",
            name: "ext_managed"
        }));
        assert!(f.allows(FilterTarget::Table {
            schema: "public",
            name: "users"
        }));
    }

    #[test]
    fn postgis_extension_hides_its_tables() {
        let f = filter(FilterConfig {
            extensions: vec![Extension::Postgis],
            ..Default::default()
        });
        assert!(!f.allows(FilterTarget::Table {
            schema: "public",
            name: "spatial_ref_sys"
        }));
        assert!(f.allows(FilterTarget::Table {
            schema: "public",
            name: "places"
        }));
    }

    #[test]
    fn roles_disabled_excludes_all() {
        let f = filter(FilterConfig::default());
        assert!(!f.allows(FilterTarget::Role { name: "admin" }));
    }

    #[test]
    fn provider_deny_list_applies_before_include() {
        let f = filter(FilterConfig {
            roles: RolesConfig::Select {
                include: vec!["anon".into(), "app_rw".into()],
                exclude: vec![],
                provider: Some(Provider::Supabase),
            },
            ..Default::default()
        });
        assert!(!f.allows(FilterTarget::Role { name: "anon" }));
        assert!(f.allows(FilterTarget::Role { name: "app_rw" }));
        assert!(!f.allows(FilterTarget::Role { name: "other" }));
    }

    #[test]
    fn roles_select_without_lists_accepts_all_but_excluded() {
        let f = filter(FilterConfig {
            roles: RolesConfig::Select {
                include: vec![],
                exclude: vec!["ci".into()],
                provider: None,
            },
            ..Default::default()
        });
        assert!(f.allows(FilterTarget::Role { name: "app_rw" }));
        assert!(!f.allows(FilterTarget::Role { name: "ci" }));
    }

    #[test]
    fn invalid_glob_is_a_config_error() {
        let result = EntityFilter::prepare(
            &FilterConfig {
                schemas: vec!["app[".into()],
                ..Default::default()
            },
            ExistingEntities::default(),
        );
        assert!(result.is_err());
    }
}
