//! Engine settings: action aliases and messages.

use crate::{AccessError, AccessResult};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// Action that matches every action.
pub const MANAGE: &str = "manage";

/// Subject type that matches every subject type.
pub const ALL: &str = "all";

/// Message used when [`crate::Ability::authorize`] denies access.
pub const DEFAULT_UNAUTHORIZED_MESSAGE: &str = "You are not authorized to access this page.";

/// Settings shared by every rule set built from them.
///
/// Settings can be deserialized from JSON; missing fields take their
/// defaults:
///
/// ```json
/// { "aliases": { "read": ["index", "show"], "modify": ["update", "destroy"] } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Alias name to the actions it stands for.
    pub aliases: IndexMap<String, Vec<String>>,
    /// Message carried by [`AccessError::AccessDenied`].
    pub unauthorized_message: String,
}

impl Default for Settings {
    fn default() -> Self {
        let mut aliases = IndexMap::new();
        aliases.insert("read".to_string(), vec!["index".into(), "show".into()]);
        aliases.insert("create".to_string(), vec!["new".into()]);
        aliases.insert("update".to_string(), vec!["edit".into()]);
        Self {
            aliases,
            unauthorized_message: DEFAULT_UNAUTHORIZED_MESSAGE.to_string(),
        }
    }
}

impl Settings {
    /// Parse settings from JSON and validate them.
    pub fn from_json(json: &str) -> AccessResult<Self> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Add an alias, replacing any previous definition of the same name.
    pub fn alias<A: Into<String>>(
        mut self,
        name: impl Into<String>,
        actions: impl IntoIterator<Item = A>,
    ) -> AccessResult<Self> {
        self.aliases
            .insert(name.into(), actions.into_iter().map(Into::into).collect());
        self.validate()?;
        Ok(self)
    }

    /// Reject aliases that target [`MANAGE`] or themselves.
    pub fn validate(&self) -> AccessResult<()> {
        for (name, actions) in &self.aliases {
            if name == MANAGE {
                return Err(AccessError::settings(format!(
                    "{MANAGE:?} is reserved and cannot be an alias"
                )));
            }
            for action in actions {
                if action == MANAGE || action == name {
                    return Err(AccessError::settings(format!(
                        "alias {name:?} cannot target {action:?}"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Expand `actions` with every action reachable through aliases.
    pub fn expand_actions<'a>(
        &self,
        actions: impl IntoIterator<Item = &'a str>,
    ) -> IndexSet<String> {
        let mut expanded = IndexSet::new();
        let mut pending: Vec<String> = actions.into_iter().map(str::to_string).collect();
        while let Some(action) = pending.pop() {
            if let Some(targets) = self.aliases.get(&action) {
                pending.extend(
                    targets
                        .iter()
                        .filter(|target| !expanded.contains(*target))
                        .cloned(),
                );
            }
            expanded.insert(action);
        }
        expanded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use testresult::TestResult;

    #[test]
    fn it_expands_default_aliases() {
        let expanded = Settings::default().expand_actions(["read"]);
        assert!(expanded.contains("read"));
        assert!(expanded.contains("index"));
        assert!(expanded.contains("show"));
        assert!(!expanded.contains("edit"));
    }

    #[test]
    fn it_expands_aliases_transitively() -> TestResult {
        let settings = Settings::default().alias("modify", ["update", "destroy"])?;
        let expanded = settings.expand_actions(["modify"]);
        for action in ["modify", "update", "edit", "destroy"] {
            assert!(expanded.contains(action), "missing {action}");
        }
        Ok(())
    }

    #[test]
    fn it_terminates_on_alias_cycles() -> TestResult {
        let settings = Settings::default()
            .alias("a", ["b"])?
            .alias("b", ["a"])?;
        let expanded = settings.expand_actions(["a"]);
        assert_eq!(expanded.len(), 2);
        Ok(())
    }

    #[test]
    fn it_rejects_reserved_aliases() {
        assert!(Settings::default().alias("manage", ["read"]).is_err());
        assert!(Settings::default().alias("everything", ["manage"]).is_err());
        assert!(Settings::default().alias("loop", ["loop"]).is_err());
    }

    #[test]
    fn it_loads_settings_from_json() -> TestResult {
        let settings = Settings::from_json(
            r#"{ "aliases": { "read": ["show"] }, "unauthorized_message": "Nope" }"#,
        )?;
        assert_eq!(settings.unauthorized_message, "Nope");
        assert_eq!(settings.aliases.get("read"), Some(&vec!["show".to_string()]));
        assert!(settings.aliases.get("create").is_none());

        let defaults = Settings::from_json("{}")?;
        assert_eq!(defaults, Settings::default());
        Ok(())
    }

    #[test]
    fn it_reports_malformed_json() {
        let error = Settings::from_json("{ \"aliases\": 3 }").unwrap_err();
        assert!(matches!(error, AccessError::Settings { .. }));
    }
}
