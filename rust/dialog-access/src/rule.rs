//! Individual permission rules.

use crate::settings::{ALL, MANAGE};
use crate::{AccessError, AccessResult, Condition, ConditionSpec, Instance, Settings, Value};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Whether a rule grants or denies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    /// The rule grants the action.
    Allow,
    /// The rule denies the action.
    Deny,
}

impl Polarity {
    /// Returns true for [`Polarity::Allow`].
    pub fn is_allow(self) -> bool {
        self == Polarity::Allow
    }
}

/// One declared grant or denial of actions on subject types.
///
/// Rules are immutable once built. A rule's action set already includes
/// every action reachable through the aliases it was built with.
#[derive(Debug, Clone)]
pub struct Rule {
    polarity: Polarity,
    actions: IndexSet<String>,
    subjects: IndexSet<String>,
    conditions: ConditionSpec,
    declared_action: String,
    declared_subject: String,
}

impl Rule {
    /// Create a rule. The first action and subject are remembered as the
    /// pair the rule was declared against, for error messages.
    pub fn new<A, S>(
        polarity: Polarity,
        actions: impl IntoIterator<Item = A>,
        subjects: impl IntoIterator<Item = S>,
        conditions: impl Into<ConditionSpec>,
    ) -> Self
    where
        A: Into<String>,
        S: Into<String>,
    {
        let actions: IndexSet<String> = actions.into_iter().map(Into::into).collect();
        let subjects: IndexSet<String> = subjects.into_iter().map(Into::into).collect();
        let declared_action = actions.first().cloned().unwrap_or_default();
        let declared_subject = subjects.first().cloned().unwrap_or_default();

        Self {
            polarity,
            actions,
            subjects,
            conditions: conditions.into(),
            declared_action,
            declared_subject,
        }
    }

    /// The same rule with its actions expanded through `settings` aliases.
    pub fn expand(self, settings: &Settings) -> Self {
        let actions = settings.expand_actions(self.actions.iter().map(String::as_str));
        Self { actions, ..self }
    }

    /// Allow or deny.
    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    /// Actions this rule applies to, including aliased ones.
    pub fn actions(&self) -> impl Iterator<Item = &str> {
        self.actions.iter().map(String::as_str)
    }

    /// Subject types this rule applies to.
    pub fn subjects(&self) -> impl Iterator<Item = &str> {
        self.subjects.iter().map(String::as_str)
    }

    /// The attached condition.
    pub fn conditions(&self) -> &ConditionSpec {
        &self.conditions
    }

    /// Action the rule was declared against.
    pub fn declared_action(&self) -> &str {
        &self.declared_action
    }

    /// Subject type the rule was declared against.
    pub fn declared_subject(&self) -> &str {
        &self.declared_subject
    }

    /// Returns true if the rule covers `action`.
    pub fn matches_action(&self, action: &str) -> bool {
        self.actions.contains(MANAGE) || self.actions.contains(action)
    }

    /// Returns true if the rule covers `subject_type`.
    pub fn matches_subject_type(&self, subject_type: &str) -> bool {
        self.subjects.contains(ALL) || self.subjects.contains(subject_type)
    }

    /// Returns true if the rule applies to `action` on `subject_type`.
    pub fn relevant(&self, action: &str, subject_type: &str) -> bool {
        self.matches_action(action) && self.matches_subject_type(subject_type)
    }

    /// Check the rule's condition against a concrete instance.
    ///
    /// Fragments and scopes can only be decided by a store; without a
    /// fallback block they fail with [`AccessError::UnevaluableCondition`].
    pub fn matches_instance(&self, instance: &dyn Instance) -> AccessResult<bool> {
        match &self.conditions {
            ConditionSpec::Unconditional => Ok(true),
            ConditionSpec::Hash(conditions) => Ok(conditions.matches(instance)),
            ConditionSpec::Block(predicate) => Ok(predicate.call(instance)),
            ConditionSpec::Fragment {
                fallback: Some(predicate),
                ..
            }
            | ConditionSpec::Scope {
                fallback: Some(predicate),
                ..
            } => Ok(predicate.call(instance)),
            ConditionSpec::Fragment { fallback: None, .. }
            | ConditionSpec::Scope { fallback: None, .. } => {
                Err(AccessError::UnevaluableCondition {
                    action: self.declared_action.clone(),
                    subject: self.declared_subject.clone(),
                    kind: self.conditions.kind(),
                })
            }
        }
    }

    /// Whether the rule decides a check made against a subject type rather
    /// than an instance.
    ///
    /// A conditional grant still answers "some instances may qualify", but a
    /// conditional denial cannot deny the type as a whole and is skipped.
    pub fn matches_subject(&self) -> bool {
        self.conditions.is_unconditional() || self.polarity.is_allow()
    }

    /// Attribute values implied by the top-level equality conditions.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &Value)> {
        let conditions = match &self.conditions {
            ConditionSpec::Hash(conditions) => Some(conditions),
            _ => None,
        };
        conditions
            .into_iter()
            .flat_map(|conditions| conditions.iter())
            .filter_map(|(name, condition)| match condition {
                Condition::Equals(value) => Some((name, value)),
                Condition::AnyOf(_) | Condition::Nested(_) => None,
            })
    }
}
