//! Caller-facing permission checks for one actor.

use crate::compiler::{self, Compiled};
use crate::matcher;
use crate::{AccessError, AccessResult, ConditionTree, Instance, Joins, RuleSet, Store, Value};
use indexmap::IndexMap;

/// What one actor may do.
///
/// An ability answers instance checks through a most-recent-first scan of
/// its rules, and builds query conditions by folding the same rules in
/// declaration order. Both views agree on every instance whose conditions
/// can be expressed as hash conditions.
#[derive(Debug, Clone)]
pub struct Ability {
    rules: RuleSet,
}

impl Ability {
    /// Wrap a rule set.
    pub fn new(rules: RuleSet) -> Self {
        Self { rules }
    }

    /// The underlying rules.
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Whether `action` is permitted on `instance`.
    pub fn can(&self, action: &str, instance: &dyn Instance) -> AccessResult<bool> {
        matcher::check(&self.rules, action, instance)
    }

    /// Inverse of [`Ability::can`].
    pub fn cannot(&self, action: &str, instance: &dyn Instance) -> AccessResult<bool> {
        self.can(action, instance).map(|allowed| !allowed)
    }

    /// Whether `action` may be permitted on some instance of `subject_type`.
    pub fn can_type(&self, action: &str, subject_type: &str) -> bool {
        matcher::check_subject(&self.rules, action, subject_type)
    }

    /// Like [`Ability::can`], but a denial becomes
    /// [`AccessError::AccessDenied`].
    pub fn authorize(&self, action: &str, instance: &dyn Instance) -> AccessResult<()> {
        if self.can(action, instance)? {
            Ok(())
        } else {
            Err(AccessError::AccessDenied {
                action: action.to_string(),
                subject: instance.subject_type().to_string(),
                message: self.rules.settings().unauthorized_message.clone(),
            })
        }
    }

    /// Condition tree and joins selecting the objects of `subject_type` on
    /// which `action` is permitted.
    pub fn compile(&self, action: &str, subject_type: &str) -> AccessResult<Compiled> {
        compiler::compile(&self.rules, action, subject_type)
    }

    /// Condition tree selecting the permitted objects.
    pub fn conditions_for(&self, action: &str, subject_type: &str) -> AccessResult<ConditionTree> {
        self.compile(action, subject_type)
            .map(|compiled| compiled.conditions)
    }

    /// Joins needed to evaluate [`Ability::conditions_for`].
    pub fn joins_for(&self, action: &str, subject_type: &str) -> AccessResult<Joins> {
        self.compile(action, subject_type).map(|compiled| compiled.joins)
    }

    /// Attribute values a new object must carry to be covered by the
    /// equality conditions of relevant grants. Later rules override earlier
    /// ones.
    pub fn attributes_for(&self, action: &str, subject_type: &str) -> IndexMap<String, Value> {
        let mut attributes = IndexMap::new();
        for rule in self.rules.relevant(action, subject_type) {
            if rule.polarity().is_allow() {
                for (name, value) in rule.attributes() {
                    attributes.insert(name.to_string(), value.clone());
                }
            }
        }
        attributes
    }

    /// Every object in `store` of `subject_type` on which `action` is
    /// permitted.
    pub fn accessible_by<'s, S: Store>(
        &self,
        store: &'s S,
        action: &str,
        subject_type: &str,
    ) -> AccessResult<Vec<&'s S::Record>> {
        let Compiled { conditions, joins } = self.compile(action, subject_type)?;
        store.select(subject_type, &conditions, &joins)
    }

    /// Look up an object and authorize `action` on it.
    pub fn load_and_authorize<'s, S: Store>(
        &self,
        store: &'s S,
        action: &str,
        subject_type: &str,
        id: impl Into<Value>,
    ) -> AccessResult<&'s S::Record> {
        let id = id.into();
        let record = store
            .find(subject_type, &id)?
            .ok_or_else(|| AccessError::NotFound {
                subject: subject_type.to_string(),
                id: id.to_string(),
            })?;
        self.authorize(action, record)?;
        Ok(record)
    }
}

impl From<RuleSet> for Ability {
    fn from(rules: RuleSet) -> Self {
        Self::new(rules)
    }
}
