//! Conditions attached to permission rules.
//!
//! A rule carries exactly one [`ConditionSpec`]. Hash conditions are the only
//! kind the engine understands on both sides: they can be compared against an
//! instance and translated into a query. Fragments and scopes are opaque to
//! the engine and only a store can decide them, while blocks are plain Rust
//! predicates that can only be run against an instance.

use crate::{Instance, Value};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

/// Expected value for a single attribute of a hash condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Condition {
    /// The attribute must equal the value.
    Equals(Value),
    /// The attribute must equal one of the values.
    AnyOf(Vec<Value>),
    /// The association named by the attribute must satisfy the nested
    /// conditions.
    Nested(HashConditions),
}

impl Condition {
    fn matches(&self, name: &str, instance: &dyn Instance) -> bool {
        match self {
            Condition::Equals(expected) => {
                instance.attribute(name).unwrap_or(Value::Null) == *expected
            }
            Condition::AnyOf(expected) => {
                let actual = instance.attribute(name).unwrap_or(Value::Null);
                expected.contains(&actual)
            }
            Condition::Nested(conditions) => instance
                .association(name)
                .any(|associated| conditions.matches(associated)),
        }
    }
}

/// Attribute conditions keyed by attribute or association name.
///
/// Declaration order is preserved so that compiled trees and joins come out
/// in the order rules were written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HashConditions(IndexMap<String, Condition>);

impl HashConditions {
    /// Create empty conditions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `name` to equal `value`.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), Condition::Equals(value.into()));
        self
    }

    /// Require `name` to equal any of `values`.
    pub fn any_of<V: Into<Value>>(
        mut self,
        name: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        self.0.insert(name.into(), Condition::AnyOf(values));
        self
    }

    /// Require the association `name` to satisfy `conditions`.
    pub fn nested(mut self, name: impl Into<String>, conditions: HashConditions) -> Self {
        self.0.insert(name.into(), Condition::Nested(conditions));
        self
    }

    /// Returns true if no attribute is constrained.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Look up the condition on `name`.
    pub fn get(&self, name: &str) -> Option<&Condition> {
        self.0.get(name)
    }

    /// Iterate over conditions in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Condition)> {
        self.0.iter().map(|(name, condition)| (name.as_str(), condition))
    }

    /// Check every condition against `instance`, following associations for
    /// nested conditions.
    pub fn matches(&self, instance: &dyn Instance) -> bool {
        self.0
            .iter()
            .all(|(name, condition)| condition.matches(name, instance))
    }
}

impl Display for HashConditions {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (index, (name, condition)) in self.0.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            match condition {
                Condition::Equals(value) => write!(f, "{name}: {value}")?,
                Condition::AnyOf(values) => {
                    write!(f, "{name}: [")?;
                    for (index, value) in values.iter().enumerate() {
                        if index > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{value}")?;
                    }
                    write!(f, "]")?;
                }
                Condition::Nested(conditions) => write!(f, "{name}: {conditions}")?,
            }
        }
        write!(f, "}}")
    }
}

/// A store-native predicate fragment with bound parameters.
///
/// The engine never looks inside the text. It is only combined with other
/// conditions through `AND`/`OR`/`NOT` nodes of a condition tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    /// Predicate text in the store's own language.
    pub text: String,
    /// Parameters bound to placeholders in `text`.
    pub parameters: Vec<Value>,
}

impl Fragment {
    /// Create a fragment with parameters.
    pub fn new<V: Into<Value>>(
        text: impl Into<String>,
        parameters: impl IntoIterator<Item = V>,
    ) -> Self {
        Self {
            text: text.into(),
            parameters: parameters.into_iter().map(Into::into).collect(),
        }
    }
}

impl Display for Fragment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({})", self.text)?;
        if !self.parameters.is_empty() {
            write!(f, " [")?;
            for (index, value) in self.parameters.iter().enumerate() {
                if index > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{value}")?;
            }
            write!(f, "]")?;
        }
        Ok(())
    }
}

/// A pre-built query the store knows by name.
///
/// Scopes represent a complete filtered query and cannot be merged with any
/// other condition kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scope {
    /// Name the store resolves the scope by.
    pub name: String,
}

impl Scope {
    /// Create a scope reference.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Display for Scope {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "scope({})", self.name)
    }
}

/// A predicate over a concrete instance, the engine's notion of a "block".
#[derive(Clone)]
pub struct Predicate(Arc<dyn Fn(&dyn Instance) -> bool + Send + Sync>);

impl Predicate {
    /// Wrap a closure.
    pub fn new(predicate: impl Fn(&dyn Instance) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(predicate))
    }

    /// Run the predicate against `instance`.
    pub fn call(&self, instance: &dyn Instance) -> bool {
        (self.0)(instance)
    }
}

impl Debug for Predicate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("Predicate(..)")
    }
}

/// The condition attached to a rule.
#[derive(Debug, Clone)]
pub enum ConditionSpec {
    /// The rule applies to every instance of its subjects.
    Unconditional,
    /// Attribute and association conditions.
    Hash(HashConditions),
    /// A store-native fragment, optionally with a block used for instance
    /// checks.
    Fragment {
        /// The fragment used for queries.
        fragment: Fragment,
        /// Block used when checking a single instance.
        fallback: Option<Predicate>,
    },
    /// A pre-built scope, optionally with a block used for instance checks.
    Scope {
        /// The scope used for queries.
        scope: Scope,
        /// Block used when checking a single instance.
        fallback: Option<Predicate>,
    },
    /// A block that can only be run against an instance.
    Block(Predicate),
}

impl ConditionSpec {
    /// Short name of the condition kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            ConditionSpec::Unconditional => "unconditional",
            ConditionSpec::Hash(_) => "hash",
            ConditionSpec::Fragment { .. } => "fragment",
            ConditionSpec::Scope { .. } => "scope",
            ConditionSpec::Block(_) => "block",
        }
    }

    /// Returns true when the rule applies regardless of the instance.
    pub fn is_unconditional(&self) -> bool {
        match self {
            ConditionSpec::Unconditional => true,
            ConditionSpec::Hash(conditions) => conditions.is_empty(),
            _ => false,
        }
    }
}

impl From<HashConditions> for ConditionSpec {
    fn from(conditions: HashConditions) -> Self {
        if conditions.is_empty() {
            ConditionSpec::Unconditional
        } else {
            ConditionSpec::Hash(conditions)
        }
    }
}

impl From<Fragment> for ConditionSpec {
    fn from(fragment: Fragment) -> Self {
        ConditionSpec::Fragment {
            fragment,
            fallback: None,
        }
    }
}

impl From<Scope> for ConditionSpec {
    fn from(scope: Scope) -> Self {
        ConditionSpec::Scope {
            scope,
            fallback: None,
        }
    }
}

impl From<Predicate> for ConditionSpec {
    fn from(predicate: Predicate) -> Self {
        ConditionSpec::Block(predicate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::Record;

    fn comment(visible: Option<bool>) -> Record {
        let article = match visible {
            Some(visible) => Record::new("Article", 1).has_one(
                "category",
                Record::new("Category", 1).set("visible", visible),
            ),
            None => Record::new("Article", 1),
        };
        Record::new("Comment", 1).has_one("article", article)
    }

    #[test]
    fn it_matches_equal_attributes() {
        let record = Record::new("Article", 1).set("published", true);
        assert!(HashConditions::new().with("published", true).matches(&record));
        assert!(!HashConditions::new().with("published", false).matches(&record));
    }

    #[test]
    fn it_treats_missing_attributes_as_null() {
        let record = Record::new("Article", 1);
        assert!(HashConditions::new().with("owner", Value::Null).matches(&record));
        assert!(!HashConditions::new().with("owner", 1).matches(&record));
    }

    #[test]
    fn it_matches_any_of_values() {
        let record = Record::new("Article", 1).set("state", "review");
        let conditions = HashConditions::new().any_of("state", ["draft", "review"]);
        assert!(conditions.matches(&record));
        let conditions = HashConditions::new().any_of("state", ["published"]);
        assert!(!conditions.matches(&record));
    }

    #[test]
    fn it_follows_nested_associations() {
        let conditions = HashConditions::new().nested(
            "article",
            HashConditions::new().nested("category", HashConditions::new().with("visible", true)),
        );
        assert!(conditions.matches(&comment(Some(true))));
        assert!(!conditions.matches(&comment(Some(false))));
        assert!(!conditions.matches(&comment(None)));
        assert!(!conditions.matches(&Record::new("Comment", 2)));
    }

    #[test]
    fn it_matches_any_element_of_a_collection() {
        let project = Record::new("Project", 1)
            .has_many(
                "comments",
                vec![
                    Record::new("Comment", 1).set("spam", false),
                    Record::new("Comment", 2).set("spam", true),
                ],
            );
        let conditions =
            HashConditions::new().nested("comments", HashConditions::new().with("spam", true));
        assert!(conditions.matches(&project));

        let empty = Record::new("Project", 2).has_many("comments", vec![]);
        assert!(!conditions.matches(&empty));
    }

    #[test]
    fn it_reads_conditions_from_json() {
        let conditions: HashConditions =
            serde_json::from_str(r#"{"project": {"blocked": false}, "state": ["a", "b"]}"#)
                .unwrap();
        assert_eq!(
            conditions,
            HashConditions::new()
                .nested("project", HashConditions::new().with("blocked", false))
                .any_of("state", ["a", "b"])
        );
    }

    #[test]
    fn it_treats_empty_hash_as_unconditional() {
        assert!(ConditionSpec::from(HashConditions::new()).is_unconditional());
        assert!(ConditionSpec::Hash(HashConditions::new()).is_unconditional());
        assert_eq!(
            ConditionSpec::from(HashConditions::new().with("a", 1)).kind(),
            "hash"
        );
    }

    #[test]
    fn it_displays_conditions() {
        let conditions = HashConditions::new()
            .with("published", true)
            .nested("project", HashConditions::new().any_of("id", [1, 2]));
        assert_eq!(conditions.to_string(), "{published: true, project: {id: [1, 2]}}");
        assert_eq!(
            Fragment::new("owner_id = ?", [7]).to_string(),
            "(owner_id = ?) [7]"
        );
    }
}
