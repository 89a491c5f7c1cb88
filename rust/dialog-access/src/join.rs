//! Association joins required by nested hash conditions.

use crate::{Condition, HashConditions};
use indexmap::IndexMap;
use std::fmt::{Display, Formatter};

/// A forest of association names keyed by name.
///
/// Each entry is a join from the parent (or from the queried subject at the
/// top level) to the named association, with its own nested joins. Merging
/// two forests merges entries with the same name recursively, so a shared
/// association appears once no matter how many conditions reference it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Joins(IndexMap<String, Joins>);

impl Joins {
    /// An empty forest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a join on `name` with the given nested joins.
    pub fn join(mut self, name: impl Into<String>, nested: Joins) -> Self {
        self.insert(name.into(), nested);
        self
    }

    /// Returns true if no join is required.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Nested joins under `name`.
    pub fn get(&self, name: &str) -> Option<&Joins> {
        self.0.get(name)
    }

    /// Iterate over top-level joins in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Joins)> {
        self.0.iter().map(|(name, nested)| (name.as_str(), nested))
    }

    /// Merge `other` into `self`, collapsing shared prefixes.
    pub fn merge(&mut self, other: Joins) {
        for (name, nested) in other.0 {
            self.insert(name, nested);
        }
    }

    fn insert(&mut self, name: String, nested: Joins) {
        self.0.entry(name).or_default().merge(nested);
    }

    /// Returns true if every nested association referenced by `conditions`
    /// has a corresponding join.
    pub fn covers(&self, conditions: &HashConditions) -> bool {
        conditions.iter().all(|(name, condition)| match condition {
            Condition::Nested(nested) => self
                .get(name)
                .is_some_and(|joins| joins.covers(nested)),
            Condition::Equals(_) | Condition::AnyOf(_) => true,
        })
    }
}

impl From<&HashConditions> for Joins {
    fn from(conditions: &HashConditions) -> Self {
        let mut joins = Joins::new();
        for (name, condition) in conditions.iter() {
            if let Condition::Nested(nested) = condition {
                joins.insert(name.to_string(), Joins::from(nested));
            }
        }
        joins
    }
}

impl Display for Joins {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (index, (name, nested)) in self.0.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            if nested.is_empty() {
                write!(f, "{name}")?;
            } else {
                write!(f, "{name}: {nested}")?;
            }
        }
        write!(f, "]")
    }
}
