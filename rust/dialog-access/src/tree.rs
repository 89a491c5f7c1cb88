//! Boolean condition trees produced by the compiler.

use crate::{Fragment, HashConditions, Scope};
use std::fmt::{Display, Formatter};

/// A boolean expression over leaf conditions.
///
/// Trees are built through [`ConditionTree::and`], [`ConditionTree::or`] and
/// [`ConditionTree::not`], which simplify as they go: constants never appear
/// below the root, and double negation collapses.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionTree {
    /// Matches everything.
    True,
    /// Matches nothing.
    False,
    /// Negation.
    Not(Box<ConditionTree>),
    /// Conjunction.
    And(Box<ConditionTree>, Box<ConditionTree>),
    /// Disjunction.
    Or(Box<ConditionTree>, Box<ConditionTree>),
    /// Attribute and association equality.
    Hash(HashConditions),
    /// Store-native fragment.
    Fragment(Fragment),
    /// Pre-built scope.
    Scope(Scope),
}

impl ConditionTree {
    /// Conjunction of `self` and `other`.
    pub fn and(self, other: ConditionTree) -> ConditionTree {
        match (self, other) {
            (ConditionTree::False, _) | (_, ConditionTree::False) => ConditionTree::False,
            (ConditionTree::True, tree) | (tree, ConditionTree::True) => tree,
            (left, right) => ConditionTree::And(Box::new(left), Box::new(right)),
        }
    }

    /// Disjunction of `self` and `other`.
    pub fn or(self, other: ConditionTree) -> ConditionTree {
        match (self, other) {
            (ConditionTree::True, _) | (_, ConditionTree::True) => ConditionTree::True,
            (ConditionTree::False, tree) | (tree, ConditionTree::False) => tree,
            (left, right) => ConditionTree::Or(Box::new(left), Box::new(right)),
        }
    }

    /// Negation of `self`.
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> ConditionTree {
        match self {
            ConditionTree::True => ConditionTree::False,
            ConditionTree::False => ConditionTree::True,
            ConditionTree::Not(inner) => *inner,
            tree => ConditionTree::Not(Box::new(tree)),
        }
    }

    /// Returns true for the constant [`ConditionTree::True`].
    pub fn is_true(&self) -> bool {
        matches!(self, ConditionTree::True)
    }

    /// Returns true for the constant [`ConditionTree::False`].
    pub fn is_false(&self) -> bool {
        matches!(self, ConditionTree::False)
    }

    /// Every hash leaf in the tree, left to right.
    pub fn hash_leaves(&self) -> Vec<&HashConditions> {
        let mut leaves = Vec::new();
        self.collect_hash_leaves(&mut leaves);
        leaves
    }

    fn collect_hash_leaves<'a>(&'a self, leaves: &mut Vec<&'a HashConditions>) {
        match self {
            ConditionTree::True
            | ConditionTree::False
            | ConditionTree::Fragment(_)
            | ConditionTree::Scope(_) => {}
            ConditionTree::Hash(conditions) => leaves.push(conditions),
            ConditionTree::Not(inner) => inner.collect_hash_leaves(leaves),
            ConditionTree::And(left, right) | ConditionTree::Or(left, right) => {
                left.collect_hash_leaves(leaves);
                right.collect_hash_leaves(leaves);
            }
        }
    }
}

impl From<HashConditions> for ConditionTree {
    fn from(conditions: HashConditions) -> Self {
        if conditions.is_empty() {
            ConditionTree::True
        } else {
            ConditionTree::Hash(conditions)
        }
    }
}

impl Display for ConditionTree {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConditionTree::True => write!(f, "TRUE"),
            ConditionTree::False => write!(f, "FALSE"),
            ConditionTree::Not(inner) => write!(f, "NOT {inner}"),
            ConditionTree::And(left, right) => write!(f, "({left} AND {right})"),
            ConditionTree::Or(left, right) => write!(f, "({left} OR {right})"),
            ConditionTree::Hash(conditions) => write!(f, "{conditions}"),
            ConditionTree::Fragment(fragment) => write!(f, "{fragment}"),
            ConditionTree::Scope(scope) => write!(f, "{scope}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(name: &str) -> ConditionTree {
        HashConditions::new().with(name, true).into()
    }

    #[test]
    fn it_absorbs_constants() {
        assert_eq!(ConditionTree::True.and(leaf("a")), leaf("a"));
        assert_eq!(leaf("a").and(ConditionTree::False), ConditionTree::False);
        assert_eq!(ConditionTree::False.or(leaf("a")), leaf("a"));
        assert_eq!(leaf("a").or(ConditionTree::True), ConditionTree::True);
    }

    #[test]
    fn it_negates_constants_and_double_negation() {
        assert_eq!(ConditionTree::True.not(), ConditionTree::False);
        assert_eq!(ConditionTree::False.not(), ConditionTree::True);
        assert_eq!(leaf("a").not().not(), leaf("a"));
    }

    #[test]
    fn it_collects_hash_leaves_in_order() {
        let tree = leaf("a")
            .not()
            .or(ConditionTree::Fragment(Fragment::new("x", Vec::<i64>::new())))
            .or(leaf("b"));
        let names: Vec<String> = tree
            .hash_leaves()
            .into_iter()
            .map(|leaf| leaf.to_string())
            .collect();
        assert_eq!(names, vec!["{a: true}", "{b: true}"]);
    }

    #[test]
    fn it_displays_trees() {
        let tree = ConditionTree::True.and(leaf("a").not()).or(leaf("b"));
        assert_eq!(tree.to_string(), "(NOT {a: true} OR {b: true})");
    }
}
