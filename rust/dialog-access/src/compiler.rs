//! Translation of rules into query conditions.
//!
//! A query selects a set of objects, so every relevant rule contributes in
//! declaration order: grants are OR-ed into the running condition and denials
//! AND-ed in negated. Evaluating the result against any instance gives the
//! same answer as the most-recent-first scan in [`crate::matcher`].

use crate::{AccessError, AccessResult, ConditionSpec, ConditionTree, Joins, Polarity, RuleSet};
use tracing::{debug, warn};

/// Query conditions for one action on one subject type.
#[derive(Debug, Clone, PartialEq)]
pub struct Compiled {
    /// Combined condition selecting the permitted objects.
    pub conditions: ConditionTree,
    /// Associations the store must join to evaluate nested hash conditions.
    pub joins: Joins,
}

/// Compile the rules relevant to `action` on `subject_type`.
///
/// Fails with [`AccessError::ScopeMerge`] when a scope would have to be
/// combined with another scope, a hash condition or a fragment, and with
/// [`AccessError::BlockOnly`] when a block decides the outcome and cannot be
/// expressed as a query.
pub fn compile(rules: &RuleSet, action: &str, subject_type: &str) -> AccessResult<Compiled> {
    let relevant: Vec<_> = rules.relevant(action, subject_type).collect();

    let scopes = relevant
        .iter()
        .filter(|rule| matches!(rule.conditions(), ConditionSpec::Scope { .. }))
        .count();
    let predicates = relevant.iter().any(|rule| {
        !rule.conditions().is_unconditional()
            && matches!(
                rule.conditions(),
                ConditionSpec::Hash(_) | ConditionSpec::Fragment { .. }
            )
    });
    if scopes > 1 || (scopes == 1 && predicates) {
        warn!(action, subject_type, "Refusing to merge scope with other conditions");
        return Err(AccessError::ScopeMerge {
            action: action.to_string(),
            subject: subject_type.to_string(),
        });
    }

    if !relevant.is_empty()
        && relevant
            .iter()
            .all(|rule| matches!(rule.conditions(), ConditionSpec::Block(_)))
    {
        warn!(action, subject_type, "Only block rules apply, no query possible");
        return Err(block_only(action, subject_type));
    }

    let mut conditions = ConditionTree::False;
    for rule in relevant {
        let condition = match rule.conditions() {
            ConditionSpec::Unconditional => ConditionTree::True,
            ConditionSpec::Hash(hash) => ConditionTree::from(hash.clone()),
            ConditionSpec::Fragment { fragment, .. } => ConditionTree::Fragment(fragment.clone()),
            ConditionSpec::Scope { scope, .. } => ConditionTree::Scope(scope.clone()),
            // Skipping a grant only narrows the result. Skipping a denial is
            // only sound while nothing has been granted yet.
            ConditionSpec::Block(_) => match rule.polarity() {
                Polarity::Allow => continue,
                Polarity::Deny if conditions.is_false() => continue,
                Polarity::Deny => {
                    warn!(action, subject_type, "Block denial cannot be expressed as a query");
                    return Err(block_only(action, subject_type));
                }
            },
        };

        conditions = match rule.polarity() {
            Polarity::Allow => conditions.or(condition),
            Polarity::Deny => conditions.and(condition.not()),
        };
    }

    let mut joins = Joins::new();
    for leaf in conditions.hash_leaves() {
        joins.merge(Joins::from(leaf));
    }

    debug!(
        action,
        subject_type,
        conditions = %conditions,
        joins = %joins,
        "Compiled query conditions"
    );

    Ok(Compiled { conditions, joins })
}

fn block_only(action: &str, subject_type: &str) -> AccessError {
    AccessError::BlockOnly {
        action: action.to_string(),
        subject: subject_type.to_string(),
    }
}
