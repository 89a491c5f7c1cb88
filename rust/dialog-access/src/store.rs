use crate::{AccessResult, ConditionTree, Instance, Joins, Value};

/// A backing store that can look up objects and run compiled conditions.
///
/// Implementations translate hash leaves into equality and join predicates,
/// fragments into their verbatim parameterized text, scopes into their
/// pre-built query, and `And`/`Or`/`Not` into the store's own boolean
/// composition. The engine only guarantees that the tree and joins it hands
/// over are simplified and consistent with each other.
pub trait Store {
    /// Object type the store returns.
    type Record: Instance;

    /// Look up one object of `subject_type` by identifier.
    fn find(&self, subject_type: &str, id: &Value) -> AccessResult<Option<&Self::Record>>;

    /// Select every object of `subject_type` satisfying `conditions`, joining
    /// `joins` to reach nested associations.
    fn select(
        &self,
        subject_type: &str,
        conditions: &ConditionTree,
        joins: &Joins,
    ) -> AccessResult<Vec<&Self::Record>>;
}
