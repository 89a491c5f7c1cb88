//! In-process [`Store`] over plain records.
//!
//! Useful for tests and for applications that keep small collections in
//! memory. Fragments and scopes are opaque to the engine, so the store
//! resolves them through predicates registered under their text or name.

use crate::{AccessError, AccessResult, Association, ConditionTree, Instance, Joins, Store, Value};
use indexmap::IndexMap;
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Attribute holding a record's identifier.
pub const ID: &str = "id";

#[derive(Debug, Clone, PartialEq)]
enum Related {
    One(Record),
    Many(Vec<Record>),
}

/// A plain object with attributes and owned associations.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    subject_type: String,
    attributes: IndexMap<String, Value>,
    associations: IndexMap<String, Related>,
}

impl Record {
    /// Create a record of `subject_type` with the given identifier.
    pub fn new(subject_type: impl Into<String>, id: impl Into<Value>) -> Self {
        let mut attributes = IndexMap::new();
        attributes.insert(ID.to_string(), id.into());
        Self {
            subject_type: subject_type.into(),
            attributes,
            associations: IndexMap::new(),
        }
    }

    /// Set an attribute.
    pub fn set(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Associate a single record.
    pub fn has_one(mut self, name: impl Into<String>, record: Record) -> Self {
        self.associations.insert(name.into(), Related::One(record));
        self
    }

    /// Associate a collection of records.
    pub fn has_many(mut self, name: impl Into<String>, records: Vec<Record>) -> Self {
        self.associations.insert(name.into(), Related::Many(records));
        self
    }

    /// The record's identifier.
    pub fn id(&self) -> &Value {
        self.attributes.get(ID).unwrap_or(&Value::Null)
    }
}

impl Instance for Record {
    fn subject_type(&self) -> &str {
        &self.subject_type
    }

    fn attribute(&self, name: &str) -> Option<Value> {
        self.attributes.get(name).cloned()
    }

    fn association(&self, name: &str) -> Association<'_> {
        match self.associations.get(name) {
            None => Association::None,
            Some(Related::One(record)) => Association::One(record),
            Some(Related::Many(records)) => Association::Many(
                records
                    .iter()
                    .map(|record| record as &dyn Instance)
                    .collect(),
            ),
        }
    }
}

type FragmentPredicate = Arc<dyn Fn(&dyn Instance, &[Value]) -> bool + Send + Sync>;
type ScopePredicate = Arc<dyn Fn(&dyn Instance) -> bool + Send + Sync>;

/// A [`Store`] holding records in memory.
#[derive(Clone, Default)]
pub struct MemoryStore {
    records: Vec<Record>,
    fragments: HashMap<String, FragmentPredicate>,
    scopes: HashMap<String, ScopePredicate>,
}

impl MemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record.
    pub fn insert(mut self, record: Record) -> Self {
        self.records.push(record);
        self
    }

    /// Register how to evaluate fragments with the given text.
    pub fn with_fragment(
        mut self,
        text: impl Into<String>,
        predicate: impl Fn(&dyn Instance, &[Value]) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.fragments.insert(text.into(), Arc::new(predicate));
        self
    }

    /// Register how to evaluate the scope with the given name.
    pub fn with_scope(
        mut self,
        name: impl Into<String>,
        predicate: impl Fn(&dyn Instance) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.scopes.insert(name.into(), Arc::new(predicate));
        self
    }

    fn evaluate(&self, conditions: &ConditionTree, record: &Record) -> AccessResult<bool> {
        Ok(match conditions {
            ConditionTree::True => true,
            ConditionTree::False => false,
            ConditionTree::Not(inner) => !self.evaluate(inner, record)?,
            ConditionTree::And(left, right) => {
                self.evaluate(left, record)? && self.evaluate(right, record)?
            }
            ConditionTree::Or(left, right) => {
                self.evaluate(left, record)? || self.evaluate(right, record)?
            }
            ConditionTree::Hash(hash) => hash.matches(record),
            ConditionTree::Fragment(fragment) => {
                let predicate = self.fragments.get(&fragment.text).ok_or_else(|| {
                    AccessError::store(format!("Unknown fragment {:?}", fragment.text))
                })?;
                predicate(record as &dyn Instance, &fragment.parameters)
            }
            ConditionTree::Scope(scope) => {
                let predicate = self
                    .scopes
                    .get(&scope.name)
                    .ok_or_else(|| AccessError::store(format!("Unknown scope {:?}", scope.name)))?;
                predicate(record as &dyn Instance)
            }
        })
    }
}

impl Debug for MemoryStore {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("records", &self.records)
            .field("fragments", &self.fragments.keys().collect::<Vec<_>>())
            .field("scopes", &self.scopes.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Store for MemoryStore {
    type Record = Record;

    fn find(&self, subject_type: &str, id: &Value) -> AccessResult<Option<&Record>> {
        Ok(self
            .records
            .iter()
            .find(|record| record.subject_type == subject_type && record.id() == id))
    }

    fn select(
        &self,
        subject_type: &str,
        conditions: &ConditionTree,
        joins: &Joins,
    ) -> AccessResult<Vec<&Record>> {
        if let Some(leaf) = conditions.hash_leaves().into_iter().find(|leaf| !joins.covers(leaf)) {
            return Err(AccessError::store(format!(
                "Conditions {leaf} need associations missing from joins {joins}"
            )));
        }

        let mut selected = Vec::new();
        for record in &self.records {
            if record.subject_type == subject_type && self.evaluate(conditions, record)? {
                selected.push(record);
            }
        }
        Ok(selected)
    }
}
