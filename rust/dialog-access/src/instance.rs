//! Capabilities the engine needs from object instances.
//!
//! The engine never fetches objects itself. Host applications describe their
//! objects through [`Instance`] so that hash conditions can be compared
//! against attributes and nested conditions can follow associations.

use crate::Value;

/// An associated object (or objects) reached from an [`Instance`].
pub enum Association<'a> {
    /// The association is not set.
    None,
    /// A single associated instance.
    One(&'a dyn Instance),
    /// A collection of associated instances.
    Many(Vec<&'a dyn Instance>),
}

impl<'a> Association<'a> {
    /// Returns true if `predicate` holds for the associated instance, or for
    /// any element when the association is a collection. An unset
    /// association never satisfies the predicate.
    pub fn any(&self, mut predicate: impl FnMut(&'a dyn Instance) -> bool) -> bool {
        match self {
            Association::None => false,
            Association::One(instance) => predicate(*instance),
            Association::Many(instances) => instances.iter().any(|instance| predicate(*instance)),
        }
    }
}

/// An object whose permissions can be checked.
pub trait Instance {
    /// The subject type this instance belongs to, e.g. `"Article"`.
    fn subject_type(&self) -> &str;

    /// Read an attribute. Missing attributes are treated as null.
    fn attribute(&self, name: &str) -> Option<Value>;

    /// Follow an association by name.
    fn association(&self, name: &str) -> Association<'_>;
}
