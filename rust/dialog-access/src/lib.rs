//! Ordered permission rules for Dialog.
//!
//! This crate answers two questions about an actor's permissions:
//!
//! - **Instance checks**: is this action permitted on this particular object?
//! - **Query conditions**: which condition, evaluated by a backing store,
//!   selects exactly the objects of a type on which the action is permitted?
//!
//! # Quick Example
//!
//! ```rust
//! use dialog_access::memory::Record;
//! use dialog_access::{Ability, ConditionSpec, ConditionTree, HashConditions, RuleSet};
//!
//! let ability = Ability::new(
//!     RuleSet::builder()
//!         .can(["read"], ["Article"], ConditionSpec::Unconditional)
//!         .cannot(["read"], ["Article"], HashConditions::new().with("hidden", true))
//!         .build(),
//! );
//!
//! let hidden = Record::new("Article", 1).set("hidden", true);
//! assert!(!ability.can("show", &hidden).unwrap());
//!
//! let conditions = ability.conditions_for("read", "Article").unwrap();
//! assert_eq!(
//!     conditions,
//!     ConditionTree::Hash(HashConditions::new().with("hidden", true)).not()
//! );
//! ```
//!
//! # Core Concepts
//!
//! ## Rules and precedence
//!
//! A [`Rule`] grants ([`Polarity::Allow`]) or denies ([`Polarity::Deny`])
//! a set of actions on a set of subject types, under a [`ConditionSpec`].
//! The action `manage` stands for every action and the subject `all` for
//! every subject type. Rules live in a [`RuleSet`] in declaration order,
//! and later rules take precedence over earlier ones.
//!
//! ## Conditions
//!
//! | Condition | Instance check | Query |
//! |-----------|----------------|-------|
//! | [`HashConditions`] | compared attribute by attribute | hash leaf + joins |
//! | [`Fragment`] | fallback block, or error | fragment leaf |
//! | [`Scope`] | fallback block, or error | scope leaf, never merged |
//! | [`Predicate`] (block) | called | not expressible |
//!
//! ## Stores
//!
//! The engine never fetches objects. Hosts describe objects through
//! [`Instance`] and execute compiled conditions through a [`Store`]. The
//! [`memory`] module provides an in-process store.

mod error;
pub use error::*;

mod value;
pub use value::*;

mod instance;
pub use instance::*;

mod condition;
pub use condition::*;

mod settings;
pub use settings::*;

mod rule;
pub use rule::*;

mod rule_set;
pub use rule_set::*;

mod tree;
pub use tree::*;

mod join;
pub use join::*;

pub mod matcher;

pub mod compiler;
pub use compiler::Compiled;

mod store;
pub use store::*;

pub mod memory;

mod ability;
pub use ability::*;
