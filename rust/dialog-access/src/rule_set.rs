//! Ordered, immutable collections of rules.

use crate::{ConditionSpec, Polarity, Rule, Settings};
use std::sync::Arc;

/// The permission rules of one actor, in declaration order.
///
/// A rule set never changes after it is built, and cloning it is cheap. To
/// change an actor's permissions, build a new set and swap it in wherever
/// readers pick it up.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Arc<[Rule]>,
    settings: Arc<Settings>,
}

impl RuleSet {
    /// A rule set with no rules, which denies everything.
    pub fn empty() -> Self {
        Self::builder().build()
    }

    /// Start building a rule set with default settings.
    pub fn builder() -> RuleSetBuilder {
        RuleSetBuilder::new(Settings::default())
    }

    /// Rules in declaration order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Settings the rules were built with.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if there are no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules relevant to `action` on `subject_type`, in declaration order.
    /// Reverse the iterator for precedence order.
    pub fn relevant<'a>(
        &'a self,
        action: &'a str,
        subject_type: &'a str,
    ) -> impl DoubleEndedIterator<Item = &'a Rule> + 'a {
        self.rules
            .iter()
            .filter(move |rule| rule.relevant(action, subject_type))
    }

    /// A new rule set holding these rules followed by `other`'s, so that
    /// `other` takes precedence. Settings are taken from `self`.
    pub fn merge(&self, other: &RuleSet) -> RuleSet {
        let rules: Vec<Rule> = self.rules.iter().chain(other.rules.iter()).cloned().collect();
        Self {
            rules: rules.into(),
            settings: self.settings.clone(),
        }
    }
}

/// Append-only builder for a [`RuleSet`].
#[derive(Debug)]
pub struct RuleSetBuilder {
    settings: Settings,
    rules: Vec<Rule>,
}

impl RuleSetBuilder {
    /// Start building with `settings`; their aliases are applied to every
    /// rule added.
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            rules: Vec::new(),
        }
    }

    /// Grant `actions` on `subjects` under `conditions`.
    pub fn can<A, S>(
        self,
        actions: impl IntoIterator<Item = A>,
        subjects: impl IntoIterator<Item = S>,
        conditions: impl Into<ConditionSpec>,
    ) -> Self
    where
        A: Into<String>,
        S: Into<String>,
    {
        self.rule(Rule::new(Polarity::Allow, actions, subjects, conditions))
    }

    /// Deny `actions` on `subjects` under `conditions`.
    pub fn cannot<A, S>(
        self,
        actions: impl IntoIterator<Item = A>,
        subjects: impl IntoIterator<Item = S>,
        conditions: impl Into<ConditionSpec>,
    ) -> Self
    where
        A: Into<String>,
        S: Into<String>,
    {
        self.rule(Rule::new(Polarity::Deny, actions, subjects, conditions))
    }

    /// Append a prepared rule.
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule.expand(&self.settings));
        self
    }

    /// Finish building.
    pub fn build(self) -> RuleSet {
        RuleSet {
            rules: self.rules.into(),
            settings: Arc::new(self.settings),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HashConditions, Polarity};

    #[test]
    fn it_preserves_declaration_order() {
        let rules = RuleSet::builder()
            .can(["read"], ["Article"], ConditionSpec::Unconditional)
            .cannot(["read"], ["Article"], HashConditions::new().with("hidden", true))
            .can(["update"], ["Comment"], ConditionSpec::Unconditional)
            .build();

        let polarities: Vec<Polarity> = rules
            .relevant("read", "Article")
            .map(|rule| rule.polarity())
            .collect();
        assert_eq!(polarities, vec![Polarity::Allow, Polarity::Deny]);
        assert_eq!(rules.len(), 3);
    }

    #[test]
    fn it_applies_aliases_while_building() {
        let rules = RuleSet::builder()
            .can(["read"], ["Article"], ConditionSpec::Unconditional)
            .build();
        assert_eq!(rules.relevant("show", "Article").count(), 1);
        assert_eq!(rules.relevant("destroy", "Article").count(), 0);
    }

    #[test]
    fn it_merges_without_mutating_either_side() {
        let base = RuleSet::builder()
            .can(["read"], ["Article"], ConditionSpec::Unconditional)
            .build();
        let overrides = RuleSet::builder()
            .cannot(["read"], ["Article"], ConditionSpec::Unconditional)
            .build();

        let merged = base.merge(&overrides);
        assert_eq!(base.len(), 1);
        assert_eq!(overrides.len(), 1);
        assert_eq!(merged.len(), 2);
        assert_eq!(
            merged.relevant("read", "Article").next_back().map(Rule::polarity),
            Some(Polarity::Deny)
        );
    }

    #[test]
    fn it_starts_empty() {
        assert!(RuleSet::empty().is_empty());
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn it_is_shareable_across_threads() {
        assert_send_sync::<Rule>();
        assert_send_sync::<RuleSet>();
        assert_send_sync::<crate::Ability>();
    }

    #[test]
    fn it_answers_concurrent_readers() {
        use crate::memory::Record;

        let ability = crate::Ability::new(
            RuleSet::builder()
                .can(["read"], ["Article"], ConditionSpec::Unconditional)
                .cannot(["read"], ["Article"], HashConditions::new().with("hidden", true))
                .build(),
        );

        std::thread::scope(|scope| {
            for id in 0..4 {
                let ability = &ability;
                scope.spawn(move || {
                    let hidden = Record::new("Article", id).set("hidden", id % 2 == 0);
                    assert_eq!(ability.can("read", &hidden), Ok(id % 2 != 0));
                    assert!(ability.compile("read", "Article").is_ok());
                });
            }
        });
    }
}
