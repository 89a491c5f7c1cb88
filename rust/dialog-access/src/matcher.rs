//! Single verdicts for an instance or a subject type.
//!
//! Rules are scanned most recent first and the first rule that applies
//! decides. A later denial therefore overrides an earlier, broader grant and
//! vice versa. When nothing applies the answer is "no".

use crate::{AccessResult, Instance, RuleSet};
use tracing::trace;

/// Decide whether `action` is permitted on `instance`.
///
/// Fails with [`crate::AccessError::UnevaluableCondition`] when the scan
/// reaches a fragment or scope rule without a fallback block.
pub fn check(rules: &RuleSet, action: &str, instance: &dyn Instance) -> AccessResult<bool> {
    let subject_type = instance.subject_type();
    for rule in rules.relevant(action, subject_type).rev() {
        if rule.matches_instance(instance)? {
            trace!(
                action,
                subject_type,
                polarity = ?rule.polarity(),
                declared_action = rule.declared_action(),
                "Rule decided instance check"
            );
            return Ok(rule.polarity().is_allow());
        }
    }
    trace!(action, subject_type, "No rule matched instance, denying");
    Ok(false)
}

/// Decide whether `action` may be permitted on some instance of
/// `subject_type`.
pub fn check_subject(rules: &RuleSet, action: &str, subject_type: &str) -> bool {
    rules
        .relevant(action, subject_type)
        .rev()
        .find(|rule| rule.matches_subject())
        .is_some_and(|rule| rule.polarity().is_allow())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::Record;
    use crate::{AccessError, ConditionSpec, Fragment, HashConditions, Predicate};
    use testresult::TestResult;

    fn article(published: bool) -> Record {
        Record::new("Article", 1).set("published", published)
    }

    #[test]
    fn it_denies_by_default() -> TestResult {
        assert!(!check(&RuleSet::empty(), "read", &article(true))?);
        assert!(!check_subject(&RuleSet::empty(), "read", "Article"));
        Ok(())
    }

    #[test]
    fn it_lets_later_rules_win() -> TestResult {
        let rules = RuleSet::builder()
            .can(["read"], ["Article"], ConditionSpec::Unconditional)
            .cannot(["read"], ["Article"], HashConditions::new().with("published", false))
            .build();
        assert!(check(&rules, "read", &article(true))?);
        assert!(!check(&rules, "read", &article(false))?);

        let rules = RuleSet::builder()
            .cannot(["read"], ["Article"], ConditionSpec::Unconditional)
            .can(["read"], ["Article"], HashConditions::new().with("published", true))
            .build();
        assert!(check(&rules, "read", &article(true))?);
        assert!(!check(&rules, "read", &article(false))?);
        Ok(())
    }

    #[test]
    fn it_ignores_rules_for_other_subjects() -> TestResult {
        let rules = RuleSet::builder()
            .can(["read"], ["Comment"], ConditionSpec::Unconditional)
            .build();
        assert!(!check(&rules, "read", &article(true))?);
        Ok(())
    }

    #[test]
    fn it_fails_on_fragments_it_reaches() {
        let rules = RuleSet::builder()
            .can(["read"], ["Article"], Fragment::new("published = ?", [true]))
            .build();
        assert!(matches!(
            check(&rules, "read", &article(true)),
            Err(AccessError::UnevaluableCondition { .. })
        ));
    }

    #[test]
    fn it_decides_before_reaching_unevaluable_rules() -> TestResult {
        let rules = RuleSet::builder()
            .can(["read"], ["Article"], Fragment::new("published = ?", [true]))
            .cannot(["read"], ["Article"], ConditionSpec::Unconditional)
            .build();
        assert!(!check(&rules, "read", &article(true))?);
        Ok(())
    }

    #[test]
    fn it_runs_blocks() -> TestResult {
        let rules = RuleSet::builder()
            .cannot(
                ["read"],
                ["Article"],
                Predicate::new(|instance| instance.attribute("published") == Some(false.into())),
            )
            .build();
        assert!(!check(&rules, "read", &article(false))?);
        assert!(!check(&rules, "read", &article(true))?);
        Ok(())
    }

    #[test]
    fn it_answers_subject_checks() {
        let rules = RuleSet::builder()
            .can(["read"], ["Article"], HashConditions::new().with("published", true))
            .build();
        assert!(check_subject(&rules, "read", "Article"));

        let rules = RuleSet::builder()
            .can(["read"], ["Article"], ConditionSpec::Unconditional)
            .cannot(["read"], ["Article"], HashConditions::new().with("published", false))
            .build();
        assert!(check_subject(&rules, "read", "Article"));

        let rules = RuleSet::builder()
            .can(["read"], ["Article"], HashConditions::new().with("published", true))
            .cannot(["read"], ["Article"], ConditionSpec::Unconditional)
            .build();
        assert!(!check_subject(&rules, "read", "Article"));
    }
}
