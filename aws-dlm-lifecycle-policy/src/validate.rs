/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Schema rules for lifecycle policy configuration.

use crate::error::{ValidationErrors, Violation};
use crate::model::{CreateRule, CrossRegionCopyRule, LifecyclePolicyConfig, Schedule};
use once_cell::sync::Lazy;
use regex::Regex;

static DESCRIPTION: Lazy<Regex> = Lazy::new(|| Regex::new("^[0-9A-Za-z _-]+$").unwrap());
static ARN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^arn:[\w-]+:([a-zA-Z0-9\-])+:([a-z]{2}-(gov-)?[a-z]+-\d{1})?:(\d{12})?:(.*)$")
        .unwrap()
});
static CRON_EXPRESSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^cron\([^\n]{11,100}\)$").unwrap());
static TIME_OF_DAY: Lazy<Regex> =
    Lazy::new(|| Regex::new("^(0[0-9]|1[0-9]|2[0-3]):[0-5][0-9]$").unwrap());

/// Hour intervals accepted by an interval create rule.
pub const VALID_INTERVALS: &[i32] = &[1, 2, 3, 4, 6, 8, 12, 24];
/// Inclusive bounds of `retain_rule.count`.
pub const RETAIN_COUNT_RANGE: std::ops::RangeInclusive<i32> = 1..=1000;
/// Maximum length of a schedule name.
pub const MAX_SCHEDULE_NAME_LEN: usize = 500;

const SCHEDULE: &str = "policy_details.schedule";

/// Returns true if `value` looks like an ARN.
pub fn is_valid_arn(value: &str) -> bool {
    ARN.is_match(value)
}

impl LifecyclePolicyConfig {
    /// Checks the configuration against the resource schema.
    ///
    /// All violations are reported together rather than stopping at the first.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::default();

        v.matches(
            &DESCRIPTION,
            &self.description,
            "description",
            "must contain only alphanumerics, spaces, underscores and hyphens",
        );
        v.arn(&self.execution_role_arn, "execution_role_arn");
        v.check(
            self.state.is_settable(),
            "state",
            "must be one of ENABLED or DISABLED",
        );
        v.check(
            !self.policy_details.resource_types.is_empty(),
            "policy_details.resource_types",
            "at least one resource type is required",
        );
        v.schedule(&self.policy_details.schedule);

        v.finish()
    }
}

#[derive(Default)]
struct Validator {
    violations: Vec<Violation>,
}

impl Validator {
    fn check(&mut self, ok: bool, path: impl Into<String>, message: impl Into<String>) {
        if !ok {
            self.violations.push(Violation::new(path, message));
        }
    }

    fn matches(&mut self, pattern: &Regex, value: &str, path: impl Into<String>, message: &str) {
        self.check(
            pattern.is_match(value),
            path,
            format!("{message} (got {value:?})"),
        );
    }

    fn arn(&mut self, value: &str, path: impl Into<String>) {
        self.check(
            is_valid_arn(value),
            path,
            format!("{value:?} is not a valid ARN"),
        );
    }

    fn schedule(&mut self, schedule: &Schedule) {
        self.check(
            schedule.name.chars().count() <= MAX_SCHEDULE_NAME_LEN,
            format!("{SCHEDULE}.name"),
            format!("must be at most {MAX_SCHEDULE_NAME_LEN} characters"),
        );
        self.create_rule(&schedule.create_rule);
        self.check(
            RETAIN_COUNT_RANGE.contains(&schedule.retain_rule.count),
            format!("{SCHEDULE}.retain_rule.count"),
            format!(
                "must be between {} and {} (got {})",
                RETAIN_COUNT_RANGE.start(),
                RETAIN_COUNT_RANGE.end(),
                schedule.retain_rule.count
            ),
        );
        for (idx, rule) in schedule.cross_region_copy_rules.iter().enumerate() {
            self.cross_region_copy_rule(rule, &format!("{SCHEDULE}.cross_region_copy_rule[{idx}]"));
        }
    }

    fn create_rule(&mut self, rule: &CreateRule) {
        let path = format!("{SCHEDULE}.create_rule");
        match rule {
            CreateRule::Cron { cron_expression } => self.matches(
                &CRON_EXPRESSION,
                cron_expression,
                format!("{path}.cron_expression"),
                "must be of the form cron(fields)",
            ),
            CreateRule::Interval {
                interval, times, ..
            } => {
                self.check(
                    VALID_INTERVALS.contains(interval),
                    format!("{path}.interval"),
                    format!("must be one of {VALID_INTERVALS:?} (got {interval})"),
                );
                self.check(
                    times.len() <= 1,
                    format!("{path}.times"),
                    "at most one start time is supported",
                );
                for (idx, time) in times.iter().enumerate() {
                    self.matches(
                        &TIME_OF_DAY,
                        time,
                        format!("{path}.times[{idx}]"),
                        "must be a 24 hour hh:mm time",
                    );
                }
            }
        }
    }

    fn cross_region_copy_rule(&mut self, rule: &CrossRegionCopyRule, path: &str) {
        self.check(
            !rule.target_region.is_empty(),
            format!("{path}.target_region"),
            "must not be empty",
        );
        if let Some(cmk_arn) = rule.cmk_arn.as_deref().filter(|arn| !arn.is_empty()) {
            self.arn(cmk_arn, format!("{path}.cmk_arn"));
        }
    }

    fn finish(self) -> Result<(), ValidationErrors> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors::new(self.violations))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        CrossRegionCopyRetainRule, IntervalUnit, PolicyDetails, PolicyState, ResourceType,
        RetainRule, RetentionIntervalUnit, Tags,
    };
    use pretty_assertions::assert_eq;

    fn config() -> LifecyclePolicyConfig {
        LifecyclePolicyConfig {
            description: "tf-acc-basic".to_owned(),
            execution_role_arn: "arn:aws:iam::123456789012:role/dlm-lifecycle".to_owned(),
            policy_details: PolicyDetails {
                resource_types: vec![ResourceType::Volume],
                schedule: Schedule {
                    name: "tf-acc-basic".to_owned(),
                    copy_tags: None,
                    create_rule: CreateRule::every_hours(12),
                    retain_rule: RetainRule { count: 10 },
                    cross_region_copy_rules: Vec::new(),
                    tags_to_add: Tags::new(),
                },
                target_tags: Tags::from([("tf-acc-test".to_owned(), "basic".to_owned())]),
            },
            state: PolicyState::Enabled,
            tags: Tags::new(),
        }
    }

    fn paths(errors: &ValidationErrors) -> Vec<&str> {
        errors.violations().iter().map(|v| v.path()).collect()
    }

    #[test]
    fn valid_config() {
        config().validate().unwrap();
    }

    #[test]
    fn description_charset() {
        let mut config = config();
        config.description = "snapshots (daily)".to_owned();
        let errors = config.validate().unwrap_err();
        assert_eq!(vec!["description"], paths(&errors));
    }

    #[test]
    fn execution_role_must_be_an_arn() {
        let mut config = config();
        config.execution_role_arn = "dlm-lifecycle".to_owned();
        assert!(config.validate().unwrap_err().contains("execution_role_arn"));

        assert!(is_valid_arn(
            "arn:aws-us-gov:kms:us-gov-west-1:123456789012:key/1234abcd"
        ));
        assert!(is_valid_arn("arn:aws:iam::123456789012:role/service-role/x"));
        assert!(!is_valid_arn("arn:aws:iam"));
    }

    #[test]
    fn error_state_is_not_settable() {
        let mut config = config();
        config.state = PolicyState::Error;
        assert_eq!(vec!["state"], paths(&config.validate().unwrap_err()));
    }

    #[test]
    fn interval_and_times() {
        let mut config = config();
        config.policy_details.schedule.create_rule = CreateRule::Interval {
            interval: 5,
            interval_unit: IntervalUnit::Hours,
            times: vec!["24:00".to_owned(), "09:00".to_owned()],
        };
        let errors = config.validate().unwrap_err();
        assert_eq!(
            vec![
                "policy_details.schedule.create_rule.interval",
                "policy_details.schedule.create_rule.times",
                "policy_details.schedule.create_rule.times[0]",
            ],
            paths(&errors)
        );
    }

    #[test]
    fn cron_expression_shape() {
        let mut config = config();
        config.policy_details.schedule.create_rule = CreateRule::cron("cron(0 12 * * ? *)");
        config.validate().unwrap();

        config.policy_details.schedule.create_rule = CreateRule::cron("rate(1 day)");
        assert!(config
            .validate()
            .unwrap_err()
            .contains("policy_details.schedule.create_rule.cron_expression"));

        // the expression body must be at least 11 characters
        config.policy_details.schedule.create_rule = CreateRule::cron("cron(0 12 *)");
        assert!(config.validate().is_err());
    }

    #[test]
    fn retain_count_bounds() {
        for (count, ok) in [(0, false), (1, true), (1000, true), (1001, false)] {
            let mut config = config();
            config.policy_details.schedule.retain_rule.count = count;
            assert_eq!(ok, config.validate().is_ok(), "count = {count}");
        }
    }

    #[test]
    fn schedule_name_length() {
        let mut config = config();
        config.policy_details.schedule.name = "a".repeat(MAX_SCHEDULE_NAME_LEN + 1);
        assert!(config
            .validate()
            .unwrap_err()
            .contains("policy_details.schedule.name"));
    }

    #[test]
    fn cross_region_copy_rule_fields() {
        let mut config = config();
        config.policy_details.schedule.cross_region_copy_rules = vec![
            CrossRegionCopyRule {
                target_region: "us-west-2".to_owned(),
                encrypted: true,
                cmk_arn: Some(String::new()),
                copy_tags: false,
                retain_rule: CrossRegionCopyRetainRule {
                    interval: 15,
                    interval_unit: RetentionIntervalUnit::Days,
                },
            },
            CrossRegionCopyRule {
                target_region: String::new(),
                encrypted: true,
                cmk_arn: Some("alias/dlm".to_owned()),
                copy_tags: false,
                retain_rule: CrossRegionCopyRetainRule {
                    interval: 1,
                    interval_unit: RetentionIntervalUnit::Years,
                },
            },
        ];
        let errors = config.validate().unwrap_err();
        assert_eq!(
            vec![
                "policy_details.schedule.cross_region_copy_rule[1].target_region",
                "policy_details.schedule.cross_region_copy_rule[1].cmk_arn",
            ],
            paths(&errors)
        );
    }

    #[test]
    fn all_violations_are_reported() {
        let mut config = config();
        config.description = String::new();
        config.policy_details.resource_types.clear();
        config.policy_details.schedule.retain_rule.count = 0;
        let errors = config.validate().unwrap_err();
        assert_eq!(3, errors.violations().len());
        assert!(errors.to_string().starts_with("description: "));
    }
}
