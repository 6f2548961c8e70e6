/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Change detection between the state read back from DLM and a desired configuration.

use crate::model::{CreateRule, LifecyclePolicyConfig, PolicyDetails, PolicyResource, PolicyState};
use crate::tags::{IgnoreTagsConfig, TagDiff};
use std::fmt;

/// Attributes that cannot be changed by `UpdateLifecyclePolicy`.
const FORCE_NEW: &str = "policy_details.schedule.copy_tags";

/// Fields that differ between a policy's state and its desired configuration.
///
/// Each `Some` holds the desired value to send; `None` means unchanged.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PolicyDiff {
    pub description: Option<String>,
    pub execution_role_arn: Option<String>,
    pub state: Option<PolicyState>,
    /// The full desired details, with computed fields filled in from the prior state.
    pub policy_details: Option<PolicyDetails>,
    /// Resource tag changes, applied with the tagging APIs.
    pub tags: TagDiff,
    /// Set when a force-new attribute changed.
    pub replace_reason: Option<&'static str>,
}

impl PolicyDiff {
    /// Compares `prior` (as read) with `desired`.
    ///
    /// Computed attributes left unset in `desired` (`schedule.copy_tags` and an empty
    /// `create_rule.times`) keep their prior value and do not count as changes.
    pub fn between(
        prior: &LifecyclePolicyConfig,
        desired: &LifecyclePolicyConfig,
        ignore_tags: &IgnoreTagsConfig,
    ) -> Self {
        let details = with_computed(&desired.policy_details, &prior.policy_details);
        let replace_reason = (details.schedule.copy_tags
            != prior.policy_details.schedule.copy_tags)
            .then_some(FORCE_NEW);

        PolicyDiff {
            description: changed(&prior.description, &desired.description),
            execution_role_arn: changed(&prior.execution_role_arn, &desired.execution_role_arn),
            state: changed(&prior.state, &desired.state),
            policy_details: changed(&prior.policy_details, &details),
            tags: TagDiff::new(&prior.tags, &desired.tags, ignore_tags),
            replace_reason,
        }
    }

    /// Returns true if `UpdateLifecyclePolicy` needs to be called.
    pub fn updates_policy(&self) -> bool {
        self.description.is_some()
            || self.execution_role_arn.is_some()
            || self.state.is_some()
            || self.policy_details.is_some()
    }

    /// Returns true if nothing changed.
    pub fn is_empty(&self) -> bool {
        !self.updates_policy() && self.tags.is_empty()
    }

    /// Names of the changed top-level attributes.
    pub fn changed_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.description.is_some() {
            fields.push("description");
        }
        if self.execution_role_arn.is_some() {
            fields.push("execution_role_arn");
        }
        if self.state.is_some() {
            fields.push("state");
        }
        if self.policy_details.is_some() {
            fields.push("policy_details");
        }
        if !self.tags.is_empty() {
            fields.push("tags");
        }
        fields
    }
}

fn changed<T: PartialEq + Clone>(prior: &T, desired: &T) -> Option<T> {
    (prior != desired).then(|| desired.clone())
}

fn with_computed(desired: &PolicyDetails, prior: &PolicyDetails) -> PolicyDetails {
    let mut details = desired.clone();
    let schedule = &mut details.schedule;
    if schedule.copy_tags.is_none() {
        schedule.copy_tags = prior.schedule.copy_tags;
    }
    if let (
        CreateRule::Interval { times, .. },
        CreateRule::Interval {
            times: prior_times, ..
        },
    ) = (&mut schedule.create_rule, &prior.schedule.create_rule)
    {
        if times.is_empty() {
            times.clone_from(prior_times);
        }
    }
    details
}

/// What has to happen to bring a policy to its desired configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Plan {
    /// No policy exists yet.
    Create,
    /// The policy already matches.
    NoOp,
    /// The policy can be changed in place.
    Update(PolicyDiff),
    /// A force-new attribute changed; delete and create.
    Replace(PolicyDiff),
}

impl Plan {
    /// Plans the transition from `prior` (or nothing) to `desired`.
    pub fn new(
        prior: Option<&PolicyResource>,
        desired: &LifecyclePolicyConfig,
        ignore_tags: &IgnoreTagsConfig,
    ) -> Self {
        let Some(prior) = prior else {
            return Plan::Create;
        };
        let diff = PolicyDiff::between(&prior.config, desired, ignore_tags);
        if diff.replace_reason.is_some() {
            Plan::Replace(diff)
        } else if diff.is_empty() {
            Plan::NoOp
        } else {
            Plan::Update(diff)
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Plan::Create => f.write_str("create"),
            Plan::NoOp => f.write_str("no changes"),
            Plan::Update(diff) => {
                write!(f, "update in-place ({})", diff.changed_fields().join(", "))
            }
            Plan::Replace(diff) => write!(
                f,
                "replace ({} forces a new policy)",
                diff.replace_reason.unwrap_or(FORCE_NEW)
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        CrossRegionCopyRetainRule, CrossRegionCopyRule, IntervalUnit, ResourceType, RetainRule,
        RetentionIntervalUnit, Schedule, Tags,
    };
    use pretty_assertions::assert_eq;

    fn prior() -> LifecyclePolicyConfig {
        LifecyclePolicyConfig {
            description: "tf-acc-basic".to_owned(),
            execution_role_arn: "arn:aws:iam::123456789012:role/dlm-lifecycle".to_owned(),
            policy_details: PolicyDetails {
                resource_types: vec![ResourceType::Volume],
                schedule: Schedule {
                    name: "tf-acc-basic".to_owned(),
                    copy_tags: Some(false),
                    create_rule: CreateRule::Interval {
                        interval: 12,
                        interval_unit: IntervalUnit::Hours,
                        times: vec!["09:00".to_owned()],
                    },
                    retain_rule: RetainRule { count: 10 },
                    cross_region_copy_rules: Vec::new(),
                    tags_to_add: Tags::new(),
                },
                target_tags: Tags::from([("tf-acc-test".to_owned(), "basic".to_owned())]),
            },
            state: PolicyState::Enabled,
            tags: Tags::from([("Name".to_owned(), "tf-acc-basic".to_owned())]),
        }
    }

    fn resource(config: LifecyclePolicyConfig) -> PolicyResource {
        PolicyResource {
            id: "policy-0123456789abcdef0".to_owned(),
            arn: Some("arn:aws:dlm:us-east-1:123456789012:policy/policy-0123456789abcdef0".to_owned()),
            config,
        }
    }

    #[test]
    fn unset_computed_fields_keep_prior_values() {
        let mut desired = prior();
        desired.policy_details.schedule.copy_tags = None;
        desired.policy_details.schedule.create_rule = CreateRule::every_hours(12);
        let diff = PolicyDiff::between(&prior(), &desired, &IgnoreTagsConfig::new());
        assert!(diff.is_empty(), "{diff:?}");
    }

    #[test]
    fn changed_fields_carry_desired_values() {
        let mut desired = prior();
        desired.description = "tf-acc-updated".to_owned();
        desired.state = PolicyState::Disabled;
        desired.policy_details.schedule.retain_rule.count = 20;
        desired.policy_details.schedule.create_rule = CreateRule::every_hours(24);
        let diff = PolicyDiff::between(&prior(), &desired, &IgnoreTagsConfig::new());

        assert_eq!(Some("tf-acc-updated".to_owned()), diff.description);
        assert_eq!(None, diff.execution_role_arn);
        assert_eq!(Some(PolicyState::Disabled), diff.state);
        let details = diff.policy_details.as_ref().expect("details changed");
        assert_eq!(20, details.schedule.retain_rule.count);
        // the prior start time is carried over
        assert_eq!(
            CreateRule::Interval {
                interval: 24,
                interval_unit: IntervalUnit::Hours,
                times: vec!["09:00".to_owned()],
            },
            details.schedule.create_rule
        );
        assert_eq!(
            vec!["description", "state", "policy_details"],
            diff.changed_fields()
        );
    }

    #[test]
    fn tag_only_change_skips_policy_update() {
        let mut desired = prior();
        desired.tags.insert("Owner".to_owned(), "team".to_owned());
        let diff = PolicyDiff::between(&prior(), &desired, &IgnoreTagsConfig::new());
        assert!(!diff.updates_policy());
        assert_eq!(vec!["tags"], diff.changed_fields());
        assert_eq!(
            "update in-place (tags)",
            Plan::new(Some(&resource(prior())), &desired, &IgnoreTagsConfig::new()).to_string()
        );
    }

    #[test]
    fn copy_tags_forces_replacement() {
        let mut desired = prior();
        desired.policy_details.schedule.copy_tags = Some(true);
        let plan = Plan::new(Some(&resource(prior())), &desired, &IgnoreTagsConfig::new());
        assert!(matches!(plan, Plan::Replace(_)), "{plan:?}");
        assert_eq!(
            "replace (policy_details.schedule.copy_tags forces a new policy)",
            plan.to_string()
        );
    }

    #[test]
    fn unset_copy_rule_copy_tags_matches_false_read_back() {
        let desired: LifecyclePolicyConfig = serde_json::from_value(serde_json::json!({
            "description": "tf-acc-basic",
            "execution_role_arn": "arn:aws:iam::123456789012:role/dlm-lifecycle",
            "policy_details": {
                "resource_types": ["VOLUME"],
                "schedule": {
                    "name": "tf-acc-basic",
                    "copy_tags": false,
                    "create_rule": { "interval": 12, "times": ["09:00"] },
                    "retain_rule": { "count": 10 },
                    "cross_region_copy_rule": [{
                        "target_region": "us-west-2",
                        "encrypted": false,
                        "retain_rule": { "interval": 1, "interval_unit": "MONTHS" }
                    }]
                },
                "target_tags": { "tf-acc-test": "basic" }
            },
            "tags": { "Name": "tf-acc-basic" }
        }))
        .unwrap();

        // the service reports CopyTags=false for the copy rule
        let mut prior = prior();
        prior.policy_details.schedule.cross_region_copy_rules = vec![CrossRegionCopyRule {
            target_region: "us-west-2".to_owned(),
            encrypted: false,
            cmk_arn: None,
            copy_tags: false,
            retain_rule: CrossRegionCopyRetainRule {
                interval: 1,
                interval_unit: RetentionIntervalUnit::Months,
            },
        }];

        assert_eq!(
            Plan::NoOp,
            Plan::new(Some(&resource(prior)), &desired, &IgnoreTagsConfig::new())
        );
    }

    #[test]
    fn plan_create_and_noop() {
        let ignore = IgnoreTagsConfig::new();
        assert_eq!(Plan::Create, Plan::new(None, &prior(), &ignore));
        assert_eq!(
            Plan::NoOp,
            Plan::new(Some(&resource(prior())), &prior(), &ignore)
        );
    }
}
