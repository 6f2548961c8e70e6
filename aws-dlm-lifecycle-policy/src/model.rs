/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Declarative configuration of a DLM lifecycle policy.
//!
//! Field names follow the resource schema (`snake_case`, singular block names such as
//! `schedule` and `cross_region_copy_rule`) so that a configuration document deserializes
//! directly into these types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Key/value tags, ordered by key.
pub type Tags = BTreeMap<String, String>;

/// A string that is not a member of one of the enumerated configuration values.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("`{value}` is not a valid {kind} (expected one of {expected:?})")]
pub struct UnknownValue {
    kind: &'static str,
    value: String,
    expected: &'static [&'static str],
}

macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($(#[$variant_meta:meta])* $variant:ident => $value:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[serde(rename = $value)]
                $variant,
            )+
        }

        impl $name {
            /// All accepted wire values, in declaration order.
            pub const VALUES: &'static [&'static str] = &[$($value),+];

            /// Returns the wire representation of this value.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $value,)+
                }
            }
        }

        impl FromStr for $name {
            type Err = UnknownValue;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $($value => Ok($name::$variant),)+
                    other => Err(UnknownValue {
                        kind: stringify!($name),
                        value: other.to_owned(),
                        expected: Self::VALUES,
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

string_enum! {
    /// Resource type targeted by a policy.
    ResourceType {
        /// EBS volumes
        Volume => "VOLUME",
        /// EC2 instances (multi-volume snapshots)
        Instance => "INSTANCE",
    }
}

string_enum! {
    /// Unit of a create rule interval.
    IntervalUnit {
        /// Hours
        Hours => "HOURS",
    }
}

string_enum! {
    /// Unit of a cross-region copy retention period.
    RetentionIntervalUnit {
        /// Days
        Days => "DAYS",
        /// Weeks
        Weeks => "WEEKS",
        /// Months
        Months => "MONTHS",
        /// Years
        Years => "YEARS",
    }
}

string_enum! {
    /// Activation state of a policy.
    ///
    /// `ERROR` is reported by the service and can be read back, but it cannot be configured.
    PolicyState {
        /// The policy runs its schedule.
        Enabled => "ENABLED",
        /// The policy is paused.
        Disabled => "DISABLED",
        /// The service could not evaluate the policy.
        Error => "ERROR",
    }
}

impl PolicyState {
    /// Returns true for the states that may be set through configuration.
    pub fn is_settable(&self) -> bool {
        matches!(self, PolicyState::Enabled | PolicyState::Disabled)
    }
}

impl Default for PolicyState {
    fn default() -> Self {
        PolicyState::Enabled
    }
}

/// Top-level configuration of a lifecycle policy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LifecyclePolicyConfig {
    /// Description of the policy.
    pub description: String,
    /// ARN of the IAM role DLM assumes to run the policy.
    pub execution_role_arn: String,
    /// What the policy targets and how it schedules snapshots.
    pub policy_details: PolicyDetails,
    /// Desired activation state. Defaults to `ENABLED`.
    #[serde(default)]
    pub state: PolicyState,
    /// Tags applied to the policy itself.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: Tags,
}

/// The `policy_details` block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyDetails {
    /// Resource types the policy snapshots.
    pub resource_types: Vec<ResourceType>,
    /// The snapshot schedule.
    pub schedule: Schedule,
    /// Resources carrying all of these tags are targeted.
    pub target_tags: Tags,
}

/// The `schedule` block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Schedule {
    /// Name of the schedule.
    pub name: String,
    /// Copy tags from the source volume to the snapshot. When unset, the service value is kept.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copy_tags: Option<bool>,
    /// When snapshots are created.
    pub create_rule: CreateRule,
    /// How many snapshots are kept.
    pub retain_rule: RetainRule,
    /// Copies of each snapshot made in other regions.
    #[serde(
        default,
        rename = "cross_region_copy_rule",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub cross_region_copy_rules: Vec<CrossRegionCopyRule>,
    /// Tags added to every snapshot the schedule creates.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags_to_add: Tags,
}

/// When snapshots are taken.
///
/// In configuration this is a single flat block; `cron_expression` conflicts with
/// `interval`, `interval_unit` and `times`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CreateRuleBlock", into = "CreateRuleBlock")]
pub enum CreateRule {
    /// Schedule expressed as a `cron(...)` expression.
    Cron {
        /// The expression, including the `cron(` prefix.
        cron_expression: String,
    },
    /// Snapshot every `interval` units, optionally starting at a fixed time of day.
    Interval {
        /// Number of `interval_unit`s between snapshots.
        interval: i32,
        /// Unit of `interval`.
        interval_unit: IntervalUnit,
        /// Start time in `hh:mm` UTC. At most one entry; when empty the service picks one.
        times: Vec<String>,
    },
}

impl CreateRule {
    /// Interval rule in hours with no fixed start time.
    pub fn every_hours(interval: i32) -> Self {
        CreateRule::Interval {
            interval,
            interval_unit: IntervalUnit::Hours,
            times: Vec::new(),
        }
    }

    /// Cron rule.
    pub fn cron(cron_expression: impl Into<String>) -> Self {
        CreateRule::Cron {
            cron_expression: cron_expression.into(),
        }
    }
}

/// A create rule named both ways, or neither.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CreateRuleError {
    /// Both a cron expression and interval fields were given.
    #[error("cron_expression conflicts with interval, interval_unit and times")]
    Conflict,
    /// Neither a cron expression nor an interval was given.
    #[error("one of cron_expression or interval must be set")]
    MissingSchedule,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct CreateRuleBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cron_expression: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    interval: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    interval_unit: Option<IntervalUnit>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    times: Vec<String>,
}

impl TryFrom<CreateRuleBlock> for CreateRule {
    type Error = CreateRuleError;

    fn try_from(block: CreateRuleBlock) -> Result<Self, Self::Error> {
        let uses_interval =
            block.interval.is_some() || block.interval_unit.is_some() || !block.times.is_empty();
        // an empty cron expression is the same as an absent one
        match block.cron_expression.filter(|cron| !cron.is_empty()) {
            Some(_) if uses_interval => Err(CreateRuleError::Conflict),
            Some(cron_expression) => Ok(CreateRule::Cron { cron_expression }),
            None => match block.interval {
                Some(interval) => Ok(CreateRule::Interval {
                    interval,
                    interval_unit: block.interval_unit.unwrap_or(IntervalUnit::Hours),
                    times: block.times,
                }),
                None => Err(CreateRuleError::MissingSchedule),
            },
        }
    }
}

impl From<CreateRule> for CreateRuleBlock {
    fn from(rule: CreateRule) -> Self {
        match rule {
            CreateRule::Cron { cron_expression } => CreateRuleBlock {
                cron_expression: Some(cron_expression),
                ..Default::default()
            },
            CreateRule::Interval {
                interval,
                interval_unit,
                times,
            } => CreateRuleBlock {
                cron_expression: None,
                interval: Some(interval),
                interval_unit: Some(interval_unit),
                times,
            },
        }
    }
}

/// The `retain_rule` block of a schedule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetainRule {
    /// Number of snapshots to keep.
    pub count: i32,
}

/// A `cross_region_copy_rule` block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CrossRegionCopyRule {
    /// Region the copies are made in.
    pub target_region: String,
    /// Encrypt the copies.
    pub encrypted: bool,
    /// KMS key used to encrypt the copies. An empty string is treated as unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cmk_arn: Option<String>,
    /// Copy the snapshot's tags to the copies. Unset reads as `false`.
    #[serde(default)]
    pub copy_tags: bool,
    /// How long copies are kept.
    pub retain_rule: CrossRegionCopyRetainRule,
}

/// Retention of cross-region copies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CrossRegionCopyRetainRule {
    /// Number of `interval_unit`s a copy is kept.
    pub interval: i32,
    /// Unit of `interval`.
    pub interval_unit: RetentionIntervalUnit,
}

/// Local state of one managed policy, as last read from the service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyResource {
    /// The policy ID, e.g. `policy-0123456789abcdef0`.
    pub id: String,
    /// The policy ARN. Computed by the service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,
    /// The configuration as flattened from the service.
    pub config: LifecyclePolicyConfig,
}
