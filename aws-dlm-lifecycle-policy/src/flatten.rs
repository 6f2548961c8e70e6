/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! DLM response structures → configuration.
//!
//! Scalars the service omits fall back to their zero values. Nested rules the configuration
//! requires, and enum values it does not know, are reported as [`FlattenError`]s.

use crate::error::FlattenError;
use crate::model::{
    CreateRule, CrossRegionCopyRetainRule, CrossRegionCopyRule, IntervalUnit,
    LifecyclePolicyConfig, PolicyDetails, RetainRule, Schedule, Tags,
};
use crate::tags::{managed_tags, IgnoreTagsConfig};
use aws_sdk_dlm::types as dlm;
use std::str::FromStr;

const SCHEDULE: &str = "policy_details.schedule";

/// Flattens a whole policy, keeping only the resource tags this crate manages.
pub fn flatten_policy(
    policy: &dlm::LifecyclePolicy,
    ignore_tags: &IgnoreTagsConfig,
) -> Result<LifecyclePolicyConfig, FlattenError> {
    let policy_details = policy
        .policy_details()
        .ok_or_else(|| FlattenError::missing_attribute("policy_details"))?;
    let state = match policy.state() {
        Some(state) => parse("state", state.as_str())?,
        None => Default::default(),
    };

    Ok(LifecyclePolicyConfig {
        description: policy.description().unwrap_or_default().to_owned(),
        execution_role_arn: policy.execution_role_arn().unwrap_or_default().to_owned(),
        policy_details: flatten_policy_details(policy_details)?,
        state,
        tags: policy
            .tags()
            .map(|tags| managed_tags(tags, ignore_tags))
            .unwrap_or_default(),
    })
}

/// Flattens the details block; the response must carry exactly one schedule.
pub fn flatten_policy_details(details: &dlm::PolicyDetails) -> Result<PolicyDetails, FlattenError> {
    let resource_types = details
        .resource_types()
        .iter()
        .map(|resource_type| parse("policy_details.resource_types", resource_type.as_str()))
        .collect::<Result<Vec<_>, _>>()?;
    let schedule = match details.schedules() {
        [schedule] => flatten_schedule(schedule)?,
        schedules => {
            return Err(FlattenError::invalid_value(
                SCHEDULE,
                format!("expected exactly one schedule, found {}", schedules.len()),
            ))
        }
    };

    Ok(PolicyDetails {
        resource_types,
        schedule,
        target_tags: flatten_tags(details.target_tags()),
    })
}

/// Flattens a schedule. Its create and retain rules are required.
pub fn flatten_schedule(schedule: &dlm::Schedule) -> Result<Schedule, FlattenError> {
    let create_rule = schedule
        .create_rule()
        .ok_or_else(|| FlattenError::missing_attribute(format!("{SCHEDULE}.create_rule")))?;
    let retain_rule = schedule
        .retain_rule()
        .ok_or_else(|| FlattenError::missing_attribute(format!("{SCHEDULE}.retain_rule")))?;
    let cross_region_copy_rules = schedule
        .cross_region_copy_rules()
        .iter()
        .enumerate()
        .map(|(idx, rule)| {
            flatten_cross_region_copy_rule(
                rule,
                &format!("{SCHEDULE}.cross_region_copy_rule[{idx}]"),
            )
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Schedule {
        name: schedule.name().unwrap_or_default().to_owned(),
        copy_tags: schedule.copy_tags(),
        create_rule: flatten_create_rule(create_rule)?,
        retain_rule: flatten_retain_rule(retain_rule),
        cross_region_copy_rules,
        tags_to_add: flatten_tags(schedule.tags_to_add()),
    })
}

/// A non-empty cron expression takes precedence over the interval fields.
pub fn flatten_create_rule(rule: &dlm::CreateRule) -> Result<CreateRule, FlattenError> {
    if let Some(cron_expression) = rule.cron_expression().filter(|cron| !cron.is_empty()) {
        return Ok(CreateRule::cron(cron_expression));
    }
    let interval_unit = match rule.interval_unit() {
        Some(unit) => parse(
            &format!("{SCHEDULE}.create_rule.interval_unit"),
            unit.as_str(),
        )?,
        None => IntervalUnit::Hours,
    };
    Ok(CreateRule::Interval {
        interval: rule.interval().unwrap_or_default(),
        interval_unit,
        times: rule.times().to_vec(),
    })
}

/// Flattens a retention rule; a missing count reads as 0.
pub fn flatten_retain_rule(rule: &dlm::RetainRule) -> RetainRule {
    RetainRule {
        count: rule.count().unwrap_or_default(),
    }
}

fn flatten_cross_region_copy_rule(
    rule: &dlm::CrossRegionCopyRule,
    path: &str,
) -> Result<CrossRegionCopyRule, FlattenError> {
    let retain_rule = rule
        .retain_rule()
        .ok_or_else(|| FlattenError::missing_attribute(format!("{path}.retain_rule")))?;
    let interval_unit = retain_rule
        .interval_unit()
        .ok_or_else(|| {
            FlattenError::missing_attribute(format!("{path}.retain_rule.interval_unit"))
        })?;

    Ok(CrossRegionCopyRule {
        target_region: rule.target_region().unwrap_or_default().to_owned(),
        encrypted: rule.encrypted().unwrap_or_default(),
        cmk_arn: rule
            .cmk_arn()
            .filter(|arn| !arn.is_empty())
            .map(str::to_owned),
        copy_tags: rule.copy_tags().unwrap_or_default(),
        retain_rule: CrossRegionCopyRetainRule {
            interval: retain_rule.interval().unwrap_or_default(),
            interval_unit: parse(
                &format!("{path}.retain_rule.interval_unit"),
                interval_unit.as_str(),
            )?,
        },
    })
}

/// Converts a key/value tag list into a map.
pub fn flatten_tags(tags: &[dlm::Tag]) -> Tags {
    tags.iter()
        .map(|tag| {
            (
                tag.key().unwrap_or_default().to_owned(),
                tag.value().unwrap_or_default().to_owned(),
            )
        })
        .collect()
}

fn parse<T>(path: &str, value: &str) -> Result<T, FlattenError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|err: T::Err| FlattenError::invalid_value(path, err.to_string()))
}
