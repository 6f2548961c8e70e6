/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Configuration → DLM request structures.

use crate::model::{
    CreateRule, CrossRegionCopyRetainRule, CrossRegionCopyRule, PolicyDetails, PolicyState,
    RetainRule, Schedule, Tags,
};
use aws_sdk_dlm::types as dlm;
use std::collections::HashMap;

/// Builds the `PolicyDetails` sent with create and update requests.
pub fn expand_policy_details(details: &PolicyDetails) -> dlm::PolicyDetails {
    dlm::PolicyDetails::builder()
        .set_resource_types(Some(
            details
                .resource_types
                .iter()
                .map(|resource_type| dlm::ResourceTypeValues::from(resource_type.as_str()))
                .collect(),
        ))
        .schedules(expand_schedule(&details.schedule))
        .set_target_tags(Some(expand_tags(&details.target_tags)))
        .build()
}

/// Builds the single schedule of a policy.
pub fn expand_schedule(schedule: &Schedule) -> dlm::Schedule {
    let cross_region_copy_rules = schedule
        .cross_region_copy_rules
        .iter()
        .map(expand_cross_region_copy_rule)
        .collect::<Vec<_>>();

    dlm::Schedule::builder()
        .name(&schedule.name)
        .set_copy_tags(schedule.copy_tags)
        .create_rule(expand_create_rule(&schedule.create_rule))
        .retain_rule(expand_retain_rule(&schedule.retain_rule))
        .set_cross_region_copy_rules(non_empty(cross_region_copy_rules))
        .set_tags_to_add(non_empty(expand_tags(&schedule.tags_to_add)))
        .build()
}

/// A cron rule only carries the expression; interval, unit and times are left unset.
pub fn expand_create_rule(rule: &CreateRule) -> dlm::CreateRule {
    match rule {
        CreateRule::Cron { cron_expression } => dlm::CreateRule::builder()
            .cron_expression(cron_expression)
            .build(),
        CreateRule::Interval {
            interval,
            interval_unit,
            times,
        } => dlm::CreateRule::builder()
            .interval(*interval)
            .interval_unit(dlm::IntervalUnitValues::from(interval_unit.as_str()))
            .set_times(non_empty(times.clone()))
            .build(),
    }
}

/// Builds the retention rule of a schedule.
pub fn expand_retain_rule(rule: &RetainRule) -> dlm::RetainRule {
    dlm::RetainRule::builder().count(rule.count).build()
}

/// Builds a cross-region copy rule. An empty `cmk_arn` is not sent.
pub fn expand_cross_region_copy_rule(rule: &CrossRegionCopyRule) -> dlm::CrossRegionCopyRule {
    dlm::CrossRegionCopyRule::builder()
        .target_region(&rule.target_region)
        .encrypted(rule.encrypted)
        .set_cmk_arn(rule.cmk_arn.clone().filter(|arn| !arn.is_empty()))
        .copy_tags(rule.copy_tags)
        .retain_rule(expand_cross_region_copy_retain_rule(&rule.retain_rule))
        .build()
}

/// Builds the retention of cross-region copies.
pub fn expand_cross_region_copy_retain_rule(
    rule: &CrossRegionCopyRetainRule,
) -> dlm::CrossRegionCopyRetainRule {
    dlm::CrossRegionCopyRetainRule::builder()
        .interval(rule.interval)
        .interval_unit(dlm::RetentionIntervalUnitValues::from(
            rule.interval_unit.as_str(),
        ))
        .build()
}

/// Converts a tag map into the service's key/value list, in key order.
pub fn expand_tags(tags: &Tags) -> Vec<dlm::Tag> {
    tags.iter()
        .map(|(key, value)| dlm::Tag::builder().key(key).value(value).build())
        .collect()
}

pub(crate) fn expand_state(state: PolicyState) -> dlm::SettablePolicyStateValues {
    dlm::SettablePolicyStateValues::from(state.as_str())
}

/// Resource-level tags are a plain map on the wire.
pub(crate) fn expand_resource_tags(tags: &Tags) -> Option<HashMap<String, String>> {
    if tags.is_empty() {
        return None;
    }
    Some(tags.clone().into_iter().collect())
}

fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    (!items.is_empty()).then_some(items)
}
