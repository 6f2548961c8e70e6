/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Resource tags on the policy itself.
//!
//! Keys with the `aws:` prefix belong to AWS and are never read into state or diffed.
//! Provider-wide [`IgnoreTagsConfig`] hides further keys the same way.

use crate::error::{PolicyError, SdkOperationError};
use crate::model::Tags;
use aws_sdk_dlm::Client;
use std::collections::BTreeSet;

/// Prefix reserved for AWS-managed tag keys.
pub const AWS_TAG_PREFIX: &str = "aws:";

/// Returns true for tag keys reserved by AWS.
pub fn is_system_tag(key: &str) -> bool {
    key.starts_with(AWS_TAG_PREFIX)
}

/// Tag keys that are managed outside of this resource and must be left alone.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IgnoreTagsConfig {
    keys: BTreeSet<String>,
    key_prefixes: Vec<String>,
}

impl IgnoreTagsConfig {
    /// An empty configuration; only `aws:` keys are ignored.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ignore a tag key exactly.
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.keys.insert(key.into());
        self
    }

    /// Ignore every tag key starting with `prefix`.
    pub fn key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefixes.push(prefix.into());
        self
    }

    /// Returns true if `key` is hidden from state and diffs.
    pub fn is_ignored(&self, key: &str) -> bool {
        is_system_tag(key)
            || self.keys.contains(key)
            || self
                .key_prefixes
                .iter()
                .any(|prefix| key.starts_with(prefix.as_str()))
    }
}

/// Copies the tags this resource manages out of `tags`.
pub fn managed_tags<'a, I>(tags: I, ignore: &IgnoreTagsConfig) -> Tags
where
    I: IntoIterator<Item = (&'a String, &'a String)>,
{
    tags.into_iter()
        .filter(|(key, _)| !ignore.is_ignored(key))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Tag changes between two states: keys to remove and key/values to set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TagDiff {
    removed: Vec<String>,
    upserted: Tags,
}

impl TagDiff {
    /// Computes the changes that turn `old` into `new`.
    pub fn new(old: &Tags, new: &Tags, ignore: &IgnoreTagsConfig) -> Self {
        let old = managed_tags(old, ignore);
        let new = managed_tags(new, ignore);
        let removed = old
            .keys()
            .filter(|key| !new.contains_key(*key))
            .cloned()
            .collect();
        let upserted = new
            .into_iter()
            .filter(|(key, value)| old.get(key) != Some(value))
            .collect();
        Self { removed, upserted }
    }

    /// Keys to remove with `UntagResource`.
    pub fn removed(&self) -> &[String] {
        &self.removed
    }

    /// Tags to add or overwrite with `TagResource`.
    pub fn upserted(&self) -> &Tags {
        &self.upserted
    }

    /// Returns true if no tag changes.
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.upserted.is_empty()
    }
}

/// Applies `diff` to the resource at `arn`. Removals are sent before additions.
pub(crate) async fn update_tags(
    client: &Client,
    arn: &str,
    diff: &TagDiff,
) -> Result<(), PolicyError> {
    let tagging_failed = |source: SdkOperationError| PolicyError::Tagging {
        arn: arn.to_owned(),
        source,
    };

    if !diff.removed.is_empty() {
        tracing::info!(arn, keys = ?diff.removed, "removing DLM lifecycle policy tags");
        client
            .untag_resource()
            .resource_arn(arn)
            .set_tag_keys(Some(diff.removed.clone()))
            .send()
            .await
            .map_err(|err| tagging_failed(err.into()))?;
    }

    if !diff.upserted.is_empty() {
        tracing::info!(arn, keys = ?diff.upserted.keys().collect::<Vec<_>>(), "setting DLM lifecycle policy tags");
        client
            .tag_resource()
            .resource_arn(arn)
            .set_tags(Some(diff.upserted.clone().into_iter().collect()))
            .send()
            .await
            .map_err(|err| tagging_failed(err.into()))?;
    }

    Ok(())
}
