/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use crate::diff::{Plan, PolicyDiff};
use crate::error::{is_resource_not_found, FlattenError, PolicyError};
use crate::expand::{expand_policy_details, expand_resource_tags, expand_state};
use crate::flatten::flatten_policy;
use crate::model::{LifecyclePolicyConfig, PolicyResource, Tags};
use crate::tags::{is_system_tag, update_tags, IgnoreTagsConfig};
use aws_sdk_dlm::config::BehaviorVersion;
use aws_sdk_dlm::Client;
use aws_types::SdkConfig;

/// Fluent style builder for [LifecyclePolicyResource]
#[derive(Debug, Clone, Default)]
pub struct Builder {
    client: Option<Client>,
    sdk_config: Option<SdkConfig>,
    ignore_tags: IgnoreTagsConfig,
}

impl Builder {
    fn new() -> Self {
        Self::default()
    }

    /// Use an existing DLM client. Takes precedence over [Builder::sdk_config].
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Set the configuration used to construct the DLM client
    pub fn sdk_config(mut self, config: SdkConfig) -> Self {
        self.sdk_config = Some(config);
        self
    }

    /// Tag keys managed outside of this resource.
    ///
    /// Matching keys are left out of the state read back and are never added or removed.
    pub fn ignore_tags(mut self, ignore_tags: IgnoreTagsConfig) -> Self {
        self.ignore_tags = ignore_tags;
        self
    }

    /// Consumes the builder and constructs a [LifecyclePolicyResource]
    pub fn build(self) -> LifecyclePolicyResource {
        self.into()
    }
}

impl From<Builder> for LifecyclePolicyResource {
    fn from(value: Builder) -> Self {
        let client = value.client.unwrap_or_else(|| {
            let sdk_config = value.sdk_config.unwrap_or_else(|| {
                SdkConfig::builder()
                    .behavior_version(BehaviorVersion::latest())
                    .build()
            });
            Client::new(&sdk_config)
        });
        Self {
            client,
            ignore_tags: value.ignore_tags,
        }
    }
}

/// Creates, reads, updates and deletes DLM lifecycle policies.
///
/// Every mutating operation finishes by reading the policy back, so the returned
/// [PolicyResource] always reflects what the service stored.
#[derive(Debug, Clone)]
pub struct LifecyclePolicyResource {
    client: Client,
    ignore_tags: IgnoreTagsConfig,
}

impl LifecyclePolicyResource {
    /// Create a new [Builder]
    pub fn builder() -> Builder {
        Builder::new()
    }

    /// The DLM client requests are sent with.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Tag keys this resource leaves alone.
    pub fn ignore_tags(&self) -> &IgnoreTagsConfig {
        &self.ignore_tags
    }

    /// Create a policy from `config` and return its state.
    pub async fn create(&self, config: &LifecyclePolicyConfig) -> Result<PolicyResource, PolicyError> {
        config.validate()?;

        let tags: Tags = config
            .tags
            .iter()
            .filter(|(key, _)| !is_system_tag(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        let request = self
            .client
            .create_lifecycle_policy()
            .description(&config.description)
            .execution_role_arn(&config.execution_role_arn)
            .policy_details(expand_policy_details(&config.policy_details))
            .state(expand_state(config.state))
            .set_tags(expand_resource_tags(&tags));

        tracing::info!(description = %config.description, "creating DLM lifecycle policy");
        tracing::debug!(input = ?request.as_input(), "CreateLifecyclePolicy");
        let output = request
            .send()
            .await
            .map_err(|err| PolicyError::Create { source: err.into() })?;
        let policy_id = output
            .policy_id()
            .filter(|id| !id.is_empty())
            .ok_or(PolicyError::MissingPolicyId)?
            .to_owned();
        tracing::info!(policy_id = %policy_id, "created DLM lifecycle policy");

        self.read_existing(&policy_id).await
    }

    /// Read the policy with ID `policy_id`.
    ///
    /// Returns `Ok(None)` when the policy no longer exists, in which case any local state
    /// for it should be discarded.
    pub async fn read(&self, policy_id: &str) -> Result<Option<PolicyResource>, PolicyError> {
        tracing::info!(policy_id, "reading DLM lifecycle policy");
        let output = match self
            .client
            .get_lifecycle_policy()
            .policy_id(policy_id)
            .send()
            .await
        {
            Ok(output) => output,
            Err(err) if is_resource_not_found(&err) => {
                tracing::warn!(policy_id, "DLM lifecycle policy not found, removing from state");
                return Ok(None);
            }
            Err(err) => {
                return Err(PolicyError::Read {
                    policy_id: policy_id.to_owned(),
                    source: err.into(),
                })
            }
        };

        let flatten_failed = |source: FlattenError| PolicyError::Flatten {
            policy_id: policy_id.to_owned(),
            source,
        };
        let policy = output
            .policy()
            .ok_or_else(|| flatten_failed(FlattenError::missing_attribute("policy")))?;
        let config = flatten_policy(policy, &self.ignore_tags).map_err(flatten_failed)?;

        Ok(Some(PolicyResource {
            id: policy.policy_id().unwrap_or(policy_id).to_owned(),
            arn: policy.policy_arn().map(str::to_owned),
            config,
        }))
    }

    /// Bring the policy described by `prior` to `desired`.
    ///
    /// Only changed attributes are sent. Fails with [PolicyError::RequiresReplacement] if
    /// an attribute that cannot be updated in place changed; see [LifecyclePolicyResource::plan].
    pub async fn update(
        &self,
        prior: &PolicyResource,
        desired: &LifecyclePolicyConfig,
    ) -> Result<PolicyResource, PolicyError> {
        desired.validate()?;

        let policy_id = prior.id.as_str();
        let diff = PolicyDiff::between(&prior.config, desired, &self.ignore_tags);
        tracing::debug!(policy_id, ?diff, "DLM lifecycle policy diff");
        if let Some(attribute) = diff.replace_reason {
            return Err(PolicyError::RequiresReplacement {
                policy_id: policy_id.to_owned(),
                attribute,
            });
        }

        if diff.updates_policy() {
            tracing::info!(policy_id, changed = ?diff.changed_fields(), "updating DLM lifecycle policy");
            self.client
                .update_lifecycle_policy()
                .policy_id(policy_id)
                .set_description(diff.description.clone())
                .set_execution_role_arn(diff.execution_role_arn.clone())
                .set_state(diff.state.map(expand_state))
                .set_policy_details(diff.policy_details.as_ref().map(expand_policy_details))
                .send()
                .await
                .map_err(|err| PolicyError::Update {
                    policy_id: policy_id.to_owned(),
                    source: err.into(),
                })?;
        }

        if !diff.tags.is_empty() {
            let arn = prior.arn.as_deref().ok_or_else(|| PolicyError::MissingArn {
                policy_id: policy_id.to_owned(),
            })?;
            update_tags(&self.client, arn, &diff.tags).await?;
        }

        self.read_existing(policy_id).await
    }

    /// Delete the policy with ID `policy_id`.
    pub async fn delete(&self, policy_id: &str) -> Result<(), PolicyError> {
        tracing::info!(policy_id, "deleting DLM lifecycle policy");
        self.client
            .delete_lifecycle_policy()
            .policy_id(policy_id)
            .send()
            .await
            .map_err(|err| PolicyError::Delete {
                policy_id: policy_id.to_owned(),
                source: err.into(),
            })?;
        Ok(())
    }

    /// Adopt an existing policy by ID.
    pub async fn import(&self, policy_id: &str) -> Result<PolicyResource, PolicyError> {
        tracing::info!(policy_id, "importing DLM lifecycle policy");
        self.read_existing(policy_id).await
    }

    /// Decide how to get from `prior` to `desired` without contacting the service.
    pub fn plan(&self, prior: Option<&PolicyResource>, desired: &LifecyclePolicyConfig) -> Plan {
        Plan::new(prior, desired, &self.ignore_tags)
    }

    async fn read_existing(&self, policy_id: &str) -> Result<PolicyResource, PolicyError> {
        self.read(policy_id)
            .await?
            .ok_or_else(|| PolicyError::NotFound {
                policy_id: policy_id.to_owned(),
            })
    }
}
