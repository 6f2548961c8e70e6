/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use aws_config::BehaviorVersion;
use aws_dlm_lifecycle_policy::{IgnoreTagsConfig, LifecyclePolicyResource};
use aws_types::region::Region;
use aws_types::SdkConfig;
use clap::Args;

/// Settings shared by every subcommand that talks to DLM.
#[derive(Args, Debug, Clone, Default, Eq, PartialEq)]
pub struct ProviderArgs {
    /// AWS region; defaults to the environment/profile region
    #[arg(long, global = true)]
    pub region: Option<String>,

    /// Named profile from the shared config files
    #[arg(long, global = true)]
    pub profile: Option<String>,

    /// Override the DLM endpoint, e.g. for a local mock
    #[arg(long, global = true)]
    pub endpoint_url: Option<String>,

    /// Tag key managed outside of this tool (repeatable)
    #[arg(long = "ignore-tag-key", global = true)]
    pub ignore_tag_keys: Vec<String>,

    /// Tag key prefix managed outside of this tool (repeatable)
    #[arg(long = "ignore-tag-prefix", global = true)]
    pub ignore_tag_prefixes: Vec<String>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl ProviderArgs {
    pub fn ignore_tags(&self) -> IgnoreTagsConfig {
        let config = self
            .ignore_tag_keys
            .iter()
            .fold(IgnoreTagsConfig::new(), |config, key| config.key(key));
        self.ignore_tag_prefixes
            .iter()
            .fold(config, |config, prefix| config.key_prefix(prefix))
    }

    pub async fn sdk_config(&self) -> SdkConfig {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &self.region {
            loader = loader.region(Region::new(region.clone()));
        }
        if let Some(profile) = &self.profile {
            loader = loader.profile_name(profile);
        }
        if let Some(endpoint_url) = &self.endpoint_url {
            loader = loader.endpoint_url(endpoint_url);
        }
        loader.load().await
    }

    pub async fn resource(&self) -> LifecyclePolicyResource {
        LifecyclePolicyResource::builder()
            .sdk_config(self.sdk_config().await)
            .ignore_tags(self.ignore_tags())
            .build()
    }

    /// Default filter when `RUST_LOG` is unset.
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "info,dlm_policy=debug,aws_dlm_lifecycle_policy=debug"
        } else {
            "warn,dlm_policy=info,aws_dlm_lifecycle_policy=info"
        }
    }
}
