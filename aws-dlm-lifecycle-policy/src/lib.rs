/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

/* Automatically managed default lints */
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
/* End of automatically managed default lints */

//! Declarative management of Amazon Data Lifecycle Manager (DLM) lifecycle policies.
//!
//! A [`model::LifecyclePolicyConfig`] describes the desired policy: an EBS snapshot
//! schedule (cron or fixed interval), its retention, optional cross-region copies and tags.
//! [`LifecyclePolicyResource`] creates, reads, updates, deletes and imports policies
//! through the DLM API and maps the service's responses back onto the same model, so that
//! a configuration applied and read back compares equal.
//!
//! ```no_run
//! # async fn example(
//! #     sdk_config: aws_types::SdkConfig,
//! #     config: aws_dlm_lifecycle_policy::model::LifecyclePolicyConfig,
//! # ) -> Result<(), aws_dlm_lifecycle_policy::PolicyError> {
//! use aws_dlm_lifecycle_policy::LifecyclePolicyResource;
//!
//! let resource = LifecyclePolicyResource::builder().sdk_config(sdk_config).build();
//! let state = resource.create(&config).await?;
//! println!("created {}", state.id);
//! # Ok(())
//! # }
//! ```

#![warn(
    missing_debug_implementations,
    missing_docs,
    rustdoc::missing_crate_level_docs,
    unreachable_pub,
    rust_2018_idioms
)]

pub mod diff;

/// Error types emitted by `aws-dlm-lifecycle-policy`
pub mod error;

pub mod expand;
pub mod flatten;
pub mod model;

/// Lifecycle policy CRUD against the DLM API
pub mod resource;

pub mod tags;
pub mod validate;

pub use diff::Plan;
pub use error::PolicyError;
pub use resource::{Builder, LifecyclePolicyResource};
pub use tags::IgnoreTagsConfig;
