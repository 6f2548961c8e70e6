/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use aws_sdk_dlm::operation::create_lifecycle_policy::CreateLifecyclePolicyError;
use aws_sdk_dlm::operation::delete_lifecycle_policy::DeleteLifecyclePolicyError;
use aws_sdk_dlm::operation::get_lifecycle_policy::GetLifecyclePolicyError;
use aws_sdk_dlm::operation::tag_resource::TagResourceError;
use aws_sdk_dlm::operation::untag_resource::UntagResourceError;
use aws_sdk_dlm::operation::update_lifecycle_policy::UpdateLifecyclePolicyError;
use std::fmt;

pub(crate) type CreateLifecyclePolicySdkError = ::aws_smithy_runtime_api::client::result::SdkError<
    CreateLifecyclePolicyError,
    ::aws_smithy_runtime_api::client::orchestrator::HttpResponse,
>;
pub(crate) type GetLifecyclePolicySdkError = ::aws_smithy_runtime_api::client::result::SdkError<
    GetLifecyclePolicyError,
    ::aws_smithy_runtime_api::client::orchestrator::HttpResponse,
>;
pub(crate) type UpdateLifecyclePolicySdkError = ::aws_smithy_runtime_api::client::result::SdkError<
    UpdateLifecyclePolicyError,
    ::aws_smithy_runtime_api::client::orchestrator::HttpResponse,
>;
pub(crate) type DeleteLifecyclePolicySdkError = ::aws_smithy_runtime_api::client::result::SdkError<
    DeleteLifecyclePolicyError,
    ::aws_smithy_runtime_api::client::orchestrator::HttpResponse,
>;
pub(crate) type TagResourceSdkError = ::aws_smithy_runtime_api::client::result::SdkError<
    TagResourceError,
    ::aws_smithy_runtime_api::client::orchestrator::HttpResponse,
>;
pub(crate) type UntagResourceSdkError = ::aws_smithy_runtime_api::client::result::SdkError<
    UntagResourceError,
    ::aws_smithy_runtime_api::client::orchestrator::HttpResponse,
>;

/// Failed lifecycle policy operation
#[derive(thiserror::Error, Debug)]
pub enum PolicyError {
    /// The configuration failed schema validation; no request was sent.
    #[error("invalid DLM lifecycle policy configuration: {0}")]
    InvalidConfig(#[from] ValidationErrors),

    /// `CreateLifecyclePolicy` failed.
    #[error("error creating DLM Lifecycle Policy")]
    Create {
        /// The failed SDK call.
        source: SdkOperationError,
    },

    /// `GetLifecyclePolicy` failed with something other than not-found.
    #[error("error reading DLM Lifecycle Policy ({policy_id})")]
    Read {
        /// ID of the policy.
        policy_id: String,
        /// The failed SDK call.
        source: SdkOperationError,
    },

    /// `UpdateLifecyclePolicy` failed.
    #[error("error updating DLM Lifecycle Policy ({policy_id})")]
    Update {
        /// ID of the policy.
        policy_id: String,
        /// The failed SDK call.
        source: SdkOperationError,
    },

    /// `DeleteLifecyclePolicy` failed.
    #[error("error deleting DLM Lifecycle Policy ({policy_id})")]
    Delete {
        /// ID of the policy.
        policy_id: String,
        /// The failed SDK call.
        source: SdkOperationError,
    },

    /// `TagResource` or `UntagResource` failed.
    #[error("error updating tags for DLM Lifecycle Policy ({arn})")]
    Tagging {
        /// ARN of the policy.
        arn: String,
        /// The failed SDK call.
        source: SdkOperationError,
    },

    /// The service response could not be mapped back onto the configuration.
    #[error("error setting policy details for DLM Lifecycle Policy ({policy_id})")]
    Flatten {
        /// ID of the policy.
        policy_id: String,
        /// What could not be mapped.
        source: FlattenError,
    },

    /// The create response carried no policy ID.
    #[error("CreateLifecyclePolicy response did not include a policy ID")]
    MissingPolicyId,

    /// Tags changed but the prior state has no ARN to tag.
    #[error("DLM Lifecycle Policy ({policy_id}) has no ARN in state; cannot update tags")]
    MissingArn {
        /// ID of the policy.
        policy_id: String,
    },

    /// The policy does not exist remotely.
    #[error("DLM Lifecycle Policy ({policy_id}) not found")]
    NotFound {
        /// ID of the policy.
        policy_id: String,
    },

    /// A force-new attribute changed; the policy must be deleted and created again.
    #[error("DLM Lifecycle Policy ({policy_id}) must be replaced: {attribute} cannot be updated in place")]
    RequiresReplacement {
        /// ID of the policy.
        policy_id: String,
        /// Path of the attribute that changed.
        attribute: &'static str,
    },
}

impl PolicyError {
    /// Returns true when the error means the policy does not exist remotely.
    pub fn is_not_found(&self) -> bool {
        match self {
            PolicyError::NotFound { .. } => true,
            PolicyError::Read {
                source: SdkOperationError::GetLifecyclePolicy(err),
                ..
            } => is_resource_not_found(err),
            _ => false,
        }
    }
}

pub(crate) fn is_resource_not_found(err: &GetLifecyclePolicySdkError) -> bool {
    err.as_service_error()
        .is_some_and(GetLifecyclePolicyError::is_resource_not_found_exception)
}

/// The SDK call that failed underneath a [`PolicyError`]
#[derive(thiserror::Error, Debug)]
pub enum SdkOperationError {
    /// `CreateLifecyclePolicy` error
    #[error(transparent)]
    CreateLifecyclePolicy(#[from] CreateLifecyclePolicySdkError),

    /// `GetLifecyclePolicy` error
    #[error(transparent)]
    GetLifecyclePolicy(#[from] GetLifecyclePolicySdkError),

    /// `UpdateLifecyclePolicy` error
    #[error(transparent)]
    UpdateLifecyclePolicy(#[from] UpdateLifecyclePolicySdkError),

    /// `DeleteLifecyclePolicy` error
    #[error(transparent)]
    DeleteLifecyclePolicy(#[from] DeleteLifecyclePolicySdkError),

    /// `TagResource` error
    #[error(transparent)]
    TagResource(#[from] TagResourceSdkError),

    /// `UntagResource` error
    #[error(transparent)]
    UntagResource(#[from] UntagResourceSdkError),
}

/// A single schema rule violated by a configuration value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Violation {
    path: String,
    message: String,
}

impl Violation {
    pub(crate) fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Dotted path of the offending field, e.g. `policy_details.schedule.retain_rule.count`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Human readable description of the rule that was violated.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Every violation found while validating a configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    violations: Vec<Violation>,
}

impl ValidationErrors {
    pub(crate) fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    /// The individual violations, in schema order.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Returns true if a violation was recorded for `path`.
    pub fn contains(&self, path: &str) -> bool {
        self.violations.iter().any(|v| v.path == path)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, violation) in self.violations.iter().enumerate() {
            if idx > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", violation)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Error that occurs while mapping a DLM response back onto the configuration model.
#[derive(Debug)]
pub struct FlattenError {
    kind: FlattenErrorKind,
    path: String,
}

/// The kind of flatten error that occurred.
#[derive(Debug)]
#[non_exhaustive]
pub enum FlattenErrorKind {
    /// The response omitted an attribute the configuration requires.
    MissingAttribute,
    /// The response carried a value the configuration cannot represent.
    InvalidValue {
        /// Description of why the value was invalid.
        message: String,
    },
}

impl FlattenError {
    /// Creates an error for a missing attribute.
    pub fn missing_attribute(path: impl Into<String>) -> Self {
        Self {
            kind: FlattenErrorKind::MissingAttribute,
            path: path.into(),
        }
    }

    /// Creates an error for an invalid value.
    pub fn invalid_value(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: FlattenErrorKind::InvalidValue {
                message: message.into(),
            },
            path: path.into(),
        }
    }

    /// Returns the kind of error.
    pub fn kind(&self) -> &FlattenErrorKind {
        &self.kind
    }

    /// Returns the configuration path the error refers to.
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for FlattenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            FlattenErrorKind::MissingAttribute => {
                write!(f, "missing required attribute '{}'", self.path)
            }
            FlattenErrorKind::InvalidValue { message } => {
                write!(f, "invalid value for '{}': {}", self.path, message)
            }
        }
    }
}

impl std::error::Error for FlattenError {}
