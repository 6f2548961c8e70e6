/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Configuration and state documents on disk. Both are JSON.

use anyhow::{Context, Result};
use aws_dlm_lifecycle_policy::model::{LifecyclePolicyConfig, PolicyResource};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

pub fn load_config(path: &Path) -> Result<LifecyclePolicyConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read configuration from {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse configuration in {}", path.display()))
}

/// Returns `None` if there is no state file yet.
pub fn load_state(path: &Path) -> Result<Option<PolicyResource>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read state from {}", path.display()))
        }
    };
    let state = serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse state in {}", path.display()))?;
    Ok(Some(state))
}

pub fn save_state(path: &Path, state: &PolicyResource) -> Result<()> {
    let mut contents = serde_json::to_string_pretty(state)?;
    contents.push('\n');
    fs::write(path, contents)
        .with_context(|| format!("failed to write state to {}", path.display()))?;
    tracing::debug!(path = %path.display(), policy_id = %state.id, "saved state");
    Ok(())
}

pub fn remove_state(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => {
            Err(err).with_context(|| format!("failed to remove state file {}", path.display()))
        }
    }
}
