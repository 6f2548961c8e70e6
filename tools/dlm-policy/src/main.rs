/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use anyhow::{bail, Result};
use aws_dlm_lifecycle_policy::model::{LifecyclePolicyConfig, PolicyResource};
use aws_dlm_lifecycle_policy::{LifecyclePolicyResource, Plan, PolicyError};
use aws_smithy_types::error::display::DisplayErrorContext;
use clap::{Parser, Subcommand};
use provider::ProviderArgs;
use std::path::{Path, PathBuf};

mod provider;
mod state;

#[derive(Parser, Debug, Eq, PartialEq)]
#[command(name = "dlm-policy", author, version, about)]
struct Args {
    #[command(flatten)]
    provider: ProviderArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Eq, PartialEq)]
enum Command {
    /// Check a configuration file without contacting AWS
    Validate {
        #[arg(long)]
        config: PathBuf,
    },
    /// Show what `apply` would do
    Plan {
        #[arg(long)]
        config: PathBuf,
        #[arg(long)]
        state: Option<PathBuf>,
    },
    /// Create, update or replace the policy and record its state
    Apply {
        #[arg(long)]
        config: PathBuf,
        #[arg(long)]
        state: PathBuf,
    },
    /// Re-read the policy into its state file
    Refresh {
        #[arg(long)]
        state: PathBuf,
    },
    /// Delete the policy and its state file
    Destroy {
        #[arg(long)]
        state: PathBuf,
    },
    /// Adopt an existing policy by ID
    Import {
        policy_id: String,
        #[arg(long)]
        state: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| args.provider.log_filter().to_owned()),
        )
        .init();

    match &args.command {
        Command::Validate { config } => validate(config),
        Command::Plan { config, state } => {
            let resource = args.provider.resource().await;
            plan(&resource, config, state.as_deref()).await
        }
        Command::Apply { config, state } => {
            let resource = args.provider.resource().await;
            apply(&resource, config, state).await
        }
        Command::Refresh { state } => {
            let resource = args.provider.resource().await;
            refresh(&resource, state).await
        }
        Command::Destroy { state } => {
            let resource = args.provider.resource().await;
            destroy(&resource, state).await
        }
        Command::Import { policy_id, state } => {
            let resource = args.provider.resource().await;
            import(&resource, policy_id, state).await
        }
    }
}

/// Flattens the whole error chain, including the SDK's, into the message.
fn report(err: PolicyError) -> anyhow::Error {
    anyhow::anyhow!("{}", DisplayErrorContext(err))
}

fn load_valid_config(path: &Path) -> Result<LifecyclePolicyConfig> {
    let config = state::load_config(path)?;
    if let Err(errors) = config.validate() {
        for violation in errors.violations() {
            eprintln!("  {violation}");
        }
        bail!(
            "{} has {} validation error(s)",
            path.display(),
            errors.violations().len()
        );
    }
    Ok(config)
}

fn validate(config: &Path) -> Result<()> {
    load_valid_config(config)?;
    println!("{} is valid", config.display());
    Ok(())
}

/// Reads the policy recorded in `state`, if any. A policy that no longer exists counts as absent.
async fn refreshed_state(
    resource: &LifecyclePolicyResource,
    state: &Path,
) -> Result<Option<PolicyResource>> {
    match state::load_state(state)? {
        Some(prior) => resource.read(&prior.id).await.map_err(report),
        None => Ok(None),
    }
}

async fn plan(
    resource: &LifecyclePolicyResource,
    config: &Path,
    state: Option<&Path>,
) -> Result<()> {
    let desired = load_valid_config(config)?;
    let prior = match state {
        Some(state) => refreshed_state(resource, state).await?,
        None => None,
    };
    let plan = resource.plan(prior.as_ref(), &desired);
    match &prior {
        Some(prior) => println!("{}: {plan}", prior.id),
        None => println!("{plan}"),
    }
    Ok(())
}

async fn apply(resource: &LifecyclePolicyResource, config: &Path, state: &Path) -> Result<()> {
    let desired = load_valid_config(config)?;
    let prior = refreshed_state(resource, state).await?;

    let applied = match (resource.plan(prior.as_ref(), &desired), prior) {
        (Plan::NoOp, Some(prior)) => {
            println!("{}: no changes", prior.id);
            prior
        }
        (Plan::Update(diff), Some(prior)) => {
            let updated = resource.update(&prior, &desired).await.map_err(report)?;
            println!("{}: updated {}", updated.id, diff.changed_fields().join(", "));
            updated
        }
        (Plan::Replace(_), Some(prior)) => {
            resource.delete(&prior.id).await.map_err(report)?;
            let created = resource.create(&desired).await.map_err(report)?;
            println!("{}: replaced by {}", prior.id, created.id);
            created
        }
        (_, _) => {
            let created = resource.create(&desired).await.map_err(report)?;
            println!("{}: created", created.id);
            created
        }
    };
    state::save_state(state, &applied)
}

async fn refresh(resource: &LifecyclePolicyResource, state: &Path) -> Result<()> {
    let Some(prior) = state::load_state(state)? else {
        bail!("no state file at {}", state.display());
    };
    match resource.read(&prior.id).await.map_err(report)? {
        Some(current) => {
            state::save_state(state, &current)?;
            println!("{}: refreshed", current.id);
        }
        None => {
            state::remove_state(state)?;
            println!("{}: no longer exists, state removed", prior.id);
        }
    }
    Ok(())
}

async fn destroy(resource: &LifecyclePolicyResource, state: &Path) -> Result<()> {
    let Some(prior) = state::load_state(state)? else {
        bail!("no state file at {}", state.display());
    };
    resource.delete(&prior.id).await.map_err(report)?;
    state::remove_state(state)?;
    println!("{}: destroyed", prior.id);
    Ok(())
}

async fn import(resource: &LifecyclePolicyResource, policy_id: &str, state: &Path) -> Result<()> {
    if let Some(existing) = state::load_state(state)? {
        bail!(
            "{} already tracks {}; refusing to overwrite",
            state.display(),
            existing.id
        );
    }
    let imported = resource.import(policy_id).await.map_err(report)?;
    state::save_state(state, &imported)?;
    println!("{}: imported", imported.id);
    Ok(())
}
