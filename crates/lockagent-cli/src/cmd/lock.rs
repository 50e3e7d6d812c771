use crate::output::{print_json, print_locks, write_result};
use anyhow::{anyhow, Context};
use clap::Subcommand;
use lockagent_core::{ClientConfig, LockApi, LockClient, LockStatus};
use std::path::Path;
use std::time::Duration;

#[derive(Subcommand, Debug)]
pub enum LockSubcommand {
    /// Create a lock for a workflow and print its id
    Create {
        workflow: String,
        #[arg(default_value = "default")]
        namespace: String,
    },
    /// Print a lock as JSON
    Get { id: String },
    /// Mark a lock as released
    Release { id: String },
    /// Delete a lock
    Delete { id: String },
    /// List locks in a given status
    List {
        #[arg(long, default_value = "released")]
        status: String,
    },
}

/// Options shared by every one-shot command.
#[derive(Debug, Clone)]
pub struct LockOptions<'a> {
    pub endpoint: Option<&'a str>,
    pub timeout: Duration,
    pub json: bool,
    pub result_file: Option<&'a Path>,
}

pub fn run(opts: &LockOptions<'_>, subcmd: LockSubcommand) -> anyhow::Result<()> {
    let endpoint = opts
        .endpoint
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .ok_or_else(|| {
            anyhow!(
                "API endpoint not defined (set environment variable API_ENDPOINT or provide --api-endpoint flag)"
            )
        })?;
    let client = LockClient::new(ClientConfig::new(endpoint).with_timeout(opts.timeout))?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        match subcmd {
            LockSubcommand::Create {
                workflow,
                namespace,
            } => create(&client, opts, &workflow, &namespace).await,
            LockSubcommand::Get { id } => get(&client, opts, &id).await,
            LockSubcommand::Release { id } => release(&client, opts, &id).await,
            LockSubcommand::Delete { id } => delete(&client, opts, &id).await,
            LockSubcommand::List { status } => list(&client, opts, &status).await,
        }
    })
}

async fn create(
    client: &LockClient,
    opts: &LockOptions<'_>,
    workflow: &str,
    namespace: &str,
) -> anyhow::Result<()> {
    let lock = client
        .create(workflow, namespace)
        .await
        .with_context(|| format!("failed to create lock for {namespace}/{workflow}"))?;

    if opts.json {
        print_json(&lock)?;
    } else {
        println!("{}", lock.id);
    }
    if let Some(path) = opts.result_file {
        write_result(path, lock.id.as_bytes())?;
    }
    Ok(())
}

async fn get(client: &LockClient, opts: &LockOptions<'_>, id: &str) -> anyhow::Result<()> {
    let lock = client
        .get(id)
        .await
        .with_context(|| format!("failed to get lock '{id}'"))?;

    print_json(&lock)?;
    if let Some(path) = opts.result_file {
        write_result(path, &serde_json::to_vec(&lock)?)?;
    }
    Ok(())
}

async fn release(client: &LockClient, opts: &LockOptions<'_>, id: &str) -> anyhow::Result<()> {
    client
        .release(id)
        .await
        .with_context(|| format!("failed to release lock '{id}'"))?;

    if opts.json {
        print_json(&serde_json::json!({ "id": id, "status": "released" }))?;
    } else {
        println!("Released lock {id}");
    }
    Ok(())
}

async fn delete(client: &LockClient, opts: &LockOptions<'_>, id: &str) -> anyhow::Result<()> {
    client
        .delete(id)
        .await
        .with_context(|| format!("failed to delete lock '{id}'"))?;

    if opts.json {
        print_json(&serde_json::json!({ "id": id, "deleted": true }))?;
    } else {
        println!("Deleted lock {id}");
    }
    Ok(())
}

async fn list(client: &LockClient, opts: &LockOptions<'_>, status: &str) -> anyhow::Result<()> {
    let status = LockStatus::from(status);
    let locks = client
        .get_with_status(&status)
        .await
        .with_context(|| format!("failed to list {status} locks"))?;

    if opts.json {
        print_json(&locks)?;
    } else if locks.is_empty() {
        println!("No {status} locks.");
    } else {
        print_locks(&locks);
    }
    Ok(())
}
