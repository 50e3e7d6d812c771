use anyhow::Context;
use argo_resume::ArgoResumer;
use clap::Args;
use lockagent_core::{AgentConfig, LockClient, Poller, ReleaseHandler};
use std::path::PathBuf;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Arguments
// ---------------------------------------------------------------------------

#[derive(Args, Debug, Default)]
pub struct AgentArgs {
    /// Lock API endpoint URL
    #[arg(long, env = "API_ENDPOINT")]
    pub api_endpoint: Option<String>,

    /// API polling interval in seconds [default: 60]
    #[arg(long, env = "LOCK_POLL_INTERVAL")]
    pub interval: Option<u64>,

    /// Timeout for a single lock service request, in seconds [default: 30]
    #[arg(long, env = "LOCK_REQUEST_TIMEOUT")]
    pub request_timeout: Option<u64>,

    /// Path to a kubeconfig file (in-cluster configuration when unusable)
    #[arg(long, env = "LOCK_AGENT_KUBECONFIG")]
    pub kubeconfig: Option<PathBuf>,

    /// YAML file with agent settings; flags override its values
    #[arg(long, env = "LOCK_AGENT_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Merge the optional config file with flag overrides and validate the result.
pub fn resolve_config(args: &AgentArgs) -> anyhow::Result<AgentConfig> {
    let mut config = match &args.config {
        Some(path) => AgentConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => AgentConfig::default(),
    };

    if let Some(endpoint) = &args.api_endpoint {
        config.api_endpoint = Some(endpoint.clone());
    }
    if let Some(interval) = args.interval {
        config.interval_secs = interval;
    }
    if let Some(timeout) = args.request_timeout {
        config.request_timeout_secs = timeout;
    }
    if let Some(kubeconfig) = &args.kubeconfig {
        config.kubeconfig = Some(kubeconfig.clone());
    }

    config.validate()?;
    Ok(config)
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

pub fn run(args: AgentArgs) -> anyhow::Result<()> {
    let config = resolve_config(&args)?;
    let client = Arc::new(LockClient::new(config.client_config()?)?);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let resumer = ArgoResumer::connect(config.kubeconfig.as_deref())
            .await
            .context("failed to connect to kubernetes")?;
        let handler = ReleaseHandler::new(Arc::clone(&client), Arc::new(resumer));

        tracing::info!(
            endpoint = client.endpoint(),
            interval_secs = config.interval_secs,
            "watching for released locks"
        );
        let poller = Poller::new(client, config.interval());
        poller.start(move |lock| {
            let handler = handler.clone();
            async move {
                handler.handle(lock).await;
            }
        });

        let signal = shutdown_signal().await;
        tracing::info!("shutting down");
        poller.stop().await;
        signal.context("failed to listen for termination signals")
    })
}

/// Resolve on SIGINT or, on Unix, SIGTERM.
async fn shutdown_signal() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate = signal(SignalKind::terminate())?;
        tokio::select! {
            res = tokio::signal::ctrl_c() => res,
            _ = terminate.recv() => Ok(()),
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn flags_alone_produce_config() {
        let args = AgentArgs {
            api_endpoint: Some("http://locks.local/api".into()),
            interval: Some(10),
            ..Default::default()
        };
        let config = resolve_config(&args).unwrap();
        assert_eq!(config.api_endpoint.as_deref(), Some("http://locks.local/api"));
        assert_eq!(config.interval_secs, 10);
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn flags_override_config_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("agent.yaml");
        std::fs::write(
            &path,
            "api_endpoint: http://from-file/api\ninterval_secs: 120\nrequest_timeout_secs: 5\n",
        )
        .unwrap();

        let args = AgentArgs {
            interval: Some(15),
            config: Some(path),
            ..Default::default()
        };
        let config = resolve_config(&args).unwrap();
        assert_eq!(config.api_endpoint.as_deref(), Some("http://from-file/api"));
        assert_eq!(config.interval_secs, 15);
        assert_eq!(config.request_timeout_secs, 5);
    }

    #[test]
    fn missing_endpoint_is_rejected() {
        let err = resolve_config(&AgentArgs::default()).unwrap_err();
        assert!(format!("{err:#}").contains("API endpoint not defined"));
    }

    #[test]
    fn unreadable_config_file_is_reported() {
        let args = AgentArgs {
            config: Some(PathBuf::from("/nonexistent/agent.yaml")),
            ..Default::default()
        };
        let err = resolve_config(&args).unwrap_err();
        assert!(format!("{err:#}").contains("failed to load config"));
    }
}
