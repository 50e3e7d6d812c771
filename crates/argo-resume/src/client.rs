use std::path::Path;

use chrono::Utc;
use kube::api::{Api, ApiResource, DynamicObject, GroupVersionKind, Patch, PatchParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use lockagent_core::WorkflowResumer;

use crate::error::{ArgoError, Result};
use crate::patch::resume_patch;

/// Resumes Argo `Workflow` objects (`argoproj.io/v1alpha1`).
#[derive(Clone)]
pub struct ArgoResumer {
    client: Client,
    resource: ApiResource,
}

impl ArgoResumer {
    /// Connect using `kubeconfig` when given, falling back to the standard
    /// inference chain (`$KUBECONFIG`, `~/.kube/config`, in-cluster service
    /// account) when it is absent or unreadable.
    pub async fn connect(kubeconfig: Option<&Path>) -> Result<Self> {
        let config = match kubeconfig {
            Some(path) => match load_kubeconfig(path).await {
                Ok(config) => {
                    tracing::info!("Using kubernetes configuration from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("{e}; falling back to inferred configuration");
                    infer_config().await?
                }
            },
            None => infer_config().await?,
        };
        let client = Client::try_from(config)?;
        Ok(Self::from_client(client))
    }

    pub fn from_client(client: Client) -> Self {
        let gvk = GroupVersionKind::gvk("argoproj.io", "v1alpha1", "Workflow");
        Self {
            client,
            resource: ApiResource::from_gvk(&gvk),
        }
    }

    fn workflows(&self, namespace: &str) -> Api<DynamicObject> {
        Api::namespaced_with(self.client.clone(), namespace, &self.resource)
    }

    /// Resume `name` in `namespace`. Returns `false` when the workflow was
    /// not suspended, which makes repeated calls harmless.
    pub async fn resume(&self, name: &str, namespace: &str) -> Result<bool> {
        let api = self.workflows(namespace);
        let workflow = api
            .get_opt(name)
            .await?
            .ok_or_else(|| ArgoError::WorkflowNotFound {
                namespace: namespace.to_string(),
                name: name.to_string(),
            })?;

        let Some(patch) = resume_patch(&workflow.data, Utc::now()) else {
            tracing::debug!("workflow {namespace}/{name} is not suspended");
            return Ok(false);
        };
        api.patch(name, &PatchParams::default(), &Patch::Merge(&patch))
            .await?;
        Ok(true)
    }
}

impl WorkflowResumer for ArgoResumer {
    async fn resume_workflow(&self, workflow: &str, namespace: &str) -> anyhow::Result<()> {
        self.resume(workflow, namespace).await?;
        Ok(())
    }
}

async fn load_kubeconfig(path: &Path) -> Result<Config> {
    let kubeconfig_error = |message: String| ArgoError::Kubeconfig {
        path: path.to_path_buf(),
        message,
    };
    let kubeconfig = Kubeconfig::read_from(path).map_err(|e| kubeconfig_error(e.to_string()))?;
    Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
        .await
        .map_err(|e| kubeconfig_error(e.to_string()))
}

async fn infer_config() -> Result<Config> {
    let config = Config::infer()
        .await
        .map_err(|e| ArgoError::Config(e.to_string()))?;
    tracing::info!("Using inferred kubernetes configuration");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use tempfile::TempDir;

    const WORKFLOW_PATH: &str = "/apis/argoproj.io/v1alpha1/namespaces/ns1/workflows/wf1";

    fn resumer_for(server: &Server) -> ArgoResumer {
        let config = Config::new(server.url().parse().unwrap());
        ArgoResumer::from_client(Client::try_from(config).unwrap())
    }

    #[tokio::test]
    async fn missing_kubeconfig_is_reported_with_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.yaml");

        let err = load_kubeconfig(&path).await.unwrap_err();
        match err {
            ArgoError::Kubeconfig { path: reported, .. } => assert_eq!(reported, path),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn malformed_kubeconfig_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config");
        std::fs::write(&path, "clusters: [not, a, kubeconfig\n").unwrap();

        assert!(matches!(
            load_kubeconfig(&path).await,
            Err(ArgoError::Kubeconfig { .. })
        ));
    }

    #[tokio::test]
    async fn unknown_workflow_is_not_found() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", WORKFLOW_PATH)
            .with_status(404)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"kind":"Status","apiVersion":"v1","metadata":{},"status":"Failure","message":"workflows.argoproj.io \"wf1\" not found","reason":"NotFound","details":{"name":"wf1","group":"argoproj.io","kind":"workflows"},"code":404}"#,
            )
            .create_async()
            .await;

        let err = resumer_for(&server).resume("wf1", "ns1").await.unwrap_err();
        assert!(
            matches!(&err, ArgoError::WorkflowNotFound { namespace, name } if namespace == "ns1" && name == "wf1"),
            "unexpected error: {err}"
        );
    }

    #[tokio::test]
    async fn suspended_workflow_is_patched() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", WORKFLOW_PATH)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"apiVersion":"argoproj.io/v1alpha1","kind":"Workflow","metadata":{"name":"wf1","namespace":"ns1"},"spec":{"suspend":true}}"#,
            )
            .create_async()
            .await;
        let patch = server
            .mock("PATCH", WORKFLOW_PATH)
            .match_query(Matcher::Exact(String::new()))
            .match_header("content-type", "application/merge-patch+json")
            .match_body(Matcher::PartialJson(
                serde_json::json!({ "spec": { "suspend": null } }),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"apiVersion":"argoproj.io/v1alpha1","kind":"Workflow","metadata":{"name":"wf1","namespace":"ns1"},"spec":{}}"#,
            )
            .create_async()
            .await;

        assert!(resumer_for(&server).resume("wf1", "ns1").await.unwrap());
        patch.assert_async().await;
    }

    #[tokio::test]
    async fn running_workflow_is_left_alone() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", WORKFLOW_PATH)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"apiVersion":"argoproj.io/v1alpha1","kind":"Workflow","metadata":{"name":"wf1","namespace":"ns1"},"spec":{}}"#,
            )
            .create_async()
            .await;
        let patch = server
            .mock("PATCH", WORKFLOW_PATH)
            .expect(0)
            .create_async()
            .await;

        assert!(!resumer_for(&server).resume("wf1", "ns1").await.unwrap());
        patch.assert_async().await;
    }
}
