use std::future::Future;
use std::sync::Arc;

use crate::api::LockApi;
use crate::lock::Lock;

/// The workflow engine, as seen from a released lock.
pub trait WorkflowResumer: Send + Sync {
    fn resume_workflow(
        &self,
        workflow: &str,
        namespace: &str,
    ) -> impl Future<Output = anyhow::Result<()>> + Send;
}

/// What happened to one released lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// Workflow resumed and lock deleted.
    Resumed,
    /// Workflow resumed but the lock survived; it will be delivered again.
    DeleteFailed,
    /// Workflow not resumed; the lock is left for the next cycle.
    ResumeFailed,
}

/// Standard release handler: resume the gated workflow, then delete the lock.
///
/// The lock is only deleted after a successful resume, so a failed resume is
/// retried on the next poll cycle. Resumers must tolerate repeated calls for
/// the same workflow.
pub struct ReleaseHandler<A, R> {
    api: Arc<A>,
    resumer: Arc<R>,
}

impl<A, R> Clone for ReleaseHandler<A, R> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            resumer: Arc::clone(&self.resumer),
        }
    }
}

impl<A: LockApi, R: WorkflowResumer> ReleaseHandler<A, R> {
    pub fn new(api: Arc<A>, resumer: Arc<R>) -> Self {
        Self { api, resumer }
    }

    pub async fn handle(&self, lock: Lock) -> ReleaseOutcome {
        let target = lock.workflow_ref();
        if let Err(e) = self
            .resumer
            .resume_workflow(&lock.workflow, &lock.namespace)
            .await
        {
            tracing::error!(lock = %lock.id, "resuming workflow {target} failed: {e:#}");
            return ReleaseOutcome::ResumeFailed;
        }
        tracing::info!(lock = %lock.id, "Resuming workflow {target}");

        match self.api.delete(&lock.id).await {
            Ok(()) => ReleaseOutcome::Resumed,
            Err(e) => {
                tracing::error!(lock = %lock.id, "deleting lock after resume failed: {e}");
                ReleaseOutcome::DeleteFailed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::LockClient;
    use crate::config::ClientConfig;
    use crate::lock::LockStatus;
    use mockito::{Matcher, Server};
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeResumer {
        fail: bool,
        calls: Mutex<Vec<(String, String)>>,
    }

    impl WorkflowResumer for FakeResumer {
        async fn resume_workflow(&self, workflow: &str, namespace: &str) -> anyhow::Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push((workflow.to_string(), namespace.to_string()));
            if self.fail {
                anyhow::bail!("workflow {namespace}/{workflow} not found");
            }
            Ok(())
        }
    }

    fn released(id: &str) -> Lock {
        Lock {
            id: id.to_string(),
            status: Some(LockStatus::Released),
            workflow: "wf1".to_string(),
            namespace: "default".to_string(),
            created: None,
            last_change: None,
        }
    }

    fn handler(server: &Server, resumer: FakeResumer) -> ReleaseHandler<LockClient, FakeResumer> {
        let client = LockClient::new(ClientConfig::new(format!("{}/locks", server.url()))).unwrap();
        ReleaseHandler::new(Arc::new(client), Arc::new(resumer))
    }

    #[tokio::test]
    async fn resumes_then_deletes() {
        let mut server = Server::new_async().await;
        let delete = server
            .mock("DELETE", "/locks")
            .match_query(Matcher::UrlEncoded("id".into(), "a".into()))
            .with_status(200)
            .create_async()
            .await;

        let handler = handler(&server, FakeResumer::default());
        assert_eq!(handler.handle(released("a")).await, ReleaseOutcome::Resumed);
        assert_eq!(
            *handler.resumer.calls.lock().unwrap(),
            vec![("wf1".to_string(), "default".to_string())]
        );
        delete.assert_async().await;
    }

    #[tokio::test]
    async fn failed_resume_keeps_lock() {
        let mut server = Server::new_async().await;
        let delete = server
            .mock("DELETE", "/locks")
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let resumer = FakeResumer {
            fail: true,
            ..Default::default()
        };
        let handler = handler(&server, resumer);
        assert_eq!(
            handler.handle(released("a")).await,
            ReleaseOutcome::ResumeFailed
        );
        delete.assert_async().await;
    }

    #[tokio::test]
    async fn failed_delete_is_reported() {
        let mut server = Server::new_async().await;
        server
            .mock("DELETE", "/locks")
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let handler = handler(&server, FakeResumer::default());
        assert_eq!(
            handler.handle(released("a")).await,
            ReleaseOutcome::DeleteFailed
        );
    }
}
