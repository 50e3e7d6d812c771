use std::future::Future;

use crate::error::Result;
use crate::lock::{Lock, LockStatus};

/// Typed access to a lock service.
///
/// [`crate::client::LockClient`] is the HTTP implementation. The poller and
/// the release handler only depend on this trait, so alternative backends
/// and test doubles plug in without touching them.
pub trait LockApi: Send + Sync {
    /// Register a new lock for `workflow` in `namespace`.
    fn create(&self, workflow: &str, namespace: &str)
        -> impl Future<Output = Result<Lock>> + Send;

    fn get(&self, id: &str) -> impl Future<Output = Result<Lock>> + Send;

    /// All locks currently in `status`. An empty result is not an error.
    fn get_with_status(
        &self,
        status: &LockStatus,
    ) -> impl Future<Output = Result<Vec<Lock>>> + Send;

    fn release(&self, id: &str) -> impl Future<Output = Result<()>> + Send;

    fn delete(&self, id: &str) -> impl Future<Output = Result<()>> + Send;
}
