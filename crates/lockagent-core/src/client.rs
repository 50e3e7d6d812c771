//! HTTP client for the lock service.
//!
//! Every typed operation is a projection onto [`LockClient::crud`], which owns
//! endpoint composition, the request method and status-code interpretation:
//!
//! | Operation         | Method   | Query          | Body        |
//! |-------------------|----------|----------------|-------------|
//! | `create`          | `POST`   | none           | `Lock` JSON |
//! | `get`             | `GET`    | `id=<id>`      | none        |
//! | `get_with_status` | `GET`    | `status=<s>`   | none        |
//! | `release`         | `PATCH`  | `id=<id>`      | none        |
//! | `delete`          | `DELETE` | `id=<id>`      | none        |

use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, StatusCode, Url};

use crate::api::LockApi;
use crate::config::ClientConfig;
use crate::error::{LockError, Result};
use crate::lock::{require, Lock, LockStatus};

/// One `name=value` pair merged onto the endpoint's query string.
#[derive(Debug, Clone, Copy)]
struct QueryParam<'a> {
    name: &'static str,
    value: &'a str,
}

impl<'a> QueryParam<'a> {
    fn new(name: &'static str, value: &'a str) -> Self {
        Self { name, value }
    }
}

/// Client for a lock service reachable at a single endpoint URL.
///
/// Holds no mutable state; clone it or share it behind an `Arc` freely.
#[derive(Debug, Clone)]
pub struct LockClient {
    config: ClientConfig,
    http: reqwest::Client,
}

impl LockClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, http })
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    /// Endpoint with `params` merged into its query. A parameter already on
    /// the endpoint is replaced, never duplicated.
    fn request_url(&self, params: &[QueryParam<'_>]) -> Result<Url> {
        let mut url = Url::parse(&self.config.endpoint).map_err(|e| {
            LockError::Transport(format!(
                "malformed endpoint '{}': {e}",
                self.config.endpoint
            ))
        })?;
        if params.is_empty() {
            return Ok(url);
        }

        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(k, _)| !params.iter().any(|p| *k == p.name))
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        url.query_pairs_mut()
            .clear()
            .extend_pairs(kept)
            .extend_pairs(params.iter().map(|p| (p.name, p.value)));
        Ok(url)
    }

    /// Send one request and return the raw payload of a `200 OK` response.
    async fn crud(
        &self,
        method: Method,
        body: Option<Vec<u8>>,
        params: &[QueryParam<'_>],
    ) -> Result<Vec<u8>> {
        let url = self.request_url(params)?;
        tracing::debug!(%method, %url, "lock service request");

        let mut request = self.http.request(method, url);
        if let Some(body) = body {
            request = request.header(CONTENT_TYPE, "application/json").body(body);
        }

        let mut response = request.send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(LockError::Service {
                status: status.as_u16(),
            });
        }

        let limit = self.config.max_response_bytes;
        if response.content_length().is_some_and(|len| len > limit as u64) {
            return Err(LockError::ResponseTooLarge { limit });
        }
        let mut payload = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            if payload.len() + chunk.len() > limit {
                return Err(LockError::ResponseTooLarge { limit });
            }
            payload.extend_from_slice(&chunk);
        }
        Ok(payload)
    }
}

impl LockApi for LockClient {
    async fn create(&self, workflow: &str, namespace: &str) -> Result<Lock> {
        let request = Lock::request(workflow, namespace)?;
        let body = serde_json::to_vec(&request)?;
        let payload = self.crud(Method::POST, Some(body), &[]).await?;
        let lock: Lock = serde_json::from_slice(&payload)?;
        tracing::debug!(id = %lock.id, workflow = %lock.workflow_ref(), "created lock");
        Ok(lock)
    }

    async fn get(&self, id: &str) -> Result<Lock> {
        let id = require("id", id)?;
        let payload = match self
            .crud(Method::GET, None, &[QueryParam::new("id", id)])
            .await
        {
            Err(LockError::Service { status: 404 }) => {
                return Err(LockError::NotFound(id.to_string()))
            }
            other => other?,
        };
        Ok(serde_json::from_slice(&payload)?)
    }

    async fn get_with_status(&self, status: &LockStatus) -> Result<Vec<Lock>> {
        let status = require("status", status.as_str())?;
        let payload = self
            .crud(Method::GET, None, &[QueryParam::new("status", status)])
            .await?;
        if payload.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        let locks: Option<Vec<Lock>> = serde_json::from_slice(&payload)?;
        Ok(locks.unwrap_or_default())
    }

    async fn release(&self, id: &str) -> Result<()> {
        let id = require("id", id)?;
        self.crud(Method::PATCH, None, &[QueryParam::new("id", id)])
            .await?;
        tracing::debug!(id, "released lock");
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let id = require("id", id)?;
        self.crud(Method::DELETE, None, &[QueryParam::new("id", id)])
            .await?;
        tracing::debug!(id, "deleted lock");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
