use crate::error::{LockError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// LockStatus
// ---------------------------------------------------------------------------

/// Status of a lock as reported by the lock service.
///
/// The service is authoritative: values other than `locked` and `released`
/// are kept verbatim in [`LockStatus::Other`] and serialized back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LockStatus {
    Locked,
    Released,
    Other(String),
}

impl LockStatus {
    pub fn as_str(&self) -> &str {
        match self {
            LockStatus::Locked => "locked",
            LockStatus::Released => "released",
            LockStatus::Other(s) => s,
        }
    }
}

impl From<String> for LockStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "locked" => LockStatus::Locked,
            "released" => LockStatus::Released,
            _ => LockStatus::Other(s),
        }
    }
}

impl From<&str> for LockStatus {
    fn from(s: &str) -> Self {
        LockStatus::from(s.to_string())
    }
}

impl From<LockStatus> for String {
    fn from(status: LockStatus) -> Self {
        match status {
            LockStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for LockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Lock
// ---------------------------------------------------------------------------

/// A lock record gating the resumption of one workflow.
///
/// Only `workflow` and `namespace` are ever chosen by the client. Everything
/// else is assigned by the lock service and read back from its responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lock {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<LockStatus>,
    #[serde(default)]
    pub workflow: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(
        default,
        rename = "lastChange",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_change: Option<DateTime<Utc>>,
}

impl Lock {
    /// Build the body of a create request: workflow and namespace only.
    pub fn request(workflow: &str, namespace: &str) -> Result<Self> {
        Ok(Self {
            id: String::new(),
            status: None,
            workflow: require("workflow", workflow)?.to_string(),
            namespace: require("namespace", namespace)?.to_string(),
            created: None,
            last_change: None,
        })
    }

    pub fn is_released(&self) -> bool {
        self.status == Some(LockStatus::Released)
    }

    /// `namespace/workflow`, the form used in log lines.
    pub fn workflow_ref(&self) -> String {
        format!("{}/{}", self.namespace, self.workflow)
    }
}

/// Reject empty or whitespace-only identifiers before they reach the wire.
/// Accepted values are returned exactly as given.
pub fn require<'a>(field: &str, value: &'a str) -> Result<&'a str> {
    if value.trim().is_empty() {
        return Err(LockError::InvalidArgument(format!(
            "{field} must not be empty"
        )));
    }
    Ok(value)
}
