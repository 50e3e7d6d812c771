//! `lockagent-core`: client and watcher for a remote lock service.
//!
//! Locks gate the resumption of suspended workflows. This crate talks to the
//! lock service that stores them and watches for locks that turned
//! `released`:
//!
//! ```text
//! Poller ── every period ──▶ LockApi::get_with_status("released")
//!    │                              │
//!    ▼                              ▼
//! handler(Lock) ──▶ WorkflowResumer::resume_workflow ──▶ LockApi::delete
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod lock;
pub mod poller;

pub use api::LockApi;
pub use client::LockClient;
pub use config::{AgentConfig, ClientConfig};
pub use dispatch::{ReleaseHandler, ReleaseOutcome, WorkflowResumer};
pub use error::{LockError, Result};
pub use lock::{Lock, LockStatus};
pub use poller::{poll_once, Poller};
