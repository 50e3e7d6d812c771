//! `argo-resume`: resume suspended Argo workflows.
//!
//! Plugs into the lock agent as a [`lockagent_core::WorkflowResumer`]: when a
//! lock gating a workflow is released, [`ArgoResumer`] clears the workflow's
//! suspension through the Kubernetes API.

pub mod client;
pub mod error;
pub mod patch;

pub use client::ArgoResumer;
pub use error::{ArgoError, Result};
pub use patch::resume_patch;
