use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArgoError {
    #[error("failed to load kubeconfig {path}: {message}")]
    Kubeconfig { path: PathBuf, message: String },

    #[error("no usable kubernetes configuration: {0}")]
    Config(String),

    #[error("workflow {namespace}/{name} not found")]
    WorkflowNotFound { namespace: String, name: String },

    #[error("kubernetes API error: {0}")]
    Kube(#[from] kube::Error),
}

pub type Result<T> = std::result::Result<T, ArgoError>;
