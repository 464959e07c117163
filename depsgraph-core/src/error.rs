//! Error types.
//!
//! Tagging itself never fails: missing nodes and unclassifiable change-kinds
//! are skipped. Errors only come from configuration and graph registration.

use thiserror::Error;

use crate::id::DatablockId;

#[derive(Error, Debug)]
pub enum DepsgraphError {
    #[error("Unknown debug flag: {0}")]
    UnknownDebugFlag(String),

    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Datablock {name} is not a scene")]
    NotAScene { name: String },

    #[error("Scene {name} is already registered")]
    DuplicateScene { name: String },

    #[error("Scene not registered: {0}")]
    SceneNotFound(DatablockId),

    #[error("Scene {scene} already has a view layer named {layer}")]
    DuplicateViewLayer { scene: String, layer: String },

    #[error("Scene {scene} has no view layer named {layer}")]
    ViewLayerNotFound { scene: String, layer: String },
}

pub type Result<T> = std::result::Result<T, DepsgraphError>;
