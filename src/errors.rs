//! Error Types
//!
//! This module defines the error types used by the viewer core.
//!
//! # Overview
//!
//! Failures fall into three classes:
//! - [`StructuralError`]: the document (or the request) is malformed. Fatal to a load.
//! - [`DecodeError`]: the container decoder failed. Fatal to a load.
//! - [`PartialBindError`]: one skin or one animation channel could not be
//!   resolved. Logged and skipped; the load continues without that unit.
//!
//! Control-surface mistakes (unknown clip, unknown morph slot) are reported
//! through [`ViewerError`] as well.
//!
//! # Usage
//!
//! All public APIs return [`Result<T>`] which is an alias for `std::result::Result<T, ViewerError>`.
//!
//! ```rust,ignore
//! use myth_viewer::errors::{Result, ViewerError};
//!
//! fn reload(manager: &mut Manager) -> Result<()> {
//!     manager.load("assets/RobotExpressive.glb")?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// The document or the load request is malformed.
#[derive(Error, Debug)]
pub enum StructuralError {
    /// The source path does not carry a supported extension.
    #[error("Unrecognized file extension: {0}")]
    UnrecognizedExtension(String),

    /// An index stored in the document does not address its target sequence.
    #[error("{context} index out of bounds (index: {index}, len: {len})")]
    IndexOutOfBounds {
        /// Description of what was being accessed
        context: String,
        /// The invalid index
        index: usize,
        /// Length of the addressed sequence
        len: usize,
    },

    /// The requested scene does not exist.
    #[error("Scene index {index} out of range ({count} scenes)")]
    SceneIndexOutOfRange { index: usize, count: usize },

    /// The node hierarchy loops back onto itself.
    #[error("Node hierarchy contains a cycle through node {node}")]
    NodeCycle { node: usize },

    /// A node is referenced as a child more than once.
    #[error("Node {node} is referenced by more than one parent")]
    MultipleParents { node: usize },

    /// The geometry/material resolver rejected a resource.
    #[error("Failed to resolve resource: {0}")]
    Resolve(String),
}

/// The container decoder failed.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The container is not a well-formed asset.
    #[error("Malformed container: {0}")]
    Malformed(String),

    /// The asset declares a version this decoder does not handle.
    #[error("Unsupported asset version: {0}")]
    UnsupportedVersion(String),
}

#[cfg(feature = "gltf")]
impl From<gltf::Error> for DecodeError {
    fn from(err: gltf::Error) -> Self {
        match err {
            gltf::Error::Io(io) => DecodeError::Io(io),
            other => DecodeError::Malformed(other.to_string()),
        }
    }
}

/// A single skin or animation channel that could not be bound.
///
/// These never abort a load. The offending unit is skipped and the error is
/// kept in the scene's [`LoadReport`](crate::loader::LoadReport).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PartialBindError {
    #[error("Skin {skin}: joint {joint} references node {node}, which is not in the built scene")]
    UnresolvedJoint { skin: usize, joint: usize, node: usize },

    #[error("Skin {skin}: node {node} appears more than once in the joint list")]
    DuplicateJoint { skin: usize, node: usize },

    #[error("Skin {skin}: expected {expected} inverse bind matrices, found {found}")]
    InverseBindMatrices {
        skin: usize,
        expected: usize,
        found: usize,
    },

    #[error("Animation {animation}, channel {channel}: target node {node} is not in the built scene")]
    UnresolvedChannelTarget {
        animation: usize,
        channel: usize,
        node: usize,
    },

    #[error("Animation {animation}, channel {channel}: {reason}")]
    ChannelData {
        animation: usize,
        channel: usize,
        reason: String,
    },

    #[error("Animation {animation} has no channel that could be bound")]
    EmptyAnimation { animation: usize },
}

/// The main error type of the viewer core.
#[derive(Error, Debug)]
pub enum ViewerError {
    // ========================================================================
    // Load Errors
    // ========================================================================
    #[error(transparent)]
    Structural(#[from] StructuralError),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    // ========================================================================
    // Control Surface Errors
    // ========================================================================
    /// A control was used while no scene is loaded.
    #[error("No scene is loaded")]
    NoSceneLoaded,

    /// Clip index does not exist in the loaded scene.
    #[error("Clip index out of range (index: {index}, count: {count})")]
    ClipOutOfRange { index: usize, count: usize },

    /// Morph group or target index does not exist in the loaded scene.
    #[error("Morph slot out of range (group: {group}, target: {target})")]
    MorphSlotOutOfRange { group: usize, target: usize },

    /// Morph weights must be finite.
    #[error("Morph weight must be finite, got {0}")]
    NonFiniteWeight(f32),

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Settings could not be parsed.
    #[error("Settings error: {0}")]
    Settings(#[from] serde_json::Error),
}

impl ViewerError {
    /// Returns true for the error classes that abort a load
    /// (structural and decode failures).
    #[must_use]
    pub fn is_fatal_load_error(&self) -> bool {
        matches!(self, ViewerError::Structural(_) | ViewerError::Decode(_))
    }
}

/// Alias for `Result<T, ViewerError>`.
pub type Result<T> = std::result::Result<T, ViewerError>;
