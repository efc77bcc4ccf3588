#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

//! Runtime assembly of glTF-style documents into an animated scene graph.
//!
//! Pipeline: [`document`] → [`loader`] (scene builder, skeleton binder,
//! animation compiler) → [`manager::LoadedScene`], driven per frame by the
//! [`animation::AnimationPlayer`] and the [`morph::MorphBlendController`].

pub mod animation;
pub mod assets;
pub mod controls;
pub mod document;
pub mod errors;
pub mod loader;
pub mod manager;
pub mod morph;
pub mod scene;
pub mod settings;
pub mod utils;

pub use animation::{AnimationAction, AnimationClip, AnimationPlayer, LoopMode};
pub use assets::{AssetStore, GeometryResolver};
pub use controls::{ControlAction, ControlEvent, ControlKind, ControlSpec};
pub use document::{Document, DocumentDecoder, SourceKind};
#[cfg(feature = "gltf")]
pub use document::GltfDecoder;
pub use errors::{DecodeError, PartialBindError, Result, StructuralError, ViewerError};
pub use loader::LoadReport;
pub use manager::{FileStatus, HeadlessHost, HostScene, LoadedScene, SceneId, SceneManager};
pub use morph::{MorphBlendController, MorphGroup};
pub use scene::{MeshInstance, Node, NodeHandle, SceneGraph, Skeleton};
pub use settings::LoaderSettings;
