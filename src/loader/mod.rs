//! Document → scene graph.
//!
//! Three passes, run in order on a freshly decoded [`Document`](crate::document::Document):
//!
//! 1. [`builder`]: instantiates the node tree of one scene and resolves
//!    meshes. All-or-nothing: any structural error aborts and releases
//!    what was resolved so far.
//! 2. [`skin`]: binds skins to skinned meshes. A failing skin is skipped.
//! 3. [`animation`]: compiles animations into clips. A failing channel is
//!    skipped; a failing animation produces no clip.
//!
//! Non-fatal failures are logged and collected in a [`LoadReport`].

pub mod animation;
pub mod builder;
pub mod skin;

pub use animation::compile_animations;
pub use builder::{BuiltScene, NodeMap, SceneBuilder};
pub use skin::bind_skins;

use crate::errors::PartialBindError;

/// Non-fatal problems met while loading one document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub partial_errors: Vec<PartialBindError>,
}

impl LoadReport {
    /// Logs `error` and records it.
    pub fn push(&mut self, error: PartialBindError) {
        log::error!("{error}");
        self.partial_errors.push(error);
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.partial_errors.is_empty()
    }
}
