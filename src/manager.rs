//! Scene Lifecycle Manager
//!
//! Owns the single [`LoadedScene`] and replaces it on [`SceneManager::load`].
//! A load is built completely off to the side; only a fully built scene
//! detaches and releases the previous one, so a failed load leaves the
//! visible state untouched.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::animation::AnimationPlayer;
use crate::assets::{GeometryResolver, ResolvedResources};
use crate::controls::{self, ControlEvent, ControlSpec};
use crate::document::{Document, DocumentDecoder, SourceKind};
use crate::errors::{Result, ViewerError};
use crate::loader::{LoadReport, SceneBuilder, bind_skins, compile_animations};
use crate::morph::MorphBlendController;
use crate::scene::{NodeHandle, SceneGraph};
use crate::settings::LoaderSettings;
use crate::utils::time::FrameClock;

/// Identity of one load. Never reused within a manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SceneId(u64);

impl fmt::Display for SceneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scene#{}", self.0)
    }
}

/// The presentation scene the loaded root is spliced into.
pub trait HostScene {
    fn attach(&mut self, id: SceneId, graph: &SceneGraph, root: NodeHandle);
    fn detach(&mut self, id: SceneId, root: NodeHandle);
}

/// Host that only tracks what is attached.
#[derive(Debug, Default)]
pub struct HeadlessHost {
    attached: Option<(SceneId, NodeHandle)>,
}

impl HeadlessHost {
    #[must_use]
    pub fn attached(&self) -> Option<(SceneId, NodeHandle)> {
        self.attached
    }
}

impl HostScene for HeadlessHost {
    fn attach(&mut self, id: SceneId, _graph: &SceneGraph, root: NodeHandle) {
        self.attached = Some((id, root));
    }

    fn detach(&mut self, id: SceneId, _root: NodeHandle) {
        if self.attached.is_some_and(|(current, _)| current == id) {
            self.attached = None;
        }
    }
}

/// Everything one successful load produced.
#[derive(Debug)]
pub struct LoadedScene {
    pub id: SceneId,
    pub source: PathBuf,
    pub graph: SceneGraph,
    pub root: NodeHandle,
    pub player: AnimationPlayer,
    pub morphs: MorphBlendController,
    pub report: LoadReport,
    pub(crate) resources: ResolvedResources,
}

impl LoadedScene {
    #[must_use]
    pub fn resources(&self) -> &ResolvedResources {
        &self.resources
    }

    #[must_use]
    pub fn clip_count(&self) -> usize {
        self.player.len()
    }

    /// File name of the source, for display.
    #[must_use]
    pub fn file_name(&self) -> String {
        self.source
            .file_name()
            .map_or_else(|| self.source.display().to_string(), |n| n.to_string_lossy().into_owned())
    }
}

/// What the file-selection control shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStatus {
    /// `"File: <name>"`, or `"Select File"` when nothing is loaded.
    pub label: String,
    /// Message of the last failed load, cleared by the next success.
    pub error: Option<String>,
}

/// Scene Lifecycle Manager.
///
/// `load` takes `&mut self`, so at most one load is in flight.
pub struct SceneManager<D, R, H> {
    decoder: D,
    resolver: R,
    host: H,
    settings: LoaderSettings,

    current: Option<LoadedScene>,
    last_error: Option<String>,
    next_id: u64,
}

impl<D, R, H> SceneManager<D, R, H>
where
    D: DocumentDecoder,
    R: GeometryResolver,
    H: HostScene,
{
    pub fn new(decoder: D, resolver: R, host: H, settings: LoaderSettings) -> Self {
        Self {
            decoder,
            resolver,
            host,
            settings,
            current: None,
            last_error: None,
            next_id: 0,
        }
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Decodes and loads `path`, replacing the current scene on success.
    ///
    /// The extension is checked before the decoder runs. On any fatal error
    /// the current scene stays attached and the error is kept for [`status`](Self::status).
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<SceneId> {
        let path = path.as_ref();
        let result = self.decode_and_build(path);
        self.commit(result, path)
    }

    fn decode_and_build(&mut self, path: &Path) -> Result<LoadedScene> {
        let kind = SourceKind::from_path(path)?;
        let document = self.decoder.decode(path, kind)?;
        self.build(&document, path)
    }

    /// Loads an already decoded document.
    pub fn load_document(&mut self, document: &Document, source: impl AsRef<Path>) -> Result<SceneId> {
        let source = source.as_ref();
        let result = self.build(document, source);
        self.commit(result, source)
    }

    fn build(&mut self, document: &Document, source: &Path) -> Result<LoadedScene> {
        let mut built = SceneBuilder::build(document, self.settings.scene_index, &mut self.resolver)?;

        let mut report = LoadReport::default();
        bind_skins(document, &mut built, &mut report);

        let mut player = AnimationPlayer::new();
        for mut action in compile_animations(document, &built, &mut report) {
            action.set_loop(self.settings.loop_clips);
            action.paused = self.settings.start_paused;
            player.add_action(action);
        }

        let morphs = MorphBlendController::discover(&built.graph, built.root, |mesh| {
            document
                .meshes
                .get(mesh)
                .map(|m| m.target_names.clone())
                .unwrap_or_default()
        });

        if self.settings.update_world_matrices {
            built.graph.update_world_matrices(built.root);
        }

        self.next_id += 1;
        Ok(LoadedScene {
            id: SceneId(self.next_id),
            source: source.to_path_buf(),
            graph: built.graph,
            root: built.root,
            player,
            morphs,
            report,
            resources: built.resources,
        })
    }

    fn commit(&mut self, result: Result<LoadedScene>, source: &Path) -> Result<SceneId> {
        match result {
            Ok(scene) => {
                let id = scene.id;
                log::info!(
                    "Loaded {} as {id}: {} nodes, {} clips, {} morph groups, {} bind errors",
                    source.display(),
                    scene.graph.node_count(),
                    scene.player.len(),
                    scene.morphs.groups().len(),
                    scene.report.partial_errors.len()
                );
                self.replace_current(scene);
                self.last_error = None;
                Ok(id)
            }
            Err(err) => {
                log::error!("Failed to load {}: {err}", source.display());
                self.last_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    fn replace_current(&mut self, scene: LoadedScene) {
        if let Some(old) = self.current.take() {
            self.release(old);
        }
        self.host.attach(scene.id, &scene.graph, scene.root);
        self.current = Some(scene);
    }

    fn release(&mut self, mut scene: LoadedScene) {
        self.host.detach(scene.id, scene.root);
        scene.player.stop_all();
        scene.graph.remove_node(scene.root);
        scene.resources.release_into(&mut self.resolver);
        log::debug!("Released {} ({})", scene.id, scene.source.display());
    }

    /// Detaches and releases the current scene, if any.
    pub fn unload(&mut self) {
        if let Some(scene) = self.current.take() {
            self.release(scene);
        }
    }

    // ========================================================================
    // Per-frame
    // ========================================================================

    /// Advances the current scene's clips by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        let Some(scene) = self.current.as_mut() else {
            return;
        };
        scene.player.update(dt, &mut scene.graph);
        if self.settings.update_world_matrices {
            scene.graph.update_world_matrices(scene.root);
        }
    }

    /// Pulls one `dt` from `clock` and ticks.
    pub fn tick_with(&mut self, clock: &mut impl FrameClock) {
        let dt = clock.next_dt();
        self.tick(dt);
    }

    // ========================================================================
    // Controls
    // ========================================================================

    /// Control descriptors for the current scene (empty when none is loaded).
    #[must_use]
    pub fn controls(&self) -> Vec<ControlSpec> {
        self.current
            .as_ref()
            .map(|scene| controls::build_controls(scene, &self.settings))
            .unwrap_or_default()
    }

    pub fn apply(&mut self, event: ControlEvent) -> Result<()> {
        let scene = self.current.as_mut().ok_or(ViewerError::NoSceneLoaded)?;
        match event {
            ControlEvent::ToggleClip { clip } => {
                let playing = scene.player.toggle(clip)?;
                log::debug!("Clip {clip} {}", if playing { "playing" } else { "paused" });
            }
            ControlEvent::SetMorphWeight {
                group,
                target,
                value,
            } => scene
                .morphs
                .set_weight(group, target, value, &mut scene.graph)?,
        }
        Ok(())
    }

    /// Play/Pause toggle for clip `index`; returns the new playing state.
    pub fn toggle_clip(&mut self, index: usize) -> Result<bool> {
        let scene = self.current.as_mut().ok_or(ViewerError::NoSceneLoaded)?;
        scene.player.toggle(index)
    }

    pub fn set_morph_weight(&mut self, group: usize, target: usize, value: f32) -> Result<()> {
        self.apply(ControlEvent::SetMorphWeight {
            group,
            target,
            value,
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[must_use]
    pub fn current(&self) -> Option<&LoadedScene> {
        self.current.as_ref()
    }

    pub fn current_mut(&mut self) -> Option<&mut LoadedScene> {
        self.current.as_mut()
    }

    #[must_use]
    pub fn status(&self) -> FileStatus {
        FileStatus {
            label: self
                .current
                .as_ref()
                .map_or_else(|| "Select File".to_string(), |s| format!("File: {}", s.file_name())),
            error: self.last_error.clone(),
        }
    }

    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    #[must_use]
    pub fn settings(&self) -> &LoaderSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut LoaderSettings {
        &mut self.settings
    }

    #[must_use]
    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn decoder_mut(&mut self) -> &mut D {
        &mut self.decoder
    }
}
