//! Usage: `gltf_inspect <model.glb|model.gltf> [settings.json] [seconds]`

use std::path::PathBuf;

use myth_viewer::utils::FixedStep;
use myth_viewer::{
    AssetStore, ControlKind, GltfDecoder, HeadlessHost, LoaderSettings, SceneManager,
};

const FRAME_DT: f32 = 1.0 / 60.0;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let Some(model) = args.next().map(PathBuf::from) else {
        anyhow::bail!("usage: gltf_inspect <model.glb|model.gltf> [settings.json] [seconds]");
    };

    let settings = match args.next() {
        Some(path) => LoaderSettings::from_json_str(&std::fs::read_to_string(path)?)?,
        None => LoaderSettings::default(),
    };
    let seconds: f32 = args.next().map_or(Ok(2.0), |s| s.parse())?;

    let mut manager = SceneManager::new(
        GltfDecoder::new(),
        AssetStore::new(),
        HeadlessHost::default(),
        settings,
    );

    let id = manager.load(&model)?;
    println!("{}  ({id})", manager.status().label);

    if let Some(scene) = manager.current() {
        println!(
            "  {} nodes, {} clips, {} morph groups",
            scene.graph.node_count(),
            scene.clip_count(),
            scene.morphs.groups().len()
        );
        for error in &scene.report.partial_errors {
            println!("  skipped: {error}");
        }
    }

    println!("Controls:");
    for control in manager.controls() {
        match control.kind {
            ControlKind::Toggle { checked } => {
                println!("  [{}] {}", if checked { "x" } else { " " }, control.label);
            }
            ControlKind::Slider { min, max, value } => {
                println!("  {:<24} {value:.3}  ({min}..{max})", control.label);
            }
        }
    }

    // Start every clip and advance the scene.
    for control in manager.controls() {
        if matches!(control.kind, ControlKind::Toggle { checked: false }) {
            manager.apply(control.action.fire(0.0))?;
        }
    }

    let mut clock = FixedStep::new(FRAME_DT);
    while clock.elapsed() < seconds {
        manager.tick_with(&mut clock);
    }
    log::info!("Advanced {} frames ({:.2}s)", clock.frame_count, clock.elapsed());

    if let Some(scene) = manager.current() {
        for action in scene.player.actions() {
            println!(
                "  clip '{}': t = {:.3} / {:.3}s",
                action.name(),
                action.time,
                action.clip().duration
            );
        }
    }

    manager.unload();
    Ok(())
}
