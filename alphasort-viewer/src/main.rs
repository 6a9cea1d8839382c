use std::path::PathBuf;

use alphasort::{
    types::{CornerStatistic, DistanceMode, SortSettingsChange, Sorting},
    SortOutcome,
};
use anyhow::Context;
use pico_args::Arguments;

mod scene;

const HELP: &str = "\
alphasort-viewer: print back-to-front draw orders for a scene

USAGE:
    alphasort-viewer [OPTIONS] <SCENE>

OPTIONS:
    -m, --mode <MODE>    Distance mode: center, max, min or mean
    --front-to-back      Sort nearest first instead of farthest first
    --disabled           Turn sorting off, printing insertion order
    -h, --help           Print this message

Logging is controlled with RUST_LOG.
";

fn extract_mode(value: &str) -> Result<DistanceMode, &'static str> {
    Ok(match value.to_lowercase().as_str() {
        "center" | "c" => DistanceMode::Center,
        "max" | "corners" => DistanceMode::AllCorners(CornerStatistic::Max),
        "min" => DistanceMode::AllCorners(CornerStatistic::Min),
        "mean" | "avg" => DistanceMode::AllCorners(CornerStatistic::Mean),
        _ => return Err("mode requested but not found"),
    })
}

struct Options {
    scene: PathBuf,
    /// Overrides applied on top of the scene's own settings.
    change: SortSettingsChange,
}

fn parse_args() -> anyhow::Result<Option<Options>> {
    let mut args = Arguments::from_env();
    if args.contains(["-h", "--help"]) {
        return Ok(None);
    }

    let mode = args
        .opt_value_from_fn(["-m", "--mode"], extract_mode)
        .context("Invalid --mode")?;
    let sorting = args.contains("--front-to-back").then_some(Sorting::FrontToBack);
    let enabled = args.contains("--disabled").then_some(false);
    let scene: PathBuf = args.free_from_str().context("Missing scene file")?;

    let remaining = args.finish();
    if !remaining.is_empty() {
        log::warn!("Ignoring unknown arguments: {:?}", remaining);
    }

    Ok(Some(Options {
        scene,
        change: SortSettingsChange {
            enabled,
            sorting,
            mode,
            camera_epsilon: None,
        },
    }))
}

fn describe(outcome: SortOutcome) -> &'static str {
    match outcome {
        SortOutcome::Disabled => "sorting disabled",
        SortOutcome::Skipped => "unchanged, skipped",
        SortOutcome::Sorted { changed: true } => "reordered",
        SortOutcome::Sorted { changed: false } => "already in order",
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let Some(options) = parse_args()? else {
        print!("{HELP}");
        return Ok(());
    };

    let scene = scene::Scene::load(&options.scene)?;
    let mut settings = scene.settings.clone();
    settings.update_from_changes(options.change);
    log::debug!("Effective sort settings: {:?}", settings);

    let (mut sorter, names) = scene::populate(&scene, settings)?;

    for (i, camera) in scene.cameras.iter().enumerate() {
        match camera.view().with_context(|| format!("Camera {i} is invalid"))? {
            Some(view) => sorter.set_camera_view(view),
            None => sorter.set_camera_location(camera.location),
        }
        let outcome = sorter.sort_if_stale();

        println!("camera {i} at {}: {}", camera.location, describe(outcome));
        for (position, handle) in sorter.queue().handles().enumerate() {
            println!("  {position:>3}  {}", names.objects[handle.idx]);
        }
        for (handle, mesh) in sorter.meshes() {
            println!("  mesh {}: {:?}", names.meshes[handle.idx], mesh.indices());
        }
    }

    let statistics = sorter.statistics();
    log::info!(
        "{} sorts performed, {} skipped, {} changed the order",
        statistics.sorts_performed,
        statistics.sorts_skipped,
        statistics.orders_changed
    );

    Ok(())
}
