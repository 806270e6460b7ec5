//! Command-line front end for the feature renderer.
//!
//! Loads a feature list and a renderer record, draws one pass onto a raster
//! and writes it as PNG. Labels placed during the pass are printed to stdout
//! as JSON.

mod layer;

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::Parser;
use feature_renderer::{PixmapTarget, RenderConfig, RenderDispatcher, RunOutcome};
use map_common::BoundingBox;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use layer::{load_record, FileLayer};

#[derive(Parser, Debug)]
#[command(name = "render-cli")]
#[command(about = "Render cached vector features to a PNG")]
struct Args {
    /// Renderer record (JSON)
    #[arg(short, long)]
    renderer: PathBuf,

    /// Feature list (JSON array of {id, geometry?})
    #[arg(short, long)]
    features: PathBuf,

    /// Visible extent as "min_x,min_y,max_x,max_y"
    #[arg(short, long, allow_hyphen_values = true)]
    bounds: BoundingBox,

    /// Output width in pixels
    #[arg(long, default_value_t = 512)]
    width: u32,

    /// Output height in pixels
    #[arg(long, default_value_t = 512)]
    height: u32,

    /// Output PNG path
    #[arg(short, long, default_value = "out.png")]
    output: PathBuf,

    /// Draw threads (overrides RENDER_DRAW_THREADS)
    #[arg(long)]
    threads: Option<usize>,

    /// Seconds to wait for the pass to finish
    #[arg(long, default_value_t = 30)]
    wait_secs: u64,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(true)
        .json()
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = RenderConfig::from_env();
    if let Some(threads) = args.threads {
        config = config.with_draw_threads(threads);
    }
    info!(?config, "Starting feature render");

    let layer = Arc::new(FileLayer::load(&args.features)?);
    let record = load_record(&args.renderer)?;

    let dispatcher = RenderDispatcher::new(layer.clone(), config)?;
    dispatcher
        .deserialize(&record)
        .with_context(|| format!("Failed to load renderer from {}", args.renderer.display()))?;

    let target = Arc::new(PixmapTarget::new(args.width, args.height, args.bounds)?);

    let started = Instant::now();
    let outcome = dispatcher.run(target.clone())?;
    info!(?outcome, "Render pass started");

    if outcome != RunOutcome::NoStyle {
        let timeout = Duration::from_secs(args.wait_secs);
        if !layer.wait_finished(timeout) {
            let cancelled = dispatcher.cancel();
            warn!(?cancelled, progress = layer.progress(), "Render pass cancelled");
            bail!("Render pass did not finish within {}s", args.wait_secs);
        }
    }

    let png = target.encode_png()?;
    fs::write(&args.output, &png)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    info!(
        output = %args.output.display(),
        bytes = png.len(),
        features = layer.len(),
        commands = target.command_count(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Render complete"
    );

    println!("{}", serde_json::to_string_pretty(&target.labels())?);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parse_bounds() {
        let args = Args::try_parse_from([
            "render-cli",
            "--renderer",
            "r.json",
            "--features",
            "f.json",
            "--bounds",
            "-10,-5,10,5",
        ])
        .unwrap();
        assert_eq!(args.bounds, BoundingBox::new(-10.0, -5.0, 10.0, 5.0));
        assert_eq!((args.width, args.height), (512, 512));
        assert_eq!(args.output, PathBuf::from("out.png"));
        assert_eq!(args.threads, None);
    }

    #[test]
    fn test_args_reject_bad_bounds() {
        let result = Args::try_parse_from([
            "render-cli",
            "-r",
            "r.json",
            "-f",
            "f.json",
            "-b",
            "1,2,3",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_sample_pass_renders() {
        let dir = test_utils::temp_test_dir_with_prefix("render_cli");
        let testdata = test_utils::service_testdata_dir("render-cli");

        let layer = Arc::new(FileLayer::load(&testdata.join("features.json")).unwrap());
        let dispatcher = RenderDispatcher::new(layer.clone(), RenderConfig::default()).unwrap();
        dispatcher
            .deserialize(&load_record(&testdata.join("renderer.json")).unwrap())
            .unwrap();

        let target =
            Arc::new(PixmapTarget::new(100, 100, BoundingBox::new(0.0, 0.0, 100.0, 100.0)).unwrap());
        let outcome = dispatcher.run(target.clone()).unwrap();
        assert!(matches!(outcome, RunOutcome::Dispatched { features: 5, .. }));
        assert!(layer.wait_finished(Duration::from_secs(30)));

        // Five anchors across four loaded features
        assert_eq!(target.labels().len(), 5);
        let path = dir.path().join("out.png");
        fs::write(&path, target.encode_png().unwrap()).unwrap();
        assert!(fs::metadata(&path).unwrap().len() > 0);
    }
}
