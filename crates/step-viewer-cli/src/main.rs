//! STEP Piece Viewer - headless driver
//!
//! Loads a set of pieces, replays navigation and pick requests through the
//! viewer shell at 60 fps and prints what a windowed viewer would show.

mod config;
mod driver;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use step_viewer_loader::{FsSource, ModelLoader};
use step_viewer_model::{NoKernel, ReadyKernel};
use step_viewer_scene::{Direction, ShellView, ViewerShell};
use step_viewer_truck::TruckKernel;

use crate::driver::{render_view, Driver, NavigationOutcome};

#[derive(Parser, Debug)]
#[command(name = "step-viewer")]
#[command(about = "Load STEP pieces and replay viewer navigation headlessly")]
#[command(version)]
struct Args {
    /// Directory piece paths are resolved against
    #[arg(short, long)]
    root: Option<PathBuf>,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the kernel readiness timeout
    #[arg(long)]
    kernel_timeout_ms: Option<u64>,

    /// Run without a geometry kernel, showing placeholders only
    #[arg(long)]
    no_kernel: bool,

    /// Navigation steps to replay, in order (left or right)
    #[arg(short, long)]
    navigate: Vec<Direction>,

    /// Triangle indices to pick on the final piece
    #[arg(short, long)]
    pick: Vec<u32>,

    /// Print views as JSON
    #[arg(long)]
    json: bool,

    /// Piece files (defaults to the configured pieces)
    paths: Vec<String>,
}

fn print_view(view: &ShellView, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(view)?);
    } else {
        println!("{}", render_view(view));
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    log::info!("STEP Viewer v{}", env!("CARGO_PKG_VERSION"));

    let mut config = config::load_config(args.config.as_deref())?;
    if let Some(timeout) = args.kernel_timeout_ms {
        config.loader.kernel_timeout_ms = timeout;
    }
    let paths = if args.paths.is_empty() {
        config.viewer.pieces.clone()
    } else {
        args.paths.clone()
    };

    let source = match &args.root {
        Some(root) => FsSource::new(root),
        None => FsSource::unrooted(),
    };
    let loader = if args.no_kernel {
        log::info!("Geometry kernel disabled, pieces load as placeholders");
        ModelLoader::new(source, NoKernel, config.loader.clone())
    } else {
        let kernels = ReadyKernel(Arc::new(TruckKernel::new()));
        ModelLoader::new(source, kernels, config.loader.clone())
    };

    let mut driver = Driver::new(ViewerShell::new(config.viewer));
    driver.load(&loader, &paths).await?;
    print_view(&driver.view(), args.json)?;

    for direction in args.navigate {
        match driver.navigate(direction).await {
            NavigationOutcome::Ignored => continue,
            NavigationOutcome::Converged { frames } => {
                log::info!("Slide {} finished after {} frames", direction, frames)
            }
            NavigationOutcome::TimedOut { frames } => {
                log::warn!("Slide {} forced to end after {} frames", direction, frames)
            }
        }
        print_view(&driver.view(), args.json)?;
    }
    if !driver.orbit_controls() {
        log::warn!("Orbit controls left disabled after navigation");
    }

    for triangle in args.pick {
        driver.pick(triangle);
        print_view(&driver.view(), args.json)?;
    }

    log::info!(
        "Finished with {} pieces ({:?})",
        driver.shell().models().len(),
        driver.shell().status()
    );
    driver.unmount();
    Ok(())
}
