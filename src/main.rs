//! sqcenter CLI: create squared, centered ROI mask stacks from cell contours.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{CommandFactory, FromArgMatches, Parser};

use sqcenter::config;
use sqcenter::io::PickleSource;
use sqcenter::{AllFramesPolicy, CompositorConfig, SquarePipeline};

/// Create squared bounding boxes from cell contours.
#[derive(Parser, Debug)]
#[command(name = "sqcenter", version)]
struct Cli {
    /// Area of adhesion site (by default in px²) or named area (see below).
    /// When specifying the area in µm² or a named area, specify resolution
    /// using '-r'.
    #[arg(value_name = "AREA")]
    area: String,

    /// Path(s) of the pickled file(s) with the cell contours.
    #[arg(value_name = "PATH", required = true)]
    path: Vec<String>,

    /// Relative area of the ROI, inclusive adhesion site and margin, in
    /// percent of the adhesion site area. Multiple areas can be specified as
    /// comma-separated list.
    #[arg(short, long, default_value = "100")]
    margin: String,

    /// Resolution of the area in px/µm or named microscope resolution (see below).
    #[arg(short, long, value_name = "RES")]
    resolution: Option<String>,

    /// Do not exclude ROIs that hit the border.
    #[arg(short = 'b', long)]
    ignore_borders: bool,

    /// Output directory, if result files should not be written to the same
    /// directory as the input file.
    #[arg(short, long)]
    outdir: Option<PathBuf>,

    /// Treat the given path(s) as Unix filename glob.
    #[arg(short, long)]
    glob: bool,

    /// Suppress status output.
    #[arg(short, long)]
    silent: bool,

    /// Insert a ROI centered at the given coordinate, e.g. '100,200' for
    /// x=100 and y=200 (in pixels). Separate multiple ROIs with a semicolon
    /// or repeat this option.
    #[arg(short = 'x', long)]
    empty: Vec<String>,

    /// Draw the ROIs of '--empty' into every frame instead of leaving them
    /// out of the per-frame stacks.
    #[arg(long)]
    broadcast_empty: bool,
}

fn main() -> Result<()> {
    let matches = Cli::command().after_help(config::epilog()).get_matches();
    let cli = Cli::from_arg_matches(&matches)?;

    let level = if cli.silent {
        log::LevelFilter::Warn
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let area = config::resolve_area(&cli.area, cli.resolution.as_deref())?;
    let margins = config::parse_margins(&cli.margin)?;
    let empty = config::parse_coordinates(&cli.empty)?;
    let paths = config::expand_paths(&cli.path, cli.glob)?;

    let compositor = CompositorConfig {
        margins,
        ignore_borders: cli.ignore_borders,
        all_frames: if cli.broadcast_empty {
            AllFramesPolicy::Broadcast
        } else {
            AllFramesPolicy::Skip
        },
    };
    log::debug!("area {area} px², {compositor:?}");

    let mut pipeline = SquarePipeline::new(PickleSource, area, compositor).with_empty_sites(&empty)?;
    if let Some(outdir) = cli.outdir {
        pipeline = pipeline.with_outdir(outdir);
    }

    for path in &paths {
        pipeline
            .process_file(path)
            .with_context(|| format!("Failed to process {}", path.display()))?;
    }
    Ok(())
}
