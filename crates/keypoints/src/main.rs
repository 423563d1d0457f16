//! keypoints: reduce a shape outline to its most important points.
//!
//! Reads a shape file (whitespace-separated `x y` pairs), removes the least
//! important point until the requested number remains, prints a diagnostics
//! report, and optionally renders the input points and the reduced outline
//! to SVG and/or PNG.
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin keypoints -- [OPTIONS] [SHAPE_PATH]
//! ```
//!
//! Log verbosity follows `-v`/`-q`; `RUST_LOG` overrides both.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::{ArgAction, Parser, ValueEnum};
use keypoints_core::diagnostics::{Clock, ReductionDiagnostics, simplify_with_diagnostics};
use keypoints_core::{Dimensions, Point, ReduceConfig, ReducerKind, Reduction};
use keypoints_export::{Drawing, RenderStyle, SvgMetadata};
use log::LevelFilter;
use serde::Serialize;

/// Pixels of padding added by `--fit` past the largest coordinate.
const FIT_MARGIN: u32 = 20;

/// Reduce a closed shape outline to its most important points.
///
/// Each step scores every point by how far the outline detours through it
/// and drops the lowest, until `--points` remain.
#[derive(Parser)]
#[command(name = "keypoints", version)]
struct Cli {
    /// Shape file: whitespace-separated `x y` coordinate pairs.
    #[arg(default_value = "assets/shapes/flower.txt")]
    shape_path: PathBuf,

    /// Number of points to keep.
    #[arg(short = 'n', long = "points", default_value_t = ReduceConfig::DEFAULT_TARGET_SIZE, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    points: usize,

    /// Strategy for finding the least important point.
    #[arg(long, value_enum, default_value_t = CLI_DEFAULT_STRATEGY)]
    reducer: Strategy,

    /// Refuse runs that would need more than this many removals.
    #[arg(long)]
    max_removals: Option<usize>,

    /// Full reduction config as a JSON string.
    ///
    /// When provided, `--points`, `--reducer` and `--max-removals` are
    /// ignored. The JSON must be a valid `ReduceConfig` serialization;
    /// missing fields take their defaults.
    #[arg(long)]
    config_json: Option<String>,

    /// Write SVG output to file.
    #[arg(long)]
    svg: Option<PathBuf>,

    /// Write PNG output to file.
    #[arg(long)]
    png: Option<PathBuf>,

    /// Canvas width in pixels.
    #[arg(long, default_value_t = Dimensions::DEFAULT_SIZE, value_parser = clap::builder::RangedU64ValueParser::<u32>::new().range(1..))]
    width: u32,

    /// Canvas height in pixels.
    #[arg(long, default_value_t = Dimensions::DEFAULT_SIZE, value_parser = clap::builder::RangedU64ValueParser::<u32>::new().range(1..))]
    height: u32,

    /// Size the canvas to the shape instead of using --width/--height.
    #[arg(long, conflicts_with_all = ["width", "height"])]
    fit: bool,

    /// Radius of the dot drawn on each point, in pixels.
    #[arg(long, default_value_t = RenderStyle::DEFAULT_POINT_RADIUS)]
    point_radius: f64,

    /// Stroke width of the reduced outline, in pixels.
    #[arg(long, default_value_t = RenderStyle::DEFAULT_LINE_WIDTH)]
    line_width: f64,

    /// Number of runs for averaging.
    #[arg(long, default_value_t = 1, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    runs: usize,

    /// Output the reduction and diagnostics as JSON instead of a report.
    #[arg(long)]
    json: bool,

    /// More log output (repeat for more).
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,

    /// Less log output (repeat for less).
    #[arg(short, long, action = ArgAction::Count)]
    quiet: u8,
}

/// Reduction strategy selection.
#[derive(Clone, Copy, ValueEnum)]
enum Strategy {
    /// Re-score every point on every step.
    Rescan,
    /// Binary heap of scores, re-scoring only the neighbors of each removal.
    LazyHeap,
}

/// Maps a [`ReducerKind`] to the local CLI [`Strategy`] enum.
const fn strategy_from_core(kind: ReducerKind) -> Strategy {
    match kind {
        ReducerKind::Rescan => Strategy::Rescan,
        ReducerKind::LazyHeap => Strategy::LazyHeap,
    }
}

/// The CLI default strategy, derived from [`ReduceConfig::DEFAULT_REDUCER`]
/// so the two cannot silently diverge.
const CLI_DEFAULT_STRATEGY: Strategy = strategy_from_core(ReduceConfig::DEFAULT_REDUCER);

/// Build a [`ReduceConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and the
/// individual reduction flags are ignored.
fn config_from_cli(cli: &Cli) -> Result<ReduceConfig, String> {
    if let Some(ref json) = cli.config_json {
        return serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"));
    }

    Ok(ReduceConfig {
        target_size: cli.points,
        reducer: match cli.reducer {
            Strategy::Rescan => ReducerKind::Rescan,
            Strategy::LazyHeap => ReducerKind::LazyHeap,
        },
        max_removals: cli.max_removals,
    })
}

/// Default level is `info`; each `-v` raises it and each `-q` lowers it.
const fn level_filter(verbose: u8, quiet: u8) -> LevelFilter {
    match (verbose, quiet) {
        (0, 0) => LevelFilter::Info,
        (0, 1) => LevelFilter::Warn,
        (0, 2) => LevelFilter::Error,
        (0, _) => LevelFilter::Off,
        (1, _) => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn init_logging(cli: &Cli) {
    let mut builder = pretty_env_logger::formatted_builder();
    builder.filter_level(level_filter(cli.verbose, cli.quiet));
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    if let Err(e) = builder.try_init() {
        // A logger installed earlier in the process keeps running.
        eprintln!("Logger already installed: {e}");
    }
}

/// JSON document printed per run with `--json`.
#[derive(Serialize)]
struct RunOutput<'a> {
    reduction: &'a Reduction,
    diagnostics: &'a ReductionDiagnostics,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    let config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let text = match std::fs::read_to_string(&cli.shape_path) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error reading {}: {e}", cli.shape_path.display());
            return ExitCode::FAILURE;
        }
    };

    let points = match keypoints_core::parse_points(&text) {
        Ok(points) => points,
        Err(e) => {
            eprintln!("Error parsing {}: {e}", cli.shape_path.display());
            return ExitCode::FAILURE;
        }
    };

    log::info!(
        "shape {}: {} points",
        cli.shape_path.display(),
        points.len()
    );
    log::info!("config: {config:?}");

    let mut all_diagnostics = Vec::with_capacity(cli.runs);

    for run in 0..cli.runs {
        if cli.runs > 1 {
            log::info!("run {}/{}", run + 1, cli.runs);
        }

        let (reduction, diagnostics) = match simplify_with_diagnostics(&points, &config, &StdClock)
        {
            Ok(result) => result,
            Err(e) => {
                eprintln!("Reduction error: {e}");
                return ExitCode::FAILURE;
            }
        };

        if cli.json {
            let output = RunOutput {
                reduction: &reduction,
                diagnostics: &diagnostics,
            };
            match serde_json::to_string_pretty(&output) {
                Ok(json) => println!("{json}"),
                Err(e) => {
                    eprintln!("Error serializing diagnostics: {e}");
                    return ExitCode::FAILURE;
                }
            }
        } else {
            println!("{}", diagnostics.report());
        }

        // Render on the first run only.
        if run == 0
            && let Err(msg) = write_renderings(&cli, &config, &points, &reduction)
        {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }

        all_diagnostics.push(diagnostics);
    }

    if cli.runs > 1 {
        print_multi_run_summary(&all_diagnostics);
    }

    ExitCode::SUCCESS
}

/// Write the SVG and PNG files requested on the command line.
fn write_renderings(
    cli: &Cli,
    config: &ReduceConfig,
    points: &[Point],
    reduction: &Reduction,
) -> Result<(), String> {
    if cli.svg.is_none() && cli.png.is_none() {
        return Ok(());
    }

    let dimensions = if cli.fit {
        Dimensions::enclosing(points, FIT_MARGIN)
    } else {
        Dimensions {
            width: cli.width,
            height: cli.height,
        }
    };
    let style = RenderStyle {
        point_radius: cli.point_radius,
        line_width: cli.line_width,
    };
    let drawing = Drawing::from_reduction(reduction);

    if let Some(ref svg_path) = cli.svg {
        let title = cli
            .shape_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("keypoints");
        let desc = format!(
            "{} of {} points kept ({})",
            reduction.outline.len(),
            reduction.initial.len(),
            config.reducer.name(),
        );
        let metadata = SvgMetadata {
            title: Some(title),
            description: Some(&desc),
        };
        let svg = keypoints_export::to_svg(&drawing, dimensions, &style, &metadata);
        write_file(svg_path, svg.as_bytes(), "SVG")?;
    }

    if let Some(ref png_path) = cli.png {
        let png = keypoints_export::to_png(&drawing, dimensions, &style)
            .map_err(|e| format!("Error rendering PNG: {e}"))?;
        write_file(png_path, &png, "PNG")?;
    }

    Ok(())
}

fn write_file(path: &Path, bytes: &[u8], what: &str) -> Result<(), String> {
    std::fs::write(path, bytes)
        .map_err(|e| format!("Error writing {what} to {}: {e}", path.display()))?;
    log::info!(
        "{what} written to {} ({} bytes)",
        path.display(),
        bytes.len()
    );
    Ok(())
}

/// [`Clock`] implementation backed by [`std::time::Instant`].
struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn elapsed(&self, since: &Instant) -> Duration {
        since.elapsed()
    }
}

/// Print aggregated timing across multiple runs.
#[allow(clippy::cast_precision_loss)]
fn print_multi_run_summary(all_diagnostics: &[ReductionDiagnostics]) {
    println!();
    println!(
        "Summary ({} runs)\n{}",
        all_diagnostics.len(),
        "=".repeat(60),
    );

    if all_diagnostics.is_empty() {
        println!("Warning: no diagnostics to summarize");
        return;
    }

    let durations: Vec<f64> = all_diagnostics
        .iter()
        .map(|d| d.duration.as_secs_f64() * 1000.0)
        .collect();

    let min = durations.iter().copied().reduce(f64::min).unwrap_or(0.0);
    let max = durations.iter().copied().reduce(f64::max).unwrap_or(0.0);
    let mean = durations.iter().sum::<f64>() / durations.len() as f64;

    println!("Duration: min={min:.3}ms  mean={mean:.3}ms  max={max:.3}ms");
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_core() {
        let cli = Cli::parse_from(["keypoints"]);
        let config = config_from_cli(&cli).unwrap();
        assert_eq!(config, ReduceConfig::default());
        assert_eq!(cli.shape_path, PathBuf::from("assets/shapes/flower.txt"));
        assert_eq!(cli.width, Dimensions::DEFAULT_SIZE);
    }

    #[test]
    fn flags_build_config() {
        let cli = Cli::parse_from([
            "keypoints",
            "shape.txt",
            "-n",
            "12",
            "--reducer",
            "lazy-heap",
            "--max-removals",
            "5",
        ]);
        let config = config_from_cli(&cli).unwrap();
        assert_eq!(config.target_size, 12);
        assert_eq!(config.reducer, ReducerKind::LazyHeap);
        assert_eq!(config.max_removals, Some(5));
    }

    #[test]
    fn config_json_overrides_flags() {
        let cli = Cli::parse_from([
            "keypoints",
            "-n",
            "12",
            "--config-json",
            r#"{"target_size": 7, "reducer": "LazyHeap"}"#,
        ]);
        let config = config_from_cli(&cli).unwrap();
        assert_eq!(config.target_size, 7);
        assert_eq!(config.reducer, ReducerKind::LazyHeap);
        assert_eq!(config.max_removals, None);
    }

    #[test]
    fn bad_config_json_is_reported() {
        let cli = Cli::parse_from(["keypoints", "--config-json", "{"]);
        let err = config_from_cli(&cli).unwrap_err();
        assert!(err.starts_with("Error parsing --config-json"), "{err}");
    }

    #[test]
    fn zero_points_is_rejected_by_clap() {
        assert!(Cli::try_parse_from(["keypoints", "-n", "0"]).is_err());
    }

    #[test]
    fn fit_conflicts_with_explicit_size() {
        assert!(Cli::try_parse_from(["keypoints", "--fit", "--width", "100"]).is_err());
    }

    #[test]
    fn verbosity_levels() {
        assert_eq!(level_filter(0, 0), LevelFilter::Info);
        assert_eq!(level_filter(1, 0), LevelFilter::Debug);
        assert_eq!(level_filter(3, 0), LevelFilter::Trace);
        assert_eq!(level_filter(0, 1), LevelFilter::Warn);
        assert_eq!(level_filter(0, 5), LevelFilter::Off);
    }

    #[test]
    fn repeated_logger_setup_is_harmless() {
        let cli = Cli::parse_from(["keypoints", "-q"]);
        init_logging(&cli);
        init_logging(&cli);
        log::warn!("still logging after a second setup");
    }

    #[test]
    fn summary_of_no_runs_does_not_panic() {
        print_multi_run_summary(&[]);
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
