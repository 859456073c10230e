use super::VERSION;
use crate::canvas::{paint, Canvas, FrameFormat, PlottersCanvas};
use crate::layout::FrameLayout;
use crate::{read_snapshots, CaseError, Snapshot};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use log::{debug, info, LevelFilter};
use std::path::PathBuf;

pub const DEFAULT_CSVFILE: &str = "data.txt";
pub const DEFAULT_OUTDIR: &str = "frames";
pub const DEFAULT_WIDTH: u32 = 1400;
pub const DEFAULT_HEIGHT: u32 = 900;

/// Settings of a bar_race run.
#[derive(Debug, Clone, PartialEq)]
pub struct BarsConfig {
    pub csvin: PathBuf,
    pub outdir: PathBuf,
    pub format: FrameFormat,
    pub size: (u32, u32),
    pub pause_ms: u64,
    pub verbose: bool,
}

pub fn build_cli() -> Command {
    let arg_csvin = Arg::new("input_csvfile")
        .help("name of the csv file with the daily cases by state")
        .short('f')
        .long("csvfile")
        .num_args(1)
        .value_parser(value_parser!(PathBuf))
        .default_value(DEFAULT_CSVFILE);
    let arg_outdir = Arg::new("outdir")
        .help("directory for the frame files")
        .short('o')
        .long("outdir")
        .num_args(1)
        .value_parser(value_parser!(PathBuf))
        .default_value(DEFAULT_OUTDIR);
    let arg_format = Arg::new("format")
        .help("image format of the frames")
        .long("format")
        .num_args(1)
        .value_parser(["png", "svg"])
        .default_value("png");
    let arg_width = Arg::new("width")
        .help("frame width, in pixels")
        .long("width")
        .num_args(1)
        .value_parser(value_parser!(u32).range(1..))
        .default_value("1400");
    let arg_height = Arg::new("height")
        .help("frame height, in pixels")
        .long("height")
        .num_args(1)
        .value_parser(value_parser!(u32).range(1..))
        .default_value("900");
    let arg_pause = Arg::new("pause")
        .help("pause after each frame, in milliseconds")
        .long("pause")
        .num_args(1)
        .value_parser(value_parser!(u64))
        .default_value("0");
    let arg_verbose = Arg::new("verbose")
        .help("print verbose information")
        .short('v')
        .long("verbose")
        .action(ArgAction::SetTrue);
    Command::new("bar_race")
        .version(VERSION.unwrap_or("unknown"))
        .about("cli app to render the daily covid cases of five states as bar chart frames")
        .arg(arg_csvin)
        .arg(arg_outdir)
        .arg(arg_format)
        .arg(arg_width)
        .arg(arg_height)
        .arg(arg_pause)
        .arg(arg_verbose)
}

/// Read the settings from the parsed arguments.
/// All the arguments have a default, the fallbacks only repeat it.
pub fn config_from_matches(cli_args: &ArgMatches) -> BarsConfig {
    let csvin = cli_args
        .get_one::<PathBuf>("input_csvfile")
        .cloned()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CSVFILE));
    let outdir = cli_args
        .get_one::<PathBuf>("outdir")
        .cloned()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTDIR));
    let format = cli_args
        .get_one::<String>("format")
        .and_then(|f| FrameFormat::from_name(f))
        .unwrap_or(FrameFormat::Png);
    let width = cli_args
        .get_one::<u32>("width")
        .copied()
        .unwrap_or(DEFAULT_WIDTH);
    let height = cli_args
        .get_one::<u32>("height")
        .copied()
        .unwrap_or(DEFAULT_HEIGHT);
    let pause_ms = cli_args.get_one::<u64>("pause").copied().unwrap_or(0);
    let verbose = cli_args.get_flag("verbose");
    BarsConfig {
        csvin,
        outdir,
        format,
        size: (width, height),
        pause_ms,
        verbose,
    }
}

/// Takes the CLI arguments that control the rendering of the frames.
pub fn parse_cli() -> BarsConfig {
    config_from_matches(&build_cli().get_matches())
}

/// Log to stderr, at the RUST_LOG level or info; verbose forces debug.
pub fn init_logger(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.init();
}

/// Paint one frame per snapshot, in order, and return the number of frames.
pub fn render_snapshots<C>(
    snapshots: &[Snapshot],
    canvas: &mut C,
    pause_ms: u64,
) -> Result<usize, CaseError>
where
    C: Canvas + ?Sized,
{
    for snapshot in snapshots {
        let layout = FrameLayout::from_snapshot(snapshot);
        debug!(
            "{}: max {}, unit {}, {} gridlines",
            snapshot.date,
            layout.scale.max,
            layout.scale.unit,
            layout.scale.lines + 1
        );
        paint(&layout, canvas, pause_ms)?;
    }
    Ok(snapshots.len())
}

/// The whole run: the csv is read entirely before drawing,
/// so that a malformed row stops the run before any frame is written.
pub fn run(config: &BarsConfig) -> Result<usize, CaseError> {
    let snapshots = read_snapshots(&config.csvin)?;
    info!(
        "read {} dates from {}",
        snapshots.len(),
        config.csvin.display()
    );
    let mut canvas = PlottersCanvas::new(&config.outdir, config.format, config.size)?;
    render_snapshots(&snapshots, &mut canvas, config.pause_ms)
}
