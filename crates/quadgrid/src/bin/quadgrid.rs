use clap::{Args, Parser, Subcommand};
use quadgrid::core::{Point2, QuadCorners, CORNER_RECORD_LEN};
use quadgrid::decode::{to_hex, write_decoded};
use quadgrid::fs::{save_gray, FsAssets};
use quadgrid::session::{
    run_script, AssetError, ConfigIoError, RecordingCanvas, ReplayScript, Session, SessionConfig,
    SessionError,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "quadgrid", version, about = "Perspective grid sampler and bit decoder")]
struct Cli {
    /// Log level (error, warn, info, debug, trace). QUADGRID_LOG overrides.
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sample the grid under the saved corners and print the decoded bytes
    Decode {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        overrides: GridOverrides,
        /// Print bytes as hex instead of raw
        #[arg(long)]
        hex: bool,
    },
    /// Write the luminance preview (or its Sobel gradient) as an image
    Luma {
        #[arg(long)]
        image: PathBuf,
        #[arg(long)]
        out: PathBuf,
        #[arg(long)]
        gradient: bool,
    },
    /// Inspect or write a 32-byte corner record
    Corners {
        #[command(subcommand)]
        action: CornersAction,
    },
    /// Drive a session from a JSON input script
    Replay {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long)]
        script: PathBuf,
    },
}

#[derive(Subcommand)]
enum CornersAction {
    /// Print the four corners stored in a record
    Show { path: PathBuf },
    /// Write a record from eight coordinates: x0 y0 x1 y1 x2 y2 x3 y3
    Set {
        path: PathBuf,
        #[arg(required = true, num_args = 8, allow_negative_numbers = true)]
        coords: Vec<f32>,
    },
}

#[derive(Args)]
struct SourceArgs {
    /// JSON session config; other source flags override its fields
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    image: Option<PathBuf>,
    #[arg(long)]
    corners: Option<PathBuf>,
    /// Fixed jitter seed
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Args)]
struct GridOverrides {
    #[arg(long)]
    rows: Option<usize>,
    #[arg(long)]
    cols: Option<usize>,
    #[arg(long)]
    bits: Option<usize>,
    #[arg(long)]
    samples: Option<usize>,
    #[arg(long)]
    threshold: Option<f32>,
    /// Do not set the leading bit above each group
    #[arg(long)]
    no_sentinel: bool,
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error("either --config or --image is required")]
    MissingSource,
    #[error(transparent)]
    Config(#[from] ConfigIoError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error("corner record: {0}")]
    Corners(#[from] quadgrid::core::CornerRecordError),
    #[error("corner file {} does not exist", .0.display())]
    NoCornerFile(PathBuf),
    #[error(transparent)]
    Io(#[from] io::Error),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let level = cli
        .log_level
        .parse::<log::LevelFilter>()
        .unwrap_or(log::LevelFilter::Warn);
    init_logging(level);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(feature = "tracing")]
fn init_logging(level: log::LevelFilter) {
    quadgrid::core::init_tracing(false, level);
    // No-op when the subscriber already bridged `log` records.
    let _ = tracing_log::LogTracer::init();
}

#[cfg(not(feature = "tracing"))]
fn init_logging(level: log::LevelFilter) {
    use quadgrid::core::{init_with_level, level_from_env};
    let _ = init_with_level(level_from_env(level));
}

fn run(command: Command) -> Result<(), CliError> {
    match command {
        Command::Decode {
            source,
            overrides,
            hex,
        } => decode_cmd(source, overrides, hex),
        Command::Luma {
            image,
            out,
            gradient,
        } => luma_cmd(image, out, gradient),
        Command::Corners { action } => corners_cmd(action),
        Command::Replay { source, script } => replay_cmd(source, script),
    }
}

fn load_config(source: SourceArgs) -> Result<SessionConfig, CliError> {
    let mut config = match (&source.config, &source.image) {
        (Some(path), _) => SessionConfig::load_json(path)?,
        (None, Some(image)) => SessionConfig::new(image.display().to_string()),
        (None, None) => return Err(CliError::MissingSource),
    };
    if let Some(image) = source.image {
        config.image_path = image.display().to_string();
    }
    if let Some(corners) = source.corners {
        config.corners_path = corners.display().to_string();
    }
    if source.seed.is_some() {
        config.seed = source.seed;
    }
    Ok(config)
}

fn decode_cmd(source: SourceArgs, o: GridOverrides, hex: bool) -> Result<(), CliError> {
    let mut config = load_config(source)?;
    if let Some(rows) = o.rows {
        config.grid.rows = rows;
    }
    if let Some(cols) = o.cols {
        config.grid.cols = cols;
    }
    if let Some(bits) = o.bits {
        config.grid.bits_per_group = bits;
    }
    if let Some(samples) = o.samples {
        config.sampling.sample_count = samples;
    }
    if let Some(threshold) = o.threshold {
        config.sampling.threshold = threshold;
    }
    if o.no_sentinel {
        config.pack.sentinel = false;
    }

    let assets = FsAssets::from_config(&config);
    let mut session = Session::init(&assets, config)?;
    let bytes = session.decode();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if hex {
        writeln!(out, "{}", to_hex(&bytes))?;
    } else {
        write_decoded(&mut out, &bytes)?;
    }
    Ok(())
}

fn luma_cmd(image: PathBuf, out: PathBuf, gradient: bool) -> Result<(), CliError> {
    let rgba = quadgrid::fs::load_rgba(&image)?;
    let lum = quadgrid::core::extract_luminance(&rgba.view());
    let gray = if gradient {
        quadgrid::core::sobel_magnitude(&lum).to_gray_u8()
    } else {
        lum.to_gray_u8()
    };
    save_gray(&gray, &out)?;
    log::info!("wrote {}x{} preview to {}", gray.width, gray.height, out.display());
    Ok(())
}

fn corners_cmd(action: CornersAction) -> Result<(), CliError> {
    match action {
        CornersAction::Show { path } => {
            let bytes = match std::fs::read(&path) {
                Ok(bytes) => bytes,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    return Err(CliError::NoCornerFile(path))
                }
                Err(e) => return Err(e.into()),
            };
            let corners = QuadCorners::from_bytes(&bytes)?;
            for (i, p) in corners.points.iter().enumerate() {
                println!("{i}: {} {}", p.x, p.y);
            }
        }
        CornersAction::Set { path, coords } => {
            let mut corners = QuadCorners::default();
            for (i, xy) in coords.chunks_exact(2).enumerate() {
                corners.set(i, Point2::new(xy[0], xy[1]));
            }
            let record = corners.to_bytes();
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, record)?;
            log::info!("wrote {} byte corner record to {}", CORNER_RECORD_LEN, path.display());
        }
    }
    Ok(())
}

fn replay_cmd(source: SourceArgs, script: PathBuf) -> Result<(), CliError> {
    let config = load_config(source)?;
    let script = ReplayScript::load_json(&script)?;
    let mut assets = FsAssets::from_config(&config);
    let session = Session::init(&assets, config)?;

    let mut canvas = RecordingCanvas::default();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let (_session, report) = run_script(session, &script, &mut assets, &mut canvas, &mut out)?;
    log::info!(
        "replayed {} frames, {} reloads, {} saves, {} decodes",
        report.frames,
        report.reloads,
        report.saves,
        report.decodes.len()
    );
    Ok(())
}
