use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

use explainer::{
    AudioMuxer, Canvas, ConcatOpts, EspeakSynthesizer, FfmpegEncoderOpts, FfmpegMuxer, Fps,
    JobConfig, MuxPolicy, Narration, Pipeline, RatePolicy, ResizePolicy, SegmentConcatenator,
    TargetPolicy, VideoFileSource,
};

#[derive(Parser, Debug)]
#[command(name = "explainer", version)]
struct Cli {
    /// More logging (-v debug, -vv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log warnings and errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the full explainer video (requires `ffmpeg` and `ffprobe` on PATH).
    Build(BuildArgs),
    /// Concatenate existing videos into one video-only MP4.
    Concat(ConcatArgs),
    /// Mux an audio track onto a video.
    Mux(MuxArgs),
    /// Print media information as JSON.
    Probe(ProbeArgs),
}

#[derive(Parser, Debug)]
struct BuildArgs {
    /// Video title (overrides the job file).
    #[arg(long)]
    title: Option<String>,

    /// Short description (overrides the job file).
    #[arg(long)]
    description: Option<String>,

    /// Job JSON; every field is optional.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output directory.
    #[arg(long, default_value = "output")]
    out_dir: PathBuf,

    /// Use this audio file as narration instead of synthesizing speech.
    #[arg(long)]
    narration_audio: Option<PathBuf>,

    /// Override the job's mux policy.
    #[arg(long, value_enum)]
    mux_policy: Option<MuxPolicyArg>,

    /// Override the job's rate policy.
    #[arg(long, value_enum)]
    rate_policy: Option<RatePolicyArg>,
}

#[derive(Parser, Debug)]
struct ConcatArgs {
    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,

    /// Output frame rate, e.g. `24` or `30000/1001` (defaults to the first input's).
    #[arg(long, requires = "size")]
    fps: Option<Fps>,

    /// Output size `WxH` (defaults to the first input's).
    #[arg(long, requires = "fps")]
    size: Option<Canvas>,

    #[arg(long, value_enum, default_value_t = RatePolicyArg::PreserveDuration)]
    rate_policy: RatePolicyArg,

    #[arg(long, value_enum, default_value_t = ResizePolicyArg::Rescale)]
    resize_policy: ResizePolicyArg,

    /// Input videos, in order.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

#[derive(Parser, Debug)]
struct MuxArgs {
    #[arg(long)]
    video: PathBuf,

    #[arg(long)]
    audio: PathBuf,

    /// Output MP4 path; must differ from both inputs.
    #[arg(long)]
    out: PathBuf,

    #[arg(long, value_enum, default_value_t = MuxPolicyArg::VideoPaced)]
    policy: MuxPolicyArg,
}

#[derive(Parser, Debug)]
struct ProbeArgs {
    path: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum MuxPolicyArg {
    VideoPaced,
    Longest,
}

impl From<MuxPolicyArg> for MuxPolicy {
    fn from(v: MuxPolicyArg) -> Self {
        match v {
            MuxPolicyArg::VideoPaced => MuxPolicy::VideoPaced,
            MuxPolicyArg::Longest => MuxPolicy::Longest,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum RatePolicyArg {
    PreserveDuration,
    PreserveFrames,
}

impl From<RatePolicyArg> for RatePolicy {
    fn from(v: RatePolicyArg) -> Self {
        match v {
            RatePolicyArg::PreserveDuration => RatePolicy::PreserveDuration,
            RatePolicyArg::PreserveFrames => RatePolicy::PreserveFrames,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ResizePolicyArg {
    Rescale,
    Reject,
}

impl From<ResizePolicyArg> for ResizePolicy {
    fn from(v: ResizePolicyArg) -> Self {
        match v {
            ResizePolicyArg::Rescale => ResizePolicy::Rescale,
            ResizePolicyArg::Reject => ResizePolicy::Reject,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);
    match cli.cmd {
        Command::Build(args) => cmd_build(args),
        Command::Concat(args) => cmd_concat(args),
        Command::Mux(args) => cmd_mux(args),
        Command::Probe(args) => cmd_probe(args),
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => tracing::Level::WARN,
        (false, 0) => tracing::Level::INFO,
        (false, 1) => tracing::Level::DEBUG,
        (false, _) => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_build(args: BuildArgs) -> anyhow::Result<()> {
    let mut job = match &args.config {
        Some(path) => JobConfig::from_path(path)?,
        None => JobConfig::default(),
    };
    if let Some(title) = args.title {
        job.title = title;
    }
    if let Some(description) = args.description {
        job.description = description;
    }
    if let Some(policy) = args.mux_policy {
        job.mux = policy.into();
    }
    if let Some(policy) = args.rate_policy {
        job.compose.rate = policy.into();
    }

    let pipeline = Pipeline::new(job)?;
    let result = match args.narration_audio {
        Some(path) => pipeline.run(&args.out_dir, Narration::Prerecorded(path))?,
        None => {
            let mut engine = EspeakSynthesizer::detect()?;
            pipeline.run(&args.out_dir, Narration::Synthesize(&mut engine))?
        }
    };

    println!(
        "Video created successfully! Check the output at: {}",
        result.final_video().display()
    );
    Ok(())
}

fn cmd_concat(args: ConcatArgs) -> anyhow::Result<()> {
    let target = match (args.size, args.fps) {
        (Some(canvas), Some(fps)) => TargetPolicy::Explicit { canvas, fps },
        _ => TargetPolicy::FirstSegment,
    };
    let opts = ConcatOpts {
        target,
        rate: args.rate_policy.into(),
        resize: args.resize_policy.into(),
    };

    let mut sources = args
        .inputs
        .iter()
        .map(|p| VideoFileSource::open(p.as_path()))
        .collect::<Result<Vec<_>, _>>()?;
    let report = SegmentConcatenator::new(opts)
        .concat_to_file(&mut sources, &args.out, FfmpegEncoderOpts::default())
        .with_context(|| format!("concatenate into '{}'", args.out.display()))?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn cmd_mux(args: MuxArgs) -> anyhow::Result<()> {
    let report = FfmpegMuxer::new(args.policy.into()).mux(&args.video, &args.audio, &args.out)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn cmd_probe(args: ProbeArgs) -> anyhow::Result<()> {
    let info = explainer::probe_media(&args.path)?;
    println!("{}", serde_json::to_string_pretty(&info)?);
    Ok(())
}
