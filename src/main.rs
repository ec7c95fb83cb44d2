use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use halftone::ColorMode;
use htstego::assets::KernelStore;
use htstego::models::{MethodKind, OutputFormat, StegoConfig};
use htstego::services::{extract_from_dir, EmbedRequest, StegoPipeline};

#[derive(Parser)]
#[command(name = "htstego")]
#[command(about = "Hide a payload across a set of halftoned image shares")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Halftone a cover image and embed a payload across N shares
    Embed(EmbedArgs),
    /// Recover a payload from a directory of shares
    Extract {
        /// Directory holding the share PNGs
        #[arg(long, default_value = "output")]
        extract_from: PathBuf,

        /// Halftoning method the shares were made with
        #[arg(long)]
        htmethod: MethodKind,
    },
    /// List the available error-diffusion kernels
    Kernels,
}

#[derive(Args)]
struct EmbedArgs {
    /// Halftoning method: errdiff, ordered or pattern
    #[arg(long)]
    htmethod: MethodKind,

    /// Cover image (PNG)
    #[arg(long)]
    cover: PathBuf,

    /// File holding the payload text
    #[arg(long)]
    payload: PathBuf,

    /// Number of shares to generate (at least 3)
    #[arg(long)]
    nshares: usize,

    /// Error-diffusion kernel name (required for errdiff)
    #[arg(long)]
    kernel: Option<String>,

    /// Bayer matrix size for ordered dithering (power of two)
    #[arg(long, default_value_t = 8)]
    bayer_size: usize,

    /// Do not write any image files
    #[arg(long)]
    no_output_files: bool,

    /// Also write the unmodified halftone
    #[arg(long)]
    generate_regular_output: bool,

    /// Output color: binary or color
    #[arg(long, default_value = "binary")]
    output_color: ColorMode,

    /// Result record format: csv, json or xml
    #[arg(long)]
    output_format: Option<OutputFormat>,

    /// Do not print the result record
    #[arg(long)]
    silent: bool,

    /// zlib-compress the payload before embedding
    #[arg(long)]
    compress_payload: bool,

    /// Seed for the embedding RNG
    #[arg(long)]
    seed: Option<u64>,

    /// Parent directory for run directories
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// YAML configuration file
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout carries only results
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "htstego=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    match cli.command {
        Commands::Embed(args) => run_embed_command(args),
        Commands::Extract {
            extract_from,
            htmethod,
        } => {
            let extraction = extract_from_dir(&extract_from, htmethod.layout());
            println!("{extraction}");
            Ok(())
        }
        Commands::Kernels => run_kernels_command(),
    }
}

/// Config file from --config or HTSTEGO_CONFIG, defaults otherwise
fn load_config(path: Option<PathBuf>) -> StegoConfig {
    let path = path.or_else(|| std::env::var("HTSTEGO_CONFIG").ok().map(PathBuf::from));
    let mut config = match path {
        Some(path) => StegoConfig::load(&path),
        None => StegoConfig::default(),
    };
    if let Ok(dir) = std::env::var("HTSTEGO_KERNELS_DIR") {
        config.kernels_dir = Some(PathBuf::from(dir));
    }
    config
}

fn run_embed_command(args: EmbedArgs) -> anyhow::Result<()> {
    let mut config = load_config(args.config);

    // CLI flags override the config file
    if args.compress_payload {
        config.compress_payload = true;
    }
    if args.no_output_files {
        config.write_shares = false;
    }
    if args.generate_regular_output {
        config.write_reference = true;
    }
    if let Some(dir) = args.output_dir {
        config.output_dir = dir;
    }
    if let Some(format) = args.output_format {
        config.output_format = format;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    let request = EmbedRequest {
        method: args.htmethod,
        cover: args.cover,
        payload: args.payload,
        share_count: args.nshares,
        kernel: args.kernel,
        bayer_size: args.bayer_size,
        color: args.output_color,
    };

    let format = config.output_format;
    let pipeline = StegoPipeline::new(config);
    let outcome = pipeline.run(&request)?;

    if let Some(dir) = &outcome.output_dir {
        tracing::info!(dir = %dir.display(), "Shares written");
    }
    if !args.silent {
        println!("{}", outcome.record().render(format));
    }
    Ok(())
}

fn run_kernels_command() -> anyhow::Result<()> {
    let config = load_config(None);
    let store = KernelStore::new(config.kernels_dir);
    if let Some(dir) = store.kernels_dir() {
        println!("Kernels (embedded + {}):", dir.display());
    } else {
        println!("Kernels (embedded):");
    }
    for name in store.list() {
        println!("  {name}");
    }
    Ok(())
}
