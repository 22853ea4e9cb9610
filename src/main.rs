use anyhow::Result;
use clap::{Parser, Subcommand};

use etca::compress::{self, CompressArgs};
use etca::decompress::{self, DecompressArgs};
use etca::info::{self, InfoArgs};

#[derive(Parser)]
#[command(name = "etca", about = "Variance-driven quadtree image codec")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Number of worker threads (default: all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

#[derive(Subcommand)]
enum Command {
    /// Compress an image into a .etca container
    Compress(CompressArgs),
    /// Decompress a .etca container into an image file
    Decompress(DecompressArgs),
    /// Print container header and metadata
    Info(InfoArgs),
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()?;
    }

    match cli.command {
        Command::Compress(args) => compress::run(args),
        Command::Decompress(args) => decompress::run(args),
        Command::Info(args) => info::run(args),
    }
}

fn main() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(err) = run() {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}
