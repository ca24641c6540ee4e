//! chunkjar CLI
//!
//! Inspect and edit a JSON-file jar through the buffered adapter.

use std::sync::Arc;

use chunkjar::backing::FileJar;
use chunkjar::codec::create_chunks;
use chunkjar::config::DEFAULT_MAX_CHUNK_SIZE;
use chunkjar::{Backing, Config, FlushTrigger, SessionStorage, Storage};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

/// chunkjar CLI
#[derive(Parser, Debug)]
#[command(name = "chunkjar")]
#[command(about = "Chunked key/value storage over a size-capped jar")]
#[command(version)]
struct Args {
    /// Jar file (JSON object of chunk name to value)
    #[arg(short, long, default_value = "./chunkjar.json")]
    jar: String,

    /// Maximum bytes per chunk
    #[arg(short, long, default_value_t = DEFAULT_MAX_CHUNK_SIZE)]
    max_chunk_size: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show how a value would be chunked, without touching the jar
    Split {
        key: String,
        value: String,
    },

    /// Get a value by key
    Get {
        key: String,
    },

    /// Set a key-value pair
    Set {
        key: String,
        value: String,
    },

    /// Remove a key and all of its chunks
    Rm {
        key: String,
    },

    /// List the physical chunks in the jar
    Ls,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,chunkjar=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args).await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> chunkjar::Result<()> {
    let config = Config::builder().max_chunk_size(args.max_chunk_size).build();
    config.validate()?;

    let jar = Arc::new(FileJar::new(&args.jar));
    let mut storage = Storage::new(config.clone(), Backing::bulk(Arc::clone(&jar)))?;

    match args.command {
        Commands::Split { key, value } => {
            for chunk in create_chunks(&key, &value, config.max_chunk_size) {
                println!("{}\t{}", chunk.name, chunk.value.len());
            }
        }
        Commands::Get { key } => match storage.get_item(&key).await? {
            Some(value) => println!("{}", value),
            None => println!("(nil)"),
        },
        Commands::Set { key, value } => {
            storage.set_item(&key, &value).await?;
            let report = storage.flush(FlushTrigger::Updated).await?;
            println!("OK ({} removed, {} written)", report.removed, report.written);
        }
        Commands::Rm { key } => {
            storage.remove_item(&key).await?;
            let report = storage.flush(FlushTrigger::Updated).await?;
            println!("OK ({} removed)", report.removed);
        }
        Commands::Ls => {
            use chunkjar::backing::BatchSource;

            for chunk in jar.get_all().await?.unwrap_or_default() {
                println!("{}\t{}", chunk.name, chunk.value.len());
            }
        }
    }

    Ok(())
}
