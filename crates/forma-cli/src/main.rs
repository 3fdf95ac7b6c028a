use std::time::Instant;

use clap::ArgGroup;
use clap::Parser;

use forma::FormaOptions;
use forma::run_main;
use forma_error::Result;

#[derive(Parser, Debug)]
#[command(
    name = "forma",
    about = "forma: normalize blueprint DSL fragments into canonical JSON",
    version,
    group = ArgGroup::new("inputs").required(true).args(["files", "dirs"])
)]
pub struct Cli {
    /// Individual fragment files to normalize (repeatable)
    #[arg(
        short = 'f',
        long = "file",
        value_name = "FILE",
        num_args = 1..,
        action = clap::ArgAction::Append,
        conflicts_with = "dirs"
    )]
    files: Vec<String>,

    /// Directories to scan recursively (repeatable)
    #[arg(
        short = 'd',
        long = "dir",
        value_name = "DIR",
        num_args = 1..,
        action = clap::ArgAction::Append,
        conflicts_with = "files"
    )]
    dirs: Vec<String>,

    /// Pretty-print the JSON output (4-space indent)
    #[arg(long, default_value_t = false)]
    pretty: bool,

    /// Emit only the comment records of each fragment
    #[arg(long = "comments-only", default_value_t = false)]
    comments_only: bool,

    /// Normalize fragments across worker threads
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Output file path (writes to file instead of stdout)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    output: Option<String>,
}

pub fn run(args: Cli) -> Result<()> {
    let total_start = Instant::now();

    // Initialize tracing subscriber for logging
    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .init();
    }

    let opts = FormaOptions {
        files: args.files,
        dirs: args.dirs,
        output: args.output.clone(),
        pretty: args.pretty,
        comments_only: args.comments_only,
        parallel: args.parallel,
    };

    match run_main(&opts) {
        Ok(Some(output)) => {
            if let Some(ref path) = args.output {
                std::fs::write(path, &output)?;
                tracing::info!(path, "output written");
            } else {
                println!("{output}");
            }
        }
        Ok(None) => {
            // Nothing discovered, nothing to emit
        }
        Err(e) => {
            // surface the failure as a non-zero exit
            eprintln!("Error: {e}");
            tracing::error!(error = %e, "execution failed");
            return Err(e);
        }
    }

    let total_secs = total_start.elapsed().as_secs_f64();
    tracing::info!(total_secs, "complete");
    Ok(())
}


pub fn main() -> Result<()> {
    let args = Cli::parse();
    run(args)
}
