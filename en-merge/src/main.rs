use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use en_merge::services::fetch::GithubSource;
use en_merge::services::sync::{self, SyncOptions};
use en_merge::KeyPolicy;

/// Merge upstream English word lists into one Rime dictionary.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Sync config with the tracked repositories
    #[arg(long, default_value = "config.json")]
    config: PathBuf,

    /// Merged dictionary to write
    #[arg(long, default_value = "en_merge.dict.yaml")]
    output: PathBuf,

    /// Where downloaded upstream files are cached
    #[arg(long, default_value = "en_dicts")]
    cache_dir: PathBuf,

    /// Dictionary name written to the header
    #[arg(long, default_value = "en_merge")]
    name: String,

    /// How duplicate entries are recognised
    #[arg(long, value_enum, default_value_t = KeyPolicy::Fingerprint)]
    key_policy: KeyPolicy,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// Fetch every file regardless of freshness and log duplicates
    #[arg(short, long)]
    debug: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_filter = if args.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let source = match GithubSource::new(args.cache_dir, Duration::from_secs(args.timeout)) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build HTTP client");
            return ExitCode::FAILURE;
        }
    };

    let opts = SyncOptions {
        config_path: args.config,
        output_path: args.output,
        dict_name: args.name,
        key_policy: args.key_policy,
        diagnostic: args.debug,
    };

    match sync::run(&source, &opts) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Sync failed");
            ExitCode::FAILURE
        }
    }
}
