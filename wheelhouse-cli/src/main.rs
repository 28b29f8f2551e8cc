//! Wheelhouse command-line interface.
//!
//! `wheelhouse upload` pushes a folder of build artifacts into an object
//! storage container; `wheelhouse fetch` pulls the artifacts referenced by a
//! remote HTML index. Credentials fall back to environment variables so CI
//! pipelines can inject them without flags.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use core_runtime::config::{
    pull_request_build, resolve_credentials, CredentialOutcome, Credentials, SECRET_ENV,
    USERNAME_ENV,
};
use core_runtime::logging::{init_logging, LoggingConfig};
use core_sync::{FetchConfig, Fetcher, UploadConfig, Uploader};
use provider_swift::{SwiftConfig, SwiftProvider};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(
    name = "wheelhouse",
    about = "Upload and fetch packaging build artifacts",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Upload the artifacts of a local folder to a container
    Upload(UploadArgs),
    /// Download matching artifacts referenced by a remote HTML index
    Fetch(FetchArgs),
}

#[derive(Args)]
struct UploadArgs {
    /// Name of the target container
    container_name: String,

    /// Path to the folder to upload
    #[arg(long, default_value = ".")]
    local_folder: PathBuf,

    /// Account name for the cloud storage
    #[arg(long)]
    username: Option<String>,

    /// Secret API key for the cloud storage
    #[arg(long)]
    secret: Option<String>,

    /// Cloud storage provider
    #[arg(long, default_value = "CLOUDFILES_US")]
    provider_name: String,

    /// Storage region
    #[arg(long)]
    region: Option<String>,

    /// Maximum number of concurrent uploads
    #[arg(long, default_value_t = 4)]
    max_workers: usize,

    /// Skip TLS certificate verification
    #[arg(long)]
    no_ssl_check: bool,

    /// Do not enable CDN / static website serving on the container
    #[arg(long)]
    no_enable_cdn: bool,

    /// Do not regenerate index.html
    #[arg(long)]
    no_update_index: bool,

    /// Upload even on pull-request CI builds
    #[arg(long)]
    upload_pull_request: bool,
}

#[derive(Args)]
struct FetchArgs {
    /// Expected project name
    project_name: String,

    /// URL of the HTML index listing the artifacts
    url: String,

    /// Only fetch artifacts matching this version
    #[arg(long)]
    version: Option<String>,

    /// Destination folder
    #[arg(long, default_value = "dist")]
    local_folder: PathBuf,

    /// Maximum number of concurrent downloads
    #[arg(long, default_value_t = 4)]
    max_workers: usize,

    /// Overwrite already-downloaded files
    #[arg(long)]
    overwrite: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(err) = init_logging(LoggingConfig::default()) {
        eprintln!("{err}");
        return ExitCode::FAILURE;
    }

    match cli.command {
        Command::Upload(args) => run_upload(args).await,
        Command::Fetch(args) => run_fetch(args).await,
    }
}

async fn run_upload(args: UploadArgs) -> ExitCode {
    if !args.upload_pull_request {
        if let Some(marker) = pull_request_build() {
            info!(%marker, "pull-request build, skipping upload");
            return ExitCode::SUCCESS;
        }
    }

    let credentials = match resolve_credentials(args.username.clone(), args.secret.clone()) {
        CredentialOutcome::Ready(credentials) => credentials,
        CredentialOutcome::MissingUsername => {
            error!("storage username required (--username or {USERNAME_ENV})");
            return ExitCode::FAILURE;
        }
        CredentialOutcome::MissingSecret => {
            // Forks do not receive secret CI variables; skip instead of fail.
            warn!("no storage secret available ({SECRET_ENV} unset), skipping upload");
            return ExitCode::SUCCESS;
        }
    };

    match upload(args, credentials).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %format!("{err:#}"), "upload failed");
            ExitCode::FAILURE
        }
    }
}

async fn upload(args: UploadArgs, credentials: Credentials) -> anyhow::Result<()> {
    let provider = SwiftProvider::new(SwiftConfig {
        username: credentials.username,
        secret: credentials.secret,
        provider_name: args.provider_name.clone(),
        region: args.region.clone(),
        auth_url: None,
        insecure: args.no_ssl_check,
    })
    .context("configuring storage provider")?;

    let config = UploadConfig {
        max_workers: args.max_workers,
        update_index: !args.no_update_index,
        enable_cdn: !args.no_enable_cdn,
        ..UploadConfig::default()
    };

    let uploader = Uploader::new(config, Arc::new(provider));
    uploader
        .upload(&args.local_folder, &args.container_name)
        .await?;
    info!(container = %args.container_name, "upload complete");
    Ok(())
}

async fn run_fetch(args: FetchArgs) -> ExitCode {
    match fetch(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %format!("{err:#}"), "fetch failed");
            ExitCode::FAILURE
        }
    }
}

async fn fetch(args: FetchArgs) -> anyhow::Result<()> {
    let config = FetchConfig {
        max_workers: args.max_workers,
        overwrite: args.overwrite,
        ..FetchConfig::default()
    };

    let fetcher = Fetcher::new(config, Arc::new(store_reqwest::ReqwestHttpClient::new()));
    fetcher
        .fetch_artifacts(
            &args.url,
            &args.local_folder,
            &args.project_name,
            args.version.as_deref(),
        )
        .await?;
    info!(folder = %args.local_folder.display(), "fetch complete");
    Ok(())
}
