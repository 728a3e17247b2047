//! CLI module for s3-image-upload
//!
//! Runs the whole tool once: prompt for credentials, build the client,
//! create the bucket, upload the image.
//!
//! # Usage
//!
//! ```bash
//! # Defaults: us-east-1, beginner-devops-bucket, the bundled image name
//! s3-image-upload
//!
//! # Another region and bucket
//! s3-image-upload --region eu-west-1 --bucket my-photos --file cat.jpg --key images/cat.jpg
//!
//! # Against a local MinIO
//! s3-image-upload --endpoint http://localhost:9000 --verbose
//! ```

pub mod args;
pub mod prompt;

use anyhow::{Context, Result};
use std::io::{self, Write};
use tracing::{debug, info};

use crate::config::{self, UploadConfig};
use crate::core::{self, Stage, WorkflowError};
use crate::s3::Credentials;

pub use args::Cli;
pub use prompt::prompt_credentials;

/// Run the CLI application
///
/// Failures of the workflow itself come back as [`WorkflowError`] inside the
/// `anyhow::Error`; everything else is a setup failure.
pub fn run(cli: Cli) -> Result<()> {
    let config = config::load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    let config = cli.apply_to(config);
    debug!(?config, "configuration loaded");

    let mut stdout = io::stdout();
    let credentials = {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        prompt_credentials(&mut input, &mut stdout).map_err(WorkflowError::Prompt)?
    };
    debug!(access_key_id = %credentials.access_key_id, "credentials acquired");

    // Sequential I/O only, a current_thread runtime is enough
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let stage = runtime.block_on(upload(credentials, &config, &mut stdout))?;
    info!(?stage, "upload completed");
    Ok(())
}

/// Build the client from `credentials`, then create the bucket and upload
pub async fn upload<W: Write>(
    credentials: Credentials,
    config: &UploadConfig,
    out: &mut W,
) -> std::result::Result<Stage, WorkflowError> {
    let client = core::create_client(credentials, config)?;
    core::run(&client, config, out).await
}

/// Initialize logging based on verbosity flags
///
/// Logs go to stderr so stdout only carries the tool's own messages.
pub fn init_logging(verbose: bool, debug: bool) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(())
}
