//! The upload workflow: create a client, create the bucket, upload the image.
//!
//! Every step returns a [`WorkflowError`] instead of ending the process, so
//! callers decide what a failure means. The binary maps all of them to exit
//! status 1.

use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::UploadConfig;
use crate::s3::{Credentials, PutObjectOptions, PutObjectResponse, S3Client, S3Error};

/// Progress of a run, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Start,
    CredentialsAcquired,
    ClientReady,
    BucketReady,
    Uploaded,
}

/// Terminal failures of a run
#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("Error reading credentials: {0}")]
    Prompt(#[source] std::io::Error),

    #[error("Error creating S3 client: {0}")]
    ClientCreation(#[source] S3Error),

    #[error("Error creating bucket: {0}")]
    BucketCreation(#[source] S3Error),

    #[error("Error: The file '{}' was not found.", .0.display())]
    FileNotFound(PathBuf),

    #[error("Error: AWS credentials not found.")]
    NoCredentials,

    #[error("Error: Incomplete AWS credentials.")]
    PartialCredentials,

    #[error("Error uploading image: {0}")]
    Upload(#[source] S3Error),

    #[error("Error writing output: {1}")]
    Output(Stage, #[source] std::io::Error),
}

impl WorkflowError {
    /// Process exit status for this failure
    pub fn exit_code(&self) -> u8 {
        1
    }

    /// Stage the run had reached when this failure happened
    pub fn stage(&self) -> Stage {
        match self {
            WorkflowError::Prompt(_) => Stage::Start,
            WorkflowError::ClientCreation(_) => Stage::CredentialsAcquired,
            WorkflowError::BucketCreation(_) => Stage::ClientReady,
            WorkflowError::FileNotFound(_)
            | WorkflowError::NoCredentials
            | WorkflowError::PartialCredentials
            | WorkflowError::Upload(_) => Stage::BucketReady,
            WorkflowError::Output(stage, _) => *stage,
        }
    }

    /// Classify a failure of the upload step
    fn from_upload(err: S3Error) -> Self {
        match err {
            S3Error::FileNotFound(path) => WorkflowError::FileNotFound(path),
            S3Error::NoCredentials => WorkflowError::NoCredentials,
            S3Error::PartialCredentials => WorkflowError::PartialCredentials,
            other => WorkflowError::Upload(other),
        }
    }
}

/// Storage operations the workflow needs
#[allow(async_fn_in_trait)]
pub trait ObjectStore {
    /// Create `bucket` in `region`
    async fn create_bucket(&self, bucket: &str, region: &str) -> Result<(), S3Error>;

    /// Upload the file at `path` as `bucket/key`
    async fn upload_file(
        &self,
        bucket: &str,
        key: &str,
        path: &Path,
        options: &PutObjectOptions,
    ) -> Result<PutObjectResponse, S3Error>;
}

impl ObjectStore for S3Client {
    async fn create_bucket(&self, bucket: &str, region: &str) -> Result<(), S3Error> {
        S3Client::create_bucket(self, bucket, region).await
    }

    async fn upload_file(
        &self,
        bucket: &str,
        key: &str,
        path: &Path,
        options: &PutObjectOptions,
    ) -> Result<PutObjectResponse, S3Error> {
        S3Client::upload_file(self, bucket, key, path, options).await
    }
}

/// Build the S3 client for `config`. No network traffic.
pub fn create_client(
    credentials: Credentials,
    config: &UploadConfig,
) -> Result<S3Client, WorkflowError> {
    let client = S3Client::new(credentials, &config.region, &config.client_options())
        .map_err(WorkflowError::ClientCreation)?;

    info!(region = %client.region(), endpoint = %client.endpoint(), "S3 client ready");
    Ok(client)
}

/// Create `bucket` and print a confirmation
pub async fn create_bucket<S, W>(
    store: &S,
    bucket: &str,
    region: &str,
    out: &mut W,
) -> Result<(), WorkflowError>
where
    S: ObjectStore,
    W: Write,
{
    store
        .create_bucket(bucket, region)
        .await
        .map_err(WorkflowError::BucketCreation)?;

    writeln!(
        out,
        "Bucket '{}' created successfully in region '{}'.",
        bucket, region
    )
    .map_err(|e| WorkflowError::Output(Stage::BucketReady, e))?;
    Ok(())
}

/// Upload the image with private ACL and `image/jpeg` content type, then
/// print a confirmation
pub async fn upload_image<S, W>(
    store: &S,
    bucket: &str,
    image_path: &Path,
    upload_key: &str,
    out: &mut W,
) -> Result<PutObjectResponse, WorkflowError>
where
    S: ObjectStore,
    W: Write,
{
    let response = store
        .upload_file(bucket, upload_key, image_path, &PutObjectOptions::private_jpeg())
        .await
        .map_err(WorkflowError::from_upload)?;

    debug!(etag = ?response.etag, size = response.size, "image uploaded");

    writeln!(
        out,
        "Image '{}' uploaded successfully to bucket '{}' as '{}'.",
        image_path.display(),
        bucket,
        upload_key
    )
    .map_err(|e| WorkflowError::Output(Stage::Uploaded, e))?;
    Ok(response)
}

/// Create the bucket and upload the image, in that order.
///
/// Stops at the first failure; the upload is never attempted after the
/// bucket could not be created.
pub async fn run<S, W>(store: &S, config: &UploadConfig, out: &mut W) -> Result<Stage, WorkflowError>
where
    S: ObjectStore,
    W: Write,
{
    writeln!(out, "Starting the S3 bucket creation process...")
        .map_err(|e| WorkflowError::Output(Stage::ClientReady, e))?;
    create_bucket(store, &config.bucket, &config.region, out).await?;

    writeln!(out, "Uploading the image to the S3 bucket...")
        .map_err(|e| WorkflowError::Output(Stage::BucketReady, e))?;
    upload_image(store, &config.bucket, &config.image_path, &config.upload_key, out).await?;

    Ok(Stage::Uploaded)
}
