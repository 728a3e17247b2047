//! Library usage example for s3-image-upload
//!
//! Creates a bucket and uploads an image without the interactive prompt,
//! taking credentials from the environment instead.
//!
//! Run with:
//! ```
//! AWS_ACCESS_KEY_ID=... AWS_SECRET_ACCESS_KEY=... \
//!     cargo run --example upload_image -- photos-bucket ./cat.jpg images/cat.jpg
//! ```

use s3_image_upload::core::{create_bucket, create_client, upload_image};
use s3_image_upload::s3::Credentials;
use s3_image_upload::UploadConfig;
use std::path::PathBuf;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let mut config = UploadConfig::default().apply_overrides(|name| std::env::var(name).ok());

    let mut args = std::env::args().skip(1);
    if let Some(bucket) = args.next() {
        config.bucket = bucket;
    }
    if let Some(image) = args.next() {
        config.image_path = PathBuf::from(image);
    }
    if let Some(key) = args.next() {
        config.upload_key = key;
    }

    let credentials = Credentials::new(
        std::env::var("AWS_ACCESS_KEY_ID").unwrap_or_default(),
        std::env::var("AWS_SECRET_ACCESS_KEY").unwrap_or_default(),
    );

    let client = create_client(credentials, &config)?;
    let mut stdout = std::io::stdout();

    println!("1. Creating bucket...");
    create_bucket(&client, &config.bucket, &config.region, &mut stdout).await?;

    println!("2. Uploading image...");
    let response = upload_image(
        &client,
        &config.bucket,
        &config.image_path,
        &config.upload_key,
        &mut stdout,
    )
    .await?;
    println!("   ETag: {}", response.etag.as_deref().unwrap_or("<none>"));

    Ok(())
}
