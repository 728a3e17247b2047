//! S3 client implementation for bucket creation and object upload
//!
//! - HTTP/1.1 hyper client with native-tls
//! - Path-style URLs (`endpoint/bucket/key`), so MinIO and LocalStack work unchanged
//! - UNSIGNED-PAYLOAD for object bodies, hashed payload for small XML bodies
//! - S3 `<Error>` documents parsed into code and message

use crate::s3::signer::S3SignerV4;
use crate::s3::types::{
    create_bucket_configuration, CredentialStatus, Credentials, PutObjectOptions,
    PutObjectResponse, S3ErrorResponse, DEFAULT_REGION,
};
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::header::HeaderMap;
use hyper::{Method, Request, StatusCode};
use hyper_tls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client as HyperClient;
use hyper_util::rt::TokioExecutor;
use native_tls::TlsConnector;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Hex lookup table for URI encoding
static HEX_UPPER: &[u8; 16] = b"0123456789ABCDEF";

/// S3 client errors
#[derive(Error, Debug)]
pub enum S3Error {
    #[error("HTTP error: {0}")]
    Http(#[from] hyper::http::Error),

    #[error("Hyper error: {0}")]
    Hyper(#[from] hyper::Error),

    #[error("TLS error: {0}")]
    Tls(#[from] native_tls::Error),

    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("XML parse error: {0}")]
    XmlParse(String),

    #[error("S3 error: {status} - {code}: {message}")]
    S3Response {
        status: StatusCode,
        code: String,
        message: String,
    },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("The file '{}' was not found", .0.display())]
    FileNotFound(PathBuf),

    #[error("AWS credentials not found")]
    NoCredentials,

    #[error("Incomplete AWS credentials")]
    PartialCredentials,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<quick_xml::Error> for S3Error {
    fn from(err: quick_xml::Error) -> Self {
        S3Error::XmlParse(err.to_string())
    }
}

impl From<hyper_util::client::legacy::Error> for S3Error {
    fn from(err: hyper_util::client::legacy::Error) -> Self {
        S3Error::InvalidResponse(format!("Client error: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, S3Error>;

/// Endpoint for `region` on AWS
pub fn default_endpoint(region: &str) -> String {
    if region == DEFAULT_REGION {
        "https://s3.amazonaws.com".to_string()
    } else {
        format!("https://s3.{}.amazonaws.com", region)
    }
}

/// Connection options for [`S3Client`]
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    /// Endpoint override; derived from the region when unset
    pub endpoint: Option<String>,
    /// Disable TLS certificate verification
    pub insecure_tls: bool,
}

impl ClientOptions {
    /// Set a custom endpoint (MinIO, LocalStack)
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Disable TLS certificate verification
    pub fn with_insecure_tls(mut self, insecure_tls: bool) -> Self {
        self.insecure_tls = insecure_tls;
        self
    }
}

/// S3 client bound to one region, endpoint and credential pair
///
/// Clone is cheap - the underlying HTTP client uses Arc internally.
#[derive(Clone)]
pub struct S3Client {
    client: HyperClient<HttpsConnector<HttpConnector>, Full<Bytes>>,
    signer: S3SignerV4,
    endpoint: String,
}

impl fmt::Debug for S3Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("S3Client")
            .field("endpoint", &self.endpoint)
            .field("region", &self.region())
            .finish_non_exhaustive()
    }
}

impl S3Client {
    /// Create a new S3 client.
    ///
    /// No network traffic happens here. Credentials are taken as given, empty
    /// or not; they are checked when a request is signed.
    pub fn new(credentials: Credentials, region: &str, options: &ClientOptions) -> Result<Self> {
        let endpoint = match &options.endpoint {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None => default_endpoint(region),
        };

        if !(endpoint.starts_with("https://") || endpoint.starts_with("http://")) {
            return Err(S3Error::InvalidEndpoint(endpoint));
        }

        let mut http = HttpConnector::new();
        http.set_nodelay(true);
        http.enforce_http(false);
        http.set_connect_timeout(Some(Duration::from_secs(10)));

        let tls = if options.insecure_tls {
            warn!("INSECURE TLS MODE ENABLED: Certificate verification is disabled!");
            TlsConnector::builder()
                .danger_accept_invalid_certs(true)
                .danger_accept_invalid_hostnames(true)
                .build()?
        } else {
            TlsConnector::new()?
        };

        let https = HttpsConnector::from((http, tls.into()));

        let client = HyperClient::builder(TokioExecutor::new())
            .pool_idle_timeout(Duration::from_secs(90))
            .set_host(true)
            .build(https);

        debug!(%endpoint, %region, "S3 client created");

        Ok(Self {
            client,
            signer: S3SignerV4::new(credentials, region),
            endpoint,
        })
    }

    /// Endpoint requests are sent to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Region the client signs for
    pub fn region(&self) -> &str {
        self.signer.region()
    }

    /// Create a bucket (PUT bucket).
    ///
    /// Outside `us-east-1` the body carries a `LocationConstraint` naming
    /// `region`; in `us-east-1` the body is empty.
    pub async fn create_bucket(&self, bucket: &str, region: &str) -> Result<()> {
        let url = self.build_bucket_url(bucket);

        let mut headers = BTreeMap::new();
        let body = match create_bucket_configuration(region) {
            Some(xml) => {
                headers.insert("content-type".to_string(), "application/xml".to_string());
                Bytes::from(xml)
            }
            None => Bytes::new(),
        };

        info!(%bucket, %region, with_location_constraint = !body.is_empty(), "creating bucket");

        let (status, _, body_bytes) = self.send(Method::PUT, &url, headers, body, false).await?;

        if !status.is_success() {
            return Err(Self::response_error(status, &body_bytes));
        }

        Ok(())
    }

    /// Put object to S3 with the given ACL and content type
    pub async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        options: &PutObjectOptions,
    ) -> Result<PutObjectResponse> {
        let url = self.build_url(bucket, key);
        let size = data.len() as u64;

        let mut headers = BTreeMap::new();
        headers.insert("content-type".to_string(), options.content_type.clone());
        headers.insert("x-amz-acl".to_string(), options.acl.as_str().to_string());
        headers.insert("content-length".to_string(), size.to_string());

        info!(%bucket, %key, size, content_type = %options.content_type, "putting object");

        let (status, resp_headers, body_bytes) =
            self.send(Method::PUT, &url, headers, data, true).await?;

        if !status.is_success() {
            return Err(Self::response_error(status, &body_bytes));
        }

        let etag = resp_headers
            .get("etag")
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());

        Ok(PutObjectResponse { etag, size })
    }

    /// Upload a local file as one object.
    ///
    /// A missing file is reported as [`S3Error::FileNotFound`] with the path.
    pub async fn upload_file(
        &self,
        bucket: &str,
        key: &str,
        path: &Path,
        options: &PutObjectOptions,
    ) -> Result<PutObjectResponse> {
        let data = match tokio::fs::read(path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(S3Error::FileNotFound(path.to_path_buf()));
            }
            Err(e) => return Err(S3Error::Io(e)),
        };

        self.put_object(bucket, key, Bytes::from(data), options).await
    }

    /// Sign and send one request, returning (status, headers, body).
    ///
    /// Credentials are checked before anything is sent: an empty or half-empty
    /// pair never reaches the server. AWS SDKs sign and send such a pair and
    /// let the service reject it; here it fails locally with
    /// [`S3Error::NoCredentials`] or [`S3Error::PartialCredentials`].
    async fn send(
        &self,
        method: Method,
        url: &str,
        headers: BTreeMap<String, String>,
        body: Bytes,
        unsigned_payload: bool,
    ) -> Result<(StatusCode, HeaderMap, Bytes)> {
        match self.signer.credential_status() {
            CredentialStatus::Complete => {}
            CredentialStatus::Missing => return Err(S3Error::NoCredentials),
            CredentialStatus::Partial => return Err(S3Error::PartialCredentials),
        }

        let signed_headers = if unsigned_payload {
            self.signer.sign_unsigned_payload(method.as_str(), url, headers)
        } else {
            self.signer.sign(method.as_str(), url, headers, &body)
        };

        let mut req = Request::builder().method(method.clone()).uri(url);
        for (key, value) in signed_headers.iter() {
            req = req.header(key, value);
        }

        let request = req.body(Full::new(body))?;
        let response = self.client.request(request).await?;
        let status = response.status();
        let resp_headers = response.headers().clone();

        // Always drain body to return connection to pool
        let body_bytes = response.collect().await?.to_bytes();

        debug!(%method, %url, status = status.as_u16(), "S3 response");

        Ok((status, resp_headers, body_bytes))
    }

    /// Build an error from a non-success response
    fn response_error(status: StatusCode, body: &[u8]) -> S3Error {
        let parsed = Self::parse_error_response(body).unwrap_or_default();
        debug!(
            status = status.as_u16(),
            resource = parsed.resource.as_deref().unwrap_or("-"),
            request_id = parsed.request_id.as_deref().unwrap_or("-"),
            "S3 error response"
        );

        let code = parsed
            .code
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown").to_string());
        let message = parsed
            .message
            .unwrap_or_else(|| String::from_utf8_lossy(body).trim().to_string());

        S3Error::S3Response {
            status,
            code,
            message,
        }
    }

    /// Parse an S3 `<Error>` document
    fn parse_error_response(xml_data: &[u8]) -> Result<S3ErrorResponse> {
        let mut reader = Reader::from_reader(xml_data);
        reader.config_mut().trim_text_start = true;
        reader.config_mut().trim_text_end = true;

        let mut response = S3ErrorResponse::default();
        let mut current_text = String::new();

        loop {
            match reader.read_event() {
                Ok(Event::Text(e)) => {
                    current_text.clear();
                    current_text.push_str(&e.unescape()?);
                }
                Ok(Event::End(e)) => {
                    match e.local_name().as_ref() {
                        b"Code" => response.code = Some(std::mem::take(&mut current_text)),
                        b"Message" => response.message = Some(std::mem::take(&mut current_text)),
                        b"Resource" => {
                            response.resource = Some(std::mem::take(&mut current_text))
                        }
                        b"RequestId" => {
                            response.request_id = Some(std::mem::take(&mut current_text))
                        }
                        _ => {}
                    }
                    current_text.clear();
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(e.into()),
                _ => {}
            }
        }

        Ok(response)
    }

    /// Encode an S3 key, preserving forward slashes
    fn encode_s3_key(key: &str) -> Cow<'_, str> {
        let needs_encoding = key.bytes().any(|b| {
            !matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'/')
        });

        if !needs_encoding {
            return Cow::Borrowed(key);
        }

        let mut result = String::with_capacity(key.len() + 32);
        for byte in key.bytes() {
            match byte {
                b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'/' => {
                    result.push(byte as char);
                }
                _ => {
                    result.push('%');
                    result.push(HEX_UPPER[(byte >> 4) as usize] as char);
                    result.push(HEX_UPPER[(byte & 0xf) as usize] as char);
                }
            }
        }
        Cow::Owned(result)
    }

    /// Build full S3 URL for a key
    fn build_url(&self, bucket: &str, key: &str) -> String {
        let bucket = S3SignerV4::uri_encode(bucket, true);
        let encoded_key = Self::encode_s3_key(key);
        let mut url =
            String::with_capacity(self.endpoint.len() + 1 + bucket.len() + 1 + encoded_key.len());
        url.push_str(&self.endpoint);
        url.push('/');
        url.push_str(&bucket);
        url.push('/');
        url.push_str(&encoded_key);
        url
    }

    /// Build bucket URL (no key)
    fn build_bucket_url(&self, bucket: &str) -> String {
        let bucket = S3SignerV4::uri_encode(bucket, true);
        let mut url = String::with_capacity(self.endpoint.len() + 1 + bucket.len());
        url.push_str(&self.endpoint);
        url.push('/');
        url.push_str(&bucket);
        url
    }
}
