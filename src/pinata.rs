// src/pinata.rs
// Pinata pinning client

use reqwest::Client;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::{error, info};

/// Path of the pin-file endpoint under the API base
const PIN_FILE_PATH: &str = "/pinning/pinFileToIPFS";
/// Request timeout for a single pin upload
const UPLOAD_TIMEOUT: Duration = Duration::from_secs(120);
/// Connect timeout for the pinning endpoint
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the Pinata file-pinning API.
///
/// Credentials travel as the two static `pinata_api_key` /
/// `pinata_secret_api_key` headers. Requests carry fixed connect and overall
/// timeouts, so a stalled service fails the upload instead of hanging it. The
/// base URL is configurable so tests can point the client at a local stub.
#[derive(Clone)]
pub struct PinataClient {
    client: Client,
    base_url: String,
    api_key: String,
    secret_api_key: String,
}

/// Successful pin response; only the CID field matters here
#[derive(Debug, Deserialize)]
struct PinResponse {
    #[serde(rename = "IpfsHash")]
    ipfs_hash: String,
}

impl PinataClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        secret_api_key: impl Into<String>,
    ) -> Self {
        Self::with_timeout(base_url, api_key, secret_api_key, UPLOAD_TIMEOUT)
    }

    /// Build a client with a custom request timeout
    pub fn with_timeout(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        secret_api_key: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            secret_api_key: secret_api_key.into(),
        }
    }

    /// Pin a file, returning its CID.
    ///
    /// Every failure mode - unreadable file, network error, non-200 status,
    /// unexpected body - is logged here and collapses to `None`; callers only
    /// see pinned-or-not.
    pub async fn upload_document(&self, path: &Path) -> Option<String> {
        let file_content = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                error!(path = %path.display(), error = %e, "Failed to read file for pinning");
                return None;
            }
        };

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("document.pdf")
            .to_string();

        let form = reqwest::multipart::Form::new().part(
            "file",
            reqwest::multipart::Part::bytes(file_content).file_name(file_name),
        );

        let url = format!("{}{}", self.base_url, PIN_FILE_PATH);
        let response = match self
            .client
            .post(&url)
            .header("pinata_api_key", &self.api_key)
            .header("pinata_secret_api_key", &self.secret_api_key)
            .multipart(form)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, "Network error while uploading to Pinata");
                return None;
            }
        };

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "Pinata upload failed");
            return None;
        }

        match response.json::<PinResponse>().await {
            Ok(pin) => {
                info!(cid = %pin.ipfs_hash, "File uploaded to Pinata");
                Some(pin.ipfs_hash)
            }
            Err(e) => {
                error!(error = %e, "Failed to parse Pinata response");
                None
            }
        }
    }
}
