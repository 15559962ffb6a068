//! Image server client
//!
//! The action creator only needs something that can produce the image
//! list; [`ImageSource`] is that seam. [`HttpImageSource`] talks to the
//! real server, tests plug in their own sources.

use std::future::Future;

use crate::image::Image;

/// Why fetching the image list failed
///
/// Carried inside `ImagesDidFail`, so it is cloneable and comparable
/// rather than wrapping the transport error itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The request never produced a response (connect, timeout, TLS, ...)
    Transport(String),
    /// The server answered with a non-2xx status
    Status(u16),
    /// The body was not a JSON array of images
    Decode(String),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Transport(e) => write!(f, "Image request failed: {}", e),
            FetchError::Status(code) => write!(f, "Image server returned status {}", code),
            FetchError::Decode(e) => write!(f, "Invalid image list: {}", e),
        }
    }
}

impl std::error::Error for FetchError {}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        FetchError::Transport(e.to_string())
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::Decode(e.to_string())
    }
}

/// Something that can list the uploaded images
pub trait ImageSource: Send + Sync + 'static {
    fn fetch_images(&self) -> impl Future<Output = Result<Vec<Image>, FetchError>> + Send;
}

/// Path of the image list on the server
pub const IMAGES_PATH: &str = "/api/images";

/// [`ImageSource`] backed by the image server's JSON API
#[derive(Debug, Clone)]
pub struct HttpImageSource {
    client: reqwest::Client,
    url: String,
}

impl HttpImageSource {
    /// `base_url` is the server root, e.g. `http://localhost:3300`
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            url: format!("{}{}", base_url.trim_end_matches('/'), IMAGES_PATH),
        }
    }

    /// Full URL of the image list
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl ImageSource for HttpImageSource {
    async fn fetch_images(&self) -> Result<Vec<Image>, FetchError> {
        tracing::debug!(url = %self.url, "Fetching images");

        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        // Read the body first so decode failures are not reported as transport errors
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}
