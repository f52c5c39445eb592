use tokio::time::Instant;

use crate::SessionError;

/// Opaque handle the session uses to look up a response body.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResponseToken(pub String);

/// An image response that finished loading in the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageResponse {
    pub url: String,
    pub token: ResponseToken,
    /// When the session saw the response finish, not when it was dequeued.
    pub received: Instant,
}

impl ImageResponse {
    /// Stamps the response with the current time.
    pub fn new(url: String, token: ResponseToken) -> Self {
        Self {
            url,
            token,
            received: Instant::now(),
        }
    }
}

/// One isolated browser page. Image responses are delivered on the channel
/// returned when the session is opened, starting before navigation.
#[async_trait::async_trait]
pub trait BrowserSession: Send + Sync {
    /// Loads `url` and resolves once the document has loaded.
    async fn navigate(&self, url: &str) -> Result<(), SessionError>;

    /// Serialized DOM of the current document.
    async fn page_html(&self) -> Result<String, SessionError>;

    async fn response_body(&self, response: &ImageResponse) -> Result<Vec<u8>, SessionError>;

    /// Tears the session down. Calling it again is a no-op.
    async fn close(&self) -> Result<(), SessionError>;
}
