use async_trait::async_trait;
use reqwest::{Request, Response};

/// Abstraction over request execution so the open-data client can be driven
/// by a canned implementation in tests.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
