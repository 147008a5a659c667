use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Request, Response};

/// Executes a single HTTP request.
///
/// Implemented by [`BasicClient`](super::BasicClient) for real traffic and by
/// wrappers that decorate requests before delegating to an inner client.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}

#[async_trait]
impl<C: HttpClient + ?Sized> HttpClient for Arc<C> {
    async fn execute(&self, req: Request) -> reqwest::Result<Response> {
        (**self).execute(req).await
    }
}
