//! reqwest-backed [`Transport`].

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Request, Response};
use tower::{Layer, Service};

use super::{Transport, ACCESS_TOKEN_HEADER};
use crate::error::{BytedanceError, HttpError};

pub(crate) const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub(crate) const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
const USER_AGENT: &str = concat!("Bytedance-Rust-SDK/", env!("CARGO_PKG_VERSION"));

type MiddlewareFuture = Pin<Box<dyn Future<Output = Result<Response, reqwest::Error>> + Send>>;
type MiddlewareExecutor = Arc<dyn Fn(Request) -> MiddlewareFuture + Send + Sync>;

/// HTTP transport over a shared [`reqwest::Client`].
///
/// Requests pass through the tower middleware configured on the builder, if any.
#[derive(Clone)]
pub struct HttpTransport {
    http: Client,
    middleware_executor: Option<MiddlewareExecutor>,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field(
                "middleware_executor",
                &self.middleware_executor.as_ref().map(|_| ".."),
            )
            .finish_non_exhaustive()
    }
}

impl HttpTransport {
    pub fn builder() -> HttpTransportBuilder {
        HttpTransportBuilder::default()
    }

    /// Transport with default timeouts and no middleware.
    pub fn new() -> Result<Self, BytedanceError> {
        Self::builder().build()
    }

    /// Returns the underlying [`reqwest::Client`].
    ///
    /// Note: requests made through this client bypass the middleware pipeline.
    pub fn http(&self) -> &Client {
        &self.http
    }

    async fn send_request(&self, request: Request) -> Result<Response, reqwest::Error> {
        if let Some(executor) = &self.middleware_executor {
            (executor)(request).await
        } else {
            self.http.execute(request).await
        }
    }

    async fn execute(&self, request: Request) -> Result<Vec<u8>, HttpError> {
        let url = request.url().clone();
        let response = self.send_request(request).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(HttpError::Status {
                url: strip_query(&url),
                status: status.as_u16(),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}

// Query strings carry secrets and tokens; keep them out of error messages.
fn strip_query(url: &reqwest::Url) -> String {
    let mut url = url.clone();
    url.set_query(None);
    url.to_string()
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<Vec<u8>, HttpError> {
        let request = self.http.get(url).build()?;
        self.execute(request).await
    }

    async fn post(&self, url: &str, body: Vec<u8>) -> Result<Vec<u8>, HttpError> {
        let request = self.http.post(url).body(body).build()?;
        self.execute(request).await
    }

    async fn post_json(
        &self,
        url: &str,
        payload: &serde_json::Value,
    ) -> Result<Vec<u8>, HttpError> {
        let request = self.http.post(url).json(payload).build()?;
        self.execute(request).await
    }

    async fn post_json_with_token(
        &self,
        url: &str,
        access_token: &str,
        payload: &serde_json::Value,
    ) -> Result<Vec<u8>, HttpError> {
        let request = self
            .http
            .post(url)
            .header(ACCESS_TOKEN_HEADER, access_token)
            .json(payload)
            .build()?;
        self.execute(request).await
    }
}

impl Service<Request> for HttpTransport {
    type Response = Response;
    type Error = reqwest::Error;
    type Future = MiddlewareFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let client = self.http.clone();
        Box::pin(async move { client.execute(req).await })
    }
}

/// Builder for [`HttpTransport`]
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use bytedance_sdk::middleware::LoggingMiddleware;
/// use bytedance_sdk::transport::HttpTransport;
///
/// let transport = HttpTransport::builder()
///     .timeout(Duration::from_secs(10))
///     .with_middleware(LoggingMiddleware::new())
///     .build_layered()
///     .unwrap();
/// ```
#[must_use]
#[derive(Default)]
pub struct HttpTransportBuilder<M = ()> {
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    middleware: Option<M>,
}

impl<M> std::fmt::Debug for HttpTransportBuilder<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransportBuilder")
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("middleware", &self.middleware.as_ref().map(|_| ".."))
            .finish()
    }
}

impl<M> HttpTransportBuilder<M> {
    /// Set the total timeout for requests
    ///
    /// Default: 30 seconds
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the connection timeout
    ///
    /// Default: 10 seconds
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn with_middleware<M2>(self, middleware: M2) -> HttpTransportBuilder<M2>
    where
        M2: Layer<HttpTransport> + Clone + Send + Sync + 'static,
    {
        HttpTransportBuilder {
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            middleware: Some(middleware),
        }
    }

    fn build_base(&self) -> Result<HttpTransport, BytedanceError> {
        let timeout = self
            .timeout
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        let connect_timeout = self
            .connect_timeout
            .unwrap_or(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS));

        let http = Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(HttpTransport {
            http,
            middleware_executor: None,
        })
    }
}

impl HttpTransportBuilder<()> {
    pub fn build(self) -> Result<HttpTransport, BytedanceError> {
        self.build_base()
    }
}

impl<M> HttpTransportBuilder<M>
where
    M: Layer<HttpTransport> + Clone + Send + Sync + 'static,
    M::Service: Service<Request, Response = Response, Error = reqwest::Error>
        + Clone
        + Send
        + Sync
        + 'static,
    <M::Service as Service<Request>>::Future: Send + 'static,
{
    /// Build the transport with the middleware wrapped around it.
    pub fn build_layered(self) -> Result<HttpTransport, BytedanceError> {
        let mut transport = self.build_base()?;
        if let Some(middleware) = self.middleware {
            let service = middleware.layer(transport.clone());
            transport.middleware_executor = Some(make_middleware_executor(service));
        }
        Ok(transport)
    }
}

fn make_middleware_executor<S>(service: S) -> MiddlewareExecutor
where
    S: Service<Request, Response = Response, Error = reqwest::Error>
        + Clone
        + Send
        + Sync
        + 'static,
    S::Future: Send + 'static,
{
    let service = Arc::new(service);

    Arc::new(move |request: Request| {
        let mut service = (*service).clone();
        Box::pin(async move { service.call(request).await })
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn test_get_returns_body_bytes() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ping"))
            .respond_with(ResponseTemplate::new(200).set_body_string("pong"))
            .mount(&mock_server)
            .await;

        let transport = HttpTransport::new().unwrap();
        let body = transport
            .get(&format!("{}/ping", mock_server.uri()))
            .await
            .unwrap();
        assert_eq!(body, b"pong");
    }

    #[tokio::test]
    async fn test_non_2xx_is_status_error_without_query() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/oauth/oauth/client_token"))
            .respond_with(ResponseTemplate::new(503).set_body_json(serde_json::json!({
                "err_no": 0
            })))
            .mount(&mock_server)
            .await;

        let transport = HttpTransport::new().unwrap();
        let result = transport
            .get(&format!(
                "{}/oauth/oauth/client_token?client_secret=hush",
                mock_server.uri()
            ))
            .await;

        match result {
            Err(HttpError::Status { url, status }) => {
                assert_eq!(status, 503);
                assert!(!url.contains("hush"));
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_post_json_with_token_sets_header() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/apps/v1/url_link/generate"))
            .and(header(ACCESS_TOKEN_HEADER, "clt.abc"))
            .and(body_json(serde_json::json!({"app_id": "tt01"})))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let transport = HttpTransport::new().unwrap();
        transport
            .post_json_with_token(
                &format!("{}/api/apps/v1/url_link/generate", mock_server.uri()),
                "clt.abc",
                &serde_json::json!({"app_id": "tt01"}),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_middleware_executes() {
        #[derive(Clone)]
        struct FlagLayer {
            flag: Arc<AtomicBool>,
        }

        impl Layer<HttpTransport> for FlagLayer {
            type Service = FlagService;

            fn layer(&self, inner: HttpTransport) -> Self::Service {
                FlagService {
                    inner,
                    flag: Arc::clone(&self.flag),
                }
            }
        }

        #[derive(Clone)]
        struct FlagService {
            inner: HttpTransport,
            flag: Arc<AtomicBool>,
        }

        impl Service<Request> for FlagService {
            type Response = Response;
            type Error = reqwest::Error;
            type Future = MiddlewareFuture;

            fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
                Poll::Ready(Ok(()))
            }

            fn call(&mut self, req: Request) -> Self::Future {
                self.flag.store(true, Ordering::SeqCst);
                let mut inner = self.inner.clone();
                Box::pin(async move { inner.call(req).await })
            }
        }

        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ping"))
            .respond_with(ResponseTemplate::new(200).set_body_string("pong"))
            .mount(&mock_server)
            .await;

        let invoked = Arc::new(AtomicBool::new(false));
        let transport = HttpTransport::builder()
            .with_middleware(FlagLayer {
                flag: Arc::clone(&invoked),
            })
            .build_layered()
            .unwrap();

        transport
            .get(&format!("{}/ping", mock_server.uri()))
            .await
            .unwrap();
        assert!(invoked.load(Ordering::SeqCst));
    }
}
