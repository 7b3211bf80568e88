use std::future::Future;
use std::pin::Pin;
use std::time::Instant;

use log::{debug, info, warn};
use reqwest::{Request, Response};
use tower::{Layer, Service};

/// Logs method, URL, status and latency of every request.
///
/// Credentials in the query string are replaced by `[REDACTED]`.
#[derive(Clone)]
pub struct LoggingMiddleware {
    verbose: bool,
}

impl LoggingMiddleware {
    pub fn new() -> Self {
        Self { verbose: false }
    }

    pub fn verbose(mut self) -> Self {
        self.verbose = true;
        self
    }
}

impl Default for LoggingMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Layer<S> for LoggingMiddleware
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Service = LoggingMiddlewareService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        LoggingMiddlewareService {
            inner,
            verbose: self.verbose,
        }
    }
}

#[derive(Clone)]
pub struct LoggingMiddlewareService<S> {
    inner: S,
    verbose: bool,
}

const SENSITIVE_FIELDS: &[&str] = &[
    "access_token",
    "refresh_token",
    "client_secret",
    "secret",
    "code",
    "ticket",
    "session_key",
    "token",
];

fn is_sensitive(key: &str) -> bool {
    SENSITIVE_FIELDS.iter().any(|s| key.eq_ignore_ascii_case(s))
}

impl<S> LoggingMiddlewareService<S> {
    fn redact_url(url: &str) -> String {
        let Some((base, query)) = url.split_once('?') else {
            return url.to_string();
        };

        let redacted: Vec<String> = query
            .split('&')
            .map(|pair| match pair.split_once('=') {
                Some((key, _)) if is_sensitive(key) => format!("{key}=[REDACTED]"),
                _ => pair.to_string(),
            })
            .collect();

        format!("{base}?{}", redacted.join("&"))
    }

    fn status_text(status: u16) -> &'static str {
        reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|code| code.canonical_reason())
            .unwrap_or("")
    }
}

impl<S, Error> Service<Request> for LoggingMiddlewareService<S>
where
    S: Service<Request, Response = Response, Error = Error> + Send + Clone + 'static,
    S::Future: Send,
    Error: std::fmt::Display + Send + 'static,
{
    type Response = Response;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let method = req.method().clone();
        let url = Self::redact_url(req.url().as_str());
        let verbose = self.verbose;
        let mut inner = self.inner.clone();

        Box::pin(async move {
            if verbose {
                debug!("[Bytedance] >>> {} {}", method, url);
            }

            let start = Instant::now();
            let result = inner.call(req).await;
            let elapsed = start.elapsed();

            match &result {
                Ok(response) => {
                    let status = response.status().as_u16();
                    info!(
                        "[Bytedance] {} {} -> {} {} ({:?})",
                        method,
                        url,
                        status,
                        Self::status_text(status),
                        elapsed
                    );
                }
                Err(e) => warn!("[Bytedance] {} {} failed after {:?}: {}", method, url, elapsed, e),
            }

            result
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_redact_url_no_sensitive_params() {
        let url = "https://open.douyin.com/oauth/oauth/client_token?grant_type=client_credential";
        let redacted = LoggingMiddlewareService::<()>::redact_url(url);
        assert_eq!(redacted, url);
    }

    #[test]
    fn test_redact_url_with_client_secret() {
        let url = "https://open.douyin.com/oauth/oauth/client_token?client_key=tt01&client_secret=hush&grant_type=client_credential";
        let redacted = LoggingMiddlewareService::<()>::redact_url(url);
        assert!(redacted.contains("client_secret=[REDACTED]"));
        assert!(redacted.contains("client_key=tt01"));
        assert!(!redacted.contains("hush"));
    }

    #[test]
    fn test_redact_url_with_refresh_token() {
        let url = "https://open.douyin.com/oauth/oauth/refresh_token?client_key=tt01&grant_type=refresh_token&refresh_token=rtok-abc";
        let redacted = LoggingMiddlewareService::<()>::redact_url(url);
        assert!(redacted.contains("refresh_token=[REDACTED]"));
        assert!(redacted.contains("grant_type=refresh_token"));
    }

    #[test]
    fn test_redact_url_with_authorization_code() {
        let url = "https://open.douyin.com/oauth/access_token?client_key=tt01&code=c0de";
        let redacted = LoggingMiddlewareService::<()>::redact_url(url);
        assert!(redacted.contains("code=[REDACTED]"));
    }

    #[test]
    fn test_status_text() {
        assert_eq!(LoggingMiddlewareService::<()>::status_text(200), "OK");
        assert_eq!(
            LoggingMiddlewareService::<()>::status_text(429),
            "Too Many Requests"
        );
        assert_eq!(LoggingMiddlewareService::<()>::status_text(999), "");
    }

    #[tokio::test]
    async fn test_logging_middleware_passes_response_through() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/js/getticket"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&mock_server)
            .await;

        let client = reqwest::Client::new();
        let mut service = LoggingMiddleware::new().verbose().layer(client.clone());

        let url = format!("{}/js/getticket?access_token=secret123", mock_server.uri());
        let req = client.get(&url).build().unwrap();

        let response = service.call(req).await.unwrap();
        assert_eq!(response.status().as_u16(), 200);
    }
}
