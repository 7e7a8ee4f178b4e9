use std::collections::{BTreeMap, VecDeque};
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// HTTP GET request envelope used by upstream clients.
#[derive(Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub timeout_ms: u64,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: BTreeMap::new(),
            timeout_ms: 5_000,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in headers {
            self = self.with_header(name, value);
        }
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}

// Header values carry API keys, so only header names are printed.
impl std::fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRequest")
            .field("url", &self.url)
            .field("headers", &self.headers.keys().collect::<Vec<_>>())
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

/// HTTP response envelope returned by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn ok_json(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }

    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Transport-level HTTP error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpError {
    message: String,
    retryable: bool,
}

impl HttpError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retryable: true,
        }
    }

    pub fn non_retryable(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retryable: false,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }
}

impl Display for HttpError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for HttpError {}

pub type HttpFuture<'a> = Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>>;

/// Transport contract shared by the production client and test doubles.
pub trait HttpClient: Send + Sync {
    fn execute<'a>(&'a self, request: HttpRequest) -> HttpFuture<'a>;
}

/// Transport that answers every request with an empty JSON object.
#[derive(Debug, Default)]
pub struct NoopHttpClient;

impl HttpClient for NoopHttpClient {
    fn execute<'a>(&'a self, request: HttpRequest) -> HttpFuture<'a> {
        let _ = request;
        Box::pin(async move { Ok(HttpResponse::ok_json("{}")) })
    }
}

/// Production HTTP client backed by reqwest.
///
/// The inner client is shared, so both feeds reuse one connection pool.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: Arc<reqwest::Client>,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self {
            client: Arc::new(
                reqwest::Client::builder()
                    .user_agent(concat!("feargauge/", env!("CARGO_PKG_VERSION")))
                    .build()
                    .unwrap_or_else(|_| reqwest::Client::new()),
            ),
        }
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient for ReqwestHttpClient {
    fn execute<'a>(&'a self, request: HttpRequest) -> HttpFuture<'a> {
        Box::pin(async move {
            let mut builder = self
                .client
                .get(&request.url)
                .timeout(Duration::from_millis(request.timeout_ms));

            for (name, value) in &request.headers {
                builder = builder.header(name, value);
            }

            let response = builder.send().await.map_err(|e| {
                if e.is_timeout() {
                    HttpError::new(format!("request timeout: {e}"))
                } else if e.is_connect() {
                    HttpError::new(format!("connection failed: {e}"))
                } else {
                    HttpError::new(format!("request failed: {e}"))
                }
            })?;

            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .map_err(|e| HttpError::new(format!("failed to read response body: {e}")))?;

            Ok(HttpResponse { status, body })
        })
    }
}

/// Canned outcome served by [`StaticHttpClient`].
#[derive(Debug, Clone)]
pub struct StaticRoute {
    outcomes: VecDeque<Result<HttpResponse, HttpError>>,
    delay: Duration,
}

impl StaticRoute {
    pub fn json(body: impl Into<String>) -> Self {
        Self::respond(HttpResponse::ok_json(body))
    }

    pub fn respond(response: HttpResponse) -> Self {
        Self::sequence(vec![Ok(response)])
    }

    pub fn fail(error: HttpError) -> Self {
        Self::sequence(vec![Err(error)])
    }

    /// Outcomes are served in order; the last one repeats once the rest are used.
    pub fn sequence(outcomes: Vec<Result<HttpResponse, HttpError>>) -> Self {
        Self {
            outcomes: outcomes.into(),
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn next_outcome(&mut self) -> Result<HttpResponse, HttpError> {
        let outcome = if self.outcomes.len() > 1 {
            self.outcomes.pop_front()
        } else {
            self.outcomes.front().cloned()
        };
        outcome.unwrap_or_else(|| Err(HttpError::non_retryable("static route has no outcome")))
    }
}

/// In-memory transport keyed by URL prefix, with optional simulated latency.
///
/// Used by offline tests and by the CLI's `--mock` mode.
#[derive(Debug, Default)]
pub struct StaticHttpClient {
    routes: Mutex<Vec<(String, StaticRoute)>>,
    requests: Mutex<Vec<HttpRequest>>,
    calls: AtomicUsize,
}

impl StaticHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_route(self, url_prefix: impl Into<String>, route: StaticRoute) -> Self {
        lock(&self.routes).push((url_prefix.into(), route));
        self
    }

    /// Number of requests executed so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<HttpRequest> {
        lock(&self.requests).clone()
    }

    fn resolve(&self, url: &str) -> Option<(Result<HttpResponse, HttpError>, Duration)> {
        let mut routes = lock(&self.routes);
        routes
            .iter_mut()
            .find(|(prefix, _)| url.starts_with(prefix.as_str()))
            .map(|(_, route)| (route.next_outcome(), route.delay))
    }
}

impl HttpClient for StaticHttpClient {
    fn execute<'a>(&'a self, request: HttpRequest) -> HttpFuture<'a> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let resolved = self.resolve(&request.url);
            let url = request.url.clone();
            lock(&self.requests).push(request);

            let (outcome, delay) = resolved.ok_or_else(|| {
                HttpError::non_retryable(format!("connection failed: no static route for {url}"))
            })?;

            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            outcome
        })
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_names_are_lowercased() {
        let request = HttpRequest::get("https://example.test/fgi")
            .with_header("X-RapidAPI-Key", "secret");

        assert_eq!(
            request.headers.get("x-rapidapi-key").map(String::as_str),
            Some("secret")
        );
    }

    #[test]
    fn debug_output_hides_header_values() {
        let request = HttpRequest::get("https://example.test/fgi")
            .with_header("X-RapidAPI-Key", "super-secret-key");

        let rendered = format!("{request:?}");
        assert!(rendered.contains("x-rapidapi-key"));
        assert!(!rendered.contains("super-secret-key"));
    }

    #[test]
    fn success_range_is_2xx() {
        assert!(HttpResponse::new(200, "").is_success());
        assert!(HttpResponse::new(204, "").is_success());
        assert!(!HttpResponse::new(301, "").is_success());
        assert!(!HttpResponse::new(503, "").is_success());
    }

    #[tokio::test]
    async fn static_client_serves_sequence_then_repeats_last() {
        let client = StaticHttpClient::new().with_route(
            "https://example.test/",
            StaticRoute::sequence(vec![
                Err(HttpError::new("connection reset")),
                Ok(HttpResponse::ok_json("{\"ok\":true}")),
            ]),
        );

        let first = client.execute(HttpRequest::get("https://example.test/a")).await;
        let second = client.execute(HttpRequest::get("https://example.test/a")).await;
        let third = client.execute(HttpRequest::get("https://example.test/a")).await;

        assert!(first.is_err());
        assert_eq!(second.expect("ok").status, 200);
        assert_eq!(third.expect("ok").status, 200);
        assert_eq!(client.calls(), 3);
    }

    #[tokio::test]
    async fn static_client_without_route_fails_with_connection_error() {
        let client = StaticHttpClient::new();
        let error = client
            .execute(HttpRequest::get("https://unknown.test/"))
            .await
            .expect_err("no route");
        assert!(error.message().contains("no static route"));
        assert!(!error.retryable());
    }
}
