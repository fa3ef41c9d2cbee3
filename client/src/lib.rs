//! Salary Data Client
//!
//! Thin async client for the salary survey API plus the terminal UI the
//! `salary-dashboard` binary mounts its views into.

use std::env;

use common::{Filters, PayRangeCount, SalaryRecord};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, error, info};

pub mod ui;

/// Local development backend.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

const SALARIES_PATH: &str = "/salaries";
const PAY_RANGE_SUMMARY_PATH: &str = "/salaries/pay_range_summary";

#[derive(Error, Debug)]
pub enum ClientError {
    /// Transport failure, non-success status or undecodable body.
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invalid base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Reads `SALARY_API_URL`, falling back to [`DEFAULT_BASE_URL`].
    pub fn from_env() -> Self {
        match env::var("SALARY_API_URL") {
            Ok(url) if !url.is_empty() => Self::new(url),
            _ => {
                info!("SALARY_API_URL not set, using default: {DEFAULT_BASE_URL}");
                Self::default()
            }
        }
    }
}

/// Client for the two salary endpoints. Cloning shares the connection pool.
#[derive(Debug, Clone)]
pub struct SalaryClient {
    http: reqwest::Client,
    base_url: String,
}

impl SalaryClient {
    /// Rejects anything that is not an absolute `http`/`https` URL with a host.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let invalid = |reason: String| ClientError::InvalidBaseUrl {
            url: config.base_url.clone(),
            reason,
        };

        let url = reqwest::Url::parse(&config.base_url).map_err(|e| invalid(e.to_string()))?;
        // "localhost:8000" parses with scheme "localhost"
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme {:?}", url.scheme())));
        }
        if !url.has_host() {
            return Err(invalid("missing host".to_string()));
        }

        Ok(Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Survey answers matching `filters`. Empty filter values are not sent.
    pub async fn fetch_salaries(
        &self,
        filters: &Filters,
    ) -> Result<Vec<SalaryRecord>, ClientError> {
        self.get(SALARIES_PATH, filters)
            .await
            .inspect_err(|e| error!("Error fetching salaries: {e}"))
    }

    /// Top pay ranges for the answers matching `filters`.
    pub async fn fetch_pay_range_summary(
        &self,
        filters: &Filters,
    ) -> Result<Vec<PayRangeCount>, ClientError> {
        self.get(PAY_RANGE_SUMMARY_PATH, filters)
            .await
            .inspect_err(|e| error!("Error fetching pay range summary: {e}"))
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        filters: &Filters,
    ) -> Result<T, ClientError> {
        // Empty values mean "unset" and never reach the query string
        let cleaned = filters.sanitized();
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, filters = ?cleaned, "GET");

        let response = self
            .http
            .get(&url)
            .query(&cleaned.query_pairs())
            .send()
            .await?
            .error_for_status()?;

        // Decode failures surface as reqwest errors too
        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use axum::{
        Json, Router,
        extract::{RawQuery, State},
        http::StatusCode,
        routing::get,
    };
    use common::FilterKey;
    use tokio::net::TcpListener;

    type Seen = Arc<Mutex<Vec<Option<String>>>>;

    /// Collects formatted log lines for assertions.
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl LogBuffer {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogBuffer {
        type Writer = LogBuffer;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn records() -> Vec<SalaryRecord> {
        vec![
            SalaryRecord {
                id: 1,
                title: Some("Engineer".to_string()),
                company_size: Some(20.5),
                pay_range: Some("50000 - 60000".to_string()),
                ..Default::default()
            },
            SalaryRecord {
                id: 2,
                title: Some("Senior Engineer".to_string()),
                ..Default::default()
            },
        ]
    }

    fn summary() -> Vec<PayRangeCount> {
        vec![PayRangeCount {
            pay_range: Some("50000 - 60000".to_string()),
            count: 4,
        }]
    }

    /// Binds a stand-in backend that records every raw query string it receives.
    async fn spawn_backend() -> (String, Seen) {
        let seen: Seen = Arc::default();

        let app = Router::new()
            .route(
                "/salaries",
                get(|State(seen): State<Seen>, RawQuery(query): RawQuery| async move {
                    seen.lock().unwrap().push(query);
                    Json(records())
                }),
            )
            .route(
                "/salaries/pay_range_summary",
                get(|State(seen): State<Seen>, RawQuery(query): RawQuery| async move {
                    seen.lock().unwrap().push(query);
                    Json(summary())
                }),
            )
            .with_state(seen.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{address}"), seen)
    }

    async fn spawn_failing_backend() -> String {
        let app =
            Router::new().fallback(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") });

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        format!("http://{address}")
    }

    fn client(base_url: &str) -> SalaryClient {
        SalaryClient::new(ClientConfig::new(base_url)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_salaries_returns_decoded_body() {
        let (base, _) = spawn_backend().await;

        let fetched = client(&base).fetch_salaries(&Filters::default()).await.unwrap();

        assert_eq!(fetched, records());
    }

    #[tokio::test]
    async fn test_empty_filter_values_are_not_sent() {
        let (base, seen) = spawn_backend().await;
        let filters = Filters::new()
            .with(FilterKey::Title, "Engineer")
            .with(FilterKey::Area, "");

        client(&base).fetch_salaries(&filters).await.unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![Some("title=Engineer".to_string())]);
    }

    #[tokio::test]
    async fn test_no_filters_sends_no_query() {
        let (base, seen) = spawn_backend().await;

        client(&base).fetch_salaries(&Filters::default()).await.unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![None]);
    }

    #[tokio::test]
    async fn test_fetch_pay_range_summary_hits_summary_path() {
        let (base, seen) = spawn_backend().await;
        let filters = Filters::new()
            .with(FilterKey::Currency, "TRY")
            .with(FilterKey::MinExperience, "3");

        let fetched = client(&base).fetch_pay_range_summary(&filters).await.unwrap();

        assert_eq!(fetched, summary());
        assert_eq!(
            *seen.lock().unwrap(),
            vec![Some("min_experience=3&currency=TRY".to_string())]
        );
    }

    #[tokio::test]
    async fn test_trailing_slash_in_base_url() {
        let (base, _) = spawn_backend().await;

        let fetched = client(&format!("{base}/"))
            .fetch_pay_range_summary(&Filters::default())
            .await
            .unwrap();

        assert_eq!(fetched, summary());
    }

    #[tokio::test]
    async fn test_server_error_is_returned_to_caller() {
        let base = spawn_failing_backend().await;
        let client = client(&base);

        let salaries = client.fetch_salaries(&Filters::default()).await;
        let summary = client.fetch_pay_range_summary(&Filters::default()).await;

        for result in [salaries.map(|_| ()), summary.map(|_| ())] {
            match result {
                Err(ClientError::Request(e)) => {
                    assert_eq!(e.status(), Some(reqwest::StatusCode::INTERNAL_SERVER_ERROR));
                }
                other => panic!("expected request failure, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_returned_to_caller() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        drop(listener);

        let result = client(&format!("http://{address}"))
            .fetch_salaries(&Filters::default())
            .await;

        assert!(matches!(result, Err(ClientError::Request(e)) if e.is_connect()));
    }

    #[tokio::test]
    async fn test_undecodable_body_is_request_failure() {
        let app = Router::new().route("/salaries", get(|| async { "not json" }));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let result = client(&format!("http://{address}"))
            .fetch_salaries(&Filters::default())
            .await;

        assert!(matches!(result, Err(ClientError::Request(e)) if e.is_decode()));
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let result = SalaryClient::new(ClientConfig::new("not a url"));
        assert!(matches!(result, Err(ClientError::InvalidBaseUrl { .. })));
    }

    #[test]
    fn test_base_url_without_scheme_is_rejected() {
        let result = SalaryClient::new(ClientConfig::new("localhost:8000"));
        assert!(matches!(
            result,
            Err(ClientError::InvalidBaseUrl { url, .. }) if url == "localhost:8000"
        ));
    }

    #[test]
    fn test_non_http_base_url_is_rejected() {
        for url in ["ftp://localhost:8000", "file:///tmp/salaries"] {
            let result = SalaryClient::new(ClientConfig::new(url));
            assert!(
                matches!(result, Err(ClientError::InvalidBaseUrl { .. })),
                "{url} accepted"
            );
        }
    }

    #[test]
    fn test_https_base_url_is_accepted() {
        let client = SalaryClient::new(ClientConfig::new("https://salaries.example.com/")).unwrap();
        assert_eq!(client.base_url(), "https://salaries.example.com");
    }

    #[tokio::test]
    async fn test_failures_are_logged_before_returning() {
        let logs = LogBuffer::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);
        let base = spawn_failing_backend().await;
        let client = client(&base);

        let salaries = client.fetch_salaries(&Filters::default()).await;
        let summary = client.fetch_pay_range_summary(&Filters::default()).await;

        assert!(salaries.is_err());
        assert!(summary.is_err());
        let text = logs.contents();
        assert!(text.contains("ERROR"));
        assert!(text.contains("Error fetching salaries"));
        assert!(text.contains("Error fetching pay range summary"));
    }

    #[test]
    fn test_default_config_points_at_local_backend() {
        assert_eq!(ClientConfig::default().base_url, "http://localhost:8000");
    }
}
