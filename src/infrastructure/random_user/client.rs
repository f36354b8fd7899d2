use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tracing::debug;

use super::dto::RandomUserResponseDto;
use crate::domain::{CreateUserDto, RandomUserSource};
use crate::shared::SourceError;

const DEFAULT_USER_AGENT: &str = "user-directory/0.1";
const DEFAULT_NATIONALITIES: &str = "us,br,gb";

/// Outbound identity and filters sent with every request.
#[derive(Debug, Clone)]
pub struct RandomUserIdentity {
    pub user_agent: String,
    /// Comma-separated nationality codes passed as `nat`; empty disables
    /// the filter.
    pub nationalities: String,
}

impl Default for RandomUserIdentity {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            nationalities: DEFAULT_NATIONALITIES.to_owned(),
        }
    }
}

/// HTTP client for the randomuser.me API.
pub struct RandomUserClient {
    client: Client,
    base_url: Url,
    user_agent: String,
    nationalities: String,
}

impl RandomUserClient {
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        Self::with_identity(base_url, timeout, RandomUserIdentity::default())
    }

    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn with_identity(
        base_url: Url,
        timeout: Duration,
        identity: RandomUserIdentity,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            user_agent: identity.user_agent,
            nationalities: identity.nationalities,
        })
    }

    fn request_url(&self, count: usize) -> Url {
        let mut url = self.base_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("results", &count.to_string());
            if !self.nationalities.is_empty() {
                query.append_pair("nat", &self.nationalities);
            }
        }
        url
    }
}

#[async_trait]
impl RandomUserSource for RandomUserClient {
    async fn fetch_random_users(&self, count: usize) -> Result<Vec<CreateUserDto>, SourceError> {
        if count == 0 {
            return Ok(Vec::new());
        }

        let url = self.request_url(count);
        debug!(%url, count, "Requesting random users");

        let response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, self.user_agent.as_str())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }

        parse_users(body.as_ref())
    }
}

fn parse_users(body: &[u8]) -> Result<Vec<CreateUserDto>, SourceError> {
    let decoded: RandomUserResponseDto = serde_json::from_slice(body)
        .map_err(|e| SourceError::Decode(format!("invalid random user payload: {e}")))?;

    if let Some(error) = decoded.error {
        return Err(SourceError::Status {
            status: StatusCode::OK.as_u16(),
            message: error,
        });
    }

    decoded.into_new_users().map_err(SourceError::Decode)
}

fn map_transport_error(error: reqwest::Error) -> SourceError {
    if error.is_timeout() {
        SourceError::Timeout(error.to_string())
    } else if error.is_decode() {
        SourceError::Decode(error.to_string())
    } else {
        SourceError::Transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> SourceError {
    let preview = body_preview(body);
    let message = if preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        preview
    };

    match status {
        StatusCode::TOO_MANY_REQUESTS => SourceError::RateLimited(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => SourceError::Timeout(message),
        _ => SourceError::Status {
            status: status.as_u16(),
            message,
        },
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use axum::extract::{Query, State};
    use axum::http::{HeaderMap, StatusCode as AxumStatus};
    use axum::routing::get;
    use axum::Router;

    const ONE_USER: &str = r#"{
        "results": [{
            "gender": "female",
            "name": { "first": "Jennie", "last": "Nichols" },
            "location": {
                "street": { "number": 8929, "name": "Valwood Pkwy" },
                "city": "Billings", "state": "Michigan",
                "country": "United States", "postcode": 63104
            },
            "email": "jennie.nichols@example.com",
            "dob": { "date": "1992-03-08T15:13:16.688Z", "age": 30 },
            "phone": "(272) 790-0888",
            "picture": { "large": "https://randomuser.me/api/portraits/women/75.jpg" }
        }]
    }"#;

    #[derive(Clone, Default)]
    struct Seen {
        query: Arc<Mutex<Option<HashMap<String, String>>>>,
        user_agent: Arc<Mutex<Option<String>>>,
    }

    async fn serve(router: Router) -> Url {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        Url::parse(&format!("http://{addr}/api/")).unwrap()
    }

    fn client(base_url: Url, timeout: Duration) -> RandomUserClient {
        RandomUserClient::with_identity(
            base_url,
            timeout,
            RandomUserIdentity {
                user_agent: "user-directory-tests".into(),
                nationalities: "us,br,gb".into(),
            },
        )
        .unwrap()
    }

    #[tokio::test]
    async fn sends_count_and_nationalities() {
        let seen = Seen::default();
        let router = Router::new()
            .route(
                "/api/",
                get(
                    |State(seen): State<Seen>,
                     headers: HeaderMap,
                     Query(params): Query<HashMap<String, String>>| async move {
                        *seen.query.lock().unwrap() = Some(params);
                        *seen.user_agent.lock().unwrap() = headers
                            .get("user-agent")
                            .and_then(|v| v.to_str().ok())
                            .map(str::to_string);
                        ONE_USER
                    },
                ),
            )
            .with_state(seen.clone());
        let base = serve(router).await;

        let users = client(base, Duration::from_secs(5))
            .fetch_random_users(7)
            .await
            .unwrap();

        assert_eq!(users.len(), 1);
        assert_eq!(users[0].postal_code, "63104");
        let query = seen.query.lock().unwrap().clone().unwrap();
        assert_eq!(query.get("results").map(String::as_str), Some("7"));
        assert_eq!(query.get("nat").map(String::as_str), Some("us,br,gb"));
        assert_eq!(
            seen.user_agent.lock().unwrap().as_deref(),
            Some("user-directory-tests")
        );
    }

    #[tokio::test]
    async fn rate_limit_maps_to_rate_limited() {
        let router = Router::new().route(
            "/api/",
            get(|| async { (AxumStatus::TOO_MANY_REQUESTS, "slow down") }),
        );
        let base = serve(router).await;

        let err = client(base, Duration::from_secs(5))
            .fetch_random_users(5)
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::RateLimited(ref m) if m == "slow down"));
    }

    #[tokio::test]
    async fn server_error_maps_to_status() {
        let router = Router::new().route(
            "/api/",
            get(|| async { (AxumStatus::SERVICE_UNAVAILABLE, "") }),
        );
        let base = serve(router).await;

        let err = client(base, Duration::from_secs(5))
            .fetch_random_users(5)
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Status { status: 503, .. }));
    }

    #[tokio::test]
    async fn slow_upstream_maps_to_timeout() {
        let router = Router::new().route(
            "/api/",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                ONE_USER
            }),
        );
        let base = serve(router).await;

        let err = client(base, Duration::from_millis(100))
            .fetch_random_users(5)
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Timeout(_)));
    }

    #[tokio::test]
    async fn unreachable_host_maps_to_transport() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let base = Url::parse(&format!("http://{addr}/api/")).unwrap();

        let err = client(base, Duration::from_secs(5))
            .fetch_random_users(5)
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Transport(_)));
    }

    #[test]
    fn error_body_is_an_upstream_failure() {
        let err = parse_users(br#"{ "error": "Uh oh, something has gone wrong." }"#).unwrap_err();
        assert!(matches!(err, SourceError::Status { status: 200, .. }));
    }

    #[test]
    fn malformed_json_is_a_decode_error() {
        let err = parse_users(b"<html>not json</html>").unwrap_err();
        assert!(matches!(err, SourceError::Decode(_)));
    }

    #[test]
    fn long_bodies_are_truncated_in_messages() {
        let body = "x".repeat(500);
        match map_status_error(StatusCode::BAD_GATEWAY, body.as_bytes()) {
            SourceError::Status { message, .. } => assert!(message.ends_with("...")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
