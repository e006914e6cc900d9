use std::collections::BTreeMap;
use std::time::Duration;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

const FCM_SCOPE: &str = "https://www.googleapis.com/auth/firebase.messaging";
const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const FCM_BASE_URL: &str = "https://fcm.googleapis.com";

/// One notification addressed to a batch of device tokens.
#[derive(Debug, Clone, PartialEq)]
pub struct PushMessage {
    pub tokens: Vec<String>,
    pub title: String,
    pub body: String,
    pub data: BTreeMap<String, String>,
}

/// Per-token outcome counts of a multicast send.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MulticastReport {
    pub success_count: usize,
    pub failure_count: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum PushError {
    #[error("invalid service account key: {0}")]
    Credentials(#[from] jsonwebtoken::errors::Error),

    #[error("push provider authentication failed: {0}")]
    Auth(String),

    #[error("push provider request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Push-messaging provider seam. A call either reports per-token counts or
/// fails as a whole.
#[async_trait::async_trait]
pub trait PushProvider: Send + Sync {
    async fn send_multicast(&self, message: &PushMessage) -> Result<MulticastReport, PushError>;
}

/// Used when no provider credentials are configured: nothing is sent and every
/// token counts as a failure.
pub struct DisabledPush;

#[async_trait::async_trait]
impl PushProvider for DisabledPush {
    async fn send_multicast(&self, message: &PushMessage) -> Result<MulticastReport, PushError> {
        tracing::warn!(tokens = message.tokens.len(), "push provider not configured, notifications disabled");
        Ok(MulticastReport {
            success_count: 0,
            failure_count: message.tokens.len(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct FcmCredentials {
    pub project_id: String,
    pub client_email: String,
    pub private_key: String,
}

#[derive(Serialize)]
struct ServiceAccountClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

struct CachedToken {
    value: String,
    expires_at: i64,
}

#[derive(Serialize)]
struct SendRequest<'a> {
    message: FcmMessage<'a>,
}

#[derive(Serialize)]
struct FcmMessage<'a> {
    token: &'a str,
    notification: FcmNotification<'a>,
    data: &'a BTreeMap<String, String>,
}

#[derive(Serialize)]
struct FcmNotification<'a> {
    title: &'a str,
    body: &'a str,
}

/// Firebase Cloud Messaging over the HTTP v1 API.
///
/// The v1 API addresses one token per request, so a multicast is a bounded
/// concurrent fan-out. The OAuth access token obtained from the service
/// account assertion is cached until a minute before it expires.
pub struct FcmClient {
    http: Client,
    credentials: FcmCredentials,
    signing_key: EncodingKey,
    concurrency: usize,
    token_uri: String,
    base_url: String,
    cached: Mutex<Option<CachedToken>>,
}

impl FcmClient {
    pub fn new(credentials: FcmCredentials, concurrency: usize) -> Result<Self, PushError> {
        let signing_key = EncodingKey::from_rsa_pem(credentials.private_key.as_bytes())?;
        let http = Client::builder().timeout(Duration::from_secs(10)).build()?;

        tracing::info!(project_id = %credentials.project_id, "FCM client initialized");

        Ok(Self {
            http,
            credentials,
            signing_key,
            concurrency: concurrency.max(1),
            token_uri: GOOGLE_TOKEN_URI.to_string(),
            base_url: FCM_BASE_URL.to_string(),
            cached: Mutex::new(None),
        })
    }

    /// Point the client at other endpoints (emulators, tests).
    pub fn with_endpoints(mut self, token_uri: impl Into<String>, base_url: impl Into<String>) -> Self {
        self.token_uri = token_uri.into();
        self.base_url = base_url.into();
        self
    }

    async fn access_token(&self) -> Result<String, PushError> {
        let mut cached = self.cached.lock().await;
        let now = Utc::now().timestamp();

        if let Some(token) = cached.as_ref() {
            if token.expires_at - 60 > now {
                return Ok(token.value.clone());
            }
        }

        let claims = ServiceAccountClaims {
            iss: &self.credentials.client_email,
            scope: FCM_SCOPE,
            aud: &self.token_uri,
            iat: now,
            exp: now + 3600,
        };
        let assertion = encode(&Header::new(Algorithm::RS256), &claims, &self.signing_key)?;

        let response = self
            .http
            .post(&self.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PushError::Auth(body));
        }

        let token: TokenResponse = response.json().await?;
        *cached = Some(CachedToken {
            value: token.access_token.clone(),
            expires_at: now + token.expires_in,
        });

        Ok(token.access_token)
    }

    async fn send_one(&self, access_token: &str, device_token: &str, message: &PushMessage) -> bool {
        let url = format!(
            "{}/v1/projects/{}/messages:send",
            self.base_url, self.credentials.project_id
        );
        let request = SendRequest {
            message: FcmMessage {
                token: device_token,
                notification: FcmNotification {
                    title: &message.title,
                    body: &message.body,
                },
                data: &message.data,
            },
        };

        match self.http.post(&url).bearer_auth(access_token).json(&request).send().await {
            Ok(resp) if resp.status().is_success() => true,
            Ok(resp) => {
                tracing::debug!(status = %resp.status(), "FCM rejected device token");
                false
            }
            Err(e) => {
                tracing::debug!(error = %e, "FCM send failed");
                false
            }
        }
    }
}

#[async_trait::async_trait]
impl PushProvider for FcmClient {
    async fn send_multicast(&self, message: &PushMessage) -> Result<MulticastReport, PushError> {
        if message.tokens.is_empty() {
            return Ok(MulticastReport::default());
        }

        let access_token = self.access_token().await?;
        let access_token = access_token.as_str();

        let outcomes: Vec<bool> = stream::iter(message.tokens.clone())
            .map(|token| async move { self.send_one(access_token, &token, message).await })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let success_count = outcomes.iter().filter(|ok| **ok).count();
        let report = MulticastReport {
            success_count,
            failure_count: outcomes.len() - success_count,
        };

        tracing::info!(
            success = report.success_count,
            failure = report.failure_count,
            "FCM multicast finished"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use axum::extract::State;
    use axum::http::{header, HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};

    const TEST_KEY: &str = include_str!("../../testdata/fcm_service_account.pem");
    const ACCESS_TOKEN: &str = "mock-access-token";

    fn message(tokens: &[&str]) -> PushMessage {
        PushMessage {
            tokens: tokens.iter().map(|t| t.to_string()).collect(),
            title: "Exam schedule".into(),
            body: "Timetable published".into(),
            data: BTreeMap::new(),
        }
    }

    #[tokio::test]
    async fn disabled_provider_fails_every_token() {
        let report = DisabledPush.send_multicast(&message(&["a", "b", "c"])).await.unwrap();
        assert_eq!(report, MulticastReport { success_count: 0, failure_count: 3 });
    }

    #[test]
    fn fcm_rejects_malformed_private_key() {
        let credentials = FcmCredentials {
            project_id: "campus".into(),
            client_email: "svc@campus.iam.gserviceaccount.com".into(),
            private_key: "not a pem".into(),
        };
        assert!(matches!(FcmClient::new(credentials, 4), Err(PushError::Credentials(_))));
    }

    #[test]
    fn fcm_payload_shape() {
        let mut data = BTreeMap::new();
        data.insert("screen".to_string(), "news".to_string());
        let request = SendRequest {
            message: FcmMessage {
                token: "device-1",
                notification: FcmNotification { title: "t", body: "b" },
                data: &data,
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["message"]["token"], "device-1");
        assert_eq!(json["message"]["notification"]["title"], "t");
        assert_eq!(json["message"]["data"]["screen"], "news");
    }

    fn credentials() -> FcmCredentials {
        FcmCredentials {
            project_id: "campus".into(),
            client_email: "svc@campus.iam.gserviceaccount.com".into(),
            private_key: TEST_KEY.into(),
        }
    }

    async fn issue_token(State(token_requests): State<Arc<AtomicUsize>>, body: String) -> (StatusCode, Json<serde_json::Value>) {
        let assertion = body
            .split('&')
            .find_map(|pair| pair.strip_prefix("assertion="))
            .unwrap_or_default();
        let signed_rs256 = jsonwebtoken::decode_header(assertion)
            .map(|h| h.alg == Algorithm::RS256)
            .unwrap_or(false);

        if !body.contains("grant_type=") || !signed_rs256 {
            return (StatusCode::BAD_REQUEST, Json(serde_json::json!({ "error": "invalid_grant" })));
        }

        token_requests.fetch_add(1, Ordering::SeqCst);
        (
            StatusCode::OK,
            Json(serde_json::json!({ "access_token": ACCESS_TOKEN, "expires_in": 3600 })),
        )
    }

    async fn deliver(headers: HeaderMap, Json(body): Json<serde_json::Value>) -> StatusCode {
        let bearer = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if bearer != format!("Bearer {ACCESS_TOKEN}") {
            return StatusCode::UNAUTHORIZED;
        }

        let token = body["message"]["token"].as_str().unwrap_or_default();
        if token.starts_with("good") && body["message"]["notification"]["title"] == "Exam schedule" {
            StatusCode::OK
        } else {
            StatusCode::NOT_FOUND
        }
    }

    async fn mock_fcm() -> (String, Arc<AtomicUsize>) {
        let token_requests = Arc::new(AtomicUsize::new(0));
        let app = Router::new()
            .route("/token", post(issue_token))
            .route("/denied", post(|| async { StatusCode::UNAUTHORIZED }))
            .route("/v1/projects/*rest", post(deliver))
            .with_state(token_requests.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}"), token_requests)
    }

    #[tokio::test]
    async fn fcm_counts_each_token_and_reuses_access_token() {
        let (url, token_requests) = mock_fcm().await;
        let client = FcmClient::new(credentials(), 2)
            .unwrap()
            .with_endpoints(format!("{url}/token"), url.clone());

        let report = client
            .send_multicast(&message(&["good-1", "stale-1", "good-2"]))
            .await
            .unwrap();
        assert_eq!(report, MulticastReport { success_count: 2, failure_count: 1 });

        let report = client.send_multicast(&message(&["good-3"])).await.unwrap();
        assert_eq!(report, MulticastReport { success_count: 1, failure_count: 0 });

        assert_eq!(token_requests.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn fcm_empty_batch_skips_token_exchange() {
        let (url, token_requests) = mock_fcm().await;
        let client = FcmClient::new(credentials(), 2)
            .unwrap()
            .with_endpoints(format!("{url}/token"), url.clone());

        let report = client.send_multicast(&message(&[])).await.unwrap();
        assert_eq!(report, MulticastReport::default());
        assert_eq!(token_requests.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn fcm_refused_token_exchange_fails_the_whole_send() {
        let (url, _) = mock_fcm().await;
        let client = FcmClient::new(credentials(), 2)
            .unwrap()
            .with_endpoints(format!("{url}/denied"), url.clone());

        let err = client.send_multicast(&message(&["good-1"])).await.unwrap_err();
        assert!(matches!(err, PushError::Auth(_)));
    }
}
