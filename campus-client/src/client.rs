use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ClientError, ClientResult};
use crate::session::{Session, SessionError, SessionStore};
use crate::types::{
    Circular, Course, DataList, Department, DepartmentDetail, Event, Examination, FacultyMember,
    GalleryItem, Homepage, LoginResponse, News, Notification, Page, Placement,
};

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpLogin {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    pub otp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fcm_token: Option<String>,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct ListParams<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    page: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    search: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    published: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    upcoming: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    department_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    level: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    album_id: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Typed access to the campus API for the mobile app.
///
/// Every request carries the stored session token when there is one. Any 401
/// clears the stored session before the error is returned.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    session: Arc<dyn SessionStore>,
}

impl ApiClient {
    pub fn new(base_url: &str, session: Arc<dyn SessionStore>) -> ClientResult<Self> {
        let http = Client::builder().timeout(Duration::from_secs(15)).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn current_session(&self) -> ClientResult<Option<Session>> {
        self.stored_session()
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.stored_session(), Ok(Some(_)))
    }

    /// An unreadable stored session is discarded and treated as signed out.
    fn stored_session(&self) -> ClientResult<Option<Session>> {
        match self.session.load() {
            Err(SessionError::Format(e)) => {
                tracing::warn!(error = %e, "discarding unreadable stored session");
                self.session.clear()?;
                Ok(None)
            }
            other => Ok(other?),
        }
    }

    pub fn logout(&self) -> ClientResult<()> {
        self.session.clear()?;
        tracing::debug!("session cleared on logout");
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ClientResult<T> {
        let request = match self.stored_session()? {
            Some(session) => request.bearer_auth(session.token),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|body| body.error)
            .unwrap_or(text);

        if status == StatusCode::UNAUTHORIZED {
            self.session.clear()?;
            tracing::info!(error = %message, "session rejected by server, cleared");
            return Err(ClientError::Unauthorized(message));
        }

        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, params: &ListParams<'_>) -> ClientResult<T> {
        self.send(self.http.get(self.url(path)).query(params)).await
    }

    /// Exchange an OTP for a session and store it.
    pub async fn verify_otp(&self, login: &OtpLogin) -> ClientResult<LoginResponse> {
        let response: LoginResponse = self
            .send(self.http.post(self.url("/api/auth/verify-otp")).json(login))
            .await?;

        self.session.save(&Session {
            token: response.token.clone(),
            user: response.user.clone(),
        })?;
        tracing::debug!(user_id = %response.user.id, "session stored");
        Ok(response)
    }

    pub async fn homepage(&self) -> ClientResult<Homepage> {
        self.get("/api/homepage", &ListParams::default()).await
    }

    pub async fn news(&self, page: u64, limit: u64, search: Option<&str>) -> ClientResult<Page<News>> {
        let params = ListParams {
            page: Some(page),
            limit: Some(limit),
            search: search.filter(|s| !s.is_empty()),
            published: Some(true),
            ..Default::default()
        };
        self.get("/api/news", &params).await
    }

    pub async fn news_detail(&self, id: Uuid) -> ClientResult<News> {
        self.get(&format!("/api/news/{id}"), &ListParams::default()).await
    }

    pub async fn events(&self, page: u64, limit: u64, upcoming: bool) -> ClientResult<Page<Event>> {
        let params = ListParams {
            page: Some(page),
            limit: Some(limit),
            published: Some(true),
            upcoming: Some(upcoming),
            ..Default::default()
        };
        self.get("/api/events", &params).await
    }

    pub async fn event_detail(&self, id: Uuid) -> ClientResult<Event> {
        self.get(&format!("/api/events/{id}"), &ListParams::default()).await
    }

    pub async fn departments(&self) -> ClientResult<Vec<Department>> {
        let params = ListParams {
            active: Some(true),
            ..Default::default()
        };
        let list: DataList<Department> = self.get("/api/departments", &params).await?;
        Ok(list.data)
    }

    pub async fn department_detail(&self, id: Uuid) -> ClientResult<DepartmentDetail> {
        self.get(&format!("/api/departments/{id}"), &ListParams::default()).await
    }

    pub async fn courses(&self, department_id: Option<Uuid>, level: Option<&str>) -> ClientResult<Vec<Course>> {
        let params = ListParams {
            active: Some(true),
            department_id,
            level,
            ..Default::default()
        };
        let list: DataList<Course> = self.get("/api/courses", &params).await?;
        Ok(list.data)
    }

    pub async fn faculty(&self, department_id: Option<Uuid>) -> ClientResult<Vec<FacultyMember>> {
        let params = ListParams {
            active: Some(true),
            department_id,
            ..Default::default()
        };
        let list: DataList<FacultyMember> = self.get("/api/faculty", &params).await?;
        Ok(list.data)
    }

    pub async fn gallery(&self, page: u64, limit: u64, album_id: Option<&str>) -> ClientResult<Page<GalleryItem>> {
        let params = ListParams {
            page: Some(page),
            limit: Some(limit),
            published: Some(true),
            album_id,
            ..Default::default()
        };
        self.get("/api/gallery", &params).await
    }

    pub async fn placements(&self) -> ClientResult<Vec<Placement>> {
        let params = ListParams {
            active: Some(true),
            ..Default::default()
        };
        let list: DataList<Placement> = self.get("/api/placements", &params).await?;
        Ok(list.data)
    }

    pub async fn examinations(&self, upcoming: bool) -> ClientResult<Vec<Examination>> {
        let params = ListParams {
            published: Some(true),
            upcoming: Some(upcoming),
            ..Default::default()
        };
        let list: DataList<Examination> = self.get("/api/exams", &params).await?;
        Ok(list.data)
    }

    pub async fn circulars(&self, page: u64, limit: u64) -> ClientResult<Page<Circular>> {
        let params = ListParams {
            page: Some(page),
            limit: Some(limit),
            published: Some(true),
            ..Default::default()
        };
        self.get("/api/circulars", &params).await
    }

    pub async fn notifications(&self, page: u64, limit: u64) -> ClientResult<Page<Notification>> {
        let params = ListParams {
            page: Some(page),
            limit: Some(limit),
            ..Default::default()
        };
        self.get("/api/notifications", &params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{FileSessionStore, MemorySessionStore};
    use crate::types::SessionUser;
    use axum::extract::Query;
    use axum::http::{header, HeaderMap, StatusCode as AxumStatus};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use std::collections::HashMap;

    const USER_ID: &str = "6f9619ff-8b86-d011-b42d-00c04fc964ff";

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn stored_session(token: &str) -> Session {
        Session {
            token: token.into(),
            user: SessionUser {
                id: USER_ID.parse().unwrap(),
                email: Some("student@campus.edu".into()),
                mobile: None,
                name: None,
            },
        }
    }

    fn fake_api() -> Router {
        Router::new()
            .route(
                "/api/auth/verify-otp",
                post(|Json(body): Json<serde_json::Value>| async move {
                    if body["otp"] != "123456" {
                        return (AxumStatus::UNAUTHORIZED, Json(serde_json::json!({ "error": "Invalid OTP" })));
                    }
                    (
                        AxumStatus::OK,
                        Json(serde_json::json!({
                            "user": { "id": USER_ID, "email": body["email"], "mobile": null, "name": null },
                            "token": "fresh-token"
                        })),
                    )
                }),
            )
            .route(
                "/api/notifications",
                get(|headers: HeaderMap| async move {
                    let authorized = headers
                        .get(header::AUTHORIZATION)
                        .and_then(|v| v.to_str().ok())
                        == Some("Bearer fresh-token");
                    if !authorized {
                        return (
                            AxumStatus::UNAUTHORIZED,
                            Json(serde_json::json!({ "error": "Unauthorized - Invalid token" })),
                        );
                    }
                    (
                        AxumStatus::OK,
                        Json(serde_json::json!({
                            "data": [],
                            "pagination": { "page": 1, "limit": 20, "total": 0, "totalPages": 0 }
                        })),
                    )
                }),
            )
            .route(
                "/api/news",
                get(|Query(params): Query<HashMap<String, String>>| async move {
                    Json(serde_json::json!({
                        "data": [{
                            "id": USER_ID,
                            "title": format!("search={}", params.get("search").cloned().unwrap_or_default()),
                            "content": format!("page={} published={}", params["page"], params["published"]),
                            "imageUrl": null,
                            "category": null,
                            "publishedAt": "2024-06-01T10:00:00Z",
                            "views": 4
                        }],
                        "pagination": { "page": 2, "limit": 10, "total": 11, "totalPages": 2 }
                    }))
                }),
            )
            .route(
                "/api/news/:id",
                get(|| async { (AxumStatus::NOT_FOUND, Json(serde_json::json!({ "error": "News not found" }))) }),
            )
    }

    #[tokio::test]
    async fn verify_otp_stores_session_and_attaches_token() {
        let base = serve(fake_api()).await;
        let store = Arc::new(MemorySessionStore::default());
        let client = ApiClient::new(&base, store.clone()).unwrap();

        let login = OtpLogin {
            email: Some("student@campus.edu".into()),
            otp: "123456".into(),
            ..Default::default()
        };
        let response = client.verify_otp(&login).await.unwrap();
        assert_eq!(response.token, "fresh-token");
        assert_eq!(store.load().unwrap().unwrap().token, "fresh-token");

        let page = client.notifications(1, 20).await.unwrap();
        assert!(page.data.is_empty());
        assert!(client.is_authenticated());
    }

    #[tokio::test]
    async fn unauthorized_response_clears_session() {
        let base = serve(fake_api()).await;
        let store = Arc::new(MemorySessionStore::with_session(stored_session("stale-token")));
        let client = ApiClient::new(&base, store.clone()).unwrap();

        let err = client.notifications(1, 20).await.unwrap_err();
        assert!(matches!(err, ClientError::Unauthorized(ref m) if m == "Unauthorized - Invalid token"));
        assert_eq!(store.load().unwrap(), None);
    }

    #[tokio::test]
    async fn rejected_otp_leaves_no_session() {
        let base = serve(fake_api()).await;
        let store = Arc::new(MemorySessionStore::default());
        let client = ApiClient::new(&base, store.clone()).unwrap();

        let login = OtpLogin {
            mobile: Some("+911234567890".into()),
            otp: "000000".into(),
            ..Default::default()
        };
        assert!(matches!(client.verify_otp(&login).await, Err(ClientError::Unauthorized(_))));
        assert!(!client.is_authenticated());
    }

    #[tokio::test]
    async fn list_sends_filters_as_query() {
        let base = serve(fake_api()).await;
        let client = ApiClient::new(&format!("{base}/"), Arc::new(MemorySessionStore::default())).unwrap();

        let page = client.news(2, 10, Some("exam")).await.unwrap();
        assert_eq!(page.data[0].title, "search=exam");
        assert_eq!(page.data[0].content, "page=2 published=true");
        assert!(!page.has_more());
    }

    #[tokio::test]
    async fn api_errors_carry_status_and_message() {
        let base = serve(fake_api()).await;
        let store = Arc::new(MemorySessionStore::with_session(stored_session("fresh-token")));
        let client = ApiClient::new(&base, store.clone()).unwrap();

        let err = client.news_detail(Uuid::new_v4()).await.unwrap_err();
        match err {
            ClientError::Api { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "News not found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(store.load().unwrap().is_some());
    }

    #[tokio::test]
    async fn corrupt_session_file_is_discarded() {
        let base = serve(fake_api()).await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, b"{ not json").unwrap();

        let client = ApiClient::new(&base, Arc::new(FileSessionStore::new(&path))).unwrap();

        let page = client.news(1, 10, None).await.unwrap();
        assert_eq!(page.data.len(), 1);
        assert!(!path.exists());
        assert!(!client.is_authenticated());
        assert_eq!(client.current_session().unwrap(), None);
    }
}
