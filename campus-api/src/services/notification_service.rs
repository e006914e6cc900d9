use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use campus_shared::clients::db::{run_blocking, DbPool};
use campus_shared::clients::push::{MulticastReport, PushMessage, PushProvider};
use campus_shared::errors::{AppError, AppResult};
use campus_shared::middleware::record_push_delivery;

use crate::models::{NewNotification, Notification};
use crate::schema::{app_users, notifications};

pub const DEFAULT_NOTIFICATION_TYPE: &str = "GENERAL";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Audience {
    All,
    Department,
    User,
}

impl Audience {
    pub fn as_str(&self) -> &'static str {
        match self {
            Audience::All => "ALL",
            Audience::Department => "DEPARTMENT",
            Audience::User => "USER",
        }
    }
}

/// Who a notification is addressed to, with the id the audience needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    All,
    Department(Uuid),
    User(Uuid),
}

impl Target {
    /// `ALL` when no audience is given. `USER` needs a user id and
    /// `DEPARTMENT` a department id.
    pub fn resolve(
        audience: Option<Audience>,
        department_id: Option<Uuid>,
        user_id: Option<Uuid>,
    ) -> AppResult<Self> {
        match audience.unwrap_or(Audience::All) {
            Audience::All => Ok(Target::All),
            Audience::Department => department_id
                .map(Target::Department)
                .ok_or_else(|| AppError::bad_request("departmentId is required for DEPARTMENT notifications")),
            Audience::User => user_id
                .map(Target::User)
                .ok_or_else(|| AppError::bad_request("userId is required for USER notifications")),
        }
    }

    pub fn audience(&self) -> Audience {
        match self {
            Target::All => Audience::All,
            Target::Department(_) => Audience::Department,
            Target::User(_) => Audience::User,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NotificationDraft {
    pub title: String,
    pub body: String,
    pub notification_type: String,
    pub target: Target,
    pub data: Option<serde_json::Value>,
    pub created_by: Uuid,
}

impl NotificationDraft {
    fn to_insertable(&self) -> NewNotification {
        let (department_id, user_id) = match self.target {
            Target::All => (None, None),
            Target::Department(id) => (Some(id), None),
            Target::User(id) => (None, Some(id)),
        };

        NewNotification {
            title: self.title.clone(),
            body: self.body.clone(),
            notification_type: self.notification_type.clone(),
            target_audience: self.target.audience().as_str().to_string(),
            department_id,
            user_id,
            data: self.data.clone(),
            created_by: self.created_by,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryOutcome {
    pub success_count: i32,
    pub failure_count: i32,
    pub sent_at: DateTime<Utc>,
}

/// Persistence the dispatcher needs.
#[async_trait::async_trait]
pub trait NotificationStore: Send + Sync {
    async fn insert(&self, draft: &NotificationDraft) -> AppResult<Notification>;
    async fn device_tokens(&self, target: &Target) -> AppResult<Vec<String>>;
    async fn mark_sent(&self, id: Uuid, outcome: &DeliveryOutcome) -> AppResult<Notification>;
}

pub struct PgNotificationStore {
    pool: DbPool,
}

impl PgNotificationStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl NotificationStore for PgNotificationStore {
    async fn insert(&self, draft: &NotificationDraft) -> AppResult<Notification> {
        let row = draft.to_insertable();
        run_blocking(&self.pool, move |conn| {
            Ok(diesel::insert_into(notifications::table)
                .values(&row)
                .get_result::<Notification>(conn)?)
        })
        .await
    }

    async fn device_tokens(&self, target: &Target) -> AppResult<Vec<String>> {
        let target = *target;
        run_blocking(&self.pool, move |conn| {
            let tokens: Vec<String> = match target {
                Target::User(user_id) => app_users::table
                    .filter(app_users::id.eq(user_id))
                    .filter(app_users::is_active.eq(true))
                    .select(app_users::fcm_token)
                    .first::<Option<String>>(conn)
                    .optional()?
                    .flatten()
                    .into_iter()
                    .collect(),
                Target::All | Target::Department(_) => {
                    if let Target::Department(department_id) = target {
                        // App users carry no department, so department targeting reaches everyone.
                        tracing::warn!(
                            department_id = %department_id,
                            "department targeting not supported, sending to all users"
                        );
                    }
                    app_users::table
                        .filter(app_users::is_active.eq(true))
                        .filter(app_users::fcm_token.is_not_null())
                        .select(app_users::fcm_token)
                        .load::<Option<String>>(conn)?
                        .into_iter()
                        .flatten()
                        .filter(|t| !t.is_empty())
                        .collect()
                }
            };
            Ok(tokens)
        })
        .await
    }

    async fn mark_sent(&self, id: Uuid, outcome: &DeliveryOutcome) -> AppResult<Notification> {
        let outcome = *outcome;
        run_blocking(&self.pool, move |conn| {
            Ok(diesel::update(notifications::table.find(id))
                .set((
                    notifications::is_sent.eq(true),
                    notifications::sent_at.eq(Some(outcome.sent_at)),
                    notifications::success_count.eq(outcome.success_count),
                    notifications::failure_count.eq(outcome.failure_count),
                ))
                .get_result::<Notification>(conn)?)
        })
        .await
    }
}

/// Push payload `data`: top-level fields of a JSON object, with non-string
/// values rendered as JSON text.
pub fn push_data(data: Option<&serde_json::Value>) -> BTreeMap<String, String> {
    match data {
        Some(serde_json::Value::Object(map)) => map
            .iter()
            .map(|(key, value)| {
                let value = match value {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (key.clone(), value)
            })
            .collect(),
        _ => BTreeMap::new(),
    }
}

/// Persist a notification, push it to the resolved device tokens and record
/// the attempt.
///
/// Only the initial insert can fail the call. Token resolution, the provider
/// call and the final status update are logged and swallowed; the row is
/// marked sent even when nothing was delivered.
pub async fn dispatch(
    store: &dyn NotificationStore,
    push: &dyn PushProvider,
    draft: NotificationDraft,
) -> AppResult<Notification> {
    let record = store.insert(&draft).await?;

    tracing::info!(
        notification_id = %record.id,
        audience = draft.target.audience().as_str(),
        created_by = %draft.created_by,
        "notification created"
    );

    let report = deliver(store, push, &draft, record.id).await;
    let outcome = DeliveryOutcome {
        success_count: i32::try_from(report.success_count).unwrap_or(i32::MAX),
        failure_count: i32::try_from(report.failure_count).unwrap_or(i32::MAX),
        sent_at: Utc::now(),
    };

    match store.mark_sent(record.id, &outcome).await {
        Ok(updated) => Ok(updated),
        Err(e) => {
            tracing::error!(notification_id = %record.id, error = %e, "failed to mark notification sent");
            Ok(record)
        }
    }
}

async fn deliver(
    store: &dyn NotificationStore,
    push: &dyn PushProvider,
    draft: &NotificationDraft,
    notification_id: Uuid,
) -> MulticastReport {
    let tokens = match store.device_tokens(&draft.target).await {
        Ok(tokens) => tokens,
        Err(e) => {
            tracing::error!(notification_id = %notification_id, error = %e, "failed to resolve device tokens");
            return MulticastReport::default();
        }
    };

    if tokens.is_empty() {
        tracing::info!(notification_id = %notification_id, "no device tokens for notification");
        return MulticastReport::default();
    }

    let token_count = tokens.len();
    let message = PushMessage {
        tokens,
        title: draft.title.clone(),
        body: draft.body.clone(),
        data: push_data(draft.data.as_ref()),
    };

    let report = match push.send_multicast(&message).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!(notification_id = %notification_id, error = %e, "push delivery failed");
            MulticastReport {
                success_count: 0,
                failure_count: token_count,
            }
        }
    };

    record_push_delivery(report.success_count, report.failure_count);

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use campus_shared::clients::push::{DisabledPush, PushError};

    /// In-memory store: a fixed token table keyed by target.
    struct MemoryStore {
        rows: Mutex<Vec<Notification>>,
        all_tokens: Vec<String>,
        user_tokens: Vec<(Uuid, String)>,
        fail_token_lookup: bool,
    }

    impl MemoryStore {
        fn with_tokens(tokens: &[&str]) -> Self {
            Self {
                rows: Mutex::new(Vec::new()),
                all_tokens: tokens.iter().map(|t| t.to_string()).collect(),
                user_tokens: Vec::new(),
                fail_token_lookup: false,
            }
        }

        fn stored(&self, id: Uuid) -> Notification {
            self.rows.lock().unwrap().iter().find(|n| n.id == id).cloned().unwrap()
        }
    }

    #[async_trait::async_trait]
    impl NotificationStore for MemoryStore {
        async fn insert(&self, draft: &NotificationDraft) -> AppResult<Notification> {
            let row = draft.to_insertable();
            let record = Notification {
                id: Uuid::new_v4(),
                title: row.title,
                body: row.body,
                notification_type: row.notification_type,
                target_audience: row.target_audience,
                department_id: row.department_id,
                user_id: row.user_id,
                data: row.data,
                is_sent: false,
                sent_at: None,
                success_count: 0,
                failure_count: 0,
                created_by: row.created_by,
                created_at: Utc::now(),
            };
            self.rows.lock().unwrap().push(record.clone());
            Ok(record)
        }

        async fn device_tokens(&self, target: &Target) -> AppResult<Vec<String>> {
            if self.fail_token_lookup {
                return Err(AppError::internal("token lookup failed"));
            }
            Ok(match target {
                Target::All | Target::Department(_) => self.all_tokens.clone(),
                Target::User(id) => self
                    .user_tokens
                    .iter()
                    .filter(|(uid, _)| uid == id)
                    .map(|(_, t)| t.clone())
                    .collect(),
            })
        }

        async fn mark_sent(&self, id: Uuid, outcome: &DeliveryOutcome) -> AppResult<Notification> {
            let mut rows = self.rows.lock().unwrap();
            let row = rows.iter_mut().find(|n| n.id == id).ok_or_else(|| AppError::not_found("missing"))?;
            row.is_sent = true;
            row.sent_at = Some(outcome.sent_at);
            row.success_count = outcome.success_count;
            row.failure_count = outcome.failure_count;
            Ok(row.clone())
        }
    }

    /// Records every multicast; accepts all tokens except those starting
    /// with `bad`.
    #[derive(Default)]
    struct RecordingPush {
        calls: Mutex<Vec<PushMessage>>,
    }

    #[async_trait::async_trait]
    impl PushProvider for RecordingPush {
        async fn send_multicast(&self, message: &PushMessage) -> Result<MulticastReport, PushError> {
            self.calls.lock().unwrap().push(message.clone());
            let failure_count = message.tokens.iter().filter(|t| t.starts_with("bad")).count();
            Ok(MulticastReport {
                success_count: message.tokens.len() - failure_count,
                failure_count,
            })
        }
    }

    struct FailingPush;

    #[async_trait::async_trait]
    impl PushProvider for FailingPush {
        async fn send_multicast(&self, _message: &PushMessage) -> Result<MulticastReport, PushError> {
            Err(PushError::Auth("invalid_grant".into()))
        }
    }

    fn draft(target: Target) -> NotificationDraft {
        NotificationDraft {
            title: "Fee deadline".into(),
            body: "Pay by Friday".into(),
            notification_type: DEFAULT_NOTIFICATION_TYPE.into(),
            target,
            data: Some(serde_json::json!({ "screen": "circulars", "priority": 2 })),
            created_by: Uuid::new_v4(),
        }
    }

    #[tokio::test]
    async fn delivers_one_batch_and_records_counts() {
        let store = MemoryStore::with_tokens(&["t1", "t2", "bad-t3"]);
        let push = RecordingPush::default();

        let sent = dispatch(&store, &push, draft(Target::All)).await.unwrap();

        assert!(sent.is_sent);
        assert!(sent.sent_at.is_some());
        assert_eq!((sent.success_count, sent.failure_count), (2, 1));

        let calls = push.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].tokens, vec!["t1", "t2", "bad-t3"]);
        assert_eq!(calls[0].data.get("screen").map(String::as_str), Some("circulars"));
        assert_eq!(calls[0].data.get("priority").map(String::as_str), Some("2"));
    }

    #[tokio::test]
    async fn provider_failure_still_marks_sent() {
        let store = MemoryStore::with_tokens(&["t1", "t2"]);

        let sent = dispatch(&store, &FailingPush, draft(Target::All)).await.unwrap();

        assert!(sent.is_sent);
        assert_eq!((sent.success_count, sent.failure_count), (0, 2));
        assert!(store.stored(sent.id).is_sent);
    }

    #[tokio::test]
    async fn zero_tokens_skips_provider_but_marks_sent() {
        let store = MemoryStore::with_tokens(&[]);
        let push = RecordingPush::default();

        let sent = dispatch(&store, &push, draft(Target::All)).await.unwrap();

        assert!(sent.is_sent);
        assert!(push.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn token_lookup_failure_is_swallowed() {
        let mut store = MemoryStore::with_tokens(&["t1"]);
        store.fail_token_lookup = true;
        let push = RecordingPush::default();

        let sent = dispatch(&store, &push, draft(Target::All)).await.unwrap();

        assert!(sent.is_sent);
        assert!(push.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn user_target_reaches_only_that_user() {
        let user_id = Uuid::new_v4();
        let mut store = MemoryStore::with_tokens(&["everyone"]);
        store.user_tokens = vec![(user_id, "mine".into()), (Uuid::new_v4(), "theirs".into())];
        let push = RecordingPush::default();

        let sent = dispatch(&store, &push, draft(Target::User(user_id))).await.unwrap();

        assert_eq!(sent.target_audience, "USER");
        assert_eq!(sent.user_id, Some(user_id));
        assert_eq!(push.calls.lock().unwrap()[0].tokens, vec!["mine"]);
    }

    #[tokio::test]
    async fn department_target_falls_back_to_everyone() {
        let department_id = Uuid::new_v4();
        let store = MemoryStore::with_tokens(&["a", "b"]);
        let push = RecordingPush::default();

        let sent = dispatch(&store, &push, draft(Target::Department(department_id))).await.unwrap();

        assert_eq!(sent.department_id, Some(department_id));
        assert_eq!(push.calls.lock().unwrap()[0].tokens.len(), 2);
    }

    #[tokio::test]
    async fn disabled_provider_counts_failures() {
        let store = MemoryStore::with_tokens(&["a", "b", "c"]);

        let sent = dispatch(&store, &DisabledPush, draft(Target::All)).await.unwrap();

        assert!(sent.is_sent);
        assert_eq!((sent.success_count, sent.failure_count), (0, 3));
    }

    #[test]
    fn target_resolution() {
        let id = Uuid::new_v4();
        assert_eq!(Target::resolve(None, None, None).unwrap(), Target::All);
        assert_eq!(Target::resolve(Some(Audience::User), None, Some(id)).unwrap(), Target::User(id));
        assert_eq!(
            Target::resolve(Some(Audience::Department), Some(id), None).unwrap(),
            Target::Department(id)
        );
        assert!(Target::resolve(Some(Audience::User), None, None).is_err());
        assert!(Target::resolve(Some(Audience::Department), None, Some(id)).is_err());
    }

    #[test]
    fn push_data_ignores_non_objects() {
        assert!(push_data(None).is_empty());
        assert!(push_data(Some(&serde_json::json!(["a"]))).is_empty());
        let data = push_data(Some(&serde_json::json!({ "id": "n1", "urgent": true })));
        assert_eq!(data["id"], "n1");
        assert_eq!(data["urgent"], "true");
    }
}
