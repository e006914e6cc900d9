use chrono::{DateTime, Utc};

/// `publishedAt` for a newly created item: stamped only when it is created
/// published, preferring an explicit value.
pub fn published_at_on_create(
    is_published: bool,
    explicit: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    is_published.then(|| explicit.unwrap_or(now))
}

/// `publishedAt` to write on update, `None` meaning leave the column alone.
///
/// Setting `isPublished=true` stamps `now` unless the body carries its own
/// `publishedAt`; an explicit `publishedAt` is always honoured.
pub fn published_at_on_update(
    is_published: Option<bool>,
    explicit: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    match (is_published, explicit) {
        (_, Some(at)) => Some(at),
        (Some(true), None) => Some(now),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn create_published_stamps_now() {
        let now = Utc::now();
        assert_eq!(published_at_on_create(true, None, now), Some(now));
    }

    #[test]
    fn create_unpublished_stays_null() {
        let now = Utc::now();
        assert_eq!(published_at_on_create(false, None, now), None);
        assert_eq!(published_at_on_create(false, Some(now - Duration::days(1)), now), None);
    }

    #[test]
    fn create_published_keeps_explicit_date() {
        let now = Utc::now();
        let earlier = now - Duration::days(3);
        assert_eq!(published_at_on_create(true, Some(earlier), now), Some(earlier));
    }

    #[test]
    fn update_publishing_stamps_unless_supplied() {
        let now = Utc::now();
        let earlier = now - Duration::hours(5);
        assert_eq!(published_at_on_update(Some(true), None, now), Some(now));
        assert_eq!(published_at_on_update(Some(true), Some(earlier), now), Some(earlier));
    }

    #[test]
    fn update_without_publishing_leaves_column() {
        let now = Utc::now();
        assert_eq!(published_at_on_update(None, None, now), None);
        assert_eq!(published_at_on_update(Some(false), None, now), None);
    }
}
