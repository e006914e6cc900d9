use axum::extract::State;
use axum::Json;
use chrono::Utc;
use diesel::prelude::*;
use serde::Serialize;

use campus_shared::clients::db::run_blocking;
use campus_shared::errors::AppResult;

use crate::models::{Banner, EventTeaser, NewsHeadline};
use crate::schema::{banners, events, news};
use crate::AppState;

const SECTION_LIMIT: i64 = 5;

#[derive(Debug, Serialize, PartialEq)]
pub struct QuickLink {
    pub id: &'static str,
    pub title: &'static str,
    pub url: &'static str,
    pub icon: &'static str,
}

pub static QUICK_LINKS: [QuickLink; 6] = [
    QuickLink { id: "admissions", title: "Admissions", url: "/admissions", icon: "school" },
    QuickLink { id: "departments", title: "Departments", url: "/departments", icon: "business" },
    QuickLink { id: "examinations", title: "Examinations", url: "/exams", icon: "assignment" },
    QuickLink { id: "placements", title: "Placements", url: "/placements", icon: "work" },
    QuickLink { id: "gallery", title: "Gallery", url: "/gallery", icon: "photo_library" },
    QuickLink { id: "contact", title: "Contact", url: "/contact", icon: "phone" },
];

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomepageResponse {
    pub banners: Vec<Banner>,
    pub latest_news: Vec<NewsHeadline>,
    pub upcoming_events: Vec<EventTeaser>,
    pub quick_links: &'static [QuickLink],
}

/// GET /api/homepage
pub async fn get_homepage(State(state): State<AppState>) -> AppResult<Json<HomepageResponse>> {
    let banners_query = run_blocking(&state.db, |conn| {
        Ok(banners::table
            .filter(banners::is_active.eq(true))
            .order(banners::sort_order.asc())
            .limit(SECTION_LIMIT)
            .load::<Banner>(conn)?)
    });

    let news_query = run_blocking(&state.db, |conn| {
        Ok(news::table
            .filter(news::is_published.eq(true))
            .order(news::published_at.desc())
            .select((news::id, news::title, news::image_url, news::published_at, news::category))
            .limit(SECTION_LIMIT)
            .load::<NewsHeadline>(conn)?)
    });

    let now = Utc::now();
    let events_query = run_blocking(&state.db, move |conn| {
        Ok(events::table
            .filter(events::is_published.eq(true))
            .filter(events::start_date.ge(now))
            .order(events::start_date.asc())
            .select((events::id, events::title, events::image_url, events::start_date, events::location))
            .limit(SECTION_LIMIT)
            .load::<EventTeaser>(conn)?)
    });

    let (banners, latest_news, upcoming_events) =
        tokio::try_join!(banners_query, news_query, events_query)?;

    Ok(Json(HomepageResponse {
        banners,
        latest_news,
        upcoming_events,
        quick_links: &QUICK_LINKS,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quick_links_are_fixed() {
        let titles: Vec<_> = QUICK_LINKS.iter().map(|l| l.title).collect();
        assert_eq!(
            titles,
            ["Admissions", "Departments", "Examinations", "Placements", "Gallery", "Contact"]
        );
    }

    #[test]
    fn response_uses_camel_case_sections() {
        let body = HomepageResponse {
            banners: vec![],
            latest_news: vec![],
            upcoming_events: vec![],
            quick_links: &QUICK_LINKS,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json["latestNews"].is_array());
        assert!(json["upcomingEvents"].is_array());
        assert_eq!(json["quickLinks"].as_array().unwrap().len(), 6);
        assert_eq!(json["quickLinks"][0]["url"], "/admissions");
    }
}
