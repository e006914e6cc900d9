//! Response bodies as the mobile app reads them. Fields the app never shows
//! are left out; unknown fields are ignored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_pages: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub pagination: PageInfo,
}

impl<T> Page<T> {
    pub fn has_more(&self) -> bool {
        self.pagination.page < self.pagination.total_pages
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataList<T> {
    pub data: Vec<T>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: Uuid,
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub user: SessionUser,
    pub token: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Banner {
    pub id: Uuid,
    pub title: String,
    pub image_url: String,
    pub link_url: Option<String>,
    pub order: i32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsHeadline {
    pub id: Uuid,
    pub title: String,
    pub image_url: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTeaser {
    pub id: Uuid,
    pub title: String,
    pub image_url: Option<String>,
    pub start_date: DateTime<Utc>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuickLink {
    pub id: String,
    pub title: String,
    pub url: String,
    pub icon: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Homepage {
    pub banners: Vec<Banner>,
    pub latest_news: Vec<NewsHeadline>,
    pub upcoming_events: Vec<EventTeaser>,
    pub quick_links: Vec<QuickLink>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct News {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub views: i32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub category: Option<String>,
    pub views: i32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub head_name: Option<String>,
    pub head_email: Option<String>,
    pub head_phone: Option<String>,
    #[serde(default)]
    pub course_count: i64,
    #[serde(default)]
    pub faculty_count: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DepartmentDetail {
    #[serde(flatten)]
    pub department: Department,
    pub courses: Vec<Course>,
    pub faculty: Vec<FacultyMember>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub department_id: Uuid,
    pub level: String,
    pub duration: Option<String>,
    pub description: Option<String>,
    pub eligibility: Option<String>,
    pub syllabus_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacultyMember {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub designation: String,
    pub department_id: Uuid,
    pub image_url: Option<String>,
    pub bio: Option<String>,
    pub qualifications: Option<String>,
    pub research_areas: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementStat {
    pub year: i32,
    pub students_placed: i32,
    pub average_package: Option<f64>,
    pub highest_package: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    pub id: Uuid,
    pub company_name: String,
    pub logo_url: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    #[serde(default)]
    pub stats: Vec<PlacementStat>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Examination {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub exam_date: Option<DateTime<Utc>>,
    pub timetable_url: Option<String>,
    pub hall_ticket_url: Option<String>,
    pub results_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MediaType {
    Image,
    Video,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryItem {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub album_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Circular {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub document_url: Option<String>,
    pub category: Option<String>,
    pub target_audience: String,
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    #[serde(rename = "type")]
    pub notification_type: String,
    pub target_audience: String,
    pub data: Option<serde_json::Value>,
    pub sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn department_detail_reads_flattened_body() {
        let body = serde_json::json!({
            "id": "6f9619ff-8b86-d011-b42d-00c04fc964ff",
            "name": "Computer Science",
            "code": "CSE",
            "description": null,
            "imageUrl": null,
            "headName": "Dr. Rao",
            "headEmail": null,
            "headPhone": null,
            "isActive": true,
            "courses": [],
            "faculty": []
        });
        let detail: DepartmentDetail = serde_json::from_value(body).unwrap();
        assert_eq!(detail.department.code, "CSE");
        assert_eq!(detail.department.course_count, 0);
    }

    #[test]
    fn page_knows_when_more_remain() {
        let page: Page<Banner> = serde_json::from_value(serde_json::json!({
            "data": [],
            "pagination": { "page": 1, "limit": 10, "total": 11, "totalPages": 2 }
        }))
        .unwrap();
        assert!(page.has_more());
    }
}
