use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::schema::{
    admin_users, app_users, banners, circulars, courses, departments, events, examinations,
    faculty, gallery, news, notifications, placement_stats, placements,
};

// --- Admin users ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = admin_users)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = admin_users)]
pub struct NewAdminUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
}

// --- App users ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = app_users)]
#[serde(rename_all = "camelCase")]
pub struct AppUser {
    pub id: Uuid,
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub name: Option<String>,
    #[serde(skip_serializing)]
    pub fcm_token: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = app_users)]
pub struct NewAppUser {
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub fcm_token: Option<String>,
}

// --- Departments ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = departments)]
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
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = departments)]
pub struct NewDepartment {
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub head_name: Option<String>,
    pub head_email: Option<String>,
    pub head_phone: Option<String>,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = departments)]
pub struct DepartmentChanges {
    pub name: Option<String>,
    pub code: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub head_name: Option<String>,
    pub head_email: Option<String>,
    pub head_phone: Option<String>,
    pub is_active: Option<bool>,
    pub updated_at: DateTime<Utc>,
}

// --- Courses ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = courses)]
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
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = courses)]
pub struct NewCourse {
    pub name: String,
    pub code: String,
    pub department_id: Uuid,
    pub level: String,
    pub duration: Option<String>,
    pub description: Option<String>,
    pub eligibility: Option<String>,
    pub syllabus_url: Option<String>,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = courses)]
pub struct CourseChanges {
    pub name: Option<String>,
    pub code: Option<String>,
    pub department_id: Option<Uuid>,
    pub level: Option<String>,
    pub duration: Option<String>,
    pub description: Option<String>,
    pub eligibility: Option<String>,
    pub syllabus_url: Option<String>,
    pub is_active: Option<bool>,
    pub updated_at: DateTime<Utc>,
}

// --- Faculty ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = faculty)]
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
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = faculty)]
pub struct NewFacultyMember {
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

#[derive(Debug, AsChangeset)]
#[diesel(table_name = faculty)]
pub struct FacultyChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub designation: Option<String>,
    pub department_id: Option<Uuid>,
    pub image_url: Option<String>,
    pub bio: Option<String>,
    pub qualifications: Option<String>,
    pub research_areas: Option<String>,
    pub is_active: Option<bool>,
    pub updated_at: DateTime<Utc>,
}

// --- News ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = news)]
#[serde(rename_all = "camelCase")]
pub struct News {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub is_published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub views: i32,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = news)]
pub struct NewNews {
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub is_published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub author_id: Uuid,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = news)]
pub struct NewsChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub is_published: Option<bool>,
    pub published_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

/// Homepage projection of a news item.
#[derive(Debug, Queryable, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsHeadline {
    pub id: Uuid,
    pub title: String,
    pub image_url: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub category: Option<String>,
}

// --- Events ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = events)]
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
    pub is_published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub views: i32,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = events)]
pub struct NewEvent {
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub category: Option<String>,
    pub is_published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub author_id: Uuid,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = events)]
pub struct EventChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub category: Option<String>,
    pub is_published: Option<bool>,
    pub published_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

/// Homepage projection of an event.
#[derive(Debug, Queryable, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTeaser {
    pub id: Uuid,
    pub title: String,
    pub image_url: Option<String>,
    pub start_date: DateTime<Utc>,
    pub location: Option<String>,
}

// --- Examinations ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = examinations)]
#[serde(rename_all = "camelCase")]
pub struct Examination {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub exam_date: Option<DateTime<Utc>>,
    pub timetable_url: Option<String>,
    pub hall_ticket_url: Option<String>,
    pub results_url: Option<String>,
    pub department_id: Option<Uuid>,
    pub course_id: Option<Uuid>,
    pub is_published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = examinations)]
pub struct NewExamination {
    pub title: String,
    pub description: Option<String>,
    pub exam_date: Option<DateTime<Utc>>,
    pub timetable_url: Option<String>,
    pub hall_ticket_url: Option<String>,
    pub results_url: Option<String>,
    pub department_id: Option<Uuid>,
    pub course_id: Option<Uuid>,
    pub is_published: bool,
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = examinations)]
pub struct ExaminationChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub exam_date: Option<DateTime<Utc>>,
    pub timetable_url: Option<String>,
    pub hall_ticket_url: Option<String>,
    pub results_url: Option<String>,
    pub department_id: Option<Uuid>,
    pub course_id: Option<Uuid>,
    pub is_published: Option<bool>,
    pub published_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

// --- Placements ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = placements)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    pub id: Uuid,
    pub company_name: String,
    pub logo_url: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = placements)]
pub struct NewPlacement {
    pub company_name: String,
    pub logo_url: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = placements)]
pub struct PlacementChanges {
    pub company_name: Option<String>,
    pub logo_url: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub is_active: Option<bool>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Queryable, Identifiable, Associations, Serialize, Clone)]
#[diesel(table_name = placement_stats)]
#[diesel(belongs_to(Placement))]
#[serde(rename_all = "camelCase")]
pub struct PlacementStat {
    pub id: Uuid,
    pub placement_id: Uuid,
    pub year: i32,
    pub students_placed: i32,
    pub average_package: Option<f64>,
    pub highest_package: Option<f64>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = placement_stats)]
pub struct NewPlacementStat {
    pub placement_id: Uuid,
    pub year: i32,
    pub students_placed: i32,
    pub average_package: Option<f64>,
    pub highest_package: Option<f64>,
}

// --- Gallery ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = gallery)]
#[serde(rename_all = "camelCase")]
pub struct GalleryItem {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub media_type: String,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub album_id: Option<String>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = gallery)]
pub struct NewGalleryItem {
    pub title: String,
    pub description: Option<String>,
    pub media_type: String,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub album_id: Option<String>,
    pub is_published: bool,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = gallery)]
pub struct GalleryChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub album_id: Option<String>,
    pub is_published: Option<bool>,
    pub updated_at: DateTime<Utc>,
}

// --- Banners ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = banners)]
#[serde(rename_all = "camelCase")]
pub struct Banner {
    pub id: Uuid,
    pub title: String,
    pub image_url: String,
    pub link_url: Option<String>,
    #[serde(rename = "order")]
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = banners)]
pub struct NewBanner {
    pub title: String,
    pub image_url: String,
    pub link_url: Option<String>,
    pub sort_order: i32,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = banners)]
pub struct BannerChanges {
    pub title: Option<String>,
    pub image_url: Option<String>,
    pub link_url: Option<String>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
    pub updated_at: DateTime<Utc>,
}

// --- Circulars ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = circulars)]
#[serde(rename_all = "camelCase")]
pub struct Circular {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub document_url: Option<String>,
    pub category: Option<String>,
    pub target_audience: String,
    pub department_id: Option<Uuid>,
    pub is_published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = circulars)]
pub struct NewCircular {
    pub title: String,
    pub content: String,
    pub document_url: Option<String>,
    pub category: Option<String>,
    pub target_audience: String,
    pub department_id: Option<Uuid>,
    pub is_published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub author_id: Uuid,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = circulars)]
pub struct CircularChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub document_url: Option<String>,
    pub category: Option<String>,
    pub target_audience: Option<String>,
    pub department_id: Option<Uuid>,
    pub is_published: Option<bool>,
    pub published_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

// --- Notifications ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone, PartialEq)]
#[diesel(table_name = notifications)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    #[serde(rename = "type")]
    pub notification_type: String,
    pub target_audience: String,
    pub department_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub data: Option<serde_json::Value>,
    pub is_sent: bool,
    pub sent_at: Option<DateTime<Utc>>,
    pub success_count: i32,
    pub failure_count: i32,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = notifications)]
pub struct NewNotification {
    pub title: String,
    pub body: String,
    pub notification_type: String,
    pub target_audience: String,
    pub department_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub data: Option<serde_json::Value>,
    pub created_by: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_password_hash_is_never_serialized() {
        let now = Utc::now();
        let admin = AdminUserRow {
            id: Uuid::new_v4(),
            username: "editor".into(),
            email: "editor@campus.edu".into(),
            password_hash: "$argon2id$secret".into(),
            role: "ADMIN".into(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&admin).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["isActive"], true);
    }

    #[test]
    fn renamed_wire_fields() {
        let now = Utc::now();
        let banner = Banner {
            id: Uuid::new_v4(),
            title: "Convocation".into(),
            image_url: "https://cdn.campus.edu/b.png".into(),
            link_url: None,
            sort_order: 2,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&banner).unwrap();
        assert_eq!(json["order"], 2);
        assert_eq!(json["imageUrl"], "https://cdn.campus.edu/b.png");
    }
}
