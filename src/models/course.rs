use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::LectureView;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum CourseLevel {
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Course {
    pub id: String,
    pub name: String,
    pub level: CourseLevel,
    pub description: String,
    pub image: Option<String>,
    pub created_by: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCourseRequest {
    pub name: String,
    pub level: CourseLevel,
    pub description: String,
    pub image: Option<String>,
}

/// A course together with every lecture scheduled for it.
#[derive(Debug, Clone, Serialize)]
pub struct CourseDetail {
    pub course: Course,
    pub lectures: Vec<LectureView>,
}
