use chrono::{Local, NaiveDate};
use sqlx::SqlitePool;

use crate::db::catalog;
use crate::db::lectures::{self, Scope};
use crate::error::AppError;
use crate::models::{CourseDetail, DashboardStats, LectureView, When};

/// Read-side listings for dashboards and schedule pages.
#[derive(Clone)]
pub struct ScheduleQueries {
    db: SqlitePool,
}

/// The institution's current day; lectures on it count as upcoming.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

impl ScheduleQueries {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn list_all(&self, when: When, today: NaiveDate) -> Result<Vec<LectureView>, AppError> {
        lectures::list_views(&self.db, Scope::Everything, when, today).await
    }

    pub async fn by_instructor(
        &self,
        instructor_id: &str,
        when: When,
        today: NaiveDate,
    ) -> Result<Vec<LectureView>, AppError> {
        catalog::find_instructor_by_id(&self.db, instructor_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Instructor {}", instructor_id)))?;
        lectures::list_views(&self.db, Scope::Instructor(instructor_id), when, today).await
    }

    pub async fn by_course(
        &self,
        course_id: &str,
        when: When,
        today: NaiveDate,
    ) -> Result<Vec<LectureView>, AppError> {
        catalog::find_course_by_id(&self.db, course_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Course {}", course_id)))?;
        lectures::list_views(&self.db, Scope::Course(course_id), when, today).await
    }

    pub async fn course_detail(&self, course_id: &str, today: NaiveDate) -> Result<CourseDetail, AppError> {
        let course = catalog::find_course_by_id(&self.db, course_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Course {}", course_id)))?;
        let lectures = lectures::list_views(&self.db, Scope::Course(course_id), When::All, today).await?;
        Ok(CourseDetail { course, lectures })
    }

    pub async fn dashboard_stats(&self, today: NaiveDate) -> Result<DashboardStats, AppError> {
        Ok(DashboardStats {
            courses: catalog::count_courses(&self.db).await?,
            instructors: catalog::count_instructors(&self.db).await?,
            lectures: lectures::count_all(&self.db).await?,
            upcoming_lectures: lectures::count_upcoming(&self.db, today).await?,
        })
    }
}
