use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::db::catalog;
use crate::error::AppError;
use crate::models::{Course, Instructor};

/// Lookups into the course and instructor catalog, owned by other parts of
/// the system. Lecture writes only need to know the referenced rows exist.
#[async_trait]
pub trait Directory: Send + Sync {
    async fn get_course(&self, id: &str) -> Result<Course, AppError>;
    async fn get_instructor(&self, id: &str) -> Result<Instructor, AppError>;
}

pub struct SqliteDirectory {
    db: SqlitePool,
}

impl SqliteDirectory {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Directory for SqliteDirectory {
    async fn get_course(&self, id: &str) -> Result<Course, AppError> {
        catalog::find_course_by_id(&self.db, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Course {}", id)))
    }

    async fn get_instructor(&self, id: &str) -> Result<Instructor, AppError> {
        catalog::find_instructor_by_id(&self.db, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Instructor {}", id)))
    }
}
