use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::db::lectures;
use crate::error::AppError;
use crate::models::{Course, Instructor, NewCourseRequest, NewInstructorRequest};

pub async fn fetch_courses(db: &SqlitePool) -> Result<Vec<Course>, AppError> {
    let courses = sqlx::query_as::<_, Course>(
        "SELECT id, name, level, description, image, created_by, created_at FROM courses ORDER BY created_at DESC"
    )
    .fetch_all(db)
    .await?;
    Ok(courses)
}

pub async fn find_course_by_id(db: &SqlitePool, id: &str) -> Result<Option<Course>, AppError> {
    let course = sqlx::query_as::<_, Course>(
        "SELECT id, name, level, description, image, created_by, created_at FROM courses WHERE id = ?"
    )
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(course)
}

pub async fn insert_course(
    db: &SqlitePool,
    req: NewCourseRequest,
    created_by: Option<&str>,
) -> Result<Course, AppError> {
    if req.name.trim().is_empty() {
        return Err(AppError::BadRequest("course name is required".to_string()));
    }

    let course = Course {
        id: Uuid::new_v4().to_string(),
        name: req.name.trim().to_string(),
        level: req.level,
        description: req.description,
        image: req.image,
        created_by: created_by.map(str::to_string),
        created_at: Utc::now().to_rfc3339(),
    };

    sqlx::query(
        r#"
        INSERT INTO courses (id, name, level, description, image, created_by, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(&course.id)
    .bind(&course.name)
    .bind(course.level)
    .bind(&course.description)
    .bind(&course.image)
    .bind(&course.created_by)
    .bind(&course.created_at)
    .execute(db)
    .await?;

    Ok(course)
}

/// Removes a course and its lectures in one transaction; returns how many
/// lectures went with it.
pub async fn delete_course(db: &SqlitePool, id: &str) -> Result<u64, AppError> {
    let mut tx = db.begin().await?;

    let removed = lectures::delete_for_course(&mut tx, id).await?;
    let affected = sqlx::query("DELETE FROM courses WHERE id = ?1")
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    if affected == 0 {
        // dropping `tx` rolls back
        return Err(AppError::not_found(format!("Course {}", id)));
    }

    tx.commit().await?;
    info!("deleted course {} with {} lecture(s)", id, removed);
    Ok(removed)
}

pub async fn count_courses(db: &SqlitePool) -> Result<i64, AppError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM courses")
        .fetch_one(db)
        .await?;
    Ok(count)
}

pub async fn fetch_instructors(db: &SqlitePool) -> Result<Vec<Instructor>, AppError> {
    let instructors = sqlx::query_as::<_, Instructor>(
        "SELECT id, name, email, phone, expertise, profile_image, created_at FROM instructors ORDER BY name ASC"
    )
    .fetch_all(db)
    .await?;
    Ok(instructors)
}

pub async fn find_instructor_by_id(db: &SqlitePool, id: &str) -> Result<Option<Instructor>, AppError> {
    let instructor = sqlx::query_as::<_, Instructor>(
        "SELECT id, name, email, phone, expertise, profile_image, created_at FROM instructors WHERE id = ?"
    )
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(instructor)
}

pub async fn insert_instructor(
    db: &SqlitePool,
    req: NewInstructorRequest,
) -> Result<Instructor, AppError> {
    let email = req.email.trim().to_lowercase();
    if req.name.trim().is_empty() || !email.contains('@') {
        return Err(AppError::BadRequest("instructor needs a name and a valid email".to_string()));
    }

    let instructor = Instructor {
        id: Uuid::new_v4().to_string(),
        name: req.name.trim().to_string(),
        email,
        phone: req.phone,
        expertise: req.expertise,
        profile_image: req.profile_image,
        created_at: Utc::now().to_rfc3339(),
    };

    let result = sqlx::query(
        r#"
        INSERT INTO instructors (id, name, email, phone, expertise, profile_image, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(&instructor.id)
    .bind(&instructor.name)
    .bind(&instructor.email)
    .bind(&instructor.phone)
    .bind(&instructor.expertise)
    .bind(&instructor.profile_image)
    .bind(&instructor.created_at)
    .execute(db)
    .await;

    match result {
        Ok(_) => Ok(instructor),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(AppError::Conflict(
            format!("an instructor with email {} already exists", instructor.email),
        )),
        Err(e) => Err(e.into()),
    }
}

pub async fn count_instructors(db: &SqlitePool) -> Result<i64, AppError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM instructors")
        .fetch_one(db)
        .await?;
    Ok(count)
}
