//! Lecture repository: the only owner of stored lecture rows.
//!
//! Calls that belong to an instructor's exclusive section take a
//! `&mut SqliteConnection`; read-side listings go through the pool.

use chrono::{NaiveDate, Utc};
use sqlx::{SqliteConnection, SqlitePool};

use crate::error::AppError;
use crate::models::{Lecture, LectureView, When};

const LECTURE_COLUMNS: &str = "id, course_id, instructor_id, batch_name, date, start_time, \
     end_time, topic, notes, created_at, updated_at";

/// An instructor's lectures on one day, earliest start first.
pub async fn for_instructor_on(
    conn: &mut SqliteConnection,
    instructor_id: &str,
    date: NaiveDate,
) -> Result<Vec<Lecture>, AppError> {
    let sql = format!(
        "SELECT {LECTURE_COLUMNS} FROM lectures \
         WHERE instructor_id = ?1 AND date = ?2 \
         ORDER BY start_time ASC, id ASC"
    );
    let lectures = sqlx::query_as::<_, Lecture>(&sql)
        .bind(instructor_id)
        .bind(date)
        .fetch_all(&mut *conn)
        .await?;
    Ok(lectures)
}

pub async fn find_by_id(
    conn: &mut SqliteConnection,
    id: &str,
) -> Result<Option<Lecture>, AppError> {
    let sql = format!("SELECT {LECTURE_COLUMNS} FROM lectures WHERE id = ?1");
    let lecture = sqlx::query_as::<_, Lecture>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(lecture)
}

pub async fn insert(conn: &mut SqliteConnection, lecture: &Lecture) -> Result<String, AppError> {
    let result = sqlx::query(
        r#"
        INSERT INTO lectures
            (id, course_id, instructor_id, batch_name, date, start_time, end_time,
            topic, notes, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        "#,
    )
    .bind(&lecture.id)
    .bind(&lecture.course_id)
    .bind(&lecture.instructor_id)
    .bind(&lecture.batch_name)
    .bind(lecture.date)
    .bind(lecture.start_time)
    .bind(lecture.end_time)
    .bind(&lecture.topic)
    .bind(&lecture.notes)
    .bind(&lecture.created_at)
    .bind(&lecture.updated_at)
    .execute(&mut *conn)
    .await;

    match result {
        Ok(_) => Ok(lecture.id.clone()),
        Err(err) => Err(write_error(conn, err, lecture).await),
    }
}

/// Replaces every mutable column of the stored row in one statement.
///
/// The write only lands if the row still carries the instructor and
/// `updated_at` of `seen`, the copy the caller decided on. A row changed in
/// between yields `Unavailable` and is left untouched.
pub async fn update(
    conn: &mut SqliteConnection,
    lecture: &Lecture,
    seen: &Lecture,
) -> Result<(), AppError> {
    let now = Utc::now().to_rfc3339();
    let result = sqlx::query(
        r#"
        UPDATE lectures
        SET instructor_id = ?1,
            batch_name = ?2,
            date = ?3,
            start_time = ?4,
            end_time = ?5,
            topic = ?6,
            notes = ?7,
            updated_at = ?8
        WHERE id = ?9 AND instructor_id = ?10 AND updated_at = ?11
        "#,
    )
    .bind(&lecture.instructor_id)
    .bind(&lecture.batch_name)
    .bind(lecture.date)
    .bind(lecture.start_time)
    .bind(lecture.end_time)
    .bind(&lecture.topic)
    .bind(&lecture.notes)
    .bind(now)
    .bind(&lecture.id)
    .bind(&seen.instructor_id)
    .bind(&seen.updated_at)
    .execute(&mut *conn)
    .await;

    match result {
        Ok(done) if done.rows_affected() == 0 => match find_by_id(conn, &lecture.id).await? {
            None => Err(AppError::not_found(format!("Lecture {}", lecture.id))),
            Some(_) => Err(AppError::Unavailable(format!(
                "lecture {} changed while being rescheduled, please retry",
                lecture.id
            ))),
        },
        Ok(_) => Ok(()),
        Err(err) => Err(write_error(conn, err, lecture).await),
    }
}

pub async fn delete(conn: &mut SqliteConnection, id: &str) -> Result<(), AppError> {
    let affected = sqlx::query("DELETE FROM lectures WHERE id = ?1")
        .bind(id)
        .execute(&mut *conn)
        .await?
        .rows_affected();

    if affected == 0 {
        return Err(AppError::not_found(format!("Lecture {}", id)));
    }
    Ok(())
}

pub async fn delete_for_course(conn: &mut SqliteConnection, course_id: &str) -> Result<u64, AppError> {
    let affected = sqlx::query("DELETE FROM lectures WHERE course_id = ?1")
        .bind(course_id)
        .execute(&mut *conn)
        .await?
        .rows_affected();
    Ok(affected)
}

/// Narrows a joined listing to one course or one instructor.
#[derive(Debug, Clone, Copy)]
pub enum Scope<'a> {
    Everything,
    Course(&'a str),
    Instructor(&'a str),
}

pub async fn list_views(
    db: &SqlitePool,
    scope: Scope<'_>,
    when: When,
    today: NaiveDate,
) -> Result<Vec<LectureView>, AppError> {
    let scope_clause = match scope {
        Scope::Everything => "1 = 1",
        Scope::Course(_) => "l.course_id = ?2",
        Scope::Instructor(_) => "l.instructor_id = ?2",
    };
    let when_clause = match when {
        When::All => "?1 IS NOT NULL",
        When::Upcoming => "l.date >= ?1",
        When::Past => "l.date < ?1",
    };

    let sql = format!(
        r#"
        SELECT
            l.id, l.course_id, c.name AS course_name, c.level AS course_level,
            l.instructor_id, i.name AS instructor_name, i.email AS instructor_email,
            l.batch_name, l.date, l.start_time, l.end_time, l.topic, l.notes
        FROM lectures l
        JOIN courses c ON c.id = l.course_id
        JOIN instructors i ON i.id = l.instructor_id
        WHERE {scope_clause} AND {when_clause}
        ORDER BY l.date ASC, l.start_time ASC
        "#
    );

    let query = sqlx::query_as::<_, LectureView>(&sql).bind(today);
    let query = match scope {
        Scope::Everything => query,
        Scope::Course(id) | Scope::Instructor(id) => query.bind(id),
    };

    Ok(query.fetch_all(db).await?)
}

pub async fn count_all(db: &SqlitePool) -> Result<i64, AppError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM lectures")
        .fetch_one(db)
        .await?;
    Ok(count)
}

pub async fn count_upcoming(db: &SqlitePool, today: NaiveDate) -> Result<i64, AppError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM lectures WHERE date >= ?1")
        .bind(today)
        .fetch_one(db)
        .await?;
    Ok(count)
}

/// Turns constraint failures on a write into the caller-facing error.
async fn write_error(conn: &mut SqliteConnection, err: sqlx::Error, lecture: &Lecture) -> AppError {
    let (fk, check) = match &err {
        sqlx::Error::Database(db_err) => {
            (db_err.is_foreign_key_violation(), db_err.is_check_violation())
        }
        _ => (false, false),
    };

    if check {
        return AppError::InvalidRange("end time must be after start time".to_string());
    }
    if !fk {
        return AppError::Database(err);
    }

    let course_exists: Result<bool, sqlx::Error> =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM courses WHERE id = ?1)")
            .bind(&lecture.course_id)
            .fetch_one(&mut *conn)
            .await;
    match course_exists {
        Ok(false) => AppError::not_found(format!("Course {}", lecture.course_id)),
        Ok(true) => AppError::not_found(format!("Instructor {}", lecture.instructor_id)),
        Err(e) => AppError::Database(e),
    }
}
