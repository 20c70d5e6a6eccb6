use chrono::NaiveDate;
use sqlx::SqliteConnection;

use crate::db::lectures;
use crate::error::AppError;
use crate::models::{Availability, Lecture, Slot, TimeRange};

/// First lecture in `schedule` that collides with the candidate.
///
/// `schedule` is one instructor's lectures in start order, so the earliest
/// conflict wins. A `None` window stands for the whole day: any lecture on
/// `date` blocks it. `exclude` skips the lecture being edited.
pub fn find_conflict<'a>(
    schedule: &'a [Lecture],
    date: NaiveDate,
    window: Option<&TimeRange>,
    exclude: Option<&str>,
) -> Option<&'a Lecture> {
    schedule
        .iter()
        .filter(|lecture| exclude != Some(lecture.id.as_str()))
        .find(|lecture| match window {
            Some(range) => lecture.slot().overlaps(&Slot::new(date, *range)),
            None => lecture.date == date,
        })
}

/// Reads the instructor's day and decides. No side effects.
pub async fn check(
    conn: &mut SqliteConnection,
    instructor_id: &str,
    date: NaiveDate,
    window: Option<&TimeRange>,
    exclude: Option<&str>,
) -> Result<Availability, AppError> {
    let schedule = lectures::for_instructor_on(conn, instructor_id, date).await?;
    Ok(match find_conflict(&schedule, date, window, exclude) {
        Some(lecture) => Availability::blocked_by(lecture),
        None => Availability::free(),
    })
}
