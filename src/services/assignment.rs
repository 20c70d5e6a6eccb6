use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::db::lectures;
use crate::directory::Directory;
use crate::error::AppError;
use crate::models::{
    Actor, Assignment, Availability, Lecture, NewLectureRequest, RescheduleRequest, TimeRange,
};
use crate::services::availability;
use crate::services::locks::ScheduleLocks;

/// Creates, moves and cancels lectures without ever double-booking an
/// instructor.
///
/// The read of an instructor's day and the write that follows happen inside
/// that instructor's exclusive section, so two concurrent requests can never
/// both see a slot as free and both take it.
#[derive(Clone)]
pub struct AssignmentService {
    db: SqlitePool,
    directory: Arc<dyn Directory>,
    locks: ScheduleLocks,
    lock_timeout: Duration,
}

impl AssignmentService {
    pub fn new(
        db: SqlitePool,
        directory: Arc<dyn Directory>,
        locks: ScheduleLocks,
        lock_timeout: Duration,
    ) -> Self {
        Self {
            db,
            directory,
            locks,
            lock_timeout,
        }
    }

    pub async fn assign(
        &self,
        actor: &Actor,
        req: NewLectureRequest,
    ) -> Result<Assignment, AppError> {
        actor.require_admin()?;
        let range = TimeRange::new(req.start_time, req.end_time)?;
        require_batch_name(&req.batch_name)?;

        self.directory.get_course(&req.course_id).await?;
        self.directory.get_instructor(&req.instructor_id).await?;

        let section = self.locks.acquire(&req.instructor_id, self.lock_timeout).await?;
        debug!("entered schedule section of {}", section.instructor_id());
        let mut conn = self.db.acquire().await?;

        let availability = availability::check(
            &mut conn,
            &req.instructor_id,
            req.date,
            Some(&range),
            None,
        )
        .await?;
        if let Some(conflict) = availability.conflict {
            info!(
                "rejected lecture for instructor {} on {}: overlaps {}",
                req.instructor_id, req.date, conflict.id
            );
            return Ok(Assignment::Rejected(conflict));
        }

        let lecture = Lecture::new(req, range);
        lectures::insert(&mut conn, &lecture).await?;
        info!(
            "assigned lecture {} to instructor {} on {} {}-{}",
            lecture.id, lecture.instructor_id, lecture.date, lecture.start_time, lecture.end_time
        );
        Ok(Assignment::Assigned(lecture))
    }

    /// Moves a lecture (date, times, instructor) and/or edits its description.
    /// The lecture is checked against every other lecture of the target
    /// instructor, never against itself.
    pub async fn reschedule(
        &self,
        actor: &Actor,
        lecture_id: &str,
        req: RescheduleRequest,
    ) -> Result<Assignment, AppError> {
        actor.require_admin()?;
        if let Some(name) = &req.batch_name {
            require_batch_name(name)?;
        }

        let current = self.load(lecture_id).await?;
        let target_instructor = req
            .instructor_id
            .clone()
            .unwrap_or_else(|| current.instructor_id.clone());
        if target_instructor != current.instructor_id {
            self.directory.get_instructor(&target_instructor).await?;
        }

        let section = self.locks.acquire(&target_instructor, self.lock_timeout).await?;
        debug!("entered schedule section of {}", section.instructor_id());
        let mut conn = self.db.acquire().await?;

        // re-read: the lecture may have changed while we waited
        let current = lectures::find_by_id(&mut conn, lecture_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Lecture {}", lecture_id)))?;
        if req.instructor_id.is_none() && current.instructor_id != target_instructor {
            return Err(AppError::Unavailable(format!(
                "lecture {} was reassigned concurrently, please retry",
                lecture_id
            )));
        }

        let moves_slot = req.moves_slot();
        let seen = current.clone();
        let updated = apply(current, req, target_instructor)?;

        if moves_slot {
            let range = updated.time_range();
            let availability = availability::check(
                &mut conn,
                &updated.instructor_id,
                updated.date,
                Some(&range),
                Some(lecture_id),
            )
            .await?;
            if let Some(conflict) = availability.conflict {
                info!(
                    "rejected reschedule of {} for instructor {} on {}: overlaps {}",
                    lecture_id, updated.instructor_id, updated.date, conflict.id
                );
                return Ok(Assignment::Rejected(conflict));
            }
        }

        lectures::update(&mut conn, &updated, &seen).await?;
        info!(
            "rescheduled lecture {} to instructor {} on {} {}-{}",
            updated.id, updated.instructor_id, updated.date, updated.start_time, updated.end_time
        );
        let stored = lectures::find_by_id(&mut conn, lecture_id)
            .await?
            .unwrap_or(updated);
        Ok(Assignment::Assigned(stored))
    }

    /// Frees the slot. Removing a lecture can never create a conflict.
    pub async fn cancel(&self, actor: &Actor, lecture_id: &str) -> Result<(), AppError> {
        actor.require_admin()?;
        let mut conn = self.db.acquire().await?;
        lectures::delete(&mut conn, lecture_id).await?;
        info!("cancelled lecture {}", lecture_id);
        Ok(())
    }

    /// Advisory pre-check for forms. Never writes, takes no section: a `true`
    /// here does not reserve anything for a later `assign`.
    pub async fn query_availability(
        &self,
        instructor_id: &str,
        date: NaiveDate,
        window: Option<TimeRange>,
    ) -> Result<Availability, AppError> {
        self.directory.get_instructor(instructor_id).await?;
        let mut conn = self.db.acquire().await?;
        let availability =
            availability::check(&mut conn, instructor_id, date, window.as_ref(), None).await?;
        debug!(
            "availability of {} on {}: {}",
            instructor_id, date, availability.available
        );
        Ok(availability)
    }

    async fn load(&self, lecture_id: &str) -> Result<Lecture, AppError> {
        let mut conn = self.db.acquire().await?;
        lectures::find_by_id(&mut conn, lecture_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Lecture {}", lecture_id)))
    }
}

fn require_batch_name(name: &str) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(AppError::BadRequest("batch name is required".to_string()));
    }
    Ok(())
}

/// Overlays the requested changes; unspecified fields keep their stored value.
fn apply(
    mut lecture: Lecture,
    req: RescheduleRequest,
    instructor_id: String,
) -> Result<Lecture, AppError> {
    let start = req.start_time.unwrap_or(lecture.start_time);
    let end = req.end_time.unwrap_or(lecture.end_time);
    let range = TimeRange::new(start, end)?;

    lecture.instructor_id = instructor_id;
    lecture.date = req.date.unwrap_or(lecture.date);
    lecture.start_time = range.start();
    lecture.end_time = range.end();
    if let Some(name) = req.batch_name {
        lecture.batch_name = name.trim().to_string();
    }
    if req.topic.is_some() {
        lecture.topic = req.topic;
    }
    if req.notes.is_some() {
        lecture.notes = req.notes;
    }
    Ok(lecture)
}
