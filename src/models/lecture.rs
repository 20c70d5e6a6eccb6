use chrono::{NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::{CourseLevel, Slot, TimeRange};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Lecture {
    pub id: String,
    pub course_id: String,
    pub instructor_id: String,
    pub batch_name: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub topic: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Lecture {
    pub fn new(req: NewLectureRequest, range: TimeRange) -> Self {
        let now = Utc::now().to_rfc3339();
        Self {
            id: Uuid::new_v4().to_string(),
            course_id: req.course_id,
            instructor_id: req.instructor_id,
            batch_name: req.batch_name.trim().to_string(),
            date: req.date,
            start_time: range.start(),
            end_time: range.end(),
            topic: req.topic,
            notes: req.notes,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    pub fn time_range(&self) -> TimeRange {
        TimeRange::stored(self.start_time, self.end_time)
    }

    pub fn slot(&self) -> Slot {
        Slot::new(self.date, self.time_range())
    }

    pub fn summary(&self) -> LectureSummary {
        LectureSummary {
            id: self.id.clone(),
            course_id: self.course_id.clone(),
            instructor_id: self.instructor_id.clone(),
            batch_name: self.batch_name.clone(),
            date: self.date,
            start_time: self.start_time,
            end_time: self.end_time,
        }
    }
}

/// What a caller needs to explain a clash: whose lecture, and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LectureSummary {
    pub id: String,
    pub course_id: String,
    pub instructor_id: String,
    pub batch_name: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLectureRequest {
    pub course_id: String,
    pub instructor_id: String,
    pub batch_name: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub topic: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RescheduleRequest {
    pub date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub instructor_id: Option<String>,
    pub batch_name: Option<String>,
    pub topic: Option<String>,
    pub notes: Option<String>,
}

impl RescheduleRequest {
    pub fn moves_slot(&self) -> bool {
        self.date.is_some()
            || self.start_time.is_some()
            || self.end_time.is_some()
            || self.instructor_id.is_some()
    }
}

/// Outcome of `assign`/`reschedule`. A taken slot is an expected answer, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum Assignment {
    Assigned(Lecture),
    Rejected(LectureSummary),
}

impl Assignment {
    pub fn is_assigned(&self) -> bool {
        matches!(self, Assignment::Assigned(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Availability {
    pub available: bool,
    pub conflict: Option<LectureSummary>,
}

impl Availability {
    pub fn free() -> Self {
        Self {
            available: true,
            conflict: None,
        }
    }

    pub fn blocked_by(lecture: &Lecture) -> Self {
        Self {
            available: false,
            conflict: Some(lecture.summary()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityRequest {
    pub instructor_id: String,
    pub date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
}

/// Read-side row: a lecture joined with its course and instructor.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LectureView {
    pub id: String,
    pub course_id: String,
    pub course_name: String,
    pub course_level: CourseLevel,
    pub instructor_id: String,
    pub instructor_name: String,
    pub instructor_email: String,
    pub batch_name: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub topic: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum When {
    #[default]
    All,
    Upcoming,
    Past,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub courses: i64,
    pub instructors: i64,
    pub lectures: i64,
    pub upcoming_lectures: i64,
}
