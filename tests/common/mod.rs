#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveTime};
use lecture_scheduler::config::AppConfig;
use lecture_scheduler::db::{self, catalog};
use lecture_scheduler::directory::SqliteDirectory;
use lecture_scheduler::models::{
    Actor, CourseLevel, LectureView, NewCourseRequest, NewInstructorRequest, NewLectureRequest,
    When,
};
use lecture_scheduler::services::queries::today;
use lecture_scheduler::services::{AssignmentService, ScheduleLocks, ScheduleQueries};
use sqlx::SqlitePool;
use tempfile::TempDir;

pub const LOCK_TIMEOUT: Duration = Duration::from_secs(5);

pub struct Fixture {
    pub pool: SqlitePool,
    pub locks: ScheduleLocks,
    pub service: AssignmentService,
    pub queries: ScheduleQueries,
    pub course_id: String,
    pub instructor_1: String,
    pub instructor_2: String,
    _dir: Option<TempDir>,
}

impl Fixture {
    /// Every lecture of the instructor, earliest first.
    pub async fn schedule_of(&self, instructor_id: &str) -> Vec<LectureView> {
        self.queries
            .by_instructor(instructor_id, When::All, today())
            .await
            .expect("Failed to list schedule")
    }
}

pub async fn setup() -> Fixture {
    setup_with_timeout(LOCK_TIMEOUT).await
}

pub async fn setup_with_timeout(lock_timeout: Duration) -> Fixture {
    let pool = db::connect_in_memory()
        .await
        .expect("Failed to create test db");
    seed(pool, lock_timeout, None).await
}

/// On-disk database behind a pool of several connections, so concurrent
/// requests really run side by side.
pub async fn setup_file_backed(max_connections: u32) -> Fixture {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = AppConfig {
        database_url: format!("sqlite://{}", dir.path().join("lectures.db").display()),
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        max_connections,
        lock_timeout: LOCK_TIMEOUT,
        busy_timeout: Duration::from_secs(10),
    };

    let pool = db::connect(&config).await.expect("Failed to open test db");
    db::MIGRATOR.run(&pool).await.expect("Failed to run migrations");
    seed(pool, LOCK_TIMEOUT, Some(dir)).await
}

async fn seed(pool: SqlitePool, lock_timeout: Duration, dir: Option<TempDir>) -> Fixture {
    let course = catalog::insert_course(
        &pool,
        NewCourseRequest {
            name: "Course X".to_string(),
            level: CourseLevel::Advanced,
            description: "Concurrency in practice".to_string(),
            image: None,
        },
        Some("admin-1"),
    )
    .await
    .expect("Failed to insert course");

    let mut instructors = Vec::new();
    for (name, email) in [("Ines", "i1@example.com"), ("Omar", "i2@example.com")] {
        let instructor = catalog::insert_instructor(
            &pool,
            NewInstructorRequest {
                name: name.to_string(),
                email: email.to_string(),
                phone: None,
                expertise: None,
                profile_image: None,
            },
        )
        .await
        .expect("Failed to insert instructor");
        instructors.push(instructor.id);
    }

    let locks = ScheduleLocks::new();
    let service = AssignmentService::new(
        pool.clone(),
        Arc::new(SqliteDirectory::new(pool.clone())),
        locks.clone(),
        lock_timeout,
    );

    Fixture {
        queries: ScheduleQueries::new(pool.clone()),
        pool,
        locks,
        service,
        course_id: course.id,
        instructor_2: instructors.pop().unwrap(),
        instructor_1: instructors.pop().unwrap(),
        _dir: dir,
    }
}

pub fn admin() -> Actor {
    Actor::admin("admin-1")
}

pub fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn request(
    course_id: &str,
    instructor_id: &str,
    day: NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
) -> NewLectureRequest {
    NewLectureRequest {
        course_id: course_id.to_string(),
        instructor_id: instructor_id.to_string(),
        batch_name: "BatchA".to_string(),
        date: day,
        start_time: start,
        end_time: end,
        topic: None,
        notes: None,
    }
}
