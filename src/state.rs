use std::sync::Arc;
use std::time::Duration;

use sqlx::SqlitePool;

use crate::directory::SqliteDirectory;
use crate::services::{AssignmentService, ScheduleLocks, ScheduleQueries};

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub assignments: AssignmentService,
    pub queries: ScheduleQueries,
}

impl AppState {
    pub fn new(db: SqlitePool, locks: ScheduleLocks, lock_timeout: Duration) -> Self {
        let directory = Arc::new(SqliteDirectory::new(db.clone()));
        Self {
            assignments: AssignmentService::new(db.clone(), directory, locks, lock_timeout),
            queries: ScheduleQueries::new(db.clone()),
            db,
        }
    }
}
