//! Per-instructor exclusive sections.
//!
//! Every check-then-write on an instructor's schedule runs while holding that
//! instructor's section. Sections for different instructors are independent.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::warn;

use crate::error::AppError;

#[derive(Clone, Default)]
pub struct ScheduleLocks {
    sections: Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>,
}

impl ScheduleLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits at most `timeout` for the instructor's section.
    pub async fn acquire(
        &self,
        instructor_id: &str,
        timeout: Duration,
    ) -> Result<ScheduleGuard, AppError> {
        let section = {
            let mut sections = self.sections.lock();
            sections
                .entry(instructor_id.to_string())
                .or_default()
                .clone()
        };

        let acquired = tokio::time::timeout(timeout, section.lock_owned()).await;
        match acquired {
            Ok(guard) => Ok(ScheduleGuard {
                locks: self.clone(),
                instructor_id: instructor_id.to_string(),
                guard: Some(guard),
            }),
            Err(_) => {
                self.prune(instructor_id);
                warn!(
                    "gave up waiting {:?} for schedule of instructor {}",
                    timeout, instructor_id
                );
                Err(AppError::Unavailable(format!(
                    "schedule of instructor {} is busy, please retry",
                    instructor_id
                )))
            }
        }
    }

    /// Number of instructors with a held or awaited section.
    pub fn active_sections(&self) -> usize {
        self.sections.lock().len()
    }

    fn prune(&self, instructor_id: &str) {
        let mut sections = self.sections.lock();
        if let Some(section) = sections.get(instructor_id) {
            if Arc::strong_count(section) == 1 {
                sections.remove(instructor_id);
            }
        }
    }
}

/// Held for the duration of one check-then-write.
pub struct ScheduleGuard {
    locks: ScheduleLocks,
    instructor_id: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl ScheduleGuard {
    pub fn instructor_id(&self) -> &str {
        &self.instructor_id
    }
}

impl Drop for ScheduleGuard {
    fn drop(&mut self) {
        // release before pruning so the map entry's count reflects waiters only
        self.guard.take();
        self.locks.prune(&self.instructor_id);
    }
}
