pub mod assignment;
pub mod availability;
pub mod locks;
pub mod queries;

pub use assignment::AssignmentService;
pub use locks::{ScheduleGuard, ScheduleLocks};
pub use queries::ScheduleQueries;
