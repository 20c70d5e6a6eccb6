pub mod actor;
pub mod course;
pub mod instructor;
pub mod lecture;
pub mod slot;

pub use actor::{Actor, Role};
pub use course::{Course, CourseDetail, CourseLevel, NewCourseRequest};
pub use instructor::{Instructor, NewInstructorRequest};
pub use lecture::{
    Assignment, Availability, AvailabilityRequest, DashboardStats, Lecture, LectureSummary,
    LectureView, NewLectureRequest, RescheduleRequest, When,
};
pub use slot::{Slot, TimeRange};
