use axum::Json;
use axum::extract::{FromRequestParts, Path, Query};
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use axum::routing::{patch, post};
use axum::{Router, extract::State, http::StatusCode, routing::get};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, ErrorResponse};
use crate::state::AppState;
use crate::services::queries::today;
use crate::models::*;
use crate::db::catalog;

#[derive(Deserialize)]
struct WhenParams {
    #[serde(default)]
    when: When,
}

#[derive(Serialize)]
struct AvailabilityResponse {
    available: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    conflict: Option<LectureSummary>,
}

#[derive(Serialize)]
struct CourseDeleted {
    lectures_removed: u64,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/courses", get(list_courses).post(create_course))
        .route("/courses/{id}", get(course_detail).delete(delete_course))
        .route("/instructors", get(list_instructors).post(create_instructor))
        .route("/instructors/{id}", get(get_instructor))
        .route("/lectures", get(list_lectures).post(assign_lecture))
        .route("/lectures/check-availability", post(check_availability))
        .route("/lectures/instructor/{id}", get(instructor_lectures))
        .route("/lectures/course/{id}", get(course_lectures))
        .route("/lectures/{id}", patch(reschedule_lecture).delete(cancel_lecture))
        .route("/dashboard", get(dashboard))
        .with_state(state)
}

/// Caller identity forwarded by the authentication layer in front of us.
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        let user_id = header("x-user-id").ok_or(AppError::Unauthorized)?;
        let role = header("x-user-role")
            .and_then(Role::parse)
            .ok_or(AppError::Unauthorized)?;

        Ok(Actor {
            user_id: user_id.to_string(),
            role,
        })
    }
}

fn assignment_response(outcome: Assignment, created: bool) -> Response {
    match outcome {
        Assignment::Assigned(lecture) => {
            let status = if created { StatusCode::CREATED } else { StatusCode::OK };
            (status, Json(lecture)).into_response()
        }
        Assignment::Rejected(conflict) => {
            (StatusCode::CONFLICT, Json(ErrorResponse::rejected(conflict))).into_response()
        }
    }
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}

async fn list_courses(State(state): State<AppState>) -> Result<Json<Vec<Course>>, AppError> {
    let courses = catalog::fetch_courses(&state.db).await?;
    Ok(Json(courses))
}

async fn create_course(
    State(state): State<AppState>,
    actor: Actor,
    Json(req): Json<NewCourseRequest>
) -> Result<(StatusCode, Json<Course>), AppError> {
    actor.require_admin()?;
    let course = catalog::insert_course(&state.db, req, Some(actor.user_id.as_str())).await?;
    Ok((StatusCode::CREATED, Json(course)))
}

async fn course_detail(
    State(state): State<AppState>,
    Path(id): Path<String>
) -> Result<Json<CourseDetail>, AppError> {
    let detail = state.queries.course_detail(&id, today()).await?;
    Ok(Json(detail))
}

async fn delete_course(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>
) -> Result<Json<CourseDeleted>, AppError> {
    actor.require_admin()?;
    let lectures_removed = catalog::delete_course(&state.db, &id).await?;
    Ok(Json(CourseDeleted { lectures_removed }))
}

async fn list_instructors(State(state): State<AppState>) -> Result<Json<Vec<Instructor>>, AppError> {
    let instructors = catalog::fetch_instructors(&state.db).await?;
    Ok(Json(instructors))
}

async fn create_instructor(
    State(state): State<AppState>,
    Json(req): Json<NewInstructorRequest>
) -> Result<(StatusCode, Json<Instructor>), AppError> {
    let instructor = catalog::insert_instructor(&state.db, req).await?;
    Ok((StatusCode::CREATED, Json(instructor)))
}

async fn get_instructor(
    State(state): State<AppState>,
    Path(id): Path<String>
) -> Result<Json<Instructor>, AppError> {
    let instructor = catalog::find_instructor_by_id(&state.db, &id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Instructor {}", id)))?;
    Ok(Json(instructor))
}

async fn list_lectures(
    State(state): State<AppState>,
    Query(params): Query<WhenParams>
) -> Result<Json<Vec<LectureView>>, AppError> {
    let lectures = state.queries.list_all(params.when, today()).await?;
    Ok(Json(lectures))
}

async fn assign_lecture(
    State(state): State<AppState>,
    actor: Actor,
    Json(req): Json<NewLectureRequest>
) -> Result<Response, AppError> {
    let outcome = state.assignments.assign(&actor, req).await?;
    Ok(assignment_response(outcome, true))
}

async fn reschedule_lecture(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
    Json(req): Json<RescheduleRequest>
) -> Result<Response, AppError> {
    let outcome = state.assignments.reschedule(&actor, &id, req).await?;
    Ok(assignment_response(outcome, false))
}

async fn cancel_lecture(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>
) -> Result<StatusCode, AppError> {
    state.assignments.cancel(&actor, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn check_availability(
    State(state): State<AppState>,
    Json(req): Json<AvailabilityRequest>
) -> Result<Json<AvailabilityResponse>, AppError> {
    let window = TimeRange::from_bounds(req.start_time, req.end_time)?;
    let availability = state
        .assignments
        .query_availability(&req.instructor_id, req.date, window)
        .await?;

    let message = match &availability.conflict {
        None => "Instructor is available".to_string(),
        Some(c) => format!(
            "Instructor already has lecture {} on {} from {} to {}",
            c.batch_name,
            c.date,
            c.start_time.format("%H:%M"),
            c.end_time.format("%H:%M"),
        ),
    };

    Ok(Json(AvailabilityResponse {
        available: availability.available,
        message,
        conflict: availability.conflict,
    }))
}

async fn instructor_lectures(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<WhenParams>
) -> Result<Json<Vec<LectureView>>, AppError> {
    let lectures = state.queries.by_instructor(&id, params.when, today()).await?;
    Ok(Json(lectures))
}

async fn course_lectures(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<WhenParams>
) -> Result<Json<Vec<LectureView>>, AppError> {
    let lectures = state.queries.by_course(&id, params.when, today()).await?;
    Ok(Json(lectures))
}

async fn dashboard(State(state): State<AppState>) -> Result<Json<DashboardStats>, AppError> {
    let stats = state.queries.dashboard_stats(today()).await?;
    Ok(Json(stats))
}
