/// Admin-only workflow: student provisioning, catalog management, and the
/// assignment upsert
///
/// Every handler here passes the request's explicit [`Principal`] through
/// [`require_admin`] before touching any store. Denials become redirects via
/// the error mapping: anonymous callers to the login page, non-admin
/// accounts home with a denial message. No store is read or written on a
/// denied request.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::auth::{collect_validation_errors, create_account},
};
use axum::{
    extract::{Path, State},
    response::Redirect,
    Extension, Json,
};
use portal_shared::{
    auth::principal::{require_admin, Principal},
    models::{
        account::{Account, AccountRole},
        assignment::{Assignment, StudentAssignmentRow},
        contact_message::ContactMessage,
        course::Course,
        school::School,
    },
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Admin landing: redirects to the student listing
pub async fn admin_home(Extension(principal): Extension<Principal>) -> ApiResult<Redirect> {
    require_admin(&principal)?;
    Ok(Redirect::to("/admin/students"))
}

/// Add-student request (admin provisioning)
#[derive(Debug, Deserialize, Validate)]
pub struct AddStudentRequest {
    /// Username (non-empty)
    #[validate(length(min = 1, message = "Username must not be empty"))]
    pub username: String,

    /// Credential (non-empty)
    #[validate(length(min = 1, message = "Password must not be empty"))]
    pub password: String,
}

/// Provisions a student account
///
/// Identical to self-registration except for the gate and the landing page:
/// success redirects to the admin student listing.
pub async fn add_student(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<AddStudentRequest>,
) -> ApiResult<Redirect> {
    require_admin(&principal)?;

    req.validate().map_err(collect_validation_errors)?;

    create_account(&state, &req.username, &req.password, AccountRole::Student).await?;

    Ok(Redirect::to("/admin/students"))
}

/// Lists every student with their current (possibly absent) assignment
///
/// Left-join semantics: unassigned students appear with empty school/course
/// columns.
pub async fn list_students(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Json<Vec<StudentAssignmentRow>>> {
    require_admin(&principal)?;

    let rows = Assignment::list_students_with_assignments(&state.db).await?;

    Ok(Json(rows))
}

/// Deletes a student account
///
/// No-op if the target is absent or holds the admin role; admins are never
/// deleted. Dependent assignment rows cascade with the account.
pub async fn delete_student(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult<Redirect> {
    require_admin(&principal)?;

    if let Some(account) = Account::find_by_id(&state.db, id).await? {
        if account.role != AccountRole::Admin {
            Account::delete(&state.db, id).await?;
            tracing::info!(username = %account.username, "Student deleted");
        }
    }

    Ok(Redirect::to("/admin/students"))
}

/// Assignment request: the chosen school and course ids
#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    /// Chosen school (must be in the catalog)
    pub school_id: Uuid,

    /// Chosen course (must be in the catalog)
    pub course_id: Uuid,
}

/// Assigns (or reassigns) a student to a school and course
///
/// One operation behind two entry routes (`/admin/assign/:id` and
/// `/admin/modify_assignment/:id`). Resolves the student, checks the chosen
/// school and course were actually offered, then upserts: an existing
/// assignment row is updated in place, otherwise one is inserted. A student
/// never ends up with two rows.
///
/// # Errors
///
/// `NotFound` if the student, school, or course id does not exist; nothing
/// is written in that case.
pub async fn assign(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(req): Json<AssignRequest>,
) -> ApiResult<Redirect> {
    require_admin(&principal)?;

    let student = Account::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Student not found".to_string()))?;

    // A choice is only valid if it was offered
    School::find_by_id(&state.db, req.school_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("School not found".to_string()))?;
    Course::find_by_id(&state.db, req.course_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Course not found".to_string()))?;

    let assignment = Assignment::upsert(&state.db, student.id, req.school_id, req.course_id).await?;

    tracing::info!(
        username = %student.username,
        assignment_id = %assignment.id,
        "Assigned school and course"
    );

    Ok(Redirect::to("/admin/students"))
}

/// Add-school request
#[derive(Debug, Deserialize, Validate)]
pub struct AddSchoolRequest {
    /// School name (non-empty, unique)
    #[validate(length(min = 1, message = "School name must not be empty"))]
    pub name: String,
}

/// Adds a school to the catalog
///
/// Inserts unconditionally; a duplicate name fails at the storage layer and
/// is surfaced as a duplicate error.
pub async fn add_school(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<AddSchoolRequest>,
) -> ApiResult<Redirect> {
    require_admin(&principal)?;

    req.validate().map_err(collect_validation_errors)?;

    let school = School::create(&state.db, &req.name).await?;
    tracing::info!(school = %school.name, "School added");

    Ok(Redirect::to("/admin/schools"))
}

/// Lists all schools in insertion order
pub async fn list_schools(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Json<Vec<School>>> {
    require_admin(&principal)?;

    let schools = School::list(&state.db).await?;

    Ok(Json(schools))
}

/// Add-course request
#[derive(Debug, Deserialize, Validate)]
pub struct AddCourseRequest {
    /// Course name (non-empty)
    #[validate(length(min = 1, message = "Course name must not be empty"))]
    pub name: String,
}

/// Adds a course under an existing school
///
/// # Errors
///
/// `NotFound` if the school does not exist; no course row is created.
pub async fn add_course(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(school_id): Path<Uuid>,
    Json(req): Json<AddCourseRequest>,
) -> ApiResult<Redirect> {
    require_admin(&principal)?;

    req.validate().map_err(collect_validation_errors)?;

    let school = School::find_by_id(&state.db, school_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("School not found".to_string()))?;

    let course = Course::create(&state.db, &req.name, school.id).await?;
    tracing::info!(course = %course.name, school = %school.name, "Course added");

    Ok(Redirect::to("/admin/courses"))
}

/// Lists all courses in insertion order
pub async fn list_courses(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Json<Vec<Course>>> {
    require_admin(&principal)?;

    let courses = Course::list(&state.db).await?;

    Ok(Json(courses))
}

/// Lists the contact inbox
pub async fn list_contact_messages(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Json<Vec<ContactMessage>>> {
    require_admin(&principal)?;

    let messages = ContactMessage::list(&state.db).await?;

    Ok(Json(messages))
}
