/// Database models for the campus portal
///
/// # Models
///
/// - `account`: student/admin accounts and the identity store
/// - `school`: catalog reference data (unique names)
/// - `course`: catalog reference data, scoped to one school
/// - `assignment`: the single active (school, course) pairing per student
/// - `contact_message`: append-only contact inbox

pub mod account;
pub mod assignment;
pub mod contact_message;
pub mod course;
pub mod school;
