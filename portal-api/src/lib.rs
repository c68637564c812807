//! # Campus Portal API Server
//!
//! The HTTP boundary of the campus portal: visitors browse program pages and
//! submit contact requests, students register and log in, and an
//! administrator manages student records and assigns each student to a
//! school and a course.
//!
//! Built with Axum over the stores in `portal-shared`. See `app` for the
//! route map and the principal-resolution middleware.

pub mod app;
pub mod config;
pub mod error;
pub mod responder;
pub mod routes;
