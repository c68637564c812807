/// Route handlers organized by concern
///
/// - `pages`: static pages and the health check
/// - `auth`: registration, login, logout, and the account landing page
/// - `admin`: admin-only student/catalog/assignment workflow
/// - `contact`: public contact form
/// - `chat`: text-response collaborator endpoint

pub mod admin;
pub mod auth;
pub mod chat;
pub mod contact;
pub mod pages;
