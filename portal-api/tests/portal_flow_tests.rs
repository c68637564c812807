/// End-to-end flows through the portal router
///
/// Requires `TEST_DATABASE_URL`; each test skips when it is unset.

mod common;

use axum::http::{header, StatusCode};
use common::{body_json, get_request, location, post_json, unique, TestContext};
use portal_shared::models::{account::Account, assignment::Assignment, school::School};
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;

#[tokio::test]
async fn test_register_login_logout_flow() {
    let Some(ctx) = TestContext::try_new().await else { return };

    let username = unique("newstudent");

    // Registration lands on the login page
    let response = ctx
        .app
        .clone()
        .oneshot(post_json(
            "/register",
            None,
            json!({"username": username, "password": "s3cret"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");

    // The credential is stored hashed, never verbatim
    let stored = Account::find_by_username(&ctx.db, &username)
        .await
        .unwrap()
        .expect("account persisted");
    assert_ne!(stored.password_hash, "s3cret");
    assert!(stored.password_hash.starts_with("$argon2id$"));

    // A second registration with the same username is rejected
    let response = ctx
        .app
        .clone()
        .oneshot(post_json(
            "/register",
            None,
            json!({"username": username, "password": "other"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Wrong credential and unknown username fail identically
    let wrong_pw = ctx
        .app
        .clone()
        .oneshot(post_json(
            "/login",
            None,
            json!({"username": username, "password": "wrong"}),
        ))
        .await
        .unwrap();
    assert_eq!(wrong_pw.status(), StatusCode::UNAUTHORIZED);
    let wrong_pw_body = body_json(wrong_pw).await;

    let unknown = ctx
        .app
        .clone()
        .oneshot(post_json(
            "/login",
            None,
            json!({"username": unique("nobody"), "password": "wrong"}),
        ))
        .await
        .unwrap();
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(unknown).await, wrong_pw_body);

    // Correct credential opens a session and redirects to the landing page
    let response = ctx
        .app
        .clone()
        .oneshot(post_json(
            "/login",
            None,
            json!({"username": username, "password": "s3cret"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/account");

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("login sets the session cookie")
        .to_str()
        .unwrap()
        .to_string();
    let token = cookie
        .strip_prefix("portal_session=")
        .and_then(|rest| rest.split(';').next())
        .expect("cookie carries the token")
        .to_string();

    // The session resolves to the account on the landing page
    let response = ctx
        .app
        .clone()
        .oneshot(get_request("/account", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["username"], username.as_str());
    assert_eq!(body["role"], "student");

    // Logout tears the session down and redirects home
    let response = ctx
        .app
        .clone()
        .oneshot(get_request("/logout", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    // The revoked token no longer authenticates
    let response = ctx
        .app
        .clone()
        .oneshot(get_request("/account", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");

    // Logging out again is harmless
    let response = ctx
        .app
        .clone()
        .oneshot(get_request("/logout", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn test_admin_gate_denies_anonymous_and_students() {
    let Some(ctx) = TestContext::try_new().await else { return };

    // Anonymous callers are sent to the login page
    let response = ctx
        .app
        .clone()
        .oneshot(get_request("/admin/students", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");

    // Authenticated students are sent home with a denial message
    let (_student, student_token) = ctx.create_student(&unique("student"), "pw").await;
    let response = ctx
        .app
        .clone()
        .oneshot(get_request("/admin/students", Some(&student_token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(location(&response).starts_with("/?error="));

    // A denied mutation writes nothing
    let school_name = unique("Forbidden School");
    let response = ctx
        .app
        .clone()
        .oneshot(post_json(
            "/admin/schools",
            Some(&student_token),
            json!({"name": school_name}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(location(&response).starts_with("/?error="));

    let schools = School::list(&ctx.db).await.unwrap();
    assert!(
        schools.iter().all(|s| s.name != school_name),
        "denied request must not reach the catalog"
    );
}

#[tokio::test]
async fn test_role_decides_admin_access_not_username() {
    let Some(ctx) = TestContext::try_new().await else { return };

    // A student who happens to be called "admin-..." is still a student
    let (_imposter, token) = ctx.create_student(&unique("admin"), "pw").await;

    let response = ctx
        .app
        .clone()
        .oneshot(get_request("/admin/students", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(location(&response).starts_with("/?error="));
}

#[tokio::test]
async fn test_admin_assignment_workflow() {
    let Some(ctx) = TestContext::try_new().await else { return };
    let admin = Some(ctx.admin_token.as_str());

    // Build the catalog
    let school_name = unique("Engineering");
    let response = ctx
        .app
        .clone()
        .oneshot(post_json("/admin/schools", admin, json!({"name": school_name})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin/schools");

    let school = School::list(&ctx.db)
        .await
        .unwrap()
        .into_iter()
        .find(|s| s.name == school_name)
        .expect("school persisted");

    let add_course = |name: &str| {
        post_json(
            &format!("/admin/schools/{}/courses", school.id),
            admin,
            json!({"name": name}),
        )
    };
    let response = ctx.app.clone().oneshot(add_course("CS101")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let response = ctx.app.clone().oneshot(add_course("CS102")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let courses = body_json(
        ctx.app
            .clone()
            .oneshot(get_request("/admin/courses", admin))
            .await
            .unwrap(),
    )
    .await;
    let course_id = |name: &str| {
        courses
            .as_array()
            .unwrap()
            .iter()
            .find(|c| c["name"] == name && c["school_id"] == school.id.to_string())
            .map(|c| c["id"].as_str().unwrap().to_string())
            .expect("course persisted")
    };
    let cs101 = course_id("CS101");
    let cs102 = course_id("CS102");

    // Provision a student through the admin route
    let username = unique("assignee");
    let response = ctx
        .app
        .clone()
        .oneshot(post_json(
            "/admin/students",
            admin,
            json!({"username": username, "password": "pw"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin/students");

    let student = Account::find_by_username(&ctx.db, &username)
        .await
        .unwrap()
        .expect("student persisted");

    // Unassigned students still appear in the listing, with empty columns
    let listing = body_json(
        ctx.app
            .clone()
            .oneshot(get_request("/admin/students", admin))
            .await
            .unwrap(),
    )
    .await;
    let row = listing
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["username"] == username.as_str())
        .expect("student listed before assignment");
    assert!(row["school_name"].is_null());
    assert!(row["course_name"].is_null());

    // First assignment
    let response = ctx
        .app
        .clone()
        .oneshot(post_json(
            &format!("/admin/assign/{}", student.id),
            admin,
            json!({"school_id": school.id, "course_id": cs101}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin/students");

    let first = Assignment::find_by_account(&ctx.db, student.id)
        .await
        .unwrap()
        .expect("assignment persisted");

    // Reassignment through the second entry route updates in place
    let response = ctx
        .app
        .clone()
        .oneshot(post_json(
            &format!("/admin/modify_assignment/{}", student.id),
            admin,
            json!({"school_id": school.id, "course_id": cs102}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let second = Assignment::find_by_account(&ctx.db, student.id)
        .await
        .unwrap()
        .expect("assignment still present");
    assert_eq!(first.id, second.id);
    assert_eq!(second.course_id.to_string(), cs102);

    // The listing reflects the latest choice
    let listing = body_json(
        ctx.app
            .clone()
            .oneshot(get_request("/admin/students", admin))
            .await
            .unwrap(),
    )
    .await;
    let row = listing
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["username"] == username.as_str())
        .expect("student listed after reassignment");
    assert_eq!(row["school_name"], school_name.as_str());
    assert_eq!(row["course_name"], "CS102");
}

#[tokio::test]
async fn test_assignment_rejects_unknown_references() {
    let Some(ctx) = TestContext::try_new().await else { return };
    let admin = Some(ctx.admin_token.as_str());

    // Unknown student
    let response = ctx
        .app
        .clone()
        .oneshot(post_json(
            &format!("/admin/assign/{}", Uuid::new_v4()),
            admin,
            json!({"school_id": Uuid::new_v4(), "course_id": Uuid::new_v4()}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Known student, unknown school: nothing is written
    let (student, _token) = ctx.create_student(&unique("unassigned"), "pw").await;
    let response = ctx
        .app
        .clone()
        .oneshot(post_json(
            &format!("/admin/assign/{}", student.id),
            admin,
            json!({"school_id": Uuid::new_v4(), "course_id": Uuid::new_v4()}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(Assignment::find_by_account(&ctx.db, student.id)
        .await
        .unwrap()
        .is_none());

    // Course creation under a school that does not exist
    let response = ctx
        .app
        .clone()
        .oneshot(post_json(
            &format!("/admin/schools/{}/courses", Uuid::new_v4()),
            admin,
            json!({"name": "GHOST101"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_student_spares_admins_and_absent_ids() {
    let Some(ctx) = TestContext::try_new().await else { return };
    let admin = Some(ctx.admin_token.as_str());

    let (student, _token) = ctx.create_student(&unique("doomed"), "pw").await;

    let response = ctx
        .app
        .clone()
        .oneshot(post_json(
            &format!("/admin/students/{}/delete", student.id),
            admin,
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin/students");
    assert!(Account::find_by_id(&ctx.db, student.id)
        .await
        .unwrap()
        .is_none());

    // Admin accounts are never deleted, whatever their username
    let response = ctx
        .app
        .clone()
        .oneshot(post_json(
            &format!("/admin/students/{}/delete", ctx.admin.id),
            admin,
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(Account::find_by_id(&ctx.db, ctx.admin.id)
        .await
        .unwrap()
        .is_some());

    // Deleting an absent id is a quiet no-op
    let response = ctx
        .app
        .clone()
        .oneshot(post_json(
            &format!("/admin/students/{}/delete", Uuid::new_v4()),
            admin,
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_contact_form_and_inbox() {
    let Some(ctx) = TestContext::try_new().await else { return };

    let email = format!("{}@example.com", unique("visitor"));

    // A complete submission is accepted and lands back on the home page
    let response = ctx
        .app
        .clone()
        .oneshot(post_json(
            "/contact",
            None,
            json!({"email": email, "phone": "555-0100", "message": "When do applications open?"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    // Missing details are rejected before anything is stored
    let response = ctx
        .app
        .clone()
        .oneshot(post_json(
            "/contact",
            None,
            json!({"email": "x@example.com", "phone": "", "message": ""}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Only admins read the inbox
    let response = ctx
        .app
        .clone()
        .oneshot(get_request("/admin/messages", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");

    let inbox = body_json(
        ctx.app
            .clone()
            .oneshot(get_request("/admin/messages", Some(&ctx.admin_token)))
            .await
            .unwrap(),
    )
    .await;
    assert!(inbox
        .as_array()
        .unwrap()
        .iter()
        .any(|m| m["email"] == email.as_str()));
}

#[tokio::test]
async fn test_chat_endpoint_delegates_to_responder() {
    let Some(ctx) = TestContext::try_new().await else { return };

    let response = ctx
        .app
        .clone()
        .oneshot(post_json("/get_response", None, json!({"message": "hello"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["answer"], "echo: hello");
}

#[tokio::test]
async fn test_public_pages_and_health() {
    let Some(ctx) = TestContext::try_new().await else { return };

    for uri in ["/", "/about", "/apply", "/programmes", "/contact", "/login"] {
        let response = ctx.app.clone().oneshot(get_request(uri, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "GET {}", uri);
    }

    let response = ctx
        .app
        .clone()
        .oneshot(get_request("/health", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
}
