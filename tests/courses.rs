mod common;

use axum::http::StatusCode;
use serde_json::json;

use crate::common::{
    create_course, create_subject, promote_to_instructor, setup_server, setup_test_db, signin,
    signup,
};

#[tokio::test]
async fn catalog_counts_and_subject_filter() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;

    let python = create_subject(&db, "Python", "python").await;
    let databases = create_subject(&db, "Databases", "databases").await;

    signup(&server, "instructor", "1234password").await;
    promote_to_instructor(&db, "instructor").await;
    signin(&mut server, "instructor", "1234password").await;

    let course_a = create_course(&server, python.id(), "Python Basics", "python-basics").await;
    create_course(&server, python.id(), "Advanced Python", "advanced-python").await;
    create_course(&server, databases.id(), "SQL by Example", "sql-by-example").await;

    // one module under course A so the counts differ
    server
        .put(&format!("/api/v1/courses/{course_a}/modules"))
        .json(&json!({"modules": [{"title": "Intro", "description": ""}]}))
        .await
        .assert_status_ok();

    let resp = server.get("/api/v1/courses/").await;
    resp.assert_status_ok();
    let body = resp.json::<serde_json::Value>();

    let subjects = body["subjects"].as_array().unwrap();
    assert_eq!(subjects.len(), 2);
    let py = subjects.iter().find(|s| s["slug"] == "python").unwrap();
    assert_eq!(py["total_courses"], 2);

    let courses = body["courses"].as_array().unwrap();
    assert_eq!(courses.len(), 3);
    let a = courses
        .iter()
        .find(|c| c["slug"] == "python-basics")
        .unwrap();
    assert_eq!(a["total_modules"], 1);

    // filtered to one subject
    let resp = server
        .get("/api/v1/courses/")
        .add_query_param("subject", "python")
        .await;
    resp.assert_status_ok();
    let body = resp.json::<serde_json::Value>();
    assert_eq!(body["subject"]["slug"], "python");
    assert_eq!(body["courses"].as_array().unwrap().len(), 2);

    // unknown slug is not found
    server
        .get("/api/v1/courses/")
        .add_query_param("subject", "no-such-subject")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn course_management_is_owner_scoped() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;

    let subject = create_subject(&db, "Python", "python").await;

    signup(&server, "alice", "1234password").await;
    promote_to_instructor(&db, "alice").await;
    signup(&server, "bob", "1234password").await;
    promote_to_instructor(&db, "bob").await;

    signin(&mut server, "alice", "1234password").await;
    let course_id = create_course(&server, subject.id(), "Python Basics", "python-basics").await;

    let mine = server.get("/api/v1/courses/mine").await;
    mine.assert_status_ok();
    assert_eq!(mine.json::<serde_json::Value>().as_array().unwrap().len(), 1);

    // a foreign owner sees a missing course, not a forbidden one
    signin(&mut server, "bob", "1234password").await;
    server
        .put(&format!("/api/v1/courses/{course_id}"))
        .json(&json!({
            "subject_id": subject.id(),
            "title": "Hijacked",
            "slug": "hijacked",
            "overview": "",
        }))
        .await
        .assert_status(StatusCode::NOT_FOUND);
    assert_eq!(
        server
            .get("/api/v1/courses/mine")
            .await
            .json::<serde_json::Value>()
            .as_array()
            .unwrap()
            .len(),
        0
    );

    // the owner can update
    signin(&mut server, "alice", "1234password").await;
    let resp = server
        .put(&format!("/api/v1/courses/{course_id}"))
        .json(&json!({
            "subject_id": subject.id(),
            "title": "Python Basics, 2nd ed.",
            "slug": "python-basics",
            "overview": "refreshed",
        }))
        .await;
    resp.assert_status_ok();
    assert_eq!(
        resp.json::<serde_json::Value>()["title"],
        "Python Basics, 2nd ed."
    );

    // blank title is a validation failure, nothing changes
    server
        .put(&format!("/api/v1/courses/{course_id}"))
        .json(&json!({
            "subject_id": subject.id(),
            "title": "  ",
            "slug": "python-basics",
            "overview": "",
        }))
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    // students cannot manage courses at all
    signup(&server, "carol", "1234password").await;
    server
        .post("/api/v1/courses/")
        .json(&json!({
            "subject_id": subject.id(),
            "title": "Nope",
            "slug": "nope",
            "overview": "",
        }))
        .await
        .assert_status(StatusCode::FORBIDDEN);

    // and the owner can delete
    signin(&mut server, "alice", "1234password").await;
    server
        .delete(&format!("/api/v1/courses/{course_id}"))
        .await
        .assert_status_ok();
    server
        .get(&format!("/api/v1/courses/{course_id}"))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn enrollment_is_idempotent() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;

    let subject = create_subject(&db, "Python", "python").await;

    signup(&server, "instructor", "1234password").await;
    promote_to_instructor(&db, "instructor").await;
    signin(&mut server, "instructor", "1234password").await;
    let course_id = create_course(&server, subject.id(), "Python Basics", "python-basics").await;

    let student = signup(&server, "student", "1234password").await;
    signin(&mut server, "student", "1234password").await;

    server
        .post(&format!("/api/v1/courses/{course_id}/enroll"))
        .await
        .assert_status_ok();
    // twice is fine
    server
        .post(&format!("/api/v1/courses/{course_id}/enroll"))
        .await
        .assert_status_ok();

    let rows: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM enrollments WHERE student_id = $1")
            .bind(student.id())
            .fetch_one(&db.pool)
            .await
            .unwrap();
    assert_eq!(rows, 1);

    // unknown course
    server
        .post(&format!("/api/v1/courses/{}/enroll", uuid::Uuid::new_v4()))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    // unauthenticated
    server.clear_cookies();
    server
        .post(&format!("/api/v1/courses/{course_id}/enroll"))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}
