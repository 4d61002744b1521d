mod common;

use axum::http::StatusCode;

use crate::common::{
    create_course, create_subject, promote_to_instructor, setup_server, setup_test_db, signin,
    signup,
};

#[tokio::test]
async fn chat_room_requires_enrollment() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;

    let subject = create_subject(&db, "Python", "python").await;
    signup(&server, "instructor", "1234password").await;
    promote_to_instructor(&db, "instructor").await;
    signin(&mut server, "instructor", "1234password").await;
    let course_id = create_course(&server, subject.id(), "Python Basics", "python-basics").await;

    signup(&server, "student", "1234password").await;
    signin(&mut server, "student", "1234password").await;

    // not enrolled yet
    server
        .get(&format!("/api/v1/chat/room/{course_id}"))
        .await
        .assert_status(StatusCode::FORBIDDEN);

    server
        .post(&format!("/api/v1/courses/{course_id}/enroll"))
        .await
        .assert_status_ok();

    let resp = server.get(&format!("/api/v1/chat/room/{course_id}")).await;
    resp.assert_status_ok();
    let body = resp.json::<serde_json::Value>();
    assert_eq!(body["course_title"], "Python Basics");
    assert_eq!(
        body["channel"],
        format!("course.{course_id}")
    );

    // unauthenticated callers never reach the gate
    server.clear_cookies();
    server
        .get(&format!("/api/v1/chat/room/{course_id}"))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}
