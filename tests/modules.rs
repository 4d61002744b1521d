mod common;

use axum::http::StatusCode;
use serde_json::json;

use crate::common::{
    add_module, create_course, create_subject, promote_to_instructor, setup_server, setup_test_db,
    signin, signup,
};

#[tokio::test]
async fn module_positions_start_at_zero_per_course() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;

    let subject = create_subject(&db, "Programming", "programming").await;
    signup(&server, "instructor", "1234password").await;
    promote_to_instructor(&db, "instructor").await;
    signin(&mut server, "instructor", "1234password").await;

    let python = create_course(&server, subject.id(), "Python", "python").await;
    let rust = create_course(&server, subject.id(), "Rust", "rust").await;

    add_module(&server, python, "Basics").await;
    add_module(&server, python, "Functions").await;
    add_module(&server, python, "Classes").await;

    let resp = server.get(&format!("/api/v1/courses/{python}/modules")).await;
    resp.assert_status_ok();
    let body = resp.json::<serde_json::Value>();
    let positions: Vec<i64> = body["modules"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["position"].as_i64().unwrap())
        .collect();
    assert_eq!(positions, vec![0, 1, 2]);

    // a different course starts its own sequence
    add_module(&server, rust, "Views").await;
    let resp = server.get(&format!("/api/v1/courses/{rust}/modules")).await;
    let body = resp.json::<serde_json::Value>();
    assert_eq!(body["modules"][0]["position"], 0);
}

#[tokio::test]
async fn module_set_is_validated_as_a_unit() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;

    let subject = create_subject(&db, "Programming", "programming").await;
    signup(&server, "instructor", "1234password").await;
    promote_to_instructor(&db, "instructor").await;
    signin(&mut server, "instructor", "1234password").await;

    let course = create_course(&server, subject.id(), "Python", "python").await;
    let intro = add_module(&server, course, "Intro").await;

    // one bad row fails the whole submission and persists nothing
    let resp = server
        .put(&format!("/api/v1/courses/{course}/modules"))
        .json(&json!({
            "modules": [
                { "id": intro, "title": "Renamed intro", "description": "" },
                { "title": "   ", "description": "orphan" },
            ]
        }))
        .await;
    resp.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    let body = server
        .get(&format!("/api/v1/courses/{course}/modules"))
        .await
        .json::<serde_json::Value>();
    let modules = body["modules"].as_array().unwrap();
    assert_eq!(modules.len(), 1);
    assert_eq!(modules[0]["title"], "Intro");

    // update and delete rows apply together
    let second = add_module(&server, course, "Second").await;
    let resp = server
        .put(&format!("/api/v1/courses/{course}/modules"))
        .json(&json!({
            "modules": [
                { "id": intro, "title": "Welcome", "description": "updated" },
                { "id": second, "title": "Second", "description": "", "delete": true },
                { "title": "Third", "description": "" },
            ]
        }))
        .await;
    resp.assert_status_ok();
    let body = resp.json::<serde_json::Value>();
    let modules = body["modules"].as_array().unwrap();
    assert_eq!(modules.len(), 2);
    assert_eq!(modules[0]["title"], "Welcome");
    // the delete lands before the insert, so the next free position is 1
    assert_eq!(modules[1]["title"], "Third");
    assert_eq!(modules[1]["position"], 1);
}

#[tokio::test]
async fn module_reorder_skips_foreign_rows() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;

    let subject = create_subject(&db, "Programming", "programming").await;
    signup(&server, "alice", "1234password").await;
    promote_to_instructor(&db, "alice").await;
    signup(&server, "bob", "1234password").await;
    promote_to_instructor(&db, "bob").await;

    signin(&mut server, "alice", "1234password").await;
    let alice_course = create_course(&server, subject.id(), "Python", "python").await;
    let m0 = add_module(&server, alice_course, "First").await;
    let m1 = add_module(&server, alice_course, "Second").await;

    signin(&mut server, "bob", "1234password").await;
    let bob_course = create_course(&server, subject.id(), "Rust", "rust").await;
    let foreign = add_module(&server, bob_course, "Bob's module").await;

    // alice swaps her modules and slips bob's id into the payload
    signin(&mut server, "alice", "1234password").await;
    let order = std::collections::HashMap::from([(m0, 1), (m1, 0), (foreign, 42)]);
    let resp = server.post("/api/v1/modules/order").json(&order).await;
    resp.assert_status_ok();
    assert_eq!(resp.json::<serde_json::Value>()["saved"], "OK");

    let body = server
        .get(&format!("/api/v1/courses/{alice_course}/modules"))
        .await
        .json::<serde_json::Value>();
    let modules = body["modules"].as_array().unwrap();
    assert_eq!(modules[0]["title"], "Second");
    assert_eq!(modules[1]["title"], "First");

    // bob's module kept its position
    let position: i32 = sqlx::query_scalar("SELECT position FROM modules WHERE id = $1")
        .bind(foreign)
        .fetch_one(&db.pool)
        .await
        .unwrap();
    assert_eq!(position, 0);
}
