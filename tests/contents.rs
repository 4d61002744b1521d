mod common;

use std::collections::HashMap;

use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use crate::common::{
    add_module, create_course, create_subject, promote_to_instructor, setup_server, setup_test_db,
    signin, signup,
};

async fn setup_module(
    db: &common::TestDb,
    server: &mut axum_test::TestServer,
) -> (Uuid, Uuid) {
    let subject = create_subject(db, "Programming", "programming").await;
    signup(server, "instructor", "1234password").await;
    promote_to_instructor(db, "instructor").await;
    signin(server, "instructor", "1234password").await;
    let course = create_course(server, subject.id(), "Python", "python").await;
    let module = add_module(server, course, "Basics").await;
    (course, module)
}

async fn create_text_content(
    server: &axum_test::TestServer,
    module: Uuid,
    title: &str,
    body: &str,
) -> Uuid {
    let resp = server
        .post(&format!("/api/v1/modules/{module}/contents/text"))
        .json(&json!({
            "title": title,
            "payload": { "kind": "text", "body": body },
        }))
        .await;
    resp.assert_status_ok();
    resp.json::<serde_json::Value>()["id"]
        .as_str()
        .unwrap()
        .parse()
        .unwrap()
}

#[tokio::test]
async fn content_kinds_are_a_closed_set() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;
    let (_, module) = setup_module(&db, &mut server).await;

    create_text_content(&server, module, "Hello", "hello world").await;

    // every kind in the set is accepted
    server
        .post(&format!("/api/v1/modules/{module}/contents/video"))
        .json(&json!({
            "title": "Intro video",
            "payload": { "kind": "video", "url": "https://example.org/intro.mp4" },
        }))
        .await
        .assert_status_ok();

    // an unknown label never reaches the store
    server
        .post(&format!("/api/v1/modules/{module}/contents/audio"))
        .json(&json!({
            "title": "Podcast",
            "payload": { "kind": "text", "body": "nope" },
        }))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    // a payload that disagrees with the label is a validation failure
    server
        .post(&format!("/api/v1/modules/{module}/contents/video"))
        .json(&json!({
            "title": "Mislabeled",
            "payload": { "kind": "text", "body": "not a video" },
        }))
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn content_positions_follow_the_module() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;
    let (course, module) = setup_module(&db, &mut server).await;

    create_text_content(&server, module, "First", "a").await;
    create_text_content(&server, module, "Second", "b").await;

    // a second module keeps its own sequence
    let other = add_module(&server, course, "Advanced").await;
    let resp = server
        .post(&format!("/api/v1/modules/{other}/contents/text"))
        .json(&json!({
            "title": "Fresh start",
            "payload": { "kind": "text", "body": "c" },
        }))
        .await;
    resp.assert_status_ok();
    assert_eq!(resp.json::<serde_json::Value>()["position"], 0);

    let body = server
        .get(&format!("/api/v1/modules/{module}/contents"))
        .await
        .json::<serde_json::Value>();
    let positions: Vec<i64> = body["contents"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["position"].as_i64().unwrap())
        .collect();
    assert_eq!(positions, vec![0, 1]);
}

#[tokio::test]
async fn content_update_keeps_kind_and_position() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;
    let (_, module) = setup_module(&db, &mut server).await;

    let content = create_text_content(&server, module, "Hello", "v1").await;

    let resp = server
        .put(&format!("/api/v1/contents/{content}"))
        .json(&json!({
            "title": "Hello, edited",
            "payload": { "kind": "text", "body": "v2" },
        }))
        .await;
    resp.assert_status_ok();
    let body = resp.json::<serde_json::Value>();
    assert_eq!(body["title"], "Hello, edited");
    assert_eq!(body["payload"]["body"], "v2");

    // the kind is fixed at creation
    server
        .put(&format!("/api/v1/contents/{content}"))
        .json(&json!({
            "title": "Now a video",
            "payload": { "kind": "video", "url": "https://example.org/x.mp4" },
        }))
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn content_delete_cascades_to_item() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;
    let (_, module) = setup_module(&db, &mut server).await;

    let content = create_text_content(&server, module, "Doomed", "bye").await;

    let item_id: Uuid = sqlx::query_scalar("SELECT item_id FROM contents WHERE id = $1")
        .bind(content)
        .fetch_one(&db.pool)
        .await
        .unwrap();

    server
        .delete(&format!("/api/v1/contents/{content}"))
        .await
        .assert_status_ok();

    server
        .get(&format!("/api/v1/contents/{content}"))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let items: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items WHERE id = $1")
        .bind(item_id)
        .fetch_one(&db.pool)
        .await
        .unwrap();
    assert_eq!(items, 0);
}

#[tokio::test]
async fn content_reorder_skips_foreign_rows() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;
    let (_, module) = setup_module(&db, &mut server).await;

    let c0 = create_text_content(&server, module, "First", "a").await;
    let c1 = create_text_content(&server, module, "Second", "b").await;

    // a second instructor with content of their own
    let subject_id = create_subject(&db, "Ops", "ops").await.id();
    signup(&server, "mallory", "1234password").await;
    promote_to_instructor(&db, "mallory").await;
    signin(&mut server, "mallory", "1234password").await;
    let foreign_course = create_course(&server, subject_id, "Ops 101", "ops-101").await;
    let foreign_module = add_module(&server, foreign_course, "Infra").await;
    let foreign = create_text_content(&server, foreign_module, "Theirs", "x").await;

    signin(&mut server, "instructor", "1234password").await;
    let order = HashMap::from([(c0, 1), (c1, 0), (foreign, 99)]);
    let resp = server.post("/api/v1/contents/order").json(&order).await;
    resp.assert_status_ok();
    assert_eq!(resp.json::<serde_json::Value>()["saved"], "OK");

    let body = server
        .get(&format!("/api/v1/modules/{module}/contents"))
        .await
        .json::<serde_json::Value>();
    let titles: Vec<&str> = body["contents"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["item"]["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Second", "First"]);

    let position: i32 = sqlx::query_scalar("SELECT position FROM contents WHERE id = $1")
        .bind(foreign)
        .fetch_one(&db.pool)
        .await
        .unwrap();
    assert_eq!(position, 0);
}
