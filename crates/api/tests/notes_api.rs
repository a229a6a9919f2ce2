//! HTTP-level integration tests for the `/api/notes` resource, including
//! multipart audio uploads.

mod common;

use axum::http::{Method, StatusCode};
use common::{body_bytes, body_json, FormPart, TEST_BASE_URL};
use jotter_db::repositories::{CategoryRepo, NoteRepo};
use serde_json::{json, Value};
use sqlx::PgPool;

/// Id of the caller's "School" default category.
async fn school_category(t: &common::TestApp, owner: i64) -> i64 {
    CategoryRepo::list_by_owner(&t.pool, owner).await.unwrap()[1].id
}

async fn create_note(t: &common::TestApp, token: &str, body: Value) -> Value {
    let response = t.post_json("/api/notes/", Some(token), body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

/// Strip the absolute origin from a media URL so it can be requested.
fn media_path(url: &Value) -> String {
    url.as_str()
        .unwrap()
        .strip_prefix(TEST_BASE_URL)
        .unwrap()
        .to_string()
}

// ---------------------------------------------------------------------------
// Create / read
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_requires_auth(pool: PgPool) {
    let t = common::build_test_app(pool);

    let response = t.get("/api/notes/", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_without_category(pool: PgPool) {
    let t = common::build_test_app(pool);
    let (user_id, token) = t.register_and_login("notes@example.com").await;

    let json = create_note(&t, &token, json!({ "title": "Test Note" })).await;

    assert_eq!(json["title"], "Test Note");
    assert_eq!(json["description"], "");
    assert_eq!(json["category"], Value::Null);
    assert_eq!(json["category_name"], Value::Null);
    assert_eq!(json["category_color"], Value::Null);
    assert_eq!(json["audio_file"], Value::Null);
    assert_eq!(json["creator"], user_id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_with_category_reports_name_and_color(pool: PgPool) {
    let t = common::build_test_app(pool);
    let (user_id, token) = t.register_and_login("notes@example.com").await;
    let school = school_category(&t, user_id).await;

    let json = create_note(
        &t,
        &token,
        json!({ "title": "Homework", "description": "Chapter 3", "category": school }),
    )
    .await;

    assert_eq!(json["category"], school);
    assert_eq!(json["category_name"], "School");
    assert_eq!(json["category_color"], "#FBE38E");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_rejects_foreign_category(pool: PgPool) {
    let t = common::build_test_app(pool);
    let (_, alice) = t.register_and_login("alice@example.com").await;
    let bob = t.register("bob@example.com").await;
    let bobs_category = school_category(&t, bob).await;

    let response = t
        .post_json(
            "/api/notes/",
            Some(&alice),
            json!({ "title": "Sneaky", "category": bobs_category }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(
        json["fields"]["category"][0],
        format!("Invalid pk \"{bobs_category}\" - object does not exist.")
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_requires_title(pool: PgPool) {
    let t = common::build_test_app(pool);
    let (_, token) = t.register_and_login("notes@example.com").await;

    let response = t
        .post_json("/api/notes/", Some(&token), json!({ "description": "no title" }))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["fields"]["title"].is_array());

    let response = t
        .post_json("/api/notes/", Some(&token), json!({ "title": "  " }))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_multipart_upload_stores_audio(pool: PgPool) {
    let t = common::build_test_app(pool);
    let (user_id, token) = t.register_and_login("audio@example.com").await;
    let school = school_category(&t, user_id).await;
    let category = school.to_string();

    let response = t
        .multipart(
            Method::POST,
            "/api/notes/",
            Some(&token),
            &[
                FormPart::Text("title", "API Audio Note"),
                FormPart::Text("description", "Recorded"),
                FormPart::Text("category", &category),
                FormPart::File {
                    name: "audio_file",
                    file_name: "api_audio.mp3",
                    content_type: "audio/mpeg",
                    data: b"file_content",
                },
            ],
        )
        .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["title"], "API Audio Note");
    assert_eq!(json["category"], school);
    assert_eq!(
        json["audio_file"],
        "http://testserver/media/voice_notes/api_audio.mp3"
    );

    // The stored file is served back unchanged.
    let response = t.get(&media_path(&json["audio_file"]), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(&body_bytes(response).await[..], b"file_content");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_oversized_bodies_rejected(pool: PgPool) {
    let t = common::build_test_app(pool);
    let (_, token) = t.register_and_login("big@example.com").await;
    let too_big = vec![b'a'; 2 * t.config.max_upload_bytes];

    let response = t
        .multipart(
            Method::POST,
            "/api/notes/",
            Some(&token),
            &[
                FormPart::Text("title", "Long memo"),
                FormPart::File {
                    name: "audio_file",
                    file_name: "long.mp3",
                    content_type: "audio/mpeg",
                    data: &too_big,
                },
            ],
        )
        .await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body_json(response).await["code"], "PAYLOAD_TOO_LARGE");

    let title = String::from_utf8(too_big).unwrap();
    let response = t
        .post_json("/api/notes/", Some(&token), json!({ "title": title }))
        .await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let response = t.get("/api/notes/", Some(&token)).await;
    assert_eq!(body_json(response).await, json!([]));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_same_file_name_gets_unique_path(pool: PgPool) {
    let t = common::build_test_app(pool);
    let (_, token) = t.register_and_login("audio@example.com").await;

    let mut urls = Vec::new();
    for content in [b"one".as_slice(), b"two".as_slice()] {
        let response = t
            .multipart(
                Method::POST,
                "/api/notes/",
                Some(&token),
                &[
                    FormPart::Text("title", "Memo"),
                    FormPart::File {
                        name: "audio_file",
                        file_name: "memo.mp3",
                        content_type: "audio/mpeg",
                        data: content,
                    },
                ],
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        urls.push(body_json(response).await["audio_file"].clone());
    }

    assert_ne!(urls[0], urls[1]);
    let second = t.get(&media_path(&urls[1]), None).await;
    assert_eq!(&body_bytes(second).await[..], b"two");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_multipart_empty_file_input_means_no_audio(pool: PgPool) {
    let t = common::build_test_app(pool);
    let (_, token) = t.register_and_login("audio@example.com").await;

    let response = t
        .multipart(
            Method::POST,
            "/api/notes/",
            Some(&token),
            &[
                FormPart::Text("title", "Text only"),
                FormPart::Text("category", ""),
                FormPart::File {
                    name: "audio_file",
                    file_name: "",
                    content_type: "application/octet-stream",
                    data: b"",
                },
            ],
        )
        .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["audio_file"], Value::Null);
    assert_eq!(json["category"], Value::Null);
}

// ---------------------------------------------------------------------------
// List / filter
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_scoped_and_filtered(pool: PgPool) {
    let t = common::build_test_app(pool);
    let (alice_id, alice) = t.register_and_login("alice@example.com").await;
    let (_, bob) = t.register_and_login("bob@example.com").await;
    let school = school_category(&t, alice_id).await;

    create_note(&t, &alice, json!({ "title": "Homework", "category": school })).await;
    create_note(&t, &alice, json!({ "title": "Loose thought" })).await;
    create_note(&t, &bob, json!({ "title": "Bob's note" })).await;

    let all = body_json(t.get("/api/notes/", Some(&alice)).await).await;
    assert_eq!(all.as_array().unwrap().len(), 2);

    let response = t
        .get(&format!("/api/notes/?category={school}"), Some(&alice))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let filtered = body_json(response).await;
    let filtered = filtered.as_array().unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0]["title"], "Homework");

    // An empty filter is no filter.
    let unfiltered = body_json(t.get("/api/notes?category=", Some(&alice)).await).await;
    assert_eq!(unfiltered.as_array().unwrap().len(), 2);

    let response = t.get("/api/notes/?category=school", Some(&alice)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Update / delete
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_patch_and_put(pool: PgPool) {
    let t = common::build_test_app(pool);
    let (user_id, token) = t.register_and_login("edit@example.com").await;
    let school = school_category(&t, user_id).await;

    let note = create_note(
        &t,
        &token,
        json!({ "title": "Draft", "description": "v1", "category": school }),
    )
    .await;
    let uri = format!("/api/notes/{}/", note["id"]);

    let response = t
        .json(Method::PATCH, &uri, Some(&token), json!({ "description": "v2" }))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["title"], "Draft");
    assert_eq!(json["description"], "v2");
    assert_eq!(json["category_name"], "School");

    let response = t
        .json(Method::PATCH, &uri, Some(&token), json!({ "category": null }))
        .await;
    let json = body_json(response).await;
    assert_eq!(json["category"], Value::Null);
    assert_eq!(json["category_name"], Value::Null);

    let response = t
        .json(Method::PUT, &uri, Some(&token), json!({ "description": "no title" }))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = t
        .json(Method::PUT, &uri, Some(&token), json!({ "title": "Final" }))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["title"], "Final");
    assert_eq!(json["description"], "v2");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_replacing_audio_removes_old_file(pool: PgPool) {
    let t = common::build_test_app(pool);
    let (_, token) = t.register_and_login("replace@example.com").await;

    let response = t
        .multipart(
            Method::POST,
            "/api/notes/",
            Some(&token),
            &[
                FormPart::Text("title", "Voice"),
                FormPart::File {
                    name: "audio_file",
                    file_name: "first.mp3",
                    content_type: "audio/mpeg",
                    data: b"first",
                },
            ],
        )
        .await;
    let note = body_json(response).await;
    let uri = format!("/api/notes/{}", note["id"]);
    assert!(t.media_dir.path().join("voice_notes/first.mp3").exists());

    let response = t
        .multipart(
            Method::PATCH,
            &uri,
            Some(&token),
            &[FormPart::File {
                name: "audio_file",
                file_name: "second.mp3",
                content_type: "audio/mpeg",
                data: b"second",
            }],
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(
        json["audio_file"],
        "http://testserver/media/voice_notes/second.mp3"
    );
    assert_eq!(json["title"], "Voice");
    assert!(!t.media_dir.path().join("voice_notes/first.mp3").exists());

    // Detach through JSON.
    let response = t
        .json(Method::PATCH, &uri, Some(&token), json!({ "audio_file": null }))
        .await;
    assert_eq!(body_json(response).await["audio_file"], Value::Null);
    assert!(!t.media_dir.path().join("voice_notes/second.mp3").exists());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_own_note(pool: PgPool) {
    let t = common::build_test_app(pool);
    let (user_id, token) = t.register_and_login("delete@example.com").await;
    let note = create_note(&t, &token, json!({ "title": "Bye" })).await;
    let uri = format!("/api/notes/{}", note["id"]);

    let response = t.delete(&uri, Some(&token)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    assert_eq!(t.get(&uri, Some(&token)).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(NoteRepo::count_by_owner(&t.pool, user_id).await.unwrap(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_other_users_note_is_not_found(pool: PgPool) {
    let t = common::build_test_app(pool);
    let (_, alice) = t.register_and_login("alice@example.com").await;
    let (bob_id, bob) = t.register_and_login("bob@example.com").await;

    let note = create_note(&t, &bob, json!({ "title": "Bob's secret" })).await;
    let uri = format!("/api/notes/{}/", note["id"]);

    assert_eq!(t.get(&uri, Some(&alice)).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        t.json(Method::PATCH, &uri, Some(&alice), json!({ "title": "Mine" }))
            .await
            .status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(t.delete(&uri, Some(&alice)).await.status(), StatusCode::NOT_FOUND);

    // Still there for Bob, unchanged.
    assert_eq!(NoteRepo::count_by_owner(&t.pool, bob_id).await.unwrap(), 1);
    let response = t.get(&uri, Some(&bob)).await;
    assert_eq!(body_json(response).await["title"], "Bob's secret");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unparsable_note_id_is_not_found(pool: PgPool) {
    let t = common::build_test_app(pool);
    let (_, token) = t.register_and_login("ids@example.com").await;

    for uri in ["/api/notes/abc/", "/api/notes/99999999999999999999/"] {
        let response = t.get(uri, Some(&token)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["error"], "Not found.");

        let response = t
            .json(Method::PUT, uri, Some(&token), json!({ "title": "x" }))
            .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = t.delete(uri, Some(&token)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_deleting_category_keeps_notes(pool: PgPool) {
    let t = common::build_test_app(pool);
    let (user_id, token) = t.register_and_login("setnull@example.com").await;
    let school = school_category(&t, user_id).await;

    let note = create_note(&t, &token, json!({ "title": "Filed", "category": school })).await;

    let response = t
        .delete(&format!("/api/categories/{school}/"), Some(&token))
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = t
        .get(&format!("/api/notes/{}/", note["id"]), Some(&token))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["category"], Value::Null);
    assert_eq!(json["category_name"], Value::Null);
}
