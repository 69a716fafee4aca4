use axum::http::StatusCode;
use serde_json::{Value, json};

#[path = "support/mod.rs"]
mod support;

use studyhall_core::{
    domain::saved::saved_post_cursor,
    pagination::CursorCodec,
    types::{PostId, UserId},
};
use support::{TestApp, build_test_app, post_id, user};

fn saved_ids(page: &Value) -> Vec<String> {
    page["data"]
        .as_array()
        .expect("data array")
        .iter()
        .map(|row| row["post"]["id"].as_str().expect("post id").to_string())
        .collect()
}

async fn like(app: &TestApp, viewer: uuid::Uuid, post: &str) -> Value {
    let response = app
        .server
        .put(&format!("/api/v1/posts/{post}/like"))
        .add_header("x-user-id", viewer.to_string())
        .await;
    response.assert_status_ok();
    response.json()
}

#[tokio::test]
async fn liking_twice_reports_no_change() {
    let app = build_test_app();
    let (author, reader) = (user(), user());
    let post = post_id(&app.create_post(author, "Flashcards", "Deck").await);

    assert_eq!(like(&app, reader, &post).await, json!({ "saved": true, "changed": true }));
    assert_eq!(like(&app, reader, &post).await, json!({ "saved": true, "changed": false }));

    let page = app.get_page(reader, "/api/v1/users/me/likes", 10, None).await;
    assert_eq!(saved_ids(&page), vec![post.clone()]);
    assert_eq!(page["data"][0]["userId"], json!(reader.to_string()));

    let unliked = app
        .delete_as(reader, false, &format!("/api/v1/posts/{post}/like"))
        .await;
    unliked.assert_status_ok();
    assert_eq!(unliked.json::<Value>(), json!({ "saved": false, "changed": true }));

    let page = app.get_page(reader, "/api/v1/users/me/likes", 10, None).await;
    assert!(saved_ids(&page).is_empty());
}

#[tokio::test]
async fn likes_chain_through_post_id_cursor() {
    let app = build_test_app();
    let (author, reader) = (user(), user());

    let mut posts = Vec::new();
    for title in ["one", "two", "three", "four", "five"] {
        let post = post_id(&app.create_post(author, title, "body").await);
        like(&app, reader, &post).await;
        posts.push(post);
    }
    posts.reverse();

    let mut seen = Vec::new();
    let mut cursor: Option<Value> = None;
    loop {
        let page = app
            .get_page(reader, "/api/v1/users/me/likes", 2, cursor.as_ref())
            .await;
        seen.extend(saved_ids(&page));
        if page["pagination"]["hasMore"] != json!(true) {
            assert_eq!(page["pagination"]["nextCursor"], Value::Null);
            break;
        }
        let next = page["pagination"]["nextCursor"].clone();
        assert_eq!(next, json!(seen.last().expect("non-empty page")));
        cursor = Some(next);
    }

    assert_eq!(seen, posts);
}

#[tokio::test]
async fn compound_cursor_token_is_accepted() {
    let app = build_test_app();
    let (author, reader) = (user(), user());
    let first = post_id(&app.create_post(author, "first", "body").await);
    let second = post_id(&app.create_post(author, "second", "body").await);
    like(&app, reader, &first).await;
    like(&app, reader, &second).await;

    let token = CursorCodec::encode_compound(&saved_post_cursor(
        UserId(reader),
        PostId(second.parse().expect("uuid")),
    ));
    let page = app
        .get_page(reader, "/api/v1/users/me/likes", 10, Some(&json!(token)))
        .await;
    assert_eq!(saved_ids(&page), vec![first]);
}

#[tokio::test]
async fn likes_and_bookmarks_are_separate_lists() {
    let app = build_test_app();
    let (author, reader) = (user(), user());
    let liked = post_id(&app.create_post(author, "liked", "body").await);
    let bookmarked = post_id(&app.create_post(author, "bookmarked", "body").await);

    like(&app, reader, &liked).await;
    app.server
        .put(&format!("/api/v1/posts/{bookmarked}/bookmark"))
        .add_header("x-user-id", reader.to_string())
        .await
        .assert_status_ok();

    let likes = app.get_page(reader, "/api/v1/users/me/likes", 10, None).await;
    assert_eq!(saved_ids(&likes), vec![liked]);
    let bookmarks = app
        .get_page(reader, "/api/v1/users/me/bookmarks", 10, None)
        .await;
    assert_eq!(saved_ids(&bookmarks), vec![bookmarked]);
}

#[tokio::test]
async fn hidden_posts_drop_out_of_saved_lists() {
    let app = build_test_app();
    let (author, reader) = (user(), user());
    let post = post_id(&app.create_post(author, "soon hidden", "body").await);
    like(&app, reader, &post).await;

    assert!(
        app.store
            .set_post_hidden(PostId(post.parse().expect("uuid")), true)
            .await
    );

    let page = app.get_page(reader, "/api/v1/users/me/likes", 10, None).await;
    assert!(saved_ids(&page).is_empty());
}

#[tokio::test]
async fn saving_a_hidden_post_is_not_found() {
    let app = build_test_app();
    let (author, reader) = (user(), user());
    let post = post_id(&app.create_post(author, "Withdrawn", "body").await);

    assert!(
        app.store
            .set_post_hidden(PostId(post.parse().expect("uuid")), true)
            .await
    );

    for action in ["like", "bookmark"] {
        let response = app
            .server
            .put(&format!("/api/v1/posts/{post}/{action}"))
            .add_header("x-user-id", reader.to_string())
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
        let body: Value = response.json();
        assert_eq!(body["error"]["status"], json!(404));
    }
}

#[tokio::test]
async fn saving_unknown_post_is_not_found() {
    let app = build_test_app();
    let response = app
        .server
        .put(&format!("/api/v1/posts/{}/bookmark", uuid::Uuid::now_v7()))
        .add_header("x-user-id", user().to_string())
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn garbage_saved_cursor_is_rejected() {
    let app = build_test_app();
    let response = app
        .server
        .get("/api/v1/users/me/bookmarks")
        .add_header("x-user-id", user().to_string())
        .add_query_param("cursor", "%%%")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}
