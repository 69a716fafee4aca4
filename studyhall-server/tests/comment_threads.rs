use axum::http::StatusCode;
use serde_json::{Value, json};

#[path = "support/mod.rs"]
mod support;

use studyhall_core::types::PostId;
use support::{build_test_app, comment_id, ids, post_id, user};

#[tokio::test]
async fn reply_to_a_reply_is_reparented_with_mention() {
    let app = build_test_app();
    let (alice, bob, carol, dave) = (user(), user(), user(), user());

    let post = app.create_post(alice, "Linear algebra", "Eigenvalues?").await;
    let post = post_id(&post);

    let top = app
        .created_comment(bob, &post, "Start with the polynomial", None)
        .await;
    let top_id = comment_id(&top);
    assert_eq!(top["parentId"], Value::Null);

    let reply = app.created_comment(carol, &post, "Thanks!", Some(top_id)).await;
    assert_eq!(reply["parentId"], json!(top_id));
    assert_eq!(reply["mentionedUserId"], Value::Null);

    let nested = app
        .created_comment(dave, &post, "Same here", Some(comment_id(&reply)))
        .await;
    assert_eq!(nested["parentId"], json!(top_id));
    assert_eq!(nested["mentionedUserId"], json!(carol.to_string()));
    assert_eq!(nested["authorId"], json!(dave.to_string()));
}

#[tokio::test]
async fn top_level_comments_page_newest_first_with_total() {
    let app = build_test_app();
    let (author, reader) = (user(), user());
    let post = post_id(&app.create_post(author, "Exam", "Tips").await);

    let c1 = comment_id(&app.created_comment(reader, &post, "one", None).await);
    let c2 = comment_id(&app.created_comment(reader, &post, "two", None).await);
    let c3 = comment_id(&app.created_comment(reader, &post, "three", None).await);
    app.created_comment(author, &post, "reply", Some(c1)).await;

    let path = format!("/api/v1/posts/{post}/comments");
    let first = app.get_page(reader, &path, 2, None).await;
    assert_eq!(ids(&first), vec![json!(c3), json!(c2)]);
    assert_eq!(first["pagination"]["hasMore"], json!(true));
    assert_eq!(first["pagination"]["nextCursor"], json!(c2));
    assert_eq!(first["pagination"]["total"], json!(4));

    let second = app
        .get_page(reader, &path, 2, Some(&first["pagination"]["nextCursor"]))
        .await;
    assert_eq!(ids(&second), vec![json!(c1)]);
    assert_eq!(second["pagination"]["hasMore"], json!(false));
    assert_eq!(second["pagination"]["nextCursor"], Value::Null);
}

#[tokio::test]
async fn replies_page_oldest_first_with_reply_count() {
    let app = build_test_app();
    let (author, reader) = (user(), user());
    let post = post_id(&app.create_post(author, "Lab", "Report").await);
    let top = comment_id(&app.created_comment(reader, &post, "question", None).await);

    let mut replies = Vec::new();
    for text in ["a", "b", "c"] {
        let reply = app.created_comment(author, &post, text, Some(top)).await;
        replies.push(json!(comment_id(&reply)));
    }

    let path = format!("/api/v1/comments/{top}/replies");
    let first = app.get_page(reader, &path, 2, None).await;
    assert_eq!(ids(&first), replies[..2].to_vec());
    assert_eq!(first["pagination"]["hasMore"], json!(true));
    assert_eq!(first["pagination"]["total"], json!(3));

    let second = app
        .get_page(reader, &path, 2, Some(&first["pagination"]["nextCursor"]))
        .await;
    assert_eq!(ids(&second), replies[2..].to_vec());
    assert_eq!(second["pagination"]["hasMore"], json!(false));
}

#[tokio::test]
async fn exactly_limit_comments_report_no_more_pages() {
    let app = build_test_app();
    let author = user();
    let post = post_id(&app.create_post(author, "Quiz", "Week 3").await);
    app.created_comment(author, &post, "x", None).await;
    app.created_comment(author, &post, "y", None).await;

    let page = app
        .get_page(author, &format!("/api/v1/posts/{post}/comments"), 2, None)
        .await;
    assert_eq!(ids(&page).len(), 2);
    assert_eq!(page["pagination"]["hasMore"], json!(false));
    assert_eq!(page["pagination"]["nextCursor"], Value::Null);
}

#[tokio::test]
async fn comment_preconditions_map_to_http_errors() {
    let app = build_test_app();
    let author = user();
    let post_a = post_id(&app.create_post(author, "A", "first").await);
    let post_b = post_id(&app.create_post(author, "B", "second").await);
    let on_a = comment_id(&app.created_comment(author, &post_a, "on a", None).await);

    let mismatch = app.comment(author, &post_b, "wrong thread", Some(on_a)).await;
    mismatch.assert_status(StatusCode::BAD_REQUEST);

    let missing_parent = app.comment(author, &post_a, "orphan", Some(9_999)).await;
    missing_parent.assert_status(StatusCode::NOT_FOUND);
    let body: Value = missing_parent.json();
    assert_eq!(body["error"]["status"], json!(404));

    let missing_post = app
        .comment(author, &uuid::Uuid::now_v7().to_string(), "nowhere", None)
        .await;
    missing_post.assert_status(StatusCode::NOT_FOUND);

    let empty = app.comment(author, &post_a, "   ", None).await;
    empty.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn commenting_on_a_hidden_post_is_not_found() {
    let app = build_test_app();
    let (author, reader) = (user(), user());
    let post = post_id(&app.create_post(author, "Withdrawn", "body").await);
    let top = comment_id(&app.created_comment(reader, &post, "before", None).await);

    assert!(
        app.store
            .set_post_hidden(PostId(post.parse().expect("uuid")), true)
            .await
    );

    let response = app.comment(reader, &post, "after", None).await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["error"]["status"], json!(404));

    app.comment(reader, &post, "reply after", Some(top))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_limits_and_cursors_are_rejected() {
    let app = build_test_app();
    let author = user();
    let post = post_id(&app.create_post(author, "Limits", "body").await);
    let top = comment_id(&app.created_comment(author, &post, "top", None).await);

    for (path, limit) in [
        (format!("/api/v1/posts/{post}/comments"), "0"),
        (format!("/api/v1/posts/{post}/comments"), "51"),
        (format!("/api/v1/comments/{top}/replies"), "41"),
        (format!("/api/v1/comments/{top}/replies"), "-1"),
    ] {
        let response = app
            .server
            .get(&path)
            .add_header("x-user-id", author.to_string())
            .add_query_param("limit", limit)
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    let bad_cursor = app
        .server
        .get(&format!("/api/v1/posts/{post}/comments"))
        .add_header("x-user-id", author.to_string())
        .add_query_param("cursor", "not-a-number")
        .await;
    bad_cursor.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = bad_cursor.json();
    assert_eq!(body["error"]["status"], json!(400));
}

#[tokio::test]
async fn unknown_cursor_yields_an_empty_page() {
    let app = build_test_app();
    let author = user();
    let post = post_id(&app.create_post(author, "Cursor", "body").await);
    app.created_comment(author, &post, "only", None).await;

    let page = app
        .get_page(
            author,
            &format!("/api/v1/posts/{post}/comments"),
            5,
            Some(&json!(123_456)),
        )
        .await;
    assert!(ids(&page).is_empty());
    assert_eq!(page["pagination"]["hasMore"], json!(false));
}

#[tokio::test]
async fn only_owner_or_moderator_may_delete_and_replies_follow() {
    let app = build_test_app();
    let (author, other, moderator) = (user(), user(), user());
    let post = post_id(&app.create_post(author, "Thread", "body").await);
    let top = comment_id(&app.created_comment(author, &post, "top", None).await);
    let reply = comment_id(&app.created_comment(other, &post, "reply", Some(top)).await);

    app.delete_as(other, false, &format!("/api/v1/comments/{top}"))
        .await
        .assert_status(StatusCode::FORBIDDEN);

    app.delete_as(moderator, true, &format!("/api/v1/comments/{top}"))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    app.get_as(author, &format!("/api/v1/comments/{reply}"))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let page = app
        .get_page(author, &format!("/api/v1/posts/{post}/comments"), 10, None)
        .await;
    assert!(ids(&page).is_empty());
    assert_eq!(page["pagination"]["total"], json!(0));
}

#[tokio::test]
async fn requests_without_identity_are_unauthorized() {
    let app = build_test_app();
    let response = app.server.get("/api/v1/posts").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["error"]["status"], json!(401));
}

#[tokio::test]
async fn malformed_comment_id_uses_error_envelope() {
    let app = build_test_app();
    let viewer = user();

    for path in ["/api/v1/comments/abc", "/api/v1/comments/abc/replies"] {
        let response = app.get_as(viewer, path).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["error"]["status"], json!(400));
    }

    app.delete_as(viewer, false, "/api/v1/comments/1.5")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}
