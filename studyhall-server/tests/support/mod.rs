#![allow(dead_code)]

use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::{TestResponse, TestServer};
use serde_json::{Value, json};
use uuid::Uuid;

use studyhall_core::database::InMemoryStore;
use studyhall_server::{
    AppState, create_app,
    infra::config::Config,
    middleware::{USER_ID_HEADER, USER_ROLE_HEADER},
};

pub struct TestApp {
    pub server: TestServer,
    pub store: InMemoryStore,
}

pub fn build_test_app() -> TestApp {
    let mut config = Config::default();
    config.storage.in_memory = true;

    let store = InMemoryStore::new();
    let state = AppState::in_memory(&store, Arc::new(config));
    let server = TestServer::builder()
        .build(create_app(state))
        .expect("test server");

    TestApp { server, store }
}

pub fn user() -> Uuid {
    Uuid::now_v7()
}

impl TestApp {
    pub async fn get_as(&self, viewer: Uuid, path: &str) -> TestResponse {
        self.server
            .get(path)
            .add_header(USER_ID_HEADER, viewer.to_string())
            .await
    }

    pub async fn get_page(
        &self,
        viewer: Uuid,
        path: &str,
        limit: u32,
        cursor: Option<&Value>,
    ) -> Value {
        let mut request = self
            .server
            .get(path)
            .add_header(USER_ID_HEADER, viewer.to_string())
            .add_query_param("limit", limit);
        if let Some(cursor) = cursor {
            let token = match cursor {
                Value::String(token) => token.clone(),
                other => other.to_string(),
            };
            request = request.add_query_param("cursor", token);
        }

        let response = request.await;
        response.assert_status_ok();
        response.json()
    }

    pub async fn create_post(&self, author: Uuid, title: &str, content: &str) -> Value {
        let response = self
            .server
            .post("/api/v1/posts")
            .add_header(USER_ID_HEADER, author.to_string())
            .json(&json!({ "title": title, "content": content }))
            .await;
        response.assert_status(StatusCode::CREATED);
        response.json()
    }

    pub async fn comment(
        &self,
        author: Uuid,
        post_id: &str,
        content: &str,
        parent_id: Option<i64>,
    ) -> TestResponse {
        self.server
            .post(&format!("/api/v1/posts/{post_id}/comments"))
            .add_header(USER_ID_HEADER, author.to_string())
            .json(&json!({ "content": content, "parentId": parent_id }))
            .await
    }

    pub async fn created_comment(
        &self,
        author: Uuid,
        post_id: &str,
        content: &str,
        parent_id: Option<i64>,
    ) -> Value {
        let response = self.comment(author, post_id, content, parent_id).await;
        response.assert_status(StatusCode::CREATED);
        response.json()
    }

    pub async fn delete_as(&self, viewer: Uuid, moderator: bool, path: &str) -> TestResponse {
        let mut request = self
            .server
            .delete(path)
            .add_header(USER_ID_HEADER, viewer.to_string());
        if moderator {
            request = request.add_header(USER_ROLE_HEADER, "moderator");
        }
        request.await
    }
}

pub fn ids(page: &Value) -> Vec<Value> {
    page["data"]
        .as_array()
        .expect("data array")
        .iter()
        .map(|row| row["id"].clone())
        .collect()
}

pub fn post_id(post: &Value) -> String {
    post["id"].as_str().expect("post id").to_string()
}

pub fn comment_id(comment: &Value) -> i64 {
    comment["id"].as_i64().expect("comment id")
}
