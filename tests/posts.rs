//! Post Tests
//!
//! Covers post creation, replies, listings, and likes.

mod common;

use axum::http::StatusCode;
use common::app;
use pamps::infra::store::Store;
use serde_json::json;

// ===========================================================================
// Creation and listing
// ===========================================================================

#[tokio::test]
async fn create_root_posts() {
    let app = app().await;
    let user_1 = app.create_user("user_1").await;

    for n in 1..=2 {
        let resp = app
            .post_json(
                "/post",
                json!({ "text": format!("hello test {}", n) }),
                Some(&user_1.access_token),
            )
            .await;

        assert_eq!(resp.status, StatusCode::CREATED);
        let body = resp.json();
        assert_eq!(body["text"], format!("hello test {}", n));
        assert!(body["parent_id"].is_null());
        assert_eq!(body["user_id"].as_i64().unwrap(), user_1.id);
        assert!(body["date"].is_string());
    }
}

#[tokio::test]
async fn create_post_requires_authentication() {
    let app = app().await;

    let resp = app.post_json("/post", json!({ "text": "anon" }), None).await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn create_post_empty_text() {
    let app = app().await;
    let user_1 = app.create_user("user_1").await;

    let resp = app
        .post_json("/post", json!({ "text": "   " }), Some(&user_1.access_token))
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.detail(), "Post text cannot be empty");
}

#[tokio::test]
async fn reply_to_missing_parent() {
    let app = app().await;
    let user_1 = app.create_user("user_1").await;

    let resp = app
        .post_json(
            "/post",
            json!({ "text": "reply", "parent_id": 42 }),
            Some(&user_1.access_token),
        )
        .await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.detail(), "Parent post not found");
}

/// user_1 writes two posts, both users reply to the first one.
async fn seed_thread(app: &common::TestApp) -> (common::TestUser, common::TestUser, i64) {
    let user_1 = app.create_user("user_1").await;
    let user_2 = app.create_user("user_2").await;

    let first = app.create_post(&user_1, "hello test 1", None).await;
    app.create_post(&user_1, "hello test 2", None).await;
    app.create_post(&user_1, "reply from user1", Some(first)).await;
    app.create_post(&user_2, "reply from user2", Some(first)).await;

    (user_1, user_2, first)
}

#[tokio::test]
async fn post_list_without_replies() {
    let app = app().await;
    seed_thread(&app).await;

    let resp = app.get("/post", None).await;
    assert_eq!(resp.status, StatusCode::OK);
    let posts = resp.json();
    let posts = posts.as_array().unwrap();
    assert_eq!(posts.len(), 2);
    for post in posts {
        assert!(post["parent_id"].is_null());
        assert!(post["text"].as_str().unwrap().contains("hello test"));
    }
}

#[tokio::test]
async fn post_detail_includes_replies() {
    let app = app().await;
    let (user_1, _, first) = seed_thread(&app).await;

    let resp = app.get(&format!("/post/{}", first), None).await;
    assert_eq!(resp.status, StatusCode::OK);
    let body = resp.json();
    assert_eq!(body["id"].as_i64().unwrap(), first);
    assert_eq!(body["user_id"].as_i64().unwrap(), user_1.id);
    assert_eq!(body["text"], "hello test 1");
    assert!(body["parent_id"].is_null());

    let replies = body["replies"].as_array().unwrap();
    assert_eq!(replies.len(), 2);
    for reply in replies {
        assert_eq!(reply["parent_id"].as_i64().unwrap(), first);
        assert!(reply["text"].as_str().unwrap().contains("reply from user"));
    }
}

#[tokio::test]
async fn post_detail_not_found() {
    let app = app().await;

    let resp = app.get("/post/12", None).await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.detail(), "Post not found");
}

#[tokio::test]
async fn posts_by_user_with_and_without_replies() {
    let app = app().await;
    seed_thread(&app).await;

    let resp = app.get("/post/user/user_1", None).await;
    assert_eq!(resp.status, StatusCode::OK);
    let posts = resp.json();
    assert_eq!(posts.as_array().unwrap().len(), 2);
    assert!(posts
        .as_array()
        .unwrap()
        .iter()
        .all(|post| post["parent_id"].is_null()));

    let resp = app.get("/post/user/user_1?include_replies=true", None).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json().as_array().unwrap().len(), 3);

    let resp = app.get("/post/user/nobody", None).await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.detail(), "User not found");
}

// ===========================================================================
// Likes
// ===========================================================================

#[tokio::test]
async fn like_own_post() {
    let app = app().await;
    let user_1 = app.create_user("user_1").await;
    let post_id = app.create_post(&user_1, "hello test 1", None).await;

    let resp = app
        .post(&format!("/post/{}/like", post_id), Some(&user_1.access_token))
        .await;

    assert_eq!(resp.status, StatusCode::CREATED);
    let body = resp.json();
    assert_eq!(body["id"].as_i64().unwrap(), post_id);
    assert_eq!(body["text"], "hello test 1");
    assert!(body["date"].is_string());
    assert_eq!(body["user_id"].as_i64().unwrap(), user_1.id);
    assert!(body["parent_id"].is_null());
    assert!(app
        .store()
        .find_like(user_1.id, post_id)
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn like_twice_keeps_single_like() {
    let app = app().await;
    let user_1 = app.create_user("user_1").await;
    let user_2 = app.create_user("user_2").await;
    let post_id = app.create_post(&user_1, "hello test 1", None).await;
    let path = format!("/post/{}/like", post_id);

    assert_eq!(
        app.post(&path, Some(&user_2.access_token)).await.status,
        StatusCode::CREATED
    );
    assert_eq!(
        app.post(&path, Some(&user_2.access_token)).await.status,
        StatusCode::CREATED
    );
    assert_eq!(app.store().count_likes(post_id).await.unwrap(), 1);
}

#[tokio::test]
async fn like_nonexistent_post() {
    let app = app().await;
    let user_2 = app.create_user("user_2").await;

    let resp = app.post("/post/12/like", Some(&user_2.access_token)).await;

    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.detail(), "Post not found");
    assert!(app.store().find_like(user_2.id, 12).await.unwrap().is_none());
}

#[tokio::test]
async fn unlike_post() {
    let app = app().await;
    let user_1 = app.create_user("user_1").await;
    let user_2 = app.create_user("user_2").await;
    let post_id = app.create_post(&user_1, "hello test 1", None).await;
    let path = format!("/post/{}/like", post_id);

    app.post(&path, Some(&user_2.access_token)).await;
    let resp = app.delete(&path, Some(&user_2.access_token)).await;

    assert_eq!(resp.status, StatusCode::CREATED);
    let body = resp.json();
    assert_eq!(body["id"].as_i64().unwrap(), post_id);
    assert_eq!(body["user_id"].as_i64().unwrap(), user_1.id);
    assert!(app
        .store()
        .find_like(user_2.id, post_id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn unlike_nonexistent_post() {
    let app = app().await;
    let user_2 = app.create_user("user_2").await;

    let resp = app.delete("/post/12/like", Some(&user_2.access_token)).await;

    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.detail(), "Post not found");
}

#[tokio::test]
async fn unlike_never_liked_post() {
    let app = app().await;
    let user_1 = app.create_user("user_1").await;
    let user_2 = app.create_user("user_2").await;
    let post_id = app.create_post(&user_1, "hello test 2", None).await;

    let resp = app
        .delete(&format!("/post/{}/like", post_id), Some(&user_2.access_token))
        .await;

    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.detail(), "Like not found");
}

#[tokio::test]
async fn like_requires_authentication() {
    let app = app().await;
    let user_1 = app.create_user("user_1").await;
    let post_id = app.create_post(&user_1, "hello test 1", None).await;

    let resp = app.post(&format!("/post/{}/like", post_id), None).await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.store().count_likes(post_id).await.unwrap(), 0);
}

// ===========================================================================
// Malformed requests and trailing slashes
// ===========================================================================

#[tokio::test]
async fn like_non_numeric_post_id() {
    let app = app().await;
    let user_1 = app.create_user("user_1").await;

    let resp = app.post("/post/abc/like", Some(&user_1.access_token)).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert!(!resp.detail().is_empty());

    let resp = app.delete("/post/abc/like", Some(&user_1.access_token)).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert!(!resp.detail().is_empty());

    let resp = app.post("/post/abc/like", None).await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);

    let resp = app.get("/post/abc", None).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert!(!resp.detail().is_empty());
}

#[tokio::test]
async fn create_post_malformed_body() {
    let app = app().await;
    let user_1 = app.create_user("user_1").await;

    let resp = app
        .post_json("/post", json!({ "nottext": 1 }), Some(&user_1.access_token))
        .await;
    assert_eq!(resp.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(!resp.detail().is_empty());

    let header = format!("Bearer {}", user_1.access_token);
    let resp = app
        .request(
            axum::http::Method::POST,
            "/post",
            Some(("application/json", "{".to_string())),
            &[("Authorization", header.as_str())],
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert!(!resp.detail().is_empty());
    assert!(app.get("/post", None).await.json().as_array().unwrap().is_empty());
}

#[tokio::test]
async fn user_posts_malformed_query() {
    let app = app().await;
    app.create_user("user_1").await;

    let resp = app.get("/post/user/user_1?include_replies=maybe", None).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert!(!resp.detail().is_empty());
}

#[tokio::test]
async fn post_routes_accept_trailing_slash() {
    let app = app().await;
    let (_, user_2, first) = seed_thread(&app).await;

    let resp = app.get("/post/", None).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json().as_array().unwrap().len(), 2);

    let resp = app.get(&format!("/post/{}/", first), None).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json()["replies"].as_array().unwrap().len(), 2);

    let resp = app
        .post(&format!("/post/{}/like/", first), Some(&user_2.access_token))
        .await;
    assert_eq!(resp.status, StatusCode::CREATED);
    assert_eq!(app.store().count_likes(first).await.unwrap(), 1);
}
