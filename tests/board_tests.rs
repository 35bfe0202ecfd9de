//! Posts, comments and ratings.

mod common;

use axum::http::StatusCode;
use common::spawn_app;
use recipebox::entities::{post_comments, post_ratings};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde_json::{Value, json};
use std::sync::Arc;

fn id_of(body: &Value) -> i64 {
    body["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_create_post_requires_auth_and_valid_input() {
    let app = spawn_app().await;
    let token = app.user_token("alice").await;

    let (status, _) = app
        .post(
            "/api/v1/boards",
            None,
            json!({ "title": "Bread", "content": "Flour and water" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .post(
            "/api/v1/boards",
            Some(&token),
            json!({ "title": "Bread", "content": "Flour and water", "prefix": "Dessert" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/api/v1/boards",
            Some(&token),
            json!({ "title": "x".repeat(201), "content": "Flour and water" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/api/v1/boards",
            Some(&token),
            json!({ "title": "Bread", "content": "   " }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, post) = app
        .post(
            "/api/v1/boards",
            Some(&token),
            json!({ "title": "Bread", "content": "Flour and water" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(post["prefix"], "General");
    assert_eq!(post["isPinned"], false);
    assert_eq!(post["views"], 0);
    assert_eq!(post["commentCount"], 0);
    assert_eq!(post["ratingCount"], 0);
    assert_eq!(post["authorName"], "alice name");
}

#[tokio::test]
async fn test_get_post_counts_views() {
    let app = spawn_app().await;
    let token = app.user_token("alice").await;
    let post = app.create_post(&token, "Soup").await;
    let uri = format!("/api/v1/boards/{}", id_of(&post));

    let (_, first) = app.get(&uri, None).await;
    let (_, second) = app.get(&uri, None).await;
    assert_eq!(first["views"], 1);
    assert_eq!(second["views"], 2);

    let (status, body) = app.get("/api/v1/boards/9999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["statusCode"], 404);
}

#[tokio::test]
async fn test_only_admin_can_pin_and_pinned_posts_list_first() {
    let app = spawn_app().await;
    let user = app.user_token("alice").await;
    let admin = app.admin_token("root").await;

    let older = app.create_post(&user, "Older").await;
    let newer = app.create_post(&user, "Newer").await;
    let older_uri = format!("/api/v1/boards/{}", id_of(&older));

    let (status, _) = app
        .patch(&older_uri, Some(&user), json!({ "isPinned": true }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.get("/api/v1/boards", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, pinned) = app
        .patch(&older_uri, Some(&admin), json!({ "isPinned": true }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pinned["isPinned"], true);

    let (_, list) = app.get("/api/v1/boards", None).await;
    let ids: Vec<i64> = list.as_array().unwrap().iter().map(id_of).collect();
    assert_eq!(ids, vec![id_of(&older), id_of(&newer)]);
}

#[tokio::test]
async fn test_post_owner_or_admin_can_modify() {
    let app = spawn_app().await;
    let owner = app.user_token("alice").await;
    let stranger = app.user_token("bob").await;
    let admin = app.admin_token("root").await;

    let post = app.create_post(&owner, "Pasta").await;
    let uri = format!("/api/v1/boards/{}", id_of(&post));

    let (status, _) = app
        .patch(&uri, Some(&stranger), json!({ "title": "Mine now" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.delete(&uri, Some(&stranger)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, updated) = app
        .patch(
            &uri,
            Some(&owner),
            json!({ "title": "Fresh pasta", "prefix": "Tip" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "Fresh pasta");
    assert_eq!(updated["prefix"], "Tip");
    assert_eq!(updated["content"], "Mix and bake.");

    let (status, _) = app.delete(&uri, Some(&admin)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.get(&uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_comment_tree_and_counts() {
    let app = spawn_app().await;
    let alice = app.user_token("alice").await;
    let bob = app.user_token("bob").await;
    let post = app.create_post(&alice, "Curry").await;
    let post_id = id_of(&post);
    let other = app.create_post(&alice, "Other").await;
    let comments_uri = format!("/api/v1/boards/{post_id}/comments");

    let (status, root) = app
        .post(&comments_uri, Some(&bob), json!({ "content": "Too spicy?" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(root["authorName"], "bob name");
    assert!(root["parentId"].is_null());

    let (status, reply) = app
        .post(
            &comments_uri,
            Some(&alice),
            json!({ "content": "Use less chili", "parentId": id_of(&root) }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(reply["parentId"], id_of(&root));

    let (status, _) = app
        .post(
            &comments_uri,
            Some(&bob),
            json!({ "content": "Thanks", "parentId": id_of(&reply) }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    // Parent must belong to the same post
    let (status, _) = app
        .post(
            &format!("/api/v1/boards/{}/comments", id_of(&other)),
            Some(&bob),
            json!({ "content": "Wrong thread", "parentId": id_of(&root) }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, tree) = app.get(&comments_uri, None).await;
    assert_eq!(status, StatusCode::OK);
    let tree = tree.as_array().unwrap();
    assert_eq!(tree.len(), 1);
    assert_eq!(tree[0]["content"], "Too spicy?");
    assert_eq!(tree[0]["replies"][0]["content"], "Use less chili");
    assert_eq!(tree[0]["replies"][0]["replies"][0]["content"], "Thanks");

    let (_, fetched) = app.get(&format!("/api/v1/boards/{post_id}"), None).await;
    assert_eq!(fetched["commentCount"], 3);

    let rows = post_comments::Entity::find()
        .filter(post_comments::Column::PostId.eq(post_id))
        .count(&app.state.store().conn)
        .await
        .unwrap();
    assert_eq!(rows, 3);

    let (_, other_post) = app
        .get(&format!("/api/v1/boards/{}", id_of(&other)), None)
        .await;
    assert_eq!(other_post["commentCount"], 0);
}

#[tokio::test]
async fn test_deleting_a_comment_promotes_its_replies() {
    let app = spawn_app().await;
    let alice = app.user_token("alice").await;
    let bob = app.user_token("bob").await;
    let post = app.create_post(&alice, "Salad").await;
    let post_id = id_of(&post);
    let comments_uri = format!("/api/v1/boards/{post_id}/comments");

    let (_, root) = app
        .post(&comments_uri, Some(&alice), json!({ "content": "Add feta" }))
        .await;
    let (_, reply) = app
        .post(
            &comments_uri,
            Some(&bob),
            json!({ "content": "And olives", "parentId": id_of(&root) }),
        )
        .await;

    let root_uri = format!("{comments_uri}/{}", id_of(&root));

    let (status, _) = app.delete(&root_uri, Some(&bob)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app
        .patch(&root_uri, Some(&bob), json!({ "content": "Hijacked" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.delete(&root_uri, Some(&alice)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, tree) = app.get(&comments_uri, None).await;
    let tree = tree.as_array().unwrap();
    assert_eq!(tree.len(), 1);
    assert_eq!(tree[0]["id"], id_of(&reply));
    assert!(tree[0]["parentId"].is_null());

    let (_, fetched) = app.get(&format!("/api/v1/boards/{post_id}"), None).await;
    assert_eq!(fetched["commentCount"], 1);
}

#[tokio::test]
async fn test_comment_edit_and_lookup_under_wrong_post() {
    let app = spawn_app().await;
    let alice = app.user_token("alice").await;
    let post = app.create_post(&alice, "Stew").await;
    let other = app.create_post(&alice, "Other").await;

    let (_, comment) = app
        .post(
            &format!("/api/v1/boards/{}/comments", id_of(&post)),
            Some(&alice),
            json!({ "content": "Slow cook it" }),
        )
        .await;

    let (status, _) = app
        .patch(
            &format!("/api/v1/boards/{}/comments/{}", id_of(&other), id_of(&comment)),
            Some(&alice),
            json!({ "content": "Moved" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let uri = format!("/api/v1/boards/{}/comments/{}", id_of(&post), id_of(&comment));
    let (status, _) = app
        .patch(&uri, Some(&alice), json!({ "content": "x".repeat(1001) }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, edited) = app
        .patch(&uri, Some(&alice), json!({ "content": "Slow cook it overnight" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(edited["content"], "Slow cook it overnight");

    let (status, _) = app
        .post(
            "/api/v1/boards/9999/comments",
            Some(&alice),
            json!({ "content": "Anyone?" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_ratings_summary_and_upsert() {
    let app = spawn_app().await;
    let alice = app.user_token("alice").await;
    let bob = app.user_token("bob").await;
    let post = app.create_post(&alice, "Pancakes").await;
    let post_id = id_of(&post);
    let rating_uri = format!("/api/v1/boards/{post_id}/rating");

    let (status, body) = app
        .post(&rating_uri, Some(&alice), json!({ "rating": 5, "comment": "Fluffy" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ratingCount"], 1);
    assert_eq!(body["averageRating"], 5.0);
    assert_eq!(body["rating"]["username"], "alice name");

    let (_, body) = app
        .post(&rating_uri, Some(&bob), json!({ "rating": 2 }))
        .await;
    assert_eq!(body["ratingCount"], 2);
    assert_eq!(body["averageRating"], 3.5);

    // Rating again replaces the earlier score
    let (_, body) = app
        .post(&rating_uri, Some(&bob), json!({ "rating": 4 }))
        .await;
    assert_eq!(body["ratingCount"], 2);
    assert_eq!(body["averageRating"], 4.5);

    let rows = post_ratings::Entity::find()
        .filter(post_ratings::Column::PostId.eq(post_id))
        .count(&app.state.store().conn)
        .await
        .unwrap();
    assert_eq!(rows, 2);

    let (status, summary) = app.get(&rating_uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["averageRating"], 4.5);
    assert_eq!(summary["ratingCount"], 2);

    let (_, fetched) = app.get(&format!("/api/v1/boards/{post_id}"), None).await;
    assert_eq!(fetched["averageRating"], 4.5);
    assert_eq!(fetched["ratingCount"], 2);

    let (status, all) = app.get(&format!("{rating_uri}/all"), None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = all
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["username"].as_str().unwrap())
        .collect();
    assert_eq!(names.len(), 2);
    assert!(names.contains(&"alice name"));
    assert!(names.contains(&"bob name"));

    let (status, mine) = app.get(&format!("{rating_uri}/my"), Some(&alice)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine["rating"], 5);
    assert_eq!(mine["comment"], "Fluffy");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_raters_are_all_counted() {
    let app = Arc::new(spawn_app().await);
    let author = app.user_token("author").await;
    let post = app.create_post(&author, "Brownies").await;
    let rating_uri = format!("/api/v1/boards/{}/rating", id_of(&post));

    let scores = [1, 2, 3, 4, 5];
    let mut tokens = Vec::new();
    for i in 0..scores.len() {
        tokens.push(app.user_token(&format!("rater{i}")).await);
    }

    let mut handles = Vec::new();
    for (token, score) in tokens.into_iter().zip(scores) {
        let app = Arc::clone(&app);
        let uri = rating_uri.clone();
        handles.push(tokio::spawn(async move {
            app.post(&uri, Some(&token), json!({ "rating": score })).await
        }));
    }

    for handle in handles {
        let (status, body) = handle.await.unwrap();
        assert_eq!(status, StatusCode::OK, "{body}");
    }

    let (_, summary) = app.get(&rating_uri, None).await;
    assert_eq!(summary["ratingCount"], 5);
    assert_eq!(summary["averageRating"], 3.0);

    let logs = app.state.store().latest_error_logs(10).await.unwrap();
    assert!(logs.is_empty(), "{logs:?}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_upserts_by_one_user_keep_one_row() {
    let app = Arc::new(spawn_app().await);
    let token = app.user_token("alice").await;
    let post = app.create_post(&token, "Scones").await;
    let post_id = id_of(&post);
    let rating_uri = format!("/api/v1/boards/{post_id}/rating");

    let mut handles = Vec::new();
    for score in [2, 3, 4, 5] {
        let app = Arc::clone(&app);
        let uri = rating_uri.clone();
        let token = token.clone();
        handles.push(tokio::spawn(async move {
            app.post(&uri, Some(&token), json!({ "rating": score })).await
        }));
    }
    for handle in handles {
        let (status, body) = handle.await.unwrap();
        assert_eq!(status, StatusCode::OK, "{body}");
    }

    let rows = post_ratings::Entity::find()
        .filter(post_ratings::Column::PostId.eq(post_id))
        .count(&app.state.store().conn)
        .await
        .unwrap();
    assert_eq!(rows, 1);

    let (_, summary) = app.get(&rating_uri, None).await;
    assert_eq!(summary["ratingCount"], 1);
}

#[tokio::test]
async fn test_rating_validation_and_permissions() {
    let app = spawn_app().await;
    let alice = app.user_token("alice").await;
    let bob = app.user_token("bob").await;
    let post = app.create_post(&alice, "Waffles").await;
    let post_id = id_of(&post);
    let rating_uri = format!("/api/v1/boards/{post_id}/rating");

    for score in [0, 6] {
        let (status, _) = app
            .post(&rating_uri, Some(&alice), json!({ "rating": score }))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "score {score}");
    }

    let (status, _) = app
        .post("/api/v1/boards/9999/rating", Some(&alice), json!({ "rating": 3 }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, mine) = app.get(&format!("{rating_uri}/my"), Some(&bob)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(mine["rating"].is_null());

    let (status, _) = app.delete(&rating_uri, Some(&bob)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, written) = app
        .post(&rating_uri, Some(&alice), json!({ "rating": 3 }))
        .await;
    let rating_id = written["rating"]["id"].as_i64().unwrap();
    let by_id = format!("/api/v1/boards/{post_id}/ratings/{rating_id}");

    let (status, _) = app
        .patch(&by_id, Some(&bob), json!({ "rating": 1 }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.delete(&by_id, Some(&bob)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, updated) = app
        .patch(&by_id, Some(&alice), json!({ "rating": 1, "comment": "Burnt" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["averageRating"], 1.0);
    assert_eq!(updated["rating"]["comment"], "Burnt");
    assert_eq!(updated["rating"]["username"], "alice name");

    let (status, _) = app.delete(&rating_uri, Some(&alice)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, summary) = app.get(&rating_uri, None).await;
    assert_eq!(summary["ratingCount"], 0);
    assert_eq!(summary["averageRating"], 0.0);
}

#[tokio::test]
async fn test_deleting_post_removes_comments_and_ratings() {
    let app = spawn_app().await;
    let alice = app.user_token("alice").await;
    let bob = app.user_token("bob").await;
    let post = app.create_post(&alice, "Tacos").await;
    let post_id = id_of(&post);

    let (_, root) = app
        .post(
            &format!("/api/v1/boards/{post_id}/comments"),
            Some(&bob),
            json!({ "content": "Corn or flour?" }),
        )
        .await;
    app.post(
        &format!("/api/v1/boards/{post_id}/comments"),
        Some(&alice),
        json!({ "content": "Corn", "parentId": id_of(&root) }),
    )
    .await;
    app.post(
        &format!("/api/v1/boards/{post_id}/rating"),
        Some(&bob),
        json!({ "rating": 4 }),
    )
    .await;

    let (status, _) = app
        .delete(&format!("/api/v1/boards/{post_id}"), Some(&alice))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let conn = &app.state.store().conn;
    let comments = post_comments::Entity::find()
        .filter(post_comments::Column::PostId.eq(post_id))
        .count(conn)
        .await
        .unwrap();
    let ratings = post_ratings::Entity::find()
        .filter(post_ratings::Column::PostId.eq(post_id))
        .count(conn)
        .await
        .unwrap();
    assert_eq!(comments, 0);
    assert_eq!(ratings, 0);

    let (status, _) = app
        .get(&format!("/api/v1/boards/{post_id}/comments"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
