//! End-to-end direct messaging flows against a containerised Postgres.
//! These tests need a local Docker daemon, so they are ignored by default:
//! run with `cargo test -- --ignored`.

mod common;

use reqwest::header::AUTHORIZATION;
use serde_json::{json, Value};

#[actix_rt::test]
#[ignore]
async fn full_direct_messaging_flow() {
    let (_pg, pool) = common::start_db().await;
    let alice = common::seed_user(&pool, "alice").await;
    let bob = common::seed_user(&pool, "bob").await;
    let base = common::start_app(pool).await;
    let client = reqwest::Client::new();

    // Alice opens the conversation; a fresh pair gets 201.
    let resp = client
        .post(format!("{base}/api/v1/conversations"))
        .header(AUTHORIZATION, common::bearer(alice))
        .json(&json!({ "other_user_id": bob }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 201);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    let conversation_id = body["data"]["conversation_id"].as_str().unwrap().to_string();

    // Bob opening the same pair from the other side converges on the
    // existing conversation with 200.
    let resp = client
        .post(format!("{base}/api/v1/conversations"))
        .header(AUTHORIZATION, common::bearer(bob))
        .json(&json!({ "other_user_id": alice }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["conversation_id"].as_str().unwrap(), conversation_id);

    // Alice sends a message; it is delivered unread.
    let resp = client
        .post(format!("{base}/api/v1/conversations/{conversation_id}/messages"))
        .header(AUTHORIZATION, common::bearer(alice))
        .json(&json!({ "content": "Hello Bob" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 201);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["content"], "Hello Bob");
    assert_eq!(body["data"]["is_read"], false);
    assert_eq!(body["data"]["sender_name"], "alice");

    // Bob's conversation list carries the preview and unread count.
    let resp = client
        .get(format!("{base}/api/v1/conversations"))
        .header(AUTHORIZATION, common::bearer(bob))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = resp.json().await.unwrap();
    let conversations = body["data"]["conversations"].as_array().unwrap();
    assert_eq!(conversations.len(), 1);
    assert_eq!(conversations[0]["unread_count"], 1);
    assert_eq!(conversations[0]["last_message"]["content"], "Hello Bob");
    assert_eq!(conversations[0]["participants"].as_array().unwrap().len(), 2);

    assert_eq!(unread_count(&client, &base, bob).await, 1);
    // The sender's own messages never count against them.
    assert_eq!(unread_count(&client, &base, alice).await, 0);

    // Bob fetching the history marks messages addressed to him as read.
    let resp = client
        .get(format!("{base}/api/v1/conversations/{conversation_id}/messages"))
        .header(AUTHORIZATION, common::bearer(bob))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = resp.json().await.unwrap();
    let messages = body["data"]["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(body["data"]["has_more"], false);

    assert_eq!(unread_count(&client, &base, bob).await, 0);

    // Read state is monotonic: a second fetch still sees the message read.
    let resp = client
        .get(format!("{base}/api/v1/conversations/{conversation_id}/messages"))
        .header(AUTHORIZATION, common::bearer(alice))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["messages"][0]["is_read"], true);
}

#[actix_rt::test]
#[ignore]
async fn message_order_is_stable_across_pages() {
    let (_pg, pool) = common::start_db().await;
    let alice = common::seed_user(&pool, "alice").await;
    let bob = common::seed_user(&pool, "bob").await;
    let base = common::start_app(pool).await;
    let client = reqwest::Client::new();

    let conversation_id = start_conversation(&client, &base, alice, bob).await;
    for content in ["first", "second", "third"] {
        let resp = client
            .post(format!("{base}/api/v1/conversations/{conversation_id}/messages"))
            .header(AUTHORIZATION, common::bearer(alice))
            .json(&json!({ "content": content }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 201);
    }

    // Two pages of two reconstruct the full send order without gaps
    // or duplicates.
    let page1 = fetch_page(&client, &base, &conversation_id, bob, 1, 2).await;
    assert_eq!(page1["data"]["has_more"], true);
    let page2 = fetch_page(&client, &base, &conversation_id, bob, 2, 2).await;
    assert_eq!(page2["data"]["has_more"], false);

    let mut contents: Vec<String> = Vec::new();
    for page in [&page1, &page2] {
        for message in page["data"]["messages"].as_array().unwrap() {
            contents.push(message["content"].as_str().unwrap().to_string());
        }
    }
    assert_eq!(contents, ["first", "second", "third"]);
}

#[actix_rt::test]
#[ignore]
async fn sending_bumps_conversation_to_top_of_list() {
    let (_pg, pool) = common::start_db().await;
    let alice = common::seed_user(&pool, "alice").await;
    let bob = common::seed_user(&pool, "bob").await;
    let carol = common::seed_user(&pool, "carol").await;
    let base = common::start_app(pool).await;
    let client = reqwest::Client::new();

    let with_bob = start_conversation(&client, &base, alice, bob).await;
    let with_carol = start_conversation(&client, &base, alice, carol).await;

    // A send into the older conversation moves it back to the front.
    let resp = client
        .post(format!("{base}/api/v1/conversations/{with_bob}/messages"))
        .header(AUTHORIZATION, common::bearer(alice))
        .json(&json!({ "content": "ping" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 201);

    let resp = client
        .get(format!("{base}/api/v1/conversations"))
        .header(AUTHORIZATION, common::bearer(alice))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let conversations = body["data"]["conversations"].as_array().unwrap();
    assert_eq!(conversations.len(), 2);
    assert_eq!(conversations[0]["id"].as_str().unwrap(), with_bob);
    assert_eq!(conversations[0]["last_message"]["content"], "ping");
    assert_eq!(conversations[1]["id"].as_str().unwrap(), with_carol);
    assert!(conversations[1]["last_message"].is_null());
}

#[actix_rt::test]
#[ignore]
async fn blank_message_content_is_rejected() {
    let (_pg, pool) = common::start_db().await;
    let alice = common::seed_user(&pool, "alice").await;
    let bob = common::seed_user(&pool, "bob").await;
    let base = common::start_app(pool).await;
    let client = reqwest::Client::new();

    let conversation_id = start_conversation(&client, &base, alice, bob).await;
    for payload in [json!({ "content": "   " }), json!({})] {
        let resp = client
            .post(format!("{base}/api/v1/conversations/{conversation_id}/messages"))
            .header(AUTHORIZATION, common::bearer(alice))
            .json(&payload)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 400);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["success"], false);
    }
}

async fn start_conversation(
    client: &reqwest::Client,
    base: &str,
    caller: uuid::Uuid,
    other: uuid::Uuid,
) -> String {
    let resp = client
        .post(format!("{base}/api/v1/conversations"))
        .header(AUTHORIZATION, common::bearer(caller))
        .json(&json!({ "other_user_id": other }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 201);
    let body: Value = resp.json().await.unwrap();
    body["data"]["conversation_id"].as_str().unwrap().to_string()
}

async fn fetch_page(
    client: &reqwest::Client,
    base: &str,
    conversation_id: &str,
    caller: uuid::Uuid,
    page: i64,
    limit: i64,
) -> Value {
    let resp = client
        .get(format!(
            "{base}/api/v1/conversations/{conversation_id}/messages?page={page}&limit={limit}"
        ))
        .header(AUTHORIZATION, common::bearer(caller))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    resp.json().await.unwrap()
}

async fn unread_count(client: &reqwest::Client, base: &str, caller: uuid::Uuid) -> i64 {
    let resp = client
        .get(format!("{base}/api/v1/messages/unread-count"))
        .header(AUTHORIZATION, common::bearer(caller))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = resp.json().await.unwrap();
    body["data"]["unread_count"].as_i64().unwrap()
}
