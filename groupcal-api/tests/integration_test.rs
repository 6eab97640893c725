/// Integration tests for the GroupCal API
///
/// These tests verify the access-control and query-filter contracts
/// end-to-end against a real database:
/// - Membership-scoped visibility of groups, members, and events
/// - The not-found/not-member conflation and the owner-only rename
/// - Event time-range validation
/// - Year/month window filtering and result ordering
///
/// Requires PostgreSQL via `DATABASE_URL`.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{body_json, TestContext};
use groupcal_shared::models::membership::Membership;
use serde_json::json;
use uuid::Uuid;

/// The creator of a group is its owner and only member, immediately
#[tokio::test]
async fn test_group_creator_is_owner_and_member() {
    let mut ctx = TestContext::new().await.unwrap();
    let alice = ctx.create_user("alice").await.unwrap();

    let response = ctx
        .json_request("POST", "/api/groups", &alice, json!({ "name": "Family" }))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let group = body_json(response).await;
    assert_eq!(group["name"], "Family");
    assert_eq!(group["owner_id"], alice.user.id.to_string());

    let group_id: Uuid = group["id"].as_str().unwrap().parse().unwrap();
    assert!(Membership::exists(&ctx.db, group_id, alice.user.id)
        .await
        .unwrap());

    let response = ctx
        .get(&format!("/api/groups/{}/members", group_id), &alice)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let members = body_json(response).await;
    assert_eq!(members.as_array().unwrap().len(), 1);
    assert_eq!(members[0]["id"], alice.user.id.to_string());

    ctx.cleanup().await.unwrap();
}

/// Two groups by the same user get distinct invite codes and one member each
#[tokio::test]
async fn test_repeated_creation_distinct_groups() {
    let mut ctx = TestContext::new().await.unwrap();
    let alice = ctx.create_user("alice").await.unwrap();

    let first = body_json(
        ctx.json_request("POST", "/api/groups", &alice, json!({ "name": "One" }))
            .await,
    )
    .await;
    let second = body_json(
        ctx.json_request("POST", "/api/groups", &alice, json!({ "name": "Two" }))
            .await,
    )
    .await;

    assert_ne!(first["id"], second["id"]);
    assert_ne!(first["invite_code"], second["invite_code"]);

    for group in [&first, &second] {
        let group_id = group["id"].as_str().unwrap();
        let members = body_json(
            ctx.get(&format!("/api/groups/{}/members", group_id), &alice)
                .await,
        )
        .await;
        assert_eq!(members.as_array().unwrap().len(), 1);
    }

    ctx.cleanup().await.unwrap();
}

/// Non-members get 404 on group reads, whether or not the group exists
#[tokio::test]
async fn test_group_read_conflates_missing_and_foreign() {
    let mut ctx = TestContext::new().await.unwrap();
    let alice = ctx.create_user("alice").await.unwrap();
    let mallory = ctx.create_user("mallory").await.unwrap();

    let group = body_json(
        ctx.json_request("POST", "/api/groups", &alice, json!({ "name": "Private" }))
            .await,
    )
    .await;
    let group_id = group["id"].as_str().unwrap();

    // Existing group, non-member requester
    let foreign = ctx.get(&format!("/api/groups/{}", group_id), &mallory).await;
    assert_eq!(foreign.status(), StatusCode::NOT_FOUND);
    let foreign_body = body_json(foreign).await;

    // Missing group entirely
    let missing = ctx
        .get(&format!("/api/groups/{}", Uuid::new_v4()), &mallory)
        .await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    let missing_body = body_json(missing).await;

    // Identical responses: existence is not leaked
    assert_eq!(foreign_body, missing_body);

    // Same conflation on the members listing
    let members = ctx
        .get(&format!("/api/groups/{}/members", group_id), &mallory)
        .await;
    assert_eq!(members.status(), StatusCode::NOT_FOUND);

    ctx.cleanup().await.unwrap();
}

/// Rename: 404 for outsiders, 403 for non-owner members, 200 for the owner
#[tokio::test]
async fn test_rename_requires_ownership() {
    let mut ctx = TestContext::new().await.unwrap();
    let alice = ctx.create_user("alice").await.unwrap();
    let bob = ctx.create_user("bob").await.unwrap();
    let mallory = ctx.create_user("mallory").await.unwrap();

    let group = body_json(
        ctx.json_request("POST", "/api/groups", &alice, json!({ "name": "Original" }))
            .await,
    )
    .await;
    let group_id: Uuid = group["id"].as_str().unwrap().parse().unwrap();

    // Bob joins as a plain member
    Membership::create(&ctx.db, group_id, bob.user.id)
        .await
        .unwrap();

    let uri = format!("/api/groups/{}", group_id);

    // Outsider: conflated 404
    let response = ctx
        .json_request("PUT", &uri, &mallory, json!({ "name": "Hijacked" }))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Member but not owner: 403
    let response = ctx
        .json_request("PUT", &uri, &bob, json!({ "name": "Bob's now" }))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Name unchanged by the rejected attempts
    let current = body_json(ctx.get(&uri, &alice).await).await;
    assert_eq!(current["name"], "Original");

    // Owner: 200
    let response = ctx
        .json_request("PUT", &uri, &alice, json!({ "name": "Renamed" }))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["name"], "Renamed");

    ctx.cleanup().await.unwrap();
}

/// My-groups listing returns exactly the groups the user belongs to
#[tokio::test]
async fn test_list_groups_is_membership_scoped() {
    let mut ctx = TestContext::new().await.unwrap();
    let alice = ctx.create_user("alice").await.unwrap();
    let bob = ctx.create_user("bob").await.unwrap();

    let mine = body_json(
        ctx.json_request("POST", "/api/groups", &alice, json!({ "name": "Mine" }))
            .await,
    )
    .await;
    ctx.json_request("POST", "/api/groups", &bob, json!({ "name": "Bob's" }))
        .await;

    let groups = body_json(ctx.get("/api/groups", &alice).await).await;
    let groups = groups.as_array().unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0]["id"], mine["id"]);

    ctx.cleanup().await.unwrap();
}

/// Event creation: membership gate and the start < end invariant
#[tokio::test]
async fn test_create_event_validation() {
    let mut ctx = TestContext::new().await.unwrap();
    let alice = ctx.create_user("alice").await.unwrap();
    let mallory = ctx.create_user("mallory").await.unwrap();

    let group = body_json(
        ctx.json_request("POST", "/api/groups", &alice, json!({ "name": "Cal" }))
            .await,
    )
    .await;
    let group_id = group["id"].as_str().unwrap();

    // Non-member: conflated 404
    let response = ctx
        .json_request(
            "POST",
            "/api/events",
            &mallory,
            json!({ "title": "Crash", "date": "2024-05-01", "group_id": group_id }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Inverted time range: 400
    let response = ctx
        .json_request(
            "POST",
            "/api/events",
            &alice,
            json!({
                "title": "Backwards",
                "date": "2024-05-01",
                "start_time": "10:00:00",
                "end_time": "09:00:00",
                "group_id": group_id
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Valid range: 200
    let response = ctx
        .json_request(
            "POST",
            "/api/events",
            &alice,
            json!({
                "title": "Meeting",
                "date": "2024-05-01",
                "start_time": "09:00:00",
                "end_time": "10:00:00",
                "group_id": group_id
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Untimed event: 200
    let response = ctx
        .json_request(
            "POST",
            "/api/events",
            &alice,
            json!({ "title": "All day", "date": "2024-05-02", "group_id": group_id }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    ctx.cleanup().await.unwrap();
}

/// December window covers the whole month and excludes January 1st
#[tokio::test]
async fn test_event_listing_month_window() {
    let mut ctx = TestContext::new().await.unwrap();
    let alice = ctx.create_user("alice").await.unwrap();

    let group = body_json(
        ctx.json_request("POST", "/api/groups", &alice, json!({ "name": "Cal" }))
            .await,
    )
    .await;
    let group_id = group["id"].as_str().unwrap();

    for (title, date) in [
        ("early december", "2024-12-01"),
        ("new year's eve", "2024-12-31"),
        ("new year's day", "2025-01-01"),
        ("last november", "2024-11-30"),
    ] {
        let response = ctx
            .json_request(
                "POST",
                "/api/events",
                &alice,
                json!({ "title": title, "date": date, "group_id": group_id }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = ctx.get("/api/events?year=2024&month=12", &alice).await;
    assert_eq!(response.status(), StatusCode::OK);

    let events = body_json(response).await;
    let titles: Vec<&str> = events
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["early december", "new year's eve"]);

    ctx.cleanup().await.unwrap();
}

/// Out-of-range year/month is a 400, and single-sided filters are ignored
#[tokio::test]
async fn test_event_listing_filter_validation() {
    let mut ctx = TestContext::new().await.unwrap();
    let alice = ctx.create_user("alice").await.unwrap();

    let response = ctx.get("/api/events?year=1899&month=6", &alice).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = ctx.get("/api/events?year=2024&month=13", &alice).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Year alone applies no date filter and is not an error
    let response = ctx.get("/api/events?year=1899", &alice).await;
    assert_eq!(response.status(), StatusCode::OK);

    ctx.cleanup().await.unwrap();
}

/// Same-date events sort by start time with untimed events last
#[tokio::test]
async fn test_event_ordering_untimed_last() {
    let mut ctx = TestContext::new().await.unwrap();
    let alice = ctx.create_user("alice").await.unwrap();

    let group = body_json(
        ctx.json_request("POST", "/api/groups", &alice, json!({ "name": "Cal" }))
            .await,
    )
    .await;
    let group_id = group["id"].as_str().unwrap();

    // Inserted untimed-first to rule out insertion-order luck
    ctx.json_request(
        "POST",
        "/api/events",
        &alice,
        json!({ "title": "A", "date": "2024-05-01", "group_id": group_id }),
    )
    .await;
    ctx.json_request(
        "POST",
        "/api/events",
        &alice,
        json!({
            "title": "B",
            "date": "2024-05-01",
            "start_time": "09:00:00",
            "group_id": group_id
        }),
    )
    .await;
    ctx.json_request(
        "POST",
        "/api/events",
        &alice,
        json!({
            "title": "C",
            "date": "2024-04-30",
            "start_time": "23:00:00",
            "group_id": group_id
        }),
    )
    .await;

    let events = body_json(
        ctx.get(&format!("/api/events?group_id={}", group_id), &alice)
            .await,
    )
    .await;
    let titles: Vec<&str> = events
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["title"].as_str().unwrap())
        .collect();

    // Date ascending first, then start time with nulls last
    assert_eq!(titles, vec!["C", "B", "A"]);

    ctx.cleanup().await.unwrap();
}

/// Filtering by a foreign group returns empty, not an error
#[tokio::test]
async fn test_foreign_group_filter_returns_empty() {
    let mut ctx = TestContext::new().await.unwrap();
    let alice = ctx.create_user("alice").await.unwrap();
    let bob = ctx.create_user("bob").await.unwrap();

    let alices_group = body_json(
        ctx.json_request("POST", "/api/groups", &alice, json!({ "name": "Alice's" }))
            .await,
    )
    .await;
    let bobs_group = body_json(
        ctx.json_request("POST", "/api/groups", &bob, json!({ "name": "Bob's" }))
            .await,
    )
    .await;

    ctx.json_request(
        "POST",
        "/api/events",
        &alice,
        json!({
            "title": "Visible to Alice",
            "date": "2024-05-01",
            "group_id": alices_group["id"].as_str().unwrap()
        }),
    )
    .await;
    ctx.json_request(
        "POST",
        "/api/events",
        &bob,
        json!({
            "title": "Bob's secret",
            "date": "2024-05-01",
            "group_id": bobs_group["id"].as_str().unwrap()
        }),
    )
    .await;

    // Unfiltered: Alice sees her own groups' events
    let unfiltered = body_json(ctx.get("/api/events", &alice).await).await;
    assert_eq!(unfiltered.as_array().unwrap().len(), 1);
    assert_eq!(unfiltered[0]["title"], "Visible to Alice");

    // Narrowed to Bob's group: empty list, not an error
    let response = ctx
        .get(
            &format!("/api/events?group_id={}", bobs_group["id"].as_str().unwrap()),
            &alice,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 0);

    ctx.cleanup().await.unwrap();
}

/// Added members gain full visibility into the group's events
#[tokio::test]
async fn test_added_member_sees_group_events() {
    let mut ctx = TestContext::new().await.unwrap();
    let alice = ctx.create_user("alice").await.unwrap();
    let bob = ctx.create_user("bob").await.unwrap();

    let group = body_json(
        ctx.json_request("POST", "/api/groups", &alice, json!({ "name": "Shared" }))
            .await,
    )
    .await;
    let group_id: Uuid = group["id"].as_str().unwrap().parse().unwrap();

    ctx.json_request(
        "POST",
        "/api/events",
        &alice,
        json!({ "title": "Picnic", "date": "2024-06-01", "group_id": group_id }),
    )
    .await;

    // Before joining: nothing visible
    let before = body_json(ctx.get("/api/events", &bob).await).await;
    assert_eq!(before.as_array().unwrap().len(), 0);

    Membership::create(&ctx.db, group_id, bob.user.id)
        .await
        .unwrap();

    // After joining: the group and its events are visible
    let after = body_json(ctx.get("/api/events", &bob).await).await;
    assert_eq!(after.as_array().unwrap().len(), 1);
    assert_eq!(after[0]["title"], "Picnic");

    let response = ctx.get(&format!("/api/groups/{}", group_id), &bob).await;
    assert_eq!(response.status(), StatusCode::OK);

    ctx.cleanup().await.unwrap();
}

/// Duplicate registration is a 409, and responses never leak the hash
#[tokio::test]
async fn test_register_and_conflict() {
    let ctx = TestContext::new().await.unwrap();
    let suffix = Uuid::new_v4();
    let payload = json!({
        "email": format!("carol-{}@example.com", suffix),
        "username": format!("carol-{}", suffix),
        "password": "hunter22",
        "full_name": "Carol"
    });

    let request = Request::builder()
        .method("POST")
        .uri("/api/register")
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap();
    let response = ctx.request(request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let profile = body_json(response).await;
    assert!(profile.get("password_hash").is_none());
    let user_id: Uuid = profile["id"].as_str().unwrap().parse().unwrap();

    // Same email and username again: 409
    let request = Request::builder()
        .method("POST")
        .uri("/api/register")
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap();
    let response = ctx.request(request).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    groupcal_shared::models::user::User::delete(&ctx.db, user_id)
        .await
        .unwrap();
}

/// Protected routes require a Bearer token
#[tokio::test]
async fn test_authentication_required() {
    let ctx = TestContext::new().await.unwrap();

    let request = Request::builder()
        .method("GET")
        .uri("/api/groups")
        .body(Body::empty())
        .unwrap();

    let response = ctx.request(request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Register + login + authenticated call, end to end
#[tokio::test]
async fn test_login_flow() {
    let ctx = TestContext::new().await.unwrap();
    let suffix = Uuid::new_v4();
    let username = format!("dave-{}", suffix);

    let register = Request::builder()
        .method("POST")
        .uri("/api/register")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "email": format!("dave-{}@example.com", suffix),
                "username": username,
                "password": "hunter22"
            })
            .to_string(),
        ))
        .unwrap();
    let response = ctx.request(register).await;
    assert_eq!(response.status(), StatusCode::OK);
    let user_id: Uuid = body_json(response).await["id"]
        .as_str()
        .unwrap()
        .parse()
        .unwrap();

    // Wrong password: 401
    let bad_login = Request::builder()
        .method("POST")
        .uri("/api/token")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(format!(
            "username={}&password=wrong",
            username
        )))
        .unwrap();
    let response = ctx.request(bad_login).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Correct credentials: token pair
    let login = Request::builder()
        .method("POST")
        .uri("/api/token")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(format!(
            "username={}&password=hunter22",
            username
        )))
        .unwrap();
    let response = ctx.request(login).await;
    assert_eq!(response.status(), StatusCode::OK);
    let tokens = body_json(response).await;
    assert_eq!(tokens["token_type"], "bearer");

    // The issued access token works on a protected route
    let me = Request::builder()
        .method("GET")
        .uri("/api/users/me")
        .header(
            "authorization",
            format!("Bearer {}", tokens["access_token"].as_str().unwrap()),
        )
        .body(Body::empty())
        .unwrap();
    let response = ctx.request(me).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["id"],
        user_id.to_string()
    );

    groupcal_shared::models::user::User::delete(&ctx.db, user_id)
        .await
        .unwrap();
}
