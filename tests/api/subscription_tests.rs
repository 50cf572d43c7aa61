//! Subscription API Tests

use axum::http::StatusCode;
use serde_json::json;
use tokio::task::JoinSet;
use uuid::Uuid;

use crate::common::{TestApp, subscription_body};

#[tokio::test]
async fn create_then_list_round_trips_fields() {
    let app = TestApp::new();
    let user_id = Uuid::new_v4();

    let id = app
        .create(&json!({
            "service_name": "Yandex Plus",
            "price": 400,
            "user_id": user_id,
            "start_date": "01-2024",
            "end_date": "12-2024",
        }))
        .await;

    let subscriptions = app.list_all(user_id).await;
    assert_eq!(subscriptions.len(), 1);
    assert_eq!(
        subscriptions[0],
        json!({
            "id": id,
            "service_name": "Yandex Plus",
            "price": 400,
            "user_id": user_id,
            "start_date": "01-2024",
            "end_date": "12-2024",
        })
    );
}

#[tokio::test]
async fn create_responds_with_ok_and_uuid() {
    let app = TestApp::new();

    let response = app
        .post_json("/subscription/", &subscription_body(Uuid::new_v4(), "Netflix", 100))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["res"], "ok");
    assert!(
        response.body["uuid"]
            .as_str()
            .unwrap()
            .parse::<Uuid>()
            .is_ok()
    );
}

#[tokio::test]
async fn create_without_trailing_slash_is_accepted() {
    let app = TestApp::new();

    let response = app
        .post_json("/subscription", &subscription_body(Uuid::new_v4(), "Netflix", 100))
        .await;

    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn create_with_end_before_start_is_rejected_and_not_stored() {
    let app = TestApp::new();
    let mut body = subscription_body(Uuid::new_v4(), "Netflix", 100);
    body["start_date"] = json!("06-2025");
    body["end_date"] = json!("05-2025");

    let response = app.post_json("/subscription/", &body).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.body,
        json!({ "error": "end_date must not be before start_date" })
    );
    assert!(app.repository.is_empty().await);
}

#[tokio::test]
async fn create_reports_the_failing_field() {
    let app = TestApp::new();
    let user_id = Uuid::new_v4();

    let cases = [
        (json!({ "price": 1, "user_id": user_id, "start_date": "01-2024" }), "service_name is required"),
        (subscription_body(user_id, "Netflix", -5), "price must be positive"),
        (json!({ "service_name": "Netflix", "price": 1, "start_date": "01-2024" }), "user_id is required"),
        (json!({ "service_name": "Netflix", "price": 1, "user_id": user_id }), "start_date is required"),
        (
            json!({ "service_name": "Netflix", "price": 1, "user_id": user_id, "start_date": "2024-01" }),
            "invalid start_date format, expected MM-YYYY",
        ),
        (
            json!({ "service_name": "Netflix", "price": 1, "user_id": user_id, "start_date": "01-2024", "end_date": "Dec 2024" }),
            "invalid end_date format, expected MM-YYYY",
        ),
    ];

    for (body, expected) in cases {
        let response = app.post_json("/subscription/", &body).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(response.body["error"], expected, "{body}");
    }
    assert!(app.repository.is_empty().await);
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let app = TestApp::new();

    let response = app
        .request(
            axum::http::Method::POST,
            "/subscription/",
            Some(axum::body::Body::from("{not json")),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body, json!({ "error": "invalid request body" }));
}

#[tokio::test]
async fn list_for_unknown_user_is_empty() {
    let app = TestApp::new();

    let response = app.get(&format!("/subscription/{}", Uuid::new_v4())).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!({ "res": "ok", "subscriptions": [] }));
}

#[tokio::test]
async fn list_only_returns_the_users_records() {
    let app = TestApp::new();
    let user_id = Uuid::new_v4();
    app.create(&subscription_body(user_id, "Netflix", 100)).await;
    app.create(&subscription_body(Uuid::new_v4(), "Spotify", 200))
        .await;

    let subscriptions = app.list_all(user_id).await;

    assert_eq!(subscriptions.len(), 1);
    assert_eq!(subscriptions[0]["service_name"], "Netflix");
}

#[tokio::test]
async fn list_paginates_with_offset_semantics() {
    let app = TestApp::new();
    let user_id = Uuid::new_v4();
    for i in 0..25 {
        app.create(&subscription_body(user_id, &format!("service-{i}"), 10))
            .await;
    }

    let count = |response: crate::common::TestResponse| {
        response.body["subscriptions"].as_array().unwrap().len()
    };

    // min(L, max(0, N - (P - 1) * L))
    assert_eq!(count(app.get(&format!("/subscription/{user_id}")).await), 10);
    assert_eq!(count(app.get(&format!("/subscription/{user_id}/2/10")).await), 10);
    assert_eq!(count(app.get(&format!("/subscription/{user_id}/3/10")).await), 5);
    assert_eq!(count(app.get(&format!("/subscription/{user_id}/4/10")).await), 0);
    assert_eq!(count(app.get(&format!("/subscription/{user_id}/1/25")).await), 25);
    assert_eq!(count(app.get(&format!("/subscription/{user_id}/2/7")).await), 7);
}

#[tokio::test]
async fn pages_do_not_overlap() {
    let app = TestApp::new();
    let user_id = Uuid::new_v4();
    for i in 0..6 {
        app.create(&subscription_body(user_id, &format!("service-{i}"), 10))
            .await;
    }

    let ids = |page: u32| {
        let app = &app;
        async move {
            app.get(&format!("/subscription/{user_id}/{page}/3"))
                .await
                .body["subscriptions"]
                .as_array()
                .unwrap()
                .iter()
                .map(|s| s["id"].as_str().unwrap().to_string())
                .collect::<Vec<_>>()
        }
    };

    let first = ids(1).await;
    let second = ids(2).await;

    assert_eq!(first.len(), 3);
    assert_eq!(second.len(), 3);
    assert!(first.iter().all(|id| !second.contains(id)));
}

#[tokio::test]
async fn invalid_pagination_falls_back_to_defaults() {
    let app = TestApp::new();
    let user_id = Uuid::new_v4();
    for i in 0..15 {
        app.create(&subscription_body(user_id, &format!("service-{i}"), 10))
            .await;
    }

    for path in ["abc/xyz", "0/0", "-1/500", "1/101", "1/0"] {
        let response = app.get(&format!("/subscription/{user_id}/{path}")).await;

        assert_eq!(response.status, StatusCode::OK, "{path}");
        assert_eq!(
            response.body["subscriptions"].as_array().unwrap().len(),
            10,
            "{path}"
        );
    }
}

#[tokio::test]
async fn invalid_uuid_in_path_is_bad_request() {
    let app = TestApp::new();
    app.create(&subscription_body(Uuid::new_v4(), "Netflix", 100))
        .await;

    let response = app.get("/subscription/not-a-uuid").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body, json!({ "error": "invalid user_id format" }));

    let response = app.get("/subscription/not-a-uuid/1/10").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app.delete("/subscription/not-a-uuid").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body, json!({ "error": "invalid subscription id" }));

    let response = app
        .put_json(
            "/subscription/not-a-uuid",
            &subscription_body(Uuid::new_v4(), "Netflix", 1),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    assert_eq!(app.repository.len().await, 1);
}

#[tokio::test]
async fn undecodable_path_segment_is_json_bad_request() {
    let app = TestApp::new();

    // %FF decodes to a byte that is not valid UTF-8
    let response = app.get("/subscription/%FF").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body, json!({ "error": "invalid user_id format" }));

    let response = app.get("/subscription/%FF/1/10").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body, json!({ "error": "invalid user_id format" }));

    let response = app.delete("/subscription/%FF").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body, json!({ "error": "invalid subscription id" }));

    let response = app
        .put_json(
            "/subscription/%FF",
            &subscription_body(Uuid::new_v4(), "Netflix", 1),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body, json!({ "error": "invalid subscription id" }));
}

#[tokio::test]
async fn unknown_routes_and_methods_answer_json() {
    let app = TestApp::new();

    let response = app.get("/nowhere").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body, json!({ "error": "route not found" }));
    assert!(response.headers.contains_key("x-request-id"));

    let response = app.get("/subscription/cost").await;
    assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.body, json!({ "error": "method not allowed" }));
}

#[tokio::test]
async fn delete_removes_the_record() {
    let app = TestApp::new();
    let user_id = Uuid::new_v4();
    let id = app.create(&subscription_body(user_id, "Netflix", 100)).await;

    let response = app.delete(&format!("/subscription/{id}")).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!({ "res": "ok" }));
    assert!(app.list_all(user_id).await.is_empty());
}

#[tokio::test]
async fn delete_of_missing_record_fails_without_side_effects() {
    let app = TestApp::new();
    app.create(&subscription_body(Uuid::new_v4(), "Netflix", 100))
        .await;

    let response = app
        .delete(&format!("/subscription/{}", Uuid::new_v4()))
        .await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body, json!({ "error": "internal server error" }));
    assert_eq!(app.repository.len().await, 1);
}

#[tokio::test]
async fn update_replaces_all_fields_and_clears_end_date() {
    let app = TestApp::new();
    let user_id = Uuid::new_v4();
    let mut initial = subscription_body(user_id, "Netflix", 100);
    initial["end_date"] = json!("12-2025");
    let id = app.create(&initial).await;

    let response = app
        .put_json(
            &format!("/subscription/{id}"),
            &json!({
                "service_name": "Kinopoisk",
                "price": 299,
                "user_id": user_id,
                "start_date": "09-2025",
                "end_date": null,
            }),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!({ "res": "ok" }));

    let subscriptions = app.list_all(user_id).await;
    assert_eq!(
        subscriptions[0],
        json!({
            "id": id,
            "service_name": "Kinopoisk",
            "price": 299,
            "user_id": user_id,
            "start_date": "09-2025",
        })
    );
}

#[tokio::test]
async fn update_of_missing_record_fails() {
    let app = TestApp::new();

    let response = app
        .put_json(
            &format!("/subscription/{}", Uuid::new_v4()),
            &subscription_body(Uuid::new_v4(), "Netflix", 100),
        )
        .await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(app.repository.is_empty().await);
}

#[tokio::test]
async fn invalid_update_leaves_record_unchanged() {
    let app = TestApp::new();
    let user_id = Uuid::new_v4();
    let id = app.create(&subscription_body(user_id, "Netflix", 100)).await;
    let mut body = subscription_body(user_id, "Netflix", 500);
    body["end_date"] = json!("01-2020");

    let response = app.put_json(&format!("/subscription/{id}"), &body).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(app.list_all(user_id).await[0]["price"], 100);
}

#[tokio::test]
async fn cost_sums_user_prices() {
    let app = TestApp::new();
    let user_id = Uuid::new_v4();
    for price in [100, 200, 300] {
        app.create(&subscription_body(user_id, "Netflix", price))
            .await;
    }
    app.create(&subscription_body(Uuid::new_v4(), "Netflix", 1000))
        .await;

    let response = app
        .post_json("/subscription/cost", &json!({ "user_id": user_id }))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!({ "res": "ok", "cost": 600 }));
}

#[tokio::test]
async fn cost_without_matches_is_zero() {
    let app = TestApp::new();
    app.create(&subscription_body(Uuid::new_v4(), "Netflix", 100))
        .await;

    let response = app
        .post_json(
            "/subscription/cost",
            &json!({ "user_id": Uuid::new_v4(), "service_name": "Netflix" }),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["cost"], 0);
}

#[tokio::test]
async fn cost_applies_service_and_date_filters() {
    let app = TestApp::new();
    let user_id = Uuid::new_v4();
    let records = [
        ("Netflix", 100, "01-2024", Some("06-2024")),
        ("Netflix", 200, "03-2024", Some("12-2024")),
        ("Netflix", 400, "03-2024", None),
        ("Netflix", 800, "01-2023", Some("06-2024")),
        ("Spotify", 1600, "02-2024", Some("05-2024")),
    ];
    for (name, price, start, end) in records {
        let mut body = subscription_body(user_id, name, price);
        body["start_date"] = json!(start);
        if let Some(end) = end {
            body["end_date"] = json!(end);
        }
        app.create(&body).await;
    }

    let cost = |filter: serde_json::Value| {
        let app = &app;
        async move {
            let response = app.post_json("/subscription/cost", &filter).await;
            assert_eq!(response.status, StatusCode::OK);
            response.body["cost"].as_i64().unwrap()
        }
    };

    assert_eq!(cost(json!({})).await, 3100);
    assert_eq!(cost(json!({ "service_name": "Netflix" })).await, 1500);
    assert_eq!(
        cost(json!({ "service_name": "Netflix", "start_date": "01-2024" })).await,
        700
    );
    assert_eq!(
        cost(json!({
            "service_name": "Netflix",
            "start_date": "01-2024",
            "end_date": "12-2024",
        }))
        .await,
        300
    );
}

#[tokio::test]
async fn cost_with_inverted_dates_is_rejected() {
    let app = TestApp::new();

    let response = app
        .post_json(
            "/subscription/cost",
            &json!({ "start_date": "05-2024", "end_date": "04-2024" }),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.body,
        json!({ "error": "end_date must not be before start_date" })
    );
}

#[tokio::test]
async fn every_response_carries_a_request_id() {
    let app = TestApp::new();

    let ok = app.get(&format!("/subscription/{}", Uuid::new_v4())).await;
    let bad = app.get("/subscription/nope").await;
    let missing = app.get("/no/such/route").await;

    for response in [&ok, &bad, &missing] {
        let id = response.headers["x-request-id"].to_str().unwrap();
        assert!(id.parse::<Uuid>().is_ok());
    }
    assert_ne!(ok.headers["x-request-id"], bad.headers["x-request-id"]);
}

#[tokio::test]
async fn concurrent_creates_get_distinct_ids() {
    let app = std::sync::Arc::new(TestApp::new());
    let user_id = Uuid::new_v4();

    let mut tasks = JoinSet::new();
    for i in 0..20 {
        let app = app.clone();
        tasks.spawn(async move {
            app.create(&subscription_body(user_id, &format!("service-{i}"), 10 + i))
                .await
        });
    }

    let mut ids = Vec::new();
    while let Some(id) = tasks.join_next().await {
        ids.push(id.unwrap());
    }
    ids.sort();
    ids.dedup();

    assert_eq!(ids.len(), 20);
    assert_eq!(app.list_all(user_id).await.len(), 20);
}
