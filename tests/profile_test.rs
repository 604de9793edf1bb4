mod common;

#[tokio::test]
async fn public_profile_never_exposes_the_email() {
    let Some(app) = common::try_spawn_app().await else {
        eprintln!("skipping: no test database configured");
        return;
    };

    let (user_id, _, _) = common::register_member(&app, "pub_profile").await;

    let body: serde_json::Value = app
        .client
        .get(app.url(&format!("/profiles/{user_id}")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let data = &body["data"];
    assert_eq!(data["id"].as_i64().unwrap() as i32, user_id);
    assert_eq!(data["profile_type"], "personal");
    assert!(data["name"].as_str().unwrap().contains("pub_profile"));
    assert!(data.get("email").is_none());
    assert!(data.get("password_hash").is_none());
}

#[tokio::test]
async fn profile_update_round_trips_investor_fields() {
    let Some(app) = common::try_spawn_app().await else {
        eprintln!("skipping: no test database configured");
        return;
    };

    let (user_id, token, _) = common::register_member(&app, "inv_profile").await;

    let resp = app
        .client
        .put(app.url("/profiles/me"))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "profile_type": "personal",
            "full_name": "Ingrid Investor",
            "bio": "Early-stage angel.",
            "website": "https://example.com",
            "industry": "fintech",
            "investor_type": "angel",
            "investment_range": "25k-50k",
            "sectors": ["fintech", "climate"],
            "interests": "Yes",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["name"], "Ingrid Investor");
    assert_eq!(body["data"]["is_investor"], true);
    assert_eq!(body["data"]["sectors"], serde_json::json!(["fintech", "climate"]));

    // The public view reflects the update.
    let public: serde_json::Value = app
        .client
        .get(app.url(&format!("/profiles/{user_id}")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(public["data"]["investor_type"], "angel");
    assert_eq!(public["data"]["investment_range"], "25k-50k");
}

#[tokio::test]
async fn profile_update_rejects_a_bad_website() {
    let Some(app) = common::try_spawn_app().await else {
        eprintln!("skipping: no test database configured");
        return;
    };

    let (_, token, _) = common::register_member(&app, "bad_site").await;

    let resp = app
        .client
        .put(app.url("/profiles/me"))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "profile_type": "personal",
            "full_name": "Bad Site",
            "website": "not a url",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn missing_profile_is_404() {
    let Some(app) = common::try_spawn_app().await else {
        eprintln!("skipping: no test database configured");
        return;
    };

    let resp = app
        .client
        .get(app.url("/profiles/999999999"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}
