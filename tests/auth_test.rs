mod common;

#[tokio::test]
async fn register_then_login() {
    let Some(app) = common::try_spawn_app().await else {
        eprintln!("skipping: no test database configured");
        return;
    };

    let (user_id, _token, email) = common::register_member(&app, "reg_login").await;

    let resp = app
        .client
        .post(app.url("/auth/login"))
        .json(&serde_json::json!({
            "email": email,
            "password": common::TEST_PASSWORD,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["user_id"].as_i64().unwrap() as i32, user_id);
    assert!(body["data"]["token"].as_str().unwrap().len() > 20);
    assert!(body["data"]["refresh_token"].is_string());
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
    let Some(app) = common::try_spawn_app().await else {
        eprintln!("skipping: no test database configured");
        return;
    };

    let (_, _, email) = common::register_member(&app, "dup").await;

    let resp = app
        .client
        .post(app.url("/auth/register"))
        .json(&serde_json::json!({
            "profile_type": "personal",
            "name": "Second",
            "email": email,
            "password": common::TEST_PASSWORD,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 409);
}

#[tokio::test]
async fn login_with_wrong_password_fails() {
    let Some(app) = common::try_spawn_app().await else {
        eprintln!("skipping: no test database configured");
        return;
    };

    let (_, _, email) = common::register_member(&app, "wrong_pw").await;

    let resp = app
        .client
        .post(app.url("/auth/login"))
        .json(&serde_json::json!({
            "email": email,
            "password": "definitely_not_it",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn company_registration_routes_the_name() {
    let Some(app) = common::try_spawn_app().await else {
        eprintln!("skipping: no test database configured");
        return;
    };

    let email = common::unique_email("company");
    let resp = app
        .client
        .post(app.url("/auth/register"))
        .json(&serde_json::json!({
            "profile_type": "company",
            "name": "Acme Ventures",
            "email": email,
            "password": common::TEST_PASSWORD,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    let token = body["data"]["token"].as_str().unwrap();

    let me: serde_json::Value = app
        .client
        .get(app.url("/auth/me"))
        .bearer_auth(token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(me["data"]["profile_type"], "company");
    assert_eq!(me["data"]["company_name"], "Acme Ventures");
    assert!(me["data"]["full_name"].is_null());
}

#[tokio::test]
async fn me_requires_a_token() {
    let Some(app) = common::try_spawn_app().await else {
        eprintln!("skipping: no test database configured");
        return;
    };

    let resp = app.client.get(app.url("/auth/me")).send().await.unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn guest_session_cannot_write() {
    let Some(app) = common::try_spawn_app().await else {
        eprintln!("skipping: no test database configured");
        return;
    };

    let resp = app
        .client
        .post(app.url("/auth/guest"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    let guest_token = body["data"]["token"].as_str().unwrap().to_string();

    // Guests browse fine but are rejected before any write.
    let resp = app
        .client
        .get(app.url("/ideas"))
        .bearer_auth(&guest_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = app
        .client
        .post(app.url("/ideas"))
        .bearer_auth(&guest_token)
        .json(&serde_json::json!({
            "title": "Guest idea",
            "description": "Guests should never get this far.",
            "category": "SaaS",
            "stage": "idea",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);
}

#[tokio::test]
async fn refresh_rotates_and_invalidates_the_old_token() {
    let Some(app) = common::try_spawn_app().await else {
        eprintln!("skipping: no test database configured");
        return;
    };

    let (_, _, email) = common::register_member(&app, "refresh").await;
    let login: serde_json::Value = app
        .client
        .post(app.url("/auth/login"))
        .json(&serde_json::json!({ "email": email, "password": common::TEST_PASSWORD }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let old_refresh = login["data"]["refresh_token"].as_str().unwrap().to_string();

    let resp = app
        .client
        .post(app.url("/auth/refresh"))
        .json(&serde_json::json!({ "refresh_token": old_refresh }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    let new_refresh = body["data"]["refresh_token"].as_str().unwrap();
    assert_ne!(new_refresh, old_refresh);

    // The consumed token is gone from the store.
    let resp = app
        .client
        .post(app.url("/auth/refresh"))
        .json(&serde_json::json!({ "refresh_token": old_refresh }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn change_password_takes_effect() {
    let Some(app) = common::try_spawn_app().await else {
        eprintln!("skipping: no test database configured");
        return;
    };

    let (_, token, email) = common::register_member(&app, "chpw").await;

    let resp = app
        .client
        .put(app.url("/auth/password"))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "current_password": common::TEST_PASSWORD,
            "new_password": "a_brand_new_password",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = app
        .client
        .post(app.url("/auth/login"))
        .json(&serde_json::json!({ "email": email, "password": common::TEST_PASSWORD }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    let resp = app
        .client
        .post(app.url("/auth/login"))
        .json(&serde_json::json!({ "email": email, "password": "a_brand_new_password" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn delete_account_cascades() {
    let Some(app) = common::try_spawn_app().await else {
        eprintln!("skipping: no test database configured");
        return;
    };

    let (user_id, token, email) = common::register_member(&app, "del_acct").await;
    let idea_id = common::create_idea(&app, &token, "Doomed idea", "SaaS").await;

    let resp = app
        .client
        .delete(app.url("/account"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // Login is dead, the profile is gone, and the idea cascaded away.
    let resp = app
        .client
        .post(app.url("/auth/login"))
        .json(&serde_json::json!({ "email": email, "password": common::TEST_PASSWORD }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    let resp = app
        .client
        .get(app.url(&format!("/profiles/{user_id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let resp = app
        .client
        .get(app.url(&format!("/ideas/{idea_id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}
