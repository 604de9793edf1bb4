mod common;

#[tokio::test]
async fn yes_and_no_cancel_out() {
    let Some(app) = common::try_spawn_app().await else {
        eprintln!("skipping: no test database configured");
        return;
    };

    let (_, owner, _) = common::register_member(&app, "tally_owner").await;
    let (_, voter_a, _) = common::register_member(&app, "tally_a").await;
    let (_, voter_b, _) = common::register_member(&app, "tally_b").await;
    let idea_id = common::create_idea(&app, &owner, "Balanced idea", "SaaS").await;

    common::cast_vote(&app, &voter_a, idea_id, "yes").await;
    let score = common::cast_vote(&app, &voter_b, idea_id, "no").await;
    assert_eq!(score, 0);

    let body: serde_json::Value = app
        .client
        .get(app.url(&format!("/ideas/{idea_id}/votes")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"]["votes"]["yes"], 1);
    assert_eq!(body["data"]["votes"]["no"], 1);
    assert_eq!(body["data"]["votes"]["maybe"], 0);
    assert_eq!(body["data"]["total_votes"], 2);
    assert_eq!(body["data"]["score"], 0);
}

#[tokio::test]
async fn revoting_replaces_the_position() {
    let Some(app) = common::try_spawn_app().await else {
        eprintln!("skipping: no test database configured");
        return;
    };

    let (_, owner, _) = common::register_member(&app, "revote_owner").await;
    let (_, voter, _) = common::register_member(&app, "revote").await;
    let idea_id = common::create_idea(&app, &owner, "Revote idea", "SaaS").await;

    common::cast_vote(&app, &voter, idea_id, "yes").await;
    common::cast_vote(&app, &voter, idea_id, "maybe").await;

    // One voter, one row; the latest position wins.
    let body: serde_json::Value = app
        .client
        .get(app.url(&format!("/ideas/{idea_id}/votes")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"]["votes"]["yes"], 0);
    assert_eq!(body["data"]["votes"]["maybe"], 1);
    assert_eq!(body["data"]["total_votes"], 1);
}

#[tokio::test]
async fn score_scales_with_net_yes_margin() {
    let Some(app) = common::try_spawn_app().await else {
        eprintln!("skipping: no test database configured");
        return;
    };

    let (_, owner, _) = common::register_member(&app, "margin_owner").await;
    let idea_id = common::create_idea(&app, &owner, "Popular idea", "SaaS").await;

    // Four net yes votes: round(sqrt(4) * 10) = 20.
    let mut score = 0;
    for n in 0..4 {
        let (_, voter, _) = common::register_member(&app, &format!("margin_{n}")).await;
        score = common::cast_vote(&app, &voter, idea_id, "yes").await;
    }
    assert_eq!(score, 20);
}

#[tokio::test]
async fn anonymous_and_guest_votes_are_rejected() {
    let Some(app) = common::try_spawn_app().await else {
        eprintln!("skipping: no test database configured");
        return;
    };

    let (_, owner, _) = common::register_member(&app, "novote_owner").await;
    let idea_id = common::create_idea(&app, &owner, "Protected idea", "SaaS").await;

    let resp = app
        .client
        .post(app.url(&format!("/ideas/{idea_id}/vote")))
        .json(&serde_json::json!({ "vote": "yes" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    let guest: serde_json::Value = app
        .client
        .post(app.url("/auth/guest"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let guest_token = guest["data"]["token"].as_str().unwrap();

    let resp = app
        .client
        .post(app.url(&format!("/ideas/{idea_id}/vote")))
        .bearer_auth(guest_token)
        .json(&serde_json::json!({ "vote": "yes" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);
}

#[tokio::test]
async fn score_is_consistent_across_surfaces() {
    let Some(app) = common::try_spawn_app().await else {
        eprintln!("skipping: no test database configured");
        return;
    };

    let (_, owner, _) = common::register_member(&app, "surf_owner").await;
    let category = format!("cat_{}", common::unique_email("surf"));
    let idea_id = common::create_idea(&app, &owner, "Surface idea", &category).await;

    let (_, voter, _) = common::register_member(&app, "surf_voter").await;
    let vote_score = common::cast_vote(&app, &voter, idea_id, "yes").await;
    assert_eq!(vote_score, 10);

    let detail: serde_json::Value = app
        .client
        .get(app.url(&format!("/ideas/{idea_id}")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(detail["data"]["score"], 10);

    let tally: serde_json::Value = app
        .client
        .get(app.url(&format!("/ideas/{idea_id}/votes")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(tally["data"]["score"], 10);

    let listing: serde_json::Value = app
        .client
        .get(app.url(&format!("/ideas?category={category}")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let items = listing["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["score"], 10);
}
