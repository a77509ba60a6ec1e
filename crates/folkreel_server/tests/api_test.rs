//! End-to-end tests of the HTTP API over mock generative clients.

mod test_utils;

use axum::http::{StatusCode, header};
use std::sync::Arc;
use test_utils::*;

#[tokio::test]
async fn test_health_needs_no_key() -> anyhow::Result<()> {
    let t = test_app(Arc::new(CyclingText::default()), Arc::new(FixedSpeech::working())).await?;

    let response = send(&t.router, get("/api/v1/health", None)).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await?;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    Ok(())
}

#[tokio::test]
async fn test_missing_and_unknown_keys_are_unauthorized() -> anyhow::Result<()> {
    let t = test_app(Arc::new(CyclingText::default()), Arc::new(FixedSpeech::working())).await?;

    let response = send(&t.router, post_generate("Japan", None)).await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await?;
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "API key required");

    let response = send(&t.router, get("/api/v1/generations", Some("nope"))).await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await?["message"], "Invalid API key");

    let response = send(&t.router, get("/api/v1/user/usage", Some(""))).await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn test_generate_returns_paths_and_content() -> anyhow::Result<()> {
    let text = Arc::new(CyclingText::default());
    let t = test_app(text.clone(), Arc::new(FixedSpeech::working())).await?;

    let response = send(&t.router, post_generate("Japan", Some("ada-key"))).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await?;

    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "Content for Japan generated successfully");
    let id = body["generation_id"].as_str().unwrap();
    assert!(id.starts_with("japan_"));
    assert_eq!(body["content"]["story"], STORY);
    assert_eq!(body["content"]["voiceover"], SCRIPT);
    assert_eq!(body["content"]["scenes"], SCENES);
    assert!(body["degraded"].as_array().unwrap().is_empty());

    let story_path = body["paths"]["story_path"].as_str().unwrap();
    assert!(story_path.ends_with("story.txt"));
    assert!(story_path.contains(id));
    assert!(body["paths"]["voiceover_tts_path"].as_str().unwrap().ends_with("voiceover_tts.mp3"));
    assert!(t.output.path().join(id).join("metadata.json").exists());
    assert_eq!(text.calls(), 3);
    Ok(())
}

#[tokio::test]
async fn test_generate_without_audio_is_degraded_not_failed() -> anyhow::Result<()> {
    let t = test_app(Arc::new(CyclingText::default()), Arc::new(FixedSpeech::broken())).await?;

    let response = send(&t.router, post_generate("Peru", Some("bob-key"))).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await?;
    assert!(body["paths"]["voiceover_tts_path"].is_null());
    assert_eq!(body["degraded"][0], "voiceover_audio");
    assert_eq!(body["content"]["voiceover"], SCRIPT);

    let id = body["generation_id"].as_str().unwrap();
    let response = send(&t.router, get(&format!("/api/v1/download/{id}/audio"), Some("bob-key"))).await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn test_blank_story_fails_without_spending_quota() -> anyhow::Result<()> {
    let t = test_app(Arc::new(CyclingText::blank()), Arc::new(FixedSpeech::working())).await?;

    let response = send(&t.router, post_generate("Wakanda", Some("ada-key"))).await?;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await?;
    assert_eq!(body["status"], "error");
    assert!(body["message"].as_str().unwrap().starts_with("Story generation failed"));

    let response = send(&t.router, get("/api/v1/user/usage", Some("ada-key"))).await?;
    let body = json_body(response).await?;
    assert_eq!(body["usage"]["monthly_used"], 0);
    Ok(())
}

#[tokio::test]
async fn test_blank_country_is_bad_request() -> anyhow::Result<()> {
    let t = test_app(Arc::new(CyclingText::default()), Arc::new(FixedSpeech::working())).await?;

    let response = send(&t.router, post_generate("   ", Some("ada-key"))).await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let usage = t
        .app
        .ledger()
        .credential_usage(&"ada-key".into())
        .unwrap();
    assert_eq!(usage.daily, 0);
    Ok(())
}

#[tokio::test]
async fn test_inactive_subscription_is_forbidden() -> anyhow::Result<()> {
    let text = Arc::new(CyclingText::default());
    let t = test_app(text.clone(), Arc::new(FixedSpeech::working())).await?;

    let response = send(&t.router, post_generate("Chile", Some("cy-key"))).await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(text.calls(), 0);
    Ok(())
}

#[tokio::test]
async fn test_free_tier_quota_is_enforced() -> anyhow::Result<()> {
    let text = Arc::new(CyclingText::default());
    let t = test_app(text.clone(), Arc::new(FixedSpeech::working())).await?;

    for _ in 0..3 {
        let response = send(&t.router, post_generate("Ghana", Some("ada-key"))).await?;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = send(&t.router, post_generate("Ghana", Some("ada-key"))).await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = json_body(response).await?;
    assert!(body["message"].as_str().unwrap().contains("monthly limit of 3"));
    assert_eq!(text.calls(), 9);

    let response = send(&t.router, get("/api/v1/user/usage", Some("ada-key"))).await?;
    let usage = json_body(response).await?["usage"].clone();
    assert_eq!(usage["tier"], "free");
    assert_eq!(usage["monthly_limit"], 3);
    assert_eq!(usage["monthly_used"], 3);
    assert_eq!(usage["remaining"], 0);
    assert_eq!(usage["usage_percent"], 100.0);
    assert_eq!(usage["month_generations"], 3);
    Ok(())
}

#[tokio::test]
async fn test_daily_request_limit_is_rate_limited() -> anyhow::Result<()> {
    let t = test_app(Arc::new(CyclingText::default()), Arc::new(FixedSpeech::working())).await?;

    for _ in 0..10 {
        let response = send(&t.router, get("/api/v1/generations", Some("ada-key"))).await?;
        assert_eq!(response.status(), StatusCode::OK);
    }
    let response = send(&t.router, get("/api/v1/generations", Some("ada-key"))).await?;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    // Another account's key is unaffected.
    let response = send(&t.router, get("/api/v1/generations", Some("bob-key"))).await?;
    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn test_history_is_paginated_and_filtered() -> anyhow::Result<()> {
    let t = test_app(Arc::new(CyclingText::default()), Arc::new(FixedSpeech::working())).await?;

    for country in ["Japan", "Norway", "Japan"] {
        let response = send(&t.router, post_generate(country, Some("bob-key"))).await?;
        assert_eq!(response.status(), StatusCode::OK);
    }
    send(&t.router, post_generate("Kenya", Some("ada-key"))).await?;

    let response = send(&t.router, get("/api/v1/generations?per_page=2", Some("bob-key"))).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await?;
    assert_eq!(body["total_items"], 3);
    assert_eq!(body["total_pages"], 2);
    assert_eq!(body["per_page"], 2);
    assert_eq!(body["generations"].as_array().unwrap().len(), 2);

    let response = send(&t.router, get("/api/v1/generations?country=jap", Some("bob-key"))).await?;
    let body = json_body(response).await?;
    assert_eq!(body["total_items"], 2);
    for generation in body["generations"].as_array().unwrap() {
        assert_eq!(generation["country"], "Japan");
        assert_eq!(generation["view_count"], 0);
    }

    // Both Japan runs can land in the same second; their ids must still differ.
    let ids: Vec<_> = body["generations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["generation_id"].as_str().unwrap().to_string())
        .collect();
    assert_ne!(ids[0], ids[1]);
    Ok(())
}

#[tokio::test]
async fn test_view_is_owner_scoped_and_counted() -> anyhow::Result<()> {
    let t = test_app(Arc::new(CyclingText::default()), Arc::new(FixedSpeech::working())).await?;

    let response = send(&t.router, post_generate("Iceland", Some("bob-key"))).await?;
    let id = json_body(response).await?["generation_id"].as_str().unwrap().to_string();

    let response = send(&t.router, get(&format!("/api/v1/generation/{id}"), Some("ada-key"))).await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(&t.router, get(&format!("/api/v1/generation/{id}"), Some("bob-key"))).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await?;
    let generation = &body["generation"];
    assert_eq!(generation["generation_id"], id.as_str());
    assert_eq!(generation["view_count"], 1);
    assert_eq!(generation["content"]["story"], STORY);
    assert_eq!(generation["content"]["metadata"]["country"], "Iceland");
    Ok(())
}

#[tokio::test]
async fn test_download_sets_attachment_headers() -> anyhow::Result<()> {
    let t = test_app(Arc::new(CyclingText::default()), Arc::new(FixedSpeech::working())).await?;

    let response = send(&t.router, post_generate("Mali", Some("bob-key"))).await?;
    let id = json_body(response).await?["generation_id"].as_str().unwrap().to_string();

    let response = send(&t.router, get(&format!("/api/v1/download/{id}/audio"), Some("bob-key"))).await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "audio/mpeg");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"voiceover_tts.mp3\""
    );
    assert_eq!(raw_body(response).await?, AUDIO);

    let response = send(&t.router, get(&format!("/api/v1/download/{id}/story"), Some("bob-key"))).await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(raw_body(response).await?, STORY.as_bytes());

    let response = send(&t.router, get(&format!("/api/v1/download/{id}/zip"), Some("bob-key"))).await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(&t.router, get(&format!("/api/v1/download/{id}/story"), Some("ada-key"))).await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let record = t.app.service().archive().index().get(&id.as_str().into()).unwrap();
    assert_eq!(record.download_count, 2);
    Ok(())
}

#[tokio::test]
async fn test_restart_keeps_quota_and_history() -> anyhow::Result<()> {
    let t = test_app(Arc::new(CyclingText::default()), Arc::new(FixedSpeech::working())).await?;

    let mut ids = Vec::new();
    for _ in 0..3 {
        let response = send(&t.router, post_generate("Ghana", Some("ada-key"))).await?;
        assert_eq!(response.status(), StatusCode::OK);
        ids.push(json_body(response).await?["generation_id"].as_str().unwrap().to_string());
    }
    let response = send(&t.router, get(&format!("/api/v1/generation/{}", ids[0]), Some("ada-key"))).await?;
    assert_eq!(response.status(), StatusCode::OK);
    t.app.checkpoint().await?;

    let text = Arc::new(CyclingText::default());
    let restarted = app_over(&t.output, text.clone(), Arc::new(FixedSpeech::working())).await?;
    let router = restarted.router();

    // The free cap survives the restart.
    let response = send(&router, post_generate("Ghana", Some("ada-key"))).await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(text.calls(), 0);
    let usage = restarted.ledger().account_usage(&"ada".into()).unwrap();
    assert_eq!(usage.monthly, 3);

    // So do the records and their counters.
    let response = send(&router, get("/api/v1/generations", Some("ada-key"))).await?;
    let body = json_body(response).await?;
    assert_eq!(body["total_items"], 3);
    let response = send(&router, get(&format!("/api/v1/generation/{}", ids[0]), Some("ada-key"))).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await?;
    assert_eq!(body["generation"]["view_count"], 2);
    assert_eq!(body["generation"]["content"]["story"], STORY);
    Ok(())
}
