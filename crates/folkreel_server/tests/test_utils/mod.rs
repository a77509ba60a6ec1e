//! Fixtures for HTTP API tests.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response};
use folkreel_core::{SubscriptionStatus, SubscriptionTier};
use folkreel_error::{GenerationError, SynthesisError, SynthesisErrorKind};
use folkreel_interface::{SpeechSynthesizer, TextGenerator, VoiceParams};
use folkreel_server::{AccountSeed, FolkreelApp, FolkreelConfig, StorageConfig};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;
use tower::ServiceExt;

pub const STORY: &str = "Once upon a time a fox outwitted the mountain spirit.";
pub const SCRIPT: &str = "Narrator: Long ago, beneath the mountain...";
pub const SCENES: &str = "Scene 1: A fox at the foot of a misty mountain.";
pub const AUDIO: &[u8] = b"ID3-mock-audio";

/// Answers story, script and scenes in rotation.
#[derive(Default)]
pub struct CyclingText {
    calls: AtomicUsize,
    blank: bool,
}

impl CyclingText {
    /// A generator whose every answer is blank.
    pub fn blank() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            blank: true,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for CyclingText {
    async fn complete(&self, _prompt: &str) -> Result<String, GenerationError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.blank {
            return Ok("   ".to_string());
        }
        Ok([STORY, SCRIPT, SCENES][n % 3].to_string())
    }

    fn provider_name(&self) -> &str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

/// Speech that always succeeds or always fails.
pub struct FixedSpeech {
    fail: bool,
}

impl FixedSpeech {
    pub fn working() -> Self {
        Self { fail: false }
    }

    pub fn broken() -> Self {
        Self { fail: true }
    }
}

#[async_trait]
impl SpeechSynthesizer for FixedSpeech {
    async fn synthesize(&self, _text: &str, _voice: &VoiceParams) -> Result<Vec<u8>, SynthesisError> {
        if self.fail {
            Err(SynthesisError::new(SynthesisErrorKind::HttpStatus {
                status_code: 500,
                message: "voice service down".to_string(),
            }))
        } else {
            Ok(AUDIO.to_vec())
        }
    }
}

pub fn seed(name: &str, tier: SubscriptionTier, status: SubscriptionStatus, key: &str) -> AccountSeed {
    AccountSeed {
        name: name.to_string(),
        tier,
        status,
        keys: vec![key.to_string()],
    }
}

/// App over a temporary output directory with three seeded accounts:
/// `ada` (free, `ada-key`), `bob` (premium, `bob-key`), `cy` (inactive, `cy-key`).
pub struct TestApp {
    pub app: FolkreelApp,
    pub router: Router,
    pub output: TempDir,
}

pub async fn test_app(text: Arc<dyn TextGenerator>, speech: Arc<dyn SpeechSynthesizer>) -> anyhow::Result<TestApp> {
    let output = TempDir::new()?;
    let app = app_over(&output, text, speech).await?;
    let router = app.router();
    Ok(TestApp { app, router, output })
}

/// Another app over the same output directory, as after a restart.
pub async fn app_over(
    output: &TempDir,
    text: Arc<dyn TextGenerator>,
    speech: Arc<dyn SpeechSynthesizer>,
) -> anyhow::Result<FolkreelApp> {
    let config = FolkreelConfig {
        storage: StorageConfig {
            output_dir: output.path().to_path_buf(),
            ..StorageConfig::default()
        },
        accounts: vec![
            seed("ada", SubscriptionTier::Free, SubscriptionStatus::Active, "ada-key"),
            seed("bob", SubscriptionTier::Premium, SubscriptionStatus::Active, "bob-key"),
            seed("cy", SubscriptionTier::Basic, SubscriptionStatus::Cancelled, "cy-key"),
        ],
        ..FolkreelConfig::default()
    };
    Ok(FolkreelApp::with_clients(&config, text, speech).await?)
}

pub fn get(uri: &str, key: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(key) = key {
        builder = builder.header("X-API-Key", key);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post_generate(country: &str, key: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/v1/generate")
        .header("content-type", "application/json");
    if let Some(key) = key {
        builder = builder.header("X-API-Key", key);
    }
    let body = serde_json::json!({ "country": country }).to_string();
    builder.body(Body::from(body)).unwrap()
}

pub async fn send(router: &Router, request: Request<Body>) -> anyhow::Result<Response<Body>> {
    Ok(router.clone().oneshot(request).await?)
}

pub async fn json_body(response: Response<Body>) -> anyhow::Result<serde_json::Value> {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

pub async fn raw_body(response: Response<Body>) -> anyhow::Result<Vec<u8>> {
    Ok(axum::body::to_bytes(response.into_body(), usize::MAX).await?.to_vec())
}

