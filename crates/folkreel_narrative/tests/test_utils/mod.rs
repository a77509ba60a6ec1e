//! Mock clients and fixtures for pipeline tests.

#![allow(dead_code)]

use async_trait::async_trait;
use folkreel_core::{
    AccountId, ArtifactKind, ArtifactRef, CredentialId, Entitlement, GenerationEvent,
    GenerationId, GenerationMetadata, SubscriptionTier,
};
use folkreel_error::{
    AdmissionError, AdmissionErrorKind, FolkreelResult, GenerationError, GenerationErrorKind,
    StorageError, StorageErrorKind, SynthesisError, SynthesisErrorKind,
};
use folkreel_interface::{
    CredentialSource, EntitlementSource, GenerationNotifier, ResolvedCredential,
    SpeechSynthesizer, TextGenerator, VoiceParams,
};
use folkreel_narrative::{GenerationService, Orchestrator, PromptSet, RetryPolicy, Stages};
use folkreel_quota::{AdmissionGate, QuotaConfig, QuotaLedger};
use folkreel_storage::{ArtifactStore, FileSystemArtifactStore, GenerationIndex};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio::sync::mpsc;

/// Behavior configuration for mock responses.
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Always return success with the given text
    Success(String),
    /// Always return the specified error
    Error(GenerationErrorKind),
    /// Fail N times with the error, then follow the sequence
    FailThenSucceed {
        fail_count: usize,
        error: GenerationErrorKind,
        then: Vec<MockResponse>,
    },
    /// Return a sequence of responses (errors or success)
    Sequence(Vec<MockResponse>),
    /// Never answer
    Stall,
}

/// A single mock response (success or error).
#[derive(Debug, Clone)]
pub enum MockResponse {
    Success(String),
    Error(GenerationErrorKind),
}

/// Mock text generator with a call counter.
pub struct MockTextGenerator {
    behavior: MockBehavior,
    call_count: Arc<Mutex<usize>>,
}

impl MockTextGenerator {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Story, script and scenes in order.
    pub fn pipeline(story: &str, script: &str, scenes: &str) -> Self {
        Self::new(MockBehavior::Sequence(vec![
            MockResponse::Success(story.to_string()),
            MockResponse::Success(script.to_string()),
            MockResponse::Success(scenes.to_string()),
        ]))
    }

    /// The same story, script and scenes for every run.
    pub fn repeating(story: &str, script: &str, scenes: &str, runs: usize) -> Self {
        let responses = (0..runs)
            .flat_map(|_| {
                [
                    MockResponse::Success(story.to_string()),
                    MockResponse::Success(script.to_string()),
                    MockResponse::Success(scenes.to_string()),
                ]
            })
            .collect();
        Self::new(MockBehavior::Sequence(responses))
    }

    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    fn respond(response: &MockResponse) -> Result<String, GenerationError> {
        match response {
            MockResponse::Success(text) => Ok(text.clone()),
            MockResponse::Error(kind) => Err(GenerationError::new(kind.clone())),
        }
    }

    fn next_response(&self) -> Result<String, GenerationError> {
        let mut count = self.call_count.lock().unwrap();
        let current = *count;
        *count += 1;

        let sequence_at = |responses: &[MockResponse], at: usize| {
            responses.get(at).map(Self::respond).unwrap_or_else(|| {
                Err(GenerationError::new(GenerationErrorKind::Transport(format!(
                    "Mock sequence exhausted (call {} beyond {} responses)",
                    at + 1,
                    responses.len()
                ))))
            })
        };

        match &self.behavior {
            MockBehavior::Success(text) => Ok(text.clone()),
            MockBehavior::Error(kind) => Err(GenerationError::new(kind.clone())),
            MockBehavior::FailThenSucceed {
                fail_count,
                error,
                then,
            } => {
                if current < *fail_count {
                    Err(GenerationError::new(error.clone()))
                } else {
                    sequence_at(then, current - fail_count)
                }
            }
            MockBehavior::Sequence(responses) => sequence_at(responses, current),
            MockBehavior::Stall => unreachable!("stalled calls never produce a response"),
        }
    }
}

#[async_trait]
impl TextGenerator for MockTextGenerator {
    async fn complete(&self, _prompt: &str) -> Result<String, GenerationError> {
        if matches!(self.behavior, MockBehavior::Stall) {
            *self.call_count.lock().unwrap() += 1;
            return std::future::pending().await;
        }
        self.next_response()
    }

    fn provider_name(&self) -> &str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

/// Mock speech synthesizer.
pub struct MockSpeech {
    result: Result<Vec<u8>, SynthesisErrorKind>,
    call_count: Arc<Mutex<usize>>,
}

impl MockSpeech {
    pub fn success(bytes: &[u8]) -> Self {
        Self {
            result: Ok(bytes.to_vec()),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn failing() -> Self {
        Self {
            result: Err(SynthesisErrorKind::Transport("connection reset".to_string())),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

#[async_trait]
impl SpeechSynthesizer for MockSpeech {
    async fn synthesize(&self, _text: &str, _voice: &VoiceParams) -> Result<Vec<u8>, SynthesisError> {
        *self.call_count.lock().unwrap() += 1;
        self.result.clone().map_err(SynthesisError::new)
    }
}

/// Behavior configuration for the mock store.
#[derive(Debug, Clone, Copy)]
pub enum StoreBehavior {
    /// Write everything to disk
    Working,
    /// Fail writing one artifact kind
    FailPut(ArtifactKind),
    /// Fail writing `metadata.json`
    FailMetadata,
}

/// Filesystem store that fails where told to.
pub struct MockStore {
    inner: FileSystemArtifactStore,
    behavior: StoreBehavior,
    deletes: Arc<Mutex<Vec<String>>>,
}

impl MockStore {
    pub fn new(inner: FileSystemArtifactStore, behavior: StoreBehavior) -> Self {
        Self {
            inner,
            behavior,
            deletes: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Everything deleted so far, as `generation/file`.
    pub fn deletes(&self) -> Vec<String> {
        self.deletes.lock().unwrap().clone()
    }

    fn injected(what: &str) -> StorageError {
        StorageError::new(StorageErrorKind::FileWrite(format!("injected failure writing {what}")))
    }
}

#[async_trait]
impl ArtifactStore for MockStore {
    async fn put(&self, id: &GenerationId, kind: ArtifactKind, content: &[u8]) -> Result<ArtifactRef, StorageError> {
        if matches!(self.behavior, StoreBehavior::FailPut(failing) if failing == kind) {
            return Err(Self::injected(kind.file_name()));
        }
        self.inner.put(id, kind, content).await
    }

    async fn get(&self, id: &GenerationId, kind: ArtifactKind) -> Result<Vec<u8>, StorageError> {
        self.inner.get(id, kind).await
    }

    async fn retrieve(&self, reference: &ArtifactRef) -> Result<Vec<u8>, StorageError> {
        self.inner.retrieve(reference).await
    }

    async fn put_metadata(&self, metadata: &GenerationMetadata) -> Result<PathBuf, StorageError> {
        if matches!(self.behavior, StoreBehavior::FailMetadata) {
            return Err(Self::injected("metadata.json"));
        }
        self.inner.put_metadata(metadata).await
    }

    async fn get_metadata(&self, id: &GenerationId) -> Result<GenerationMetadata, StorageError> {
        self.inner.get_metadata(id).await
    }

    async fn list_metadata(&self) -> Result<Vec<GenerationMetadata>, StorageError> {
        self.inner.list_metadata().await
    }

    async fn exists(&self, id: &GenerationId) -> Result<bool, StorageError> {
        self.inner.exists(id).await
    }

    async fn delete(&self, id: &GenerationId, kind: ArtifactKind) -> Result<(), StorageError> {
        self.deletes.lock().unwrap().push(format!("{}/{}", id, kind.file_name()));
        self.inner.delete(id, kind).await
    }

    async fn delete_metadata(&self, id: &GenerationId) -> Result<(), StorageError> {
        self.deletes.lock().unwrap().push(format!("{}/metadata.json", id));
        self.inner.delete_metadata(id).await
    }
}

/// Directory where every account is active at a fixed tier.
#[derive(Default)]
pub struct OpenDirectory {
    tiers: Mutex<HashMap<AccountId, SubscriptionTier>>,
    keys: Mutex<HashMap<CredentialId, AccountId>>,
}

impl OpenDirectory {
    pub fn add(&self, account: &str, tier: SubscriptionTier) {
        self.tiers.lock().unwrap().insert(AccountId::from(account), tier);
    }

    pub fn add_key(&self, key: &str, account: &str) {
        self.keys
            .lock()
            .unwrap()
            .insert(CredentialId::from(key), AccountId::from(account));
    }
}

#[async_trait]
impl EntitlementSource for OpenDirectory {
    async fn get_entitlement(&self, account: &AccountId) -> Result<Entitlement, AdmissionError> {
        self.tiers
            .lock()
            .unwrap()
            .get(account)
            .map(|tier| Entitlement::active(*tier))
            .ok_or_else(|| AdmissionError::new(AdmissionErrorKind::UnknownAccount(account.to_string())))
    }
}

#[async_trait]
impl CredentialSource for OpenDirectory {
    async fn resolve_credential(&self, key: &CredentialId) -> Result<ResolvedCredential, AdmissionError> {
        let account = self
            .keys
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| AdmissionError::new(AdmissionErrorKind::UnknownCredential))?;
        let tier = self.tiers.lock().unwrap().get(&account).copied().unwrap_or_default();
        Ok(ResolvedCredential {
            account,
            active: true,
            tier,
        })
    }
}

/// Notifier forwarding events to a channel.
pub struct RecordingNotifier {
    sender: mpsc::UnboundedSender<GenerationEvent>,
}

#[async_trait]
impl GenerationNotifier for RecordingNotifier {
    async fn notify(&self, event: &GenerationEvent) -> FolkreelResult<()> {
        let _ = self.sender.send(event.clone());
        Ok(())
    }
}

/// Everything a pipeline test needs.
pub struct Harness {
    pub service: GenerationService,
    pub ledger: Arc<QuotaLedger>,
    pub index: Arc<GenerationIndex>,
    pub directory: Arc<OpenDirectory>,
    pub text: Arc<MockTextGenerator>,
    pub speech: Arc<MockSpeech>,
    pub store: Arc<MockStore>,
    pub events: mpsc::UnboundedReceiver<GenerationEvent>,
    pub output: TempDir,
}

pub fn harness(text: MockTextGenerator, speech: MockSpeech) -> Harness {
    harness_with(text, speech, RetryPolicy::none(), StoreBehavior::Working)
}

pub fn harness_with_retry(text: MockTextGenerator, speech: MockSpeech, retry: RetryPolicy) -> Harness {
    harness_with(text, speech, retry, StoreBehavior::Working)
}

pub fn harness_with_store(text: MockTextGenerator, speech: MockSpeech, behavior: StoreBehavior) -> Harness {
    harness_with(text, speech, RetryPolicy::none(), behavior)
}

fn harness_with(
    text: MockTextGenerator,
    speech: MockSpeech,
    retry: RetryPolicy,
    behavior: StoreBehavior,
) -> Harness {
    let output = TempDir::new().unwrap();
    let store = Arc::new(MockStore::new(
        FileSystemArtifactStore::new(output.path()).unwrap(),
        behavior,
    ));
    let index = Arc::new(GenerationIndex::new());
    let ledger = Arc::new(QuotaLedger::new(QuotaConfig::default()));
    let directory = Arc::new(OpenDirectory::default());
    let text = Arc::new(text);
    let speech = Arc::new(speech);
    let (sender, events) = mpsc::unbounded_channel();

    let stages = Stages::new(text.clone(), speech.clone(), PromptSet::bundled().unwrap()).with_retry(retry);
    let orchestrator = Orchestrator::new(stages, store.clone(), index.clone())
        .with_notifier(Arc::new(RecordingNotifier { sender }));
    let gate = AdmissionGate::new(ledger.clone(), directory.clone(), directory.clone());

    Harness {
        service: GenerationService::new(gate, orchestrator),
        ledger,
        index,
        directory,
        text,
        speech,
        store,
        events,
        output,
    }
}
