//! In-memory implementations of the resolver's collaborators.
//!
//! Each implementation records what it was asked so tests can assert on
//! interaction order and counts, and is driven entirely by in-process
//! state: scripted downloads land as real files, the cache layout lives
//! in a temp directory, and nothing touches the network.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;

use quarry_core::artifact::Artifact;
use quarry_core::error::ResolveError;
use quarry_core::event::{EventDispatcher, EventKind, RepositoryEvent};
use quarry_core::repository::{
    ArtifactRepository, LocalRepository, RemoteRepository, WorkspaceRepository,
};
use quarry_core::resolution::LocalArtifactResult;
use quarry_core::session::Session;

use quarry_resolver::spi::connector::{
    ArtifactDownload, NoConnector, RepositoryConnector, RepositoryConnectorProvider,
};
use quarry_resolver::spi::filter::{
    FilterDecision, RemoteRepositoryFilter, RemoteRepositoryFilterManager,
};
use quarry_resolver::spi::local::{
    LocalArtifactRegistration, LocalArtifactRequest, LocalRepositoryManager,
};
use quarry_resolver::spi::update::{UpdateCheck, UpdateCheckManager};
use quarry_resolver::spi::version::{VersionRequest, VersionResolver, VersionResult};
use quarry_resolver::spi::workspace::WorkspaceReader;

/// Shared, ordered log of collaborator operations.
///
/// Hand one journal to several collaborators to assert cross-collaborator
/// ordering (e.g. cache registration before update-check touch).
#[derive(Debug, Clone, Default)]
pub struct OperationJournal {
    entries: Arc<Mutex<Vec<String>>>,
}

impl OperationJournal {
    /// Creates an empty journal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry.
    pub fn push(&self, entry: impl Into<String>) {
        self.entries.lock().expect("journal lock").push(entry.into());
    }

    /// Returns a snapshot of all entries, oldest first.
    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().expect("journal lock").clone()
    }
}

fn ga_key(artifact: &Artifact) -> String {
    format!("{}:{}", artifact.group_id(), artifact.artifact_id())
}

/// Version resolver with per-artifact scripted answers.
///
/// Unscripted artifacts resolve to their own declared version.
#[derive(Debug, Default)]
pub struct StubVersionResolver {
    versions: Mutex<HashMap<String, String>>,
    pins: Mutex<HashMap<String, ArtifactRepository>>,
    failures: Mutex<HashMap<String, String>>,
    requests: AtomicUsize,
}

impl StubVersionResolver {
    /// Creates a resolver that maps every version to itself.
    pub fn identity() -> Self {
        Self::default()
    }

    /// Scripts the concrete version an artifact resolves to.
    pub fn resolve_to(&self, artifact: &Artifact, version: &str) {
        self.versions
            .lock()
            .expect("versions lock")
            .insert(ga_key(artifact), version.to_string());
    }

    /// Pins the version result to a repository.
    pub fn pin_repository(&self, artifact: &Artifact, repository: ArtifactRepository) {
        self.pins
            .lock()
            .expect("pins lock")
            .insert(ga_key(artifact), repository);
    }

    /// Scripts a version-resolution failure.
    pub fn fail(&self, artifact: &Artifact, message: &str) {
        self.failures
            .lock()
            .expect("failures lock")
            .insert(ga_key(artifact), message.to_string());
    }

    /// Returns how many version requests were served.
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VersionResolver for StubVersionResolver {
    async fn resolve_version(
        &self,
        _session: &Session,
        request: VersionRequest,
    ) -> Result<VersionResult, ResolveError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let key = ga_key(&request.artifact);

        if let Some(message) = self.failures.lock().expect("failures lock").get(&key) {
            return Err(ResolveError::Version {
                artifact: request.artifact.clone(),
                message: message.clone(),
            });
        }

        let version = self
            .versions
            .lock()
            .expect("versions lock")
            .get(&key)
            .cloned()
            .unwrap_or_else(|| request.artifact.version().to_string());
        let mut result = VersionResult::new(version);
        if let Some(pin) = self.pins.lock().expect("pins lock").get(&key) {
            result = result.with_repository(pin.clone());
        }
        Ok(result)
    }
}

/// Local repository manager over a real directory with in-memory tracking
/// metadata.
#[derive(Debug)]
pub struct MemoryLocalRepositoryManager {
    repository: LocalRepository,
    /// artifact key → origin repository ids; `None` marks a local install.
    tracked: Mutex<HashMap<String, HashSet<Option<String>>>>,
    registrations: Mutex<Vec<LocalArtifactRegistration>>,
    journal: Mutex<Option<OperationJournal>>,
}

impl MemoryLocalRepositoryManager {
    /// Creates a manager rooted at the given cache directory.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            repository: LocalRepository::new(base_dir),
            tracked: Mutex::new(HashMap::new()),
            registrations: Mutex::new(Vec::new()),
            journal: Mutex::new(None),
        }
    }

    /// Attaches an operation journal.
    pub fn attach_journal(&self, journal: OperationJournal) {
        *self.journal.lock().expect("journal lock") = Some(journal);
    }

    /// Returns the absolute cache path of an artifact.
    pub fn artifact_path(&self, artifact: &Artifact) -> PathBuf {
        self.repository.base_dir().join(relative_path(artifact))
    }

    /// Writes a file into the cache layout without registering it.
    pub fn put_file(&self, artifact: &Artifact, bytes: &[u8]) -> PathBuf {
        let path = self.artifact_path(artifact);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create cache directories");
        }
        std::fs::write(&path, bytes).expect("write cache file");
        path
    }

    /// Marks an artifact as tracked, optionally for a remote origin.
    pub fn record(&self, artifact: &Artifact, origin: Option<&str>) {
        self.tracked
            .lock()
            .expect("tracked lock")
            .entry(artifact.to_string())
            .or_default()
            .insert(origin.map(ToString::to_string));
    }

    /// Returns every registration `add` received, oldest first.
    pub fn registrations(&self) -> Vec<LocalArtifactRegistration> {
        self.registrations.lock().expect("registrations lock").clone()
    }
}

fn relative_path(artifact: &Artifact) -> PathBuf {
    let mut path = PathBuf::new();
    for part in artifact.group_id().split('.') {
        path.push(part);
    }
    path.push(artifact.artifact_id());
    path.push(artifact.base_version());

    let classifier = if artifact.classifier().is_empty() {
        String::new()
    } else {
        format!("-{}", artifact.classifier())
    };
    path.push(format!(
        "{}-{}{}.{}",
        artifact.artifact_id(),
        artifact.version(),
        classifier,
        artifact.extension()
    ));
    path
}

#[async_trait]
impl LocalRepositoryManager for MemoryLocalRepositoryManager {
    fn repository(&self) -> &LocalRepository {
        &self.repository
    }

    async fn find(&self, _session: &Session, request: LocalArtifactRequest) -> LocalArtifactResult {
        let path = self.artifact_path(&request.artifact);
        let file = path.is_file().then_some(path);

        let tracked = self.tracked.lock().expect("tracked lock");
        let origins = tracked.get(&request.artifact.to_string());
        let available = origins.is_some_and(|origins| {
            origins.contains(&None)
                || request
                    .repositories
                    .iter()
                    .any(|repository| origins.contains(&Some(repository.id().to_string())))
        });
        let repository = origins.and_then(|origins| {
            request
                .repositories
                .iter()
                .find(|repository| origins.contains(&Some(repository.id().to_string())))
                .cloned()
        });

        LocalArtifactResult {
            file,
            available,
            repository,
        }
    }

    async fn add(&self, _session: &Session, registration: LocalArtifactRegistration) {
        if let Some(journal) = self.journal.lock().expect("journal lock").as_ref() {
            journal.push(format!("lrm.add {}", registration.artifact));
        }
        self.tracked
            .lock()
            .expect("tracked lock")
            .entry(registration.artifact.to_string())
            .or_default()
            .insert(registration.repository.as_ref().map(|r| r.id().to_string()));
        self.registrations
            .lock()
            .expect("registrations lock")
            .push(registration);
    }

    fn path_for_remote_artifact(
        &self,
        artifact: &Artifact,
        _repository: &RemoteRepository,
        _request_context: &str,
    ) -> PathBuf {
        relative_path(artifact)
    }
}

/// Workspace reader over a fixed artifact → path map.
#[derive(Debug, Default)]
pub struct StaticWorkspaceReader {
    artifacts: Mutex<HashMap<String, PathBuf>>,
}

impl StaticWorkspaceReader {
    /// Creates an empty workspace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the workspace provide a file for an artifact.
    pub fn provide(&self, artifact: &Artifact, path: impl Into<PathBuf>) {
        self.artifacts
            .lock()
            .expect("artifacts lock")
            .insert(artifact.to_string(), path.into());
    }
}

impl WorkspaceReader for StaticWorkspaceReader {
    fn repository(&self) -> WorkspaceRepository {
        WorkspaceRepository::default()
    }

    fn find_artifact(&self, artifact: &Artifact) -> Option<PathBuf> {
        self.artifacts
            .lock()
            .expect("artifacts lock")
            .get(&artifact.to_string())
            .cloned()
    }
}

/// What a scripted connector does with one download.
#[derive(Debug, Clone)]
pub enum DownloadScript {
    /// Write the bytes to the download's destination.
    Serve(Bytes),
    /// Fail the download with a transfer error.
    Fail(String),
}

#[derive(Debug, Default)]
struct ConnectorState {
    /// (repository id, artifact) → script.
    scripts: Mutex<HashMap<(String, String), DownloadScript>>,
    refused: Mutex<HashSet<String>>,
    connectors_built: AtomicUsize,
    batches: AtomicUsize,
    journal: Mutex<Option<OperationJournal>>,
}

/// Connector provider running scripted downloads against the real
/// filesystem.
///
/// Unscripted downloads fail as not-found, which mimics a repository that
/// simply does not host the artifact.
#[derive(Debug, Clone, Default)]
pub struct ScriptedConnectorProvider {
    state: Arc<ConnectorState>,
}

impl ScriptedConnectorProvider {
    /// Creates a provider with no scripts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches an operation journal.
    pub fn attach_journal(&self, journal: OperationJournal) {
        *self.state.journal.lock().expect("journal lock") = Some(journal);
    }

    /// Scripts a served download.
    pub fn serve(&self, repository_id: &str, artifact: &Artifact, bytes: impl Into<Bytes>) {
        self.state.scripts.lock().expect("scripts lock").insert(
            (repository_id.to_string(), artifact.to_string()),
            DownloadScript::Serve(bytes.into()),
        );
    }

    /// Scripts a failed download.
    pub fn fail(&self, repository_id: &str, artifact: &Artifact, message: &str) {
        self.state.scripts.lock().expect("scripts lock").insert(
            (repository_id.to_string(), artifact.to_string()),
            DownloadScript::Fail(message.to_string()),
        );
    }

    /// Makes `new_connector` refuse the given repository.
    pub fn refuse(&self, repository_id: &str) {
        self.state
            .refused
            .lock()
            .expect("refused lock")
            .insert(repository_id.to_string());
    }

    /// Returns how many connectors were built.
    pub fn connectors_built(&self) -> usize {
        self.state.connectors_built.load(Ordering::SeqCst)
    }

    /// Returns how many batched `get` calls ran.
    pub fn batches(&self) -> usize {
        self.state.batches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RepositoryConnectorProvider for ScriptedConnectorProvider {
    async fn new_connector(
        &self,
        _session: &Session,
        repository: &RemoteRepository,
    ) -> Result<Box<dyn RepositoryConnector>, NoConnector> {
        if self
            .state
            .refused
            .lock()
            .expect("refused lock")
            .contains(repository.id())
        {
            return Err(NoConnector {
                repository: repository.clone(),
            });
        }
        self.state.connectors_built.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedConnector {
            repository: repository.clone(),
            state: Arc::clone(&self.state),
        }))
    }
}

struct ScriptedConnector {
    repository: RemoteRepository,
    state: Arc<ConnectorState>,
}

#[async_trait]
impl RepositoryConnector for ScriptedConnector {
    async fn get(&self, downloads: &mut [ArtifactDownload]) {
        self.state.batches.fetch_add(1, Ordering::SeqCst);
        if let Some(journal) = self.state.journal.lock().expect("journal lock").as_ref() {
            journal.push(format!("connector.get {}", self.repository.id()));
        }

        for download in downloads {
            let key = (
                self.repository.id().to_string(),
                download.artifact.to_string(),
            );
            let script = self
                .state
                .scripts
                .lock()
                .expect("scripts lock")
                .get(&key)
                .cloned();

            match script {
                Some(DownloadScript::Serve(bytes)) => {
                    if let Some(listener) = &download.listener {
                        listener.transfer_started(&download.artifact, &self.repository);
                    }
                    if let Some(parent) = download.file.parent() {
                        std::fs::create_dir_all(parent).expect("create download directories");
                    }
                    std::fs::write(&download.file, &bytes).expect("write download");
                    download.supported_contexts = vec![download.request_context.clone()];
                    if let Some(listener) = &download.listener {
                        listener.transfer_succeeded(&download.artifact, &self.repository);
                    }
                }
                Some(DownloadScript::Fail(message)) => {
                    let error = ResolveError::Transfer {
                        artifact: download.artifact.clone(),
                        repository: Some(self.repository.clone()),
                        message,
                    };
                    if let Some(listener) = &download.listener {
                        listener.transfer_started(&download.artifact, &self.repository);
                        listener.transfer_failed(&download.artifact, &self.repository, &error);
                    }
                    download.error = Some(error);
                }
                None => {
                    download.error = Some(ResolveError::NotFound {
                        artifact: download.artifact.clone(),
                        repository: Some(self.repository.clone()),
                        reason: None,
                    });
                }
            }
        }
    }
}

/// Update-check manager with scripted suppressions.
///
/// Unscripted artifacts always require a re-fetch.
#[derive(Debug, Default)]
pub struct MemoryUpdateCheckManager {
    suppressed: Mutex<HashMap<String, Option<ResolveError>>>,
    touched: Mutex<Vec<(String, Option<ResolveError>)>>,
    journal: Mutex<Option<OperationJournal>>,
}

impl MemoryUpdateCheckManager {
    /// Creates a manager that requires every re-fetch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches an operation journal.
    pub fn attach_journal(&self, journal: OperationJournal) {
        *self.journal.lock().expect("journal lock") = Some(journal);
    }

    /// Suppresses re-fetches of an artifact, surfacing the given prior
    /// error instead.
    pub fn suppress(&self, artifact: &Artifact, prior: Option<ResolveError>) {
        self.suppressed
            .lock()
            .expect("suppressed lock")
            .insert(artifact.to_string(), prior);
    }

    /// Returns every touch, oldest first, as (artifact, outcome) pairs.
    pub fn touched(&self) -> Vec<(String, Option<ResolveError>)> {
        self.touched.lock().expect("touched lock").clone()
    }
}

#[async_trait]
impl UpdateCheckManager for MemoryUpdateCheckManager {
    async fn check_artifact(&self, _session: &Session, check: &mut UpdateCheck) {
        match self
            .suppressed
            .lock()
            .expect("suppressed lock")
            .get(&check.artifact.to_string())
        {
            Some(prior) => {
                check.required = false;
                check.error = prior.clone();
            }
            None => check.required = true,
        }
    }

    async fn touch_artifact(&self, _session: &Session, check: &UpdateCheck) {
        if let Some(journal) = self.journal.lock().expect("journal lock").as_ref() {
            journal.push(format!("update.touch {}", check.artifact));
        }
        self.touched
            .lock()
            .expect("touched lock")
            .push((check.artifact.to_string(), check.error.clone()));
    }
}

/// Filter rejecting a fixed set of repository ids.
#[derive(Debug, Default)]
pub struct StaticRepositoryFilter {
    rejects: HashMap<String, String>,
}

impl RemoteRepositoryFilter for StaticRepositoryFilter {
    fn accept_artifact(
        &self,
        repository: &RemoteRepository,
        _artifact: &Artifact,
    ) -> FilterDecision {
        match self.rejects.get(repository.id()) {
            Some(reason) => FilterDecision::Rejected(reason.clone()),
            None => FilterDecision::Accepted,
        }
    }
}

/// Filter manager handing out a [`StaticRepositoryFilter`].
#[derive(Debug, Clone)]
pub struct StaticFilterManager {
    filter: Arc<StaticRepositoryFilter>,
}

impl StaticFilterManager {
    /// Creates a manager whose filter accepts everything. The filter is
    /// still *active*, which changes the locally-installed decision.
    pub fn accepting_all() -> Self {
        Self {
            filter: Arc::new(StaticRepositoryFilter::default()),
        }
    }

    /// Creates a manager whose filter rejects the given repository ids
    /// with the given reasons.
    pub fn rejecting(pairs: &[(&str, &str)]) -> Self {
        let rejects = pairs
            .iter()
            .map(|(id, reason)| ((*id).to_string(), (*reason).to_string()))
            .collect();
        Self {
            filter: Arc::new(StaticRepositoryFilter { rejects }),
        }
    }
}

impl RemoteRepositoryFilterManager for StaticFilterManager {
    fn filter(&self, _session: &Session) -> Option<Arc<dyn RemoteRepositoryFilter>> {
        Some(Arc::clone(&self.filter) as Arc<dyn RemoteRepositoryFilter>)
    }
}

/// Event dispatcher that records everything it sees.
#[derive(Debug, Default)]
pub struct RecordingEventDispatcher {
    events: Mutex<Vec<RepositoryEvent>>,
}

impl RecordingEventDispatcher {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all recorded events, oldest first.
    pub fn events(&self) -> Vec<RepositoryEvent> {
        self.events.lock().expect("events lock").clone()
    }

    /// Returns the kinds of all recorded events, oldest first.
    pub fn kinds(&self) -> Vec<EventKind> {
        self.events().iter().map(|event| event.kind).collect()
    }

    /// Returns the event kinds recorded for one artifact id.
    pub fn kinds_for(&self, artifact_id: &str) -> Vec<EventKind> {
        self.events()
            .iter()
            .filter(|event| event.artifact.artifact_id() == artifact_id)
            .map(|event| event.kind)
            .collect()
    }

    /// Returns how many events of the given kind were recorded.
    pub fn count_of(&self, kind: EventKind) -> usize {
        self.events()
            .iter()
            .filter(|event| event.kind == kind)
            .count()
    }
}

impl EventDispatcher for RecordingEventDispatcher {
    fn dispatch(&self, event: RepositoryEvent) {
        self.events.lock().expect("events lock").push(event);
    }
}
