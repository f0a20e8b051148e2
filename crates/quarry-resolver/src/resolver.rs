//! The artifact resolution orchestrator.
//!
//! [`ArtifactResolver`] accepts a batch of artifact requests and, per
//! request, decides where the artifact lives: the caller-supplied path for
//! pre-hosted artifacts, the in-process workspace, the local cache, or a
//! remote repository. Remote work is clustered by compatible repository
//! and executed as batched connector calls.
//!
//! ## Two-phase locking
//!
//! Concurrent resolvers are coordinated through a sync context keyed by
//! the batch's artifact identities. A call first plans under a *shared*
//! acquisition, which lets read-mostly resolutions proceed in parallel.
//! Only when downloads turn out to be required does it escalate: the
//! shared context is closed, an *exclusive* context is acquired, and the
//! planning pass runs again from scratch — between the two acquisitions
//! another resolver may have populated the cache. `Resolving` events are
//! emitted during the shared pass only; terminal `Resolved` events for
//! artifacts satisfied during planning are deferred until the pass is
//! known to be the final one, so each result sees exactly one.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use quarry_core::artifact::properties;
use quarry_core::config::keys;
use quarry_core::error::{ResolutionFailure, ResolveError};
use quarry_core::event::{EventDispatcher, NoopEventDispatcher, RepositoryEvent};
use quarry_core::repository::ArtifactRepository;
use quarry_core::resolution::{ArtifactRequest, ArtifactResult, RequestTrace};
use quarry_core::session::Session;

use crate::download::DownloadCoordinator;
use crate::error::ResolverError;
use crate::events::EventEmitter;
use crate::gate::{FilterGate, OfflineGate};
use crate::group::{GroupScheduler, ResolutionItem};
use crate::lookup;
use crate::snapshot;
use crate::spi::connector::RepositoryConnectorProvider;
use crate::spi::filter::{NoFilterManager, RemoteRepositoryFilterManager};
use crate::spi::local::{LocalArtifactRegistration, LocalArtifactRequest, LocalRepositoryManager};
use crate::spi::offline::{OfflineController, SessionOfflineController};
use crate::spi::post_process::ResolverPostProcessor;
use crate::spi::remote::{DefaultRemoteRepositoryManager, RemoteRepositoryManager};
use crate::spi::update::{NoopUpdateCheckManager, UpdateCheckManager};
use crate::spi::version::{VersionRequest, VersionResolver};
use crate::spi::workspace::WorkspaceReader;
use crate::sync::memory::InMemorySyncContextFactory;
use crate::sync::{AccessMode, SyncContextFactory};

/// Resolves artifact coordinates to files on the local filesystem.
pub struct ArtifactResolver {
    version_resolver: Arc<dyn VersionResolver>,
    lrm: Arc<dyn LocalRepositoryManager>,
    connector_provider: Arc<dyn RepositoryConnectorProvider>,
    workspace: Option<Arc<dyn WorkspaceReader>>,
    filter_manager: Arc<dyn RemoteRepositoryFilterManager>,
    offline_controller: Arc<dyn OfflineController>,
    remote_manager: Arc<dyn RemoteRepositoryManager>,
    update_checks: Arc<dyn UpdateCheckManager>,
    sync_contexts: Arc<dyn SyncContextFactory>,
    events: Arc<dyn EventDispatcher>,
    post_processors: BTreeMap<String, Arc<dyn ResolverPostProcessor>>,
}

/// Builder for [`ArtifactResolver`].
///
/// The version resolver, local repository manager, and connector provider
/// are required; everything else defaults to a sensible in-process
/// implementation.
pub struct ArtifactResolverBuilder {
    resolver: ArtifactResolver,
}

impl ArtifactResolverBuilder {
    fn new(
        version_resolver: Arc<dyn VersionResolver>,
        lrm: Arc<dyn LocalRepositoryManager>,
        connector_provider: Arc<dyn RepositoryConnectorProvider>,
    ) -> Self {
        Self {
            resolver: ArtifactResolver {
                version_resolver,
                lrm,
                connector_provider,
                workspace: None,
                filter_manager: Arc::new(NoFilterManager),
                offline_controller: Arc::new(SessionOfflineController),
                remote_manager: Arc::new(DefaultRemoteRepositoryManager),
                update_checks: Arc::new(NoopUpdateCheckManager),
                sync_contexts: Arc::new(InMemorySyncContextFactory::new()),
                events: Arc::new(NoopEventDispatcher),
                post_processors: BTreeMap::new(),
            },
        }
    }

    /// Wires the in-process workspace tier.
    #[must_use]
    pub fn with_workspace_reader(mut self, workspace: Arc<dyn WorkspaceReader>) -> Self {
        self.resolver.workspace = Some(workspace);
        self
    }

    /// Wires a remote-repository filter manager.
    #[must_use]
    pub fn with_filter_manager(mut self, manager: Arc<dyn RemoteRepositoryFilterManager>) -> Self {
        self.resolver.filter_manager = manager;
        self
    }

    /// Replaces the offline controller.
    #[must_use]
    pub fn with_offline_controller(mut self, controller: Arc<dyn OfflineController>) -> Self {
        self.resolver.offline_controller = controller;
        self
    }

    /// Replaces the remote repository policy manager.
    #[must_use]
    pub fn with_remote_repository_manager(
        mut self,
        manager: Arc<dyn RemoteRepositoryManager>,
    ) -> Self {
        self.resolver.remote_manager = manager;
        self
    }

    /// Replaces the update-check manager.
    #[must_use]
    pub fn with_update_check_manager(mut self, manager: Arc<dyn UpdateCheckManager>) -> Self {
        self.resolver.update_checks = manager;
        self
    }

    /// Replaces the sync-context factory.
    #[must_use]
    pub fn with_sync_context_factory(mut self, factory: Arc<dyn SyncContextFactory>) -> Self {
        self.resolver.sync_contexts = factory;
        self
    }

    /// Replaces the event dispatcher.
    #[must_use]
    pub fn with_event_dispatcher(mut self, dispatcher: Arc<dyn EventDispatcher>) -> Self {
        self.resolver.events = dispatcher;
        self
    }

    /// Registers a post-processor. Post-processors run in name order.
    #[must_use]
    pub fn with_post_processor(
        mut self,
        name: impl Into<String>,
        post_processor: Arc<dyn ResolverPostProcessor>,
    ) -> Self {
        self.resolver
            .post_processors
            .insert(name.into(), post_processor);
        self
    }

    /// Finishes the builder.
    #[must_use]
    pub fn build(self) -> ArtifactResolver {
        self.resolver
    }
}

/// Output of one planning pass over the whole batch.
struct PlanningPass {
    results: Vec<ArtifactResult>,
    scheduler: GroupScheduler,
    /// Terminal events for results satisfied during planning, held back
    /// until the pass is known final.
    deferred: Vec<RepositoryEvent>,
}

impl ArtifactResolver {
    /// Starts a builder from the three required collaborators.
    #[must_use]
    pub fn builder(
        version_resolver: Arc<dyn VersionResolver>,
        lrm: Arc<dyn LocalRepositoryManager>,
        connector_provider: Arc<dyn RepositoryConnectorProvider>,
    ) -> ArtifactResolverBuilder {
        ArtifactResolverBuilder::new(version_resolver, lrm, connector_provider)
    }

    /// Resolves a single artifact request.
    ///
    /// # Errors
    ///
    /// Fails like [`ArtifactResolver::resolve_artifacts`] does for a
    /// one-element batch.
    pub async fn resolve_artifact(
        &self,
        session: &Session,
        request: ArtifactRequest,
    ) -> Result<ArtifactResult, ResolverError> {
        let mut results = self.resolve_artifacts(session, vec![request]).await?;
        debug_assert_eq!(results.len(), 1);
        Ok(results.swap_remove(0))
    }

    /// Resolves a batch of artifact requests.
    ///
    /// Returns one result per request, in request order. Per-request
    /// errors accumulate on their result and do not abort the batch.
    ///
    /// # Errors
    ///
    /// - [`ResolverError::Unresolved`] when any result ends without a
    ///   file; the error carries the complete result list
    /// - [`ResolverError::Sync`] when the sync context cannot be acquired
    /// - [`ResolverError::PostProcess`] when a post-processor fails
    pub async fn resolve_artifacts(
        &self,
        session: &Session,
        requests: Vec<ArtifactRequest>,
    ) -> Result<Vec<ArtifactResult>, ResolverError> {
        if requests.is_empty() {
            return Ok(Vec::new());
        }

        let subjects: Vec<String> = requests
            .iter()
            .filter(|request| request.artifact.property(properties::LOCAL_PATH).is_none())
            .map(|request| request.artifact.lock_key())
            .collect();

        let emitter = EventEmitter::new(self.events.as_ref());
        let gate = FilterGate::new(self.filter_manager.filter(session));
        // Interop with simple local-repository layouts breaks filtering,
        // so the option is ignored while a filter is active.
        let interop =
            !gate.is_active() && session.config().get_bool(keys::SIMPLE_LRM_INTEROP, false);

        let mut mode = AccessMode::Shared;
        loop {
            let mut context = self.sync_contexts.new_context(session, mode);
            context.acquire(&subjects).await?;

            let pass = self
                .plan(session, &requests, mode, &gate, interop, &emitter)
                .await;

            if !pass.scheduler.is_empty() && mode == AccessMode::Shared {
                // Another resolver may populate the cache between the
                // shared release and the exclusive acquisition, so the
                // planning pass runs again from scratch.
                context.close();
                drop(context);
                mode = AccessMode::Exclusive;
                continue;
            }

            let PlanningPass {
                mut results,
                scheduler,
                deferred,
            } = pass;

            for event in deferred {
                emitter.dispatch(event);
            }

            let coordinator = DownloadCoordinator {
                session,
                lrm: self.lrm.as_ref(),
                connectors: self.connector_provider.as_ref(),
                remote_manager: self.remote_manager.as_ref(),
                update_checks: self.update_checks.as_ref(),
                events: &emitter,
            };
            let mut groups = scheduler.into_groups();
            for group in &mut groups {
                coordinator.perform(group, &mut results).await;
            }

            for (name, post_processor) in &self.post_processors {
                post_processor
                    .post_process(session, &mut results)
                    .await
                    .map_err(|source| ResolverError::PostProcess {
                        name: name.clone(),
                        source,
                    })?;
            }

            let mut failures = false;
            for result in &mut results {
                if result.is_resolved() {
                    continue;
                }
                failures = true;
                if result.errors.is_empty() {
                    result.add_error(ResolveError::not_found(result.request.artifact.clone()));
                }
                let trace = child_trace(&result.request);
                emitter.resolved(&result.request.artifact, None, &result.errors, &trace);
            }

            context.close();
            drop(context);

            if failures {
                return Err(ResolutionFailure::new(results).into());
            }
            return Ok(results);
        }
    }

    /// Runs the per-request pipeline over the whole batch, accumulating
    /// pending downloads in the scheduler.
    async fn plan(
        &self,
        session: &Session,
        requests: &[ArtifactRequest],
        mode: AccessMode,
        gate: &FilterGate,
        interop: bool,
        emitter: &EventEmitter<'_>,
    ) -> PlanningPass {
        let mut results = Vec::with_capacity(requests.len());
        let mut scheduler = GroupScheduler::new();
        let mut deferred = Vec::new();

        for request in requests {
            let trace = child_trace(request);
            let mut result = ArtifactResult::new(request.clone());
            let mut artifact = request.artifact.clone();

            // Pre-hosted short-circuit: the caller supplies the file and
            // no collaborator is consulted.
            let local_path = artifact.property(properties::LOCAL_PATH).map(PathBuf::from);
            if let Some(local_path) = local_path {
                if is_regular_file(&local_path).await {
                    artifact = artifact.with_file(local_path);
                    result.artifact = Some(artifact.clone());
                    deferred.push(emitter.resolved_event(&artifact, None, &result.errors, &trace));
                } else {
                    result.add_error(ResolveError::not_found(artifact.clone()));
                }
                results.push(result);
                continue;
            }

            if mode == AccessMode::Shared {
                emitter.resolving(&artifact, &trace);
            }

            let mut candidates = gate.apply(&artifact, &request.repositories, &mut result);

            let version_request = VersionRequest::new(
                artifact.clone(),
                candidates.clone(),
                request.request_context.clone(),
            )
            .with_trace(Arc::clone(&trace));
            let version = match self
                .version_resolver
                .resolve_version(session, version_request)
                .await
            {
                Ok(version) => version,
                Err(error) => {
                    result.add_error(error);
                    results.push(result);
                    continue;
                }
            };
            artifact = artifact.with_version(version.version.clone());

            if let Some(repository) = &version.repository {
                // A remote pin narrows the candidates to that single
                // repository; any other pin forces local-only resolution.
                candidates = match repository.as_remote() {
                    Some(remote) => vec![remote.clone()],
                    None => Vec::new(),
                };
            }

            if let Some(workspace) = &self.workspace {
                if let Some(file) = workspace.find_artifact(&artifact) {
                    artifact = artifact.with_file(file);
                    result.artifact = Some(artifact.clone());
                    result.repository =
                        Some(ArtifactRepository::Workspace(workspace.repository()));
                    deferred.push(emitter.resolved_event(
                        &artifact,
                        result.repository.as_ref(),
                        &result.errors,
                        &trace,
                    ));
                    results.push(result);
                    continue;
                }
            }

            let local = self
                .lrm
                .find(
                    session,
                    LocalArtifactRequest::new(
                        artifact.clone(),
                        candidates.clone(),
                        request.request_context.clone(),
                    ),
                )
                .await;
            result.local = Some(local.clone());

            let found = lookup::is_locally_installed(gate.is_active(), &local, &version, &candidates);
            if found {
                if let Some(file) = local.file.clone() {
                    result.repository = Some(match &local.repository {
                        Some(remote) => ArtifactRepository::Remote(remote.clone()),
                        None => ArtifactRepository::Local(self.lrm.repository().clone()),
                    });
                    match snapshot::normalized_file(session, &artifact, &file).await {
                        Ok(exposed) => {
                            artifact = artifact.with_file(exposed);
                            result.artifact = Some(artifact.clone());
                            deferred.push(emitter.resolved_event(
                                &artifact,
                                result.repository.as_ref(),
                                &result.errors,
                                &trace,
                            ));
                            if interop && !local.available {
                                // A simple layout installed the file without
                                // updating the tracking metadata; sync it.
                                self.lrm
                                    .add(
                                        session,
                                        LocalArtifactRegistration::installed(artifact.clone()),
                                    )
                                    .await;
                            }
                        }
                        Err(error) => result.add_error(error),
                    }
                    results.push(result);
                    continue;
                }
            }

            if local.file.is_some() {
                tracing::info!(
                    artifact = %artifact,
                    "artifact is cached locally but from a repository unavailable in the current context, verifying it is downloadable"
                );
            }
            tracing::debug!(
                artifact = %artifact,
                candidates = candidates.len(),
                "resolving artifact from remote repositories"
            );

            let offline_gate = OfflineGate::new(self.offline_controller.as_ref());
            let resolved_flag = Arc::new(AtomicBool::new(false));
            scheduler.start_request();
            for repository in &candidates {
                if !repository.policy(artifact.is_snapshot()).enabled {
                    continue;
                }
                if let Err(error) = offline_gate.check(session, &artifact, repository) {
                    result.add_error(error);
                    continue;
                }
                scheduler.place(
                    repository,
                    ResolutionItem {
                        trace: Arc::clone(&trace),
                        artifact: artifact.clone(),
                        resolved: Arc::clone(&resolved_flag),
                        result_index: results.len(),
                        local: local.clone(),
                        repository: repository.clone(),
                        request_context: request.request_context.clone(),
                        update_check: None,
                    },
                );
            }
            results.push(result);
        }

        PlanningPass {
            results,
            scheduler,
            deferred,
        }
    }
}

fn child_trace(request: &ArtifactRequest) -> Arc<RequestTrace> {
    let label = format!("resolve {}", request.artifact);
    match &request.trace {
        Some(parent) => parent.child(label),
        None => RequestTrace::root(label),
    }
}

async fn is_regular_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .is_ok_and(|meta| meta.is_file())
}
