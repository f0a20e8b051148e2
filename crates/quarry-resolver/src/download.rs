//! Download coordination.
//!
//! Executes one resolution group: build a download descriptor per still
//! unresolved item, consult the error cache, run the whole group through a
//! single connector `get`, then fold the outcomes back into the results.
//! Registration with the local repository strictly precedes the
//! update-check touch for the same item.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::Ordering;

use quarry_core::error::ResolveError;
use quarry_core::repository::ArtifactRepository;
use quarry_core::resolution::ArtifactResult;
use quarry_core::session::Session;

use crate::events::EventEmitter;
use crate::group::ResolutionGroup;
use crate::snapshot;
use crate::spi::connector::{ArtifactDownload, RepositoryConnectorProvider};
use crate::spi::local::{LocalArtifactRegistration, LocalRepositoryManager};
use crate::spi::remote::RemoteRepositoryManager;
use crate::spi::update::{UpdateCheck, UpdateCheckManager};

pub(crate) struct DownloadCoordinator<'a> {
    pub session: &'a Session,
    pub lrm: &'a dyn LocalRepositoryManager,
    pub connectors: &'a dyn RepositoryConnectorProvider,
    pub remote_manager: &'a dyn RemoteRepositoryManager,
    pub update_checks: &'a dyn UpdateCheckManager,
    pub events: &'a EventEmitter<'a>,
}

impl DownloadCoordinator<'_> {
    /// Downloads everything the group still needs and folds the outcomes
    /// into `results`.
    pub(crate) async fn perform(&self, group: &mut ResolutionGroup, results: &mut [ArtifactResult]) {
        let (pending, mut downloads) = self.gather(group, results).await;
        if downloads.is_empty() {
            return;
        }

        for (&index, download) in pending.iter().zip(&downloads) {
            self.events.downloading(
                &download.artifact,
                &group.repository,
                &group.items[index].trace,
            );
        }

        match self
            .connectors
            .new_connector(self.session, &group.repository)
            .await
        {
            Ok(connector) => {
                // The connector is scoped to this call and releases its
                // resources when dropped, on every exit path.
                connector.get(&mut downloads).await;
            }
            Err(no_connector) => {
                for download in &mut downloads {
                    download.error = Some(ResolveError::Transfer {
                        artifact: download.artifact.clone(),
                        repository: Some(group.repository.clone()),
                        message: no_connector.to_string(),
                    });
                }
            }
        }

        self.evaluate(group, results, pending, downloads).await;
    }

    async fn gather(
        &self,
        group: &mut ResolutionGroup,
        results: &mut [ArtifactResult],
    ) -> (Vec<usize>, Vec<ArtifactDownload>) {
        let mut pending = Vec::new();
        let mut downloads = Vec::new();
        let mut scheduled = HashSet::new();

        for (index, item) in group.items.iter_mut().enumerate() {
            if item.resolved.load(Ordering::SeqCst) {
                // resolved in a previous resolution group
                continue;
            }
            if !scheduled.insert(item.result_index) {
                // a compatible repository of the same request is already
                // downloading this artifact in this batch
                continue;
            }

            let (file, existence_check) = match &item.local.file {
                Some(file) => (file.clone(), true),
                None => {
                    let relative = self.lrm.path_for_remote_artifact(
                        &item.artifact,
                        &group.repository,
                        &item.request_context,
                    );
                    (self.lrm.repository().base_dir().join(relative), false)
                }
            };

            let is_snapshot = item.artifact.is_snapshot();
            let policy = self.remote_manager.policy(
                self.session,
                &group.repository,
                !is_snapshot,
                is_snapshot,
            );

            if self.session.error_cache_policy().caches_errors() {
                let mut check = UpdateCheck::new(
                    item.artifact.clone(),
                    file.clone(),
                    group.repository.clone(),
                    policy.update_policy,
                );
                self.update_checks
                    .check_artifact(self.session, &mut check)
                    .await;
                let suppressed = !check.required;
                let prior = check.error.clone();
                item.update_check = Some(check);
                if suppressed {
                    if let Some(error) = prior {
                        results[item.result_index].add_error(error);
                    }
                    continue;
                }
            }

            let mut download =
                ArtifactDownload::new(item.artifact.clone(), file, item.request_context.clone());
            download.existence_check = existence_check;
            download.trace = Some(Arc::clone(&item.trace));
            download.checksum_policy = policy.checksum_policy;
            download.repositories = group.repository.mirrored().to_vec();
            download.listener = self.session.transfer_listener().cloned();

            pending.push(index);
            downloads.push(download);
        }

        (pending, downloads)
    }

    async fn evaluate(
        &self,
        group: &mut ResolutionGroup,
        results: &mut [ArtifactResult],
        pending: Vec<usize>,
        downloads: Vec<ArtifactDownload>,
    ) {
        for (index, mut download) in pending.into_iter().zip(downloads) {
            let item = &mut group.items[index];
            let mut artifact = download.artifact.clone();

            match download.error.clone() {
                None => {
                    item.resolved.store(true, Ordering::SeqCst);
                    results[item.result_index].repository =
                        Some(ArtifactRepository::Remote(group.repository.clone()));
                    match snapshot::normalized_file(self.session, &artifact, &download.file).await {
                        Ok(file) => {
                            artifact = artifact.with_file(file);
                            results[item.result_index].artifact = Some(artifact.clone());
                            self.lrm
                                .add(
                                    self.session,
                                    LocalArtifactRegistration::downloaded(
                                        artifact.clone(),
                                        group.repository.clone(),
                                        download.supported_contexts.clone(),
                                    ),
                                )
                                .await;
                        }
                        Err(error) => {
                            download.error = Some(error.clone());
                            results[item.result_index].add_error(error);
                        }
                    }
                }
                Some(error) => results[item.result_index].add_error(error),
            }

            // Touch after the registration with the local repo, so a
            // concurrent resolver consulting the update-check state is not
            // rejected while the registration is still pending.
            if let Some(check) = item.update_check.as_mut() {
                check.error = download.error.clone();
                self.update_checks.touch_artifact(self.session, check).await;
            }

            self.events.downloaded(
                &artifact,
                &group.repository,
                download.error.as_ref(),
                &item.trace,
            );
            if download.error.is_none() {
                let repository = ArtifactRepository::Remote(group.repository.clone());
                self.events.resolved(
                    &artifact,
                    Some(&repository),
                    &results[item.result_index].errors,
                    &item.trace,
                );
            }
        }
    }
}
