//! Download grouping.
//!
//! Pending downloads are clustered by compatible remote repository so each
//! cluster costs one connector and one batched `get`. Two repositories are
//! compatible iff they agree on url, content type, and the
//! repository-manager flag; credentials and policies do not split groups
//! because the connector is built from the group's first repository.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use quarry_core::artifact::Artifact;
use quarry_core::repository::RemoteRepository;
use quarry_core::resolution::{LocalArtifactResult, RequestTrace};

use crate::spi::update::UpdateCheck;

/// One artifact × repository pairing awaiting download.
#[derive(Debug)]
pub(crate) struct ResolutionItem {
    pub trace: Arc<RequestTrace>,
    pub artifact: Artifact,
    /// Shared across every item of the same request so the first
    /// successful group short-circuits the remaining ones.
    pub resolved: Arc<AtomicBool>,
    /// Index of the owning result in the call's result list. An index,
    /// not a reference: the result list stays uniquely owned.
    pub result_index: usize,
    pub local: LocalArtifactResult,
    pub repository: RemoteRepository,
    pub request_context: String,
    pub update_check: Option<UpdateCheck>,
}

/// Items sharing one compatible remote repository.
#[derive(Debug)]
pub(crate) struct ResolutionGroup {
    pub repository: RemoteRepository,
    pub items: Vec<ResolutionItem>,
}

impl ResolutionGroup {
    fn new(repository: RemoteRepository) -> Self {
        Self {
            repository,
            items: Vec::new(),
        }
    }

    fn matches(&self, repository: &RemoteRepository) -> bool {
        self.repository.url() == repository.url()
            && self.repository.content_type() == repository.content_type()
            && self.repository.is_repository_manager() == repository.is_repository_manager()
    }
}

/// Places items into groups while preserving each request's repository
/// preference order.
///
/// Placement scans from a cursor that survives across the repositories of
/// one request and is consumed as it goes: a repository joins the first
/// compatible group at or after the cursor, and a miss appends a new group
/// and parks the cursor past it, so the later repositories of that request
/// cannot jump back in front of an earlier one. The cursor rewinds to the
/// start for each new request.
#[derive(Debug, Default)]
pub(crate) struct GroupScheduler {
    groups: Vec<ResolutionGroup>,
    cursor: usize,
}

impl GroupScheduler {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Begins placement for a new request.
    pub(crate) fn start_request(&mut self) {
        self.cursor = 0;
    }

    /// Places an item with the first compatible group at or after the
    /// cursor, creating a new group when none matches.
    pub(crate) fn place(&mut self, repository: &RemoteRepository, item: ResolutionItem) {
        while self.cursor < self.groups.len() {
            let index = self.cursor;
            self.cursor += 1;
            if self.groups[index].matches(repository) {
                self.groups[index].items.push(item);
                return;
            }
        }

        let mut group = ResolutionGroup::new(repository.clone());
        group.items.push(item);
        self.groups.push(group);
        self.cursor = self.groups.len();
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub(crate) fn into_groups(self) -> Vec<ResolutionGroup> {
        self.groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(repository: &RemoteRepository) -> ResolutionItem {
        ResolutionItem {
            trace: RequestTrace::root("test"),
            artifact: Artifact::new("org.example", "widget", "jar", "1.0"),
            resolved: Arc::new(AtomicBool::new(false)),
            result_index: 0,
            local: LocalArtifactResult::not_found(),
            repository: repository.clone(),
            request_context: String::new(),
            update_check: None,
        }
    }

    fn repo(id: &str, url: &str) -> RemoteRepository {
        RemoteRepository::new(id, url)
    }

    #[test]
    fn compatible_repositories_share_a_group() {
        let a = repo("a", "https://repo.example.org");
        let b = repo("b", "https://repo.example.org");

        let mut scheduler = GroupScheduler::new();
        scheduler.start_request();
        scheduler.place(&a, item(&a));
        scheduler.place(&b, item(&b));

        let groups = scheduler.into_groups();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].items.len(), 2);
    }

    #[test]
    fn url_content_type_and_manager_flag_split_groups() {
        let a = repo("a", "https://a.example.org");
        let b = repo("b", "https://b.example.org");
        let c = repo("c", "https://a.example.org").with_repository_manager(true);

        let mut scheduler = GroupScheduler::new();
        scheduler.start_request();
        scheduler.place(&a, item(&a));
        scheduler.place(&b, item(&b));
        scheduler.place(&c, item(&c));

        assert_eq!(scheduler.into_groups().len(), 3);
    }

    #[test]
    fn later_requests_rejoin_earlier_groups() {
        let a = repo("a", "https://a.example.org");
        let b = repo("b", "https://a.example.org");

        let mut scheduler = GroupScheduler::new();
        scheduler.start_request();
        scheduler.place(&a, item(&a));
        scheduler.start_request();
        scheduler.place(&b, item(&b));

        let groups = scheduler.into_groups();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].items.len(), 2);
    }

    #[test]
    fn placements_after_a_miss_never_jump_back() {
        // Within one request, once a repository misses every existing
        // group, subsequent repositories open fresh groups even when an
        // earlier group would match; order of preference wins over reuse.
        let a = repo("a", "https://a.example.org");
        let b = repo("b", "https://b.example.org");
        let a_again = repo("a2", "https://a.example.org");

        let mut scheduler = GroupScheduler::new();
        scheduler.start_request();
        scheduler.place(&a, item(&a));

        scheduler.start_request();
        scheduler.place(&b, item(&b));
        scheduler.place(&a_again, item(&a_again));

        // b scanned past a's group (miss), created its own, so a2 opens a
        // third group instead of rejoining the first.
        assert_eq!(scheduler.into_groups().len(), 3);
    }

    #[test]
    fn cursor_consumes_groups_within_a_request() {
        let a = repo("a", "https://a.example.org");
        let b = repo("b", "https://b.example.org");

        let mut scheduler = GroupScheduler::new();
        scheduler.start_request();
        scheduler.place(&a, item(&a));
        scheduler.start_request();
        scheduler.place(&b, item(&b));

        // b scanned a's group, missed, appended its own.
        let groups = scheduler.into_groups();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].repository.id(), "a");
        assert_eq!(groups[1].repository.id(), "b");
    }
}
