//! Service-provider interfaces for the resolver's external collaborators.
//!
//! The resolver orchestrates; everything that actually knows how to map
//! versions, lay out the cache, read the workspace, move bytes, or decide
//! policy sits behind one of these traits:
//!
//! - [`version::VersionResolver`]: coordinate + range → concrete version
//! - [`local::LocalRepositoryManager`]: cache paths and tracking metadata
//! - [`workspace::WorkspaceReader`]: in-process sibling-module artifacts
//! - [`connector::RepositoryConnectorProvider`]: wire-level downloaders
//! - [`update::UpdateCheckManager`]: timestamp-based re-fetch policy
//! - [`offline::OfflineController`]: remote-access gating
//! - [`filter::RemoteRepositoryFilterManager`]: repository admissibility
//! - [`remote::RemoteRepositoryManager`]: effective repository policies
//! - [`post_process::ResolverPostProcessor`]: result post-processing
//!
//! ## Design Principles
//!
//! - **Blocking work is async**: traits whose operations touch disk or
//!   network are `#[async_trait]`; pure decisions stay synchronous
//! - **Defaults where sensible**: each policy-flavored trait ships a
//!   default implementation so embedders only wire what they customize

pub mod connector;
pub mod filter;
pub mod local;
pub mod offline;
pub mod post_process;
pub mod remote;
pub mod update;
pub mod version;
pub mod workspace;

pub use connector::{
    ArtifactDownload, NoConnector, RepositoryConnector, RepositoryConnectorProvider,
};
pub use filter::{FilterDecision, RemoteRepositoryFilter, RemoteRepositoryFilterManager};
pub use local::{LocalArtifactRegistration, LocalArtifactRequest, LocalRepositoryManager};
pub use offline::{OfflineController, OfflineDecision, SessionOfflineController};
pub use post_process::{PostProcessError, ResolverPostProcessor};
pub use remote::{DefaultRemoteRepositoryManager, RemoteRepositoryManager};
pub use update::{NoopUpdateCheckManager, UpdateCheck, UpdateCheckManager};
pub use version::{VersionRequest, VersionResolver, VersionResult};
pub use workspace::WorkspaceReader;
