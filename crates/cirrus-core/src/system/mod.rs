//! Local implementations of the collaborator traits.

mod builder;
mod host;
mod provider;
mod store;
mod transport;

pub use builder::TarballBuilder;
pub use host::SystemHost;
pub use provider::ManifestProvider;
pub use store::{ArchiveToolsStorage, FileCatalogStore};
pub use transport::LocalTransport;
