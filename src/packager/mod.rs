//! Packaging collaborator: the seam the launcher dispatches to, plus the
//! archive-based implementation used by the binary.
use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    cli::EffectiveConfig, launcher::channel::TransmissionRequest, lib::errors::PackagerError,
};

pub mod archive;
pub mod sessions;
pub mod transport;

pub use archive::{ArchivePackager, ArchivePackagerFactory, DeliverySettings};
pub use sessions::SessionStore;

/// Summary of one delivered package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageReceipt {
    pub package_id: Uuid,
    pub session_count: usize,
    pub archive_sha256: String,
    pub destination: String,
}

/// An acquired packaging handle. Dropping it releases everything it holds.
#[async_trait]
pub trait Packager: Send {
    /// Package the unsent sessions and deliver them over the requested channel.
    async fn transmit(
        &mut self,
        request: &TransmissionRequest,
    ) -> Result<PackageReceipt, PackagerError>;
}

/// Acquires a [`Packager`] for one product identity.
pub trait PackagerFactory: Send + Sync {
    fn open(&self, config: &EffectiveConfig) -> Result<Box<dyn Packager>, PackagerError>;
}
