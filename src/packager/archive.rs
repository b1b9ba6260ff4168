//! Archive-based packager: zips unsent sessions in a private staging
//! directory and delivers the archive over the requested channel.
use std::{
    panic,
    path::{Component, Path, PathBuf},
};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use tempfile::TempDir;
use tokio::task;
use tracing::{debug, info};
use uuid::Uuid;

use super::{sessions::SessionStore, transport, PackageReceipt, Packager, PackagerFactory};
use crate::{
    cli::EffectiveConfig,
    launcher::{
        channel::{TransmissionChannel, TransmissionRequest},
        config::{EmailSection, HubSection, PackagerConfig},
    },
    lib::{
        errors::PackagerError,
        fs::{self as package_fs, ArchiveEntry},
    },
};

/// Directory under the platform data dir used when no sessions root is configured.
const DEFAULT_SESSIONS_DIR: &str = "diag-packager";
const DESCRIPTOR_NAME: &str = "package.json";

/// Delivery settings taken from configuration (or defaults without one).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliverySettings {
    pub sessions_root: Option<PathBuf>,
    pub hub: HubSection,
    pub email: EmailSection,
}

impl DeliverySettings {
    pub fn from_config(config: Option<&PackagerConfig>) -> Self {
        match config {
            Some(config) => Self {
                sessions_root: config.sessions.root.clone(),
                hub: config.hub.clone(),
                email: config.email.clone(),
            },
            None => Self::default(),
        }
    }

    fn sessions_root(&self) -> Option<PathBuf> {
        self.sessions_root
            .clone()
            .or_else(|| dirs::data_local_dir().map(|dir| dir.join(DEFAULT_SESSIONS_DIR)))
    }
}

/// Opens an [`ArchivePackager`] per run.
#[derive(Debug, Clone, Default)]
pub struct ArchivePackagerFactory {
    settings: DeliverySettings,
}

impl ArchivePackagerFactory {
    pub fn new(settings: DeliverySettings) -> Self {
        Self { settings }
    }
}

impl PackagerFactory for ArchivePackagerFactory {
    fn open(&self, config: &EffectiveConfig) -> Result<Box<dyn Packager>, PackagerError> {
        Ok(Box::new(ArchivePackager::open(config, self.settings.clone())?))
    }
}

/// Holds the staging directory for the lifetime of one transmission.
#[derive(Debug)]
pub struct ArchivePackager {
    product_name: String,
    application_name: Option<String>,
    store: SessionStore,
    staging: TempDir,
    settings: DeliverySettings,
}

impl ArchivePackager {
    /// Acquire staging space for `config`'s product.
    pub fn open(config: &EffectiveConfig, settings: DeliverySettings) -> Result<Self, PackagerError> {
        let product_name = config.product_name().unwrap_or_default().to_string();
        let application_name = config.application_name().map(str::to_string);
        let session_dir = match config.output_folder() {
            Some(folder) => folder.to_path_buf(),
            None => {
                let root = settings.sessions_root().ok_or(PackagerError::NoSessionRoot {
                    product: product_name.clone(),
                })?;
                let mut dir = root.join(single_component("product name", &product_name)?);
                if let Some(application) = &application_name {
                    dir.push(single_component("application name", application)?);
                }
                dir
            }
        };

        let staging = tempfile::Builder::new()
            .prefix("diag-packager-")
            .tempdir()
            .map_err(|source| PackagerError::Staging { source })?;

        debug!(
            target: "diag_packager::packager",
            product = %product_name,
            session_dir = %session_dir.display(),
            staging = %staging.path().display(),
            "Acquired packaging resources"
        );

        Ok(Self {
            product_name,
            application_name,
            store: SessionStore::new(session_dir),
            staging,
            settings,
        })
    }

    pub fn staging_dir(&self) -> &Path {
        self.staging.path()
    }

    fn summary(&self, session_count: usize) -> String {
        match &self.application_name {
            Some(application) => format!(
                "Diagnostic package for {} ({}) with {} session(s).",
                self.product_name, application, session_count
            ),
            None => format!(
                "Diagnostic package for {} with {} session(s).",
                self.product_name, session_count
            ),
        }
    }
}

#[async_trait]
impl Packager for ArchivePackager {
    async fn transmit(
        &mut self,
        request: &TransmissionRequest,
    ) -> Result<PackageReceipt, PackagerError> {
        let package_id = Uuid::new_v4();
        let job = ArchiveJob {
            store: self.store.clone(),
            staging: self.staging.path().to_path_buf(),
            product_name: self.product_name.clone(),
            application_name: self.application_name.clone(),
            package_id,
        };
        let BuiltArchive {
            sessions,
            path: archive,
            sha256: archive_sha256,
        } = run_blocking(move || job.run()).await?;

        let (destination, purge) = match &request.channel {
            TransmissionChannel::File(file) => {
                let (source, target) = (archive.clone(), file.path.clone());
                run_blocking(move || package_fs::copy_into_place(&source, &target)).await?;
                (file.path.display().to_string(), false)
            }
            TransmissionChannel::Email(email) => {
                let summary = self.summary(sessions.len());
                let to =
                    transport::email_archive(email, &self.settings.email, &archive, &summary)
                        .await?;
                (to, false)
            }
            TransmissionChannel::Server(server) => {
                let url =
                    transport::upload_archive(&server.target, &self.settings.hub, &archive).await?;
                (url, server.purge_sent_sessions)
            }
        };

        let store = self.store.clone();
        let delivered = sessions.clone();
        let mark_as_sent = request.mark_as_sent;
        run_blocking(move || {
            if purge {
                store.purge(&delivered)
            } else if mark_as_sent {
                store.mark_sent(&delivered)
            } else {
                Ok(())
            }
        })
        .await?;

        info!(
            target: "diag_packager::packager",
            %package_id,
            mode = request.channel.mode().as_str(),
            destination = %destination,
            sessions = sessions.len(),
            sha256 = %archive_sha256,
            "Package delivered"
        );

        Ok(PackageReceipt {
            package_id,
            session_count: sessions.len(),
            archive_sha256,
            destination,
        })
    }
}

/// Filesystem half of a transmission, detached from the packager so it can
/// run on the blocking pool.
struct ArchiveJob {
    store: SessionStore,
    staging: PathBuf,
    product_name: String,
    application_name: Option<String>,
    package_id: Uuid,
}

struct BuiltArchive {
    sessions: Vec<PathBuf>,
    path: PathBuf,
    sha256: String,
}

impl ArchiveJob {
    fn run(self) -> Result<BuiltArchive, PackagerError> {
        let sessions = self.store.new_sessions()?;
        let path = self.write_archive(&sessions)?;
        let sha256 = package_fs::compute_sha256(&path)?;
        Ok(BuiltArchive {
            sessions,
            path,
            sha256,
        })
    }

    fn write_archive(&self, sessions: &[PathBuf]) -> Result<PathBuf, PackagerError> {
        let created_at = Utc::now();
        let names: Vec<String> = sessions
            .iter()
            .filter_map(|path| path.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .collect();
        let descriptor = json!({
            "package_id": self.package_id.to_string(),
            "product_name": self.product_name,
            "application_name": self.application_name,
            "created_at": created_at.to_rfc3339(),
            "sessions": names,
        });
        let descriptor = serde_json::to_vec_pretty(&descriptor).map_err(|source| {
            PackagerError::Manifest {
                path: PathBuf::from(DESCRIPTOR_NAME),
                source,
            }
        })?;

        let archive = self.staging.join(format!(
            "{}-{}.zip",
            sanitize(&self.product_name),
            created_at.format("%Y%m%dT%H%M%S")
        ));
        package_fs::zip_files(
            sessions,
            &[ArchiveEntry {
                name: DESCRIPTOR_NAME,
                content: &descriptor,
            }],
            &archive,
        )?;
        Ok(archive)
    }
}

/// Run filesystem work off the async workers. Panics keep unwinding so the
/// caller sees them as panics.
async fn run_blocking<T, F>(job: F) -> Result<T, PackagerError>
where
    F: FnOnce() -> Result<T, PackagerError> + Send + 'static,
    T: Send + 'static,
{
    match task::spawn_blocking(job).await {
        Ok(result) => result,
        Err(err) if err.is_panic() => panic::resume_unwind(err.into_panic()),
        Err(err) => Err(PackagerError::Task {
            message: err.to_string(),
        }),
    }
}

impl Drop for ArchivePackager {
    fn drop(&mut self) {
        debug!(
            target: "diag_packager::packager",
            staging = %self.staging.path().display(),
            "Released packaging resources"
        );
    }
}

/// Identity values become one directory level under the sessions root.
fn single_component<'a>(field: &'static str, value: &'a str) -> Result<&'a str, PackagerError> {
    let mut components = Path::new(value).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(value),
        _ => Err(PackagerError::InvalidIdentity {
            field,
            value: value.to_string(),
        }),
    }
}

fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    if cleaned.is_empty() {
        "package".to_string()
    } else {
        cleaned
    }
}
