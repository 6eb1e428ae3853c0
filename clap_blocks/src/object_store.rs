//! Object store selection.

use object_store::{memory::InMemory, local::LocalFileSystem, DynObjectStore};
use observability_deps::tracing::info;
use snafu::{OptionExt, ResultExt, Snafu};
use std::{path::PathBuf, sync::Arc};

/// Errors building the configured object store.
#[derive(Debug, Snafu)]
#[allow(missing_docs)]
pub enum ParseError {
    #[snafu(display("--data-dir must be set when using the file object store"))]
    MissingDataDir,

    #[snafu(display("--bucket must be set when using the google object store"))]
    MissingBucket,

    #[snafu(display(
        "--google-service-account must be set when using the google object store"
    ))]
    MissingServiceAccount,

    #[snafu(display("cannot create file object store: {}", source))]
    CreateLocalFileSystem { source: object_store::Error },

    #[cfg(feature = "gcp")]
    #[snafu(display("cannot create google object store: {}", source))]
    CreateGcs { source: object_store::Error },

    #[cfg(not(feature = "gcp"))]
    #[snafu(display("google object store support is not compiled into this binary"))]
    GcsNotCompiled,
}

/// Which object store implementation to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ObjectStoreType {
    /// In-memory store; contents are lost on restart.
    Memory,
    /// Local filesystem under `--data-dir`.
    File,
    /// Google Cloud Storage bucket.
    Google,
}

/// CLI config for the object store every stage reads and writes.
#[derive(Debug, Clone, clap::Parser)]
pub struct ObjectStoreConfig {
    /// Which object store implementation to use.
    #[clap(
        long = "--object-store",
        env = "OBJECT_STORE",
        value_enum,
        default_value = "memory",
        action
    )]
    pub object_store: ObjectStoreType,

    /// Bucket name, for stores that use one.
    #[clap(long = "--bucket", env = "BUCKET_NAME", action)]
    pub bucket: Option<String>,

    /// Path to the service account JSON credentials for GCS.
    #[clap(
        long = "--google-service-account",
        env = "GOOGLE_SERVICE_ACCOUNT",
        action
    )]
    pub google_service_account: Option<String>,

    /// Root directory for the file object store.
    #[clap(long = "--data-dir", env = "DATA_DIR", action)]
    pub data_dir: Option<PathBuf>,
}

/// Build the configured [`DynObjectStore`].
pub fn make_object_store(config: &ObjectStoreConfig) -> Result<Arc<DynObjectStore>, ParseError> {
    match config.object_store {
        ObjectStoreType::Memory => {
            info!(object_store_type = "memory", "object store");
            Ok(Arc::new(InMemory::new()))
        }
        ObjectStoreType::File => {
            let dir = config.data_dir.as_ref().context(MissingDataDirSnafu)?;
            info!(object_store_type = "file", ?dir, "object store");
            let store = LocalFileSystem::new_with_prefix(dir)
                .context(CreateLocalFileSystemSnafu)?;
            Ok(Arc::new(store))
        }
        ObjectStoreType::Google => make_gcs(config),
    }
}

#[cfg(feature = "gcp")]
fn make_gcs(config: &ObjectStoreConfig) -> Result<Arc<DynObjectStore>, ParseError> {
    let bucket = config.bucket.as_ref().context(MissingBucketSnafu)?;
    let service_account = config
        .google_service_account
        .as_ref()
        .context(MissingServiceAccountSnafu)?;
    info!(object_store_type = "google", bucket = %bucket, "object store");
    let store = object_store::gcp::new_gcs(service_account, bucket).context(CreateGcsSnafu)?;
    Ok(Arc::new(store))
}

#[cfg(not(feature = "gcp"))]
fn make_gcs(_config: &ObjectStoreConfig) -> Result<Arc<DynObjectStore>, ParseError> {
    GcsNotCompiledSnafu.fail()
}
