use std::path::PathBuf;
use std::sync::Arc;

use innkeep::{Aggregator, Pool};
use innkeep_config::Config;

/// Where uploaded images go and how big they may be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Uploads {
    pub dir: PathBuf,
    pub max_file_bytes: usize,
}

impl Uploads {
    /// Most files accepted in one upload request.
    pub const MAX_FILES: usize = 10;

    /// Request body cap for the upload route: every file at its cap plus
    /// room for the text fields and multipart framing.
    pub fn max_request_bytes(&self) -> usize {
        self.max_file_bytes
            .saturating_mul(Self::MAX_FILES)
            .saturating_add(64 * 1024)
    }

    /// Where a stored `image_path` lives on disk.
    pub fn resolve(&self, image_path: &str) -> PathBuf {
        self.dir.join(image_path)
    }
}

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub pool: Pool,
    pub aggregator: Aggregator,
    pub uploads: Arc<Uploads>,
}

impl AppState {
    pub fn new(pool: Pool, uploads: Uploads) -> Self {
        Self {
            aggregator: Aggregator::new(pool.clone()),
            pool,
            uploads: Arc::new(uploads),
        }
    }

    /// Build the pool and upload settings from configuration. No connection
    /// is opened until the first request.
    pub fn from_config(config: &Config) -> innkeep::Result<Self> {
        let pool = Pool::connect(&config.database_url, config.pool_size)?;
        Ok(Self::new(
            pool,
            Uploads {
                dir: config.upload_dir.clone(),
                max_file_bytes: config.max_upload_bytes,
            },
        ))
    }
}
