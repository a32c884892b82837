/*!
The rotating log: the public entry point that ties compression, addressing,
archive segments and retention together.

All operations on one instance are serialized by a single mutex held for the
whole call. The append path measures the archive length and then overwrites
its end marker, which is only safe if nothing else can touch the file in
between. Separate processes sharing a directory are not coordinated.
*/

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::clock::{archive_file_name, Clock, SystemClock};
use crate::compression::{CompressionAdapter, GzipCompressor};
use crate::config::RotatingLogConfig;
#[cfg(feature = "metrics")]
use crate::observability::LogMetrics;
use crate::retention::{self, RetentionCadence, RetentionLimit};
use crate::segment::{self, EntryInfo};
use crate::{Address, Result, RotalogError};

/// Mutable state guarded by the log's lock
#[derive(Debug, Default)]
struct LogState {
    /// Archive the last successful rotation switched to
    last_archive: Option<PathBuf>,
}

/// Append-only log of compressed records in daily tar archives
///
/// # Example
/// ```rust,no_run
/// use rotalog_core::RotatingLog;
///
/// let log = RotatingLog::new("/var/lib/myapp/events", 14)?;
///
/// let address = log.write(b"user 42 logged in")?;
/// assert_eq!(log.read(&address)?, b"user 42 logged in");
/// # Ok::<(), rotalog_core::RotalogError>(())
/// ```
pub struct RotatingLog<C = GzipCompressor, K = SystemClock>
where
    C: CompressionAdapter,
    K: Clock,
{
    config: RotatingLogConfig,
    compressor: C,
    clock: K,
    state: Mutex<LogState>,
    #[cfg(feature = "metrics")]
    metrics: LogMetrics,
}

impl RotatingLog {
    /// Create a log in `directory` keeping at most `max_log_files` archives
    ///
    /// A negative `max_log_files` keeps every archive. The directory is created
    /// lazily on the first write.
    pub fn new<P: Into<PathBuf>>(directory: P, max_log_files: i64) -> Result<Self> {
        Self::from_config(RotatingLogConfig::new(directory).with_max_log_files(max_log_files))
    }

    /// Create a gzip-compressing, wall-clock log from a configuration
    pub fn from_config(config: RotatingLogConfig) -> Result<Self> {
        let compressor = GzipCompressor::with_level(config.compression_level);
        Self::with_components(config, compressor, SystemClock)
    }
}

impl<C, K> RotatingLog<C, K>
where
    C: CompressionAdapter,
    K: Clock,
{
    /// Create a log with explicit compression and clock adapters
    ///
    /// # Errors
    /// * `RotalogError::Validation` - If the configuration is invalid
    pub fn with_components(config: RotatingLogConfig, compressor: C, clock: K) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            config,
            compressor,
            clock,
            state: Mutex::new(LogState::default()),
            #[cfg(feature = "metrics")]
            metrics: LogMetrics::new()?,
        })
    }

    pub fn directory(&self) -> &Path {
        &self.config.directory
    }

    pub fn retention_limit(&self) -> RetentionLimit {
        self.config.retention_limit()
    }

    pub fn config(&self) -> &RotatingLogConfig {
        &self.config
    }

    #[cfg(feature = "metrics")]
    pub fn metrics(&self) -> &LogMetrics {
        &self.metrics
    }

    /// The archive the most recent write rotated to, if any
    pub fn current_archive(&self) -> Option<PathBuf> {
        self.lock().last_archive.clone()
    }

    // The state is only a cache of the current archive name, so a panic in
    // another caller cannot leave it inconsistent.
    fn lock(&self) -> MutexGuard<'_, LogState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Compress `payload`, append it to today's archive and return its address
    ///
    /// # Errors
    /// * `RotalogError::Compression` - If compression fails
    /// * `RotalogError::Corrupt` - If today's archive is truncated and cannot be appended to
    /// * `RotalogError::Io` - On any filesystem failure
    pub fn write(&self, payload: &[u8]) -> Result<String> {
        let mut state = self.lock();
        let result = self.write_locked(&mut state, payload);

        #[cfg(feature = "metrics")]
        match &result {
            Ok(_) => self.metrics.record_write(payload.len()),
            Err(_) => self.metrics.record_error(),
        }

        result
    }

    fn write_locked(&self, state: &mut LogState, payload: &[u8]) -> Result<String> {
        let compressed = self.compressor.compress(payload)?;

        let now = self.clock.now();
        let path = self
            .config
            .directory
            .join(archive_file_name(now.date_naive()));

        if state.last_archive.as_deref() != Some(path.as_path()) {
            fs::create_dir_all(&self.config.directory)?;

            if self.config.retention_cadence == RetentionCadence::OnRotation
                && !path.try_exists()?
            {
                self.make_room_locked(state)?;
            }

            info!(archive = %path.display(), "Rotating to archive");
            state.last_archive = Some(path.clone());
        }

        let address = segment::append_entry(&path, &compressed, now)?;
        debug!(
            %address,
            payload_size = payload.len(),
            compressed_size = compressed.len(),
            "Appended record"
        );
        Ok(address.to_string())
    }

    /// Fetch and decompress the record stored under `address`
    ///
    /// # Errors
    /// * `RotalogError::MalformedAddress` - If the address cannot be decoded (no I/O is done)
    /// * `RotalogError::ArchiveNotFound` - If the archive was never written or has been pruned
    /// * `RotalogError::EntryNotFound` - If no entry with that address exists in the archive
    /// * `RotalogError::Corrupt` / `Compression` / `Io` - On damaged data or I/O failure
    pub fn read(&self, address: &str) -> Result<Vec<u8>> {
        let _state = self.lock();
        let result = self.read_locked(address);

        #[cfg(feature = "metrics")]
        match &result {
            Ok(_) => self.metrics.record_read(),
            Err(_) => self.metrics.record_error(),
        }

        result
    }

    fn read_locked(&self, address: &str) -> Result<Vec<u8>> {
        let parsed = Address::parse(address)?;

        let payload = segment::read_entry(&self.config.directory, &parsed)
            .and_then(|compressed| self.compressor.decompress(&compressed))
            .inspect_err(|e| {
                if e.is_corruption_or_io() {
                    warn!(%address, error = %e, "Failed to read record");
                }
            })?;

        debug!(%address, payload_size = payload.len(), "Read record");
        Ok(payload)
    }

    /// Delete the oldest archives so that at most the retention limit remain
    ///
    /// Returns the deleted archive paths. A no-op for unlimited retention.
    pub fn enforce_retention(&self) -> Result<Vec<PathBuf>> {
        let mut state = self.lock();
        match self.retention_limit() {
            RetentionLimit::Unlimited => Ok(Vec::new()),
            RetentionLimit::MaxFiles(max) => self.prune_locked(&mut state, max),
        }
    }

    /// Delete the oldest archives so that one more can be created without
    /// exceeding the retention limit
    ///
    /// This is what a write runs before creating a new day's archive under
    /// [`RetentionCadence::OnRotation`].
    pub fn make_room_for_new_archive(&self) -> Result<Vec<PathBuf>> {
        let mut state = self.lock();
        self.make_room_locked(&mut state)
    }

    fn make_room_locked(&self, state: &mut LogState) -> Result<Vec<PathBuf>> {
        match self.retention_limit() {
            RetentionLimit::Unlimited => Ok(Vec::new()),
            RetentionLimit::MaxFiles(max) => self.prune_locked(state, max.saturating_sub(1)),
        }
    }

    fn prune_locked(&self, state: &mut LogState, keep: usize) -> Result<Vec<PathBuf>> {
        let result = retention::prune_oldest(&self.config.directory, keep);

        #[cfg(feature = "metrics")]
        match &result {
            Ok(removed) => self.metrics.record_pruned(removed.len()),
            Err(_) => self.metrics.record_error(),
        }

        let removed = result?;
        if let Some(current) = &state.last_archive {
            if removed.contains(current) {
                // Force the next write to re-check the directory
                state.last_archive = None;
            }
        }
        Ok(removed)
    }

    /// Archive files currently in the log directory, oldest first
    pub fn archives(&self) -> Result<Vec<PathBuf>> {
        let _state = self.lock();
        retention::list_archives(&self.config.directory)
    }

    /// Describe every entry of the archive named `archive`
    pub fn entries(&self, archive: &str) -> Result<Vec<EntryInfo>> {
        let _state = self.lock();
        if !segment::is_plain_file_name(archive) {
            return Err(RotalogError::ArchiveNotFound(archive.to_string()));
        }
        segment::list_entries(&self.config.directory.join(archive))
    }
}
