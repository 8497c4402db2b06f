//! The timed storage lifecycle
//!
//! One run creates (optionally) a bucket, uploads a random payload, checks the
//! service's ETag against the local MD5, downloads the object, checks the
//! download, then deletes the object and (optionally) the bucket. Every step
//! is awaited before the next one starts and the first failure ends the run;
//! nothing is retried or cleaned up afterwards.

use crate::checksum::{file_md5, normalize_etag};
use crate::error::{AppError, Result};
use crate::logging::Logger;
use crate::models::Config;
use crate::output::{ConsoleReporter, Step};
use crate::payload::{create_random_file, remove_file};
use crate::storage::ObjectStore;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Names used by a single run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunIdentifiers {
    pub bucket: String,
    pub object: String,
    pub download: String,
}

impl RunIdentifiers {
    /// Fresh object name; the bucket is the configured one or a fresh UUID
    pub fn generate(configured_bucket: Option<&str>) -> Self {
        let bucket = configured_bucket
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        Self::new(bucket, Uuid::new_v4().to_string())
    }

    pub fn new(bucket: String, object: String) -> Self {
        let download = format!("{}-downloaded", object);
        Self { bucket, object, download }
    }

    /// Local path of the generated payload
    pub fn payload_path(&self, scratch_dir: &Path) -> PathBuf {
        scratch_dir.join(&self.object)
    }

    /// Local path the object is downloaded to
    pub fn download_path(&self, scratch_dir: &Path) -> PathBuf {
        scratch_dir.join(&self.download)
    }
}

/// Outcome of a successful run
#[derive(Debug, Clone)]
pub struct ProbeReport {
    pub ids: RunIdentifiers,
    pub elapsed: Duration,
    pub payload_bytes: u64,
}

impl ProbeReport {
    pub fn seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }
}

/// Drives one lifecycle run against an object store
pub struct Probe<'a> {
    store: &'a dyn ObjectStore,
    config: &'a Config,
    reporter: &'a mut ConsoleReporter,
    logger: Logger,
}

impl<'a> Probe<'a> {
    pub fn new(store: &'a dyn ObjectStore, config: &'a Config, reporter: &'a mut ConsoleReporter) -> Self {
        Self {
            store,
            config,
            reporter,
            logger: Logger::new("probe"),
        }
    }

    /// Run every step in order, returning the elapsed time on success
    pub async fn run(&mut self, ids: RunIdentifiers) -> Result<ProbeReport> {
        let bucket = ids.bucket.as_str();
        let key = ids.object.as_str();
        let payload_path = ids.payload_path(&self.config.scratch_dir);
        let download_path = ids.download_path(&self.config.scratch_dir);

        self.logger.info("Starting storage lifecycle")
            .field("bucket", bucket)
            .field("object", key)
            .field("object_size_mb", self.config.object_size_mb)
            .log();

        let start = Instant::now();

        if self.config.create_bucket {
            let step = Instant::now();
            self.store
                .create_bucket(bucket)
                .await
                .map_err(|e| AppError::from_storage("create_bucket", e))?;
            self.step_done("create_bucket", step);
            self.reporter.step_ok(Step::CreateBucket)?;
        }

        let step = Instant::now();
        let payload_bytes = create_random_file(&payload_path, self.config.object_size_mb)?;
        let local_md5 = file_md5(&payload_path)?;
        self.step_done("create_random_file", step);

        let step = Instant::now();
        self.store
            .put_object(bucket, key, &payload_path)
            .await
            .map_err(|e| AppError::from_storage("upload_object", e))?;
        self.step_done("upload_object", step);

        let step = Instant::now();
        let etag = self.store
            .head_object_etag(bucket, key)
            .await
            .map_err(|e| AppError::from_storage("get_object_etag", e))?;
        self.step_done("get_object_etag", step);

        if local_md5 != normalize_etag(&etag) {
            return Err(AppError::integrity(format!("Upload Object Failed: {} {}", local_md5, etag)));
        }
        self.reporter.step_ok(Step::UploadObject)?;

        remove_file(&payload_path)?;

        let step = Instant::now();
        self.store
            .get_object_to_file(bucket, key, &download_path)
            .await
            .map_err(|e| AppError::from_storage("download_object", e))?;
        let download_md5 = file_md5(&download_path)?;
        self.step_done("download_object", step);

        if local_md5 != download_md5 {
            return Err(AppError::integrity(format!("Download Object Failed: {} {}", local_md5, download_md5)));
        }
        self.reporter.step_ok(Step::DownloadObject)?;

        remove_file(&download_path)?;

        let step = Instant::now();
        self.store
            .delete_object(bucket, key)
            .await
            .map_err(|e| AppError::from_storage("delete_object", e))?;
        self.step_done("delete_object", step);
        self.reporter.step_ok(Step::DeleteObject)?;

        if self.config.create_bucket {
            let step = Instant::now();
            self.store
                .delete_bucket(bucket)
                .await
                .map_err(|e| AppError::from_storage("delete_bucket", e))?;
            self.step_done("delete_bucket", step);
            self.reporter.step_ok(Step::DeleteBucket)?;
        }

        let elapsed = start.elapsed();
        self.logger.info("Storage lifecycle completed")
            .field("bucket", bucket)
            .field("total_seconds", elapsed.as_secs_f64())
            .log();

        Ok(ProbeReport { ids, elapsed, payload_bytes })
    }

    fn step_done(&self, step: &str, started: Instant) {
        self.logger.debug(&format!("{} finished", step))
            .field("step", step)
            .field("duration_ms", started.elapsed().as_secs_f64() * 1000.0)
            .log();
    }
}
