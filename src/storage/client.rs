//! S3 client built on `rust-s3`

use super::{validate_bucket_name, AddressingStyle, ObjectStore, StorageError, StorageResult};
use crate::error::{AppError, Result};
use crate::logging::HttpLogger;
use crate::models::Config;
use async_trait::async_trait;
use s3::bucket::Bucket;
use s3::creds::Credentials;
use s3::{BucketConfiguration, Region};
use std::path::Path;
use std::time::Instant;
use tokio::io::AsyncWriteExt;
use url::Url;

/// Authenticated handle to one S3-compatible endpoint.
///
/// Holds credentials and region only; a `rust-s3` bucket handle is made per
/// call so the addressing style can follow the bucket name.
pub struct S3Client {
    endpoint: Url,
    region: Region,
    credentials: Credentials,
    addressing_style: AddressingStyle,
    logger: HttpLogger,
}

impl S3Client {
    /// Build a client from the probe configuration. No request is sent.
    pub fn new(config: &Config) -> Result<Self> {
        let endpoint = Url::parse(&config.s3_host)
            .map_err(|e| AppError::config(format!("Invalid s3_host '{}': {}", config.s3_host, e)))?;

        let credentials = Credentials::new(
            Some(&config.access_key_id),
            Some(&config.secret_access_key),
            None,
            None,
            None,
        )
        .map_err(|e| AppError::config(format!("Invalid S3 credentials: {}", e)))?;

        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: endpoint.as_str().trim_end_matches('/').to_string(),
        };

        Ok(Self {
            endpoint,
            region,
            credentials,
            addressing_style: config.addressing_style,
            logger: HttpLogger::new("S3"),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn path_style(&self, bucket: &str) -> bool {
        !self.addressing_style.uses_virtual_host(&self.endpoint, bucket)
    }

    fn bucket(&self, name: &str) -> StorageResult<Box<Bucket>> {
        validate_bucket_name(name)?;
        let bucket = Bucket::new(name, self.region.clone(), self.credentials.clone())?;
        Ok(if self.path_style(name) { bucket.with_path_style() } else { bucket })
    }

    /// Check the status of a finished call and log it
    fn finish(&self, method: &str, target: &str, started: Instant, result: StorageResult<u16>) -> StorageResult<u16> {
        let result = result.and_then(|status| {
            if (200..300).contains(&status) {
                Ok(status)
            } else {
                Err(StorageError::service(status, ""))
            }
        });

        let status = match &result {
            Ok(status) | Err(StorageError::Service { status, .. }) => Some(*status),
            Err(_) => None,
        };
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        self.logger.log_request(method, target, result.is_ok(), status, elapsed_ms);

        result
    }
}

#[async_trait]
impl ObjectStore for S3Client {
    async fn create_bucket(&self, bucket: &str) -> StorageResult<()> {
        validate_bucket_name(bucket)?;
        let region = self.region.clone();
        let credentials = self.credentials.clone();

        let started = Instant::now();
        let response = if self.path_style(bucket) {
            Bucket::create_with_path_style(bucket, region, credentials, BucketConfiguration::default()).await
        } else {
            Bucket::create(bucket, region, credentials, BucketConfiguration::default()).await
        };
        let result = response.map(|r| r.response_code).map_err(StorageError::from);

        self.finish("PUT", bucket, started, result)?;
        Ok(())
    }

    async fn put_object(&self, bucket: &str, key: &str, source: &Path) -> StorageResult<()> {
        let handle = self.bucket(bucket)?;
        let content = tokio::fs::read(source).await?;

        let started = Instant::now();
        let result = handle
            .put_object(key, &content)
            .await
            .map(|r| r.status_code())
            .map_err(StorageError::from);

        self.finish("PUT", &format!("{}/{}", bucket, key), started, result)?;
        Ok(())
    }

    async fn head_object_etag(&self, bucket: &str, key: &str) -> StorageResult<String> {
        let handle = self.bucket(bucket)?;

        let started = Instant::now();
        let (head, status) = match handle.head_object(key).await {
            Ok((head, status)) => (Some(head), Ok(status)),
            Err(e) => (None, Err(StorageError::from(e))),
        };
        self.finish("HEAD", &format!("{}/{}", bucket, key), started, status)?;

        let etag = head
            .and_then(|h| h.e_tag)
            .ok_or(StorageError::MissingHeader("ETag"))?;
        Ok(etag.trim().trim_matches('"').to_string())
    }

    async fn get_object_to_file(&self, bucket: &str, key: &str, target: &Path) -> StorageResult<u64> {
        let handle = self.bucket(bucket)?;
        let mut file = tokio::fs::File::create(target).await?;

        let started = Instant::now();
        let result = handle
            .get_object_to_writer(key, &mut file)
            .await
            .map_err(StorageError::from);
        self.finish("GET", &format!("{}/{}", bucket, key), started, result)?;

        file.flush().await?;
        Ok(file.metadata().await?.len())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> StorageResult<()> {
        let handle = self.bucket(bucket)?;

        let started = Instant::now();
        let result = handle
            .delete_object(key)
            .await
            .map(|r| r.status_code())
            .map_err(StorageError::from);

        self.finish("DELETE", &format!("{}/{}", bucket, key), started, result)?;
        Ok(())
    }

    async fn delete_bucket(&self, bucket: &str) -> StorageResult<()> {
        let handle = self.bucket(bucket)?;

        let started = Instant::now();
        let result = handle.delete().await.map_err(StorageError::from);

        self.finish("DELETE", bucket, started, result)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::matchers::{body_bytes, header_exists, method, path, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> S3Client {
        let config = Config {
            s3_host: server.uri(),
            access_key_id: "AKIDEXAMPLE".to_string(),
            secret_access_key: "secret".to_string(),
            ..Config::default()
        };
        S3Client::new(&config).unwrap()
    }

    #[test]
    fn test_invalid_endpoint_rejected() {
        let config = Config {
            s3_host: "not a url".to_string(),
            ..Config::default()
        };
        assert!(S3Client::new(&config).is_err());
    }

    #[test]
    fn test_addressing_follows_style_and_host() {
        let mut config = Config {
            s3_host: "https://s3.example.com".to_string(),
            ..Config::default()
        };
        assert!(!S3Client::new(&config).unwrap().path_style("probe-bucket"));
        assert!(S3Client::new(&config).unwrap().path_style("Probe_Bucket"));

        config.addressing_style = AddressingStyle::Path;
        assert!(S3Client::new(&config).unwrap().path_style("probe-bucket"));

        config.s3_host = "http://127.0.0.1:9000".to_string();
        config.addressing_style = AddressingStyle::Auto;
        assert!(S3Client::new(&config).unwrap().path_style("probe-bucket"));
    }

    #[tokio::test]
    async fn test_create_bucket_is_signed() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path_regex(r"^/probe-bucket/?$"))
            .and(header_exists("authorization"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server).create_bucket("probe-bucket").await.unwrap();
    }

    #[tokio::test]
    async fn test_create_bucket_conflict() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(409).set_body_string(
                "<Error><Code>BucketAlreadyOwnedByYou</Code><Message>Your previous request to create the named bucket succeeded</Message></Error>",
            ))
            .mount(&server)
            .await;

        let err = client_for(&server).create_bucket("probe-bucket").await.unwrap_err();
        assert!(matches!(err, StorageError::Service { status: 409, .. }));
        assert!(err.to_string().contains("BucketAlreadyOwnedByYou"));
    }

    #[tokio::test]
    async fn test_put_object_sends_file_contents() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/probe-bucket/object-key"))
            .and(body_bytes(b"payload bytes".to_vec()))
            .respond_with(ResponseTemplate::new(200).insert_header("ETag", "\"etag\""))
            .expect(1)
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let source = dir.path().join("fake");
        std::fs::write(&source, b"payload bytes").unwrap();

        client_for(&server).put_object("probe-bucket", "object-key", &source).await.unwrap();
    }

    #[tokio::test]
    async fn test_put_object_missing_source() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();

        let err = client_for(&server)
            .put_object("probe-bucket", "object-key", &dir.path().join("absent"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Io(_)));
    }

    #[tokio::test]
    async fn test_head_object_etag_strips_quotes() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/probe-bucket/object-key"))
            .respond_with(
                ResponseTemplate::new(200).insert_header("ETag", "\"ddb4502f21d869c1059d4adba77bee6d\""),
            )
            .mount(&server)
            .await;

        let etag = client_for(&server).head_object_etag("probe-bucket", "object-key").await.unwrap();
        assert_eq!(etag, "ddb4502f21d869c1059d4adba77bee6d");
    }

    #[tokio::test]
    async fn test_head_object_without_etag() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let err = client_for(&server).head_object_etag("probe-bucket", "object-key").await.unwrap_err();
        assert!(matches!(err, StorageError::MissingHeader("ETag")));
    }

    #[tokio::test]
    async fn test_head_missing_object() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = client_for(&server).head_object_etag("probe-bucket", "object-key").await.unwrap_err();
        assert!(matches!(err, StorageError::Service { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_get_object_to_file() {
        let server = MockServer::start().await;
        let content = vec![42u8; 70_000];
        Mock::given(method("GET"))
            .and(path("/probe-bucket/object-key"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(content.clone()))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let target = dir.path().join("fake-downloaded");
        let written = client_for(&server)
            .get_object_to_file("probe-bucket", "object-key", &target)
            .await
            .unwrap();

        assert_eq!(written, 70_000);
        assert_eq!(std::fs::read(&target).unwrap(), content);
    }

    #[tokio::test]
    async fn test_get_missing_object() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("<Error><Code>NoSuchKey</Code></Error>"))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let err = client_for(&server)
            .get_object_to_file("probe-bucket", "object-key", &dir.path().join("out"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Service { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_delete_operations() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/probe-bucket/object-key"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path_regex(r"^/probe-bucket/?$"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        client.delete_object("probe-bucket", "object-key").await.unwrap();
        client.delete_bucket("probe-bucket").await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_non_empty_bucket() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(409).set_body_string(
                "<Error><Code>BucketNotEmpty</Code><Message>The bucket you tried to delete is not empty</Message></Error>",
            ))
            .mount(&server)
            .await;

        let err = client_for(&server).delete_bucket("probe-bucket").await.unwrap_err();
        assert!(err.to_string().contains("BucketNotEmpty"));
    }

    #[tokio::test]
    async fn test_invalid_bucket_name_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = client_for(&server).create_bucket("bad bucket").await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidBucketName(_)));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint() {
        let config = Config {
            s3_host: "http://127.0.0.1:1".to_string(),
            ..Config::default()
        };
        let client = S3Client::new(&config).unwrap();

        let err = client.delete_bucket("probe-bucket").await.unwrap_err();
        assert!(matches!(err, StorageError::Transport(_)));
    }
}
