//! In-memory S3 service for end-to-end tests

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::{Arc, Mutex};
use wiremock::matchers::any;
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

#[derive(Default)]
struct FakeS3State {
    buckets: BTreeSet<String>,
    objects: BTreeMap<(String, String), Vec<u8>>,
    requests: Vec<String>,
}

/// Path-style S3 stand-in keeping buckets and objects in memory
#[derive(Clone, Default)]
pub struct FakeS3 {
    state: Arc<Mutex<FakeS3State>>,
    tamper_etag: bool,
    corrupt_download: bool,
}

impl FakeS3 {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report an ETag that never matches the uploaded content
    pub fn with_tampered_etag(mut self) -> Self {
        self.tamper_etag = true;
        self
    }

    /// Serve downloads with one extra byte appended
    pub fn with_corrupt_download(mut self) -> Self {
        self.corrupt_download = true;
        self
    }

    /// Pre-create a bucket
    pub fn with_bucket(self, bucket: &str) -> Self {
        self.state.lock().unwrap().buckets.insert(bucket.to_string());
        self
    }

    pub async fn start(&self) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(any()).respond_with(self.clone()).mount(&server).await;
        server
    }

    /// `METHOD /path` of every request received, in order
    pub fn requests(&self) -> Vec<String> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn methods(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| r.split(' ').next().unwrap_or_default().to_string())
            .collect()
    }

    pub fn bucket_count(&self) -> usize {
        self.state.lock().unwrap().buckets.len()
    }

    pub fn object_count(&self) -> usize {
        self.state.lock().unwrap().objects.len()
    }
}

fn error_response(status: u16, code: &str, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_string(format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<Error><Code>{}</Code><Message>{}</Message></Error>",
        code, message
    ))
}

fn etag_for(data: &[u8]) -> String {
    format!("\"{:x}\"", md5::compute(data))
}

impl Respond for FakeS3 {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let mut state = self.state.lock().unwrap();
        let method = request.method.to_string();
        let path = request.url.path().trim_start_matches('/').to_string();
        state.requests.push(format!("{} /{}", method, path));

        // Bucket-level requests may carry a trailing slash
        let (bucket, key) = match path.split_once('/') {
            Some((bucket, key)) if !key.is_empty() => (bucket.to_string(), Some(key.to_string())),
            Some((bucket, _)) => (bucket.to_string(), None),
            None => (path.clone(), None),
        };

        if request.headers.get("authorization").is_none() {
            return error_response(403, "AccessDenied", "Missing Authorization header");
        }

        match (method.as_str(), key) {
            ("PUT", None) => {
                if !state.buckets.insert(bucket) {
                    return error_response(409, "BucketAlreadyOwnedByYou", "Bucket exists");
                }
                ResponseTemplate::new(200)
            }
            ("DELETE", None) => {
                if state.objects.keys().any(|(b, _)| *b == bucket) {
                    return error_response(409, "BucketNotEmpty", "The bucket you tried to delete is not empty");
                }
                if !state.buckets.remove(&bucket) {
                    return error_response(404, "NoSuchBucket", "The specified bucket does not exist");
                }
                ResponseTemplate::new(204)
            }
            (_, Some(_)) if !state.buckets.contains(&bucket) => {
                error_response(404, "NoSuchBucket", "The specified bucket does not exist")
            }
            ("PUT", Some(key)) => {
                let etag = etag_for(&request.body);
                state.objects.insert((bucket, key), request.body.clone());
                ResponseTemplate::new(200).insert_header("ETag", etag.as_str())
            }
            ("HEAD", Some(key)) => match state.objects.get(&(bucket, key)) {
                Some(data) => {
                    let etag = if self.tamper_etag {
                        "\"00000000000000000000000000000000\"".to_string()
                    } else {
                        etag_for(data)
                    };
                    ResponseTemplate::new(200).insert_header("ETag", etag.as_str())
                }
                None => ResponseTemplate::new(404),
            },
            ("GET", Some(key)) => match state.objects.get(&(bucket, key)) {
                Some(data) => {
                    let mut body = data.clone();
                    if self.corrupt_download {
                        body.push(b'!');
                    }
                    ResponseTemplate::new(200).set_body_bytes(body)
                }
                None => error_response(404, "NoSuchKey", "The specified key does not exist."),
            },
            ("DELETE", Some(key)) => {
                state.objects.remove(&(bucket, key));
                ResponseTemplate::new(204)
            }
            _ => error_response(405, "MethodNotAllowed", "The specified method is not allowed"),
        }
    }
}

/// Write a configuration file into `dir` pointing at `s3_host`
pub fn write_config(dir: &Path, s3_host: &str, extra: &[(&str, &str)]) -> std::path::PathBuf {
    let mut config = serde_json::Map::new();
    config.insert("s3_host".into(), s3_host.into());
    config.insert("aws_access_key_id".into(), "AKIDEXAMPLE".into());
    config.insert("aws_secret_access_key".into(), "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY".into());
    config.insert("scratch_dir".into(), dir.display().to_string().into());
    for (key, value) in extra {
        config.insert((*key).into(), (*value).into());
    }

    let path = dir.join("configuration.json");
    std::fs::write(&path, serde_json::Value::Object(config).to_string()).unwrap();
    path
}
