//! Bucket addressing styles and bucket name checks

use super::{StorageError, StorageResult};
use crate::error::AppError;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use url::{Host, Url};

/// Characters accepted in a bucket name before any request is made
const BUCKET_NAME_PATTERN: &str = r"^[a-zA-Z0-9.\-_]{1,255}$";

/// How the bucket name is placed in request URLs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressingStyle {
    /// Virtual-hosted when the bucket name allows it, path-style otherwise
    Auto,
    /// `https://host/bucket/key`
    Path,
    /// `https://bucket.host/key`
    Virtual,
}

impl AddressingStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Path => "path",
            Self::Virtual => "virtual",
        }
    }

    /// Whether requests for `bucket` put the bucket in the host name
    pub fn uses_virtual_host(&self, endpoint: &Url, bucket: &str) -> bool {
        match self {
            Self::Path => false,
            Self::Virtual => true,
            Self::Auto => {
                let domain_endpoint = matches!(endpoint.host(), Some(Host::Domain(domain)) if domain != "localhost");
                domain_endpoint && is_dns_compatible(bucket, endpoint.scheme() == "https")
            }
        }
    }
}

impl fmt::Display for AddressingStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AddressingStyle {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "path" => Ok(Self::Path),
            "virtual" => Ok(Self::Virtual),
            _ => Err(AppError::config(format!(
                "Invalid addressing_style '{}': expected one of auto, path, virtual",
                s
            ))),
        }
    }
}

/// Reject bucket names the service could never accept
pub fn validate_bucket_name(bucket: &str) -> StorageResult<()> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| Regex::new(BUCKET_NAME_PATTERN).expect("bucket name pattern is valid"));

    if pattern.is_match(bucket) {
        Ok(())
    } else {
        Err(StorageError::InvalidBucketName(bucket.to_string()))
    }
}

/// Whether a bucket name can be used as a DNS label under the endpoint host
fn is_dns_compatible(bucket: &str, secure: bool) -> bool {
    let length_ok = (3..=63).contains(&bucket.len());
    let chars_ok = bucket.bytes().all(|b| matches!(b, b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.'));
    let edges_ok = bucket.starts_with(|c: char| c.is_ascii_alphanumeric())
        && bucket.ends_with(|c: char| c.is_ascii_alphanumeric());
    // Dotted names break wildcard certificate matching
    let dots_ok = !bucket.contains("..") && !(secure && bucket.contains('.'));
    let not_ip = bucket.parse::<std::net::Ipv4Addr>().is_err();

    length_ok && chars_ok && edges_ok && dots_ok && not_ip
}
