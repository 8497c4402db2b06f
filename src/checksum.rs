//! Content digests for local files
//!
//! MD5 is used because single-part S3 uploads report the MD5 of the body as
//! their ETag. It only detects changes; it is not a security boundary.

use crate::defaults::DIGEST_CHUNK_SIZE;
use crate::error::{AppError, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Compute the lowercase hex MD5 of a file, reading it in fixed-size chunks
pub fn file_md5(path: &Path) -> Result<String> {
    let mut file = File::open(path)
        .map_err(|e| AppError::io(format!("MD5 error: {}: {}", path.display(), e)))?;

    let mut context = md5::Context::new();
    let mut buffer = [0u8; DIGEST_CHUNK_SIZE];

    loop {
        let read = file.read(&mut buffer)
            .map_err(|e| AppError::io(format!("MD5 error: {}: {}", path.display(), e)))?;
        if read == 0 {
            break;
        }
        context.consume(&buffer[..read]);
    }

    Ok(format!("{:x}", context.compute()))
}

/// Normalize an ETag header value for comparison with a local digest
pub fn normalize_etag(etag: &str) -> String {
    etag.trim().trim_start_matches("W/").replace('"', "").to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_fixture_digest() {
        let digest = file_md5(Path::new("./tests/fixtures/md5.txt")).unwrap();
        assert_eq!(digest, "4edfe0f81e88c9d6dd5a6d01fc5d001b");
    }

    #[test]
    fn test_empty_file_digest() {
        let file = NamedTempFile::new().unwrap();
        assert_eq!(file_md5(file.path()).unwrap(), "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[test]
    fn test_digest_is_stable() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&vec![7u8; DIGEST_CHUNK_SIZE * 3 + 17]).unwrap();
        file.flush().unwrap();

        let first = file_md5(file.path()).unwrap();
        let second = file_md5(file.path()).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, format!("{:x}", md5::compute(vec![7u8; DIGEST_CHUNK_SIZE * 3 + 17])));
    }

    #[test]
    fn test_digest_changes_with_content() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"original").unwrap();
        file.flush().unwrap();
        let before = file_md5(file.path()).unwrap();

        file.write_all(b"!").unwrap();
        file.flush().unwrap();
        assert_ne!(before, file_md5(file.path()).unwrap());
    }

    #[test]
    fn test_missing_file() {
        let err = file_md5(Path::new("/nonexistent/s3-response-time/fake")).unwrap_err();
        assert_eq!(err.category(), "IO");
        assert!(err.to_string().starts_with("MD5 error"));
    }

    #[test]
    fn test_normalize_etag() {
        assert_eq!(normalize_etag("\"ddb4502f21d869c1059d4adba77bee6d\""), "ddb4502f21d869c1059d4adba77bee6d");
        assert_eq!(normalize_etag("W/\"ABC\""), "abc");
        assert_eq!(normalize_etag("plain"), "plain");
    }
}
