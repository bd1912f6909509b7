//! Artifact files: plain or gzip-compressed JSON, checksummed on load

use crate::{Error, Result};
use atomicwrites::{AtomicFile, OverwriteBehavior};
use chrono::{DateTime, Utc};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// On-disk encoding, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFormat {
    Json,
    GzipJson,
}

impl ArtifactFormat {
    /// `.gz` (including `.json.gz`) is compressed, anything else is plain JSON
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|s| s.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("gz") => ArtifactFormat::GzipJson,
            _ => ArtifactFormat::Json,
        }
    }
}

/// Description of a loaded or written artifact for status reporting
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactInfo {
    pub path: PathBuf,
    pub checksum: String,
    pub size: u64,
    pub loaded_at: DateTime<Utc>,
}

impl ArtifactInfo {
    fn describe(path: &Path, bytes: &[u8]) -> Self {
        Self {
            path: path.to_path_buf(),
            checksum: format!("{:x}", Sha256::digest(bytes)),
            size: bytes.len() as u64,
            loaded_at: Utc::now(),
        }
    }
}

/// Read and decode an artifact
pub fn read_artifact<T: DeserializeOwned>(path: &Path) -> Result<(T, ArtifactInfo)> {
    if !path.exists() {
        return Err(Error::MissingArtifact(path.to_path_buf()));
    }

    let bytes = fs::read(path)?;
    let info = ArtifactInfo::describe(path, &bytes);

    let value = match ArtifactFormat::from_path(path) {
        ArtifactFormat::Json => serde_json::from_slice(&bytes)?,
        ArtifactFormat::GzipJson => {
            let mut json = Vec::new();
            GzDecoder::new(bytes.as_slice()).read_to_end(&mut json)?;
            serde_json::from_slice(&json)?
        }
    };

    tracing::info!(path = %path.display(), checksum = %info.checksum, size = info.size, "loaded artifact");
    Ok((value, info))
}

/// Encode and atomically replace an artifact
pub fn write_artifact<T: Serialize>(path: &Path, value: &T) -> Result<ArtifactInfo> {
    let json = serde_json::to_vec(value)?;
    let bytes = match ArtifactFormat::from_path(path) {
        ArtifactFormat::Json => json,
        ArtifactFormat::GzipJson => {
            let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(&json)?;
            encoder.finish()?
        }
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    AtomicFile::new(path, OverwriteBehavior::AllowOverwrite)
        .write(|f| f.write_all(&bytes))
        .map_err(|e| match e {
            atomicwrites::Error::Internal(e) | atomicwrites::Error::User(e) => Error::Io(e),
        })?;

    let info = ArtifactInfo::describe(path, &bytes);
    tracing::info!(path = %path.display(), checksum = %info.checksum, size = info.size, "wrote artifact");
    Ok(info)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use tempfile::TempDir;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ArtifactFormat::from_path(Path::new("m.json")), ArtifactFormat::Json);
        assert_eq!(ArtifactFormat::from_path(Path::new("m.json.gz")), ArtifactFormat::GzipJson);
        assert_eq!(ArtifactFormat::from_path(Path::new("m.GZ")), ArtifactFormat::GzipJson);
        assert_eq!(ArtifactFormat::from_path(Path::new("model")), ArtifactFormat::Json);
    }

    #[test]
    fn test_plain_and_compressed_files_decode_the_same() {
        let dir = TempDir::new().unwrap();
        let value = json!({"version": "v1", "items": [1, 2, 3]});

        let plain = dir.path().join("a.json");
        let packed = dir.path().join("nested/a.json.gz");
        write_artifact(&plain, &value).unwrap();
        write_artifact(&packed, &value).unwrap();

        let (a, _): (Value, _) = read_artifact(&plain).unwrap();
        let (b, _): (Value, _) = read_artifact(&packed).unwrap();
        assert_eq!(a, value);
        assert_eq!(b, value);
    }

    #[test]
    fn test_checksum_matches_file_bytes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.json");
        let written = write_artifact(&path, &json!({"k": 1})).unwrap();
        let (_, read): (Value, _) = read_artifact(&path).unwrap();

        let expected = format!("{:x}", Sha256::digest(fs::read(&path).unwrap()));
        assert_eq!(written.checksum, expected);
        assert_eq!(read.checksum, expected);
        assert_eq!(read.checksum.len(), 64);
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let result: Result<(Value, _)> = read_artifact(&dir.path().join("nope.json"));
        assert!(matches!(result, Err(Error::MissingArtifact(_))));
    }

    #[test]
    fn test_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, b"{not json").unwrap();
        let result: Result<(Value, _)> = read_artifact(&path);
        assert!(matches!(result, Err(Error::Serialization(_))));
    }
}
