//! Baseline store: one JSON artifact per (package, phase) under `<dataroot>/baseline/`.
//!
//! A baseline freezes a phase's vector so later runs drive the exact same cases, even when the live vector is
//! generated or non-deterministic.
//!
//! ## Notes
//!
//! - Writes are whole-file overwrites, owner read/write only on unix. No atomic rename.
//! - "Same baseline" means same canonical encoding: the stored bytes are decoded into the typed vector and encoded
//!   again before comparing. Comparing decoded values directly is not relied on, because decoding can widen or
//!   normalize values (numbers in particular).
//! - Concurrent updates of one package's baseline are not coordinated; callers serialize them.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{HarnessError, Result};

/// Directory under the data root that holds baseline artifacts.
pub const BASELINE_DIR: &str = "baseline";

/// Locates, reads and writes baseline artifacts below one data root.
#[derive(Debug, Clone)]
pub struct BaselineStore {
    root: PathBuf,
}

impl BaselineStore {
    pub fn new(dataroot: impl Into<PathBuf>) -> Self {
        Self { root: dataroot.into() }
    }

    /// `<dataroot>/baseline/<name>.<phase>.json`
    pub fn path(&self, name: &str, phase: usize) -> PathBuf {
        self.root.join(BASELINE_DIR).join(format!("{}.{}.json", name, phase))
    }

    /// Read and decode the artifact at `path`.
    pub fn load<V: DeserializeOwned>(&self, path: &Path) -> Result<V> {
        let data = fs::read(path).map_err(|source| HarnessError::BaselineIo {
            path: path.to_path_buf(),
            source,
        })?;
        decode(path, &data)
    }

    /// Like [`load`](Self::load), but a missing file is `Ok(None)`.
    pub fn try_load<V: DeserializeOwned>(&self, path: &Path) -> Result<Option<V>> {
        match fs::read(path) {
            Ok(data) => decode(path, &data).map(Some),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(HarnessError::BaselineIo {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Overwrite the artifact at `path` with the encoding of `vector`.
    pub fn save<V: Serialize + ?Sized>(&self, path: &Path, vector: &V) -> Result<()> {
        let data = encode(path, vector)?;
        write_private(path, &data).map_err(|source| HarnessError::BaselineIo {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Canonical encoding of a vector: pretty JSON with a trailing newline.
pub fn encode<V: Serialize + ?Sized>(path: &Path, vector: &V) -> Result<Vec<u8>> {
    let mut data = serde_json::to_vec_pretty(vector).map_err(|source| HarnessError::BaselineEncode {
        path: path.to_path_buf(),
        source,
    })?;
    data.push(b'\n');
    Ok(data)
}

/// Decode a stored vector; `path` is only used to name the artifact in errors.
pub fn decode<V: DeserializeOwned>(path: &Path, data: &[u8]) -> Result<V> {
    serde_json::from_slice(data).map_err(|source| HarnessError::BaselineDecode {
        path: path.to_path_buf(),
        source,
    })
}

/// Reject an encoding of `vector` that would not decode back to the same vector.
///
/// Non-finite floats encode as `null`, for example, and an artifact holding them could never be loaded again.
pub fn verify_round_trip<V: DeserializeOwned + PartialEq>(path: &Path, vector: &V, data: &[u8]) -> Result<()> {
    let encode_error = |source| HarnessError::BaselineEncode {
        path: path.to_path_buf(),
        source,
    };
    match serde_json::from_slice::<V>(data) {
        Ok(decoded) if decoded == *vector => Ok(()),
        Ok(_) => Err(encode_error(<serde_json::Error as serde::ser::Error>::custom(
            "encoded vector does not decode to the same vector",
        ))),
        Err(source) => Err(encode_error(source)),
    }
}

fn write_private(path: &Path, data: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    io::Write::write_all(&mut file, data)
}
