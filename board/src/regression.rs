//! Golden-hash helpers for render regression tests.
//!
//! A golden file stores one SHA-256 per rendered frame of a named scenario. Missing goldens are
//! written on first run; `BOARD_UPDATE_GOLDENS=1` rewrites existing ones.

use std::{
    fs,
    io::{self, Write},
    path::Path,
};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Environment flag helper: accepts `1/true/yes/on` (case-insensitive).
pub fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .ok()
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

pub fn update_goldens_enabled() -> bool {
    env_flag("BOARD_UPDATE_GOLDENS")
}

pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

/// `<crate>/tests/goldens/<name>.json` for the crate invoking the macro.
#[macro_export]
macro_rules! regression_golden_path {
    ($name:expr) => {{
        let base = $crate::regression::sanitize_filename($name);
        ::std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("goldens")
            .join(format!("{base}.json"))
    }};
}

pub fn rgba_sha256_hex(rgba: &[u8]) -> String {
    hex::encode(Sha256::digest(rgba))
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FrameHashGolden {
    pub version: u32,
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub hash_alg: String,
    /// One hash per painted frame of the scenario.
    pub hashes: Vec<String>,
}

impl FrameHashGolden {
    pub fn new(name: impl Into<String>, width: u32, height: u32, hashes: Vec<String>) -> Self {
        Self {
            version: 1,
            name: name.into(),
            width,
            height,
            hash_alg: "sha256".to_string(),
            hashes,
        }
    }

    /// Human-readable description of the first difference from `actual`, if any.
    pub fn diff(&self, actual: &FrameHashGolden) -> Option<String> {
        if (self.version, &self.hash_alg, self.width, self.height)
            != (actual.version, &actual.hash_alg, actual.width, actual.height)
        {
            return Some(format!(
                "metadata: expected v{} {} {}x{}, got v{} {} {}x{}",
                self.version,
                self.hash_alg,
                self.width,
                self.height,
                actual.version,
                actual.hash_alg,
                actual.width,
                actual.height
            ));
        }
        if self.hashes.len() != actual.hashes.len() {
            return Some(format!(
                "frame count: expected {}, got {}",
                self.hashes.len(),
                actual.hashes.len()
            ));
        }
        self.hashes
            .iter()
            .zip(&actual.hashes)
            .position(|(a, b)| a != b)
            .map(|i| {
                format!(
                    "frame {i}: expected {}, got {}",
                    self.hashes[i], actual.hashes[i]
                )
            })
    }
}

pub fn load_golden_json(path: impl AsRef<Path>) -> io::Result<FrameHashGolden> {
    let path = path.as_ref();
    let reader = io::BufReader::new(fs::File::open(path)?);
    serde_json::from_reader(reader).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("failed parsing golden json {}: {e}", path.display()),
        )
    })
}

pub fn save_golden_json(path: impl AsRef<Path>, golden: &FrameHashGolden) -> io::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut writer = io::BufWriter::new(fs::File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, golden).map_err(io::Error::other)?;
    writer.write_all(b"\n")?;
    writer.flush()
}

/// Compares against the golden at `path`, writing it instead when missing or when `update`.
pub fn assert_or_update_golden_json(
    path: impl AsRef<Path>,
    golden: &FrameHashGolden,
    update: bool,
) -> io::Result<()> {
    let path = path.as_ref();
    let exists = path.exists();
    if update || !exists {
        save_golden_json(path, golden)?;
        let verb = if exists { "updated" } else { "wrote" };
        eprintln!("{verb} golden: {}", path.display());
        return Ok(());
    }

    let expected = load_golden_json(path)?;
    match expected.diff(golden) {
        None => Ok(()),
        Some(what) => Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "golden mismatch at {} ({what})\n(hint: set BOARD_UPDATE_GOLDENS=1 to rewrite)",
                path.display()
            ),
        )),
    }
}
