//! # scaffoldsrv Archive Utilities Module (`common::archive`)
//!
//! File: cli/src/common/archive/mod.rs
//!
//! ## Overview
//!
//! Generated projects are returned to the caller as a single archive. This module
//! defines the `Archiver` capability (directory → bytes + MIME type + extension)
//! and the `ArchiverRegistry` that maps a packaging-format name such as `"zip"` to
//! an archiver.
//!
//! ## Architecture
//!
//! - **`zip`**: `ZipArchiver`, the built-in default format.
//! - **`tar`**: `TarGzArchiver`, a gzipped tarball registered at service start.
//!
//! The registry is read on every generation request and written rarely (at
//! startup). Lookups clone an `Arc` of an immutable map snapshot; registrations
//! serialize on a mutex, build a new map and swap it in.
//!
//! ```rust
//! let registry = ArchiverRegistry::new(); // zip is always present
//! registry.register(Arc::new(TarGzArchiver))?;
//! let archiver = registry.lookup("tgz").expect("registered above");
//! let bytes = archiver.to_bytes(workspace.path())?;
//! ```
//!
use crate::core::error::{Result, ServiceError};
use anyhow::Context;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::{debug, info};
use walkdir::WalkDir;

pub mod tar;
pub mod zip;

pub use self::tar::TarGzArchiver;
pub use self::zip::ZipArchiver;

/// Serializes a directory tree into a single archive buffer.
pub trait Archiver: Send + Sync + fmt::Debug {
    /// Packaging-format name; the registry key.
    fn name(&self) -> &str;

    fn mime_type(&self) -> &str;

    /// Extension appended to the download name, including the leading dot.
    fn file_extension(&self) -> &str;

    /// Archives every file and directory below `dir`. Entry paths are relative to
    /// `dir` and written in sorted order.
    fn to_bytes(&self, dir: &Path) -> Result<Vec<u8>>;
}

type ArchiverMap = HashMap<String, Arc<dyn Archiver>>;

/// Thread-safe packaging-format → archiver mapping.
#[derive(Debug)]
pub struct ArchiverRegistry {
    snapshot: RwLock<Arc<ArchiverMap>>,
    /// Held across read-modify-swap so concurrent registrations cannot lose updates.
    write_lock: Mutex<()>,
}

impl Default for ArchiverRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchiverRegistry {
    /// Creates a registry containing the built-in zip archiver.
    pub fn new() -> Self {
        info!("Initializing archiver registry");
        let registry = Self {
            snapshot: RwLock::new(Arc::new(ArchiverMap::new())),
            write_lock: Mutex::new(()),
        };
        registry.initialize();
        registry
    }

    /// Drops every registration and restores the zip-only baseline.
    pub fn initialize(&self) {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let zip: Arc<dyn Archiver> = Arc::new(ZipArchiver);
        let mut baseline = ArchiverMap::new();
        baseline.insert(zip.name().to_string(), zip);
        self.swap(baseline);
    }

    /// # Register Archiver (`register`)
    ///
    /// Adds `archiver` under its own name.
    ///
    /// ## Errors
    ///
    /// `ServiceError::DuplicateRegistration` if the name is taken; the registry is
    /// left unchanged.
    pub fn register(&self, archiver: Arc<dyn Archiver>) -> std::result::Result<(), ServiceError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let current = self.current();
        let name = archiver.name().to_string();
        if current.contains_key(&name) {
            return Err(ServiceError::DuplicateRegistration { name });
        }

        info!("Registering archiver: {} -> {:?}", name, archiver);
        let mut next = ArchiverMap::clone(&current);
        next.insert(name, archiver);
        self.swap(next);
        Ok(())
    }

    /// Returns the archiver registered under `packaging`, if any.
    pub fn lookup(&self, packaging: &str) -> Option<Arc<dyn Archiver>> {
        self.current().get(packaging).cloned()
    }

    /// Registered format names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.current().keys().cloned().collect();
        names.sort();
        names
    }

    fn current(&self) -> Arc<ArchiverMap> {
        Arc::clone(&self.snapshot.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn swap(&self, next: ArchiverMap) {
        *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(next);
    }
}

/// One entry below an archived directory.
#[derive(Debug)]
pub(crate) struct ArchiveEntry {
    pub path: PathBuf,
    /// Path relative to the archive root, `/`-separated.
    pub name: String,
    pub is_dir: bool,
}

/// Walks `dir` in file-name order, skipping `dir` itself and anything that is
/// neither a regular file nor a directory (symlinks are not followed).
pub(crate) fn sorted_entries(dir: &Path) -> Result<Vec<ArchiveEntry>> {
    let mut entries = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).sort_by_file_name() {
        let entry =
            entry.with_context(|| format!("Failed to walk directory {}", dir.display()))?;
        let file_type = entry.file_type();
        if !file_type.is_file() && !file_type.is_dir() {
            debug!("Skipping non-regular entry {}", entry.path().display());
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(dir)
            .with_context(|| format!("{} is outside {}", entry.path().display(), dir.display()))?;
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        entries.push(ArchiveEntry {
            path: entry.path().to_path_buf(),
            name,
            is_dir: file_type.is_dir(),
        });
    }
    Ok(entries)
}
