//! # scaffoldsrv TAR Archive Operations (`common::archive::tar`)
//!
//! File: cli/src/common/archive/tar.rs
//!
//! ## Overview
//!
//! Provides the `tgz` packaging format: a gzipped tarball (`.tar.gz`) of the
//! generated project, built in memory.
//!
//! ## Architecture
//!
//! The module leverages the `tar` crate for building the archive structure and
//! the `flate2` crate for Gzip compression.
//!
//! - Entries are added in sorted order with paths relative to the archived directory.
//! - Headers are written in `HeaderMode::Deterministic` (no mtimes, owners or
//!   host-specific permissions), so a directory snapshot always yields the same bytes.
//!
use super::{sorted_entries, Archiver};
use crate::core::error::Result;
use anyhow::Context;
use flate2::{write::GzEncoder, Compression};
use std::path::Path;

/// Gzip-compressed tar packaging, registered as `tgz`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TarGzArchiver;

impl Archiver for TarGzArchiver {
    fn name(&self) -> &str {
        "tgz"
    }

    fn mime_type(&self) -> &str {
        "application/gzip"
    }

    fn file_extension(&self) -> &str {
        ".tar.gz"
    }

    fn to_bytes(&self, dir: &Path) -> Result<Vec<u8>> {
        let enc = GzEncoder::new(Vec::new(), Compression::default());
        let mut tar_builder = ::tar::Builder::new(enc);
        tar_builder.mode(::tar::HeaderMode::Deterministic);

        for entry in sorted_entries(dir)? {
            let added = if entry.is_dir {
                tar_builder.append_dir(&entry.name, &entry.path)
            } else {
                tar_builder.append_path_with_name(&entry.path, &entry.name)
            };
            added.with_context(|| format!("Failed to add '{}' to the tar archive", entry.name))?;
        }

        // Finalize the TAR structure, then the Gzip stream.
        let encoder = tar_builder
            .into_inner()
            .context("Failed to finalize tar archive structure")?;
        encoder
            .finish()
            .context("Failed to finish gzip compression stream")
    }
}
