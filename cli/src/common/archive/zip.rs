//! # scaffoldsrv Zip Archiver (`common::archive::zip`)
//!
//! File: cli/src/common/archive/zip.rs
//!
//! Builds a deflate-compressed zip of a generated project in memory. Entries are
//! written in sorted order with a fixed modification time, so the same directory
//! snapshot always produces the same bytes. File contents are streamed from disk
//! into the archive buffer, never held twice.
//!
use super::{sorted_entries, Archiver};
use crate::core::error::Result;
use ::zip::write::SimpleFileOptions;
use ::zip::{CompressionMethod, DateTime, ZipWriter};
use anyhow::Context;
use std::fs::File;
use std::io::{self, Cursor};
use std::path::Path;

/// The built-in `zip` packaging format.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZipArchiver;

impl Archiver for ZipArchiver {
    fn name(&self) -> &str {
        "zip"
    }

    fn mime_type(&self) -> &str {
        "application/zip"
    }

    fn file_extension(&self) -> &str {
        ".zip"
    }

    fn to_bytes(&self, dir: &Path) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(DateTime::default());

        for entry in sorted_entries(dir)? {
            if entry.is_dir {
                zip.add_directory(entry.name.as_str(), options)
                    .with_context(|| format!("Failed to add directory '{}' to zip", entry.name))?;
                continue;
            }

            zip.start_file(entry.name.as_str(), options)
                .with_context(|| format!("Failed to start zip entry '{}'", entry.name))?;
            let mut file = File::open(&entry.path)
                .with_context(|| format!("Failed to open {}", entry.path.display()))?;
            io::copy(&mut file, &mut zip)
                .with_context(|| format!("Failed to write '{}' to zip", entry.name))?;
        }

        let cursor = zip.finish().context("Failed to finalize zip archive")?;
        Ok(cursor.into_inner())
    }
}
