//! Shared-library fragmentation analyzer.
//!
//! Walks a directory tree, parses every 64-bit shared library it finds,
//! and accumulates per-permission-class page counts and wasted-byte totals
//! for the three candidate page sizes. The running totals live in the
//! walker object created once per run and are threaded through the
//! recursion; there is no process-wide mutable state.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::binary::Elf64Binary;
use crate::parser::Elf64Parser;
use crate::types::PermissionClass;

/// Candidate page size: 4 KiB.
pub const PS_4K: u64 = 4096;

/// Candidate page size: 16 KiB.
pub const PS_16K: u64 = 16384;

/// Candidate page size: 64 KiB.
pub const PS_64K: u64 = 65536;

/// The three candidate page sizes, smallest first.
pub const PAGE_SIZES: [u64; 3] = [PS_4K, PS_16K, PS_64K];

/// Only regular files with this suffix are analyzed.
const SHARED_LIB_SUFFIX: &str = ".so";

/// Number of pages of size `page_size` needed to map `memsz` bytes.
pub fn pages(memsz: u64, page_size: u64) -> u64 {
    memsz.div_ceil(page_size)
}

/// Wasted bytes in the final, partially-used page of a segment's memory
/// image at the given page size.
///
/// When `memsz` is already a multiple of `page_size` this reports a full
/// page rather than zero. The formula is kept as-is so new numbers stay
/// comparable with reports produced by earlier surveys.
pub fn fragmentation(memsz: u64, page_size: u64) -> u64 {
    page_size - (memsz % page_size)
}

/// Page count and wasted bytes accumulated for one candidate page size.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PageStats {
    pub page_size: u64,
    pub pages: u64,
    pub frag_bytes: u64,
}

/// Running totals for one segment permission class.
#[derive(Debug, Clone, Serialize)]
pub struct SegmentStats {
    pub class: PermissionClass,
    /// Number of `PT_LOAD` segments seen in this class.
    pub segments: u64,
    /// Sum of `p_memsz` over those segments.
    pub total_memsz: u64,
    /// Per-page-size totals, index-matched with [`PAGE_SIZES`].
    pub per_page: [PageStats; 3],
}

impl SegmentStats {
    fn new(class: PermissionClass) -> Self {
        Self {
            class,
            segments: 0,
            total_memsz: 0,
            per_page: PAGE_SIZES.map(|page_size| PageStats {
                page_size,
                pages: 0,
                frag_bytes: 0,
            }),
        }
    }

    fn update(&mut self, memsz: u64) {
        self.segments += 1;
        self.total_memsz += memsz;
        for stats in &mut self.per_page {
            stats.pages += pages(memsz, stats.page_size);
            stats.frag_bytes += fragmentation(memsz, stats.page_size);
        }
    }
}

/// Final summary across all processed files.
#[derive(Debug, Clone, Serialize)]
pub struct FragReport {
    /// One entry per permission class: exec, read-only, read-write.
    pub classes: Vec<SegmentStats>,
    /// Number of 64-bit shared libraries analyzed.
    pub files_processed: u64,
}

impl fmt::Display for FragReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Fragmentation results (unused bytes)")?;
        writeln!(f)?;
        writeln!(
            f,
            "{:<13} {:>10} {:>14} | {:>10} {:>10} {:>14}",
            "Segment class", "Segments", "Memory size", "Page size", "Pages", "Unused bytes"
        )?;
        for stats in &self.classes {
            for (row, page) in stats.per_page.iter().enumerate() {
                if row == 0 {
                    writeln!(
                        f,
                        "{:<13} {:>10} {:>14} | {:>10} {:>10} {:>14}",
                        stats.class.to_string(),
                        stats.segments,
                        stats.total_memsz,
                        page.page_size,
                        page.pages,
                        page.frag_bytes
                    )?;
                } else {
                    writeln!(
                        f,
                        "{:<13} {:>10} {:>14} | {:>10} {:>10} {:>14}",
                        "", "", "", page.page_size, page.pages, page.frag_bytes
                    )?;
                }
            }
        }
        writeln!(f)?;
        write!(
            f,
            "ELF64 shared libraries processed: {}",
            self.files_processed
        )
    }
}

/// Directory-tree walker that accumulates fragmentation totals.
pub struct Elf64Fragmentation {
    root: PathBuf,
    stats: [SegmentStats; 3],
    files_processed: u64,
}

impl Elf64Fragmentation {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            stats: [
                SegmentStats::new(PermissionClass::Exec),
                SegmentStats::new(PermissionClass::ReadOnly),
                SegmentStats::new(PermissionClass::ReadWrite),
            ],
            files_processed: 0,
        }
    }

    /// Walk the tree and produce the final summary.
    pub fn calculate(mut self) -> FragReport {
        let root = self.root.clone();
        self.process_dir(&root);

        FragReport {
            classes: self.stats.to_vec(),
            files_processed: self.files_processed,
        }
    }

    /// Plain recursive traversal. Sibling ordering is whatever the
    /// filesystem enumerates, which is fine because only aggregate totals
    /// are reported. No per-entry failure aborts the walk.
    fn process_dir(&mut self, dir: &Path) {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) => {
                log::warn!("skipping unreadable directory {}: {err}", dir.display());
                return;
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            let Ok(file_type) = entry.file_type() else {
                continue;
            };

            if file_type.is_dir() {
                self.process_dir(&path);
            } else if file_type.is_file() && has_shared_lib_suffix(&path) {
                // file_type() does not follow symlinks, so symlinked
                // libraries are already excluded here.
                self.process_file(&path);
            }
        }
    }

    fn process_file(&mut self, path: &Path) {
        // Header-only probe first: skips 32-bit libraries without paying
        // for a full parse.
        let ehdr = match Elf64Parser::parse_header(path) {
            Ok(ehdr) => ehdr,
            Err(err) => {
                log::debug!("skipping {}: {err}", path.display());
                return;
            }
        };
        if !ehdr.is_elf64() {
            return;
        }

        log::info!("analyzing elf64 {}", path.display());
        let binary = match Elf64Parser::parse_file(path) {
            Ok(binary) => binary,
            Err(err) => {
                log::warn!("skipping {}: {err}", path.display());
                return;
            }
        };

        self.accumulate(&binary);
        self.files_processed += 1;
    }

    fn accumulate(&mut self, binary: &Elf64Binary) {
        for phdr in &binary.phdrs {
            if !phdr.is_load() {
                continue;
            }
            let bucket = match phdr.permission_class() {
                PermissionClass::Exec => 0,
                PermissionClass::ReadOnly => 1,
                PermissionClass::ReadWrite => 2,
            };
            self.stats[bucket].update(phdr.p_memsz);
        }
    }
}

fn has_shared_lib_suffix(path: &Path) -> bool {
    path.file_name()
        .map_or(false, |name| name.to_string_lossy().ends_with(SHARED_LIB_SUFFIX))
}
